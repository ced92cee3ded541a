use crate::error::ParseError;
use calamine::{open_workbook_auto_from_rs, Reader};
use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Xls,
    Xlsx,
}

impl FileFormat {
    /// Picks the format from the file extension.
    pub fn detect(file_name: &str) -> Result<Self, ParseError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" | "tab" => Ok(FileFormat::Tsv),
            "xls" => Ok(FileFormat::Xls),
            "xlsx" | "xlsm" => Ok(FileFormat::Xlsx),
            _ => Err(ParseError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Header row plus data rows, each row padded or cut to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub format: FileFormat,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedFile {
    pub fn samples(&self, count: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(count)]
    }
}

pub fn parse_path(path: &Path, max_bytes: u64) -> Result<ParsedFile, ParseError> {
    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ParseError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    parse_bytes(name, bytes, max_bytes)
}

pub fn parse_bytes(file_name: &str, bytes: Vec<u8>, max_bytes: u64) -> Result<ParsedFile, ParseError> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(ParseError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let format = FileFormat::detect(file_name)?;
    let table = match format {
        FileFormat::Csv => read_delimited(&bytes, b',')?,
        FileFormat::Tsv => read_delimited(&bytes, b'\t')?,
        FileFormat::Xls | FileFormat::Xlsx => read_workbook(bytes)?,
    };
    into_parsed(format, table)
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<String>>, ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        table.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Vec<String>>, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::Malformed("workbook has no sheets".to_string()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .collect())
}

fn into_parsed(format: FileFormat, table: Vec<Vec<String>>) -> Result<ParsedFile, ParseError> {
    let mut rows = table
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()));

    let raw_headers = rows.next().ok_or(ParseError::MissingHeader)?;
    let mut seen = HashSet::new();
    let mut headers = Vec::with_capacity(raw_headers.len());
    for (index, header) in raw_headers.into_iter().enumerate() {
        let header = if header.is_empty() {
            format!("column_{}", index + 1)
        } else {
            header
        };
        if !seen.insert(header.to_ascii_lowercase()) {
            return Err(ParseError::DuplicateHeader(header));
        }
        headers.push(header);
    }

    let width = headers.len();
    let rows: Vec<Vec<String>> = rows
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();
    if rows.is_empty() {
        return Err(ParseError::NoRows);
    }

    Ok(ParsedFile {
        format,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_bytes, FileFormat};
    use crate::error::ParseError;

    const LIMIT: u64 = 1024 * 1024;

    #[test]
    fn parses_csv_with_bom_and_ragged_rows() {
        let data = "\u{feff}Full Name, Email ,Phone\nAda, ada@example.com \nBob,bob@example.com,555,extra\n";
        let parsed = parse_bytes("leads.csv", data.as_bytes().to_vec(), LIMIT).unwrap();
        assert_eq!(parsed.format, FileFormat::Csv);
        assert_eq!(parsed.headers, vec!["Full Name", "Email", "Phone"]);
        assert_eq!(parsed.rows[0], vec!["Ada", "ada@example.com", ""]);
        assert_eq!(parsed.rows[1], vec!["Bob", "bob@example.com", "555"]);
    }

    #[test]
    fn parses_tsv_and_skips_blank_lines() {
        let data = "name\temail\n\nAda\tada@example.com\n";
        let parsed = parse_bytes("LEADS.TSV", data.as_bytes().to_vec(), LIMIT).unwrap();
        assert_eq!(parsed.rows, vec![vec!["Ada", "ada@example.com"]]);
    }

    #[test]
    fn names_blank_headers_by_position() {
        let data = "name,,email\nAda,x,ada@example.com\n";
        let parsed = parse_bytes("a.csv", data.as_bytes().to_vec(), LIMIT).unwrap();
        assert_eq!(parsed.headers, vec!["name", "column_2", "email"]);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            parse_bytes("a.pdf", b"x".to_vec(), LIMIT),
            Err(ParseError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            parse_bytes("a.csv", b"name,email\n".to_vec(), LIMIT),
            Err(ParseError::NoRows)
        ));
        assert!(matches!(
            parse_bytes("a.csv", Vec::new(), LIMIT),
            Err(ParseError::MissingHeader)
        ));
        assert!(matches!(
            parse_bytes("a.csv", b"Email,email\nx,y\n".to_vec(), LIMIT),
            Err(ParseError::DuplicateHeader(_))
        ));
        assert!(matches!(
            parse_bytes("a.csv", b"name,email\nAda,a@b.co\n".to_vec(), 4),
            Err(ParseError::TooLarge { limit: 4, .. })
        ));
    }

    #[test]
    fn garbage_workbook_is_malformed() {
        assert!(matches!(
            parse_bytes("a.xlsx", b"not a zip".to_vec(), LIMIT),
            Err(ParseError::Malformed(_))
        ));
    }
}
