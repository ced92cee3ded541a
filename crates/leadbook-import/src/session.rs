use crate::error::{ImportError, Result};
use crate::executor::{execute, ImportResult, LeadSink};
use crate::file::{parse_bytes, ParsedFile};
use crate::mapping::{propose_mapping, ColumnMapping, ColumnTarget};
use crate::plan::{plan_import, ImportOptions};
use leadbook_core::domain::{CustomField, LeadId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Upload,
    Map,
    Review,
    Import,
    Result,
}

impl ImportStep {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImportStep::Upload => "upload",
            ImportStep::Map => "map",
            ImportStep::Review => "review",
            ImportStep::Import => "import",
            ImportStep::Result => "result",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionLimits {
    pub max_file_bytes: u64,
    pub sample_rows: usize,
}

/// Walks one file through upload, mapping, review and import.
#[derive(Debug)]
pub struct ImportSession {
    limits: SessionLimits,
    options: ImportOptions,
    step: ImportStep,
    file: Option<ParsedFile>,
    mapping: Option<ColumnMapping>,
    /// Custom field keys defined when the file was accepted.
    custom_keys: HashSet<String>,
    result: Option<ImportResult>,
}

impl ImportSession {
    pub fn new(limits: SessionLimits, options: ImportOptions) -> Self {
        Self {
            limits,
            options,
            step: ImportStep::Upload,
            file: None,
            mapping: None,
            custom_keys: HashSet::new(),
            result: None,
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn file(&self) -> Option<&ParsedFile> {
        self.file.as_ref()
    }

    pub fn mapping(&self) -> Option<&ColumnMapping> {
        self.mapping.as_ref()
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn options_mut(&mut self) -> &mut ImportOptions {
        &mut self.options
    }

    /// Parses the file and proposes a mapping. A parse failure leaves the
    /// session at the upload step.
    pub fn upload(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        custom_fields: &[CustomField],
    ) -> Result<&ColumnMapping> {
        self.expect_step(ImportStep::Upload)?;
        let file = parse_bytes(file_name, bytes, self.limits.max_file_bytes)?;
        Ok(self.accept_file(file, custom_fields))
    }

    /// Same as [`ImportSession::upload`] for a file parsed elsewhere.
    pub fn accept_parsed(
        &mut self,
        file: ParsedFile,
        custom_fields: &[CustomField],
    ) -> Result<&ColumnMapping> {
        self.expect_step(ImportStep::Upload)?;
        Ok(self.accept_file(file, custom_fields))
    }

    fn accept_file(&mut self, file: ParsedFile, custom_fields: &[CustomField]) -> &ColumnMapping {
        let mapping = propose_mapping(
            &file.headers,
            file.samples(self.limits.sample_rows),
            custom_fields,
        );
        tracing::debug!(
            headers = file.headers.len(),
            rows = file.rows.len(),
            "file accepted"
        );
        self.file = Some(file);
        self.custom_keys = custom_fields.iter().map(|field| field.key.clone()).collect();
        self.step = ImportStep::Map;
        self.mapping.insert(mapping)
    }

    /// Retargets one header. Custom targets must name a field that existed
    /// when the file was accepted.
    pub fn override_column(&mut self, header: &str, target: ColumnTarget) -> Result<()> {
        self.expect_step(ImportStep::Map)?;
        if let ColumnTarget::Custom(key) = &target {
            if !self.custom_keys.contains(key) {
                return Err(ImportError::InvalidTarget(format!(
                    "{target} is not a defined custom field"
                )));
            }
        }
        let mapping = self.mapping.as_mut().ok_or(ImportError::InvalidStep {
            expected: ImportStep::Map.as_str(),
            actual: ImportStep::Upload.as_str(),
        })?;
        mapping.override_column(header, target)
    }

    pub fn proceed_to_review(&mut self) -> Result<()> {
        self.expect_step(ImportStep::Map)?;
        self.step = ImportStep::Review;
        Ok(())
    }

    pub fn back_to_map(&mut self) -> Result<()> {
        self.expect_step(ImportStep::Review)?;
        self.step = ImportStep::Map;
        Ok(())
    }

    /// Runs the import from the review step. A blocked mapping or a
    /// circuit-breaker abort leaves the session at review with nothing
    /// written. A fatal sink error also returns to review; undoing the rows
    /// already sent is up to the sink's owner.
    pub fn run_import<S: LeadSink>(
        &mut self,
        existing: &HashMap<String, LeadId>,
        sink: &mut S,
    ) -> Result<&ImportResult> {
        self.expect_step(ImportStep::Review)?;
        let (Some(file), Some(mapping)) = (self.file.as_ref(), self.mapping.as_ref()) else {
            return Err(ImportError::InvalidStep {
                expected: ImportStep::Review.as_str(),
                actual: ImportStep::Upload.as_str(),
            });
        };

        let plan = plan_import(file, mapping, existing, &self.options)?;
        self.step = ImportStep::Import;
        let result = match execute(plan, sink) {
            Ok(result) => result,
            Err(err) => {
                self.step = ImportStep::Review;
                return Err(err);
            }
        };
        self.step = ImportStep::Result;
        Ok(&*self.result.insert(result))
    }

    /// Drops the file and starts over.
    pub fn reset(&mut self) {
        self.step = ImportStep::Upload;
        self.file = None;
        self.mapping = None;
        self.custom_keys.clear();
        self.result = None;
    }

    fn expect_step(&self, expected: ImportStep) -> Result<()> {
        if self.step != expected {
            return Err(ImportError::InvalidStep {
                expected: expected.as_str(),
                actual: self.step.as_str(),
            });
        }
        Ok(())
    }
}
