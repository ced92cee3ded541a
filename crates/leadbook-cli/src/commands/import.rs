use crate::commands::{print_json, Context};
use crate::util::parse_key_value;
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use leadbook_core::domain::{CrmField, DuplicatePolicy, LeadId};
use leadbook_core::time::now_utc;
use leadbook_import::{
    parse_path, propose_mapping, ColumnMapping, ColumnTarget, DryRunSink, ImportDefaults,
    ImportOptions, ImportResult, ImportSession, LeadDraft, LeadSink, SessionLimits,
};
use leadbook_store::error::StoreError;
use leadbook_store::repo::{LeadNew, LeadUpdate};
use leadbook_store::Store;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

const IMPORT_AUTHOR: &str = "import";

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Show the proposed column mapping and sample rows
    Preview(PreviewArgs),
    /// Import leads from a CSV, TSV, XLS or XLSX file
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    pub file: PathBuf,
    /// Override one column: HEADER=TARGET, where TARGET is a field name,
    /// custom:<key> or skip. Repeatable.
    #[arg(long = "map", value_name = "HEADER=TARGET")]
    pub overrides: Vec<String>,
    /// What to do with rows whose email already exists
    #[arg(long, value_parser = parse_duplicate_policy)]
    pub duplicates: Option<DuplicatePolicy>,
    /// Evaluate every row without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct PreviewReport<'a> {
    file: String,
    rows: usize,
    mapping: &'a ColumnMapping,
    samples: &'a [Vec<String>],
    ready: bool,
    blocked: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    file: String,
    dry_run: bool,
    #[serde(flatten)]
    result: &'a ImportResult,
}

fn parse_duplicate_policy(raw: &str) -> std::result::Result<DuplicatePolicy, String> {
    DuplicatePolicy::from_str(raw)
}

pub fn preview(ctx: &Context<'_>, args: PreviewArgs) -> Result<()> {
    let import_config = &ctx.config.import;
    let file = parse_path(&args.file, import_config.max_file_bytes)
        .with_context(|| format!("read {}", args.file.display()))?;
    let custom_fields = ctx.store.custom_fields().list()?;
    let samples = file.samples(import_config.sample_rows);
    let mapping = propose_mapping(&file.headers, samples, &custom_fields);
    let blocked = mapping.check_ready().err().map(|blocked| blocked.to_string());

    if ctx.json {
        return print_json(&PreviewReport {
            file: args.file.display().to_string(),
            rows: file.rows.len(),
            mapping: &mapping,
            samples,
            ready: blocked.is_none(),
            blocked,
        });
    }

    println!("{} data rows", file.rows.len());
    let width = file.headers.iter().map(|header| header.len()).max().unwrap_or(0);
    for (index, entry) in mapping.entries().iter().enumerate() {
        let sample = samples
            .iter()
            .filter_map(|row| row.get(index))
            .find(|value| !value.is_empty())
            .map(String::as_str)
            .unwrap_or("");
        println!(
            "  {:<width$}  -> {:<18} {}",
            entry.header,
            entry.target.to_string(),
            sample,
            width = width
        );
    }
    match blocked {
        Some(reason) => println!("not ready: {reason}"),
        None => println!("ready to import"),
    }
    Ok(())
}

pub fn run_import(ctx: &Context<'_>, args: RunArgs) -> Result<()> {
    let import_config = &ctx.config.import;
    let options = ImportOptions {
        duplicate_policy: args.duplicates.unwrap_or(import_config.duplicate_policy),
        max_invalid_ratio: import_config.max_invalid_ratio,
        defaults: ImportDefaults {
            source: import_config.default_source.clone(),
            stage: import_config.default_stage,
            follow_up: import_config.default_follow_up,
        },
    };
    let mut session = ImportSession::new(
        SessionLimits {
            max_file_bytes: import_config.max_file_bytes,
            sample_rows: import_config.sample_rows,
        },
        options,
    );

    let file = parse_path(&args.file, import_config.max_file_bytes)
        .with_context(|| format!("read {}", args.file.display()))?;
    let custom_fields = ctx.store.custom_fields().list()?;
    session.accept_parsed(file, &custom_fields)?;

    for raw in &args.overrides {
        let (header, target) = parse_key_value(raw)?;
        let target = ColumnTarget::from_str(&target)?;
        debug!(header = %header, target = %target, "mapping override");
        session.override_column(&header, target)?;
    }
    session.proceed_to_review()?;

    let existing = ctx.store.leads().email_index()?;
    let result = if args.dry_run {
        session.run_import(&existing, &mut DryRunSink)?.clone()
    } else {
        write_to_store(ctx.store, &mut session, &existing, now_utc())?
    };

    if ctx.json {
        return print_json(&RunReport {
            file: args.file.display().to_string(),
            dry_run: args.dry_run,
            result: &result,
        });
    }

    let prefix = if args.dry_run { "dry run: " } else { "" };
    println!(
        "{}{} rows: {} created, {} updated, {} skipped as duplicates, {} failed",
        prefix, result.total, result.created, result.updated, result.skipped_duplicate, result.failed
    );
    for issue in &result.issues {
        println!("  row {} [{}] {}", issue.row, issue.kind.as_str(), issue.message);
    }
    Ok(())
}

/// Runs the import in one transaction. Nothing is committed when the
/// session returns an error.
fn write_to_store(
    store: &Store,
    session: &mut ImportSession,
    existing: &HashMap<String, LeadId>,
    now: i64,
) -> Result<ImportResult> {
    let tx = store.connection().unchecked_transaction()?;
    let mut sink = StoreSink { store, now };
    let result = session.run_import(existing, &mut sink)?.clone();
    tx.commit()?;
    Ok(result)
}

/// Writes each row inside its own savepoint so a failed row leaves no
/// partial lead behind while the surrounding transaction carries on.
struct StoreSink<'a> {
    store: &'a Store,
    now: i64,
}

impl StoreSink<'_> {
    fn in_savepoint(&self, write: impl FnOnce() -> Result<(), StoreError>) -> Result<(), StoreError> {
        let conn = self.store.connection();
        conn.execute_batch("SAVEPOINT import_row;")?;
        match write() {
            Ok(()) => {
                conn.execute_batch("RELEASE import_row;")?;
                Ok(())
            }
            Err(err) => {
                conn.execute_batch("ROLLBACK TO import_row; RELEASE import_row;")?;
                Err(err)
            }
        }
    }
}

impl LeadSink for StoreSink<'_> {
    type Error = StoreError;

    fn is_fatal(error: &StoreError) -> bool {
        !error.is_row_level()
    }

    fn create(&mut self, draft: &LeadDraft) -> Result<(), Self::Error> {
        self.in_savepoint(|| {
            self.store
                .leads()
                .create_with_custom_values(self.now, lead_new(draft), &draft.custom_values)
                .map(|_| ())
        })
    }

    fn update(&mut self, existing: LeadId, draft: &LeadDraft) -> Result<(), Self::Error> {
        self.in_savepoint(|| {
            self.store.leads().update(
                self.now,
                existing,
                lead_update(draft),
                Some(IMPORT_AUTHOR),
            )?;
            let custom_fields = self.store.custom_fields();
            for (key, value) in &draft.custom_values {
                custom_fields.set_value(existing, key, value)?;
            }
            Ok(())
        })
    }
}

fn lead_new(draft: &LeadDraft) -> LeadNew {
    LeadNew {
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        company: draft.company.clone(),
        source: draft.source.clone(),
        stage: draft.stage,
        follow_up: draft.follow_up,
        notes: draft.notes.clone(),
    }
}

/// Only values present in the row overwrite the stored lead.
fn lead_update(draft: &LeadDraft) -> LeadUpdate {
    let provided = |field: CrmField| !draft.defaulted.contains(&field);
    LeadUpdate {
        name: Some(draft.name.clone()),
        email: None,
        phone: draft.phone.clone().map(Some),
        company: draft.company.clone().map(Some),
        source: provided(CrmField::Source).then(|| draft.source.clone()),
        stage: provided(CrmField::Stage).then_some(draft.stage),
        follow_up: provided(CrmField::FollowUpStatus).then_some(draft.follow_up),
        notes: draft.notes.clone().map(Some),
    }
}
