use anyhow::Result;
use leadbook_config::AppConfig;
use leadbook_core::Envelope;
use leadbook_store::Store;
use serde::Serialize;
use std::io::{self, Write};

pub mod activity;
pub mod completions;
pub mod fields;
pub mod import;
pub mod leads;
pub mod tasks;
pub mod timeline;

/// Entries shown under `show`; `timeline` has its own limit.
pub const DEFAULT_RECENT_ACTIVITY: usize = 10;

pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &Envelope::ok(value))?;
    writeln!(stdout)?;
    Ok(())
}
