use anyhow::Error;
use leadbook_config::ConfigError;
use leadbook_core::time::TimeParseError;
use leadbook_core::{CoreError, Envelope};
use leadbook_import::{ImportError, ParseError};
use leadbook_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

/// With `--json` the failure goes to stdout as an envelope so scripts can
/// parse every outcome the same way.
pub fn report_error(err: &Error, json: bool, verbose: bool) {
    if json {
        let envelope = Envelope::failure(format!("{:#}", err));
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("error: {:#}", err),
        }
        return;
    }
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(import_err) = cause.downcast_ref::<ImportError>() {
            return ExitCode::from(import_exit_code(import_err));
        }
        if let Some(parse_err) = cause.downcast_ref::<ParseError>() {
            return ExitCode::from(parse_exit_code(parse_err));
        }
        if cause.downcast_ref::<CoreError>().is_some()
            || cause.downcast_ref::<TimeParseError>().is_some()
        {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidId
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::DuplicateEmail
        | StoreErrorKind::DuplicateCustomField
        | StoreErrorKind::UnknownCustomField
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Migration
        | StoreErrorKind::InvalidStoredValue
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidMaxFileMb(_)
        | ConfigError::InvalidSampleRows(_)
        | ConfigError::InvalidInvalidRatio(_)
        | ConfigError::InvalidImportDefault { .. }
        | ConfigError::InvalidTimelineLimit(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn import_exit_code(err: &ImportError) -> u8 {
    match err {
        ImportError::InvalidStep { .. } | ImportError::SinkAborted { .. } => EXIT_FAILURE,
        ImportError::Parse(parse_err) => parse_exit_code(parse_err),
        ImportError::Blocked(_)
        | ImportError::TooManyInvalidRows { .. }
        | ImportError::UnknownHeader(_)
        | ImportError::InvalidTarget(_) => EXIT_INVALID_INPUT,
    }
}

fn parse_exit_code(err: &ParseError) -> u8 {
    match err {
        ParseError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        ParseError::Io(_) => EXIT_FAILURE,
        ParseError::UnsupportedFormat(_)
        | ParseError::TooLarge { .. }
        | ParseError::Malformed(_)
        | ParseError::MissingHeader
        | ParseError::DuplicateHeader(_)
        | ParseError::NoRows => EXIT_INVALID_INPUT,
    }
}
