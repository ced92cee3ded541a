mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{activity, completions, fields, import, leads, tasks, timeline, Context};
use crate::error::{exit_code_for, report_error};
use leadbook_config as config;
use leadbook_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "leadbook", version, about = "Lead tracking with spreadsheet import")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print `{"success": .., "data"|"message": ..}` envelopes
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    #[command(name = "add-lead")]
    AddLead(leads::AddLeadArgs),
    #[command(name = "edit-lead")]
    EditLead(leads::EditLeadArgs),
    Show(leads::ShowArgs),
    List(leads::ListArgs),
    Delete(leads::DeleteArgs),
    #[command(name = "add-note")]
    AddNote(activity::AddNoteArgs),
    #[command(name = "log-call")]
    LogCall(activity::LogCallArgs),
    /// Record a WhatsApp, SMS or email message (nothing is sent)
    #[command(name = "log-message")]
    LogMessage(activity::LogMessageArgs),
    #[command(subcommand)]
    Task(tasks::TaskCommand),
    #[command(subcommand)]
    Field(fields::FieldCommand),
    #[command(subcommand)]
    Import(import::ImportCommand),
    /// Notes, calls and activities of one lead, newest first
    Timeline(timeline::TimelineArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let json = cli.json;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let command = match command {
        Command::Completions(args) => return completions::emit(args),
        command => command,
    };

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
            Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
            Err(err) => debug!(error = %err, "config unavailable"),
        }
    }

    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::AddLead(args) => leads::add_lead(&ctx, args),
        Command::EditLead(args) => leads::edit_lead(&ctx, args),
        Command::Show(args) => leads::show_lead(&ctx, args),
        Command::List(args) => leads::list_leads(&ctx, args),
        Command::Delete(args) => leads::delete_lead(&ctx, args),
        Command::AddNote(args) => activity::add_note(&ctx, args),
        Command::LogCall(args) => activity::log_call(&ctx, args),
        Command::LogMessage(args) => activity::log_message(&ctx, args),
        Command::Task(cmd) => match cmd {
            tasks::TaskCommand::Add(args) => tasks::add_task(&ctx, args),
            tasks::TaskCommand::Done(args) => tasks::complete_task(&ctx, args),
            tasks::TaskCommand::Ls(args) => tasks::list_tasks(&ctx, args),
        },
        Command::Field(cmd) => match cmd {
            fields::FieldCommand::Add(args) => fields::add_field(&ctx, args),
            fields::FieldCommand::Ls => fields::list_fields(&ctx),
            fields::FieldCommand::Rm(args) => fields::remove_field(&ctx, args),
            fields::FieldCommand::Set(args) => fields::set_field_value(&ctx, args),
        },
        Command::Import(cmd) => match cmd {
            import::ImportCommand::Preview(args) => import::preview(&ctx, args),
            import::ImportCommand::Run(args) => import::run_import(&ctx, args),
        },
        Command::Timeline(args) => timeline::show_timeline(&ctx, args),
        Command::Completions(_) => {
            unreachable!("completions command handled before store initialization")
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
