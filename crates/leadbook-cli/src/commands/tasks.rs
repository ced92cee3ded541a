use crate::commands::{print_json, Context};
use crate::util::{parse_lead_id, parse_optional_timestamp, parse_task_id};
use anyhow::Result;
use clap::{Args, Subcommand};
use leadbook_core::time::{format_timestamp_date_or_datetime, now_utc};
use leadbook_store::repo::TaskNew;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    Add(AddTaskArgs),
    Done(DoneTaskArgs),
    Ls(ListTasksArgs),
}

#[derive(Debug, Args)]
pub struct AddTaskArgs {
    pub lead_id: String,
    #[arg(long)]
    pub title: String,
    /// YYYY-MM-DD [HH:MM]
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Debug, Args)]
pub struct DoneTaskArgs {
    pub task_id: String,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListTasksArgs {
    pub lead_id: String,
    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
}

pub fn add_task(ctx: &Context<'_>, args: AddTaskArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.lead_id)?;
    let due_at = parse_optional_timestamp(args.due.as_deref())?;
    let task = ctx.store.tasks().create(
        now_utc(),
        TaskNew {
            lead_id,
            title: args.title,
            due_at,
        },
        args.author.as_deref(),
    )?;

    if ctx.json {
        print_json(&task)?;
    } else {
        println!("added task {} {}", task.id, task.title);
    }
    Ok(())
}

pub fn complete_task(ctx: &Context<'_>, args: DoneTaskArgs) -> Result<()> {
    let id = parse_task_id(&args.task_id)?;
    let task = ctx
        .store
        .tasks()
        .complete(now_utc(), id, args.author.as_deref())?;

    if ctx.json {
        print_json(&task)?;
    } else {
        println!("completed task {} {}", task.id, task.title);
    }
    Ok(())
}

pub fn list_tasks(ctx: &Context<'_>, args: ListTasksArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.lead_id)?;
    let tasks = if args.all {
        ctx.store.tasks().list_for_lead(lead_id)?
    } else {
        ctx.store.tasks().list_open_for_lead(lead_id)?
    };

    if ctx.json {
        print_json(&tasks)?;
        return Ok(());
    }

    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for task in tasks {
        let due = task
            .due_at
            .map(format_timestamp_date_or_datetime)
            .unwrap_or_else(|| "-".to_string());
        let mark = if task.is_open() { " " } else { "x" };
        println!("[{}] {}  {}  {}", mark, task.id, due, task.title);
    }
    Ok(())
}
