use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::parse_lead_id;
use anyhow::Result;
use clap::Args;
use leadbook_core::merge_timeline;
use leadbook_core::time::format_timestamp_datetime;

#[derive(Debug, Args)]
pub struct TimelineArgs {
    pub id: String,
    /// Defaults to timeline.limit from the config
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn show_timeline(ctx: &Context<'_>, args: TimelineArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    let limit = args.limit.unwrap_or(ctx.config.timeline.limit);
    if limit == 0 {
        return Err(invalid_input("limit must be at least 1"));
    }
    if ctx.store.leads().get(id)?.is_none() {
        return Err(not_found("lead not found"));
    }

    let mut entries = merge_timeline(
        &ctx.store.activities().list_for_lead(id)?,
        &ctx.store.notes().list_for_lead(id)?,
        &ctx.store.calls().list_for_lead(id)?,
    );
    entries.truncate(limit);

    if ctx.json {
        print_json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("no activity");
        return Ok(());
    }
    for entry in entries {
        let author = entry
            .author
            .as_deref()
            .map(|author| format!(" ({author})"))
            .unwrap_or_default();
        println!(
            "{}  {:<14} {}{}",
            format_timestamp_datetime(entry.occurred_at),
            entry.kind.to_string(),
            entry.content,
            author
        );
    }
    Ok(())
}
