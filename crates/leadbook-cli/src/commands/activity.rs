use crate::commands::{print_json, Context};
use crate::util::{parse_lead_id, parse_optional_timestamp, text_or_stdin};
use anyhow::Result;
use clap::{Args, ValueEnum};
use leadbook_core::domain::{ActivityKind, CallOutcome};
use leadbook_core::time::{format_duration_secs, now_utc};
use leadbook_store::repo::{ActivityNew, CallNew, NoteNew};
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct AddNoteArgs {
    pub id: String,
    /// Read from stdin when omitted
    #[arg(long)]
    pub body: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogCallArgs {
    pub id: String,
    /// answered|no_answer|busy|voicemail
    #[arg(long)]
    pub outcome: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub duration_secs: i64,
    /// Start time, YYYY-MM-DD [HH:MM]; defaults to now
    #[arg(long)]
    pub at: Option<String>,
    #[arg(long, default_value = "")]
    pub summary: String,
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MessageChannel {
    Whatsapp,
    Sms,
    Email,
}

impl From<MessageChannel> for ActivityKind {
    fn from(channel: MessageChannel) -> Self {
        match channel {
            MessageChannel::Whatsapp => ActivityKind::Whatsapp,
            MessageChannel::Sms => ActivityKind::Sms,
            MessageChannel::Email => ActivityKind::Email,
        }
    }
}

#[derive(Debug, Args)]
pub struct LogMessageArgs {
    pub id: String,
    #[arg(long, value_enum)]
    pub channel: MessageChannel,
    /// Read from stdin when omitted
    #[arg(long)]
    pub body: Option<String>,
    /// Send time; may be in the future for scheduled messages
    #[arg(long)]
    pub at: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
}

pub fn add_note(ctx: &Context<'_>, args: AddNoteArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.id)?;
    let body = text_or_stdin(args.body, "body")?;
    let note = ctx.store.notes().add(
        now_utc(),
        NoteNew {
            lead_id,
            author: args.author,
            body,
        },
    )?;

    if ctx.json {
        print_json(&note)?;
    } else {
        println!("added note {}", note.id);
    }
    Ok(())
}

pub fn log_call(ctx: &Context<'_>, args: LogCallArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.id)?;
    let started_at = parse_optional_timestamp(args.at.as_deref())?.unwrap_or_else(now_utc);

    let call = ctx.store.calls().add(CallNew {
        lead_id,
        author: args.author,
        started_at,
        duration_secs: args.duration_secs,
        outcome: CallOutcome::from_str(&args.outcome)?,
        summary: args.summary,
    })?;

    if ctx.json {
        print_json(&call)?;
    } else {
        println!(
            "logged call {} ({}, {})",
            call.id,
            call.outcome.as_str(),
            format_duration_secs(call.duration_secs)
        );
    }
    Ok(())
}

pub fn log_message(ctx: &Context<'_>, args: LogMessageArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.id)?;
    let content = text_or_stdin(args.body, "body")?;
    let now = now_utc();
    let occurred_at = parse_optional_timestamp(args.at.as_deref())?.unwrap_or(now);

    let activity = ctx.store.activities().add(ActivityNew {
        lead_id,
        kind: args.channel.into(),
        occurred_at,
        created_at: now,
        author: args.author,
        content,
    })?;

    if ctx.json {
        print_json(&activity)?;
    } else if activity.occurred_at > now {
        println!("scheduled {} message {}", activity.kind, activity.id);
    } else {
        println!("logged {} message {}", activity.kind, activity.id);
    }
    Ok(())
}
