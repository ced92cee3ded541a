use crate::commands::{print_json, Context, DEFAULT_RECENT_ACTIVITY};
use crate::error::{invalid_input, not_found};
use crate::util::{normalize_optional_value, parse_key_value, parse_lead_id};
use anyhow::Result;
use clap::Args;
use leadbook_core::domain::{FollowUpStatus, Lead, LeadSource, LeadStage};
use leadbook_core::dto::{LeadDetailDto, LeadListItemDto};
use leadbook_core::time::{format_timestamp_date_or_datetime, format_timestamp_datetime, now_utc};
use leadbook_core::merge_timeline;
use leadbook_store::repo::{LeadNew, LeadQuery, LeadUpdate};
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct AddLeadArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    /// import|website|referral|campaign|manual|other:<label>
    #[arg(long, default_value = "manual")]
    pub source: String,
    /// Defaults to import.default_stage from the config
    #[arg(long)]
    pub stage: Option<String>,
    #[arg(long)]
    pub follow_up: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Custom field value, repeatable
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditLeadArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Empty string clears
    #[arg(long)]
    pub phone: Option<String>,
    /// Empty string clears
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub stage: Option<String>,
    #[arg(long)]
    pub follow_up: Option<String>,
    /// Empty string clears
    #[arg(long)]
    pub notes: Option<String>,
    /// Recorded on the field-change activities
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub stage: Option<String>,
    /// Substring of name, email or company
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub limit: Option<i64>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

pub fn add_lead(ctx: &Context<'_>, args: AddLeadArgs) -> Result<()> {
    let defaults = &ctx.config.import;
    let stage = match args.stage.as_deref() {
        Some(raw) => LeadStage::from_str(raw)?,
        None => defaults.default_stage,
    };
    let follow_up = match args.follow_up.as_deref() {
        Some(raw) => FollowUpStatus::from_str(raw)?,
        None => defaults.default_follow_up,
    };
    let custom_values = args
        .fields
        .iter()
        .map(|raw| parse_key_value(raw))
        .collect::<Result<Vec<_>>>()?;

    let lead = ctx.store.leads().create_with_custom_values(
        now_utc(),
        LeadNew {
            name: args.name,
            email: args.email,
            phone: args.phone,
            company: args.company,
            source: LeadSource::from_str(&args.source)?,
            stage,
            follow_up,
            notes: args.notes,
        },
        &custom_values,
    )?;

    if ctx.json {
        print_json(&lead)?;
    } else {
        println!("created {} {}", lead.id, lead.name);
    }
    Ok(())
}

pub fn edit_lead(ctx: &Context<'_>, args: EditLeadArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;

    let update = LeadUpdate {
        name: args.name,
        email: args.email,
        phone: args.phone.map(normalize_optional_value),
        company: args.company.map(normalize_optional_value),
        source: args.source.as_deref().map(LeadSource::from_str).transpose()?,
        stage: args.stage.as_deref().map(LeadStage::from_str).transpose()?,
        follow_up: args
            .follow_up
            .as_deref()
            .map(FollowUpStatus::from_str)
            .transpose()?,
        notes: args.notes.map(normalize_optional_value),
    };
    if update.is_empty() {
        return Err(invalid_input("no updates provided"));
    }

    let lead = ctx
        .store
        .leads()
        .update(now_utc(), id, update, args.author.as_deref())?;
    if ctx.json {
        print_json(&lead)?;
    } else {
        println!("updated {} {}", lead.id, lead.name);
    }
    Ok(())
}

pub fn show_lead(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    let lead = ctx
        .store
        .leads()
        .get(id)?
        .ok_or_else(|| not_found("lead not found"))?;

    let custom_fields = ctx.store.custom_fields().values_for_lead(id)?;
    let open_tasks = ctx.store.tasks().list_open_for_lead(id)?;
    let mut recent_activity = merge_timeline(
        &ctx.store.activities().list_for_lead(id)?,
        &ctx.store.notes().list_for_lead(id)?,
        &ctx.store.calls().list_for_lead(id)?,
    );
    recent_activity.truncate(DEFAULT_RECENT_ACTIVITY);

    let detail = LeadDetailDto {
        id: lead.id,
        name: lead.name,
        email: lead.email,
        phone: lead.phone,
        company: lead.company,
        source: lead.source.to_string(),
        stage: lead.stage,
        follow_up: lead.follow_up,
        notes: lead.notes,
        created_at: lead.created_at,
        updated_at: lead.updated_at,
        custom_fields,
        open_tasks,
        recent_activity,
    };

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    println!("id: {}", detail.id);
    println!("name: {}", detail.name);
    println!("email: {}", detail.email);
    if let Some(phone) = detail.phone.as_deref() {
        println!("phone: {}", phone);
    }
    if let Some(company) = detail.company.as_deref() {
        println!("company: {}", company);
    }
    println!("source: {}", detail.source);
    println!("stage: {}", detail.stage.as_str());
    println!("follow_up: {}", detail.follow_up.as_str());
    if let Some(notes) = detail.notes.as_deref() {
        println!("notes: {}", notes);
    }
    println!("created_at: {}", format_timestamp_datetime(detail.created_at));
    println!("updated_at: {}", format_timestamp_datetime(detail.updated_at));

    for (key, value) in &detail.custom_fields {
        println!("{}: {}", key, value);
    }

    if !detail.open_tasks.is_empty() {
        println!("open tasks:");
        for task in &detail.open_tasks {
            let due = task
                .due_at
                .map(format_timestamp_date_or_datetime)
                .unwrap_or_else(|| "-".to_string());
            println!("  {}  {}  {}", task.id.short(), due, task.title);
        }
    }

    if detail.recent_activity.is_empty() {
        println!("activity: none");
    } else {
        println!("activity:");
        for entry in &detail.recent_activity {
            println!(
                "  {} [{}] {}",
                format_timestamp_datetime(entry.occurred_at),
                entry.kind,
                entry.content
            );
        }
    }

    Ok(())
}

pub fn list_leads(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    if matches!(args.limit, Some(limit) if limit < 1) {
        return Err(invalid_input("limit must be at least 1"));
    }
    let query = LeadQuery {
        stage: args.stage.as_deref().map(LeadStage::from_str).transpose()?,
        search: args.search,
        limit: args.limit,
    };
    let items: Vec<LeadListItemDto> = ctx
        .store
        .leads()
        .list(&query)?
        .into_iter()
        .map(list_item)
        .collect();

    if ctx.json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("no leads");
        return Ok(());
    }

    for item in items {
        println!(
            "{}  {}  <{}>  [{} / {}]{}",
            item.id,
            item.name,
            item.email,
            item.stage.as_str(),
            item.follow_up.as_str(),
            item.company
                .map(|company| format!("  {}", company))
                .unwrap_or_default()
        );
    }
    Ok(())
}

pub fn delete_lead(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let id = parse_lead_id(&args.id)?;
    ctx.store.leads().delete(id)?;
    if ctx.json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("deleted {}", id);
    }
    Ok(())
}

fn list_item(lead: Lead) -> LeadListItemDto {
    LeadListItemDto {
        id: lead.id,
        name: lead.name,
        email: lead.email,
        company: lead.company,
        stage: lead.stage,
        follow_up: lead.follow_up,
    }
}
