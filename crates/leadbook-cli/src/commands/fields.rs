use crate::commands::{print_json, Context};
use crate::util::parse_lead_id;
use anyhow::Result;
use clap::{Args, Subcommand};
use leadbook_core::time::now_utc;

#[derive(Debug, Subcommand)]
pub enum FieldCommand {
    /// Define a custom lead field
    Add(AddFieldArgs),
    Ls,
    /// Remove a field and every value stored for it
    Rm(RemoveFieldArgs),
    /// Set a lead's value; an empty value clears it
    Set(SetFieldArgs),
}

#[derive(Debug, Args)]
pub struct AddFieldArgs {
    pub label: String,
    /// Derived from the label when omitted
    #[arg(long)]
    pub key: Option<String>,
}

#[derive(Debug, Args)]
pub struct RemoveFieldArgs {
    pub key: String,
}

#[derive(Debug, Args)]
pub struct SetFieldArgs {
    pub lead_id: String,
    pub key: String,
    pub value: String,
}

pub fn add_field(ctx: &Context<'_>, args: AddFieldArgs) -> Result<()> {
    let field = ctx
        .store
        .custom_fields()
        .create(now_utc(), &args.label, args.key.as_deref())?;
    if ctx.json {
        print_json(&field)?;
    } else {
        println!("added field {} ({})", field.key, field.label);
    }
    Ok(())
}

pub fn list_fields(ctx: &Context<'_>) -> Result<()> {
    let fields = ctx.store.custom_fields().list()?;
    if ctx.json {
        print_json(&fields)?;
        return Ok(());
    }
    if fields.is_empty() {
        println!("no custom fields");
        return Ok(());
    }
    for field in fields {
        println!("{}  {}", field.key, field.label);
    }
    Ok(())
}

pub fn remove_field(ctx: &Context<'_>, args: RemoveFieldArgs) -> Result<()> {
    ctx.store.custom_fields().delete(&args.key)?;
    if ctx.json {
        print_json(&serde_json::json!({ "key": args.key }))?;
    } else {
        println!("removed field {}", args.key);
    }
    Ok(())
}

pub fn set_field_value(ctx: &Context<'_>, args: SetFieldArgs) -> Result<()> {
    let lead_id = parse_lead_id(&args.lead_id)?;
    ctx.store
        .custom_fields()
        .set_value(lead_id, &args.key, &args.value)?;
    let values = ctx.store.custom_fields().values_for_lead(lead_id)?;
    if ctx.json {
        print_json(&values)?;
    } else if args.value.trim().is_empty() {
        println!("cleared {} on {}", args.key, lead_id);
    } else {
        println!("set {} on {}", args.key, lead_id);
    }
    Ok(())
}
