use crate::commands::{load_session, print_json, print_warnings, ColumnArgs, Context, InputArgs};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub columns: ColumnArgs,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn show_columns(ctx: &Context<'_>, args: ColumnsArgs) -> Result<()> {
    let (mut session, report) = load_session(ctx, &args.input)?;
    print_warnings(&report.warnings);
    session.edit_columns(&args.columns.parse_edits()?)?;

    if ctx.json {
        return print_json(session.columns());
    }

    if session.columns().is_empty() {
        println!("No columns.");
        return Ok(());
    }
    for (index, column) in session.columns().columns().iter().enumerate() {
        let state = if column.visible { "shown" } else { "hidden" };
        println!("{index:>2}  {:<24} {:<28} {state}", column.id.id(), column.label);
    }
    Ok(())
}

/// Prints the ingest report: normalized records plus any warnings.
pub fn parse(ctx: &Context<'_>, args: ParseArgs) -> Result<()> {
    let (_session, report) = load_session(ctx, &args.input)?;
    if !ctx.json {
        print_warnings(&report.warnings);
    }
    print_json(&report)
}
