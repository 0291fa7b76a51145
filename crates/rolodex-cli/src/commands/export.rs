use crate::commands::{
    load_session, print_json, print_warnings, ColumnArgs, Context, DecorationArgs, InputArgs,
};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::Args;
use rolodex_codec::{write_bundle, ExportBundle, Session};
use rolodex_core::ExportFormat;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format (csv, vcf, txt); repeat for several. Defaults to config
    #[arg(long = "format", value_name = "FORMAT")]
    pub formats: Vec<String>,
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    #[command(flatten)]
    pub columns: ColumnArgs,
    #[command(flatten)]
    pub decoration: DecorationArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, value_name = "FORMAT")]
    pub format: String,
    #[command(flatten)]
    pub columns: ColumnArgs,
    #[command(flatten)]
    pub decoration: DecorationArgs,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    records: usize,
    files: Vec<WrittenFile>,
    rejected: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WrittenFile {
    format: ExportFormat,
    path: String,
    mime_type: &'static str,
}

fn prepare(
    ctx: &Context<'_>,
    input: &InputArgs,
    columns: &ColumnArgs,
    decoration: &DecorationArgs,
) -> Result<(Session, Vec<String>)> {
    let (mut session, report) = load_session(ctx, input)?;
    session.edit_columns(&columns.parse_edits()?)?;
    session.set_decoration(decoration.resolve(ctx.config));
    Ok((session, report.warnings))
}

fn render(session: &Session, formats: &[String]) -> Result<ExportBundle> {
    let bundle = session.export(formats)?;
    print_warnings(&bundle.rejected);
    if bundle.files.is_empty() {
        return Err(invalid_input("no recognised export format selected"));
    }
    Ok(bundle)
}

pub fn export(ctx: &Context<'_>, args: ExportArgs) -> Result<()> {
    let (session, warnings) = prepare(ctx, &args.input, &args.columns, &args.decoration)?;
    print_warnings(&warnings);

    let formats = if args.formats.is_empty() {
        ctx.config
            .default_formats
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        args.formats
    };
    let bundle = render(&session, &formats)?;

    let out_dir = args.out_dir.unwrap_or_else(|| PathBuf::from("."));
    let paths = write_bundle(&bundle, &out_dir)
        .with_context(|| format!("write exports to {}", out_dir.display()))?;

    if ctx.json {
        let files = bundle
            .files
            .iter()
            .zip(&paths)
            .map(|(file, path)| WrittenFile {
                format: file.format,
                path: path.display().to_string(),
                mime_type: file.mime_type,
            })
            .collect();
        return print_json(&ExportReport {
            records: session.records().len(),
            files,
            rejected: bundle.rejected,
            warnings,
        });
    }

    println!("Exported {} contacts", session.records().len());
    for path in paths {
        println!("- {}", path.display());
    }
    Ok(())
}

pub fn preview(ctx: &Context<'_>, args: PreviewArgs) -> Result<()> {
    let format = args.format.parse::<ExportFormat>()?;
    let (session, warnings) = prepare(ctx, &args.input, &args.columns, &args.decoration)?;
    print_warnings(&warnings);

    let file = session.preview(format)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(file.content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
