use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use rolodex_codec::{
    CancelToken, GenerativeConfig, GenerativeExtractor, IngestInput, IngestKind, IngestReport,
    RetryPolicy, Session,
};
use rolodex_config::AppConfig;
use rolodex_core::{ColumnEdit, NameDecoration};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

use crate::error::invalid_input;

pub mod columns;
pub mod export;

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// CSV, vCard, image or free-text file; `-` reads stdin
    pub input: String,
    /// Treat the input as an image regardless of its suffix
    #[arg(long)]
    pub image: bool,
}

#[derive(Debug, Args)]
pub struct ColumnArgs {
    /// Column edit: `show=ID`, `hide=ID`, `label=ID:TEXT` or `move=ID:INDEX`
    #[arg(long = "column", value_name = "EDIT")]
    pub edits: Vec<String>,
}

impl ColumnArgs {
    pub fn parse_edits(&self) -> Result<Vec<ColumnEdit>> {
        self.edits
            .iter()
            .map(|raw| {
                raw.parse::<ColumnEdit>()
                    .with_context(|| format!("parse --column {raw}"))
            })
            .collect()
    }
}

#[derive(Debug, Args)]
pub struct DecorationArgs {
    /// Text placed before every name (overrides config)
    #[arg(long)]
    pub prefix: Option<String>,
    /// Text placed after every name (overrides config)
    #[arg(long)]
    pub suffix: Option<String>,
}

impl DecorationArgs {
    pub fn resolve(&self, config: &AppConfig) -> NameDecoration {
        let mut decoration = config.decoration.clone();
        if let Some(prefix) = &self.prefix {
            decoration.prefix = prefix.trim().to_string();
        }
        if let Some(suffix) = &self.suffix {
            decoration.suffix = suffix.trim().to_string();
        }
        decoration
    }
}

fn read_input(args: &InputArgs) -> Result<IngestInput> {
    if args.input == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .with_context(|| "read stdin")?;
        return Ok(IngestInput::new(None, bytes, args.image));
    }
    let path = Path::new(&args.input);
    let bytes = fs::read(path).with_context(|| format!("read input file {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string);
    Ok(IngestInput::new(filename, bytes, args.image))
}

fn build_extractor(config: &AppConfig, kind: IngestKind) -> Result<GenerativeExtractor> {
    let extraction = &config.extraction;
    let api_key = match extraction.api_key() {
        Some(key) => key,
        None if matches!(kind, IngestKind::Text | IngestKind::Image) => {
            return Err(invalid_input(format!(
                "{} is not set; text and image input need an extraction key",
                extraction.api_key_env
            )));
        }
        None => String::new(),
    };
    let extractor = GenerativeExtractor::new(GenerativeConfig {
        endpoint: extraction.endpoint.clone(),
        model: extraction.model.clone(),
        api_key,
        timeout: extraction.timeout,
    })?;
    Ok(extractor)
}

/// Ingests the input into a fresh session. Fails when the extraction
/// service gave up, since there is nothing left to work with.
pub fn load_session(ctx: &Context<'_>, args: &InputArgs) -> Result<(Session, IngestReport)> {
    let input = read_input(args)?;
    debug!(kind = ?input.kind, bytes = input.bytes.len(), "input read");
    let extractor = build_extractor(ctx.config, input.kind)?;
    let policy = RetryPolicy {
        max_attempts: ctx.config.extraction.max_attempts,
        base_delay: ctx.config.extraction.base_delay,
    };

    let mut session = Session::new();
    let report = session.ingest(&input, &extractor, policy, &CancelToken::new())?;
    if let Some(message) = &report.extraction_failure {
        return Err(anyhow!("{message}"));
    }
    Ok((session, report))
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}
