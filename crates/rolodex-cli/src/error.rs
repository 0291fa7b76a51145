use anyhow::Error;
use rolodex_codec::CodecError;
use rolodex_config::ConfigError;
use rolodex_core::CoreError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
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
            });
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(codec_err) = cause.downcast_ref::<CodecError>() {
            return ExitCode::from(codec_exit_code(codec_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidFormat(_)
        | ConfigError::InvalidExtractionField { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn codec_exit_code(err: &CodecError) -> u8 {
    match err {
        CodecError::Io(_) | CodecError::Extraction(_) | CodecError::Json(_) => EXIT_FAILURE,
        CodecError::Core(_)
        | CodecError::Parse(_)
        | CodecError::EmptyExportSelection(_)
        | CodecError::Unavailable(_) => EXIT_INVALID_INPUT,
        #[cfg(feature = "extract-service")]
        CodecError::Http(_) => EXIT_FAILURE,
        #[cfg(feature = "extract-service")]
        CodecError::Url(_) => EXIT_INVALID_INPUT,
    }
}
