use crate::config::CliOverrides;
use crate::error::{ExtractorError, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "dyld-extractor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "dyld shared cache extractor")]
#[command(override_usage = "<cache file> [-v] [-d arg] [-l arg]")]
#[command(help_template = "OVERVIEW: {about} ({version})\n\nUSAGE: {bin} {usage}\n\n{all-args}\n")]
#[command(args_override_self = true)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Options {
    /// Path to the dyld shared cache file
    #[arg(value_name = "cache file")]
    pub input_path: PathBuf,

    /// Print verbose messages
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Set destination path for the extracted files
    #[arg(short = 'd', value_name = "arg", allow_hyphen_values = true)]
    pub dest_path: Option<PathBuf>,

    /// Set path to dsc_extractor library
    #[arg(short = 'l', value_name = "arg", allow_hyphen_values = true)]
    pub library_path: Option<PathBuf>,
}

impl Options {
    /// Parses the full argument vector, program name included.
    ///
    /// The first argument is always the cache file. After it only the exact
    /// tokens `-v`, `-d <arg>` and `-l <arg>` are accepted; parsing stops at
    /// the first other token. Every failure becomes a single
    /// [`ExtractorError::Usage`].
    pub fn parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let normalized = normalize_args(&args)?;

        Self::try_parse_from(normalized).map_err(|err| usage_error(&err))
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_library_path(self.library_path.clone())
    }
}

/// Renders the usage block shown on parse errors.
pub fn usage_text(program: &str) -> String {
    Options::command()
        .bin_name(program.to_string())
        .render_help()
        .to_string()
}

/// Checks the raw tokens and reorders them so clap always sees the cache
/// file as the positional, escaped behind `--`.
fn normalize_args(args: &[OsString]) -> Result<Vec<OsString>> {
    let (program, rest) = match args.split_first() {
        Some((program, rest)) => (program.clone(), rest),
        None => (OsString::from(env!("CARGO_PKG_NAME")), args),
    };
    let (input, flags) = rest.split_first().ok_or_else(|| ExtractorError::Usage {
        message: "the cache file must be specified".to_string(),
    })?;

    let mut normalized = vec![program];
    let mut tokens = flags.iter();
    while let Some(token) = tokens.next() {
        if token == "-v" {
            normalized.push(token.clone());
        } else if token == "-d" || token == "-l" {
            let value = tokens.next().ok_or_else(|| ExtractorError::Usage {
                message: format!("value must be specified for option: {}", token.to_string_lossy()),
            })?;
            normalized.push(token.clone());
            normalized.push(value.clone());
        } else {
            return Err(ExtractorError::Usage {
                message: format!("unknown option: {}", token.to_string_lossy()),
            });
        }
    }

    normalized.push(OsString::from("--"));
    normalized.push(input.clone());
    Ok(normalized)
}

fn usage_error(err: &clap::Error) -> ExtractorError {
    let message = match err.kind() {
        ErrorKind::MissingRequiredArgument => "the cache file must be specified".to_string(),
        ErrorKind::UnknownArgument => match invalid_arg(err) {
            Some(token) => format!("unknown option: {}", token),
            None => "unknown option".to_string(),
        },
        // Option values carry no validation, so the only invalid value is a missing one.
        ErrorKind::InvalidValue => match invalid_arg(err) {
            Some(arg) => {
                let flag = arg.split_whitespace().next().unwrap_or(arg.as_str());
                format!("value must be specified for option: {}", flag)
            }
            None => "value must be specified".to_string(),
        },
        kind => kind.as_str().unwrap_or("invalid arguments").to_string(),
    };

    ExtractorError::Usage { message }
}

fn invalid_arg(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.clone()),
        _ => None,
    }
}
