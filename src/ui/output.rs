use crate::error::{ExtractorError, UserFriendlyError};
use console::{style, Term};

/// User-facing console output.
///
/// Everything goes to stdout, errors included, so a run reads as one
/// transcript.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    program: String,
    verbose: bool,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(program: impl Into<String>, verbose: bool, colors: bool) -> Self {
        let use_colors = colors && Term::stdout().features().colors_supported();

        Self {
            program: program.into(),
            verbose,
            use_colors,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn format_error(&self, message: &str) -> String {
        let prefix = if self.use_colors {
            style("error:").red().bold().to_string()
        } else {
            "error:".to_string()
        };
        format!("{} {}: {}", prefix, self.program, message)
    }

    pub fn format_verbose(&self, message: &str) -> String {
        if self.use_colors {
            format!("{} {}", style("[!]").yellow(), message)
        } else {
            format!("[!] {}", message)
        }
    }

    pub fn error(&self, message: &str) {
        println!("{}", self.format_error(message));
    }

    pub fn verbose(&self, message: &str) {
        if self.verbose {
            println!("{}", self.format_verbose(message));
        }
    }

    pub fn success(&self, message: &str) {
        if self.use_colors {
            println!("{}", style(message).green());
        } else {
            println!("{}", message);
        }
    }

    pub fn failure(&self, message: &str) {
        if self.use_colors {
            println!("{}", style(message).red());
        } else {
            println!("{}", message);
        }
    }

    pub fn usage(&self) {
        print!("{}", crate::cli::usage_text(&self.program));
    }

    /// Reports a failed run. Suggestions are only shown in verbose mode.
    pub fn print_user_friendly_error(&self, error: &ExtractorError) {
        match error {
            ExtractorError::ExtractionFailed { .. } => self.failure(&error.to_string()),
            _ => self.error(&error.to_string()),
        }

        if self.verbose {
            if error.user_message() != error.to_string() {
                self.verbose(&error.user_message());
            }
            if let Some(suggestion) = error.suggestion() {
                self.verbose(&format!("Suggestion: {}", suggestion));
            }
        }
    }
}
