use crate::ui::OutputFormatter;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Receives `(current, total)` counters from the extractor library.
///
/// The library may call in from its own worker threads, so implementations
/// must be shareable across threads.
pub trait ProgressSink: Send + Sync {
    fn report(&self, current: u32, total: u32);
}

/// Where the `extracting files... (n/m)` line goes.
enum ProgressLine {
    /// indicatif bar on a terminal, or a hidden one when progress is off.
    Bar(ProgressBar),
    /// Plain `\r`-terminated lines for pipes and files, which indicatif
    /// refuses to draw to.
    Plain {
        writer: Box<dyn Write + Send>,
        written: bool,
    },
}

struct ProgressState {
    first_report_seen: bool,
    line: ProgressLine,
}

/// Console sink: a single overwritten `extracting files... (n/m)` line.
pub struct ExtractionProgress {
    state: Mutex<ProgressState>,
    output: OutputFormatter,
    start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(output: OutputFormatter, enabled: bool) -> Self {
        if !enabled {
            return Self::with_line(output, ProgressLine::Bar(ProgressBar::hidden()));
        }
        if !Term::stdout().is_term() {
            return Self::with_writer(output, Box::new(Term::stdout()));
        }

        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        bar.set_style(
            ProgressStyle::with_template("extracting files... ({pos}/{len})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self::with_line(output, ProgressLine::Bar(bar))
    }

    /// Writes plain progress lines to `writer` instead of drawing a bar.
    pub fn with_writer(output: OutputFormatter, writer: Box<dyn Write + Send>) -> Self {
        Self::with_line(
            output,
            ProgressLine::Plain {
                writer,
                written: false,
            },
        )
    }

    fn with_line(output: OutputFormatter, line: ProgressLine) -> Self {
        Self {
            state: Mutex::new(ProgressState {
                first_report_seen: false,
                line,
            }),
            output,
            start_time: Instant::now(),
        }
    }

    /// Leaves the last progress line on screen and returns the elapsed time.
    pub fn finish(&self) -> Duration {
        let mut state = self.lock_state();
        match &mut state.line {
            ProgressLine::Bar(bar) => bar.finish(),
            ProgressLine::Plain { writer, written } => {
                if *written {
                    log_write_error(writer.write_all(b"\n").and_then(|_| writer.flush()));
                }
            }
        }
        self.start_time.elapsed()
    }

    fn lock_state(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for ExtractionProgress {
    fn report(&self, current: u32, total: u32) {
        let mut state = self.lock_state();
        let first_report = !state.first_report_seen;
        state.first_report_seen = true;

        match &mut state.line {
            ProgressLine::Bar(bar) => {
                if first_report {
                    bar.suspend(|| self.output.verbose("the cache file seems to be good!"));
                }
                bar.set_length(u64::from(total));
                bar.set_position(u64::from(current));
            }
            ProgressLine::Plain { writer, written } => {
                if first_report && self.output.is_verbose() {
                    let message = self.output.format_verbose("the cache file seems to be good!");
                    log_write_error(writeln!(writer, "{}", message));
                }
                log_write_error(
                    write!(writer, "extracting files... ({}/{})\r", current, total)
                        .and_then(|_| writer.flush()),
                );
                *written = true;
            }
        }
    }
}

fn log_write_error(result: io::Result<()>) {
    if let Err(err) = result {
        tracing::debug!(error = %err, "failed to write progress");
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
