use dyld_extractor::{DyldExtractor, ExtractorError, Options, OutputFormatter};
use std::env;
use std::io::IsTerminal;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let program = env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    // Parse CLI arguments
    let options = match Options::parse_args(env::args_os()) {
        Ok(options) => options,
        Err(e) => {
            print_usage_error(&program, &e);
            return e.exit_code();
        }
    };

    let verbose = options.verbose;
    setup_logging(verbose);

    let app = match DyldExtractor::from_options(options, &program) {
        Ok(app) => app,
        Err(e) => {
            OutputFormatter::new(program.as_str(), verbose, true).print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    match app.run() {
        Ok(()) => 0,
        Err(e) => {
            app.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_usage_error(program: &str, error: &ExtractorError) {
    let formatter = OutputFormatter::new(program, false, true);
    formatter.usage();
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).ok();
}
