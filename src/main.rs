use std::panic;

use anyhow::Result;
use backtrace::Backtrace;
use clap::Parser;
use ssh_fanout_lib::app::App;
use ssh_fanout_lib::cli::Cli;
use ssh_fanout_lib::output::Printer;
use ssh_fanout_lib::KeySession;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    set_panic_handlers()?;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app = App::new(cli, |prompt: &str| rpassword::prompt_password(prompt))?;
    app.run::<KeySession>(Printer::stdout()).await;

    Ok(())
}

/// `RUST_LOG` wins; otherwise warn, raised by each `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// handle all panic here
fn set_panic_handlers() -> Result<()> {
    panic::set_hook(Box::new(|e| {
        let backtrace = Backtrace::new();
        eprintln!("\nssh-fanout was closed due to an unexpected panic with the following info:\n\n{:?}\ntrace:\n{:?}", e, backtrace);
    }));
    Ok(())
}
