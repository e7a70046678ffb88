//! Check Host Tester - Main CLI Application
//!
//! Runs ping and HTTP checks against a host from check-host.net probe
//! nodes and summarizes the results per region.

use check_host_tester::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
    executor::CancelSignal,
};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue at: https://github.com/MaurUppi/check-host-tester/issues");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let color_hint = !cli.no_color;

    let app = match App::new(cli) {
        Ok(app) => app,
        Err(e) => exit_with(&e, color_hint, verbose),
    };

    // Prompts run before the interrupt handler is installed so Ctrl+C
    // still terminates a blocked stdin read.
    let request = match app.resolve_request() {
        Ok(Some(request)) => request,
        Ok(None) => return,
        Err(e) => exit_with(&e, app.use_color(), verbose),
    };

    let (cancel_tx, cancel) = CancelSignal::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    if let Err(e) = app.run(&request, cancel).await {
        exit_with(&e, app.use_color(), verbose);
    }
}

fn exit_with(error: &AppError, use_color: bool, verbose: bool) -> ! {
    if let AppError::Cancelled(_) = error {
        eprintln!("\nOperation cancelled by user");
    } else {
        ErrorReporter::new(use_color, verbose).report_error(error);
        print_error_suggestions(error);
    }
    process::exit(error.exit_code());
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - The API URL must start with http:// or https://");
            eprintln!("  - Poll timeout 1-300s, poll interval 1-60s, request timeout 1-120s");
        }
        AppError::InvalidRequest(_) => {
            eprintln!();
            eprintln!("Request help:");
            eprintln!("  - Pass a domain (example.com), an IP address or an http(s):// URL");
            eprintln!("  - Use --list-nodes to see valid node selections");
        }
        AppError::Transport(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - check-host.net limits request rates; wait a minute and retry");
            eprintln!("  - Increase REQUEST_TIMEOUT_SECONDS on slow links");
        }
        _ => {}
    }
}
