mod api;
mod cli;
mod commands;
mod config;
mod guard;
mod notify;
mod session;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cli::{Cli, Command};
use config::Config;
use guard::{Navigation, Route};
use notify::ConsoleSink;
use state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env from the working directory; DNSCTL_* vars may live there.
    let _ = dotenvy::dotenv();

    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::load(cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let state = match AppState::new(config, Arc::new(ConsoleSink)) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("API base URL: {}", state.api.base_url());

    if let Some(route) = cli.command.route() {
        match guard::check(route, state.sessions.as_ref()) {
            Navigation::Proceed => {}
            Navigation::Redirect(Route::Login) => {
                log::warn!("{} requires a session", route.path());
                eprintln!("warning: {}", guard::LOGIN_REQUIRED);
                return ExitCode::FAILURE;
            }
            Navigation::Redirect(target) => {
                let forced = matches!(&cli.command, Command::Login(args) if args.force);
                if !forced {
                    log::info!("Already logged in, redirecting to {}", target.path());
                    eprintln!("already logged in; use `login --force` to log in again");
                    return ExitCode::SUCCESS;
                }
            }
        }
    }

    match commands::run(&state, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
