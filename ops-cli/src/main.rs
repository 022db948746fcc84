//! devenv
//!
//! Builds, starts and stops the monorepo services on a developer machine.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use error_common::error_chain;
use logger_redacted::config::DEVELOPMENT;
use logger_redacted::subscriber::json_subscriber;
use logger_redacted::{install_panic_hook, Configuration, Level, LogError, Logger};
use ops_cli::{Service, ServiceState, ServicesConfiguration};

#[derive(Parser)]
#[command(name = "devenv")]
#[command(version)]
#[command(about = "Build, start and stop monorepo services", long_about = None)]
struct Cli {
    /// Monorepo root, defaults to $GOPATH/src/github.com/$MONOREPO_ORG/monorepo
    #[arg(long, env = "MONOREPO_PATH")]
    monorepo: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and start services that are not running
    Start(Selection),
    /// Stop running services
    Stop(Selection),
    /// Build services without starting them
    Build(Selection),
    /// Show which services are running
    Status(Selection),
}

#[derive(Args)]
struct Selection {
    /// Short names or directories; all managed services when empty
    names: Vec<String>,

    /// Build with coverage instrumentation
    #[arg(long)]
    cover: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let (cfg, config_error) = configuration(Configuration::from_env("DEVENV"));
    let (logger, closer) = Logger::new("devenv", &cfg).context("configuring logger failed")?;
    tracing::subscriber::set_global_default(json_subscriber(logger.writer(), cfg.level()))
        .context("installing tracing subscriber failed")?;
    install_panic_hook(logger.clone());

    if let Some(err) = config_error {
        logger.warn(&err);
    }

    let services = match &cli.monorepo {
        Some(root) => ServicesConfiguration::load_from(root),
        None => ServicesConfiguration::load(),
    }
    .context("loading services configuration failed")?;

    let failures = match &cli.command {
        Commands::Start(selection) => each(&logger, &services, selection, |service| {
            service.start(selection.cover).map(Some)
        }),
        Commands::Stop(selection) => each(&logger, &services, selection, |service| service.stop().map(Some)),
        Commands::Build(selection) => each(&logger, &services, selection, |service| {
            service.build(selection.cover).map(|()| None)
        }),
        Commands::Status(selection) => status(&services, selection),
    };

    closer.close();

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run `action` on every selected service, logging the outcome. Returns the
/// number of failed services.
fn each<F>(logger: &Logger, services: &ServicesConfiguration, selection: &Selection, action: F) -> usize
where
    F: Fn(&Service) -> ops_cli::Result<Option<ServiceState>>,
{
    let mut failures = 0;

    for service in services.managed(&selection.names) {
        let entry = logger
            .entry()
            .string("service", &service.short_name)
            .string("directory", &service.directory);

        match action(service) {
            Ok(Some(state)) => entry.string("state", state.as_str()).info("service handled"),
            Ok(None) => entry.info("service built"),
            Err(err) => {
                failures += 1;
                entry.error(&err);
            }
        }
    }

    failures
}

fn status(services: &ServicesConfiguration, selection: &Selection) -> usize {
    let mut failures = 0;

    for service in services.managed(&selection.names) {
        let line = match service.pid() {
            Ok(Some(pid)) => format!("{} pid {pid}", ServiceState::Running.as_str().green()),
            Ok(None) => ServiceState::NotRunning.as_str().yellow().to_string(),
            Err(err) => {
                failures += 1;
                error_chain(&err).red().to_string()
            }
        };
        println!("{} {line}", format!("{:<24}", service.to_string()).bold());
    }

    failures
}

/// Fall back to console logging when the environment does not configure
/// the logger, keeping the reason so it can be logged once a logger exists.
fn configuration(loaded: logger_redacted::Result<Configuration>) -> (Configuration, Option<LogError>) {
    match loaded {
        Ok(cfg) => (cfg, None),
        Err(err) => (console_configuration(), Some(err)),
    }
}

fn console_configuration() -> Configuration {
    Configuration {
        environment: DEVELOPMENT.to_string(),
        rollbar_token: String::new(),
        level: Some(Level::Info),
        log_to_file: false,
        log_file_name: String::new(),
        log_prettify: false,
        mask_sensitive_fields: true,
        xml_mask_sensitive_fields: false,
        console_writer: true,
    }
}
