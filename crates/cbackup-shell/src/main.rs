//! # cbackup-shell
//!
//! Command-line client for the cBackup scheduler shell.
//!
//! ## Overview
//!
//! Connects to the scheduler's embedded SSH shell, runs one command, and
//! prints the decoded reply: the JSON payload on success, the scheduler's
//! own error message on rejection.
//!
//! ## Architecture
//!
//! This is Layer 4 - the CLI binary that ties together:
//! - cbackup-shell-core: configuration, commands, replies
//! - cbackup-shell-session: SSH session and prompt-synchronized execution
//!
//! ## Usage
//!
//! ```text
//! cbackup-shell [--config PATH] <start|restart|stop|status|version|help>
//! cbackup-shell [--config PATH] backup <NODE_ID>
//! cbackup-shell [--config PATH] runtask <TASK>
//! ```

use anyhow::{bail, Context};

use cbackup_shell_core::{ClientConfig, DecodedResult, SchedulerCommand};
use cbackup_shell_session::SchedulerClient;

const DEFAULT_CONFIG_PATH: &str = "cbackup-shell.yml";

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command_args) = split_config_flag(&args)?;

    if command_args.is_empty() {
        bail!(
            "usage: cbackup-shell [--config PATH] <start|restart|stop|status|version|help|backup NODE_ID|runtask TASK>"
        );
    }

    let config = load_config(config_path)?;
    let command = parse_command(command_args)?;

    tracing::info!("Running scheduler command: {}", command);
    let mut client = SchedulerClient::connect(&config)?;

    if !command.expects_json() {
        let text = client.help()?;
        println!("{text}");
        return client.close().map_err(Into::into);
    }

    let result = client.execute(&command)?;
    client.close()?;

    match result {
        DecodedResult::Success(map) => {
            println!("{}", serde_json::to_string_pretty(&map)?);
            Ok(())
        }
        DecodedResult::Failure { message } => {
            eprintln!("scheduler error: {message}");
            std::process::exit(1);
        }
    }
}

/// Pull an optional `--config PATH` off the front of the argument list.
fn split_config_flag(args: &[String]) -> anyhow::Result<(Option<&str>, &[String])> {
    match args.first().map(String::as_str) {
        Some("--config") => {
            let path = args
                .get(1)
                .context("--config requires a path argument")?;
            Ok((Some(path), &args[2..]))
        }
        _ => Ok((None, args)),
    }
}

/// Load configuration from the given path, the default path, or defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config from {path}")),
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() {
                ClientConfig::from_file(DEFAULT_CONFIG_PATH)
                    .with_context(|| format!("failed to load config from {DEFAULT_CONFIG_PATH}"))
            } else {
                Ok(ClientConfig::default())
            }
        }
    }
}

/// Map the CLI arguments onto a scheduler command.
fn parse_command(args: &[String]) -> anyhow::Result<SchedulerCommand> {
    let verb = args[0].as_str();
    match verb {
        "start" => Ok(SchedulerCommand::Start),
        "restart" => Ok(SchedulerCommand::Restart),
        "stop" => Ok(SchedulerCommand::Stop),
        "status" => Ok(SchedulerCommand::Status),
        "version" => Ok(SchedulerCommand::Version),
        "help" => Ok(SchedulerCommand::Help),
        "backup" => {
            let node_id = args
                .get(1)
                .context("backup requires a node id")?
                .parse::<u64>()
                .context("node id must be a number")?;
            Ok(SchedulerCommand::Backup { node_id })
        }
        "runtask" => {
            let name = args.get(1).context("runtask requires a task name")?;
            Ok(SchedulerCommand::RunTask { name: name.clone() })
        }
        _ => bail!("unknown command: {verb}. Try one of: start, restart, stop, status, version, help, backup, runtask"),
    }
}
