// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pw: provision, inspect, and retire Kubernetes build agents

mod color;
mod commands;
mod context;
mod env;
mod exit_error;
mod listener;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::context::{load_config, Context};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pw", version, about, styles = color::styles())]
struct Cli {
    /// Cloud and template configuration
    #[arg(long, global = true, env = "PW_CONFIG")]
    config: Option<PathBuf>,

    /// Where agent records are kept between invocations
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[arg(short = 'o', long, global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a template merged with its ancestors
    Resolve {
        template: String,
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Print the pod manifest a template would produce
    Render {
        template: String,
        #[arg(long)]
        cloud: Option<String>,
        /// Pod name (default: generated from the template name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Generate a pod name from free text
    Name {
        text: Vec<String>,
        /// Check that the text already is a legal name instead
        #[arg(long)]
        check: bool,
    },
    /// Create an agent pod from a template
    Provision {
        template: String,
        #[arg(long)]
        cloud: Option<String>,
    },
    /// Terminate agents, honoring their retention policy
    Terminate {
        names: Vec<String>,
        /// Terminate every agent whose strategy says it is done
        #[arg(long, conflicts_with = "names")]
        expired: bool,
    },
    /// Stamp agent pods so the garbage collector leaves them alone
    RefreshTtl {
        names: Vec<String>,
        /// Refresh every live agent
        #[arg(long, conflicts_with = "names")]
        all: bool,
    },
    /// List known agents
    Agents {
        /// Only agents whose strategy says they are done
        #[arg(long)]
        expired: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;
    let config_path = env::config_path(cli.config);
    let open = |state_dir: Option<PathBuf>| -> Result<Context> {
        Context::open(load_config(&config_path)?, env::state_dir(state_dir)?)
    };

    match cli.command {
        Command::Name { text, check } => commands::name::handle(&text, check, format),
        Command::Resolve { template, cloud } => {
            let config = load_config(&config_path)?;
            commands::template::resolve(&config, cloud.as_deref(), &template, format)
        }
        Command::Render { template, cloud, name } => {
            let config = load_config(&config_path)?;
            commands::template::render(&config, cloud.as_deref(), &template, name.as_deref())
        }
        Command::Provision { template, cloud } => {
            let ctx = open(cli.state_dir)?;
            commands::agent::provision(&ctx, cloud.as_deref(), &template, format).await
        }
        Command::Terminate { names, expired } => {
            let ctx = open(cli.state_dir)?;
            commands::agent::terminate(&ctx, names, expired, format).await
        }
        Command::RefreshTtl { names, all } => {
            let ctx = open(cli.state_dir)?;
            commands::agent::refresh_ttl(&ctx, names, all, format).await
        }
        Command::Agents { expired } => {
            let ctx = open(cli.state_dir)?;
            commands::agent::list(&ctx, expired, format)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        let code = e.downcast_ref::<ExitError>().map_or(exit_error::FAILURE, |exit| exit.code);
        eprintln!("error: {:#}", e);
        std::process::exit(code);
    }
}
