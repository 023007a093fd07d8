// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orkestra - cost-aware model routing.
//!
//! This is the binary entry point for the `orkestra` CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use orkestra::{Orkestra, OrkestraConfig, OrkestraError, ProviderKind, RoutingDecision};
use orkestra_core::TokenUsage;

/// Orkestra - route prompts to the cheapest adequate model.
#[derive(Parser, Debug)]
#[command(name = "orkestra", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the model each provider's router picks for a prompt.
    Route {
        /// Provider to route for; repeat for several. Defaults to all.
        #[arg(long = "provider", short = 'p')]
        providers: Vec<String>,
        /// The prompt text.
        prompt: String,
    },
    /// Pick one provider and model from routed candidates.
    Select {
        /// cheapest, smartest or balanced. Defaults to `routing.default_strategy`.
        #[arg(long, short = 's')]
        strategy: Option<String>,
        /// Candidates as PROVIDER=MODEL, in priority order.
        #[arg(required = true)]
        candidates: Vec<String>,
    },
    /// Dollar cost of a call, with savings against the provider's base model.
    Cost {
        provider: String,
        model: String,
        input_tokens: u64,
        output_tokens: u64,
        /// Print the full breakdown as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print models, pricing, tiers and router artifacts as JSON.
    Manifest,
    /// Download the embedding model and every router artifact.
    Fetch,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            orkestra_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("orkestra: {} error: {e}", e.stage());
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<OrkestraConfig, Vec<orkestra_config::ConfigError>> {
    match path {
        Some(path) => orkestra_config::load_and_validate_path(path),
        None => orkestra_config::load_and_validate(),
    }
}

async fn run(command: Commands, config: OrkestraConfig) -> Result<(), OrkestraError> {
    if let Commands::Config = command {
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| OrkestraError::Config(format!("failed to render config: {e}")))?;
        print!("{rendered}");
        return Ok(());
    }

    let context = Arc::new(Orkestra::from_config(config)?);

    match command {
        Commands::Route { providers, prompt } => {
            let kinds = if providers.is_empty() {
                ProviderKind::ALL.to_vec()
            } else {
                providers
                    .iter()
                    .map(|p| ProviderKind::from_name(p))
                    .collect::<Result<Vec<_>, _>>()?
            };
            for decision in context.route_all(&kinds, &prompt).await? {
                println!("{}\t{}", decision.provider, decision.model);
            }
        }
        Commands::Select {
            strategy,
            candidates,
        } => {
            let decisions = candidates
                .iter()
                .map(|c| parse_decision(c))
                .collect::<Result<Vec<_>, _>>()?;
            let strategy =
                strategy.unwrap_or_else(|| context.config().routing.default_strategy.clone());
            let winner = context.select(&strategy, &decisions)?;
            println!("{}\t{}", winner.provider, winner.model);
        }
        Commands::Cost {
            provider,
            model,
            input_tokens,
            output_tokens,
            json,
        } => {
            let kind = ProviderKind::from_name(&provider)?;
            let breakdown = context.cost_breakdown(
                kind,
                &model,
                TokenUsage {
                    input_tokens,
                    output_tokens,
                },
            )?;
            if json {
                println!("{}", to_json(&breakdown)?);
            } else {
                println!(
                    "${:.6} (saves ${:.6}, {:.1}% vs {})",
                    breakdown.cost,
                    breakdown.savings,
                    breakdown.savings_percent,
                    breakdown.base_model
                );
            }
        }
        Commands::Manifest => {
            println!("{}", to_json(&context.manifest())?);
        }
        Commands::Fetch => {
            for (provider, path) in context.prefetch().await? {
                println!("{provider}\t{}", path.display());
            }
        }
        Commands::Config => {}
    }
    Ok(())
}

/// Parses a `PROVIDER=MODEL` candidate.
fn parse_decision(candidate: &str) -> Result<RoutingDecision, OrkestraError> {
    let (provider, model) = candidate.split_once('=').ok_or_else(|| {
        OrkestraError::Config(format!("candidate `{candidate}` is not PROVIDER=MODEL"))
    })?;
    if model.is_empty() {
        return Err(OrkestraError::Config(format!(
            "candidate `{candidate}` has an empty model"
        )));
    }
    Ok(RoutingDecision::new(ProviderKind::from_name(provider)?, model))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, OrkestraError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| OrkestraError::Config(format!("failed to render JSON: {e}")))
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orkestra={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
