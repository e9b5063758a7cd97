//! Command-line front end for the declarative path router.
//!
//! ```text
//!  path-router --config routes/console.toml check
//!  path-router --config routes/console.toml routes
//!  path-router --config routes/console.toml resolve /exam/42/scores
//!  path-router --config routes/console.toml build ScoreView exam_id=42
//!  path-router --config routes/console.toml watch
//! ```
//!
//! Results go to stdout, logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use path_router::config::loader::{load_router, ConfigError};
use path_router::config::watcher::ConfigWatcher;
use path_router::observability::logging;
use path_router::{Params, ResolvedRoute, RouteDefinition, RouteTarget, Router};

#[derive(Parser)]
#[command(name = "path-router")]
#[command(about = "Resolve and build paths against a declarative route table", long_about = None)]
struct Cli {
    /// Route declaration file (TOML, or JSON by extension).
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    /// Log level; overrides the declaration file. `RUST_LOG` wins over both.
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the declaration and report every problem
    Check,
    /// Print the compiled route table
    Routes,
    /// Resolve a path and print the result as JSON
    Resolve {
        path: String,

        /// Fall back to the configured default route when nothing matches
        #[arg(long)]
        fallback: bool,
    },
    /// Build the path of a named route from key=value parameters
    Build {
        name: String,

        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Re-validate the declaration whenever the file changes
    Watch,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, router) = match load_router(&cli.config) {
        Ok(loaded) => loaded,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{}: invalid route declaration", cli.config.display());
            for error in errors {
                eprintln!("  - {}", error);
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("{}: {}", cli.config.display(), e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init_logging(&level)?;

    tracing::info!(
        config = %cli.config.display(),
        routes = config.routes.len(),
        "Declaration loaded"
    );

    match cli.command {
        Commands::Check => {
            println!(
                "{}: ok ({} routes, {} named)",
                cli.config.display(),
                router.len(),
                router.routes().filter(|r| r.name().is_some()).count()
            );
        }
        Commands::Routes => {
            for &id in router.table().roots() {
                print_route(&router, &router.table()[id], 0);
            }
        }
        Commands::Resolve { path, fallback } => {
            let result = if fallback {
                router.resolve_or_default(&path)
            } else {
                router.resolve(&path)
            };
            match result {
                Ok(resolved) => println!("{}", serde_json::to_string_pretty(&describe(&resolved))?),
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Build { name, params } => {
            let params: Params = params.into_iter().collect();
            match router.build_path(&name, &params) {
                Ok(path) => println!("{}", path),
                Err(e) => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Watch => watch(cli.config).await?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn watch(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _guard = watcher.run()?;

    loop {
        tokio::select! {
            Some(config) = updates.recv() => match Router::from_config(&config) {
                Ok(router) => tracing::info!(routes = router.len(), "Declaration reloaded"),
                Err(e) => tracing::error!(error = %e, "Declaration rejected"),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Watcher stopped");
    Ok(())
}

fn print_route(router: &Router, route: &RouteDefinition, depth: usize) {
    let target = match route.target() {
        RouteTarget::View(handler) => format!("view {}", handler),
        RouteTarget::Redirect(to) => format!("redirect {}", to),
        RouteTarget::Group => "group".to_string(),
    };
    println!(
        "{:indent$}{:<24} {:<16} {}{}",
        "",
        route.full_pattern().to_string(),
        route.name().unwrap_or("-"),
        target,
        route.title().map(|t| format!("  ({})", t)).unwrap_or_default(),
        indent = depth * 2,
    );
    for &child in route.children() {
        print_route(router, &router.table()[child], depth + 1);
    }
}

fn describe(resolved: &ResolvedRoute<'_>) -> Value {
    json!({
        "path": resolved.path,
        "name": resolved.name(),
        "view": resolved.handler().map(|h| h.as_str()),
        "title": resolved.title(),
        "params": resolved.params,
        "query": resolved.query,
        "meta": resolved.definition.meta(),
        "matched": resolved
            .matched
            .iter()
            .map(|d| d.full_pattern().to_string())
            .collect::<Vec<_>>(),
        "redirected_from": resolved.redirected_from,
    })
}
