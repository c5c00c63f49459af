use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use furi::{config::RouteTable, AppState, Expandable, UriParameters};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

fn cli() -> Command {
    Command::new("furi")
        .about("URI template matching and expansion")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG")
                .global(true)
                .help("Path to a YAML file containing route declarations"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a path against the registered routes")
                .arg(Arg::new("path").required(true))
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Print every matching route, most specific first"),
                ),
        )
        .subcommand(
            Command::new("expand")
                .about("Expand a template with name=value parameters")
                .arg(Arg::new("template").required(true))
                .arg(Arg::new("params").num_args(0..).value_name("NAME=VALUE")),
        )
        .subcommand(Command::new("routes").about("List registered routes in precedence order"))
        .subcommand(
            Command::new("serve")
                .about("Serve the dispatch API over HTTP")
                .arg(
                    Arg::new("bind")
                        .short('b')
                        .long("bind")
                        .value_name("ADDR")
                        .default_value(DEFAULT_BIND),
                ),
        )
}

fn parse_params<'a>(pairs: impl Iterator<Item = &'a String>) -> Result<UriParameters> {
    let mut params = UriParameters::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("Expected NAME=VALUE but got '{}'", pair);
        };
        params.add(name, value);
    }
    Ok(params)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("furi=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = matches.get_one::<String>("config").map(PathBuf::from);

    match matches.subcommand() {
        Some(("resolve", sub)) => resolve(config.as_deref(), sub),
        Some(("expand", sub)) => expand(sub),
        Some(("routes", _)) => routes(config.as_deref()),
        Some(("serve", sub)) => serve(config, sub).await,
        _ => unreachable!("subcommand is required"),
    }
}

fn resolve(config: Option<&Path>, matches: &ArgMatches) -> Result<()> {
    let registry = RouteTable::load(config)?;
    let path = matches
        .get_one::<String>("path")
        .context("missing path argument")?;

    let output = if matches.get_flag("all") {
        serde_json::to_string_pretty(&registry.resolve_all(path))?
    } else {
        match registry.resolve(path) {
            Some(resolution) => serde_json::to_string_pretty(&resolution)?,
            None => bail!("No route for '{}'", path),
        }
    };

    println!("{}", output);
    Ok(())
}

fn expand(matches: &ArgMatches) -> Result<()> {
    let pattern = matches
        .get_one::<String>("template")
        .context("missing template argument")?;
    let params = parse_params(matches.get_many::<String>("params").unwrap_or_default())?;

    let template = furi::compile(pattern)?;
    println!("{}", template.expand(&params));
    Ok(())
}

fn routes(config: Option<&Path>) -> Result<()> {
    let registry = RouteTable::load(config)?;
    for route in registry.routes() {
        match &route.home_of {
            Some(home) => println!("{:<40} {} (home of {})", route.pattern, route.service, home),
            None => println!("{:<40} {}", route.pattern, route.service),
        }
    }
    Ok(())
}

async fn serve(config: Option<PathBuf>, matches: &ArgMatches) -> Result<()> {
    let bind = matches
        .get_one::<String>("bind")
        .map(String::as_str)
        .unwrap_or(DEFAULT_BIND);

    let config_path = config.unwrap_or_else(|| PathBuf::from(furi::config::DEFAULT_CONFIG_FILE));
    let registry = RouteTable::load(Some(&config_path))?;
    let state = Arc::new(AppState::new(registry, Some(config_path)));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Could not bind {}", bind))?;
    tracing::info!(addr = %bind, "Listening");

    axum::serve(listener, furi::create_router(state))
        .await
        .context("Server error")
}
