//! pokefetch - fetch Pokémon from PokéAPI through the resilient client.

use anyhow::{bail, Result};
use clap::Parser;
use futures::future::join_all;
use resilient_fetch::{Config, FetchClient, PokeApiClient};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Fetch Pokémon data with caching, timeouts and retries.
#[derive(Parser, Debug)]
#[command(name = "pokefetch", version, about)]
struct Cli {
    /// Pokémon names or national dex numbers
    #[arg(required_unless_present = "list")]
    names: Vec<String>,

    /// List Pokémon instead of fetching by name
    #[arg(long)]
    list: bool,

    /// Page size for --list
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Entries to skip for --list
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Retries after the first attempt (overrides FETCH_MAX_RETRIES)
    #[arg(long)]
    retries: Option<u32>,

    /// Skip the response cache
    #[arg(long)]
    no_cache: bool,

    /// Print the full JSON payload instead of a summary
    #[arg(long)]
    raw: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so stdout stays clean for results
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Using API at {}", config.base_url);

    let mut api = PokeApiClient::new(FetchClient::new(&config)).with_cache(!cli.no_cache);
    if let Some(retries) = cli.retries {
        api = api.with_retries(retries);
    }

    if cli.list {
        let page = api.list_pokemon(cli.limit, cli.offset).await?;
        for entry in &page.results {
            println!("{}\t{}", entry.name, entry.url);
        }
        info!("{} of {} shown", page.results.len(), page.count);
        return Ok(());
    }

    let raw = cli.raw;
    let results = join_all(cli.names.iter().map(|name| {
        let api = &api;
        async move {
            let line = if raw {
                api.get_pokemon_raw(name)
                    .await
                    .and_then(|value| Ok(serde_json::to_string_pretty(&value)?))
            } else {
                api.get_pokemon(name).await.map(|pokemon| pokemon.to_string())
            };
            (name, line)
        }
    }))
    .await;

    let mut failures = 0;
    for (name, result) in results {
        match result {
            Ok(line) => println!("{}", line),
            Err(e) => {
                failures += 1;
                error!("Failed to fetch {}: {}", name, e);
                eprintln!("{}: {}", name, e);
            }
        }
    }

    debug!("Metrics: {:?}", api.client().metrics().summary());

    if failures > 0 {
        bail!("{} of {} fetches failed", failures, cli.names.len());
    }

    Ok(())
}
