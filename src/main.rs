//! Pricebook - browse service and price listings with offline caching
//!
//! A command-line client for a Pocket Price API deployment. Listings are
//! mirrored into a read-through cache so rendering keeps working across
//! upstream outages; a `watch` mode re-syncs on a configured interval.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pricebook::api::{PriceApiClient, ServiceSource};
use pricebook::cache::CacheManager;
use pricebook::cli::{parse_interval_arg, Cli, Command};
use pricebook::config::Settings;
use pricebook::render::{render_categories_table, ServiceBlock, TableOptions};
use pricebook::sync::{SyncConfig, SyncHandle, SyncMessage};

/// Prints rendered output, ensuring exactly one trailing newline
///
/// Tables end with a newline already; notices do not.
fn emit(out: &str) {
    if out.ends_with('\n') {
        print!("{}", out);
    } else {
        println!("{}", out);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    cli.apply_to(&mut settings);

    let api = PriceApiClient::new(settings.api_url.clone(), settings.api_key.clone());
    let cache = Arc::new(CacheManager::new(api.clone(), settings.cache_ttl_secs));

    match cli.command {
        Command::Services {
            force,
            by_category,
            descriptions,
        } => {
            if force {
                cache.get_services(true).await;
            }
            let options = TableOptions {
                show_description: descriptions,
                show_duration: true,
            };
            let block = ServiceBlock::Collection {
                group_by_category: by_category,
            };
            emit(&block.render(&cache, &options).await);
        }

        Command::Categories { force } => {
            let categories = cache.get_categories(force).await;
            emit(&render_categories_table(&categories));
        }

        Command::Service { id } => {
            let block = ServiceBlock::Single { service_id: id };
            emit(&block.render(&cache, &TableOptions::default()).await);
        }

        Command::Category { id, descriptions } => {
            let options = TableOptions {
                show_description: descriptions,
                show_duration: true,
            };
            let block = ServiceBlock::Category { category_id: id };
            emit(&block.render(&cache, &options).await);
        }

        Command::Sync => {
            let summary = cache.refresh().await;
            println!(
                "Synced {} services and {} categories",
                summary.services, summary.categories
            );
        }

        Command::Health => match api.health_check().await {
            Ok(info) => {
                let status = if info.status.is_empty() {
                    "ok".to_string()
                } else {
                    info.status
                };
                match info.version {
                    Some(version) => println!("API is healthy: {} (version {})", status, version),
                    None => println!("API is healthy: {}", status),
                }
            }
            Err(err) => {
                eprintln!("API health check failed: {}", err);
                std::process::exit(1);
            }
        },

        Command::Flush { purge } => {
            if purge {
                cache.purge().await;
                println!("Cache, fallback data and snapshots cleared");
            } else {
                cache.flush().await;
                println!("Cache cleared");
            }
        }

        Command::Watch { every } => {
            let interval = match every {
                Some(ref name) => parse_interval_arg(name)?,
                None => settings.interval(),
            };

            let summary = cache.refresh().await;
            println!(
                "Synced {} services and {} categories",
                summary.services, summary.categories
            );
            println!("Watching ({} sync); press Ctrl-C to stop", interval.as_str());

            let mut handle = SyncHandle::spawn(Arc::clone(&cache), SyncConfig::from(interval));

            loop {
                tokio::select! {
                    message = handle.receiver.recv() => {
                        match message {
                            Some(SyncMessage::SyncStarted) => {}
                            Some(SyncMessage::SyncCompleted(summary)) => {
                                println!(
                                    "Synced {} services and {} categories",
                                    summary.services, summary.categories
                                );
                            }
                            None => break,
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        break;
                    }
                }
            }

            handle.shutdown().await;
        }
    }

    Ok(())
}
