//! Walks through every loading policy on a small catalogue and prints the
//! fetches each one issues.
//!
//! ```bash
//! cargo run --example nplus1
//!
//! # See every fetch as it happens
//! FETCHGRAPH_DEBUG=true FETCHGRAPH_LOG_FORMAT=compact cargo run --example nplus1
//!
//! # Use the default policy from a config file
//! cargo run --example nplus1 -- fetchgraph.toml
//! ```

use std::sync::Arc;

use fetchgraph::prelude::*;
use fetchgraph::query::{LoadReport, expected_fetch_count};

fn catalogue() -> QueryResult<Arc<RowStore>> {
    let store = Arc::new(RowStore::new());

    let newjeans = store.insert_artist("NewJeans");
    store.insert_song("Attention", newjeans)?;
    store.insert_song("Hype Boy", newjeans)?;
    store.insert_song("Ditto", newjeans)?;

    let ive = store.insert_artist("IVE");
    store.insert_song("Eleven", ive)?;
    store.insert_song("Love Dive", ive)?;

    let aespa = store.insert_artist("aespa");
    store.insert_song("Next Level", aespa)?;

    store.insert_artist("Unreleased");

    Ok(store)
}

fn print_report(report: &LoadReport) -> QueryResult<()> {
    println!(
        "{:<12} {} fetches (expected {})",
        report.policy.to_string(),
        report.fetch_count(),
        expected_fetch_count(report.artists.len(), report.policy),
    );
    for fetch in &report.fetches {
        println!("    {} -> {} rows", fetch.kind, fetch.rows);
    }
    for artist in &report.artists {
        if artist.songs_loaded() {
            println!("    {}: {}", artist.name(), artist.song_titles()?.join(", "));
        } else {
            println!("    {}: <not loaded>", artist.name());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fetchgraph::query::init_logging();

    let store = catalogue()?;
    println!(
        "=== {} artists, {} songs ===\n",
        store.artist_count(),
        store.song_count()
    );

    let mut policies = LoadingPolicy::ALL.to_vec();
    policies.push(LoadingPolicy::batch(2)?);

    for policy in policies {
        let session = Session::open(Arc::clone(&store));
        print_report(&session.load_with_report(policy)?)?;
        println!();
    }

    println!("=== Lazy collections ===\n");
    let session = Session::open(Arc::clone(&store));
    let artists = session.load(LoadingPolicy::Lazy)?;
    println!("after load:         {} fetch", session.fetch_count());
    for artist in &artists {
        artist.songs()?;
    }
    println!("after touching all: {} fetches", session.fetch_count());

    let session = Session::open(Arc::clone(&store));
    let artists = session.load(LoadingPolicy::Lazy)?;
    session.close();
    match artists[0].songs() {
        Ok(_) => println!("unexpected: songs loaded after close"),
        Err(err) => println!("after close:\n{}", err.display_full()),
    }

    if let Some(path) = std::env::args().nth(1) {
        let config = FetchGraphConfig::from_file(&path)?;
        let session = Session::from_config(Arc::clone(&store), &config);
        println!("\n=== Default policy from {} ===\n", path);
        print_report(&session.load_with_report(session.config().default_policy)?)?;
    }

    Ok(())
}
