//! GameCollect
//!
//! Command line front end: searches the game catalog, identifies games from
//! barcodes and keeps the user's collection in a local record store.

mod args;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use args::{Cli, Command};
use gamecollect_catalog::{BarcodeResolver, MetadataClient, SearchResult, SearchSession};
use gamecollect_config::CollectConfig;
use gamecollect_library::{
    CloudSync, Game, GameCollection, Preferences, SnapshotFile, SortKey, SqliteRecordStore,
    SyncStatus,
};

/// Application state
struct App {
    config: CollectConfig,
    client: Arc<MetadataClient>,
    collection: GameCollection,
}

impl App {
    fn new(config: CollectConfig) -> Result<Self> {
        let storage = &config.storage;
        let records = SqliteRecordStore::open(storage.records_db_path())
            .context("Failed to open the record store")?;
        let sync = CloudSync::new(Arc::new(records));
        let collection = GameCollection::new(sync)
            .with_snapshot(SnapshotFile::new(storage.snapshot_path()));

        let client = Arc::new(MetadataClient::from_config(&config.catalog)?);

        Ok(Self {
            config,
            client,
            collection,
        })
    }

    /// Load from the record store, or from the snapshot when it is unreachable
    async fn open_collection(&mut self) -> Result<()> {
        if let SyncStatus::Diverged(e) = self.collection.open().await {
            warn!("Showing the on-device copy, record store unavailable: {}", e);
        }
        Ok(())
    }

    async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Platforms => self.platforms().await,
            Command::Search {
                term,
                exact,
                platform,
                metacritic,
            } => {
                let term = term.join(" ");
                let session = SearchSession::new(self.client.clone());
                if platform.is_some() {
                    session.load_platforms().await?;
                }
                session.set_metacritic_order(metacritic.map(Into::into));
                session
                    .search(&term, exact, platform.as_deref().unwrap_or_default())
                    .await;

                let shown = session.current();
                if shown.page.is_empty() {
                    println!("No games found for {:?}", term);
                } else {
                    println!("{} matches, showing {}", shown.page.count, shown.page.results.len());
                    for result in &shown.page.results {
                        print_result(result);
                    }
                }
                Ok(())
            }
            Command::Scan { upc, add } => self.scan(&upc, add).await,
            Command::Add { id } => {
                let detail = self.client.game_detail(id).await?;
                self.open_collection().await?;
                let game = Game::from_detail(detail, Utc::now());
                println!("Adding {}", game.title);
                report(self.collection.add(game).await);
                Ok(())
            }
            Command::List { sort, by_platform } => {
                self.open_collection().await?;
                match sort.map(SortKey::from) {
                    Some(SortKey::Title) => report(self.collection.sort_by_title()),
                    Some(SortKey::DateAdded) => report(self.collection.sort_by_date()),
                    None => {}
                }
                if by_platform {
                    self.list_by_platform();
                } else {
                    self.list();
                }
                Ok(())
            }
            Command::Find { text } => {
                let text = text.join(" ");
                self.open_collection().await?;
                let found = self.collection.store().search_titles(&text);
                if found.is_empty() {
                    println!("Nothing in the collection matches {:?}", text);
                }
                for game in found {
                    print_game(game);
                }
                Ok(())
            }
            Command::Remove { indices } => {
                self.open_collection().await?;
                let status = self.collection.remove_indices(&indices).await?;
                println!("{} games left", self.collection.games().len());
                report(status);
                Ok(())
            }
            Command::Wipe => {
                self.open_collection().await?;
                let report = self.collection.delete_all().await;
                println!("Deleted {} records", report.deleted.len());
                if !report.is_complete() {
                    warn!("{} records could not be deleted", report.failed.len());
                }
                Ok(())
            }
            Command::Last { id } => self.last_viewed(id).await,
        }
    }

    async fn platforms(&self) -> Result<()> {
        let platforms = self.client.list_platforms().await?;
        for platform in platforms.iter().filter(|p| !p.is_no_selection()) {
            println!("{:>6}  {}", platform.id, platform.name);
        }
        Ok(())
    }

    async fn scan(&mut self, upc: &str, add: bool) -> Result<()> {
        let resolver = BarcodeResolver::from_config(&self.config.barcode, &self.config.catalog)?;
        let found = resolver.identify(upc, &self.client).await?;

        println!("{} -> {} ({})", found.upc, found.title, found.product_title);
        if !add {
            return Ok(());
        }

        self.open_collection().await?;
        report(
            self.collection
                .add(Game::from_barcode_match(found, Utc::now()))
                .await,
        );
        Ok(())
    }

    async fn last_viewed(&self, id: Option<i64>) -> Result<()> {
        let path = self.config.storage.preferences_path();
        let mut preferences = Preferences::load(&path)?;

        let Some(id) = id.or(preferences.last_viewed_game()) else {
            println!("No game viewed yet");
            return Ok(());
        };

        let detail = self.client.game_detail(id).await?;
        println!("{} ({})", detail.name, detail.id);
        for platform in &detail.platforms {
            println!("  {}", platform.name);
        }

        preferences.set_last_viewed_game(id);
        preferences.save(&path)?;
        Ok(())
    }

    fn list(&self) {
        let games = self.collection.games();
        if games.is_empty() {
            println!("The collection is empty");
        }
        for (number, game) in games.iter().enumerate() {
            print!("{:>4}. ", number + 1);
            print_game(game);
        }
    }

    fn list_by_platform(&self) {
        for (platform, games) in self.collection.store().by_platform() {
            println!("{}", platform);
            for game in games {
                print!("  ");
                print_game(game);
            }
        }
    }
}

fn print_result(result: &SearchResult) {
    let score = result
        .metacritic
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>8}  {:<40} {:>3}  {}",
        result.id,
        result.name,
        score,
        result.platform_summary()
    );
}

fn print_game(game: &Game) {
    println!(
        "{} (#{}, added {})",
        game.title,
        game.id,
        game.date_added.format("%Y-%m-%d")
    );
}

fn report(status: SyncStatus) {
    if let SyncStatus::Diverged(e) = status {
        warn!("Saved locally, record store not updated: {}", e);
    }
}

fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let Cli { config, command } = Cli::parse();

    let config = match config {
        Some(path) => CollectConfig::load_layered(&path)?,
        None => CollectConfig::load_default()?,
    };
    info!("Data directory: {}", config.storage.data_dir.display());

    let mut app = App::new(config)?;
    app.run(command).await
}
