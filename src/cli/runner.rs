//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{check_connection, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport};
use crate::output::{JsonLinesSink, ParquetSink, ParquetWriterConfig, RecordSink};
use crate::pagination::PaginationConfig;
use crate::state::StateManager;
use crate::stream::{woo, Catalog, Registry, Selection};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Discover => self.discover(),
            Commands::Sync => self.sync().await,
            Commands::Check => self.check().await,
            Commands::Streams => self.streams(),
        }
    }

    /// Load the config file named by `--config`
    fn load_config(&self) -> Result<TapConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use --config)"))?;
        let mut config = TapConfig::load(path)?;
        if let Some(streams) = self.cli.stream_list() {
            config.streams = Some(streams);
        }
        Ok(config)
    }

    fn select(registry: &Registry, config: &TapConfig) -> Result<Selection> {
        registry.select(&config.selected_streams())
    }

    fn transport(config: &TapConfig) -> Result<Arc<dyn Transport>> {
        let client = HttpClient::with_auth(config.http_client_config(), config.auth_config())?;
        Ok(Arc::new(client))
    }

    /// Print the catalog; works without a config file
    fn discover(&self) -> Result<()> {
        let (registry, selection) = if self.cli.config.is_some() {
            let config = self.load_config()?;
            let registry = config.registry()?;
            let selection = Self::select(&registry, &config)?;
            (registry, selection)
        } else {
            let registry = woo::registry(&PaginationConfig::default(), &BTreeMap::new())?;
            let names = self
                .cli
                .stream_list()
                .unwrap_or_else(|| woo::DEFAULT_STREAMS.iter().map(ToString::to_string).collect());
            let selection = registry.select(&names)?;
            (registry, selection)
        };

        let catalog = Catalog::from_registry(&registry, &selection);
        output_message(&serde_json::to_value(&catalog)?);
        Ok(())
    }

    fn streams(&self) -> Result<()> {
        let registry = woo::registry(&PaginationConfig::default(), &BTreeMap::new())?;
        output_message(&json!({
            "type": "STREAMS",
            "streams": registry.names(),
            "default": woo::DEFAULT_STREAMS,
        }));
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let registry = config.registry()?;
        let selection = Self::select(&registry, &config)?;

        let stream = registry
            .roots()
            .into_iter()
            .find(|s| selection.is_walked(s.name()))
            .ok_or_else(|| Error::config("No stream selected to check against"))?;

        info!("Checking connection to {}", config.base_url());
        let transport = Self::transport(&config)?;

        match check_connection(transport.as_ref(), stream.as_ref()).await {
            Ok(()) => {
                output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "SUCCEEDED",
                }));
                Ok(())
            }
            Err(e) => {
                output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "status": "FAILED",
                    "message": e.to_string(),
                }));
                Err(e)
            }
        }
    }

    async fn sync(&self) -> Result<()> {
        let config = self.load_config()?;
        let registry = config.registry()?;
        let selection = Self::select(&registry, &config)?;

        let state = match &self.cli.state {
            Some(path) => StateManager::from_file(path)?,
            None => StateManager::in_memory(),
        };

        let sink: Box<dyn RecordSink> = match self.cli.format {
            OutputFormat::Json => Box::new(JsonLinesSink::stdout()),
            OutputFormat::Parquet => {
                let dir = self.cli.output.as_ref().ok_or_else(|| {
                    Error::config("Parquet output needs a directory (use --output)")
                })?;
                Box::new(ParquetSink::new(dir, ParquetWriterConfig::default())?)
            }
        };

        info!(
            "Syncing {} from {}",
            selection.selected().collect::<Vec<_>>().join(", "),
            config.base_url()
        );

        let mut engine = SyncEngine::new(Self::transport(&config)?, registry, state, sink)
            .with_config(config.sync_config()?);
        let stats = engine.sync_all(&selection).await?;

        info!(
            "Synced {} records ({} read) over {} pages in {}ms",
            stats.records_emitted, stats.records_read, stats.pages_fetched, stats.duration_ms
        );
        Ok(())
    }
}

/// Print one JSON message on stdout
fn output_message(msg: &Value) {
    println!("{msg}");
}
