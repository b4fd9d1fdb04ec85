use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};

use super::loader;
use super::model::{Boat, BoatCollection, PricePoint};
use crate::config::AppConfig;
use crate::error::{Result, SourceError};

// ---------------------------------------------------------------------------
// Record source contract
// ---------------------------------------------------------------------------

/// Read-only provider of listing records. Shared with worker threads for
/// background fetches.
pub trait RecordSource: Send + Sync {
    /// Short human-readable description for the status bar.
    fn describe(&self) -> String;

    /// All listings, most recently seen first.
    fn fetch_boats(&self) -> Result<Vec<Boat>>;

    /// Recorded prices of one listing, oldest first.
    fn price_history(&self, boat_id: &str) -> Result<Vec<PricePoint>>;
}

/// Fetch all listings, turning any failure into an empty collection.
pub fn load_or_empty(source: &dyn RecordSource) -> BoatCollection {
    log::info!("Fetching boats from {}...", source.describe());
    match source.fetch_boats() {
        Ok(boats) => {
            log::info!("Fetched {} boats successfully.", boats.len());
            BoatCollection::new(boats)
        }
        Err(e) => {
            log::error!("Error fetching boats: {e}");
            BoatCollection::default()
        }
    }
}

/// Price history of one listing, empty on failure.
pub fn history_or_empty(source: &dyn RecordSource, boat_id: &str) -> Vec<PricePoint> {
    source.price_history(boat_id).unwrap_or_else(|e| {
        log::error!("Error fetching history for {boat_id}: {e}");
        Vec::new()
    })
}

/// Pick the source the configuration points at: the backend when fully
/// configured, otherwise a local data file, otherwise nothing.
pub fn source_from_config(config: &AppConfig) -> Result<Option<Arc<dyn RecordSource>>> {
    if let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) {
        let source = SupabaseSource::new(url, key, config.http_timeout)?;
        return Ok(Some(Arc::new(source)));
    }
    if let Some(path) = &config.data_file {
        return Ok(Some(Arc::new(FileSource::new(path.clone()))));
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Supabase (PostgREST) backend
// ---------------------------------------------------------------------------

pub struct SupabaseSource {
    base_url: String,
    api_key: String,
    client: Client,
}

impl SupabaseSource {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() || api_key.is_empty() {
            return Err(SourceError::NotConfigured(
                "both URL and API key are required".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table(&self, name: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/rest/v1/{name}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn boats_request(&self) -> RequestBuilder {
        self.table("boats")
            .query(&[("select", "*"), ("order", "last_seen_at.desc")])
    }

    fn history_request(&self, boat_id: &str) -> RequestBuilder {
        self.table("price_history").query(&[
            ("select", "*".to_string()),
            ("boat_id", format!("eq.{boat_id}")),
            ("order", "recorded_at.asc".to_string()),
        ])
    }
}

impl RecordSource for SupabaseSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch_boats(&self) -> Result<Vec<Boat>> {
        let body = self.boats_request().send()?.error_for_status()?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn price_history(&self, boat_id: &str) -> Result<Vec<PricePoint>> {
        let body = self.history_request(boat_id).send()?.error_for_status()?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

// ---------------------------------------------------------------------------
// Local snapshot file
// ---------------------------------------------------------------------------

/// A `.json`, `.csv` or `.parquet` snapshot of the listings table.
/// Snapshots carry no price history.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_boats(&self) -> Result<Vec<Boat>> {
        Ok(loader::load_file(&self.path)?)
    }

    fn price_history(&self, _boat_id: &str) -> Result<Vec<PricePoint>> {
        Ok(Vec::new())
    }
}
