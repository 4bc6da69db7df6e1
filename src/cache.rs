use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use blake3::Hasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::category::{Category, QueryKey};
use crate::domain::session::Session;
use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};

#[derive(Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<CacheEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    key: String,
    #[serde(default)]
    owner: Option<String>,
    fetched_at: DateTime<Utc>,
    tickets: Vec<Ticket>,
}

/// Read-through cache of ticket lists keyed by `category/view`.
///
/// Entries are replaced wholesale on fetch and dropped on invalidation; a
/// cached list is never patched locally. Lists that need a session carry an
/// owner tag and are only served back to that same session.
pub struct QueryCache {
    file_path: Option<PathBuf>,
    file: CacheFile,
}

impl QueryCache {
    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            file: CacheFile::default(),
        }
    }

    pub fn load(path: PathBuf) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<CacheFile>(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "discarding unreadable cache file");
                CacheFile::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => CacheFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: Some(path),
            file,
        })
    }

    /// Cached list for `key` if it was fetched by `owner` less than `ttl` before `now`.
    pub fn get_fresh(
        &self,
        key: QueryKey,
        owner: Option<&str>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<Vec<Ticket>> {
        let key = key.as_string();
        let entry = self
            .file
            .entries
            .iter()
            .find(|entry| entry.key == key && entry.owner.as_deref() == owner)?;
        let age = now.signed_duration_since(entry.fetched_at).to_std().ok()?;
        if age < ttl {
            Some(entry.tickets.clone())
        } else {
            None
        }
    }

    pub fn insert(
        &mut self,
        key: QueryKey,
        owner: Option<String>,
        tickets: Vec<Ticket>,
        now: DateTime<Utc>,
    ) {
        let key = key.as_string();
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(CacheEntry {
            key,
            owner,
            fetched_at: now,
            tickets,
        });
    }

    pub fn invalidate(&mut self, key: QueryKey) -> bool {
        let key = key.as_string();
        let before = self.file.entries.len();
        self.file.entries.retain(|entry| entry.key != key);
        let removed = self.file.entries.len() != before;
        if removed {
            debug!(%key, "cache entry invalidated");
        }
        removed
    }

    pub fn invalidate_category(&mut self, category: Category) {
        self.invalidate(QueryKey::all(category));
        self.invalidate(QueryKey::progress(category));
    }

    /// Drops every entry, e.g. when the session ends.
    pub fn clear(&mut self) {
        if !self.file.entries.is_empty() {
            debug!(entries = self.file.entries.len(), "cache cleared");
        }
        self.file.entries.clear();
    }

    /// Owner tag for lists fetched with `session`: a hash of its cookie, or
    /// `None` when the session is not authenticated.
    pub fn owner_for(session: &Session) -> Option<String> {
        if !session.is_authenticated() {
            return None;
        }
        session.cookie.as_deref().map(short_hash)
    }

    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string(&self.file)
            .map_err(|err| AppError::Cache(format!("failed to write cache: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Cache file name for a backend, so two base URLs never share entries.
    pub fn file_name_for(base_url: &str) -> String {
        format!("cache-{}.json", short_hash(base_url.trim_end_matches('/')))
    }

    pub fn path_for(config_dir: &Path, base_url: &str) -> PathBuf {
        config_dir.join(Self::file_name_for(base_url))
    }
}

fn short_hash(value: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(value.as_bytes());
    hasher.finalize().to_hex().as_str()[..16].to_string()
}
