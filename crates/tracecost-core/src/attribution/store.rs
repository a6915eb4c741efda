//! Local entity attribution store.
//!
//! Primary backend is a prebuilt SQLite index with schema
//! `entities(address PK, entity, category, source, confidence DEFAULT
//! 'confirmed')`. When the index file is absent, a structured JSON document
//! of entities grouped by category is loaded into memory instead. A missing
//! or unreadable store never fails the pipeline: it degrades to an empty
//! store with a logged warning.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::types::{AttributionConfidence, AttributionResult, AttributionSource};

/// Maps the JSON document's category group keys to normalized categories.
fn normalize_category(group: &str) -> &str {
    match group {
        "exchanges" => "exchange",
        "mining_pools" => "mining_pool",
        "services" => "service",
        "notable" => "notable",
        other => other,
    }
}

// ==============================================================================
// Entity Store
// ==============================================================================

/// Tier-1 address attribution: a single keyed lookup, no I/O beyond local
/// disk, no rate limit. Constructed once and passed by reference.
pub struct EntityStore {
    backend: Backend,
}

enum Backend {
    /// Prebuilt index; lookups are single primary-key reads. The connection
    /// sits behind a mutex because `rusqlite::Connection` is not `Sync`; the
    /// critical section never awaits.
    Sqlite(Mutex<Connection>),
    /// In-memory fallback: address → (entity, category).
    Memory(HashMap<String, (String, String)>),
}

impl EntityStore {
    /// Open the store, preferring the SQLite index at `db_path` and falling
    /// back to the JSON document at `json_path`. Never errors: any missing
    /// or unreadable backend yields an empty store.
    pub fn open(db_path: &Path, json_path: &Path) -> Self {
        if db_path.exists() {
            match Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY) {
                Ok(conn) => {
                    info!(path = %db_path.display(), "loaded entity index");
                    return Self {
                        backend: Backend::Sqlite(Mutex::new(conn)),
                    };
                }
                Err(err) => {
                    warn!(path = %db_path.display(), error = %err, "entity index unreadable");
                }
            }
        }

        match load_json_fallback(json_path) {
            Ok(entries) => {
                info!(
                    path = %json_path.display(),
                    entries = entries.len(),
                    "entity index not found, loaded JSON fallback"
                );
                Self {
                    backend: Backend::Memory(entries),
                }
            }
            Err(err) => {
                warn!(
                    path = %json_path.display(),
                    error = %err,
                    "no entity data available, attribution tier 1 will be empty"
                );
                Self::empty()
            }
        }
    }

    /// A store with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self {
            backend: Backend::Memory(HashMap::new()),
        }
    }

    /// Look up an address. `None` when unknown (or on a backend error, which
    /// is logged and treated as a miss).
    pub fn lookup(&self, address: &str) -> Option<AttributionResult> {
        match &self.backend {
            Backend::Sqlite(conn) => {
                let conn = conn.lock().expect("entity store mutex is never poisoned");
                match query_index(&conn, address) {
                    Ok(row) => row.map(|(entity, category, confidence)| AttributionResult {
                        address: address.to_owned(),
                        entity,
                        source: AttributionSource::Local,
                        category: category.unwrap_or_default(),
                        confidence: AttributionConfidence::from_store_tag(
                            confidence.as_deref().unwrap_or("confirmed"),
                        ),
                    }),
                    Err(err) => {
                        debug!(%address, error = %err, "entity index query failed");
                        None
                    }
                }
            }
            Backend::Memory(entries) => {
                entries
                    .get(address)
                    .map(|(entity, category)| AttributionResult {
                        address: address.to_owned(),
                        entity: entity.clone(),
                        source: AttributionSource::Local,
                        category: category.clone(),
                        confidence: AttributionConfidence::Confirmed,
                    })
            }
        }
    }

    /// Build an in-memory store directly from entries, for tests.
    #[cfg(test)]
    pub(crate) fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, (String, String))>,
    {
        Self {
            backend: Backend::Memory(entries.into_iter().collect()),
        }
    }
}

fn query_index(
    conn: &Connection,
    address: &str,
) -> Result<Option<(String, Option<String>, Option<String>)>, CoreError> {
    let row = conn
        .prepare_cached("SELECT entity, category, confidence FROM entities WHERE address = ?1")?
        .query_row([address], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()?;
    Ok(row)
}

// ==============================================================================
// JSON Fallback
// ==============================================================================

#[derive(Deserialize)]
struct EntitiesFile {
    #[serde(default)]
    entities: HashMap<String, HashMap<String, EntityRecord>>,
}

#[derive(Deserialize)]
struct EntityRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    known_addresses: Vec<String>,
}

/// Load the structured JSON document: top-level category groups, each a map
/// of entities carrying a display name and known addresses.
fn load_json_fallback(path: &Path) -> Result<HashMap<String, (String, String)>, CoreError> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: EntitiesFile = serde_json::from_str(&raw)
        .map_err(|err| CoreError::InvalidEntityData(err.to_string()))?;

    let mut entries = HashMap::new();
    for (group, group_entries) in parsed.entities {
        let category = normalize_category(&group).to_owned();
        for record in group_entries.into_values() {
            let name = record.name.unwrap_or_else(|| "Unknown".to_owned());
            for address in record.known_addresses {
                entries.insert(address, (name.clone(), category.clone()));
            }
        }
    }
    Ok(entries)
}
