//! YAML resource bootstrapper, per §4.7 and §6.2.
//!
//! Loads the building's resource catalog once at startup and seeds every
//! entry into the store via `ResourceStore::define`, which is idempotent —
//! safe to re-run across restarts without disturbing in-flight leases.

use std::path::Path;

use leasebroker_storage::{ResourceDefinition, ResourceStore, ResourceType};
use serde::Deserialize;
use tracing::info;

use crate::error::BootstrapError;

/// One entry of the bootstrap YAML, in the units the file uses (seconds).
/// Field names and the bare top-level-list shape follow §6.2 exactly.
#[derive(Debug, Deserialize)]
struct RawResource {
    bldg_id: String,
    resource_id: String,
    #[serde(default = "default_resource_type")]
    #[allow(dead_code)] // only ALLOW_ONE exists; field is parsed for forward compatibility
    resource_type: i64,
    max_timeout: i64,
    default_timeout: i64,
}

fn default_resource_type() -> i64 {
    1
}

/// Parse and validate a catalog from its YAML text, without touching the
/// store. Split out from [`load`] so tests can exercise validation without
/// a filesystem.
///
/// # Errors
///
/// Returns [`BootstrapError::Parse`] if `text` is not the expected shape,
/// or [`BootstrapError::NonPositiveTimeout`] if any entry's timeout is
/// `<= 0` once converted to milliseconds.
pub fn parse(path: &str, text: &str) -> Result<Vec<ResourceDefinition>, BootstrapError> {
    let catalog: Vec<RawResource> = serde_yaml::from_str(text)
        .map_err(|e| BootstrapError::Parse { path: path.to_owned(), reason: e.to_string() })?;

    catalog
        .into_iter()
        .map(|raw| {
            let max_timeout_ms = raw.max_timeout * 1_000;
            let default_timeout_ms = raw.default_timeout * 1_000;

            if max_timeout_ms <= 0 {
                return Err(BootstrapError::NonPositiveTimeout {
                    resource_id: raw.resource_id,
                    field: "max_timeout",
                    value: raw.max_timeout,
                });
            }
            if default_timeout_ms <= 0 {
                return Err(BootstrapError::NonPositiveTimeout {
                    resource_id: raw.resource_id,
                    field: "default_timeout",
                    value: raw.default_timeout,
                });
            }

            Ok(ResourceDefinition {
                bldg_id: raw.bldg_id,
                resource_id: raw.resource_id,
                resource_type: ResourceType::AllowOne,
                max_timeout_ms,
                default_timeout_ms,
            })
        })
        .collect()
}

/// Read `path`, parse it, and seed every definition into `store`.
///
/// Aborts on the first validation failure rather than partially seeding the
/// store — a malformed catalog should fail the whole startup, not silently
/// drop entries (§4.7).
///
/// # Errors
///
/// Returns [`BootstrapError::Read`] if `path` cannot be read,
/// [`BootstrapError::Parse`]/[`BootstrapError::NonPositiveTimeout`] per
/// [`parse`], or [`BootstrapError::Seed`] if seeding a definition fails.
pub async fn load(path: &str, store: &dyn ResourceStore) -> Result<usize, BootstrapError> {
    let text = std::fs::read_to_string(Path::new(path))
        .map_err(|e| BootstrapError::Read { path: path.to_owned(), reason: e.to_string() })?;

    let definitions = parse(path, &text)?;
    let count = definitions.len();

    for definition in definitions {
        let resource_id = definition.resource_id.clone();
        store
            .define(definition)
            .await
            .map_err(|e| BootstrapError::Seed { resource_id, reason: e.to_string() })?;
    }

    info!(path, count, "seeded resource catalog");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasebroker_storage::MemoryStore;

    const CATALOG: &str = r"
- bldg_id: B1
  resource_id: elevator-1
  resource_type: 1
  max_timeout: 60
  default_timeout: 30
- bldg_id: B1
  resource_id: door-1
  resource_type: 1
  max_timeout: 120
  default_timeout: 45
";

    #[test]
    fn parse_converts_seconds_to_millis() {
        let defs = parse("catalog.yaml", CATALOG).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].max_timeout_ms, 60_000);
        assert_eq!(defs[0].default_timeout_ms, 30_000);
        assert_eq!(defs[1].max_timeout_ms, 120_000);
        assert_eq!(defs[1].default_timeout_ms, 45_000);
    }

    #[test]
    fn parse_rejects_non_positive_timeout() {
        let bad = r"
- bldg_id: B1
  resource_id: broken
  resource_type: 1
  max_timeout: 0
  default_timeout: 30
";
        let err = parse("catalog.yaml", bad).unwrap_err();
        assert!(matches!(err, BootstrapError::NonPositiveTimeout { .. }));
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        let err = parse("catalog.yaml", "not: [valid, yaml shape").unwrap_err();
        assert!(matches!(err, BootstrapError::Parse { .. }));
    }

    #[tokio::test]
    async fn load_seeds_every_entry_and_is_rerunnable() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("leasebroker-catalog-test-{}.yaml", std::process::id()));
        std::fs::write(&path, CATALOG).unwrap();

        let store = MemoryStore::new();
        let count = load(path.to_str().unwrap(), &store).await.unwrap();
        assert_eq!(count, 2);

        // re-running must not error and must not disturb existing rows.
        let count_again = load(path.to_str().unwrap(), &store).await.unwrap();
        assert_eq!(count_again, 2);

        let rows = store.list_all().await.unwrap();
        assert_eq!(rows.len(), 2);

        std::fs::remove_file(&path).ok();
    }
}
