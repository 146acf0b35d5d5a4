use serde::de::DeserializeOwned;
use tracing::warn;

use storage::{KeyValueStore, Snapshot, StorageError, load_json};

/// Load `key`, falling back to the default for a missing or malformed snapshot.
pub(crate) async fn load_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<T, StorageError> {
    match load_json(store, key).await? {
        Snapshot::Parsed(value) => Ok(value),
        Snapshot::Missing => Ok(T::default()),
        Snapshot::Malformed(reason) => {
            warn!(key, %reason, "discarding malformed snapshot");
            Ok(T::default())
        }
    }
}
