use super::{CorruptSnapshotPolicy, StoreConfig, StoreError, StoreResult};
use crate::model::Collection;
use crate::notify::{Notifier, SharedSnapshot, Snapshot, Subscription};
use crate::storage::{validate_key, SnapshotStorage, StorageError};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// How `Store::open` obtained its initial collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was persisted under the key.
    Fresh,
    /// The persisted snapshot was parsed successfully.
    ///
    /// When its canonical form differs from the stored text, the canonical
    /// form is written back before `open` returns.
    Restored,
    /// The persisted snapshot was corrupt and the store started empty.
    ///
    /// The corrupt payload stays in storage until the first mutation
    /// overwrites it.
    Recovered { reason: String },
}

impl LoadOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Restored => "restored",
            Self::Recovered { .. } => "recovered",
        }
    }
}

/// Single-owner holder of one collection.
///
/// Mutations take `&mut self`; observers hold `Subscription`s, which can be
/// moved to other tasks or threads.
pub struct Store<C: Collection, S: SnapshotStorage> {
    storage: S,
    key: String,
    current: SharedSnapshot<C>,
    notifier: Notifier<C>,
    load_outcome: LoadOutcome,
}

impl<C: Collection, S: SnapshotStorage> Store<C, S> {
    /// Opens a store, reading its initial state from `storage`.
    ///
    /// # Errors
    /// - `StoreError::Storage` when the key is invalid or the backend fails.
    /// - `StoreError::CorruptSnapshot` when the payload cannot be parsed and
    ///   the policy is `CorruptSnapshotPolicy::Reject`.
    pub fn open(storage: S, config: StoreConfig) -> StoreResult<Self> {
        let started_at = Instant::now();
        let key = config.resolve_key::<C>().to_string();
        validate_key(&key)?;
        info!("event=store_open module=store status=start key={key}");

        let parsed = match storage.load(&key) {
            Ok(None) => Ok(None),
            Ok(Some(payload)) if payload.trim().is_empty() => Ok(None),
            Ok(Some(payload)) => serde_json::from_str::<C>(&payload)
                .map(|items| Some((items, payload)))
                .map_err(|err| err.to_string()),
            Err(StorageError::CorruptPayload { reason, .. }) => Err(reason),
            Err(err) => {
                error!(
                    "event=store_open module=store status=error key={key} error_code=storage_load_failed error={err}"
                );
                return Err(err.into());
            }
        };

        let (items, load_outcome) = match parsed {
            Ok(None) => (C::default(), LoadOutcome::Fresh),
            Ok(Some((items, payload))) => {
                persist_normalized(&storage, &key, &items, &payload)?;
                (items, LoadOutcome::Restored)
            }
            Err(reason) => match config.corrupt_policy {
                CorruptSnapshotPolicy::Reject => {
                    error!(
                        "event=store_open module=store status=error key={key} error_code=corrupt_snapshot error={reason}"
                    );
                    return Err(StoreError::CorruptSnapshot { key, reason });
                }
                CorruptSnapshotPolicy::Reset => {
                    warn!(
                        "event=store_open module=store status=degraded key={key} error_code=corrupt_snapshot action=reset error={reason}"
                    );
                    (C::default(), LoadOutcome::Recovered { reason })
                }
            },
        };

        info!(
            "event=store_open module=store status=ok key={key} outcome={} records={} duration_ms={}",
            load_outcome.as_str(),
            items.len(),
            started_at.elapsed().as_millis()
        );

        let notifier = Notifier::new(key.clone(), config.channel_capacity);
        Ok(Self {
            storage,
            key,
            current: Arc::new(Snapshot::new(0, items)),
            notifier,
            load_outcome,
        })
    }

    /// Applies `apply` to a copy of the collection and commits it.
    ///
    /// On success the new collection is persisted, becomes current, and is
    /// published to subscribers. When `apply` or persistence fails the store
    /// is left exactly as it was and nothing is published.
    pub fn mutate<R>(
        &mut self,
        op: &str,
        apply: impl FnOnce(&mut C) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut working = self.current.items().clone();
        let output = apply(&mut working).map_err(|err| {
            debug!(
                "event=store_mutation module=store status=rejected op={op} key={} error={err}",
                self.key
            );
            err
        })?;

        let payload = serde_json::to_string(&working).map_err(StoreError::Serialize)?;
        if let Err(err) = self.storage.save(&self.key, &payload) {
            error!(
                "event=store_mutation module=store status=error op={op} key={} error_code=storage_save_failed error={err}",
                self.key
            );
            return Err(err.into());
        }

        let version = self.current.version() + 1;
        let snapshot = Arc::new(Snapshot::new(version, working));
        self.current = Arc::clone(&snapshot);
        let delivered = self.notifier.publish(snapshot);

        info!(
            "event=store_mutation module=store status=ok op={op} key={} version={version} records={} subscribers={delivered}",
            self.key,
            self.current.items().len()
        );
        Ok(output)
    }

    /// Current snapshot, shared with any subscriber that received it.
    pub fn snapshot(&self) -> SharedSnapshot<C> {
        Arc::clone(&self.current)
    }

    /// Owned copy of the current collection.
    pub fn get_all(&self) -> C {
        self.current.items().clone()
    }

    /// Borrowed view of the current collection.
    pub fn items(&self) -> &C {
        self.current.items()
    }

    pub fn version(&self) -> u64 {
        self.current.version()
    }

    pub fn subscribe(&self) -> Subscription<C> {
        self.notifier.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Rewrites a restored payload whose canonical form differs from what was
/// stored, e.g. tasks that were assigned ids while loading.
fn persist_normalized<C: Collection, S: SnapshotStorage>(
    storage: &S,
    key: &str,
    items: &C,
    stored: &str,
) -> StoreResult<()> {
    let canonical = serde_json::to_string(items).map_err(StoreError::Serialize)?;
    if canonical == stored {
        return Ok(());
    }
    storage.save(key, &canonical).map_err(|err| {
        error!(
            "event=store_open module=store status=error key={key} error_code=normalize_save_failed error={err}"
        );
        err
    })?;
    info!("event=store_open module=store status=ok key={key} action=normalized");
    Ok(())
}
