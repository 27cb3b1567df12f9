//! Accessibility Preference Store: the single process-wide preference record.
//!
//! Read once from storage at construction, written through on every change,
//! and broadcast to subscribers synchronously. Storage failures never reach
//! callers: the in-memory record stays authoritative for the session.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::preferences::models::{
    Preferences, PreferencesPatch, ReadingPatch, ReadingSettings, Theme,
};
use crate::preferences::storage::KeyValueStorage;

pub const CONTRAST_KEY: &str = "a11y:contrast";
pub const TTS_KEY: &str = "a11y:tts";
pub const TTS_HOVER_KEY: &str = "a11y:ttsHover";
pub const SIGN_HOVER_KEY: &str = "a11y:signHover";
pub const CVD_KEY: &str = "a11y:cvd";
pub const READ_EASY_KEY: &str = "a11y:readease";
pub const READING_SETTINGS_KEY: &str = "a11y:readease-settings";
pub const THEME_KEY: &str = "theme";
/// Obsolete letter-spacing key from before reading mode existed.
const LEGACY_LETTER_KEY: &str = "a11y:letter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(Uuid);

type Subscriber = Arc<dyn Fn(&Preferences) + Send + Sync>;

pub struct PreferenceStore {
    storage: Box<dyn KeyValueStorage>,
    data: RwLock<Preferences>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    /// Held from the write through the last subscriber call, so deliveries
    /// arrive in mutation order and the final one carries the current record.
    dispatch: Mutex<()>,
}

impl PreferenceStore {
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let defaults = Preferences::default();
        let read_bool = |key: &str, default: bool| match read(storage.as_ref(), key) {
            Some(raw) => raw == "1",
            None => default,
        };

        let reading = read(storage.as_ref(), READING_SETTINGS_KEY)
            .and_then(|raw| match serde_json::from_str::<ReadingSettings>(&raw) {
                Ok(settings) => Some(settings.clamped()),
                Err(e) => {
                    warn!("Corrupt reading settings, using defaults: {e}");
                    None
                }
            })
            .unwrap_or_default();

        let theme = read(storage.as_ref(), THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default();

        let data = Preferences {
            contrast: read_bool(CONTRAST_KEY, defaults.contrast),
            tts: read_bool(TTS_KEY, defaults.tts),
            tts_hover: read_bool(TTS_HOVER_KEY, defaults.tts_hover),
            sign_hover: read_bool(SIGN_HOVER_KEY, defaults.sign_hover),
            cvd: read_bool(CVD_KEY, defaults.cvd),
            theme,
            read_easy: read_bool(READ_EASY_KEY, defaults.read_easy),
            reading,
        };

        if let Err(e) = storage.remove(LEGACY_LETTER_KEY) {
            warn!("Failed to remove legacy key {LEGACY_LETTER_KEY}: {e}");
        }
        debug!(?data, "preferences loaded");

        Self {
            storage,
            data: RwLock::new(data),
            subscribers: Mutex::new(Vec::new()),
            dispatch: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Preferences {
        *self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, patch: PreferencesPatch) -> Preferences {
        self.mutate(|current| patch.apply(current))
    }

    pub fn update_reading(&self, patch: ReadingPatch) -> Preferences {
        self.mutate(|current| Preferences {
            reading: patch.apply(current.reading),
            ..*current
        })
    }

    pub fn reset_reading(&self) -> Preferences {
        self.mutate(|current| Preferences {
            reading: ReadingSettings::default(),
            ..*current
        })
    }

    /// Registers `callback`; it runs after every mutation with the new record.
    /// Callbacks may read the store and unsubscribe, but must not mutate it:
    /// a nested `update` would wait on the delivery that is running it.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Preferences) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn mutate(&self, f: impl FnOnce(&Preferences) -> Preferences) -> Preferences {
        let _dispatch = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        let (before, after) = {
            let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
            let before = *guard;
            let after = f(&before);
            *guard = after;
            self.persist(&before, &after);
            (before, after)
        };
        if before != after {
            self.notify(&after);
        }
        after
    }

    /// Writes every key whose value changed.
    fn persist(&self, before: &Preferences, after: &Preferences) {
        let flags = [
            (CONTRAST_KEY, before.contrast, after.contrast),
            (TTS_KEY, before.tts, after.tts),
            (TTS_HOVER_KEY, before.tts_hover, after.tts_hover),
            (SIGN_HOVER_KEY, before.sign_hover, after.sign_hover),
            (CVD_KEY, before.cvd, after.cvd),
            (READ_EASY_KEY, before.read_easy, after.read_easy),
        ];
        for (key, old, new) in flags {
            if old != new {
                self.write(key, if new { "1" } else { "0" });
            }
        }
        if before.theme != after.theme {
            self.write(THEME_KEY, after.theme.as_str());
        }
        if before.reading != after.reading {
            match serde_json::to_string(&after.reading) {
                Ok(json) => self.write(READING_SETTINGS_KEY, &json),
                Err(e) => warn!("Failed to encode reading settings: {e}"),
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!("Failed to persist {key}: {e}");
        }
    }

    /// Subscribers run outside the data and subscriber locks so they may read
    /// or unsubscribe from inside the callback.
    fn notify(&self, snapshot: &Preferences) {
        let subs: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        for sub in subs {
            sub(snapshot);
        }
    }
}

fn read(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read {key}, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::preferences::storage::{FileStorage, MemoryStorage, StorageError};

    struct BrokenStorage;
    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn remove(&self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn test_empty_storage_loads_defaults() {
        let store = PreferenceStore::load(Box::new(MemoryStorage::default()));
        assert_eq!(store.snapshot(), Preferences::default());
        assert!(store.snapshot().read_easy);
    }

    #[test]
    fn test_string_encoded_flags_are_read() {
        let storage = MemoryStorage::with_entries([
            (CONTRAST_KEY, "1"),
            (TTS_KEY, "1"),
            (SIGN_HOVER_KEY, "0"),
            (READ_EASY_KEY, "0"),
            (THEME_KEY, "dark"),
        ]);
        let prefs = PreferenceStore::load(Box::new(storage)).snapshot();
        assert!(prefs.contrast && prefs.tts);
        assert!(!prefs.sign_hover);
        assert!(!prefs.read_easy);
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_corrupt_values_fall_back_to_defaults() {
        let storage = MemoryStorage::with_entries([
            (READING_SETTINGS_KEY, "{fontSize:"),
            (THEME_KEY, "neon"),
            (TTS_KEY, "yes"),
        ]);
        let prefs = PreferenceStore::load(Box::new(storage)).snapshot();
        assert_eq!(prefs.reading, ReadingSettings::default());
        assert_eq!(prefs.theme, Theme::System);
        assert!(!prefs.tts);
    }

    #[test]
    fn test_stored_reading_settings_are_clamped() {
        let storage =
            MemoryStorage::with_entries([(READING_SETTINGS_KEY, r#"{"fontSize":500}"#)]);
        let prefs = PreferenceStore::load(Box::new(storage)).snapshot();
        assert_eq!(prefs.reading.font_size, 150.0);
    }

    #[test]
    fn test_reading_mode_survives_reload_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = PreferenceStore::load(Box::new(FileStorage::open(&path)));
        store.update_reading(ReadingPatch {
            font_size: Some(120.0),
            ..Default::default()
        });
        drop(store);

        let reloaded = PreferenceStore::load(Box::new(FileStorage::open(&path)));
        assert_eq!(reloaded.snapshot().reading.font_size, 120.0);

        reloaded.reset_reading();
        assert_eq!(reloaded.snapshot().reading.font_size, 100.0);
        let again = PreferenceStore::load(Box::new(FileStorage::open(&path)));
        assert_eq!(again.snapshot().reading.font_size, 100.0);
    }

    #[test]
    fn test_toggles_are_written_as_zero_or_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = PreferenceStore::load(Box::new(FileStorage::open(&path)));
        store.update(PreferencesPatch {
            tts_hover: Some(true),
            ..Default::default()
        });
        let storage = FileStorage::open(&path);
        assert_eq!(storage.get(TTS_HOVER_KEY).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_legacy_letter_key_removed_on_load() {
        let storage = Arc::new(MemoryStorage::with_entries([(LEGACY_LETTER_KEY, "0.1")]));
        struct Shared(Arc<MemoryStorage>);
        impl KeyValueStorage for Shared {
            fn get(&self, k: &str) -> Result<Option<String>, StorageError> {
                self.0.get(k)
            }
            fn set(&self, k: &str, v: &str) -> Result<(), StorageError> {
                self.0.set(k, v)
            }
            fn remove(&self, k: &str) -> Result<(), StorageError> {
                self.0.remove(k)
            }
        }
        let _store = PreferenceStore::load(Box::new(Shared(storage.clone())));
        assert_eq!(storage.get(LEGACY_LETTER_KEY).unwrap(), None);
    }

    #[test]
    fn test_broken_storage_keeps_working_in_memory() {
        let store = PreferenceStore::load(Box::new(BrokenStorage));
        assert_eq!(store.snapshot(), Preferences::default());
        let next = store.update(PreferencesPatch {
            cvd: Some(true),
            ..Default::default()
        });
        assert!(next.cvd);
        assert!(store.snapshot().cvd);
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let store = PreferenceStore::load(Box::new(MemoryStorage::default()));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let id = store.subscribe(move |prefs| {
            assert!(prefs.contrast);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let patch = PreferencesPatch {
            contrast: Some(true),
            ..Default::default()
        };
        store.update(patch);
        store.update(patch);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_concurrent_updates_deliver_in_mutation_order() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let store = Arc::new(PreferenceStore::load(Box::new(MemoryStorage::default())));
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let release_rx = Mutex::new(release_rx);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |prefs| {
            if prefs.contrast {
                entered_tx.lock().unwrap().send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
            sink.lock().unwrap().push(prefs.contrast);
        });

        let first = {
            let store = store.clone();
            thread::spawn(move || {
                store.update(PreferencesPatch {
                    contrast: Some(true),
                    ..Default::default()
                });
            })
        };
        entered_rx.recv().unwrap();

        let second = {
            let store = store.clone();
            thread::spawn(move || {
                store.update(PreferencesPatch {
                    contrast: Some(false),
                    ..Default::default()
                });
            })
        };
        // Give the second writer time to reach the store while the first
        // delivery is still running.
        thread::sleep(Duration::from_millis(50));
        release_tx.send(()).unwrap();
        first.join().unwrap();
        second.join().unwrap();

        assert!(!store.snapshot().contrast);
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_subscriber_may_read_store_during_notify() {
        let store = Arc::new(PreferenceStore::load(Box::new(MemoryStorage::default())));
        let inner = Arc::clone(&store);
        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();
        store.subscribe(move |_| {
            *sink.lock().unwrap() = Some(inner.snapshot().sign_hover);
        });
        store.update(PreferencesPatch {
            sign_hover: Some(true),
            ..Default::default()
        });
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }
}
