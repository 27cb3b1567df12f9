// Accessibility Preference Store
// Persisted toggles and reading-mode typography, observer subscriptions, and the
// styling projection applied to the document root.

pub mod handlers;
pub mod models;
pub mod storage;
pub mod store;
pub mod styling;

pub use models::{Preferences, PreferencesPatch, ReadingPatch, ReadingSettings, Theme};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::PreferenceStore;
pub use styling::RootStyling;
