//! Page mount: ties a document and its hover controller to the preference
//! store so every preference change restyles the root and re-syncs the
//! modalities before `update` returns.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::accessibility::announcer::announce_section;
use crate::accessibility::hover::HoverSessionController;
use crate::dom::Document;
use crate::preferences::store::SubscriptionId;
use crate::preferences::styling::reset_legacy_letter_spacing;
use crate::preferences::{PreferenceStore, Preferences, RootStyling};

pub struct AccessiblePage {
    pub document: Document,
    pub controller: HoverSessionController,
}

pub type SharedPage = Arc<Mutex<AccessiblePage>>;

impl AccessiblePage {
    pub fn new(document: Document, controller: HoverSessionController) -> SharedPage {
        Arc::new(Mutex::new(Self {
            document,
            controller,
        }))
    }

    fn apply(&mut self, prefs: &Preferences) {
        RootStyling::from(prefs).apply(&mut self.document);
        self.controller.sync(&mut self.document, prefs);
    }

    /// Route change: tells assistive technology which section is showing.
    pub fn navigate(&mut self, title: &str, description: Option<&str>) {
        announce_section(&mut self.document, title, description);
    }
}

/// Follows every change, then applies the current preferences once.
///
/// Subscribing first means no update can fall between the snapshot and the
/// subscription. The snapshot is read under the page lock, so a delivery
/// racing with mount either lands before it (and the snapshot is at least as
/// new) or waits for it and applies the newer record last.
pub fn mount(page: &SharedPage, store: &PreferenceStore) -> SubscriptionId {
    let follower = Arc::clone(page);
    let id = store.subscribe(move |prefs| {
        follower
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(prefs);
    });

    let mut guard = page.lock().unwrap_or_else(PoisonError::into_inner);
    reset_legacy_letter_spacing(&mut guard.document);
    let current = store.snapshot();
    guard.apply(&current);
    debug!(?id, "page mounted");
    id
}

/// Stops following the store and tears every modality down.
pub fn unmount(page: &SharedPage, store: &PreferenceStore, id: SubscriptionId) {
    store.unsubscribe(id);
    let mut guard = page.lock().unwrap_or_else(PoisonError::into_inner);
    let AccessiblePage {
        document,
        controller,
    } = &mut *guard;
    controller.dispose(document);
}
