//! Speech Announcer: hover-driven text-to-speech over a shared engine.
//!
//! The engine is process-wide and singular. Every path that issues an
//! utterance cancels first, so at most one utterance is ever in flight.
//! End events are matched by utterance identity: an end event for a
//! superseded utterance is a no-op regardless of arrival order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, NodeId};

/// Class applied to the element currently being read aloud.
pub const READING_CLASS: &str = "tts-reading";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

/// Text-to-speech capability of the host. Opaque: the announcer only
/// controls its lifecycle.
pub trait SpeechEngine: Send + Sync {
    /// Hosts without speech synthesis return false; every call then becomes
    /// a no-op on the announcer side.
    fn is_available(&self) -> bool {
        true
    }
    fn submit(&self, text: &str) -> UtteranceId;
    fn cancel(&self);
    fn pause(&self);
    fn resume(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    /// `element` is `None` for manual playback of the whole content region.
    Speaking {
        element: Option<NodeId>,
        utterance: UtteranceId,
    },
}

pub struct SpeechAnnouncer {
    engine: Arc<dyn SpeechEngine>,
    state: SpeechState,
}

impl SpeechAnnouncer {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            state: SpeechState::Idle,
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn tracked_element(&self) -> Option<NodeId> {
        match self.state {
            SpeechState::Speaking { element, .. } => element,
            SpeechState::Idle => None,
        }
    }

    /// Starts reading `element` (already resolved by the locator) unless it is
    /// the element being read right now.
    pub fn hover_enter(&mut self, doc: &mut Document, element: NodeId) {
        if !self.engine.is_available() {
            debug!("speech engine unavailable, ignoring hover");
            return;
        }
        if self.tracked_element() == Some(element) {
            return;
        }
        let text = doc.inner_text(element).trim().to_string();
        if text.is_empty() {
            return;
        }

        self.silence(doc);
        doc.add_class(element, READING_CLASS);
        let utterance = self.engine.submit(&text);
        debug!(?utterance, chars = text.len(), "hover utterance submitted");
        self.state = SpeechState::Speaking {
            element: Some(element),
            utterance,
        };
    }

    /// Engine callback. Only the tracked utterance may clear tracking.
    pub fn utterance_ended(&mut self, doc: &mut Document, utterance: UtteranceId) {
        match self.state {
            SpeechState::Speaking {
                element,
                utterance: current,
            } if current == utterance => {
                if let Some(el) = element {
                    doc.remove_class(el, READING_CLASS);
                }
                self.state = SpeechState::Idle;
            }
            _ => debug!(?utterance, "stale utterance end ignored"),
        }
    }

    /// Pointer left towards `related`; stops unless it stayed inside the
    /// element being read. Manual playback is not tied to the pointer.
    pub fn hover_leave(&mut self, doc: &mut Document, related: Option<NodeId>) {
        let Some(el) = self.tracked_element() else {
            return;
        };
        if related.is_some_and(|r| doc.contains(el, r)) {
            return;
        }
        self.silence(doc);
    }

    /// Cancels unconditionally and removes any residual marker.
    pub fn teardown(&mut self, doc: &mut Document) {
        if self.engine.is_available() {
            self.engine.cancel();
        }
        if let Some(el) = self.tracked_element() {
            doc.remove_class(el, READING_CLASS);
        }
        self.state = SpeechState::Idle;
    }

    /// Manual Play: reads the whole region, replacing any hover utterance.
    pub fn play(&mut self, doc: &mut Document, region: NodeId) -> Option<UtteranceId> {
        if !self.engine.is_available() {
            return None;
        }
        self.silence(doc);
        let text = doc.inner_text(region).trim().to_string();
        if text.is_empty() {
            return None;
        }
        let utterance = self.engine.submit(&text);
        self.state = SpeechState::Speaking {
            element: None,
            utterance,
        };
        Some(utterance)
    }

    pub fn pause(&self) {
        if self.engine.is_available() {
            self.engine.pause();
        }
    }

    pub fn resume(&self) {
        if self.engine.is_available() {
            self.engine.resume();
        }
    }

    pub fn stop(&mut self, doc: &mut Document) {
        if self.engine.is_available() {
            self.silence(doc);
        }
    }

    fn silence(&mut self, doc: &mut Document) {
        self.engine.cancel();
        if let Some(el) = self.tracked_element() {
            doc.remove_class(el, READING_CLASS);
        }
        self.state = SpeechState::Idle;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum EngineCall {
        Submit(UtteranceId, String),
        Cancel,
        Pause,
        Resume,
    }

    /// Records every call; utterance ids count up from 1.
    #[derive(Default)]
    pub struct RecordingEngine {
        pub calls: Mutex<Vec<EngineCall>>,
        pub unavailable: bool,
    }

    impl RecordingEngine {
        pub fn calls(&self) -> Vec<EngineCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn submitted(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    EngineCall::Submit(_, text) => Some(text),
                    _ => None,
                })
                .collect()
        }
    }

    impl SpeechEngine for RecordingEngine {
        fn is_available(&self) -> bool {
            !self.unavailable
        }

        fn submit(&self, text: &str) -> UtteranceId {
            let mut calls = self.calls.lock().unwrap();
            let next = calls
                .iter()
                .filter(|c| matches!(c, EngineCall::Submit(..)))
                .count() as u64
                + 1;
            let id = UtteranceId(next);
            calls.push(EngineCall::Submit(id, text.to_string()));
            id
        }

        fn cancel(&self) {
            self.calls.lock().unwrap().push(EngineCall::Cancel);
        }

        fn pause(&self) {
            self.calls.lock().unwrap().push(EngineCall::Pause);
        }

        fn resume(&self) {
            self.calls.lock().unwrap().push(EngineCall::Resume);
        }
    }
}
