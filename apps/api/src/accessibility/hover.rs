//! Hover Session Controller: binds pointer listeners to the content region
//! and drives the speech and fingerspelling modalities.
//!
//! Invariants:
//! - listeners exist only while their modality is enabled;
//! - at most one element carries each modality's marker;
//! - one overlay panel node per sign session, created on first render and
//!   released on teardown;
//! - disabling a modality cancels speech and hides the overlay before it returns.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::accessibility::announcer::announce_status;
use crate::accessibility::fingerspell::{bounded_text, materialize, render, GlyphMetrics};
use crate::accessibility::glyphs::GlyphSource;
use crate::accessibility::locator::{locate, ReadablePredicate, TagTextPredicate};
use crate::accessibility::placement::{place, Point};
use crate::accessibility::speech::{SpeechAnnouncer, SpeechEngine, SpeechState, UtteranceId};
use crate::dom::{Document, ListenerId, ListenerKind, NodeId};
use crate::preferences::Preferences;

/// Class applied to the element currently fingerspelled.
pub const SIGN_CLASS: &str = "sign-reading";
pub const OVERLAY_ID: &str = "asl-hover-overlay";
pub const OVERLAY_CLASS: &str = "asl-overlay";
pub const DEFAULT_REGION_ID: &str = "main";

const PLAYBACK_STATUS: &str = "Reading page content";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    /// `mouseover`: pointer entered `target`.
    Over,
    /// `mousemove` inside the region.
    Move,
    /// `mouseleave`: pointer left towards `related_target`.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: NodeId,
    pub related_target: Option<NodeId>,
    pub client: Point,
}

impl PointerEvent {
    pub fn over(target: NodeId, client: Point) -> Self {
        Self {
            kind: PointerEventKind::Over,
            target,
            related_target: None,
            client,
        }
    }

    pub fn moved(target: NodeId, client: Point) -> Self {
        Self {
            kind: PointerEventKind::Move,
            target,
            related_target: None,
            client,
        }
    }

    pub fn leave(target: NodeId, related_target: Option<NodeId>, client: Point) -> Self {
        Self {
            kind: PointerEventKind::Leave,
            target,
            related_target,
            client,
        }
    }
}

#[derive(Debug)]
struct Binding {
    region: NodeId,
    listeners: Vec<ListenerId>,
}

impl Binding {
    fn attach(doc: &mut Document, region: NodeId, kinds: &[ListenerKind]) -> Self {
        let listeners = kinds
            .iter()
            .map(|kind| doc.add_event_listener(region, *kind))
            .collect();
        Self { region, listeners }
    }

    fn detach(self, doc: &mut Document) {
        for id in self.listeners {
            doc.remove_event_listener(id);
        }
    }
}

#[derive(Debug, Default)]
struct SignSession {
    active: Option<NodeId>,
    panel: Option<NodeId>,
}

pub struct HoverSessionController {
    region_id: String,
    predicate: Box<dyn ReadablePredicate>,
    glyphs: Arc<dyn GlyphSource>,
    metrics: GlyphMetrics,
    speech: SpeechAnnouncer,
    tts_enabled: bool,
    speech_binding: Option<Binding>,
    sign_binding: Option<Binding>,
    sign: SignSession,
}

impl HoverSessionController {
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        glyphs: Arc<dyn GlyphSource>,
        region_id: impl Into<String>,
    ) -> Self {
        Self {
            region_id: region_id.into(),
            predicate: Box::new(TagTextPredicate),
            glyphs,
            metrics: GlyphMetrics::default(),
            speech: SpeechAnnouncer::new(engine),
            tts_enabled: false,
            speech_binding: None,
            sign_binding: None,
            sign: SignSession::default(),
        }
    }

    pub fn with_predicate(mut self, predicate: Box<dyn ReadablePredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_metrics(mut self, metrics: GlyphMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn is_speech_bound(&self) -> bool {
        self.speech_binding.is_some()
    }

    pub fn is_sign_bound(&self) -> bool {
        self.sign_binding.is_some()
    }

    pub fn speech_state(&self) -> SpeechState {
        self.speech.state()
    }

    pub fn sign_target(&self) -> Option<NodeId> {
        self.sign.active
    }

    pub fn overlay_panel(&self) -> Option<NodeId> {
        self.sign.panel
    }

    // ── Preference-driven transitions ───────────────────────────────────────

    /// Brings both modalities in line with `prefs`.
    pub fn sync(&mut self, doc: &mut Document, prefs: &Preferences) {
        if self.tts_enabled && !prefs.tts {
            self.speech.teardown(doc);
        }
        self.tts_enabled = prefs.tts;

        if prefs.speech_hover_active() {
            self.enable_speech(doc);
        } else {
            self.disable_speech(doc);
        }

        if prefs.sign_hover {
            self.enable_sign(doc);
        } else {
            self.disable_sign(doc);
        }
    }

    /// Returns false when the content region is missing; the modality then
    /// stays inactive.
    pub fn enable_speech(&mut self, doc: &mut Document) -> bool {
        if self.speech_binding.is_some() {
            return true;
        }
        let Some(region) = doc.get_element_by_id(&self.region_id) else {
            debug!(region = %self.region_id, "content region missing, hover speech inactive");
            return false;
        };
        self.speech_binding = Some(Binding::attach(
            doc,
            region,
            &[ListenerKind::MouseOver, ListenerKind::MouseLeave],
        ));
        debug!("hover speech enabled");
        true
    }

    pub fn disable_speech(&mut self, doc: &mut Document) {
        let Some(binding) = self.speech_binding.take() else {
            return;
        };
        binding.detach(doc);
        self.speech.teardown(doc);
        debug!("hover speech disabled");
    }

    pub fn enable_sign(&mut self, doc: &mut Document) -> bool {
        if self.sign_binding.is_some() {
            return true;
        }
        let Some(region) = doc.get_element_by_id(&self.region_id) else {
            debug!(region = %self.region_id, "content region missing, hover signing inactive");
            return false;
        };
        self.sign_binding = Some(Binding::attach(
            doc,
            region,
            &[
                ListenerKind::MouseOver,
                ListenerKind::MouseMove,
                ListenerKind::MouseLeave,
            ],
        ));
        debug!("hover signing enabled");
        true
    }

    pub fn disable_sign(&mut self, doc: &mut Document) {
        let Some(binding) = self.sign_binding.take() else {
            return;
        };
        binding.detach(doc);
        self.clear_overlay(doc);
        if let Some(panel) = self.sign.panel.take() {
            doc.remove(panel);
        }
        for stray in doc.elements_with_class(SIGN_CLASS) {
            doc.remove_class(stray, SIGN_CLASS);
        }
        debug!("hover signing disabled");
    }

    /// Controller going away: both modalities down, no audio, no nodes left.
    pub fn dispose(&mut self, doc: &mut Document) {
        self.disable_speech(doc);
        self.disable_sign(doc);
        self.speech.teardown(doc);
    }

    // ── Events ──────────────────────────────────────────────────────────────

    pub fn handle_pointer(&mut self, doc: &mut Document, event: PointerEvent) {
        if let Some(region) = self.speech_binding.as_ref().map(|b| b.region) {
            self.speech_event(doc, region, &event);
        }
        if let Some(region) = self.sign_binding.as_ref().map(|b| b.region) {
            self.sign_event(doc, region, &event);
        }
    }

    /// Engine end callback, forwarded by the host.
    pub fn utterance_ended(&mut self, doc: &mut Document, utterance: UtteranceId) {
        self.speech.utterance_ended(doc, utterance);
    }

    fn speech_event(&mut self, doc: &mut Document, region: NodeId, event: &PointerEvent) {
        match event.kind {
            PointerEventKind::Over => {
                if !doc.contains(region, event.target) {
                    return;
                }
                if let Some(el) = locate(doc, event.target, region, self.predicate.as_ref()) {
                    self.speech.hover_enter(doc, el);
                }
            }
            PointerEventKind::Leave => self.speech.hover_leave(doc, event.related_target),
            PointerEventKind::Move => {}
        }
    }

    fn sign_event(&mut self, doc: &mut Document, region: NodeId, event: &PointerEvent) {
        match event.kind {
            PointerEventKind::Over => {
                if doc.contains(region, event.target) {
                    self.sign_enter(doc, region, event);
                }
            }
            PointerEventKind::Move => {
                if self.overlay_visible(doc) {
                    self.position_overlay(doc, event.client);
                }
            }
            PointerEventKind::Leave => {
                let stayed = match (self.sign.active, event.related_target) {
                    (Some(active), Some(related)) => doc.contains(active, related),
                    _ => false,
                };
                if !stayed {
                    self.clear_overlay(doc);
                }
            }
        }
    }

    fn sign_enter(&mut self, doc: &mut Document, region: NodeId, event: &PointerEvent) {
        let Some(el) = locate(doc, event.target, region, self.predicate.as_ref()) else {
            return;
        };
        if self.sign.active == Some(el) && self.overlay_visible(doc) {
            self.position_overlay(doc, event.client);
            return;
        }
        if self.sign.active != Some(el) {
            if let Some(prev) = self.sign.active.take() {
                doc.remove_class(prev, SIGN_CLASS);
            }
            doc.add_class(el, SIGN_CLASS);
            self.sign.active = Some(el);
        }

        let text = bounded_text(&doc.inner_text(el));
        if text.is_empty() {
            return;
        }
        let spelling = render(&text, self.glyphs.as_ref());
        let panel = self.ensure_panel(doc);
        if let Err(e) = materialize(doc, panel, &spelling, &self.metrics) {
            warn!("fingerspelling overlay not rendered: {e}");
            return;
        }
        doc.set_style(panel, "display", "block");
        self.position_overlay(doc, event.client);
    }

    // ── Overlay panel ───────────────────────────────────────────────────────

    fn ensure_panel(&mut self, doc: &mut Document) -> NodeId {
        if let Some(panel) = self.sign.panel {
            return panel;
        }
        let body = doc.body();
        let panel = doc.create_child(body, "div");
        doc.set_attribute(panel, "id", OVERLAY_ID);
        doc.add_class(panel, OVERLAY_CLASS);
        doc.set_attribute(panel, "aria-hidden", "true");
        doc.set_style(panel, "display", "none");
        self.sign.panel = Some(panel);
        panel
    }

    fn overlay_visible(&self, doc: &Document) -> bool {
        self.sign
            .panel
            .is_some_and(|p| doc.style(p, "display") == Some("block"))
    }

    fn position_overlay(&self, doc: &mut Document, pointer: Point) {
        let Some(panel) = self.sign.panel else {
            return;
        };
        let at = place(doc.bounding_size(panel), pointer, doc.viewport());
        doc.set_style(panel, "left", &format!("{}px", at.x));
        doc.set_style(panel, "top", &format!("{}px", at.y));
    }

    /// Hides and empties the panel and drops the active marker. The panel
    /// node itself stays for reuse.
    fn clear_overlay(&mut self, doc: &mut Document) {
        if let Some(panel) = self.sign.panel {
            doc.set_style(panel, "display", "none");
            doc.clear_children(panel);
        }
        if let Some(active) = self.sign.active.take() {
            doc.remove_class(active, SIGN_CLASS);
        }
    }

    // ── Manual transport ────────────────────────────────────────────────────

    /// Reads the whole content region aloud. Inert while TTS is off.
    pub fn play(&mut self, doc: &mut Document) -> Option<UtteranceId> {
        if !self.tts_enabled {
            return None;
        }
        let region = doc.get_element_by_id(&self.region_id)?;
        let utterance = self.speech.play(doc, region)?;
        announce_status(doc, PLAYBACK_STATUS);
        Some(utterance)
    }

    pub fn pause(&self) {
        if self.tts_enabled {
            self.speech.pause();
        }
    }

    pub fn resume(&self) {
        if self.tts_enabled {
            self.speech.resume();
        }
    }

    pub fn stop(&mut self, doc: &mut Document) {
        if self.tts_enabled {
            self.speech.stop(doc);
        }
    }
}
