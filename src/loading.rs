//! Model loading state machine.
//!
//! ```text
//! Idle -> Loading(primary) -> Loaded(primary)
//!                          -> Failed(primary) -> Loading(fallback) -> Loaded(fallback)
//!                                                                  -> Failed(fallback)
//! ```
//!
//! A placeholder node stays in the scene until a load succeeds. Fallback
//! attempts are paid for from a [`RetryBudget`]; once it is spent a failure
//! is terminal and the placeholder is left in place.

use serde::Serialize;

use crate::loaders::{AssetLoader, LoadError, LoadEvent, LoadProgress, LoadRequest, LoadSlot};
use crate::scene::{NodeId, Scene, SceneNode};
use crate::status::StatusLine;

/// Exactly one fallback attempt per primary failure
pub const DEFAULT_FALLBACK_BUDGET: u32 = 1;

pub const PRIMARY_FAILED_TEXT: &str = "Error loading model. Please check console for details.";
pub const ALL_FAILED_TEXT: &str = "All model loading attempts failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading(LoadSlot),
    Loaded(LoadSlot),
    Failed(LoadSlot),
}

impl LoadPhase {
    /// No further transitions will happen from this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadPhase::Loaded(_) | LoadPhase::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    pub fn new(attempts: u32) -> Self {
        Self { remaining: attempts }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consumes one attempt, returning `false` once the budget is empty.
    pub fn try_spend(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_BUDGET)
    }
}

/// Node currently driven by the render loop's rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayedNode {
    Placeholder(NodeId),
    Model { id: NodeId, slot: LoadSlot },
}

impl DisplayedNode {
    pub fn id(&self) -> NodeId {
        match self {
            DisplayedNode::Placeholder(id) | DisplayedNode::Model { id, .. } => *id,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, DisplayedNode::Model { .. })
    }
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    slot: LoadSlot,
    url: &'a str,
    message: &'a str,
}

pub struct ModelLoadState {
    primary_url: String,
    fallback_url: String,
    phase: LoadPhase,
    budget: RetryBudget,
    placeholder: NodeId,
    displayed: DisplayedNode,
    requests_issued: u32,
}

impl ModelLoadState {
    /// `placeholder` must already be a member of the scene.
    pub fn new(
        placeholder: NodeId,
        primary_url: impl Into<String>,
        fallback_url: impl Into<String>,
        budget: RetryBudget,
    ) -> Self {
        Self {
            primary_url: primary_url.into(),
            fallback_url: fallback_url.into(),
            phase: LoadPhase::Idle,
            budget,
            placeholder,
            displayed: DisplayedNode::Placeholder(placeholder),
            requests_issued: 0,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn displayed(&self) -> DisplayedNode {
        self.displayed
    }

    pub fn placeholder(&self) -> NodeId {
        self.placeholder
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    /// Issues the primary load. Only valid from `Idle`.
    pub fn start(&mut self, loader: &mut dyn AssetLoader, status: &mut StatusLine) {
        if self.phase != LoadPhase::Idle {
            log::warn!("Model loading already started ({:?})", self.phase);
            return;
        }

        let request = LoadRequest::new(LoadSlot::Primary, self.primary_url.clone());
        let text = format!("Starting to load {} model...", request.asset_name());
        log::info!("{}", text);
        status.set_text(text);

        self.issue(loader, request);
    }

    pub fn handle_event(
        &mut self,
        event: LoadEvent,
        scene: &mut Scene,
        loader: &mut dyn AssetLoader,
        status: &mut StatusLine,
    ) {
        if self.phase != LoadPhase::Loading(event.slot()) {
            log::warn!("Ignoring {} load event received in {:?}", event.slot(), self.phase);
            return;
        }

        match event {
            LoadEvent::Progress { slot, progress } => self.on_progress(slot, progress, status),
            LoadEvent::Loaded { slot, node } => self.on_loaded(slot, node, scene, status),
            LoadEvent::Failed { slot, error } => self.on_failed(slot, error, loader, status),
        }
    }

    fn issue(&mut self, loader: &mut dyn AssetLoader, request: LoadRequest) {
        self.phase = LoadPhase::Loading(request.slot);
        self.requests_issued += 1;
        loader.begin_load(request);
    }

    fn on_progress(&mut self, slot: LoadSlot, progress: LoadProgress, status: &mut StatusLine) {
        // The fallback load runs without a progress display
        if slot != LoadSlot::Primary {
            return;
        }

        let text = match progress.ratio() {
            Some(ratio) => format!("Loading: {}%", (ratio * 100.0).round() as u32),
            None => format!("Loading: {} KB", progress.loaded / 1024),
        };
        log::debug!("{}", text);
        status.set_text(text);
    }

    fn on_loaded(&mut self, slot: LoadSlot, mut node: SceneNode, scene: &mut Scene, status: &mut StatusLine) {
        // Only the primary model is prepared; the fallback is shown as authored
        if slot == LoadSlot::Primary {
            node.set_shadows(true, true);
            node.center_horizontally();
        }

        log::info!(
            "{} model '{}' loaded ({} meshes, {} triangles)",
            slot,
            node.name,
            node.meshes.len(),
            node.triangle_count()
        );

        let id = scene.add(node);
        if scene.remove(self.placeholder).is_none() {
            log::warn!("Placeholder {} was already gone from the scene", self.placeholder);
        }

        self.displayed = DisplayedNode::Model { id, slot };
        self.phase = LoadPhase::Loaded(slot);
        status.hide();
    }

    fn on_failed(&mut self, slot: LoadSlot, error: LoadError, loader: &mut dyn AssetLoader, status: &mut StatusLine) {
        log::error!("Error loading {} model: {}", slot, error);
        let record = FailureRecord {
            slot,
            url: &error.url,
            message: &error.message,
        };
        log::error!("Error details: {}", serde_json::to_string(&record).unwrap_or_default());

        self.phase = LoadPhase::Failed(slot);

        if !self.budget.try_spend() {
            log::error!("All model loading attempts failed");
            status.set_text(ALL_FAILED_TEXT);
            return;
        }

        if slot == LoadSlot::Primary {
            status.set_text(PRIMARY_FAILED_TEXT);
        }
        let request = LoadRequest::new(LoadSlot::Fallback, self.fallback_url.clone());
        self.issue(loader, request);
    }
}
