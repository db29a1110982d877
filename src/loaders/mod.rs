//! Asynchronous asset loading: requests go out through an [`AssetLoader`],
//! results come back later as [`LoadEvent`]s drained by the owner.

pub mod gltf;
pub mod source;

pub use self::gltf::parse_gltf;
pub use source::{source_for_location, AssetSource, FileSource, HttpSource};

use serde::Serialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::scene::SceneNode;

/// Which of the two configured assets a request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadSlot {
    Primary,
    Fallback,
}

impl fmt::Display for LoadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSlot::Primary => write!(f, "primary"),
            LoadSlot::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub slot: LoadSlot,
    /// Path relative to the asset source, e.g. `models/test_cube.glb`
    pub url: String,
}

impl LoadRequest {
    pub fn new(slot: LoadSlot, url: impl Into<String>) -> Self {
        Self {
            slot,
            url: url.into(),
        }
    }

    /// File stem of the requested path
    pub fn asset_name(&self) -> String {
        let file = self.url.rsplit('/').next().unwrap_or(&self.url);
        match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// `loaded / total` clamped into `[0, 1]`, or `None` when the total is
    /// unknown or zero.
    pub fn ratio(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).clamp(0.0, 1.0) as f32),
            _ => None,
        }
    }
}

/// Opaque description of a failed load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadError {
    pub url: String,
    pub message: String,
}

impl LoadError {
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn from_anyhow(url: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::new(url, format!("{:#}", err))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.message)
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub enum LoadEvent {
    Progress { slot: LoadSlot, progress: LoadProgress },
    Loaded { slot: LoadSlot, node: SceneNode },
    Failed { slot: LoadSlot, error: LoadError },
}

impl LoadEvent {
    pub fn slot(&self) -> LoadSlot {
        match self {
            LoadEvent::Progress { slot, .. } | LoadEvent::Loaded { slot, .. } | LoadEvent::Failed { slot, .. } => *slot,
        }
    }
}

/// Issues loads without blocking; never retries on its own
pub trait AssetLoader {
    fn begin_load(&mut self, request: LoadRequest);

    /// Events produced since the previous call, in arrival order
    fn poll_events(&mut self) -> Vec<LoadEvent>;
}

/// Runs each fetch-and-parse on its own worker thread and hands the results
/// back over a channel.
pub struct ThreadedLoader {
    source: Arc<dyn AssetSource>,
    sender: Sender<LoadEvent>,
    receiver: Receiver<LoadEvent>,
}

impl ThreadedLoader {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source,
            sender,
            receiver,
        }
    }
}

impl AssetLoader for ThreadedLoader {
    fn begin_load(&mut self, request: LoadRequest) {
        log::info!("Loading {} asset from {}", request.slot, self.source.describe(&request.url));

        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        let slot = request.slot;
        let url = request.url.clone();

        let spawned = thread::Builder::new()
            .name(format!("asset-loader-{}", slot))
            .spawn(move || run_load(source.as_ref(), &request, &sender));

        if let Err(e) = spawned {
            let error = LoadError::new(url, format!("failed to spawn loader thread: {}", e));
            // The receiver lives in `self`, so this cannot fail
            let _ = self.sender.send(LoadEvent::Failed { slot, error });
        }
    }

    fn poll_events(&mut self) -> Vec<LoadEvent> {
        self.receiver.try_iter().collect()
    }
}

fn run_load(source: &dyn AssetSource, request: &LoadRequest, sender: &Sender<LoadEvent>) {
    let slot = request.slot;
    let result = source
        .fetch(&request.url, &mut |loaded, total| {
            let progress = LoadProgress::new(loaded, total);
            let _ = sender.send(LoadEvent::Progress { slot, progress });
        })
        .and_then(|bytes| parse_gltf(&bytes, &request.asset_name()));

    let event = match result {
        Ok(node) => LoadEvent::Loaded { slot, node },
        Err(e) => LoadEvent::Failed {
            slot,
            error: LoadError::from_anyhow(source.describe(&request.url), &e),
        },
    };

    // A closed channel means the viewer is gone; nothing left to notify
    let _ = sender.send(event);
}
