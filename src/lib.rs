pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod input;
pub mod loaders;
pub mod loading;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod status;
pub mod types;
pub mod viewer;
pub mod viewport;

pub use loaders::{AssetLoader, LoadEvent, LoadRequest, LoadSlot};
pub use loading::{LoadPhase, ModelLoadState};
pub use viewer::Viewer;
