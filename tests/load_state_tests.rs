mod common;

use common::{count_named, default_scene, failed, loaded, offset_box, progress, FakeLoader};
use model_viewer::loaders::LoadSlot;
use model_viewer::loading::{DisplayedNode, LoadPhase, ModelLoadState, RetryBudget, ALL_FAILED_TEXT, PRIMARY_FAILED_TEXT};
use model_viewer::scene::{NodeId, Scene};
use model_viewer::status::StatusLine;
use model_viewer::AssetLoader;

const PRIMARY: &str = "models/simple_castle.glb";
const FALLBACK: &str = "models/test_cube.glb";

struct Harness {
    scene: Scene,
    placeholder: NodeId,
    loader: FakeLoader,
    status: StatusLine,
    state: ModelLoadState,
}

impl Harness {
    fn new() -> Self {
        let (scene, placeholder) = default_scene();
        Self {
            scene,
            placeholder,
            loader: FakeLoader::new(),
            status: StatusLine::new(),
            state: ModelLoadState::new(placeholder, PRIMARY, FALLBACK, RetryBudget::default()),
        }
    }

    fn started() -> Self {
        let mut h = Self::new();
        h.state.start(&mut h.loader, &mut h.status);
        h
    }

    /// Queues `event` and drains the loader like a frame would.
    fn deliver(&mut self, event: model_viewer::LoadEvent) {
        self.loader.push(event);
        for event in self.loader.poll_events() {
            self.state
                .handle_event(event, &mut self.scene, &mut self.loader, &mut self.status);
        }
    }
}

#[cfg(test)]
mod load_state_tests {
    use super::*;

    #[test]
    fn test_start_issues_primary_request() {
        let h = Harness::started();
        let requests = h.loader.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].slot, LoadSlot::Primary);
        assert_eq!(requests[0].url, PRIMARY);
        assert_eq!(h.state.phase(), LoadPhase::Loading(LoadSlot::Primary));
        assert_eq!(h.status.text(), "Starting to load simple_castle model...");
        assert!(h.status.is_visible());
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let mut h = Harness::started();
        h.state.start(&mut h.loader, &mut h.status);
        assert_eq!(h.loader.requests().len(), 1);
    }

    #[test]
    fn test_primary_success_swaps_placeholder_once() {
        let mut h = Harness::started();
        h.deliver(loaded(LoadSlot::Primary, offset_box("castle", [2.0, 0.0, -3.0], 1.0)));

        assert!(!h.scene.contains(h.placeholder));
        assert_eq!(count_named(&h.scene, "placeholder"), 0);
        assert_eq!(count_named(&h.scene, "castle"), 1);
        assert_eq!(h.state.phase(), LoadPhase::Loaded(LoadSlot::Primary));
        assert!(!h.status.is_visible());

        match h.state.displayed() {
            DisplayedNode::Model { id, slot } => {
                assert_eq!(slot, LoadSlot::Primary);
                assert!(h.scene.contains(id));
            }
            other => panic!("expected model, got {:?}", other),
        }
    }

    #[test]
    fn test_primary_success_is_centered_and_shadowed() {
        let mut h = Harness::started();
        h.deliver(loaded(LoadSlot::Primary, offset_box("castle", [7.0, 1.5, -4.0], 2.0)));

        let id = h.state.displayed().id();
        let node = h.scene.get(id).expect("loaded node");
        let center = node.world_bounds().center();
        assert!(center.x.abs() < 1e-5, "x = {}", center.x);
        assert!(center.z.abs() < 1e-5, "z = {}", center.z);
        assert!((center.y - 2.5).abs() < 1e-5, "height is kept");
        assert!(node.cast_shadow);
        assert!(node.receive_shadow);
    }

    #[test]
    fn test_primary_failure_issues_single_fallback() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));

        let requests = h.loader.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].slot, LoadSlot::Fallback);
        assert_eq!(requests[1].url, FALLBACK);
        assert_eq!(h.state.phase(), LoadPhase::Loading(LoadSlot::Fallback));
        assert_eq!(h.status.text(), PRIMARY_FAILED_TEXT);
        assert_eq!(h.state.budget().remaining(), 0);
        assert!(h.scene.contains(h.placeholder));
    }

    #[test]
    fn test_fallback_success_is_not_centered() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));
        h.deliver(loaded(LoadSlot::Fallback, offset_box("test_cube", [3.0, 0.0, 3.0], 1.0)));

        assert!(!h.scene.contains(h.placeholder));
        assert_eq!(count_named(&h.scene, "test_cube"), 1);
        assert_eq!(h.state.phase(), LoadPhase::Loaded(LoadSlot::Fallback));

        let node = h.scene.get(h.state.displayed().id()).expect("fallback node");
        let center = node.world_bounds().center();
        assert!((center.x - 3.5).abs() < 1e-5);
        assert!((center.z - 3.5).abs() < 1e-5);
        assert!(!node.cast_shadow);
        assert!(!node.receive_shadow);
    }

    #[test]
    fn test_both_failures_keep_placeholder() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));
        h.deliver(failed(LoadSlot::Fallback, FALLBACK));

        assert!(h.scene.contains(h.placeholder));
        assert_eq!(h.state.displayed(), DisplayedNode::Placeholder(h.placeholder));
        assert_eq!(h.state.phase(), LoadPhase::Failed(LoadSlot::Fallback));
        assert!(h.state.phase().is_terminal());
        assert_eq!(h.status.text(), ALL_FAILED_TEXT);
        assert!(h.status.is_visible());
        assert_eq!(h.loader.requests().len(), 2);
        assert_eq!(h.state.requests_issued(), 2);
    }

    #[test]
    fn test_no_attempts_after_terminal_failure() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));
        h.deliver(failed(LoadSlot::Fallback, FALLBACK));

        // Stray events after the terminal state change nothing
        h.deliver(failed(LoadSlot::Fallback, FALLBACK));
        h.deliver(loaded(LoadSlot::Primary, offset_box("late", [0.0; 3], 1.0)));

        assert_eq!(h.loader.requests().len(), 2);
        assert_eq!(count_named(&h.scene, "late"), 0);
        assert!(h.scene.contains(h.placeholder));
        assert_eq!(h.status.text(), ALL_FAILED_TEXT);
    }

    #[test]
    fn test_zero_budget_fails_without_fallback() {
        let mut h = Harness::new();
        h.state = ModelLoadState::new(h.placeholder, PRIMARY, FALLBACK, RetryBudget::new(0));
        h.state.start(&mut h.loader, &mut h.status);
        h.deliver(failed(LoadSlot::Primary, PRIMARY));

        assert_eq!(h.loader.requests().len(), 1);
        assert_eq!(h.state.phase(), LoadPhase::Failed(LoadSlot::Primary));
        assert_eq!(h.status.text(), ALL_FAILED_TEXT);
    }

    #[test]
    fn test_primary_progress_updates_status() {
        let mut h = Harness::started();
        h.deliver(progress(LoadSlot::Primary, 512, Some(1024)));
        assert_eq!(h.status.text(), "Loading: 50%");

        h.deliver(progress(LoadSlot::Primary, 1024, Some(1024)));
        assert_eq!(h.status.text(), "Loading: 100%");
        assert_eq!(h.state.phase(), LoadPhase::Loading(LoadSlot::Primary));
    }

    #[test]
    fn test_progress_without_total() {
        let mut h = Harness::started();
        h.deliver(progress(LoadSlot::Primary, 4096, None));
        assert_eq!(h.status.text(), "Loading: 4 KB");
    }

    #[test]
    fn test_fallback_progress_is_not_displayed() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));
        h.deliver(progress(LoadSlot::Fallback, 10, Some(20)));
        assert_eq!(h.status.text(), PRIMARY_FAILED_TEXT);
    }

    #[test]
    fn test_stale_primary_events_ignored_during_fallback() {
        let mut h = Harness::started();
        h.deliver(failed(LoadSlot::Primary, PRIMARY));
        h.deliver(progress(LoadSlot::Primary, 1, Some(2)));
        h.deliver(loaded(LoadSlot::Primary, offset_box("stale", [0.0; 3], 1.0)));

        assert_eq!(h.status.text(), PRIMARY_FAILED_TEXT);
        assert_eq!(count_named(&h.scene, "stale"), 0);
        assert_eq!(h.state.phase(), LoadPhase::Loading(LoadSlot::Fallback));
    }

    #[test]
    fn test_events_before_start_ignored() {
        let mut h = Harness::new();
        h.deliver(loaded(LoadSlot::Primary, offset_box("early", [0.0; 3], 1.0)));
        assert_eq!(h.state.phase(), LoadPhase::Idle);
        assert_eq!(count_named(&h.scene, "early"), 0);
        assert!(h.scene.contains(h.placeholder));
    }
}
