mod common;

use common::{failed, loaded, offset_box, progress, FakeLoader};
use glam::Vec3;
use model_viewer::config::ViewerConfig;
use model_viewer::input::{Button, PointerInput};
use model_viewer::loaders::{LoadProgress, LoadSlot};
use model_viewer::loading::{DisplayedNode, LoadPhase, ALL_FAILED_TEXT};
use model_viewer::viewer::{ROTATION_OFF_LABEL, ROTATION_ON_LABEL};
use model_viewer::Viewer;

fn viewer_with(loader: &FakeLoader) -> Viewer {
    Viewer::new(ViewerConfig::default(), Box::new(loader.clone()), 800, 600)
}

fn yaw_of_displayed(viewer: &Viewer) -> f32 {
    let id = viewer.displayed().id();
    viewer.scene.get(id).expect("displayed node").transform.rotation.y
}

#[cfg(test)]
mod viewer_tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_flag_and_label() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        let before = (viewer.state.is_rotating(), viewer.state.rotation_label());

        assert!(viewer.toggle_rotation());
        assert_eq!(viewer.state.rotation_label(), ROTATION_ON_LABEL);
        assert!(!viewer.toggle_rotation());

        assert_eq!((viewer.state.is_rotating(), viewer.state.rotation_label()), before);
        assert_eq!(viewer.state.rotation_label(), ROTATION_OFF_LABEL);
    }

    #[test]
    fn test_reset_camera_is_idempotent_after_orbiting() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        viewer.reset_camera();
        let home = viewer.camera.pose();

        viewer.controls.rotate_left(1.3);
        viewer.controls.rotate_up(-0.4);
        viewer.controls.zoom(-5.0);
        for _ in 0..30 {
            viewer.tick();
        }
        assert!(viewer.camera.position.distance(home.position) > 1e-2);

        viewer.reset_camera();
        let first = viewer.camera.pose();
        viewer.reset_camera();
        let second = viewer.camera.pose();

        assert!(first.position.distance(home.position) < 1e-4);
        assert_eq!(first, second);
        assert_eq!(first.target, Vec3::ZERO);
    }

    #[test]
    fn test_reset_camera_stops_inertia() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        viewer.controls.rotate_left(2.0);
        viewer.tick();
        viewer.reset_camera();
        let pose = viewer.camera.pose();

        viewer.tick();
        assert!(viewer.camera.position.distance(pose.position) < 1e-4);
    }

    #[test]
    fn test_reset_camera_restores_panned_target() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        let camera = viewer.camera.clone();
        viewer.controls.pan_by_pixels(120.0, 40.0, 600.0, &camera);
        for _ in 0..100 {
            viewer.tick();
        }
        assert!(viewer.controls.target.length() > 1e-3);

        viewer.reset_camera();
        assert_eq!(viewer.controls.target, Vec3::ZERO);
        assert!((viewer.camera.position - Vec3::new(5.0, 5.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_resize_sets_exact_aspect() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        for (w, h) in [(1u32, 1u32), (1920, 1080), (333, 777), (4096, 3)] {
            assert!(viewer.resize(w, h));
            assert_eq!(viewer.camera.aspect, w as f32 / h as f32);
        }
        assert!(!viewer.resize(0, 0));
        assert_eq!(viewer.camera.aspect, 4096.0 / 3.0);
    }

    #[test]
    fn test_model_rotates_only_when_enabled() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        viewer.start();
        loader.push(loaded(LoadSlot::Primary, offset_box("castle", [0.0; 3], 1.0)));
        viewer.tick();
        assert!(viewer.displayed().is_model());

        assert!(viewer.toggle_rotation());
        let start = yaw_of_displayed(&viewer);
        viewer.tick();
        assert!((yaw_of_displayed(&viewer) - start - 0.005).abs() < 1e-6);

        viewer.toggle_rotation();
        let paused = yaw_of_displayed(&viewer);
        viewer.tick();
        viewer.tick();
        assert_eq!(yaw_of_displayed(&viewer), paused);
    }

    #[test]
    fn test_loaded_model_holds_still_until_toggled() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        assert!(!viewer.state.is_rotating());
        assert_eq!(viewer.state.rotation_label(), ROTATION_OFF_LABEL);

        viewer.start();
        loader.push(loaded(LoadSlot::Primary, offset_box("castle", [0.0; 3], 1.0)));
        viewer.tick();
        assert!(viewer.displayed().is_model());

        let settled = yaw_of_displayed(&viewer);
        viewer.tick();
        viewer.tick();
        assert_eq!(yaw_of_displayed(&viewer), settled);
        assert_eq!(settled, 0.0);
    }

    #[test]
    fn test_placeholder_spins_after_total_failure() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        viewer.start();
        loader.push(failed(LoadSlot::Primary, "models/simple_castle.glb"));
        viewer.tick();
        loader.push(failed(LoadSlot::Fallback, "models/test_cube.glb"));
        viewer.tick();

        assert_eq!(viewer.load_phase(), LoadPhase::Failed(LoadSlot::Fallback));
        assert_eq!(viewer.state.status.text(), ALL_FAILED_TEXT);
        assert!(matches!(viewer.displayed(), DisplayedNode::Placeholder(_)));

        let before = yaw_of_displayed(&viewer);
        viewer.tick();
        assert!((yaw_of_displayed(&viewer) - before - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_loader_requests_follow_config() {
        let loader = FakeLoader::new();
        let config = ViewerConfig {
            primary_model: "models/a.glb".to_string(),
            fallback_model: "models/b.glb".to_string(),
            ..ViewerConfig::default()
        };
        let mut viewer = Viewer::new(config, Box::new(loader.clone()), 640, 480);
        viewer.start();
        loader.push(progress(LoadSlot::Primary, 3, Some(4)));
        loader.push(failed(LoadSlot::Primary, "models/a.glb"));
        assert_eq!(viewer.pump_loader(), 2);

        let urls: Vec<String> = loader.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["models/a.glb", "models/b.glb"]);
    }

    #[test]
    fn test_progress_ratio_stays_in_unit_range() {
        for total in [1u64, 7, 1024, 10_000_000] {
            for loaded in [0u64, 1, total / 2, total, total + 5] {
                let ratio = LoadProgress::new(loaded, Some(total)).ratio().expect("known total");
                assert!((0.0..=1.0).contains(&ratio), "{}/{} -> {}", loaded, total, ratio);
            }
        }
        assert_eq!(LoadProgress::new(10, Some(0)).ratio(), None);
        assert_eq!(LoadProgress::new(10, None).ratio(), None);
    }

    #[test]
    fn test_left_drag_orbits_camera() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        let start = viewer.camera.position;

        let mut input = PointerInput::new();
        input.set_pressed(Button::MouseLeft, true);
        input.move_to(100.0, 100.0);
        input.move_to(160.0, 100.0);
        viewer.apply_pointer(&input);
        viewer.tick();

        assert!(viewer.camera.position.distance(start) > 1e-3);
        assert!((viewer.camera.position.length() - start.length()).abs() < 1e-3);
    }

    #[test]
    fn test_wheel_zooms_towards_target() {
        let loader = FakeLoader::new();
        let mut viewer = viewer_with(&loader);
        let start = viewer.camera.position.length();

        let mut input = PointerInput::new();
        input.scroll(3.0);
        viewer.apply_pointer(&input);
        viewer.tick();

        assert!(viewer.camera.position.length() < start);
    }
}
