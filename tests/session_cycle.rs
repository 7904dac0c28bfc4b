use std::time::Duration;
use voxel_autopilot::config::BotConfig;
use voxel_autopilot::geom::{look_angles, CellPos, Vec3};
use voxel_autopilot::host::{CrosshairConfirmer, HostWorld, InputAction, TrustingConfirmer};
use voxel_autopilot::motion::{aim_and_interact, AimOutcome};
use voxel_autopilot::session::{run_session, SessionEnd};
use voxel_autopilot::sim::SimWorld;

const ORE: &str = "ore:diamond";

/// Default harvest profile with quick swings so virtual sessions stay short.
fn harvest_cfg() -> BotConfig {
    let mut cfg = BotConfig::default();
    cfg.rotation_duration_s = 0.2;
    cfg.rotation_steps = 8;
    cfg.clamp();
    cfg
}

#[test]
fn session_clears_every_seeded_vein() {
    let mut world = SimWorld::with_surface_veins(0x5EED, 5, 2, ORE);
    let targets = world.count_cells_with(ORE);
    assert!(targets > 0, "seeded world must contain veins");

    let summary = run_session(&mut world, &CrosshairConfirmer, &harvest_cfg());

    assert_eq!(summary.total_interacted as usize, targets);
    assert_eq!(summary.cells_visited as usize, targets);
    assert_eq!(world.count_cells_with(ORE), 0);
    assert_eq!(world.removed_cells().len(), targets);
    assert_eq!(summary.end, SessionEnd::Exhausted);
    assert!(!world.is_held(InputAction::Attack));
}

#[test]
fn buried_cell_is_deferred_not_removed() {
    let mut world = SimWorld::flat();
    // One open surface cell, one buried under the floor's top layer.
    world.set_cell(CellPos::new(2, -1, 2), ORE);
    world.set_cell(CellPos::new(-2, -2, -2), ORE);

    let summary = run_session(&mut world, &CrosshairConfirmer, &harvest_cfg());

    assert_eq!(summary.total_interacted, 1);
    assert!(summary.obstructed_marks >= 1);
    assert_eq!(world.cell(CellPos::new(2, -1, 2)), None);
    assert_eq!(world.cell(CellPos::new(-2, -2, -2)), Some(ORE));
    assert_eq!(summary.end, SessionEnd::Exhausted);
}

#[test]
fn overlay_interrupt_stops_the_loop_and_releases_inputs() {
    let mut world = SimWorld::with_surface_veins(7, 6, 2, ORE);
    world.open_overlay_after(Duration::from_millis(450));

    let summary = run_session(&mut world, &CrosshairConfirmer, &harvest_cfg());

    assert_eq!(summary.end, SessionEnd::OverlayInterrupt);
    for action in InputAction::ALL {
        assert!(!world.is_held(action));
    }
}

#[test]
fn delayed_activation_waits_in_idle() {
    let mut world = SimWorld::with_surface_veins(11, 3, 2, ORE);
    world.arm_activation_at(Duration::from_millis(300));
    let targets = world.count_cells_with(ORE);

    let mut cfg = harvest_cfg();
    cfg.start_immediately = false;

    let summary = run_session(&mut world, &CrosshairConfirmer, &cfg);

    assert!(world.clock() >= Duration::from_millis(300));
    assert_eq!(summary.total_interacted as usize, targets);
}

#[test]
fn failed_scan_query_recovers_next_pass() {
    let mut world = SimWorld::with_surface_veins(23, 4, 2, ORE);
    world.fail_next_classifies(1);
    let targets = world.count_cells_with(ORE);

    let summary = run_session(&mut world, &CrosshairConfirmer, &harvest_cfg());

    assert_eq!(summary.total_interacted as usize, targets);
    assert_eq!(world.count_cells_with(ORE), 0);
}

#[test]
fn cycle_cap_is_a_hard_stop() {
    let mut world = SimWorld::with_surface_veins(5, 8, 2, ORE);
    let mut cfg = harvest_cfg();
    cfg.max_cycles = 2;

    let summary = run_session(&mut world, &CrosshairConfirmer, &cfg);

    assert_eq!(summary.end, SessionEnd::CycleLimit);
    assert_eq!(summary.scan_passes, 2);
}

#[test]
fn look_only_mode_visits_without_interacting() {
    let mut world = SimWorld::with_surface_veins(0x5EED, 4, 2, ORE);
    let targets = world.count_cells_with(ORE);

    let mut cfg = harvest_cfg();
    cfg.interact = false;

    let summary = run_session(&mut world, &CrosshairConfirmer, &cfg);

    assert_eq!(summary.total_interacted, 0);
    assert!(summary.cells_visited as usize >= targets);
    assert_eq!(world.count_cells_with(ORE), targets);
    assert!(world.removed_cells().is_empty());
}

#[test]
fn aim_lands_exactly_on_target_angles() {
    let mut world = SimWorld::flat();
    let target = CellPos::new(3, 1, 4);
    world.set_cell(target, ORE);

    let cfg = harvest_cfg();
    let outcome = aim_and_interact(&mut world, &CrosshairConfirmer, target, &cfg);
    assert_eq!(outcome, AimOutcome::Completed);

    let eye = Vec3::new(0.5, 1.62, 0.5);
    let (want_yaw, want_pitch) = look_angles(eye, target.center());
    let (yaw, pitch) = world.viewpoint_orientation();
    assert!((yaw - want_yaw).abs() < 1e-9);
    assert!((pitch - want_pitch).abs() < 1e-9);

    assert_eq!(world.cell(target), None);
    assert!(!world.is_held(InputAction::Attack));
}

#[test]
fn blocked_crosshair_reports_obstructed_and_touches_nothing() {
    let mut world = SimWorld::flat();
    let wall = CellPos::new(0, 1, 2);
    let target = CellPos::new(0, 1, 5);
    world.set_cell(wall, "stone");
    world.set_cell(target, ORE);

    let cfg = harvest_cfg();
    let outcome = aim_and_interact(&mut world, &CrosshairConfirmer, target, &cfg);

    assert_eq!(outcome, AimOutcome::Obstructed);
    assert_eq!(world.cell(target), Some(ORE));
    assert_eq!(world.cell(wall), Some("stone"));
    assert!(world.removed_cells().is_empty());
    assert!(!world.is_held(InputAction::Attack));
}

#[test]
fn trusting_confirmer_fires_without_a_crosshair_probe() {
    let mut world = SimWorld::flat();
    let target = CellPos::new(1, 1, 3);
    world.set_cell(target, ORE);

    let cfg = harvest_cfg();
    let outcome = aim_and_interact(&mut world, &TrustingConfirmer, target, &cfg);

    // The trusting path still removes the cell: the rotation really does
    // land the crosshair on it.
    assert_eq!(outcome, AimOutcome::Completed);
    assert_eq!(world.cell(target), None);
}
