use voxel_autopilot::config::BotConfig;
use voxel_autopilot::geom::{CellPos, Vec3};
use voxel_autopilot::host::HostWorld;
use voxel_autopilot::ordering::{order, OrderingMode};
use voxel_autopilot::scanner::{scan, TargetMatcher};
use voxel_autopilot::sim::SimWorld;
use voxel_autopilot::visibility::is_visible;

const ORE: &str = "ore:diamond";

#[test]
fn scanned_candidates_stay_inside_the_radius() {
    let mut world = SimWorld::with_surface_veins(91, 8, 2, ORE);
    let origin = world.viewpoint_position();
    let matcher = TargetMatcher::new(ORE, false);

    for radius in [1.5, 3.0, 4.5] {
        let found = scan(&mut world, origin, radius, &matcher);
        for candidate in &found {
            let corner = Vec3::new(
                candidate.position.x as f64,
                candidate.position.y as f64,
                candidate.position.z as f64,
            );
            assert!(origin.distance_to(corner) <= radius);
            assert!((candidate.distance - origin.distance_to(corner)).abs() < 1e-9);
        }
    }
}

#[test]
fn scanning_twice_is_idempotent() {
    let mut world = SimWorld::with_surface_veins(17, 6, 2, ORE);
    let origin = world.viewpoint_position();
    let matcher = TargetMatcher::new(ORE, false);

    let collect = |world: &mut SimWorld| -> Vec<CellPos> {
        scan(world, origin, 4.5, &matcher)
            .into_iter()
            .map(|c| c.position)
            .collect()
    };
    let first = collect(&mut world);
    let second = collect(&mut world);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn out_of_radius_cells_are_not_reported() {
    let mut world = SimWorld::flat();
    world.set_cell(CellPos::new(0, 1, 8), ORE);
    let origin = world.viewpoint_position();
    let matcher = TargetMatcher::new(ORE, false);

    assert!(scan(&mut world, origin, 4.5, &matcher).is_empty());
    assert_eq!(scan(&mut world, origin, 10.0, &matcher).len(), 1);
}

#[test]
fn ignore_state_matching_widens_the_scan() {
    let mut world = SimWorld::flat();
    world.set_cell(CellPos::new(1, 0, 2), "crop:wheat[age=7]");
    world.set_cell(CellPos::new(-1, 0, 2), "crop:wheat[age=3]");
    let origin = world.viewpoint_position();

    let exact = TargetMatcher::new("crop:wheat[age=7]", false);
    assert_eq!(scan(&mut world, origin, 4.5, &exact).len(), 1);

    let loose = TargetMatcher::new("crop:wheat[age=7]", true);
    assert_eq!(scan(&mut world, origin, 4.5, &loose).len(), 2);
}

#[test]
fn one_solid_cell_flips_visibility() {
    let mut world = SimWorld::flat();
    let target = CellPos::new(0, 1, 6);
    world.set_cell(target, ORE);
    let eye = Vec3::new(0.5, 1.62, 0.5);

    assert!(is_visible(&mut world, eye, target, 0.25, 1.5));

    world.set_cell(CellPos::new(0, 1, 3), "stone");
    assert!(!is_visible(&mut world, eye, target, 0.25, 1.5));

    // Passable foliage in the same spot does not block.
    world.set_cell(CellPos::new(0, 1, 3), "leaves[distance=2]");
    assert!(is_visible(&mut world, eye, target, 0.25, 1.5));
}

#[test]
fn visibility_fails_open_on_query_failure() {
    let mut world = SimWorld::flat();
    let target = CellPos::new(0, 1, 6);
    world.set_cell(target, ORE);
    world.set_cell(CellPos::new(0, 1, 3), "stone");
    let eye = Vec3::new(0.5, 1.62, 0.5);

    world.fail_next_classifies(1);
    assert!(is_visible(&mut world, eye, target, 0.25, 1.5));
    // The next query sees the wall again.
    assert!(!is_visible(&mut world, eye, target, 0.25, 1.5));
}

#[test]
fn angular_tour_visits_each_candidate_once() {
    let mut world = SimWorld::with_surface_veins(29, 7, 2, ORE);
    let origin = world.viewpoint_position();
    let eye = Vec3::new(origin.x, origin.y + 1.62, origin.z);
    let matcher = TargetMatcher::new(ORE, false);

    let found = scan(&mut world, origin, 4.5, &matcher);
    let n = found.len();
    assert!(n > 1);

    let tour = order(found, eye, OrderingMode::AngularTour, 2.0);
    assert_eq!(tour.len(), n);
    let mut seen: Vec<CellPos> = tour.iter().map(|c| c.position).collect();
    seen.sort_by_key(|c| (c.x, c.y, c.z));
    seen.dedup();
    assert_eq!(seen.len(), n, "tour must not revisit a candidate");
}

#[test]
fn cluster_members_sweep_core_outward() {
    let mut world = SimWorld::flat();
    // An L of five cells: the corner sits closest to the centroid.
    for pos in [
        CellPos::new(0, 0, 2),
        CellPos::new(1, 0, 2),
        CellPos::new(2, 0, 2),
        CellPos::new(2, 0, 3),
        CellPos::new(2, 0, 4),
    ] {
        world.set_cell(pos, ORE);
    }
    let origin = world.viewpoint_position();
    let eye = Vec3::new(origin.x, origin.y + 1.62, origin.z);
    let matcher = TargetMatcher::new(ORE, false);

    let found = scan(&mut world, origin, 6.0, &matcher);
    assert_eq!(found.len(), 5);
    let tour = order(found, eye, OrderingMode::Cluster, 1.5);

    assert_eq!(tour.len(), 5);
    // The two cells nearest the centroid open the sweep, the arm tips
    // close it.
    let core = [CellPos::new(1, 0, 2), CellPos::new(2, 0, 3)];
    assert!(core.contains(&tour[0].position));
    assert!(core.contains(&tour[1].position));
    let tail: Vec<CellPos> = tour[3..].iter().map(|c| c.position).collect();
    assert!(tail.contains(&CellPos::new(0, 0, 2)));
    assert!(tail.contains(&CellPos::new(2, 0, 4)));
}

#[test]
fn default_config_round_trips_through_json() {
    let cfg = BotConfig::default();
    let json = serde_json::to_string(&cfg).unwrap();
    let back: BotConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.target_label, cfg.target_label);
    assert_eq!(back.mode, cfg.mode);
    assert_eq!(back.scan_radius, cfg.scan_radius);
}
