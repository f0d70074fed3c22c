//! Pathfinding integration tests

use stormwake::core::config::AiConfig;
use stormwake::core::types::Vec2;
use stormwake::hazard::HazardField;
use stormwake::nav::{find_path, NavigationGrid};
use stormwake::world::terrain::{TerrainGrid, TileKind};
use stormwake::world::threats::{Threat, ThreatKind};

fn open_map(size: usize) -> TerrainGrid {
    TerrainGrid::new(size, size, 1.0)
}

fn calm(terrain: &TerrainGrid, config: &AiConfig) -> HazardField {
    HazardField::new(terrain.width, terrain.height, terrain.tile_size, config)
}

#[test]
fn test_route_skirts_an_island() {
    let config = AiConfig::default();
    let mut terrain = open_map(24);
    // A wall across the middle with a gap along the north edge
    terrain.fill_rect(10, 2, 2, 22, TileKind::Island);

    let grid = NavigationGrid::build(&terrain, &config);
    let hazard = calm(&terrain, &config);

    let start = Vec2::new(4.5, 12.5);
    let goal = Vec2::new(19.5, 12.5);
    let path = find_path(&grid, &hazard, start, goal, &config).unwrap();

    // Every waypoint stays off blocked cells
    for &waypoint in path.remaining() {
        if let Some((x, y)) = grid.world_to_cell(waypoint) {
            assert!(!grid.is_blocked(x, y), "waypoint {:?} is blocked", waypoint);
        }
    }
    // The detour through the gap is longer than the straight line
    assert!(path.total_length() > start.distance(&goal));
    assert_eq!(path.goal(), Some(goal));
}

#[test]
fn test_sealed_region_has_no_path() {
    let config = AiConfig::default();
    let mut terrain = open_map(24);
    // Box the start in completely
    terrain.fill_rect(2, 2, 8, 1, TileKind::Island);
    terrain.fill_rect(2, 9, 8, 1, TileKind::Island);
    terrain.fill_rect(2, 2, 1, 8, TileKind::Island);
    terrain.fill_rect(9, 2, 1, 8, TileKind::Island);

    let grid = NavigationGrid::build(&terrain, &config);
    let hazard = calm(&terrain, &config);

    let inside = Vec2::new(5.5, 5.5);
    let outside = Vec2::new(20.5, 20.5);
    assert!(find_path(&grid, &hazard, inside, outside, &config).is_none());
}

#[test]
fn test_hazard_bends_the_route() {
    let config = AiConfig::default();
    let terrain = open_map(32);
    let grid = NavigationGrid::build(&terrain, &config);

    let start = Vec2::new(4.5, 16.5);
    let goal = Vec2::new(27.5, 16.5);

    let calm_field = calm(&terrain, &config);
    let direct = find_path(&grid, &calm_field, start, goal, &config).unwrap();

    // Park a storm on the straight line
    let mut stormy = calm(&terrain, &config);
    stormy.update(
        0.05,
        &[Threat::new(
            0,
            ThreatKind::Storm,
            Vec2::new(16.0, 16.5),
            5.0,
            9.0,
        )],
    );
    let detour = find_path(&grid, &stormy, start, goal, &config).unwrap();

    assert!(detour.total_length() > direct.total_length());
    // The detour's worst hazard exposure stays well below the peak
    let peak = stormy.sample(Vec2::new(16.0, 16.5));
    for &waypoint in detour.remaining() {
        assert!(stormy.sample(waypoint) < peak * 0.5);
    }
}

#[test]
fn test_repeated_queries_are_identical() {
    let config = AiConfig::default();
    let mut terrain = open_map(24);
    terrain.fill_rect(8, 8, 4, 4, TileKind::Island);
    terrain.fill_rect(14, 3, 3, 9, TileKind::Cloud);

    let grid = NavigationGrid::build(&terrain, &config);
    let mut hazard = calm(&terrain, &config);
    hazard.update(
        0.05,
        &[Threat::new(
            0,
            ThreatKind::Storm,
            Vec2::new(18.0, 18.0),
            4.0,
            6.0,
        )],
    );

    let start = Vec2::new(2.5, 2.5);
    let goal = Vec2::new(21.5, 21.5);
    let first = find_path(&grid, &hazard, start, goal, &config).unwrap();
    for _ in 0..5 {
        let again = find_path(&grid, &hazard, start, goal, &config).unwrap();
        assert_eq!(again.remaining(), first.remaining());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Any two points on a fixed obstacle map: planning twice gives
        // byte-identical routes, and a found route always ends at the goal
        #[test]
        fn prop_planning_is_deterministic(
            sx in 1.0f32..22.0,
            sy in 1.0f32..22.0,
            gx in 1.0f32..22.0,
            gy in 1.0f32..22.0,
        ) {
            let config = AiConfig::default();
            let mut terrain = open_map(24);
            terrain.fill_rect(9, 9, 4, 4, TileKind::Island);
            let grid = NavigationGrid::build(&terrain, &config);
            let hazard = calm(&terrain, &config);

            let start = Vec2::new(sx, sy);
            let goal = Vec2::new(gx, gy);
            let first = find_path(&grid, &hazard, start, goal, &config);
            let second = find_path(&grid, &hazard, start, goal, &config);

            match (first, second) {
                (Some(a), Some(b)) => {
                    prop_assert_eq!(a.remaining(), b.remaining());
                    prop_assert_eq!(a.goal(), Some(goal));
                }
                (None, None) => {}
                _ => prop_assert!(false, "planner flip-flopped"),
            }
        }
    }
}

#[test]
fn test_goal_on_island_is_rejected() {
    let config = AiConfig::default();
    let mut terrain = open_map(16);
    terrain.fill_rect(10, 10, 2, 2, TileKind::Island);

    let grid = NavigationGrid::build(&terrain, &config);
    let hazard = calm(&terrain, &config);

    let start = Vec2::new(2.5, 2.5);
    let goal = Vec2::new(10.5, 10.5);
    assert!(find_path(&grid, &hazard, start, goal, &config).is_none());
}

#[test]
fn test_cloud_crossing_traded_against_detour_length() {
    let config = AiConfig::default();
    let mut terrain = open_map(24);
    // A thin cloud ribbon crossing the whole map: going around is
    // impossible, so the route must pay the cloud surcharge
    terrain.fill_rect(0, 11, 24, 1, TileKind::Cloud);

    let grid = NavigationGrid::build(&terrain, &config);
    let hazard = calm(&terrain, &config);

    let start = Vec2::new(12.5, 4.5);
    let goal = Vec2::new(12.5, 19.5);
    let path = find_path(&grid, &hazard, start, goal, &config).unwrap();
    assert_eq!(path.goal(), Some(goal));
}
