//! Boid-style flocking forces
//!
//! Separation, alignment and cohesion over same-team neighbors of the
//! same behavior class, each independently weighted. Pure functions over
//! a neighbor slice; the controller decides who counts as a neighbor.

use crate::core::config::AiConfig;
use crate::core::types::Vec2;
use crate::world::arena::Agent;

/// Inverse-square repulsion from neighbors inside the tight separation
/// radius
pub fn separation(agent: &Agent, neighbors: &[&Agent], radius: f32) -> Vec2 {
    let mut force = Vec2::ZERO;
    for other in neighbors {
        let offset = agent.position - other.position;
        let distance = offset.length();
        if distance > radius || distance < 1e-4 {
            continue;
        }
        force += offset.normalize() * (1.0 / (distance * distance));
    }
    force
}

/// Average heading of neighbors
pub fn alignment(neighbors: &[&Agent]) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let mut sum = Vec2::ZERO;
    for other in neighbors {
        sum += Vec2::from_angle(other.heading);
    }
    (sum * (1.0 / neighbors.len() as f32)).normalize()
}

/// Unit vector toward the neighbor centroid
pub fn cohesion(agent: &Agent, neighbors: &[&Agent]) -> Vec2 {
    if neighbors.is_empty() {
        return Vec2::ZERO;
    }
    let mut centroid = Vec2::ZERO;
    for other in neighbors {
        centroid += other.position;
    }
    centroid = centroid * (1.0 / neighbors.len() as f32);
    agent.position.bearing_to(&centroid)
}

/// Weighted sum of the three flocking forces
///
/// `tile_size` converts the tile-denominated separation radius from
/// config into world units.
pub fn flocking_force(
    agent: &Agent,
    neighbors: &[&Agent],
    config: &AiConfig,
    tile_size: f32,
) -> Vec2 {
    separation(
        agent,
        neighbors,
        config.separation_radius_tiles * tile_size,
    ) * config.separation_weight
        + alignment(neighbors) * config.alignment_weight
        + cohesion(agent, neighbors) * config.cohesion_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TeamId;
    use crate::world::arena::AgentBehaviorKind;

    fn agent_at(x: f32, y: f32, heading: f32) -> Agent {
        let mut agent = Agent::new(Vec2::new(x, y), TeamId(1), AgentBehaviorKind::Kamikaze);
        agent.heading = heading;
        agent
    }

    #[test]
    fn test_separation_pushes_away_from_close_neighbor() {
        let me = agent_at(10.0, 10.0, 0.0);
        let crowder = agent_at(10.5, 10.0, 0.0);
        let neighbors = vec![&crowder];

        let force = separation(&me, &neighbors, 1.2);
        assert!(force.x < 0.0, "pushed away along -x");
        assert!(force.y.abs() < 1e-5);
    }

    #[test]
    fn test_separation_inverse_square() {
        let me = agent_at(10.0, 10.0, 0.0);
        let near = agent_at(10.2, 10.0, 0.0);
        let far = agent_at(11.0, 10.0, 0.0);

        let near_force = separation(&me, &[&near], 1.2).length();
        let far_force = separation(&me, &[&far], 1.2).length();
        assert!(near_force > far_force * 2.0);
    }

    #[test]
    fn test_separation_ignores_outside_radius() {
        let me = agent_at(10.0, 10.0, 0.0);
        let distant = agent_at(20.0, 10.0, 0.0);
        assert_eq!(separation(&me, &[&distant], 1.2), Vec2::ZERO);
    }

    #[test]
    fn test_alignment_averages_headings() {
        let a = agent_at(0.0, 0.0, 0.0);
        let b = agent_at(1.0, 0.0, std::f32::consts::FRAC_PI_2);
        let aligned = alignment(&[&a, &b]);
        // Average of east and north is northeast
        assert!((aligned.angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    }

    #[test]
    fn test_cohesion_points_at_centroid() {
        let me = agent_at(0.0, 0.0, 0.0);
        let a = agent_at(10.0, 0.0, 0.0);
        let b = agent_at(10.0, 10.0, 0.0);
        let force = cohesion(&me, &[&a, &b]);
        // Centroid at (10, 5)
        let expected = Vec2::new(10.0, 5.0).normalize();
        assert!((force.x - expected.x).abs() < 1e-4);
        assert!((force.y - expected.y).abs() < 1e-4);
    }

    #[test]
    fn test_empty_neighbors_zero_force() {
        let me = agent_at(0.0, 0.0, 0.0);
        assert_eq!(alignment(&[]), Vec2::ZERO);
        assert_eq!(cohesion(&me, &[]), Vec2::ZERO);
        assert_eq!(
            flocking_force(&me, &[], &crate::core::config::AiConfig::default(), 32.0),
            Vec2::ZERO
        );
    }
}
