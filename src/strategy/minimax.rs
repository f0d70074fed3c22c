//! Bounded-depth adversarial planner
//!
//! The maximizing layer enumerates the agent's own filtered actions; the
//! minimizing layer applies one deterministic most-aggressive opponent
//! projection (the foe closes distance at a fixed simulated speed)
//! instead of a full adversarial tree, which keeps branching constant.
//! Total node evaluations are additionally capped by an explicit budget
//! counter, so per-decision cost stays bounded even if the action set
//! grows.

use crate::core::config::AiConfig;
use crate::core::types::Tick;
use crate::strategy::actions::{available_actions, StrategicAction, TOWER_COST};
use crate::strategy::snapshot::{GameStateSnapshot, SensedPoint};

/// Weights for the hand-tuned position evaluation
#[derive(Debug, Clone)]
pub struct HeuristicWeights {
    /// Reward for proximity to collectible resources
    pub resource_weight: f32,
    /// Penalty for proximity to the nearest foe
    pub threat_penalty: f32,
    /// Reward per tower erected during the projection
    pub build_reward: f32,
    /// Multiplier on build reward when allies are damaged or threats near
    pub build_urgency_bonus: f32,
    /// Preferred stand-off distance from build sites, in tiles
    pub standoff_tiles: f32,
    /// Penalty per tile of deviation from the stand-off band
    pub standoff_weight: f32,
    /// Penalty for ending the decision standing on a buildable tile
    pub squat_penalty: f32,
    /// Penalty for proximity to a static mine
    pub mine_penalty: f32,
    /// Reward scaled by remaining health ratio
    pub health_weight: f32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            resource_weight: 20.0,
            threat_penalty: 30.0,
            build_reward: 40.0,
            build_urgency_bonus: 1.5,
            standoff_tiles: 3.0,
            standoff_weight: 2.0,
            squat_penalty: 25.0,
            mine_penalty: 30.0,
            health_weight: 10.0,
        }
    }
}

/// Per-ply discount on rewards accrued during projection; acting now is
/// worth more than acting later
const PLY_DISCOUNT: f32 = 0.9;

/// Ephemeral search node: a projected snapshot plus projection-scoped
/// bookkeeping. Discarded after scoring, never persisted across frames.
#[derive(Debug, Clone)]
struct DecisionNode {
    snapshot: GameStateSnapshot,
    /// Own-action layers applied so far
    ply: u32,
    /// Discounted rewards banked at action-application time
    accrued: f32,
}

impl DecisionNode {
    fn root(snapshot: &GameStateSnapshot) -> Self {
        Self {
            snapshot: snapshot.clone(),
            ply: 0,
            accrued: 0.0,
        }
    }

    /// Forward-simulate one of our own actions: position advances along a
    /// bearing, gold and cooldowns adjust.
    fn apply_action(&self, action: StrategicAction, weights: &HeuristicWeights) -> Self {
        let mut next = self.clone();
        next.ply += 1;
        let discount = PLY_DISCOUNT.powi(self.ply as i32);
        let urgent = self.snapshot.allies_damaged || self.snapshot.foes_nearby > 0;
        let snapshot = &mut next.snapshot;
        let step = snapshot.max_speed;

        match action {
            StrategicAction::Hold | StrategicAction::GetUnstuck => {}
            StrategicAction::NavigateToResource => {
                if let Some(resource) = snapshot.nearest_resource {
                    let travel = step.min(resource.distance);
                    snapshot.position += resource.bearing * travel;
                }
            }
            StrategicAction::Retreat => {
                if let Some(foe) = snapshot.nearest_foe {
                    snapshot.position += foe.bearing * -step;
                }
            }
            StrategicAction::BuildTower => {
                snapshot.gold = snapshot.gold.saturating_sub(TOWER_COST);
                snapshot.nearest_build_site = None;
                snapshot.on_build_site = false;
                // Bank the reward now: a tower standing for the rest of
                // the projection beats the same tower built later
                let urgency = if urgent { weights.build_urgency_bonus } else { 1.0 };
                next.accrued += weights.build_reward * urgency * discount;
            }
            StrategicAction::ActivateAbility => {
                snapshot.ability_ready = false;
                snapshot.foes_nearby = snapshot.foes_nearby.saturating_sub(1);
            }
        }

        next.refresh_bearings();
        next
    }

    /// Minimizing layer: the most aggressive opponent response. The foe
    /// closes at a fixed simulated speed and lands a hit at contact.
    fn opponent_response(&self, config: &AiConfig) -> Self {
        let mut next = self.clone();
        let snapshot = &mut next.snapshot;

        if let Some(foe) = snapshot.nearest_foe {
            let closing = config.opponent_sim_speed * snapshot.tile_size;
            let advance = closing.min(foe.distance);
            let new_position = foe.position + foe.bearing * -advance;
            snapshot.nearest_foe = Some(SensedPoint::toward(snapshot.position, new_position));

            if snapshot.nearest_foe.map(|f| f.distance).unwrap_or(f32::MAX)
                < snapshot.tile_size
            {
                snapshot.health_ratio = (snapshot.health_ratio - 0.15).max(0.0);
            }
        }

        next
    }

    /// Re-derive distances and bearings after our position moved
    fn refresh_bearings(&mut self) {
        let position = self.snapshot.position;
        if let Some(foe) = self.snapshot.nearest_foe {
            self.snapshot.nearest_foe = Some(SensedPoint::toward(position, foe.position));
        }
        if let Some(resource) = self.snapshot.nearest_resource {
            self.snapshot.nearest_resource =
                Some(SensedPoint::toward(position, resource.position));
        }
        if let Some(site) = self.snapshot.nearest_build_site {
            let refreshed = SensedPoint::toward(position, site.position);
            self.snapshot.on_build_site = refreshed.distance < self.snapshot.tile_size * 0.5;
            self.snapshot.nearest_build_site = Some(refreshed);
        }
        if let Some(island) = self.snapshot.nearest_island {
            self.snapshot.nearest_island = Some(SensedPoint::toward(position, island.position));
        }
        if let Some(mine) = self.snapshot.nearest_mine {
            self.snapshot.nearest_mine = Some(SensedPoint::toward(position, mine.position));
        }
    }
}

/// Hierarchical decision maker for one mobile agent
///
/// Runs on a slower cadence than steering: a per-agent veto timer gates
/// `decide_if_due`, and the timer resets whenever a decision commits.
pub struct StrategicPlanner {
    weights: HeuristicWeights,
    last_decision: Option<Tick>,
}

impl StrategicPlanner {
    pub fn new() -> Self {
        Self {
            weights: HeuristicWeights::default(),
            last_decision: None,
        }
    }

    pub fn with_weights(weights: HeuristicWeights) -> Self {
        Self {
            weights,
            last_decision: None,
        }
    }

    /// Is the veto timer expired?
    pub fn due(&self, current_tick: Tick, config: &AiConfig) -> bool {
        match self.last_decision {
            None => true,
            Some(last) => current_tick >= last + config.decision_veto_ticks,
        }
    }

    /// Run the search if the veto timer allows it; commits reset the timer
    pub fn decide_if_due(
        &mut self,
        snapshot: &GameStateSnapshot,
        config: &AiConfig,
        current_tick: Tick,
    ) -> Option<StrategicAction> {
        if !self.due(current_tick, config) {
            return None;
        }
        let action = self.decide(snapshot, config);
        self.last_decision = Some(current_tick);
        tracing::debug!(?action, "strategy committed");
        Some(action)
    }

    /// Choose the best action for this snapshot
    ///
    /// The stuck override bypasses the search entirely: a stuck agent
    /// always gets `GetUnstuck` no matter what else the snapshot says.
    pub fn decide(&self, snapshot: &GameStateSnapshot, config: &AiConfig) -> StrategicAction {
        if snapshot.is_stuck {
            return StrategicAction::GetUnstuck;
        }

        let actions = available_actions(snapshot, config);
        let root = DecisionNode::root(snapshot);
        let mut budget = config.node_budget;

        let mut best_action = StrategicAction::Hold;
        let mut best_value = f32::NEG_INFINITY;
        for action in actions {
            if budget == 0 {
                break;
            }
            budget -= 1;
            let own = root.apply_action(action, &self.weights);
            let countered = own.opponent_response(config);
            let value = self.search(
                &countered,
                config.search_depth.saturating_sub(1),
                config,
                &mut budget,
            );
            // Strictly-greater keeps ties on the earliest action, so the
            // choice is deterministic for a fixed snapshot
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        best_action
    }

    fn search(&self, node: &DecisionNode, depth: u32, config: &AiConfig, budget: &mut u32) -> f32 {
        if depth == 0 || *budget == 0 {
            return self.evaluate(node);
        }

        let actions = available_actions(&node.snapshot, config);
        let mut best = f32::NEG_INFINITY;
        for action in actions {
            if *budget == 0 {
                break;
            }
            *budget -= 1;
            let own = node.apply_action(action, &self.weights);
            let countered = own.opponent_response(config);
            best = best.max(self.search(&countered, depth - 1, config, budget));
        }

        if best == f32::NEG_INFINITY {
            self.evaluate(node)
        } else {
            best
        }
    }

    /// Hand-tuned position evaluation
    fn evaluate(&self, node: &DecisionNode) -> f32 {
        let snapshot = &node.snapshot;
        let weights = &self.weights;
        let tile = snapshot.tile_size.max(1e-4);
        let mut score = 0.0;

        if let Some(resource) = snapshot.nearest_resource {
            score += weights.resource_weight / (1.0 + resource.distance / tile);
        }

        if let Some(foe) = snapshot.nearest_foe {
            score -= weights.threat_penalty / (1.0 + foe.distance / tile);
        }

        score += node.accrued;

        if let Some(site) = snapshot.nearest_build_site {
            let deviation = (site.distance / tile - weights.standoff_tiles).abs();
            score -= weights.standoff_weight * deviation;
        }

        if snapshot.on_build_site {
            score -= weights.squat_penalty;
        }

        if let Some(mine) = snapshot.nearest_mine {
            score -= weights.mine_penalty / (1.0 + mine.distance / tile);
        }

        score += weights.health_weight * snapshot.health_ratio;
        score
    }
}

impl Default for StrategicPlanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{TeamId, Vec2};
    use crate::world::arena::AgentBehaviorKind;

    fn snapshot(behavior: AgentBehaviorKind) -> GameStateSnapshot {
        GameStateSnapshot {
            position: Vec2::new(10.0, 10.0),
            heading: 0.0,
            health_ratio: 1.0,
            team: TeamId(1),
            behavior,
            gold: 0,
            max_speed: 4.0,
            tile_size: 1.0,
            nearest_foe: None,
            foes_nearby: 0,
            nearest_ally: None,
            allies_nearby: 0,
            allies_damaged: false,
            nearest_resource: None,
            nearest_build_site: None,
            on_build_site: false,
            nearest_island: None,
            nearest_mine: None,
            ability_ready: false,
            unit_count: 0,
            is_stuck: false,
        }
    }

    fn sensed(from: Vec2, x: f32, y: f32) -> SensedPoint {
        SensedPoint::toward(from, Vec2::new(x, y))
    }

    #[test]
    fn test_stuck_override_beats_everything() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Kamikaze);
        snap.is_stuck = true;
        snap.gold = 1000;
        snap.nearest_resource = Some(sensed(snap.position, 12.0, 10.0));
        snap.nearest_foe = Some(sensed(snap.position, 11.0, 10.0));
        snap.ability_ready = true;

        assert_eq!(planner.decide(&snap, &config), StrategicAction::GetUnstuck);
    }

    #[test]
    fn test_navigates_to_resource_when_safe() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Harvester);
        snap.nearest_resource = Some(sensed(snap.position, 20.0, 10.0));

        assert_eq!(
            planner.decide(&snap, &config),
            StrategicAction::NavigateToResource
        );
    }

    #[test]
    fn test_retreats_from_close_foe() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Kamikaze);
        snap.health_ratio = 0.4;
        snap.nearest_foe = Some(sensed(snap.position, 12.0, 10.0));
        snap.foes_nearby = 1;

        assert_eq!(planner.decide(&snap, &config), StrategicAction::Retreat);
    }

    #[test]
    fn test_architect_builds_under_pressure() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Architect);
        snap.gold = 200;
        snap.allies_damaged = true;
        snap.nearest_build_site = Some(sensed(snap.position, 13.0, 10.0));
        snap.nearest_foe = Some(sensed(snap.position, 18.0, 10.0));

        assert_eq!(planner.decide(&snap, &config), StrategicAction::BuildTower);
    }

    #[test]
    fn test_mined_salvage_is_not_worth_approaching() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Harvester);
        snap.nearest_resource = Some(sensed(snap.position, 15.0, 10.0));

        // Clear water: go get it
        assert_eq!(
            planner.decide(&snap, &config),
            StrategicAction::NavigateToResource
        );

        // Same salvage sitting on a mine: leave it alone
        snap.nearest_mine = Some(sensed(snap.position, 15.0, 10.0));
        assert_eq!(planner.decide(&snap, &config), StrategicAction::Hold);
    }

    #[test]
    fn test_empty_world_holds() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();
        let snap = snapshot(AgentBehaviorKind::Kamikaze);
        assert_eq!(planner.decide(&snap, &config), StrategicAction::Hold);
    }

    #[test]
    fn test_decision_is_deterministic() {
        let config = AiConfig::default();
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Kamikaze);
        snap.nearest_resource = Some(sensed(snap.position, 25.0, 14.0));
        snap.nearest_foe = Some(sensed(snap.position, 16.0, 10.0));
        snap.foes_nearby = 1;

        let first = planner.decide(&snap, &config);
        for _ in 0..10 {
            assert_eq!(planner.decide(&snap, &config), first);
        }
    }

    #[test]
    fn test_tiny_node_budget_still_decides() {
        let mut config = AiConfig::default();
        config.node_budget = 1;
        let planner = StrategicPlanner::new();

        let mut snap = snapshot(AgentBehaviorKind::Kamikaze);
        snap.nearest_resource = Some(sensed(snap.position, 20.0, 10.0));
        snap.nearest_foe = Some(sensed(snap.position, 12.0, 10.0));

        // With one node of budget the search degrades but still returns a
        // member of the filtered action set
        let action = planner.decide(&snap, &config);
        assert!(matches!(
            action,
            StrategicAction::Hold | StrategicAction::NavigateToResource | StrategicAction::Retreat
        ));
    }

    #[test]
    fn test_veto_timer_throttles_decisions() {
        let config = AiConfig::default();
        let mut planner = StrategicPlanner::new();
        let snap = snapshot(AgentBehaviorKind::Kamikaze);

        assert!(planner.decide_if_due(&snap, &config, 100).is_some());
        assert!(planner.decide_if_due(&snap, &config, 101).is_none());
        assert!(planner
            .decide_if_due(&snap, &config, 100 + config.decision_veto_ticks)
            .is_some());
    }
}
