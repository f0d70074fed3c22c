//! Strategic action set and contextual filtering
//!
//! The action set is closed and small; filtering prunes it before search
//! so minimax branching stays bounded no matter what the world looks
//! like. The caller enforces filtering as a hard invariant: the search
//! never sees an action that is invalid in the current snapshot.

use crate::core::config::AiConfig;
use crate::strategy::snapshot::GameStateSnapshot;
use crate::world::arena::AgentBehaviorKind;

/// Gold cost of erecting a defense tower
pub const TOWER_COST: u32 = 120;

/// High-level action chosen by the strategic layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategicAction {
    /// Stay put; also the degraded default when nothing else is valid
    Hold,
    /// Navigate toward the nearest collectible resource
    NavigateToResource,
    /// Fall back toward the safest nearby point
    Retreat,
    /// Erect a defense structure at the nearby build site
    BuildTower,
    /// Fire the special ability
    ActivateAbility,
    /// Break out of a stuck position; overrides normal search entirely
    GetUnstuck,
}

/// Candidate actions valid in this snapshot
///
/// Build is only offered near a valid, unoccupied site with enough gold;
/// abilities only off cooldown; retreat only when there is something to
/// retreat from. `GetUnstuck` is not produced here: the stuck override
/// happens before filtering and bypasses the search.
pub fn available_actions(snapshot: &GameStateSnapshot, config: &AiConfig) -> Vec<StrategicAction> {
    let mut actions = vec![StrategicAction::Hold];

    if snapshot.nearest_resource.is_some() {
        actions.push(StrategicAction::NavigateToResource);
    }

    if snapshot.nearest_foe.is_some() || snapshot.foes_nearby > 0 {
        actions.push(StrategicAction::Retreat);
    }

    if snapshot.behavior == AgentBehaviorKind::Architect && snapshot.gold >= TOWER_COST {
        if let Some(site) = snapshot.nearest_build_site {
            let build_range = config.neighbor_radius_tiles * snapshot.tile_size * 4.0;
            if site.distance <= build_range {
                actions.push(StrategicAction::BuildTower);
            }
        }
    }

    if snapshot.ability_ready && snapshot.foes_nearby > 0 {
        actions.push(StrategicAction::ActivateAbility);
    }

    actions
}
