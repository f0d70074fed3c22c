//! Target lock with hysteresis
//!
//! One lock per agent. A newly scored candidate only steals the lock if
//! it beats the current target's score by more than the stickiness
//! margin; without that margin two similarly-ranked targets trade the
//! lock every frame and the agent oscillates between them. Recomputes are
//! additionally rate-limited by a cooldown, bypassed only when the locked
//! target goes stale.

use crate::core::types::{Tick, Vec2};
use crate::world::arena::AgentHandle;

/// An agent's committed target plus recompute bookkeeping
#[derive(Debug, Clone, Default)]
pub struct TargetLock {
    target: Option<AgentHandle>,
    score: f32,
    /// Where the target was last seen; steering falls back to this if the
    /// world no longer resolves the handle mid-tick
    pub last_position: Vec2,
    last_recompute: Option<Tick>,
    force_recompute: bool,
}

impl TargetLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<AgentHandle> {
        self.target
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Is a recompute allowed this tick?
    pub fn recompute_due(&self, current_tick: Tick, cooldown: Tick) -> bool {
        if self.force_recompute || self.target.is_none() {
            return true;
        }
        match self.last_recompute {
            None => true,
            Some(last) => current_tick >= last + cooldown,
        }
    }

    /// Offer a scored candidate; the lock changes only when unset or when
    /// the candidate clears the stickiness margin. Returns true if the
    /// lock changed.
    pub fn offer(
        &mut self,
        candidate: AgentHandle,
        candidate_score: f32,
        candidate_position: Vec2,
        stickiness_margin: f32,
        current_tick: Tick,
    ) -> bool {
        self.last_recompute = Some(current_tick);
        self.force_recompute = false;

        match self.target {
            Some(current) if current != candidate => {
                if candidate_score > self.score * (1.0 + stickiness_margin) {
                    self.target = Some(candidate);
                    self.score = candidate_score;
                    self.last_position = candidate_position;
                    true
                } else {
                    false
                }
            }
            Some(_) => {
                // Same target: refresh score and position, no change
                self.score = candidate_score;
                self.last_position = candidate_position;
                false
            }
            None => {
                self.target = Some(candidate);
                self.score = candidate_score;
                self.last_position = candidate_position;
                true
            }
        }
    }

    /// Refresh the positional snapshot of the current target
    pub fn observe_position(&mut self, position: Vec2) {
        self.last_position = position;
    }

    /// The locked target no longer exists: clear state and force an
    /// immediate recompute, bypassing the cooldown.
    pub fn invalidate(&mut self) {
        self.target = None;
        self.score = 0.0;
        self.force_recompute = true;
    }

    /// Record a recompute that produced no candidate
    pub fn mark_recomputed(&mut self, current_tick: Tick) {
        self.last_recompute = Some(current_tick);
        self.force_recompute = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: u32) -> AgentHandle {
        AgentHandle {
            index,
            generation: 0,
        }
    }

    #[test]
    fn test_first_offer_always_locks() {
        let mut lock = TargetLock::new();
        assert!(lock.offer(handle(1), 10.0, Vec2::new(5.0, 5.0), 0.15, 0));
        assert_eq!(lock.target(), Some(handle(1)));
        assert_eq!(lock.score(), 10.0);
    }

    #[test]
    fn test_marginal_improvement_does_not_steal_lock() {
        let mut lock = TargetLock::new();
        lock.offer(handle(1), 10.0, Vec2::ZERO, 0.15, 0);

        // 10.5 beats 10.0 but not by the required >15%
        assert!(!lock.offer(handle(2), 10.5, Vec2::ZERO, 0.15, 20));
        assert_eq!(lock.target(), Some(handle(1)));
    }

    #[test]
    fn test_material_improvement_steals_lock() {
        let mut lock = TargetLock::new();
        lock.offer(handle(1), 10.0, Vec2::ZERO, 0.15, 0);

        assert!(lock.offer(handle(2), 12.0, Vec2::ZERO, 0.15, 20));
        assert_eq!(lock.target(), Some(handle(2)));
    }

    #[test]
    fn test_no_oscillation_between_similar_targets() {
        let mut lock = TargetLock::new();
        lock.offer(handle(1), 10.0, Vec2::ZERO, 0.15, 0);

        // Two near-equal candidates traded repeatedly must never unseat
        // the original lock
        for tick in 1..50 {
            let (candidate, score) = if tick % 2 == 0 {
                (handle(2), 10.5)
            } else {
                (handle(1), 10.0)
            };
            lock.offer(candidate, score, Vec2::ZERO, 0.15, tick);
            assert_eq!(lock.target(), Some(handle(1)));
        }
    }

    #[test]
    fn test_cooldown_gates_recompute() {
        let mut lock = TargetLock::new();
        assert!(lock.recompute_due(0, 15), "empty lock is always due");
        lock.offer(handle(1), 10.0, Vec2::ZERO, 0.15, 0);

        assert!(!lock.recompute_due(10, 15));
        assert!(lock.recompute_due(15, 15));
    }

    #[test]
    fn test_invalidate_bypasses_cooldown() {
        let mut lock = TargetLock::new();
        lock.offer(handle(1), 10.0, Vec2::ZERO, 0.15, 0);
        assert!(!lock.recompute_due(1, 15));

        lock.invalidate();
        assert!(lock.target().is_none());
        assert!(lock.recompute_due(1, 15));
    }
}
