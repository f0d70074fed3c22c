//! Generational agent arena
//!
//! Agents live in a dense arena indexed by a stable handle (index +
//! generation counter). A destroyed slot can be re-used without old
//! handles resolving to the new occupant: the generation check fails and
//! the caller sees a stale reference instead of somebody else's agent.

use crate::core::types::{TeamId, Tick, Vec2};
use std::collections::VecDeque;

/// Stable reference to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentHandle {
    pub index: u32,
    pub generation: u32,
}

/// Behavior class resolved once at spawn time
///
/// Carried on the agent record so nothing ever has to branch on type
/// names at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentBehaviorKind {
    /// Dive-at-the-enemy attack unit
    Kamikaze,
    /// Builds defensive structures near friendly sites
    Architect,
    /// Stationary base deciding unit production
    BaseProducer,
    /// Roaming resource collector
    Harvester,
}

/// One live agent
#[derive(Debug, Clone)]
pub struct Agent {
    pub handle: AgentHandle,
    pub position: Vec2,
    /// Radians, atan2 convention
    pub heading: f32,
    pub max_speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub team: TeamId,
    pub behavior: AgentBehaviorKind,
    /// Ticks until the special ability is available again (0 = ready)
    pub ability_cooldown: Tick,
    /// Recent positions, newest last; drives the stuck check
    pub position_history: VecDeque<Vec2>,
}

impl Agent {
    pub fn new(position: Vec2, team: TeamId, behavior: AgentBehaviorKind) -> Self {
        Self {
            // Placeholder until the arena assigns the real handle on spawn
            handle: AgentHandle {
                index: u32::MAX,
                generation: 0,
            },
            position,
            heading: 0.0,
            max_speed: 4.0,
            health: 100.0,
            max_health: 100.0,
            team,
            behavior,
            ability_cooldown: 0,
            position_history: VecDeque::new(),
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Push a position sample, keeping at most `window` entries
    pub fn record_position(&mut self, window: usize) {
        self.position_history.push_back(self.position);
        while self.position_history.len() > window {
            self.position_history.pop_front();
        }
    }
}

enum Slot {
    Occupied(Agent),
    Free,
}

/// Dense arena of agents with generation-checked handles
pub struct AgentArena {
    slots: Vec<Slot>,
    generations: Vec<u32>,
    free: Vec<u32>,
    len: usize,
}

impl AgentArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn spawn(&mut self, mut agent: Agent) -> AgentHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::Free);
                self.generations.push(0);
                (self.slots.len() - 1) as u32
            }
        };
        let handle = AgentHandle {
            index,
            generation: self.generations[index as usize],
        };
        agent.handle = handle;
        self.slots[index as usize] = Slot::Occupied(agent);
        self.len += 1;
        handle
    }

    /// Remove the agent; its slot becomes reusable under a new generation
    pub fn despawn(&mut self, handle: AgentHandle) -> Option<Agent> {
        if !self.contains(handle) {
            return None;
        }
        let slot = std::mem::replace(&mut self.slots[handle.index as usize], Slot::Free);
        self.generations[handle.index as usize] += 1;
        self.free.push(handle.index);
        self.len -= 1;
        match slot {
            Slot::Occupied(agent) => Some(agent),
            Slot::Free => None,
        }
    }

    /// True when the handle still refers to a live agent
    pub fn contains(&self, handle: AgentHandle) -> bool {
        (handle.index as usize) < self.slots.len()
            && self.generations[handle.index as usize] == handle.generation
            && matches!(self.slots[handle.index as usize], Slot::Occupied(_))
    }

    pub fn get(&self, handle: AgentHandle) -> Option<&Agent> {
        if !self.contains(handle) {
            return None;
        }
        match &self.slots[handle.index as usize] {
            Slot::Occupied(agent) => Some(agent),
            Slot::Free => None,
        }
    }

    pub fn get_mut(&mut self, handle: AgentHandle) -> Option<&mut Agent> {
        if !self.contains(handle) {
            return None;
        }
        match &mut self.slots[handle.index as usize] {
            Slot::Occupied(agent) => Some(agent),
            Slot::Free => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(agent) => Some(agent),
            Slot::Free => None,
        })
    }

    pub fn handles(&self) -> Vec<AgentHandle> {
        self.iter().map(|a| a.handle).collect()
    }
}

impl Default for AgentArena {
    fn default() -> Self {
        Self::new()
    }
}
