//! Learned value table for base-level production decisions
//!
//! The mobile planner searches; the base does not. Production choices
//! come from a precomputed table keyed on a small discretized feature
//! vector, loaded once at startup and treated as read-only. Epsilon
//! exploration only happens when an external training harness flips
//! the training flag.

use std::path::Path;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{CoreError, Result};
use crate::strategy::snapshot::GameStateSnapshot;

/// Unit-production actions available to a base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionAction {
    ProduceKamikaze,
    ProduceArchitect,
    ProduceHarvester,
    ProduceNothing,
}

impl ProductionAction {
    pub const ALL: [ProductionAction; 4] = [
        ProductionAction::ProduceKamikaze,
        ProductionAction::ProduceArchitect,
        ProductionAction::ProduceHarvester,
        ProductionAction::ProduceNothing,
    ];

    /// Gold price of the action
    pub fn cost(&self) -> u32 {
        match self {
            ProductionAction::ProduceKamikaze => 50,
            ProductionAction::ProduceArchitect => 80,
            ProductionAction::ProduceHarvester => 40,
            ProductionAction::ProduceNothing => 0,
        }
    }
}

/// Discretized situation key. Coarse bands keep the table small and make
/// nearby situations share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureKey {
    /// Gold banded in steps of 50, capped at band 5
    pub gold_band: u8,
    /// Health ratio banded into quarters
    pub health_band: u8,
    /// Friendly unit count banded in steps of 3, capped at band 4
    pub unit_band: u8,
    /// Whether any hostiles are currently sensed
    pub enemy_sighted: bool,
}

impl FeatureKey {
    pub fn from_snapshot(snapshot: &GameStateSnapshot) -> Self {
        Self {
            gold_band: ((snapshot.gold / 50).min(5)) as u8,
            health_band: ((snapshot.health_ratio * 4.0) as u8).min(3),
            unit_band: ((snapshot.unit_count / 3).min(4)) as u8,
            enemy_sighted: snapshot.foes_nearby > 0,
        }
    }
}

/// One row of the persisted table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableEntry {
    key: FeatureKey,
    values: AHashMap<ProductionAction, f32>,
}

/// Read-only action-value table loaded from a JSON blob
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    entries: AHashMap<FeatureKey, AHashMap<ProductionAction, f32>>,
}

impl ValueTable {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let rows: Vec<TableEntry> = serde_json::from_str(raw)?;
        let mut entries = AHashMap::with_capacity(rows.len());
        for row in rows {
            entries.insert(row.key, row.values);
        }
        Ok(Self { entries })
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ModelError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Value of an action in a given situation, zero when unlearned
    pub fn value(&self, key: &FeatureKey, action: ProductionAction) -> f32 {
        self.entries
            .get(key)
            .and_then(|values| values.get(&action))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Production decision maker for a base agent
///
/// Without a table it degrades to `ProduceNothing` rather than erroring:
/// a base that builds nothing is dull but never wrong.
pub struct BaseProducer {
    table: Option<ValueTable>,
    /// Exploration probability, only consulted in training mode
    epsilon: f32,
    training: bool,
    rng: ChaCha8Rng,
}

impl BaseProducer {
    pub fn new(table: Option<ValueTable>, rng: ChaCha8Rng) -> Self {
        if table.is_none() {
            tracing::warn!("no production value table loaded, base will idle");
        }
        Self {
            table,
            epsilon: 0.1,
            training: false,
            rng,
        }
    }

    /// Enable epsilon-random exploration for an external training harness
    pub fn with_training(mut self, epsilon: f32) -> Self {
        self.training = true;
        self.epsilon = epsilon.clamp(0.0, 1.0);
        self
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    /// Pick a production action for the current situation
    ///
    /// Argmax over affordable actions; ties resolve to the earliest entry
    /// of `ProductionAction::ALL`, so the choice is deterministic outside
    /// training mode.
    pub fn decide(&mut self, snapshot: &GameStateSnapshot) -> ProductionAction {
        let table = match &self.table {
            Some(table) => table,
            None => return ProductionAction::ProduceNothing,
        };

        let affordable: Vec<ProductionAction> = ProductionAction::ALL
            .iter()
            .copied()
            .filter(|action| action.cost() <= snapshot.gold)
            .collect();

        if self.training && self.rng.gen::<f32>() < self.epsilon {
            let idx = self.rng.gen_range(0..affordable.len());
            return affordable[idx];
        }

        let key = FeatureKey::from_snapshot(snapshot);
        let mut best = ProductionAction::ProduceNothing;
        let mut best_value = OrderedFloat(f32::NEG_INFINITY);
        for action in affordable {
            let value = OrderedFloat(table.value(&key, action));
            if value > best_value {
                best_value = value;
                best = action;
            }
        }
        best
    }
}
