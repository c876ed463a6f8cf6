// continent.rs
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContinentId(pub usize);

/// A fixed group of territories. Who controls it is never stored here;
/// ask the board, which derives it from current ownership.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Continent {
    pub id: ContinentId,
    pub name: String,
    pub bonus_armies: u32,
    pub territories: BTreeSet<TerritoryId>,
}

impl Continent {
    pub fn new(id: ContinentId, name: &str, bonus_armies: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            bonus_armies,
            territories: BTreeSet::new(),
        }
    }

    pub(crate) fn add_territory(&mut self, territory: TerritoryId) {
        self.territories.insert(territory);
    }

    pub fn get_bonus(&self) -> u32 {
        self.bonus_armies
    }
}
