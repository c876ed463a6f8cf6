// territory.rs
use crate::continent::ContinentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Index of a territory in the board's arena. Stable for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub usize);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub code: String,
    pub continent: ContinentId,
    pub adjacent_territories: BTreeSet<TerritoryId>,
}

impl Territory {
    pub fn new(id: TerritoryId, name: &str, code: &str, continent: ContinentId) -> Self {
        Self {
            id,
            name: name.to_string(),
            code: code.to_string(),
            continent,
            adjacent_territories: BTreeSet::new(),
        }
    }

    // Adjacency is frozen once the board is built, so only the loader may call this.
    pub(crate) fn add_adjacent(&mut self, adjacent: TerritoryId) {
        if adjacent != self.id {
            self.adjacent_territories.insert(adjacent);
        }
    }

    pub fn is_adjacent(&self, territory: TerritoryId) -> bool {
        self.adjacent_territories.contains(&territory)
    }

    pub fn get_continent(&self) -> ContinentId {
        self.continent
    }
}
