use crate::board::Board;
use crate::continent::ContinentId;
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Map description as stored on disk. The classic world map ships embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub continents: Vec<ContinentConfig>,
    pub territories: Vec<TerritoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryConfig {
    pub name: String,
    #[serde(default)]
    pub code: String,
    pub continent: String,
    pub adjacent_territories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinentConfig {
    pub name: String,
    pub bonus_armies: u32,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse map file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("territory '{0}' is defined more than once")]
    DuplicateTerritory(String),
    #[error("continent '{0}' is defined more than once")]
    DuplicateContinent(String),
    #[error("territory '{territory}' names unknown continent '{continent}'")]
    UnknownContinent { territory: String, continent: String },
    #[error("territory '{territory}' names unknown neighbour '{neighbour}'")]
    UnknownNeighbour { territory: String, neighbour: String },
    #[error("continent '{0}' has no territories")]
    EmptyContinent(String),
}

impl GameConfig {
    pub fn classic() -> Result<Self, MapError> {
        let config_data = include_str!("config.json");
        Ok(serde_json::from_str(config_data)?)
    }

    pub fn load_from_file(filename: impl AsRef<Path>) -> Result<Self, MapError> {
        let data = std::fs::read_to_string(filename)?;
        let config: GameConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Builds the static graph. Neighbour lists are made symmetric, so a map
    /// only needs to list each border once.
    pub fn to_board(&self) -> Result<Board, MapError> {
        let mut board = Board::new();
        let mut continents: HashMap<String, ContinentId> = HashMap::new();
        let mut territories: HashMap<String, TerritoryId> = HashMap::new();

        for continent in &self.continents {
            let key = continent.name.to_lowercase();
            if continents.contains_key(&key) {
                return Err(MapError::DuplicateContinent(continent.name.clone()));
            }
            let id = board.add_continent(&continent.name, continent.bonus_armies);
            continents.insert(key, id);
        }

        for territory in &self.territories {
            let key = territory.name.to_lowercase();
            if territories.contains_key(&key) {
                return Err(MapError::DuplicateTerritory(territory.name.clone()));
            }
            let continent = continents
                .get(&territory.continent.to_lowercase())
                .copied()
                .ok_or_else(|| MapError::UnknownContinent {
                    territory: territory.name.clone(),
                    continent: territory.continent.clone(),
                })?;
            let id = board.add_territory(&territory.name, &territory.code, continent);
            territories.insert(key, id);
        }

        for territory in &self.territories {
            let id = territories[&territory.name.to_lowercase()];
            for neighbour in &territory.adjacent_territories {
                let other = territories
                    .get(&neighbour.to_lowercase())
                    .copied()
                    .ok_or_else(|| MapError::UnknownNeighbour {
                        territory: territory.name.clone(),
                        neighbour: neighbour.clone(),
                    })?;
                board.connect(id, other);
            }
        }

        if let Some(empty) = board.continents.iter().find(|c| c.territories.is_empty()) {
            return Err(MapError::EmptyContinent(empty.name.clone()));
        }

        Ok(board)
    }
}
