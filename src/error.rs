// error.rs
use crate::card::CardKind;
use crate::player::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Territory,
    Continent,
    Player,
    Card,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            EntityKind::Territory => "territory",
            EntityKind::Continent => "continent",
            EntityKind::Player => "player",
            EntityKind::Card => "card",
        };
        f.write_str(kind)
    }
}

/// Every way a command can be rejected. A rejected command never mutates the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    #[error("invalid ownership: {0}")]
    InvalidOwnership(String),

    #[error("'{from}' is not adjacent to '{to}'")]
    InvalidAdjacency { from: String, to: String },

    #[error("invalid unit count: {0}")]
    InvalidUnitCount(String),

    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("it is not {player}'s turn")]
    OutOfTurn { player: String },

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("cards {0:?} do not form a valid set")]
    InvalidCardCombo(Vec<CardKind>),

    #[error("color {0} is already taken")]
    ColorUnavailable(Color),

    #[error("a player named '{0}' already exists")]
    DuplicatePlayer(String),
}

impl GameError {
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        GameError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
