// lib.rs
pub mod board;
pub mod card;
pub mod combat;
pub mod continent;
pub mod dice;
pub mod error;
pub mod event;
pub mod game;
pub mod game_config;
pub mod mission;
pub mod odds;
pub mod player;
pub mod reinforcement;
pub mod territory;
pub mod turn_phase;


pub use error::{GameError, Result};
pub use game::{Game, GameSettings};
