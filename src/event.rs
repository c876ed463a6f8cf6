// event.rs
use crate::card::CardKind;
use crate::player::Color;
use crate::turn_phase::TurnPhase;
use serde::{Deserialize, Serialize};

/// State changes a broadcaster can relay. Pushed in the order they happen
/// and drained by whoever dispatched the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        player: String,
        color: Color,
    },
    PlayerLeft {
        player: String,
        color: Color,
    },
    GameStarted {
        players: Vec<String>,
    },
    TurnStarted {
        player: String,
        round: usize,
    },
    PhaseChanged {
        player: String,
        phase: TurnPhase,
    },
    ReinforcementsGranted {
        player: String,
        armies: u32,
    },
    ArmiesPlaced {
        player: String,
        territory: String,
        armies: u32,
        garrison: u32,
    },
    BattleResolved {
        attacker: String,
        defender: String,
        from: String,
        to: String,
        attacker_rolls: Vec<u8>,
        defender_rolls: Vec<u8>,
        attacker_losses: u32,
        defender_losses: u32,
    },
    TerritoryConquered {
        player: String,
        territory: String,
        previous_owner: String,
        garrison: u32,
    },
    /// The kind stays private to the hand it went into.
    CardDrawn {
        player: String,
    },
    CardsTradedIn {
        player: String,
        cards: Vec<CardKind>,
        reward: u32,
    },
    UnitsMoved {
        player: String,
        from: String,
        to: String,
        units: u32,
    },
    PlayerEliminated {
        player: String,
        by: String,
    },
    GameWon {
        player: String,
        mission: Option<String>,
    },
}
