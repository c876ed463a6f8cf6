// player.rs
use crate::card::CardKind;
use crate::error::{EntityKind, GameError, Result};
use crate::mission::Mission;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat index. Stable once the game has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
    Pink,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Green,
        Color::Yellow,
        Color::Black,
        Color::Pink,
    ];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub army_pool: u32,
    pub cards: Vec<CardKind>,
    pub mission: Option<Mission>,
    pub conquered_this_turn: bool,
    pub alive: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, color: Color) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
            army_pool: 0,
            cards: Vec::new(),
            mission: None,
            conquered_this_turn: false,
            alive: true,
        }
    }

    pub fn holds(&self, wanted: &[CardKind]) -> bool {
        let mut hand = self.cards.clone();
        wanted.iter().all(|kind| match hand.iter().position(|c| c == kind) {
            Some(i) => {
                hand.swap_remove(i);
                true
            }
            None => false,
        })
    }

    /// Removes one card of each listed kind. Callers check `holds` first.
    pub(crate) fn remove_cards(&mut self, cards: &[CardKind]) {
        for kind in cards {
            if let Some(i) = self.cards.iter().position(|c| c == kind) {
                self.cards.remove(i);
            }
        }
    }
}

/// Lobby roster plus the shared colour pool. Every colour is either in
/// `available_colors` or worn by exactly one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    available_colors: Vec<Color>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            available_colors: Color::ALL.to_vec(),
        }
    }

    pub fn add(&mut self, name: &str, color: Color) -> Result<PlayerId> {
        let name = name.trim();
        if self.players.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(GameError::DuplicatePlayer(name.to_string()));
        }
        let slot = self
            .available_colors
            .iter()
            .position(|&c| c == color)
            .ok_or(GameError::ColorUnavailable(color))?;
        self.available_colors.remove(slot);

        let id = PlayerId(self.players.len());
        self.players.push(Player::new(id, name, color));
        Ok(id)
    }

    /// Removes a player and hands their colour back. Seats after the removed
    /// one shift down so ids stay equal to seat indices.
    pub fn remove(&mut self, name: &str) -> Result<Player> {
        let id = self.id_of(name)?;
        let player = self.players.remove(id.0);
        self.available_colors.push(player.color);
        for (seat, p) in self.players.iter_mut().enumerate() {
            p.id = PlayerId(seat);
        }
        Ok(player)
    }

    pub fn id_of(&self, name: &str) -> Result<PlayerId> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .map(|p| p.id)
            .ok_or_else(|| GameError::not_found(EntityKind::Player, name))
    }

    pub fn by_name(&self, name: &str) -> Result<&Player> {
        self.id_of(name).map(|id| self.player(id))
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.0]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn available_colors(&self) -> &[Color] {
        &self.available_colors
    }

    pub fn seated_colors(&self) -> Vec<Color> {
        self.players.iter().map(|p| p.color).collect()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
