// turn_phase.rs
use crate::card::{hand_gate, HandGate};
use crate::event::GameEvent;
use crate::game::Game;
use crate::player::PlayerId;
use crate::reinforcement;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Setup,
    CardResolution,
    Reinforcement,
    Attack,
    Fortify,
    GameOver,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            TurnPhase::Setup => "setup",
            TurnPhase::CardResolution => "card resolution",
            TurnPhase::Reinforcement => "reinforcement",
            TurnPhase::Attack => "attack",
            TurnPhase::Fortify => "fortify",
            TurnPhase::GameOver => "game over",
        };
        f.write_str(phase)
    }
}

impl Game {
    pub(crate) fn start_turn(&mut self) {
        let player = self.players.player_mut(self.current_turn);
        player.conquered_this_turn = false;
        let name = player.name.clone();
        let hand = player.cards.len();

        info!(player = %name, round = self.round, "turn started");
        self.events.push(GameEvent::TurnStarted {
            player: name,
            round: self.round,
        });

        match hand_gate(hand) {
            HandGate::Disallowed => self.enter_reinforcement(),
            HandGate::Optional | HandGate::Mandatory => self.set_phase(TurnPhase::CardResolution),
        }
    }

    pub(crate) fn enter_reinforcement(&mut self) {
        let armies = reinforcement::compute(&self.board, self.current_turn);
        let player = self.players.player_mut(self.current_turn);
        player.army_pool += armies;
        debug!(player = %player.name, armies, pool = player.army_pool, "reinforcements granted");
        self.events.push(GameEvent::ReinforcementsGranted {
            player: player.name.clone(),
            armies,
        });
        self.set_phase(TurnPhase::Reinforcement);
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        self.turn_phase = phase;
        let player = self.players.player(self.current_turn).name.clone();
        debug!(player = %player, %phase, "phase changed");
        self.events.push(GameEvent::PhaseChanged { player, phase });
    }

    /// Hands control to the next player still in the game, seat order,
    /// wrapping around. A wrap starts a new round.
    pub(crate) fn end_turn(&mut self) {
        self.players.player_mut(self.current_turn).conquered_this_turn = false;

        let seats = self.players.len();
        let current = self.current_turn.0;
        let next = (1..=seats)
            .map(|step| (current + step) % seats)
            .find(|&seat| self.players.player(PlayerId(seat)).alive)
            .unwrap_or(current);
        if next <= current {
            self.round += 1;
        }
        self.current_turn = PlayerId(next);
        self.start_turn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardKind;
    use crate::game::GameSettings;
    use crate::player::Color;

    fn started(players: usize) -> Game {
        let mut game = Game::classic(GameSettings::seeded(11)).unwrap();
        for color in Color::ALL.into_iter().take(players) {
            game.add_player(&format!("{color} player"), color).unwrap();
        }
        game.start_game().unwrap();
        game
    }

    #[test]
    fn rotation_skips_eliminated_players_and_counts_rounds() {
        let mut game = started(3);
        game.players.player_mut(PlayerId(1)).alive = false;
        assert_eq!(game.round, 1);

        game.end_turn();
        assert_eq!(game.current_turn, PlayerId(2));
        game.end_turn();
        assert_eq!(game.current_turn, PlayerId(0));
        assert_eq!(game.round, 2);
    }

    #[test]
    fn small_hands_go_straight_to_reinforcement() {
        let mut game = started(2);
        game.players.player_mut(PlayerId(1)).cards = vec![CardKind::Infantry; 2];
        game.end_turn();
        assert_eq!(game.turn_phase, TurnPhase::Reinforcement);
        assert!(game.players.player(PlayerId(1)).army_pool >= 3);
    }

    #[test]
    fn three_cards_open_card_resolution() {
        let mut game = started(2);
        game.players.player_mut(PlayerId(1)).cards = vec![CardKind::Infantry; 3];
        game.end_turn();
        assert_eq!(game.turn_phase, TurnPhase::CardResolution);
        assert_eq!(game.players.player(PlayerId(1)).army_pool, 0);
    }

    #[test]
    fn conquest_flag_is_cleared_on_handover() {
        let mut game = started(2);
        game.players.player_mut(PlayerId(0)).conquered_this_turn = true;
        game.players.player_mut(PlayerId(1)).conquered_this_turn = true;
        game.end_turn();
        assert!(!game.players.player(PlayerId(0)).conquered_this_turn);
        assert!(!game.players.player(PlayerId(1)).conquered_this_turn);
    }
}
