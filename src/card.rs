// card.rs
use crate::error::{EntityKind, GameError, Result};
use crate::player::Player;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Infantry,
    Cavalry,
    Artillery,
    Joker,
}

pub const UNIT_KINDS: [CardKind; 3] = [CardKind::Infantry, CardKind::Cavalry, CardKind::Artillery];
pub const CARDS_PER_KIND: usize = 14;
pub const JOKERS: usize = 2;

/// Shared draw pile. Traded cards come back here, so the deck never shrinks
/// except by what currently sits in players' hands.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    cards: Vec<CardKind>,
}

impl Deck {
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(CARDS_PER_KIND * UNIT_KINDS.len() + JOKERS);
        for _ in 0..CARDS_PER_KIND {
            cards.extend_from_slice(&UNIT_KINDS);
        }
        cards.extend(std::iter::repeat(CardKind::Joker).take(JOKERS));
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn count(&self, kind: CardKind) -> usize {
        self.cards.iter().filter(|&&c| c == kind).count()
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CardKind> {
        if self.cards.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.cards.len());
        Some(self.cards.swap_remove(index))
    }

    pub fn return_cards(&mut self, cards: &[CardKind]) {
        self.cards.extend_from_slice(cards);
    }
}

/// What the hand size allows at the start of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandGate {
    Disallowed,
    Optional,
    Mandatory,
}

pub fn hand_gate(hand_size: usize) -> HandGate {
    match hand_size {
        0..=2 => HandGate::Disallowed,
        3 | 4 => HandGate::Optional,
        _ => HandGate::Mandatory,
    }
}

/// Three of a kind, one of each, or anything with a joker in it.
pub fn is_valid_trade(cards: &[CardKind]) -> bool {
    if cards.len() != 3 {
        return false;
    }
    if cards.contains(&CardKind::Joker) {
        return true;
    }
    let all_same = cards[0] == cards[1] && cards[1] == cards[2];
    let all_different = cards[0] != cards[1] && cards[1] != cards[2] && cards[0] != cards[2];
    all_same || all_different
}

/// Armies paid for the turn-in made while `turn_ins` sets have already been
/// traded this session.
pub fn trade_in_reward(turn_ins: u32) -> u32 {
    match turn_ins {
        0..=4 => 4 + 2 * turn_ins,
        5 => 15,
        6 => 20,
        n => 25 + 5 * (n - 7),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardEconomy {
    pub deck: Deck,
    turn_ins: u32,
}

impl CardEconomy {
    pub fn new() -> Self {
        Self {
            deck: Deck::standard(),
            turn_ins: 0,
        }
    }

    pub fn turn_ins(&self) -> u32 {
        self.turn_ins
    }

    pub fn next_reward(&self) -> u32 {
        trade_in_reward(self.turn_ins)
    }

    pub fn draw_for<R: Rng + ?Sized>(&mut self, player: &mut Player, rng: &mut R) -> Option<CardKind> {
        let card = self.deck.draw(rng)?;
        player.cards.push(card);
        debug!(player = %player.name, ?card, left = self.deck.len(), "card drawn");
        Some(card)
    }

    /// Trades three cards for armies. Everything is checked before the hand,
    /// deck, pool or counter is touched.
    pub fn turn_in(&mut self, player: &mut Player, cards: [CardKind; 3]) -> Result<u32> {
        if hand_gate(player.cards.len()) == HandGate::Disallowed {
            return Err(GameError::InsufficientResources(format!(
                "{} holds {} cards, at least 3 are needed to trade",
                player.name,
                player.cards.len()
            )));
        }
        if !player.holds(&cards) {
            return Err(GameError::not_found(EntityKind::Card, format!("{cards:?}")));
        }
        if !is_valid_trade(&cards) {
            return Err(GameError::InvalidCardCombo(cards.to_vec()));
        }

        let reward = self.next_reward();
        player.remove_cards(&cards);
        self.deck.return_cards(&cards);
        player.army_pool += reward;
        self.turn_ins += 1;
        info!(player = %player.name, ?cards, reward, turn_ins = self.turn_ins, "cards traded in");
        Ok(reward)
    }
}

impl Default for CardEconomy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Color, PlayerId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use CardKind::*;

    fn player_with(cards: &[CardKind]) -> Player {
        let mut player = Player::new(PlayerId(0), "Ada", Color::Red);
        player.cards = cards.to_vec();
        player
    }

    #[test]
    fn standard_deck_composition() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), 44);
        for kind in UNIT_KINDS {
            assert_eq!(deck.count(kind), 14);
        }
        assert_eq!(deck.count(Joker), 2);
    }

    #[test]
    fn first_eight_rewards_are_fixed() {
        let rewards: Vec<u32> = (0..10).map(trade_in_reward).collect();
        assert_eq!(rewards, vec![4, 6, 8, 10, 12, 15, 20, 25, 30, 35]);
    }

    #[test]
    fn trade_rules() {
        assert!(is_valid_trade(&[Infantry, Infantry, Infantry]));
        assert!(is_valid_trade(&[Infantry, Cavalry, Artillery]));
        assert!(is_valid_trade(&[Joker, Cavalry, Cavalry]));
        assert!(is_valid_trade(&[Joker, Joker, Artillery]));
        assert!(!is_valid_trade(&[Infantry, Infantry, Cavalry]));
        assert!(!is_valid_trade(&[Infantry, Cavalry]));
    }

    #[test]
    fn hand_gate_thresholds() {
        assert_eq!(hand_gate(2), HandGate::Disallowed);
        assert_eq!(hand_gate(3), HandGate::Optional);
        assert_eq!(hand_gate(4), HandGate::Optional);
        assert_eq!(hand_gate(5), HandGate::Mandatory);
    }

    #[test]
    fn turn_in_moves_cards_back_to_the_deck() {
        let mut economy = CardEconomy::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut player = player_with(&[]);
        for _ in 0..4 {
            economy.draw_for(&mut player, &mut rng).unwrap();
        }
        player.cards = vec![Infantry, Cavalry, Artillery, Infantry];
        let deck_before = economy.deck.len();

        let reward = economy.turn_in(&mut player, [Artillery, Infantry, Cavalry]).unwrap();

        assert_eq!(reward, 4);
        assert_eq!(player.cards, vec![Infantry]);
        assert_eq!(player.army_pool, 4);
        assert_eq!(economy.deck.len(), deck_before + 3);
        assert_eq!(economy.turn_ins(), 1);
        assert_eq!(economy.next_reward(), 6);
    }

    #[test]
    fn rejected_turn_ins_change_nothing() {
        let mut economy = CardEconomy::new();
        let mut player = player_with(&[Infantry, Infantry, Cavalry, Artillery]);
        let before = (economy.clone(), player.clone());

        assert_eq!(
            economy.turn_in(&mut player, [Infantry, Infantry, Cavalry]),
            Err(GameError::InvalidCardCombo(vec![Infantry, Infantry, Cavalry]))
        );
        assert!(matches!(
            economy.turn_in(&mut player, [Joker, Infantry, Cavalry]),
            Err(GameError::NotFound { kind: EntityKind::Card, .. })
        ));
        assert_eq!((economy.clone(), player.clone()), before);

        let mut short = player_with(&[Joker, Joker]);
        assert!(matches!(
            economy.turn_in(&mut short, [Joker, Joker, Infantry]),
            Err(GameError::InsufficientResources(_))
        ));
    }

    #[test]
    fn counter_is_shared_between_players() {
        let mut economy = CardEconomy::new();
        let mut ada = player_with(&[Infantry, Infantry, Infantry]);
        let mut bob = player_with(&[Cavalry, Cavalry, Cavalry]);
        assert_eq!(economy.turn_in(&mut ada, [Infantry; 3]).unwrap(), 4);
        assert_eq!(economy.turn_in(&mut bob, [Cavalry; 3]).unwrap(), 6);
    }

    #[test]
    fn empty_deck_draws_nothing() {
        let mut economy = CardEconomy::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut player = player_with(&[]);
        for _ in 0..44 {
            assert!(economy.draw_for(&mut player, &mut rng).is_some());
        }
        assert_eq!(economy.draw_for(&mut player, &mut rng), None);
        assert_eq!(player.cards.len(), 44);
    }
}
