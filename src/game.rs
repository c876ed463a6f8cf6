// game.rs
use crate::board::Board;
use crate::card::{self, hand_gate, CardEconomy, CardKind, HandGate};
use crate::combat::{self, AttackOrder, BattleOutcome, MAX_ATTACK_DICE, MAX_DEFEND_DICE};
use crate::dice::{Dice, RandomDice};
use crate::error::{GameError, Result};
use crate::event::GameEvent;
use crate::game_config::{GameConfig, MapError};
use crate::mission;
use crate::odds::{ConquestOdds, OddsTable};
use crate::player::{Color, Player, PlayerId, PlayerRegistry};
use crate::reinforcement;
use crate::territory::TerritoryId;
use crate::turn_phase::TurnPhase;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Armies each player starts with on the map, by table size.
pub fn default_starting_armies(players: usize) -> u32 {
    match players {
        2 => 40,
        3 => 35,
        4 => 30,
        5 => 25,
        _ => 20,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Makes dice, card draws, territory distribution and missions repeatable.
    pub seed: Option<u64>,
    pub starting_armies: Option<u32>,
}

impl GameSettings {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub color: Color,
    pub army_pool: u32,
    pub card_count: usize,
    /// Hand and mission are only filled in for the player's own view, or for
    /// everyone once the game is over.
    pub cards: Option<Vec<CardKind>>,
    pub territories: Vec<String>,
    pub total_armies: u32,
    pub alive: bool,
    pub mission: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerritoryInfo {
    pub name: String,
    pub code: String,
    pub continent: String,
    pub owner: Option<String>,
    pub garrison: u32,
    pub adjacent_territories: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinentInfo {
    pub name: String,
    pub bonus_armies: u32,
    pub territories: Vec<String>,
    pub controller: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub current_player: Option<String>,
    pub round: usize,
    pub turn_phase: TurnPhase,
    pub players: Vec<PlayerInfo>,
    /// Colours still free in the lobby.
    pub available_colors: Vec<Color>,
    pub territories: Vec<TerritoryInfo>,
    pub continents: Vec<ContinentInfo>,
    pub turn_ins: u32,
    pub next_turn_in_reward: u32,
    pub deck_size: usize,
    pub winner: Option<String>,
    pub possible_actions: Vec<Action>,
    /// `(from, to, percent)` for every attack the active player could make.
    pub conquer_probs: Vec<(String, String, f64)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    TurnInCards { cards: Vec<CardKind> },
    PlaceReinforcements { territory: String, max_armies: u32 },
    Attack { from: String, to: String, max_dice: u32, defender_dice: u32 },
    MoveUnits { from: String, to: String, max_units: u32 },
    EndPhase,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub outcome: BattleOutcome,
    pub card_drawn: Option<CardKind>,
}

/// One game session. Every mutation goes through the command methods, which
/// validate everything before touching state.
#[derive(Debug)]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) players: PlayerRegistry,
    pub(crate) cards: CardEconomy,
    pub(crate) current_turn: PlayerId,
    pub(crate) round: usize,
    pub(crate) turn_phase: TurnPhase,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) events: Vec<GameEvent>,
    settings: GameSettings,
    odds: ConquestOdds,
    rng: ChaCha8Rng,
    dice: Box<dyn Dice>,
}

impl Game {
    pub fn new(board: Board, settings: GameSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let dice = RandomDice::new(ChaCha8Rng::seed_from_u64(rng.gen()));

        Self {
            board,
            players: PlayerRegistry::new(),
            cards: CardEconomy::new(),
            current_turn: PlayerId(0),
            round: 0,
            turn_phase: TurnPhase::Setup,
            winner: None,
            events: Vec::new(),
            settings,
            odds: ConquestOdds::new(),
            rng,
            dice: Box::new(dice),
        }
    }

    /// A session on the embedded classic map.
    pub fn classic(settings: GameSettings) -> std::result::Result<Self, MapError> {
        let board = GameConfig::classic()?.to_board()?;
        Ok(Self::new(board, settings))
    }

    pub fn with_dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    pub fn with_odds_table(mut self, table: OddsTable) -> Self {
        self.odds = ConquestOdds::from_table(table);
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Read-only view of the map. Owners and garrisons only change through
    /// the command methods.
    ///
    /// ```compile_fail
    /// use risk_game_engine::{territory::TerritoryId, Game, GameSettings};
    ///
    /// let mut game = Game::classic(GameSettings::default()).unwrap();
    /// game.board.adjust_garrison(TerritoryId(0), 50).unwrap();
    /// ```
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn cards(&self) -> &CardEconomy {
        &self.cards
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn turn_phase(&self) -> TurnPhase {
        self.turn_phase
    }

    pub fn active_player(&self) -> Option<&Player> {
        match self.turn_phase {
            TurnPhase::Setup => None,
            _ => Some(self.players.player(self.current_turn)),
        }
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|id| self.players.player(id))
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // --- lobby ---

    pub fn add_player(&mut self, name: &str, color: Color) -> Result<PlayerId> {
        self.require_lobby("join")?;
        let id = self.players.add(name, color)?;
        let player = self.players.player(id);
        info!(player = %player.name, %color, "player joined");
        self.events.push(GameEvent::PlayerJoined {
            player: player.name.clone(),
            color,
        });
        Ok(id)
    }

    pub fn remove_player(&mut self, name: &str) -> Result<()> {
        self.require_lobby("leave")?;
        let player = self.players.remove(name)?;
        info!(player = %player.name, "player left");
        self.events.push(GameEvent::PlayerLeft {
            player: player.name,
            color: player.color,
        });
        Ok(())
    }

    pub fn start_game(&mut self) -> Result<()> {
        self.require_lobby("start")?;
        let seated = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seated) {
            return Err(GameError::InsufficientResources(format!(
                "{MIN_PLAYERS} to {MAX_PLAYERS} players are needed, {seated} joined"
            )));
        }

        let starting_armies = self
            .settings
            .starting_armies
            .unwrap_or_else(|| default_starting_armies(seated));
        self.board
            .shuffle_and_distribute_territories(&self.players.ids(), starting_armies, &mut self.rng);
        self.cards = CardEconomy::new();
        mission::deal(&mut self.players, &self.board, &mut self.rng);

        self.current_turn = PlayerId(0);
        self.round = 1;
        let names: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        info!(players = ?names, starting_armies, "game started");
        self.events.push(GameEvent::GameStarted { players: names });
        self.start_turn();
        Ok(())
    }

    // --- turn commands ---

    /// Returns how many armies are still left to place.
    pub fn place_reinforcements(&mut self, player: &str, territory: &str, units: u32) -> Result<u32> {
        let id = self.authorize(player, TurnPhase::Reinforcement, "place armies")?;
        let territory = self.board.territory_id(territory)?;
        let remaining = reinforcement::place(&mut self.board, self.players.player_mut(id), territory, units)?;

        self.events.push(GameEvent::ArmiesPlaced {
            player: self.players.player(id).name.clone(),
            territory: self.board.name(territory).to_string(),
            armies: units,
            garrison: self.board.garrison(territory),
        });
        if !self.check_victory() && remaining == 0 {
            self.set_phase(TurnPhase::Attack);
        }
        Ok(remaining)
    }

    pub fn attack(
        &mut self,
        player: &str,
        from: &str,
        to: &str,
        attack_units: u32,
        defend_units: u32,
    ) -> Result<AttackReport> {
        let id = self.authorize(player, TurnPhase::Attack, "attack")?;
        let order = AttackOrder {
            attacker: id,
            from: self.board.territory_id(from)?,
            to: self.board.territory_id(to)?,
            attack_units,
            defend_units,
        };
        let outcome = combat::resolve(&mut self.board, self.dice.as_mut(), order)?;

        let attacker_name = self.players.player(id).name.clone();
        let defender_name = self.players.player(outcome.defender).name.clone();
        self.events.push(GameEvent::BattleResolved {
            attacker: attacker_name.clone(),
            defender: defender_name.clone(),
            from: self.board.name(order.from).to_string(),
            to: self.board.name(order.to).to_string(),
            attacker_rolls: outcome.attacker_rolls.clone(),
            defender_rolls: outcome.defender_rolls.clone(),
            attacker_losses: outcome.attacker_losses,
            defender_losses: outcome.defender_losses,
        });

        let mut card_drawn = None;
        if outcome.conquered {
            self.events.push(GameEvent::TerritoryConquered {
                player: attacker_name.clone(),
                territory: self.board.name(order.to).to_string(),
                previous_owner: defender_name,
                garrison: outcome.surviving_units,
            });

            let attacker = self.players.player_mut(id);
            if !attacker.conquered_this_turn {
                attacker.conquered_this_turn = true;
                card_drawn = self.cards.draw_for(attacker, &mut self.rng);
                if card_drawn.is_some() {
                    self.events.push(GameEvent::CardDrawn { player: attacker_name });
                }
            }

            if self.board.territory_count(outcome.defender) == 0 {
                self.eliminate(outcome.defender, id);
            }
        }
        self.check_victory();

        Ok(AttackReport { outcome, card_drawn })
    }

    /// Fortifies one owned neighbour from another and ends the turn.
    pub fn move_units(&mut self, player: &str, from: &str, to: &str, units: u32) -> Result<()> {
        let id = self.authorize(player, TurnPhase::Fortify, "move units")?;
        let from = self.board.territory_id(from)?;
        let to = self.board.territory_id(to)?;

        for territory in [from, to] {
            if !self.board.owns(id, territory) {
                return Err(GameError::InvalidOwnership(format!(
                    "'{}' does not belong to {}",
                    self.board.name(territory),
                    self.players.player(id).name
                )));
            }
        }
        if !self.board.are_adjacent(from, to) {
            return Err(GameError::InvalidAdjacency {
                from: self.board.name(from).to_string(),
                to: self.board.name(to).to_string(),
            });
        }
        let available = self.board.garrison(from).saturating_sub(1);
        if units == 0 || units > available {
            return Err(GameError::InvalidUnitCount(format!(
                "'{}' can move 1 to {available} armies, not {units}",
                self.board.name(from)
            )));
        }

        self.board.withdraw(from, units)?;
        self.board.adjust_garrison(to, i64::from(units))?;
        debug!(from = self.board.name(from), to = self.board.name(to), units, "units moved");
        self.events.push(GameEvent::UnitsMoved {
            player: self.players.player(id).name.clone(),
            from: self.board.name(from).to_string(),
            to: self.board.name(to).to_string(),
            units,
        });

        if !self.check_victory() {
            self.end_turn();
        }
        Ok(())
    }

    /// Returns the armies the set was worth.
    pub fn turn_in_cards(&mut self, player: &str, cards: [CardKind; 3]) -> Result<u32> {
        let id = self.authorize(player, TurnPhase::CardResolution, "turn in cards")?;
        let player = self.players.player_mut(id);
        let reward = self.cards.turn_in(player, cards)?;
        let left = player.cards.len();

        self.events.push(GameEvent::CardsTradedIn {
            player: player.name.clone(),
            cards: cards.to_vec(),
            reward,
        });
        if hand_gate(left) == HandGate::Disallowed {
            self.enter_reinforcement();
        }
        Ok(reward)
    }

    /// Leaves the current phase. Returns the phase the game is now in.
    pub fn end_phase(&mut self, player: &str) -> Result<TurnPhase> {
        let id = self.authorize(player, self.turn_phase, "end the phase")?;
        let player = self.players.player(id);

        match self.turn_phase {
            TurnPhase::CardResolution => {
                if hand_gate(player.cards.len()) == HandGate::Mandatory {
                    return Err(GameError::InvalidPhase(format!(
                        "{} holds {} cards and must turn in a set first",
                        player.name,
                        player.cards.len()
                    )));
                }
                self.enter_reinforcement();
            }
            TurnPhase::Reinforcement => {
                if player.army_pool > 0 {
                    return Err(GameError::InsufficientResources(format!(
                        "{} still has {} armies to place",
                        player.name, player.army_pool
                    )));
                }
                self.set_phase(TurnPhase::Attack);
            }
            TurnPhase::Attack => self.set_phase(TurnPhase::Fortify),
            TurnPhase::Fortify => self.end_turn(),
            TurnPhase::Setup | TurnPhase::GameOver => {}
        }
        Ok(self.turn_phase)
    }

    // --- rules plumbing ---

    fn require_lobby(&self, action: &str) -> Result<()> {
        if self.turn_phase != TurnPhase::Setup {
            return Err(GameError::InvalidPhase(format!(
                "cannot {action} once the game has started"
            )));
        }
        Ok(())
    }

    /// Resolves the acting player and checks it is their turn and the right phase.
    fn authorize(&self, player: &str, phase: TurnPhase, action: &str) -> Result<PlayerId> {
        match self.turn_phase {
            TurnPhase::Setup => {
                return Err(GameError::InvalidPhase("the game has not started".to_string()));
            }
            TurnPhase::GameOver => {
                return Err(GameError::InvalidPhase("the game is over".to_string()));
            }
            _ => {}
        }
        let id = self.players.id_of(player)?;
        if id != self.current_turn {
            return Err(GameError::OutOfTurn {
                player: self.players.player(id).name.clone(),
            });
        }
        if self.turn_phase != phase {
            return Err(GameError::InvalidPhase(format!(
                "cannot {action} during the {} phase",
                self.turn_phase
            )));
        }
        Ok(id)
    }

    fn eliminate(&mut self, loser: PlayerId, conqueror: PlayerId) {
        let loser = self.players.player_mut(loser);
        loser.alive = false;
        let cards = std::mem::take(&mut loser.cards);
        let loser_name = loser.name.clone();

        let conqueror = self.players.player_mut(conqueror);
        conqueror.cards.extend(cards);
        info!(player = %loser_name, by = %conqueror.name, "player eliminated");
        self.events.push(GameEvent::PlayerEliminated {
            player: loser_name,
            by: conqueror.name.clone(),
        });
    }

    /// Looks for a winner, active player first. Ends the game if one is found.
    fn check_victory(&mut self) -> bool {
        let alive: Vec<PlayerId> = self.players.alive().map(|p| p.id).collect();
        let winner = if alive.len() == 1 {
            Some(alive[0])
        } else {
            let others = alive.iter().copied().filter(|&id| id != self.current_turn);
            std::iter::once(self.current_turn)
                .filter(|id| alive.contains(id))
                .chain(others)
                .find(|&id| {
                    let player = self.players.player(id);
                    player
                        .mission
                        .as_ref()
                        .map_or(false, |m| m.is_satisfied(player, &self.board, &self.players))
                })
        };

        let Some(id) = winner else {
            return false;
        };
        let player = self.players.player(id);
        let mission = player.mission.as_ref().map(|m| m.describe(&self.board));
        info!(player = %player.name, ?mission, "game won");
        self.events.push(GameEvent::GameWon {
            player: player.name.clone(),
            mission,
        });
        self.winner = Some(id);
        self.set_phase(TurnPhase::GameOver);
        true
    }

    // --- read-only queries ---

    pub fn territory_info(&self, name: &str) -> Result<TerritoryInfo> {
        self.board.territory_id(name).map(|id| self.describe_territory(id))
    }

    /// The player's own view, hand and mission included.
    pub fn player_info(&self, name: &str) -> Result<PlayerInfo> {
        self.players.by_name(name).map(|p| self.describe_player(p, true))
    }

    fn owner_name(&self, territory: TerritoryId) -> Option<String> {
        self.board
            .owner(territory)
            .map(|id| self.players.player(id).name.clone())
    }

    fn describe_territory(&self, id: TerritoryId) -> TerritoryInfo {
        let territory = self.board.territory(id);
        TerritoryInfo {
            name: territory.name.clone(),
            code: territory.code.clone(),
            continent: self.board.continent(territory.get_continent()).name.clone(),
            owner: self.owner_name(id),
            garrison: self.board.garrison(id),
            adjacent_territories: self
                .board
                .neighbours(id)
                .map(|n| self.board.name(n).to_string())
                .collect(),
        }
    }

    fn describe_player(&self, player: &Player, private: bool) -> PlayerInfo {
        let private = private || self.turn_phase == TurnPhase::GameOver;
        PlayerInfo {
            name: player.name.clone(),
            color: player.color,
            army_pool: player.army_pool,
            card_count: player.cards.len(),
            cards: private.then(|| player.cards.clone()),
            territories: self
                .board
                .territories_of(player.id)
                .map(|t| self.board.name(t).to_string())
                .collect(),
            total_armies: self
                .board
                .territories_of(player.id)
                .map(|t| self.board.garrison(t))
                .sum(),
            alive: player.alive,
            mission: player
                .mission
                .as_ref()
                .filter(|_| private)
                .map(|m| m.describe(&self.board)),
        }
    }

    pub fn game_state(&mut self) -> GameState {
        let conquer_probs = self
            .legal_attacks()
            .into_iter()
            .map(|(from, to, _)| {
                let percent = self
                    .odds
                    .percent(self.board.garrison(from), self.board.garrison(to));
                (self.board.name(from).to_string(), self.board.name(to).to_string(), percent)
            })
            .collect();

        GameState {
            current_player: self.active_player().map(|p| p.name.clone()),
            round: self.round,
            turn_phase: self.turn_phase,
            players: self.players.iter().map(|p| self.describe_player(p, false)).collect(),
            available_colors: self.players.available_colors().to_vec(),
            territories: self
                .board
                .territory_ids()
                .map(|id| self.describe_territory(id))
                .collect(),
            continents: self
                .board
                .continents
                .iter()
                .map(|c| ContinentInfo {
                    name: c.name.clone(),
                    bonus_armies: c.get_bonus(),
                    territories: c
                        .territories
                        .iter()
                        .map(|&t| self.board.name(t).to_string())
                        .collect(),
                    controller: self
                        .board
                        .continent_controller(c.id)
                        .map(|id| self.players.player(id).name.clone()),
                })
                .collect(),
            turn_ins: self.cards.turn_ins(),
            next_turn_in_reward: self.cards.next_reward(),
            deck_size: self.cards.deck.len(),
            winner: self.winner().map(|p| p.name.clone()),
            possible_actions: self.possible_actions(),
            conquer_probs,
        }
    }

    pub fn possible_actions(&self) -> Vec<Action> {
        if matches!(self.turn_phase, TurnPhase::Setup | TurnPhase::GameOver) {
            return vec![];
        }
        let player = self.players.player(self.current_turn);
        match self.turn_phase {
            TurnPhase::Setup | TurnPhase::GameOver => vec![],
            TurnPhase::CardResolution => {
                let mut actions = self.possible_trades(player);
                if hand_gate(player.cards.len()) != HandGate::Mandatory {
                    actions.push(Action::EndPhase);
                }
                actions
            }
            TurnPhase::Reinforcement => {
                let mut actions: Vec<Action> = self
                    .board
                    .territories_of(player.id)
                    .filter(|_| player.army_pool > 0)
                    .map(|t| Action::PlaceReinforcements {
                        territory: self.board.name(t).to_string(),
                        max_armies: player.army_pool,
                    })
                    .collect();
                if player.army_pool == 0 {
                    actions.push(Action::EndPhase);
                }
                actions
            }
            TurnPhase::Attack => {
                let mut actions: Vec<Action> = self
                    .legal_attacks()
                    .into_iter()
                    .map(|(from, to, max_dice)| Action::Attack {
                        from: self.board.name(from).to_string(),
                        to: self.board.name(to).to_string(),
                        max_dice,
                        defender_dice: MAX_DEFEND_DICE.min(self.board.garrison(to)),
                    })
                    .collect();
                actions.push(Action::EndPhase);
                actions
            }
            TurnPhase::Fortify => {
                let mut actions = Vec::new();
                for from in self.board.territories_of(player.id) {
                    let max_units = self.board.garrison(from).saturating_sub(1);
                    if max_units == 0 {
                        continue;
                    }
                    for to in self.board.neighbours(from).filter(|&n| self.board.owns(player.id, n)) {
                        actions.push(Action::MoveUnits {
                            from: self.board.name(from).to_string(),
                            to: self.board.name(to).to_string(),
                            max_units,
                        });
                    }
                }
                actions.push(Action::EndPhase);
                actions
            }
        }
    }

    fn possible_trades(&self, player: &Player) -> Vec<Action> {
        player
            .cards
            .iter()
            .copied()
            .combinations(3)
            .map(|mut combo| {
                combo.sort_by_key(|&kind| kind as u8);
                combo
            })
            .filter(|combo| card::is_valid_trade(combo))
            .unique()
            .map(|cards| Action::TurnInCards { cards })
            .collect()
    }

    /// `(from, to, max_dice)` for the active player, attack phase only.
    fn legal_attacks(&self) -> Vec<(TerritoryId, TerritoryId, u32)> {
        if self.turn_phase != TurnPhase::Attack {
            return vec![];
        }
        let active = self.current_turn;
        let mut attacks = Vec::new();
        for from in self.board.territories_of(active) {
            let max_dice = MAX_ATTACK_DICE.min(self.board.garrison(from).saturating_sub(1));
            if max_dice == 0 {
                continue;
            }
            for to in self.board.neighbours(from) {
                if self.board.owner(to).is_some_and(|owner| owner != active) {
                    attacks.push((from, to, max_dice));
                }
            }
        }
        attacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::error::EntityKind;

    fn lobby(names: &[(&str, Color)]) -> Game {
        let mut game = Game::classic(GameSettings::seeded(3)).unwrap();
        for &(name, color) in names {
            game.add_player(name, color).unwrap();
        }
        game
    }

    #[test]
    fn lobby_rules() {
        let mut game = lobby(&[("Ada", Color::Red)]);
        assert_eq!(game.add_player("Bob", Color::Red), Err(GameError::ColorUnavailable(Color::Red)));
        assert!(matches!(game.start_game(), Err(GameError::InsufficientResources(_))));
        assert_eq!(
            game.remove_player("Zed"),
            Err(GameError::not_found(EntityKind::Player, "Zed"))
        );

        game.add_player("Bob", Color::Blue).unwrap();
        game.start_game().unwrap();
        assert!(matches!(game.add_player("Cy", Color::Green), Err(GameError::InvalidPhase(_))));
        assert!(matches!(game.remove_player("Bob"), Err(GameError::InvalidPhase(_))));
        assert!(matches!(game.start_game(), Err(GameError::InvalidPhase(_))));
    }

    #[test]
    fn start_deals_map_missions_and_first_turn() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue), ("Cy", Color::Green)]);
        game.start_game().unwrap();

        assert_eq!(game.active_player().unwrap().name, "Ada");
        assert_eq!(game.turn_phase, TurnPhase::Reinforcement);
        assert_eq!(game.cards.deck.len(), 44);
        for player in game.players.iter() {
            assert!(player.mission.is_some());
            assert_eq!(game.board.territory_count(player.id), 14);
            let on_map: u32 = game.board.territories_of(player.id).map(|t| game.board.garrison(t)).sum();
            assert_eq!(on_map, 35);
        }
        // 14 territories, no continent is likely but the pool is at least the minimum
        assert!(game.players.player(PlayerId(0)).army_pool >= 3);
    }

    #[test]
    fn commands_before_start_are_out_of_phase() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
        assert!(matches!(
            game.place_reinforcements("Ada", "Peru", 1),
            Err(GameError::InvalidPhase(_))
        ));
        assert!(game.active_player().is_none());
        assert!(game.possible_actions().is_empty());
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let run = || {
            let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
            game.start_game().unwrap();
            game.game_state()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn trades_are_listed_once_per_kind_combination() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
        game.start_game().unwrap();
        let ada = game.players.player_mut(PlayerId(0));
        ada.cards = vec![CardKind::Infantry, CardKind::Infantry, CardKind::Infantry, CardKind::Cavalry];
        let ada = game.players.player(PlayerId(0));

        let trades = game.possible_trades(ada);
        assert_eq!(
            trades,
            vec![Action::TurnInCards {
                cards: vec![CardKind::Infantry; 3]
            }]
        );
    }

    #[test]
    fn attack_odds_cover_every_legal_attack() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
        game.start_game().unwrap();
        for id in game.players.ids() {
            game.players.player_mut(id).mission = None;
        }
        let pool = game.players.player(PlayerId(0)).army_pool;
        let first = game.board.territories_of(PlayerId(0)).next().unwrap();
        let name = game.board.name(first).to_string();
        game.place_reinforcements("Ada", &name, pool).unwrap();
        assert_eq!(game.turn_phase, TurnPhase::Attack);

        let state = game.game_state();
        let attacks = state
            .possible_actions
            .iter()
            .filter(|a| matches!(a, Action::Attack { .. }))
            .count();
        assert_eq!(state.conquer_probs.len(), attacks);
        assert!(state.conquer_probs.iter().all(|(_, _, p)| (0.0..=100.0).contains(p)));
    }

    #[test]
    fn scripted_dice_decide_the_battle() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)])
            .with_dice(ScriptedDice::new([2, 5]));
        game.start_game().unwrap();
        for id in game.players.ids() {
            game.players.player_mut(id).mission = None;
        }
        let ada = PlayerId(0);
        let (from, to) = game
            .board
            .territories_of(ada)
            .find_map(|from| {
                let mut enemies = game.board.neighbours(from).filter(|&n| !game.board.owns(ada, n));
                enemies.next().map(|to| (from, to))
            })
            .unwrap();
        let pool = game.players.player(ada).army_pool;
        let (from, to) = (game.board.name(from).to_string(), game.board.name(to).to_string());
        game.place_reinforcements("Ada", &from, pool).unwrap();
        let before = game.board.garrison(game.board.territory_id(&from).unwrap());

        let report = game.attack("Ada", &from, &to, 1, 1).unwrap();
        assert_eq!(report.outcome.attacker_rolls, vec![2]);
        assert_eq!(report.outcome.defender_rolls, vec![5]);
        assert_eq!((report.outcome.attacker_losses, report.outcome.defender_losses), (1, 0));
        assert!(!report.outcome.conquered);
        assert_eq!(game.board.garrison(game.board.territory_id(&from).unwrap()), before - 1);
    }

    #[test]
    fn snapshot_lists_free_colours() {
        let mut empty = lobby(&[]);
        assert_eq!(empty.game_state().available_colors, Color::ALL.to_vec());

        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
        let free = game.game_state().available_colors;
        assert_eq!(free.len(), 4);
        assert!(!free.contains(&Color::Red) && !free.contains(&Color::Blue));

        game.remove_player("Ada").unwrap();
        assert!(game.game_state().available_colors.contains(&Color::Red));
    }

    #[test]
    fn snapshot_keeps_hands_and_missions_private() {
        let mut game = lobby(&[("Ada", Color::Red), ("Bob", Color::Blue)]);
        game.start_game().unwrap();
        game.players.player_mut(PlayerId(1)).cards = vec![CardKind::Cavalry, CardKind::Joker];

        let state = game.game_state();
        for info in &state.players {
            assert!(info.cards.is_none());
            assert!(info.mission.is_none());
        }
        assert_eq!(state.players[1].card_count, 2);

        let own = game.player_info("bob").unwrap();
        assert_eq!(own.cards, Some(vec![CardKind::Cavalry, CardKind::Joker]));
        assert!(own.mission.is_some());
    }
}
