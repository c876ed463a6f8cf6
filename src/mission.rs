// mission.rs
use crate::board::Board;
use crate::continent::ContinentId;
use crate::player::{Color, Player, PlayerRegistry};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TERRITORY_GOAL: usize = 24;
pub const GARRISONED_TERRITORY_GOAL: usize = 18;
pub const GOAL_MIN_GARRISON: u32 = 2;
const CONTINENTS_FOR_PLUS_ONE: usize = 3;

const CONTINENT_PAIRS: [(&str, &str); 4] = [
    ("Africa", "Asia"),
    ("North America", "Australia"),
    ("Asia", "South America"),
    ("North America", "Africa"),
];
const CONTINENT_PAIRS_PLUS_ONE: [(&str, &str); 2] =
    [("Europe", "Australia"), ("Europe", "South America")];

/// A private victory condition, fixed when it is dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mission {
    ConquerContinents { first: ContinentId, second: ContinentId },
    ConquerContinentsPlusOne { first: ContinentId, second: ContinentId },
    ConquerTerritories { count: usize },
    ConquerTerritoriesWithGarrison { count: usize, min_garrison: u32 },
    /// Falls back to holding `TERRITORY_GOAL` territories when the target is
    /// the holder's own colour.
    EliminateColor { target: Color },
}

impl Mission {
    pub fn is_satisfied(&self, player: &Player, board: &Board, players: &PlayerRegistry) -> bool {
        let owned = board.territory_count(player.id);
        match *self {
            Mission::ConquerContinents { first, second } => {
                board.controls_continent(player.id, first) && board.controls_continent(player.id, second)
            }
            Mission::ConquerContinentsPlusOne { first, second } => {
                board.controls_continent(player.id, first)
                    && board.controls_continent(player.id, second)
                    && board.controlled_continents(player.id).len() >= CONTINENTS_FOR_PLUS_ONE
            }
            Mission::ConquerTerritories { count } => owned >= count,
            Mission::ConquerTerritoriesWithGarrison { count, min_garrison } => {
                owned >= count
                    && board
                        .territories_of(player.id)
                        .all(|t| board.garrison(t) >= min_garrison)
            }
            Mission::EliminateColor { target } if target == player.color => owned >= TERRITORY_GOAL,
            Mission::EliminateColor { target } => board.territory_ids().all(|t| {
                board
                    .owner(t)
                    .map_or(true, |owner| players.player(owner).color != target)
            }),
        }
    }

    pub fn describe(&self, board: &Board) -> String {
        let name = |id: ContinentId| board.continent(id).name.as_str();
        match self {
            Mission::ConquerContinents { first, second } => {
                format!("Conquer {} and {}", name(*first), name(*second))
            }
            Mission::ConquerContinentsPlusOne { first, second } => format!(
                "Conquer {} and {} and another continent of your choice",
                name(*first),
                name(*second)
            ),
            Mission::ConquerTerritories { count } => format!("Conquer {count} territories"),
            Mission::ConquerTerritoriesWithGarrison { count, min_garrison } => format!(
                "Conquer {count} territories with at least {min_garrison} armies in each"
            ),
            Mission::EliminateColor { target } => format!(
                "Destroy the {target} armies; if they are your own, conquer {TERRITORY_GOAL} territories"
            ),
        }
    }
}

/// The standard mission deck for this board. Continent missions that name a
/// continent the map lacks are left out, and colour missions are only made
/// for colours actually seated.
pub fn standard_missions(board: &Board, seated: &[Color]) -> Vec<Mission> {
    let pair = |(a, b): (&str, &str)| Some((board.continent_id(a).ok()?, board.continent_id(b).ok()?));

    let mut missions: Vec<Mission> = CONTINENT_PAIRS
        .into_iter()
        .filter_map(pair)
        .map(|(first, second)| Mission::ConquerContinents { first, second })
        .collect();
    missions.extend(
        CONTINENT_PAIRS_PLUS_ONE
            .into_iter()
            .filter_map(pair)
            .map(|(first, second)| Mission::ConquerContinentsPlusOne { first, second }),
    );
    missions.push(Mission::ConquerTerritories { count: TERRITORY_GOAL });
    missions.push(Mission::ConquerTerritoriesWithGarrison {
        count: GARRISONED_TERRITORY_GOAL,
        min_garrison: GOAL_MIN_GARRISON,
    });
    missions.extend(
        Color::ALL
            .into_iter()
            .filter(|c| seated.contains(c))
            .map(|target| Mission::EliminateColor { target }),
    );
    missions
}

/// Gives every seated player one mission drawn without replacement.
pub fn deal<R: Rng + ?Sized>(players: &mut PlayerRegistry, board: &Board, rng: &mut R) {
    let mut missions = standard_missions(board, &players.seated_colors());
    missions.shuffle(rng);
    for player in players.iter_mut() {
        player.mission = missions.pop();
        debug!(player = %player.name, mission = ?player.mission, "mission dealt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::GameConfig;
    use crate::player::PlayerId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Board, PlayerRegistry) {
        let board = GameConfig::classic().unwrap().to_board().unwrap();
        let mut players = PlayerRegistry::new();
        players.add("Ada", Color::Red).unwrap();
        players.add("Bob", Color::Blue).unwrap();
        (board, players)
    }

    fn give_continent(board: &mut Board, player: PlayerId, name: &str) {
        let members: Vec<_> = board.get_continent(name).unwrap().territories.iter().copied().collect();
        for t in members {
            board.transfer_ownership(t, player, 1).unwrap();
        }
    }

    fn give_n(board: &mut Board, player: PlayerId, n: usize, garrison: u32) {
        let ids: Vec<_> = board.territory_ids().take(n).collect();
        for t in ids {
            board.transfer_ownership(t, player, garrison).unwrap();
        }
    }

    fn check(mission: Mission, board: &Board, players: &PlayerRegistry) -> bool {
        mission.is_satisfied(players.player(PlayerId(0)), board, players)
    }

    #[test]
    fn two_continents() {
        let (mut board, players) = setup();
        let mission = Mission::ConquerContinents {
            first: board.continent_id("Africa").unwrap(),
            second: board.continent_id("Australia").unwrap(),
        };
        give_continent(&mut board, PlayerId(0), "Africa");
        assert!(!check(mission.clone(), &board, &players));
        give_continent(&mut board, PlayerId(0), "Australia");
        assert!(check(mission, &board, &players));
    }

    #[test]
    fn plus_one_needs_a_third_continent() {
        let (mut board, players) = setup();
        let mission = Mission::ConquerContinentsPlusOne {
            first: board.continent_id("Europe").unwrap(),
            second: board.continent_id("Australia").unwrap(),
        };
        give_continent(&mut board, PlayerId(0), "Europe");
        give_continent(&mut board, PlayerId(0), "Australia");
        assert!(!check(mission.clone(), &board, &players));
        give_continent(&mut board, PlayerId(0), "South America");
        assert!(check(mission, &board, &players));
    }

    #[test]
    fn territory_counts() {
        let (mut board, players) = setup();
        give_n(&mut board, PlayerId(0), 23, 1);
        assert!(!check(Mission::ConquerTerritories { count: 24 }, &board, &players));
        give_n(&mut board, PlayerId(0), 24, 1);
        assert!(check(Mission::ConquerTerritories { count: 24 }, &board, &players));
    }

    #[test]
    fn garrison_mission_checks_every_territory() {
        let (mut board, players) = setup();
        let mission = Mission::ConquerTerritoriesWithGarrison { count: 18, min_garrison: 2 };
        give_n(&mut board, PlayerId(0), 18, 2);
        assert!(check(mission.clone(), &board, &players));

        let weak = board.territories_of(PlayerId(0)).next().unwrap();
        board.adjust_garrison(weak, -1).unwrap();
        assert!(!check(mission, &board, &players));
    }

    #[test]
    fn eliminate_colour_and_self_fallback() {
        let (mut board, players) = setup();
        let peru = board.territory_id("Peru").unwrap();
        board.transfer_ownership(peru, PlayerId(1), 1).unwrap();

        let blue = Mission::EliminateColor { target: Color::Blue };
        assert!(!check(blue.clone(), &board, &players));
        board.transfer_ownership(peru, PlayerId(0), 1).unwrap();
        assert!(check(blue, &board, &players));

        let own = Mission::EliminateColor { target: Color::Red };
        assert!(!check(own.clone(), &board, &players));
        give_n(&mut board, PlayerId(0), 24, 1);
        assert!(check(own, &board, &players));
    }

    #[test]
    fn deck_only_targets_seated_colours() {
        let (board, players) = setup();
        let missions = standard_missions(&board, &players.seated_colors());
        assert_eq!(missions.len(), 4 + 2 + 2 + 2);
        assert!(missions.contains(&Mission::EliminateColor { target: Color::Blue }));
        assert!(!missions.contains(&Mission::EliminateColor { target: Color::Pink }));
    }

    #[test]
    fn every_player_gets_a_distinct_mission() {
        let (board, mut players) = setup();
        players.add("Cy", Color::Green).unwrap();
        deal(&mut players, &board, &mut ChaCha8Rng::seed_from_u64(5));
        let dealt: Vec<_> = players.iter().map(|p| p.mission.clone().unwrap()).collect();
        for (i, m) in dealt.iter().enumerate() {
            assert!(!dealt[i + 1..].contains(m));
        }
    }
}
