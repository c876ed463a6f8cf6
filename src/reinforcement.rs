// reinforcement.rs
use crate::board::Board;
use crate::error::{GameError, Result};
use crate::player::{Player, PlayerId};
use crate::territory::TerritoryId;
use tracing::debug;

pub const MINIMUM_REINFORCEMENTS: u32 = 3;
const TERRITORIES_PER_ARMY: u32 = 3;

/// Armies earned at the start of a turn: one per three territories (never
/// fewer than three) plus the bonus of every continent held right now.
pub fn compute(board: &Board, player: PlayerId) -> u32 {
    let territories = board.territory_count(player) as u32;
    let base = if territories >= MINIMUM_REINFORCEMENTS * TERRITORIES_PER_ARMY {
        territories / TERRITORIES_PER_ARMY
    } else {
        MINIMUM_REINFORCEMENTS
    };
    let continent_bonus: u32 = board
        .controlled_continents(player)
        .into_iter()
        .map(|c| board.continent(c).get_bonus())
        .sum();
    base + continent_bonus
}

/// Moves `units` from the player's pool onto one of their territories.
/// Returns what is left in the pool.
pub fn place(board: &mut Board, player: &mut Player, territory: TerritoryId, units: u32) -> Result<u32> {
    if !board.owns(player.id, territory) {
        return Err(GameError::InvalidOwnership(format!(
            "'{}' does not belong to {}",
            board.name(territory),
            player.name
        )));
    }
    if units == 0 {
        return Err(GameError::InvalidUnitCount("must place at least one army".to_string()));
    }
    if units > player.army_pool {
        return Err(GameError::InsufficientResources(format!(
            "{} has {} armies to place, not {}",
            player.name, player.army_pool, units
        )));
    }
    let garrison = board.adjust_garrison(territory, i64::from(units))?;
    player.army_pool -= units;
    debug!(player = %player.name, territory = board.name(territory), units, garrison, "armies placed");
    Ok(player.army_pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::GameConfig;
    use crate::player::Color;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn board() -> Board {
        GameConfig::classic().unwrap().to_board().unwrap()
    }

    fn give(board: &mut Board, player: PlayerId, names: &[&str]) {
        for name in names {
            let id = board.territory_id(name).unwrap();
            board.transfer_ownership(id, player, 1).unwrap();
        }
    }

    #[test]
    fn small_empires_get_the_minimum() {
        let mut board = board();
        give(&mut board, A, &["Alaska", "Peru", "Egypt"]);
        assert_eq!(compute(&board, A), 3);
    }

    #[test]
    fn base_is_a_third_of_territories_from_nine() {
        let mut board = board();
        let asia: Vec<_> = board
            .get_continent("Asia")
            .unwrap()
            .territories
            .iter()
            .copied()
            .collect();
        for &t in asia.iter().take(11) {
            board.transfer_ownership(t, A, 1).unwrap();
        }
        assert_eq!(compute(&board, A), 3);
        board.transfer_ownership(asia[11], A, 1).unwrap();
        // 12 territories -> 4, plus Asia's 7
        assert_eq!(compute(&board, A), 11);
    }

    #[test]
    fn continent_bonus_tracks_current_control() {
        let mut board = board();
        give(&mut board, A, &["Venezuela", "Peru", "Brazil", "Argentina"]);
        assert_eq!(compute(&board, A), 3 + 2);

        give(&mut board, B, &["Peru"]);
        assert_eq!(compute(&board, A), 3);
    }

    #[test]
    fn placement_draws_down_the_pool() {
        let mut board = board();
        give(&mut board, A, &["Peru"]);
        let peru = board.territory_id("Peru").unwrap();
        let alaska = board.territory_id("Alaska").unwrap();
        let mut player = Player::new(A, "Ada", Color::Red);
        player.army_pool = 5;

        assert_eq!(place(&mut board, &mut player, peru, 3).unwrap(), 2);
        assert_eq!(board.garrison(peru), 4);

        assert!(matches!(
            place(&mut board, &mut player, peru, 3),
            Err(GameError::InsufficientResources(_))
        ));
        assert!(matches!(
            place(&mut board, &mut player, alaska, 1),
            Err(GameError::InvalidOwnership(_))
        ));
        assert_eq!(player.army_pool, 2);
        assert_eq!(board.garrison(peru), 4);
    }
}
