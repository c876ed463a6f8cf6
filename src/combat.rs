// combat.rs
use crate::board::Board;
use crate::dice::Dice;
use crate::error::{GameError, Result};
use crate::player::PlayerId;
use crate::territory::TerritoryId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MAX_ATTACK_DICE: u32 = 3;
pub const MAX_DEFEND_DICE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOrder {
    pub attacker: PlayerId,
    pub from: TerritoryId,
    pub to: TerritoryId,
    pub attack_units: u32,
    pub defend_units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub defender: PlayerId,
    pub attacker_rolls: Vec<u8>,
    pub defender_rolls: Vec<u8>,
    pub attacker_losses: u32,
    pub defender_losses: u32,
    /// Committed attackers still standing after the exchange.
    pub surviving_units: u32,
    pub conquered: bool,
}

/// Pairs dice highest against highest. Ties go to the defender.
/// Returns `(attacker_losses, defender_losses)`.
pub fn compare_rolls(attacker_rolls: &[u8], defender_rolls: &[u8]) -> (u32, u32) {
    attacker_rolls
        .iter()
        .zip(defender_rolls)
        .fold((0, 0), |(att, def), (a, d)| if a > d { (att, def + 1) } else { (att + 1, def) })
}

/// Checks an attack against the board without touching it. Returns the
/// defending player.
pub fn validate(board: &Board, order: &AttackOrder) -> Result<PlayerId> {
    let from_name = board.name(order.from);
    let to_name = board.name(order.to);

    if !board.owns(order.attacker, order.from) {
        return Err(GameError::InvalidOwnership(format!(
            "'{from_name}' does not belong to the attacker"
        )));
    }
    if !board.are_adjacent(order.from, order.to) {
        return Err(GameError::InvalidAdjacency {
            from: from_name.to_string(),
            to: to_name.to_string(),
        });
    }
    let defender = match board.owner(order.to) {
        Some(owner) if owner == order.attacker => {
            return Err(GameError::InvalidOwnership(format!(
                "cannot attack your own territory '{to_name}'"
            )));
        }
        Some(owner) => owner,
        None => {
            return Err(GameError::InvalidOwnership(format!("'{to_name}' has no owner")));
        }
    };

    let max_attack = MAX_ATTACK_DICE.min(board.garrison(order.from).saturating_sub(1));
    if order.attack_units < 1 || order.attack_units > max_attack {
        return Err(GameError::InvalidUnitCount(format!(
            "'{from_name}' can attack with 1 to {max_attack} armies, not {}",
            order.attack_units
        )));
    }
    let max_defend = MAX_DEFEND_DICE.min(board.garrison(order.to));
    if order.defend_units < 1 || order.defend_units > max_defend {
        return Err(GameError::InvalidUnitCount(format!(
            "'{to_name}' can defend with 1 to {max_defend} armies, not {}",
            order.defend_units
        )));
    }
    Ok(defender)
}

/// Rolls one exchange of dice and applies it.
///
/// Defender losses come off the target's garrison and attacker losses come
/// off the source. If the target is emptied it changes hands and the
/// surviving committed units become its garrison.
pub fn resolve(board: &mut Board, dice: &mut dyn Dice, order: AttackOrder) -> Result<BattleOutcome> {
    let defender = validate(board, &order)?;

    let attacker_rolls = dice.roll(order.attack_units);
    let defender_rolls = dice.roll(order.defend_units);
    let (attacker_losses, defender_losses) = compare_rolls(&attacker_rolls, &defender_rolls);
    debug!(
        from = board.name(order.from),
        to = board.name(order.to),
        ?attacker_rolls,
        ?defender_rolls,
        attacker_losses,
        defender_losses,
        "dice rolled"
    );

    // Both calls are within the bounds `validate` just enforced.
    board.adjust_garrison(order.to, -i64::from(defender_losses))?;
    board.withdraw(order.from, attacker_losses)?;

    let surviving_units = order.attack_units - attacker_losses;
    let conquered = board.garrison(order.to) == 0;
    if conquered {
        board.transfer_ownership(order.to, order.attacker, surviving_units)?;
        info!(
            territory = board.name(order.to),
            attacker = ?order.attacker,
            defender = ?defender,
            garrison = surviving_units,
            "territory conquered"
        );
    }

    Ok(BattleOutcome {
        defender,
        attacker_rolls,
        defender_rolls,
        attacker_losses,
        defender_losses,
        surviving_units,
        conquered,
    })
}
