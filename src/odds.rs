// odds.rs
use crate::combat::{compare_rolls, MAX_ATTACK_DICE, MAX_DEFEND_DICE};
use crate::dice::FACES;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_TABLE_FILE: &str = "conquer_probabilities.bin";

/// `(attacker_losses, defender_losses, probability)` for one exchange.
type Exchange = (u32, u32, f64);

#[derive(Debug, Error)]
pub enum OddsError {
    #[error("odds table I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("odds table encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsTable {
    pub entries: HashMap<(u32, u32), f64>,
}

impl OddsTable {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), OddsError> {
        let encoded = bincode::serialize(self)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OddsError> {
        let encoded = fs::read(path)?;
        Ok(bincode::deserialize(&encoded)?)
    }
}

/// Enumerates every face combination for one exchange and tallies the
/// resulting losses with the same comparison the combat resolver uses.
fn exchange_outcomes(attack_dice: u32, defend_dice: u32) -> Vec<Exchange> {
    let dice = attack_dice + defend_dice;
    let combinations = u32::from(FACES).pow(dice);
    let mut tally: HashMap<(u32, u32), u32> = HashMap::new();

    for mut code in 0..combinations {
        let mut faces: Vec<u8> = (0..dice)
            .map(|_| {
                let face = (code % u32::from(FACES)) as u8 + 1;
                code /= u32::from(FACES);
                face
            })
            .collect();
        let (attacker, defender) = faces.split_at_mut(attack_dice as usize);
        attacker.sort_unstable_by(|a, b| b.cmp(a));
        defender.sort_unstable_by(|a, b| b.cmp(a));
        *tally.entry(compare_rolls(attacker, defender)).or_default() += 1;
    }

    tally
        .into_iter()
        .map(|((att, def), count)| (att, def, f64::from(count) / f64::from(combinations)))
        .collect()
}

/// Garrisons above this are scaled down before the odds are looked up. Same
/// range as the precomputed table.
pub const MAX_EXACT_ARMIES: u32 = 100;

/// Chance that attacking over and over with the most dice allowed takes the
/// target before the source is worn down to a single army. Memoised.
#[derive(Debug, Clone, Default)]
pub struct ConquestOdds {
    exchanges: HashMap<(u32, u32), Vec<Exchange>>,
    cache: HashMap<(u32, u32), f64>,
}

impl ConquestOdds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: OddsTable) -> Self {
        Self {
            exchanges: HashMap::new(),
            cache: table.entries,
        }
    }

    pub fn table(&self) -> OddsTable {
        OddsTable {
            entries: self.cache.clone(),
        }
    }

    /// Odds for any garrison sizes. Past `MAX_EXACT_ARMIES` both sides are
    /// scaled down keeping their ratio, so the cost stays bounded.
    pub fn probability(&mut self, attackers: u32, defenders: u32) -> f64 {
        let (attackers, defenders) = scale_to_cap(attackers, defenders);
        self.exact(attackers, defenders)
    }

    /// Exact odds, filling the table bottom-up to `(attackers, defenders)`.
    pub fn exact(&mut self, attackers: u32, defenders: u32) -> f64 {
        if let Some(p) = settled(attackers, defenders) {
            return p;
        }
        if let Some(&p) = self.cache.get(&(attackers, defenders)) {
            return p;
        }

        // Every exchange removes at least one army, so (a, d) only needs
        // smaller pairs, which this order has already filled.
        for a in 2..=attackers {
            for d in 1..=defenders {
                if self.cache.contains_key(&(a, d)) {
                    continue;
                }
                let p = self.step(a, d);
                self.cache.insert((a, d), p);
            }
        }
        self.cache.get(&(attackers, defenders)).copied().unwrap_or(0.0)
    }

    fn step(&mut self, attackers: u32, defenders: u32) -> f64 {
        let attack_dice = MAX_ATTACK_DICE.min(attackers - 1);
        let defend_dice = MAX_DEFEND_DICE.min(defenders);
        let outcomes = self
            .exchanges
            .entry((attack_dice, defend_dice))
            .or_insert_with(|| exchange_outcomes(attack_dice, defend_dice));
        let cache = &self.cache;

        outcomes
            .iter()
            .map(|&(att, def, chance)| {
                let next = (attackers - att, defenders - def);
                let p = settled(next.0, next.1).or_else(|| cache.get(&next).copied());
                chance * p.unwrap_or(0.0)
            })
            .sum()
    }

    /// Same as `probability`, as a percentage rounded to two decimals.
    pub fn percent(&mut self, attackers: u32, defenders: u32) -> f64 {
        (self.probability(attackers, defenders) * 10000.0).round() / 100.0
    }
}

/// Terminal states: the target is empty, or the source can no longer attack.
fn settled(attackers: u32, defenders: u32) -> Option<f64> {
    if defenders == 0 {
        Some(1.0)
    } else if attackers <= 1 {
        Some(0.0)
    } else {
        None
    }
}

fn scale_to_cap(attackers: u32, defenders: u32) -> (u32, u32) {
    let largest = attackers.max(defenders);
    if largest <= MAX_EXACT_ARMIES {
        return (attackers, defenders);
    }
    let scale = |n: u32| {
        let scaled = (u64::from(n) * u64::from(MAX_EXACT_ARMIES) + u64::from(largest) - 1) / u64::from(largest);
        scaled as u32
    };
    let attackers = if attackers > 1 { scale(attackers).max(2) } else { attackers };
    (attackers, scale(defenders))
}
