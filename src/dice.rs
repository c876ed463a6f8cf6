// dice.rs
use rand::Rng;
use std::collections::VecDeque;
use std::fmt;

pub const FACES: u8 = 6;

/// Source of six-sided dice. Results come back sorted highest first.
pub trait Dice: Send + fmt::Debug {
    fn roll(&mut self, count: u32) -> Vec<u8>;
}

#[derive(Debug, Clone)]
pub struct RandomDice<R> {
    rng: R,
}

impl<R> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send + fmt::Debug> Dice for RandomDice<R> {
    fn roll(&mut self, count: u32) -> Vec<u8> {
        let mut rolls: Vec<u8> = (0..count).map(|_| self.rng.gen_range(1..=FACES)).collect();
        rolls.sort_unstable_by(|a, b| b.cmp(a));
        rolls
    }
}

/// Replays dice thrown at a real table (or fixed by a test). Values are
/// consumed in order; once the script runs dry every die shows 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    script: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: values.into_iter().map(|v| v.clamp(1, FACES)).collect(),
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, count: u32) -> Vec<u8> {
        let mut rolls: Vec<u8> = (0..count)
            .map(|_| self.script.pop_front().unwrap_or(1))
            .collect();
        rolls.sort_unstable_by(|a, b| b.cmp(a));
        rolls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_rolls_are_sorted_and_in_range() {
        let mut dice = RandomDice::new(ChaCha8Rng::seed_from_u64(42));
        for _ in 0..200 {
            let rolls = dice.roll(3);
            assert_eq!(rolls.len(), 3);
            assert!(rolls.windows(2).all(|w| w[0] >= w[1]));
            assert!(rolls.iter().all(|&r| (1..=FACES).contains(&r)));
        }
    }

    #[test]
    fn scripted_rolls_replay_in_order() {
        let mut dice = ScriptedDice::new([2, 6, 4, 9]);
        assert_eq!(dice.roll(3), vec![6, 4, 2]);
        assert_eq!(dice.roll(2), vec![6, 1]);
    }
}
