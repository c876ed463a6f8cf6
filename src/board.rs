// board.rs
use crate::continent::{Continent, ContinentId};
use crate::error::{EntityKind, GameError, Result};
use crate::player::PlayerId;
use crate::territory::{Territory, TerritoryId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// The world map: a static territory graph plus the mutable ownership and
/// garrison state layered on top of it.
///
/// Ownership lives here as `territory -> player` with a per-player index kept
/// in step, so a transfer updates both sides in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub territories: Vec<Territory>,
    pub continents: Vec<Continent>,
    territory_index: HashMap<String, TerritoryId>,
    continent_index: HashMap<String, ContinentId>,
    owners: Vec<Option<PlayerId>>,
    garrisons: Vec<u32>,
    holdings: HashMap<PlayerId, BTreeSet<TerritoryId>>,
}

fn index_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Board {
    pub fn new() -> Self {
        Self {
            territories: Vec::new(),
            continents: Vec::new(),
            territory_index: HashMap::new(),
            continent_index: HashMap::new(),
            owners: Vec::new(),
            garrisons: Vec::new(),
            holdings: HashMap::new(),
        }
    }

    pub(crate) fn add_continent(&mut self, name: &str, bonus_armies: u32) -> ContinentId {
        let id = ContinentId(self.continents.len());
        self.continents.push(Continent::new(id, name, bonus_armies));
        self.continent_index.insert(index_key(name), id);
        id
    }

    pub(crate) fn add_territory(&mut self, name: &str, code: &str, continent: ContinentId) -> TerritoryId {
        let id = TerritoryId(self.territories.len());
        self.territories.push(Territory::new(id, name, code, continent));
        self.continents[continent.0].add_territory(id);
        self.owners.push(None);
        self.garrisons.push(0);
        self.territory_index.insert(index_key(name), id);
        if !code.is_empty() {
            self.territory_index.entry(index_key(code)).or_insert(id);
        }
        id
    }

    pub(crate) fn connect(&mut self, a: TerritoryId, b: TerritoryId) {
        self.territories[a.0].add_adjacent(b);
        self.territories[b.0].add_adjacent(a);
    }

    /// Case-insensitive lookup by full name or short code.
    pub fn territory_id(&self, name: &str) -> Result<TerritoryId> {
        self.territory_index
            .get(&index_key(name))
            .copied()
            .ok_or_else(|| GameError::not_found(EntityKind::Territory, name))
    }

    pub fn continent_id(&self, name: &str) -> Result<ContinentId> {
        self.continent_index
            .get(&index_key(name))
            .copied()
            .ok_or_else(|| GameError::not_found(EntityKind::Continent, name))
    }

    pub fn get_continent(&self, name: &str) -> Result<&Continent> {
        self.continent_id(name).map(|id| self.continent(id))
    }

    pub fn territory(&self, id: TerritoryId) -> &Territory {
        &self.territories[id.0]
    }

    pub fn continent(&self, id: ContinentId) -> &Continent {
        &self.continents[id.0]
    }

    pub fn name(&self, id: TerritoryId) -> &str {
        &self.territories[id.0].name
    }

    pub fn territory_ids(&self) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territories.iter().map(|t| t.id)
    }

    pub fn are_adjacent(&self, a: TerritoryId, b: TerritoryId) -> bool {
        self.territory(a).is_adjacent(b)
    }

    pub fn neighbours(&self, id: TerritoryId) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territory(id).adjacent_territories.iter().copied()
    }

    pub fn owner(&self, id: TerritoryId) -> Option<PlayerId> {
        self.owners[id.0]
    }

    pub fn garrison(&self, id: TerritoryId) -> u32 {
        self.garrisons[id.0]
    }

    pub fn territories_of(&self, player: PlayerId) -> impl Iterator<Item = TerritoryId> + '_ {
        self.holdings.get(&player).into_iter().flatten().copied()
    }

    pub fn territory_count(&self, player: PlayerId) -> usize {
        self.holdings.get(&player).map_or(0, BTreeSet::len)
    }

    pub fn owns(&self, player: PlayerId, territory: TerritoryId) -> bool {
        self.owner(territory) == Some(player)
    }

    pub fn controls_continent(&self, player: PlayerId, continent: ContinentId) -> bool {
        let members = &self.continent(continent).territories;
        !members.is_empty() && members.iter().all(|&t| self.owns(player, t))
    }

    pub fn continent_controller(&self, continent: ContinentId) -> Option<PlayerId> {
        let first = *self.continent(continent).territories.iter().next()?;
        let owner = self.owner(first)?;
        self.controls_continent(owner, continent).then_some(owner)
    }

    pub fn controlled_continents(&self, player: PlayerId) -> Vec<ContinentId> {
        self.continents
            .iter()
            .map(|c| c.id)
            .filter(|&c| self.controls_continent(player, c))
            .collect()
    }

    /// Hands `territory` to `new_owner` with a fresh garrison, returning the
    /// previous owner.
    pub(crate) fn transfer_ownership(
        &mut self,
        territory: TerritoryId,
        new_owner: PlayerId,
        garrison: u32,
    ) -> Result<Option<PlayerId>> {
        if garrison == 0 {
            return Err(GameError::InvalidUnitCount(format!(
                "'{}' cannot change hands with an empty garrison",
                self.name(territory)
            )));
        }
        let previous = self.owners[territory.0];
        if let Some(old) = previous {
            if let Some(held) = self.holdings.get_mut(&old) {
                held.remove(&territory);
            }
        }
        self.holdings.entry(new_owner).or_default().insert(territory);
        self.owners[territory.0] = Some(new_owner);
        self.garrisons[territory.0] = garrison;
        Ok(previous)
    }

    /// Applies a signed change to a garrison. Never lets it go negative.
    pub(crate) fn adjust_garrison(&mut self, territory: TerritoryId, delta: i64) -> Result<u32> {
        let current = i64::from(self.garrisons[territory.0]);
        let next = current + delta;
        if next < 0 {
            return Err(GameError::InvalidUnitCount(format!(
                "'{}' holds {} armies, cannot apply {}",
                self.name(territory),
                current,
                delta
            )));
        }
        let next = u32::try_from(next).map_err(|_| {
            GameError::InvalidUnitCount(format!("garrison of '{}' overflowed", self.name(territory)))
        })?;
        self.garrisons[territory.0] = next;
        Ok(next)
    }

    /// Removes `units` from a territory that must keep at least one army behind.
    pub(crate) fn withdraw(&mut self, territory: TerritoryId, units: u32) -> Result<u32> {
        let current = self.garrison(territory);
        if units >= current {
            return Err(GameError::InvalidUnitCount(format!(
                "'{}' holds {} armies, withdrawing {} would leave it empty",
                self.name(territory),
                current,
                units
            )));
        }
        self.adjust_garrison(territory, -i64::from(units))
    }

    /// Deals every territory out in random order, one army each, then tops
    /// each player up round-robin until they have `starting_armies` on the map.
    pub(crate) fn shuffle_and_distribute_territories<R: Rng + ?Sized>(
        &mut self,
        players: &[PlayerId],
        starting_armies: u32,
        rng: &mut R,
    ) {
        if players.is_empty() {
            return;
        }
        let mut territories: Vec<TerritoryId> = self.territory_ids().collect();
        territories.shuffle(rng);

        for (i, &territory) in territories.iter().enumerate() {
            let player = players[i % players.len()];
            self.holdings.entry(player).or_default().insert(territory);
            self.owners[territory.0] = Some(player);
            self.garrisons[territory.0] = 1;
        }

        for &player in players {
            let owned: Vec<TerritoryId> = self.territories_of(player).collect();
            if owned.is_empty() {
                continue;
            }
            let on_board = owned.len() as u32;
            let mut remaining = starting_armies.saturating_sub(on_board);
            debug!(?player, territories = owned.len(), remaining, "topping up starting armies");
            while remaining > 0 {
                for &territory in &owned {
                    if remaining == 0 {
                        break;
                    }
                    self.garrisons[territory.0] += 1;
                    remaining -= 1;
                }
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_config::GameConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn classic() -> Board {
        GameConfig::classic().unwrap().to_board().unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive_and_accepts_codes() {
        let board = classic();
        let by_name = board.territory_id("Northern Europe").unwrap();
        assert_eq!(board.territory_id("  northern europe ").unwrap(), by_name);
        assert_eq!(board.territory_id("neu").unwrap(), by_name);
    }

    #[test]
    fn repeated_unknown_lookups_fail_identically() {
        let board = classic();
        let before = board.clone();
        let first = board.territory_id("Atlantis").unwrap_err();
        let second = board.territory_id("Atlantis").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(first, GameError::not_found(EntityKind::Territory, "Atlantis"));
        assert_eq!(board, before);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let board = classic();
        for t in &board.territories {
            for &n in &t.adjacent_territories {
                assert!(board.are_adjacent(n, t.id), "{} -> {}", board.name(n), t.name);
            }
        }
    }

    #[test]
    fn transfer_updates_both_holdings() {
        let mut board = classic();
        let brazil = board.territory_id("Brazil").unwrap();
        board.transfer_ownership(brazil, PlayerId(0), 3).unwrap();
        let previous = board.transfer_ownership(brazil, PlayerId(1), 2).unwrap();

        assert_eq!(previous, Some(PlayerId(0)));
        assert_eq!(board.territory_count(PlayerId(0)), 0);
        assert_eq!(board.territories_of(PlayerId(1)).collect::<Vec<_>>(), vec![brazil]);
        assert_eq!(board.garrison(brazil), 2);
    }

    #[test]
    fn garrison_never_goes_negative() {
        let mut board = classic();
        let peru = board.territory_id("Peru").unwrap();
        board.transfer_ownership(peru, PlayerId(0), 2).unwrap();

        assert!(matches!(board.adjust_garrison(peru, -3), Err(GameError::InvalidUnitCount(_))));
        assert_eq!(board.garrison(peru), 2);
        assert_eq!(board.adjust_garrison(peru, -2).unwrap(), 0);
    }

    #[test]
    fn withdraw_keeps_one_army_behind() {
        let mut board = classic();
        let peru = board.territory_id("Peru").unwrap();
        board.transfer_ownership(peru, PlayerId(0), 4).unwrap();

        assert!(board.withdraw(peru, 4).is_err());
        assert_eq!(board.withdraw(peru, 3).unwrap(), 1);
    }

    #[test]
    fn continent_control_follows_ownership() {
        let mut board = classic();
        let australia = board.continent_id("Australia").unwrap();
        let members: Vec<_> = board.continent(australia).territories.iter().copied().collect();
        for &t in &members {
            board.transfer_ownership(t, PlayerId(2), 1).unwrap();
        }
        assert_eq!(board.continent_controller(australia), Some(PlayerId(2)));

        board.transfer_ownership(members[0], PlayerId(3), 1).unwrap();
        assert_eq!(board.continent_controller(australia), None);
        assert!(!board.controls_continent(PlayerId(2), australia));
    }

    #[test]
    fn distribution_covers_the_whole_map() {
        let mut board = classic();
        let players = [PlayerId(0), PlayerId(1), PlayerId(2)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        board.shuffle_and_distribute_territories(&players, 35, &mut rng);

        for id in board.territory_ids() {
            assert!(board.owner(id).is_some());
            assert!(board.garrison(id) >= 1);
        }
        for &p in &players {
            assert_eq!(board.territory_count(p), 14);
            let total: u32 = board.territories_of(p).map(|t| board.garrison(t)).sum();
            assert_eq!(total, 35);
        }
    }
}
