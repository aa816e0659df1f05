use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Hero, HeroId};

#[derive(Error, Debug, PartialEq)]
pub enum DataError {
    #[error("Hero catalog is empty")]
    EmptyCatalog,
    #[error("Hero {0} is listed twice in the catalog")]
    DuplicateHero(HeroId),
    #[error("Role value {value} for hero {hero} is outside 0..=100")]
    RoleValueOutOfRange { hero: HeroId, value: u8 },
}

/// Roster position, 1 (safe-lane core) to 5 (hard support).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Position(u8);

impl Position {
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Position(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Position::new(value).ok_or_else(|| format!("Position must be within 1..=5, got {value}"))
    }
}

impl From<Position> for u8 {
    fn from(value: Position) -> Self {
        value.0
    }
}

/// Read-only list of heroes available to the draft.
#[derive(Debug, Clone)]
pub struct HeroCatalog {
    heroes: Vec<Hero>,
    index: HashMap<HeroId, usize>,
}

impl HeroCatalog {
    pub fn new(heroes: Vec<Hero>) -> Result<Self, DataError> {
        if heroes.is_empty() {
            return Err(DataError::EmptyCatalog);
        }
        let mut index = HashMap::with_capacity(heroes.len());
        for (i, hero) in heroes.iter().enumerate() {
            if index.insert(hero.id.clone(), i).is_some() {
                return Err(DataError::DuplicateHero(hero.id.clone()));
            }
        }
        Ok(Self { heroes, index })
    }

    pub fn get(&self, id: &HeroId) -> Option<&Hero> {
        self.index.get(id).map(|&i| &self.heroes[i])
    }

    pub fn contains(&self, id: &HeroId) -> bool {
        self.index.contains_key(id)
    }

    pub fn all(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

/// Sparse hero-vs-hero advantage scores. A missing row or column reads as neutral (0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupTable {
    rows: HashMap<HeroId, HashMap<HeroId, f64>>,
}

impl MatchupTable {
    pub fn new(rows: HashMap<HeroId, HashMap<HeroId, f64>>) -> Self {
        Self { rows }
    }

    /// Advantage of `candidate` when facing `enemy`.
    pub fn advantage(&self, candidate: &HeroId, enemy: &HeroId) -> f64 {
        self.rows
            .get(candidate)
            .and_then(|row| row.get(enemy))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn advantage_sum<'a>(
        &self,
        candidate: &HeroId,
        enemies: impl IntoIterator<Item = &'a Hero>,
    ) -> f64 {
        enemies
            .into_iter()
            .map(|e| self.advantage(candidate, &e.id))
            .sum()
    }

    fn ids(&self) -> impl Iterator<Item = &HeroId> {
        self.rows
            .iter()
            .flat_map(|(id, row)| std::iter::once(id).chain(row.keys()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleProfile {
    /// Suitability for positions 1..=5, each 0..=100.
    #[serde(alias = "role")]
    pub positions: [u8; 5],
    #[serde(default)]
    pub weak: bool,
}

impl RoleProfile {
    pub fn position_value(&self, position: Position) -> u8 {
        self.positions[position.index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleProfileTable {
    profiles: HashMap<HeroId, RoleProfile>,
}

impl RoleProfileTable {
    pub fn new(profiles: HashMap<HeroId, RoleProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, id: &HeroId) -> Option<&RoleProfile> {
        self.profiles.get(id)
    }

    pub fn is_weak(&self, id: &HeroId) -> bool {
        self.get(id).is_some_and(|p| p.weak)
    }

    pub fn position_value(&self, id: &HeroId, position: Position) -> u8 {
        self.get(id)
            .map(|p| p.position_value(position))
            .unwrap_or(0)
    }
}

/// The three read-only tables every draft session works from.
#[derive(Debug, Clone)]
pub struct DraftData {
    pub heroes: HeroCatalog,
    pub matchups: MatchupTable,
    pub roles: RoleProfileTable,
}

impl DraftData {
    pub fn new(
        heroes: HeroCatalog,
        matchups: MatchupTable,
        roles: RoleProfileTable,
    ) -> Result<Self, DataError> {
        for (hero, profile) in &roles.profiles {
            if let Some(&value) = profile.positions.iter().find(|&&v| v > 100) {
                return Err(DataError::RoleValueOutOfRange {
                    hero: hero.clone(),
                    value,
                });
            }
        }

        let unknown: HashSet<_> = matchups
            .ids()
            .chain(roles.profiles.keys())
            .filter(|id| !heroes.contains(id))
            .collect();
        if !unknown.is_empty() {
            let mut unknown: Vec<_> = unknown.into_iter().map(HeroId::as_str).collect();
            unknown.sort();
            warn!(
                "Data tables reference heroes missing from the catalog: {}",
                unknown.join(", ")
            );
        }

        Ok(Self {
            heroes,
            matchups,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    fn hero(id: &str) -> Hero {
        Hero::new(id, id, Attribute::Agility)
    }

    #[test]
    fn catalog_rejects_duplicates() {
        let err = HeroCatalog::new(vec![hero("axe"), hero("npc_dota_hero_axe")]).unwrap_err();
        assert_eq!(err, DataError::DuplicateHero(HeroId::from("axe")));
        assert_eq!(
            HeroCatalog::new(vec![]).unwrap_err(),
            DataError::EmptyCatalog
        );
    }

    #[test]
    fn missing_matchup_is_neutral() {
        let table: MatchupTable = serde_yaml::from_str("axe:\n  lina: 2.5\n").unwrap();
        assert_eq!(table.advantage(&"axe".into(), &"lina".into()), 2.5);
        assert_eq!(table.advantage(&"lina".into(), &"axe".into()), 0.0);
        assert_eq!(table.advantage(&"pudge".into(), &"axe".into()), 0.0);
        let enemies = [hero("lina"), hero("pudge")];
        assert_eq!(table.advantage_sum(&"axe".into(), &enemies), 2.5);
    }

    #[test]
    fn role_lookup() {
        let table: RoleProfileTable =
            serde_yaml::from_str("lion:\n  role: [0, 0, 0, 60, 90]\n  weak: true\n").unwrap();
        let pos5 = Position::new(5).unwrap();
        assert_eq!(table.position_value(&"lion".into(), pos5), 90);
        assert_eq!(table.position_value(&"axe".into(), pos5), 0);
        assert!(table.is_weak(&"lion".into()));
        assert!(!table.is_weak(&"axe".into()));
    }

    #[test]
    fn position_bounds() {
        assert!(Position::new(0).is_none());
        assert!(Position::new(6).is_none());
        assert_eq!(Position::new(3).map(Position::get), Some(3));
    }

    #[test]
    fn data_rejects_role_values_above_100() {
        let heroes = HeroCatalog::new(vec![hero("lion")]).unwrap();
        let roles: RoleProfileTable =
            serde_yaml::from_str("lion:\n  positions: [0, 0, 0, 60, 120]\n").unwrap();
        let err = DraftData::new(heroes, MatchupTable::default(), roles).unwrap_err();
        assert_eq!(
            err,
            DataError::RoleValueOutOfRange {
                hero: "lion".into(),
                value: 120
            }
        );
    }
}
