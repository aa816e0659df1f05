use std::borrow::Borrow;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

const ENGINE_PREFIX: &str = "npc_dota_hero_";

/// Stable hero identifier. Engine-style ids (`npc_dota_hero_axe`) are stored in their short form
/// (`axe`), so both spellings resolve to the same hero.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HeroId(String);

impl HeroId {
    pub fn new(value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        HeroId(value.strip_prefix(ENGINE_PREFIX).unwrap_or(value).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn engine_name(&self) -> String {
        format!("{ENGINE_PREFIX}{}", self.0)
    }
}

impl From<String> for HeroId {
    fn from(value: String) -> Self {
        HeroId::new(value)
    }
}

impl From<&str> for HeroId {
    fn from(value: &str) -> Self {
        HeroId::new(value)
    }
}

impl From<HeroId> for String {
    fn from(value: HeroId) -> Self {
        value.0
    }
}

impl Display for HeroId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for HeroId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    #[serde(alias = "str")]
    Strength,
    #[serde(alias = "agi")]
    Agility,
    #[serde(alias = "int")]
    Intelligence,
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Attribute::Strength => "str",
            Attribute::Agility => "agi",
            Attribute::Intelligence => "int",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    #[serde(alias = "attr")]
    pub attribute: Attribute,
}

impl Hero {
    pub fn new(id: impl Into<HeroId>, name: impl Into<String>, attribute: Attribute) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attribute,
        }
    }
}

impl Display for Hero {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

impl AsRef<Hero> for Hero {
    fn as_ref(&self) -> &Hero {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_prefix_is_stripped() {
        assert_eq!(HeroId::from("npc_dota_hero_axe"), HeroId::from("axe"));
        assert_eq!(HeroId::from(" axe ").engine_name(), "npc_dota_hero_axe");
    }

    #[test]
    fn hero_deserializes_short_attribute() {
        let hero: Hero =
            serde_yaml::from_str("id: npc_dota_hero_lina\nname: Lina\nattr: int\n").unwrap();
        assert_eq!(hero.id.as_str(), "lina");
        assert_eq!(hero.attribute, Attribute::Intelligence);
    }
}
