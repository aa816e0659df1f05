use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use draft_model::{DraftData, Hero, HeroCatalog, MatchupTable, RoleProfileTable};
use log::info;
use serde::de::DeserializeOwned;

use super::config::Config;

const HEROES_FILE: &str = "heroes.yaml";
const MATCHUPS_FILE: &str = "matchups.yaml";
const ROLES_FILE: &str = "roles.yaml";

const BUNDLED_HEROES: &str = include_str!("data/heroes.yaml");
const BUNDLED_MATCHUPS: &str = include_str!("data/matchups.yaml");
const BUNDLED_ROLES: &str = include_str!("data/roles.yaml");

fn config_file_path() -> PathBuf {
    data_dir().join("config.yaml")
}

pub fn data_dir() -> PathBuf {
    let project_dirs = directories::ProjectDirs::from("com", "captains_draft", "captains_draft")
        .expect("Cannot retrieve project dirs");
    project_dirs.data_dir().to_owned()
}

/// Loads `config.yaml` from the data directory. A missing file means defaults; nothing is
/// written back.
pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    info!("Config file: {}", path.to_string_lossy());
    if !path.exists() {
        info!("Config file does not exist, using defaults.");
        return Ok(Config::default());
    }
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let config_file =
        File::open(path).with_context(|| format!("Cannot open {}", path.to_string_lossy()))?;
    let config: Config = serde_yaml::from_reader(config_file)
        .with_context(|| format!("Cannot parse {}", path.to_string_lossy()))?;
    config.validate()?;
    Ok(config)
}

/// Loads the hero catalog, matchup table and role profiles. Files found in the configured data
/// directory replace the bundled tables one by one.
pub fn load_draft_data(config: &Config) -> Result<Arc<DraftData>> {
    let Some(dir) = &config.data_dir else {
        return bundled_draft_data();
    };
    info!("Data dir: {}", dir.to_string_lossy());
    let heroes = read_table(dir, HEROES_FILE, BUNDLED_HEROES)?;
    let matchups = read_table(dir, MATCHUPS_FILE, BUNDLED_MATCHUPS)?;
    let roles = read_table(dir, ROLES_FILE, BUNDLED_ROLES)?;
    parse_tables(&heroes, &matchups, &roles).map(Arc::new)
}

pub fn bundled_draft_data() -> Result<Arc<DraftData>> {
    parse_tables(BUNDLED_HEROES, BUNDLED_MATCHUPS, BUNDLED_ROLES).map(Arc::new)
}

fn read_table(dir: &Path, name: &str, bundled: &str) -> Result<String> {
    let path = dir.join(name);
    if !path.is_file() {
        info!("{name} not found in data dir, using bundled table");
        return Ok(bundled.to_string());
    }
    fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.to_string_lossy()))
}

fn parse_tables(heroes: &str, matchups: &str, roles: &str) -> Result<DraftData> {
    let heroes: Vec<Hero> = parse(HEROES_FILE, heroes)?;
    let matchups: MatchupTable = parse(MATCHUPS_FILE, matchups)?;
    let roles: RoleProfileTable = parse(ROLES_FILE, roles)?;
    let catalog = HeroCatalog::new(heroes)?;
    info!("Loaded {} heroes", catalog.len());
    Ok(DraftData::new(catalog, matchups, roles)?)
}

fn parse<T: DeserializeOwned>(name: &str, text: &str) -> Result<T> {
    serde_yaml::from_str(text).with_context(|| format!("Cannot parse {name}"))
}
