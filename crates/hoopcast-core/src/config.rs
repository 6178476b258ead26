// Configuration loading and parsing (league.toml, strategy.toml).
//
// The engine only ever sees an immutable `EngineConfig`. File parsing,
// default-file bootstrapping and league auto-detection all happen here,
// once, before a run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::records::LeagueSettings;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Static definition of one scoring category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Stat key used in player records (`FG_PCT`, `PTS`, ...).
    pub key: String,
    /// Display name (`FG%`, `PTS`, ...). Punt lists refer to this.
    pub name: String,
    #[serde(default = "default_true")]
    pub higher_is_better: bool,
    /// Attempt-volume key for percentage categories (`FGA` for `FG_PCT`).
    #[serde(default)]
    pub volume_key: Option<String>,
    /// Makes key, used to rebuild a percentage from game totals.
    #[serde(default)]
    pub made_key: Option<String>,
    /// Punted categories are scored but excluded from every aggregate.
    #[serde(default)]
    pub punted: bool,
}

fn default_true() -> bool {
    true
}

impl CategoryDefinition {
    pub fn counting(key: &str, name: &str, higher_is_better: bool) -> Self {
        CategoryDefinition {
            key: key.into(),
            name: name.into(),
            higher_is_better,
            volume_key: None,
            made_key: None,
            punted: false,
        }
    }

    pub fn percentage(key: &str, name: &str, made_key: &str, volume_key: &str) -> Self {
        CategoryDefinition {
            key: key.into(),
            name: name.into(),
            higher_is_better: true,
            volume_key: Some(volume_key.into()),
            made_key: Some(made_key.into()),
            punted: false,
        }
    }

    pub fn is_volume_weighted(&self) -> bool {
        self.volume_key.is_some()
    }
}

/// The standard 9-category head-to-head set.
pub fn nine_category_defaults() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::percentage("FG_PCT", "FG%", "FGM", "FGA"),
        CategoryDefinition::percentage("FT_PCT", "FT%", "FTM", "FTA"),
        CategoryDefinition::counting("FG3M", "3PM", true),
        CategoryDefinition::counting("PTS", "PTS", true),
        CategoryDefinition::counting("REB", "REB", true),
        CategoryDefinition::counting("AST", "AST", true),
        CategoryDefinition::counting("STL", "STL", true),
        CategoryDefinition::counting("BLK", "BLK", true),
        CategoryDefinition::counting("TOV", "TO", false),
    ]
}

/// Platform stat id → category key for the standard categories.
pub fn default_stat_ids() -> BTreeMap<u32, String> {
    [
        (5, "FG_PCT"),
        (8, "FT_PCT"),
        (10, "FG3M"),
        (12, "PTS"),
        (15, "REB"),
        (16, "AST"),
        (17, "STL"),
        (18, "BLK"),
        (19, "TOV"),
    ]
    .into_iter()
    .map(|(id, key)| (id, key.to_string()))
    .collect()
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaabConfig {
    pub enabled: bool,
    /// Fallback league-median bid when no history exists.
    pub default_bid: u32,
    pub budget_regular_season: u32,
    pub budget_playoffs: u32,
    /// Largest share of the remaining budget a single bid may use.
    pub max_bid_percent: f64,
    pub weekly_transaction_limit: u32,
}

impl Default for FaabConfig {
    fn default() -> Self {
        FaabConfig {
            enabled: true,
            default_bid: 1,
            budget_regular_season: 300,
            budget_playoffs: 100,
            max_bid_percent: 0.50,
            weekly_transaction_limit: 3,
        }
    }
}

/// Minimum sample a player needs to enter the z-score pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_games: u32,
    pub min_minutes: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        EligibilityConfig {
            min_games: 5,
            min_minutes: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub healthy: f64,
    pub moderate: f64,
    pub risky: f64,
    pub healthy_multiplier: f64,
    pub moderate_multiplier: f64,
    pub risky_multiplier: f64,
    pub fragile_multiplier: f64,
    pub inactive_penalty: f64,
    pub questionable_penalty: f64,
    /// Days without a game before a player counts as inactive.
    pub inactive_days: i64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        AvailabilityConfig {
            healthy: 0.80,
            moderate: 0.60,
            risky: 0.40,
            healthy_multiplier: 1.0,
            moderate_multiplier: 0.85,
            risky_multiplier: 0.65,
            fragile_multiplier: 0.45,
            inactive_penalty: 0.3,
            questionable_penalty: 0.75,
            inactive_days: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weeks_ahead: usize,
    pub weight: f64,
    pub week_decay: f64,
    /// Average games per week assumed when no schedule is available.
    pub default_avg_games: f64,
    /// Per-game bid scaling applied by the bid suggester.
    pub bid_game_factor: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            weeks_ahead: 3,
            weight: 0.10,
            week_decay: 0.5,
            default_avg_games: 3.5,
            bid_game_factor: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotPickupConfig {
    pub enabled: bool,
    pub recent_games: usize,
    pub recency_weight: f64,
    pub trending_weight: f64,
    /// Minimum percent-owned increase to flag a player as trending.
    pub min_delta: f64,
    /// z-delta at which a player is flagged hot.
    pub hot_threshold: f64,
}

impl Default for HotPickupConfig {
    fn default() -> Self {
        HotPickupConfig {
            enabled: true,
            recent_games: 3,
            recency_weight: 0.25,
            trending_weight: 0.15,
            min_delta: 5.0,
            hot_threshold: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedConfig {
    pub weakest_count: usize,
    pub weak_category_bonus: f64,
}

impl Default for NeedConfig {
    fn default() -> Self {
        NeedConfig {
            weakest_count: 3,
            weak_category_bonus: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub auto_detect_droppable: bool,
    pub droppable_count: usize,
    /// Never offered as drops (e.g. injured stars being stashed).
    pub undroppable: Vec<String>,
    /// Always offered as drops, in addition to auto-detected ones.
    pub droppable: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig {
            auto_detect_droppable: true,
            droppable_count: 3,
            undroppable: Vec::new(),
            droppable: Vec::new(),
        }
    }
}

/// Which point of a tier's bid distribution to aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStrategy {
    /// 25th percentile: bargain hunting.
    Value,
    /// Median: market rate.
    Competitive,
    /// 75th percentile: maximize win rate.
    Aggressive,
}

impl BidStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            BidStrategy::Value => "value",
            BidStrategy::Competitive => "competitive",
            BidStrategy::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    #[serde(default)]
    pub min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileTierSpec {
    pub name: String,
    pub percentile: f64,
    pub floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiddingConfig {
    pub strategy: BidStrategy,
    pub premium_floor: f64,
    pub outlier_iqr_factor: f64,
    /// Pool size needed before percentile tiers replace the static table.
    pub min_pool_for_percentiles: usize,
    /// How many top recommendations get a bid suggestion.
    pub top_n: usize,
    pub default_tiers: Vec<TierSpec>,
    pub percentile_tiers: Vec<PercentileTierSpec>,
}

impl Default for BiddingConfig {
    fn default() -> Self {
        let tier = |name: &str, min: Option<f64>| TierSpec {
            name: name.into(),
            min,
        };
        let pct = |name: &str, percentile: f64, floor: f64| PercentileTierSpec {
            name: name.into(),
            percentile,
            floor,
        };
        BiddingConfig {
            strategy: BidStrategy::Competitive,
            premium_floor: 15.0,
            outlier_iqr_factor: 1.5,
            min_pool_for_percentiles: 10,
            top_n: 10,
            default_tiers: vec![
                tier("Elite", Some(6.0)),
                tier("Strong", Some(4.0)),
                tier("Solid", Some(2.5)),
                tier("Streamer", Some(1.0)),
                tier("Dart", None),
            ],
            percentile_tiers: vec![
                pct("Elite", 90.0, 4.0),
                pct("Strong", 70.0, 2.5),
                pct("Solid", 40.0, 1.5),
                pct("Streamer", 15.0, 0.5),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig { top_n: 15 }
    }
}

// ---------------------------------------------------------------------------
// Assembled config
// ---------------------------------------------------------------------------

/// Immutable engine configuration passed into every entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub league_name: String,
    pub categories: Vec<CategoryDefinition>,
    pub stat_ids: BTreeMap<u32, String>,
    pub faab: FaabConfig,
    pub eligibility: EligibilityConfig,
    pub availability: AvailabilityConfig,
    pub schedule: ScheduleConfig,
    pub hot_pickup: HotPickupConfig,
    pub needs: NeedConfig,
    pub roster: RosterConfig,
    pub bidding: BiddingConfig,
    pub report: ReportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            league_name: "Default 9-Cat League".into(),
            categories: nine_category_defaults(),
            stat_ids: default_stat_ids(),
            faab: FaabConfig::default(),
            eligibility: EligibilityConfig::default(),
            availability: AvailabilityConfig::default(),
            schedule: ScheduleConfig::default(),
            hot_pickup: HotPickupConfig::default(),
            needs: NeedConfig::default(),
            roster: RosterConfig::default(),
            bidding: BiddingConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Categories that count toward aggregates.
    pub fn active_categories(&self) -> impl Iterator<Item = &CategoryDefinition> {
        self.categories.iter().filter(|c| !c.punted)
    }

    pub fn category(&self, key: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Return a copy with the named categories punted (matched by display
    /// name, case-insensitive). Unknown names are rejected.
    pub fn with_punts(&self, names: &[String]) -> Result<EngineConfig, ConfigError> {
        let wanted: BTreeSet<String> = names.iter().map(|n| n.trim().to_uppercase()).collect();
        for name in &wanted {
            if !self.categories.iter().any(|c| c.name.to_uppercase() == *name) {
                return Err(invalid(
                    "league.punt",
                    format!("`{name}` does not name a configured category"),
                ));
            }
        }
        let mut cfg = self.clone();
        for cat in &mut cfg.categories {
            cat.punted = wanted.contains(&cat.name.to_uppercase());
        }
        Ok(cfg)
    }

    /// Pure league auto-detection: returns a new config adapted to the
    /// league's scored stats, FAAB flag and weekly add limit.
    ///
    /// Stat ids with no mapping are ignored. If none of the league's ids
    /// map to a configured category the category list is left unchanged.
    pub fn from_league_settings(&self, settings: &LeagueSettings) -> EngineConfig {
        let mut cfg = self.clone();

        if !settings.stat_ids.is_empty() {
            let mut detected: BTreeSet<&str> = BTreeSet::new();
            for id in &settings.stat_ids {
                match self.stat_ids.get(id) {
                    Some(key) => {
                        detected.insert(key.as_str());
                    }
                    None => debug!("ignoring unmapped league stat id {id}"),
                }
            }
            if detected.is_empty() {
                warn!(
                    "league scores none of the configured categories; keeping {} defaults",
                    self.categories.len()
                );
            } else {
                for cat in &self.categories {
                    if !detected.contains(cat.key.as_str()) {
                        info!("league does not score {}; dropping it", cat.name);
                    }
                }
                cfg.categories.retain(|c| detected.contains(c.key.as_str()));
            }
        }

        if let Some(uses_faab) = settings.uses_faab {
            cfg.faab.enabled = uses_faab;
        }
        if let Some(limit) = settings.max_weekly_adds {
            cfg.faab.weekly_transaction_limit = limit;
        }
        if !settings.name.is_empty() {
            cfg.league_name = settings.name.clone();
        }

        cfg
    }
}

// ---------------------------------------------------------------------------
// File structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueSection,
    #[serde(default)]
    faab: FaabConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct LeagueSection {
    name: String,
    #[serde(default)]
    punt: Vec<String>,
    categories: Vec<CategoryDefinition>,
    /// TOML keys are strings; parsed to ids during assembly.
    #[serde(default)]
    stat_ids: BTreeMap<String, String>,
}

/// Raw deserialization target for strategy.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StrategyFile {
    eligibility: EligibilityConfig,
    availability: AvailabilityConfig,
    schedule: ScheduleConfig,
    hot_pickup: HotPickupConfig,
    needs: NeedConfig,
    roster: RosterConfig,
    bidding: BiddingConfig,
    report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<EngineConfig, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = assemble(league_file, strategy_file)?;
    validate(&config)?;
    info!(
        "loaded config for {} ({} categories)",
        config.league_name,
        config.categories.len()
    );
    Ok(config)
}

fn assemble(league: LeagueFile, strategy: StrategyFile) -> Result<EngineConfig, ConfigError> {
    let mut stat_ids = BTreeMap::new();
    for (raw_id, key) in league.league.stat_ids {
        let id: u32 = raw_id
            .trim()
            .parse()
            .map_err(|_| invalid("league.stat_ids", format!("`{raw_id}` is not a stat id")))?;
        stat_ids.insert(id, key);
    }

    let base = EngineConfig {
        league_name: league.league.name,
        categories: league.league.categories,
        stat_ids,
        faab: league.faab,
        eligibility: strategy.eligibility,
        availability: strategy.availability,
        schedule: strategy.schedule,
        hot_pickup: strategy.hot_pickup,
        needs: strategy.needs,
        roster: strategy.roster,
        bidding: strategy.bidding,
        report: strategy.report,
    };

    if league.league.punt.is_empty() {
        Ok(base)
    } else {
        base.with_punts(&league.league.punt)
    }
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: copies defaults if needed, then loads config
/// relative to `base_dir`.
pub fn load_config(base_dir: &Path) -> Result<EngineConfig, ConfigError> {
    let copied = ensure_config_files(base_dir)?;
    for path in &copied {
        info!("initialized {} from defaults", path.display());
    }
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.categories.is_empty() {
        return Err(invalid("league.categories", "at least one category is required"));
    }

    let mut keys = BTreeSet::new();
    for cat in &config.categories {
        if cat.key.trim().is_empty() {
            return Err(invalid("league.categories", "category key must not be empty"));
        }
        if !keys.insert(cat.key.as_str()) {
            return Err(invalid(
                "league.categories",
                format!("duplicate category key `{}`", cat.key),
            ));
        }
        if cat.volume_key.as_deref() == Some(cat.key.as_str()) {
            return Err(invalid(
                "league.categories",
                format!("`{}` cannot use itself as its volume key", cat.key),
            ));
        }
    }
    if config.active_categories().next().is_none() {
        return Err(invalid("league.punt", "every category is punted"));
    }

    let faab = &config.faab;
    if !(faab.max_bid_percent > 0.0 && faab.max_bid_percent <= 1.0) {
        return Err(invalid(
            "faab.max_bid_percent",
            format!("must be in (0, 1], got {}", faab.max_bid_percent),
        ));
    }
    if faab.budget_regular_season == 0 {
        return Err(invalid("faab.budget_regular_season", "must be greater than 0"));
    }

    let a = &config.availability;
    let rate_fields: &[(&str, f64)] = &[
        ("availability.healthy", a.healthy),
        ("availability.moderate", a.moderate),
        ("availability.risky", a.risky),
    ];
    for (name, val) in rate_fields {
        if !(0.0..=1.0).contains(val) {
            return Err(invalid(name, format!("must be between 0.0 and 1.0, got {val}")));
        }
    }
    if !(a.healthy > a.moderate && a.moderate > a.risky) {
        return Err(invalid(
            "availability",
            "thresholds must satisfy healthy > moderate > risky",
        ));
    }

    let positive_fields: &[(&str, f64)] = &[
        ("schedule.week_decay", config.schedule.week_decay),
        ("schedule.default_avg_games", config.schedule.default_avg_games),
        ("bidding.outlier_iqr_factor", config.bidding.outlier_iqr_factor),
        ("needs.weak_category_bonus", config.needs.weak_category_bonus),
    ];
    for (name, val) in positive_fields {
        if *val <= 0.0 {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }
    if config.schedule.weeks_ahead == 0 {
        return Err(invalid("schedule.weeks_ahead", "must be > 0"));
    }
    if config.hot_pickup.recent_games == 0 {
        return Err(invalid("hot_pickup.recent_games", "must be > 0"));
    }

    validate_tiers(&config.bidding)
}

fn validate_tiers(bidding: &BiddingConfig) -> Result<(), ConfigError> {
    let tiers = &bidding.default_tiers;
    let Some((catch_all, ranked)) = tiers.split_last() else {
        return Err(invalid("bidding.default_tiers", "at least one tier is required"));
    };
    if catch_all.min.is_some() {
        return Err(invalid(
            "bidding.default_tiers",
            "the last tier is the catch-all and must not have a minimum",
        ));
    }
    let mut previous = f64::INFINITY;
    for tier in ranked {
        let Some(min) = tier.min else {
            return Err(invalid(
                "bidding.default_tiers",
                format!("tier `{}` needs a minimum score", tier.name),
            ));
        };
        if min >= previous {
            return Err(invalid(
                "bidding.default_tiers",
                "minimum scores must be strictly descending",
            ));
        }
        previous = min;
    }

    let mut previous = f64::INFINITY;
    for tier in &bidding.percentile_tiers {
        if !(tier.percentile > 0.0 && tier.percentile <= 100.0) {
            return Err(invalid(
                "bidding.percentile_tiers",
                format!("percentile for `{}` must be in (0, 100]", tier.name),
            ));
        }
        if tier.percentile >= previous {
            return Err(invalid(
                "bidding.percentile_tiers",
                "percentiles must be strictly descending",
            ));
        }
        previous = tier.percentile;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
