//! Data-driven game tables
//!
//! Adversary, barrier and stage tables are plain serde structs in the same
//! camelCase JSON shape the content pipeline writes. `GameConfig::default()`
//! carries the built-in tables used when no file is supplied.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Special ability carried by an adversary type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    #[default]
    None,
    /// Destroys the barrier it touches and dies with it
    ExplodeWall,
    /// Passes through the first barrier it touches
    ShieldOnce,
    /// Releases a brood of basic adversaries when killed
    SpawnOnDeath,
    /// Blinks in and out of view (cosmetic only)
    Stealth,
    /// Periodic speed bursts
    Dash,
}

impl Special {
    pub fn as_str(&self) -> &'static str {
        match self {
            Special::None => "none",
            Special::ExplodeWall => "explode_wall",
            Special::ShieldOnce => "shield_once",
            Special::SpawnOnDeath => "spawn_on_death",
            Special::Stealth => "stealth",
            Special::Dash => "dash",
        }
    }
}

/// Static adversary definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryType {
    pub id: String,
    pub name: String,
    /// Base health before difficulty scaling
    pub hp: f32,
    /// Pixels per second
    pub speed: f32,
    /// Score for a kill before the barrier-length multiplier
    pub reward: u64,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub special: Special,
}

impl AdversaryType {
    /// Collision radius (half the footprint width)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.width / 2.0
    }
}

/// Static barrier definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierType {
    pub id: String,
    pub name: String,
    pub damage: f32,
    /// Hex colour string as authored ("0x00aaff")
    pub color: String,
    #[serde(default)]
    pub slow_percent: f32,
    #[serde(default)]
    pub slow_duration: Option<u64>,
    #[serde(default)]
    pub dot_damage: f32,
    #[serde(default)]
    pub dot_interval: Option<u64>,
    #[serde(default)]
    pub dot_duration: Option<u64>,
    #[serde(default)]
    pub unlock_stage: u32,
    #[serde(default)]
    pub purchase_cost: u32,
}

impl BarrierType {
    pub fn slow_duration_ms(&self) -> u64 {
        self.slow_duration.unwrap_or(DEFAULT_SLOW_DURATION_MS)
    }

    pub fn dot_interval_ms(&self) -> u64 {
        self.dot_interval.unwrap_or(DEFAULT_DOT_INTERVAL_MS)
    }

    pub fn dot_duration_ms(&self) -> u64 {
        self.dot_duration.unwrap_or(DEFAULT_DOT_DURATION_MS)
    }

    /// Parsed colour, falling back to the basic barrier blue
    pub fn color_rgb(&self) -> u32 {
        let hex = self
            .color
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches('#');
        u32::from_str_radix(hex, 16).unwrap_or(0x00aaff)
    }
}

/// Edge of the playfield an adversary enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

/// One wave of a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSpec {
    /// Compact roster, e.g. "bug_small:6,worm:2"
    pub enemies: String,
    #[serde(default)]
    pub spawn_interval: Option<u64>,
    pub directions: Vec<Direction>,
}

impl WaveSpec {
    pub fn spawn_interval_ms(&self) -> u64 {
        self.spawn_interval.unwrap_or(DEFAULT_SPAWN_INTERVAL_MS)
    }

    /// Adversary ids named by this wave, in authored order (may repeat)
    pub fn adversary_ids(&self) -> impl Iterator<Item = &str> {
        self.enemies
            .split(',')
            .filter_map(|part| part.split(':').next())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Ordered list of waves plus objective and grading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: u32,
    pub name: String,
    /// Objective base health
    pub cpu_hp: u32,
    /// Coin reward on clear
    pub reward: u64,
    /// Barrier-usage target for economy grading
    #[serde(default)]
    pub target_walls: Option<u32>,
    pub waves: Vec<WaveSpec>,
}

impl Stage {
    pub fn target_barriers(&self) -> u32 {
        self.target_walls.unwrap_or(DEFAULT_TARGET_BARRIERS)
    }

    /// Distinct adversary types fielded by this stage, plain types first,
    /// each group in order of first appearance
    pub fn roster<'a>(&self, config: &'a GameConfig) -> Vec<&'a AdversaryType> {
        let mut seen = HashSet::new();
        let mut roster: Vec<&AdversaryType> = self
            .waves
            .iter()
            .flat_map(|w| w.adversary_ids())
            .filter(|id| seen.insert(id.to_string()))
            .filter_map(|id| config.adversary(id))
            .collect();
        // Stable sort keeps first-appearance order inside each group
        roster.sort_by_key(|a| a.special != Special::None);
        roster
    }
}

/// Difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Normal => DifficultySettings {
                max_barrier_length: 300.0,
                enemy_count_multiplier: 1.0,
                enemy_hp_multiplier: 1.0,
                objective_hp_penalty: 0,
            },
            Difficulty::Hard => DifficultySettings {
                max_barrier_length: 200.0,
                enemy_count_multiplier: 1.5,
                enemy_hp_multiplier: 1.2,
                objective_hp_penalty: 2,
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::Invalid(format!(
                "unknown difficulty `{s}` (expected normal or hard)"
            ))),
        }
    }
}

/// Numeric knobs derived from a difficulty tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    /// Gesture is cut off once it reaches this length
    pub max_barrier_length: f32,
    /// Applied to every wave entry count, rounded up
    pub enemy_count_multiplier: f64,
    /// Applied to every spawned adversary's health, rounded up
    pub enemy_hp_multiplier: f64,
    /// Subtracted from objective health (never below 1)
    pub objective_hp_penalty: u32,
}

impl DifficultySettings {
    /// Scaled spawn health
    pub fn scale_hp(&self, base: f32) -> f32 {
        (base as f64 * self.enemy_hp_multiplier).ceil() as f32
    }

    /// Scaled wave-entry count
    pub fn scale_count(&self, count: u32) -> usize {
        (count as f64 * self.enemy_count_multiplier).ceil() as usize
    }
}

/// Purchased upgrade levels, read once at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub wall_duration: u32,
    pub wall_damage: u32,
    pub wall_count: u32,
    pub cpu_hp: u32,
}

impl Upgrades {
    /// Barrier lifetime in ms
    pub fn barrier_duration_ms(&self) -> u64 {
        BARRIER_BASE_DURATION_MS + self.wall_duration as u64 * 1000
    }

    pub fn damage_multiplier(&self) -> f32 {
        1.0 + self.wall_damage as f32 * 0.2
    }

    /// Maximum simultaneous barriers
    pub fn barrier_cap(&self) -> usize {
        BARRIER_BASE_CAP + self.wall_count as usize
    }

    /// Extra objective health
    pub fn objective_bonus(&self) -> u32 {
        self.cpu_hp * 2
    }
}

/// Everything that selects a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSetup {
    pub stage_id: u32,
    pub difficulty: Difficulty,
    pub upgrades: Upgrades,
    pub seed: u64,
}

impl Default for SessionSetup {
    fn default() -> Self {
        Self {
            stage_id: 1,
            difficulty: Difficulty::Normal,
            upgrades: Upgrades::default(),
            seed: 0,
        }
    }
}

/// The full set of content tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub enemies: Vec<AdversaryType>,
    pub walls: Vec<BarrierType>,
    pub stages: Vec<Stage>,
}

impl GameConfig {
    /// Parse tables from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse tables from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn adversary(&self, id: &str) -> Option<&AdversaryType> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn barrier(&self, id: &str) -> Option<&BarrierType> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn stage(&self, id: u32) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Structural checks. Unknown adversary references are only logged:
    /// those spawns are skipped at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::Invalid("no stages defined".into()));
        }
        if self.walls.is_empty() {
            return Err(ConfigError::Invalid("no barrier types defined".into()));
        }

        let mut ids = HashSet::new();
        for enemy in &self.enemies {
            if !ids.insert(enemy.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate adversary id `{}`",
                    enemy.id
                )));
            }
        }

        for stage in &self.stages {
            for (index, wave) in stage.waves.iter().enumerate() {
                if wave.directions.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "stage {} wave {} has no approach directions",
                        stage.id,
                        index + 1
                    )));
                }
                if wave.spawn_interval_ms() == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "stage {} wave {} has a zero spawn interval",
                        stage.id,
                        index + 1
                    )));
                }
                for id in wave.adversary_ids() {
                    if self.adversary(id).is_none() {
                        log::warn!(
                            "Stage {} wave {} references unknown adversary `{}`",
                            stage.id,
                            index + 1,
                            id
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

fn adversary(
    id: &str,
    name: &str,
    hp: f32,
    speed: f32,
    reward: u64,
    (width, height): (f32, f32),
    special: Special,
) -> AdversaryType {
    AdversaryType {
        id: id.into(),
        name: name.into(),
        hp,
        speed,
        reward,
        width,
        height,
        special,
    }
}

fn wave(enemies: &str, spawn_interval: u64, directions: &[Direction]) -> WaveSpec {
    WaveSpec {
        enemies: enemies.into(),
        spawn_interval: Some(spawn_interval),
        directions: directions.to_vec(),
    }
}

fn stage(id: u32, name: &str, cpu_hp: u32, reward: u64, waves: Vec<WaveSpec>) -> Stage {
    Stage {
        id,
        name: name.into(),
        cpu_hp,
        reward,
        target_walls: None,
        waves,
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        use Direction::*;
        const R: &[Direction] = &[Right];
        const RT: &[Direction] = &[Right, Top];
        const RB: &[Direction] = &[Right, Bottom];
        const RL: &[Direction] = &[Right, Left];
        const RTB: &[Direction] = &[Right, Top, Bottom];
        const ALL: &[Direction] = &[Right, Top, Bottom, Left];

        let enemies = vec![
            adversary("bug_small", "Bug (small)", 10.0, 80.0, 5, (24.0, 24.0), Special::None),
            adversary("bug_medium", "Bug (medium)", 25.0, 60.0, 15, (32.0, 32.0), Special::None),
            adversary("worm", "Worm", 15.0, 120.0, 10, (32.0, 16.0), Special::None),
            adversary("trojan", "Trojan", 50.0, 40.0, 30, (48.0, 48.0), Special::None),
            adversary("ransom", "Ransom", 80.0, 50.0, 50, (64.0, 64.0), Special::None),
            adversary("bomber", "Bomber", 20.0, 60.0, 20, (40.0, 40.0), Special::ExplodeWall),
            adversary("shield", "Shield", 15.0, 90.0, 20, (20.0, 20.0), Special::ShieldOnce),
            adversary("spawner", "Spawner", 40.0, 40.0, 35, (48.0, 48.0), Special::SpawnOnDeath),
            adversary("stealth", "Stealth", 15.0, 80.0, 25, (20.0, 20.0), Special::Stealth),
            adversary("dasher", "Dasher", 20.0, 40.0, 25, (32.0, 32.0), Special::Dash),
        ];

        let walls = vec![
            BarrierType {
                id: "basic".into(),
                name: "Basic wall".into(),
                damage: 10.0,
                color: "0x00aaff".into(),
                slow_percent: 0.0,
                slow_duration: None,
                dot_damage: 0.0,
                dot_interval: None,
                dot_duration: None,
                unlock_stage: 0,
                purchase_cost: 0,
            },
            BarrierType {
                id: "fire".into(),
                name: "Fire wall".into(),
                damage: 15.0,
                color: "0xff6600".into(),
                slow_percent: 0.0,
                slow_duration: None,
                dot_damage: 3.0,
                dot_interval: Some(500),
                dot_duration: Some(3000),
                unlock_stage: 3,
                purchase_cost: 300,
            },
            BarrierType {
                id: "ice".into(),
                name: "Ice wall".into(),
                damage: 5.0,
                color: "0x00ffff".into(),
                slow_percent: 80.0,
                slow_duration: Some(2000),
                dot_damage: 0.0,
                dot_interval: None,
                dot_duration: None,
                unlock_stage: 5,
                purchase_cost: 500,
            },
        ];

        let stages = vec![
            stage(1, "First Defense", 10, 100, vec![
                wave("bug_small:5", 1500, R),
                wave("bug_small:8", 1200, R),
                wave("bug_small:6,bug_medium:2", 1200, R),
                wave("bug_medium:4,bug_small:6", 1000, RT),
                wave("bug_medium:5,worm:3", 1000, RTB),
            ]),
            stage(2, "Threat From The East", 10, 120, vec![
                wave("bug_small:10", 1200, R),
                wave("bug_small:8,bug_medium:3", 1000, R),
                wave("bug_medium:5,worm:4", 1000, R),
                wave("worm:8,bug_small:5", 800, R),
                wave("bug_medium:6,worm:6", 800, R),
            ]),
            stage(3, "Pincer", 10, 150, vec![
                wave("bug_small:6,bug_small:6", 1200, RL),
                wave("bug_medium:4,bug_medium:4", 1000, RL),
                wave("worm:5,worm:5", 1000, RL),
                wave("bug_medium:5,worm:5", 800, RL),
                wave("trojan:1,bug_small:10,worm:5", 800, RL),
            ]),
            stage(4, "Fast Intrusion", 10, 180, vec![
                wave("worm:10", 800, RT),
                wave("worm:12,bug_small:5", 700, RB),
                wave("worm:15", 600, RTB),
                wave("worm:12,bug_medium:4", 600, RL),
                wave("worm:20", 500, ALL),
            ]),
            stage(5, "Trojan Raid", 12, 250, vec![
                wave("bug_medium:8,trojan:1", 1000, R),
                wave("trojan:2,worm:8", 900, RT),
                wave("trojan:2,bug_medium:6", 800, RB),
                wave("trojan:3,worm:10", 800, RTB),
                wave("trojan:5,bug_small:15", 700, ALL),
            ]),
            stage(6, "Surrounded", 12, 300, vec![
                wave("bug_small:12", 1000, ALL),
                wave("bug_medium:8", 900, ALL),
                wave("worm:12,bug_small:8", 800, ALL),
                wave("trojan:2,bug_medium:8", 800, ALL),
                wave("trojan:3,worm:10,bug_small:10", 700, ALL),
                wave("trojan:4,bug_medium:10", 600, ALL),
            ]),
            stage(7, "Bug Outbreak", 12, 350, vec![
                wave("bug_small:25", 600, RT),
                wave("bug_small:30", 500, &[Right, Bottom, Left]),
                wave("bug_small:20,bug_medium:10", 500, ALL),
                wave("bug_small:35", 400, ALL),
                wave("bug_small:25,bug_medium:15", 400, ALL),
                wave("bug_small:40,bug_medium:10", 350, ALL),
            ]),
            stage(8, "Heavy Armor", 15, 400, vec![
                wave("trojan:4,bug_medium:6", 1000, RL),
                wave("trojan:5,ransom:1", 900, RTB),
                wave("ransom:2,bug_medium:10", 800, ALL),
                wave("trojan:6,ransom:2", 800, ALL),
                wave("ransom:3,trojan:5", 700, ALL),
                wave("ransom:4,trojan:4,bug_medium:8", 600, ALL),
            ]),
            stage(9, "Chaos Wave", 15, 500, vec![
                wave("bug_small:10,bug_medium:5,worm:5,trojan:2", 800, ALL),
                wave("worm:15,trojan:3,ransom:1", 700, ALL),
                wave("bug_small:20,trojan:4,ransom:1", 600, ALL),
                wave("bug_medium:10,worm:10,trojan:3,ransom:2", 600, ALL),
                wave("bug_small:15,bug_medium:10,worm:8,trojan:4", 500, ALL),
                wave("worm:15,trojan:5,ransom:3", 500, ALL),
                wave("bug_small:20,bug_medium:15,trojan:5,ransom:2", 400, ALL),
            ]),
            stage(10, "Last Stand", 20, 1000, vec![
                wave("bug_small:20,bug_medium:10,worm:10", 600, ALL),
                wave("trojan:5,ransom:2,worm:15", 600, ALL),
                wave("bug_small:30,trojan:4,ransom:2", 500, ALL),
                wave("bug_medium:15,worm:15,trojan:5", 500, ALL),
                wave("trojan:8,ransom:3", 500, ALL),
                wave("bug_small:25,bug_medium:15,worm:10,trojan:5,ransom:2", 400, ALL),
                wave("ransom:5,trojan:10,worm:20", 400, ALL),
            ]),
        ];

        Self {
            enemies,
            walls,
            stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_validate() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stages.len(), 10);
        assert!(config.barrier("basic").is_some());
        assert_eq!(config.adversary("bomber").map(|a| a.special), Some(Special::ExplodeWall));
    }

    #[test]
    fn test_from_json_camel_case() {
        let json = r#"{
            "enemies": [
                {"id": "bug_small", "name": "Bug", "hp": 10, "speed": 80, "reward": 5, "width": 24, "height": 24},
                {"id": "bomber", "name": "Bomber", "hp": 20, "speed": 60, "reward": 20, "width": 40, "height": 40, "special": "explode_wall"}
            ],
            "walls": [
                {"id": "ice", "name": "Ice", "damage": 5, "color": "0x00ffff", "slowPercent": 80, "slowDuration": 1500}
            ],
            "stages": [
                {"id": 1, "name": "One", "cpuHp": 10, "reward": 100, "targetWalls": 8,
                 "waves": [{"enemies": "bug_small:3,bomber:1", "spawnInterval": 1000, "directions": ["right", "top"]}]}
            ]
        }"#;
        let config = GameConfig::from_json(json).unwrap();
        assert_eq!(config.adversary("bomber").unwrap().special, Special::ExplodeWall);
        let ice = config.barrier("ice").unwrap();
        assert_eq!(ice.slow_duration_ms(), 1500);
        assert_eq!(ice.dot_interval_ms(), DEFAULT_DOT_INTERVAL_MS);
        let stage = config.stage(1).unwrap();
        assert_eq!(stage.target_barriers(), 8);
        assert_eq!(stage.waves[0].directions, vec![Direction::Right, Direction::Top]);
    }

    #[test]
    fn test_rejects_wave_without_directions() {
        let mut config = GameConfig::default();
        config.stages[0].waves[0].directions.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_upgrade_scaling() {
        let upgrades = Upgrades {
            wall_duration: 2,
            wall_damage: 1,
            wall_count: 1,
            cpu_hp: 3,
        };
        assert_eq!(upgrades.barrier_duration_ms(), 7000);
        assert!((upgrades.damage_multiplier() - 1.2).abs() < 1e-6);
        assert_eq!(upgrades.barrier_cap(), 4);
        assert_eq!(upgrades.objective_bonus(), 6);
    }

    #[test]
    fn test_difficulty_scaling_rounds_up() {
        let hard = Difficulty::Hard.settings();
        assert_eq!(hard.scale_count(5), 8);
        assert_eq!(hard.scale_hp(10.0), 12.0);
        let normal = Difficulty::Normal.settings();
        assert_eq!(normal.scale_count(3), 3);
    }

    #[test]
    fn test_difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("normal".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        let err = "brutal".parse::<Difficulty>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("brutal")));
    }

    #[test]
    fn test_stage_roster_orders_plain_before_special() {
        let mut config = GameConfig::default();
        config.stages[0].waves[0].enemies = "bomber:1,bug_small:2".into();
        config.stages[0].waves[1].enemies = "worm:2,bug_small:1".into();
        let stage = config.stages[0].clone();
        let ids: Vec<&str> = stage.roster(&config).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["bug_small", "worm", "bug_medium", "bomber"]);
    }

    #[test]
    fn test_barrier_color_parsing() {
        let config = GameConfig::default();
        assert_eq!(config.barrier("fire").unwrap().color_rgb(), 0xff6600);
    }
}
