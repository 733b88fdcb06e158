//! Game configuration
//!
//! Every section is optional in the TOML file; missing fields fall back to
//! the tuned defaults below. Files can be layered: later files override only
//! the keys they set.

use neon_core::{NeonError, Rect, Result, Vec2};
use neon_runtime::InputConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::effects::PickupEffect;

/// Difficulty curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub starting_speed: f32,
    /// Speed gained every `speed_up_interval` seconds
    pub speed_delta: f32,
    pub speed_up_interval: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            starting_speed: 4.0,
            speed_delta: 0.5,
            speed_up_interval: 10.0,
        }
    }
}

/// Pillar geometry and spawn cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PillarConfig {
    pub spawn_x: f32,
    pub despawn_x: f32,
    pub ground_start: f32,
    pub ceiling_height: f32,
    pub lower_height_range: Vec2,
    pub gap_height_range: Vec2,
    pub width_range: Vec2,
    /// Divided by game speed to get the spawn delay range, so pillar spacing
    /// stays constant in world units
    pub spawn_distance_range: Vec2,
}

impl Default for PillarConfig {
    fn default() -> Self {
        Self {
            spawn_x: 14.0,
            despawn_x: -14.0,
            ground_start: 0.0,
            ceiling_height: 10.0,
            lower_height_range: Vec2::new(1.0, 5.0),
            gap_height_range: Vec2::new(2.5, 3.5),
            width_range: Vec2::new(0.8, 1.6),
            spawn_distance_range: Vec2::new(12.0, 16.0),
        }
    }
}

/// One pickup prefab in the pickup pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPrototype {
    pub effect: PickupEffect,
    #[serde(default = "default_pickup_size")]
    pub size: Vec2,
}

fn default_pickup_size() -> Vec2 {
    Vec2::new(0.6, 0.6)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// Probability in [0, 1] that a pickup appears between two pillars
    pub spawn_chance: f32,
    pub height_range: Vec2,
    pub x_offset_range: Vec2,
    pub prototypes: Vec<PickupPrototype>,
}

impl Default for PickupConfig {
    fn default() -> Self {
        let proto = |effect| PickupPrototype {
            effect,
            size: default_pickup_size(),
        };
        Self {
            spawn_chance: 0.5,
            height_range: Vec2::new(2.0, 8.0),
            x_offset_range: Vec2::new(-1.0, 1.0),
            prototypes: vec![
                proto(PickupEffect::Bonus(1)),
                proto(PickupEffect::Heal(1)),
                proto(PickupEffect::Shield(5.0)),
                proto(PickupEffect::Speed(1.0)),
                proto(PickupEffect::Speed(-1.0)),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub origin: Vec2,
    pub size: Vec2,
    pub gravity: f32,
    /// Vertical velocity added by one ascend command
    pub upward_force: f32,
    pub max_health: i32,
    /// Delay between death and the game-over broadcast
    pub end_game_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::new(0.0, 5.0),
            size: Vec2::new(0.8, 0.8),
            gravity: 18.0,
            upward_force: 7.0,
            max_health: 3,
            end_game_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// Final stretch of a shield spent blinking before it drops
    pub deactivation_time: f32,
    pub num_blinks: u32,
    /// Invulnerability granted after taking damage
    pub damage_grace: f32,
    /// Invulnerability granted when a reset is requested
    pub reset_grace: f32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            deactivation_time: 1.0,
            num_blinks: 4,
            damage_grace: 1.5,
            reset_grace: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Points each collected bonus is worth
    pub bonus_multiplier: i32,
    /// Score awarded for flying through the tutorial skip gate
    pub skip_score: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            bonus_multiplier: 10,
            skip_score: 100.0,
        }
    }
}

/// Initial pool sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub pillars: usize,
    pub pickups_per_prototype: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pillars: 8,
            pickups_per_prototype: 2,
        }
    }
}

/// Layout of the tutorial course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    /// X positions of the practice pillar pairs
    pub pillar_xs: Vec<f32>,
    pub pillar_gap: Vec2,
    pub skip_gate: Rect,
    /// Crossing this line ends the tutorial
    pub finish_x: f32,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            pillar_xs: vec![6.0, 11.0],
            pillar_gap: Vec2::new(3.5, 6.5),
            skip_gate: Rect::new(Vec2::new(3.0, 9.5), Vec2::new(1.0, 1.0)),
            finish_x: 15.0,
        }
    }
}

/// Complete gameplay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub pillars: PillarConfig,
    pub pickups: PickupConfig,
    pub player: PlayerConfig,
    pub shield: ShieldConfig,
    pub score: ScoreConfig,
    pub input: InputConfig,
    pub pools: PoolConfig,
    pub tutorial: TutorialConfig,
}

impl GameConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a single file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load files in order, each overriding the keys it sets. Missing files
    /// are skipped.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self> {
        let merged = load_layered_table(paths)?;
        let config: GameConfig = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the spawner cannot honour
    pub fn validate(&self) -> Result<()> {
        let p = &self.pillars;
        check_range("pillars.lower_height_range", p.lower_height_range, 0.0)?;
        check_range("pillars.gap_height_range", p.gap_height_range, 0.0)?;
        check_range("pillars.width_range", p.width_range, 0.0)?;
        check_range("pillars.spawn_distance_range", p.spawn_distance_range, f32::EPSILON)?;
        if p.ceiling_height <= 0.0 {
            return Err(invalid("pillars.ceiling_height must be positive"));
        }
        let worst_upper = p.ceiling_height - p.lower_height_range.y - p.gap_height_range.y;
        if worst_upper < 0.0 {
            return Err(NeonError::InvalidConfig(format!(
                "pillars: lower ({}) + gap ({}) can exceed ceiling ({}), upper pillar would be negative",
                p.lower_height_range.y, p.gap_height_range.y, p.ceiling_height
            )));
        }
        if p.despawn_x >= p.spawn_x {
            return Err(invalid("pillars.despawn_x must be left of spawn_x"));
        }

        let s = &self.speed;
        if s.starting_speed < 0.0 {
            return Err(invalid("speed.starting_speed must not be negative"));
        }
        if s.speed_up_interval <= 0.0 {
            return Err(invalid("speed.speed_up_interval must be positive"));
        }

        let k = &self.pickups;
        if !(0.0..=1.0).contains(&k.spawn_chance) {
            return Err(NeonError::ValueOutOfRange {
                field: "pickups.spawn_chance".into(),
                min: 0.0,
                max: 1.0,
                value: f64::from(k.spawn_chance),
            });
        }
        check_range("pickups.height_range", k.height_range, f32::NEG_INFINITY)?;
        check_range("pickups.x_offset_range", k.x_offset_range, f32::NEG_INFINITY)?;

        if self.player.max_health < 1 {
            return Err(invalid("player.max_health must be at least 1"));
        }
        if self.shield.num_blinks == 0 {
            return Err(invalid("shield.num_blinks must be at least 1"));
        }
        if self.shield.deactivation_time < 0.0 {
            return Err(invalid("shield.deactivation_time must not be negative"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> NeonError {
    NeonError::InvalidConfig(msg.to_string())
}

fn check_range(field: &str, range: Vec2, min: f32) -> Result<()> {
    if range.x > range.y {
        return Err(NeonError::InvalidConfig(format!(
            "{field}: low ({}) is greater than high ({})",
            range.x, range.y
        )));
    }
    if range.x < min {
        return Err(NeonError::InvalidConfig(format!(
            "{field}: low ({}) is below {min}",
            range.x
        )));
    }
    Ok(())
}

/// Read every existing file in `paths` and deep-merge them in order
pub fn load_layered_table(paths: &[PathBuf]) -> Result<toml::Value> {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for path in paths {
        if !path.exists() {
            continue;
        }
        let content = std::fs::read_to_string(path)?;
        let layer: toml::Value = toml::from_str(&content)?;
        merge_toml(&mut merged, layer);
        tracing::debug!(path = %path.display(), "config layer applied");
    }
    Ok(merged)
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other value
/// replaces what was there.
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.speed.starting_speed, 4.0);
        assert_eq!(config.score.bonus_multiplier, 10);
        assert_eq!(config.player.max_health, 3);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [speed]
            speed_delta = 2.0
            speed_up_interval = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.speed.speed_delta, 2.0);
        assert_eq!(config.speed.starting_speed, 4.0);
        assert_eq!(config.pillars.ceiling_height, 10.0);
    }

    #[test]
    fn negative_upper_pillar_rejected() {
        let result = GameConfig::from_toml_str(
            r#"
            [pillars]
            ceiling_height = 6.0
            lower_height_range = { x = 1.0, y = 4.0 }
            gap_height_range = { x = 2.0, y = 3.0 }
            "#,
        );
        assert!(matches!(result, Err(NeonError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_range_rejected() {
        let mut config = GameConfig::default();
        config.pillars.width_range = Vec2::new(2.0, 1.0);
        assert!(matches!(config.validate(), Err(NeonError::InvalidConfig(_))));
    }

    #[test]
    fn spawn_chance_out_of_range() {
        let mut config = GameConfig::default();
        config.pickups.spawn_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(NeonError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn pickup_prototypes_from_toml() {
        let config = GameConfig::from_toml_str(
            r#"
            [[pickups.prototypes]]
            effect = { kind = "shield", value = 3.0 }

            [[pickups.prototypes]]
            effect = { kind = "bonus", value = 2 }
            "#,
        )
        .unwrap();
        assert_eq!(config.pickups.prototypes.len(), 2);
        assert_eq!(config.pickups.prototypes[0].effect, PickupEffect::Shield(3.0));
        assert_eq!(config.pickups.prototypes[1].effect, PickupEffect::Bonus(2));
    }

    #[test]
    fn merge_overrides_only_set_keys() {
        let mut base: toml::Value = toml::from_str(
            r#"
            [speed]
            starting_speed = 5.0
            speed_delta = 1.0
            "#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
            [speed]
            speed_delta = 3.0
            "#,
        )
        .unwrap();
        merge_toml(&mut base, overlay);
        let config: GameConfig = base.try_into().unwrap();
        assert_eq!(config.speed.starting_speed, 5.0);
        assert_eq!(config.speed.speed_delta, 3.0);
    }

    #[test]
    fn layered_files_in_order() {
        let dir = std::env::temp_dir().join("neon_config_layers");
        std::fs::create_dir_all(&dir).unwrap();
        let global = dir.join("global.toml");
        let local = dir.join("local.toml");
        std::fs::write(&global, "[score]\nbonus_multiplier = 20\n").unwrap();
        std::fs::write(&local, "[score]\nskip_score = 50.0\n").unwrap();

        let config =
            GameConfig::load_layered(&[global, dir.join("missing.toml"), local]).unwrap();
        assert_eq!(config.score.bonus_multiplier, 20);
        assert_eq!(config.score.skip_score, 50.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn toml_round_trip_is_valid() {
        let text = GameConfig::default().to_toml_string().unwrap();
        let parsed = GameConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.pickups.prototypes.len(), 5);
    }
}
