//! Engine tuning bundle.
//!
//! Every field has a default, so a host may pass `{}` or only the keys it
//! wants to override, e.g. `{"settle": {"max_checks": 100}, "seed": 7}`.

use serde::{Deserialize, Serialize};

use crate::core::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub materials: MaterialsConfig,
    pub room: RoomConfig,
    pub dice: DiceConfig,
    pub spawn: SpawnConfig,
    pub settle: SettleConfig,
    /// Fixed RNG seed. `None` seeds from the host clock.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, units/s².
    pub gravity: f32,
    /// Fixed simulation substep, seconds.
    pub substep: f32,
    /// Most simulated time a single `step` call may consume.
    pub max_frame_time: f32,
    pub solver_iterations: u32,
    /// Velocity damping per second (`v *= 1 / (1 + dt * c)`).
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Penetration allowed before position correction kicks in.
    pub slop: f32,
    /// Fraction of the remaining penetration removed per substep.
    pub baumgarte: f32,
    /// Approach speeds below this do not bounce.
    pub restitution_threshold: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsConfig {
    /// Floor, walls and ceiling against a die.
    pub room: ContactMaterial,
    /// Die against die.
    pub die: ContactMaterial,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Half width of the tray at a 1:1 render target; scaled by aspect.
    pub base_half_width: f32,
    pub half_depth: f32,
    /// Floor to ceiling.
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceConfig {
    /// Uniform scale applied to every die's geometry.
    pub scale: f32,
    pub density: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Height of the first die's center above the floor.
    pub drop_height: f32,
    /// Extra height per spawn index; raised to one die diameter when smaller.
    pub stagger: f32,
    /// Horizontal jitter around the drop point (each axis, ±).
    pub jitter: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Fixed downward component added to the throw.
    pub down_bias: f32,
    /// Angular velocity range per axis (±), rad/s.
    pub angular_range: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Host time between settle checks.
    pub interval_ms: f32,
    /// A die is at rest when |v|² is below this.
    pub linear_threshold: f32,
    /// ...and |ω|² is below this.
    pub angular_threshold: f32,
    /// Checks after which the roll is forced to settle.
    pub max_checks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            materials: MaterialsConfig::default(),
            room: RoomConfig::default(),
            dice: DiceConfig::default(),
            spawn: SpawnConfig::default(),
            settle: SettleConfig::default(),
            seed: None,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            substep: 1.0 / 60.0,
            max_frame_time: 1.0 / 30.0,
            solver_iterations: 10,
            linear_damping: 0.1,
            angular_damping: 0.1,
            slop: 0.005,
            baumgarte: 0.2,
            restitution_threshold: 1.0,
        }
    }
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            room: ContactMaterial { friction: 0.6, restitution: 0.3 },
            die: ContactMaterial { friction: 0.4, restitution: 0.2 },
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            base_half_width: 6.0,
            half_depth: 6.0,
            height: 14.0,
        }
    }
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self { scale: 1.0, density: 1.0 }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            drop_height: 6.0,
            stagger: 1.5,
            jitter: 1.5,
            speed_min: 6.0,
            speed_max: 10.0,
            down_bias: 4.0,
            angular_range: 15.0,
        }
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50.0,
            linear_threshold: 0.01,
            angular_threshold: 0.01,
            max_checks: 200,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON bundle.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let p = &self.physics;
        ensure(p.gravity > 0.0, "physics.gravity must be positive")?;
        ensure(p.substep > 0.0, "physics.substep must be positive")?;
        ensure(
            p.max_frame_time >= p.substep,
            "physics.max_frame_time must be at least one substep",
        )?;
        ensure(p.solver_iterations >= 1, "physics.solver_iterations must be >= 1")?;
        ensure(
            p.linear_damping >= 0.0 && p.angular_damping >= 0.0,
            "physics damping must be non-negative",
        )?;
        ensure(p.slop >= 0.0, "physics.slop must be non-negative")?;
        ensure(
            (0.0..=1.0).contains(&p.baumgarte),
            "physics.baumgarte must be within 0..=1",
        )?;

        for (name, m) in [("room", &self.materials.room), ("die", &self.materials.die)] {
            ensure(
                m.friction >= 0.0,
                &format!("materials.{name}.friction must be non-negative"),
            )?;
            ensure(
                (0.0..=1.0).contains(&m.restitution),
                &format!("materials.{name}.restitution must be within 0..=1"),
            )?;
        }

        ensure(self.dice.scale > 0.0, "dice.scale must be positive")?;
        ensure(self.dice.density > 0.0, "dice.density must be positive")?;

        let die_span = 2.0 * self.dice.scale;
        let r = &self.room;
        ensure(
            r.base_half_width > die_span && r.half_depth > die_span,
            "room must be wider than two dice",
        )?;
        ensure(r.height > 2.0 * die_span, "room.height is too low for the dice")?;

        let s = &self.spawn;
        ensure(s.speed_min >= 0.0, "spawn.speed_min must be non-negative")?;
        ensure(s.speed_min <= s.speed_max, "spawn.speed_min must not exceed speed_max")?;
        ensure(
            s.jitter >= 0.0 && s.stagger >= 0.0 && s.angular_range >= 0.0,
            "spawn ranges must be non-negative",
        )?;
        ensure(
            s.drop_height > self.dice.scale && s.drop_height < r.height - self.dice.scale,
            "spawn.drop_height must lie inside the room",
        )?;

        let st = &self.settle;
        ensure(st.interval_ms > 0.0, "settle.interval_ms must be positive")?;
        ensure(
            st.linear_threshold > 0.0 && st.angular_threshold > 0.0,
            "settle thresholds must be positive",
        )?;
        ensure(st.max_checks >= 1, "settle.max_checks must be >= 1")?;
        Ok(())
    }
}

fn ensure(cond: bool, msg: &str) -> Result<(), EngineError> {
    if cond {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = EngineConfig::from_json(r#"{"settle": {"max_checks": 12}, "seed": 99}"#).unwrap();
        assert_eq!(cfg.settle.max_checks, 12);
        assert_eq!(cfg.settle.interval_ms, 50.0);
        assert_eq!(cfg.seed, Some(99));
        assert_eq!(cfg.physics, PhysicsConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EngineConfig::from_json(r#"{"physics": {"substep": 0.0}}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = EngineConfig::from_json(r#"{"materials": {"die": {"friction": 0.4, "restitution": 1.5}}}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let mut cfg = EngineConfig::default();
        cfg.seed = Some(3);
        cfg.spawn.jitter = 0.5;
        let back = EngineConfig::from_json(&cfg.to_json()).unwrap();
        assert_eq!(back, cfg);
    }
}
