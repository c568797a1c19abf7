//! Enemy behavior profiles
//!
//! Each profile turns an enemy's position and scratch state into a steering
//! request. Movement integration, firing and contact are handled by the
//! enemy engine.

use glam::Vec2;

use crate::catalog::{AttackStyle, EnemySpec};

use super::state::{BehaviorState, Enemy};

/// Attack an enemy wants to make this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attack {
    /// Ranged shot at the orbiter, rate-limited by its ranged fire rate
    AtPlayer,
    /// One-shot bomb dropped toward the planet
    Bomb,
}

/// Output of one behavior update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    /// Desired acceleration direction (length ~1 at full throttle)
    pub thrust: Vec2,
    /// Replaces velocity outright (dash phase)
    pub velocity_override: Option<Vec2>,
    pub attack: Option<Attack>,
}

/// Run the enemy's profile. The planet sits at the origin.
pub fn steer(enemy: &mut Enemy, spec: &EnemySpec, dt: f32) -> Steering {
    let to_planet = -enemy.pos;
    let dist = to_planet.length();
    let dir = to_planet.normalize_or_zero();
    let ranged = spec.attack_style == AttackStyle::Ranged && spec.ranged.is_some();

    let mut out = Steering::default();
    match &mut enemy.behavior {
        BehaviorState::Drifter => {
            out.thrust = dir;
        }
        BehaviorState::Zigzag { clock } => {
            *clock += dt;
            let frequency = spec.param("frequency", 1.5);
            let amplitude = spec.param("amplitude", 0.8);
            let weave = (*clock * frequency * std::f32::consts::TAU).sin() * amplitude;
            out.thrust = dir + dir.perp() * weave;
        }
        BehaviorState::Dasher {
            cooldown,
            dashing,
            dash_time,
        } => {
            if *dashing {
                *dash_time -= dt;
                let dash_speed = spec.dash_speed.unwrap_or(spec.speed * 3.0);
                out.velocity_override = Some(dir * dash_speed);
                if *dash_time <= 0.0 {
                    *dashing = false;
                    *cooldown = spec.param("dash_cooldown", 2.0);
                }
            } else {
                // Slow approach between dashes
                out.thrust = dir * spec.param("approach_throttle", 0.4);
                *cooldown -= dt;
                if *cooldown <= 0.0 {
                    *dashing = true;
                    *dash_time = spec.param("dash_time", 0.35);
                }
            }
        }
        BehaviorState::Orbiter => {
            let radius = spec.param("orbit_radius", 220.0);
            let radial = ((dist - radius) / 40.0).clamp(-1.0, 1.0);
            out.thrust = dir * radial + dir.perp() * spec.param("orbit_throttle", 0.8);
            out.attack = Some(Attack::AtPlayer);
        }
        BehaviorState::Sniper => {
            let preferred = spec.param("preferred_distance", 300.0);
            let slack = spec.param("distance_slack", 20.0);
            if dist > preferred + slack {
                out.thrust = dir;
            } else if dist < preferred - slack {
                out.thrust = -dir;
            }
            out.attack = Some(Attack::AtPlayer);
        }
        BehaviorState::Bomber { retreating } => {
            if *retreating {
                out.thrust = -dir;
                if dist >= spec.param("retreat_distance", 360.0) {
                    *retreating = false;
                }
            } else {
                out.thrust = dir;
                if dist <= spec.param("drop_radius", 140.0) {
                    *retreating = true;
                    if spec.attack_style == AttackStyle::Bomb {
                        out.attack = Some(Attack::Bomb);
                    }
                }
            }
        }
    }

    if ranged && out.attack.is_none() {
        out.attack = Some(Attack::AtPlayer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BehaviorProfile;
    use std::collections::BTreeMap;

    fn spec(behavior: BehaviorProfile) -> EnemySpec {
        EnemySpec {
            id: "probe".to_string(),
            hp: 10.0,
            speed: 50.0,
            dash_speed: Some(300.0),
            contact_damage: 1.0,
            radius: 10.0,
            attack_style: AttackStyle::Contact,
            behavior,
            params: BTreeMap::new(),
            ranged: None,
            cost: 1,
            value: 1,
            currency: 0,
            on_death: None,
            shield: None,
        }
    }

    fn enemy_at(pos: Vec2, spec: &EnemySpec) -> Enemy {
        Enemy {
            id: 1,
            spec_id: spec.id.clone(),
            pos,
            vel: Vec2::ZERO,
            hp: spec.hp,
            max_hp: spec.hp,
            speed: spec.speed,
            contact_damage: spec.contact_damage,
            radius: spec.radius,
            behavior: BehaviorState::for_profile(spec.behavior, spec.param("dash_cooldown", 2.0)),
            effects: BTreeMap::new(),
            invulnerable: 0.0,
            facing: 0.0,
            last_fired: 0.0,
            alive: true,
        }
    }

    #[test]
    fn test_drifter_heads_for_planet() {
        let spec = spec(BehaviorProfile::Drifter);
        let mut enemy = enemy_at(Vec2::new(200.0, 0.0), &spec);
        let out = steer(&mut enemy, &spec, 0.01);
        assert!((out.thrust - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!(out.attack.is_none());
    }

    #[test]
    fn test_sniper_holds_standoff() {
        let spec = spec(BehaviorProfile::Sniper);
        let mut far = enemy_at(Vec2::new(500.0, 0.0), &spec);
        let mut near = enemy_at(Vec2::new(100.0, 0.0), &spec);
        let mut held = enemy_at(Vec2::new(300.0, 0.0), &spec);
        assert!(steer(&mut far, &spec, 0.01).thrust.x < 0.0);
        assert!(steer(&mut near, &spec, 0.01).thrust.x > 0.0);
        let out = steer(&mut held, &spec, 0.01);
        assert_eq!(out.thrust, Vec2::ZERO);
        assert_eq!(out.attack, Some(Attack::AtPlayer));
    }

    #[test]
    fn test_dasher_cycles() {
        let spec = spec(BehaviorProfile::Dasher);
        let mut enemy = enemy_at(Vec2::new(400.0, 0.0), &spec);

        // Approach until the cooldown runs out
        let out = steer(&mut enemy, &spec, 1.0);
        assert!(out.velocity_override.is_none());
        steer(&mut enemy, &spec, 1.5);
        assert!(matches!(enemy.behavior, BehaviorState::Dasher { dashing: true, .. }));

        let out = steer(&mut enemy, &spec, 0.1);
        let vel = out.velocity_override.unwrap();
        assert!((vel.length() - 300.0).abs() < 1e-3);

        steer(&mut enemy, &spec, 0.5);
        assert!(matches!(enemy.behavior, BehaviorState::Dasher { dashing: false, .. }));
    }

    #[test]
    fn test_bomber_drops_once_then_retreats() {
        let mut spec = spec(BehaviorProfile::Bomber);
        spec.attack_style = AttackStyle::Bomb;
        let mut enemy = enemy_at(Vec2::new(130.0, 0.0), &spec);

        assert_eq!(steer(&mut enemy, &spec, 0.01).attack, Some(Attack::Bomb));
        let out = steer(&mut enemy, &spec, 0.01);
        assert!(out.attack.is_none());
        assert!(out.thrust.x > 0.0);

        enemy.pos = Vec2::new(400.0, 0.0);
        steer(&mut enemy, &spec, 0.01);
        assert!(matches!(enemy.behavior, BehaviorState::Bomber { retreating: false }));
    }

    #[test]
    fn test_bomber_without_bomb_style_only_swoops() {
        let spec = spec(BehaviorProfile::Bomber);
        let mut enemy = enemy_at(Vec2::new(130.0, 0.0), &spec);

        let out = steer(&mut enemy, &spec, 0.01);
        assert!(out.attack.is_none());
        assert!(matches!(enemy.behavior, BehaviorState::Bomber { retreating: true }));
    }

    #[test]
    fn test_zigzag_weaves() {
        let spec = spec(BehaviorProfile::Zigzag);
        let mut enemy = enemy_at(Vec2::new(300.0, 0.0), &spec);
        let a = steer(&mut enemy, &spec, 0.1).thrust;
        let b = steer(&mut enemy, &spec, 0.2).thrust;
        assert!(a.x < 0.0 && b.x < 0.0);
        assert!((a.y - b.y).abs() > 1e-3);
    }
}
