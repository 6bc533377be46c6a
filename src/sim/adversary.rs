//! Hostile unit entity and its per-tick state machine
//!
//! Timers are absolute simulation times in milliseconds. Collision-time
//! special abilities (explode, shield) are decided by the combat resolver;
//! this type only exposes the primitives it needs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{AdversaryType, BarrierType, Special};
use crate::consts::*;

/// Active damage-over-time window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOverTime {
    pub amount: f32,
    pub interval_ms: u64,
    pub end_ms: u64,
    pub last_tick_ms: u64,
}

/// The barrier that most recently touched an adversary, for kill attribution.
/// Length is copied so attribution survives the barrier's removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierHit {
    pub barrier_id: u32,
    pub length: f32,
}

/// An adversary on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adversary {
    pub id: u32,
    /// Adversary type id
    pub kind: String,
    pub special: Special,
    pub health: f32,
    pub max_health: f32,
    pub pos: Vec2,
    pub radius: f32,
    pub reward: u64,
    pub base_speed: f32,
    /// Current speed before slow is applied (differs from base while dashing)
    pub speed: f32,

    pub stunned: bool,
    pub stun_end_ms: u64,
    pub slow_percent: f32,
    pub slow_end_ms: u64,
    pub dot: Option<DamageOverTime>,

    /// One-shot pass-through still available
    pub shield_active: bool,
    /// Stealth blink state (rendering only)
    pub visible: bool,
    last_stealth_toggle_ms: u64,
    pub dashing: bool,
    dash_epoch_ms: u64,

    pub last_hit: Option<BarrierHit>,
}

impl Adversary {
    /// Spawn an adversary of `kind` with already-scaled `health`
    pub fn new(id: u32, kind: &AdversaryType, health: f32, pos: Vec2, now_ms: u64) -> Self {
        Self {
            id,
            kind: kind.id.clone(),
            special: kind.special,
            health,
            max_health: health,
            pos,
            radius: kind.radius(),
            reward: kind.reward,
            base_speed: kind.speed,
            speed: kind.speed,
            stunned: false,
            stun_end_ms: 0,
            slow_percent: 0.0,
            slow_end_ms: 0,
            dot: None,
            shield_active: kind.special == Special::ShieldOnce,
            visible: true,
            last_stealth_toggle_ms: now_ms,
            dashing: false,
            dash_epoch_ms: now_ms,
            last_hit: None,
        }
    }

    /// Advance timers, abilities and movement by one tick
    pub fn advance(&mut self, dt_ms: u64, now_ms: u64, objective: Vec2) {
        if self.stunned && now_ms >= self.stun_end_ms {
            self.stunned = false;
        }

        if now_ms >= self.slow_end_ms {
            self.slow_percent = 0.0;
        }

        if let Some(dot) = self.dot.as_mut() {
            if now_ms < dot.end_ms {
                if now_ms.saturating_sub(dot.last_tick_ms) >= dot.interval_ms {
                    self.health -= dot.amount;
                    dot.last_tick_ms = now_ms;
                }
            } else {
                self.dot = None;
            }
        }

        match self.special {
            Special::Stealth => {
                if now_ms.saturating_sub(self.last_stealth_toggle_ms) >= STEALTH_TOGGLE_MS {
                    self.visible = !self.visible;
                    self.last_stealth_toggle_ms = now_ms;
                }
            }
            Special::Dash => {
                let cycle = now_ms.saturating_sub(self.dash_epoch_ms) % DASH_CYCLE_MS;
                self.dashing = cycle < DASH_ACTIVE_MS;
                self.speed = if self.dashing {
                    self.base_speed * DASH_SPEED_MULTIPLIER
                } else {
                    self.base_speed
                };
            }
            _ => {}
        }

        if !self.stunned {
            self.move_toward(objective, dt_ms);
        }
    }

    /// Speed after slow
    #[inline]
    pub fn effective_speed(&self) -> f32 {
        self.speed * (1.0 - self.slow_percent / 100.0)
    }

    /// Straight-line step toward `target`, never overshooting it
    fn move_toward(&mut self, target: Vec2, dt_ms: u64) {
        let to_target = target - self.pos;
        let dist = to_target.length();
        if dist <= 0.0 {
            return;
        }
        let step = (self.effective_speed() * dt_ms as f32 / 1000.0).min(dist);
        self.pos += to_target / dist * step;
    }

    /// Freeze movement and collision checks until `now + duration`
    pub fn stun(&mut self, now_ms: u64, duration_ms: u64) {
        debug_assert!(duration_ms > 0, "stun window must be positive");
        self.stunned = true;
        self.stun_end_ms = now_ms + duration_ms;
    }

    /// Barrier hit: damage, stun, and the barrier type's status effects
    pub fn apply_damage(&mut self, kind: &BarrierType, damage_multiplier: f32, now_ms: u64) {
        self.health -= kind.damage * damage_multiplier;
        self.stun(now_ms, STUN_DURATION_MS);

        if kind.slow_percent > 0.0 {
            self.slow_percent = kind.slow_percent;
            self.slow_end_ms = now_ms + kind.slow_duration_ms();
        }

        if kind.dot_damage > 0.0 {
            self.dot = Some(DamageOverTime {
                amount: kind.dot_damage,
                interval_ms: kind.dot_interval_ms(),
                end_ms: now_ms + kind.dot_duration_ms(),
                last_tick_ms: now_ms,
            });
        }
    }

    /// Spend the one-time shield; the short stun carries it through the barrier
    pub fn break_shield(&mut self, now_ms: u64) {
        self.shield_active = false;
        self.stun(now_ms, STUN_DURATION_MS);
    }

    /// Self-destruct (explode_wall)
    pub fn detonate(&mut self) {
        self.health = 0.0;
    }

    pub fn record_hit(&mut self, barrier_id: u32, length: f32) {
        self.last_hit = Some(BarrierHit { barrier_id, length });
    }

    pub fn has_reached_objective(&self, objective: Vec2) -> bool {
        self.pos.distance(objective) < OBJECTIVE_REACH_DISTANCE
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Render alpha for stealth blinking
    pub fn alpha(&self) -> f32 {
        if self.visible { 1.0 } else { 0.2 }
    }
}
