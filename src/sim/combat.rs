//! Barrier/adversary collision resolution and kill scoring
//!
//! Runs once per tick after movement. Iteration order is adversary-major,
//! barriers in placement order, so attribution is stable for a given seed.

use glam::Vec2;

use super::adversary::{Adversary, BarrierHit};
use super::barrier::Barrier;
use crate::config::Special;
use crate::consts::*;

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatReport {
    /// Barriers removed by explode_wall adversaries
    pub destroyed_barriers: Vec<u32>,
    /// Explosion sites
    pub explosions: Vec<Vec2>,
    /// Adversaries that spent their shield
    pub shields_broken: Vec<u32>,
    /// Normal damage applications
    pub hits: usize,
}

/// Test every live, non-stunned adversary against every live barrier.
///
/// - explode_wall: the barrier is marked for destruction, the adversary dies.
/// - shield_once (shield up): no damage, shield spent, short stun.
/// - otherwise: damage from every overlapping barrier this tick.
///
/// Destroyed barriers are removed only after the full pass; a barrier already
/// marked in this pass is not hit again.
pub fn resolve_collisions(
    adversaries: &mut [Adversary],
    barriers: &mut Vec<Barrier>,
    now_ms: u64,
) -> CombatReport {
    let mut report = CombatReport::default();

    for adv in adversaries.iter_mut() {
        if adv.stunned || adv.is_dead() {
            continue;
        }

        for barrier in barriers.iter() {
            if barrier.is_expired(now_ms) || report.destroyed_barriers.contains(&barrier.id) {
                continue;
            }
            if !barrier.intersects(adv.pos, adv.radius) {
                continue;
            }

            match adv.special {
                Special::ExplodeWall => {
                    log::debug!("Adversary {} destroyed barrier {}", adv.id, barrier.id);
                    report.destroyed_barriers.push(barrier.id);
                    report.explosions.push(adv.pos);
                    adv.record_hit(barrier.id, barrier.length());
                    adv.detonate();
                    break;
                }
                Special::ShieldOnce if adv.shield_active => {
                    log::debug!("Adversary {} shield absorbed barrier {}", adv.id, barrier.id);
                    adv.break_shield(now_ms);
                    report.shields_broken.push(adv.id);
                    break;
                }
                _ => {
                    adv.apply_damage(&barrier.kind, barrier.damage_multiplier, now_ms);
                    adv.record_hit(barrier.id, barrier.length());
                    report.hits += 1;
                }
            }
        }
    }

    if !report.destroyed_barriers.is_empty() {
        barriers.retain(|b| !report.destroyed_barriers.contains(&b.id));
    }

    report
}

/// Shorter barriers score more: 2.0 at 50px falling to 1.0 at 300px and beyond
pub fn length_multiplier(length: f32) -> f64 {
    (2.0 - (length as f64 - BARRIER_MIN_LENGTH as f64) / 250.0).max(1.0)
}

/// Score for a kill attributed to `last_hit`
pub fn kill_score(reward: u64, last_hit: Option<BarrierHit>) -> u64 {
    let length = last_hit.map_or(DEFAULT_KILL_BARRIER_LENGTH, |hit| hit.length);
    (reward as f64 * length_multiplier(length)).floor() as u64
}

/// Bonus for an expiring barrier, if it earned one
pub fn multi_kill_bonus(kill_count: u32) -> Option<u64> {
    (kill_count >= MULTI_KILL_THRESHOLD).then(|| kill_count as u64 * MULTI_KILL_BONUS_PER_KILL)
}
