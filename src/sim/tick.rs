//! Session controller tick
//!
//! Advances a session by one step of the virtual clock. Order within a tick:
//! commands, at most one due scheduled event, adversary movement, collision
//! resolution, adversary pruning, barrier expiry, then the failure and
//! wave-clear checks.

use glam::Vec2;
use rand::Rng;

use super::adversary::Adversary;
use super::barrier::Barrier;
use super::combat::{kill_score, multi_kill_bonus, resolve_collisions};
use super::gesture::{Gesture, GestureStep};
use super::schedule::ScheduledKind;
use super::state::{GameEvent, GamePhase, SessionState};
use super::wave::spawn_position;
use crate::config::Special;
use crate::consts::*;
use crate::error::SimError;
use crate::results::{Bonuses, Outcome, SessionResult};
use crate::{in_playfield_band, objective_position};

/// Input commands from the input/UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pointer down: start a gesture if the cooldown allows
    BeginDraw(Vec2),
    /// Pointer moved while drawing
    ExtendDraw(Vec2),
    /// Pointer up: turn the gesture into a barrier if it is long enough
    EndDraw,
    SelectBarrierType(String),
}

/// Input for a single tick, applied in order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

/// Advance the session by `dt_ms` of simulated time
pub fn tick(state: &mut SessionState, input: &TickInput, dt_ms: u64) {
    if state.is_torn_down() || state.is_finished() {
        return;
    }

    state.now_ms += dt_ms;
    state.stats.elapsed_ms += dt_ms;

    for command in &input.commands {
        apply_command(state, command);
    }

    run_due_event(state);

    let now = state.now_ms;
    let objective = objective_position();
    for adversary in &mut state.adversaries {
        adversary.advance(dt_ms, now, objective);
    }

    let report = resolve_collisions(&mut state.adversaries, &mut state.barriers, now);
    for (&barrier_id, &position) in report.destroyed_barriers.iter().zip(&report.explosions) {
        state.emit(GameEvent::BarrierExploded {
            barrier_id,
            position,
        });
    }
    for &adversary_id in &report.shields_broken {
        state.emit(GameEvent::ShieldBroken { adversary_id });
    }

    prune_adversaries(state);
    prune_barriers(state);

    if state.objective_health == 0 {
        end_session(state, Outcome::Failed);
        return;
    }

    check_wave_clear(state);
}

/// Apply one input command. Ignored once the session is over.
pub fn apply_command(state: &mut SessionState, command: &Command) {
    if state.is_torn_down() || state.is_finished() {
        return;
    }

    match command {
        Command::BeginDraw(point) => {
            if !state.can_draw() {
                log::debug!("Draw rejected: cooldown");
                return;
            }
            if !in_playfield_band(point.y) {
                log::debug!("Draw rejected: y={} outside playfield", point.y);
                return;
            }
            state.gesture = Some(Gesture::begin(*point, state.settings.max_barrier_length));
        }
        Command::ExtendDraw(point) => {
            let step = match state.gesture.as_mut() {
                Some(gesture) => gesture.extend(*point),
                None => return,
            };
            if step == GestureStep::Completed {
                finish_gesture(state);
            }
        }
        Command::EndDraw => finish_gesture(state),
        Command::SelectBarrierType(id) => {
            if state.config.barrier(id).is_some() {
                state.selected_barrier = id.clone();
            } else {
                let err = SimError::MissingConfiguration {
                    kind: "barrier",
                    id: id.clone(),
                };
                log::warn!("Ignoring barrier selection: {}", err);
            }
        }
    }
}

/// Close the current gesture and place a barrier from it
fn finish_gesture(state: &mut SessionState) {
    let Some(gesture) = state.gesture.take() else {
        return;
    };

    let Some(kind) = state.config.barrier(&state.selected_barrier).cloned() else {
        let err = SimError::MissingConfiguration {
            kind: "barrier",
            id: state.selected_barrier.clone(),
        };
        log::warn!("Barrier not placed: {}", err);
        return;
    };

    let id = state.next_entity_id();
    let barrier = match Barrier::new(
        id,
        gesture.into_points(),
        kind,
        state.now_ms,
        state.upgrades.barrier_duration_ms(),
        state.upgrades.damage_multiplier(),
    ) {
        Ok(barrier) => barrier,
        Err(e) => {
            log::debug!("Gesture discarded: {}", e);
            return;
        }
    };

    if state.barriers.len() >= state.barrier_cap() {
        let evicted = state.barriers.remove(0);
        log::debug!("Barrier cap reached, evicting barrier {}", evicted.id);
        state.emit(GameEvent::BarrierExpired {
            id: evicted.id,
            kill_count: evicted.kill_count,
        });
    }

    let length = barrier.length();
    state.barriers.push(barrier);
    state.stats.barriers_used += 1;
    state.last_draw_ms = Some(state.now_ms);
    state.emit(GameEvent::BarrierPlaced { id, length });
}

/// Fire the earliest due scheduled event, if any
fn run_due_event(state: &mut SessionState) {
    let Some(event) = state.scheduler.pop_due(state.now_ms) else {
        return;
    };

    match event.kind {
        ScheduledKind::BeginWave { wave_index } => begin_wave(state, wave_index, event.due_at_ms),
        ScheduledKind::BeginSpawning { wave_index } => {
            begin_spawning(state, wave_index, event.due_at_ms)
        }
        ScheduledKind::SpawnNext => spawn_next(state, event.due_at_ms),
    }
}

fn begin_wave(state: &mut SessionState, wave_index: usize, due_at_ms: u64) {
    let Some(wave) = state.stage.waves.get(wave_index) else {
        log::warn!("Wave {} does not exist in stage {}", wave_index, state.stage.id);
        return;
    };
    let directions = wave.directions.clone();

    log::info!(
        "Wave {}/{} incoming from {:?}",
        wave_index + 1,
        state.total_waves(),
        directions
    );

    state.wave_index = wave_index;
    state.phase = GamePhase::WaveWarmup;
    state.emit(GameEvent::WaveIncoming {
        wave_index,
        directions,
    });
    state.scheduler.schedule(
        due_at_ms + WAVE_WARMUP_MS,
        ScheduledKind::BeginSpawning { wave_index },
    );
}

fn begin_spawning(state: &mut SessionState, wave_index: usize, due_at_ms: u64) {
    let Some(wave) = state.stage.waves.get(wave_index) else {
        return;
    };
    state
        .director
        .start_spawning(wave_index, wave, &state.settings, &mut state.rng);
    state.phase = GamePhase::Spawning;
    spawn_next(state, due_at_ms);
}

fn spawn_next(state: &mut SessionState, due_at_ms: u64) {
    let Some(request) = state
        .director
        .next_spawn(due_at_ms, &mut state.rng, &mut state.scheduler)
    else {
        return;
    };
    let position = spawn_position(request.direction, &mut state.rng);
    spawn_adversary(state, &request.adversary_id, position);
}

/// Place one adversary with difficulty-scaled health. Unknown ids are
/// logged and skipped.
fn spawn_adversary(state: &mut SessionState, adversary_id: &str, position: Vec2) -> Option<u32> {
    let Some(kind) = state.config.adversary(adversary_id).cloned() else {
        let err = SimError::MissingConfiguration {
            kind: "adversary",
            id: adversary_id.to_string(),
        };
        log::warn!("Spawn skipped: {}", err);
        return None;
    };

    let id = state.next_entity_id();
    let health = state.settings.scale_hp(kind.hp);
    let adversary = Adversary::new(id, &kind, health, position, state.now_ms);
    state.adversaries.push(adversary);
    log::debug!(
        "Spawned {} #{} ({}, {} hp) at ({:.0}, {:.0})",
        kind.id,
        id,
        kind.special.as_str(),
        health,
        position.x,
        position.y
    );
    state.emit(GameEvent::AdversarySpawned {
        id,
        kind: kind.id,
        position,
    });
    Some(id)
}

/// Spawn the on-death brood around `origin`
fn spawn_brood(state: &mut SessionState, origin: Vec2) {
    let half = BROOD_SPREAD / 2.0;
    for _ in 0..BROOD_SIZE {
        let offset = Vec2::new(
            state.rng.random_range(-half..=half),
            state.rng.random_range(-half..=half),
        );
        spawn_adversary(state, BROOD_ADVERSARY_ID, origin + offset);
    }
}

/// Remove adversaries that reached the objective (damage) or died (kill).
/// Arrival takes precedence over death.
fn prune_adversaries(state: &mut SessionState) {
    let objective = objective_position();
    let mut broods = Vec::new();

    for adversary in std::mem::take(&mut state.adversaries) {
        if adversary.has_reached_objective(objective) {
            state.objective_health = state.objective_health.saturating_sub(1);
            state.stats.damage_taken += 1;
            log::debug!(
                "Adversary {} reached the objective ({}/{})",
                adversary.id,
                state.objective_health,
                state.objective_max_health
            );
            state.emit(GameEvent::ObjectiveDamaged {
                health: state.objective_health,
                max_health: state.objective_max_health,
            });
        } else if adversary.is_dead() {
            let points = kill_score(adversary.reward, adversary.last_hit);
            state.score += points;
            state.stats.total_kills += 1;

            if let Some(hit) = adversary.last_hit {
                if let Some(barrier) = state.barriers.iter_mut().find(|b| b.id == hit.barrier_id) {
                    barrier.register_kill();
                }
            }

            if adversary.special == Special::SpawnOnDeath {
                broods.push(adversary.pos);
            }

            state.emit(GameEvent::AdversaryKilled {
                id: adversary.id,
                kind: adversary.kind,
                points,
            });
            state.emit(GameEvent::ScoreChanged { score: state.score });
        } else {
            state.adversaries.push(adversary);
        }
    }

    for origin in broods {
        spawn_brood(state, origin);
    }
}

/// Remove expired barriers, paying out multi-kill bonuses first
fn prune_barriers(state: &mut SessionState) {
    let now = state.now_ms;
    if !state.barriers.iter().any(|b| b.is_expired(now)) {
        return;
    }

    let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut state.barriers)
        .into_iter()
        .partition(|b| b.is_expired(now));
    state.barriers = live;

    for barrier in expired {
        if let Some(bonus) = multi_kill_bonus(barrier.kill_count) {
            state.score += bonus;
            state.stats.multi_kill_count += 1;
            log::debug!(
                "Multi-kill on barrier {}: x{} +{}",
                barrier.id,
                barrier.kill_count,
                bonus
            );
            state.emit(GameEvent::MultiKill {
                barrier_id: barrier.id,
                kill_count: barrier.kill_count,
                bonus,
            });
            state.emit(GameEvent::ScoreChanged { score: state.score });
        }
        state.emit(GameEvent::BarrierExpired {
            id: barrier.id,
            kill_count: barrier.kill_count,
        });
    }
}

/// Wave clear is only evaluated while spawning, so the warm-up gap before a
/// wave's first spawn can never count as a clear
fn check_wave_clear(state: &mut SessionState) {
    if state.phase != GamePhase::Spawning
        || !state.director.is_wave_cleared(state.adversaries.len())
    {
        return;
    }

    state.director.finish();
    state.waves_cleared += 1;
    state.score += WAVE_CLEAR_BONUS;
    log::info!(
        "Wave {}/{} cleared, score {}",
        state.waves_cleared,
        state.total_waves(),
        state.score
    );
    state.emit(GameEvent::WaveCleared {
        wave_number: state.waves_cleared,
        total_waves: state.total_waves(),
    });
    state.emit(GameEvent::ScoreChanged { score: state.score });

    if state.waves_cleared < state.total_waves() {
        state.phase = GamePhase::WaveClearing;
        state.scheduler.schedule(
            state.now_ms + WAVE_TRANSITION_MS,
            ScheduledKind::BeginWave {
                wave_index: state.waves_cleared,
            },
        );
    } else {
        end_session(state, Outcome::Cleared);
    }
}

/// Enter a terminal phase: grade, credit bonuses on a clear, cancel timers
fn end_session(state: &mut SessionState, outcome: Outcome) {
    let cancelled = state.scheduler.cancel_all();
    state.gesture = None;

    let target_barriers = state.stage.target_barriers();
    let bonuses = Bonuses::grade(&state.stats, target_barriers);
    let (reward, waves_reached) = match outcome {
        Outcome::Cleared => {
            state.phase = GamePhase::StageCleared;
            state.score += bonuses.total();
            (state.stage.reward, state.waves_cleared)
        }
        Outcome::Failed => {
            state.phase = GamePhase::Failed;
            (0, state.wave_index + 1)
        }
    };

    let result = SessionResult {
        outcome,
        stage_id: state.stage.id,
        difficulty: state.difficulty,
        score: state.score,
        reward,
        waves_reached,
        total_waves: state.total_waves(),
        target_barriers,
        stats: state.stats,
        bonuses,
    };

    log::info!(
        "Stage {} {:?}: score {}, rank {}, {} scheduled events cancelled",
        state.stage.id,
        outcome,
        state.score,
        bonuses.economy.as_str(),
        cancelled
    );

    state.result = Some(result.clone());
    state.emit(GameEvent::SessionEnded(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, Direction, GameConfig, SessionSetup, Stage, WaveSpec};
    use crate::results::EconomyRank;
    use crate::sim::adversary::BarrierHit;

    const DT: u64 = 10;

    fn single_wave_config(enemies: &str, interval: u64, directions: &[Direction]) -> GameConfig {
        let mut config = GameConfig::default();
        config.stages = vec![Stage {
            id: 1,
            name: "Test".into(),
            cpu_hp: 3,
            reward: 50,
            target_walls: None,
            waves: vec![WaveSpec {
                enemies: enemies.into(),
                spawn_interval: Some(interval),
                directions: directions.to_vec(),
            }],
        }];
        config
    }

    fn session(config: &GameConfig) -> SessionState {
        SessionState::new(config, SessionSetup::default()).unwrap()
    }

    fn run_until(state: &mut SessionState, until_ms: u64) -> Vec<(u64, GameEvent)> {
        let mut log = Vec::new();
        while state.now_ms < until_ms && !state.is_finished() && !state.is_torn_down() {
            tick(state, &TickInput::default(), DT);
            let now = state.now_ms;
            log.extend(state.drain_events().into_iter().map(|e| (now, e)));
        }
        log
    }

    /// Skip to spawning without any adversaries on the field
    fn into_spawning(state: &mut SessionState) {
        run_until(state, INTRO_DELAY_MS + WAVE_WARMUP_MS);
        assert_eq!(state.phase, GamePhase::Spawning);
    }

    #[test]
    fn test_intro_then_warmup_announces_directions() {
        let config = single_wave_config("bug_small:3", 1000, &[Direction::Right]);
        let mut state = session(&config);

        let events = run_until(&mut state, INTRO_DELAY_MS - DT);
        assert!(events.is_empty());
        assert_eq!(state.phase, GamePhase::Intro);

        let events = run_until(&mut state, INTRO_DELAY_MS);
        assert_eq!(state.phase, GamePhase::WaveWarmup);
        assert_eq!(
            events,
            vec![(
                INTRO_DELAY_MS,
                GameEvent::WaveIncoming {
                    wave_index: 0,
                    directions: vec![Direction::Right],
                }
            )]
        );
    }

    #[test]
    fn test_three_spawns_one_second_apart_then_single_clear() {
        let config = single_wave_config("bug_small:3", 1000, &[Direction::Right]);
        let mut state = session(&config);

        let events = run_until(&mut state, 6000);
        let spawns: Vec<_> = events
            .iter()
            .filter_map(|(t, e)| match e {
                GameEvent::AdversarySpawned { position, .. } => Some((*t, *position)),
                _ => None,
            })
            .collect();
        assert_eq!(
            spawns.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
            vec![4000, 5000, 6000]
        );
        for (_, position) in &spawns {
            assert_eq!(position.x, PLAYFIELD_WIDTH - SPAWN_EDGE_MARGIN);
        }
        assert!(state.director.is_exhausted());
        assert!(!events.iter().any(|(_, e)| matches!(e, GameEvent::WaveCleared { .. })));

        // Kill everything; the clear fires once on the same tick
        for adversary in &mut state.adversaries {
            adversary.health = 0.0;
        }
        let events = run_until(&mut state, 6000 + DT);
        let clears = events
            .iter()
            .filter(|(_, e)| matches!(e, GameEvent::WaveCleared { .. }))
            .count();
        assert_eq!(clears, 1);
        assert_eq!(state.phase, GamePhase::StageCleared);
        assert!(state.scheduler.is_empty());

        tick(&mut state, &TickInput::default(), DT);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_no_clear_between_spawns() {
        let config = single_wave_config("bug_small:2", 2000, &[Direction::Left]);
        let mut state = session(&config);
        into_spawning(&mut state);
        assert_eq!(state.adversaries.len(), 1);

        state.adversaries[0].health = 0.0;
        let events = run_until(&mut state, 4500);
        assert!(state.adversaries.is_empty());
        assert!(!events.iter().any(|(_, e)| matches!(e, GameEvent::WaveCleared { .. })));
        assert_eq!(state.phase, GamePhase::Spawning);
    }

    #[test]
    fn test_multi_wave_transition() {
        let mut config = single_wave_config("bug_small:1", 1000, &[Direction::Top]);
        let second = config.stages[0].waves[0].clone();
        config.stages[0].waves.push(second);
        let mut state = session(&config);
        into_spawning(&mut state);

        state.adversaries[0].health = 0.0;
        let events = run_until(&mut state, 4000 + DT);
        assert!(events.iter().any(|(_, e)| *e
            == GameEvent::WaveCleared {
                wave_number: 1,
                total_waves: 2,
            }));
        assert_eq!(state.phase, GamePhase::WaveClearing);

        let events = run_until(&mut state, 4000 + DT + WAVE_TRANSITION_MS);
        assert!(events.iter().any(|(_, e)| matches!(
            e,
            GameEvent::WaveIncoming { wave_index: 1, .. }
        )));
        assert_eq!(state.phase, GamePhase::WaveWarmup);
        assert_eq!(state.wave_index, 1);
    }

    #[test]
    fn test_brood_spawns_near_spawner_death() {
        let config = single_wave_config("spawner:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);

        let origin = Vec2::new(600.0, 200.0);
        state.adversaries[0].pos = origin;
        state.adversaries[0].health = 0.0;
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.adversaries.len(), BROOD_SIZE);
        let base_hp = config.adversary(BROOD_ADVERSARY_ID).unwrap().hp;
        for brood in &state.adversaries {
            assert_eq!(brood.kind, BROOD_ADVERSARY_ID);
            assert_eq!(brood.health, base_hp);
            assert!((brood.pos.x - origin.x).abs() <= BROOD_SPREAD / 2.0 + 1.0);
            assert!((brood.pos.y - origin.y).abs() <= BROOD_SPREAD / 2.0 + 1.0);
        }
        // Brood keeps the wave open
        assert_eq!(state.phase, GamePhase::Spawning);
    }

    #[test]
    fn test_brood_health_scaled_on_hard() {
        let config = single_wave_config("spawner:1", 1000, &[Direction::Right]);
        let setup = SessionSetup {
            difficulty: Difficulty::Hard,
            ..Default::default()
        };
        let mut state = SessionState::new(&config, setup).unwrap();
        into_spawning(&mut state);

        state.adversaries[0].health = 0.0;
        tick(&mut state, &TickInput::default(), DT);
        // ceil(10 * 1.2)
        assert!(state.adversaries.iter().all(|a| a.health == 12.0));
        assert_eq!(state.adversaries.len(), 3);
    }

    #[test]
    fn test_draw_places_barrier() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(100.0, 100.0)),
            Command::ExtendDraw(Vec2::new(160.0, 100.0)),
            Command::ExtendDraw(Vec2::new(220.0, 100.0)),
            Command::EndDraw,
        ]);
        tick(&mut state, &input, DT);

        assert_eq!(state.barriers.len(), 1);
        assert_eq!(state.stats.barriers_used, 1);
        assert!((state.barriers[0].length() - 120.0).abs() < 1e-3);
        let events = state.drain_events();
        assert!(matches!(events[0], GameEvent::BarrierPlaced { .. }));
    }

    #[test]
    fn test_short_gesture_discarded() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(100.0, 100.0)),
            Command::ExtendDraw(Vec2::new(140.0, 100.0)),
            Command::EndDraw,
        ]);
        tick(&mut state, &input, DT);
        assert!(state.barriers.is_empty());
        assert_eq!(state.stats.barriers_used, 0);
        // Rejected gesture does not start the cooldown
        assert!(state.can_draw());
    }

    #[test]
    fn test_draw_outside_band_and_cooldown() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);

        apply_command(&mut state, &Command::BeginDraw(Vec2::new(100.0, 20.0)));
        assert!(state.gesture.is_none());

        let stroke = |y: f32| {
            TickInput::new(vec![
                Command::BeginDraw(Vec2::new(100.0, y)),
                Command::ExtendDraw(Vec2::new(200.0, y)),
                Command::EndDraw,
            ])
        };
        tick(&mut state, &stroke(100.0), DT);
        assert_eq!(state.barriers.len(), 1);

        tick(&mut state, &stroke(200.0), DT);
        assert_eq!(state.barriers.len(), 1);

        run_until(&mut state, DT + DRAW_COOLDOWN_MS);
        tick(&mut state, &stroke(300.0), DT);
        assert_eq!(state.barriers.len(), 2);
    }

    #[test]
    fn test_gesture_auto_completes_at_max_length() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let setup = SessionSetup {
            difficulty: Difficulty::Hard,
            ..Default::default()
        };
        let mut state = SessionState::new(&config, setup).unwrap();
        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(100.0, 300.0)),
            Command::ExtendDraw(Vec2::new(250.0, 300.0)),
            Command::ExtendDraw(Vec2::new(400.0, 300.0)),
        ]);
        tick(&mut state, &input, DT);
        assert!(state.gesture.is_none());
        assert_eq!(state.barriers.len(), 1);
        assert!((state.barriers[0].length() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_barrier_cap_evicts_oldest() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        let cap = state.barrier_cap();

        let mut ids = Vec::new();
        for i in 0..=cap {
            let y = 100.0 + i as f32 * 60.0;
            let input = TickInput::new(vec![
                Command::BeginDraw(Vec2::new(100.0, y)),
                Command::ExtendDraw(Vec2::new(200.0, y)),
                Command::EndDraw,
            ]);
            tick(&mut state, &input, DRAW_COOLDOWN_MS);
            ids.extend(state.drain_events().into_iter().filter_map(|e| match e {
                GameEvent::BarrierPlaced { id, .. } => Some(id),
                _ => None,
            }));
        }
        assert_eq!(ids.len(), cap + 1);
        assert_eq!(state.barriers.len(), cap);
        assert!(state.barriers.iter().all(|b| b.id != ids[0]));
        assert_eq!(state.stats.barriers_used as usize, cap + 1);
    }

    #[test]
    fn test_select_unknown_barrier_type_ignored() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        apply_command(&mut state, &Command::SelectBarrierType("plasma".into()));
        assert_eq!(state.selected_barrier, "basic");
        apply_command(&mut state, &Command::SelectBarrierType("ice".into()));
        assert_eq!(state.selected_barrier, "ice");
    }

    #[test]
    fn test_unknown_adversary_skipped() {
        let config = single_wave_config("ghost:2,bug_small:1", 500, &[Direction::Right]);
        let mut state = session(&config);
        run_until(&mut state, 6000);
        assert_eq!(state.adversaries.len(), 1);
        assert_eq!(state.adversaries[0].kind, "bug_small");
    }

    #[test]
    fn test_kill_scores_and_credits_barrier() {
        let config = single_wave_config("bug_small:2", 1000, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);

        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(100.0, 100.0)),
            Command::ExtendDraw(Vec2::new(150.0, 100.0)),
            Command::EndDraw,
        ]);
        tick(&mut state, &input, DT);
        let barrier_id = state.barriers[0].id;
        state.adversaries[0].health = 0.0;
        state.adversaries[0].last_hit = Some(BarrierHit {
            barrier_id,
            length: 50.0,
        });
        state.drain_events();
        tick(&mut state, &TickInput::default(), DT);

        let reward = config.adversary("bug_small").unwrap().reward;
        assert_eq!(state.score, reward * 2);
        assert_eq!(state.stats.total_kills, 1);
        assert_eq!(state.barriers[0].kill_count, 1);
    }

    #[test]
    fn test_multi_kill_bonus_on_expiry() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(100.0, 100.0)),
            Command::ExtendDraw(Vec2::new(200.0, 100.0)),
            Command::EndDraw,
        ]);
        tick(&mut state, &input, DT);
        state.barriers[0].kill_count = 3;
        state.drain_events();

        let expires_at = DT + state.upgrades.barrier_duration_ms();
        let events = run_until(&mut state, expires_at);
        assert!(state.barriers.is_empty());
        assert_eq!(state.stats.multi_kill_count, 1);
        assert!(events.iter().any(|(_, e)| matches!(
            e,
            GameEvent::MultiKill {
                kill_count: 3,
                bonus: 150,
                ..
            }
        )));
        assert_eq!(state.score, 150);
    }

    #[test]
    fn test_objective_destroyed_fails_session() {
        let config = single_wave_config("bug_small:5", 100, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);
        state.objective_health = 1;

        state.adversaries[0].pos = objective_position() + Vec2::new(10.0, 0.0);
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Failed);
        assert_eq!(state.stats.damage_taken, 1);
        assert!(state.scheduler.is_empty());
        let result = state.result.clone().unwrap();
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.reward, 0);
        assert_eq!(result.waves_reached, 1);
        assert!(!result.bonuses.no_damage);

        let events = state.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::SessionEnded(_))));
    }

    #[test]
    fn test_stage_clear_credits_bonuses() {
        let config = single_wave_config("bug_small:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);
        state.adversaries[0].health = 0.0;
        tick(&mut state, &TickInput::default(), DT);

        let result = state.result.clone().unwrap();
        assert_eq!(result.outcome, Outcome::Cleared);
        assert_eq!(result.reward, 50);
        assert_eq!(result.waves_reached, 1);
        assert_eq!(result.bonuses.economy, EconomyRank::S);
        assert!(result.bonuses.no_damage);
        // Kill (no barrier hit, 150px assumed) + wave clear + S rank + no damage
        let reward = config.adversary("bug_small").unwrap().reward;
        let expected = kill_score(reward, None) + WAVE_CLEAR_BONUS + 2000 + NO_DAMAGE_BONUS;
        assert_eq!(result.score, expected);
        assert_eq!(state.score, expected);
    }

    #[test]
    fn test_teardown_stops_everything() {
        let config = single_wave_config("bug_small:3", 1000, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);
        let before = state.adversaries.len();
        state.teardown();

        let now = state.now_ms;
        run_until(&mut state, now + 5000);
        assert_eq!(state.now_ms, now);
        assert_eq!(state.adversaries.len(), before);
        apply_command(&mut state, &Command::BeginDraw(Vec2::new(100.0, 100.0)));
        assert!(state.gesture.is_none());
    }

    #[test]
    fn test_explosion_removes_barrier_and_notifies() {
        let config = single_wave_config("bomber:1", 1000, &[Direction::Right]);
        let mut state = session(&config);
        into_spawning(&mut state);

        let input = TickInput::new(vec![
            Command::BeginDraw(Vec2::new(600.0, 250.0)),
            Command::ExtendDraw(Vec2::new(600.0, 350.0)),
            Command::EndDraw,
        ]);
        state.adversaries[0].pos = Vec2::new(601.0, 300.0);
        tick(&mut state, &input, DT);

        assert!(state.barriers.is_empty());
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::BarrierExploded { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::AdversaryKilled { .. })));
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = GameConfig::default();
        let play = || {
            let mut state = SessionState::new(&config, SessionSetup::default()).unwrap();
            run_until(&mut state, 20_000);
            (
                state.score,
                state.adversaries.iter().map(|a| (a.kind.clone(), a.pos)).collect::<Vec<_>>(),
            )
        };
        assert_eq!(play(), play());
    }
}
