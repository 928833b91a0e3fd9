//! Simulation tick
//!
//! Core game loop. The order of the steps below is part of the contract:
//! collisions are resolved against positions moved in the same tick.

use serde::{Deserialize, Serialize};

use super::clock::Millis;
use super::collision::{detect_and_resolve, resolve_bullet_enemy, resolve_player_hit};
use super::movement::{integrate, integrate_pool};
use super::player::apply_movement;
use super::spawn::{on_enemy_pause, on_enemy_retreat};
use super::state::{EnemyPhase, GameEvent, GamePhase, GameState, TimerEvent};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held directions
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire went down since the previous tick (edge, not level)
    pub fire_pressed: bool,
}

/// Advance the game to time `now`, `delta` ms after the previous tick
pub fn tick(state: &mut GameState, input: &TickInput, now: Millis, delta: Millis) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.time_ticks += 1;
    state.timers.advance_to(now);
    let now = state.timers.now();
    let dt = delta as f32 / 1000.0;

    // 1. Timers due this tick
    for event in state.timers.take_due() {
        fire_timer(state, event);
    }

    // 2. Player
    apply_movement(&mut state.player, input, state.settings.player.speed);
    if let Some(bullet) = state.controller.try_fire(
        now,
        input.fire_pressed,
        &state.player,
        &mut state.bullets,
        &state.settings.player,
    ) {
        state.events.push(GameEvent::ShotFired { bullet });
    }

    // 3. Spawning
    if let Some(enemy) = state.spawner.update(
        &mut state.rng,
        &mut state.enemies,
        &mut state.timers,
        &state.settings.enemy,
        state.settings.arena.width,
    ) {
        let x = state.enemies.get(enemy).map_or(0.0, |e| e.pos.x);
        state.events.push(GameEvent::EnemySpawned { enemy, x });
    }

    // 4. Movement
    integrate(&mut state.player, dt);
    integrate_pool(&mut state.bullets, dt);
    integrate_pool(&mut state.enemies, dt);
    integrate_pool(&mut state.enemy_bullets, dt);
    integrate_pool(&mut state.effects, dt);

    // 5. Collisions
    resolve_collisions(state);

    // 6. Leave the arena
    sweep_out_of_bounds(state);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over at {}ms after {} ticks", now, state.time_ticks);
    }
}

fn fire_timer(state: &mut GameState, event: TimerEvent) {
    let GameState {
        enemies,
        enemy_bullets,
        effects,
        timers,
        settings,
        events,
        ..
    } = state;

    match event {
        TimerEvent::EnemyPause(enemy) => {
            if let Some(bullet) = on_enemy_pause(enemy, enemies, enemy_bullets, timers, &settings.enemy) {
                events.push(GameEvent::EnemyFired { enemy, bullet });
            }
        }
        TimerEvent::EnemyRetreat(enemy) => {
            on_enemy_retreat(enemy, enemies, &settings.enemy);
        }
        TimerEvent::ExpireEffect(effect) => {
            effects.recycle(effect);
        }
    }
}

fn resolve_collisions(state: &mut GameState) {
    let GameState {
        player,
        bullets,
        enemies,
        enemy_bullets,
        effects,
        timers,
        lives,
        settings,
        events,
        ..
    } = state;

    // Player bullets vs enemies
    detect_and_resolve(bullets, enemies, |bullets, enemies, bullet, enemy| {
        if resolve_bullet_enemy(bullets, enemies, bullet, enemy) {
            log::debug!("Enemy {:?} destroyed", enemy);
            events.push(GameEvent::EnemyDestroyed { enemy });
        }
    });

    // Player vs enemy bullets
    let lifetime = settings.effect.lifetime_ms;
    detect_and_resolve(player, enemy_bullets, |player, enemy_bullets, _, bullet| {
        if resolve_player_hit(enemy_bullets, bullet, lives, player.pos, effects, timers, lifetime) {
            log::info!("Hit, {} lives left", lives);
            events.push(GameEvent::PlayerHit { lives: *lives });
        }
    });
}

fn sweep_out_of_bounds(state: &mut GameState) {
    let height = state.settings.arena.height;
    let despawn_y = -state.settings.enemy.despawn_margin;

    state.bullets.recycle_where(|b| b.pos.y < 0.0);
    state.enemy_bullets.recycle_where(|b| b.pos.y > height);
    state
        .enemies
        .recycle_where(|e| e.enemy_phase() == Some(EnemyPhase::Retreating) && e.pos.y < despawn_y);
}
