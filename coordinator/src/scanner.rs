//! The Periodic Scanner: four independent sweepers that feed coalesced ticks
//! into the coordinator's mailbox. Each kind gets its own gate so a tick
//! fired while the previous tick of that kind is still being processed is
//! dropped rather than queued — the coordinator only ever sees at most one
//! outstanding tick per kind.

use crate::config::Config;
use crate::dispatcher::Outbox;
use crate::handlers::cascade;
use crate::store::{GameState, SeatState, Store};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use engine::GameEngine;
use protocol::CompletionReason;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    IdleConnection,
    IdlePlayer,
    IdleGame,
    ObsoleteGame,
}

impl TickKind {
    pub const ALL: [TickKind; 4] = [TickKind::IdleConnection, TickKind::IdlePlayer, TickKind::IdleGame, TickKind::ObsoleteGame];

    fn schedule(self, config: &Config) -> (Duration, Duration) {
        let (period, delay) = match self {
            TickKind::IdleConnection => (config.idle_websocket_check_period_sec, config.idle_websocket_check_delay_sec),
            TickKind::IdlePlayer => (config.idle_player_check_period_sec, config.idle_player_check_delay_sec),
            TickKind::IdleGame => (config.idle_game_check_period_sec, config.idle_game_check_delay_sec),
            TickKind::ObsoleteGame => (config.obsolete_game_check_period_sec, config.obsolete_game_check_delay_sec),
        };
        (Duration::from_secs(period), Duration::from_secs(delay))
    }
}

/// Per-kind in-flight flags shared between the timer tasks and the
/// coordinator loop.
pub struct TickGates {
    flags: [Arc<AtomicBool>; 4],
}

impl TickGates {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { flags: std::array::from_fn(|_| Arc::new(AtomicBool::new(false))) })
    }

    /// Called by the coordinator once it has finished processing a tick of
    /// this kind, opening the gate for the next one.
    pub fn mark_done(&self, kind: TickKind) {
        self.flags[kind as usize].store(false, Ordering::SeqCst);
    }

    fn try_enter(&self, kind: TickKind) -> bool {
        self.flags[kind as usize]
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Spawns the four sweeper timers. Each sleeps its configured startup delay,
/// then fires on its configured period, sending a [`TickKind`] into `sink`
/// whenever its gate is open.
pub fn spawn_timers(config: &Config, gates: Arc<TickGates>, sink: mpsc::UnboundedSender<TickKind>) {
    for kind in TickKind::ALL {
        let (period, delay) = kind.schedule(config);
        let gates = gates.clone();
        let sink = sink.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if gates.try_enter(kind) && sink.send(kind).is_err() {
                    break;
                }
            }
        });
    }
}

pub fn run_tick(
    store: &mut Store,
    config: &Config,
    engine: &dyn GameEngine,
    outbox: &mut Outbox,
    now: DateTime<Utc>,
    kind: TickKind,
) {
    match kind {
        TickKind::IdleConnection => sweep_idle_connections(store, config, engine, outbox, now),
        TickKind::IdlePlayer => sweep_idle_players(store, config, engine, outbox, now),
        TickKind::IdleGame => sweep_idle_games(store, config, outbox, now),
        TickKind::ObsoleteGame => sweep_obsolete_games(store, config, now),
    }
}

fn sweep_idle_connections(store: &mut Store, config: &Config, engine: &dyn GameEngine, outbox: &mut Outbox, now: DateTime<Utc>) {
    let inactive = ChronoDuration::minutes(config.websocket_inactive_thresh_min as i64);
    let stale: Vec<_> = store
        .connections
        .iter()
        .filter(|(_, c)| now - c.last_activity >= inactive)
        .map(|(key, _)| *key)
        .collect();
    for key in stale {
        let Some(player_id) = store.remove_connection(key) else { continue };
        cascade::leave_game(store, engine, outbox, now, player_id, SeatState::Disconnected);
    }
}

fn sweep_idle_players(store: &mut Store, config: &Config, engine: &dyn GameEngine, outbox: &mut Outbox, now: DateTime<Utc>) {
    use crate::store::ActivityState;

    let idle = ChronoDuration::minutes(config.player_idle_thresh_min as i64);
    let inactive = ChronoDuration::minutes(config.player_inactive_thresh_min as i64);

    let idling: Vec<_> = store
        .players
        .values()
        .filter(|p| p.activity_state == ActivityState::Active && now - p.last_active >= idle)
        .map(|p| p.player_id)
        .collect();
    for player_id in idling {
        if let Some(player) = store.players.get_mut(&player_id) {
            player.activity_state = ActivityState::Idle;
        }
        outbox.to_player(player_id, protocol::ServerEvent::PlayerIdle { player_id });
    }

    let expiring: Vec<_> = store
        .players
        .values()
        .filter(|p| p.activity_state != ActivityState::Inactive && now - p.last_active >= inactive)
        .map(|p| p.player_id)
        .collect();
    for player_id in expiring {
        outbox.to_player(player_id, protocol::ServerEvent::PlayerInactive { player_id });
        cascade::leave_game(store, engine, outbox, now, player_id, SeatState::Disconnected);
        store.destroy_player(player_id);
    }
}

fn sweep_idle_games(store: &mut Store, config: &Config, outbox: &mut Outbox, now: DateTime<Utc>) {
    use crate::store::game::ActivityState as GameActivityState;

    let idle = ChronoDuration::minutes(config.game_idle_thresh_min as i64);
    let inactive = ChronoDuration::minutes(config.game_inactive_thresh_min as i64);

    let idling: Vec<_> = store
        .games
        .values()
        .filter(|g| g.is_in_progress() && g.activity_state == GameActivityState::Active && now - g.last_active >= idle)
        .map(|g| g.game_id)
        .collect();
    for game_id in &idling {
        if let Some(game) = store.games.get_mut(game_id) {
            game.activity_state = GameActivityState::Idle;
        }
        outbox.to_game(*game_id, protocol::ServerEvent::GameIdle { game_id: *game_id });
    }

    let expiring: Vec<_> = store
        .games
        .values()
        .filter(|g| g.is_in_progress() && now - g.last_active >= inactive)
        .map(|g| g.game_id)
        .collect();
    for game_id in expiring {
        cascade::cancel_game(store, outbox, now, game_id, CompletionReason::Inactive, "game timed out due to inactivity".into());
    }
}

fn sweep_obsolete_games(store: &mut Store, config: &Config, now: DateTime<Utc>) {
    let retention = ChronoDuration::minutes(config.game_retention_thresh_min as i64);
    store.games.retain(|_, game| {
        if !matches!(game.game_state, GameState::Completed | GameState::Cancelled) {
            return true;
        }
        match game.completed_at {
            Some(completed_at) => now - completed_at < retention,
            None => true,
        }
    });
}
