mod support;

use std::collections::HashSet;

use chrono::Duration;
use coordinator::dispatcher::Outbox;
use coordinator::scanner::{run_tick, TickKind};
use coordinator::store::{ActivityState, Game, GameState};
use protocol::{ClientRequest, CompletionReason, GameMode, PlayerId, Visibility};
use support::{drain, register, Harness};

#[test]
fn idle_connection_sweep_disconnects_and_cascades_into_a_cancelled_game() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    h.send(
        advertiser_key,
        ClientRequest::AdvertiseGame {
            player_id: advertiser,
            name: "table one".to_string(),
            mode: GameMode::Standard,
            total_seats: 2,
            visibility: Visibility::Public,
            invited_handles: HashSet::new(),
        },
    );
    drain(&mut advertiser_rx);
    let game_id = h.store.games.keys().copied().next().unwrap();

    h.advance(Duration::minutes(h.config.websocket_inactive_thresh_min as i64 + 1));
    let mut outbox = Outbox::new();
    run_tick(&mut h.store, &h.config, &h.engine, &mut outbox, h.now, TickKind::IdleConnection);

    assert!(h.store.connections.is_empty());
    let game = h.store.games.get(&game_id).unwrap();
    assert_eq!(game.game_state, GameState::Cancelled);
}

#[test]
fn an_actively_used_connection_survives_the_idle_connection_sweep() {
    let mut h = Harness::new();
    let (key, player_id, mut rx) = register(&mut h, "alice");
    drain(&mut rx);

    // Creep up to just under the threshold, then send a request — this
    // should refresh the connection's last-activity, not just the player's.
    h.advance(Duration::minutes(h.config.websocket_inactive_thresh_min as i64 - 1));
    h.send(key, ClientRequest::ListPlayers { player_id });
    drain(&mut rx);

    h.advance(Duration::minutes(2));
    let mut outbox = Outbox::new();
    run_tick(&mut h.store, &h.config, &h.engine, &mut outbox, h.now, TickKind::IdleConnection);

    assert!(h.store.connections.contains_key(&key));
}

#[test]
fn idle_player_sweep_marks_idle_then_destroys_on_inactivity() {
    let mut h = Harness::new();
    let (_key, player_id, mut rx) = register(&mut h, "alice");
    drain(&mut rx);

    h.advance(Duration::minutes(h.config.player_idle_thresh_min as i64 + 1));
    let mut outbox = Outbox::new();
    run_tick(&mut h.store, &h.config, &h.engine, &mut outbox, h.now, TickKind::IdlePlayer);
    assert_eq!(h.store.players.get(&player_id).unwrap().activity_state, ActivityState::Idle);

    h.advance(Duration::minutes(h.config.player_inactive_thresh_min as i64));
    let mut outbox = Outbox::new();
    run_tick(&mut h.store, &h.config, &h.engine, &mut outbox, h.now, TickKind::IdlePlayer);
    assert!(!h.store.players.contains_key(&player_id));
}

#[test]
fn obsolete_game_sweep_purges_only_games_past_their_retention_window() {
    let mut h = Harness::new();
    let retention = Duration::minutes(h.config.game_retention_thresh_min as i64);

    let old_game = make_finished_game(h.now - retention - Duration::minutes(1));
    let recent_game = make_finished_game(h.now - Duration::minutes(1));
    let (old_id, recent_id) = (old_game.game_id, recent_game.game_id);
    h.store.games.insert(old_id, old_game);
    h.store.games.insert(recent_id, recent_game);

    let mut outbox = Outbox::new();
    run_tick(&mut h.store, &h.config, &h.engine, &mut outbox, h.now, TickKind::ObsoleteGame);

    assert!(!h.store.games.contains_key(&old_id));
    assert!(h.store.games.contains_key(&recent_id));
}

fn make_finished_game(completed_at: chrono::DateTime<chrono::Utc>) -> Game {
    Game {
        game_id: protocol::GameId::new(),
        name: "finished".to_string(),
        mode: GameMode::Standard,
        total_seats: 2,
        advertiser: PlayerId::new(),
        visibility: Visibility::Public,
        invited_handles: HashSet::new(),
        advertised_at: completed_at,
        started_at: Some(completed_at),
        completed_at: Some(completed_at),
        last_active: completed_at,
        game_state: GameState::Completed,
        activity_state: coordinator::store::game::ActivityState::Active,
        completion_reason: Some(CompletionReason::Won),
        completion_comment: Some("game complete".to_string()),
        seats: Vec::new(),
        engine_state: None,
        current_turn: None,
    }
}
