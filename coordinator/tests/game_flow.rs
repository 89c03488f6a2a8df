mod support;

use std::collections::HashSet;

use protocol::{ClientRequest, GameMode, RequestErrorReason, ServerEvent, Visibility};
use support::{drain, register, Harness};

fn advertise(h: &mut Harness, advertiser_key: coordinator::store::ConnectionKey, advertiser: protocol::PlayerId, total_seats: u8) -> protocol::GameId {
    h.send(
        advertiser_key,
        ClientRequest::AdvertiseGame {
            player_id: advertiser,
            name: "table one".to_string(),
            mode: GameMode::Standard,
            total_seats,
            visibility: Visibility::Public,
            invited_handles: HashSet::new(),
        },
    );
    h.store.games.keys().copied().next().expect("game was just advertised")
}

#[test]
fn joining_the_last_seat_auto_starts_the_game() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let (joiner_key, joiner, mut joiner_rx) = register(&mut h, "bob");

    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);

    h.send(joiner_key, ClientRequest::JoinGame { player_id: joiner, game_id });
    let advertiser_events = drain(&mut advertiser_rx);
    let joiner_events = drain(&mut joiner_rx);

    assert!(advertiser_events.iter().any(|e| matches!(e, ServerEvent::GameStarted { .. })));
    assert!(joiner_events.iter().any(|e| matches!(e, ServerEvent::GameStarted { .. })));
    // Only the seat whose turn it is gets prompted for a move.
    assert!(advertiser_events.iter().any(|e| matches!(e, ServerEvent::GamePlayerTurn { .. })));
    assert!(!joiner_events.iter().any(|e| matches!(e, ServerEvent::GamePlayerTurn { .. })));

    let game = h.store.games.get(&game_id).unwrap();
    assert_eq!(game.game_state, coordinator::store::GameState::Started);
}

#[test]
fn joining_a_private_game_without_an_invite_is_rejected() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let (joiner_key, joiner, mut joiner_rx) = register(&mut h, "bob");

    h.send(
        advertiser_key,
        ClientRequest::AdvertiseGame {
            player_id: advertiser,
            name: "invite only".to_string(),
            mode: GameMode::Standard,
            total_seats: 2,
            visibility: Visibility::Private,
            invited_handles: HashSet::new(),
        },
    );
    drain(&mut advertiser_rx);
    let game_id = h.store.games.keys().copied().next().unwrap();

    h.send(joiner_key, ClientRequest::JoinGame { player_id: joiner, game_id });
    let events = drain(&mut joiner_rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::NotInvited, .. }]
    ));
}

#[test]
fn starting_with_open_seats_fills_them_programmatically() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);

    h.send(advertiser_key, ClientRequest::StartGame { player_id: advertiser, game_id });
    drain(&mut advertiser_rx);

    let game = h.store.games.get(&game_id).unwrap();
    let second_seat = game.seats.iter().find(|s| s.player_id().is_none()).unwrap();
    assert_eq!(second_seat.occupant, coordinator::store::Occupant::Programmatic);
}

#[test]
fn consecutive_programmatic_turns_are_coalesced_before_the_next_human_prompt() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);
    h.send(advertiser_key, ClientRequest::StartGame { player_id: advertiser, game_id });
    drain(&mut advertiser_rx);

    // The advertiser (red) plays; the lone programmatic seat (blue) then
    // plays its own turn automatically before red is prompted again. Only
    // one GAME_STATE_CHANGE / GAME_PLAYER_TURN pair should reach red per
    // human move, not one per intermediate programmatic move.
    h.send(advertiser_key, ClientRequest::ExecuteMove { player_id: advertiser, game_id, move_id: "advance".to_string() });
    let events = drain(&mut advertiser_rx);
    let state_changes = events.iter().filter(|e| matches!(e, ServerEvent::GameStateChange { .. })).count();
    let turn_prompts = events.iter().filter(|e| matches!(e, ServerEvent::GamePlayerTurn { .. })).count();
    assert_eq!(state_changes, 1);
    assert_eq!(turn_prompts, 1);
}

#[test]
fn winning_the_game_broadcasts_completion_with_the_winner() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);
    h.send(advertiser_key, ClientRequest::StartGame { player_id: advertiser, game_id });
    drain(&mut advertiser_rx);

    for _ in 0..3 {
        h.send(advertiser_key, ClientRequest::ExecuteMove { player_id: advertiser, game_id, move_id: "advance".to_string() });
        drain(&mut advertiser_rx);
    }

    h.send(advertiser_key, ClientRequest::ExecuteMove { player_id: advertiser, game_id, move_id: "win".to_string() });
    let events = drain(&mut advertiser_rx);
    assert!(events.iter().any(|e| matches!(e, ServerEvent::GameCompleted { winner: Some(p), .. } if *p == advertiser)));

    let game = h.store.games.get(&game_id).unwrap();
    assert_eq!(game.game_state, coordinator::store::GameState::Completed);
}

#[test]
fn retrieving_state_of_a_completed_game_still_succeeds() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);
    h.send(advertiser_key, ClientRequest::StartGame { player_id: advertiser, game_id });
    drain(&mut advertiser_rx);
    for _ in 0..3 {
        h.send(advertiser_key, ClientRequest::ExecuteMove { player_id: advertiser, game_id, move_id: "advance".to_string() });
        drain(&mut advertiser_rx);
    }
    h.send(advertiser_key, ClientRequest::ExecuteMove { player_id: advertiser, game_id, move_id: "win".to_string() });
    drain(&mut advertiser_rx);

    // A seat's occupant survives game completion even though the player's
    // own `current_game` link is cleared; retrieval keys off the former.
    h.send(advertiser_key, ClientRequest::RetrieveGameState { player_id: advertiser, game_id });
    let events = drain(&mut advertiser_rx);
    assert!(matches!(events.as_slice(), [ServerEvent::GameStateChange { .. }]));
}

#[test]
fn moving_out_of_turn_is_rejected() {
    let mut h = Harness::new();
    let (advertiser_key, advertiser, mut advertiser_rx) = register(&mut h, "alice");
    let (joiner_key, joiner, mut joiner_rx) = register(&mut h, "bob");
    let game_id = advertise(&mut h, advertiser_key, advertiser, 2);
    drain(&mut advertiser_rx);
    h.send(joiner_key, ClientRequest::JoinGame { player_id: joiner, game_id });
    drain(&mut advertiser_rx);
    drain(&mut joiner_rx);

    h.send(joiner_key, ClientRequest::ExecuteMove { player_id: joiner, game_id, move_id: "advance".to_string() });
    let events = drain(&mut joiner_rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::NotYourTurn, .. }]
    ));
}
