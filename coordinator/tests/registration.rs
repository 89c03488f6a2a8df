mod support;

use protocol::{ClientRequest, RequestErrorReason, ServerEvent};
use support::{drain, register, Harness};

#[test]
fn register_assigns_an_id_and_echoes_the_handle() {
    let mut h = Harness::new();
    let (_key, _player_id, _rx) = register(&mut h, "alice");
    assert_eq!(h.store.players.len(), 1);
    assert!(h.store.handles.contains_key("alice"));
}

#[test]
fn duplicate_handle_is_rejected() {
    let mut h = Harness::new();
    let (_key, _id, _rx) = register(&mut h, "alice");

    let (other_key, mut other_rx) = h.connect();
    h.send(other_key, ClientRequest::RegisterPlayer { handle: "alice".to_string() });
    let events = drain(&mut other_rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::HandleTaken, .. }]
    ));
    assert_eq!(h.store.players.len(), 1);
}

#[test]
fn reregister_rebinds_an_existing_player_to_a_new_connection() {
    let mut h = Harness::new();
    let (first_key, player_id, _rx) = register(&mut h, "alice");

    // Simulate the original socket dropping without a clean disconnect.
    h.store.remove_connection(first_key);

    let (second_key, mut second_rx) = h.connect();
    h.send(second_key, ClientRequest::ReregisterPlayer { player_id });
    let events = drain(&mut second_rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::PlayerRegistered { player_id: reregistered, handle }] if *reregistered == player_id && handle == "alice"
    ));
    assert_eq!(h.store.players.get(&player_id).unwrap().connection_key, Some(second_key));
}

#[test]
fn reregister_while_the_original_connection_is_still_alive_is_rejected() {
    let mut h = Harness::new();
    let (_first_key, player_id, _rx) = register(&mut h, "alice");

    let (second_key, mut second_rx) = h.connect();
    h.send(second_key, ClientRequest::ReregisterPlayer { player_id });
    let events = drain(&mut second_rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::NotAuthorized, .. }]
    ));
}

#[test]
fn unregister_frees_the_handle_for_reuse() {
    let mut h = Harness::new();
    let (_key, player_id, _rx) = register(&mut h, "alice");

    h.send(_key, ClientRequest::UnregisterPlayer { player_id });
    assert!(!h.store.players.contains_key(&player_id));
    assert!(!h.store.handles.contains_key("alice"));

    let (_key2, _id2, _rx2) = register(&mut h, "alice");
}

#[test]
fn registering_with_an_empty_handle_is_rejected() {
    let mut h = Harness::new();
    let (key, mut rx) = h.connect();
    h.send(key, ClientRequest::RegisterPlayer { handle: String::new() });
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::InvalidRequest, .. }]
    ));
}

#[test]
fn registered_player_limit_is_enforced() {
    let mut h = Harness::new();
    h.config.registered_player_limit = 1;
    let (_key, _id, _rx) = register(&mut h, "alice");

    let (key, mut rx) = h.connect();
    h.send(key, ClientRequest::RegisterPlayer { handle: "bob".to_string() });
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [ServerEvent::RequestFailed { reason: RequestErrorReason::UserLimit, .. }]
    ));
}
