//! The State Store: in-memory registries of connections, players, and games,
//! plus the lookup indices that keep handle/player-id/game-id lookups O(1).
//!
//! Every method here is synchronous and infallible with respect to I/O — it
//! either succeeds and mutates the store, or fails with a [`RequestError`]
//! and leaves the store untouched. Nothing in this module talks to a socket,
//! a timer, or the engine adapter directly; it is pure bookkeeping plus the
//! invariants in `SPEC_FULL.md` section 3.

pub mod connection;
pub mod game;
pub mod player;

pub use connection::{Connection, ConnectionKey};
pub use game::{Game, GameSpec, GameState, Occupant, Seat, SeatState};
pub use player::{ActivityState, ConnectionState, PlayState, Player};

use crate::config::Config;
use crate::errors::RequestError;
use chrono::{DateTime, Utc};
use protocol::{Color, GameId, PlayerId};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

pub struct Store {
    pub connections: HashMap<ConnectionKey, Connection>,
    pub players: HashMap<PlayerId, Player>,
    pub handles: HashMap<String, PlayerId>,
    pub games: HashMap<GameId, Game>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            players: HashMap::new(),
            handles: HashMap::new(),
            games: HashMap::new(),
        }
    }

    // ---------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------

    pub fn accept_connection(&mut self, now: DateTime<Utc>, outbox: UnboundedSender<protocol::ServerEvent>) -> ConnectionKey {
        let key = ConnectionKey::next();
        self.connections.insert(key, Connection::new(key, now, outbox));
        key
    }

    /// Tears down a connection: unbinds its player (without destroying the
    /// player — that's a separate decision made by the caller) and removes
    /// the connection record.
    pub fn remove_connection(&mut self, key: ConnectionKey) -> Option<PlayerId> {
        let connection = self.connections.remove(&key)?;
        if let Some(player_id) = connection.bound_player
            && let Some(player) = self.players.get_mut(&player_id)
            && player.connection_key == Some(key)
        {
            player.connection_key = None;
            player.connection_state = ConnectionState::Disconnected;
        }
        connection.bound_player
    }

    // ---------------------------------------------------------------
    // Players
    // ---------------------------------------------------------------

    pub fn register_player(
        &mut self,
        handle: String,
        connection_key: ConnectionKey,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<PlayerId, RequestError> {
        if handle.is_empty() {
            return Err(RequestError::InvalidRequest("handle must not be empty".into()));
        }
        if self.handles.contains_key(&handle) {
            return Err(RequestError::HandleTaken(handle));
        }
        if self.players.len() >= limit {
            return Err(RequestError::UserLimit);
        }

        let player_id = PlayerId::new();
        self.handles.insert(handle.clone(), player_id);
        self.players
            .insert(player_id, Player::new(player_id, handle, now, connection_key));

        if let Some(connection) = self.connections.get_mut(&connection_key) {
            connection.bound_player = Some(player_id);
        }
        Ok(player_id)
    }

    /// Rebinds `player_id` to `connection_key`, unbinding any prior
    /// connection for that player first.
    pub fn bind_reregister(
        &mut self,
        player_id: PlayerId,
        connection_key: ConnectionKey,
        now: DateTime<Utc>,
    ) -> Result<(), RequestError> {
        let Some(player) = self.players.get(&player_id) else {
            return Err(RequestError::InvalidPlayer);
        };
        if let Some(existing_key) = player.connection_key
            && existing_key != connection_key
            && self.connections.get(&existing_key).is_some_and(|c| c.alive)
        {
            // The spec names this failure ALREADY_CONNECTED, which is not in
            // the closed wire-reason set (section 7); NOT_AUTHORIZED is the
            // closest fit — a different connection already holds this
            // player id and this one has no claim to it.
            return Err(RequestError::NotAuthorized);
        }

        if let Some(prior_key) = player.connection_key
            && let Some(prior_connection) = self.connections.get_mut(&prior_key)
        {
            prior_connection.bound_player = None;
        }

        let player = self.players.get_mut(&player_id).expect("checked above");
        player.connection_key = Some(connection_key);
        player.connection_state = ConnectionState::Connected;
        player.touch(now);

        if let Some(connection) = self.connections.get_mut(&connection_key) {
            connection.bound_player = Some(player_id);
        }
        Ok(())
    }

    /// Removes a player entirely. Callers are responsible for first running
    /// the game cascade (`handlers::cascade`) so no game still references
    /// this player as occupying a seat.
    pub fn destroy_player(&mut self, player_id: PlayerId) {
        if let Some(player) = self.players.remove(&player_id) {
            self.handles.remove(&player.handle);
            if let Some(key) = player.connection_key
                && let Some(connection) = self.connections.get_mut(&key)
            {
                connection.bound_player = None;
            }
        }
    }

    // ---------------------------------------------------------------
    // Games
    // ---------------------------------------------------------------

    pub fn create_game(
        &mut self,
        advertiser: PlayerId,
        spec: GameSpec,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Result<GameId, RequestError> {
        if self.games.len() >= config.total_game_limit {
            return Err(RequestError::TotalGameLimit);
        }
        let in_progress = self.games.values().filter(|g| g.is_in_progress()).count();
        if in_progress >= config.in_progress_game_limit {
            return Err(RequestError::InProgressGameLimit);
        }
        let Some(advertiser_player) = self.players.get(&advertiser) else {
            return Err(RequestError::InvalidPlayer);
        };
        if advertiser_player.current_game.is_some() {
            return Err(RequestError::AlreadyPlaying);
        }
        if !(2..=4).contains(&spec.total_seats) {
            return Err(RequestError::InvalidRequest("total_seats must be 2..=4".into()));
        }

        let game_id = GameId::new();
        let mut seats: Vec<Seat> = Color::ALL[..spec.total_seats as usize]
            .iter()
            .map(|&color| Seat { color, occupant: Occupant::Empty, state: SeatState::Joined })
            .collect();
        seats[0].occupant = Occupant::Human(advertiser);
        seats[0].state = SeatState::Joined;

        let game = Game {
            game_id,
            name: spec.name,
            mode: spec.mode,
            total_seats: spec.total_seats,
            advertiser,
            visibility: spec.visibility,
            invited_handles: spec.invited_handles,
            advertised_at: now,
            started_at: None,
            completed_at: None,
            last_active: now,
            game_state: GameState::Advertised,
            activity_state: game::ActivityState::Active,
            completion_reason: None,
            completion_comment: None,
            seats,
            engine_state: None,
            current_turn: None,
        };
        self.games.insert(game_id, game);

        let player = self.players.get_mut(&advertiser).expect("checked above");
        player.current_game = Some(game_id);
        player.seat_color = Some(Color::ALL[0]);
        player.play_state = PlayState::Joined;
        player.touch(now);

        Ok(game_id)
    }

    pub fn join_game(&mut self, player_id: PlayerId, game_id: GameId, now: DateTime<Utc>) -> Result<Color, RequestError> {
        let Some(player) = self.players.get(&player_id) else {
            return Err(RequestError::InvalidPlayer);
        };
        if player.current_game.is_some() {
            return Err(RequestError::AlreadyPlaying);
        }
        let handle = player.handle.clone();

        let Some(game) = self.games.get_mut(&game_id) else {
            return Err(RequestError::InvalidGame);
        };
        if game.game_state != GameState::Advertised {
            return Err(RequestError::GameAlreadyStarted);
        }
        if game.visibility == protocol::Visibility::Private && !game.invited_handles.contains(&handle) {
            return Err(RequestError::NotInvited);
        }
        let Some(seat) = game.seats.iter_mut().find(|s| matches!(s.occupant, Occupant::Empty)) else {
            return Err(RequestError::NoSeats);
        };
        seat.occupant = Occupant::Human(player_id);
        seat.state = SeatState::Joined;
        let color = seat.color;
        game.last_active = now;

        let player = self.players.get_mut(&player_id).expect("checked above");
        player.current_game = Some(game_id);
        player.seat_color = Some(color);
        player.play_state = PlayState::Joined;
        player.touch(now);

        Ok(color)
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    pub fn player_by_handle(&self, handle: &str) -> Option<&Player> {
        self.handles.get(handle).and_then(|id| self.players.get(id))
    }

    pub fn connection_for_player(&self, player_id: PlayerId) -> Option<&Connection> {
        let player = self.players.get(&player_id)?;
        let key = player.connection_key?;
        self.connections.get(&key)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
