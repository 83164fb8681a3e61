use super::*;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::sync::mpsc::*;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Everything users (via their transport workers) can tell a lobby.
#[derive(Debug)]
pub enum Event {
    /// A new connection. Replaces any existing connection with the same user id.
    Join(User),
    /// A connection ended. Ignored if `conn` is no longer the user's current one.
    Leave { user: String, conn: Connection },
    /// A raw text frame from a user.
    Message { user: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Lobby,
    Game,
}

/// The lobby-wide payload every member sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LobbyState {
    pub status: Status,
    pub players: Vec<String>,
    pub scores: Scores,
}

impl Default for LobbyState {
    fn default() -> Self {
        Self {
            status: Status::Lobby,
            players: Vec::new(),
            scores: Scores::new(),
        }
    }
}

/// The game a lobby is currently hosting.
struct Hosted<C> {
    generation: u64,
    inbox: UnboundedSender<Signal<C>>,
}

impl<C> Hosted<C> {
    fn signal(&self, signal: Signal<C>) {
        if self.inbox.send(signal).is_err() {
            log::debug!("[game {}] already stopped", self.generation);
        }
    }
}

/// Session actor for one named lobby.
///
/// Owns the connected users and at most one running game, and handles one
/// event at a time from three sources: its inbox (joins, leaves, messages),
/// the dispatches of its game, and an idle watchdog. No state is shared with
/// other tasks, so nothing here needs a lock.
pub struct Lobby<G: Game> {
    name: String,
    state: LobbyState,
    users: HashMap<String, User>,
    game: Option<Hosted<G::Command>>,
    /// A game told to quit whose final scores may still be in flight.
    retired: Option<u64>,
    generation: u64,
    idle: Duration,
    inbox: UnboundedReceiver<Event>,
    dispatches: UnboundedReceiver<(u64, Dispatch<G::View>)>,
    publisher: UnboundedSender<(u64, Dispatch<G::View>)>,
    done: Option<oneshot::Sender<()>>,
    marker: PhantomData<G>,
}

impl<G: Game> Lobby<G> {
    /// Spawns the lobby task. `done` fires exactly once, when the lobby shuts down.
    pub fn spawn(name: &str, idle: Duration, done: oneshot::Sender<()>) -> UnboundedSender<Event> {
        let (tx, rx) = unbounded_channel();
        let (publisher, dispatches) = unbounded_channel();
        let lobby = Self {
            name: name.to_string(),
            state: LobbyState::default(),
            users: HashMap::new(),
            game: None,
            retired: None,
            generation: 0,
            idle,
            inbox: rx,
            dispatches,
            publisher,
            done: Some(done),
            marker: PhantomData,
        };
        tokio::spawn(lobby.run());
        tx
    }

    async fn run(mut self) {
        log::info!("[lobby {}] open", self.name);
        let mut watchdog = tokio::time::interval_at(Instant::now() + self.idle, self.idle);
        loop {
            tokio::select! {
                _ = watchdog.tick() => {
                    if self.users.is_empty() {
                        log::info!("[lobby {}] idle", self.name);
                        break;
                    }
                }
                event = self.inbox.recv() => match event {
                    Some(Event::Join(user)) => self.join(user),
                    Some(Event::Leave { user, conn }) => {
                        if self.leave(&user, conn) && self.users.is_empty() {
                            log::info!("[lobby {}] last user left", self.name);
                            break;
                        }
                    }
                    Some(Event::Message { user, text }) => self.handle(&user, &text),
                    None => break,
                },
                Some((generation, dispatch)) = self.dispatches.recv() => self.deliver(generation, dispatch),
            }
        }
        self.teardown();
    }
}

impl<G: Game> Lobby<G> {
    fn join(&mut self, user: User) {
        let id = user.id().to_string();
        match self.users.insert(id.clone(), user) {
            Some(stale) => {
                log::info!("[lobby {}] {} reconnected", self.name, id);
                stale.hangup();
            }
            None => {
                log::info!("[lobby {}] {} joined", self.name, id);
                if !self.state.players.contains(&id) {
                    self.state.players.push(id.clone());
                }
                self.state.scores.entry(id).or_insert(0);
            }
        }
        self.broadcast_state();
        if let Some(ref game) = self.game {
            game.signal(Signal::Refresh);
        }
    }

    /// Returns true if a user was actually removed.
    fn leave(&mut self, id: &str, conn: Connection) -> bool {
        match self.users.get(id).map(User::conn) {
            Some(current) if current == conn => {
                log::info!("[lobby {}] {} left", self.name, id);
                if let Some(user) = self.users.remove(id) {
                    user.hangup();
                }
                self.state.players.retain(|p| p != id);
                self.state.scores.remove(id);
                self.broadcast_state();
                true
            }
            _ => {
                log::debug!("[lobby {}] stale disconnect {}#{}", self.name, id, conn);
                false
            }
        }
    }

    fn handle(&mut self, user: &str, text: &str) {
        if !self.users.contains_key(user) {
            log::debug!("[lobby {}] ignored message from non-member {}", self.name, user);
            return;
        }
        match Protocol::decode::<G>(text) {
            Err(e) => log::warn!("[lobby {}] dropped message from {}: {}", self.name, user, e),
            Ok(Request::Lobby(command)) => {
                log::debug!("[lobby {}] {} sent {:?}", self.name, user, command);
                match command {
                    LobbyCommand::StartGame => self.start_game(),
                    LobbyCommand::QuitGame => self.quit_game(None),
                    LobbyCommand::BackToLobby => {
                        self.quit_game(None);
                        self.state.status = Status::Lobby;
                    }
                }
                self.broadcast_state();
            }
            Ok(Request::Game(command)) => match self.game {
                Some(ref game) => game.signal(Signal::Command(user.to_string(), command)),
                None => log::debug!("[lobby {}] no game for {}", self.name, user),
            },
        }
    }

    fn start_game(&mut self) {
        if self.game.is_some() {
            log::warn!("[lobby {}] game already running", self.name);
            return;
        }
        if self.state.players.len() > G::capacity() {
            log::warn!(
                "[lobby {}] {} players exceed {} seats",
                self.name,
                self.state.players.len(),
                G::capacity()
            );
            return;
        }
        self.generation += 1;
        log::info!(
            "[lobby {}] starting game {} with {:?}",
            self.name,
            self.generation,
            self.state.players
        );
        let game = G::create(&self.state.players);
        let inbox = Runner::spawn(self.generation, game, self.publisher.clone());
        self.game = Some(Hosted {
            generation: self.generation,
            inbox,
        });
        self.state.status = Status::Game;
    }

    /// Stops the hosted game (if any), folds `scores` into the running totals
    /// and re-sorts players by total, lowest first.
    ///
    /// A stopped game may already have finished without the lobby having
    /// seen its final dispatch, so its generation stays eligible for scoring.
    fn quit_game(&mut self, scores: Option<Scores>) {
        if let Some(game) = self.game.take() {
            game.signal(Signal::Quit);
            self.retired = Some(game.generation);
        }
        self.fold(scores);
    }

    fn fold(&mut self, scores: Option<Scores>) {
        for (player, points) in scores.into_iter().flatten() {
            if let Some(total) = self.state.scores.get_mut(&player) {
                *total += points;
            }
        }
        let totals = &self.state.scores;
        self.state
            .players
            .sort_by_key(|p| totals.get(p).copied().unwrap_or_default());
    }

    fn deliver(&mut self, generation: u64, dispatch: Dispatch<G::View>) {
        if self.retired == Some(generation) {
            if let Dispatch::Final(_, scores) = dispatch {
                log::info!(
                    "[lobby {}] late scores from game {}: {:?}",
                    self.name,
                    generation,
                    scores
                );
                self.retired = None;
                self.fold(Some(scores));
                self.broadcast_state();
            }
            return;
        }
        if self.game.as_ref().map(|g| g.generation) != Some(generation) {
            log::debug!("[lobby {}] dropped dispatch from game {}", self.name, generation);
            return;
        }
        match dispatch {
            Dispatch::Unicast(player, ref view) => match self.users.get(&player) {
                Some(user) => {
                    if let Some(text) = self.encode(Target::Game, view) {
                        user.send(&text);
                    }
                }
                None => log::debug!("[lobby {}] {} not connected", self.name, player),
            },
            Dispatch::Broadcast(ref view) => self.broadcast(Target::Game, view),
            Dispatch::Final(ref view, scores) => {
                self.broadcast(Target::Game, view);
                log::info!("[lobby {}] game over: {:?}", self.name, scores);
                self.quit_game(Some(scores));
            }
        }
    }

    fn teardown(mut self) {
        log::info!("[lobby {}] closing", self.name);
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        if let Some(game) = self.game.take() {
            game.signal(Signal::Quit);
        }
        for (_, user) in self.users.drain() {
            user.hangup();
        }
    }
}

impl<G: Game> Lobby<G> {
    fn encode<S: Serialize>(&self, target: Target, state: &S) -> Option<String> {
        Protocol::encode(target, state)
            .inspect_err(|e| log::error!("[lobby {}] failed to encode: {}", self.name, e))
            .ok()
    }
    fn broadcast<S: Serialize>(&self, target: Target, state: &S) {
        if let Some(text) = self.encode(target, state) {
            self.users.values().for_each(|user| {
                user.send(&text);
            });
        }
    }
    fn broadcast_state(&self) {
        self.broadcast(Target::Lobby, &self.state);
    }
}
