use super::*;
use std::collections::BTreeMap;

/// Score units. Lower is better.
pub type Points = i32;
/// Points keyed by user id.
pub type Scores = BTreeMap<String, Points>;

/// One outbound view produced by a game, with its addressee.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<V> {
    /// Delivered to one user only; skipped if they are not connected.
    Unicast(String, V),
    /// Delivered to every connected user.
    Broadcast(V),
    /// Delivered to every connected user, then the lobby folds the scores
    /// into its running totals and retires the game.
    Final(V, Scores),
}

/// Capability interface between a lobby and the game it hosts.
///
/// Implementations are plain synchronous state machines: the [`Runner`]
/// owns one, feeds it one command at a time and publishes whatever
/// [`Game::project`] returns after each accepted command.
pub trait Game: Send + Sized + 'static {
    type Command: Send + 'static;
    type View: serde::Serialize + Send + 'static;
    /// Creates a fresh game for the given lobby members.
    fn create(players: &[String]) -> Self;
    /// Most players a single game can seat.
    fn capacity() -> usize {
        usize::MAX
    }
    /// Validates a game-targeted client envelope into a typed command.
    fn decode(envelope: &Envelope) -> Result<Self::Command, ProtocolError>;
    /// Applies a command from `player`. Returns false for illegal moves,
    /// which must leave the game untouched.
    fn apply(&mut self, player: &str, command: Self::Command) -> bool;
    /// Derives every recipient's view of the current state.
    fn project(&self) -> Vec<Dispatch<Self::View>>;
    fn is_finished(&self) -> bool;
    /// Called after each publication to drop transient presentation state.
    fn flush(&mut self) {}
}
