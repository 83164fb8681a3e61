use super::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// Errors that can occur while decoding client messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Malformed(String),
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidArgument(&'static str, String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed message: {}", s),
            Self::UnknownCommand(s) => write!(f, "unknown command: {}", s),
            Self::MissingArgument(k) => write!(f, "missing argument: {}", k),
            Self::InvalidArgument(k, v) => write!(f, "invalid argument {}: {}", k, v),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Which side of a lobby a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Lobby,
    Game,
}

/// Raw client envelope: `{"target": ..., "cmd": ..., "args": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub target: Target,
    pub cmd: String,
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl Envelope {
    pub fn arg(&self, key: &'static str) -> Result<&str, ProtocolError> {
        self.args
            .get(key)
            .map(String::as_str)
            .ok_or(ProtocolError::MissingArgument(key))
    }
    pub fn index(&self, key: &'static str) -> Result<usize, ProtocolError> {
        let raw = self.arg(key)?;
        raw.trim()
            .parse::<usize>()
            .map_err(|_| ProtocolError::InvalidArgument(key, raw.to_string()))
    }
}

/// Commands addressed to the lobby itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyCommand {
    StartGame,
    QuitGame,
    BackToLobby,
}

impl TryFrom<&str> for LobbyCommand {
    type Error = ProtocolError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "startGame" => Ok(Self::StartGame),
            "quitGame" => Ok(Self::QuitGame),
            "backToLobby" => Ok(Self::BackToLobby),
            _ => Err(ProtocolError::UnknownCommand(s.to_string())),
        }
    }
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<C> {
    Lobby(LobbyCommand),
    Game(C),
}

/// Server envelope: `{"Target": ..., "State": ...}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Outbound<'a, S> {
    target: Target,
    state: &'a S,
}

/// Converts between wire text and typed requests/payloads.
pub struct Protocol;

impl Protocol {
    /// Parses a client text frame into a typed request for game `G`.
    pub fn decode<G: Game>(text: &str) -> Result<Request<G::Command>, ProtocolError> {
        let envelope = serde_json::from_str::<Envelope>(text)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        match envelope.target {
            Target::Lobby => LobbyCommand::try_from(envelope.cmd.as_str()).map(Request::Lobby),
            Target::Game => G::decode(&envelope).map(Request::Game),
        }
    }
    /// Wraps a payload in the server envelope.
    pub fn encode<S: Serialize>(target: Target, state: &S) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Outbound { target, state })
    }
}
