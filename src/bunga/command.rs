use crate::gameroom::Envelope;
use crate::gameroom::ProtocolError;

/// A game-targeted client request. The acting player is always the
/// connection's user id, never anything the client claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pick up the top of the draw pile.
    Draw,
    /// Take the discard top (start of turn) or discard the held card.
    Discard,
    /// Call the end of the round.
    Bunga,
    /// Click on `owner`'s card at `index`.
    Card { owner: String, index: usize },
}

impl TryFrom<&Envelope> for Command {
    type Error = ProtocolError;
    fn try_from(envelope: &Envelope) -> Result<Self, Self::Error> {
        match envelope.cmd.as_str() {
            "draw" => Ok(Self::Draw),
            "discard" => Ok(Self::Discard),
            "bunga" => Ok(Self::Bunga),
            "card" => Ok(Self::Card {
                owner: envelope.arg("owner")?.to_string(),
                index: envelope.index("index")?,
            }),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}
