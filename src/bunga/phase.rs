use serde::Serialize;

/// Top-level lifecycle of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    /// Players peek at their first two cards and click one to ready up.
    StartGame,
    Playing,
    /// Scores are final; nothing further is accepted.
    EndGame,
}

/// Sub-state of the acting player's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayingState {
    StartTurn,
    DiscardSwapChoice,
    DrawChoice,
    LookOwnChoice,
    LookingOwn,
    LookOtherChoice,
    LookingOther,
    SwapOtherChoice,
    SwapOtherOwnChoice,
    LookSwapChoice,
    LookSwapOwnChoice,
}

impl PlayingState {
    /// States in which the acting player's own card clicks are moves, not tags.
    pub fn blocks_tagging(&self) -> bool {
        matches!(
            self,
            Self::DiscardSwapChoice
                | Self::DrawChoice
                | Self::LookOwnChoice
                | Self::LookingOwn
                | Self::SwapOtherOwnChoice
                | Self::LookSwapOwnChoice
        )
    }
    /// States whose next click targets another player's hand.
    pub fn targets_others(&self) -> bool {
        matches!(
            self,
            Self::LookOtherChoice
                | Self::LookingOther
                | Self::SwapOtherChoice
                | Self::LookSwapChoice
                | Self::LookSwapOwnChoice
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&PlayingState::SwapOtherOwnChoice).unwrap(),
            r#""swapOtherOwnChoice""#
        );
        assert_eq!(
            serde_json::to_string(&GameState::StartGame).unwrap(),
            r#""startGame""#
        );
    }

    #[test]
    fn tagging_windows() {
        assert!(!PlayingState::StartTurn.blocks_tagging());
        assert!(!PlayingState::LookOtherChoice.blocks_tagging());
        assert!(PlayingState::DrawChoice.blocks_tagging());
        assert!(PlayingState::LookSwapOwnChoice.blocks_tagging());
    }
}
