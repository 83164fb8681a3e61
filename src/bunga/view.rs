use super::*;
use crate::cards::Card;
use crate::cards::Face;
use crate::cards::Highlight;
use crate::gameroom::Scores;
use serde::Serialize;
use std::collections::BTreeMap;

pub type Hands<T> = BTreeMap<String, Vec<T>>;

/// One recipient's picture of the table.
///
/// Hidden cards are never present in a view addressed to someone who may
/// not see them: every payload is built from the game state for exactly
/// one viewer, or for everyone once the round is over.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "Phase")]
pub enum View {
    #[serde(rename = "startGame", rename_all = "PascalCase")]
    Start {
        draw_pile: Face,
        discard_pile: Face,
        players_ready: BTreeMap<String, bool>,
        player_hands: Hands<Face>,
        player_order: Vec<String>,
    },
    #[serde(rename = "playing", rename_all = "PascalCase")]
    Playing {
        draw_pile: Face,
        discard_pile: Face,
        latest_action: Vec<Action>,
        turn: String,
        player_hands: Hands<Face>,
        said_bunga: String,
        player_order: Vec<String>,
        playing_state: PlayingState,
    },
    #[serde(rename = "endGame", rename_all = "PascalCase")]
    End {
        draw_pile: Face,
        discard_pile: Face,
        turn: String,
        player_hands: Hands<Card>,
        player_order: Vec<String>,
        scores: Scores,
        winner: String,
    },
}

impl View {
    /// What `viewer` may see while the round is running.
    pub fn of(game: &Bunga, viewer: Seat) -> Self {
        match game.state() {
            GameState::StartGame => Self::start(game, viewer),
            GameState::Playing => Self::playing(game, viewer),
            GameState::EndGame => Self::end(game),
        }
    }

    fn start(game: &Bunga, viewer: Seat) -> Self {
        let mut hands = (0..game.order().len())
            .map(|seat| backs(game, seat))
            .collect::<Vec<_>>();
        if !game.is_ready(viewer) {
            game.hand(viewer)
                .iter()
                .take(PEEK_SIZE)
                .enumerate()
                .for_each(|(i, card)| hands[viewer][i] = Face::from(*card).lit(Highlight::Primary));
        }
        Self::Start {
            draw_pile: Face::back(),
            discard_pile: Face::blank(),
            players_ready: game
                .order()
                .iter()
                .enumerate()
                .map(|(seat, p)| (p.clone(), game.is_ready(seat)))
                .collect(),
            player_hands: keyed(game, hands),
            player_order: game.order().to_vec(),
        }
    }

    fn playing(game: &Bunga, viewer: Seat) -> Self {
        let mut hands = (0..game.order().len())
            .map(|seat| backs(game, seat))
            .collect::<Vec<_>>();
        let mut draw = Face::back();
        let mut discard = Face::from(game.deck().top());
        if viewer == game.turn() {
            let state = game.playing();
            match state {
                PlayingState::StartTurn => {
                    draw = draw.lit(Highlight::Primary);
                    if discard.card().is_some() {
                        discard = discard.lit(Highlight::Primary);
                    }
                }
                PlayingState::DrawChoice => {
                    light(&mut hands[viewer]);
                    draw = Face::from(game.deck().peek());
                    discard = discard.lit(Highlight::Primary);
                }
                PlayingState::DiscardSwapChoice
                | PlayingState::LookOwnChoice
                | PlayingState::LookingOwn
                | PlayingState::SwapOtherOwnChoice
                | PlayingState::LookSwapOwnChoice => light(&mut hands[viewer]),
                _ => {}
            }
            if state.targets_others() {
                game.targets().for_each(|seat| light(&mut hands[seat]));
            }
            let selected = game.selected();
            match state {
                PlayingState::LookingOwn => {
                    let own = game.hand(viewer);
                    if let Some(i) = selected.and_then(|c| own.iter().position(|o| *o == c)) {
                        hands[viewer][i] = Face::from(own[i]).lit(Highlight::Primary);
                    }
                }
                PlayingState::LookingOther | PlayingState::LookSwapOwnChoice => {
                    if let Some((seat, i)) = selected.and_then(|c| game.locate(c, viewer)) {
                        hands[seat][i] = Face::from(game.hand(seat)[i]).lit(Highlight::Primary);
                    }
                }
                PlayingState::SwapOtherOwnChoice => {
                    if let Some((seat, i)) = selected.and_then(|c| game.locate(c, viewer)) {
                        hands[seat][i] = Face::back().lit(Highlight::Secondary);
                    }
                }
                _ => {}
            }
        }
        Self::Playing {
            draw_pile: draw,
            discard_pile: discard,
            latest_action: game.actions().to_vec(),
            turn: game.order()[game.turn()].clone(),
            player_hands: keyed(game, hands),
            said_bunga: game
                .caller()
                .map(|seat| game.order()[seat].clone())
                .unwrap_or_default(),
            player_order: game.order().to_vec(),
            playing_state: game.playing(),
        }
    }

    /// Everything face up, for everyone.
    pub fn end(game: &Bunga) -> Self {
        let order = game.order();
        Self::End {
            draw_pile: Face::back(),
            discard_pile: Face::from(game.deck().top()),
            turn: "final".to_string(),
            player_hands: keyed(
                game,
                (0..order.len()).map(|seat| game.hand(seat).to_vec()).collect(),
            ),
            player_order: order.to_vec(),
            scores: order
                .iter()
                .cloned()
                .zip(game.scores().iter().copied())
                .collect(),
            winner: game
                .winner()
                .map(|seat| order[seat].clone())
                .unwrap_or_default(),
        }
    }
}

fn backs(game: &Bunga, seat: Seat) -> Vec<Face> {
    let back = match game.caller() == Some(seat) {
        true => Face::back().lit(Highlight::Caller),
        false => Face::back(),
    };
    vec![back; game.hand(seat).len()]
}

fn light(hand: &mut [Face]) {
    hand.iter_mut().for_each(|f| *f = f.lit(Highlight::Primary));
}

fn keyed<T>(game: &Bunga, hands: Vec<Vec<T>>) -> Hands<T> {
    game.order().iter().cloned().zip(hands).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameroom::Dispatch;
    use crate::gameroom::Game;
    use serde_json::Value;
    use serde_json::json;

    fn click(owner: &str, index: usize) -> Command {
        Command::Card {
            owner: owner.to_string(),
            index,
        }
    }

    fn table(draw: &str, discard: &str) -> Bunga {
        Bunga::stacked(
            &["alice", "bob", "carol"],
            &["2C 3C 4C 5C", "2D 3D 4D 5D", "2H 3H 4H 5H"],
            draw,
            discard,
        )
    }

    fn view(game: &Bunga, seat: Seat) -> Value {
        serde_json::to_value(View::of(game, seat)).unwrap()
    }

    /// Card codes present anywhere in a serialized view.
    fn codes(value: &Value) -> Vec<String> {
        match value {
            Value::String(s) if s.len() >= 2 && Card::try_from(&s[..2]).is_ok() => {
                vec![s[..2].to_string()]
            }
            Value::Array(items) => items.iter().flat_map(codes).collect(),
            Value::Object(map) => map.values().flat_map(codes).collect(),
            _ => vec![],
        }
    }

    #[test]
    fn start_phase_shows_first_two_own_cards() {
        let mut game = Bunga::create(&["a".to_string(), "b".to_string()]);
        let a = game.seat("a").unwrap();
        let b = game.seat("b").unwrap();
        let json = view(&game, a);
        assert_eq!(json["Phase"], "startGame");
        assert_eq!(json["DrawPile"], "1B");
        assert_eq!(json["DiscardPile"], "2B");
        assert_eq!(json["PlayersReady"], json!({"a": false, "b": false}));
        let own = game.hand(a);
        assert_eq!(
            json["PlayerHands"]["a"],
            json!([format!("{}p", own[0]), format!("{}p", own[1]), "1B", "1B"])
        );
        assert_eq!(json["PlayerHands"]["b"], json!(["1B", "1B", "1B", "1B"]));
        game.apply("a", click("a", 0));
        let json = view(&game, a);
        assert_eq!(json["PlayerHands"]["a"], json!(["1B", "1B", "1B", "1B"]));
        assert_eq!(json["PlayersReady"]["a"], true);
        assert!(codes(&view(&game, b)).len() == 2);
    }

    #[test]
    fn idle_viewers_see_only_the_discard_top() {
        let mut game = table("6H 7H 8H", "9D");
        game.apply("alice", Command::Draw);
        let json = view(&game, 1);
        assert_eq!(json["Phase"], "playing");
        assert_eq!(json["Turn"], "alice");
        assert_eq!(json["PlayingState"], "drawChoice");
        assert_eq!(json["DrawPile"], "1B");
        assert_eq!(codes(&json), vec!["9D".to_string()]);
    }

    #[test]
    fn empty_discard_is_never_lit() {
        let game = table("6H 7H 8H", "");
        let json = view(&game, 0);
        assert_eq!(json["DrawPile"], "1Bp");
        assert_eq!(json["DiscardPile"], "2B");
    }

    #[test]
    fn acting_viewer_sees_held_card() {
        let mut game = table("6H 7H 8H", "9D");
        let json = view(&game, 0);
        assert_eq!(json["DrawPile"], "1Bp");
        assert_eq!(json["DiscardPile"], "9Dp");
        game.apply("alice", Command::Draw);
        let json = view(&game, 0);
        assert_eq!(json["DrawPile"], "8H");
        assert_eq!(json["DiscardPile"], "9Dp");
        assert_eq!(json["PlayerHands"]["alice"], json!(["1Bp", "1Bp", "1Bp", "1Bp"]));
        assert_eq!(json["PlayerHands"]["bob"], json!(["1B", "1B", "1B", "1B"]));
    }

    #[test]
    fn looking_other_reveals_only_to_actor() {
        let mut game = table("6H 7H 9S", "9D");
        game.apply("alice", Command::Draw);
        game.apply("alice", Command::Discard);
        game.apply("alice", click("bob", 1));
        let json = view(&game, 0);
        assert_eq!(json["PlayerHands"]["bob"], json!(["1Bp", "3Dp", "1Bp", "1Bp"]));
        assert_eq!(json["PlayerHands"]["carol"], json!(["1Bp", "1Bp", "1Bp", "1Bp"]));
        assert_eq!(json["PlayerHands"]["alice"], json!(["1B", "1B", "1B", "1B"]));
        assert_eq!(codes(&view(&game, 1)), vec!["9S".to_string()]);
        assert_eq!(codes(&view(&game, 2)), vec!["9S".to_string()]);
    }

    #[test]
    fn looking_own_reveals_selected() {
        let mut game = table("6H 7H 8S", "9D");
        game.apply("alice", Command::Draw);
        game.apply("alice", Command::Discard);
        game.apply("alice", click("alice", 2));
        let json = view(&game, 0);
        assert_eq!(json["PlayerHands"]["alice"], json!(["1Bp", "1Bp", "4Cp", "1Bp"]));
        assert_eq!(codes(&view(&game, 1)), vec!["8S".to_string()]);
    }

    #[test]
    fn swap_choice_marks_selection() {
        let mut game = table("6H 7H JS", "9D").with_caller(2);
        game.apply("alice", Command::Draw);
        game.apply("alice", Command::Discard);
        let json = view(&game, 0);
        assert_eq!(json["PlayerHands"]["bob"], json!(["1Bp", "1Bp", "1Bp", "1Bp"]));
        assert_eq!(json["PlayerHands"]["carol"], json!(["1Bb", "1Bb", "1Bb", "1Bb"]));
        game.apply("alice", click("bob", 2));
        let json = view(&game, 0);
        assert_eq!(json["PlayerHands"]["bob"], json!(["1B", "1B", "1Bs", "1B"]));
        assert_eq!(json["PlayerHands"]["alice"], json!(["1Bp", "1Bp", "1Bp", "1Bp"]));
        assert_eq!(json["SaidBunga"], "carol");
        assert_eq!(codes(&json), vec!["JS".to_string()]);
    }

    #[test]
    fn actions_serialize_then_flush() {
        let mut game = table("6H 7H 8H", "9D");
        game.apply("alice", Command::Draw);
        game.apply("alice", click("alice", 1));
        let json = view(&game, 2);
        assert_eq!(
            json["LatestAction"],
            json!([
                {"Start": "draw", "StartIdx": "", "End": "alice", "EndIdx": "1", "Card": ""},
                {"Start": "alice", "StartIdx": "1", "End": "discard", "EndIdx": "", "Card": ""},
            ])
        );
        game.flush();
        assert_eq!(view(&game, 2)["LatestAction"], json!([]));
    }

    #[test]
    fn every_player_gets_a_private_view() {
        let game = table("6H 7H 8H", "9D");
        let dispatches = game.project();
        assert_eq!(dispatches.len(), 3);
        for dispatch in dispatches {
            match dispatch {
                Dispatch::Unicast(player, view) => {
                    let json = serde_json::to_value(view).unwrap();
                    assert_eq!(codes(&json), vec!["9D".to_string()], "{}", player);
                }
                _ => panic!("expected unicast"),
            }
        }
    }

    #[test]
    fn final_view_reveals_everything() {
        let mut game = Bunga::stacked(
            &["alice", "bob"],
            &["2H KS QD AC", "KH 3D"],
            "6H 7H 8H",
            "9D",
        );
        game.apply("alice", Command::Bunga);
        game.apply("bob", Command::Draw);
        game.apply("bob", click("bob", 1));
        assert!(game.is_finished());
        let json = serde_json::to_value(View::end(&game)).unwrap();
        assert_eq!(json["Phase"], "endGame");
        assert_eq!(json["Turn"], "final");
        assert_eq!(json["PlayerHands"]["alice"], json!(["2H", "KS", "QD", "AC"]));
        assert_eq!(json["PlayerHands"]["bob"], json!(["KH", "8H"]));
        assert_eq!(json["DiscardPile"], "3D");
        assert_eq!(json["Scores"], json!({"alice": 47, "bob": 7}));
        assert_eq!(json["Winner"], "bob");
    }
}
