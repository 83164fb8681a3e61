use super::*;
use crate::cards::Card;
use crate::cards::DECK_SIZE;
use crate::cards::Deck;
use crate::cards::Face;
use crate::cards::Rank;
use crate::gameroom::Dispatch;
use crate::gameroom::Envelope;
use crate::gameroom::Game;
use crate::gameroom::Points;
use crate::gameroom::ProtocolError;
use crate::gameroom::Scores;
use rand::seq::SliceRandom;

/// Position in the player order.
pub type Seat = usize;

pub const HAND_SIZE: usize = 4;
/// Cards each player may memorize before the round starts.
pub const PEEK_SIZE: usize = 2;

/// One round of Bunga.
///
/// Pure synchronous state machine: every mutation comes through
/// [`Game::apply`], and every client-visible payload is derived from
/// scratch by [`Game::project`]. Cards are conserved: draw pile, discard
/// pile and all hands always hold exactly the 52 cards of the deck.
#[derive(Debug, Clone)]
pub struct Bunga {
    deck: Deck,
    order: Vec<String>,
    hands: Vec<Vec<Card>>,
    ready: Vec<bool>,
    turn: Seat,
    caller: Option<Seat>,
    state: GameState,
    playing: PlayingState,
    selected: Option<Card>,
    latest_tag: Option<Card>,
    actions: Vec<Action>,
    scores: Vec<Points>,
}

/// A validated click on somebody's card.
#[derive(Debug, Clone, Copy)]
struct Click {
    owner: Seat,
    index: usize,
    card: Card,
}

impl Bunga {
    fn deal(deck: Deck, order: Vec<String>, hands: Vec<Vec<Card>>) -> Self {
        let n = order.len();
        Self {
            deck,
            order,
            hands,
            ready: vec![false; n],
            turn: 0,
            caller: None,
            state: GameState::StartGame,
            playing: PlayingState::StartTurn,
            selected: None,
            latest_tag: None,
            actions: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat]
    }
    pub fn is_ready(&self, seat: Seat) -> bool {
        self.ready[seat]
    }
    pub fn turn(&self) -> Seat {
        self.turn
    }
    pub fn caller(&self) -> Option<Seat> {
        self.caller
    }
    pub fn state(&self) -> GameState {
        self.state
    }
    pub fn playing(&self) -> PlayingState {
        self.playing
    }
    pub fn selected(&self) -> Option<Card> {
        self.selected
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
    /// Final round scores in seat order. Empty until the round ends.
    pub fn scores(&self) -> &[Points] {
        &self.scores
    }
    pub fn winner(&self) -> Option<Seat> {
        score::winner(&self.scores)
    }
    pub fn seat(&self, player: &str) -> Option<Seat> {
        self.order.iter().position(|p| p == player)
    }
    /// Where a card currently sits in another player's hand, if anywhere.
    pub fn locate(&self, card: Card, except: Seat) -> Option<(Seat, usize)> {
        self.hands
            .iter()
            .enumerate()
            .filter(|(seat, _)| *seat != except)
            .find_map(|(seat, hand)| hand.iter().position(|c| *c == card).map(|i| (seat, i)))
    }
    /// Seats the acting player may target with look and swap effects.
    pub fn targets(&self) -> impl Iterator<Item = Seat> + '_ {
        (0..self.order.len()).filter(move |s| *s != self.turn && Some(*s) != self.caller)
    }
}

impl Bunga {
    fn ready_up(&mut self, actor: Seat, command: Command) -> bool {
        let Command::Card { owner, index } = command else {
            return false;
        };
        if owner != self.order[actor] || index >= PEEK_SIZE.min(self.hands[actor].len()) {
            return false;
        }
        if std::mem::replace(&mut self.ready[actor], true) {
            return false;
        }
        log::debug!("[bunga] {} is ready", self.order[actor]);
        if self.ready.iter().all(|r| *r) {
            log::info!("[bunga] everyone is ready");
            self.state = GameState::Playing;
            self.playing = PlayingState::StartTurn;
            self.turn = 0;
        }
        true
    }

    fn play(&mut self, actor: Seat, command: Command) -> bool {
        let click = match command {
            Command::Card { ref owner, index } => match self.click(owner, index) {
                Some(click) => Some(click),
                None => return false,
            },
            _ => None,
        };
        let own = click.filter(|c| c.owner == actor);
        let other = click.filter(|c| c.owner != actor && Some(c.owner) != self.caller);
        if let Some(click) = own {
            if actor != self.turn || !self.playing.blocks_tagging() {
                return self.tag(actor, click);
            }
        }
        if actor != self.turn {
            return false;
        }
        match (self.playing, command) {
            (PlayingState::StartTurn, Command::Draw) if self.deck.peek().is_some() => {
                self.playing = PlayingState::DrawChoice;
            }
            (PlayingState::StartTurn, Command::Discard) if self.deck.top().is_some() => {
                self.playing = PlayingState::DiscardSwapChoice;
            }
            (PlayingState::StartTurn, Command::Bunga) if self.caller.is_none() => {
                log::info!("[bunga] {} called bunga", self.order[actor]);
                self.caller = Some(actor);
                self.advance();
            }
            (PlayingState::DrawChoice, Command::Discard) => {
                let Some(card) = self.deck.draw() else {
                    return false;
                };
                self.deck.discard(card);
                self.latest_tag = None;
                self.actions.push(Action::new(Spot::Draw, Spot::Discard));
                self.route(card);
            }
            (PlayingState::DrawChoice, Command::Card { .. }) => {
                let Some(Click { index, card, .. }) = own else {
                    return false;
                };
                let Some(drawn) = self.deck.draw() else {
                    return false;
                };
                self.hands[actor][index] = drawn;
                self.deck.discard(card);
                self.latest_tag = None;
                let slot = Spot::Hand(self.order[actor].clone(), index);
                self.actions.push(Action::new(Spot::Draw, slot.clone()));
                self.actions.push(Action::new(slot, Spot::Discard));
                self.advance();
            }
            (PlayingState::DiscardSwapChoice, Command::Card { .. }) => {
                let Some(Click { index, card, .. }) = own else {
                    return false;
                };
                let Some(top) = self.deck.exchange(card) else {
                    return false;
                };
                self.hands[actor][index] = top;
                self.latest_tag = None;
                let slot = Spot::Hand(self.order[actor].clone(), index);
                self.actions.push(Action::new(Spot::Discard, slot.clone()));
                self.actions.push(Action::new(slot, Spot::Discard));
                self.advance();
            }
            (PlayingState::LookOwnChoice, Command::Card { .. }) if own.is_some() => {
                self.selected = own.map(|c| c.card);
                self.playing = PlayingState::LookingOwn;
            }
            (PlayingState::LookingOwn, Command::Card { .. }) if own.is_some() => {
                self.advance();
            }
            (PlayingState::LookOtherChoice, Command::Card { .. }) if other.is_some() => {
                self.selected = other.map(|c| c.card);
                self.playing = PlayingState::LookingOther;
            }
            (PlayingState::LookingOther, Command::Card { .. }) if other.is_some() => {
                self.advance();
            }
            (PlayingState::SwapOtherChoice, Command::Card { .. }) if other.is_some() => {
                self.selected = other.map(|c| c.card);
                self.playing = PlayingState::SwapOtherOwnChoice;
            }
            (PlayingState::SwapOtherOwnChoice, Command::Card { .. }) if own.is_some() => {
                self.swap(actor, own.map(|c| c.index).unwrap_or_default());
                self.advance();
            }
            (PlayingState::LookSwapChoice, Command::Card { .. }) if other.is_some() => {
                self.selected = other.map(|c| c.card);
                self.playing = PlayingState::LookSwapOwnChoice;
            }
            (PlayingState::LookSwapOwnChoice, Command::Card { .. }) if other.is_some() => {
                self.advance();
            }
            (PlayingState::LookSwapOwnChoice, Command::Card { .. }) if own.is_some() => {
                self.swap(actor, own.map(|c| c.index).unwrap_or_default());
                self.advance();
            }
            _ => return false,
        }
        true
    }

    fn click(&self, owner: &str, index: usize) -> Option<Click> {
        let seat = self.seat(owner)?;
        let card = self.hands[seat].get(index).copied()?;
        Some(Click {
            owner: seat,
            index,
            card,
        })
    }

    /// Attempts to throw a matching card onto the discard pile out of turn.
    fn tag(&mut self, tagger: Seat, click: Click) -> bool {
        if self.hands[tagger].len() <= 1 || Some(tagger) == self.caller {
            return false;
        }
        let top = self.deck.top();
        let matching = top.is_some_and(|t| t.rank() == click.card.rank());
        let chained = top.is_some() && top == self.latest_tag;
        let player = self.order[tagger].clone();
        if matching && !chained {
            log::debug!("[bunga] {} tagged {}", player, click.card);
            self.hands[tagger].remove(click.index);
            self.deck.discard(click.card);
            self.latest_tag = Some(click.card);
            self.actions
                .push(Action::new(Spot::Hand(player, click.index), Spot::Discard));
        } else {
            let penalty = match self.playing {
                PlayingState::DrawChoice => self.deck.draw_beneath(),
                _ => self.deck.draw(),
            };
            let Some(penalty) = penalty else {
                log::warn!("[bunga] no card left to penalize {}", player);
                return false;
            };
            log::debug!("[bunga] {} mistagged {}", player, click.card);
            self.hands[tagger].push(penalty);
            let slot = self.hands[tagger].len() - 1;
            self.actions.push(Action::new(
                Spot::Hand(player.clone(), click.index),
                Spot::Discard,
            ));
            self.actions
                .push(Action::new(Spot::Discard, Spot::Discard).showing(Face::wrong()));
            self.actions
                .push(Action::new(Spot::Draw, Spot::Hand(player, slot)));
        }
        true
    }

    /// Blind swap of the acting player's card with the selected card,
    /// wherever that card sits now.
    fn swap(&mut self, actor: Seat, index: usize) {
        let Some((owner, i)) = self.selected.and_then(|card| self.locate(card, actor)) else {
            log::debug!("[bunga] selected card is gone, no swap");
            return;
        };
        let mine = self.hands[actor][index];
        self.hands[actor][index] = std::mem::replace(&mut self.hands[owner][i], mine);
        let a = Spot::Hand(self.order[actor].clone(), index);
        let b = Spot::Hand(self.order[owner].clone(), i);
        self.actions.push(Action::new(a.clone(), b.clone()));
        self.actions.push(Action::new(b, a));
    }

    /// Decides what the discarded drawn card lets the acting player do.
    fn route(&mut self, card: Card) {
        let others = self.order.len() - 1;
        let muted = self.order.len() <= 2 && self.caller.is_some();
        let effect = match card.rank() {
            Rank::Seven | Rank::Eight => Some(PlayingState::LookOwnChoice),
            Rank::Nine | Rank::Ten if !muted && others >= 2 => Some(PlayingState::LookOtherChoice),
            Rank::Nine | Rank::Ten if !muted => Some(PlayingState::LookOwnChoice),
            Rank::Jack if !muted && others > 0 => Some(PlayingState::SwapOtherChoice),
            Rank::Queen if !muted && others > 0 => Some(PlayingState::LookSwapChoice),
            _ => None,
        };
        match effect {
            Some(playing) => self.playing = playing,
            None => self.advance(),
        }
    }

    fn advance(&mut self) {
        self.selected = None;
        self.playing = PlayingState::StartTurn;
        self.turn = (self.turn + 1) % self.order.len();
        if Some(self.turn) == self.caller {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.state = GameState::EndGame;
        self.scores = score::tally(&self.hands, self.caller);
        log::info!("[bunga] round over: {:?}", self.tally());
    }

    fn tally(&self) -> Scores {
        self.order
            .iter()
            .cloned()
            .zip(self.scores.iter().copied())
            .collect()
    }
}

impl Game for Bunga {
    type Command = Command;
    type View = View;

    fn create(players: &[String]) -> Self {
        let mut order = players.to_vec();
        order.shuffle(&mut rand::rng());
        let mut deck = Deck::new();
        let hands = order
            .iter()
            .map(|_| (0..HAND_SIZE).filter_map(|_| deck.draw()).collect())
            .collect();
        log::info!("[bunga] dealt to {:?}", order);
        Self::deal(deck, order, hands)
    }

    fn capacity() -> usize {
        DECK_SIZE / HAND_SIZE
    }

    fn decode(envelope: &Envelope) -> Result<Command, ProtocolError> {
        Command::try_from(envelope)
    }

    fn apply(&mut self, player: &str, command: Command) -> bool {
        let Some(actor) = self.seat(player) else {
            log::debug!("[bunga] {} is not playing", player);
            return false;
        };
        match self.state {
            GameState::StartGame => self.ready_up(actor, command),
            GameState::Playing => self.play(actor, command),
            GameState::EndGame => false,
        }
    }

    fn project(&self) -> Vec<Dispatch<View>> {
        match self.state {
            GameState::EndGame => vec![Dispatch::Final(View::end(self), self.tally())],
            _ => (0..self.order.len())
                .map(|seat| Dispatch::Unicast(self.order[seat].clone(), View::of(self, seat)))
                .collect(),
        }
    }

    fn is_finished(&self) -> bool {
        self.state == GameState::EndGame
    }

    fn flush(&mut self) {
        self.actions.clear();
    }
}

#[cfg(test)]
impl Bunga {
    /// A round already in play, with known hands and piles.
    /// `hands` are in seat order; piles list their top card last.
    pub(crate) fn stacked(order: &[&str], hands: &[&str], draw: &str, discard: &str) -> Self {
        let cards = |s: &str| Card::parse(s).unwrap();
        let deck = Deck::stacked(cards(draw), cards(discard));
        let order = order.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        let hands = hands.iter().map(|h| cards(h)).collect();
        let mut game = Self::deal(deck, order, hands);
        game.ready.iter_mut().for_each(|r| *r = true);
        game.state = GameState::Playing;
        game
    }
    pub(crate) fn with_caller(mut self, seat: Seat) -> Self {
        self.caller = Some(seat);
        self
    }
}
