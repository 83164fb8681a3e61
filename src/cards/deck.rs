use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 52;

/// The two shared piles on the table: a face-down draw pile and a face-up
/// discard pile. Both are stacks whose top is the last element.
///
/// Drawing follows one rule everywhere (dealing, draws, penalties): when a
/// draw leaves exactly one card in the draw pile, every discard except the
/// current top is shuffled back into the draw pile.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    draw: Vec<Card>,
    discard: Vec<Card>,
}

impl Deck {
    /// A full shuffled 52-card draw pile and an empty discard pile.
    pub fn new() -> Self {
        let mut draw = Suit::all()
            .into_iter()
            .flat_map(|s| Rank::all().into_iter().map(move |r| Card::from((r, s))))
            .collect::<Vec<Card>>();
        draw.shuffle(&mut rand::rng());
        Self {
            draw,
            discard: Vec::new(),
        }
    }
    /// Piles in the given order, last element on top. No shuffling.
    pub fn stacked(draw: Vec<Card>, discard: Vec<Card>) -> Self {
        Self { draw, discard }
    }

    /// Top of the draw pile, without removing it.
    pub fn peek(&self) -> Option<Card> {
        self.draw.last().copied()
    }
    /// Top of the discard pile.
    pub fn top(&self) -> Option<Card> {
        self.discard.last().copied()
    }
    pub fn draw_size(&self) -> usize {
        self.draw.len()
    }
    pub fn discard_size(&self) -> usize {
        self.discard.len()
    }

    pub fn draw(&mut self) -> Option<Card> {
        if self.draw.is_empty() {
            self.reshuffle();
        }
        let card = self.draw.pop()?;
        if self.draw.len() == 1 {
            self.reshuffle();
        }
        Some(card)
    }
    /// Draws the card under the top of the draw pile, leaving the top in place.
    pub fn draw_beneath(&mut self) -> Option<Card> {
        let top = self.draw.pop()?;
        let card = self.draw();
        self.draw.push(top);
        card
    }
    /// Puts `card` on the discard pile. An empty draw pile is refilled
    /// from the discards underneath it.
    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
        if self.draw.is_empty() {
            self.reshuffle();
        }
    }
    /// Replaces the discard top with `card`, returning the old top.
    /// Does nothing if the discard pile is empty.
    pub fn exchange(&mut self, card: Card) -> Option<Card> {
        self.discard
            .last_mut()
            .map(|top| std::mem::replace(top, card))
    }

    fn reshuffle(&mut self) {
        if let Some(top) = self.discard.pop() {
            log::debug!("[deck] reshuffling {} discards", self.discard.len());
            self.draw.append(&mut self.discard);
            self.draw.shuffle(&mut rand::rng());
            self.discard.push(top);
        }
    }
}
