use crate::cards::Card;
use crate::cards::Rank;
use crate::gameroom::Points;

/// Penalty added to a caller who ends the round on this many points or more.
pub const CALLER_THRESHOLD: Points = 10;
pub const CALLER_PENALTY: Points = 10;

/// Point value of a single card.
pub fn points(card: Card) -> Points {
    match card.rank() {
        Rank::Ace => 0,
        Rank::Ten | Rank::Jack | Rank::Queen => 10,
        Rank::King if card.suit().is_red() => -1,
        Rank::King => 25,
        rank => u8::from(rank) as Points + 2,
    }
}

/// Sum of a hand.
pub fn total(hand: &[Card]) -> Points {
    hand.iter().copied().map(points).sum()
}

/// Round scores in seat order, including the caller penalty.
pub fn tally(hands: &[Vec<Card>], caller: Option<usize>) -> Vec<Points> {
    let mut scores = hands.iter().map(|h| total(h)).collect::<Vec<Points>>();
    if let Some(score) = caller.and_then(|c| scores.get_mut(c)) {
        if *score >= CALLER_THRESHOLD {
            *score += CALLER_PENALTY;
        }
    }
    scores
}

/// Seat with the strictly lowest score; ties go to the earliest seat.
pub fn winner(scores: &[Points]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, Points)>, (seat, &score)| match best {
            Some((_, low)) if low <= score => best,
            _ => Some((seat, score)),
        })
        .map(|(seat, _)| seat)
}
