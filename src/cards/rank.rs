/// Card rank, ordered from Two up to Ace.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Rank {
    #[default]
    Two = 0,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// Wire symbols, indexed by rank.
const SYMBOLS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

impl Rank {
    pub const fn all() -> [Self; 13] {
        use Rank::*;
        [
            Two, Three, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
        ]
    }
}

/// u8 isomorphism
impl From<u8> for Rank {
    fn from(n: u8) -> Rank {
        match Self::all().get(n as usize) {
            Some(rank) => *rank,
            None => panic!("Invalid rank u8: {}", n),
        }
    }
}
impl From<Rank> for u8 {
    fn from(r: Rank) -> u8 {
        r as u8
    }
}

/// char isomorphism
impl TryFrom<char> for Rank {
    type Error = String;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        SYMBOLS
            .iter()
            .position(|s| *s == c)
            .map(|i| Rank::from(i as u8))
            .ok_or_else(|| format!("invalid rank: {}", c))
    }
}
impl From<Rank> for char {
    fn from(r: Rank) -> char {
        SYMBOLS[r as usize]
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u8() {
        for rank in Rank::all() {
            assert_eq!(Rank::from(u8::from(rank)), rank);
        }
    }

    #[test]
    fn bijective_char() {
        for rank in Rank::all() {
            assert_eq!(Rank::try_from(char::from(rank)), Ok(rank));
        }
        assert_eq!(Rank::try_from('T'), Ok(Rank::Ten));
    }

    #[test]
    fn rejects_lowercase() {
        assert!(Rank::try_from('t').is_err());
        assert!(Rank::try_from('1').is_err());
    }
}
