use super::card::Card;

/// What a client is shown in a card slot.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Glyph {
    Card(Card),
    /// Face-down card.
    Back,
    /// Empty discard pile.
    Blank,
    /// Incorrect tag marker, only ever used inside animation actions.
    Wrong,
}

/// Rendering emphasis appended to a glyph. Purely cosmetic.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Highlight {
    Primary,
    Secondary,
    Caller,
}

/// A glyph plus an optional highlight, serialized as e.g. `"1B"`, `"1Bb"`, `"QHp"`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Face {
    glyph: Glyph,
    highlight: Option<Highlight>,
}

impl Face {
    pub fn back() -> Self {
        Self::from(Glyph::Back)
    }
    pub fn blank() -> Self {
        Self::from(Glyph::Blank)
    }
    pub fn wrong() -> Self {
        Self::from(Glyph::Wrong)
    }
    pub fn card(&self) -> Option<Card> {
        match self.glyph {
            Glyph::Card(card) => Some(card),
            _ => None,
        }
    }
    /// Replaces any existing highlight.
    pub fn lit(self, highlight: Highlight) -> Self {
        Self {
            highlight: Some(highlight),
            ..self
        }
    }
}

impl From<Glyph> for Face {
    fn from(glyph: Glyph) -> Self {
        Self {
            glyph,
            highlight: None,
        }
    }
}
impl From<Card> for Face {
    fn from(card: Card) -> Self {
        Self::from(Glyph::Card(card))
    }
}
impl From<Option<Card>> for Face {
    /// Top-of-pile rendering: a card, or blank when the pile is empty.
    fn from(card: Option<Card>) -> Self {
        card.map(Self::from).unwrap_or_else(Self::blank)
    }
}

impl std::fmt::Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Highlight::Primary => write!(f, "p"),
            Highlight::Secondary => write!(f, "s"),
            Highlight::Caller => write!(f, "b"),
        }
    }
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Glyph::Card(card) => write!(f, "{}", card),
            Glyph::Back => write!(f, "1B"),
            Glyph::Blank => write!(f, "2B"),
            Glyph::Wrong => write!(f, "X"),
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.highlight {
            Some(h) => write!(f, "{}{}", self.glyph, h),
            None => write!(f, "{}", self.glyph),
        }
    }
}

impl serde::Serialize for Face {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_tokens() {
        assert_eq!(Face::back().to_string(), "1B");
        assert_eq!(Face::blank().to_string(), "2B");
        assert_eq!(Face::wrong().to_string(), "X");
        assert_eq!(Face::from(None).to_string(), "2B");
    }

    #[test]
    fn highlight_suffix() {
        let card = Card::try_from("QH").unwrap();
        assert_eq!(Face::from(card).lit(Highlight::Primary).to_string(), "QHp");
        assert_eq!(Face::back().lit(Highlight::Caller).to_string(), "1Bb");
        assert_eq!(Face::back().lit(Highlight::Secondary).to_string(), "1Bs");
    }

    #[test]
    fn highlight_does_not_change_card() {
        let card = Card::try_from("7C").unwrap();
        let face = Face::from(card).lit(Highlight::Primary);
        assert_eq!(face.card(), Some(card));
        assert_eq!(Face::back().card(), None);
        assert_eq!(Face::from(None).card(), None);
    }
}
