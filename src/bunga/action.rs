use crate::cards::Face;
use serde::ser::SerializeStruct;

/// Where an animated card starts or ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spot {
    Draw,
    Discard,
    Hand(String, usize),
}

impl Spot {
    fn name(&self) -> &str {
        match self {
            Spot::Draw => "draw",
            Spot::Discard => "discard",
            Spot::Hand(player, _) => player,
        }
    }
    fn index(&self) -> String {
        match self {
            Spot::Hand(_, i) => i.to_string(),
            _ => String::new(),
        }
    }
}

/// A card movement for the client to animate. Carries no game meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub start: Spot,
    pub end: Spot,
    pub card: Option<Face>,
}

impl Action {
    pub fn new(start: Spot, end: Spot) -> Self {
        Self {
            start,
            end,
            card: None,
        }
    }
    pub fn showing(self, face: Face) -> Self {
        Self {
            card: Some(face),
            ..self
        }
    }
}

impl serde::Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Action", 5)?;
        s.serialize_field("Start", self.start.name())?;
        s.serialize_field("StartIdx", &self.start.index())?;
        s.serialize_field("End", self.end.name())?;
        s.serialize_field("EndIdx", &self.end.index())?;
        match self.card {
            Some(ref face) => s.serialize_field("Card", face)?,
            None => s.serialize_field("Card", "")?,
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_empty_strings() {
        let action = Action::new(Spot::Draw, Spot::Hand("bob".into(), 2));
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"Start":"draw","StartIdx":"","End":"bob","EndIdx":"2","Card":""}"#
        );
    }

    #[test]
    fn wrong_tag_marker() {
        let action = Action::new(Spot::Discard, Spot::Discard).showing(Face::wrong());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["Card"], "X");
    }
}
