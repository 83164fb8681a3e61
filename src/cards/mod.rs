pub mod card;
pub use card::*;

pub mod deck;
pub use deck::*;

pub mod face;
pub use face::*;

pub mod rank;
pub use rank::*;

pub mod suit;
pub use suit::*;
