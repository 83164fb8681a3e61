pub mod action;
pub mod command;
pub mod engine;
pub mod phase;
pub mod score;
pub mod view;

pub use action::*;
pub use command::*;
pub use engine::*;
pub use phase::*;
pub use view::*;
