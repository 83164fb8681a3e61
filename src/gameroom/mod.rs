mod game;
mod lobby;
mod protocol;
mod runner;
mod user;

pub use game::*;
pub use lobby::*;
pub use protocol::*;
pub use runner::*;
pub use user::*;
