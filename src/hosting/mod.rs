mod casino;
mod server;

pub use casino::*;
pub use server::*;
