mod chat;
mod model;

pub use chat::*;
pub use model::*;
