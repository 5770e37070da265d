//! Per-piece behavior for the tile-popping puzzle: the piece state machine with
//! its frame-driven motion, and the board-to-observer scoring notifications.

pub use board::*;
pub use clock::*;
pub use error::*;
pub use event::*;
pub use piece::*;
pub use score::*;
pub use types::*;

mod board;
mod clock;
mod error;
mod event;
mod piece;
mod score;
mod types;
