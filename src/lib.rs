pub mod determinizer;
pub mod engine;
pub mod error;
pub mod pieces;
pub mod position;
pub mod request;

pub use determinizer::{Knowledge, Play};
pub use engine::{Recommender, SearchConfig};
pub use error::BotError;
pub use pieces::{Piece, PieceTable};
pub use position::{Eval, Move, Position, Side};
pub use request::{PlayRecord, PlayRequest, PlayResponse};
