use serde::{Deserialize, Serialize};

use crate::determinizer::{Knowledge, Play};
use crate::error::BotError;
use crate::pieces::{Piece, PieceTable};
use crate::position::{Seat, Side};

/// One recorded play as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    #[serde(alias = "jogador")]
    pub seat: Seat,
    #[serde(alias = "pedra")]
    pub piece: String,
    /// Missing side means the left end.
    #[serde(alias = "lado", default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

/// The situation handed over by the transport: who asks, what they hold, and
/// the public history of the round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    #[serde(alias = "jogador")]
    pub seat: Seat,
    #[serde(alias = "mao")]
    pub hand: Vec<String>,
    // accepted for compatibility; nothing reads it yet
    #[serde(alias = "mesa", default)]
    pub table: Vec<String>,
    #[serde(alias = "jogadas")]
    pub plays: Vec<PlayRecord>,
}

impl PlayRequest {
    /// Resolves piece names and replays the history.
    pub fn knowledge(&self, table: &PieceTable) -> Result<Knowledge, BotError> {
        let hand = self
            .hand
            .iter()
            .map(|name| table.by_name(name))
            .collect::<Result<Vec<Piece>, _>>()?;
        let plays = self
            .plays
            .iter()
            .map(|record| -> Result<Play, BotError> {
                Ok(Play {
                    seat: record.seat,
                    piece: table.by_name(&record.piece)?,
                    side: record.side.unwrap_or(Side::Left),
                })
            })
            .collect::<Result<Vec<Play>, _>>()?;
        Knowledge::replay(table, self.seat, hand, &plays)
    }
}

/// The recommendation: a piece and side, or `{}` to pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

impl PlayResponse {
    pub fn play(piece: String, side: Side) -> Self {
        Self { piece: Some(piece), side: Some(side) }
    }

    pub fn pass() -> Self {
        Self::default()
    }

    pub fn is_pass(&self) -> bool {
        self.piece.is_none()
    }
}
