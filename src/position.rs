use std::ops::Neg;

use serde::{Deserialize, Serialize};

use crate::pieces::{Piece, PieceTable, HAND_CAPACITY};

pub const SEATS: u8 = 4;

/// Seats are numbered 1..=4; partnerships are {1, 3} and {2, 4}.
pub type Seat = u8;
pub type Hand = [Piece; HAND_CAPACITY];

#[inline]
pub fn next_seat(seat: Seat) -> Seat {
    if seat >= SEATS { 1 } else { seat + 1 }
}

#[inline]
pub fn prev_seat(seat: Seat) -> Seat {
    if seat <= 1 { SEATS } else { seat - 1 }
}

#[inline]
pub fn same_partnership(a: Seat, b: Seat) -> bool {
    a % 2 == b % 2
}

/// "left" extends end1, "right" extends end2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "esquerda")]
    Left,
    #[serde(alias = "direita")]
    Right,
}

/// Signed move code: 0 passes, +k lays hand slot k-1 on end2, -k lays it on end1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move(i8);

impl Move {
    pub const PASS: Move = Move(0);

    pub fn right(slot: usize) -> Self {
        Move(slot as i8 + 1)
    }

    pub fn left(slot: usize) -> Self {
        Move(-(slot as i8 + 1))
    }

    /// Inverse of [`Move::code`], for callers that store moves as bare integers.
    pub fn from_code(code: i8) -> Self {
        Move(code)
    }

    #[inline]
    pub fn code(self) -> i8 {
        self.0
    }

    #[inline]
    pub fn is_pass(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn slot(self) -> Option<usize> {
        if self.is_pass() {
            None
        } else {
            Some(self.0.unsigned_abs() as usize - 1)
        }
    }

    #[inline]
    pub fn side(self) -> Option<Side> {
        match self.0 {
            0 => None,
            c if c > 0 => Some(Side::Right),
            _ => Some(Side::Left),
        }
    }
}

/// Search value from the point of view of the seat on turn.
///
/// `Loss` and `Win` are exact round outcomes. The infinities only ever appear
/// as alpha-beta window bounds and as the seed of a running maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Eval {
    NegInfinity,
    Loss,
    Win,
    PosInfinity,
}

impl Eval {
    #[inline]
    pub fn is_win(self) -> bool {
        self == Eval::Win
    }
}

impl Neg for Eval {
    type Output = Eval;

    fn neg(self) -> Eval {
        match self {
            Eval::NegInfinity => Eval::PosInfinity,
            Eval::Loss => Eval::Win,
            Eval::Win => Eval::Loss,
            Eval::PosInfinity => Eval::NegInfinity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestMoves {
    pub score: Eval,
    pub moves: Vec<Move>,
}

/// A fully known four-seat position, searched in place with apply/undo.
#[derive(Clone, Debug)]
pub struct Position<'t> {
    table: &'t PieceTable,
    end1: u8,
    end2: u8,
    hands: [Hand; SEATS as usize],
    player: Seat,
    last_mover: Seat,
    played: Vec<Piece>,
    movers: Vec<Seat>,
}

impl<'t> Position<'t> {
    /// Hands are given per seat (index 0 is seat 1) and keep their slot order.
    pub fn new(
        table: &'t PieceTable,
        (end1, end2): (u8, u8),
        hands: &[Vec<Piece>; SEATS as usize],
        player: Seat,
        last_mover: Seat,
    ) -> Self {
        let mut slots = [[Piece::EMPTY; HAND_CAPACITY]; SEATS as usize];
        for (seat_slots, hand) in slots.iter_mut().zip(hands.iter()) {
            debug_assert!(hand.len() <= HAND_CAPACITY);
            for (slot, &piece) in seat_slots.iter_mut().zip(hand.iter()) {
                *slot = piece;
            }
        }
        Self {
            table,
            end1,
            end2,
            hands: slots,
            player,
            last_mover,
            played: Vec::with_capacity(32),
            movers: Vec::with_capacity(32),
        }
    }

    pub fn ends(&self) -> (u8, u8) {
        (self.end1, self.end2)
    }

    pub fn player(&self) -> Seat {
        self.player
    }

    pub fn last_mover(&self) -> Seat {
        self.last_mover
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat as usize - 1]
    }

    fn hand_mut(&mut self, seat: Seat) -> &mut Hand {
        &mut self.hands[seat as usize - 1]
    }

    fn hand_pips(&self, seat: Seat) -> u32 {
        self.hand(seat).iter().map(|&p| self.table.pip_sum(p) as u32).sum()
    }

    fn can_play(&self, piece: Piece) -> bool {
        self.table.fits(piece, self.end1) || self.table.fits(piece, self.end2)
    }

    pub fn is_blocked(&self) -> bool {
        !self.hands.iter().flatten().any(|&p| self.can_play(p))
    }

    /// Never empty: `[Move::PASS]` when nothing in hand fits either end.
    pub fn valid_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(2 * HAND_CAPACITY);
        for (slot, &piece) in self.hand(self.player).iter().enumerate() {
            if self.table.fits(piece, self.end2) {
                moves.push(Move::right(slot));
            }
            if self.table.fits(piece, self.end1) {
                moves.push(Move::left(slot));
            }
        }
        if moves.is_empty() {
            moves.push(Move::PASS);
        }
        moves
    }

    /// `mv` must come from `valid_moves` of this position.
    pub fn apply(&mut self, mv: Move) {
        if let (Some(slot), Some(side)) = (mv.slot(), mv.side()) {
            let seat = self.player;
            let piece = std::mem::replace(&mut self.hand_mut(seat)[slot], Piece::EMPTY);
            let end = match side {
                Side::Left => &mut self.end1,
                Side::Right => &mut self.end2,
            };
            let exposed = self.table.other_end(piece, *end);
            debug_assert!(exposed.is_some(), "{:?} does not fit the open end", mv);
            *end = exposed.unwrap_or(*end);
            self.played.push(piece);
            self.movers.push(self.last_mover);
            self.last_mover = seat;
        }
        self.player = next_seat(self.player);
    }

    /// Exact inverse of `apply` for the same move.
    pub fn undo(&mut self, mv: Move) {
        self.player = prev_seat(self.player);
        if let (Some(slot), Some(side)) = (mv.slot(), mv.side()) {
            let (piece, mover) = match (self.played.pop(), self.movers.pop()) {
                (Some(piece), Some(mover)) => (piece, mover),
                _ => {
                    debug_assert!(false, "undo of {:?} without a matching apply", mv);
                    return;
                }
            };
            let seat = self.player;
            self.hand_mut(seat)[slot] = piece;
            let end = match side {
                Side::Left => &mut self.end1,
                Side::Right => &mut self.end2,
            };
            let covered = self.table.other_end(piece, *end);
            debug_assert!(covered.is_some(), "{:?} was not played on that end", mv);
            *end = covered.unwrap_or(*end);
            self.last_mover = mover;
        }
    }

    /// Lower pip total wins a blocked round; a tie goes against the
    /// partnership that made the last play.
    fn blocked_outcome(&self) -> Eval {
        let odd = self.hand_pips(1) + self.hand_pips(3);
        let even = self.hand_pips(2) + self.hand_pips(4);
        let (mine, theirs) = if same_partnership(self.player, 1) {
            (odd, even)
        } else {
            (even, odd)
        };

        if mine < theirs {
            Eval::Win
        } else if mine > theirs {
            Eval::Loss
        } else if same_partnership(self.player, self.last_mover) {
            Eval::Loss
        } else {
            Eval::Win
        }
    }

    /// Negamax with alpha-beta pruning, from the perspective of the seat on turn.
    pub fn score(&mut self, mut alpha: Eval, beta: Eval) -> Eval {
        if self.hand(prev_seat(self.player)).iter().all(|p| p.is_empty()) {
            return Eval::Loss;
        }
        if self.is_blocked() {
            return self.blocked_outcome();
        }

        let mut best = Eval::NegInfinity;
        for mv in self.valid_moves() {
            self.apply(mv);
            best = best.max(-self.score(-beta, -alpha));
            self.undo(mv);
            alpha = alpha.max(best);
            if best == Eval::Win || alpha >= beta {
                break;
            }
        }
        best
    }

    /// Scores every root move with a full window and keeps all that share the best value.
    pub fn find_best_moves(&mut self) -> BestMoves {
        let mut best = BestMoves { score: Eval::NegInfinity, moves: Vec::new() };
        for mv in self.valid_moves() {
            self.apply(mv);
            let value = -self.score(Eval::NegInfinity, Eval::PosInfinity);
            self.undo(mv);
            if value > best.score {
                best.score = value;
                best.moves.clear();
                best.moves.push(mv);
            } else if value == best.score {
                best.moves.push(mv);
            }
        }
        best
    }
}
