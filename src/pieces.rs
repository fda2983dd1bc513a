use bitvec::{prelude::*, slice::IterOnes};

use crate::error::BotError;

pub const MAX_PIP: u8 = 6;
pub const PIP_VALUES: usize = MAX_PIP as usize + 1;
pub const PIECE_COUNT: usize = 28;
pub const HAND_CAPACITY: usize = 7;
const SLOTS: usize = PIECE_COUNT + 1;

/// A domino identity. `Piece::EMPTY` marks a played or never dealt hand slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Piece(u8);

impl Piece {
    pub const EMPTY: Piece = Piece(0);

    #[inline]
    pub fn id(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn all() -> impl Iterator<Item = Piece> {
        (1..=PIECE_COUNT as u8).map(Piece)
    }
}

// bit i is set when Piece(i) is in the set; bit 0 is never set
pub type PieceSet = BitArr!(for SLOTS, in u32, Lsb0);

pub trait PieceSetExt {
    fn empty() -> Self;
    fn contains_piece(&self, piece: Piece) -> bool;
    /// Returns true when the piece was not already present.
    fn insert_piece(&mut self, piece: Piece) -> bool;
    /// Returns true when the piece was present.
    fn remove_piece(&mut self, piece: Piece) -> bool;
    fn piece_count(&self) -> usize;
    type IterPieces<'a>: Iterator<Item = Piece> + 'a where Self: 'a;
    fn iter_pieces(&'_ self) -> Self::IterPieces<'_>;
}

impl PieceSetExt for PieceSet {
    fn empty() -> Self {
        bitarr!(u32, Lsb0; 0; SLOTS)
    }

    fn contains_piece(&self, piece: Piece) -> bool {
        self[piece.0 as usize]
    }

    fn insert_piece(&mut self, piece: Piece) -> bool {
        !piece.is_empty() && !self.replace(piece.0 as usize, true)
    }

    fn remove_piece(&mut self, piece: Piece) -> bool {
        self.replace(piece.0 as usize, false)
    }

    fn piece_count(&self) -> usize {
        self.count_ones()
    }

    type IterPieces<'a> = std::iter::Map<IterOnes<'a, u32, Lsb0>, fn(usize) -> Piece>;

    fn iter_pieces(&'_ self) -> Self::IterPieces<'_> {
        self.iter_ones().map(|idx| Piece(idx as u8))
    }
}

/// Precomputed lookups for the double-six set. Built once and shared by reference.
#[derive(Clone, Debug)]
pub struct PieceTable {
    pips: [(u8, u8); SLOTS],
    names: Vec<String>,
    by_pips: [[Piece; PIP_VALUES]; PIP_VALUES],
    // other_end[piece][end] is the pip exposed after laying `piece` on `end`,
    // or None when the piece does not carry that pip
    other_end: [[Option<u8>; PIP_VALUES]; SLOTS],
    pip_sum: [u8; SLOTS],
}

impl PieceTable {
    pub fn new() -> Self {
        let mut table = Self {
            pips: [(0, 0); SLOTS],
            names: vec![String::new(); SLOTS],
            by_pips: [[Piece::EMPTY; PIP_VALUES]; PIP_VALUES],
            other_end: [[None; PIP_VALUES]; SLOTS],
            pip_sum: [0; SLOTS],
        };

        let mut id = 1usize;
        for lo in 0..=MAX_PIP {
            for hi in lo..=MAX_PIP {
                let piece = Piece(id as u8);
                table.pips[id] = (lo, hi);
                table.names[id] = format!("{}-{}", lo, hi);
                table.by_pips[lo as usize][hi as usize] = piece;
                table.by_pips[hi as usize][lo as usize] = piece;
                table.other_end[id][lo as usize] = Some(hi);
                table.other_end[id][hi as usize] = Some(lo);
                table.pip_sum[id] = lo + hi;
                id += 1;
            }
        }
        table
    }

    #[inline]
    pub fn pips(&self, piece: Piece) -> (u8, u8) {
        self.pips[piece.0 as usize]
    }

    #[inline]
    pub fn pip_sum(&self, piece: Piece) -> u8 {
        self.pip_sum[piece.0 as usize]
    }

    /// The pip left exposed when `piece` is laid against `end`.
    #[inline]
    pub fn other_end(&self, piece: Piece, end: u8) -> Option<u8> {
        self.other_end[piece.0 as usize][end as usize]
    }

    #[inline]
    pub fn fits(&self, piece: Piece, end: u8) -> bool {
        self.other_end(piece, end).is_some()
    }

    pub fn by_pips(&self, a: u8, b: u8) -> Piece {
        self.by_pips[a as usize][b as usize]
    }

    pub fn name(&self, piece: Piece) -> &str {
        &self.names[piece.0 as usize]
    }

    /// Parses "i-j" in either pip order.
    pub fn by_name(&self, name: &str) -> Result<Piece, BotError> {
        let unknown = || BotError::UnknownPiece(name.to_string());
        let (a, b) = name.trim().split_once('-').ok_or_else(unknown)?;
        let a: u8 = a.trim().parse().map_err(|_| unknown())?;
        let b: u8 = b.trim().parse().map_err(|_| unknown())?;
        if a > MAX_PIP || b > MAX_PIP {
            return Err(unknown());
        }
        Ok(self.by_pips(a, b))
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_double_six_set() {
        let table = PieceTable::new();
        assert_eq!(Piece::all().count(), PIECE_COUNT);
        let total: u32 = Piece::all().map(|p| table.pip_sum(p) as u32).sum();
        assert_eq!(total, 168);
        let doubles = Piece::all().filter(|&p| { let (a, b) = table.pips(p); a == b }).count();
        assert_eq!(doubles, 7);
    }

    #[test]
    fn names_resolve_in_either_order() {
        let table = PieceTable::new();
        let piece = table.by_name("5-3").unwrap();
        assert_eq!(piece, table.by_name("3-5").unwrap());
        assert_eq!(table.name(piece), "3-5");
        assert_eq!(table.pips(piece), (3, 5));
        for p in Piece::all() {
            assert_eq!(table.by_name(table.name(p)).unwrap(), p);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let table = PieceTable::new();
        for bad in ["7-1", "3", "a-b", "", "2-"] {
            assert_eq!(table.by_name(bad), Err(BotError::UnknownPiece(bad.to_string())));
        }
    }

    #[test]
    fn empty_piece_fits_nowhere() {
        let table = PieceTable::new();
        for end in 0..=MAX_PIP {
            assert!(!table.fits(Piece::EMPTY, end));
        }
        assert_eq!(table.pip_sum(Piece::EMPTY), 0);
    }

    #[test]
    fn other_end_is_its_own_inverse() {
        let table = PieceTable::new();
        for p in Piece::all() {
            for end in 0..=MAX_PIP {
                if let Some(exposed) = table.other_end(p, end) {
                    assert_eq!(table.other_end(p, exposed), Some(end));
                }
            }
        }
        let double = table.by_pips(4, 4);
        assert_eq!(table.other_end(double, 4), Some(4));
        assert_eq!(table.other_end(double, 3), None);
    }

    #[test]
    fn piece_set_tracks_membership() {
        let table = PieceTable::new();
        let mut set = PieceSet::empty();
        let a = table.by_pips(0, 0);
        let b = table.by_pips(6, 6);
        assert!(set.insert_piece(a));
        assert!(!set.insert_piece(a));
        assert!(!set.insert_piece(Piece::EMPTY));
        set.insert_piece(b);
        assert_eq!(set.piece_count(), 2);
        assert_eq!(set.iter_pieces().collect::<Vec<_>>(), vec![a, b]);
        assert!(set.remove_piece(a));
        assert!(!set.contains_piece(a));
        assert!(set.contains_piece(b));
    }
}
