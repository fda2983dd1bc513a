use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::BotError;
use crate::pieces::{
    Piece, PieceSet, PieceSetExt, PieceTable, HAND_CAPACITY, MAX_PIP, PIECE_COUNT,
};
use crate::position::{next_seat, Position, Seat, Side, SEATS};

/// Both ends show 6 before the first recorded play.
pub const OPENING_END: u8 = MAX_PIP;

/// One public play from the round history.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Play {
    pub seat: Seat,
    pub piece: Piece,
    pub side: Side,
}

/// Everything the requesting seat can deduce from the public history.
#[derive(Clone, Debug)]
pub struct Knowledge {
    pub own_seat: Seat,
    /// The requester's hand in the slot order it was given.
    pub own_hand: Vec<Piece>,
    pub end1: u8,
    pub end2: u8,
    pub last_mover: Seat,
    /// Pieces each seat is known not to hold (index 0 is seat 1).
    pub deny: [PieceSet; SEATS as usize],
    /// Unseen pieces: not on the board and not in the requester's hand.
    pub remaining: PieceSet,
    /// Pieces still to be dealt to each hidden seat; zero for the requester.
    pub hand_size: [usize; SEATS as usize],
    pub board_count: usize,
}

fn check_seat(seat: Seat) -> Result<Seat, BotError> {
    if (1..=SEATS).contains(&seat) {
        Ok(seat)
    } else {
        Err(BotError::InvalidSeat(seat))
    }
}

impl Knowledge {
    /// Replays the history from the seat that made the first play, inferring a
    /// forced pass for every seat skipped along the way.
    pub fn replay(
        table: &PieceTable,
        own_seat: Seat,
        own_hand: Vec<Piece>,
        plays: &[Play],
    ) -> Result<Self, BotError> {
        let own_seat = check_seat(own_seat)?;
        let first = plays.first().ok_or(BotError::EmptyHistory)?;
        if own_hand.len() > HAND_CAPACITY {
            return Err(BotError::HandOverflow(own_seat));
        }

        let mut remaining = PieceSet::empty();
        for piece in Piece::all() {
            remaining.insert_piece(piece);
        }
        let mut knowledge = Self {
            own_seat,
            own_hand,
            end1: OPENING_END,
            end2: OPENING_END,
            last_mover: first.seat,
            deny: [PieceSet::empty(); SEATS as usize],
            remaining,
            hand_size: [HAND_CAPACITY; SEATS as usize],
            board_count: 0,
        };

        let mut expected = check_seat(first.seat)?;
        for play in plays {
            let seat = check_seat(play.seat)?;
            while expected != seat {
                knowledge.record_pass(table, expected);
                expected = next_seat(expected);
            }
            knowledge.record_play(table, play)?;
            expected = next_seat(expected);
        }
        // the turn reached us, so everyone between the last player and us passed
        while expected != own_seat {
            knowledge.record_pass(table, expected);
            expected = next_seat(expected);
        }

        for &piece in &knowledge.own_hand {
            if !knowledge.remaining.remove_piece(piece) {
                return Err(BotError::DuplicatePiece(table.name(piece).to_string()));
            }
        }
        knowledge.hand_size[own_seat as usize - 1] = 0;

        let remaining = knowledge.remaining;
        for deny in knowledge.deny.iter_mut() {
            *deny &= remaining;
        }
        debug_assert_eq!(knowledge.accounted(), PIECE_COUNT);

        debug!(
            "replayed {} plays: ends {}/{}, {} unseen, hidden hand sizes {:?}",
            plays.len(),
            knowledge.end1,
            knowledge.end2,
            knowledge.remaining.piece_count(),
            knowledge.hand_size
        );
        Ok(knowledge)
    }

    fn record_pass(&mut self, table: &PieceTable, seat: Seat) {
        let deny = &mut self.deny[seat as usize - 1];
        for piece in Piece::all() {
            if table.fits(piece, self.end1) || table.fits(piece, self.end2) {
                deny.insert_piece(piece);
            }
        }
    }

    fn record_play(&mut self, table: &PieceTable, play: &Play) -> Result<(), BotError> {
        let end = match play.side {
            Side::Left => &mut self.end1,
            Side::Right => &mut self.end2,
        };
        let open = *end;
        *end = table.other_end(play.piece, open).ok_or_else(|| BotError::PieceDoesNotFit {
            piece: table.name(play.piece).to_string(),
            end: open,
        })?;

        if !self.remaining.remove_piece(play.piece) {
            return Err(BotError::DuplicatePiece(table.name(play.piece).to_string()));
        }
        let size = &mut self.hand_size[play.seat as usize - 1];
        *size = size.checked_sub(1).ok_or(BotError::HandOverflow(play.seat))?;
        self.board_count += 1;
        self.last_mover = play.seat;
        Ok(())
    }

    /// Draws one assignment of the unseen pieces to the hidden seats.
    ///
    /// Rejection sampling over the whole deal: a draw where any seat cannot be
    /// filled from its eligible pieces is thrown away. After `max_retries`
    /// rejections the deny sets are dropped for one last draw.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_retries: usize,
    ) -> Result<[Vec<Piece>; SEATS as usize], BotError> {
        for _ in 0..max_retries.max(1) {
            if let Some(hands) = self.draw(rng, true) {
                return Ok(hands);
            }
        }
        warn!(
            "no deal satisfied the pass constraints after {} draws, ignoring them",
            max_retries.max(1)
        );
        self.draw(rng, false).ok_or(BotError::NoConsistentDistribution)
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        respect_deny: bool,
    ) -> Option<[Vec<Piece>; SEATS as usize]> {
        let mut hands: [Vec<Piece>; SEATS as usize] = Default::default();
        let mut claimed = PieceSet::empty();

        for seat in 1..=SEATS {
            let idx = seat as usize - 1;
            if seat == self.own_seat {
                hands[idx] = self.own_hand.clone();
                continue;
            }
            let deny = &self.deny[idx];
            let mut eligible: Vec<Piece> = self
                .remaining
                .iter_pieces()
                .filter(|&p| {
                    !claimed.contains_piece(p) && !(respect_deny && deny.contains_piece(p))
                })
                .collect();
            if eligible.len() < self.hand_size[idx] {
                return None;
            }
            eligible.shuffle(rng);
            eligible.truncate(self.hand_size[idx]);
            for &piece in &eligible {
                claimed.insert_piece(piece);
            }
            hands[idx] = eligible;
        }
        Some(hands)
    }

    /// The real position with hidden hands filled in from a sample.
    pub fn position<'t>(
        &self,
        table: &'t PieceTable,
        hands: &[Vec<Piece>; SEATS as usize],
    ) -> Position<'t> {
        Position::new(table, (self.end1, self.end2), hands, self.own_seat, self.last_mover)
    }

    /// The real position as the requester sees it; hidden hands are left empty.
    pub fn own_position<'t>(&self, table: &'t PieceTable) -> Position<'t> {
        let mut hands: [Vec<Piece>; SEATS as usize] = Default::default();
        hands[self.own_seat as usize - 1] = self.own_hand.clone();
        self.position(table, &hands)
    }

    /// Pieces accounted for by the requester's hand, the unseen pool and the board.
    pub fn accounted(&self) -> usize {
        self.own_hand.len() + self.remaining.piece_count() + self.board_count
    }
}
