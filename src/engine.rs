use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::determinizer::Knowledge;
use crate::error::BotError;
use crate::pieces::PieceTable;
use crate::position::{Move, Position};
use crate::request::{PlayRequest, PlayResponse};

/// Vote weight of a best move from a sample whose search proved a win.
pub const WIN_WEIGHT: u64 = 100;
/// Vote weight of a best move from any other sample.
pub const PLAIN_WEIGHT: u64 = 1;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget for one recommendation, polled between samples.
    pub budget_ms: u64,
    /// Rejected joint draws per sample before pass constraints are dropped.
    pub max_sample_retries: usize,
    /// Stop after this many samples even if budget remains.
    pub max_samples: Option<usize>,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
}

impl SearchConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget_ms: 1000,
            max_sample_retries: 1000,
            max_samples: None,
            seed: None,
        }
    }
}

/// Accumulated votes, kept in first-seen order so ties go to the earliest move.
#[derive(Clone, Debug, Default)]
pub struct VoteTally {
    votes: Vec<(Move, u64)>,
}

impl VoteTally {
    pub fn add(&mut self, mv: Move, weight: u64) {
        match self.votes.iter_mut().find(|(m, _)| *m == mv) {
            Some((_, total)) => *total += weight,
            None => self.votes.push((mv, weight)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, mv: Move) -> u64 {
        self.votes.iter().find(|(m, _)| *m == mv).map_or(0, |&(_, w)| w)
    }

    pub fn winner(&self) -> Option<Move> {
        let mut best: Option<(Move, u64)> = None;
        for &(mv, weight) in &self.votes {
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((mv, weight));
            }
        }
        best.map(|(mv, _)| mv)
    }
}

pub struct Recommender<'t> {
    table: &'t PieceTable,
    config: SearchConfig,
}

impl<'t> Recommender<'t> {
    pub fn new(table: &'t PieceTable, config: SearchConfig) -> Self {
        Self { table, config }
    }

    /// Samples hidden hands until the budget runs out, solving each sample
    /// exactly, and returns the move with the most weighted votes.
    pub fn best_move(&self, knowledge: &Knowledge) -> Result<Move, BotError> {
        let start = Instant::now();

        let legal = knowledge.own_position(self.table).valid_moves();
        if let [only] = legal.as_slice() {
            debug!("single legal move {:?}, skipping search", only);
            return Ok(*only);
        }

        let (tally, samples) = self.sample_votes(knowledge)?;
        let choice = tally.winner().unwrap_or(Move::PASS);
        debug!(
            "{} samples in {:?}, votes {:?}, chose {:?}",
            samples,
            start.elapsed(),
            tally.votes,
            choice
        );
        Ok(choice)
    }

    /// The sampling loop: one solved deal per iteration until the budget or
    /// the sample cap is reached, always at least one.
    fn sample_votes(&self, knowledge: &Knowledge) -> Result<(VoteTally, usize), BotError> {
        let start = Instant::now();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let budget = self.config.budget();
        let mut tally = VoteTally::default();
        let mut samples = 0usize;

        loop {
            let hands = knowledge.sample(&mut rng, self.config.max_sample_retries)?;
            let mut position: Position = knowledge.position(self.table, &hands);
            let best = position.find_best_moves();
            let weight = if best.score.is_win() {
                WIN_WEIGHT
            } else {
                PLAIN_WEIGHT
            };
            for mv in best.moves {
                tally.add(mv, weight);
            }
            samples += 1;

            let capped = self.config.max_samples.is_some_and(|max| samples >= max);
            if start.elapsed() >= budget || capped {
                break;
            }
        }
        Ok((tally, samples))
    }

    /// Validates a request, runs the search and names the chosen piece the way
    /// the requester spelled it.
    pub fn recommend(&self, request: &PlayRequest) -> Result<PlayResponse, BotError> {
        let knowledge = request.knowledge(self.table)?;
        let mv = self.best_move(&knowledge)?;
        let response = match (mv.slot(), mv.side()) {
            (Some(slot), Some(side)) => PlayResponse::play(request.hand[slot].clone(), side),
            _ => PlayResponse::pass(),
        };
        info!("seat {} -> {:?}", request.seat, response);
        Ok(response)
    }
}
