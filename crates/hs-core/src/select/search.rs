//! Running best-candidate tracker shared by the state-range strategies.

use hs_config::Strategy;

use super::{CandidateOutcome, CandidateRecord};
use crate::hmm::{ScoreError, TrainError};
use crate::logging::{event_names, Stage};

/// Which end of the criterion wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Strict improvement, so the earliest (lowest n) candidate keeps ties.
    fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }
}

/// Current winner of a search.
#[derive(Debug)]
pub(crate) struct Best<M> {
    pub n_states: usize,
    pub criterion: f64,
    pub model: M,
}

/// Visits candidates in ascending state order, keeping the best one and a
/// record of every outcome.
pub(crate) struct CandidateSearch<'w, M> {
    word: &'w str,
    strategy: Strategy,
    direction: Direction,
    best: Option<Best<M>>,
    records: Vec<CandidateRecord>,
}

impl<'w, M> CandidateSearch<'w, M> {
    pub fn new(word: &'w str, strategy: Strategy, direction: Direction) -> Self {
        Self {
            word,
            strategy,
            direction,
            best: None,
            records: Vec::new(),
        }
    }

    pub fn train_failed(&mut self, n_states: usize, err: TrainError) {
        self.skip(n_states, CandidateOutcome::TrainFailed(err));
    }

    pub fn score_failed(&mut self, n_states: usize, err: ScoreError) {
        self.skip(n_states, CandidateOutcome::ScoreFailed(err));
    }

    /// Offer a scored candidate. A non-finite criterion counts as a scoring
    /// failure.
    pub fn offer(&mut self, n_states: usize, criterion: f64, model: M) {
        if !criterion.is_finite() {
            self.score_failed(n_states, ScoreError::NonFinite);
            return;
        }

        tracing::debug!(
            event = event_names::CANDIDATE_SCORED,
            stage = %Stage::Select,
            word = self.word,
            strategy = %self.strategy,
            n_states,
            criterion,
            "candidate scored"
        );
        self.records.push(CandidateRecord {
            n_states,
            outcome: CandidateOutcome::Scored(criterion),
        });

        let better = match &self.best {
            None => true,
            Some(best) => self.direction.improves(criterion, best.criterion),
        };
        if better {
            self.best = Some(Best {
                n_states,
                criterion,
                model,
            });
        }
    }

    pub fn finish(self) -> (Option<Best<M>>, Vec<CandidateRecord>) {
        (self.best, self.records)
    }

    fn skip(&mut self, n_states: usize, outcome: CandidateOutcome) {
        tracing::debug!(
            event = event_names::CANDIDATE_SKIPPED,
            stage = %Stage::Select,
            word = self.word,
            strategy = %self.strategy,
            n_states,
            reason = %outcome,
            "candidate skipped"
        );
        self.records.push(CandidateRecord { n_states, outcome });
    }
}
