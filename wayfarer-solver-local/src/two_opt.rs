//! Segment-reversal (2-opt) refinement.
//!
//! Each evaluation reverses `order[i..=j]`, re-times the candidate and scores
//! it. A candidate replaces the current order when it scores strictly better,
//! or scores the same while sitting closer to the input order. Candidates that
//! push a priority stop out of the first half are never taken.

use tokio_util::sync::CancellationToken;
use wayfarer_core::{OptimizeError, Scheduler};

use crate::objective::{EPSILON, Measures, Objective};
use crate::seed::leading_priority_count;

/// Sum of distances between each stop's position and its input position.
pub(crate) fn displacement(order: &[usize]) -> usize {
    order
        .iter()
        .enumerate()
        .map(|(position, &index)| position.abs_diff(index))
        .sum()
}

/// Ordering under evaluation together with its cached figures.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub order: Vec<usize>,
    pub score: f64,
    pub priorities: usize,
    pub displacement: usize,
}

/// Scores orderings of one scheduler's locations.
pub(crate) struct Evaluator<'s, 'a> {
    scheduler: &'s Scheduler<'a>,
    objective: Objective,
}

impl<'s, 'a> Evaluator<'s, 'a> {
    pub(crate) const fn new(scheduler: &'s Scheduler<'a>, objective: Objective) -> Self {
        Self {
            scheduler,
            objective,
        }
    }

    /// Raw measures of `order`.
    pub(crate) fn measure(scheduler: &Scheduler<'_>, order: &[usize]) -> Measures {
        Measures::of(&scheduler.timeline(order), scheduler)
    }

    pub(crate) fn candidate(&self, order: Vec<usize>) -> Candidate {
        let measures = Self::measure(self.scheduler, &order);
        Candidate {
            score: self.objective.score(&measures),
            priorities: leading_priority_count(self.scheduler.locations(), &order),
            displacement: displacement(&order),
            order,
        }
    }

    /// Whether `challenger` should replace `incumbent`.
    #[expect(clippy::float_arithmetic, reason = "objective scores are real-valued")]
    pub(crate) const fn prefers(challenger: &Candidate, incumbent: &Candidate) -> bool {
        if challenger.priorities < incumbent.priorities {
            return false;
        }
        if challenger.score < incumbent.score - EPSILON {
            return true;
        }
        (challenger.score - incumbent.score).abs() <= EPSILON
            && challenger.displacement < incumbent.displacement
    }

    /// Improve `start` with at most `budget` reversal evaluations.
    ///
    /// Returns the best candidate and the number of evaluations spent.
    pub(crate) fn improve(
        &self,
        start: Candidate,
        budget: usize,
        cancel: &CancellationToken,
    ) -> Result<(Candidate, usize), OptimizeError> {
        let len = start.order.len();
        let mut best = start;
        let mut evaluations = 0_usize;
        let mut improved = true;

        'search: while improved {
            improved = false;
            for i in 0..len {
                for j in (i + 1)..len {
                    if evaluations >= budget {
                        break 'search;
                    }
                    if cancel.is_cancelled() {
                        return Err(OptimizeError::Cancelled);
                    }
                    evaluations += 1;
                    let mut order = best.order.clone();
                    if let Some(segment) = order.get_mut(i..=j) {
                        segment.reverse();
                    }
                    let challenger = self.candidate(order);
                    if Self::prefers(&challenger, &best) {
                        best = challenger;
                        improved = true;
                    }
                }
            }
        }
        log::debug!("2-opt finished after {evaluations} evaluations (score {:.3})", best.score);
        Ok((best, evaluations))
    }
}
