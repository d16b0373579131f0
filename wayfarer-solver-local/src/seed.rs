//! Nearest-neighbour seed tour with priority placement.
//!
//! Priority stops belong in the first half of the day. While the first half
//! is being filled the seed picks the nearest priority stop that can be
//! visited on the day it is reached without running past closing time, and
//! falls back to the nearest stop of any kind when none qualifies. Priority
//! stops that end up in the second half are reported as demoted.

use tokio_util::sync::CancellationToken;
use wayfarer_core::{Location, OptimizeError, Scheduler, TimelineEntry};

/// Number of leading positions priority stops should occupy.
pub(crate) const fn first_half(len: usize) -> usize {
    len.div_ceil(2)
}

pub(crate) fn is_priority(locations: &[Location], index: usize) -> bool {
    locations.get(index).is_some_and(Location::is_priority)
}

/// Priority stops placed in the first half of `order`.
pub(crate) fn leading_priority_count(locations: &[Location], order: &[usize]) -> usize {
    order
        .iter()
        .take(first_half(order.len()))
        .filter(|&&index| is_priority(locations, index))
        .count()
}

/// Priority stops placed in the second half of `order`.
pub(crate) fn demoted(locations: &[Location], order: &[usize]) -> Vec<usize> {
    order
        .iter()
        .skip(first_half(order.len()))
        .copied()
        .filter(|&index| is_priority(locations, index))
        .collect()
}

const fn fits_same_day(entry: &TimelineEntry) -> bool {
    !entry.visit.dwell_overrun && !entry.visit.deferred_to_next_day
}

fn nearest<'e, I>(entries: I) -> Option<TimelineEntry>
where
    I: Iterator<Item = &'e TimelineEntry>,
{
    entries
        .min_by_key(|entry| (entry.leg.estimate.duration, entry.index))
        .copied()
}

/// Greedy tour over every location, returned as indices into
/// [`Scheduler::locations`].
///
/// Ties in travel time go to the stop listed first.
pub(crate) fn nearest_neighbour(
    scheduler: &Scheduler<'_>,
    cancel: &CancellationToken,
) -> Result<Vec<usize>, OptimizeError> {
    let locations = scheduler.locations();
    let half = first_half(locations.len());
    let mut remaining: Vec<usize> = (0..locations.len()).collect();
    let mut order = Vec::with_capacity(locations.len());
    let mut point = 0;
    let mut clock = scheduler.start_time();

    while !remaining.is_empty() {
        if cancel.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }
        let entries: Vec<TimelineEntry> = remaining
            .iter()
            .filter_map(|&index| scheduler.step(point, index, clock))
            .collect();
        let wants_priority = order.len() < half;
        let priority = entries.iter().filter(|entry| {
            wants_priority && is_priority(locations, entry.index) && fits_same_day(entry)
        });
        let Some(next) = nearest(priority).or_else(|| nearest(entries.iter())) else {
            break;
        };
        remaining.retain(|&index| index != next.index);
        order.push(next.index);
        point = next.index + 1;
        clock = next.visit.departure;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use wayfarer_core::test_support::{location, timestamp};
    use wayfarer_core::{LocationBuilder, ModeSelection, SegmentEstimator, TravelMatrix};

    fn seed(builders: Vec<LocationBuilder>) -> Vec<usize> {
        let locations: Vec<Location> = builders
            .into_iter()
            .map(|builder| builder.build().expect("valid location"))
            .collect();
        let start = Coord { x: 0.0, y: 0.0 };
        let points: Vec<_> = std::iter::once(start)
            .chain(locations.iter().map(Location::coord))
            .collect();
        let matrix = TravelMatrix::build(
            &SegmentEstimator::default(),
            &points,
            ModeSelection::default(),
        )
        .expect("valid points");
        let scheduler = Scheduler::new(&matrix, &locations, start, timestamp(9, 0));
        nearest_neighbour(&scheduler, &CancellationToken::new()).expect("not cancelled")
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(5, 3)]
    fn first_half_rounds_up(#[case] len: usize, #[case] expected: usize) {
        assert_eq!(first_half(len), expected);
    }

    #[rstest]
    fn visits_nearest_first() {
        let order = seed(vec![
            location("far", 0.03, 0.0),
            location("near", 0.01, 0.0),
            location("middle", 0.02, 0.0),
        ]);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[rstest]
    fn pulls_priority_into_first_half() {
        let order = seed(vec![
            location("a", 0.01, 0.0),
            location("b", 0.02, 0.0),
            location("c", 0.03, 0.0),
            location("d", 0.04, 0.0).priority(true),
        ]);
        assert_eq!(order.first(), Some(&3));
    }

    #[rstest]
    fn leaves_priority_that_cannot_fit() {
        let order = seed(vec![
            location("a", 0.01, 0.0),
            location("b", 0.02, 0.0)
                .priority(true)
                .opening_hours("09:00-09:30".parse().expect("valid hours")),
        ]);
        assert_eq!(order, vec![0, 1]);
    }

    #[rstest]
    fn reports_demoted_priorities() {
        let locations: Vec<Location> = [
            location("a", 0.01, 0.0),
            location("b", 0.02, 0.0).priority(true),
            location("c", 0.03, 0.0),
        ]
        .into_iter()
        .map(|builder| builder.build().expect("valid"))
        .collect();
        assert_eq!(demoted(&locations, &[0, 2, 1]), vec![1]);
        assert!(demoted(&locations, &[1, 0, 2]).is_empty());
        assert_eq!(leading_priority_count(&locations, &[0, 1, 2]), 1);
        assert_eq!(leading_priority_count(&locations, &[0, 2, 1]), 0);
    }

    #[rstest]
    fn stops_when_cancelled() {
        let locations = vec![location("a", 0.01, 0.0).build().expect("valid")];
        let start = Coord { x: 0.0, y: 0.0 };
        let matrix = TravelMatrix::build(
            &SegmentEstimator::default(),
            &[start, Coord { x: 0.01, y: 0.0 }],
            ModeSelection::default(),
        )
        .expect("valid points");
        let scheduler = Scheduler::new(&matrix, &locations, start, timestamp(9, 0));
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            nearest_neighbour(&scheduler, &token),
            Err(OptimizeError::Cancelled)
        );
    }
}
