//! Turn Barrier
//!
//! Counted rendezvous between the coordinator and its strip workers. Every
//! dispatched strip must report exactly once before the turn may be
//! assembled; results are slotted by strip index so assembly order never
//! depends on completion order.

use thiserror::Error;

use crate::strip::StripOutput;

/// Barrier protocol violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarrierError {
    /// A strip reported that was never dispatched
    #[error("strip {index} is not part of this turn ({expected} strips dispatched)")]
    UnknownStrip {
        /// Index reported
        index: usize,
        /// Number of strips dispatched
        expected: usize,
    },

    /// A strip reported twice in the same turn
    #[error("strip {index} reported more than once")]
    DuplicateArrival {
        /// Index reported twice
        index: usize,
    },

    /// Assembly was attempted before every strip reported
    #[error("turn incomplete, missing strips {missing:?}")]
    Incomplete {
        /// Strips that never reported
        missing: Vec<usize>,
    },
}

/// Collects one [`StripOutput`] per dispatched strip
#[derive(Debug)]
pub struct StripBarrier {
    slots: Vec<Option<StripOutput>>,
    remaining: usize,
}

impl StripBarrier {
    /// Barrier expecting `expected` strips, indexed `0..expected`
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            slots: vec![None; expected],
            remaining: expected,
        }
    }

    /// Record a strip's result
    pub fn arrive(&mut self, output: StripOutput) -> Result<(), BarrierError> {
        let index = output.strip.index;
        let expected = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BarrierError::UnknownStrip { index, expected })?;

        if slot.is_some() {
            return Err(BarrierError::DuplicateArrival { index });
        }

        *slot = Some(output);
        self.remaining -= 1;
        Ok(())
    }

    /// Strips still outstanding
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether every strip has reported
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Release the results in ascending strip order
    pub fn into_outputs(self) -> Result<Vec<StripOutput>, BarrierError> {
        if !self.is_complete() {
            let missing = self
                .slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_none())
                .map(|(i, _)| i)
                .collect();
            return Err(BarrierError::Incomplete { missing });
        }

        Ok(self.slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CellState;
    use crate::strip::{partition, Strip};

    fn output(strip: Strip) -> StripOutput {
        StripOutput {
            strip,
            rows: vec![CellState::Dead; strip.len()],
        }
    }

    #[test]
    fn test_out_of_order_arrivals_release_in_order() {
        let strips = partition(10, 3);
        let mut barrier = StripBarrier::new(strips.len());

        for strip in strips.iter().rev() {
            assert!(!barrier.is_complete());
            barrier.arrive(output(*strip)).unwrap();
        }

        assert!(barrier.is_complete());
        let starts: Vec<usize> = barrier
            .into_outputs()
            .unwrap()
            .iter()
            .map(|o| o.strip.start)
            .collect();
        assert_eq!(starts, vec![0, 4, 7]);
    }

    #[test]
    fn test_duplicate_arrival_rejected() {
        let strips = partition(6, 2);
        let mut barrier = StripBarrier::new(2);

        barrier.arrive(output(strips[1])).unwrap();
        assert_eq!(
            barrier.arrive(output(strips[1])),
            Err(BarrierError::DuplicateArrival { index: 1 })
        );
        assert_eq!(barrier.remaining(), 1);
    }

    #[test]
    fn test_unknown_strip_rejected() {
        let mut barrier = StripBarrier::new(2);
        let stray = Strip {
            index: 5,
            start: 0,
            end: 1,
        };
        assert_eq!(
            barrier.arrive(output(stray)),
            Err(BarrierError::UnknownStrip {
                index: 5,
                expected: 2
            })
        );
    }

    #[test]
    fn test_incomplete_reports_missing() {
        let strips = partition(8, 4);
        let mut barrier = StripBarrier::new(4);
        barrier.arrive(output(strips[0])).unwrap();
        barrier.arrive(output(strips[2])).unwrap();

        assert_eq!(
            barrier.into_outputs(),
            Err(BarrierError::Incomplete {
                missing: vec![1, 3]
            })
        );
    }
}
