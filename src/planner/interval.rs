//! Half-open time intervals and sorted disjoint interval sets

use serde::{Deserialize, Serialize};

/// Pieces shorter than this are float noise and are discarded
const SLIVER: f64 = 1e-9;

/// Half-open interval `[start, end)` in timeline seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= SLIVER
    }

    /// Overlap of two intervals, `None` when they do not meet
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let clipped = Interval::new(self.start.max(other.start), self.end.min(other.end));
        if clipped.is_empty() {
            None
        } else {
            Some(clipped)
        }
    }

    /// Remove `cut` from this interval, leaving zero, one or two pieces
    pub fn subtract(&self, cut: &Interval) -> Vec<Interval> {
        if cut.is_empty() || cut.end <= self.start || cut.start >= self.end {
            return vec![*self];
        }
        [
            Interval::new(self.start, cut.start.min(self.end)),
            Interval::new(cut.end.max(self.start), self.end),
        ]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect()
    }
}

/// Remove `cut` from every member of a sorted disjoint set
pub fn subtract_all(set: &[Interval], cut: &Interval) -> Vec<Interval> {
    set.iter().flat_map(|piece| piece.subtract(cut)).collect()
}

/// Sort and coalesce overlapping or touching intervals into a disjoint set
pub fn merge_all(mut set: Vec<Interval>) -> Vec<Interval> {
    set.retain(|piece| !piece.is_empty());
    set.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(set.len());
    for piece in set {
        match merged.last_mut() {
            Some(last) if piece.start <= last.end + SLIVER => last.end = last.end.max(piece.end),
            _ => merged.push(piece),
        }
    }
    merged
}

/// Summed length of a disjoint set
pub fn total_len(set: &[Interval]) -> f64 {
    set.iter().map(Interval::len).sum()
}
