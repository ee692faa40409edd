// src/analysis/level2.rs - Run-length grouping of identical level-1 triples

use serde::Serialize;

use super::level1::Level1Labels;
use crate::labels::{Axis, LabelTriple, SEPARATOR};

/// Level-2 segments: M label triples and M+1 boundaries into the level-1
/// sequence. Segment `i` covers steps `boundaries[i]..boundaries[i + 1]`; the
/// last boundary is the end of the level-1 sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level2Segments {
    labels: Vec<LabelTriple>,
    boundaries: Vec<usize>,
}

impl Level2Segments {
    pub fn labels(&self) -> &[LabelTriple] {
        &self.labels
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&LabelTriple> {
        self.labels.get(position)
    }

    /// Number of level-1 steps in segment `position`.
    pub fn span(&self, position: usize) -> Option<usize> {
        Some(self.boundaries.get(position + 1)? - self.boundaries.get(position)?)
    }

    /// Boundary closing the last segment (N-1 for N points).
    pub fn end(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Symbol string of one axis with the terminal separator (length M+1).
    pub fn axis_symbols(&self, axis: Axis) -> String {
        self.labels
            .iter()
            .map(|t| t.get(axis).symbol())
            .chain(std::iter::once(SEPARATOR))
            .collect()
    }

    /// Edits only touch the symbols; boundaries stay where grouping put them.
    pub(crate) fn set(&mut self, position: usize, label: LabelTriple) -> Option<LabelTriple> {
        let slot = self.labels.get_mut(position)?;
        Some(std::mem::replace(slot, label))
    }
}

/// Group consecutive identical triples. The first triple seeds the current
/// run; each change closes the run and records where the new one starts.
pub fn group(level1: &Level1Labels) -> Level2Segments {
    let steps = level1.steps();
    let mut labels = Vec::new();
    let mut boundaries = vec![0];

    let Some(first) = steps.first() else {
        return Level2Segments { labels, boundaries };
    };
    let mut current = *first;
    for (i, step) in steps.iter().enumerate().skip(1) {
        if *step != current {
            labels.push(current);
            boundaries.push(i);
            current = *step;
        }
    }
    // The end of the sequence closes the final run
    labels.push(current);
    boundaries.push(steps.len());

    tracing::debug!("Grouped {} level-1 steps into {} level-2 segments", steps.len(), labels.len());
    Level2Segments { labels, boundaries }
}
