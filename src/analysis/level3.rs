//! Level-3 classification: main directions and changes in direction.
//!
//! 1. Each level-2 segment becomes one composite label (its non-still
//!    headings). Segments spanning at least the main-direction threshold are
//!    main directions, shorter ones are changes; all-still segments are dropped.
//! 2. Consecutive changes are merged into one, keeping the earlier boundary.
//! 3. Cleanup passes run until the segment count stops changing. For each
//!    change segment (not first, not last) between the nearest preceding main
//!    direction and the following segment:
//!    - axes used by both neighbours are removed from the change;
//!    - surviving symbols are reduced to the most frequent ones;
//!    - if both neighbours are the same main direction, the change and the
//!      following segment are blanked.
//!    Blank segments are then removed together with their boundaries.
//! 4. The `END` sentinel closes the sequence.

use serde::Serialize;

use super::level2::Level2Segments;
use crate::labels::{Axis, Heading, Level3Label};

/// Level-3 labels (the last one is always [`Level3Label::End`]) and one
/// boundary per label. The boundary paired with `END` is the end of input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level3Segments {
    labels: Vec<Level3Label>,
    boundaries: Vec<usize>,
}

impl Level3Segments {
    pub fn labels(&self) -> &[Level3Label] {
        &self.labels
    }

    /// Level-1 step index where each segment starts; the last entry is the
    /// end of input.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Number of labels including the sentinel.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Segments before the sentinel.
    pub fn segments(&self) -> &[Level3Label] {
        &self.labels[..self.labels.len().saturating_sub(1)]
    }

    pub fn get(&self, position: usize) -> Option<&Level3Label> {
        self.labels.get(position)
    }

    /// Rendered labels, e.g. `["L", "lb", "B", "END"]`.
    pub fn hashes(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.to_string()).collect()
    }

    /// Run the cleanup passes again over the current segments. Returns the
    /// number of passes taken; an already reduced sequence takes one pass and
    /// does not change.
    pub fn reduce(&mut self) -> usize {
        let had_end = matches!(self.labels.last(), Some(Level3Label::End));
        if had_end {
            self.labels.pop();
        }
        let passes = cleanup(&mut self.labels, &mut self.boundaries);
        if had_end {
            self.labels.push(Level3Label::End);
        }
        passes
    }

    pub(crate) fn set(&mut self, position: usize, label: Level3Label) -> Option<Level3Label> {
        // The sentinel is not editable
        if position + 1 >= self.labels.len() {
            return None;
        }
        Some(std::mem::replace(&mut self.labels[position], label))
    }
}

/// Build the level-3 segments from level-2 segments.
pub fn classify(level2: &Level2Segments, main_direction: usize) -> Level3Segments {
    let (labels, boundaries) = concatenate(level2, main_direction);
    let (mut labels, mut boundaries) = merge_changes(labels, boundaries);
    boundaries.push(level2.end());

    let passes = cleanup(&mut labels, &mut boundaries);
    labels.push(Level3Label::End);

    tracing::debug!(
        "Classified {} level-2 segments into {} level-3 segments ({} cleanup passes)",
        level2.len(),
        labels.len() - 1,
        passes
    );
    Level3Segments { labels, boundaries }
}

/// Step 1: one composite label per level-2 segment, dropping all-still ones.
fn concatenate(level2: &Level2Segments, main_direction: usize) -> (Vec<Level3Label>, Vec<usize>) {
    let mut labels = Vec::with_capacity(level2.len());
    let mut boundaries = Vec::with_capacity(level2.len() + 1);

    for (i, triple) in level2.labels().iter().enumerate() {
        let headings = triple.composite();
        if headings.is_empty() {
            continue;
        }
        let span = level2.span(i).unwrap_or(0);
        let label = if span >= main_direction {
            Level3Label::Main(headings)
        } else {
            Level3Label::Change(headings)
        };
        labels.push(label);
        boundaries.push(level2.boundaries()[i]);
    }
    (labels, boundaries)
}

/// Step 2: concatenate each change onto a directly preceding change.
fn merge_changes(labels: Vec<Level3Label>, boundaries: Vec<usize>) -> (Vec<Level3Label>, Vec<usize>) {
    let mut merged_labels: Vec<Level3Label> = Vec::with_capacity(labels.len());
    let mut merged_boundaries = Vec::with_capacity(boundaries.len());

    for (label, boundary) in labels.into_iter().zip(boundaries) {
        if let (Level3Label::Change(next), Some(Level3Label::Change(prev))) = (&label, merged_labels.last_mut()) {
            prev.extend_from_slice(next);
            continue;
        }
        merged_labels.push(label);
        merged_boundaries.push(boundary);
    }
    (merged_labels, merged_boundaries)
}

/// Step 3: repeat cleanup passes until the segment count is stable.
///
/// `boundaries` holds one entry per label plus the trailing end-of-input
/// marker, which is never removed. Capped at `labels.len() + 1` passes.
fn cleanup(labels: &mut Vec<Level3Label>, boundaries: &mut Vec<usize>) -> usize {
    let cap = labels.len() + 1;
    let mut passes = 0;
    loop {
        let before = labels.len();
        cleanup_pass(labels);
        remove_blank(labels, boundaries);
        passes += 1;
        tracing::trace!("Cleanup pass {}: {} -> {} segments", passes, before, labels.len());

        if labels.len() == before {
            break;
        }
        if passes >= cap {
            tracing::warn!("Level-3 cleanup stopped after {} passes without reaching a fixed point", passes);
            break;
        }
    }
    passes
}

fn cleanup_pass(labels: &mut [Level3Label]) {
    let last = labels.len().saturating_sub(1);
    for h in 1..last {
        let symbols = match &labels[h] {
            Level3Label::Change(symbols) if !symbols.is_empty() => symbols.clone(),
            _ => continue,
        };

        let main_before = labels[..h].iter().rev().find(|l| l.is_main() && !l.is_blank());
        let after = labels.get(h + 1);

        let kept: Vec<Heading> = symbols
            .into_iter()
            .filter(|s| s.axis().is_none_or(|axis| !shared_axis(main_before, after, axis)))
            .collect();
        let collapse = matches!((main_before, after), (Some(b), Some(a)) if b == a);

        labels[h] = Level3Label::Change(majority(&kept));
        if collapse {
            labels[h].clear();
            labels[h + 1].clear();
        }
    }
}

fn shared_axis(before: Option<&Level3Label>, after: Option<&Level3Label>, axis: Axis) -> bool {
    before.is_some_and(|b| b.has_axis(axis)) && after.is_some_and(|a| a.has_axis(axis))
}

/// Most frequent headings, each once, in order of first appearance.
fn majority(symbols: &[Heading]) -> Vec<Heading> {
    let mut counts: Vec<(Heading, usize)> = Vec::new();
    for symbol in symbols {
        match counts.iter_mut().find(|(h, _)| h == symbol) {
            Some((_, count)) => *count += 1,
            None => counts.push((*symbol, 1)),
        }
    }
    let highest = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    counts.into_iter().filter(|(_, c)| *c == highest).map(|(h, _)| h).collect()
}

fn remove_blank(labels: &mut Vec<Level3Label>, boundaries: &mut Vec<usize>) {
    let keep: Vec<bool> = labels.iter().map(|l| !l.is_blank()).collect();
    let mut i = 0;
    boundaries.retain(|_| {
        // Entries past the labels (the end-of-input marker) are always kept
        let k = keep.get(i).copied().unwrap_or(true);
        i += 1;
        k
    });
    labels.retain(|l| !l.is_blank());
}
