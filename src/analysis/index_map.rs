// src/analysis/index_map.rs - Map processed boundaries back to original samples

/// For each boundary (a processed-trajectory index), the first original
/// sample whose index-map entry reaches it.
///
/// `index_map` has one non-decreasing entry per original sample. With the
/// identity map every boundary maps to itself. A boundary past the last entry
/// maps to the last original sample.
pub fn map_boundaries(boundaries: &[usize], index_map: &[usize]) -> Vec<usize> {
    let last = index_map.len().saturating_sub(1);
    boundaries
        .iter()
        .map(|&boundary| {
            let original = index_map.partition_point(|&processed| processed < boundary);
            if original > last {
                tracing::warn!(
                    "Boundary {} lies beyond the index map (max {:?}); using last sample {}",
                    boundary,
                    index_map.last(),
                    last
                );
                last
            } else {
                original
            }
        })
        .collect()
}
