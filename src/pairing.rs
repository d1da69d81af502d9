//! Minimum-cost pairing of unmatched value sets under one key

use crate::fingerprint::Fingerprint;

/// Result of pairing two lists of fingerprints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
    /// `(source position, target position)`, ordered by source position
    pub pairs: Vec<(usize, usize)>,
    pub unpaired_source: Vec<usize>,
    pub unpaired_target: Vec<usize>,
}

/// Pair source and target fingerprints so the total number of differing
/// columns is minimal. The shorter side is fully paired; the surplus of the
/// longer side is left unpaired.
pub fn pair_fingerprints(source: &[Fingerprint], target: &[Fingerprint]) -> Pairing {
    let cost: Vec<Vec<usize>> = source
        .iter()
        .map(|s| target.iter().map(|t| s.distance(t)).collect())
        .collect();
    let pairs = min_cost_assignment(&cost, target.len());

    let mut source_used = vec![false; source.len()];
    let mut target_used = vec![false; target.len()];
    for &(i, j) in &pairs {
        source_used[i] = true;
        target_used[j] = true;
    }

    Pairing {
        pairs,
        unpaired_source: (0..source.len()).filter(|&i| !source_used[i]).collect(),
        unpaired_target: (0..target.len()).filter(|&j| !target_used[j]).collect(),
    }
}

/// Hungarian algorithm over an `n x m` cost matrix.
///
/// Returns `min(n, m)` pairs `(row, column)` sorted by row. Strict
/// comparisons make the lowest index win among equal-cost choices.
pub fn min_cost_assignment(cost: &[Vec<usize>], columns: usize) -> Vec<(usize, usize)> {
    let rows = cost.len();
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    debug_assert!(cost.iter().all(|r| r.len() == columns));

    if rows > columns {
        let transposed: Vec<Vec<usize>> = (0..columns)
            .map(|j| (0..rows).map(|i| cost[i][j]).collect())
            .collect();
        let mut pairs: Vec<(usize, usize)> = min_cost_assignment(&transposed, rows)
            .into_iter()
            .map(|(j, i)| (i, j))
            .collect();
        pairs.sort_unstable();
        return pairs;
    }

    const INF: i64 = i64::MAX / 4;
    // 1-based potentials; index 0 is the virtual column
    let mut u = vec![0i64; rows + 1];
    let mut v = vec![0i64; columns + 1];
    let mut owner = vec![0usize; columns + 1];
    let mut way = vec![0usize; columns + 1];

    for i in 1..=rows {
        owner[0] = i;
        let mut j0 = 0usize;
        let mut min_slack = vec![INF; columns + 1];
        let mut used = vec![false; columns + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=columns {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] as i64 - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }
            for j in 0..=columns {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }
            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = (1..=columns)
        .filter(|&j| owner[j] != 0)
        .map(|j| (owner[j] - 1, j - 1))
        .collect();
    pairs.sort_unstable();
    pairs
}
