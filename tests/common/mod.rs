//! Shared fixtures for integration tests: seeded random instances and
//! independent reference solvers.

#![allow(dead_code)]

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sparse_lapjv::{AssignmentState, SparseCostGraph};

/// Cost used for missing pairs when expanding to a dense integer matrix
pub const DENSE_MISSING: i64 = 1_000_000;

/// Random feasible instance: a hidden permutation guarantees a perfect
/// matching, then each row gets up to `extra` more random columns.
/// Costs are small integers so float sums are exact.
pub fn random_rows(seed: u64, n: usize, extra: usize, max_cost: i64) -> Vec<Vec<(usize, f64)>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(&mut rng);

    (0..n)
        .map(|i| {
            let mut row = BTreeMap::new();
            row.insert(perm[i], rng.gen_range(0..=max_cost) as f64);
            for _ in 0..extra {
                let j = rng.gen_range(0..n);
                row.entry(j)
                    .or_insert_with(|| rng.gen_range(0..=max_cost) as f64);
            }
            row.into_iter().collect()
        })
        .collect()
}

pub fn random_graph(seed: u64, n: usize, extra: usize, max_cost: i64) -> SparseCostGraph {
    SparseCostGraph::from_rows(&random_rows(seed, n, extra, max_cost))
        .expect("generated rows are sorted and finite")
}

/// Like `random_graph` but with costs drawn uniformly from `[0, max_cost)`,
/// so dual updates round.
pub fn random_fractional_graph(seed: u64, n: usize, extra: usize, max_cost: f64) -> SparseCostGraph {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    let rows: Vec<Vec<(usize, f64)>> = random_rows(seed, n, extra, 1)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(j, _)| (j, rng.gen_range(0.0..max_cost)))
                .collect()
        })
        .collect();
    SparseCostGraph::from_rows(&rows).expect("generated rows are sorted and finite")
}

/// Arbitrary consistent partial matching over existing edges, with small
/// integer column prices. Held columns are usually not the cheapest ones.
pub fn random_partial_state(seed: u64, graph: &SparseCostGraph) -> AssignmentState {
    let n = graph.n();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = AssignmentState::new(n);
    let mut rows: Vec<usize> = (0..n).collect();
    rows.shuffle(&mut rng);

    for i in rows {
        if rng.gen_bool(0.3) {
            continue;
        }
        let free: Vec<usize> = graph
            .row_entries(i)
            .map(|(j, _)| j)
            .filter(|&j| state.y[j] == n)
            .collect();
        if let Some(&j) = free.choose(&mut rng) {
            state.assign(i, j);
        }
    }
    for v in state.v.iter_mut() {
        *v = rng.gen_range(-5..=5) as f64;
    }
    state
}

/// Minimum cost over all perfect matchings, by enumeration
pub fn exhaustive_min(graph: &SparseCostGraph) -> Option<f64> {
    fn walk(
        graph: &SparseCostGraph,
        row: usize,
        used: &mut Vec<bool>,
        acc: f64,
        best: &mut Option<f64>,
    ) {
        if row == graph.n() {
            if best.map_or(true, |b| acc < b) {
                *best = Some(acc);
            }
            return;
        }
        for (j, c) in graph.row_entries(row) {
            if used[j] || !c.is_finite() {
                continue;
            }
            used[j] = true;
            walk(graph, row + 1, used, acc + c, best);
            used[j] = false;
        }
    }

    let mut best = None;
    walk(graph, 0, &mut vec![false; graph.n()], 0.0, &mut best);
    best
}

/// Dense O(n^3) Hungarian method on integer costs
pub fn hungarian(costs: &[Vec<i64>]) -> Vec<usize> {
    let n = costs.len();
    if n == 0 {
        return Vec::new();
    }

    let inf = i64::MAX / 4;
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = costs[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Optimal cost via the dense reference, missing pairs priced out
pub fn dense_reference_cost(graph: &SparseCostGraph) -> i64 {
    let dense: Vec<Vec<i64>> = graph
        .to_dense()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|c| if c.is_finite() { c as i64 } else { DENSE_MISSING })
                .collect()
        })
        .collect();
    hungarian(&dense)
        .iter()
        .enumerate()
        .map(|(i, &j)| dense[i][j])
        .sum()
}
