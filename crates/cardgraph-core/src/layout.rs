//! # Spring Layout
//!
//! Fruchterman-Reingold force-directed placement.
//!
//! Every node repels every other node with `k² / d`, and adjacent nodes
//! attract with `w · d² / k` where `w` is the edge weight. A temperature
//! caps how far a node moves per iteration and cools linearly to zero.
//! Initial positions come from a seeded generator, so the same graph and
//! settings always produce the same layout.

use crate::NodeIndex;
use crate::graph::Graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Minimum pairwise distance used in force computations.
const MIN_DISTANCE: f64 = 0.01;

/// Mean per-node movement below which the simulation stops early.
const CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Spring layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Optimal distance between nodes.
    pub k: f64,
    /// Maximum number of simulation steps.
    pub iterations: usize,
    /// Largest absolute coordinate after rescaling.
    pub scale: f64,
    /// Seed of the initial placement.
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            k: 2.5,
            iterations: 50,
            scale: 1000.0,
            seed: 42,
        }
    }
}

/// A position in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node positions, aligned with node insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    positions: Vec<Point>,
}

impl Layout {
    /// Position of a node, if it was laid out.
    #[must_use]
    pub fn position(&self, index: NodeIndex) -> Option<Point> {
        self.positions.get(index.value()).copied()
    }

    /// All positions in node order.
    #[must_use]
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Number of positioned nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if nothing was laid out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Compute a spring layout for `graph`.
#[must_use]
pub fn spring_layout(graph: &Graph, settings: &LayoutSettings) -> Layout {
    let n = graph.node_count();
    match n {
        0 => return Layout::default(),
        1 => {
            return Layout {
                positions: vec![Point::default()],
            };
        }
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut pos: Vec<[f64; 2]> = (0..n)
        .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();

    let springs: Vec<(usize, usize, f64)> = graph
        .edges()
        .map(|(a, b, connection)| (a.value(), b.value(), f64::from(connection.weight.value())))
        .collect();

    let k = if settings.k > 0.0 {
        settings.k
    } else {
        (1.0 / n as f64).sqrt()
    };
    let mut temperature = extent(&pos) * 0.1;
    let cooling = temperature / (settings.iterations as f64 + 1.0);

    for _ in 0..settings.iterations {
        let mut displacement = vec![[0.0_f64; 2]; n];

        // Repulsion between every pair
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / (distance * distance);
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
        }

        // Attraction along edges, scaled by weight
        for &(a, b, weight) in &springs {
            let dx = pos[a][0] - pos[b][0];
            let dy = pos[a][1] - pos[b][1];
            let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let pull = weight * distance / k;
            displacement[a][0] -= dx * pull;
            displacement[a][1] -= dy * pull;
            displacement[b][0] += dx * pull;
            displacement[b][1] += dy * pull;
        }

        let mut moved_sq = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let mut length = (d[0] * d[0] + d[1] * d[1]).sqrt();
            if length < MIN_DISTANCE {
                length = 0.1;
            }
            let step_x = d[0] * temperature / length;
            let step_y = d[1] * temperature / length;
            p[0] += step_x;
            p[1] += step_y;
            moved_sq += step_x * step_x + step_y * step_y;
        }

        temperature -= cooling;
        if moved_sq.sqrt() / (n as f64) < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    Layout {
        positions: rescale(&pos, settings.scale),
    }
}

/// Larger of the x and y ranges.
fn extent(pos: &[[f64; 2]]) -> f64 {
    let range = |axis: usize| {
        let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        hi - lo
    };
    range(0).max(range(1))
}

/// Center on the mean and scale so the largest |coordinate| equals `scale`.
fn rescale(pos: &[[f64; 2]], scale: f64) -> Vec<Point> {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;

    let centered: Vec<Point> = pos
        .iter()
        .map(|p| Point {
            x: p[0] - mean_x,
            y: p[1] - mean_y,
        })
        .collect();

    let limit = centered
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0_f64, f64::max);

    if limit > 0.0 {
        let factor = scale / limit;
        centered
            .into_iter()
            .map(|p| Point {
                x: p.x * factor,
                y: p.y * factor,
            })
            .collect()
    } else {
        centered
    }
}

// =============================================================================
// TESTS
// =============================================================================
