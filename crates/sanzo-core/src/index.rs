//! Nearest-neighbor index over LAB points
//!
//! A balanced k-d tree splitting on L, a, b in turn. The tree prunes by
//! CIE76, the Euclidean metric it partitions by, so only CIE76 queries walk
//! it. CIE94 and CIEDE2000 are not bounded by CIE76 distance and are served
//! by an exact linear scan over the same candidates.
//!
//! An index is built once per batch and owned by whoever built it. It is
//! immutable after [`SpatialIndex::build`], so shared references may query
//! it from several threads.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::color::Lab;
use crate::difference::{DeltaEAlgorithm, cie76};

/// Below this many points a linear scan beats walking the tree
const MIN_INDEXED_POINTS: usize = 16;

/// One search result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Position in the candidate list the index was built from
    pub index: usize,
    pub lab: Lab,
    pub distance: f64,
}

#[derive(Debug, Clone)]
struct Node {
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Shape of a built index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub size: usize,
    pub depth: usize,
}

/// k-d tree over LAB candidates
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    points: Vec<Lab>,
    nodes: Vec<Node>,
    root: Option<usize>,
    depth: usize,
}

impl SpatialIndex {
    /// Build an index; empty, single and duplicate inputs are all fine
    pub fn build(candidates: &[Lab]) -> Self {
        let mut index = Self {
            points: candidates.to_vec(),
            nodes: Vec::with_capacity(candidates.len()),
            root: None,
            depth: 0,
        };
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        index.root = index.build_node(&mut order, 0);
        index
    }

    fn build_node(&mut self, order: &mut [usize], depth: usize) -> Option<usize> {
        if order.is_empty() {
            return None;
        }
        self.depth = self.depth.max(depth + 1);

        let axis = depth % 3;
        let median = order.len() / 2;
        let points = &self.points;
        order.select_nth_unstable_by(median, |&i, &j| {
            points[i].to_array()[axis].total_cmp(&points[j].to_array()[axis])
        });

        let point = order[median];
        let (lower, rest) = order.split_at_mut(median);
        let upper = &mut rest[1..];

        let left = self.build_node(lower, depth + 1);
        let right = self.build_node(upper, depth + 1);
        self.nodes.push(Node {
            point,
            axis,
            left,
            right,
        });
        Some(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of levels in the tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            size: self.len(),
            depth: self.depth,
        }
    }

    /// The `k` closest candidates, ascending by distance
    ///
    /// Returns fewer than `k` results when there are fewer candidates.
    /// Only CIE76 walks the tree; other formulas, small or degenerate
    /// indexes, and `k` close to the candidate count use a linear scan.
    pub fn k_nearest(&self, target: Lab, k: usize, algorithm: DeltaEAlgorithm) -> Vec<Neighbor> {
        let k = k.min(self.len());
        if k == 0 {
            return Vec::new();
        }

        let use_tree = algorithm == DeltaEAlgorithm::Cie76
            && self.root.is_some()
            && self.len() >= MIN_INDEXED_POINTS
            && k.saturating_mul(2) < self.len();
        if !use_tree {
            return linear_k_nearest(&self.points, target, k, algorithm);
        }

        let mut heap = BinaryHeap::with_capacity(k.saturating_add(1));
        self.search(self.root, target, k, &mut heap);

        let mut found: Vec<Neighbor> = heap
            .into_iter()
            .map(|entry| Neighbor {
                index: entry.index,
                lab: self.points[entry.index],
                distance: entry.distance,
            })
            .collect();
        sort_neighbors(&mut found);
        found.truncate(k);
        found
    }

    fn search(&self, node: Option<usize>, target: Lab, k: usize, heap: &mut BinaryHeap<HeapEntry>) {
        let Some(node) = node else {
            return;
        };
        let node = &self.nodes[node];
        let point = self.points[node.point];

        let distance = cie76(target, point);
        if heap.len() < k {
            heap.push(HeapEntry::new(distance, node.point));
        } else if heap.peek().is_some_and(|worst| distance < worst.distance) {
            heap.pop();
            heap.push(HeapEntry::new(distance, node.point));
        }

        let diff = target.to_array()[node.axis] - point.to_array()[node.axis];
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, target, k, heap);
        let crosses = heap.len() < k || heap.peek().is_some_and(|worst| diff.abs() <= worst.distance);
        if crosses {
            self.search(far, target, k, heap);
        }
    }
}

/// Linear-scan k-nearest over a plain candidate list
pub fn linear_k_nearest(
    candidates: &[Lab],
    target: Lab,
    k: usize,
    algorithm: DeltaEAlgorithm,
) -> Vec<Neighbor> {
    let mut all: Vec<Neighbor> = candidates
        .iter()
        .enumerate()
        .map(|(index, &lab)| Neighbor {
            index,
            lab,
            distance: algorithm.distance(target, lab),
        })
        .collect();
    sort_neighbors(&mut all);
    all.truncate(k);
    all
}

fn sort_neighbors(neighbors: &mut [Neighbor]) {
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
}

/// Max-heap entry keyed on distance, ties broken by index
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    distance: f64,
    index: usize,
}

impl HeapEntry {
    fn new(distance: f64, index: usize) -> Self {
        Self { distance, index }
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALGORITHMS: [DeltaEAlgorithm; 3] = [
        DeltaEAlgorithm::Cie76,
        DeltaEAlgorithm::Cie94,
        DeltaEAlgorithm::Ciede2000,
    ];

    fn grid() -> Vec<Lab> {
        let mut points = Vec::new();
        for l in (0..=100).step_by(20) {
            for a in (-60..=60).step_by(30) {
                for b in (-60..=60).step_by(30) {
                    points.push(Lab::new(l as f64, a as f64, b as f64));
                }
            }
        }
        points
    }

    #[test]
    fn test_empty_and_single() {
        let empty = SpatialIndex::build(&[]);
        assert!(empty.is_empty());
        assert!(empty.k_nearest(Lab::default(), 3, DeltaEAlgorithm::Cie76).is_empty());

        let single = SpatialIndex::build(&[Lab::new(50.0, 0.0, 0.0)]);
        let found = single.k_nearest(Lab::new(40.0, 0.0, 0.0), 5, DeltaEAlgorithm::Cie76);
        assert_eq!(found.len(), 1);
        assert!((found[0].distance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicates() {
        let points = vec![Lab::new(50.0, 10.0, 10.0); 40];
        let index = SpatialIndex::build(&points);
        let found = index.k_nearest(Lab::new(50.0, 10.0, 10.0), 3, DeltaEAlgorithm::Cie76);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|n| n.distance == 0.0));
    }

    #[test]
    fn test_tree_matches_linear_scan_cie76() {
        let points = grid();
        let index = SpatialIndex::build(&points);
        assert!(index.depth() >= 7, "depth = {}", index.depth());

        for target in [
            Lab::new(37.0, 12.0, -44.0),
            Lab::new(95.0, -70.0, 70.0),
            Lab::new(3.0, 1.0, 2.0),
        ] {
            let tree = index.k_nearest(target, 5, DeltaEAlgorithm::Cie76);
            let linear = linear_k_nearest(&points, target, 5, DeltaEAlgorithm::Cie76);
            let tree_d: Vec<f64> = tree.iter().map(|n| n.distance).collect();
            let linear_d: Vec<f64> = linear.iter().map(|n| n.distance).collect();
            assert_eq!(tree_d, linear_d, "target {target:?}");
        }
    }

    #[test]
    fn test_results_sorted_and_exact_member_first() {
        let points = grid();
        let index = SpatialIndex::build(&points);
        let target = points[57];
        let found = index.k_nearest(target, 4, DeltaEAlgorithm::Ciede2000);
        assert_eq!(found[0].index, 57);
        assert_eq!(found[0].distance, 0.0);
        for pair in found.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_ciede2000_nearest_outside_cie76_neighborhood() {
        // Twenty points sit closer by CIE76 but farther by CIEDE2000
        let mut points = vec![Lab::new(40.0, 70.0, 0.0); 20];
        points.push(Lab::new(50.0, 100.0, 0.0));
        let index = SpatialIndex::build(&points);
        let target = Lab::new(50.0, 70.0, 0.0);

        let found = index.k_nearest(target, 1, DeltaEAlgorithm::Ciede2000);
        let linear = linear_k_nearest(&points, target, 1, DeltaEAlgorithm::Ciede2000);
        assert_eq!(found[0].index, 20);
        assert_eq!(found, linear);
        assert!((found[0].distance - 6.2177).abs() < 1e-3, "distance = {}", found[0].distance);
    }

    #[test]
    fn test_tree_matches_linear_scan_all_algorithms() {
        let mut points = grid();
        // Uneven jitter so distances rarely tie
        for (i, p) in points.iter_mut().enumerate() {
            let j = (i * 7919 % 101) as f64 / 25.0;
            *p = Lab::new(p.l + j / 3.0, p.a - j, p.b + j / 2.0);
        }
        let index = SpatialIndex::build(&points);

        let targets = [
            Lab::new(50.0, 70.0, 0.0),
            Lab::new(37.0, 12.0, -44.0),
            Lab::new(95.0, -70.0, 70.0),
            Lab::new(62.0, 40.0, 55.0),
            Lab::new(3.0, 1.0, 2.0),
        ];
        for algorithm in ALGORITHMS {
            for target in targets {
                for k in [1, 5, 12] {
                    let tree = index.k_nearest(target, k, algorithm);
                    let linear = linear_k_nearest(&points, target, k, algorithm);
                    assert_eq!(tree.len(), k);
                    for (t, l) in tree.iter().zip(&linear) {
                        assert!(
                            (t.distance - l.distance).abs() < 1e-9,
                            "{algorithm:?} k={k} target {target:?}: {} vs {}",
                            t.distance,
                            l.distance
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_huge_k_clamped_to_len() {
        let points = grid();
        let index = SpatialIndex::build(&points);
        for algorithm in ALGORITHMS {
            let found = index.k_nearest(Lab::new(50.0, 0.0, 0.0), usize::MAX, algorithm);
            assert_eq!(found.len(), points.len());
        }
    }

    #[test]
    fn test_scarce_candidates_return_fewer() {
        let points = grid();
        let index = SpatialIndex::build(&points[..5]);
        let found = index.k_nearest(Lab::default(), 10, DeltaEAlgorithm::Cie94);
        assert_eq!(found.len(), 5);
    }
}
