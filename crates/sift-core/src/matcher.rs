//! Exact and inexact graph matching.
//!
//! Two entry points: [`new_edge_match`], the constant-time fast path used
//! during beam search when the match threshold is zero, and
//! [`inexact_match`], a branch-and-bound search over vertex assignments that
//! bounds the edit cost of mapping one graph onto another. An exact match has
//! cost 0 and implies isomorphism.

use fixedbitset::FixedBitSet;

use crate::graph::{Graph, VertexId};
use crate::instance::{Instance, VertexMap};
use crate::label::{LabelId, LabelTable};

/// Result of an inexact match.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Whether a complete assignment within the bound was found.
    pub matched: bool,

    /// Cost of the best complete assignment found; infinity when none was
    /// within the bound.
    pub cost: f64,

    /// Best assignment, when requested: `mapping[u]` is the `g2` vertex for
    /// `g1` vertex `u`, or `None` for a deleted vertex.
    pub mapping: Option<Vec<Option<VertexId>>>,
}

/// Absolute cost bound corresponding to a relative `threshold` in `[0, 1]`:
/// the threshold scales with the larger of the two graph sizes.
pub fn match_bound(threshold: f64, g1: &Graph, g2: &Graph) -> f64 {
    threshold * g1.size().max(g2.size()) as f64
}

/// Do `g1` and `g2` match within `threshold` (relative, see [`match_bound`])?
pub fn graphs_match(g1: &Graph, g2: &Graph, labels: &LabelTable, threshold: f64) -> bool {
    inexact_match(g1, g2, labels, match_bound(threshold, g1, g2), false).matched
}

/// Fast path for sibling instances produced in the same extension round.
///
/// `seed` spawned the candidate substructure; `candidate` is tested for
/// membership. Both were extended from instances of the same parent
/// substructure, so their mappings share the parent's local numbering and the
/// new vertex (if any) received the same fresh local on both sides. The
/// candidate belongs iff the newly added edges agree on label and
/// directedness, the newly added vertices (if any) agree on label, and the
/// new edges connect the same pair of pattern-local vertices, in either
/// order for an undirected edge.
///
/// A `false` answer is not final: the pattern is rotationally invariant, so
/// the caller falls back to the full matcher.
pub fn new_edge_match(
    seed: &Instance,
    seed_host: &Graph,
    candidate: &Instance,
    candidate_host: &Graph,
) -> bool {
    let (Some(se), Some(ce)) = (seed.newest_edge(), candidate.newest_edge()) else {
        return false;
    };
    let e1 = &seed_host.edges[se];
    let e2 = &candidate_host.edges[ce];
    if e1.label != e2.label || e1.directed != e2.directed {
        return false;
    }

    match (seed.newest_vertex(), candidate.newest_vertex()) {
        (None, None) => {}
        (Some(v1), Some(v2)) => {
            if seed_host.vertices[v1].label != candidate_host.vertices[v2].label {
                return false;
            }
        }
        _ => return false,
    }

    let (Some((a1, a2)), Some((b1, b2))) = (seed.new_edge_ends, candidate.new_edge_ends) else {
        return false;
    };
    let s = (seed.mapping[a1].sub_vertex, seed.mapping[a2].sub_vertex);
    let c = (
        candidate.mapping[b1].sub_vertex,
        candidate.mapping[b2].sub_vertex,
    );
    s == c || (!e1.directed && s == (c.1, c.0))
}

/// Branch-and-bound inexact match of `g1` onto `g2`.
///
/// Vertices of `g1` are assigned in index order, each either to an unused
/// `g2` vertex or to deletion; candidate targets are tried in ascending index
/// order and only strict improvements are kept, so ties resolve to the lowest
/// branch index and the result is deterministic. A branch is abandoned as
/// soon as its accumulated cost exceeds `bound` or reaches the best complete
/// cost found so far.
///
/// Edit costs: `1 − overlap` per vertex label substitution, 1 per unmapped
/// vertex on either side, and per endpoint pair the edge-multiset distance
/// (edges agreeing on label and orientation are free, paired leftovers cost 1
/// as label or direction substitutions, unpaired leftovers cost 1 as
/// deletions).
pub fn inexact_match(
    g1: &Graph,
    g2: &Graph,
    labels: &LabelTable,
    bound: f64,
    want_mapping: bool,
) -> MatchOutcome {
    let mut state = MatchState {
        g1,
        g2,
        labels,
        bound,
        want_mapping,
        assigned: vec![None; g1.vertex_count()],
        used2: FixedBitSet::with_capacity(g2.vertex_count()),
        best_cost: f64::INFINITY,
        best_mapping: None,
    };
    state.search(0, 0.0);

    let matched = state.best_cost <= bound;
    MatchOutcome {
        matched,
        cost: state.best_cost,
        mapping: if matched { state.best_mapping } else { None },
    }
}

struct MatchState<'a> {
    g1: &'a Graph,
    g2: &'a Graph,
    labels: &'a LabelTable,
    bound: f64,
    want_mapping: bool,
    /// Decisions for g1 vertices below the current depth:
    /// `Some(None)` = deleted, `Some(Some(v))` = mapped to `v`.
    assigned: Vec<Option<Option<VertexId>>>,
    used2: FixedBitSet,
    best_cost: f64,
    best_mapping: Option<Vec<Option<VertexId>>>,
}

impl MatchState<'_> {
    fn search(&mut self, depth: usize, cost: f64) {
        if cost > self.bound || cost >= self.best_cost {
            return;
        }
        if depth == self.g1.vertex_count() {
            let total = cost + self.leftover_cost();
            if total < self.best_cost {
                self.best_cost = total;
                if self.want_mapping {
                    self.best_mapping =
                        Some(self.assigned.iter().map(|d| d.unwrap_or(None)).collect());
                }
            }
            return;
        }

        for v in 0..self.g2.vertex_count() {
            if self.used2.contains(v) {
                continue;
            }
            let delta = self.assign_cost(depth, Some(v));
            self.assigned[depth] = Some(Some(v));
            self.used2.insert(v);
            self.search(depth + 1, cost + delta);
            self.used2.set(v, false);
            self.assigned[depth] = None;
        }

        let delta = self.assign_cost(depth, None);
        self.assigned[depth] = Some(None);
        self.search(depth + 1, cost + delta);
        self.assigned[depth] = None;
    }

    /// Cost of deciding g1 vertex `u`: its own label or deletion cost plus
    /// the edge costs between `u` and every already-decided vertex
    /// (including `u` itself, which settles self-loops).
    fn assign_cost(&self, u: usize, target: Option<VertexId>) -> f64 {
        let mut cost = match target {
            Some(v) => self
                .labels
                .match_cost(self.g1.vertices[u].label, self.g2.vertices[v].label),
            None => 1.0,
        };

        for u2 in 0..=u {
            if u2 < u && self.assigned[u2].is_none() {
                continue;
            }
            let e1 = self.g1.edges_between(u, u2);
            let decided2 = if u2 == u {
                target
            } else {
                self.assigned[u2].unwrap_or(None)
            };
            match (target, decided2) {
                (Some(v), Some(v2)) => {
                    let e2 = self.g2.edges_between(v, v2);
                    cost += self.edge_set_cost(&e1, u, &e2, v);
                }
                _ => {
                    // at least one endpoint deleted: every g1 edge of the
                    // pair is deleted; g2-side edges surface as leftovers
                    cost += e1.len() as f64;
                }
            }
            if cost > self.bound || cost >= self.best_cost {
                break;
            }
        }
        cost
    }

    /// Distance between the edge multisets of one endpoint pair. `anchor1`
    /// and `anchor2` orient directed edges consistently on both sides.
    fn edge_set_cost(&self, e1: &[usize], anchor1: VertexId, e2: &[usize], anchor2: VertexId) -> f64 {
        let key1: Vec<(LabelId, bool, bool)> = e1
            .iter()
            .map(|&e| edge_key(self.g1, e, anchor1))
            .collect();
        let mut key2: Vec<Option<(LabelId, bool, bool)>> = e2
            .iter()
            .map(|&e| Some(edge_key(self.g2, e, anchor2)))
            .collect();

        let mut unmatched1 = 0usize;
        for k in &key1 {
            match key2.iter_mut().find(|s| **s == Some(*k)) {
                Some(slot) => *slot = None,
                None => unmatched1 += 1,
            }
        }
        let unmatched2 = key2.iter().filter(|s| s.is_some()).count();
        unmatched1.max(unmatched2) as f64
    }

    /// Cost of everything not settled by the assignment: g2 vertices outside
    /// the image and g2 edges with an endpoint outside the image. Edges
    /// between two image vertices were already priced during assignment.
    fn leftover_cost(&self) -> f64 {
        let mut cost = 0.0;
        for v in 0..self.g2.vertex_count() {
            if !self.used2.contains(v) {
                cost += 1.0;
            }
        }
        for edge in &self.g2.edges {
            if !self.used2.contains(edge.source) || !self.used2.contains(edge.target) {
                cost += 1.0;
            }
        }
        cost
    }
}

/// Orientation-normalised comparison key of an edge relative to `anchor`:
/// label, directedness, and (for directed non-loops) whether the edge leaves
/// the anchor.
fn edge_key(g: &Graph, e: usize, anchor: VertexId) -> (LabelId, bool, bool) {
    let edge = &g.edges[e];
    let forward = !edge.directed || edge.is_loop() || edge.source == anchor;
    (edge.label, edge.directed, forward)
}

/// Rebuild an instance mapping from a complete matcher assignment: pattern
/// local `u` corresponds to host vertex `instance.vertices[mapping[u]]`.
/// Returns `None` when the assignment deleted any vertex.
pub fn mapping_from_assignment(
    instance: &Instance,
    assignment: &[Option<VertexId>],
) -> Option<Vec<VertexMap>> {
    let mut mapping = Vec::with_capacity(assignment.len());
    for (sub_vertex, target) in assignment.iter().enumerate() {
        let idx = (*target)?;
        mapping.push(VertexMap {
            sub_vertex,
            host_vertex: instance.vertices[idx],
        });
    }
    Some(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    fn labels_abc() -> (LabelTable, LabelId, LabelId, LabelId) {
        let mut t = LabelTable::new();
        let a = t.insert(Label::Text("a".into()));
        let b = t.insert(Label::Text("b".into()));
        let x = t.insert(Label::Text("x".into()));
        (t, a, b, x)
    }

    fn triangle(a: LabelId, x: LabelId, rotate: usize) -> Graph {
        let mut g = Graph::new();
        for _ in 0..3 {
            g.add_vertex(a);
        }
        for i in 0..3 {
            let s = (i + rotate) % 3;
            g.add_edge(s, (s + 1) % 3, true, x);
        }
        g
    }

    #[test]
    fn test_exact_match_of_rotated_triangles() {
        let (t, a, _, x) = labels_abc();
        let g1 = triangle(a, x, 0);
        let g2 = triangle(a, x, 1);
        let outcome = inexact_match(&g1, &g2, &t, 0.0, true);
        assert!(outcome.matched);
        assert_eq!(outcome.cost, 0.0);
        let mapping = outcome.mapping.unwrap();
        assert!(mapping.iter().all(|m| m.is_some()));
    }

    #[test]
    fn test_vertex_label_substitution_costs_one() {
        let (t, a, b, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        g1.add_vertex(a);
        g1.add_edge(0, 1, true, x);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_vertex(b);
        g2.add_edge(0, 1, true, x);

        let outcome = inexact_match(&g1, &g2, &t, 5.0, false);
        assert_eq!(outcome.cost, 1.0);
        assert!(!graphs_match(&g1, &g2, &t, 0.0));
        // relative threshold: bound = 1/3 * 3 = 1
        assert!(graphs_match(&g1, &g2, &t, 1.0 / 3.0));
    }

    #[test]
    fn test_missing_edge_costs_one() {
        let (t, a, _, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        g1.add_vertex(a);
        g1.add_edge(0, 1, true, x);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_vertex(a);

        let outcome = inexact_match(&g1, &g2, &t, 5.0, false);
        assert_eq!(outcome.cost, 1.0);
    }

    #[test]
    fn test_direction_mismatch_counts_as_substitution() {
        let (t, a, _, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        g1.add_vertex(a);
        g1.add_edge(0, 1, true, x);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_vertex(a);
        g2.add_edge(0, 1, false, x);

        let outcome = inexact_match(&g1, &g2, &t, 5.0, false);
        assert_eq!(outcome.cost, 1.0);
    }

    #[test]
    fn test_size_mismatch_charges_deletions() {
        let (t, a, _, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_vertex(a);
        g2.add_edge(0, 1, true, x);

        // one extra vertex + one extra edge on the g2 side
        let outcome = inexact_match(&g1, &g2, &t, 5.0, false);
        assert_eq!(outcome.cost, 2.0);
    }

    #[test]
    fn test_self_loop_matching() {
        let (t, a, _, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        g1.add_edge(0, 0, true, x);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_edge(0, 0, true, x);
        assert!(graphs_match(&g1, &g2, &t, 0.0));
    }

    #[test]
    fn test_reversed_directed_edge_is_isomorphic_under_permutation() {
        let (t, a, _, x) = labels_abc();
        let mut g1 = Graph::new();
        g1.add_vertex(a);
        g1.add_vertex(a);
        g1.add_edge(0, 1, true, x);
        let mut g2 = Graph::new();
        g2.add_vertex(a);
        g2.add_vertex(a);
        g2.add_edge(1, 0, true, x);
        // swapping the two vertices aligns the arrows
        assert!(graphs_match(&g1, &g2, &t, 0.0));
    }
}
