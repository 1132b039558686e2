//! Occurrences of a pattern inside a host graph.
//!
//! An [`Instance`] is a snapshot of one occurrence: sorted vertex and edge
//! index lists plus a mapping from pattern-local vertex numbers to host
//! vertex indices. Instances are shared between the extension round that
//! produced them and the candidate substructure that adopted them, so they
//! are handed around as `Rc<Instance>`; the two transient per-round fields
//! (`min_match_cost`, `used`) are `Cell`s and every routine that sets `used`
//! clears it again before returning.

use std::cell::Cell;
use std::rc::Rc;

use fixedbitset::FixedBitSet;

use crate::graph::{EdgeId, Graph, VertexId};

/// One entry of an instance's vertex mapping: pattern-local vertex
/// `sub_vertex` corresponds to host vertex `host_vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexMap {
    pub sub_vertex: usize,
    pub host_vertex: VertexId,
}

/// A specific occurrence of a substructure in a host graph.
#[derive(Debug)]
pub struct Instance {
    /// Host vertex indices, strictly ascending.
    pub vertices: Vec<VertexId>,

    /// Host edge indices, strictly ascending.
    pub edges: Vec<EdgeId>,

    /// Pattern-local to host-vertex correspondence, one entry per vertex.
    pub mapping: Vec<VertexMap>,

    /// Positions in `mapping` of the endpoints of the most recently added
    /// edge; `None` for seed instances.
    pub new_edge_ends: Option<(usize, usize)>,

    /// Position in `vertices` at which the last extension inserted a vertex,
    /// or `None` when the extension added only an edge.
    pub new_vertex: Option<usize>,

    /// Position in `edges` at which the last extension inserted its edge.
    pub new_edge: Option<usize>,

    /// The instance this one was extended from. Only consulted while the
    /// extension round that created this instance is live.
    pub parent: Option<Rc<Instance>>,

    /// Minimum match cost seen so far against any candidate definition;
    /// infinity until the first match attempt. A recorded zero means the
    /// instance has been exactly matched and claimed.
    pub min_match_cost: Cell<f64>,

    /// Claim flag: set while a candidate substructure adopts instances in the
    /// current extension round, cleared before the round returns.
    pub used: Cell<bool>,
}

impl Instance {
    /// Seed instance: a single host vertex, mapped to pattern-local 0.
    pub fn single_vertex(v: VertexId) -> Instance {
        Instance {
            vertices: vec![v],
            edges: Vec::new(),
            mapping: vec![VertexMap {
                sub_vertex: 0,
                host_vertex: v,
            }],
            new_edge_ends: None,
            new_vertex: None,
            new_edge: None,
            parent: None,
            min_match_cost: Cell::new(f64::INFINITY),
            used: Cell::new(false),
        }
    }

    /// Structural equality: identical vertex and edge lists. Both lists are
    /// sorted, so a direct comparison suffices.
    pub fn same_structure(&self, other: &Instance) -> bool {
        self.vertices == other.vertices && self.edges == other.edges
    }

    /// Two instances overlap iff they share at least one host vertex.
    pub fn overlaps(&self, other: &Instance) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.vertices.len() && j < other.vertices.len() {
            match self.vertices[i].cmp(&other.vertices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.binary_search(&v).is_ok()
    }

    /// The host edge added by the extension that produced this instance.
    pub fn newest_edge(&self) -> Option<EdgeId> {
        self.new_edge.map(|pos| self.edges[pos])
    }

    /// The host vertex added by the extension that produced this instance.
    pub fn newest_vertex(&self) -> Option<VertexId> {
        self.new_vertex.map(|pos| self.vertices[pos])
    }

    /// Pattern-local index of host vertex `v` under this instance's mapping.
    pub fn local_of(&self, v: VertexId) -> Option<usize> {
        self.mapping
            .iter()
            .find(|m| m.host_vertex == v)
            .map(|m| m.sub_vertex)
    }

    /// Build the induced pattern graph of this instance. Vertices are
    /// renumbered by their position in the sorted vertex list; edge endpoint
    /// order and directedness are preserved.
    pub fn to_graph(&self, host: &Graph) -> Graph {
        let mut g = Graph::with_capacity(self.vertices.len(), self.edges.len());
        for &v in &self.vertices {
            g.add_vertex(host.vertices[v].label);
        }
        for &e in &self.edges {
            let edge = &host.edges[e];
            let s = self
                .vertices
                .binary_search(&edge.source)
                .expect("edge endpoint inside instance");
            let t = self
                .vertices
                .binary_search(&edge.target)
                .expect("edge endpoint inside instance");
            g.add_edge(s, t, edge.directed, edge.label);
        }
        g
    }

    /// Clone of this instance carrying a replacement mapping, used when the
    /// full matcher admits the instance under a permutation the extension
    /// step did not produce. Extension bookkeeping is cleared because its
    /// positions refer to the old local numbering.
    pub fn with_mapping(&self, mapping: Vec<VertexMap>) -> Instance {
        Instance {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            mapping,
            new_edge_ends: None,
            new_vertex: None,
            new_edge: None,
            parent: self.parent.clone(),
            min_match_cost: Cell::new(self.min_match_cost.get()),
            used: Cell::new(false),
        }
    }

    /// Merge two instances of the same substructure, plus the edges
    /// connecting them, into one. Used when fusing the members of a
    /// recursive chain. The left operand's mapping is kept; it no longer
    /// covers every vertex, which is fine because fused instances are never
    /// extended.
    pub fn union(a: &Instance, b: &Instance, connecting: &[EdgeId]) -> Instance {
        let mut vertices = merge_sorted(&a.vertices, &b.vertices);
        vertices.dedup();
        let mut edges = merge_sorted(&a.edges, &b.edges);
        for &e in connecting {
            if let Err(pos) = edges.binary_search(&e) {
                edges.insert(pos, e);
            }
        }
        edges.dedup();
        Instance {
            vertices,
            edges,
            mapping: a.mapping.clone(),
            new_edge_ends: None,
            new_vertex: None,
            new_edge: None,
            parent: None,
            min_match_cost: Cell::new(f64::INFINITY),
            used: Cell::new(false),
        }
    }
}

fn merge_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] <= b[j] {
            out.push(a[i]);
            i += 1;
        } else {
            out.push(b[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// All one-edge extensions of `instance` inside `host`.
///
/// `scratch` is an edge-indexed mark buffer; it is grown as needed, used to
/// skip the instance's own edges and to visit each incident edge once, and
/// cleared again before returning. An edge joining two instance vertices
/// therefore yields a single extension even though it is reachable from both
/// endpoints.
pub fn extensions(instance: &Rc<Instance>, host: &Graph, scratch: &mut FixedBitSet) -> Vec<Instance> {
    if scratch.len() < host.edge_count() {
        scratch.grow(host.edge_count());
    }
    for &e in &instance.edges {
        scratch.insert(e);
    }

    let mut out = Vec::new();
    for &v in &instance.vertices {
        for &e in &host.vertices[v].edges {
            if scratch.contains(e) {
                continue;
            }
            scratch.insert(e);
            out.push(extend_by_edge(instance, host, e));
        }
    }

    scratch.clear();
    out
}

/// Build the instance that results from adding host edge `e` to `instance`.
fn extend_by_edge(instance: &Rc<Instance>, host: &Graph, e: EdgeId) -> Instance {
    let edge = &host.edges[e];

    let mut vertices = instance.vertices.clone();
    let mut new_vertex = None;
    let far = if instance.contains_vertex(edge.source) {
        edge.target
    } else {
        edge.source
    };
    if let Err(pos) = vertices.binary_search(&far) {
        vertices.insert(pos, far);
        new_vertex = Some(pos);
    }

    let mut edges = instance.edges.clone();
    let epos = edges
        .binary_search(&e)
        .expect_err("extension edge not already in instance");
    edges.insert(epos, e);

    let mut mapping = instance.mapping.clone();
    if new_vertex.is_some() {
        mapping.push(VertexMap {
            sub_vertex: mapping.len(),
            host_vertex: far,
        });
    }
    let mi1 = mapping
        .iter()
        .position(|m| m.host_vertex == edge.source)
        .expect("edge source mapped");
    let mi2 = mapping
        .iter()
        .position(|m| m.host_vertex == edge.target)
        .expect("edge target mapped");

    Instance {
        vertices,
        edges,
        mapping,
        new_edge_ends: Some((mi1, mi2)),
        new_vertex,
        new_edge: Some(epos),
        parent: Some(Rc::clone(instance)),
        min_match_cost: Cell::new(f64::INFINITY),
        used: Cell::new(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{Label, LabelTable};

    fn path_host() -> (Graph, LabelTable) {
        // a - b - a, undirected edges labelled e
        let mut labels = LabelTable::new();
        let a = labels.insert(Label::Text("a".into()));
        let b = labels.insert(Label::Text("b".into()));
        let e = labels.insert(Label::Text("e".into()));
        let mut g = Graph::new();
        let v0 = g.add_vertex(a);
        let v1 = g.add_vertex(b);
        let v2 = g.add_vertex(a);
        g.add_edge(v0, v1, false, e);
        g.add_edge(v1, v2, false, e);
        (g, labels)
    }

    #[test]
    fn test_extensions_from_single_vertex() {
        let (host, _) = path_host();
        let mut scratch = FixedBitSet::with_capacity(host.edge_count());
        let seed = Rc::new(Instance::single_vertex(1));
        let exts = extensions(&seed, &host, &mut scratch);
        assert_eq!(exts.len(), 2);
        assert_eq!(exts[0].vertices, vec![0, 1]);
        assert_eq!(exts[0].edges, vec![0]);
        assert_eq!(exts[1].vertices, vec![1, 2]);
        assert_eq!(exts[1].edges, vec![1]);
        // scratch cleared on return
        assert_eq!(scratch.count_ones(..), 0);
    }

    #[test]
    fn test_extension_records_new_positions_and_mapping() {
        let (host, _) = path_host();
        let mut scratch = FixedBitSet::with_capacity(host.edge_count());
        let seed = Rc::new(Instance::single_vertex(1));
        let exts = extensions(&seed, &host, &mut scratch);
        let ext = &exts[0]; // added vertex 0 via edge 0
        assert_eq!(ext.new_vertex, Some(0));
        assert_eq!(ext.new_edge, Some(0));
        assert_eq!(ext.newest_vertex(), Some(0));
        assert_eq!(ext.newest_edge(), Some(0));
        assert_eq!(
            ext.mapping,
            vec![
                VertexMap {
                    sub_vertex: 0,
                    host_vertex: 1
                },
                VertexMap {
                    sub_vertex: 1,
                    host_vertex: 0
                },
            ]
        );
        // edge 0 goes 0 -> 1; local endpoints via mapping positions
        assert_eq!(ext.new_edge_ends, Some((1, 0)));
        assert!(Rc::ptr_eq(ext.parent.as_ref().unwrap(), &seed));
    }

    #[test]
    fn test_closing_edge_adds_no_vertex() {
        // triangle
        let mut g = Graph::new();
        for _ in 0..3 {
            g.add_vertex(0);
        }
        g.add_edge(0, 1, true, 1);
        g.add_edge(1, 2, true, 1);
        g.add_edge(2, 0, true, 1);

        let mut scratch = FixedBitSet::with_capacity(g.edge_count());
        let seed = Rc::new(Instance::single_vertex(0));
        let two = Rc::new(
            extensions(&seed, &g, &mut scratch)
                .into_iter()
                .find(|i| i.vertices == vec![0, 1])
                .unwrap(),
        );
        let three = Rc::new(
            extensions(&two, &g, &mut scratch)
                .into_iter()
                .find(|i| i.vertices == vec![0, 1, 2])
                .unwrap(),
        );
        let closed = extensions(&three, &g, &mut scratch)
            .into_iter()
            .find(|i| i.edges.len() == 3)
            .unwrap();
        assert_eq!(closed.vertices, vec![0, 1, 2]);
        assert_eq!(closed.new_vertex, None);
        assert_eq!(closed.edges, vec![0, 1, 2]);
    }

    #[test]
    fn test_overlap_and_containment() {
        let a = Instance {
            vertices: vec![0, 2, 4],
            ..Instance::single_vertex(0)
        };
        let b = Instance {
            vertices: vec![1, 3, 4],
            ..Instance::single_vertex(1)
        };
        let c = Instance {
            vertices: vec![5, 7],
            ..Instance::single_vertex(5)
        };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains_vertex(2));
        assert!(!a.contains_vertex(3));
    }

    #[test]
    fn test_union_merges_and_dedupes() {
        let a = Instance {
            vertices: vec![0, 1],
            edges: vec![0],
            ..Instance::single_vertex(0)
        };
        let b = Instance {
            vertices: vec![1, 2],
            edges: vec![1],
            ..Instance::single_vertex(1)
        };
        let merged = Instance::union(&a, &b, &[5]);
        assert_eq!(merged.vertices, vec![0, 1, 2]);
        assert_eq!(merged.edges, vec![0, 1, 5]);
    }

    #[test]
    fn test_to_graph_renumbers_by_sorted_position() {
        let (host, labels) = path_host();
        let inst = Instance {
            vertices: vec![1, 2],
            edges: vec![1],
            ..Instance::single_vertex(1)
        };
        let g = inst.to_graph(&host);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(labels.get(g.vertices[0].label), &Label::Text("b".into()));
        assert_eq!(labels.get(g.vertices[1].label), &Label::Text("a".into()));
        assert_eq!(g.edges[0].source, 0);
        assert_eq!(g.edges[0].target, 1);
    }
}
