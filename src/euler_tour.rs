//! Forests represented by their Euler tours, stored in [`Lists`] engines.
//!
//! A tree with k vertices is a single list of 3k-2 tokens: one token per
//! vertex and one per direction of each tree edge. Linking and cutting trees
//! become list splices and splits, so they inherit the engine's logarithmic
//! amortized cost.

use crate::lists::{AggregatedData, Idx, Lists, SearchData, SearchDirection};

/// One token of an Euler tour.
#[derive(Debug, Clone)]
pub enum TourData {
    Vertex {
        id: usize,
        /// The vertex holds extra (non-tree) edges at this forest's level.
        has_extra: bool,
    },
    Edge {
        s: usize,
        t: usize,
        /// Tree edge not yet carried one level up. Set on one direction
        /// token only, at the highest level the edge occupies.
        promotable: bool,
    },
}

impl TourData {
    /// Search priority: promotable tree edges beat vertices with extras.
    pub fn priority(&self) -> u8 {
        match self {
            TourData::Edge {
                promotable: true, ..
            } => 2,
            TourData::Vertex {
                has_extra: true, ..
            } => 1,
            _ => 0,
        }
    }
}

/// Aggregate over a range of tour tokens.
#[derive(Debug, Clone, Default)]
pub struct TourAgg {
    /// Highest token priority in the range.
    pub best: u8,
    /// Number of vertex tokens in the range.
    pub vertices: usize,
}

impl AggregatedData for TourAgg {
    type Data = TourData;
    fn from(data: &Self::Data) -> Self {
        Self {
            best: data.priority(),
            vertices: matches!(data, TourData::Vertex { .. }) as usize,
        }
    }
    fn merge(self, right: Self) -> Self {
        Self {
            best: self.best.max(right.best),
            vertices: self.vertices + right.vertices,
        }
    }
}

/// One forest of Euler tours. Vertex tokens are created on first use and
/// never destroyed; edge tokens cycle through a pool owned by this forest.
#[derive(Debug)]
pub struct EulerTourForest<L: Lists<TourAgg>> {
    lists: L,
    /// Token of each vertex, EMPTY until first used.
    vertex: Vec<Idx>,
    /// Tokens of removed tree edges, reused by later links.
    spares: Vec<Idx>,
}

impl<L: Lists<TourAgg>> EulerTourForest<L> {
    pub fn new(n: usize) -> Self {
        Self {
            lists: L::new(n),
            vertex: vec![L::EMPTY; n],
            spares: Vec::new(),
        }
    }

    /// Token for v, created as an isolated single-token tour on first use.
    pub fn vertex_token(&mut self, v: usize) -> Idx {
        if self.vertex[v] == L::EMPTY {
            self.vertex[v] = self.lists.create(TourData::Vertex {
                id: v,
                has_extra: false,
            });
        }
        self.vertex[v]
    }

    pub fn data(&self, token: Idx) -> &TourData {
        self.lists.data(token)
    }

    /// Tokens ever allocated, pooled spares included.
    pub fn token_count(&self) -> usize {
        self.lists.total_size()
    }

    /// Whether a and b share a tour. Both must have tokens here.
    pub fn same(&mut self, a: usize, b: usize) -> bool {
        let (ta, tb) = (self.vertex[a], self.vertex[b]);
        self.lists.on_same_list(ta, tb)
    }

    /// Number of vertices in a's tour.
    pub fn tour_vertices(&mut self, a: usize) -> usize {
        let t = self.vertex[a];
        self.lists.total_agg(t).vertices
    }

    /// Number of tokens in a's tour.
    pub fn tour_len(&mut self, a: usize) -> usize {
        let t = self.vertex[a];
        self.lists.len(t)
    }

    /// Id of the vertex whose token opens a's tour. Stays put as long as no
    /// link or cut touches the tour.
    pub fn tour_head(&mut self, a: usize) -> usize {
        let t = self.vertex[a];
        let head = self.lists.first(t);
        match self.lists.data(head) {
            TourData::Vertex { id, .. } => *id,
            TourData::Edge { .. } => unreachable!("tour starts with a vertex token"),
        }
    }

    /// Tokens of a's tour, in tour order. For inspection and tests.
    pub fn tour(&mut self, a: usize) -> Vec<Idx> {
        let t = self.vertex[a];
        let n = self.lists.len(t);
        (0..n).map(|k| self.lists.find_kth(t, k)).collect()
    }

    /// Rotates u's tour so u comes first.
    fn make_first(&mut self, u: Idx) {
        let k = self.lists.order(u);
        if k > 0 {
            let (_, before, from_u) = self.lists.split(u, ..k);
            self.lists.concat(from_u, before);
        }
    }

    /// A tree-edge token, preferably recycled from the pool.
    fn edge_token(&mut self, s: usize, t: usize, promotable: bool) -> Idx {
        let data = TourData::Edge { s, t, promotable };
        match self.spares.pop() {
            Some(e) => {
                self.lists.mutate_data(e, |d| *d = data);
                e
            }
            None => self.lists.create(data),
        }
    }

    /// Splices b's tour into a's with a pair of directed edge tokens,
    /// returning them (a→b first). The tours must be distinct.
    pub fn link(&mut self, a: usize, b: usize, promotable: bool) -> (Idx, Idx) {
        let ta = self.vertex_token(a);
        let tb = self.vertex_token(b);
        assert!(
            !self.lists.on_same_list(ta, tb),
            "link endpoints already share a tour"
        );
        let out = self.edge_token(a, b, promotable);
        let inp = self.edge_token(b, a, false);
        self.make_first(tb);
        let k = self.lists.order(ta);
        let (_, up_to_a, rest) = self.lists.split(ta, ..=k);
        self.lists.concat_all([up_to_a, out, tb, inp, rest]);
        (out, inp)
    }

    /// Removes a tree edge given its two direction tokens, splitting the
    /// tour. Returns the roots of the two remaining tours; the tokens go
    /// back to the pool.
    pub fn cut(&mut self, e1: Idx, e2: Idx) -> (Idx, Idx) {
        let (o1, o2) = (self.lists.order(e1), self.lists.order(e2));
        let (lo, hi) = if o1 < o2 { (o1, o2) } else { (o2, o1) };
        let (before, mid, after) = self.lists.split(e1, lo..=hi);
        let mlen = self.lists.len(mid);
        let (x, inner, y) = self.lists.split(mid, 1..mlen - 1);
        self.spares.push(x);
        self.spares.push(y);
        (self.lists.concat(before, after), inner)
    }

    /// Highest-priority token in a's tour, or None when every token is
    /// priority 0.
    pub fn target(&mut self, a: usize) -> Option<Idx> {
        let t = self.vertex[a];
        let best = self.lists.total_agg(t).best;
        if best == 0 {
            return None;
        }
        let found = self.lists.find_element(t, |s: SearchData<'_, TourAgg>| {
            if s.current_data.priority() == best {
                SearchDirection::Found
            } else if s.left_agg.best == best {
                SearchDirection::Left
            } else {
                SearchDirection::Right
            }
        });
        assert_ne!(found, L::EMPTY, "aggregate promised a priority-{best} token");
        Some(found)
    }

    /// Records whether v currently holds extra edges at this level.
    pub fn note_extra(&mut self, v: usize, has_extra: bool) {
        let t = self.vertex_token(v);
        self.lists.mutate_data(t, |d| match d {
            TourData::Vertex { has_extra: h, .. } => *h = has_extra,
            TourData::Edge { .. } => unreachable!("vertex token expected"),
        });
    }

    /// Clears the promotable mark of a tree-edge token.
    pub fn mark_promoted(&mut self, e: Idx) {
        self.lists.mutate_data(e, |d| match d {
            TourData::Edge { promotable, .. } => *promotable = false,
            TourData::Vertex { .. } => unreachable!("edge token expected"),
        });
    }
}
