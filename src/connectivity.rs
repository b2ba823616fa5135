//! Fully dynamic connectivity: edges come and go one at a time, `same`
//! answers against the current graph.
//!
//! Every edge lives at a level. Tree edges span levels 0..=m and are marked
//! promotable at m only; extra edges sit at a single level. When a tree edge
//! disappears, the replacement search walks the smaller remainder at the top
//! level and pushes everything it inspects one level up, so the same work is
//! never paid twice. An edge can rise O(log n) times, each inspection costs
//! O(log n), hence the O(log² n) amortized bound per update.

use std::collections::BTreeMap;

use crate::euler_tour::{EulerTourForest, TourAgg, TourData};
use crate::lists::{Idx, Lists};

pub trait DynamicConnectivity {
    /// New instance for an edgeless graph on n vertices (ids 0..n).
    fn new(n: usize) -> Self;
    /// Adds the edge (a, b), even if a copy exists. True iff the component
    /// count dropped. Self loops are rejected.
    fn link(&mut self, a: usize, b: usize) -> bool;
    /// Removes one copy of the edge (a, b).
    fn cut(&mut self, a: usize, b: usize) -> CutResult;
    /// Whether a and b are connected.
    fn same(&mut self, a: usize, b: usize) -> bool;
    /// A representative vertex of a's component: equal for connected
    /// vertices, stable only while no link or cut happens.
    fn find(&mut self, a: usize) -> usize;
    /// Number of vertices in a's component.
    fn size(&mut self, a: usize) -> usize;
    /// Number of connected components.
    fn count_cc(&self) -> usize;
}

/// Outcome of [`DynamicConnectivity::cut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutResult {
    /// No such edge.
    Absent,
    /// The edge was a bridge; removing it split a component.
    Bridge,
    /// The edge was removed and its endpoints stayed connected.
    StillConnected,
}

/// Everything tracked for one level.
#[derive(Debug)]
struct Level<L: Lists<TourAgg>> {
    forest: EulerTourForest<L>,
    /// Extra-edge neighbor multisets per vertex.
    extra: Vec<BTreeMap<usize, usize>>,
    /// Tree edges at this level, keyed by ordered endpoint pair, mapped to
    /// their direction tokens in `forest`.
    tree: BTreeMap<(usize, usize), (Idx, Idx)>,
}

impl<L: Lists<TourAgg>> Level<L> {
    fn new(n: usize) -> Self {
        Self {
            forest: EulerTourForest::new(n),
            extra: vec![BTreeMap::new(); n],
            tree: BTreeMap::new(),
        }
    }
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Connectivity solver over leveled Euler tour forests.
#[derive(Debug)]
pub struct EttConnectivity<L: Lists<TourAgg>> {
    n: usize,
    components: usize,
    /// Grows lazily; level 0 always exists and holds every vertex.
    levels: Vec<Level<L>>,
}

impl<L: Lists<TourAgg>> EttConnectivity<L> {
    /// Number of levels currently in use.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn ensure_level(&mut self, k: usize) {
        while self.levels.len() <= k {
            self.levels.push(Level::new(self.n));
        }
    }

    /// Registers (a, b) as an extra edge at level k.
    fn add_extra(&mut self, k: usize, a: usize, b: usize) {
        self.ensure_level(k);
        let lvl = &mut self.levels[k];
        if lvl.extra[a].is_empty() {
            lvl.forest.note_extra(a, true);
        }
        *lvl.extra[a].entry(b).or_insert(0) += 1;
        if lvl.extra[b].is_empty() {
            lvl.forest.note_extra(b, true);
        }
        *lvl.extra[b].entry(a).or_insert(0) += 1;
    }

    /// Removes one copy of the extra edge (a, b) at level k, if present.
    fn remove_extra(&mut self, k: usize, a: usize, b: usize) -> bool {
        if self.drop_extra_entry(k, a, b) {
            self.drop_extra_entry(k, b, a);
            true
        } else {
            false
        }
    }

    fn drop_extra_entry(&mut self, k: usize, a: usize, b: usize) -> bool {
        let lvl = &mut self.levels[k];
        let Some(mult) = lvl.extra[a].get_mut(&b) else {
            return false;
        };
        *mult -= 1;
        if *mult == 0 {
            lvl.extra[a].remove(&b);
        }
        if lvl.extra[a].is_empty() {
            lvl.forest.note_extra(a, false);
        }
        true
    }

    /// Looks for an edge reconnecting the two tours left by removing the
    /// tree edge (a, b), scanning level k first and recursing downward.
    fn replace(&mut self, a: usize, b: usize, k: usize) -> bool {
        // Both sizes are read before the first promotion: the choice of
        // side must not observe any mutation made on its behalf.
        let sa = self.levels[k].forest.tour_len(a);
        let sb = self.levels[k].forest.tour_len(b);
        let side = if sa > sb { b } else { a };
        log::trace!("replace({a}, {b}) at level {k}: scanning the side of {side}");

        loop {
            let Some(token) = self.levels[k].forest.target(side) else {
                break;
            };
            match self.levels[k].forest.data(token).clone() {
                TourData::Edge { s, t, .. } => {
                    // Keep the tree edge here and register it one level up,
                    // so the next search over this piece starts higher.
                    log::trace!("promoting tree edge ({s}, {t}) to level {}", k + 1);
                    self.ensure_level(k + 1);
                    let (e1, e2) = self.levels[k + 1].forest.link(s, t, true);
                    self.levels[k + 1].tree.insert(key(s, t), (e1, e2));
                    self.levels[k].forest.mark_promoted(token);
                }
                TourData::Vertex { id: c, .. } => {
                    loop {
                        let Some(&d) = self.levels[k].extra[c].keys().next() else {
                            break;
                        };
                        self.remove_extra(k, c, d);
                        if self.levels[k].forest.same(c, d) {
                            // Lands back on the same side; promote it so
                            // this level never scans it again.
                            log::trace!("promoting extra edge ({c}, {d}) to level {}", k + 1);
                            self.add_extra(k + 1, c, d);
                        } else {
                            // Reconnects the two sides. Tree edge here and
                            // at every level below, promotable only here.
                            log::trace!("replacement edge ({c}, {d}) found at level {k}");
                            for i in (0..=k).rev() {
                                let (e1, e2) = self.levels[i].forest.link(c, d, i == k);
                                self.levels[i].tree.insert(key(c, d), (e1, e2));
                            }
                            return true;
                        }
                    }
                }
            }
        }
        if k > 0 {
            self.replace(a, b, k - 1)
        } else {
            false
        }
    }
}

impl<L: Lists<TourAgg>> DynamicConnectivity for EttConnectivity<L> {
    fn new(n: usize) -> Self {
        let mut level0 = Level::new(n);
        for v in 0..n {
            level0.forest.vertex_token(v);
        }
        Self {
            n,
            components: n,
            levels: vec![level0],
        }
    }

    fn link(&mut self, a: usize, b: usize) -> bool {
        assert!(a != b, "self loops carry no connectivity");
        if self.levels[0].forest.same(a, b) {
            self.add_extra(0, a, b);
            false
        } else {
            let (e1, e2) = self.levels[0].forest.link(a, b, true);
            self.levels[0].tree.insert(key(a, b), (e1, e2));
            self.components -= 1;
            true
        }
    }

    fn cut(&mut self, a: usize, b: usize) -> CutResult {
        if a == b {
            return CutResult::Absent;
        }
        let e = key(a, b);
        if !self.levels[0].tree.contains_key(&e) {
            // At most an extra edge; the lowest level holding a copy wins.
            for k in 0..self.levels.len() {
                if self.remove_extra(k, a, b) {
                    return CutResult::StillConnected;
                }
            }
            return CutResult::Absent;
        }
        let mut top = 0;
        for k in 0..self.levels.len() {
            let Some((e1, e2)) = self.levels[k].tree.remove(&e) else {
                break;
            };
            self.levels[k].forest.cut(e1, e2);
            top = k;
        }
        if self.replace(a, b, top) {
            CutResult::StillConnected
        } else {
            self.components += 1;
            CutResult::Bridge
        }
    }

    fn same(&mut self, a: usize, b: usize) -> bool {
        self.levels[0].forest.same(a, b)
    }

    fn find(&mut self, a: usize) -> usize {
        self.levels[0].forest.tour_head(a)
    }

    fn size(&mut self, a: usize) -> usize {
        self.levels[0].forest.tour_vertices(a)
    }

    fn count_cc(&self) -> usize {
        self.components
    }
}
