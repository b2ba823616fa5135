use debug_tree::{add_branch_to, AsTree, TreeBuilder};
use derivative::Derivative;

use super::{node2_fmt, node_fmt, AggregatedData, Idx, Lists, SearchData, SearchDirection};

#[derive(Derivative)]
#[derivative(Debug)]
struct Node<Ag: AggregatedData> {
    #[derivative(Debug(format_with = "node_fmt"))]
    parent: Idx,
    /// Left and right child
    #[derivative(Debug(format_with = "node2_fmt"))]
    child: [Idx; 2],
    /// Data for this node
    data: Ag::Data,
    /// Aggregated data for this node's subtree
    ag_data: Ag,
    size: usize,
}

impl<Ag: AggregatedData> Node<Ag> {
    fn new(data: Ag::Data) -> Self {
        Self {
            ag_data: Ag::from(&data),
            data,
            child: [Splays::<Ag>::EMPTY; 2],
            parent: Splays::<Ag>::EMPTY,
            size: 1,
        }
    }
}

/// Splay tree engine. Every access splays the touched node to the root of
/// its list, so queries restructure the tree and their cost is amortized.
pub struct Splays<Ag: AggregatedData = ()> {
    nodes: Vec<Node<Ag>>,
}

impl<Ag: AggregatedData> std::fmt::Debug for Splays<Ag> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("Splays");
        for u in 0..self.nodes.len() {
            if self.nodes[u].parent == Self::EMPTY {
                self.tree_inorder_dbg(u, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl<Ag: AggregatedData> Splays<Ag> {
    fn tree_inorder_dbg<T: AsTree>(&self, u: Idx, tree: &T) {
        let nu = &self.nodes[u];
        if nu.child[0] != Self::EMPTY {
            add_branch_to!(*tree, "left child of {u}");
            self.tree_inorder_dbg(nu.child[0], tree);
        }
        add_branch_to!(*tree, "[{u}] {nu:?}");
        if nu.child[1] != Self::EMPTY {
            self.tree_inorder_dbg(nu.child[1], tree);
        }
    }
    fn n(&self, u: Idx) -> Option<&Node<Ag>> {
        if u == Self::EMPTY {
            None
        } else {
            Some(&self.nodes[u])
        }
    }
    fn size(&self, u: Idx) -> usize {
        self.n(u).map_or(0, |n| n.size)
    }
    fn parent(&self, u: Idx) -> Idx {
        self.n(u).map_or(Self::EMPTY, |n| n.parent)
    }
    fn ag_data(&self, u: Idx) -> Ag {
        self.n(u).map_or_else(Ag::default, |n| n.ag_data.clone())
    }
    /// Which child of its parent u is. u must have a parent.
    fn side(&self, u: Idx) -> usize {
        let p = self.nodes[u].parent;
        (self.nodes[p].child[1] == u) as usize
    }
    // Call when children are changed.
    fn recalc(&mut self, u: Idx) {
        let [l, r] = self.nodes[u].child;
        self.nodes[u].size = self.size(l) + 1 + self.size(r);
        self.nodes[u].ag_data = self
            .ag_data(l)
            .merge(Ag::from(&self.nodes[u].data))
            .merge(self.ag_data(r));
    }
    /// Rotates u above its parent, keeping the in-order sequence intact.
    fn rotate(&mut self, u: Idx) {
        let p = self.nodes[u].parent;
        let g = self.nodes[p].parent;
        let i = self.side(u);
        let mid = self.nodes[u].child[1 - i];
        self.nodes[p].child[i] = mid;
        if mid != Self::EMPTY {
            self.nodes[mid].parent = p;
        }
        self.nodes[u].child[1 - i] = p;
        self.nodes[p].parent = u;
        self.nodes[u].parent = g;
        if g != Self::EMPTY {
            let gi = (self.nodes[g].child[1] == p) as usize;
            self.nodes[g].child[gi] = u;
        }
        self.recalc(p);
        self.recalc(u);
    }
    /// Moves u to the root of its list with zig / zig-zig / zig-zag steps.
    /// Recalcs u first, so it also refreshes ancestors after a data change.
    fn splay(&mut self, u: Idx) {
        self.recalc(u);
        loop {
            let p = self.parent(u);
            if p == Self::EMPTY {
                break;
            }
            if self.parent(p) == Self::EMPTY {
                self.rotate(u);
            } else if self.side(u) == self.side(p) {
                self.rotate(p);
                self.rotate(u);
            } else {
                self.rotate(u);
                self.rotate(u);
            }
        }
    }
    /// K-th node of the subtree rooted at u, splayed to the root. k < size.
    fn kth_under(&mut self, mut u: Idx, mut k: usize) -> Idx {
        loop {
            let [l, r] = self.nodes[u].child;
            let szl = self.size(l);
            if k < szl {
                u = l;
            } else if k == szl {
                break;
            } else {
                k -= szl + 1;
                u = r;
            }
        }
        self.splay(u);
        u
    }
    /// (First k nodes, rest)
    fn split_k(&mut self, u: Idx, k: usize) -> (Idx, Idx) {
        if u == Self::EMPTY {
            return (Self::EMPTY, Self::EMPTY);
        }
        self.splay(u);
        if k == 0 {
            return (Self::EMPTY, u);
        }
        if k >= self.nodes[u].size {
            return (u, Self::EMPTY);
        }
        let x = self.kth_under(u, k);
        let l = self.nodes[x].child[0];
        self.nodes[x].child[0] = Self::EMPTY;
        if l != Self::EMPTY {
            self.nodes[l].parent = Self::EMPTY;
        }
        self.recalc(x);
        (l, x)
    }
}

impl<Ag: AggregatedData> Lists<Ag> for Splays<Ag> {
    const EMPTY: Idx = usize::MAX;

    fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    fn create(&mut self, data: Ag::Data) -> Idx {
        let idx = self.nodes.len();
        self.nodes.push(Node::new(data));
        idx
    }

    fn total_size(&self) -> usize {
        self.nodes.len()
    }

    fn root(&mut self, u: Idx) -> Idx {
        if u != Self::EMPTY {
            self.splay(u);
        }
        u
    }

    fn data(&self, u: Idx) -> &Ag::Data {
        &self.nodes[u].data
    }

    fn mutate_data(&mut self, u: Idx, f: impl FnOnce(&mut Ag::Data)) {
        f(&mut self.nodes[u].data);
        // splay starts by recalcing u and refreshes everything above it
        self.splay(u);
    }

    fn order(&mut self, u: Idx) -> usize {
        self.splay(u);
        self.size(self.nodes[u].child[0])
    }

    fn on_same_list(&mut self, u: Idx, v: Idx) -> bool {
        if u == v {
            return true;
        }
        if u == Self::EMPTY || v == Self::EMPTY {
            return false;
        }
        // Ancestor check: after splaying both, u hangs below v iff they
        // share a list. No allocation, and both paths get rebalanced.
        self.splay(u);
        self.splay(v);
        self.parent(u) != Self::EMPTY
    }

    fn find_element(
        &mut self,
        u: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx {
        if u == Self::EMPTY {
            return Self::EMPTY;
        }
        self.splay(u);
        let mut cur = u;
        use SearchDirection::*;
        while cur != Self::EMPTY {
            let [l, r] = self.nodes[cur].child;
            let (left_agg, right_agg) = (self.ag_data(l), self.ag_data(r));
            match search_strategy(SearchData {
                current_data: &self.nodes[cur].data,
                left_agg: &left_agg,
                right_agg: &right_agg,
            }) {
                Found => {
                    self.splay(cur);
                    return cur;
                }
                NotFound => return Self::EMPTY,
                Left => cur = l,
                Right => cur = r,
            }
        }
        Self::EMPTY
    }

    fn find_kth(&mut self, u: Idx, k: usize) -> Idx {
        if u == Self::EMPTY {
            return Self::EMPTY;
        }
        self.splay(u);
        if k >= self.nodes[u].size {
            return Self::EMPTY;
        }
        self.kth_under(u, k)
    }

    fn len(&mut self, u: Idx) -> usize {
        if u == Self::EMPTY {
            0
        } else {
            self.splay(u);
            self.nodes[u].size
        }
    }

    fn total_agg(&mut self, u: Idx) -> Ag {
        if u == Self::EMPTY {
            Ag::default()
        } else {
            self.splay(u);
            self.nodes[u].ag_data.clone()
        }
    }

    fn range_agg_lr(&mut self, u: Idx, l: usize, r: usize) -> Ag {
        if u == Self::EMPTY || l >= r {
            return Ag::default();
        }
        // Carve the range out, read its cached aggregate, stitch back.
        let (a, m, b) = self.split_lr(u, l, r);
        let ag = self.ag_data(m);
        let am = self.concat(a, m);
        self.concat(am, b);
        ag
    }

    fn concat(&mut self, u: Idx, v: Idx) -> Idx {
        log::trace!(
            "concat({u}, {v})",
            u = super::PrettyIdx(u),
            v = super::PrettyIdx(v)
        );
        if u == Self::EMPTY {
            return self.root(v);
        }
        if v == Self::EMPTY {
            return self.root(u);
        }
        if self.on_same_list(u, v) {
            return self.root(u);
        }
        // The ancestor check left u and v as the roots of their lists.
        let mut last = u;
        while self.nodes[last].child[1] != Self::EMPTY {
            last = self.nodes[last].child[1];
        }
        self.splay(last);
        self.nodes[last].child[1] = v;
        self.nodes[v].parent = last;
        self.recalc(last);
        last
    }

    fn split_lr(&mut self, u: Idx, l: usize, r: usize) -> (Idx, Idx, Idx) {
        debug_assert!(l <= r, "invalid range {l}..{r}");
        let (left, rest) = self.split_k(u, l);
        let (mid, right) = self.split_k(rest, r - l);
        (left, mid, right)
    }
}
