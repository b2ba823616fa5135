use debug_tree::{add_branch_to, AsTree, TreeBuilder};
use derivative::Derivative;
use rand::{rngs, Rng, SeedableRng};

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
    #[derivative(Debug = "ignore")]
    priority: u32,
}

impl<Ag: AggregatedData> Node<Ag> {
    fn new(data: Ag::Data, priority: u32) -> Self {
        Self {
            ag_data: Ag::from(&data),
            data,
            child: [Treaps::<Ag>::EMPTY; 2],
            parent: Treaps::<Ag>::EMPTY,
            size: 1,
            priority,
        }
    }
}

/// Treap engine. Balance comes from random priorities, so queries leave the
/// tree untouched and only concat/split restructure it.
pub struct Treaps<Ag: AggregatedData = ()> {
    nodes: Vec<Node<Ag>>,
    rng: rngs::StdRng,
}

impl<Ag: AggregatedData> std::fmt::Debug for Treaps<Ag> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("Treaps");
        for u in 0..self.nodes.len() {
            if self.nodes[u].parent == Self::EMPTY {
                self.tree_inorder_dbg(u, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl<Ag: AggregatedData> Treaps<Ag> {
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
    // Call when children are changed.
    fn recalc(&mut self, u: Idx) {
        let [l, r] = self.nodes[u].child;
        self.nodes[u].size = self.size(l) + 1 + self.size(r);
        self.nodes[u].ag_data = self
            .ag_data(l)
            .merge(Ag::from(&self.nodes[u].data))
            .merge(self.ag_data(r));
    }
    /// Replaces child i of u, detaching the old one. Returns the old child.
    fn change_child(&mut self, u: Idx, i: usize, new: Idx) -> Idx {
        let old = self.nodes[u].child[i];
        if old != Self::EMPTY {
            self.nodes[old].parent = Self::EMPTY;
        }
        self.nodes[u].child[i] = new;
        if new != Self::EMPTY {
            self.nodes[new].parent = u;
        }
        self.recalc(u);
        old
    }
    fn concat_inner(&mut self, u: Idx, v: Idx) -> Idx {
        if u == Self::EMPTY {
            return v;
        }
        if v == Self::EMPTY {
            return u;
        }
        if self.nodes[u].priority > self.nodes[v].priority {
            let old_r = self.change_child(u, 1, Self::EMPTY);
            let new_r = self.concat_inner(old_r, v);
            self.change_child(u, 1, new_r);
            u
        } else {
            let old_l = self.change_child(v, 0, Self::EMPTY);
            let new_l = self.concat_inner(u, old_l);
            self.change_child(v, 0, new_l);
            v
        }
    }
    /// (First k nodes, rest). u must be the root of its detached subtree.
    fn split_k(&mut self, u: Idx, k: usize) -> (Idx, Idx) {
        if u == Self::EMPTY || k == 0 {
            // If k == 0 the node is fully returned on the right
            return (Self::EMPTY, u);
        }
        let [l, r] = self.nodes[u].child;
        let szl = self.size(l);
        if k <= szl {
            self.change_child(u, 0, Self::EMPTY);
            let (ll, lr) = self.split_k(l, k);
            (ll, self.concat_inner(lr, u))
        } else {
            self.change_child(u, 1, Self::EMPTY);
            let (rl, rr) = self.split_k(r, k - szl - 1);
            (self.concat_inner(u, rl), rr)
        }
    }
    fn range_agg_inner(&self, u: Idx, ql: usize, qr: usize) -> Ag {
        if u == Self::EMPTY || ql >= qr {
            return Ag::default();
        }
        if ql == 0 && qr >= self.size(u) {
            return self.ag_data(u);
        }
        let [l, r] = self.nodes[u].child;
        let szl = self.size(l);
        let mut ag = Ag::default();
        if ql < szl {
            ag = self.range_agg_inner(l, ql, qr.min(szl));
        }
        if ql <= szl && qr > szl {
            ag = ag.merge(Ag::from(&self.nodes[u].data));
        }
        if qr > szl + 1 {
            let rag = self.range_agg_inner(r, ql.saturating_sub(szl + 1), qr - (szl + 1));
            ag = ag.merge(rag);
        }
        ag
    }
}

impl<Ag: AggregatedData> Lists<Ag> for Treaps<Ag> {
    const EMPTY: Idx = usize::MAX;

    fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            rng: rand::rngs::StdRng::seed_from_u64(2012),
        }
    }

    fn create(&mut self, data: Ag::Data) -> Idx {
        let idx = self.nodes.len();
        let priority = self.rng.gen();
        self.nodes.push(Node::new(data, priority));
        idx
    }

    fn total_size(&self) -> usize {
        self.nodes.len()
    }

    fn root(&mut self, mut u: Idx) -> Idx {
        while self.parent(u) != Self::EMPTY {
            u = self.nodes[u].parent;
        }
        u
    }

    fn data(&self, u: Idx) -> &Ag::Data {
        &self.nodes[u].data
    }

    fn mutate_data(&mut self, mut u: Idx, f: impl FnOnce(&mut Ag::Data)) {
        f(&mut self.nodes[u].data);
        while u != Self::EMPTY {
            self.recalc(u);
            u = self.parent(u);
        }
    }

    fn order(&mut self, u: Idx) -> usize {
        let mut path = vec![u];
        let mut cur = self.parent(u);
        while cur != Self::EMPTY {
            path.push(cur);
            cur = self.parent(cur);
        }
        path.reverse();
        let mut ord = 0;
        for w in path.windows(2) {
            let [p, c] = [w[0], w[1]];
            if c == self.nodes[p].child[1] {
                ord += self.size(self.nodes[p].child[0]) + 1;
            }
        }
        ord + self.size(self.nodes[u].child[0])
    }

    fn find_element(
        &mut self,
        u: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx {
        let mut u = self.root(u);
        use SearchDirection::*;
        while u != Self::EMPTY {
            let [l, r] = self.nodes[u].child;
            match search_strategy(SearchData {
                current_data: self.data(u),
                left_agg: &self.ag_data(l),
                right_agg: &self.ag_data(r),
            }) {
                Found => return u,
                NotFound => return Self::EMPTY,
                Left => u = l,
                Right => u = r,
            }
        }
        Self::EMPTY
    }

    fn find_kth(&mut self, u: Idx, mut k: usize) -> Idx {
        let mut u = self.root(u);
        while u != Self::EMPTY {
            let [l, r] = self.nodes[u].child;
            let szl = self.size(l);
            if szl > k {
                u = l;
            } else if szl == k {
                return u;
            } else {
                k -= szl + 1;
                u = r;
            }
        }
        Self::EMPTY
    }

    fn len(&mut self, u: Idx) -> usize {
        if u == Self::EMPTY {
            0
        } else {
            let r = self.root(u);
            self.nodes[r].size
        }
    }

    fn total_agg(&mut self, u: Idx) -> Ag {
        let u = self.root(u);
        self.ag_data(u)
    }

    fn range_agg_lr(&mut self, u: Idx, ql: usize, qr: usize) -> Ag {
        let u = self.root(u);
        self.range_agg_inner(u, ql, qr)
    }

    fn concat(&mut self, u: Idx, v: Idx) -> Idx {
        let (u, v) = (self.root(u), self.root(v));
        if u == v {
            return u;
        }
        self.concat_inner(u, v)
    }

    fn split_lr(&mut self, u: Idx, ql: usize, qr: usize) -> (Idx, Idx, Idx) {
        let u = self.root(u);
        log::trace!("split({u}, {ql}..{qr})", u = super::PrettyIdx(u));
        let (l, mr) = self.split_k(u, ql);
        let (m, r) = self.split_k(mr, qr - ql);
        (l, m, r)
    }
}
