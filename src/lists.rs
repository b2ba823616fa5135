use std::fmt::{Debug, Display, Formatter};
use std::ops::RangeBounds;

pub mod splay;
pub mod treap;

pub type Idx = usize;

/// This data structure stores multiple ordered lists of values. Use keys in 0..n.
///
/// Queries that locate nodes or read aggregates take `&mut self`: engines are
/// free to rebalance on every access, and the amortized bounds of the
/// structures built on top rely on that side effect.
pub trait Lists<Ag = ()>
where
    Ag: AggregatedData,
    Self: Debug,
{
    /// Returned when the node doesn't exist.
    const EMPTY: Idx;
    /// New Lists with given capacity.
    fn new(capacity: usize) -> Self;
    /// New Lists with given items already in a list.
    fn from_iter(data: impl IntoIterator<Item = Ag::Data>) -> Self
    where
        Self: Sized,
    {
        let data = data.into_iter();
        let mut lists = Self::new(data.size_hint().0);
        for (i, data) in data.enumerate() {
            lists.create(data);
            if i > 0 {
                lists.concat(i - 1, i);
            }
        }
        lists
    }
    /// Create a new node with given data. Returns its index, which increases from 0.
    fn create(&mut self, data: Ag::Data) -> Idx;
    /// Number of nodes in all lists.
    fn total_size(&self) -> usize;

    // OPERATIONS
    // They panic if the node doesn't exist.

    /// Returns the root of the list containing u. All nodes in the list have the same root.
    fn root(&mut self, u: Idx) -> Idx;
    /// Data associated with u. Panics if u doesn't exist.
    fn data(&self, u: Idx) -> &Ag::Data;
    /// Change the data associated with u, updating aggregates.
    fn mutate_data(&mut self, u: Idx, f: impl FnOnce(&mut Ag::Data));
    /// Position of u in its list, 0-indexed.
    fn order(&mut self, u: Idx) -> usize;
    fn is_first(&mut self, u: Idx) -> bool {
        u == self.first(u)
    }
    fn is_last(&mut self, u: Idx) -> bool {
        self.order(u) == self.len(u) - 1
    }
    /// Node after u in its list.
    fn next(&mut self, u: Idx) -> Idx {
        let k = self.order(u);
        self.find_kth(u, k + 1)
    }
    /// Node before u in its list.
    fn prev(&mut self, u: Idx) -> Idx {
        let k = self.order(u);
        if k == 0 {
            Self::EMPTY
        } else {
            self.find_kth(u, k - 1)
        }
    }
    /// Are the two nodes on the same list?
    fn on_same_list(&mut self, u: Idx, v: Idx) -> bool {
        self.root(u) == self.root(v)
    }
    /// Find an element in the list containing u using a search strategy.
    fn find_element(
        &mut self,
        u: Idx,
        search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx;
    /// K-th element in the list containing u. (0-indexed)
    fn find_kth(&mut self, u: Idx, k: usize) -> Idx;
    /// First element in the list containing u.
    fn first(&mut self, u: Idx) -> Idx {
        self.find_kth(u, 0)
    }
    /// Size of the list containing u.
    fn len(&mut self, u: Idx) -> usize;
    /// Aggregated data of the list containing u.
    fn total_agg(&mut self, u: Idx) -> Ag {
        self.range_agg(u, ..)
    }
    /// Aggregated data of a range of the list containing u. (0-indexed)
    fn range_agg(&mut self, u: Idx, range: impl RangeBounds<usize>) -> Ag {
        let [l, r] = range_to_lr(range, || self.len(u));
        self.range_agg_lr(u, l, r)
    }
    /// XXX: Use range_agg(u, l..r) instead.
    fn range_agg_lr(&mut self, u: Idx, l: usize, r: usize) -> Ag;

    /// Concats the lists containing u and v. Returns the new root.
    fn concat(&mut self, u: Idx, v: Idx) -> Idx;
    /// Concats all given lists. Returns the new root.
    fn concat_all(&mut self, all: impl IntoIterator<Item = Idx>) -> Idx {
        let mut u = Self::EMPTY;
        for v in all {
            u = self.concat(u, v);
        }
        u
    }
    /// Splits the list containing u with the given range from the left and right parts. Returns (left, range, right), which may be EMPTY.
    fn split(&mut self, u: Idx, range: impl RangeBounds<usize>) -> (Idx, Idx, Idx) {
        let [l, r] = range_to_lr(range, || self.len(u));
        self.split_lr(u, l, r)
    }
    /// XXX: Use split(u, l..r) instead.
    fn split_lr(&mut self, u: Idx, l: usize, r: usize) -> (Idx, Idx, Idx);
}

pub trait AggregatedData: Debug + Clone + Default {
    type Data: Debug + Clone;
    /// Create aggregated data from a single data item
    fn from(data: &Self::Data) -> Self;
    /// Merge two aggregated data items. The other item contains data of some (not necessarily all) items to the right.
    fn merge(self, right: Self) -> Self;
}

#[derive(Debug)]
pub struct SearchData<'a, Ag: AggregatedData> {
    /// Data of the current node being looked at.
    pub current_data: &'a Ag::Data,
    /// Aggregated data of the left subtree.
    pub left_agg: &'a Ag,
    /// Aggregated data of the right subtree.
    pub right_agg: &'a Ag,
}

#[derive(Debug)]
pub enum SearchDirection {
    Found,
    NotFound,
    Left,
    Right,
}

fn range_to_lr(range: impl RangeBounds<usize>, len: impl FnOnce() -> usize) -> [usize; 2] {
    use std::ops::Bound::*;
    let start = match range.start_bound() {
        Included(start) => *start,
        Excluded(start) => *start + 1,
        Unbounded => 0,
    };
    let end = match range.end_bound() {
        Included(end) => *end + 1,
        Excluded(end) => *end,
        Unbounded => len(),
    };
    [start, end]
}

impl AggregatedData for () {
    type Data = ();
    fn from(_: &Self::Data) -> Self {}
    fn merge(self, _: Self) -> Self {}
}

pub(crate) fn node_fmt(u: &Idx, f: &mut Formatter) -> std::fmt::Result {
    if *u == usize::MAX {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}

pub(crate) fn node2_fmt([u, v]: &[Idx; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    node_fmt(u, f)?;
    write!(f, ", ")?;
    node_fmt(v, f)?;
    write!(f, "]")
}

/// Used to pretty print a Idx, outputting ∅ if it is EMPTY.
pub struct PrettyIdx(pub Idx);

impl Display for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        node_fmt(&self.0, f)
    }
}

impl Debug for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}
