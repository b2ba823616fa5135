pub mod connectivity;
pub mod euler_tour;
pub mod lists;
pub use connectivity::{CutResult, DynamicConnectivity, EttConnectivity};

use euler_tour::TourAgg;
use lists::splay::Splays;

/// The fastest connectivity solver implemented in this crate.
pub type FastConnectivity = EttConnectivity<Splays<TourAgg>>;
