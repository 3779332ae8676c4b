//! Song library: track model, flat directory scan and the shuffled queue.

mod model;
mod queue;
mod scan;

pub use model::*;
pub use queue::SongQueue;
pub use scan::scan;
