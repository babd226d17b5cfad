pub mod dataset;
pub mod filter;
pub mod lookup;
pub mod model;
pub mod seed;

pub use dataset::*;
pub use filter::*;
pub use lookup::*;
pub use model::*;
