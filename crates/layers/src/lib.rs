pub mod animation;
pub mod boundaries;
pub mod labels;
pub mod layer;
pub mod markers;
pub mod overlay;
pub mod symbology;

pub use animation::*;
pub use boundaries::*;
pub use labels::*;
pub use layer::*;
pub use markers::*;
pub use overlay::*;
pub use symbology::*;
