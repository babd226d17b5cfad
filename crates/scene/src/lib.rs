pub mod picking;
pub mod projection;
pub mod transform;
pub mod viewport;

pub use picking::*;
pub use projection::*;
pub use transform::*;
pub use viewport::*;
