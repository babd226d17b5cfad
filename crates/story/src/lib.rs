pub mod mapper;
pub mod step;
pub mod stories;

pub use mapper::*;
pub use step::*;
pub use stories::*;
