pub mod geojson;
pub mod topojson;

pub use geojson::*;
pub use topojson::*;
