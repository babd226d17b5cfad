pub mod config;
pub mod engine;
pub mod events;
pub mod interaction;
pub mod map_view;
pub mod mini_map;
pub mod story_view;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use engine::*;
pub use events::*;
pub use interaction::*;
pub use map_view::*;
pub use mini_map::*;
pub use story_view::*;
pub use telemetry::*;
