//! Authored stories shipped with the engine.

use crate::step::{Story, StoryError};

const STORIES_JSON: &str = include_str!("../data/stories.json");

pub fn builtin_stories() -> Result<Vec<Story>, StoryError> {
    Story::list_from_json_str(STORIES_JSON)
}

/// The built-in story told for a dataset entry.
pub fn builtin_story(id: &str) -> Result<Story, StoryError> {
    builtin_stories()?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| StoryError::UnknownStory(id.to_string()))
}
