use crate::crud_api;
use tcms_dal::story::{CreateStory, Story, StoryRepository, UpdateStory};

crud_api!(Story);
