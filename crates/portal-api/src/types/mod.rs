pub mod content_key;
pub mod distance;
pub mod execution;
