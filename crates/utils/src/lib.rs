#![warn(clippy::unwrap_used)]

pub mod dir;
pub mod log;
