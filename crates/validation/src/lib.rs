#![warn(clippy::unwrap_used)]
#![warn(clippy::uninlined_format_args)]

pub mod accumulator;
pub mod builder;
pub mod constants;
pub mod header_validator;
pub mod merkle;
pub mod test_utils;
pub mod validator;
