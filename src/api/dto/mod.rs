//! Data Transfer Objects for response serialization.

pub mod command_dto;

pub use command_dto::*;
