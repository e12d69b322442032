//! Command handlers

pub mod info;
pub mod player;
pub mod report;

pub use info::*;
pub use player::*;
pub use report::*;
