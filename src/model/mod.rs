//! Data model of the release tracker

mod release;
mod track;
pub mod version;

pub use release::*;
pub use track::*;
