//! Core math modules.

pub mod gaussian;
pub mod stable;
pub mod summary;
