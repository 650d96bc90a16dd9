//! Log-domain math utilities shared by the HMM engine and the selectors.

pub mod math;

pub use math::gaussian::*;
pub use math::stable::*;
pub use math::summary::*;
