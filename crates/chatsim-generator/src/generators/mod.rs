//! Field generators used by the synthesizer.
//!
//! Each function takes the per-index [`XorShift32`] and consumes a fixed
//! number of draws, documented on the function.
//!
//! [`XorShift32`]: crate::rng::XorShift32

pub mod price;
pub mod template;
pub mod text;
pub mod timestamp;
