//! Time and fixed-point primitives shared by every simulation

pub mod meter;
pub mod time;
