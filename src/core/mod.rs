//! Foundation layer: data types, angle math, unit conversions.

pub mod math;
pub mod types;
pub mod units;
