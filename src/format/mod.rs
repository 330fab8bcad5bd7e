/// DOS 3.3 format constants and decoder configuration

/// On-disk layout constants
pub mod constants;
/// Sector skew tables
pub mod skew;
/// Format specification
pub mod spec;

pub use constants::*;
pub use skew::{SectorSkew, DOS33_SKEW};
pub use spec::{FormatSpec, ReservedPolicy};
