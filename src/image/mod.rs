/// Sector addressing within a flat image

/// Track/sector address and sector buffer types
pub mod sector;

pub use sector::{SectorData, TsAddress};

use crate::error::{DosError, Result};
use crate::format::constants::SECTOR_SIZE;
use crate::format::FormatSpec;

/// Byte offset of a logical sector within the image
///
/// `track * sectors_per_track * 256 + skew(sector) * 256`. Tracks are not
/// bounded here; the image length and the VTOC geometry bound them.
pub fn offset(spec: &FormatSpec, address: TsAddress) -> Result<u64> {
    let TsAddress { track, sector } = address;
    let invalid = || DosError::InvalidSector {
        track,
        sector,
        max: spec.sectors_per_track.saturating_sub(1),
    };

    if sector >= spec.sectors_per_track {
        return Err(invalid());
    }
    let position = spec.skew.map(sector).ok_or_else(invalid)?;

    Ok(track as u64 * spec.track_size() + position as u64 * SECTOR_SIZE as u64)
}
