/// Sector skew tables
///
/// DOS 3.3 numbers sectors logically and maps them onto physical positions
/// through a software skew. Most `.dsk` dumps are already stored in logical
/// order, so the identity mapping is the default. Images stored in physical
/// order need the DOS 3.3 table.

use crate::error::{DosError, Result};

/// DOS 3.3 logical sector to image position
pub const DOS33_SKEW: [u8; 16] = [0, 7, 14, 6, 13, 5, 12, 4, 11, 3, 10, 2, 9, 1, 8, 15];

/// Mapping from logical sector number to position within the track
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SectorSkew {
    /// Sector n is stored at position n
    #[default]
    Identity,
    /// DOS 3.3 software skew
    Dos33,
    /// Caller supplied table, validated as a permutation
    Custom(Vec<u8>),
}

impl SectorSkew {
    /// Build a custom skew, checking that `table` is a permutation of `0..table.len()`
    pub fn custom(table: Vec<u8>) -> Result<Self> {
        if table.is_empty() || table.len() > 256 {
            return Err(DosError::InvalidSkew(format!(
                "table length {} out of range",
                table.len()
            )));
        }

        let mut seen = vec![false; table.len()];
        for (logical, &physical) in table.iter().enumerate() {
            let slot = seen.get_mut(physical as usize).ok_or_else(|| {
                DosError::InvalidSkew(format!(
                    "sector {} maps to {} beyond table length {}",
                    logical,
                    physical,
                    table.len()
                ))
            })?;
            if *slot {
                return Err(DosError::InvalidSkew(format!(
                    "position {} used twice",
                    physical
                )));
            }
            *slot = true;
        }

        Ok(SectorSkew::Custom(table))
    }

    /// Number of sectors the table covers, `None` for identity
    pub fn sector_count(&self) -> Option<usize> {
        match self {
            SectorSkew::Identity => None,
            SectorSkew::Dos33 => Some(DOS33_SKEW.len()),
            SectorSkew::Custom(table) => Some(table.len()),
        }
    }

    /// Map a logical sector onto its position in the track
    ///
    /// Returns `None` when the sector is not covered by the table.
    pub fn map(&self, sector: u8) -> Option<u8> {
        match self {
            SectorSkew::Identity => Some(sector),
            SectorSkew::Dos33 => DOS33_SKEW.get(sector as usize).copied(),
            SectorSkew::Custom(table) => table.get(sector as usize).copied(),
        }
    }
}
