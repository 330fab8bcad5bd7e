/// Decoder configuration and presets

use crate::error::{DosError, Result};
use crate::format::constants::*;
use crate::format::skew::SectorSkew;

/// How to treat non-zero bytes in the reserved area of a TS-list sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservedPolicy {
    /// Accept the sector and log a warning
    #[default]
    Warn,
    /// Reject the chain with a format error
    Strict,
    /// Accept silently
    Ignore,
}

/// Image layout and decoder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// Sectors per track used for addressing
    pub sectors_per_track: u8,
    /// Track holding the VTOC
    pub vtoc_track: u8,
    /// Sector holding the VTOC
    pub vtoc_sector: u8,
    /// Logical to image sector mapping
    pub skew: SectorSkew,
    /// Handling of the TS-list reserved bytes 0x07-0x0B
    pub reserved_bytes: ReservedPolicy,
    /// Largest track count a VTOC may declare
    pub max_tracks: u8,
}

impl FormatSpec {
    /// Create a specification with the given sectors per track and DOS 3.3 defaults otherwise
    pub fn new(sectors_per_track: u8) -> Self {
        Self {
            sectors_per_track,
            vtoc_track: DEFAULT_VTOC_TRACK,
            vtoc_sector: 0,
            skew: SectorSkew::Identity,
            reserved_bytes: ReservedPolicy::Warn,
            max_tracks: MAX_BITMAP_TRACKS,
        }
    }

    /// DOS 3.3 image in logical sector order (35 tracks, 16 sectors, 256 bytes)
    pub fn dos33() -> Self {
        Self::new(DEFAULT_SECTORS_PER_TRACK)
    }

    /// DOS 3.3 image stored in physical sector order
    pub fn dos33_skewed() -> Self {
        Self::dos33().with_skew(SectorSkew::Dos33)
    }

    /// Set the sector skew
    pub fn with_skew(mut self, skew: SectorSkew) -> Self {
        self.skew = skew;
        self
    }

    /// Set the VTOC location
    pub fn with_vtoc(mut self, track: u8, sector: u8) -> Self {
        self.vtoc_track = track;
        self.vtoc_sector = sector;
        self
    }

    /// Set the VTOC track, keeping the sector
    pub fn with_vtoc_track(mut self, track: u8) -> Self {
        self.vtoc_track = track;
        self
    }

    /// Set the track count ceiling, capped at what the VTOC bitmap can hold
    pub fn with_max_tracks(mut self, max_tracks: u8) -> Self {
        self.max_tracks = max_tracks.min(MAX_BITMAP_TRACKS);
        self
    }

    /// Set the reserved byte policy
    pub fn with_reserved_policy(mut self, policy: ReservedPolicy) -> Self {
        self.reserved_bytes = policy;
        self
    }

    /// Bytes in one track
    pub fn track_size(&self) -> u64 {
        self.sectors_per_track as u64 * SECTOR_SIZE as u64
    }

    /// Check that the settings are self-consistent
    pub fn validate(&self) -> Result<()> {
        if self.sectors_per_track == 0 {
            return Err(DosError::InvalidSector {
                track: self.vtoc_track,
                sector: self.vtoc_sector,
                max: 0,
            });
        }

        if let Some(len) = self.skew.sector_count() {
            if len != self.sectors_per_track as usize {
                return Err(DosError::InvalidSkew(format!(
                    "table covers {} sectors but tracks have {}",
                    len, self.sectors_per_track
                )));
            }
        }

        if self.max_tracks == 0 || self.max_tracks > MAX_BITMAP_TRACKS {
            return Err(DosError::format(
                self.vtoc_track,
                self.vtoc_sector,
                format!(
                    "track ceiling {} outside 1 to {}",
                    self.max_tracks, MAX_BITMAP_TRACKS
                ),
            ));
        }

        if self.vtoc_sector >= self.sectors_per_track {
            return Err(DosError::InvalidSector {
                track: self.vtoc_track,
                sector: self.vtoc_sector,
                max: self.sectors_per_track - 1,
            });
        }

        Ok(())
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self::dos33()
    }
}
