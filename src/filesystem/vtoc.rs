/// Volume Table of Contents decoding
///
/// The VTOC is a single sector, normally track 17 sector 0, holding the
/// volume geometry, the catalog's first sector and the free-sector bitmap.
///
/// Bitmap layout, 4 bytes per track starting at 0x38:
/// - byte 0: sectors 15..8 (bit i set means sector i+8 is free)
/// - byte 1: sectors 7..0 (bit i set means sector i is free)
/// - bytes 2-3: unused for 16 sector disks

use crate::error::{DosError, Result};
use crate::format::constants::*;
use crate::format::FormatSpec;
use crate::image::TsAddress;
use log::warn;

/// Free-sector bitmap, one row per track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeSectorMap {
    rows: Vec<u16>,
    sectors_per_track: u8,
}

impl FreeSectorMap {
    /// Decode `tracks` rows of the bitmap from a VTOC buffer
    fn decode(buf: &[u8], tracks: u8, sectors_per_track: u8) -> Self {
        let rows = (0..tracks.min(MAX_BITMAP_TRACKS) as usize)
            .map(|track| {
                let pos = VTOC_BITMAP_OFFSET + VTOC_BITMAP_BYTES_PER_TRACK * track;
                u16::from_be_bytes([buf[pos], buf[pos + 1]])
            })
            .collect();

        Self {
            rows,
            sectors_per_track: sectors_per_track.min(16),
        }
    }

    /// Number of tracks described
    pub fn tracks(&self) -> usize {
        self.rows.len()
    }

    /// Raw 16-bit mask for a track (bit i set means sector i is free)
    pub fn track_mask(&self, track: u8) -> Option<u16> {
        self.rows.get(track as usize).copied()
    }

    /// Check if a sector is marked free
    ///
    /// Sectors on tracks outside the map are reported as not free.
    pub fn is_free(&self, address: TsAddress) -> bool {
        match self.track_mask(address.track) {
            Some(mask) if address.sector < 16 => mask & (1 << address.sector) != 0,
            _ => false,
        }
    }

    /// Free sectors on a track, ascending
    pub fn free_sectors(&self, track: u8) -> Vec<u8> {
        let mask = self.track_mask(track).unwrap_or(0);
        (0..16u8).filter(|s| mask & (1 << s) != 0).collect()
    }

    /// Total free sectors
    pub fn free_count(&self) -> usize {
        self.rows.iter().map(|m| m.count_ones() as usize).sum()
    }

    /// Sectors in use over the tracks the map describes
    pub fn used_count(&self) -> usize {
        (self.tracks() * self.sectors_per_track as usize).saturating_sub(self.free_count())
    }
}

/// Decoded VTOC contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    /// First catalog sector
    pub first_catalog: TsAddress,
    /// DOS release that initialized the disk
    pub dos_release: u8,
    /// Diskette volume number
    pub disk_vol: u8,
    /// Maximum track/sector pairs in one TS-list sector (122 for 256-byte sectors)
    pub max_ts_pairs: u8,
    /// Last track where sectors were allocated
    pub last_track: u8,
    /// Direction of track allocation (1 or 0xFF)
    pub last_direction: u8,
    /// Number of tracks per disk
    pub tracks_per_disk: u8,
    /// Number of sectors per track
    pub sectors_per_track: u8,
    /// Number of bytes per sector
    pub bytes_per_sector: u16,
    /// Free-sector bitmap
    pub free_map: FreeSectorMap,
}

impl VolumeInfo {
    /// Decode a VTOC sector
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != SECTOR_SIZE {
            return Err(DosError::BufferSize {
                at: None,
                expected: SECTOR_SIZE,
                actual: buf.len(),
            });
        }

        let tracks_per_disk = buf[VTOC_TRACKS_OFFSET];
        let sectors_per_track = buf[VTOC_SECTORS_OFFSET];

        Ok(Self {
            first_catalog: TsAddress::new(
                buf[VTOC_CATALOG_TRACK_OFFSET],
                buf[VTOC_CATALOG_SECTOR_OFFSET],
            ),
            dos_release: buf[VTOC_DOS_RELEASE_OFFSET],
            disk_vol: buf[VTOC_VOLUME_OFFSET],
            max_ts_pairs: buf[VTOC_MAX_PAIRS_OFFSET],
            last_track: buf[VTOC_LAST_TRACK_OFFSET],
            last_direction: buf[VTOC_LAST_DIRECTION_OFFSET],
            tracks_per_disk,
            sectors_per_track,
            bytes_per_sector: read_u16_le(buf, VTOC_BYTES_PER_SECTOR_OFFSET),
            free_map: FreeSectorMap::decode(buf, tracks_per_disk, sectors_per_track),
        })
    }

    /// Check the declared geometry against what the decoder supports
    ///
    /// `vtoc` is where this VTOC was read from, for error context.
    pub fn validate(&self, spec: &FormatSpec, vtoc: TsAddress) -> Result<()> {
        let fail = |message: String| DosError::format(vtoc.track, vtoc.sector, message);

        if self.bytes_per_sector as usize != SECTOR_SIZE {
            return Err(fail(format!(
                "VTOC declares {} bytes per sector, expected {}",
                self.bytes_per_sector, SECTOR_SIZE
            )));
        }
        if self.sectors_per_track != spec.sectors_per_track {
            return Err(fail(format!(
                "VTOC declares {} sectors per track, expected {}",
                self.sectors_per_track, spec.sectors_per_track
            )));
        }
        if self.tracks_per_disk == 0 || self.tracks_per_disk > spec.max_tracks {
            return Err(fail(format!(
                "VTOC declares {} tracks, expected 1 to {}",
                self.tracks_per_disk, spec.max_tracks
            )));
        }
        if self.tracks_per_disk != LEGACY_TRACKS {
            warn!(
                "VTOC declares {} tracks instead of the usual {}",
                self.tracks_per_disk, LEGACY_TRACKS
            );
        }

        Ok(())
    }

    /// Check if an address lies inside the declared geometry
    pub fn contains(&self, address: TsAddress) -> bool {
        address.track < self.tracks_per_disk && address.sector < self.sectors_per_track
    }

    /// Fail with `OutOfBounds` unless the address lies inside the declared geometry
    pub fn check_bounds(&self, address: TsAddress) -> Result<()> {
        if self.contains(address) {
            Ok(())
        } else {
            Err(DosError::OutOfBounds {
                track: address.track,
                sector: address.sector,
                tracks: self.tracks_per_disk,
                sectors: self.sectors_per_track,
            })
        }
    }

    /// Total sectors on the volume
    pub fn total_sectors(&self) -> usize {
        self.tracks_per_disk as usize * self.sectors_per_track as usize
    }
}
