/// DOS 3.3 on-disk layout constants

/// Size of every sector in bytes
pub const SECTOR_SIZE: usize = 256;

/// Default number of sectors per track
pub const DEFAULT_SECTORS_PER_TRACK: u8 = 16;

/// Default track holding the VTOC
pub const DEFAULT_VTOC_TRACK: u8 = 17;

/// Tracks on a standard 5.25 inch disk
pub const LEGACY_TRACKS: u8 = 35;

/// Most tracks the VTOC bitmap can describe (4 bytes per track from 0x38 to 0xFF)
pub const MAX_BITMAP_TRACKS: u8 = 50;

// VTOC field offsets

/// First catalog sector track
pub const VTOC_CATALOG_TRACK_OFFSET: usize = 0x01;
/// First catalog sector sector
pub const VTOC_CATALOG_SECTOR_OFFSET: usize = 0x02;
/// DOS release number
pub const VTOC_DOS_RELEASE_OFFSET: usize = 0x03;
/// Diskette volume number
pub const VTOC_VOLUME_OFFSET: usize = 0x06;
/// Maximum track/sector pairs per TS-list sector
pub const VTOC_MAX_PAIRS_OFFSET: usize = 0x27;
/// Last track where sectors were allocated
pub const VTOC_LAST_TRACK_OFFSET: usize = 0x30;
/// Direction of track allocation (+1 or -1)
pub const VTOC_LAST_DIRECTION_OFFSET: usize = 0x31;
/// Number of tracks per disk
pub const VTOC_TRACKS_OFFSET: usize = 0x34;
/// Number of sectors per track
pub const VTOC_SECTORS_OFFSET: usize = 0x35;
/// Number of bytes per sector (little-endian u16)
pub const VTOC_BYTES_PER_SECTOR_OFFSET: usize = 0x36;
/// Start of the free-sector bitmap
pub const VTOC_BITMAP_OFFSET: usize = 0x38;
/// Bytes of bitmap per track
pub const VTOC_BITMAP_BYTES_PER_TRACK: usize = 4;

// Catalog sector layout

/// Next catalog sector track
pub const CATALOG_NEXT_TRACK_OFFSET: usize = 0x01;
/// Next catalog sector sector
pub const CATALOG_NEXT_SECTOR_OFFSET: usize = 0x02;
/// First file entry
pub const CATALOG_FIRST_ENTRY_OFFSET: usize = 0x0B;
/// Size of each file entry
pub const CATALOG_ENTRY_SIZE: usize = 0x23;
/// File entries per catalog sector
pub const CATALOG_ENTRIES_PER_SECTOR: usize = 7;
/// Length of the filename field
pub const FILENAME_LEN: usize = 30;
/// First track value marking a deleted file
pub const DELETED_ENTRY_TRACK: u8 = 0xFF;
/// First track value marking a never-used slot
pub const UNUSED_ENTRY_TRACK: u8 = 0x00;

// Track/sector list layout

/// Next TS-list sector track
pub const TSLIST_NEXT_TRACK_OFFSET: usize = 0x01;
/// File offset of this TS-list sector's first data sector (little-endian u16)
pub const TSLIST_FILE_OFFSET_OFFSET: usize = 0x05;
/// Start of the track/sector pairs
pub const TSLIST_PAIRS_OFFSET: usize = 0x0C;
/// End (exclusive) of the track/sector pairs
pub const TSLIST_PAIRS_END: usize = 0xFE;
/// Track/sector pairs per TS-list sector
pub const TSLIST_PAIRS_PER_SECTOR: usize = (TSLIST_PAIRS_END - TSLIST_PAIRS_OFFSET) / 2;

/// Read a little-endian u16 at `offset`
#[inline]
pub fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_fits_sector() {
        let last_entry_end =
            CATALOG_FIRST_ENTRY_OFFSET + CATALOG_ENTRIES_PER_SECTOR * CATALOG_ENTRY_SIZE;
        assert_eq!(last_entry_end, 0x100);

        let bitmap_end =
            VTOC_BITMAP_OFFSET + MAX_BITMAP_TRACKS as usize * VTOC_BITMAP_BYTES_PER_TRACK;
        assert_eq!(bitmap_end, SECTOR_SIZE);
    }

    #[test]
    fn test_tslist_pairs() {
        assert_eq!(TSLIST_PAIRS_PER_SECTOR, 121);
    }

    #[test]
    fn test_read_u16_le() {
        let buf = [0x00, 0x34, 0x12];
        assert_eq!(read_u16_le(&buf, 1), 0x1234);
    }
}
