/// Sector addressing types

use crate::format::constants::SECTOR_SIZE;

/// Raw contents of one sector
pub type SectorData = [u8; SECTOR_SIZE];

/// Logical track/sector address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TsAddress {
    /// Track number
    pub track: u8,
    /// Logical sector number
    pub sector: u8,
}

impl TsAddress {
    /// Create a new address
    pub fn new(track: u8, sector: u8) -> Self {
        Self { track, sector }
    }

    /// Read a (track, sector) pair stored at `offset` in a buffer
    pub fn from_bytes(buf: &[u8], offset: usize) -> Self {
        Self::new(buf[offset], buf[offset + 1])
    }

    /// The 0/0 pair that ends catalog and TS-list chains
    pub fn is_null(&self) -> bool {
        self.track == 0 && self.sector == 0
    }
}

impl From<(u8, u8)> for TsAddress {
    fn from((track, sector): (u8, u8)) -> Self {
        Self::new(track, sector)
    }
}

impl std::fmt::Display for TsAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{:02} S{:02}", self.track, self.sector)
    }
}
