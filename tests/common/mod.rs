//! In-memory DOS 3.3 image fixtures

#![allow(dead_code)]

use dos33reader::format::{SectorSkew, SECTOR_SIZE};
use std::io::Cursor;

pub const TRACKS: usize = 35;
pub const SECTORS: usize = 16;

/// Builds a flat 35 track image one sector at a time
pub struct ImageBuilder {
    data: Vec<u8>,
    skew: SectorSkew,
}

impl ImageBuilder {
    /// Blank image with a standard VTOC at T17 S0 and the catalog starting at T17 S15
    pub fn new() -> Self {
        let mut builder = Self {
            data: vec![0u8; TRACKS * SECTORS * SECTOR_SIZE],
            skew: SectorSkew::Identity,
        };
        builder.vtoc(|buf| {
            buf[0x01] = 17;
            buf[0x02] = 15;
            buf[0x03] = 3;
            buf[0x06] = 254;
            buf[0x27] = 122;
            buf[0x30] = 18;
            buf[0x31] = 1;
            buf[0x34] = TRACKS as u8;
            buf[0x35] = SECTORS as u8;
            buf[0x36] = 0x00;
            buf[0x37] = 0x01;
        });
        builder
    }

    /// Lay sectors out with a skew table; call before writing any sector
    pub fn skewed(mut self, skew: SectorSkew) -> Self {
        let vtoc = self.sector(17, 0).to_vec();
        self.data.fill(0);
        self.skew = skew;
        self.sector_mut(17, 0).copy_from_slice(&vtoc);
        self
    }

    fn position(&self, track: u8, sector: u8) -> usize {
        let physical = self.skew.map(sector).expect("sector in skew table") as usize;
        (track as usize * SECTORS + physical) * SECTOR_SIZE
    }

    pub fn sector(&self, track: u8, sector: u8) -> &[u8] {
        let pos = self.position(track, sector);
        &self.data[pos..pos + SECTOR_SIZE]
    }

    pub fn sector_mut(&mut self, track: u8, sector: u8) -> &mut [u8] {
        let pos = self.position(track, sector);
        &mut self.data[pos..pos + SECTOR_SIZE]
    }

    /// Edit the VTOC in place
    pub fn vtoc(&mut self, f: impl FnOnce(&mut [u8])) -> &mut Self {
        f(self.sector_mut(17, 0));
        self
    }

    /// Set the bitmap bytes for a track
    pub fn free_bits(&mut self, track: usize, hi: u8, lo: u8) -> &mut Self {
        self.vtoc(|buf| {
            buf[0x38 + 4 * track] = hi;
            buf[0x38 + 4 * track + 1] = lo;
        })
    }

    /// Write a catalog sector header
    pub fn catalog_sector(&mut self, at: (u8, u8), next: (u8, u8)) -> &mut Self {
        let buf = self.sector_mut(at.0, at.1);
        buf[0x01] = next.0;
        buf[0x02] = next.1;
        self
    }

    /// Write a catalog entry into a slot
    pub fn entry(
        &mut self,
        at: (u8, u8),
        slot: usize,
        first: (u8, u8),
        file_type: u8,
        name: &str,
        size: u16,
    ) -> &mut Self {
        let buf = self.sector_mut(at.0, at.1);
        let pos = 0x0B + slot * 0x23;
        buf[pos] = first.0;
        buf[pos + 1] = first.1;
        buf[pos + 2] = file_type;
        buf[pos + 3..pos + 33].fill(0xA0);
        for (i, b) in name.bytes().enumerate() {
            buf[pos + 3 + i] = b | 0x80;
        }
        buf[pos + 0x21..pos + 0x23].copy_from_slice(&size.to_le_bytes());
        self
    }

    /// Write a TS-list sector
    pub fn ts_list(
        &mut self,
        at: (u8, u8),
        next: (u8, u8),
        file_offset: u16,
        data: &[(u8, u8)],
    ) -> &mut Self {
        let buf = self.sector_mut(at.0, at.1);
        buf[0x01] = next.0;
        buf[0x02] = next.1;
        buf[0x05..0x07].copy_from_slice(&file_offset.to_le_bytes());
        for (i, &(t, s)) in data.iter().enumerate() {
            buf[0x0C + 2 * i] = t;
            buf[0x0C + 2 * i + 1] = s;
        }
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes())
    }
}
