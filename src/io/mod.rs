/// I/O operations for reading DOS 3.3 images

/// Sector reader
pub mod reader;

pub use reader::SectorReader;

use crate::error::Result;
use crate::image::{SectorData, TsAddress};
use std::io::{Read, Seek};

/// Anything the decoders can fetch whole sectors from
pub trait SectorSource {
    /// Read the sector at a logical address
    fn read_sector(&mut self, address: TsAddress) -> Result<SectorData>;
}

impl<R: Read + Seek> SectorSource for SectorReader<R> {
    fn read_sector(&mut self, address: TsAddress) -> Result<SectorData> {
        SectorReader::read_sector(self, address)
    }
}

impl<S: SectorSource + ?Sized> SectorSource for &mut S {
    fn read_sector(&mut self, address: TsAddress) -> Result<SectorData> {
        (**self).read_sector(address)
    }
}
