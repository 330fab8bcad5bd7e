/// Sector reader over a seekable image

use crate::error::{DosError, Result};
use crate::format::constants::SECTOR_SIZE;
use crate::format::FormatSpec;
use crate::image::{offset, SectorData, TsAddress};
use log::trace;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Reads 256-byte sectors by logical track/sector address
///
/// Every call seeks; nothing is cached.
#[derive(Debug)]
pub struct SectorReader<R> {
    inner: R,
    spec: FormatSpec,
}

impl SectorReader<File> {
    /// Open an image file from disk
    pub fn open<P: AsRef<Path>>(path: P, spec: FormatSpec) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file, spec)
    }
}

impl<R: Read + Seek> SectorReader<R> {
    /// Wrap any seekable byte source
    pub fn new(inner: R, spec: FormatSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self { inner, spec })
    }

    /// Get the format specification
    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// Unwrap the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read one sector
    pub fn read_sector(&mut self, address: TsAddress) -> Result<SectorData> {
        let pos = offset(&self.spec, address)?;
        let io_err = |source| DosError::SectorIo {
            track: address.track,
            sector: address.sector,
            offset: pos,
            source,
        };

        trace!("read {} at offset {:#x}", address, pos);
        self.inner.seek(SeekFrom::Start(pos)).map_err(io_err)?;

        let mut buf = [0u8; SECTOR_SIZE];
        let mut got = 0;
        while got < SECTOR_SIZE {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(e)),
            }
        }

        if got < SECTOR_SIZE {
            return Err(DosError::ShortRead {
                track: address.track,
                sector: address.sector,
                offset: pos,
                got,
            });
        }

        Ok(buf)
    }
}
