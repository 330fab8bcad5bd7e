/// DOS 3.3 filesystem metadata decoding

/// Catalog decoding
pub mod catalog;
/// Track/sector list decoding
pub mod tslist;
/// VTOC decoding
pub mod vtoc;

pub use catalog::{Catalog, CatalogEntry, CatalogFile, CatalogSector, EntryState};
pub use tslist::{DataSector, FileChain, TsListSector};
pub use vtoc::{FreeSectorMap, VolumeInfo};

use crate::error::Result;
use crate::format::FormatSpec;
use crate::image::TsAddress;
use crate::io::{SectorReader, SectorSource};
use log::debug;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Filesystem summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemInfo {
    /// Filesystem type name
    pub fs_type: String,
    /// Diskette volume number
    pub volume: u8,
    /// Total sectors on disk
    pub total_sectors: usize,
    /// Sectors marked free in the VTOC
    pub free_sectors: usize,
    /// Sector size in bytes
    pub sector_size: usize,
}

/// Everything decoded from one image
#[derive(Debug)]
pub struct DiskReport {
    /// VTOC contents
    pub volume: VolumeInfo,
    /// Catalog with per-file chains, possibly cut short by a damaged catalog chain
    pub catalog: Catalog,
}

/// A mounted DOS 3.3 volume
///
/// Mounting reads and validates the VTOC; everything else is decoded on demand
/// and can be decoded again.
pub struct Dos33FileSystem<S> {
    source: S,
    spec: FormatSpec,
    vtoc_address: TsAddress,
    volume: VolumeInfo,
}

impl Dos33FileSystem<SectorReader<File>> {
    /// Open and mount an image file
    pub fn open<P: AsRef<Path>>(path: P, spec: FormatSpec) -> Result<Self> {
        let reader = SectorReader::open(path, spec)?;
        Self::from_reader(reader)
    }
}

impl<R: Read + Seek> Dos33FileSystem<SectorReader<R>> {
    /// Mount a volume from a sector reader, using the reader's format specification
    pub fn from_reader(reader: SectorReader<R>) -> Result<Self> {
        let spec = reader.spec().clone();
        Self::mount(reader, spec)
    }
}

impl<S: SectorSource> Dos33FileSystem<S> {
    /// Mount a volume by reading the VTOC from `source`
    pub fn mount(mut source: S, spec: FormatSpec) -> Result<Self> {
        let vtoc_address = TsAddress::new(spec.vtoc_track, spec.vtoc_sector);
        let buf = source.read_sector(vtoc_address)?;
        let volume = VolumeInfo::decode(&buf).map_err(|e| e.with_location(vtoc_address))?;
        volume.validate(&spec, vtoc_address)?;
        debug!(
            "mounted volume {} ({} tracks), catalog at {}",
            volume.disk_vol, volume.tracks_per_disk, volume.first_catalog
        );

        Ok(Self {
            source,
            spec,
            vtoc_address,
            volume,
        })
    }

    /// Decoded VTOC
    pub fn volume(&self) -> &VolumeInfo {
        &self.volume
    }

    /// Format specification in use
    pub fn spec(&self) -> &FormatSpec {
        &self.spec
    }

    /// Where the VTOC was read from
    pub fn vtoc_address(&self) -> TsAddress {
        self.vtoc_address
    }

    /// Walk the catalog from the VTOC's first catalog sector
    pub fn read_catalog(&mut self) -> Result<Catalog> {
        let start = self.volume.first_catalog;
        self.read_catalog_at(start)
    }

    /// Walk a catalog chain from an arbitrary sector
    pub fn read_catalog_at(&mut self, start: TsAddress) -> Result<Catalog> {
        catalog::decode_chain(
            &mut self.source,
            &self.volume,
            self.spec.reserved_bytes,
            start,
        )
    }

    /// Walk the catalog, keeping the entries read before a damaged catalog chain
    pub fn read_catalog_partial(&mut self) -> Result<Catalog> {
        catalog::decode_partial(
            &mut self.source,
            &self.volume,
            self.spec.reserved_bytes,
            self.volume.first_catalog,
        )
    }

    /// Walk the TS-list chain of a catalog entry
    pub fn read_file_chain(&mut self, entry: &CatalogEntry) -> Result<FileChain> {
        tslist::decode_chain(
            &mut self.source,
            &self.volume,
            self.spec.reserved_bytes,
            entry.first,
        )
    }

    /// Decode the catalog and bundle it with the VTOC
    ///
    /// Only I/O errors fail; a broken catalog chain is recorded in
    /// [`Catalog::truncated`] alongside the entries read before it.
    pub fn decode(&mut self) -> Result<DiskReport> {
        let catalog = self.read_catalog_partial()?;
        Ok(DiskReport {
            volume: self.volume.clone(),
            catalog,
        })
    }

    /// Filesystem summary
    pub fn info(&self) -> FileSystemInfo {
        FileSystemInfo {
            fs_type: "DOS 3.3".to_string(),
            volume: self.volume.disk_vol,
            total_sectors: self.volume.total_sectors(),
            free_sectors: self.volume.free_map.free_count(),
            sector_size: self.volume.bytes_per_sector as usize,
        }
    }

    /// Release the sector source
    pub fn into_inner(self) -> S {
        self.source
    }
}
