/// Catalog (directory) decoding
///
/// The catalog is a singly linked list of sectors. Each holds a pointer to the
/// next catalog sector and seven 35-byte file entries:
///
/// | offset | field                                   |
/// |--------|-----------------------------------------|
/// | 0x00   | first TS-list track (0xFF deleted, 0x00 unused) |
/// | 0x01   | first TS-list sector                    |
/// | 0x02   | file type and lock flag                 |
/// | 0x03   | filename, 30 bytes, high bit set        |
/// | 0x21   | size in sectors, little-endian          |

use crate::error::{ChainKind, DosError, Result};
use crate::filesystem::tslist::{self, FileChain};
use crate::filesystem::vtoc::VolumeInfo;
use crate::format::constants::*;
use crate::format::ReservedPolicy;
use crate::image::TsAddress;
use crate::io::SectorSource;
use log::{debug, warn};
use std::collections::HashSet;

/// Slot state derived from the first track byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Never allocated (first track 0x00)
    Unused,
    /// Deleted file (first track 0xFF)
    Deleted,
    /// Live file
    Live,
}

/// A single catalog file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// First TS-list sector of the file
    pub first: TsAddress,
    /// Raw file type byte
    pub file_type: u8,
    /// Raw filename bytes as stored
    pub raw_name: [u8; FILENAME_LEN],
    /// Filename with the high bit of every byte cleared, padding kept
    pub filename: String,
    /// Size in sectors, including TS-list sectors
    pub size: u16,
}

impl CatalogEntry {
    /// Parse an entry from its 35 bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CATALOG_ENTRY_SIZE {
            return Err(DosError::BufferSize {
                at: None,
                expected: CATALOG_ENTRY_SIZE,
                actual: data.len(),
            });
        }

        let mut raw_name = [0u8; FILENAME_LEN];
        raw_name.copy_from_slice(&data[0x03..0x03 + FILENAME_LEN]);

        Ok(Self {
            first: TsAddress::from_bytes(data, 0x00),
            file_type: data[0x02],
            raw_name,
            filename: decode_filename(&raw_name),
            size: read_u16_le(data, 0x21),
        })
    }

    /// Slot state
    pub fn state(&self) -> EntryState {
        match self.first.track {
            UNUSED_ENTRY_TRACK => EntryState::Unused,
            DELETED_ENTRY_TRACK => EntryState::Deleted,
            _ => EntryState::Live,
        }
    }

    /// Check if this is a live file
    pub fn is_live(&self) -> bool {
        self.state() == EntryState::Live
    }

    /// Filename without trailing padding
    pub fn trimmed_name(&self) -> &str {
        self.filename.trim_end()
    }

    /// Original first track of a deleted file
    ///
    /// DOS moves it into the last filename byte when deleting.
    pub fn deleted_track(&self) -> Option<u8> {
        match self.state() {
            EntryState::Deleted => Some(self.raw_name[FILENAME_LEN - 1]),
            _ => None,
        }
    }

    /// Lock flag (high bit of the type byte)
    pub fn is_locked(&self) -> bool {
        self.file_type & 0x80 != 0
    }

    /// Conventional single letter for the file type, `None` if unrecognized
    pub fn type_letter(&self) -> Option<char> {
        match self.file_type & 0x7F {
            0x00 => Some('T'),
            0x01 => Some('I'),
            0x02 => Some('A'),
            0x04 => Some('B'),
            0x08 => Some('S'),
            0x10 => Some('R'),
            0x20 => Some('a'),
            0x40 => Some('b'),
            _ => None,
        }
    }
}

/// Decode a DOS filename field: clear the high bit of each byte, keep order and padding
pub fn decode_filename(raw: &[u8]) -> String {
    raw.iter().map(|&b| (b & 0x7F) as char).collect()
}

/// A decoded catalog sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSector {
    /// Where this sector was read from
    pub address: TsAddress,
    /// Next catalog sector, 0/0 at the end of the chain
    pub next: TsAddress,
    /// The seven entry slots, in order
    pub entries: Vec<CatalogEntry>,
}

impl CatalogSector {
    /// Decode a catalog sector read from `address`
    pub fn decode(address: TsAddress, buf: &[u8]) -> Result<Self> {
        if buf.len() != SECTOR_SIZE {
            return Err(DosError::BufferSize {
                at: Some(address),
                expected: SECTOR_SIZE,
                actual: buf.len(),
            });
        }

        let next = TsAddress::new(
            buf[CATALOG_NEXT_TRACK_OFFSET],
            buf[CATALOG_NEXT_SECTOR_OFFSET],
        );

        let entries = (0..CATALOG_ENTRIES_PER_SECTOR)
            .map(|slot| {
                let pos = CATALOG_FIRST_ENTRY_OFFSET + slot * CATALOG_ENTRY_SIZE;
                CatalogEntry::parse(&buf[pos..pos + CATALOG_ENTRY_SIZE])
                    .map_err(|e| e.with_location(address))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            address,
            next,
            entries,
        })
    }

    /// Number of never-used slots
    pub fn unused_slots(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state() == EntryState::Unused)
            .count()
    }
}

/// A deleted or live catalog entry together with its decoded TS-list chain
#[derive(Debug)]
pub struct CatalogFile {
    /// Catalog sector holding the entry
    pub catalog_sector: TsAddress,
    /// Slot index within that sector (0-6)
    pub slot: usize,
    /// The entry itself
    pub entry: CatalogEntry,
    /// TS-list chain; `None` for deleted entries, `Some(Err)` when the chain is damaged
    pub chain: Option<Result<FileChain>>,
}

impl CatalogFile {
    /// Check if the entry is a live file
    pub fn is_live(&self) -> bool {
        self.entry.is_live()
    }

    /// Decoded chain, if it decoded cleanly
    pub fn file_chain(&self) -> Option<&FileChain> {
        self.chain.as_ref().and_then(|c| c.as_ref().ok())
    }

    /// Error raised while decoding the chain, if any
    pub fn chain_error(&self) -> Option<&DosError> {
        self.chain.as_ref().and_then(|c| c.as_ref().err())
    }

    /// Compare the catalog size with the sectors the chain actually uses
    ///
    /// Entries without a decoded chain pass.
    pub fn verify_size(&self) -> Result<()> {
        let Some(chain) = self.file_chain() else {
            return Ok(());
        };

        let used = chain.sector_count();
        if used != self.entry.size as usize {
            return Err(DosError::format(
                self.entry.first.track,
                self.entry.first.sector,
                format!(
                    "{}: catalog size {} but chain uses {} sectors",
                    self.entry.trimmed_name(),
                    self.entry.size,
                    used
                ),
            ));
        }

        Ok(())
    }
}

/// The decoded catalog
#[derive(Debug, Default)]
pub struct Catalog {
    /// Catalog sectors in traversal order
    pub sectors: Vec<CatalogSector>,
    /// Live and deleted files in traversal order
    pub files: Vec<CatalogFile>,
    /// Why the walk stopped before the end of the chain, if it did
    pub truncated: Option<DosError>,
}

impl Catalog {
    /// Live files in traversal order
    pub fn live_files(&self) -> impl Iterator<Item = &CatalogFile> {
        self.files.iter().filter(|f| f.is_live())
    }

    /// Deleted files in traversal order
    pub fn deleted_files(&self) -> impl Iterator<Item = &CatalogFile> {
        self.files.iter().filter(|f| !f.is_live())
    }

    /// Never-used slots over the whole catalog
    pub fn unused_slots(&self) -> usize {
        self.sectors.iter().map(|s| s.unused_slots()).sum()
    }

    /// Check if the whole chain was walked
    pub fn is_complete(&self) -> bool {
        self.truncated.is_none()
    }

    /// Find a live file by its trimmed name
    pub fn find(&self, name: &str) -> Option<&CatalogFile> {
        self.live_files().find(|f| f.entry.trimmed_name() == name)
    }
}

/// Walk the catalog chain starting at `start`, resolving every live file's TS-list chain
///
/// Fatal I/O errors abort the walk. Format and cycle errors in a file's chain are
/// stored on that file and the walk continues. A cycle or bad pointer in the catalog
/// chain itself fails the whole walk; use [`decode_partial`] to keep what was read.
pub fn decode_chain<S: SectorSource>(
    source: &mut S,
    volume: &VolumeInfo,
    policy: ReservedPolicy,
    start: TsAddress,
) -> Result<Catalog> {
    let mut catalog = decode_partial(source, volume, policy, start)?;
    match catalog.truncated.take() {
        Some(e) => Err(e),
        None => Ok(catalog),
    }
}

/// Walk the catalog chain like [`decode_chain`], keeping the entries read so far
///
/// A cycle or bad pointer in the catalog chain ends the walk and is stored in
/// [`Catalog::truncated`]. Only fatal I/O errors are returned.
pub fn decode_partial<S: SectorSource>(
    source: &mut S,
    volume: &VolumeInfo,
    policy: ReservedPolicy,
    start: TsAddress,
) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    if let Err(e) = walk(source, volume, policy, start, &mut catalog) {
        if e.is_fatal() {
            return Err(e);
        }
        warn!("catalog ends early after {} sectors: {}", catalog.sectors.len(), e);
        catalog.truncated = Some(e);
    }
    Ok(catalog)
}

fn walk<S: SectorSource>(
    source: &mut S,
    volume: &VolumeInfo,
    policy: ReservedPolicy,
    start: TsAddress,
    catalog: &mut Catalog,
) -> Result<()> {
    let mut visited = HashSet::new();
    let mut current = start;

    loop {
        volume.check_bounds(current)?;
        if !visited.insert(current) {
            return Err(DosError::corrupt(
                current.track,
                current.sector,
                ChainKind::Catalog,
            ));
        }

        let buf = source.read_sector(current)?;
        let sector = CatalogSector::decode(current, &buf)?;
        debug!("catalog {}: next {}", current, sector.next);

        for (slot, entry) in sector.entries.iter().enumerate() {
            let chain = match entry.state() {
                EntryState::Unused => continue,
                EntryState::Deleted => None,
                EntryState::Live => {
                    match tslist::decode_chain(source, volume, policy, entry.first) {
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => {
                            warn!("{}: {}", entry.trimmed_name(), e);
                            Some(Err(e))
                        }
                        Ok(chain) => Some(Ok(chain)),
                    }
                }
            };

            let file = CatalogFile {
                catalog_sector: current,
                slot,
                entry: entry.clone(),
                chain,
            };
            if let Err(e) = file.verify_size() {
                warn!("{}", e);
            }
            catalog.files.push(file);
        }

        let next = sector.next;
        catalog.sectors.push(sector);

        if next.is_null() {
            break;
        }
        current = next;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry_bytes(
        first: (u8, u8),
        file_type: u8,
        name: &str,
        size: u16,
    ) -> [u8; CATALOG_ENTRY_SIZE] {
        let mut data = [0u8; CATALOG_ENTRY_SIZE];
        data[0] = first.0;
        data[1] = first.1;
        data[2] = file_type;
        data[3..3 + FILENAME_LEN].fill(0xA0);
        for (i, b) in name.bytes().enumerate() {
            data[3 + i] = b | 0x80;
        }
        data[0x21..0x23].copy_from_slice(&size.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_entry() {
        let data = entry_bytes((18, 15), 0x82, "HELLO", 3);
        let entry = CatalogEntry::parse(&data).unwrap();
        assert_eq!(entry.first, TsAddress::new(18, 15));
        assert_eq!(entry.file_type, 0x82);
        assert_eq!(entry.size, 3);
        assert_eq!(entry.filename.len(), 30);
        assert_eq!(entry.trimmed_name(), "HELLO");
        assert_eq!(entry.state(), EntryState::Live);
        assert!(entry.is_locked());
        assert_eq!(entry.type_letter(), Some('A'));
    }

    #[test]
    fn test_filename_masking() {
        let mut raw = [0xA0u8; 30];
        raw[0] = 0xC8;
        raw[1] = 0xC9;
        let name = decode_filename(&raw);
        assert_eq!(name, format!("HI{}", " ".repeat(28)));
    }

    #[test]
    fn test_entry_states() {
        let unused = CatalogEntry::parse(&[0u8; CATALOG_ENTRY_SIZE]).unwrap();
        assert_eq!(unused.state(), EntryState::Unused);
        assert_eq!(unused.deleted_track(), None);

        let mut data = entry_bytes((0xFF, 3), 0x04, "GONE", 2);
        data[3 + 29] = 0x16;
        let deleted = CatalogEntry::parse(&data).unwrap();
        assert_eq!(deleted.state(), EntryState::Deleted);
        assert_eq!(deleted.deleted_track(), Some(0x16));
        assert!(!deleted.is_live());
    }

    #[test]
    fn test_short_entry() {
        assert!(matches!(
            CatalogEntry::parse(&[0u8; 10]),
            Err(DosError::BufferSize {
                at: None,
                expected: 35,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_decode_sector() {
        let mut buf = [0u8; SECTOR_SIZE];
        buf[1] = 17;
        buf[2] = 14;
        let pos = CATALOG_FIRST_ENTRY_OFFSET + 2 * CATALOG_ENTRY_SIZE;
        buf[pos..pos + CATALOG_ENTRY_SIZE].copy_from_slice(&entry_bytes((19, 0), 0x00, "TEXT", 2));

        let sector = CatalogSector::decode(TsAddress::new(17, 15), &buf).unwrap();
        assert_eq!(sector.next, TsAddress::new(17, 14));
        assert_eq!(sector.entries.len(), 7);
        assert_eq!(sector.entries[2].trimmed_name(), "TEXT");
        assert_eq!(sector.unused_slots(), 6);
    }

    proptest! {
        #[test]
        fn prop_filename_clears_high_bit(raw in proptest::collection::vec(any::<u8>(), 30)) {
            let name = decode_filename(&raw);
            prop_assert_eq!(name.chars().count(), 30);
            for (c, b) in name.chars().zip(raw.iter()) {
                prop_assert_eq!(c as u32, (b & 0x7F) as u32);
            }
        }
    }
}
