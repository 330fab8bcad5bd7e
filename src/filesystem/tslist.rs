/// Track/sector list decoding
///
/// A file's data sectors are enumerated by a chain of index sectors. Each one
/// holds a pointer to the next index sector, the byte offset in the file where
/// its own data sectors start, and up to 121 (track, sector) pairs.

use crate::error::{ChainKind, DosError, Result};
use crate::filesystem::vtoc::VolumeInfo;
use crate::format::constants::*;
use crate::format::ReservedPolicy;
use crate::image::TsAddress;
use crate::io::SectorSource;
use log::{debug, warn};
use std::collections::HashSet;

/// One data sector of a file and where it lands in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSector {
    /// Byte offset within the reconstructed file
    pub offset: u32,
    /// Location on disk
    pub address: TsAddress,
}

/// A decoded track/sector list sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsListSector {
    /// Where this sector was read from
    pub address: TsAddress,
    /// Next index sector, 0/0 at the end of the chain
    pub next: TsAddress,
    /// Byte offset within the file of the first data sector listed here
    pub file_offset: u16,
    /// Data sector addresses, up to the first pair with track 0
    pub data: Vec<TsAddress>,
}

impl TsListSector {
    /// Decode a TS-list sector read from `address`
    pub fn decode(address: TsAddress, buf: &[u8], policy: ReservedPolicy) -> Result<Self> {
        if buf.len() != SECTOR_SIZE {
            return Err(DosError::BufferSize {
                at: Some(address),
                expected: SECTOR_SIZE,
                actual: buf.len(),
            });
        }

        // byte 0x00 unused
        let mut pos = 1;
        let next = TsAddress::from_bytes(buf, pos);
        pos += 2;
        // bytes 0x03-0x04 unused
        pos += 2;
        let file_offset = read_u16_le(buf, pos);
        pos += 2;
        let reserved = &buf[pos..pos + 5];
        pos += 5;

        if pos != TSLIST_PAIRS_OFFSET {
            return Err(DosError::format(
                address.track,
                address.sector,
                format!(
                    "header ends at {:#04x} instead of {:#04x}",
                    pos, TSLIST_PAIRS_OFFSET
                ),
            ));
        }

        if reserved.iter().any(|&b| b != 0) {
            match policy {
                ReservedPolicy::Strict => {
                    return Err(DosError::format(
                        address.track,
                        address.sector,
                        format!("reserved bytes 0x07-0x0B not zero: {:02X?}", reserved),
                    ));
                }
                ReservedPolicy::Warn => warn!(
                    "TS list at {}: reserved bytes 0x07-0x0B not zero: {:02X?}",
                    address, reserved
                ),
                ReservedPolicy::Ignore => {}
            }
        }

        let data = buf[TSLIST_PAIRS_OFFSET..TSLIST_PAIRS_END]
            .chunks_exact(2)
            .map(|pair| TsAddress::new(pair[0], pair[1]))
            .take_while(|ts| ts.track != 0)
            .collect();

        Ok(Self {
            address,
            next,
            file_offset,
            data,
        })
    }

    /// Data sectors with their offsets in the file
    pub fn data_sectors(&self) -> impl Iterator<Item = DataSector> + '_ {
        self.data.iter().enumerate().map(move |(i, &address)| DataSector {
            offset: self.file_offset as u32 + (i * SECTOR_SIZE) as u32,
            address,
        })
    }
}

/// All index sectors of one file, in chain order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileChain {
    /// Index sectors in traversal order
    pub index: Vec<TsListSector>,
}

impl FileChain {
    /// Every data sector of the file, in chain order
    pub fn data_sectors(&self) -> Vec<DataSector> {
        self.index.iter().flat_map(|ts| ts.data_sectors()).collect()
    }

    /// Number of data sectors
    pub fn data_count(&self) -> usize {
        self.index.iter().map(|ts| ts.data.len()).sum()
    }

    /// Sectors the file occupies: index sectors plus data sectors
    pub fn sector_count(&self) -> usize {
        self.index.len() + self.data_count()
    }
}

/// Walk a TS-list chain starting at `start`
///
/// Fails with `CorruptFilesystem` if an index sector is reached twice, and with
/// `OutOfBounds` if any pointer leaves the volume geometry.
pub fn decode_chain<S: SectorSource>(
    source: &mut S,
    volume: &VolumeInfo,
    policy: ReservedPolicy,
    start: TsAddress,
) -> Result<FileChain> {
    let mut visited = HashSet::new();
    let mut chain = FileChain::default();
    let mut current = start;

    loop {
        volume.check_bounds(current)?;
        if !visited.insert(current) {
            return Err(DosError::corrupt(
                current.track,
                current.sector,
                ChainKind::TsList,
            ));
        }

        let buf = source.read_sector(current)?;
        let sector = TsListSector::decode(current, &buf, policy)?;
        debug!(
            "TS list {}: offset {:#06x}, {} data sectors, next {}",
            current,
            sector.file_offset,
            sector.data.len(),
            sector.next
        );

        for &ts in &sector.data {
            volume.check_bounds(ts)?;
        }

        let next = sector.next;
        chain.index.push(sector);

        if next.is_null() {
            break;
        }
        current = next;
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::SectorData;
    use std::collections::HashMap;

    struct MapSource(HashMap<TsAddress, SectorData>);

    impl SectorSource for MapSource {
        fn read_sector(&mut self, address: TsAddress) -> Result<SectorData> {
            Ok(self.0.get(&address).copied().unwrap_or([0u8; SECTOR_SIZE]))
        }
    }

    fn volume() -> VolumeInfo {
        let mut buf = [0u8; SECTOR_SIZE];
        buf[0x34] = 35;
        buf[0x35] = 16;
        buf[0x37] = 1;
        VolumeInfo::decode(&buf).unwrap()
    }

    fn ts_sector(next: (u8, u8), file_offset: u16, pairs: &[(u8, u8)]) -> SectorData {
        let mut buf = [0u8; SECTOR_SIZE];
        buf[0x01] = next.0;
        buf[0x02] = next.1;
        buf[0x05..0x07].copy_from_slice(&file_offset.to_le_bytes());
        for (i, &(t, s)) in pairs.iter().enumerate() {
            buf[0x0C + 2 * i] = t;
            buf[0x0C + 2 * i + 1] = s;
        }
        buf
    }

    fn decode_at(at: (u8, u8), buf: &[u8]) -> TsListSector {
        TsListSector::decode(TsAddress::new(at.0, at.1), buf, ReservedPolicy::Warn).unwrap()
    }

    fn walk(source: &mut MapSource, start: (u8, u8)) -> Result<FileChain> {
        decode_chain(source, &volume(), ReservedPolicy::Warn, TsAddress::new(start.0, start.1))
    }

    #[test]
    fn test_decode_stops_at_zero_track() {
        let mut buf = ts_sector((0, 0), 0, &[(18, 15), (18, 14), (0, 5), (19, 1)]);
        buf[0xFD] = 0x22;
        let sector = decode_at((18, 0), &buf);
        assert_eq!(sector.data, vec![TsAddress::new(18, 15), TsAddress::new(18, 14)]);
        assert!(sector.next.is_null());
    }

    #[test]
    fn test_decode_full_sector() {
        let pairs: Vec<(u8, u8)> = (0..130).map(|i| (1 + i / 16, i % 16)).collect();
        let buf = ts_sector((20, 3), 0x1200, &pairs[..121]);
        let sector = decode_at((19, 0), &buf);
        assert_eq!(sector.data.len(), TSLIST_PAIRS_PER_SECTOR);
        assert_eq!(sector.next, TsAddress::new(20, 3));
        assert_eq!(sector.file_offset, 0x1200);
    }

    #[test]
    fn test_data_sector_offsets() {
        let buf = ts_sector((0, 0), 0x0500, &[(3, 1), (3, 2)]);
        let sector = decode_at((3, 0), &buf);
        let data: Vec<DataSector> = sector.data_sectors().collect();
        assert_eq!(data[0].offset, 0x0500);
        assert_eq!(data[1].offset, 0x0600);
        assert_eq!(data[1].address, TsAddress::new(3, 2));
    }

    #[test]
    fn test_reserved_policy() {
        let mut buf = ts_sector((0, 0), 0, &[(3, 1)]);
        buf[0x09] = 0x42;
        let at = TsAddress::new(3, 0);

        assert!(TsListSector::decode(at, &buf, ReservedPolicy::Warn).is_ok());
        assert!(TsListSector::decode(at, &buf, ReservedPolicy::Ignore).is_ok());
        assert!(matches!(
            TsListSector::decode(at, &buf, ReservedPolicy::Strict),
            Err(DosError::Format { track: 3, sector: 0, .. })
        ));
    }

    #[test]
    fn test_wrong_buffer_size() {
        let at = TsAddress::new(3, 0);
        let result = TsListSector::decode(at, &[0u8; 100], ReservedPolicy::Warn);
        assert!(matches!(
            result,
            Err(DosError::BufferSize { at: Some(TsAddress { track: 3, sector: 0 }), .. })
        ));
    }

    #[test]
    fn test_two_sector_chain() {
        let mut sectors = HashMap::new();
        let first: Vec<(u8, u8)> = (0..5).map(|s| (20, s)).collect();
        let second: Vec<(u8, u8)> = (5..8).map(|s| (20, s)).collect();
        sectors.insert(TsAddress::new(19, 15), ts_sector((19, 14), 0, &first));
        sectors.insert(TsAddress::new(19, 14), ts_sector((0, 0), 0x0500, &second));
        let mut source = MapSource(sectors);

        let chain = walk(&mut source, (19, 15)).unwrap();
        assert_eq!(chain.index.len(), 2);
        assert_eq!(chain.data_count(), 8);
        assert_eq!(chain.sector_count(), 10);

        let data = chain.data_sectors();
        for (i, d) in data.iter().enumerate() {
            assert_eq!(d.offset, (i * 256) as u32);
            assert_eq!(d.address, TsAddress::new(20, i as u8));
        }
    }

    #[test]
    fn test_chain_continues_on_track_zero() {
        let mut sectors = HashMap::new();
        sectors.insert(TsAddress::new(19, 15), ts_sector((0, 4), 0, &[(20, 0), (20, 1)]));
        sectors.insert(TsAddress::new(0, 4), ts_sector((0, 0), 0x0200, &[(20, 2)]));
        let mut source = MapSource(sectors);

        let chain = walk(&mut source, (19, 15)).unwrap();
        assert_eq!(chain.index.len(), 2);
        assert_eq!(chain.index[1].address, TsAddress::new(0, 4));
        assert_eq!(chain.data_count(), 3);
        assert_eq!(chain.data_sectors()[2].offset, 0x0200);
    }

    #[test]
    fn test_chain_cycle() {
        let mut sectors = HashMap::new();
        sectors.insert(TsAddress::new(19, 15), ts_sector((19, 14), 0, &[(20, 0)]));
        sectors.insert(TsAddress::new(19, 14), ts_sector((19, 15), 0x100, &[(20, 1)]));
        let mut source = MapSource(sectors);

        let result = walk(&mut source, (19, 15));
        assert!(matches!(
            result,
            Err(DosError::CorruptFilesystem { track: 19, sector: 15, chain: ChainKind::TsList })
        ));
    }

    #[test]
    fn test_chain_self_loop() {
        let mut sectors = HashMap::new();
        sectors.insert(TsAddress::new(5, 5), ts_sector((5, 5), 0, &[]));
        let mut source = MapSource(sectors);

        let result = walk(&mut source, (5, 5));
        assert!(matches!(result, Err(DosError::CorruptFilesystem { .. })));
    }

    #[test]
    fn test_chain_out_of_bounds() {
        let mut sectors = HashMap::new();
        sectors.insert(TsAddress::new(19, 15), ts_sector((40, 0), 0, &[(20, 0)]));
        let mut source = MapSource(sectors);

        let result = walk(&mut source, (19, 15));
        assert!(matches!(result, Err(DosError::OutOfBounds { track: 40, .. })));

        let mut sectors = HashMap::new();
        sectors.insert(TsAddress::new(19, 15), ts_sector((0, 0), 0, &[(20, 16)]));
        let mut source = MapSource(sectors);
        let result = walk(&mut source, (19, 15));
        assert!(matches!(result, Err(DosError::OutOfBounds { sector: 16, .. })));
    }
}
