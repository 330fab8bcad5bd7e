/*!
# dos33reader

A Rust library for decoding the metadata of Apple DOS 3.3 disk images.

## Features

- Sector addressing with optional DOS 3.3 software skew
- VTOC decoding, including the free-sector bitmap
- Catalog chain decoding with deleted/unused slot detection
- Track/sector list chains for every file, with file offsets
- Cycle detection on every sector chain

File contents are never decoded and images are never written.

## Quick Start

```rust,no_run
use dos33reader::{Dos33FileSystem, FormatSpec};

let mut fs = Dos33FileSystem::open("disk.dsk", FormatSpec::dos33())?;
println!("Volume {}", fs.volume().disk_vol);

let catalog = fs.read_catalog()?;
for file in catalog.live_files() {
    println!("{}: {} sectors", file.entry.trimmed_name(), file.entry.size);
    if let Some(chain) = file.file_chain() {
        for data in chain.data_sectors() {
            println!("  0x{:05X} at {}", data.offset, data.address);
        }
    }
}
# Ok::<(), dos33reader::DosError>(())
```

## Modules

- `format`: layout constants, sector skew and decoder configuration
- `image`: track/sector addresses and byte offsets
- `io`: sector reader
- `filesystem`: VTOC, catalog and TS-list decoders
- `map`, `report`: text rendering
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Error types and Result alias
pub mod error;
/// Filesystem metadata decoders
pub mod filesystem;
/// DOS 3.3 format constants and configuration
pub mod format;
/// Sector addressing
pub mod image;
/// I/O operations for reading images
pub mod io;
/// Free-sector map rendering
pub mod map;
/// Text rendering of decoded metadata
pub mod report;

// Re-export common types
pub use error::{ChainKind, DosError, ErrorKind, Result};
pub use filesystem::{
    Catalog, CatalogEntry, CatalogFile, CatalogSector, DataSector, DiskReport, Dos33FileSystem,
    EntryState, FileChain, FileSystemInfo, FreeSectorMap, TsListSector, VolumeInfo,
};
pub use format::{FormatSpec, ReservedPolicy, SectorSkew};
pub use image::{offset, SectorData, TsAddress};
pub use io::{SectorReader, SectorSource};
