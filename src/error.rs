use crate::image::TsAddress;
use thiserror::Error;

/// Result type alias for DOS 3.3 decode operations
pub type Result<T> = std::result::Result<T, DosError>;

/// Broad classification of a [`DosError`]
///
/// `Io` aborts a whole decode run. `Format` and `Corrupt` only affect the
/// entity (catalog entry, chain) being decoded when they were raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Image open/seek/read failure
    Io,
    /// A decoded field violates a structural invariant
    Format,
    /// A sector chain loops back on itself
    Corrupt,
}

/// Which kind of sector chain an error was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// The catalog sector chain
    Catalog,
    /// A file's track/sector list chain
    TsList,
}

impl std::fmt::Display for ChainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainKind::Catalog => write!(f, "catalog"),
            ChainKind::TsList => write!(f, "track/sector list"),
        }
    }
}

/// Errors that can occur when decoding a DOS 3.3 image
#[derive(Debug, Error)]
pub enum DosError {
    /// I/O error while opening the image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error while seeking to or reading a sector
    #[error("I/O error at track {track} sector {sector} (offset {offset:#x}): {source}")]
    SectorIo {
        /// Track number
        track: u8,
        /// Sector number
        sector: u8,
        /// Byte offset in the image
        offset: u64,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The image ended before a full sector could be read
    #[error(
        "Short read at track {track} sector {sector} (offset {offset:#x}): got {got} of 256 bytes"
    )]
    ShortRead {
        /// Track number
        track: u8,
        /// Sector number
        sector: u8,
        /// Byte offset in the image
        offset: u64,
        /// Bytes actually read
        got: usize,
    },

    /// Sector number outside the configured sectors per track
    #[error("Invalid sector {sector} on track {track} (max: {max})")]
    InvalidSector {
        /// Track number
        track: u8,
        /// Sector number
        sector: u8,
        /// Maximum allowed sector number
        max: u8,
    },

    /// A chain pointer names a sector outside the VTOC geometry
    #[error(
        "Track {track} sector {sector} is outside the disk geometry \
         ({tracks} tracks x {sectors} sectors)"
    )]
    OutOfBounds {
        /// Track number
        track: u8,
        /// Sector number
        sector: u8,
        /// Tracks declared by the VTOC
        tracks: u8,
        /// Sectors per track declared by the VTOC
        sectors: u8,
    },

    /// A decoded structure is malformed
    #[error("Format error at track {track} sector {sector}: {message}")]
    Format {
        /// Track number
        track: u8,
        /// Sector number
        sector: u8,
        /// Error message
        message: String,
    },

    /// A buffer handed to a decoder has the wrong length
    #[error(
        "Invalid buffer size{location}: expected {expected} bytes, got {actual}",
        location = location(.at)
    )]
    BufferSize {
        /// Sector the buffer was read from, when the decoder knows it
        at: Option<TsAddress>,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// A sector chain revisits a sector before reaching its end
    #[error("Corrupt filesystem: {chain} chain loops back to track {track} sector {sector}")]
    CorruptFilesystem {
        /// Track where the cycle was detected
        track: u8,
        /// Sector where the cycle was detected
        sector: u8,
        /// Chain being walked
        chain: ChainKind,
    },

    /// A custom sector skew table is not a permutation
    #[error("Invalid sector skew table: {0}")]
    InvalidSkew(String),
}

impl DosError {
    /// Create a format error at a track/sector
    pub fn format<S: Into<String>>(track: u8, sector: u8, message: S) -> Self {
        DosError::Format {
            track,
            sector,
            message: message.into(),
        }
    }

    /// Create a cycle error for a chain
    pub fn corrupt(track: u8, sector: u8, chain: ChainKind) -> Self {
        DosError::CorruptFilesystem {
            track,
            sector,
            chain,
        }
    }

    /// Attach the sector a buffer came from to a `BufferSize` error that lacks one
    pub fn with_location(self, address: TsAddress) -> Self {
        match self {
            DosError::BufferSize {
                at: None,
                expected,
                actual,
            } => DosError::BufferSize {
                at: Some(address),
                expected,
                actual,
            },
            other => other,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DosError::Io(_) | DosError::SectorIo { .. } | DosError::ShortRead { .. } => {
                ErrorKind::Io
            }
            DosError::CorruptFilesystem { .. } => ErrorKind::Corrupt,
            DosError::InvalidSector { .. }
            | DosError::OutOfBounds { .. }
            | DosError::Format { .. }
            | DosError::BufferSize { .. }
            | DosError::InvalidSkew(_) => ErrorKind::Format,
        }
    }

    /// Whether this error must abort the whole decode run
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Io
    }
}

fn location(at: &Option<TsAddress>) -> String {
    match at {
        Some(address) => format!(" at {}", address),
        None => String::new(),
    }
}
