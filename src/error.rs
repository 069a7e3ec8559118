use std::{error, io};

use bincode::error::{DecodeError, EncodeError};

/// A stage of the boot chain that ends up in the disk image
#[derive(Debug, Clone, Copy, PartialEq, Eq, displaydoc::Display)]
pub enum Stage {
    /// boot sector
    BootSector,
    /// loader
    Loader,
    /// kernel
    Kernel,
}

/// An error indicating that building or placing the disk image has failed
#[derive(Debug, displaydoc::Display)]
pub enum ImageError {
    /// Can't open {path}: {source}
    FileOpen { path: String, source: io::Error },
    /// The {stage} should be {expected} bytes but is {actual}
    Size {
        stage: Stage,
        expected: usize,
        actual: usize,
    },
    /// Invalid offset: can't place {width} bytes at offset {offset} of a {len}-byte buffer
    Offset {
        offset: usize,
        width: usize,
        len: usize,
    },
    /// Kernel padding too much: {0} bytes
    Alignment(usize),
    /// {0} is a block device but not a partition
    NotAPartition(String),
    /// Partition {0} is outside the 4-entry MBR partition table
    PartitionIndex(u32),
    /// Disk partition {index} has type {system:#04x}, it should be set to 0x52 (CP/M)
    PartitionType { index: u32, system: u8 },
    /// An IO error occured on {path}: {source}
    IO { path: String, source: io::Error },
    /// The {stage} at LBA {base} with {sectors} sectors runs past the end of the addressable disk
    LbaOverflow { stage: Stage, base: u64, sectors: u16 },
    /// The image content is {size} bytes, which exceeds the {limit} bytes available
    OutputTooLarge { size: u64, limit: u64 },
    /// Can't write to output {path}: {source}
    Write { path: String, source: io::Error },
    /// bincode errored out while encoding: {0}
    Encode(EncodeError),
    /// bincode errored out while decoding: {0}
    Decode(DecodeError),
}

impl error::Error for ImageError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ImageError::FileOpen { source, .. }
            | ImageError::IO { source, .. }
            | ImageError::Write { source, .. } => Some(source),
            ImageError::Encode(err) => Some(err),
            ImageError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncodeError> for ImageError {
    #[inline]
    fn from(value: EncodeError) -> Self {
        ImageError::Encode(value)
    }
}

impl From<DecodeError> for ImageError {
    #[inline]
    fn from(value: DecodeError) -> Self {
        ImageError::Decode(value)
    }
}

/// An alias for a [`Result`] with an [`ImageError`] error type
pub type ImageResult<T> = Result<T, ImageError>;

/// The error returned when parsing a [`DiskGeometry`](crate::DiskGeometry) fails
#[derive(Debug, Clone, PartialEq, Eq, displaydoc::Display)]
pub enum ParseGeometryError {
    /// Expected a geometry of the form CYLINDERS/HEADS/SECTORS, got "{0}"
    Malformed(String),
    /// Every geometry component must be a non-zero number, got "{0}"
    InvalidComponent(String),
    /// A disk with geometry {0} is too large to be addressed
    TooLarge(String),
}

impl error::Error for ParseGeometryError {}

