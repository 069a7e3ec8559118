use super::*;

use core::ops::Deref;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::geometry::DiskGeometry;

/// How many sectors are needed to hold `len` bytes
///
/// The boot sector stores sector counts as [`u16`]s, so anything
/// above [`u16::MAX`] sectors can't be described to it
pub fn sectors_for(len: usize) -> ImageResult<u16> {
    u16::try_from(len.div_ceil(SECTOR_SIZE)).map_err(|_| ImageError::OutputTooLarge {
        size: len as u64,
        limit: u64::from(u16::MAX) * SECTOR_SIZE as u64,
    })
}

/// The second-stage loader
///
/// Always exactly [`LOADER_SIZE`] bytes long, so that together with the
/// [`BootSector`] it fills a single [`OPTICAL_SECTOR_SIZE`] sector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    bytes: Vec<u8>,
}

impl TryFrom<Vec<u8>> for Loader {
    type Error = ImageError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        if value.len() != LOADER_SIZE {
            return Err(ImageError::Size {
                stage: Stage::Loader,
                expected: LOADER_SIZE,
                actual: value.len(),
            });
        }

        Ok(Self { bytes: value })
    }
}

impl Deref for Loader {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

/// The three stages of the boot chain, validated and ready to be composed
#[derive(Debug, Clone)]
pub struct Stages {
    pub bootsector: BootSector,
    pub loader: Loader,
    pub kernel: Vec<u8>,
}

impl Stages {
    /// Validate the raw contents of the three stages
    ///
    /// Fails with [`ImageError::Size`] if the boot sector or
    /// the loader don't have their required sizes
    pub fn new(bootsector: Vec<u8>, loader: Vec<u8>, kernel: Vec<u8>) -> ImageResult<Self> {
        Ok(Self {
            bootsector: BootSector::try_from(bootsector)?,
            loader: Loader::try_from(loader)?,
            kernel,
        })
    }

    /// Read the three stages from disk
    pub fn read<B, L, K>(bootsector: B, loader: L, kernel: K) -> ImageResult<Self>
    where
        B: AsRef<Path>,
        L: AsRef<Path>,
        K: AsRef<Path>,
    {
        let bootsector = read_stage(bootsector.as_ref())?;
        let bootsector = BootSector::try_from(bootsector)?;

        let loader = read_stage(loader.as_ref())?;
        let loader = Loader::try_from(loader)?;

        let kernel = read_stage(kernel.as_ref())?;

        Ok(Self {
            bootsector,
            loader,
            kernel,
        })
    }

    #[inline]
    /// The number of sectors the loader occupies (always 3)
    pub fn loader_sectors(&self) -> ImageResult<u16> {
        sectors_for(self.loader.len())
    }

    #[inline]
    /// The number of sectors the kernel occupies
    pub fn kernel_sectors(&self) -> ImageResult<u16> {
        sectors_for(self.kernel.len())
    }

    /// Compute where each stage lands on a disk whose image starts at `base_lba`
    ///
    /// The first sector is left to the boot sector itself, the loader
    /// follows it and the kernel comes right after the loader
    pub fn layout(&self, base_lba: u64) -> ImageResult<StageLayout> {
        let loader_sectors = self.loader_sectors()?;
        let kernel_sectors = self.kernel_sectors()?;

        let loader_lba = base_lba
            .checked_add(1)
            .ok_or(ImageError::LbaOverflow {
                stage: Stage::BootSector,
                base: base_lba,
                sectors: 1,
            })?;
        let kernel_lba = loader_lba
            .checked_add(u64::from(loader_sectors))
            .ok_or(ImageError::LbaOverflow {
                stage: Stage::Loader,
                base: loader_lba,
                sectors: loader_sectors,
            })?;

        Ok(StageLayout {
            loader_sectors,
            loader_lba,
            kernel_lba,
            kernel_sectors,
        })
    }
}

fn read_stage(path: &Path) -> ImageResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| ImageError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(bytes)
}

/// A disk image, ready to be written out
///
/// Only the stages themselves are held in memory. The zero padding that
/// extends the image to the size of the disk is produced while writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedImage {
    content: Vec<u8>,
    size: u64,
}

impl ComposedImage {
    #[inline]
    /// The boot sector, the loader and the kernel, without the trailing padding
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[inline]
    /// The total size of the image in bytes, trailing padding included
    pub fn len(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    /// How many zero bytes follow the content
    pub fn trailing_padding(&self) -> u64 {
        self.size - self.content.len() as u64
    }

    /// Write the whole image, trailing padding included, to `writer`
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        writer.write_all(&self.content)?;
        io::copy(&mut io::repeat(0).take(self.trailing_padding()), writer)?;

        Ok(())
    }
}

/// Build the disk image
///
/// The image is laid out as `boot sector | loader | padding | kernel | padding`,
/// where the first padding aligns the kernel to a sector boundary and the last
/// one extends the image to the full size of `geometry`.
/// The boot sector is patched with the loader and kernel locations before being written.
pub fn compose(
    stages: Stages,
    loader_lba: u64,
    kernel_lba: u64,
    geometry: &DiskGeometry,
) -> ImageResult<ComposedImage> {
    let layout = StageLayout {
        loader_sectors: stages.loader_sectors()?,
        loader_lba,
        kernel_lba,
        kernel_sectors: stages.kernel_sectors()?,
    };

    let Stages {
        mut bootsector,
        loader,
        kernel,
    } = stages;
    layout.write_to(&mut bootsector)?;
    log::info!("{}", layout);

    let mut content = Vec::with_capacity(OPTICAL_SECTOR_SIZE + SECTOR_SIZE + kernel.len());
    content.extend_from_slice(&bootsector);
    content.extend_from_slice(&loader);

    // make sure the kernel starts on a sector boundary
    let seek = (content.len() + SECTOR_SIZE - 1) & !(SECTOR_SIZE - 1);
    let kernel_padding = seek - content.len();
    if kernel_padding >= SECTOR_SIZE {
        log::debug!("kernel padding too much {}", kernel_padding);
        return Err(ImageError::Alignment(kernel_padding));
    }
    log::debug!("Adding {} bytes to start of kernel", kernel_padding);
    content.resize(seek, 0);
    content.extend_from_slice(&kernel);

    let limit = geometry.size_bytes();
    let size = content.len() as u64;
    if size > limit {
        log::debug!("Image content doesn't fit in a {} disk", geometry);
        return Err(ImageError::OutputTooLarge { size, limit });
    }

    log::debug!(
        "Padding the image with {} trailing bytes to reach {} bytes",
        limit - size,
        limit
    );

    Ok(ComposedImage {
        content,
        size: limit,
    })
}
