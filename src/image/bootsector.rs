use super::*;

use core::{fmt, ops::Deref};

use bincode::{Decode, Encode};

/// An unsigned integer that can be stored at a fixed offset of a sector
///
/// [`WIDTH`](LeField::WIDTH) is the number of bytes it occupies when
/// encoded with [`bincode_config()`]
pub trait LeField: Encode + Decode<()> + Copy {
    /// How many bytes this field occupies on disk
    const WIDTH: usize;
}

macro_rules! impl_le_field {
    ($($ty:ty),*) => {
        $(
            impl LeField for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();
            }
        )*
    };
}

impl_le_field!(u8, u16, u32, u64);

/// The subslice `[offset, offset + width)` of a buffer of length `len`,
/// or an [`ImageError::Offset`] if it doesn't lie entirely inside the buffer
fn field_range(offset: usize, width: usize, len: usize) -> ImageResult<core::ops::Range<usize>> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(ImageError::Offset { offset, width, len }),
    }
}

/// Write `value` as a little-endian integer at `offset` of `buf`
pub fn write_le<T>(buf: &mut [u8], offset: usize, value: T) -> ImageResult<()>
where
    T: LeField,
{
    let range = field_range(offset, T::WIDTH, buf.len())?;
    bincode::encode_into_slice(value, &mut buf[range], bincode_config())?;

    Ok(())
}

/// Read a little-endian integer from `offset` of `buf`
pub fn read_le<T>(buf: &[u8], offset: usize) -> ImageResult<T>
where
    T: LeField,
{
    let range = field_range(offset, T::WIDTH, buf.len())?;
    let (value, _) = bincode::decode_from_slice(&buf[range], bincode_config())?;

    Ok(value)
}

/// The first sector of the image, executed by the firmware at boot
///
/// Always exactly [`BOOT_SECTOR_SIZE`] bytes long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootSector {
    bytes: [u8; BOOT_SECTOR_SIZE],
}

impl TryFrom<&[u8]> for BootSector {
    type Error = ImageError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes = value.try_into().map_err(|_| ImageError::Size {
            stage: Stage::BootSector,
            expected: BOOT_SECTOR_SIZE,
            actual: value.len(),
        })?;

        Ok(Self { bytes })
    }
}

impl TryFrom<Vec<u8>> for BootSector {
    type Error = ImageError;

    #[inline]
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl Deref for BootSector {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl BootSector {
    #[inline]
    /// Patch a single little-endian field of this boot sector
    pub fn patch<T>(&mut self, offset: usize, value: T) -> ImageResult<()>
    where
        T: LeField,
    {
        write_le(&mut self.bytes, offset, value)
    }
}

/// The four fields the boot sector reads to load the loader and the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageLayout {
    pub loader_sectors: u16,
    pub loader_lba: u64,
    pub kernel_lba: u64,
    pub kernel_sectors: u16,
}

impl fmt::Display for StageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loader: LBA: {} sectors: {}  kernel: LBA: {} sectors: {}",
            self.loader_lba, self.loader_sectors, self.kernel_lba, self.kernel_sectors
        )
    }
}

impl StageLayout {
    /// Store this layout in its fixed location inside `bootsector`
    ///
    /// All other bytes are left untouched
    pub fn write_to(&self, bootsector: &mut BootSector) -> ImageResult<()> {
        bootsector.patch(LOADER_SECTORS_OFFSET, self.loader_sectors)?;
        bootsector.patch(LOADER_LBA_OFFSET, self.loader_lba)?;
        bootsector.patch(KERNEL_LBA_OFFSET, self.kernel_lba)?;
        bootsector.patch(KERNEL_SECTORS_OFFSET, self.kernel_sectors)?;

        Ok(())
    }

    /// Read back a layout from the first sector of `buf`
    ///
    /// `buf` may be a [`BootSector`] or a whole disk image
    pub fn read_from(buf: &[u8]) -> ImageResult<Self> {
        Ok(Self {
            loader_sectors: read_le(buf, LOADER_SECTORS_OFFSET)?,
            loader_lba: read_le(buf, LOADER_LBA_OFFSET)?,
            kernel_lba: read_le(buf, KERNEL_LBA_OFFSET)?,
            kernel_sectors: read_le(buf, KERNEL_SECTORS_OFFSET)?,
        })
    }
}
