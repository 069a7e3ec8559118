use core::{fmt, str::FromStr};

use crate::consts::SECTOR_SIZE;
use crate::error::ParseGeometryError;

/// The CHS geometry of the emulated drive the image is padded out to
///
/// The default (20 cylinders, 16 heads, 63 sectors per track) is what bochs
/// expects for a 10,321,920-byte hard disk image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskGeometry {
    pub cylinders: u32,
    pub heads: u32,
    pub sectors_per_track: u32,
}

impl Default for DiskGeometry {
    fn default() -> Self {
        Self {
            cylinders: 20,
            heads: 16,
            sectors_per_track: 63,
        }
    }
}

impl DiskGeometry {
    /// Total number of sectors on the drive, or [`None`] if it doesn't fit in a [`u64`]
    pub fn checked_total_sectors(&self) -> Option<u64> {
        u64::from(self.cylinders)
            .checked_mul(u64::from(self.heads))?
            .checked_mul(u64::from(self.sectors_per_track))
    }

    /// Total size of the drive in bytes, or [`None`] if it doesn't fit in a [`u64`]
    pub fn checked_size_bytes(&self) -> Option<u64> {
        self.checked_total_sectors()?.checked_mul(SECTOR_SIZE as u64)
    }

    #[inline]
    /// Total size of the drive in bytes
    ///
    /// Geometries obtained through [`FromStr`] or [`Default`] never overflow;
    /// a hand-built one that does saturates at [`u64::MAX`]
    pub fn size_bytes(&self) -> u64 {
        self.checked_size_bytes().unwrap_or(u64::MAX)
    }
}

impl fmt::Display for DiskGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.cylinders, self.heads, self.sectors_per_track)
    }
}

impl FromStr for DiskGeometry {
    type Err = ParseGeometryError;

    /// Parses a `CYLINDERS/HEADS/SECTORS` triplet, such as `20/16/63`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s.trim().split('/').collect();

        let &[cylinders, heads, sectors_per_track] = components.as_slice() else {
            return Err(ParseGeometryError::Malformed(s.to_owned()));
        };

        let parse = |component: &str| match component.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ParseGeometryError::InvalidComponent(component.to_owned())),
        };

        let geometry = Self {
            cylinders: parse(cylinders)?,
            heads: parse(heads)?,
            sectors_per_track: parse(sectors_per_track)?,
        };

        if geometry.checked_size_bytes().is_none() {
            return Err(ParseGeometryError::TooLarge(s.to_owned()));
        }

        Ok(geometry)
    }
}
