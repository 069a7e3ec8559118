use crate::consts::*;
use crate::error::*;
use crate::utils::bincode::bincode_config;

use bincode::{Decode, Encode};
use bitfield_struct::bitfield;

#[bitfield(u8, order = Lsb)]
#[derive(Encode, Decode)]
/// The status byte of a partition table entry
pub struct PartitionStatus {
    #[bits(7)]
    _reserved: u8,
    /// Whether this partition is marked active (bootable)
    #[bits(1)]
    pub bootable: bool,
}

/// A single entry of the MBR partition table
///
/// Field order and widths match the on-disk layout, so that bincode
/// (de)serializes it as-is with [`bincode_config()`]
#[derive(Encode, Decode, Debug, Clone, Copy)]
pub struct PartitionEntry {
    pub status: PartitionStatus,
    pub _first_chs: [u8; 3],
    /// The partition type (system ID)
    pub system: u8,
    pub _last_chs: [u8; 3],
    /// The first sector of the partition
    pub lba_start: u32,
    pub sector_count: u32,
}

impl PartitionEntry {
    #[inline]
    /// Whether we are willing to write an image over this partition
    pub fn is_accepted(&self) -> bool {
        self.system == ACCEPTED_PARTITION_TYPE
    }
}

/// A Master Boot Record: boot code, a 4-entry partition table and a signature
#[derive(Encode, Decode, Debug, Clone)]
pub struct Mbr {
    pub _boot_code: [u8; PARTITION_TABLE_OFFSET],
    pub partitions: [PartitionEntry; PARTITION_TABLE_ENTRIES],
    pub signature: u16,
}

impl Mbr {
    /// Decode a MBR from the first sector of a disk
    pub fn from_bytes(sector: &[u8; MBR_SIZE]) -> ImageResult<Self> {
        let (mbr, _) = bincode::decode_from_slice::<Mbr, _>(sector, bincode_config())?;

        Ok(mbr)
    }

    #[inline]
    pub fn verify_signature(&self) -> bool {
        self.signature == MBR_SIGNATURE
    }

    /// Get the partition table entry for the 1-based partition `index`,
    /// following the `/dev/sdaN` numbering
    pub fn partition(&self, index: u32) -> ImageResult<&PartitionEntry> {
        index
            .checked_sub(1)
            .and_then(|idx| self.partitions.get(idx as usize))
            .ok_or(ImageError::PartitionIndex(index))
    }

    /// The first sector of partition `index`, provided that it
    /// has the [`ACCEPTED_PARTITION_TYPE`]
    pub fn accepted_partition_lba(&self, index: u32) -> ImageResult<u64> {
        if !self.verify_signature() {
            log::warn!(
                "MBR signature is {:#06x} instead of {:#06x}",
                self.signature,
                MBR_SIGNATURE
            );
        }

        let entry = self.partition(index)?;
        log::info!(
            "partition {}: system: {:#04x} LBA: {} sectors: {} bootable: {}",
            index,
            entry.system,
            entry.lba_start,
            entry.sector_count,
            entry.status.bootable()
        );

        if !entry.is_accepted() {
            log::debug!(
                "Disk partition not set to correct type: {:#04x} (CP/M)",
                ACCEPTED_PARTITION_TYPE
            );
            return Err(ImageError::PartitionType {
                index,
                system: entry.system,
            });
        }

        Ok(u64::from(entry.lba_start))
    }
}
