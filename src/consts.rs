/// The size (in bytes) of a disk sector. Every LBA in this crate counts sectors of this size
pub const SECTOR_SIZE: usize = 512;

/// The size (in bytes) of an ISO9660 logical sector
///
/// The boot sector and the loader must fit in exactly one of these,
/// so that the pair can also be loaded from optical media
pub const OPTICAL_SECTOR_SIZE: usize = 2048;

/// The required size (in bytes) of the boot sector
pub const BOOT_SECTOR_SIZE: usize = SECTOR_SIZE;
/// The required size (in bytes) of the second-stage loader
pub const LOADER_SIZE: usize = OPTICAL_SECTOR_SIZE - BOOT_SECTOR_SIZE;

// Locations of the fields patched into the boot sector
pub(crate) const LOADER_SECTORS_OFFSET: usize = 482;
pub(crate) const LOADER_LBA_OFFSET: usize = 488;
pub(crate) const KERNEL_LBA_OFFSET: usize = 496;
pub(crate) const KERNEL_SECTORS_OFFSET: usize = 504;

/// The size (in bytes) of a Master Boot Record
pub const MBR_SIZE: usize = SECTOR_SIZE;
/// Where the partition table starts inside the MBR
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;
/// The size (in bytes) of a single partition table entry
pub const PARTITION_ENTRY_SIZE: usize = 16;
/// How many entries a MBR partition table holds
pub const PARTITION_TABLE_ENTRIES: usize = 4;
/// `0x55, 0xAA` at the very end of the MBR, read as a little-endian `u16`
pub(crate) const MBR_SIGNATURE: u16 = 0xAA55;

/// The only partition type we are willing to overwrite (historically CP/M)
pub const ACCEPTED_PARTITION_TYPE: u8 = 0x52;
