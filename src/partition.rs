use crate::consts::*;
use crate::error::*;
use crate::mbr::Mbr;

use std::fs::{self, File, Metadata};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A partition of a block device, such as `/dev/sda3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    /// The whole-disk device holding the MBR (`/dev/sda`)
    pub device: PathBuf,
    /// The 1-based partition number (`3`)
    pub index: u32,
}

impl DeviceTarget {
    /// Break a partition device name into its disk and partition number
    ///
    /// `/dev/sda3` becomes `/dev/sda` and `3`. Disks whose names already end in a digit
    /// separate the partition number with a `p`: `/dev/nvme0n1p2` becomes `/dev/nvme0n1` and `2`
    pub fn parse<P>(path: P) -> ImageResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let not_a_partition = || ImageError::NotAPartition(path.display().to_string());

        let name = path.to_str().ok_or_else(not_a_partition)?;
        let digits_start = name
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|pos| pos + 1)
            .ok_or_else(not_a_partition)?;

        let (disk, digits) = name.split_at(digits_start);
        if digits.bytes().all(|b| b == b'0') {
            return Err(not_a_partition());
        }
        // only digits are left, so the parse can only fail on overflow
        let index = digits.parse::<u32>().unwrap_or(u32::MAX);

        let disk = match disk.strip_suffix('p') {
            Some(stripped) if stripped.ends_with(|c: char| c.is_ascii_digit()) => stripped,
            _ => disk,
        };

        Ok(Self {
            device: PathBuf::from(disk),
            index,
        })
    }
}

#[cfg(unix)]
fn is_block_device(metadata: &Metadata) -> bool {
    use std::os::unix::fs::FileTypeExt;

    metadata.file_type().is_block_device()
}

#[cfg(not(unix))]
fn is_block_device(_metadata: &Metadata) -> bool {
    false
}

/// Whether `path` currently names a block device
pub(crate) fn path_is_block_device(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| is_block_device(&metadata))
        .unwrap_or(false)
}

/// Read the MBR from the start of `reader`
///
/// `path` is only used for error reporting
pub fn read_mbr<R>(reader: &mut R, path: &Path) -> ImageResult<Mbr>
where
    R: Read,
{
    let mut sector = [0u8; MBR_SIZE];
    if let Err(source) = reader.read_exact(&mut sector) {
        log::debug!("Can't read MBR from {}", path.display());
        return Err(ImageError::IO {
            path: path.display().to_string(),
            source,
        });
    }

    Mbr::from_bytes(&sector)
}

/// Open the whole-disk `device` and read its MBR
pub fn read_device_mbr(device: &Path) -> ImageResult<Mbr> {
    let mut disk = File::open(device).map_err(|source| ImageError::IO {
        path: device.display().to_string(),
        source,
    })?;

    read_mbr(&mut disk, device)
}

/// Find the LBA the image will start at when written to `target`
///
/// Plain files (or paths that don't exist yet) start at LBA 0. A partition of a block device
/// starts at the LBA its MBR entry says, provided that entry is of the [`ACCEPTED_PARTITION_TYPE`]
pub fn resolve_partition_lba<P>(target: P) -> ImageResult<u64>
where
    P: AsRef<Path>,
{
    let target = target.as_ref();

    let metadata = match fs::metadata(target) {
        Ok(metadata) => metadata,
        Err(err) => {
            log::info!("Can't read device information for {}: {}", target.display(), err);
            return Ok(0);
        }
    };

    if !is_block_device(&metadata) {
        log::info!("{}: not a block device", target.display());
        return Ok(0);
    }

    let partition = DeviceTarget::parse(target).inspect_err(|_| {
        log::debug!("Block device {} is not a partition", target.display());
    })?;
    log::debug!(
        "device: {} partition: {}",
        partition.device.display(),
        partition.index
    );

    let mbr = read_device_mbr(&partition.device)?;

    mbr.accepted_partition_lba(partition.index)
}
