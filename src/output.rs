use crate::error::*;
use crate::image::ComposedImage;
use crate::partition::path_is_block_device;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Write a composed image to `target`
///
/// Block devices (a partition) are overwritten in place from their first sector.
/// Anything else is treated as a plain file: the image is first written next to it
/// and then renamed over it, so that `target` never holds a half-written image.
/// The trailing padding of a file is a plain length extension
pub fn write_image<P>(target: P, image: &ComposedImage) -> ImageResult<()>
where
    P: AsRef<Path>,
{
    let target = target.as_ref();
    let write_error = |source: io::Error| ImageError::Write {
        path: target.display().to_string(),
        source,
    };

    if path_is_block_device(target) {
        log::info!("Writing {} bytes to device {}", image.len(), target.display());
        write_device(target, image).map_err(write_error)
    } else {
        log::info!("Writing {} bytes to {}", image.len(), target.display());
        replace_file(target, image).map_err(write_error)
    }
}

fn write_device(target: &Path, image: &ComposedImage) -> io::Result<()> {
    let mut device = OpenOptions::new().write(true).open(target)?;
    image.write_to(&mut device)?;
    device.sync_all()
}

/// The sibling path the image is staged at before being renamed over `target`
fn staging_path(target: &Path) -> io::Result<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
    })?;

    let mut staged = name.to_os_string();
    staged.push(".partial");

    Ok(target.with_file_name(staged))
}

fn write_file(path: &Path, image: &ComposedImage) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(image.content())?;
    file.set_len(image.len())?;
    file.sync_all()
}

fn replace_file(target: &Path, image: &ComposedImage) -> io::Result<()> {
    let staged = staging_path(target)?;

    let result = write_file(&staged, image).and_then(|_| fs::rename(&staged, target));
    if result.is_err() {
        // nothing to do if this errors out, we are already reporting a failure
        let _ = fs::remove_file(&staged);
    }

    result
}
