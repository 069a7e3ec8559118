//! Build bootable disk images out of a boot sector, a second-stage loader and a kernel
//!
//! The boot sector is patched with the location (LBA and length in sectors) of the loader
//! and the kernel, so that it can load them at boot time. The image can either be a standalone
//! file (for use with emulators) or be written straight to a MBR partition of type `0x52`,
//! in which case all LBAs are offset by the start of that partition.

mod consts;
mod error;
mod geometry;
mod image;
pub mod mbr;
mod output;
mod partition;
mod utils;

pub use consts::*;
pub use error::*;
pub use geometry::*;
pub use image::*;
pub use output::*;
pub use partition::*;
