use std::env;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

pub const SCRATCH_SUBDIR: &str = "mkdiskimg-tests";

/// A scratch directory that is removed, along with everything in it, when dropped
pub struct ScratchDir(PathBuf);

impl Deref for ScratchDir {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// get a fresh scratch directory for the test called `name`
pub fn scratch_dir(name: &str) -> ScratchDir {
    let mut path_buf = env::temp_dir();
    path_buf.push(SCRATCH_SUBDIR);
    path_buf.push(format!("{}-{}", name, std::process::id()));

    let _ = fs::remove_dir_all(&path_buf);
    fs::create_dir_all(&path_buf).unwrap();
    ScratchDir(path_buf)
}

/// A boot sector whose every byte is different from its neighbours,
/// so that stray writes are easy to spot
pub fn bootsector() -> Vec<u8> {
    let mut sector: Vec<u8> = (0..512).map(|i| (i * 7 % 256) as u8).collect();
    sector[510] = 0x55;
    sector[511] = 0xAA;
    sector
}

pub fn loader() -> Vec<u8> {
    vec![0x4C; 1536]
}

pub fn kernel(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 13) as u8 + 1).collect()
}

/// Write the three stages to `dir`, returning their paths
pub fn write_stages(dir: &Path, stages: [&[u8]; 3]) -> [PathBuf; 3] {
    let paths = ["bootsect.bin", "loader.bin", "kernel.bin"].map(|name| dir.join(name));
    for (path, bytes) in paths.iter().zip(stages) {
        fs::write(path, bytes).unwrap();
    }
    paths
}

#[test]
fn scratch_dir_is_removed_on_drop() {
    let dir = scratch_dir("scratch");
    assert!(dir.is_dir());
    write_stages(&dir, [&bootsector(), &loader(), &kernel(1)]);

    let path = dir.to_path_buf();
    drop(dir);
    assert!(!path.exists());
}
