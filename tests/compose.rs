mod stage_commons;

use mkdiskimg::*;

use stage_commons::*;
use test_log::test;

const IMAGE_SIZE: usize = 20 * 16 * 63 * 512;

fn field_u16(image: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(image[offset..offset + 2].try_into().unwrap())
}

fn field_u64(image: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(image[offset..offset + 8].try_into().unwrap())
}

#[test]
fn plain_file_image() {
    let dir = scratch_dir("plain-file");
    let kernel = kernel(70_000);
    let [bootsect_path, loader_path, kernel_path] =
        write_stages(&dir, [&bootsector(), &loader(), &kernel]);
    let output = dir.join("disk.img");

    let stages = Stages::read(&bootsect_path, &loader_path, &kernel_path).unwrap();
    let base_lba = resolve_partition_lba(&output).unwrap();
    assert_eq!(base_lba, 0);

    let layout = stages.layout(base_lba).unwrap();
    let geometry = DiskGeometry::default();
    let image = compose(stages, layout.loader_lba, layout.kernel_lba, &geometry).unwrap();
    write_image(&output, &image).unwrap();

    let image = std::fs::read(&output).unwrap();
    assert_eq!(image.len(), IMAGE_SIZE);

    // the fields are where the boot sector expects them
    assert_eq!(field_u16(&image, 482), 3);
    assert_eq!(field_u64(&image, 488), 1);
    assert_eq!(field_u64(&image, 496), 4);
    assert_eq!(field_u16(&image, 504), 137);

    // and nothing else in the boot sector moved
    let original = bootsector();
    for i in (0..482).chain(484..488).chain(506..512) {
        assert_eq!(image[i], original[i], "boot sector byte {i} changed");
    }

    assert_eq!(image[512..2048], loader()[..]);
    assert_eq!(image[2048..2048 + kernel.len()], kernel[..]);
    assert!(image[2048 + kernel.len()..].iter().all(|b| *b == 0));
}

#[test]
fn partition_offsets_every_lba() {
    let stages = Stages::new(bootsector(), loader(), kernel(512)).unwrap();

    let layout = stages.layout(2048).unwrap();
    assert_eq!(layout.loader_lba, 2049);
    assert_eq!(layout.kernel_lba, layout.loader_lba + u64::from(layout.loader_sectors));

    let geometry = DiskGeometry::default();
    let image = compose(stages, layout.loader_lba, layout.kernel_lba, &geometry).unwrap();
    assert_eq!(image.len(), IMAGE_SIZE as u64);

    let content = image.content();
    assert_eq!(StageLayout::read_from(content).unwrap(), layout);
    assert_eq!(field_u64(content, 488), 2049);
    assert_eq!(field_u64(content, 496), 2052);
    assert_eq!(field_u16(content, 504), 1);
}

#[test]
fn missing_stage_file() {
    let dir = scratch_dir("missing-stage");
    let [bootsect_path, loader_path, _] = write_stages(&dir, [&bootsector(), &loader(), &[]]);

    let result = Stages::read(&bootsect_path, &loader_path, dir.join("no-kernel.bin"));
    match result {
        Err(ImageError::FileOpen { path, .. }) => assert!(path.ends_with("no-kernel.bin")),
        other => panic!("expected a FileOpen error, got {other:?}"),
    }
}

#[test]
fn wrongly_sized_stages() {
    let dir = scratch_dir("wrong-sizes");

    let [bootsect_path, loader_path, kernel_path] =
        write_stages(&dir, [&bootsector()[..511], &loader(), &kernel(1)]);
    assert!(matches!(
        Stages::read(&bootsect_path, &loader_path, &kernel_path),
        Err(ImageError::Size {
            stage: Stage::BootSector,
            actual: 511,
            ..
        })
    ));

    let [bootsect_path, loader_path, kernel_path] =
        write_stages(&dir, [&bootsector(), &[0u8; 1537], &kernel(1)]);
    assert!(matches!(
        Stages::read(&bootsect_path, &loader_path, &kernel_path),
        Err(ImageError::Size {
            stage: Stage::Loader,
            actual: 1537,
            ..
        })
    ));
}

#[test]
fn kernel_too_large_for_the_disk() {
    let stages = Stages::new(bootsector(), loader(), kernel(IMAGE_SIZE - 2048 + 1)).unwrap();
    let layout = stages.layout(0).unwrap();

    assert!(matches!(
        compose(stages, layout.loader_lba, layout.kernel_lba, &DiskGeometry::default()),
        Err(ImageError::OutputTooLarge { limit, .. }) if limit == IMAGE_SIZE as u64
    ));
}
