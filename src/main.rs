use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mkdiskimg::{
    compose, resolve_partition_lba, write_image, DiskGeometry, ImageResult, StageLayout, Stages,
};

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("bootsector")
                .help("The 512-byte boot sector")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(1)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("loader")
                .help("The 1536-byte second-stage loader")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(2)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("kernel")
                .help("The kernel image")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(3)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .help("The disk image file, or a partition of type 0x52 (eg: /dev/sda3)")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(4)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("geometry")
                .long("geometry")
                .help("Pad the image to the size of a CYLINDERS/HEADS/SECTORS disk")
                .value_parser(value_parser!(DiskGeometry))
                .default_value("20/16/63")
                .action(ArgAction::Set),
        )
}

fn path<'a>(matches: &'a ArgMatches, id: &str) -> &'a PathBuf {
    matches
        .get_one::<PathBuf>(id)
        .expect("clap enforces required arguments")
}

fn run(matches: &ArgMatches) -> ImageResult<()> {
    let bootsector = path(matches, "bootsector");
    let loader = path(matches, "loader");
    let kernel = path(matches, "kernel");
    let output = path(matches, "output");
    let geometry = matches
        .get_one::<DiskGeometry>("geometry")
        .copied()
        .unwrap_or_default();

    log::info!(
        "Bootsect: {} loader: {} kernel: {} output: {}",
        bootsector.display(),
        loader.display(),
        kernel.display(),
        output.display()
    );

    let stages = Stages::read(bootsector, loader, kernel)?;
    let layout = stages.layout(resolve_partition_lba(output)?)?;
    let image = compose(stages, layout.loader_lba, layout.kernel_lba, &geometry)?;

    log::debug!(
        "Boot sector reads back as {}",
        StageLayout::read_from(image.content())?
    );
    write_image(output, &image)?;
    log::info!("Wrote a {} byte image for a {} disk", image.len(), geometry);

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // reported outside of `log`, so that a quiet RUST_LOG can't swallow it
            eprintln!("{}: {}", env!("CARGO_PKG_NAME"), err);
            ExitCode::FAILURE
        }
    }
}
