/// Dump the VTOC, free-sector map and catalog of a DOS 3.3 image

use dos33reader::map::render_free_map;
use dos33reader::report::{render_catalog, render_volume};
use dos33reader::*;
use std::process::ExitCode;

const USAGE: &str = "usage: dos33 <image.dsk> [--skewed] [--strict] [--map]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut path = None;
    let mut spec = FormatSpec::dos33();
    let mut show_map = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--skewed" => spec = spec.with_skew(SectorSkew::Dos33),
            "--strict" => spec = spec.with_reserved_policy(ReservedPolicy::Strict),
            "--map" => show_map = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("{}", USAGE);
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(path) = path else {
        eprintln!("{}", USAGE);
        return ExitCode::FAILURE;
    };

    match run(&path, spec, show_map) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, spec: FormatSpec, show_map: bool) -> Result<()> {
    let mut fs = Dos33FileSystem::open(path, spec)?;
    println!("Opened {}", path);

    // volume first, so it is shown even if the catalog walk hits an I/O error
    print!("{}", render_volume(fs.volume()));
    println!();

    if show_map {
        print!("{}", render_free_map(fs.volume()));
        println!();
    }

    let catalog = fs.read_catalog_partial()?;
    print!("{}", render_catalog(&catalog));

    Ok(())
}
