// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("wheelhouse")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Wheelhouse Contributors")
        .about("Install a wheel with per-file atomic writes and RECORD tracking")
        .arg(
            Arg::new("wheel")
                .required(true)
                .help("Path to the wheel file to install"),
        )
        .arg(
            Arg::new("dest")
                .required(true)
                .help("Destination directory"),
        )
        .arg(
            Arg::new("installer")
                .long("installer")
                .value_name("NAME")
                .default_value("wheelhouse")
                .help("Installer identity recorded in the INSTALLER metadata file"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("wheelhouse.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
