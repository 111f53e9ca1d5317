// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("go-merge")
        .version(env!("CARGO_PKG_VERSION"))
        .author("gomerge Contributors")
        .about("Three-way git merge driver for go.mod and go.sum")
        .subcommand_required(true)
        .subcommand(
            Command::new("merge")
                .about("Merge go.mod or go.sum (git merge driver: -O %O -A %A -B %B -P %P)")
                .arg(
                    Arg::new("common_ancestor")
                        .short('O')
                        .long("common-ancestor")
                        .value_name("PATH")
                        .required(true)
                        .help("Common ancestor file"),
                )
                .arg(
                    Arg::new("current_version")
                        .short('A')
                        .long("current-version")
                        .value_name("PATH")
                        .required(true)
                        .help("Current version file; receives the result unless --output is given"),
                )
                .arg(
                    Arg::new("other_version")
                        .short('B')
                        .long("other-version")
                        .value_name("PATH")
                        .required(true)
                        .help("Other version file"),
                )
                .arg(
                    Arg::new("result")
                        .short('P')
                        .long("result")
                        .value_name("PATH")
                        .help("Repository path of the merged file, used to detect its kind"),
                )
                .arg(
                    Arg::new("kind")
                        .short('k')
                        .long("kind")
                        .value_parser(["mod", "sum"])
                        .help("File kind, overriding detection from --result"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output path (\"-\" for stdout)"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Print shell completions")
                .arg(Arg::new("shell").required(true).help("Target shell")),
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

    let man_path = man_dir.join("go-merge.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
