// SPDX-License-Identifier: MIT OR Apache-2.0
// Build script for generating shell completions and man pages.

use clap::CommandFactory;
use clap_complete::{generate_to, Shell};
use clap_mangen::Man;
use std::{
    env, fs,
    io::{Error, ErrorKind},
    path::PathBuf,
};

// The CLI definition is shared with the binary so the generated files always
// match the flags it accepts.
#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Error> {
    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| Error::new(ErrorKind::NotFound, "OUT_DIR is not set"))?;
    let completions_dir = out_dir.join("completions");
    let man_dir = out_dir.join("man");

    fs::create_dir_all(&completions_dir)?;
    fs::create_dir_all(&man_dir)?;

    let mut cmd = cli::Cli::command();

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell] {
        generate_to(shell, &mut cmd, "apl", &completions_dir)?;
    }

    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("apl.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    Ok(())
}
