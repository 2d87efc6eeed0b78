mod choose_test;
mod score_test;
mod search_test;

use std::path::PathBuf;
use std::process::{Command, Output};

pub fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spectral-search"))
        .args(args)
        .output()
        .expect("Failed to execute spectral-search")
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "spectral-search-it-{}-{}",
        std::process::id(),
        name
    ))
}
