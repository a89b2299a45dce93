// SPDX-License-Identifier: PMPL-1.0-or-later
//! Build script for the harvest CLI.
//!
//! Captures build-time information (git commit, build date, target triple)
//! for `harvest version`.

use std::env;
use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    // Re-run if .git/HEAD changes (e.g., new commit)
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if let Some(commit) = command_output("git", &["rev-parse", "--short", "HEAD"]) {
        println!("cargo:rustc-env=GIT_COMMIT={}", commit);
    }

    if let Some(date) = command_output("date", &["+%Y-%m-%d"]) {
        println!("cargo:rustc-env=BUILD_DATE={}", date);
    }

    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=TARGET={}", target);
    }
}
