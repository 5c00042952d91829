//! Embeds the git commit and build time shown in the startup banner and in
//! `--help`.
//!
//! Both values can be pinned from the environment. `SOURCE_DATE_EPOCH` is
//! honored for reproducible builds. Missing tooling yields "unknown".

use std::env;
use std::fs;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const HASH_VAR: &str = "TIDY_BUILD_GIT_HASH";
const TIME_VAR: &str = "TIDY_BUILD_TIMESTAMP";

fn main() {
    for var in [HASH_VAR, TIME_VAR, "SOURCE_DATE_EPOCH"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    watch_git_head();

    let commit = env::var(HASH_VAR)
        .ok()
        .or_else(|| capture("git", &["rev-parse", "--short=12", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    let built_at = env::var(TIME_VAR).ok().unwrap_or_else(build_time);

    println!("cargo:rustc-env={HASH_VAR}={commit}");
    println!("cargo:rustc-env={TIME_VAR}={built_at}");
}

/// Rebuild when HEAD moves, including commits on the checked-out branch.
fn watch_git_head() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    if let Some(branch) = fs::read_to_string(".git/HEAD")
        .ok()
        .as_deref()
        .and_then(|head| head.trim().strip_prefix("ref: "))
    {
        println!("cargo:rerun-if-changed=.git/{branch}");
    }
}

fn build_time() -> String {
    if let Some(epoch) = env::var("SOURCE_DATE_EPOCH").ok() {
        if let Some(stamp) = capture("date", &["-u", "-d", &format!("@{epoch}"), "+%Y-%m-%dT%H:%M:%SZ"]) {
            return stamp;
        }
        return format!("unix:{epoch}");
    }
    capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        format!("unix:{secs}")
    })
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
