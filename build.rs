use chrono::Utc;
use std::path::PathBuf;
use std::process::Command;

/// Output of a git command, if git is available and the command succeeds
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").unwrap_or_default());

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let mut git_hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());
    if git(&["status", "--porcelain", "--untracked-files=no"]).is_some_and(|s| !s.is_empty()) {
        git_hash.push_str("-dirty");
    }

    std::fs::write(
        out_dir.join("version.rs"),
        format!(
            "pub const BUILD_TIME: &str = \"{build_time}\";\npub const GIT_HASH: &str = \"{git_hash}\";\n"
        ),
    )?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    Ok(())
}
