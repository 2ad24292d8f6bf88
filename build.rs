use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=OPUS_BUILD_VERSION");

    println!("cargo:rustc-env=OPUS_VERSION={}", version());
}

/// Version reported by `opus --version`.
///
/// `OPUS_BUILD_VERSION` wins when set. Otherwise the git description is used,
/// stamped with the build time when the tree is dirty. Source trees without
/// git fall back to the package version.
fn version() -> String {
    if let Ok(pinned) = env::var("OPUS_BUILD_VERSION")
        && !pinned.trim().is_empty()
    {
        return pinned.trim().to_string();
    }

    match git_describe() {
        Some(described) if described.ends_with("-dirty") => {
            format!("{}-{}", described, timestamp())
        }
        Some(described) => described,
        None => format!(
            "{}-unknown-{}",
            env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string()),
            timestamp()
        ),
    }
}

/// `git describe` output without the tag's `v` prefix.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let described = described.strip_prefix('v').unwrap_or(described);
    (!described.is_empty()).then(|| described.to_string())
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
