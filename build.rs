use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

// Release tarballs (as built by makepkg) carry no .git directory; packagers
// pass the version explicitly instead.
const VERSION_OVERRIDE: &str = "AURBUMP_BUILD_VERSION";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed={}", VERSION_OVERRIDE);
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let version = env::var(VERSION_OVERRIDE)
        .ok()
        .map(|v| normalize(&v))
        .filter(|v| !v.is_empty())
        .or_else(git_version)
        .unwrap_or_else(|| format!("0.0.0-unknown-{}", build_time()));

    println!("cargo:rustc-env=AURBUMP_VERSION={}", version);
}

fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let version = normalize(&String::from_utf8_lossy(&output.stdout));
    match version.as_str() {
        "" => None,
        v if v.ends_with("-dirty") => Some(format!("{}-{}", v, build_time())),
        _ => Some(version),
    }
}

/// "v1.0.0" and "release/1.0.0" -> "1.0.0"
fn normalize(tag: &str) -> String {
    let tag = tag.trim();
    let tag = tag.strip_prefix("release/").unwrap_or(tag);
    tag.strip_prefix('v').unwrap_or(tag).to_string()
}

/// SOURCE_DATE_EPOCH when set, else the current time.
fn build_time() -> u64 {
    env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
}
