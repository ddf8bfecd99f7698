//! Shell-based child processes with known stderr behaviour.
//!
//! All fixtures go through `sh`, so they are Unix-only.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use exex::Command;

/// Script that writes `error:` followed by each argument (space separated)
/// to stderr and exits 1.
pub const ERROR_ECHO_SCRIPT: &str = r#"printf 'error:' >&2
for arg in "$@"; do
    printf ' %s' "$arg" >&2
done
exit 1
"#;

/// `sh -c` with `script`, passing `args` as `$1..`.
pub fn sh<I, S>(script: &str, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script).arg("sh");
    cmd.args(args.into_iter().map(|a| a.as_ref().to_string()));
    cmd
}

/// A command that writes exactly `message` to stderr and exits with `code`.
pub fn failing(message: &str, code: i32) -> Command {
    sh(
        r#"printf '%s' "$1" >&2; exit "$2""#,
        [message.to_string(), code.to_string()],
    )
}

/// Same as [`failing`], as a plain `std::process::Command`.
pub fn std_failing(message: &str, code: i32) -> std::process::Command {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c")
        .arg(r#"printf '%s' "$1" >&2; exit "$2""#)
        .arg("sh")
        .arg(message)
        .arg(code.to_string());
    cmd
}

/// Write `contents` to `dir/name` as an executable `sh` script.
pub fn write_script(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{contents}"))
        .with_context(|| format!("writing script {}", path.display()))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("marking {} executable", path.display()))?;
    Ok(path)
}
