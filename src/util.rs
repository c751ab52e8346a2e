// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for path resolution, JSON file I/O, file URLs, timestamps, subprocesses, and man page rendering
// role: utilities/helpers
// inputs: Paths relative to the working directory; serde_json values; clap CommandFactory
// outputs: Resolved/relative paths, JSON files with trailing newline, file:// URLs, RFC3339 timestamps, man page text
// side_effects: ensure_dir creates directories; write_json writes files; run_command spawns subprocesses
// invariants:
// - resolve_path never canonicalizes (targets may not exist yet)
// - rel_path always uses forward slashes
// - write_json output ends with a newline
// errors: run_command surfaces stderr (or stdout) of the failed command; IO errors bubble with path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use clap::CommandFactory;

/// Resolve a possibly-relative path against the current working directory.
///
/// Unlike `fs::canonicalize` this never touches the filesystem: output
/// locations usually do not exist yet when they are resolved.
pub fn resolve_path<P: AsRef<Path>>(p: P) -> PathBuf {
  let p = p.as_ref();
  if p.is_absolute() {
    return p.to_path_buf();
  }
  match std::env::current_dir() {
    Ok(cwd) => cwd.join(p),
    Err(_) => p.to_path_buf(),
  }
}

/// Path relative to the working directory, with `/` separators.
/// Falls back to the lossy absolute string for paths outside the cwd.
pub fn rel_path<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let cwd = match std::env::current_dir() {
    Ok(cwd) => cwd,
    Err(_) => return p.to_string_lossy().to_string(),
  };
  match p.strip_prefix(&cwd) {
    Ok(rel) => rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy().to_string())
      .collect::<Vec<_>>()
      .join("/"),
    Err(_) => p.to_string_lossy().to_string(),
  }
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
  std::fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))
}

/// Read and parse a JSON file; `None` when the file does not exist.
/// Any other IO error, and any parse error, propagates.
pub fn read_json_if_exists(path: &Path) -> Result<Option<serde_json::Value>> {
  match std::fs::read(path) {
    Ok(buf) => {
      let value = serde_json::from_slice(&buf)
        .with_context(|| format!("parsing JSON from {}", path.display()))?;
      Ok(Some(value))
    }
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
    Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
  }
}

/// Pretty-print `value` to `path`, creating parent directories as needed.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
  if let Some(parent) = path.parent() {
    ensure_dir(parent)?;
  }
  let mut buf = serde_json::to_vec_pretty(value)?;
  buf.push(b'\n');
  std::fs::write(path, buf).with_context(|| format!("writing {}", path.display()))
}

/// `file://` URL for an absolute path.
pub fn file_url(path: &Path) -> Result<String> {
  let url = url::Url::from_file_path(path)
    .map_err(|_| anyhow::anyhow!("cannot build a file URL for {}", path.display()))?;
  Ok(url.to_string())
}

/// RFC3339 UTC timestamp with millisecond precision (`2025-08-15T12:00:00.000Z`).
pub fn now_iso() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug)]
pub struct CommandOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Run a command and capture its output. A non-zero exit becomes an error
/// carrying the command's stderr (falling back to stdout, then a generic
/// message) so build-tool failures stay diagnosable from the report.
pub fn run_command(program: &str, args: &[String]) -> Result<CommandOutput> {
  let out = Command::new(program)
    .args(args)
    .output()
    .with_context(|| format!("spawning {} {:?}", program, args))?;

  let stdout = String::from_utf8_lossy(&out.stdout).to_string();
  let stderr = String::from_utf8_lossy(&out.stderr).to_string();

  if out.status.success() {
    Ok(CommandOutput { stdout, stderr })
  } else if !stderr.trim().is_empty() {
    anyhow::bail!("{}", stderr.trim())
  } else if !stdout.trim().is_empty() {
    anyhow::bail!("{}", stdout.trim())
  } else {
    anyhow::bail!("Command failed: {}", program)
  }
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
