use std::path::Path;

use anyhow::Result;

use crate::util;

/// Separator between the primary and fallback error messages in a failed
/// compile report.
pub const FALLBACK_SEPARATOR: &str = "\n--- fallback ---\n";

fn esbuild_args(entry: &Path, outfile: &Path) -> Vec<String> {
  vec![
    entry.to_string_lossy().to_string(),
    "--bundle".to_string(),
    "--format=esm".to_string(),
    "--platform=browser".to_string(),
    format!("--outfile={}", outfile.display()),
  ]
}

fn build_with_esbuild(entry: &Path, outfile: &Path) -> Result<()> {
  util::run_command("esbuild", &esbuild_args(entry, outfile))?;
  Ok(())
}

fn build_with_npx(entry: &Path, outfile: &Path) -> Result<()> {
  let mut args = vec!["-y".to_string(), "esbuild".to_string()];
  args.extend(esbuild_args(entry, outfile));
  util::run_command("npx", &args)?;
  Ok(())
}

pub fn join_errors(primary: &anyhow::Error, fallback: &anyhow::Error) -> String {
  format!("{:#}{}{:#}", primary, FALLBACK_SEPARATOR, fallback)
}

/// Bundle `entry` into a single browser-loadable ES module at `outfile`.
///
/// Tries the esbuild binary on PATH first, then `npx -y esbuild` with the
/// same flags. Returns the tag of the strategy that succeeded; when both
/// fail, the combined error text (primary, separator, fallback).
pub fn bundle_entry(entry: &Path, outfile: &Path) -> std::result::Result<&'static str, String> {
  match build_with_esbuild(entry, outfile) {
    Ok(()) => Ok("esbuild"),
    Err(primary) => match build_with_npx(entry, outfile) {
      Ok(()) => Ok("npx-esbuild"),
      Err(fallback) => Err(join_errors(&primary, &fallback)),
    },
  }
}

/// Minimal HTML shell loading the bundled script via a module script tag.
pub fn html_shell(script_basename: &str) -> String {
  format!(
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>React Preview</title>
</head>
<body>
  <div id="root"></div>
  <script type="module" src="./{}"></script>
</body>
</html>
"#,
    script_basename
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn html_shell_references_script_basename() {
    let html = html_shell("preview.js");
    assert!(html.contains("<script type=\"module\" src=\"./preview.js\"></script>"));
    assert!(html.contains("<div id=\"root\"></div>"));
    assert!(html.starts_with("<!doctype html>"));
  }

  #[test]
  fn join_errors_keeps_both_messages_around_separator() {
    let primary = anyhow::anyhow!("primary boom");
    let fallback = anyhow::anyhow!("fallback boom");
    let joined = join_errors(&primary, &fallback);
    assert!(joined.starts_with("primary boom"));
    assert!(joined.ends_with("fallback boom"));
    assert!(joined.contains(FALLBACK_SEPARATOR));
  }

  #[test]
  fn esbuild_args_match_the_documented_flags() {
    let args = esbuild_args(Path::new("entry.tsx"), Path::new("out/preview.js"));
    assert_eq!(
      args,
      vec![
        "entry.tsx",
        "--bundle",
        "--format=esm",
        "--platform=browser",
        "--outfile=out/preview.js",
      ]
    );
  }
}
