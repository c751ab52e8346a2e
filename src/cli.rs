use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Parser;
use clap::builder::BoolishValueParser;

use crate::runtime::HtmxMode;
use crate::util;

fn default_output_dir(artifact_id: &str) -> PathBuf {
  Path::new("dist").join("previews").join(artifact_id)
}

#[derive(Parser, Debug)]
#[command(
    name = "compile-preview",
    version,
    about = "Bundle a UI entry file into a browser-loadable preview",
    long_about = None
)]
pub struct CompileCli {
  /// Entry file to bundle (TSX/JSX/JS)
  #[arg(long, visible_alias = "input")]
  pub entry: Option<PathBuf>,

  /// Identifier for the produced artifact
  #[arg(long, default_value = "react-preview")]
  pub artifact_id: String,

  /// Output directory (default: dist/previews/<artifact-id>)
  #[arg(long)]
  pub outdir: Option<PathBuf>,

  /// Bundled script name within the output directory
  #[arg(long, default_value = "preview.js")]
  pub outfile: String,

  /// HTML shell name within the output directory
  #[arg(long, default_value = "preview.html")]
  pub html_file: String,

  /// Compile report name within the output directory
  #[arg(long, default_value = "compile-report.json")]
  pub report_file: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug)]
pub struct CompileConfig {
  pub entry: PathBuf,
  pub artifact_id: String,
  pub output_dir: PathBuf,
  pub output_js: PathBuf,
  pub output_html: PathBuf,
  pub report_file: PathBuf,
}

pub fn normalize_compile(cli: CompileCli) -> Result<CompileConfig> {
  let Some(entry) = cli.entry else {
    bail!("Missing required argument: --entry <path>")
  };

  let output_dir = match cli.outdir {
    Some(dir) => util::resolve_path(dir),
    None => util::resolve_path(default_output_dir(&cli.artifact_id)),
  };

  Ok(CompileConfig {
    entry: util::resolve_path(entry),
    artifact_id: cli.artifact_id,
    output_js: output_dir.join(&cli.outfile),
    output_html: output_dir.join(&cli.html_file),
    report_file: output_dir.join(&cli.report_file),
    output_dir,
  })
}

#[derive(Parser, Debug)]
#[command(
    name = "render-preview",
    version,
    about = "Render an HTML preview in headless Chromium and capture a screenshot",
    long_about = None
)]
pub struct RenderCli {
  /// HTML artifact to render
  #[arg(long, visible_alias = "html")]
  pub input: Option<PathBuf>,

  /// Identifier for this preview run
  #[arg(long, default_value = "preview")]
  pub artifact_id: String,

  /// Artifact family recorded in report and manifest
  #[arg(long, default_value = "ui")]
  pub artifact_type: String,

  /// Output directory (default: dist/previews/<artifact-id>)
  #[arg(long)]
  pub output_dir: Option<PathBuf>,

  /// Screenshot name within the output directory
  #[arg(long, default_value = "screenshot.png")]
  pub screenshot_name: String,

  /// Preview report name within the output directory
  #[arg(long, default_value = "preview-report.json")]
  pub report_name: String,

  /// Prepared HTML name within the output directory
  #[arg(long, default_value = "preview.html")]
  pub preview_name: String,

  /// Navigation timeout in milliseconds
  #[arg(long, default_value_t = 20000)]
  pub timeout_ms: u64,

  /// Viewport width in pixels
  #[arg(long, default_value_t = 1280)]
  pub width: u32,

  /// Viewport height in pixels
  #[arg(long, default_value_t = 720)]
  pub height: u32,

  /// Capture the full scrollable page rather than just the viewport
  #[arg(
    long,
    default_value_t = true,
    num_args = 0..=1,
    default_missing_value = "true",
    action = clap::ArgAction::Set,
    value_parser = BoolishValueParser::new()
  )]
  pub full_page: bool,

  /// Exit 0 on render failures and skipped runs (report still records them)
  #[arg(
    long,
    default_value_t = true,
    num_args = 0..=1,
    default_missing_value = "true",
    action = clap::ArgAction::Set,
    value_parser = BoolishValueParser::new()
  )]
  pub soft_fail: bool,

  /// Allow the htmx runtime to be delivered from the CDN
  #[arg(
    long,
    default_value_t = false,
    num_args = 0..=1,
    default_missing_value = "true",
    action = clap::ArgAction::Set,
    value_parser = BoolishValueParser::new()
  )]
  pub network_enabled: bool,

  /// Where the htmx runtime comes from when injection is needed
  #[arg(long, value_enum, default_value_t = HtmxMode::Local)]
  pub htmx_mode: HtmxMode,

  /// Local htmx runtime copy to vendor into the output directory
  #[arg(long, default_value = "assets/vendor/htmx.min.js")]
  pub htmx_local_path: PathBuf,

  /// Manifest file to merge this run into
  #[arg(long)]
  pub manifest: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug)]
pub struct RenderConfig {
  pub input: PathBuf,
  pub artifact_id: String,
  pub artifact_type: String,
  pub output_dir: PathBuf,
  pub preview_html: PathBuf,
  pub screenshot: PathBuf,
  pub report: PathBuf,
  pub timeout_ms: u64,
  pub width: u32,
  pub height: u32,
  pub full_page: bool,
  pub soft_fail: bool,
  pub network_enabled: bool,
  pub htmx_mode: HtmxMode,
  pub htmx_local_path: PathBuf,
  pub manifest: Option<PathBuf>,
}

pub fn normalize_render(cli: RenderCli) -> Result<RenderConfig> {
  let Some(input) = cli.input else {
    bail!("Missing required argument: --input <preview-html>")
  };

  let output_dir = match cli.output_dir {
    Some(dir) => util::resolve_path(dir),
    None => util::resolve_path(default_output_dir(&cli.artifact_id)),
  };

  Ok(RenderConfig {
    input: util::resolve_path(input),
    artifact_id: cli.artifact_id,
    artifact_type: cli.artifact_type,
    preview_html: output_dir.join(&cli.preview_name),
    screenshot: output_dir.join(&cli.screenshot_name),
    report: output_dir.join(&cli.report_name),
    timeout_ms: cli.timeout_ms,
    width: cli.width,
    height: cli.height,
    full_page: cli.full_page,
    soft_fail: cli.soft_fail,
    network_enabled: cli.network_enabled,
    htmx_mode: cli.htmx_mode,
    htmx_local_path: util::resolve_path(cli.htmx_local_path),
    manifest: cli.manifest.map(util::resolve_path),
    output_dir,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compile_defaults_derive_from_artifact_id() {
    let cli = CompileCli::parse_from(["compile-preview", "--entry", "demo.tsx"]);
    let cfg = normalize_compile(cli).unwrap();
    assert_eq!(cfg.artifact_id, "react-preview");
    assert!(cfg.output_dir.ends_with("dist/previews/react-preview"));
    assert!(cfg.output_js.ends_with("preview.js"));
    assert!(cfg.output_html.ends_with("preview.html"));
    assert!(cfg.report_file.ends_with("compile-report.json"));
  }

  #[test]
  fn compile_accepts_input_alias() {
    let cli = CompileCli::parse_from(["compile-preview", "--input", "demo.tsx"]);
    let cfg = normalize_compile(cli).unwrap();
    assert!(cfg.entry.ends_with("demo.tsx"));
  }

  #[test]
  fn compile_missing_entry_is_a_precondition_error() {
    let cli = CompileCli::parse_from(["compile-preview"]);
    let err = normalize_compile(cli).unwrap_err();
    assert!(format!("{:#}", err).contains("--entry"));
  }

  #[test]
  fn compile_outdir_override_wins() {
    let cli =
      CompileCli::parse_from(["compile-preview", "--entry", "demo.tsx", "--outdir", "/tmp/out"]);
    let cfg = normalize_compile(cli).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.output_js, PathBuf::from("/tmp/out/preview.js"));
  }

  #[test]
  fn render_defaults_match_documented_values() {
    let cli = RenderCli::parse_from(["render-preview", "--input", "ok.html"]);
    let cfg = normalize_render(cli).unwrap();
    assert_eq!(cfg.artifact_id, "preview");
    assert_eq!(cfg.artifact_type, "ui");
    assert_eq!(cfg.timeout_ms, 20000);
    assert_eq!(cfg.width, 1280);
    assert_eq!(cfg.height, 720);
    assert!(cfg.full_page);
    assert!(cfg.soft_fail);
    assert!(!cfg.network_enabled);
    assert_eq!(cfg.htmx_mode, HtmxMode::Local);
    assert!(cfg.htmx_local_path.ends_with("assets/vendor/htmx.min.js"));
    assert!(cfg.manifest.is_none());
  }

  #[test]
  fn render_accepts_html_alias() {
    let cli = RenderCli::parse_from(["render-preview", "--html", "ok.html"]);
    let cfg = normalize_render(cli).unwrap();
    assert!(cfg.input.ends_with("ok.html"));
  }

  #[test]
  fn render_missing_input_is_a_precondition_error() {
    let cli = RenderCli::parse_from(["render-preview"]);
    let err = normalize_render(cli).unwrap_err();
    assert!(format!("{:#}", err).contains("--input"));
  }

  #[test]
  fn boolish_flags_accept_values_and_bare_form() {
    let cli = RenderCli::parse_from([
      "render-preview",
      "--input",
      "ok.html",
      "--soft-fail",
      "false",
      "--full-page",
      "0",
      "--network-enabled",
    ]);
    let cfg = normalize_render(cli).unwrap();
    assert!(!cfg.soft_fail);
    assert!(!cfg.full_page);
    assert!(cfg.network_enabled);
  }

  #[test]
  fn htmx_mode_parses_network() {
    let cli =
      RenderCli::parse_from(["render-preview", "--input", "ok.html", "--htmx-mode", "network"]);
    let cfg = normalize_render(cli).unwrap();
    assert_eq!(cfg.htmx_mode, HtmxMode::Network);
  }
}
