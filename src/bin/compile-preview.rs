use anyhow::{Context, Result};
use clap::Parser;

use preview_kit::bundle;
use preview_kit::cli::{CompileCli, CompileConfig, normalize_compile};
use preview_kit::model::{CompileReport, RunStatus};
use preview_kit::util;

fn main() {
  let cli = CompileCli::parse();

  if cli.gen_man {
    match util::render_man_page::<CompileCli>() {
      Ok(page) => {
        print!("{}", page);
        return;
      }
      Err(err) => {
        eprintln!("❌ compile-preview failed: {:#}", err);
        std::process::exit(2);
      }
    }
  }

  match run(cli) {
    Ok(code) => std::process::exit(code),
    Err(err) => {
      eprintln!("❌ compile-preview failed: {:#}", err);
      std::process::exit(2);
    }
  }
}

fn run(cli: CompileCli) -> Result<i32> {
  // Phase 1: normalize CLI (missing --entry fails before any directory is touched)
  let cfg = normalize_compile(cli)?;

  // Phase 2: prepare the output directory and a failed-by-default report
  util::ensure_dir(&cfg.output_dir)?;
  let mut report = base_report(&cfg);

  // Phase 3: bundle (direct esbuild, then npx fallback)
  match bundle::bundle_entry(&cfg.entry, &cfg.output_js) {
    Ok(compiler) => report.compiler = Some(compiler.to_string()),
    Err(message) => {
      report.error = Some(message);
      util::write_json(&cfg.report_file, &report)?;
      eprintln!("❌ Failed to compile TSX preview");
      eprintln!("{}", report.error.as_deref().unwrap_or_default());
      return Ok(2);
    }
  }

  // Phase 4: HTML shell + success report
  let script_name = cfg
    .output_js
    .file_name()
    .context("output file has no basename")?
    .to_string_lossy();
  std::fs::write(&cfg.output_html, bundle::html_shell(&script_name))
    .with_context(|| format!("writing {}", cfg.output_html.display()))?;

  report.status = RunStatus::Success;
  util::write_json(&cfg.report_file, &report)?;

  println!("✅ TSX preview compilation complete");
  println!("- JS: {}", report.output_js);
  println!("- HTML: {}", report.output_html);
  println!("- Report: {}", util::rel_path(&cfg.report_file));
  Ok(0)
}

fn base_report(cfg: &CompileConfig) -> CompileReport {
  CompileReport {
    status: RunStatus::Failed,
    artifact_id: cfg.artifact_id.clone(),
    entry: util::rel_path(&cfg.entry),
    output_js: util::rel_path(&cfg.output_js),
    output_html: util::rel_path(&cfg.output_html),
    compiled_at: util::now_iso(),
    compiler: None,
    error: None,
  }
}
