use anyhow::{Context, Result};
use clap::Parser;

use preview_kit::browser;
use preview_kit::cli::{RenderCli, RenderConfig, normalize_render};
use preview_kit::manifest;
use preview_kit::model::{Diagnostics, PreviewReport, RunStatus, RuntimeSource};
use preview_kit::runtime;
use preview_kit::util;

fn main() {
  let cli = RenderCli::parse();

  if cli.gen_man {
    match util::render_man_page::<RenderCli>() {
      Ok(page) => {
        print!("{}", page);
        return;
      }
      Err(err) => {
        eprintln!("❌ render-preview failed: {:#}", err);
        std::process::exit(2);
      }
    }
  }

  match run(cli) {
    Ok(code) => std::process::exit(code),
    Err(err) => {
      eprintln!("❌ render-preview failed: {:#}", err);
      std::process::exit(2);
    }
  }
}

fn run(cli: RenderCli) -> Result<i32> {
  // Phase 1: normalize CLI (missing --input fails before any directory is touched)
  let cfg = normalize_render(cli)?;
  util::ensure_dir(&cfg.output_dir)?;

  let mut report = base_report(&cfg);

  // Phase 2: prepare the HTML artifact (injection + write). Failure here is
  // fatal regardless of soft-fail: nothing was produced to preview.
  if let Err(err) = prepare_html(&cfg, &mut report) {
    report.error = Some(format!("{:#}", err));
    manifest::write_report_and_manifest(
      &cfg.report,
      &report,
      cfg.manifest.as_deref(),
      &cfg.artifact_type,
    )?;
    eprintln!("❌ Failed preparing preview HTML: {:#}", err);
    return Ok(2);
  }

  // Phase 3: renderer availability
  if !browser::is_available() {
    report.status = RunStatus::Skipped;
    report.error = Some(browser::UNAVAILABLE_MESSAGE.to_string());
    manifest::write_report_and_manifest(
      &cfg.report,
      &report,
      cfg.manifest.as_deref(),
      &cfg.artifact_type,
    )?;

    if cfg.soft_fail {
      eprintln!("⚠️ {}", browser::UNAVAILABLE_MESSAGE);
      return Ok(0);
    }
    return Ok(2);
  }

  // Phase 4: render and capture
  let request = browser::RenderRequest {
    html_path: &cfg.preview_html,
    screenshot_path: &cfg.screenshot,
    timeout_ms: cfg.timeout_ms,
    width: cfg.width,
    height: cfg.height,
    full_page: cfg.full_page,
  };
  match browser::render(&request, &mut report.diagnostics) {
    Ok(()) => report.status = RunStatus::Success,
    Err(err) => {
      report.status = RunStatus::Failed;
      report.error = Some(format!("{:#}", err));
      if cfg.soft_fail {
        eprintln!("⚠️ Preview render failed: {:#}", err);
      } else {
        eprintln!("❌ Preview render failed: {:#}", err);
      }
    }
  }

  // Phase 5: persist report and manifest, then settle the exit code
  manifest::write_report_and_manifest(
    &cfg.report,
    &report,
    cfg.manifest.as_deref(),
    &cfg.artifact_type,
  )?;

  if report.status == RunStatus::Failed && !cfg.soft_fail {
    return Ok(2);
  }

  if report.status == RunStatus::Success {
    println!("✅ Browser preview rendering complete");
  } else {
    println!("ℹ️ Browser preview completed with non-success status");
  }
  Ok(0)
}

fn base_report(cfg: &RenderConfig) -> PreviewReport {
  PreviewReport {
    artifact_id: cfg.artifact_id.clone(),
    artifact_type: cfg.artifact_type.clone(),
    status: RunStatus::Failed,
    generated_at: util::now_iso(),
    source_html: util::rel_path(&cfg.input),
    preview_html: util::rel_path(&cfg.preview_html),
    screenshot: util::rel_path(&cfg.screenshot),
    preview_report: util::rel_path(&cfg.report),
    runtime_source: RuntimeSource::None,
    runtime_detail: "none".to_string(),
    htmx_required: false,
    diagnostics: Diagnostics::default(),
    error: None,
  }
}

fn prepare_html(cfg: &RenderConfig, report: &mut PreviewReport) -> Result<()> {
  let html = std::fs::read_to_string(&cfg.input)
    .with_context(|| format!("reading {}", cfg.input.display()))?;

  let outcome = runtime::inject_htmx_runtime(&runtime::InjectionRequest {
    html: &html,
    output_dir: &cfg.output_dir,
    htmx_mode: cfg.htmx_mode,
    local_runtime_path: &cfg.htmx_local_path,
    network_enabled: cfg.network_enabled,
  })?;

  report.runtime_source = outcome.runtime_source;
  report.runtime_detail = outcome.runtime_detail;
  report.htmx_required = outcome.htmx_required;

  std::fs::write(&cfg.preview_html, outcome.html)
    .with_context(|| format!("writing {}", cfg.preview_html.display()))?;
  Ok(())
}
