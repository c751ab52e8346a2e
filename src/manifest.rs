// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read-or-create the per-artifact manifest and merge render run summaries into it
// role: persistence/manifest
// inputs: manifest path, artifact_type, PreviewReport of the completed run
// outputs: preview report JSON and updated manifest JSON on disk
// side_effects: Writes to filesystem; one read-modify-write cycle per invocation, no locking
// invariants:
// - within variants (key: name) and preview.runs (key: artifact_id) each key appears at most once
// - a later run for an existing key replaces the entry in place, preserving its position
// - generated_at is refreshed on every merge
// errors: IO and JSON parse errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{Manifest, PreviewReport, PreviewRun, PreviewSection, Variant};
use crate::util;

/// Load the manifest at `path`, or start a fresh one when absent.
pub fn load_or_create(path: &Path, artifact_type: &str) -> Result<Manifest> {
  match util::read_json_if_exists(path)? {
    Some(value) => serde_json::from_value(value)
      .with_context(|| format!("manifest {} has an unexpected shape", path.display())),
    None => Ok(Manifest {
      artifact_type: artifact_type.to_string(),
      generated_at: util::now_iso(),
      variants: Vec::new(),
      preview: None,
    }),
  }
}

/// Merge a run summary into `preview.runs` and the `<artifact_id>-preview`
/// variant. Existing entries with the same key are replaced in place.
pub fn merge_preview_run(manifest: &mut Manifest, run: PreviewRun) {
  let variant = Variant {
    name: format!("{}-preview", run.artifact_id),
    files: vec![run.html.clone(), run.screenshot.clone(), run.report.clone()],
  };

  let preview = manifest.preview.get_or_insert_with(|| PreviewSection {
    required: true,
    runs: Vec::new(),
  });
  match preview.runs.iter_mut().find(|r| r.artifact_id == run.artifact_id) {
    Some(existing) => *existing = run,
    None => preview.runs.push(run),
  }

  match manifest.variants.iter_mut().find(|v| v.name == variant.name) {
    Some(existing) => *existing = variant,
    None => manifest.variants.push(variant),
  }
}

/// Persist the preview report, then (when a manifest path was supplied)
/// fold the run's summary into the manifest and persist that too.
pub fn write_report_and_manifest(
  report_path: &Path,
  report: &PreviewReport,
  manifest_path: Option<&Path>,
  artifact_type: &str,
) -> Result<()> {
  util::write_json(report_path, report)?;

  let Some(manifest_path) = manifest_path else {
    return Ok(());
  };

  let mut manifest = load_or_create(manifest_path, artifact_type)?;
  merge_preview_run(
    &mut manifest,
    PreviewRun {
      artifact_id: report.artifact_id.clone(),
      status: report.status,
      html: report.preview_html.clone(),
      screenshot: report.screenshot.clone(),
      report: report.preview_report.clone(),
      runtime_source: report.runtime_source,
      runtime_detail: report.runtime_detail.clone(),
    },
  );
  manifest.generated_at = util::now_iso();
  util::write_json(manifest_path, &manifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{RunStatus, RuntimeSource};

  fn run(id: &str, status: RunStatus) -> PreviewRun {
    PreviewRun {
      artifact_id: id.into(),
      status,
      html: format!("dist/previews/{}/preview.html", id),
      screenshot: format!("dist/previews/{}/screenshot.png", id),
      report: format!("dist/previews/{}/preview-report.json", id),
      runtime_source: RuntimeSource::None,
      runtime_detail: "not-required".into(),
    }
  }

  #[test]
  fn load_or_create_starts_fresh_when_absent() {
    let td = tempfile::TempDir::new().unwrap();
    let manifest = load_or_create(&td.path().join("manifest.json"), "ui").unwrap();
    assert_eq!(manifest.artifact_type, "ui");
    assert!(manifest.variants.is_empty());
    assert!(manifest.preview.is_none());
  }

  #[test]
  fn merge_appends_new_keys() {
    let td = tempfile::TempDir::new().unwrap();
    let mut manifest = load_or_create(&td.path().join("manifest.json"), "ui").unwrap();
    merge_preview_run(&mut manifest, run("alpha", RunStatus::Success));
    merge_preview_run(&mut manifest, run("beta", RunStatus::Failed));

    let preview = manifest.preview.as_ref().unwrap();
    assert!(preview.required);
    assert_eq!(preview.runs.len(), 2);
    assert_eq!(manifest.variants.len(), 2);
    assert_eq!(manifest.variants[0].name, "alpha-preview");
    assert_eq!(manifest.variants[1].name, "beta-preview");
  }

  #[test]
  fn merge_replaces_same_key_in_place() {
    let td = tempfile::TempDir::new().unwrap();
    let mut manifest = load_or_create(&td.path().join("manifest.json"), "ui").unwrap();
    merge_preview_run(&mut manifest, run("alpha", RunStatus::Failed));
    merge_preview_run(&mut manifest, run("beta", RunStatus::Success));
    merge_preview_run(&mut manifest, run("alpha", RunStatus::Success));

    let preview = manifest.preview.as_ref().unwrap();
    assert_eq!(preview.runs.len(), 2);
    // alpha keeps its original position but carries the second run's data
    assert_eq!(preview.runs[0].artifact_id, "alpha");
    assert_eq!(preview.runs[0].status, RunStatus::Success);
    assert_eq!(preview.runs[1].artifact_id, "beta");
    assert_eq!(manifest.variants.len(), 2);
    assert_eq!(manifest.variants[0].name, "alpha-preview");
  }

  #[test]
  fn merge_preserves_variant_files_of_latest_run() {
    let td = tempfile::TempDir::new().unwrap();
    let mut manifest = load_or_create(&td.path().join("manifest.json"), "ui").unwrap();
    merge_preview_run(&mut manifest, run("alpha", RunStatus::Success));
    let mut second = run("alpha", RunStatus::Success);
    second.html = "elsewhere/preview.html".into();
    merge_preview_run(&mut manifest, second);

    assert_eq!(manifest.variants[0].files[0], "elsewhere/preview.html");
  }

  #[test]
  fn round_trips_through_disk() {
    let td = tempfile::TempDir::new().unwrap();
    let path = td.path().join("manifest.json");
    let mut manifest = load_or_create(&path, "ui").unwrap();
    merge_preview_run(&mut manifest, run("alpha", RunStatus::Success));
    util::write_json(&path, &manifest).unwrap();

    let reloaded = load_or_create(&path, "ignored").unwrap();
    assert_eq!(reloaded.artifact_type, "ui");
    assert_eq!(reloaded.preview.unwrap().runs.len(), 1);
  }
}
