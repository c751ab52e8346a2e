// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON records (compile report, preview report, manifest) shared by both binaries
// role: model/types
// outputs: Serializable structs with stable snake_case field names
// invariants: field names match the persisted artifact schemas; status/runtime_source serialize lowercase
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

/// Outcome of a compile or render run as persisted in its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
  Success,
  Failed,
  Skipped,
}

/// Where the htmx runtime script injected into a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSource {
  None,
  Local,
  Network,
}

/// One JSON object per bundling run. Created fresh per invocation and
/// immutable once written.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompileReport {
  pub status: RunStatus,
  pub artifact_id: String,
  pub entry: String,
  pub output_js: String,
  pub output_html: String,
  pub compiled_at: String,
  /// Which bundling strategy succeeded (`esbuild` or `npx-esbuild`), or null.
  pub compiler: Option<String>,
  /// Combined primary + fallback error text when both strategies failed.
  pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleMessage {
  pub level: String,
  pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFailure {
  pub url: String,
  pub failure: String,
}

/// Diagnostic streams accumulated while the page is open, in arrival order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Diagnostics {
  pub console: Vec<ConsoleMessage>,
  pub page_errors: Vec<String>,
  pub request_failures: Vec<RequestFailure>,
}

/// One JSON object per render run.
#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewReport {
  pub artifact_id: String,
  pub artifact_type: String,
  pub status: RunStatus,
  pub generated_at: String,
  pub source_html: String,
  pub preview_html: String,
  pub screenshot: String,
  pub preview_report: String,
  pub runtime_source: RuntimeSource,
  pub runtime_detail: String,
  #[serde(default)]
  pub htmx_required: bool,
  pub diagnostics: Diagnostics,
  pub error: Option<String>,
}

/// Summary of a render run as merged into the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRun {
  pub artifact_id: String,
  pub status: RunStatus,
  pub html: String,
  pub screenshot: String,
  pub report: String,
  pub runtime_source: RuntimeSource,
  pub runtime_detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewSection {
  pub required: bool,
  #[serde(default)]
  pub runs: Vec<PreviewRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
  pub name: String,
  pub files: Vec<String>,
}

/// One JSON object per artifact family, persisted across render invocations.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
  pub artifact_type: String,
  pub generated_at: String,
  #[serde(default)]
  pub variants: Vec<Variant>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub preview: Option<PreviewSection>,
}
