use std::path::Path;

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::RuntimeSource;
use crate::util;

/// Versioned CDN fallback used when network delivery is allowed.
pub const HTMX_CDN_URL: &str = "https://unpkg.com/htmx.org@1.9.12";

const VENDORED_RUNTIME_NAME: &str = "htmx.min.js";

static RE_HTMX_USAGE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)(?:\shx-[a-z-]+=)|(?:\bhtmx\b)").unwrap());
static RE_HTMX_SCRIPT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"(?i)<script[^>]+src=["'][^"']*htmx[^"']*["'][^>]*>"#).unwrap());

/// Where the caller wants the htmx runtime to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HtmxMode {
  /// Prefer a vendored local copy; rendering stays reproducible offline.
  Local,
  /// Always reference the CDN.
  Network,
}

/// Does the document use htmx (hx-* attributes or a bare htmx identifier)?
pub fn detects_htmx(html: &str) -> bool {
  RE_HTMX_USAGE.is_match(html)
}

/// Does the document already load an htmx script?
pub fn has_htmx_script_tag(html: &str) -> bool {
  RE_HTMX_SCRIPT.is_match(html)
}

pub struct InjectionRequest<'a> {
  pub html: &'a str,
  pub output_dir: &'a Path,
  pub htmx_mode: HtmxMode,
  pub local_runtime_path: &'a Path,
  pub network_enabled: bool,
}

#[derive(Debug)]
pub struct InjectionOutcome {
  pub html: String,
  pub runtime_source: RuntimeSource,
  pub runtime_detail: String,
  pub htmx_required: bool,
}

fn insert_script_tag(html: &str, src: &str) -> String {
  html.replacen(
    "</body>",
    &format!("  <script src=\"{}\"></script>\n</body>", src),
    1,
  )
}

/// Decide whether the htmx runtime must be added to `html` before rendering,
/// and from where. Vendors a local copy under `<output_dir>/vendor` when the
/// mode allows it and a local runtime exists; otherwise falls back to the CDN
/// when network delivery is permitted; otherwise errors.
pub fn inject_htmx_runtime(req: &InjectionRequest) -> Result<InjectionOutcome> {
  let htmx_required = detects_htmx(req.html);

  if !htmx_required || has_htmx_script_tag(req.html) {
    let runtime_detail = if htmx_required {
      "script-already-present"
    } else {
      "not-required"
    };
    return Ok(InjectionOutcome {
      html: req.html.to_string(),
      runtime_source: RuntimeSource::None,
      runtime_detail: runtime_detail.to_string(),
      htmx_required,
    });
  }

  if req.htmx_mode != HtmxMode::Network && req.local_runtime_path.exists() {
    let vendor_dir = req.output_dir.join("vendor");
    util::ensure_dir(&vendor_dir)?;
    let copied = vendor_dir.join(VENDORED_RUNTIME_NAME);
    std::fs::copy(req.local_runtime_path, &copied).with_context(|| {
      format!(
        "copying {} to {}",
        req.local_runtime_path.display(),
        copied.display()
      )
    })?;
    return Ok(InjectionOutcome {
      html: insert_script_tag(req.html, &format!("./vendor/{}", VENDORED_RUNTIME_NAME)),
      runtime_source: RuntimeSource::Local,
      runtime_detail: util::rel_path(req.local_runtime_path),
      htmx_required,
    });
  }

  if req.network_enabled || req.htmx_mode == HtmxMode::Network {
    return Ok(InjectionOutcome {
      html: insert_script_tag(req.html, HTMX_CDN_URL),
      runtime_source: RuntimeSource::Network,
      runtime_detail: HTMX_CDN_URL.to_string(),
      htmx_required,
    });
  }

  bail!("HTMX runtime required but local runtime was not found and network mode is disabled")
}
