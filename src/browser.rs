// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive headless Chromium through a Node/Playwright bridge subprocess and stream its diagnostics
// role: integration/browser-bridge
// inputs: prepared HTML path, screenshot path, viewport, navigation timeout
// outputs: screenshot written by the bridge; diagnostics accumulated in arrival order; Ok/Err render outcome
// side_effects: spawns `node` with the embedded driver script on stdin; kills it when the outer guard fires
// invariants:
// - the child process is always reaped, success or failure
// - diagnostics received before a timeout are preserved
// - the outer guard fires 1000ms after the navigation timeout; its error reports the navigation timeout
// errors: unavailable bridge is the caller's skipped path; driver crashes surface the bridge stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::model::{ConsoleMessage, Diagnostics, RequestFailure};
use crate::util;

/// Error recorded in a skipped report when the bridge cannot run.
pub const UNAVAILABLE_MESSAGE: &str =
  "Playwright is unavailable. Install dependencies (npm install) or use browser_renderer tool.";

// Belt-and-suspenders guard: only matters if Playwright's own navigation
// timeout fails to fire.
const GUARD_EXTRA_MS: u64 = 1000;

const DRIVER_SOURCE: &str = include_str!("render_driver.mjs");

/// True when `node` can resolve the playwright package from the working
/// directory.
pub fn is_available() -> bool {
  Command::new("node")
    .args(["-e", "require.resolve('playwright')"])
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .status()
    .map(|status| status.success())
    .unwrap_or(false)
}

pub struct RenderRequest<'a> {
  pub html_path: &'a Path,
  pub screenshot_path: &'a Path,
  pub timeout_ms: u64,
  pub width: u32,
  pub height: u32,
  pub full_page: bool,
}

#[derive(Debug, Serialize)]
struct DriverConfig<'a> {
  url: &'a str,
  screenshot: &'a str,
  timeout_ms: u64,
  width: u32,
  height: u32,
  full_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum DriverEvent {
  Console { level: String, text: String },
  PageError { message: String },
  RequestFailed { url: String, failure: String },
  Result {
    status: String,
    #[serde(default)]
    error: Option<String>,
  },
}

enum BridgeExit {
  Result(std::result::Result<(), String>),
  Eof,
  Deadline,
}

/// Open the prepared HTML in headless Chromium, capture the screenshot, and
/// accumulate console/page-error/request-failure diagnostics while the page
/// is open. Blocks until the bridge settles or the outer guard fires.
pub fn render(req: &RenderRequest, diagnostics: &mut Diagnostics) -> Result<()> {
  let url = util::file_url(req.html_path)?;
  let screenshot = req.screenshot_path.to_string_lossy();
  let config = serde_json::to_string(&DriverConfig {
    url: &url,
    screenshot: &screenshot,
    timeout_ms: req.timeout_ms,
    width: req.width,
    height: req.height,
    full_page: req.full_page,
  })?;

  let mut child = Command::new("node")
    .args(["--input-type=module", "-"])
    .env("RENDER_DRIVER_CONFIG", &config)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("spawning the node render driver")?;

  {
    let mut stdin = child.stdin.take().context("driver stdin unavailable")?;
    stdin
      .write_all(DRIVER_SOURCE.as_bytes())
      .context("writing the driver script to node")?;
    // dropped here so node sees EOF and starts executing
  }

  let stdout = child.stdout.take().context("driver stdout unavailable")?;
  let stderr = child.stderr.take().context("driver stderr unavailable")?;

  let (tx, rx) = mpsc::channel::<String>();
  let reader = std::thread::spawn(move || {
    for line in BufReader::new(stdout).lines() {
      match line {
        Ok(line) => {
          if tx.send(line).is_err() {
            break;
          }
        }
        Err(_) => break,
      }
    }
  });
  let stderr_reader = std::thread::spawn(move || {
    let mut buf = String::new();
    let _ = BufReader::new(stderr).read_to_string(&mut buf);
    buf
  });

  let deadline = Instant::now() + Duration::from_millis(req.timeout_ms + GUARD_EXTRA_MS);
  let exit = pump_events(&rx, deadline, diagnostics);

  let outcome = match exit {
    BridgeExit::Result(Ok(())) => Ok(()),
    BridgeExit::Result(Err(message)) => Err(anyhow!(message)),
    BridgeExit::Deadline => {
      let _ = child.kill();
      Err(anyhow!(
        "browser preview navigation timed out after {}ms",
        req.timeout_ms
      ))
    }
    BridgeExit::Eof => {
      let stderr_text = stderr_reader.join().unwrap_or_default();
      let detail = stderr_text.trim();
      if detail.is_empty() {
        Err(anyhow!("render driver exited without reporting a result"))
      } else {
        Err(anyhow!("render driver exited without reporting a result: {}", detail))
      }
    }
  };

  // always reap the child, whatever happened above
  let _ = child.wait();
  let _ = reader.join();

  outcome
}

fn pump_events(
  rx: &mpsc::Receiver<String>,
  deadline: Instant,
  diagnostics: &mut Diagnostics,
) -> BridgeExit {
  loop {
    let now = Instant::now();
    if now >= deadline {
      return BridgeExit::Deadline;
    }
    match rx.recv_timeout(deadline - now) {
      Ok(line) => {
        let line = line.trim();
        if line.is_empty() {
          continue;
        }
        // non-JSON noise on stdout is ignored rather than fatal
        let event: DriverEvent = match serde_json::from_str(line) {
          Ok(event) => event,
          Err(_) => continue,
        };
        match event {
          DriverEvent::Console { level, text } => {
            diagnostics.console.push(ConsoleMessage { level, text });
          }
          DriverEvent::PageError { message } => {
            diagnostics.page_errors.push(message);
          }
          DriverEvent::RequestFailed { url, failure } => {
            diagnostics.request_failures.push(RequestFailure { url, failure });
          }
          DriverEvent::Result { status, error } => {
            let result = if status == "success" {
              Ok(())
            } else {
              Err(error.unwrap_or_else(|| "render driver reported failure".to_string()))
            };
            return BridgeExit::Result(result);
          }
        }
      }
      Err(mpsc::RecvTimeoutError::Timeout) => return BridgeExit::Deadline,
      Err(mpsc::RecvTimeoutError::Disconnected) => return BridgeExit::Eof,
    }
  }
}
