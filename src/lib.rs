//! Shared library for the `compile-preview` and `render-preview` binaries.
//!
//! `compile-preview` bundles a UI entry file into a browser-loadable ES
//! module plus an HTML shell; `render-preview` loads an HTML artifact in
//! headless Chromium (via a Playwright bridge), captures a screenshot, and
//! records diagnostics. Both always persist a machine-readable JSON report;
//! render runs additionally merge into a per-artifact manifest.

pub mod browser;
pub mod bundle;
pub mod cli;
pub mod manifest;
pub mod model;
pub mod runtime;
pub mod util;
