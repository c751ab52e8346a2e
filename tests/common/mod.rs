use std::path::Path;

/// Minimal page with no htmx usage.
#[allow(dead_code)]
pub const PLAIN_PAGE: &str = "<!doctype html>\n<html><body><p>hello</p></body></html>\n";

/// Page that uses an hx-* attribute but loads no htmx script.
#[allow(dead_code)]
pub const HTMX_PAGE: &str =
  "<!doctype html>\n<html><body><button hx-get=\"/ping\">go</button></body></html>\n";

#[allow(dead_code)]
pub fn read_json(path: &Path) -> serde_json::Value {
  let buf = std::fs::read(path).unwrap_or_else(|err| panic!("reading {}: {}", path.display(), err));
  serde_json::from_slice(&buf).unwrap_or_else(|err| panic!("parsing {}: {}", path.display(), err))
}

#[allow(dead_code)]
pub fn write_file(path: &Path, contents: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, contents).unwrap();
}
