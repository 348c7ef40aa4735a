//! Front-end bundle serving.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tiny_http::Request;

use crate::response::{send_body, PLAIN};

pub fn respond(request: Request, root: &Path) -> Result<()> {
    let Some(path) = resolve_path(request.url(), root) else {
        return send_body(request, 404, PLAIN, b"404 page not found\n".to_vec());
    };
    let body = fs::read(&path).with_context(|| format!("failed reading {}", path.display()))?;
    send_body(request, 200, &content_type_for(&path), body)
}

/// Maps a request URL onto a file under `root`, using `index.html` for
/// directories. Anything that escapes `root` resolves to `None`.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let clean = path.trim_matches('/');
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = root.join(clean).canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Extension-based content type; text types are served as UTF-8.
pub fn content_type_for(path: &Path) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT {
        format!("{}; charset=utf-8", mime.essence_str())
    } else {
        mime.essence_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{content_type_for, resolve_path};

    fn bundle() -> anyhow::Result<tempfile::TempDir> {
        let temp = tempfile::tempdir()?;
        let dist = temp.path().join("dist");
        fs::create_dir_all(dist.join("assets"))?;
        fs::write(dist.join("index.html"), "<!doctype html>")?;
        fs::write(dist.join("assets/app.js"), "console.log(1)")?;
        fs::write(temp.path().join("secret.env"), "GEMINI_API_KEY=x")?;
        Ok(temp)
    }

    #[test]
    fn root_and_directories_resolve_to_index() -> anyhow::Result<()> {
        let temp = bundle()?;
        let dist = temp.path().join("dist");
        let index = dist.join("index.html").canonicalize()?;
        assert_eq!(resolve_path("/", &dist), Some(index.clone()));
        assert_eq!(resolve_path("/?v=2", &dist), Some(index));
        assert_eq!(resolve_path("/assets", &dist), None);
        Ok(())
    }

    #[test]
    fn files_resolve_and_query_is_ignored() -> anyhow::Result<()> {
        let temp = bundle()?;
        let dist = temp.path().join("dist");
        let script = dist.join("assets/app.js").canonicalize()?;
        assert_eq!(resolve_path("/assets/app.js?hash=abc", &dist), Some(script));
        assert_eq!(resolve_path("/assets/missing.js", &dist), None);
        Ok(())
    }

    #[test]
    fn traversal_outside_root_is_rejected() -> anyhow::Result<()> {
        let temp = bundle()?;
        let dist = temp.path().join("dist");
        assert_eq!(resolve_path("/../secret.env", &dist), None);
        assert_eq!(resolve_path("/assets/../../secret.env", &dist), None);
        Ok(())
    }

    #[test]
    fn missing_root_resolves_nothing() {
        assert_eq!(resolve_path("/", Path::new("/nonexistent/morph/dist")), None);
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for(Path::new("index.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("assets/site.css")), "text/css; charset=utf-8");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("hero.png")), "image/png");
        assert_eq!(content_type_for(Path::new("blob")), "application/octet-stream");
    }
}
