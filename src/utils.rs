use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::OutputFormat;

/// Join a hostname and a URL fragment with exactly one separator.
///
/// The hostname keeps exactly one trailing slash and a single leading slash
/// is stripped from the url before concatenation. This is plain string
/// normalization, not URL resolution: callers get `hostname + "/" + url`
/// with no relative-path semantics, and the operation is idempotent.
pub fn target_url(hostname: &str, url: &str) -> String {
    let host = hostname.trim_end_matches('/');
    let path = url.strip_prefix('/').unwrap_or(url);
    format!("{host}/{path}")
}

/// Derive the screenshot filename for a URL: every `/` becomes `-`, then
/// the format extension is appended.
///
/// URLs that differ only in `/` vs `-` placement map to the same name;
/// that collision is inherited behavior and deliberately left alone.
pub fn screenshot_filename(url: &str, format: OutputFormat) -> String {
    format!("{}.{}", url.replace('/', "-"), format.extension())
}

pub fn output_path(output_dir: &Path, url: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(screenshot_filename(url, format))
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds > 0 {
        format!("{}.{}s", seconds, millis / 100)
    } else {
        format!("{millis}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_single_separator() {
        assert_eq!(
            target_url("https://example.com", "/about"),
            "https://example.com/about"
        );
        assert_eq!(
            target_url("https://example.com/", "about"),
            "https://example.com/about"
        );
        assert_eq!(
            target_url("https://example.com/", "/about"),
            "https://example.com/about"
        );
        assert_eq!(
            target_url("https://example.com", "about"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_target_url_excess_slashes() {
        // Hostname collapses to one trailing slash; only a single leading
        // slash is stripped from the url.
        assert_eq!(
            target_url("https://example.com//", "about"),
            "https://example.com/about"
        );
        assert_eq!(
            target_url("https://example.com", "//about"),
            "https://example.com//about"
        );
    }

    #[test]
    fn test_target_url_idempotent() {
        let joined = target_url("https://example.com", "/about");
        assert_eq!(target_url(&joined, ""), format!("{joined}/"));
        assert_eq!(target_url("https://example.com/", "about"), joined);
        // Re-normalizing the hostname half changes nothing.
        assert_eq!(
            target_url(&target_url("https://example.com//", ""), "about"),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_screenshot_filename() {
        assert_eq!(screenshot_filename("/about", OutputFormat::Png), "-about.png");
        assert_eq!(
            screenshot_filename("contact", OutputFormat::Png),
            "contact.png"
        );
        assert_eq!(
            screenshot_filename("docs/install", OutputFormat::Jpeg),
            "docs-install.jpeg"
        );
    }

    #[test]
    fn test_screenshot_filename_collision() {
        // "a/b" and "a-b" land on the same file; inherited edge case.
        assert_eq!(
            screenshot_filename("a/b", OutputFormat::Png),
            screenshot_filename("a-b", OutputFormat::Png)
        );
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/tmp/out"), "/about", OutputFormat::Png);
        assert_eq!(path, PathBuf::from("/tmp/out/-about.png"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.0s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }
}
