//! Cover-image path resolution and embed-link rewriting.
//!
//! The backend hands out cover paths in several historical shapes: fully
//! qualified URLs, `/`-prefixed paths (some of which are bundled front-end
//! assets, some server uploads), and bare relative upload paths. The
//! resolver turns all of them into something an `<img>` tag can load, or
//! `None` when there is nothing to load.

use regex::Regex;

/// Default first path segments that mark a `/`-prefixed path as a server
/// upload rather than a bundled static asset.
pub const DEFAULT_REMOTE_PREFIXES: &[&str] = &["uploads", "files"];

/// Resolves raw image paths against one deployment's files base URL.
///
/// The base URL is injected configuration, never a compiled-in literal.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    remote_prefixes: Vec<String>,
}

impl ImageResolver {
    pub fn new(base_url: &str, remote_prefixes: Vec<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            remote_prefixes,
        }
    }

    /// Resolve a raw cover path to a loadable URL.
    ///
    /// - missing / blank input resolves to `None` (caller shows a placeholder)
    /// - absolute `http(s)://` URLs pass through unchanged
    /// - `/`-prefixed paths pass through when they are bundled assets, and
    ///   are joined onto the base URL when their first segment matches a
    ///   configured upload prefix
    /// - anything else is a server-relative upload path and is joined onto
    ///   the base URL with exactly one separating slash
    pub fn resolve(&self, path: Option<&str>) -> Option<String> {
        let cleaned = path?.trim();
        if cleaned.is_empty() {
            return None;
        }

        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Some(cleaned.to_string());
        }

        if let Some(rest) = cleaned.strip_prefix('/') {
            if self.is_remote_path(rest) {
                return Some(format!("{}/{}", self.base_url, rest));
            }
            // Bundled static asset from the front-end's public folder.
            return Some(cleaned.to_string());
        }

        Some(format!("{}/{}", self.base_url, cleaned))
    }

    fn is_remote_path(&self, without_slash: &str) -> bool {
        let first_segment = without_slash.split('/').next().unwrap_or("");
        self.remote_prefixes
            .iter()
            .any(|prefix| prefix == first_segment)
    }
}

/// Rewrite a share link into a URL that works inside an iframe.
///
/// YouTube watch/short links become `youtube.com/embed/...`, Spotify
/// track/album/playlist links become `open.spotify.com/embed/...`.
/// SoundCloud and Voiz links already embed as-is, as does anything
/// unrecognized.
pub fn embed_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let youtube_re =
        Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([A-Za-z0-9_-]+)")
            .unwrap();
    if let Some(captures) = youtube_re.captures(url) {
        return format!("https://www.youtube.com/embed/{}", &captures[1]);
    }

    let spotify_re =
        Regex::new(r"https?://open\.spotify\.com/(track|album|playlist)/([A-Za-z0-9]+)").unwrap();
    if let Some(captures) = spotify_re.captures(url) {
        return format!(
            "https://open.spotify.com/embed/{}/{}",
            &captures[1], &captures[2]
        );
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::{embed_url, ImageResolver, DEFAULT_REMOTE_PREFIXES};

    fn resolver(base: &str) -> ImageResolver {
        let prefixes = DEFAULT_REMOTE_PREFIXES
            .iter()
            .map(|p| p.to_string())
            .collect();
        ImageResolver::new(base, prefixes)
    }

    #[test]
    fn missing_and_blank_paths_resolve_to_none() {
        let r = resolver("https://cdn.example");
        assert_eq!(r.resolve(None), None);
        assert_eq!(r.resolve(Some("")), None);
        assert_eq!(r.resolve(Some("   ")), None);
    }

    #[test]
    fn absolute_urls_pass_through() {
        let r = resolver("https://cdn.example");
        assert_eq!(
            r.resolve(Some("https://x/y.jpg")).as_deref(),
            Some("https://x/y.jpg")
        );
        assert_eq!(
            r.resolve(Some("http://x/y.jpg")).as_deref(),
            Some("http://x/y.jpg")
        );
    }

    #[test]
    fn bare_relative_path_joins_with_single_slash() {
        let r = resolver("https://cdn.example");
        assert_eq!(
            r.resolve(Some("uploads/a.jpg")).as_deref(),
            Some("https://cdn.example/uploads/a.jpg")
        );
    }

    #[test]
    fn trailing_slash_on_base_does_not_double_up() {
        let r = resolver("https://cdn.example/");
        assert_eq!(
            r.resolve(Some("uploads/a.jpg")).as_deref(),
            Some("https://cdn.example/uploads/a.jpg")
        );
        assert_eq!(
            r.resolve(Some("/uploads/a.jpg")).as_deref(),
            Some("https://cdn.example/uploads/a.jpg")
        );
    }

    #[test]
    fn slash_prefixed_upload_path_joins_to_base() {
        let r = resolver("https://cdn.example");
        assert_eq!(
            r.resolve(Some("/files/cover.png")).as_deref(),
            Some("https://cdn.example/files/cover.png")
        );
    }

    #[test]
    fn slash_prefixed_bundled_asset_passes_through() {
        let r = resolver("https://cdn.example");
        assert_eq!(r.resolve(Some("/hero-01.jpg")).as_deref(), Some("/hero-01.jpg"));
        assert_eq!(r.resolve(Some("/play.svg")).as_deref(), Some("/play.svg"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let r = resolver("https://cdn.example");
        assert_eq!(
            r.resolve(Some("  uploads/a.jpg ")).as_deref(),
            Some("https://cdn.example/uploads/a.jpg")
        );
    }

    #[test]
    fn youtube_links_become_embeds() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            embed_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn spotify_links_become_embeds() {
        assert_eq!(
            embed_url("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC"),
            "https://open.spotify.com/embed/track/4uLU6hMCjMI75M1A2tKUQC"
        );
    }

    #[test]
    fn other_links_pass_through() {
        assert_eq!(
            embed_url("https://soundcloud.com/artist/track"),
            "https://soundcloud.com/artist/track"
        );
        assert_eq!(embed_url("https://voiz.vn/play/1234"), "https://voiz.vn/play/1234");
        assert_eq!(embed_url(""), "");
    }
}
