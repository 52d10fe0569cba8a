/// Replace the backend root of `url` with `cdn_base`, keeping the path.
///
/// URLs outside the backend root, and empty URLs, pass through unchanged.
pub fn rewrite_url(url: &str, backend_root: &str, cdn_base: &str) -> String {
    let root = backend_root.trim_end_matches('/');
    if url.is_empty() || root.is_empty() {
        return url.to_string();
    }
    match url.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", cdn_base.trim_end_matches('/'), rest)
        }
        _ => url.to_string(),
    }
}
