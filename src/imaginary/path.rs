//! Path helpers shared by translation and URL building.

/// Remove the first occurrence of `prefix` anywhere in `path`.
///
/// This is a single substring replacement, not an anchored prefix trim:
/// `/a/uploads/uploads/x` with prefix `/uploads` becomes `/a/uploads/x`.
pub fn strip_first(path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    path.replacen(prefix, "", 1)
}

/// Lexically clean a rooted path.
///
/// Repeated slashes collapse, `.` segments vanish and `..` removes the
/// previous segment without climbing above `/`. The result never ends in a
/// slash unless it is the root itself.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}
