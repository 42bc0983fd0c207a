//! Request path canonicalization.
//!
//! The router only ever matches canonical paths. A request whose path is
//! not canonical is answered with `301 Moved Permanently` pointing at
//! [`clean_path`] of the original.

/// Returns the canonical absolute form of `p`.
///
/// - an empty path becomes `/`
/// - a missing leading `/` is added
/// - repeated separators collapse to one
/// - `.` segments are dropped and `..` removes the preceding segment
///   (never climbing above the root)
/// - a trailing `/` is kept unless the result is the bare root
///
/// ```rust
/// use switchyard::clean_path;
///
/// assert_eq!(clean_path("/a/../b"), "/b");
/// assert_eq!(clean_path("//x/./y/"), "/x/y/");
/// assert_eq!(clean_path(""), "/");
/// ```
pub fn clean_path(p: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in p.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut out = String::with_capacity(p.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    } else if p.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::clean_path;

    #[test]
    fn canonical_paths_are_unchanged() {
        for p in ["/", "/a", "/a/b", "/a/b/", "/hello/world"] {
            assert_eq!(clean_path(p), p, "{p}");
        }
    }

    #[test]
    fn cleans() {
        let cases = [
            ("", "/"),
            ("a/b", "/a/b"),
            ("//", "/"),
            ("/.", "/"),
            ("/..", "/"),
            ("/../a", "/a"),
            ("/a/..", "/"),
            ("/a/../", "/"),
            ("/a/../b", "/b"),
            ("/a/./b/", "/a/b/"),
            ("/a//b///c", "/a/b/c"),
            ("/a/b/../../c/", "/c/"),
            ("/a/.", "/a"),
            ("/a/...", "/a/..."),
        ];
        for (input, want) in cases {
            assert_eq!(clean_path(input), want, "clean_path({input:?})");
        }
    }
}
