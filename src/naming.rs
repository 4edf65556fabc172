//! Filename sanitization and unique artifact naming.
//!
//! Uploaded filenames are attacker-controlled. Before a name touches the
//! filesystem it is reduced to a safe alphabet (`[A-Za-z0-9._-]`), and every
//! stored artifact gets a random uuid prefix so that two concurrent requests
//! can never collide on a path — uniqueness is guaranteed by construction,
//! not by locking.

use uuid::Uuid;

/// Reduce a user-supplied filename to the safe alphabet.
///
/// - Whitespace runs collapse to a single `_`
/// - Characters outside `[A-Za-z0-9._-]` are dropped
/// - Leading dots are stripped (no hidden files, no `..`)
/// - If nothing survives, returns `"file"`
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            if pending_space {
                out.push('_');
                pending_space = false;
            }
            out.push(c);
        }
    }
    let trimmed = out.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// True if `name` is already in the form [`sanitize`] produces.
///
/// Used by retrieval as a path-traversal defense: an identifier that is not
/// in sanitized form cannot name a stored artifact, so it is rejected before
/// any filesystem access.
pub fn is_sanitized(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && name == sanitize(name)
}

/// Compose a collision-free stored name: `{uuid-v4}_{sanitized-original}`.
pub fn unique_name(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize(original))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_passes_through() {
        assert_eq!(sanitize("photo.png"), "photo.png");
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(sanitize("my holiday photo.jpg"), "my_holiday_photo.jpg");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(sanitize("a \t b.png"), "a_b.png");
    }

    #[test]
    fn path_separators_are_stripped() {
        assert_eq!(sanitize("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize("/uploads/x.png"), "uploadsx.png");
        assert_eq!(sanitize("C:\\temp\\x.gif"), "Ctempx.gif");
    }

    #[test]
    fn leading_dots_are_stripped() {
        assert_eq!(sanitize(".hidden"), "hidden");
        assert_eq!(sanitize("..secret.png"), "secret.png");
    }

    #[test]
    fn unicode_and_specials_are_dropped() {
        assert_eq!(sanitize("phöto<>?.png"), "phto.png");
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(sanitize(""), "file");
        assert_eq!(sanitize("///"), "file");
        assert_eq!(sanitize("..."), "file");
    }

    #[test]
    fn leading_whitespace_does_not_leave_underscore() {
        assert_eq!(sanitize("  x.png"), "x.png");
    }

    #[test]
    fn is_sanitized_accepts_own_output() {
        for raw in ["photo.png", "../../x", "a b.jpg", "ünïcode.gif"] {
            assert!(is_sanitized(&sanitize(raw)), "sanitize({raw:?}) not stable");
        }
    }

    #[test]
    fn is_sanitized_rejects_traversal() {
        assert!(!is_sanitized("../etc/passwd"));
        assert!(!is_sanitized("a/b.png"));
        assert!(!is_sanitized("..png"));
        assert!(!is_sanitized(""));
    }

    #[test]
    fn unique_names_do_not_collide() {
        let a = unique_name("photo.png");
        let b = unique_name("photo.png");
        assert_ne!(a, b);
        assert!(a.ends_with("_photo.png"));
        assert!(is_sanitized(&a));
    }
}
