/// Resolve `reference` against `base`, treating the base path as a directory.
///
/// References with a scheme, a network path (`//host`) or an absolute path are
/// returned unchanged. Everything else is merged under `base` and has its dot
/// segments removed per RFC 3986 §5.2.4.
pub fn resolve_relative(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return base.to_string();
    }
    if has_scheme(reference) || reference.starts_with('/') {
        return reference.to_string();
    }

    let (origin, path) = split_origin(base);
    let path = match path.find(['?', '#']) {
        Some(i) => &path[..i],
        None => path,
    };

    if reference.starts_with('?') || reference.starts_with('#') {
        return format!("{origin}{path}{reference}");
    }

    let (ref_path, suffix) = match reference.find(['?', '#']) {
        Some(i) => reference.split_at(i),
        None => (reference, ""),
    };

    let merged = format!("{}/{}", path.trim_end_matches('/'), ref_path);
    format!("{origin}{}{suffix}", remove_dot_segments(&merged))
}

/// `scheme ":"` per RFC 3986 §3.1.
fn has_scheme(s: &str) -> bool {
    let Some(colon) = s.find(':') else {
        return false;
    };
    let mut chars = s[..colon].chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Split `scheme://authority` off an absolute URL. Paths yield an empty origin.
fn split_origin(base: &str) -> (&str, &str) {
    if !has_scheme(base) {
        return ("", base);
    }
    let Some(authority_start) = base.find("://").map(|i| i + 3) else {
        return ("", base);
    };
    match base[authority_start..].find('/') {
        Some(i) => base.split_at(authority_start + i),
        None => (base, ""),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let body = if absolute { &path[1..] } else { path };

    let mut out: Vec<&str> = Vec::new();
    let mut trailing_slash = false;
    for seg in body.split('/') {
        match seg {
            "." => trailing_slash = true,
            ".." => {
                out.pop();
                trailing_slash = true;
            }
            s => {
                out.push(s);
                trailing_slash = false;
            }
        }
    }
    if trailing_slash {
        out.push("");
    }

    let joined = out.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_and_sibling_references() {
        assert_eq!(resolve_relative("/people/100", "./boss"), "/people/100/boss");
        assert_eq!(resolve_relative("/people/100", "boss"), "/people/100/boss");
        assert_eq!(resolve_relative("/people/100", "../200"), "/people/200");
        assert_eq!(resolve_relative("/people", "./100"), "/people/100");
        assert_eq!(resolve_relative("/people/", "./100"), "/people/100");
    }

    #[test]
    fn climbing_past_the_root_stops_at_root() {
        assert_eq!(resolve_relative("/a", "../../../b"), "/b");
        assert_eq!(resolve_relative("/a/b", ".."), "/a/");
    }

    #[test]
    fn absolute_references_pass_through() {
        assert_eq!(resolve_relative("/people/100", "/teams/7"), "/teams/7");
        assert_eq!(
            resolve_relative("/people/100", "http://www.whitehouse.gov"),
            "http://www.whitehouse.gov"
        );
        assert_eq!(resolve_relative("/people/100", "mailto:bob@example.com"), "mailto:bob@example.com");
        assert_eq!(resolve_relative("/people/100", "//cdn.example.com/x"), "//cdn.example.com/x");
    }

    #[test]
    fn base_with_origin_and_query() {
        assert_eq!(
            resolve_relative("https://api.example.com/people/100?expand=1", "./boss?full=true"),
            "https://api.example.com/people/100/boss?full=true"
        );
        assert_eq!(resolve_relative("https://api.example.com", "people"), "https://api.example.com/people");
    }

    #[test]
    fn empty_and_query_only_references() {
        assert_eq!(resolve_relative("/people/100", ""), "/people/100");
        assert_eq!(resolve_relative("/people/100?x=1", "?page=2"), "/people/100?page=2");
    }
}
