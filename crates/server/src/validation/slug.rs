/// Normalize a requested community slug.
///
/// Every character outside `[A-Za-z0-9]` (underscores included) becomes a
/// hyphen, and runs of hyphens collapse into one. Case and leading/trailing
/// hyphens are preserved, so `"My Cool Community!!"` becomes
/// `"My-Cool-Community-"`.
pub fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut last_was_dash = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_punctuation_runs() {
        assert_eq!(sanitize_slug("My Cool Community!!"), "My-Cool-Community-");
        assert_eq!(sanitize_slug("acme corp"), "acme-corp");
        assert_eq!(sanitize_slug("a  --  b"), "a-b");
    }

    #[test]
    fn test_sanitize_keeps_valid_slugs() {
        assert_eq!(sanitize_slug("acme-corp"), "acme-corp");
        assert_eq!(sanitize_slug("Rust2024"), "Rust2024");
    }

    #[test]
    fn test_sanitize_treats_underscore_as_separator() {
        assert_eq!(sanitize_slug("my_community"), "my-community");
        assert_eq!(sanitize_slug("__init__"), "-init-");
    }

    #[test]
    fn test_sanitize_non_ascii_becomes_hyphen() {
        assert_eq!(sanitize_slug("café"), "caf-");
        assert_eq!(sanitize_slug("über cool"), "-ber-cool");
    }

    #[test]
    fn test_sanitize_empty_and_symbol_only() {
        assert_eq!(sanitize_slug(""), "");
        assert_eq!(sanitize_slug("!!!"), "-");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "My Cool Community!!",
            "--already--dashed--",
            "snake_case_name",
            "  spaced   out  ",
            "naïve résumé",
            "plain",
        ];

        for input in inputs {
            let once = sanitize_slug(input);
            assert_eq!(sanitize_slug(&once), once, "not idempotent for {input:?}");
        }
    }
}
