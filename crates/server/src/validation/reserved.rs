use std::collections::BTreeSet;

/// Slugs that collide with top-level application routes.
const BUILTIN_RESERVED_SLUGS: &[&str] = &[
    "about",
    "admin",
    "api",
    "apps",
    "auth",
    "blog",
    "code-of-conduct",
    "contact",
    "dashboard",
    "explore",
    "faq",
    "features",
    "graphql",
    "help",
    "home",
    "login",
    "logout",
    "me",
    "messages",
    "new",
    "notifications",
    "pricing",
    "privacy",
    "search",
    "settings",
    "signup",
    "status",
    "support",
    "team",
    "terms",
    "thread",
    "threads",
    "upgrade",
    "users",
];

/// The set of community slugs that may never be claimed.
///
/// Matching is case-insensitive and happens against the sanitized slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedSlugs {
    slugs: BTreeSet<String>,
}

impl ReservedSlugs {
    pub fn builtin() -> Self {
        Self::from_slugs(BUILTIN_RESERVED_SLUGS.iter().copied())
    }

    pub fn from_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            slugs: slugs
                .into_iter()
                .map(|slug| slug.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Add configured slugs on top of the current set.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.slugs
            .extend(extra.into_iter().map(|slug| slug.as_ref().to_ascii_lowercase()));
        self
    }

    pub fn is_blacklisted(&self, slug: &str) -> bool {
        self.slugs.contains(&slug.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

impl Default for ReservedSlugs {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_route_names() {
        let reserved = ReservedSlugs::builtin();
        assert!(reserved.is_blacklisted("admin"));
        assert!(reserved.is_blacklisted("explore"));
        assert!(reserved.is_blacklisted("code-of-conduct"));
        assert!(!reserved.is_blacklisted("acme-corp"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let reserved = ReservedSlugs::builtin();
        assert!(reserved.is_blacklisted("Settings"));
        assert!(reserved.is_blacklisted("API"));
    }

    #[test]
    fn test_with_extra_extends_builtin() {
        let reserved = ReservedSlugs::builtin().with_extra(["Internal", "staff"]);
        assert!(reserved.is_blacklisted("internal"));
        assert!(reserved.is_blacklisted("staff"));
        assert!(reserved.is_blacklisted("about"));
        assert_eq!(reserved.len(), BUILTIN_RESERVED_SLUGS.len() + 2);
    }

    #[test]
    fn test_empty_set_blocks_nothing() {
        let reserved = ReservedSlugs::from_slugs(Vec::<String>::new());
        assert!(reserved.is_empty());
        assert!(!reserved.is_blacklisted("admin"));
    }
}
