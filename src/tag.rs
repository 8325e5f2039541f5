//! Capability tags attached to registrations and used as resolution qualifiers.

use std::fmt;

/// Marker describing one capability of a registered candidate.
///
/// Tags are attached at registration time and matched by qualified
/// resolution: a candidate satisfies a query when its tag set is a superset
/// of the query's qualifiers. Tags are plain static strings so crates can
/// publish `const` catalogs of them.
///
/// # Examples
///
/// ```rust
/// use sealed_di::Tag;
///
/// const DATABASE: Tag = Tag::new("database");
/// const FAST: Tag = Tag::new("fast");
///
/// assert_eq!(DATABASE.name(), "database");
/// assert_ne!(DATABASE, FAST);
/// assert!(Tag::MOCK.is_mock());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(&'static str);

impl Tag {
    /// Marks a candidate as a test stand-in.
    ///
    /// Mock-tagged candidates get their own late disambiguation pass: when a
    /// query cannot isolate one candidate by qualifiers alone, the resolver
    /// retries against only the mock-tagged survivors. Registering exactly
    /// one mock therefore overrides the real candidate without touching it.
    pub const MOCK: Tag = Tag("mock");

    /// Builds a tag from its name. Usable in `const` position.
    pub const fn new(name: &'static str) -> Tag {
        Tag(name)
    }

    /// The name this tag was built from.
    pub fn name(&self) -> &'static str {
        self.0
    }

    /// Whether this is the distinguished [`Tag::MOCK`] marker.
    pub fn is_mock(&self) -> bool {
        *self == Tag::MOCK
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Insertion-ordered, duplicate-free collection of tags.
///
/// Small by construction (a registration carries a handful of tags at most),
/// so membership checks scan linearly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Empty set.
    pub const fn new() -> TagSet {
        TagSet(Vec::new())
    }

    /// Adds `tag` unless already present.
    pub fn insert(&mut self, tag: Tag) {
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    /// True when every tag in `other` is present here.
    pub fn is_superset_of(&self, other: &TagSet) -> bool {
        other.0.iter().all(|tag| self.contains(*tag))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl Extend<Tag> for TagSet {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        for tag in iter {
            self.insert(tag);
        }
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Descriptor-list rendering for error messages: `[database, mock]`.
impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.name())?;
        }
        f.write_str("]")
    }
}
