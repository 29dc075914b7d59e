//! Node Tags
//!
//! Tags are interned strings: the global interner turns each tag name into
//! a compact integer [`Tag`] so membership tests and comparisons never touch
//! the string data.
//!
//! ```rust,ignore
//! use arbor_core::tags::{tag, Tags};
//!
//! let mut tags = Tags::new();
//! tags.insert(tag("pickable"));
//! assert!(tags.contains(tag("pickable")));
//! assert_eq!(tag("pickable").as_str(), "pickable");
//! ```

use std::fmt;
use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};
use smallvec::SmallVec;

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// An interned tag identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(Spur);

impl Tag {
    /// Resolves the tag back to its name.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        tag(name)
    }
}

/// Interns `name`, returning the existing tag if it was seen before.
#[inline]
pub fn tag(name: &str) -> Tag {
    Tag(INTERNER.get_or_intern(name))
}

/// Looks up a tag without interning it.
#[inline]
pub fn existing_tag(name: &str) -> Option<Tag> {
    INTERNER.get(name).map(Tag)
}

/// A small insertion-ordered set of tags.
///
/// Equality is set equality: two `Tags` holding the same tags in a
/// different order compare equal.
#[derive(Clone, Default)]
pub struct Tags {
    items: SmallVec<[Tag; 4]>,
}

impl Tags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tag`. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.items.push(tag);
        true
    }

    /// Removes `tag`. Returns `false` if it was not present.
    pub fn remove(&mut self, tag: Tag) -> bool {
        if let Some(pos) = self.items.iter().position(|&t| t == tag) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.items.contains(&tag)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.items.iter().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl PartialEq for Tags {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|t| other.contains(t))
    }
}

impl Eq for Tags {}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Tag::as_str)).finish()
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for t in iter {
            tags.insert(t);
        }
        tags
    }
}

impl<'a> FromIterator<&'a str> for Tags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(tag).collect()
    }
}

impl Extend<Tag> for Tags {
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        for t in iter {
            self.insert(t);
        }
    }
}
