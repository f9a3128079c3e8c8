//! Interned names for model identifiers.
//!
//! Name provides O(1) equality checks and zero-cost copying for the
//! type, method, and property identifiers the model layer traffics in.
//! All names with the same content point to the same memory location.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, RwLock};

use serde::{Serialize, Serializer};

/// Global name interner
static INTERNER: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// An interned identifier used for type, method, and property names.
///
/// Equality is a pointer comparison and copies are free, which matters
/// because binding resolution compares names constantly.
#[derive(Clone, Copy)]
pub struct Name {
    inner: &'static str,
}

impl Name {
    /// Intern a name from any string-like value.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        // Fast path: already interned (read lock only)
        {
            let interner = INTERNER.read().unwrap();
            if let Some(&interned) = interner.get(s) {
                return Name { inner: interned };
            }
        }

        let mut interner = INTERNER.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(&interned) = interner.get(s) {
            return Name { inner: interned };
        }

        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        interner.insert(leaked);

        Name { inner: leaked }
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.inner
    }

    /// Check if the name is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Derive a property name from a capitalized accessor suffix.
    ///
    /// The first letter is lowered unless the second letter is also
    /// uppercase, so `Name` becomes `name` but `URL` stays `URL` and
    /// `CCompiler` stays `CCompiler`.
    pub fn decapitalized(&self) -> Name {
        let mut chars = self.inner.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return *self,
        };
        if let Some(second) = chars.next() {
            if first.is_uppercase() && second.is_uppercase() {
                return *self;
            }
        }
        let mut out = String::with_capacity(self.inner.len());
        out.extend(first.to_lowercase());
        out.push_str(&self.inner[first.len_utf8()..]);
        Name::new(out)
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.inner
    }
}

impl AsRef<str> for Name {
    #[inline]
    fn as_ref(&self) -> &str {
        self.inner
    }
}

impl Borrow<str> for Name {
    #[inline]
    fn borrow(&self) -> &str {
        self.inner
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for Name {}

impl PartialOrd for Name {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // All equal names share an address, so hashing the pointer is sound
        std::ptr::hash(self.inner, state)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}
