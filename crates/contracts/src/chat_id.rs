//! ChatId - Cheap-to-clone destination identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Chat / group / channel identifier with cheap cloning.
///
/// Identifiers are opaque: numeric Telegram ids (`"-100123"`) and channel
/// handles (`"@news"`) are both just strings here. Snapshots taken by the
/// dispatcher clone every id, so cloning only bumps a reference count.
///
/// # Examples
/// ```
/// use contracts::ChatId;
///
/// let id: ChatId = "5239347550".into();
/// let id2 = id.clone();  // O(1) - just increments ref count
/// assert_eq!(id, id2);
/// assert_eq!(id.as_str(), "5239347550");
/// ```
#[derive(Clone, Default)]
pub struct ChatId(Arc<str>);

impl ChatId {
    /// Create a new ChatId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of the id, if it is one (Telegram user/group ids).
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Deref for ChatId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ChatId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChatId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Conversions
impl From<&str> for ChatId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ChatId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::from(id.to_string())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChatId({:?})", self.0)
    }
}

impl PartialEq for ChatId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for ChatId {}

impl PartialEq<str> for ChatId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for ChatId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for ChatId {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash so HashSet<ChatId> can be probed with &str
impl Hash for ChatId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for ChatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
