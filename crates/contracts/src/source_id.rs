//! SourceId - Cheap-to-clone capture source identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Separator between the tokens of a corpus file name.
pub(crate) const NAME_SEPARATOR: char = '_';

/// Identifier of one camera + host capture unit.
///
/// The id doubles as the corpus file-name prefix (`<id>_<kind>_<frame>.<ext>`),
/// so it must not contain the `_` separator. Cloning only bumps a reference
/// count; ids are created once from configuration and cloned into every
/// frameset and metric label.
///
/// # Examples
/// ```
/// use contracts::SourceId;
///
/// let id: SourceId = "raspi1".into();
/// let id2 = id.clone();
/// assert_eq!(id, id2);
/// assert!(id.is_valid_prefix());
/// ```
#[derive(Clone, Default)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Create a new SourceId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id can be used unambiguously as a file-name prefix.
    pub fn is_valid_prefix(&self) -> bool {
        !self.0.is_empty() && !self.0.contains(NAME_SEPARATOR)
    }
}

impl Deref for SourceId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for SourceId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SourceId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SourceId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({:?})", self.0)
    }
}

impl PartialEq for SourceId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for SourceId {}

impl PartialEq<str> for SourceId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for SourceId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialOrd for SourceId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

// Same hash as str so HashMap<SourceId, _> can be queried with &str
impl Hash for SourceId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for SourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_shares_allocation() {
        let id1: SourceId = "raspi1".into();
        let id2 = id1.clone();
        assert_eq!(id1.as_str().as_ptr(), id2.as_str().as_ptr());
    }

    #[test]
    fn test_prefix_validity() {
        assert!(SourceId::from("raspi1").is_valid_prefix());
        assert!(!SourceId::from("raspi_1").is_valid_prefix());
        assert!(!SourceId::from("").is_valid_prefix());
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<SourceId, i64> = HashMap::new();
        map.insert("raspi1".into(), 3);
        assert_eq!(map.get("raspi1"), Some(&3));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id: SourceId = "raspi4".into();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"raspi4\"");
        let parsed: SourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
