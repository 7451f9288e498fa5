//! Store keys derived from user identifiers.

use std::fmt;

/// Key under which a user's permission record is stored.
///
/// The realtime database forbids `. # $ / [ ]` in path segments, so these
/// (and `%` itself) are percent-escaped. Escaping is injective, so two
/// distinct user ids never share a key.
///
/// # Examples
///
/// ```
/// use bike_finder::permission::StoreKey;
///
/// let key = StoreKey::for_user("ABwppHE.x/y");
/// assert_eq!(key.as_str(), "ABwppHE%2Ex%2Fy");
/// assert_eq!(key.user_id(), "ABwppHE.x/y");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    user_id: String,
    encoded: String,
}

impl StoreKey {
    /// Build the key for a user.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            encoded: encode_key(user_id),
        }
    }

    /// The escaped key.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The user id the key was built from.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({})", self.encoded)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

fn encode_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '.' => out.push_str("%2E"),
            '#' => out.push_str("%23"),
            '$' => out.push_str("%24"),
            '/' => out.push_str("%2F"),
            '[' => out.push_str("%5B"),
            ']' => out.push_str("%5D"),
            other => out.push(other),
        }
    }
    out
}
