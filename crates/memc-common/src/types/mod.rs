//! Common types used across MemcLoad

use serde::{Deserialize, Serialize};

/// Device types the loader ships partition addresses for by default.
pub const KNOWN_DEVICE_TYPES: [&str; 4] = ["idfa", "gaid", "adid", "dvid"];

/// Separator between device type and device id inside a cache key.
pub const CACHE_KEY_SEPARATOR: char = ':';

/// One parsed device / installed-apps entry.
///
/// A value of this type only exists once the device type and id are
/// non-empty and both coordinates parsed. App ids keep the order and
/// duplicates of the input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppsInstalled {
    /// Selects the cache partition (e.g. "idfa")
    pub device_type: String,

    /// Device identifier, unique within its device type
    pub device_id: String,

    /// Latitude, no range validation
    pub lat: f64,

    /// Longitude, no range validation
    pub lon: f64,

    /// Installed application ids
    pub apps: Vec<u32>,
}

impl AppsInstalled {
    /// Key under which this record is stored in its partition.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.device_type, &self.device_id)
    }
}

/// Cache key in the form `<device_type>:<device_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(device_type: &str, device_id: &str) -> Self {
        let mut key = String::with_capacity(device_type.len() + device_id.len() + 1);
        key.push_str(device_type);
        key.push(CACHE_KEY_SEPARATOR);
        key.push_str(device_id);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new("gaid", "7rfw452y52g2gq4g");
        assert_eq!(key.as_str(), "gaid:7rfw452y52g2gq4g");
        assert_eq!(key.to_string(), "gaid:7rfw452y52g2gq4g");
    }

    #[test]
    fn test_record_cache_key() {
        let record = AppsInstalled {
            device_type: "adid".to_string(),
            device_id: "abc".to_string(),
            lat: 0.0,
            lon: 0.0,
            apps: vec![],
        };
        assert_eq!(record.cache_key(), CacheKey::new("adid", "abc"));
    }

    proptest! {
        // Device types never contain the separator, so distinct pairs give distinct keys.
        #[test]
        fn prop_cache_key_unique_per_pair(
            a_type in "[a-z]{1,8}",
            a_id in "[a-zA-Z0-9:]{1,16}",
            b_type in "[a-z]{1,8}",
            b_id in "[a-zA-Z0-9:]{1,16}",
        ) {
            let same_pair = a_type == b_type && a_id == b_id;
            let same_key = CacheKey::new(&a_type, &a_id) == CacheKey::new(&b_type, &b_id);
            prop_assert_eq!(same_pair, same_key);
        }
    }
}
