//! Protobuf payload for cached records
//!
//! Mirrors the `UserApps` message consumers of the cache already read:
//!
//! ```text
//! message UserApps {
//!     repeated uint32 apps = 1 [packed=true];
//!     optional double lat = 2;
//!     optional double lon = 3;
//! }
//! ```
//!
//! Device type and id are not part of the payload; they make up the key.

use memc_common::{AppsInstalled, MemcError, Result};
use prost::Message;

#[derive(Clone, PartialEq, Message)]
pub struct UserApps {
    #[prost(uint32, repeated, packed = "true", tag = "1")]
    pub apps: Vec<u32>,
    #[prost(double, optional, tag = "2")]
    pub lat: Option<f64>,
    #[prost(double, optional, tag = "3")]
    pub lon: Option<f64>,
}

impl From<&AppsInstalled> for UserApps {
    fn from(record: &AppsInstalled) -> Self {
        Self {
            apps: record.apps.clone(),
            lat: Some(record.lat),
            lon: Some(record.lon),
        }
    }
}

/// Serialize the coordinates and app ids of `record`.
pub fn encode_record(record: &AppsInstalled) -> Result<Vec<u8>> {
    let message = UserApps::from(record);
    let mut buf = Vec::with_capacity(message.encoded_len());
    message
        .encode(&mut buf)
        .map_err(|e| MemcError::Encode(e.to_string()))?;
    Ok(buf)
}

pub fn decode_payload(payload: &[u8]) -> Result<UserApps> {
    UserApps::decode(payload).map_err(|e| MemcError::Decode(e.to_string()))
}
