/*
    object.rs - Converters for key/value object responses

    Covers the non-datatype responses a client reads back:
    - PingResp       -> ()
    - GetServerInfo  -> ServerInfo
    - GetResp        -> FetchedObject (all siblings)
    - PutResp        -> StoredObject
    - DelResp        -> ()
*/

use super::codes::MessageCode;
use super::converter::{decode_pb, expect_code, instrumented, ResponseConverter};
use super::errors::{DecodeError, DecodeResult};
use super::pb;
use bytes::Bytes;
use std::collections::HashMap;

/// Link from an object to another object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiakLink {
    pub bucket: String,
    pub key: String,
    pub tag: String,
}

/// One sibling value with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiakObject {
    pub value: Bytes,
    pub content_type: Option<String>,
    pub charset: Option<String>,
    pub content_encoding: Option<String>,
    pub vtag: Option<String>,
    /// (seconds, microseconds) since the epoch
    pub last_modified: Option<(u32, u32)>,
    pub links: Vec<RiakLink>,
    pub user_meta: HashMap<String, Bytes>,
    /// Secondary index entries; a name may repeat
    pub indexes: Vec<(String, Bytes)>,
    pub deleted: bool,
}

/// Result of an object fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedObject {
    pub vclock: Option<Bytes>,
    /// Set when a conditional fetch found the object unmodified
    pub unchanged: bool,
    pub siblings: Vec<RiakObject>,
}

impl FetchedObject {
    /// No siblings and no vclock means the key does not exist
    pub fn is_not_found(&self) -> bool {
        self.siblings.is_empty() && self.vclock.is_none() && !self.unchanged
    }

    pub fn has_siblings(&self) -> bool {
        self.siblings.len() > 1
    }
}

/// Result of an object store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredObject {
    /// Server-assigned key, when the request carried none
    pub key: Option<Bytes>,
    pub vclock: Option<Bytes>,
    /// Present when the store asked for the body back
    pub siblings: Vec<RiakObject>,
}

/// Server node name and version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerInfo {
    pub node: Option<String>,
    pub server_version: Option<String>,
}

fn lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn convert_content(content: pb::RpbContent) -> RiakObject {
    let last_modified = content.last_mod.map(|secs| (secs, content.last_mod_usecs.unwrap_or(0)));

    RiakObject {
        value: Bytes::from(content.value),
        content_type: content.content_type.map(lossy),
        charset: content.charset.map(lossy),
        content_encoding: content.content_encoding.map(lossy),
        vtag: content.vtag.map(lossy),
        last_modified,
        links: content
            .links
            .into_iter()
            .map(|link| RiakLink {
                bucket: link.bucket.map(lossy).unwrap_or_default(),
                key: link.key.map(lossy).unwrap_or_default(),
                tag: link.tag.map(lossy).unwrap_or_default(),
            })
            .collect(),
        user_meta: content
            .usermeta
            .into_iter()
            .map(|pair| (lossy(pair.key), Bytes::from(pair.value.unwrap_or_default())))
            .collect(),
        indexes: content
            .indexes
            .into_iter()
            .map(|pair| (lossy(pair.key), Bytes::from(pair.value.unwrap_or_default())))
            .collect(),
        deleted: content.deleted.unwrap_or(false),
    }
}

/// `PingResp` -> `()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PingConverter;

impl ResponseConverter for PingConverter {
    type Output = ();

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<()> {
        instrumented("ping", code, payload, || {
            expect_code(code, payload, MessageCode::PingResp)?;
            if !payload.is_empty() {
                return Err(DecodeError::malformed(
                    code,
                    format!("ping response carries {} unexpected bytes", payload.len()),
                ));
            }
            Ok(())
        })
    }
}

/// `GetServerInfoResp` -> `ServerInfo`
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerInfoConverter;

impl ResponseConverter for ServerInfoConverter {
    type Output = ServerInfo;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<ServerInfo> {
        instrumented("server_info", code, payload, || {
            expect_code(code, payload, MessageCode::GetServerInfoResp)?;
            let resp: pb::RpbGetServerInfoResp = decode_pb(code, payload)?;
            Ok(ServerInfo {
                node: resp.node.map(lossy),
                server_version: resp.server_version.map(lossy),
            })
        })
    }
}

/// `GetResp` -> `FetchedObject`. An empty payload is a not-found.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchObjectConverter;

impl ResponseConverter for FetchObjectConverter {
    type Output = FetchedObject;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<FetchedObject> {
        instrumented("fetch_object", code, payload, || {
            expect_code(code, payload, MessageCode::GetResp)?;
            let resp: pb::RpbGetResp = decode_pb(code, payload)?;
            Ok(FetchedObject {
                vclock: resp.vclock.map(Bytes::from),
                unchanged: resp.unchanged.unwrap_or(false),
                siblings: resp.content.into_iter().map(convert_content).collect(),
            })
        })
    }
}

/// `PutResp` -> `StoredObject`
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreObjectConverter;

impl ResponseConverter for StoreObjectConverter {
    type Output = StoredObject;

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<StoredObject> {
        instrumented("store_object", code, payload, || {
            expect_code(code, payload, MessageCode::PutResp)?;
            let resp: pb::RpbPutResp = decode_pb(code, payload)?;
            Ok(StoredObject {
                key: resp.key.map(Bytes::from),
                vclock: resp.vclock.map(Bytes::from),
                siblings: resp.content.into_iter().map(convert_content).collect(),
            })
        })
    }
}

/// `DelResp` -> `()`
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteConverter;

impl ResponseConverter for DeleteConverter {
    type Output = ();

    fn convert(&self, code: u8, payload: &[u8]) -> DecodeResult<()> {
        instrumented("delete", code, payload, || expect_code(code, payload, MessageCode::DelResp))
    }
}
