//! Response decoding: bytes -> tree -> envelope payload -> typed values.
//!
//! Every response, fresh or replayed from cache, goes through the same steps:
//!
//! 1. [`decode`] the raw bytes into a JSON tree (objects and arrays only),
//! 2. [`unwrap_envelope`] a `{"success": true, "data": ...}` wrapper,
//! 3. normalize snake_case keys to camelCase ([`KeyCasing`]),
//! 4. hand the tree to an [`ObjectMapper`] via the [`ResultAssembler`].

mod assembler;
mod casing;
mod envelope;
mod mapper;

pub use assembler::{Collection, PaginatedResult, ResultAssembler};
pub use casing::{normalize_keys, normalize_object, normalize_top_level, to_camel_case, KeyCasing};
pub use envelope::{decode, unwrap_envelope, Envelope};
pub use mapper::{ObjectMapper, SerdeMapper};

use crate::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Raw response bytes plus everything needed to decode them.
///
/// Returned by every client call. Decoding is lazy: nothing is parsed until
/// one of the accessors is called.
#[derive(Debug, Clone)]
pub struct ResponseHandle<M = SerdeMapper> {
    body: Bytes,
    cached: bool,
    mapper: Arc<M>,
    casing: KeyCasing,
}

impl<M: ObjectMapper> ResponseHandle<M> {
    pub fn new(body: Bytes, mapper: Arc<M>) -> Self {
        Self {
            body,
            cached: false,
            mapper,
            casing: KeyCasing::default(),
        }
    }

    pub fn with_key_casing(mut self, casing: KeyCasing) -> Self {
        self.casing = casing;
        self
    }

    pub(crate) fn from_cache(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// Whether the bytes were replayed from cache.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn raw(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn plain_response(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// The full decoded tree, envelope included.
    pub fn decoded(&self) -> Result<Value> {
        decode(&self.body)
    }

    /// The effective payload: the envelope's `data` when present, else the
    /// whole tree. Keys are not normalized.
    pub fn data(&self) -> Result<Value> {
        self.decoded().map(unwrap_envelope)
    }

    pub fn decode_one<T: DeserializeOwned>(&self) -> Result<T> {
        self.assembler().decode_one(self.data()?)
    }

    pub fn decode_many<T: DeserializeOwned>(&self) -> Result<Collection<T>> {
        self.assembler().decode_many(self.data()?)
    }

    fn assembler(&self) -> ResultAssembler<'_, M> {
        ResultAssembler::new(self.mapper.as_ref(), self.casing)
    }
}
