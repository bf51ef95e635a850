use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Maps a normalized (camelCase) tree into a typed value.
pub trait ObjectMapper: Send + Sync {
    fn deserialize<T: DeserializeOwned>(&self, tree: Value) -> Result<T>;
}

/// Maps trees with `serde`. Target types should use camelCase field names,
/// e.g. via `#[serde(rename_all = "camelCase")]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeMapper;

impl ObjectMapper for SerdeMapper {
    fn deserialize<T: DeserializeOwned>(&self, tree: Value) -> Result<T> {
        T::deserialize(&tree).map_err(|e| {
            Error::decode(
                format!("cannot map response into {}: {e}", std::any::type_name::<T>()),
                tree.to_string(),
            )
        })
    }
}
