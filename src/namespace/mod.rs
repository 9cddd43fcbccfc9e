//! Namespace topology model
//!
//! Converts the raw registry document into an immutable [`NamespaceMap`],
//! rejecting anything that does not describe a coherent set of namespaces.
//! A failed conversion never yields a partial map.

mod map;
mod options;


pub use map::*;
pub use options::*;

use crate::kv::Value;
use crate::proto;
use crate::NamespaceError;

/// Decodes and validates the namespace document held by `value`.
pub fn map_from_value(value: &Value) -> Result<NamespaceMap, NamespaceError> {
    let registry: proto::Registry = value.unmarshal().map_err(|_| NamespaceError::InvalidRegistry)?;
    NamespaceMap::from_proto(&registry)
}
