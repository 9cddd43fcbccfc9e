use std::collections::BTreeMap;
use std::sync::Arc;

use super::NamespaceOptions;
use crate::proto;
use crate::NamespaceError;

/// A namespace id paired with its validated options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMetadata {
    id: String,
    options: NamespaceOptions,
}

impl NamespaceMetadata {
    pub fn new(
        id: impl Into<String>,
        options: NamespaceOptions,
    ) -> Result<Self, NamespaceError> {
        let id = id.into();
        if id.is_empty() {
            return Err(NamespaceError::EmptyId);
        }
        options
            .validate()
            .map_err(|reason| NamespaceError::InvalidOptions { id: id.clone(), reason })?;

        Ok(Self { id, options })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &NamespaceOptions {
        &self.options
    }
}

/// Immutable, validated view of the namespace topology.
///
/// Cloning is cheap: clones share the same underlying collection. Equality is
/// structural, two maps built from different documents compare equal when
/// they describe the same namespaces with the same options.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    namespaces: Arc<BTreeMap<String, NamespaceMetadata>>,
}

impl NamespaceMap {
    /// Builds a map from at least one namespace with unique ids.
    pub fn new(metadatas: impl IntoIterator<Item = NamespaceMetadata>) -> Result<Self, NamespaceError> {
        let mut namespaces = BTreeMap::new();
        for metadata in metadatas {
            if namespaces.contains_key(&metadata.id) {
                return Err(NamespaceError::Duplicate(metadata.id));
            }
            namespaces.insert(metadata.id.clone(), metadata);
        }

        if namespaces.is_empty() {
            return Err(NamespaceError::EmptyMetadatas);
        }

        Ok(Self {
            namespaces: Arc::new(namespaces),
        })
    }

    /// Map with no namespaces, the state of a registry that has not yet
    /// received its first value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&NamespaceMetadata> {
        self.namespaces.get(id)
    }

    /// Namespace ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn metadatas(&self) -> impl Iterator<Item = &NamespaceMetadata> {
        self.namespaces.values()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Validates a decoded registry document.
    pub fn from_proto(registry: &proto::Registry) -> Result<Self, NamespaceError> {
        let metadatas = registry
            .namespaces
            .iter()
            .map(|(id, opts)| {
                let retention = opts.retention_options.as_ref().ok_or_else(|| NamespaceError::MissingField {
                    id: id.clone(),
                    field: "retention options",
                })?;
                let options = NamespaceOptions::from_proto(opts, retention)
                    .map_err(|reason| NamespaceError::InvalidOptions { id: id.clone(), reason })?;
                NamespaceMetadata::new(id.clone(), options)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(metadatas)
    }

    pub fn to_proto(&self) -> proto::Registry {
        proto::Registry {
            namespaces: self
                .namespaces
                .iter()
                .map(|(id, metadata)| (id.clone(), metadata.options.to_proto()))
                .collect(),
        }
    }
}

impl PartialEq for NamespaceMap {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.namespaces, &other.namespaces) || self.namespaces == other.namespaces
    }
}

impl Eq for NamespaceMap {}
