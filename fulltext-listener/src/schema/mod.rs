//! Schema catalog interfaces.
//!
//! The listener never decodes rows or reads the catalog itself. It asks a
//! `SchemaProvider` for the space context, the full-text index defined on a
//! tag or edge type, and a `RowReader` over an encoded row.

use std::fmt;

use fulltext_shared::{ServiceClient, Value};

use crate::errors::CatalogError;

/// Graph space identifier.
pub type SpaceId = i32;

/// A tag or edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    Tag(i32),
    Edge(i32),
}

impl SchemaRef {
    pub fn id(&self) -> i32 {
        match self {
            SchemaRef::Tag(id) | SchemaRef::Edge(id) => *id,
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, SchemaRef::Edge(_))
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaRef::Tag(id) => write!(f, "tag {}", id),
            SchemaRef::Edge(id) => write!(f, "edge {}", id),
        }
    }
}

/// Full-text index defined on a tag or edge type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtIndexDef {
    /// Search engine index name.
    pub name: String,
    /// Indexed property names. Only the first one is used.
    pub fields: Vec<String>,
}

impl FtIndexDef {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![field.into()],
        }
    }
}

/// Kinds of external services registered in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalServiceType {
    Search,
}

/// Decoded view over one encoded row.
pub trait RowReader {
    /// Value of `field`, or `Value::Null` if the row has no such field.
    fn value_by_name(&self, field: &str) -> Value;
}

/// Read access to the schema catalog.
pub trait SchemaProvider: Send + Sync {
    /// Fixed vertex id length of the space.
    fn space_vid_len(&self, space_id: SpaceId) -> Result<usize, CatalogError>;

    /// Registered service nodes of the given kind.
    fn service_clients(
        &self,
        kind: ExternalServiceType,
    ) -> Result<Vec<ServiceClient>, CatalogError>;

    fn space_name(&self, space_id: SpaceId) -> Result<String, CatalogError>;

    /// The full-text index on `schema`, if there is one.
    fn ft_index(&self, space_id: SpaceId, schema: SchemaRef) -> Option<FtIndexDef>;

    /// A reader over `value` encoded with the current schema of `schema`.
    fn row_reader(
        &self,
        space_id: SpaceId,
        schema: SchemaRef,
        value: &[u8],
    ) -> Option<Box<dyn RowReader>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_ref() {
        assert_eq!(SchemaRef::Tag(3).id(), 3);
        assert!(SchemaRef::Edge(-3).is_edge());
        assert_eq!(SchemaRef::Tag(3).to_string(), "tag 3");
        assert_eq!(SchemaRef::Edge(4).to_string(), "edge 4");
    }
}
