//! Catalog stand-ins shared by the listener tests.

use std::collections::HashMap;

use fulltext_shared::{ServiceClient, Value};

use crate::errors::CatalogError;
use crate::schema::{ExternalServiceType, FtIndexDef, RowReader, SchemaProvider, SchemaRef, SpaceId};

pub const SPACE: SpaceId = 1;
pub const VID_LEN: usize = 8;
pub const PERSON_TAG: i32 = 2;
pub const FOLLOW_EDGE: i32 = 5;

/// Rows are `field=value` pairs separated by `;`. A value starting with `#`
/// is an integer.
pub fn encode_row(fields: &[(&str, &str)]) -> Vec<u8> {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(";")
        .into_bytes()
}

struct MockRow(HashMap<String, Value>);

impl MockRow {
    fn decode(value: &[u8]) -> Self {
        let text = String::from_utf8_lossy(value);
        let fields = text
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| {
                let value = match v.strip_prefix('#').map(str::parse::<i64>) {
                    Some(Ok(n)) => Value::Int(n),
                    _ => Value::from(v),
                };
                (k.to_string(), value)
            })
            .collect();
        Self(fields)
    }
}

impl RowReader for MockRow {
    fn value_by_name(&self, field: &str) -> Value {
        self.0.get(field).cloned().unwrap_or_default()
    }
}

pub struct MockSchema {
    pub vid_len: Option<usize>,
    pub clients: Vec<ServiceClient>,
    pub space_name: Option<String>,
    pub indexes: HashMap<SchemaRef, FtIndexDef>,
    pub readable: bool,
}

impl MockSchema {
    /// Space `S` with one search node, `idx_person` on `person.name` and
    /// `idx_follow` on `follow.note`.
    pub fn new() -> Self {
        let mut indexes = HashMap::new();
        indexes.insert(
            SchemaRef::Tag(PERSON_TAG),
            FtIndexDef::new("idx_person", "name"),
        );
        indexes.insert(
            SchemaRef::Edge(FOLLOW_EDGE),
            FtIndexDef::new("idx_follow", "note"),
        );
        Self {
            vid_len: Some(VID_LEN),
            clients: vec![ServiceClient {
                host: "127.0.0.1:9200".to_string(),
                ..ServiceClient::default()
            }],
            space_name: Some("S".to_string()),
            indexes,
            readable: true,
        }
    }
}

impl SchemaProvider for MockSchema {
    fn space_vid_len(&self, space_id: SpaceId) -> Result<usize, CatalogError> {
        self.vid_len
            .ok_or_else(|| CatalogError::new(format!("space {} not found", space_id)))
    }

    fn service_clients(
        &self,
        _kind: ExternalServiceType,
    ) -> Result<Vec<ServiceClient>, CatalogError> {
        Ok(self.clients.clone())
    }

    fn space_name(&self, space_id: SpaceId) -> Result<String, CatalogError> {
        self.space_name
            .clone()
            .ok_or_else(|| CatalogError::new(format!("space {} not found", space_id)))
    }

    fn ft_index(&self, _space_id: SpaceId, schema: SchemaRef) -> Option<FtIndexDef> {
        self.indexes.get(&schema).cloned()
    }

    fn row_reader(
        &self,
        _space_id: SpaceId,
        _schema: SchemaRef,
        value: &[u8],
    ) -> Option<Box<dyn RowReader>> {
        if !self.readable {
            return None;
        }
        Some(Box::new(MockRow::decode(value)))
    }
}
