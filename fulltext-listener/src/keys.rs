//! Storage key layout.
//!
//! Data keys start with a little-endian `u32` holding the partition id in
//! the upper 24 bits and the key type in the low byte:
//!
//! ```text
//! tag:  prefix(4) | vid(vid_len) | tag_id(i32 le)
//! edge: prefix(4) | src(vid_len) | edge_type(i32 le) | rank(8) | dst(vid_len) | version(1)
//! ```
//!
//! Vertex ids are NUL padded to `vid_len`. The rank is stored big-endian with
//! the sign bit flipped so keys sort by rank.

use fulltext_repository::DocumentKey;

use crate::schema::SchemaRef;

const PARTITION_OFFSET: u32 = 8;
const KEY_TYPE_MASK: u32 = 0xFF;
const TAG_KEY_TYPE: u32 = 0x01;
const EDGE_KEY_TYPE: u32 = 0x02;

const PREFIX_LEN: usize = 4;
const SCHEMA_ID_LEN: usize = 4;
const RANK_LEN: usize = 8;
const EDGE_VERSION_LEN: usize = 1;
const EDGE_VERSION_PLACEHOLDER: u8 = 1;

const RANK_SIGN_BIT: u64 = 1 << 63;

/// A decoded tag or edge data key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataKey {
    Tag {
        part: u32,
        vid: Vec<u8>,
        tag_id: i32,
    },
    Edge {
        part: u32,
        src: Vec<u8>,
        edge_type: i32,
        rank: i64,
        dst: Vec<u8>,
    },
}

impl DataKey {
    /// The tag or edge type owning this key.
    pub fn schema(&self) -> SchemaRef {
        match self {
            DataKey::Tag { tag_id, .. } => SchemaRef::Tag(*tag_id),
            DataKey::Edge { edge_type, .. } => SchemaRef::Edge(*edge_type),
        }
    }

    pub fn document_key(&self) -> DocumentKey {
        match self {
            DataKey::Tag { vid, .. } => DocumentKey::vertex(vid.clone()),
            DataKey::Edge { src, dst, rank, .. } => {
                DocumentKey::edge(src.clone(), dst.clone(), *rank)
            }
        }
    }
}

/// Classifies raw storage keys.
///
/// Returns `None` for anything that is neither tag nor edge data.
pub trait KeyDecoder: Send + Sync {
    fn decode(&self, key: &[u8]) -> Option<DataKey>;
}

/// The partitioned key layout for a space with fixed-length vertex ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLayout {
    vid_len: usize,
}

impl KeyLayout {
    pub fn new(vid_len: usize) -> Self {
        Self { vid_len }
    }

    pub fn vid_len(&self) -> usize {
        self.vid_len
    }

    fn tag_key_len(&self) -> usize {
        PREFIX_LEN + self.vid_len + SCHEMA_ID_LEN
    }

    fn edge_key_len(&self) -> usize {
        PREFIX_LEN + (self.vid_len << 1) + SCHEMA_ID_LEN + RANK_LEN + EDGE_VERSION_LEN
    }

    /// Encode a tag key.
    pub fn tag_key(&self, part: u32, vid: impl AsRef<[u8]>, tag_id: i32) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.tag_key_len());
        key.extend_from_slice(&key_prefix(part, TAG_KEY_TYPE));
        self.push_vid(&mut key, vid.as_ref());
        key.extend_from_slice(&tag_id.to_le_bytes());
        key
    }

    /// Encode an edge key.
    pub fn edge_key(
        &self,
        part: u32,
        src: impl AsRef<[u8]>,
        edge_type: i32,
        rank: i64,
        dst: impl AsRef<[u8]>,
    ) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.edge_key_len());
        key.extend_from_slice(&key_prefix(part, EDGE_KEY_TYPE));
        self.push_vid(&mut key, src.as_ref());
        key.extend_from_slice(&edge_type.to_le_bytes());
        key.extend_from_slice(&encode_rank(rank));
        self.push_vid(&mut key, dst.as_ref());
        key.push(EDGE_VERSION_PLACEHOLDER);
        key
    }

    /// Pads with NULs, truncates ids longer than `vid_len`.
    fn push_vid(&self, key: &mut Vec<u8>, bytes: &[u8]) {
        let len = bytes.len().min(self.vid_len);
        key.extend_from_slice(&bytes[..len]);
        key.resize(key.len() + self.vid_len - len, 0);
    }

    /// Raw vid bytes without the NUL padding.
    ///
    /// Every vid in a space has the same padded length, so trimming keeps
    /// distinct vids distinct.
    fn read_vid(&self, key: &[u8], offset: usize) -> Vec<u8> {
        let raw = &key[offset..offset + self.vid_len];
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        raw[..end].to_vec()
    }
}

impl KeyDecoder for KeyLayout {
    fn decode(&self, key: &[u8]) -> Option<DataKey> {
        let prefix = u32::from_le_bytes(key.get(..PREFIX_LEN)?.try_into().ok()?);
        let part = prefix >> PARTITION_OFFSET;

        match prefix & KEY_TYPE_MASK {
            TAG_KEY_TYPE if key.len() == self.tag_key_len() => {
                let id_offset = PREFIX_LEN + self.vid_len;
                Some(DataKey::Tag {
                    part,
                    vid: self.read_vid(key, PREFIX_LEN),
                    tag_id: read_i32(key, id_offset)?,
                })
            }
            EDGE_KEY_TYPE if key.len() == self.edge_key_len() => {
                let type_offset = PREFIX_LEN + self.vid_len;
                let rank_offset = type_offset + SCHEMA_ID_LEN;
                let dst_offset = rank_offset + RANK_LEN;
                Some(DataKey::Edge {
                    part,
                    src: self.read_vid(key, PREFIX_LEN),
                    edge_type: read_i32(key, type_offset)?,
                    rank: decode_rank(key.get(rank_offset..dst_offset)?)?,
                    dst: self.read_vid(key, dst_offset),
                })
            }
            _ => None,
        }
    }
}

fn key_prefix(part: u32, key_type: u32) -> [u8; PREFIX_LEN] {
    ((part << PARTITION_OFFSET) | key_type).to_le_bytes()
}

fn read_i32(key: &[u8], offset: usize) -> Option<i32> {
    let bytes = key.get(offset..offset + SCHEMA_ID_LEN)?;
    Some(i32::from_le_bytes(bytes.try_into().ok()?))
}

fn encode_rank(rank: i64) -> [u8; RANK_LEN] {
    ((rank as u64) ^ RANK_SIGN_BIT).to_be_bytes()
}

fn decode_rank(bytes: &[u8]) -> Option<i64> {
    let raw = u64::from_be_bytes(bytes.try_into().ok()?);
    Some((raw ^ RANK_SIGN_BIT) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_key_round_trip() {
        let layout = KeyLayout::new(8);
        let key = layout.tag_key(3, "v1", 7);
        assert_eq!(key.len(), 16);
        assert_eq!(&key[..4], &[0x01, 0x03, 0x00, 0x00]);

        assert_eq!(
            layout.decode(&key),
            Some(DataKey::Tag {
                part: 3,
                vid: b"v1".to_vec(),
                tag_id: 7
            })
        );
    }

    #[test]
    fn test_edge_key_round_trip_with_negative_rank() {
        let layout = KeyLayout::new(8);
        let key = layout.edge_key(1, "alice", -5, -42, "bob");
        assert_eq!(key.len(), 4 + 8 + 4 + 8 + 8 + 1);

        match layout.decode(&key) {
            Some(DataKey::Edge {
                part,
                src,
                edge_type,
                rank,
                dst,
            }) => {
                assert_eq!(part, 1);
                assert_eq!(src, b"alice");
                assert_eq!(edge_type, -5);
                assert_eq!(rank, -42);
                assert_eq!(dst, b"bob");
            }
            other => panic!("expected edge key, got {:?}", other),
        }
    }

    #[test]
    fn test_rank_encoding_sorts() {
        assert!(encode_rank(-1) < encode_rank(0));
        assert!(encode_rank(0) < encode_rank(1));
        assert!(encode_rank(i64::MIN) < encode_rank(i64::MAX));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let layout = KeyLayout::new(8);
        assert_eq!(layout.decode(b""), None);
        assert_eq!(layout.decode(b"abc"), None);

        // Right type byte, wrong length.
        let mut key = layout.tag_key(1, "v1", 2);
        key.push(0);
        assert_eq!(layout.decode(&key), None);

        // Tag-sized key with a different type byte.
        let mut key = layout.tag_key(1, "v1", 2);
        key[0] = 0x03;
        assert_eq!(layout.decode(&key), None);

        // A tag key read with another vid length.
        let key = KeyLayout::new(16).tag_key(1, "v1", 2);
        assert_eq!(layout.decode(&key), None);
    }

    #[test]
    fn test_long_vid_is_truncated() {
        let layout = KeyLayout::new(4);
        let key = layout.tag_key(0, "abcdef", 1);
        match layout.decode(&key) {
            Some(DataKey::Tag { vid, .. }) => assert_eq!(vid, b"abcd"),
            other => panic!("expected tag key, got {:?}", other),
        }
    }

    #[test]
    fn test_data_key_schema_and_document() {
        let tag = DataKey::Tag {
            part: 1,
            vid: b"v1".to_vec(),
            tag_id: 2,
        };
        assert_eq!(tag.schema(), SchemaRef::Tag(2));
        assert_eq!(tag.document_key(), DocumentKey::vertex("v1"));

        let edge = DataKey::Edge {
            part: 1,
            src: b"a".to_vec(),
            edge_type: 5,
            rank: 9,
            dst: b"b".to_vec(),
        };
        assert_eq!(edge.schema(), SchemaRef::Edge(5));
        assert_eq!(edge.document_key(), DocumentKey::edge("a", "b", 9));
    }

    #[test]
    fn test_integer_vids_decode_to_distinct_documents() {
        let layout = KeyLayout::new(8);
        let decode = |vid: i64| {
            let key = layout.tag_key(1, vid.to_le_bytes(), 2);
            match layout.decode(&key) {
                Some(key) => key,
                None => panic!("expected tag key for vid {}", vid),
            }
        };

        let a = decode(128);
        let b = decode(129);
        assert_eq!(
            a,
            DataKey::Tag {
                part: 1,
                vid: vec![0x80],
                tag_id: 2
            }
        );
        assert_ne!(a.document_key().doc_id(), b.document_key().doc_id());

        // Inner zero bytes survive, only the trailing padding goes.
        assert_eq!(
            decode(0x0100).document_key(),
            DocumentKey::vertex(vec![0x00u8, 0x01])
        );
    }

    #[test]
    fn test_non_utf8_edge_vids_are_kept() {
        let layout = KeyLayout::new(4);
        let key = layout.edge_key(0, [0xffu8, 0xfe], 3, 1, [0xffu8, 0xfd]);
        match layout.decode(&key) {
            Some(DataKey::Edge { src, dst, .. }) => {
                assert_eq!(src, vec![0xff, 0xfe]);
                assert_eq!(dst, vec![0xff, 0xfd]);
            }
            other => panic!("expected edge key, got {:?}", other),
        }
    }
}
