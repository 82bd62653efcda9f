//! Document identity.
//!
//! The document id is the search engine's primary key for one indexed
//! property value. It is a pure function of the vertex id or of the edge
//! triple, so replaying a mutation always targets the same document.

use std::borrow::Cow;

use md5::{Digest, Md5};

const VERTEX_TAG: u8 = b'v';
const EDGE_TAG: u8 = b'e';

/// Identity of the graph element a document belongs to.
///
/// Vertex ids are raw key bytes. String vids are UTF-8, integer vids are
/// their little-endian encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Vertex { vid: Vec<u8> },
    Edge { src: Vec<u8>, dst: Vec<u8>, rank: i64 },
}

impl DocumentKey {
    pub fn vertex(vid: impl Into<Vec<u8>>) -> Self {
        Self::Vertex { vid: vid.into() }
    }

    pub fn edge(src: impl Into<Vec<u8>>, dst: impl Into<Vec<u8>>, rank: i64) -> Self {
        Self::Edge {
            src: src.into(),
            dst: dst.into(),
            rank,
        }
    }

    /// Hex MD5 of a tagged encoding of the identity tuple.
    ///
    /// Vertex input is `'v' ++ vid`. Edge input is
    /// `'e' ++ len(src) ++ src ++ len(dst) ++ dst ++ rank` with u32/i64
    /// little-endian lengths and rank.
    pub fn doc_id(&self) -> String {
        let mut hasher = Md5::new();
        match self {
            DocumentKey::Vertex { vid } => {
                hasher.update([VERTEX_TAG]);
                hasher.update(vid);
            }
            DocumentKey::Edge { src, dst, rank } => {
                hasher.update([EDGE_TAG]);
                hasher.update((src.len() as u32).to_le_bytes());
                hasher.update(src);
                hasher.update((dst.len() as u32).to_le_bytes());
                hasher.update(dst);
                hasher.update(rank.to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }

    /// `(vid, src, dst, rank)` as stored in the document body.
    pub fn fields(&self) -> (Cow<'_, str>, Cow<'_, str>, Cow<'_, str>, i64) {
        match self {
            DocumentKey::Vertex { vid } => (id_text(vid), Cow::Borrowed(""), Cow::Borrowed(""), 0),
            DocumentKey::Edge { src, dst, rank } => {
                (Cow::Borrowed(""), id_text(src), id_text(dst), *rank)
            }
        }
    }
}

/// Text form of a vertex id for document fields.
///
/// UTF-8 ids are kept as is; anything else is hex encoded. Only the document
/// id identifies the element, this is for display and filtering.
pub fn id_text(id: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(id) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(hex::encode(id)),
    }
}
