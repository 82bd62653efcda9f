//! Committed log batches as delivered to the listener.

use crate::offset::ApplyOffset;

/// Operation of one log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Put,
    Remove,
}

/// One `(operation, key, value)` entry of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub op: BatchOp,
    pub key: Vec<u8>,
    /// Encoded row. Empty for removes.
    pub value: Vec<u8>,
}

impl LogRecord {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            op: BatchOp::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<Vec<u8>>) -> Self {
        Self {
            op: BatchOp::Remove,
            key: key.into(),
            value: Vec::new(),
        }
    }
}

/// A batch together with the log position it brings the listener to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBatch {
    pub offset: ApplyOffset,
    pub records: Vec<LogRecord>,
}

impl LogBatch {
    pub fn new(offset: ApplyOffset, records: Vec<LogRecord>) -> Self {
        Self { offset, records }
    }
}
