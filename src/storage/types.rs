use std::path::PathBuf;

/// Declaration of a named record collection and the field that keys it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name, unique within a database
    pub name: &'static str,
    /// Top-level record field whose string value is the record key
    pub key_path: &'static str,
}

impl CollectionSpec {
    /// Declare a collection keyed by `key_path`
    pub const fn new(name: &'static str, key_path: &'static str) -> Self {
        Self { name, key_path }
    }
}

/// Where a store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Each database lives in `<dir>/<name>`
    Directory(PathBuf),
    /// Throwaway database removed when the last handle drops
    Temporary,
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was written
    Written,
    /// Another record already holds the target key; nothing was written
    KeyTaken,
}
