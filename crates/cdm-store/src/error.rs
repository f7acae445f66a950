#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open store {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create schema: {source}")]
    Schema {
        #[source]
        source: rusqlite::Error,
    },

    #[error("write to {table} failed: {source}")]
    WriteFailure {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read {what}: {source}")]
    Read {
        what: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("transaction failed: {source}")]
    Transaction {
        #[source]
        source: rusqlite::Error,
    },

    #[error("unknown table '{0}'")]
    UnknownTable(String),
}

impl StoreError {
    pub(crate) fn write(table: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::WriteFailure { table, source }
    }

    pub(crate) fn read(what: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Read { what, source }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
