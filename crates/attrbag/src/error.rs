use thiserror::Error;

use crate::codec::CodecError;
use crate::model::{ColumnKey, FieldNameError};
use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum AttrError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Codec error in {key}: {source}")]
    Codec {
        key: ColumnKey,
        #[source]
        source: CodecError,
    },

    #[error("Invalid field name: {0}")]
    InvalidFieldName(#[from] FieldNameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, AttrError>;
