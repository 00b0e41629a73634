use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the generator crate.
pub type GenResult<T> = Result<T, GenError>;

/// A type shape the dispatcher cannot copy safely.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
  #[error("unsupported shape '{decl}': {reason}")]
  Unsupported { decl: String, reason: &'static str },

  #[error("'{decl}' requires a length association")]
  MissingLength { decl: String },
}

/// Fatal generation-time errors. Every variant names the offending type (and member where relevant).
#[derive(Debug, Error)]
pub enum GenError {
  #[error("failed to read registry '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse registry '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yml::Error,
  },

  #[error("type '{name}' is defined more than once")]
  DuplicateType { name: String },

  #[error("command '{name}' is defined more than once")]
  DuplicateCommand { name: String },

  #[error("'{owner}' references unknown type '{type_name}'")]
  UnknownType { owner: String, type_name: String },

  #[error("alias cycle detected: {}", chain.join(" -> "))]
  AliasCycle { chain: Vec<String> },

  #[error("type '{type_name}' has invalid comment: contains '*/' which terminates C-style comments prematurely")]
  InvalidComment { type_name: String },

  #[error("{owner}.{member}: length field '{field}' is not a member of '{owner}'")]
  UnknownLengthField {
    owner: String,
    member: String,
    field: String,
  },

  #[error("{owner}.{member}: {reason}")]
  InvalidMember {
    owner: String,
    member: String,
    reason: &'static str,
  },

  #[error("type '{type_name}' is not a struct or union")]
  NotComposite { type_name: String },

  #[error("cannot emit deep copy for {owner}.{member}: {source}")]
  Dispatch {
    owner: String,
    member: String,
    #[source]
    source: ShapeError,
  },

  #[error("failed to write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
