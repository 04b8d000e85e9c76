//! Error types for handsfree
//!
//! Recognition failures (undecodable numbers, unparsable phrases) are ordinary
//! outcomes of noisy input and get their own small enums. `HandsfreeError`
//! covers everything at the I/O, JSON and configuration boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::OperatorKind;

/// Errors that can occur outside the pure recognition core
#[derive(Debug, Error)]
pub enum HandsfreeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid landmark frame: {0}")]
    InvalidFrame(String),

    #[error("Unsupported tracking mode: {0}")]
    UnsupportedMode(String),
}

/// Why a phrase could not be decoded into a number
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("nothing to decode")]
    Empty,

    #[error("unknown number word: {0}")]
    UnknownToken(String),

    #[error("invalid fractional digit: {0}")]
    InvalidFraction(String),

    #[error("number out of range: {0}")]
    OutOfRange(String),
}

/// Why a transcript did not yield an arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseFailure {
    #[error("transcript is empty")]
    EmptyInput,

    #[error("no operator found in transcript")]
    NoOperator,

    #[error("operands around {operator:?} could not be decoded")]
    UndecodableOperands { operator: OperatorKind },
}
