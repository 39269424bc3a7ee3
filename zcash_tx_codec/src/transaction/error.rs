//! Errors produced by the transaction codec and digest engine.

use std::fmt;

/// Errors that can occur while decoding, encoding, or hashing a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The transaction header names a version outside of v2 to v5, or its overwintered
    /// flag disagrees with the version.
    UnsupportedVersion(u32),
    /// The input ended while reading the named field.
    UnexpectedEof { field: &'static str },
    /// A length or count field was non-canonical, exceeded the protocol maximum, or
    /// described a region too large to address.
    MalformedLength { field: &'static str },
    /// Bytes remained after a complete transaction was decoded.
    TrailingData { remaining: usize },
    /// The transaction carries shielded content that was discarded at decode time, so it
    /// can be neither re-encoded nor committed to by a digest.
    UnsupportedReencode,
    /// The named field holds a value that the transaction's version does not encode, so
    /// decoding the encoding would not reproduce the transaction.
    UnencodableField { field: &'static str },
    /// A signature hash was requested for an input that does not exist.
    InputIndexOutOfRange { index: usize, inputs: usize },
    /// The previous output values or scripts supplied for signing do not have one entry
    /// per transaction input.
    MismatchedAuxData {
        inputs: usize,
        values: usize,
        scripts: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedVersion(header) => {
                write!(f, "unsupported transaction version (header {header:#010x})")
            }
            Error::UnexpectedEof { field } => write!(f, "unexpected end of input reading {field}"),
            Error::MalformedLength { field } => write!(f, "malformed length for {field}"),
            Error::TrailingData { remaining } => {
                write!(f, "{remaining} bytes remain after the transaction")
            }
            Error::UnsupportedReencode => write!(
                f,
                "transaction contains shielded data that was discarded during decoding",
            ),
            Error::UnencodableField { field } => {
                write!(f, "{field} cannot be encoded at this transaction version")
            }
            Error::InputIndexOutOfRange { index, inputs } => write!(
                f,
                "input index {index} is out of range for a transaction with {inputs} inputs",
            ),
            Error::MismatchedAuxData {
                inputs,
                values,
                scripts,
            } => write!(
                f,
                "expected {inputs} previous outputs, got {values} values and {scripts} scripts",
            ),
        }
    }
}

impl std::error::Error for Error {}
