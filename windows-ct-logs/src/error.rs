//! Decode errors.
//!
//! Every failure is attributed to the [`Stage`] of the pipeline that hit it
//! and, at the bottom of the chain, to the field the cursor was reading when
//! the input stopped making sense.

use std::fmt;

use der::asn1::ObjectIdentifier;
use der::Tag;
use thiserror::Error;

/// The pipeline stage a [`DecodeError`] originated in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// The PKCS#7 `SignedData` envelope.
    Pkcs7,
    /// The `CertificateTrustList` body.
    Ctl,
    /// The CT log list carried in the CTL's extensions.
    CtLogs,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Pkcs7 => f.write_str("PKCS#7"),
            Stage::Ctl => f.write_str("CTL"),
            Stage::CtLogs => f.write_str("CT logs extension"),
        }
    }
}

/// What was wrong with a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The element carries a different tag than the schema requires.
    UnexpectedTag {
        /// The tag the schema requires here.
        expected: Tag,
        /// The tag actually found.
        actual: Tag,
    },

    /// The identifier octet is outside the DER subset we understand.
    UnknownTag {
        /// The offending identifier octet.
        byte: u8,
    },

    /// A content type OID other than the one the envelope must carry.
    UnexpectedOid {
        /// The OID the envelope must carry here.
        expected: ObjectIdentifier,
        /// The OID actually found.
        actual: ObjectIdentifier,
    },

    /// A declared length runs past the end of the input, is not a definite
    /// minimal DER length, or the input ends where an element was expected.
    Length,

    /// Bytes remain after a structure that must be self-contained.
    TrailingData {
        /// Number of unconsumed bytes.
        remaining: usize,
    },

    /// An INTEGER does not fit the field it is decoded into.
    OutOfRange,

    /// The value is not a valid DER encoding of its type.
    Value,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnexpectedTag { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            ErrorKind::UnknownTag { byte } => write!(f, "unsupported tag 0x{byte:02x}"),
            ErrorKind::UnexpectedOid { expected, actual } => {
                write!(f, "expected {expected}, found {actual}")
            }
            ErrorKind::Length => f.write_str("bad or truncated length"),
            ErrorKind::TrailingData { remaining } => {
                write!(f, "{remaining} trailing byte(s)")
            }
            ErrorKind::OutOfRange => f.write_str("INTEGER out of range"),
            ErrorKind::Value => f.write_str("malformed value"),
        }
    }
}

/// A single malformed field, as reported by [`Cursor`](crate::cursor::Cursor).
#[derive(Debug, Error)]
#[error("{field}: {kind}")]
pub struct FieldError {
    field: &'static str,
    kind: ErrorKind,
    source: Option<der::Error>,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, kind: ErrorKind) -> Self {
        Self {
            field,
            kind,
            source: None,
        }
    }

    /// Classifies an error from the `der` crate.
    pub(crate) fn der(field: &'static str, err: der::Error) -> Self {
        let kind = match err.kind() {
            der::ErrorKind::Incomplete { .. }
            | der::ErrorKind::IndefiniteLength
            | der::ErrorKind::Length { .. }
            | der::ErrorKind::Overflow
            | der::ErrorKind::Overlength => ErrorKind::Length,
            der::ErrorKind::TagUnknown { byte } => ErrorKind::UnknownTag { byte },
            _ => ErrorKind::Value,
        };

        Self {
            field,
            kind,
            source: Some(err),
        }
    }

    /// The name of the field being decoded.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// What was wrong with it.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug, Error)]
pub(crate) enum Cause {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Nested(Box<DecodeError>),
}

impl From<DecodeError> for Cause {
    fn from(err: DecodeError) -> Self {
        Cause::Nested(Box::new(err))
    }
}

/// A failure to decode a trust list.
///
/// `Display` names only the outermost stage; the rest of the chain is
/// reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("error parsing {stage}")]
pub struct DecodeError {
    stage: Stage,
    #[source]
    cause: Cause,
}

impl DecodeError {
    pub(crate) fn new(stage: Stage, cause: impl Into<Cause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }

    /// The outermost stage that failed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The kind of the innermost failure.
    pub fn kind(&self) -> ErrorKind {
        self.innermost().kind()
    }

    /// The field the innermost failure was reported against.
    pub fn field(&self) -> &'static str {
        self.innermost().field()
    }

    fn innermost(&self) -> &FieldError {
        match &self.cause {
            Cause::Field(err) => err,
            Cause::Nested(err) => err.innermost(),
        }
    }
}
