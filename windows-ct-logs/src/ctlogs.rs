//! The CT log list carried as a CTL extension.
//!
//! Microsoft doesn't document this one. As observed in `authroot.stl`:
//!
//! ```asn1
//! CtLogList ::= SEQUENCE {
//!   version SEQUENCE OF INTEGER,
//!   logs    SubjectPublicKeyInfo ...
//! }
//! ```
//!
//! i.e. every element after the version list is a log's public key.

use der::asn1::ObjectIdentifier;
use der::Tag;

use crate::cursor::Cursor;
use crate::error::{DecodeError, FieldError, Stage};

/// The OID of the CTL extension listing recognized CT logs.
pub const MS_CT_LOG_LIST_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.52");

/// A decoded CT log list extension.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CtLogList {
    /// The list's version tag(s), in encoded order.
    pub version: Vec<i32>,
    /// The DER encoding of each log's `SubjectPublicKeyInfo`, unparsed.
    pub logs: Vec<Vec<u8>>,
}

fn decode_log_list(der: &[u8]) -> Result<CtLogList, FieldError> {
    let mut input = Cursor::new(der);
    let mut list = input.read_sequence("CtLogList")?;
    input.finish("CtLogList")?;

    let mut versions = list.read_sequence("CtLogList version")?;
    let mut version = vec![];
    while !versions.is_empty() {
        version.push(versions.read_integer_i32("CtLogList version INTEGER")?);
    }

    let mut logs = vec![];
    while !list.is_empty() {
        let spki = list.read_element(Tag::Sequence, "SubjectPublicKeyInfo")?;
        logs.push(spki.to_vec());
    }

    Ok(CtLogList { version, logs })
}

/// Decodes the value of a [`MS_CT_LOG_LIST_OID`] extension.
pub fn decode(der: &[u8]) -> Result<CtLogList, DecodeError> {
    decode_log_list(der).map_err(|err| DecodeError::new(Stage::CtLogs, err))
}
