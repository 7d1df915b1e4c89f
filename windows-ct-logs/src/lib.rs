//! A crate for extracting the Certificate Transparency logs recognized by
//! Windows.
//!
//! Windows Update publishes its root program as a Certificate Trust List
//! (CTL): a PKCS#7 `SignedData` wrapping a Microsoft-specific
//! `CertificateTrustList`, itself shipped inside a cabinet archive
//! (`authrootstl.cab`). One of the CTL's extensions lists the public keys of
//! the CT logs Windows trusts; this crate decodes that list.
//!
//! ```no_run
//! # fn main() -> Result<(), windows_ct_logs::CtlError> {
//! let der = std::fs::read("authroot.stl")?;
//! let ctl = windows_ct_logs::decode(&der)?;
//! for id in ctl.log_ids() {
//!     println!("{id:02x?}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![allow(clippy::redundant_field_names)]
#![forbid(unsafe_code)]

use std::io::Read;
#[cfg(feature = "cab")]
use std::io::Seek;

use der::asn1::Uint;
#[cfg(feature = "serde")]
use serde::ser::SerializeStruct;
#[cfg(feature = "serde")]
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

pub mod ctl;
pub mod ctlogs;
pub mod cursor;
pub mod envelope;
pub mod error;

pub use error::{DecodeError, ErrorKind, FieldError, Stage};

/// The name of the trust list inside `authrootstl.cab`.
pub const AUTHROOT_STL: &str = "authroot.stl";

/// Possible errors while loading a trust list.
#[derive(Debug, Error)]
pub enum CtlError {
    /// I/O errors.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The trust list itself is malformed.
    #[error("invalid trust list")]
    Decode(#[from] DecodeError),
}

/// The CT log list published in a certificate trust list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrustList {
    /// The publisher's version stamp for this list.
    pub sequence_number: Uint,

    /// When this list was produced/released, in UTC.
    pub effective_date: OffsetDateTime,

    /// The version tag(s) of the CT log list, in encoded order. Empty if the
    /// CTL carries no CT log list.
    pub log_list_version: Vec<i32>,

    /// The DER-encoded `SubjectPublicKeyInfo` of each recognized log, in
    /// encoded order. Empty if the CTL carries no CT log list.
    pub logs: Vec<Vec<u8>>,
}

/// Returns the CT log ID (RFC 6962 §3.2) for a DER-encoded
/// `SubjectPublicKeyInfo`: its SHA-256 digest.
pub fn log_id(spki: &[u8]) -> [u8; 32] {
    Sha256::digest(spki).into()
}

/// Decodes a DER-encoded PKCS#7 `SignedData` carrying a certificate trust
/// list (the contents of `authroot.stl`).
pub fn decode(der: &[u8]) -> Result<TrustList, DecodeError> {
    log::trace!("decoding {} byte(s) of PKCS#7", der.len());
    let signed = envelope::decode(der)?;

    log::trace!(
        "decoding {} byte(s) of {} content",
        signed.content.len(),
        signed.content_type
    );
    ctl::decode(signed.content)
}

/// Extracts the DER-encoded trust list from a
/// [Cabinet Format](https://learn.microsoft.com/en-us/windows/win32/msi/cabinet-files)
/// archive such as `authrootstl.cab`.
#[cfg(feature = "cab")]
pub fn extract_der<R: Read + Seek>(source: R) -> Result<Vec<u8>, CtlError> {
    let mut cabinet = cab::Cabinet::new(source)?;

    // We expect the actual STL to be at "authroot.stl" inside an STL
    // cabinet file, and nowhere else.
    let mut der = vec![];
    cabinet.read_file(AUTHROOT_STL)?.read_to_end(&mut der)?;
    Ok(der)
}

impl TrustList {
    /// Load a `TrustList` from the given source, which is expected to be a
    /// DER-encoded PKCS#7 stream.
    pub fn from_der<R: Read>(mut source: R) -> Result<Self, CtlError> {
        let mut der = vec![];
        source.read_to_end(&mut der)?;

        Ok(decode(&der)?)
    }

    /// Load a `TrustList` from the given source, which is expected to be a
    /// Cabinet Format stream containing `authroot.stl`.
    #[cfg(feature = "cab")]
    pub fn from_cab<R: Read + Seek>(source: R) -> Result<Self, CtlError> {
        let der = extract_der(source)?;

        Ok(decode(&der)?)
    }

    /// Returns an iterator over the CT log ID of each entry in
    /// [`TrustList::logs`].
    pub fn log_ids(&self) -> impl Iterator<Item = [u8; 32]> + '_ {
        self.logs.iter().map(|spki| log_id(spki))
    }
}

#[cfg(feature = "serde")]
struct SerializedLog<'a>(&'a [u8]);

#[cfg(feature = "serde")]
impl Serialize for SerializedLog<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;

        let mut s = serializer.serialize_struct("Log", 2)?;
        s.serialize_field("id", &STANDARD.encode(log_id(self.0)))?;
        s.serialize_field("key", &STANDARD.encode(self.0))?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl Serialize for TrustList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use time::format_description::well_known::Rfc3339;

        let effective_date = self
            .effective_date
            .format(&Rfc3339)
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        let logs = self
            .logs
            .iter()
            .map(|spki| SerializedLog(spki))
            .collect::<Vec<_>>();

        let mut s = serializer.serialize_struct("TrustList", 4)?;
        s.serialize_field(
            "sequence_number",
            &hex::encode(self.sequence_number.as_bytes()),
        )?;
        s.serialize_field("effective_date", &effective_date)?;
        s.serialize_field("log_list_version", &self.log_list_version)?;
        s.serialize_field("logs", &logs)?;
        s.end()
    }
}
