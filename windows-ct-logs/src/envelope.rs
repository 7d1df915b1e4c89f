//! Unwrapping of the PKCS#7 `SignedData` envelope.
//!
//! Only the path down to the encapsulated content is walked:
//!
//! ```asn1
//! ContentInfo ::= SEQUENCE {
//!   contentType ContentType,
//!   content [0] EXPLICIT SignedData
//! }
//!
//! SignedData ::= SEQUENCE {
//!   version Version,
//!   digestAlgorithms DigestAlgorithmIdentifiers,
//!   contentInfo SEQUENCE {
//!     contentType ContentType,
//!     content [0] EXPLICIT ANY
//!   },
//!   ...
//! }
//! ```
//!
//! Certificates, CRLs and signer infos are never looked at; the signature
//! is not verified. The encapsulated content may carry any tag except a
//! high-tag-number form.

use der::asn1::ObjectIdentifier;
use der::Tag;

use crate::cursor::{Cursor, CONTEXT_0};
use crate::error::{DecodeError, ErrorKind, FieldError, Stage};

/// PKCS#7 `signedData` content type.
pub const ID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// The content type of a Microsoft certificate trust list (`szOID_CTL`).
pub const MS_CERT_TRUST_LIST_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.1");

/// The encapsulated content of a `SignedData`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedContent<'a> {
    /// The encapsulated content type.
    pub content_type: ObjectIdentifier,
    /// The complete DER encoding of the encapsulated content.
    pub content: &'a [u8],
}

fn expect_oid(
    cursor: &mut Cursor<'_>,
    expected: ObjectIdentifier,
    field: &'static str,
) -> Result<ObjectIdentifier, FieldError> {
    let actual = cursor.read_object_identifier(field)?;
    if actual != expected {
        return Err(FieldError::new(
            field,
            ErrorKind::UnexpectedOid { expected, actual },
        ));
    }
    Ok(actual)
}

fn decode_signed_content(der: &[u8]) -> Result<SignedContent<'_>, FieldError> {
    let mut input = Cursor::new(der);
    let mut content_info = input.read_sequence("ContentInfo")?;
    input.finish("ContentInfo")?;

    expect_oid(&mut content_info, ID_SIGNED_DATA, "ContentInfo contentType")?;
    let mut explicit = content_info.read_constructed(CONTEXT_0, "ContentInfo content")?;
    let mut signed_data = explicit.read_sequence("SignedData")?;

    signed_data.skip(Tag::Integer, "SignedData version")?;
    signed_data.skip(Tag::Set, "SignedData digestAlgorithms")?;

    let mut encapsulated = signed_data.read_sequence("SignedData contentInfo")?;
    let content_type = expect_oid(
        &mut encapsulated,
        MS_CERT_TRUST_LIST_OID,
        "SignedData contentInfo contentType",
    )?;
    let mut explicit = encapsulated.read_constructed(CONTEXT_0, "SignedData contentInfo content")?;
    let content = explicit.read_any_element("SignedData contentInfo content")?;
    explicit.finish("SignedData contentInfo content")?;

    Ok(SignedContent {
        content_type,
        content,
    })
}

/// Unwraps a DER-encoded PKCS#7 `SignedData` carrying a certificate trust
/// list, returning the encapsulated content.
pub fn decode(der: &[u8]) -> Result<SignedContent<'_>, DecodeError> {
    decode_signed_content(der).map_err(|err| DecodeError::new(Stage::Pkcs7, err))
}
