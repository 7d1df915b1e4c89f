//! The certificate trust list body.
//!
//! From [MS-CAESO], pages 47-48, narrowed to the shape Windows Update
//! actually publishes (no `version`, `listIdentifier` or `ctlNextUpdate`):
//!
//! ```asn1
//! CertificateTrustList ::= SEQUENCE {
//!   subjectUsage SubjectUsage,
//!   sequenceNumber HUGEINTEGER,
//!   ctlThisUpdate ChoiceOfTime,
//!   subjectAlgorithm AlgorithmIdentifier,
//!   trustedSubjects TrustedSubjects,
//!   ctlExtensions [0] EXPLICIT Extensions OPTIONAL
//! }
//! ```
//!
//! The trusted subjects themselves are skipped: only the list-level CT log
//! extension is of interest here.
//!
//! [MS-CAESO]: https://yossarian.net/junk/hard_to_find/ms-caeso-v20090709.pdf

use der::Tag;
use log::debug;

use crate::ctlogs::{self, MS_CT_LOG_LIST_OID};
use crate::cursor::{Cursor, CONTEXT_0};
use crate::error::{Cause, DecodeError, Stage};
use crate::TrustList;

fn decode_trust_list(der: &[u8]) -> Result<TrustList, Cause> {
    let mut input = Cursor::new(der);
    let mut body = input.read_sequence("CertificateTrustList")?;
    input.finish("CertificateTrustList")?;

    body.skip(Tag::Sequence, "subjectUsage")?;
    let sequence_number = body.read_integer("sequenceNumber")?;
    let effective_date = body.read_utc_time("ctlThisUpdate")?;
    body.skip(Tag::Sequence, "subjectAlgorithm")?;
    body.skip(Tag::Sequence, "trustedSubjects")?;

    let mut trust_list = TrustList {
        sequence_number,
        effective_date,
        log_list_version: vec![],
        logs: vec![],
    };

    let Some(mut explicit) = body.read_optional(CONTEXT_0, "ctlExtensions")? else {
        body.finish("CertificateTrustList")?;
        return Ok(trust_list);
    };
    body.finish("CertificateTrustList")?;

    let mut extensions = explicit.read_sequence("Extensions")?;
    explicit.finish("ctlExtensions")?;

    while !extensions.is_empty() {
        let mut extension = extensions.read_sequence("Extension")?;
        let id = extension.read_object_identifier("extnID")?;
        extension.skip_optional(Tag::Boolean, "critical")?;
        let value = extension.read_octet_string("extnValue")?;
        extension.finish("Extension")?;

        if id == MS_CT_LOG_LIST_OID {
            let list = ctlogs::decode(value)?;
            debug!(
                "CT log list version {:?} with {} log(s)",
                list.version,
                list.logs.len()
            );
            trust_list.log_list_version = list.version;
            trust_list.logs = list.logs;
        } else {
            debug!("skipping CTL extension {id}");
        }
    }

    Ok(trust_list)
}

/// Decodes a DER-encoded `CertificateTrustList`.
///
/// The buffer must hold exactly one `CertificateTrustList`; anything after it
/// is an error.
pub fn decode(der: &[u8]) -> Result<TrustList, DecodeError> {
    decode_trust_list(der).map_err(|cause| DecodeError::new(Stage::Ctl, cause))
}
