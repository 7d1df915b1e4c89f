//! A minimal DER encoder for building trust lists in tests.

#![allow(dead_code)]

use der::asn1::ObjectIdentifier;
use time::OffsetDateTime;

pub const SIGNED_DATA: &str = "1.2.840.113549.1.7.2";
pub const CERT_TRUST_LIST: &str = "1.3.6.1.4.1.311.10.1";
pub const CT_LOG_LIST: &str = "1.3.6.1.4.1.311.10.3.52";
pub const ROOT_LIST_SIGNER: &str = "1.3.6.1.4.1.311.10.3.9";

pub fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    let len = value.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        out.push(0x80 | (bytes.len() - skip) as u8);
        out.extend_from_slice(&bytes[skip..]);
    }
    out.extend_from_slice(value);
    out
}

pub fn seq(parts: &[&[u8]]) -> Vec<u8> {
    tlv(0x30, &parts.concat())
}

pub fn set(parts: &[&[u8]]) -> Vec<u8> {
    tlv(0x31, &parts.concat())
}

pub fn explicit0(inner: &[u8]) -> Vec<u8> {
    tlv(0xa0, inner)
}

pub fn null() -> Vec<u8> {
    vec![0x05, 0x00]
}

pub fn oid(dotted: &str) -> Vec<u8> {
    tlv(0x06, ObjectIdentifier::new(dotted).unwrap().as_bytes())
}

pub fn octet_string(value: &[u8]) -> Vec<u8> {
    tlv(0x04, value)
}

/// A non-negative INTEGER from its big-endian magnitude.
pub fn uint(magnitude: &[u8]) -> Vec<u8> {
    let skip = magnitude.iter().take_while(|&&b| b == 0).count();
    let mut value = magnitude[skip..].to_vec();
    if value.first().map_or(true, |b| b & 0x80 != 0) {
        value.insert(0, 0x00);
    }
    tlv(0x02, &value)
}

pub fn int_i32(v: i32) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let mut start = 0;
    while start < 3
        && ((bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    tlv(0x02, &bytes[start..])
}

pub fn utc_time(date: OffsetDateTime) -> Vec<u8> {
    let text = format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        date.year() % 100,
        u8::from(date.month()),
        date.day(),
        date.hour(),
        date.minute(),
        date.second()
    );
    tlv(0x17, text.as_bytes())
}

/// An opaque SEQUENCE standing in for a `SubjectPublicKeyInfo`, `total_len`
/// bytes long including its header.
pub fn spki(total_len: usize, fill: u8) -> Vec<u8> {
    assert!((2..0x82).contains(&total_len));
    tlv(0x30, &vec![fill; total_len - 2])
}

pub fn extension(id: &str, critical: bool, value: &[u8]) -> Vec<u8> {
    let critical = if critical { vec![0x01, 0x01, 0xff] } else { vec![] };
    seq(&[&oid(id), &critical, &octet_string(value)])
}

pub fn ct_log_list(versions: &[i32], logs: &[Vec<u8>]) -> Vec<u8> {
    let versions = versions.iter().flat_map(|&v| int_i32(v)).collect::<Vec<_>>();
    let mut parts = vec![seq(&[&versions])];
    parts.extend(logs.iter().cloned());
    tlv(0x30, &parts.concat())
}

/// A `CertificateTrustList`; `extensions` of `None` omits the `[0]` block.
pub fn ctl(sequence_number: &[u8], effective_date: OffsetDateTime, extensions: Option<&[Vec<u8>]>) -> Vec<u8> {
    let subject_usage = seq(&[&oid(ROOT_LIST_SIGNER)]);
    let subject_algorithm = seq(&[&oid("1.3.14.3.2.26"), &null()]);
    let trusted_subjects = seq(&[&seq(&[&octet_string(&[0x11; 20]), &set(&[])])]);
    let extensions = match extensions {
        Some(extensions) => explicit0(&seq(&[&extensions.concat()])),
        None => vec![],
    };

    seq(&[
        &subject_usage,
        &uint(sequence_number),
        &utc_time(effective_date),
        &subject_algorithm,
        &trusted_subjects,
        &extensions,
    ])
}

/// Wraps `content` in a PKCS#7 `SignedData`, with placeholder certificates
/// and signer infos that the decoder has to step over.
pub fn envelope(content: &[u8]) -> Vec<u8> {
    let digest_algorithms = set(&[&seq(&[&oid("1.3.14.3.2.26"), &null()])]);
    let content_info = seq(&[&oid(CERT_TRUST_LIST), &explicit0(content)]);
    let certificates = tlv(0xa0, &seq(&[&null()]));
    let signer_infos = set(&[&seq(&[&int_i32(1)])]);

    let signed_data = seq(&[
        &int_i32(1),
        &digest_algorithms,
        &content_info,
        &certificates,
        &signer_infos,
    ]);
    seq(&[&oid(SIGNED_DATA), &explicit0(&signed_data)])
}
