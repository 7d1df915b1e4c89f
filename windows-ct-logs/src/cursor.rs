//! A forward-only cursor over DER tag-length-value elements.
//!
//! The cursor knows nothing about PKCS#7 or CTLs: each schema is written as a
//! linear sequence of calls against it. Every read names the field being
//! decoded so that failures point at the offending structure.
//!
//! Once a read has failed the cursor's position is unspecified and it must
//! not be used again.

use der::asn1::{ObjectIdentifier, Uint};
use der::{Decode, Header, Reader, SliceReader, Tag, TagNumber};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{ErrorKind, FieldError};

/// Constructed, context-specific `[0]`.
pub const CONTEXT_0: Tag = Tag::ContextSpecific {
    constructed: true,
    number: TagNumber::N0,
};

type Result<T> = std::result::Result<T, FieldError>;

struct Tlv<'a> {
    tag: Tag,
    value: &'a [u8],
    element: &'a [u8],
}

/// A cursor over a buffer of concatenated DER elements.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    /// Returns `true` if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// The number of unconsumed bytes.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Fails with [`ErrorKind::TrailingData`] unless every byte has been consumed.
    pub fn finish(&self, field: &'static str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FieldError::new(
                field,
                ErrorKind::TrailingData {
                    remaining: self.remaining(),
                },
            ))
        }
    }

    fn peek_tag(&self) -> Option<Tag> {
        self.rest.first().and_then(|&byte| Tag::try_from(byte).ok())
    }

    fn read_tlv(&mut self, field: &'static str) -> Result<Tlv<'a>> {
        if self.rest.is_empty() {
            return Err(FieldError::new(field, ErrorKind::Length));
        }

        let der_err = |err| FieldError::der(field, err);
        let mut reader = SliceReader::new(self.rest).map_err(der_err)?;
        let header = Header::decode(&mut reader).map_err(der_err)?;
        // `read_slice` refuses lengths that run past the end of the input.
        let value = reader.read_slice(header.length).map_err(der_err)?;
        let rest_len = usize::try_from(reader.remaining_len()).map_err(der_err)?;

        let (element, rest) = self.rest.split_at(self.rest.len() - rest_len);
        self.rest = rest;

        Ok(Tlv {
            tag: header.tag,
            value,
            element,
        })
    }

    fn expect(&mut self, tag: Tag, field: &'static str) -> Result<Tlv<'a>> {
        let tlv = self.read_tlv(field)?;
        if tlv.tag != tag {
            return Err(FieldError::new(
                field,
                ErrorKind::UnexpectedTag {
                    expected: tag,
                    actual: tlv.tag,
                },
            ));
        }
        Ok(tlv)
    }

    /// Reads a SEQUENCE and returns a cursor over its contents.
    pub fn read_sequence(&mut self, field: &'static str) -> Result<Cursor<'a>> {
        self.read_constructed(Tag::Sequence, field)
    }

    /// Reads an element with the given (constructed) tag and returns a cursor
    /// over its contents.
    pub fn read_constructed(&mut self, tag: Tag, field: &'static str) -> Result<Cursor<'a>> {
        Ok(Cursor::new(self.expect(tag, field)?.value))
    }

    /// Reads an element with the given tag, returning its complete encoding
    /// (identifier, length and contents).
    pub fn read_element(&mut self, tag: Tag, field: &'static str) -> Result<&'a [u8]> {
        Ok(self.expect(tag, field)?.element)
    }

    /// Like [`Cursor::read_element`], but accepts any tag `der` can
    /// represent. High-tag-number forms (low five bits all set) fail with
    /// [`ErrorKind::UnknownTag`].
    pub fn read_any_element(&mut self, field: &'static str) -> Result<&'a [u8]> {
        Ok(self.read_tlv(field)?.element)
    }

    /// Reads an OCTET STRING and returns its contents.
    pub fn read_octet_string(&mut self, field: &'static str) -> Result<&'a [u8]> {
        Ok(self.expect(Tag::OctetString, field)?.value)
    }

    fn read_integer_bytes(&mut self, field: &'static str) -> Result<&'a [u8]> {
        let value = self.expect(Tag::Integer, field)?.value;
        match value {
            [] => Err(FieldError::new(field, ErrorKind::Value)),
            // Redundant sign octets.
            [0x00, next, ..] if next & 0x80 == 0 => Err(FieldError::new(field, ErrorKind::Value)),
            [0xff, next, ..] if next & 0x80 != 0 => Err(FieldError::new(field, ErrorKind::Value)),
            _ => Ok(value),
        }
    }

    /// Reads a non-negative INTEGER of any width.
    pub fn read_integer(&mut self, field: &'static str) -> Result<Uint> {
        let value = self.read_integer_bytes(field)?;
        if value[0] & 0x80 != 0 {
            return Err(FieldError::new(field, ErrorKind::OutOfRange));
        }
        Uint::new(value).map_err(|err| FieldError::der(field, err))
    }

    /// Reads an INTEGER that must fit in an `i32`.
    pub fn read_integer_i32(&mut self, field: &'static str) -> Result<i32> {
        let value = self.read_integer_bytes(field)?;
        if value.len() > 4 {
            return Err(FieldError::new(field, ErrorKind::OutOfRange));
        }

        let sign = if value[0] & 0x80 != 0 { -1 } else { 0 };
        Ok(value
            .iter()
            .fold(sign, |acc, &byte| (acc << 8) | i32::from(byte)))
    }

    /// Reads an OBJECT IDENTIFIER.
    pub fn read_object_identifier(&mut self, field: &'static str) -> Result<ObjectIdentifier> {
        let element = self.read_element(Tag::ObjectIdentifier, field)?;
        ObjectIdentifier::from_der(element).map_err(|err| FieldError::der(field, err))
    }

    /// Reads a UTCTime (`YYMMDDHHMMSSZ`). Two-digit years from 50 onwards
    /// are 19xx, the rest 20xx.
    pub fn read_utc_time(&mut self, field: &'static str) -> Result<OffsetDateTime> {
        let value = self.expect(Tag::UtcTime, field)?.value;
        parse_utc_time(value).ok_or_else(|| FieldError::new(field, ErrorKind::Value))
    }

    /// Reads and discards an element with the given tag.
    pub fn skip(&mut self, tag: Tag, field: &'static str) -> Result<()> {
        self.expect(tag, field).map(drop)
    }

    /// Skips the next element if it carries `tag`, returning whether it did.
    pub fn skip_optional(&mut self, tag: Tag, field: &'static str) -> Result<bool> {
        if self.peek_tag() != Some(tag) {
            return Ok(false);
        }
        self.skip(tag, field)?;
        Ok(true)
    }

    /// Reads the next element if it carries `tag`, returning a cursor over its
    /// contents.
    pub fn read_optional(&mut self, tag: Tag, field: &'static str) -> Result<Option<Cursor<'a>>> {
        if self.peek_tag() != Some(tag) {
            return Ok(None);
        }
        self.read_constructed(tag, field).map(Some)
    }
}

/// Parses the contents of a DER UTCTime. Seconds are mandatory and the zone
/// must be `Z`.
fn parse_utc_time(value: &[u8]) -> Option<OffsetDateTime> {
    let [digits @ .., b'Z'] = value else {
        return None;
    };
    if digits.len() != 12 || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let mut pairs = digits
        .chunks_exact(2)
        .map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0'));

    let yy = i32::from(pairs.next()?);
    let year = if yy >= 50 { 1900 + yy } else { 2000 + yy };
    let month = Month::try_from(pairs.next()?).ok()?;
    let date = Date::from_calendar_date(year, month, pairs.next()?).ok()?;
    let time = Time::from_hms(pairs.next()?, pairs.next()?, pairs.next()?).ok()?;

    Some(PrimitiveDateTime::new(date, time).assume_utc())
}
