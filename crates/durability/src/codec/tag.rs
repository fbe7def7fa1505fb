//! Little-endian binary tag codec.
//!
//! # Layout
//!
//! A payload is the body of one root compound:
//!
//! ```text
//! Compound body:
//! ┌──────────┬────────────────┬──────────────┬──────────────┐     ┌──────────┐
//! │ Kind (1) │ Name len (2 LE)│ Name (UTF-8) │ Payload      │ ... │ End (0)  │
//! └──────────┴────────────────┴──────────────┴──────────────┘     └──────────┘
//!
//! Payloads:
//!   Byte/Short/Int/Long/Float/Double   fixed width, LE
//!   ByteArray/IntArray/LongArray       count (4 LE) + elements
//!   String                             byte len (4 LE) + UTF-8
//!   List                               element kind (1) + count (4 LE) + payloads
//!   Compound                           compound body
//! ```
//!
//! An empty list is written with element kind 0. Decoding is strict: any
//! input that would not re-encode to the same bytes (duplicate keys, a
//! non-zero kind on an empty list, trailing bytes) is rejected, so
//! `encode(decode(bytes)) == bytes` for every accepted input.

use super::traits::PayloadCodec;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chunkform_core::{Compound, Error, Result, Tag, TagKind};
use std::io::{self, Cursor, Read};

const END: u8 = 0;

/// Deepest nesting accepted on decode
const MAX_DEPTH: usize = 512;

/// Default binary codec for decoded trees
#[derive(Debug, Clone, Copy, Default)]
pub struct TagCodec;

impl TagCodec {
    /// Codec identifier
    pub const ID: &'static str = "tag-le-v1";
}

impl PayloadCodec for TagCodec {
    fn encode(&self, root: &Compound) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        write_compound(&mut out, root).map_err(io_error)?;
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Compound> {
        let mut reader = Cursor::new(bytes);
        let root = read_compound(&mut reader, 0)?;
        let consumed = reader.position() as usize;
        if consumed != bytes.len() {
            return Err(Error::mismatch(format!(
                "{} trailing bytes after root compound",
                bytes.len() - consumed
            )));
        }
        Ok(root)
    }

    fn codec_id(&self) -> &str {
        Self::ID
    }
}

fn io_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::mismatch("truncated payload"),
        _ => Error::mismatch(e.to_string()),
    }
}

fn invalid(detail: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, detail.into())
}

// =============================================================================
// Encoding
// =============================================================================

fn write_len(out: &mut Vec<u8>, len: usize) -> io::Result<()> {
    let len = u32::try_from(len).map_err(|_| invalid(format!("length {} exceeds u32", len)))?;
    out.write_u32::<LittleEndian>(len)
}

fn write_compound(out: &mut Vec<u8>, compound: &Compound) -> io::Result<()> {
    for (name, tag) in compound.iter() {
        out.write_u8(tag.kind().id())?;
        let name_len = u16::try_from(name.len())
            .map_err(|_| invalid(format!("field name of {} bytes", name.len())))?;
        out.write_u16::<LittleEndian>(name_len)?;
        out.extend_from_slice(name.as_bytes());
        write_payload(out, tag)?;
    }
    out.write_u8(END)
}

fn write_payload(out: &mut Vec<u8>, tag: &Tag) -> io::Result<()> {
    match tag {
        Tag::Byte(v) => out.write_i8(*v),
        Tag::Short(v) => out.write_i16::<LittleEndian>(*v),
        Tag::Int(v) => out.write_i32::<LittleEndian>(*v),
        Tag::Long(v) => out.write_i64::<LittleEndian>(*v),
        Tag::Float(v) => out.write_f32::<LittleEndian>(*v),
        Tag::Double(v) => out.write_f64::<LittleEndian>(*v),
        Tag::ByteArray(v) => {
            write_len(out, v.len())?;
            out.extend_from_slice(v);
            Ok(())
        }
        Tag::String(v) => {
            write_len(out, v.len())?;
            out.extend_from_slice(v.as_bytes());
            Ok(())
        }
        Tag::List(items) => {
            let kind = items.first().map_or(END, |t| t.kind().id());
            if let Some(odd) = items.iter().find(|t| t.kind().id() != kind) {
                return Err(invalid(format!(
                    "list mixes {} with {}",
                    items[0].kind(),
                    odd.kind()
                )));
            }
            out.write_u8(kind)?;
            write_len(out, items.len())?;
            items.iter().try_for_each(|t| write_payload(out, t))
        }
        Tag::Compound(v) => write_compound(out, v),
        Tag::IntArray(v) => {
            write_len(out, v.len())?;
            v.iter().try_for_each(|x| out.write_i32::<LittleEndian>(*x))
        }
        Tag::LongArray(v) => {
            write_len(out, v.len())?;
            v.iter().try_for_each(|x| out.write_i64::<LittleEndian>(*x))
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

fn remaining(reader: &Cursor<&[u8]>) -> usize {
    reader.get_ref().len().saturating_sub(reader.position() as usize)
}

/// Read an element count, refusing counts the remaining input cannot hold
fn read_count(reader: &mut Cursor<&[u8]>, min_elem_size: usize) -> Result<usize> {
    let count = reader.read_u32::<LittleEndian>().map_err(io_error)? as usize;
    if count.saturating_mul(min_elem_size) > remaining(reader) {
        return Err(Error::mismatch(format!(
            "count {} exceeds remaining {} bytes",
            count,
            remaining(reader)
        )));
    }
    Ok(count)
}

fn read_bytes(reader: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(io_error)?;
    Ok(buf)
}

fn read_kind(reader: &mut Cursor<&[u8]>) -> Result<u8> {
    reader.read_u8().map_err(io_error)
}

fn read_compound(reader: &mut Cursor<&[u8]>, depth: usize) -> Result<Compound> {
    if depth > MAX_DEPTH {
        return Err(Error::mismatch(format!("nesting deeper than {}", MAX_DEPTH)));
    }
    let mut compound = Compound::new();
    loop {
        let kind = read_kind(reader)?;
        if kind == END {
            return Ok(compound);
        }
        let kind = TagKind::from_id(kind)
            .ok_or_else(|| Error::mismatch(format!("unknown tag kind {}", kind)))?;
        let name_len = reader.read_u16::<LittleEndian>().map_err(io_error)? as usize;
        let name = String::from_utf8(read_bytes(reader, name_len)?)
            .map_err(|_| Error::mismatch("field name is not UTF-8"))?;
        if compound.contains_key(&name) {
            return Err(Error::mismatch(format!("duplicate field '{}'", name)));
        }
        let tag = read_payload(reader, kind, depth + 1)?;
        compound.insert(name, tag);
    }
}

fn read_payload(reader: &mut Cursor<&[u8]>, kind: TagKind, depth: usize) -> Result<Tag> {
    let tag = match kind {
        TagKind::Byte => Tag::Byte(reader.read_i8().map_err(io_error)?),
        TagKind::Short => Tag::Short(reader.read_i16::<LittleEndian>().map_err(io_error)?),
        TagKind::Int => Tag::Int(reader.read_i32::<LittleEndian>().map_err(io_error)?),
        TagKind::Long => Tag::Long(reader.read_i64::<LittleEndian>().map_err(io_error)?),
        TagKind::Float => Tag::Float(reader.read_f32::<LittleEndian>().map_err(io_error)?),
        TagKind::Double => Tag::Double(reader.read_f64::<LittleEndian>().map_err(io_error)?),
        TagKind::ByteArray => {
            let len = read_count(reader, 1)?;
            Tag::ByteArray(read_bytes(reader, len)?)
        }
        TagKind::String => {
            let len = read_count(reader, 1)?;
            Tag::String(
                String::from_utf8(read_bytes(reader, len)?)
                    .map_err(|_| Error::mismatch("string is not UTF-8"))?,
            )
        }
        TagKind::List => {
            if depth > MAX_DEPTH {
                return Err(Error::mismatch(format!("nesting deeper than {}", MAX_DEPTH)));
            }
            let elem = read_kind(reader)?;
            let count = read_count(reader, 1)?;
            if elem == END {
                if count != 0 {
                    return Err(Error::mismatch("non-empty list without element kind"));
                }
                return Ok(Tag::List(Vec::new()));
            }
            if count == 0 {
                return Err(Error::mismatch("empty list must use element kind 0"));
            }
            let elem = TagKind::from_id(elem)
                .ok_or_else(|| Error::mismatch(format!("unknown list element kind {}", elem)))?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(read_payload(reader, elem, depth + 1)?);
            }
            Tag::List(items)
        }
        TagKind::Compound => Tag::Compound(read_compound(reader, depth)?),
        TagKind::IntArray => {
            let count = read_count(reader, 4)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(reader.read_i32::<LittleEndian>().map_err(io_error)?);
            }
            Tag::IntArray(values)
        }
        TagKind::LongArray => {
            let count = read_count(reader, 8)?;
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(reader.read_i64::<LittleEndian>().map_err(io_error)?);
            }
            Tag::LongArray(values)
        }
    };
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Compound {
        let mut level = Compound::new();
        level.insert("xPos", Tag::Int(-3));
        level.insert("zPos", Tag::Int(12));
        level.insert("Status", Tag::String("full".into()));
        level.insert("Heights", Tag::LongArray(vec![1, -2, i64::MAX]));
        level.insert("Sections", Tag::List(vec![Tag::Byte(0), Tag::Byte(1)]));
        level.insert("Empty", Tag::List(vec![]));
        let mut root = Compound::new();
        root.insert("DataVersion", Tag::Int(1343));
        root.insert("Level", level);
        root
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = TagCodec;
        let bytes = codec.encode(&sample()).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), sample());
        assert_eq!(codec.codec_id(), "tag-le-v1");
    }

    #[test]
    fn field_order_is_preserved() {
        let mut root = Compound::new();
        root.insert("z", Tag::Byte(1));
        root.insert("a", Tag::Byte(2));
        let decoded = TagCodec.decode(&TagCodec.encode(&root).unwrap()).unwrap();
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn truncation_is_structural() {
        let bytes = TagCodec.encode(&sample()).unwrap();
        for cut in [1, bytes.len() / 2, bytes.len() - 1] {
            let err = TagCodec.decode(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, Error::StructuralMismatch(_)), "cut at {}", cut);
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = TagCodec.encode(&sample()).unwrap();
        bytes.push(0);
        assert!(TagCodec.decode(&bytes).is_err());
    }

    #[test]
    fn duplicate_key_rejected() {
        // two Byte fields named "a"
        let bytes = [1, 1, 0, b'a', 5, 1, 1, 0, b'a', 6, 0];
        let err = TagCodec.decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(TagCodec.decode(&[42, 1, 0, b'x', 0]).is_err());
    }

    #[test]
    fn mixed_list_cannot_encode() {
        let mut root = Compound::new();
        root.insert("l", Tag::List(vec![Tag::Int(1), Tag::Long(2)]));
        assert!(matches!(
            TagCodec.encode(&root),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn huge_count_rejected_without_allocating() {
        // IntArray "a" claiming u32::MAX elements
        let bytes = [11, 1, 0, b'a', 0xff, 0xff, 0xff, 0xff, 0];
        assert!(TagCodec.decode(&bytes).is_err());
    }

    proptest! {
        #[test]
        fn accepted_bytes_reencode_identically(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            if let Ok(root) = TagCodec.decode(&bytes) {
                prop_assert_eq!(TagCodec.encode(&root).unwrap(), bytes);
            }
        }
    }
}
