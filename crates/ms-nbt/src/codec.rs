//! Big-endian (Java edition) NBT reader and writer.

use bytes::{Buf, BufMut};

use crate::error::NbtError;
use crate::tag::{NbtCompound, NbtRoot, NbtTag};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

const TAG_END: u8 = 0;
const TAG_COMPOUND: u8 = 10;

// -----------------------------------------------------------------------
// Reading
// -----------------------------------------------------------------------

pub(crate) fn read_root(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    ensure_remaining(buf, 1)?;
    let tag_type = buf.get_u8();
    if tag_type != TAG_COMPOUND {
        return Err(NbtError::ExpectedCompound { got: tag_type });
    }
    let name = read_string(buf)?;
    let compound = read_compound(buf, 0)?;
    Ok(NbtRoot { name, compound })
}

fn read_tag(buf: &mut impl Buf, tag_type: u8, depth: usize) -> Result<NbtTag, NbtError> {
    if depth > MAX_DEPTH {
        return Err(NbtError::NestingTooDeep { limit: MAX_DEPTH });
    }

    let tag = match tag_type {
        1 => {
            ensure_remaining(buf, 1)?;
            NbtTag::Byte(buf.get_i8())
        }
        2 => {
            ensure_remaining(buf, 2)?;
            NbtTag::Short(buf.get_i16())
        }
        3 => {
            ensure_remaining(buf, 4)?;
            NbtTag::Int(buf.get_i32())
        }
        4 => {
            ensure_remaining(buf, 8)?;
            NbtTag::Long(buf.get_i64())
        }
        5 => {
            ensure_remaining(buf, 4)?;
            NbtTag::Float(buf.get_f32())
        }
        6 => {
            ensure_remaining(buf, 8)?;
            NbtTag::Double(buf.get_f64())
        }
        7 => {
            let len = read_len(buf)?;
            ensure_remaining(buf, len)?;
            NbtTag::ByteArray((0..len).map(|_| buf.get_i8()).collect())
        }
        8 => NbtTag::String(read_string(buf)?),
        9 => {
            ensure_remaining(buf, 1)?;
            let element_type = buf.get_u8();
            let len = read_len(buf)?;
            let mut list = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                list.push(read_tag(buf, element_type, depth + 1)?);
            }
            NbtTag::List(list)
        }
        10 => NbtTag::Compound(read_compound(buf, depth + 1)?),
        11 => {
            let len = read_len(buf)?;
            ensure_remaining(buf, len.saturating_mul(4))?;
            NbtTag::IntArray((0..len).map(|_| buf.get_i32()).collect())
        }
        12 => {
            let len = read_len(buf)?;
            ensure_remaining(buf, len.saturating_mul(8))?;
            NbtTag::LongArray((0..len).map(|_| buf.get_i64()).collect())
        }
        _ => return Err(NbtError::UnknownTagType(tag_type)),
    };
    Ok(tag)
}

fn read_compound(buf: &mut impl Buf, depth: usize) -> Result<NbtCompound, NbtError> {
    if depth > MAX_DEPTH {
        return Err(NbtError::NestingTooDeep { limit: MAX_DEPTH });
    }
    let mut map = NbtCompound::new();
    loop {
        ensure_remaining(buf, 1)?;
        let tag_type = buf.get_u8();
        if tag_type == TAG_END {
            break;
        }
        let name = read_string(buf)?;
        let tag = read_tag(buf, tag_type, depth)?;
        map.insert(name, tag);
    }
    Ok(map)
}

fn read_len(buf: &mut impl Buf) -> Result<usize, NbtError> {
    ensure_remaining(buf, 4)?;
    let len = buf.get_i32();
    usize::try_from(len).map_err(|_| NbtError::NegativeLength(len))
}

fn read_string(buf: &mut impl Buf) -> Result<String, NbtError> {
    ensure_remaining(buf, 2)?;
    let len = buf.get_u16() as usize;
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    String::from_utf8(data.to_vec()).map_err(|_| NbtError::InvalidUtf8)
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), NbtError> {
    if buf.remaining() < needed {
        Err(NbtError::UnexpectedEof)
    } else {
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Writing
// -----------------------------------------------------------------------

pub(crate) fn write_root(buf: &mut impl BufMut, root: &NbtRoot) -> Result<(), NbtError> {
    buf.put_u8(TAG_COMPOUND);
    write_string(buf, &root.name)?;
    write_compound(buf, &root.compound)
}

fn write_tag(buf: &mut impl BufMut, tag: &NbtTag) -> Result<(), NbtError> {
    match tag {
        NbtTag::Byte(v) => buf.put_i8(*v),
        NbtTag::Short(v) => buf.put_i16(*v),
        NbtTag::Int(v) => buf.put_i32(*v),
        NbtTag::Long(v) => buf.put_i64(*v),
        NbtTag::Float(v) => buf.put_f32(*v),
        NbtTag::Double(v) => buf.put_f64(*v),
        NbtTag::ByteArray(arr) => {
            write_len(buf, arr.len());
            for &b in arr {
                buf.put_i8(b);
            }
        }
        NbtTag::String(s) => write_string(buf, s)?,
        NbtTag::List(list) => {
            let element_type = list.first().map_or(TAG_END, NbtTag::tag_type_id);
            if list.iter().any(|t| t.tag_type_id() != element_type) {
                return Err(NbtError::MixedList);
            }
            buf.put_u8(element_type);
            write_len(buf, list.len());
            for item in list {
                write_tag(buf, item)?;
            }
        }
        NbtTag::Compound(map) => write_compound(buf, map)?,
        NbtTag::IntArray(arr) => {
            write_len(buf, arr.len());
            for &v in arr {
                buf.put_i32(v);
            }
        }
        NbtTag::LongArray(arr) => {
            write_len(buf, arr.len());
            for &v in arr {
                buf.put_i64(v);
            }
        }
    }
    Ok(())
}

fn write_compound(buf: &mut impl BufMut, map: &NbtCompound) -> Result<(), NbtError> {
    // Sorted names keep the output byte-stable between runs.
    let mut names: Vec<&String> = map.keys().collect();
    names.sort();
    for name in names {
        let tag = &map[name];
        buf.put_u8(tag.tag_type_id());
        write_string(buf, name)?;
        write_tag(buf, tag)?;
    }
    buf.put_u8(TAG_END);
    Ok(())
}

fn write_len(buf: &mut impl BufMut, len: usize) {
    buf.put_i32(len as i32);
}

fn write_string(buf: &mut impl BufMut, s: &str) -> Result<(), NbtError> {
    let len = u16::try_from(s.len()).map_err(|_| NbtError::StringTooLong(s.len()))?;
    buf.put_u16(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}
