//! NBT (Named Binary Tag) for Java edition data.
//!
//! Values are big-endian with u16 string lengths and i32 array lengths. The
//! gzip helpers wrap the same encoding for the on-disk files the server keeps
//! per container.

mod codec;
pub mod error;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag};

use std::io::{Read, Write};

use bytes::{Buf, BufMut};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Read an uncompressed NBT document.
pub fn read_nbt(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    codec::read_root(buf)
}

/// Write an uncompressed NBT document.
pub fn write_nbt(buf: &mut impl BufMut, root: &NbtRoot) -> Result<(), NbtError> {
    codec::write_root(buf, root)
}

/// Decode a gzip-compressed NBT document.
pub fn read_gzip(data: &[u8]) -> Result<NbtRoot, NbtError> {
    let mut raw = Vec::new();
    GzDecoder::new(data).read_to_end(&mut raw)?;
    read_nbt(&mut raw.as_slice())
}

/// Encode an NBT document and gzip it.
pub fn write_gzip(root: &NbtRoot) -> Result<Vec<u8>, NbtError> {
    let mut raw = Vec::new();
    write_nbt(&mut raw, root)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}
