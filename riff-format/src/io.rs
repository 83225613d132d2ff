//! Big-endian encoding buffers and the compression seam.
//!
//! All fixed-layout structures in the format (header, type description,
//! stripe index, footer, row payloads) go through [`OutputBuffer`] and
//! [`InputBuffer`]. The stripe payload bytes additionally pass through a
//! [`CompressionCodec`], which is a seam: the format only assumes block
//! compress/decompress over owned byte buffers.

use std::io;

use riff_result::{Error, Result};

/// Grow-only byte buffer with big-endian writers.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> OutputBuffer {
        OutputBuffer::default()
    }

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, v: i64) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string as `i32` byte length followed by UTF-8 bytes.
    pub fn write_utf8(&mut self, s: &str) {
        self.write_i32(s.len() as i32);
        self.write_bytes(s.as_bytes());
    }

    /// Zero-pad so the buffer length is a multiple of eight.
    pub fn align8(&mut self) {
        while self.data.len() % 8 != 0 {
            self.data.push(0);
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// Cursor over borrowed bytes with big-endian readers.
///
/// Every read checks the remaining length and fails with
/// [`Error::CorruptHeader`] on truncation, so malformed input can never read
/// out of bounds.
#[derive(Debug)]
pub struct InputBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> InputBuffer<'a> {
    pub fn new(data: &'a [u8]) -> InputBuffer<'a> {
        InputBuffer { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Advance past the given number of bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::CorruptHeader(format!(
                "truncated input: need {len} bytes, have {}",
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(arr))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(arr))
    }

    /// Borrow `len` bytes from the buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Fill `dst` completely or fail.
    pub fn read_fully(&mut self, dst: &mut [u8]) -> Result<()> {
        dst.copy_from_slice(self.take(dst.len())?);
        Ok(())
    }

    /// Read an `i32`-length-prefixed UTF-8 string.
    pub fn read_utf8(&mut self) -> Result<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(Error::CorruptHeader(format!(
                "negative string length {len}"
            )));
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::CorruptHeader(format!("invalid utf8: {e}")))
    }
}

/// Block compression over owned byte buffers.
///
/// The stripe payload codec itself is outside the format: implementations
/// only promise `decompress(compress(x)) == x`. Stripe `length` fields always
/// describe the compressed form.
pub trait CompressionCodec: Send + Sync {
    /// Identifier stored in configuration.
    fn name(&self) -> &'static str;

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>>;
}

/// Identity codec.
#[derive(Debug, Default)]
pub struct NoCompression;

impl CompressionCodec for NoCompression {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        Ok(compressed.to_vec())
    }
}

/// Resolve a codec identifier from configuration.
pub fn codec_for(id: &str) -> Result<Box<dyn CompressionCodec>> {
    match id {
        "" | "none" => Ok(Box::new(NoCompression)),
        other => Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported compression codec '{other}'"),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_scalars() {
        let mut out = OutputBuffer::new();
        out.write_u8(7);
        out.write_i16(-2);
        out.write_u32(0xDEAD_BEEF);
        out.write_i32(-12);
        out.write_i64(i64::MIN);
        out.write_u64(u64::MAX);
        out.write_utf8("héllo");

        let bytes = out.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert_eq!(input.read_u8().unwrap(), 7);
        assert_eq!(input.read_i16().unwrap(), -2);
        assert_eq!(input.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(input.read_i32().unwrap(), -12);
        assert_eq!(input.read_i64().unwrap(), i64::MIN);
        assert_eq!(input.read_u64().unwrap(), u64::MAX);
        assert_eq!(input.read_utf8().unwrap(), "héllo");
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn align8_pads_with_zeros() {
        let mut out = OutputBuffer::new();
        out.write_u8(1);
        out.align8();
        assert_eq!(out.bytes_written(), 8);
        assert_eq!(&out.as_slice()[1..], &[0; 7]);
        out.align8();
        assert_eq!(out.bytes_written(), 8);
    }

    #[test]
    fn truncated_reads_fail() {
        let bytes = [1u8, 2];
        let mut input = InputBuffer::new(&bytes);
        assert!(matches!(
            input.read_u32(),
            Err(Error::CorruptHeader(_))
        ));
    }

    #[test]
    fn negative_string_length_fails() {
        let mut out = OutputBuffer::new();
        out.write_i32(-5);
        let bytes = out.into_inner();
        let mut input = InputBuffer::new(&bytes);
        assert!(input.read_utf8().is_err());
    }

    #[test]
    fn read_fully_fills_or_fails() {
        let bytes = [1u8, 2, 3];
        let mut input = InputBuffer::new(&bytes);
        let mut dst = [0u8; 2];
        input.read_fully(&mut dst).unwrap();
        assert_eq!(dst, [1, 2]);
        let mut too_big = [0u8; 4];
        assert!(input.read_fully(&mut too_big).is_err());
    }

    #[test]
    fn identity_codec_roundtrip() {
        let codec = NoCompression;
        let raw = b"stripe payload".to_vec();
        assert_eq!(codec.decompress(&codec.compress(&raw).unwrap()).unwrap(), raw);
    }

    #[test]
    fn unknown_codec_rejected() {
        assert!(codec_for("none").is_ok());
        assert!(codec_for("").is_ok());
        assert!(matches!(codec_for("zstd"), Err(Error::Io(_))));
    }
}
