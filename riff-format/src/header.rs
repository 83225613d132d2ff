//! File header and type description codec.
//!
//! On-disk layout, big-endian throughout:
//!
//! ```text
//! magic            u32
//! body_length      u32
//! body (body_length bytes, zero-padded to an 8-byte boundary):
//!   state          [u8; 8]
//!   type_desc      self-delimited, see below
//!   props_count    i32            -1 encodes "no properties"
//!   repeat props_count times: key_len i32, key, val_len i32, val
//! ```
//!
//! The type description is `count: i32`, then per field `{ indexed: u8,
//! position: i32, orig_position: i32, nullable: u8, name, data_type_tag: u8,
//! metadata }` with strings length-prefixed.

use rustc_hash::FxHashMap;

use riff_result::{Error, Result};
use riff_types::{ScalarType, TypeDescription, TypeSpec};

use crate::io::{InputBuffer, OutputBuffer};

/// Format tag, `"RIFF"` in ASCII.
pub const MAGIC: u32 = 0x5249_4646;
/// Length of the reserved state byte array.
pub const STATE_LENGTH: usize = 8;
/// Decoder cap on the header body; anything larger is rejected as corrupt.
pub const HEADER_SIZE_MAX: usize = 8 * 1024 * 1024;

/// Header of a Riff file: reserved state bytes, the type description and
/// optional custom properties.
///
/// The state bytes are flags whose meaning this codec does not interpret.
/// Property key order is not part of the contract; equality is set-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    state: [u8; STATE_LENGTH],
    td: TypeDescription,
    properties: Option<FxHashMap<String, String>>,
}

impl FileHeader {
    /// Header with all-zero state.
    pub fn new(td: TypeDescription, properties: Option<FxHashMap<String, String>>) -> FileHeader {
        FileHeader::with_state([0; STATE_LENGTH], td, properties)
    }

    pub fn with_state(
        state: [u8; STATE_LENGTH],
        td: TypeDescription,
        properties: Option<FxHashMap<String, String>>,
    ) -> FileHeader {
        FileHeader {
            state,
            td,
            properties,
        }
    }

    /// Set one state flag.
    pub fn set_state(&mut self, pos: usize, flag: u8) {
        self.state[pos] = flag;
    }

    /// State flag at `pos`.
    pub fn state(&self, pos: usize) -> u8 {
        self.state[pos]
    }

    pub fn type_description(&self) -> &TypeDescription {
        &self.td
    }

    /// Property value for `key`, if properties exist and contain it.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(key))
            .map(|s| s.as_str())
    }

    pub fn properties(&self) -> Option<&FxHashMap<String, String>> {
        self.properties.as_ref()
    }

    /// Encode magic, body length and the aligned body.
    pub fn write_to(&self, out: &mut OutputBuffer) {
        let mut body = OutputBuffer::new();
        body.write_bytes(&self.state);
        write_type_description(&mut body, &self.td);
        match &self.properties {
            None => body.write_i32(-1),
            Some(props) => {
                body.write_i32(props.len() as i32);
                for (key, value) in props {
                    body.write_utf8(key);
                    body.write_utf8(value);
                }
            }
        }
        body.align8();

        tracing::debug!(bytes = body.bytes_written(), "writing header body");
        out.write_u32(MAGIC);
        out.write_u32(body.bytes_written() as u32);
        out.write_bytes(body.as_slice());
    }

    /// Decode a header, validating magic and the body length cap. The input
    /// is left positioned at the first byte after the padded body.
    pub fn read_from(input: &mut InputBuffer<'_>) -> Result<FileHeader> {
        let magic = input.read_u32()?;
        if magic != MAGIC {
            return Err(Error::CorruptHeader(format!(
                "wrong magic: {magic:#x} != {MAGIC:#x}"
            )));
        }
        let body_len = input.read_u32()? as usize;
        if body_len > HEADER_SIZE_MAX {
            return Err(Error::CorruptHeader(format!(
                "header body of {body_len} bytes exceeds cap {HEADER_SIZE_MAX}"
            )));
        }
        tracing::debug!(bytes = body_len, "reading header body");
        let mut body = InputBuffer::new(input.read_bytes(body_len)?);

        let mut state = [0u8; STATE_LENGTH];
        body.read_fully(&mut state)?;
        let td = read_type_description(&mut body)?;
        let props_count = body.read_i32()?;
        let properties = if props_count < 0 {
            None
        } else {
            let mut props = FxHashMap::default();
            for _ in 0..props_count {
                let key = body.read_utf8()?;
                let value = body.read_utf8()?;
                props.insert(key, value);
            }
            Some(props)
        };
        Ok(FileHeader::with_state(state, td, properties))
    }
}

/// Serialize a type description in position order.
pub(crate) fn write_type_description(buf: &mut OutputBuffer, td: &TypeDescription) {
    buf.write_i32(td.size() as i32);
    for spec in td.specs() {
        buf.write_u8(spec.is_indexed() as u8);
        buf.write_i32(spec.position() as i32);
        buf.write_i32(spec.orig_position() as i32);
        buf.write_u8(spec.is_nullable() as u8);
        buf.write_utf8(spec.name());
        buf.write_u8(spec.data_type().tag());
        // reserved per-field metadata, empty for now
        buf.write_utf8("");
    }
}

/// Deserialize a type description, revalidating its structural invariants.
pub(crate) fn read_type_description(input: &mut InputBuffer<'_>) -> Result<TypeDescription> {
    let count = input.read_i32()?;
    if count < 0 {
        return Err(Error::CorruptHeader(format!(
            "negative field count {count}"
        )));
    }
    let mut specs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let indexed = input.read_u8()? != 0;
        let position = input.read_i32()?;
        let orig_position = input.read_i32()?;
        if position < 0 || orig_position < 0 {
            return Err(Error::CorruptHeader(format!(
                "negative field position {position}/{orig_position}"
            )));
        }
        let nullable = input.read_u8()? != 0;
        let name = input.read_utf8()?;
        let data_type = ScalarType::from_tag(input.read_u8()?)?;
        let _metadata = input.read_utf8()?;
        specs.push(TypeSpec::new(
            name,
            data_type,
            nullable,
            indexed,
            position as usize,
            orig_position as usize,
        ));
    }
    TypeDescription::from_specs(specs).map_err(|e| Error::CorruptHeader(e.to_string()))
}
