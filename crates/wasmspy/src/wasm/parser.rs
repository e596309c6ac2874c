//! Module-level framing: magic, version, section records.

use std::path::Path;

use anyhow::Context;

use super::error::{ErrorKind, ParseError};
use super::reader::Reader;
use super::{Module, Section, SectionId};

const MAGIC: [u8; 4] = [0x00, b'a', b's', b'm'];
const SUPPORTED_VERSION: u32 = 1;

/// Read and frame a module from a file.
pub fn parse_file(path: impl AsRef<Path>) -> anyhow::Result<Module> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

/// Verify the `\0asm` magic and version word, then split the rest of the
/// input into `(id, offset, size, content)` section records in file order.
pub fn parse(bytes: &[u8]) -> Result<Module, ParseError> {
    let mut r = Reader::new(bytes, 0);

    let magic = r.read_bytes(4).map_err(|e| {
        ParseError::with_cause(ErrorKind::Truncated, 0, "module header too short", e)
    })?;
    if magic != &MAGIC[..] {
        return Err(ParseError::new(
            ErrorKind::InvalidMagic,
            0,
            format!(
                "invalid magic: {:02x} {:02x} {:02x} {:02x}",
                magic[0], magic[1], magic[2], magic[3]
            ),
        ));
    }

    let version_offset = r.offset();
    let version = r.read_u32_le().map_err(|e| {
        ParseError::with_cause(ErrorKind::Truncated, version_offset, "module header too short", e)
    })?;
    if version != SUPPORTED_VERSION {
        return Err(ParseError::new(
            ErrorKind::InvalidVersion,
            version_offset,
            format!("unsupported version {version}"),
        ));
    }

    let mut sections = Vec::new();
    while !r.at_end() {
        let id_offset = r.offset();
        let id = r.read_byte()?;
        let size = r.read_u32()?;
        if size as usize > r.remaining() {
            return Err(ParseError::new(
                ErrorKind::SectionOverflow,
                id_offset,
                format!(
                    "section {id} claims {size} bytes with {} remaining",
                    r.remaining()
                ),
            ));
        }
        let content = r.read_bytes(size as usize)?.to_vec();
        sections.push(Section {
            id: SectionId::from_byte(id),
            offset: id_offset,
            size,
            content,
        });
    }

    Ok(Module { version, sections })
}
