//! Text encodings used by string fields

use encoding_rs::{SHIFT_JIS, UTF_16BE, UTF_16LE};

use crate::error::{Error, Result};

/// Encoding of a string field
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// 7-bit ASCII, unrepresentable characters become `?`
    #[default]
    Ascii,

    /// Shift-JIS, used by most Japanese-authored names
    ShiftJis,

    /// UTF-16 little endian
    Utf16Le,

    /// UTF-16 big endian
    Utf16Be,
}

impl TextEncoding {
    /// Picks the UTF-16 flavour matching a stream's byte order
    pub const fn utf16(endian: crate::Endian) -> Self {
        match endian {
            crate::Endian::Little => TextEncoding::Utf16Le,
            crate::Endian::Big => TextEncoding::Utf16Be,
        }
    }

    /// Name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            TextEncoding::Ascii => "ASCII",
            TextEncoding::ShiftJis => "Shift-JIS",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
        }
    }

    /// Width of the null terminator in bytes
    pub const fn terminator_width(self) -> usize {
        match self {
            TextEncoding::Ascii | TextEncoding::ShiftJis => 1,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
        }
    }

    /// Encodes `text` without a terminator
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Ascii => Ok(text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect()),
            TextEncoding::ShiftJis => {
                let (result, _, has_errors) = SHIFT_JIS.encode(text);
                if has_errors {
                    Err(Error::EncodingFailed(text.to_string(), self.name()))
                } else {
                    Ok(result.into())
                }
            }
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        }
    }

    /// Decodes `bytes`, which must not contain the terminator
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        let decoded = match self {
            TextEncoding::Ascii => {
                return Ok(bytes
                    .iter()
                    .map(|&b| if b.is_ascii() { b as char } else { '?' })
                    .collect())
            }
            TextEncoding::ShiftJis => {
                SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes)
            }
            TextEncoding::Utf16Le => {
                UTF_16LE.decode_without_bom_handling_and_without_replacement(bytes)
            }
            TextEncoding::Utf16Be => {
                UTF_16BE.decode_without_bom_handling_and_without_replacement(bytes)
            }
        };
        decoded
            .map(|text| text.into_owned())
            .ok_or(Error::DecodingFailed(self.name()))
    }

    /// Length of the text in `bytes` before the first terminator, if there is one
    pub fn terminated_len(self, bytes: &[u8]) -> Option<usize> {
        match self.terminator_width() {
            1 => bytes.iter().position(|&b| b == 0),
            _ => bytes
                .chunks_exact(2)
                .position(|pair| pair == [0, 0])
                .map(|index| index * 2),
        }
    }

    /// Lays `text` out in a field of exactly `width` bytes
    ///
    /// The terminator is written when it fits, overflowing bytes are dropped, and anything left
    /// over is filled with `padding`.
    pub fn fixed(self, text: &str, width: usize, padding: u8) -> Result<Vec<u8>> {
        let mut bytes = self.encode(text)?;
        bytes.resize(bytes.len() + self.terminator_width(), 0);
        bytes.resize(width, padding);
        Ok(bytes)
    }
}
