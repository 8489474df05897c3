//! Ogg Opus header serialization.
//!
//! Two blobs precede the first audio packet of an Ogg Opus stream:
//!
//! ```text
//! OpusHead (19 bytes, mapping family 0)
//!   magic "OpusHead" | version u8 = 1 | channels u8 | pre-skip u16
//!   | input rate u32 | output gain i16 = 0 | mapping family u8 = 0
//!
//! OpusTags
//!   magic "OpusTags" | vendor len u32 | vendor | count u32
//!   | { len u32 | comment } * count
//! ```
//!
//! Every integer is little endian; strings are UTF-8 with no terminator.

use std::io::{self, Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::audio::constants::{COMMENT_HEADER_MAGIC, ID_HEADER_MAGIC, ID_HEADER_VERSION};

/// Scalar content of an identification header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdHeader {
    pub channels: u8,
    pub pre_skip: u16,
    pub input_sample_rate: u32,
    pub output_gain: i16,
    pub mapping_family: u8,
}

impl IdHeader {
    pub fn new(channels: u8, pre_skip: u16, input_sample_rate: u32) -> Self {
        Self {
            channels,
            pre_skip,
            input_sample_rate,
            output_gain: 0,
            mapping_family: 0,
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(ID_HEADER_MAGIC)?;
        w.write_u8(ID_HEADER_VERSION)?;
        w.write_u8(self.channels)?;
        w.write_u16::<LittleEndian>(self.pre_skip)?;
        w.write_u32::<LittleEndian>(self.input_sample_rate)?;
        w.write_i16::<LittleEndian>(self.output_gain)?;
        w.write_u8(self.mapping_family)?;
        Ok(())
    }

    /// Parse an identification header. Returns `None` on a bad magic, an
    /// unknown version or truncated input.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        let mut magic = [0u8; 8];
        cursor.read_exact(&mut magic).ok()?;
        if &magic != ID_HEADER_MAGIC {
            return None;
        }
        if cursor.read_u8().ok()? != ID_HEADER_VERSION {
            return None;
        }

        Some(Self {
            channels: cursor.read_u8().ok()?,
            pre_skip: cursor.read_u16::<LittleEndian>().ok()?,
            input_sample_rate: cursor.read_u32::<LittleEndian>().ok()?,
            output_gain: cursor.read_i16::<LittleEndian>().ok()?,
            mapping_family: cursor.read_u8().ok()?,
        })
    }
}

/// Vendor string and user comments of a comment header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentHeader {
    pub vendor: String,
    pub comments: Vec<String>,
}

impl CommentHeader {
    pub fn new(vendor: impl Into<String>, comments: Vec<String>) -> Self {
        Self {
            vendor: vendor.into(),
            comments,
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(COMMENT_HEADER_MAGIC)?;
        write_string(w, &self.vendor)?;
        w.write_u32::<LittleEndian>(self.comments.len() as u32)?;
        for comment in &self.comments {
            write_string(w, comment)?;
        }
        Ok(())
    }

    /// Serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        8 + 4 + self.vendor.len() + 4 + self.comments.iter().map(|c| 4 + c.len()).sum::<usize>()
    }

    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        let mut magic = [0u8; 8];
        cursor.read_exact(&mut magic).ok()?;
        if &magic != COMMENT_HEADER_MAGIC {
            return None;
        }

        let vendor = read_string(&mut cursor)?;
        let count = cursor.read_u32::<LittleEndian>().ok()? as usize;
        let mut comments = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            comments.push(read_string(&mut cursor)?);
        }
        Some(Self { vendor, comments })
    }
}

/// Serialize an identification header into a fresh buffer.
pub fn id_header(channels: u8, pre_skip: u16, input_sample_rate: u32) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(crate::audio::constants::ID_HEADER_LEN);
    IdHeader::new(channels, pre_skip, input_sample_rate).write(&mut buf)?;
    Ok(buf)
}

/// Serialize a comment header into a fresh buffer.
pub fn comment_header(vendor: &str, comments: &[String]) -> io::Result<Vec<u8>> {
    let header = CommentHeader::new(vendor, comments.to_vec());
    let mut buf = Vec::with_capacity(header.encoded_len());
    header.write(&mut buf)?;
    Ok(buf)
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let bytes = s.as_bytes();
    w.write_u32::<LittleEndian>(bytes.len() as u32)?;
    w.write_all(bytes)
}

fn read_string<R: Read>(r: &mut R) -> Option<String> {
    let len = r.read_u32::<LittleEndian>().ok()? as usize;
    let mut buf = Vec::new();
    r.take(len as u64).read_to_end(&mut buf).ok()?;
    if buf.len() != len {
        return None;
    }
    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::constants::ID_HEADER_LEN;

    #[test]
    fn id_header_layout_is_bit_exact() {
        let bytes = id_header(2, 312, 44_100).unwrap();
        assert_eq!(
            bytes,
            vec![
                b'O', b'p', b'u', b's', b'H', b'e', b'a', b'd', // magic
                1,    // version
                2,    // channels
                0x38, 0x01, // pre-skip 312
                0x44, 0xAC, 0x00, 0x00, // 44100
                0x00, 0x00, // gain
                0,    // mapping family
            ]
        );
    }

    #[test]
    fn id_header_round_trips() {
        for (channels, pre_skip, rate) in [(1u8, 0u16, 8_000u32), (2, 312, 48_000), (2, 65_535, 44_100)] {
            let bytes = id_header(channels, pre_skip, rate).unwrap();
            assert_eq!(bytes.len(), ID_HEADER_LEN);

            let parsed = IdHeader::parse(&bytes).unwrap();
            assert_eq!(
                (parsed.channels, parsed.pre_skip, parsed.input_sample_rate),
                (channels, pre_skip, rate)
            );
            assert_eq!(parsed.output_gain, 0);
            assert_eq!(parsed.mapping_family, 0);
        }
    }

    #[test]
    fn id_header_rejects_bad_input() {
        let mut bytes = id_header(1, 0, 16_000).unwrap();
        assert!(IdHeader::parse(&bytes[..10]).is_none());
        bytes[8] = 2;
        assert!(IdHeader::parse(&bytes).is_none());
        assert!(IdHeader::parse(b"OggSxxxxxxxxxxxxxxxxx").is_none());
    }

    #[test]
    fn comment_header_length_matches_formula() {
        let comments = vec!["ENCODER=opustrack".to_string(), "TITLE=Ünïcode".to_string()];
        let bytes = comment_header("libopus 1.3.1", &comments).unwrap();

        let expected = 8 + 4 + "libopus 1.3.1".len() + 4 + comments.iter().map(|c| 4 + c.len()).sum::<usize>();
        assert_eq!(bytes.len(), expected);
        assert_eq!(&bytes[..8], b"OpusTags");
        assert_eq!(&bytes[8..12], &13u32.to_le_bytes());
        assert_eq!(&bytes[25..29], &2u32.to_le_bytes());
    }

    #[test]
    fn comment_header_round_trips() {
        let header = CommentHeader::new("vendor", vec!["A=1".into(), String::new()]);
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), header.encoded_len());
        assert_eq!(CommentHeader::parse(&bytes), Some(header));
    }

    #[test]
    fn empty_comment_list() {
        let bytes = comment_header("", &[]).unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(CommentHeader::parse(&bytes).unwrap().comments.len(), 0);
    }

    #[test]
    fn truncated_comment_is_rejected() {
        let bytes = comment_header("vendor", &["KEY=value".to_string()]).unwrap();
        assert!(CommentHeader::parse(&bytes[..bytes.len() - 1]).is_none());
    }
}
