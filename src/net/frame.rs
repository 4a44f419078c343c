//! Message framing
//!
//! Every message is a 4-byte big-endian length followed by that many bytes of
//! UTF-8 text. Empty messages are valid and meaningful (an empty storage
//! reply means "not found").

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};

/// Maximum payload size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Header size in bytes
pub const HEADER_SIZE: usize = 4;

/// Encode a message into a frame
pub fn encode(payload: &str) -> Result<BytesMut> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(Error::FrameTooLarge(payload.len()));
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload.as_bytes());
    Ok(buf)
}

/// Write one framed message and flush
pub fn write_frame<W: Write>(writer: &mut W, payload: &str) -> Result<()> {
    let frame = encode(payload)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed message.
///
/// Returns `None` when the peer closed the stream before a new frame began.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<String>> {
    let len = match reader.read_u32::<BigEndian>() {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if len > MAX_FRAME_SIZE {
        return Err(Error::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(String::from_utf8(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_layout() {
        let frame = encode("abc").unwrap();
        assert_eq!(&frame[..], &[0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_sequential_frames() {
        let mut buf = Vec::new();
        write_frame(&mut buf, "from a.csv").unwrap();
        write_frame(&mut buf, "").unwrap();

        let mut reader = Cursor::new(buf);
        assert_eq!(read_frame(&mut reader).unwrap(), Some("from a.csv".to_string()));
        assert_eq!(read_frame(&mut reader).unwrap(), Some(String::new()));
        assert_eq!(read_frame(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_truncated_payload() {
        let mut reader = Cursor::new(vec![0, 0, 0, 9, b'x']);
        assert!(matches!(read_frame(&mut reader), Err(Error::IoError(_))));
    }

    #[test]
    fn test_oversized_frame() {
        let mut reader = Cursor::new(u32::MAX.to_be_bytes().to_vec());
        assert!(matches!(read_frame(&mut reader), Err(Error::FrameTooLarge(_))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = Cursor::new(vec![0, 0, 0, 2, 0xff, 0xfe]);
        assert!(matches!(read_frame(&mut reader), Err(Error::InvalidUtf8(_))));
    }
}
