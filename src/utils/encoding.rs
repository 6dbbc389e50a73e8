use std::io::{self, Read, Write};

/// Encode a u32 as a variable-length integer
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 32 {
            return None;
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None
}

/// Delta-encode a sorted, deduplicated list of record ids
pub fn delta_encode(values: &[u32], buf: &mut Vec<u8>) {
    let mut prev = 0u32;
    for &value in values {
        encode_varint(value - prev, buf);
        prev = value;
    }
}

/// Delta-decode a postings list
pub fn delta_decode(buf: &[u8]) -> Vec<u32> {
    let mut result = Vec::new();
    let mut prev = 0u32;
    let mut pos = 0;

    while pos < buf.len() {
        match decode_varint(&buf[pos..]) {
            Some((delta, consumed)) => {
                prev = prev.saturating_add(delta);
                result.push(prev);
                pos += consumed;
            }
            None => break,
        }
    }

    result
}

pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn write_u64_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub fn read_u64_le<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a u32 length prefix followed by the UTF-8 bytes
pub fn write_str<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    write_u32_le(writer, value.len() as u32)?;
    writer.write_all(value.as_bytes())
}

/// Read a string written by [`write_str`]
pub fn read_str<R: Read>(reader: &mut R) -> io::Result<String> {
    let len = read_u32_le(reader)? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        let values = [0, 1, 127, 128, 16383, 16384, u32::MAX];
        for value in values {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, consumed) = decode_varint(&buf).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn test_delta_encoding() {
        let values = vec![0, 5, 10, 15, 100, 1000];
        let mut buf = Vec::new();
        delta_encode(&values, &mut buf);
        assert_eq!(delta_decode(&buf), values);
    }

    #[test]
    fn test_decode_truncated_varint() {
        assert_eq!(decode_varint(&[0x80, 0x80]), None);
    }

    #[test]
    fn test_str_prefix() {
        let mut buf = Vec::new();
        write_str(&mut buf, "ユーザ").unwrap();
        write_str(&mut buf, "").unwrap();

        let mut cursor = io::Cursor::new(buf);
        assert_eq!(read_str(&mut cursor).unwrap(), "ユーザ");
        assert_eq!(read_str(&mut cursor).unwrap(), "");
    }
}
