use bytes::{Buf, Bytes};

/// A cursor over a received buffer. This should make it easier to parse PDUs.
///
/// Every `next_*` method advances past what it reads and returns `None`
/// without advancing if too few bytes are left. Byte runs come back as
/// [`Bytes`] slices of the original buffer, so labels and payloads are not
/// copied.
///
/// # Example
///
/// ```
/// # use nnn_core::wire::WireReader;
/// # use bytes::Bytes;
/// let mut reader = WireReader::new(Bytes::from_static(&[0xFF, 0x01, 0x09, 0x69]));
/// assert_eq!(reader.next_u16_be(), Some(0xFF01));
/// assert_eq!(reader.next_u8(), Some(0x09));
/// assert_eq!(reader.next_u64_be(), None); // There are not enough bytes to make a u64
/// assert_eq!(reader.position(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct WireReader {
    buf: Bytes,
    start_len: usize,
}

impl WireReader {
    pub fn new(buf: Bytes) -> Self {
        let start_len = buf.len();
        Self { buf, start_len }
    }

    /// The number of bytes read so far.
    pub fn position(&self) -> usize {
        self.start_len - self.buf.len()
    }

    /// The number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Reads the next `u32` without advancing.
    pub fn peek_u32_be(&self) -> Option<u32> {
        let bytes = self.buf.get(..4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn next_u8(&mut self) -> Option<u8> {
        (self.buf.remaining() >= 1).then(|| self.buf.get_u8())
    }

    pub fn next_u16_be(&mut self) -> Option<u16> {
        (self.buf.remaining() >= 2).then(|| self.buf.get_u16())
    }

    pub fn next_u32_be(&mut self) -> Option<u32> {
        (self.buf.remaining() >= 4).then(|| self.buf.get_u32())
    }

    pub fn next_u64_be(&mut self) -> Option<u64> {
        (self.buf.remaining() >= 8).then(|| self.buf.get_u64())
    }

    /// Reads the next `N` bytes into an array.
    pub fn next_n<const N: usize>(&mut self) -> Option<[u8; N]> {
        if self.buf.remaining() < N {
            return None;
        }
        let mut result = [0; N];
        self.buf.copy_to_slice(&mut result);
        Some(result)
    }

    /// Splits off the next `n` bytes.
    pub fn next_bytes(&mut self, n: usize) -> Option<Bytes> {
        (self.buf.remaining() >= n).then(|| self.buf.split_to(n))
    }

    /// Everything not read yet.
    pub fn into_rest(self) -> Bytes {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut reader = WireReader::new(Bytes::from_static(&[
            0x00, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78,
        ]));
        assert_eq!(reader.next_u8(), Some(0x00));
        assert_eq!(reader.peek_u32_be(), Some(0x12345678));
        assert_eq!(reader.next_u32_be(), Some(0x12345678));
        assert_eq!(reader.next_u64_be(), Some(0x1234567812345678));
        assert_eq!(reader.next_u8(), None);
        assert_eq!(reader.position(), 13);
    }

    #[test]
    fn short_reads_do_not_advance() {
        let mut reader = WireReader::new(Bytes::from_static(&[1, 2, 3, 4, 5]));
        assert_eq!(reader.next_n::<6>(), None);
        assert_eq!(reader.next_bytes(6), None);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.next_n::<2>(), Some([1, 2]));
        assert_eq!(reader.next_bytes(2).as_deref(), Some(&[3u8, 4][..]));
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.into_rest(), Bytes::from_static(&[5]));
    }
}
