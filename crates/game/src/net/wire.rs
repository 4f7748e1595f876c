use super::protocol::DecodeError;

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn with_tag(tag: u8) -> Self {
        let mut buf = Vec::with_capacity(32);
        buf.push(tag);
        Self { buf }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i64(&mut self, v: i64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let slice = self.buf.get(self.pos..end).ok_or(DecodeError::Truncated {
            field,
            needed: N,
            remaining: self.remaining(),
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        self.take::<1>(field).map(|b| b[0])
    }

    pub fn bool(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        match self.u8(field)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidValue {
                field,
                value: other as i64,
            }),
        }
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        self.take(field).map(u16::from_be_bytes)
    }

    pub fn i32(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        self.take(field).map(i32::from_be_bytes)
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        self.take(field).map(u32::from_be_bytes)
    }

    pub fn i64(&mut self, field: &'static str) -> Result<i64, DecodeError> {
        self.take(field).map(i64::from_be_bytes)
    }

    pub fn f32(&mut self, field: &'static str) -> Result<f32, DecodeError> {
        self.take(field).map(f32::from_be_bytes)
    }

    pub fn bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + len;
        let slice = self.buf.get(self.pos..end).ok_or(DecodeError::Truncated {
            field,
            needed: len,
            remaining: self.remaining(),
        })?;
        self.pos = end;
        Ok(slice)
    }

    pub fn length(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let len = self.i32(field)?;
        usize::try_from(len).map_err(|_| DecodeError::NegativeLength { field, len })
    }

    // Optional trailing fields: absent only when the payload ends exactly at
    // the field boundary. A partial field is still a truncation error.
    pub fn opt<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        if self.is_empty() {
            Ok(None)
        } else {
            read(self).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_layout() {
        let mut w = Writer::with_tag(0x04);
        w.i32(1).u16(0x0102).i64(-1);
        let bytes = w.finish();
        assert_eq!(&bytes[..7], &[0x04, 0, 0, 0, 1, 0x01, 0x02]);
        assert_eq!(&bytes[7..], &[0xFF; 8]);
    }

    #[test]
    fn partial_field_is_truncation() {
        let mut r = Reader::new(&[0, 0, 1]);
        assert!(matches!(
            r.opt(|r| r.i32("x")),
            Err(DecodeError::Truncated { needed: 4, remaining: 3, .. })
        ));
        let mut r = Reader::new(&[]);
        assert_eq!(r.opt(|r| r.i32("x")).unwrap(), None);
    }

    #[test]
    fn negative_length_rejected() {
        let bytes = (-1i32).to_be_bytes();
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            r.length("name_len"),
            Err(DecodeError::NegativeLength { len: -1, .. })
        ));
    }
}
