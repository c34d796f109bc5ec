//! Little-endian byte cursor helpers shared by the frame and report codecs.

use crate::{FrameError, FrameResult};

/// Borrowing cursor over a received buffer.
///
/// Every read is bounds-checked; running off the end yields
/// [`FrameError::TooShort`] carrying the length that would have been needed.
#[derive(Debug, Clone)]
pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn read_array<const N: usize>(&mut self) -> FrameResult<[u8; N]> {
        let end = self.position.saturating_add(N);
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or(FrameError::TooShort {
                expected: end,
                actual: self.buffer.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.position = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> FrameResult<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_i8(&mut self) -> FrameResult<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16_le(&mut self) -> FrameResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Network byte order, used by the port fields of the config opcodes.
    pub fn read_u16_be(&mut self) -> FrameResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16_le(&mut self) -> FrameResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> FrameResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> FrameResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }
}

/// Append-only little-endian writer.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_i8(&mut self, value: i8) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u16_be(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i16_le(&mut self, value: i16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_i32_le(&mut self, value: i32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    /// Pad with zero bytes up to `len` total; no-op if already that long.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        if self.buffer.len() < len {
            self.buffer.resize(len, 0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_parser_u8() -> Result<(), FrameError> {
        let data = [0x01, 0x02, 0x03];
        let mut parser = ReportParser::new(&data);

        assert_eq!(parser.read_u8()?, 0x01);
        assert_eq!(parser.read_u8()?, 0x02);
        assert_eq!(parser.read_u8()?, 0x03);
        assert_eq!(
            parser.read_u8(),
            Err(FrameError::TooShort {
                expected: 4,
                actual: 3
            })
        );
        Ok(())
    }

    #[test]
    fn test_report_parser_u32_le() -> Result<(), FrameError> {
        let data = [0x78, 0x56, 0x34, 0x12];
        let mut parser = ReportParser::new(&data);

        assert_eq!(parser.read_u32_le()?, 0x1234_5678);
        assert_eq!(parser.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_report_parser_signed() -> Result<(), FrameError> {
        let data = [0xFB, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF];
        let mut parser = ReportParser::new(&data);

        assert_eq!(parser.read_i32_le()?, -5);
        assert_eq!(parser.read_i16_le()?, -2);
        Ok(())
    }

    #[test]
    fn test_report_parser_u16_be() -> Result<(), FrameError> {
        let data = [0x22, 0x68];
        let mut parser = ReportParser::new(&data);

        assert_eq!(parser.read_u16_be()?, 8808);
        Ok(())
    }

    #[test]
    fn test_report_parser_skip_clamps() {
        let data = [0u8; 4];
        let mut parser = ReportParser::new(&data);
        parser.skip(10);
        assert_eq!(parser.position(), 4);
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn test_report_builder() {
        let mut builder = ReportBuilder::with_capacity(16);

        builder
            .write_u8(0x01)
            .write_u16_le(0x1234)
            .write_u32_le(0x1234_5678)
            .write_u16_be(0xAABB);

        assert_eq!(
            builder.into_inner(),
            vec![0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xAA, 0xBB]
        );
    }

    #[test]
    fn test_report_builder_pad_to() {
        let mut builder = ReportBuilder::default();
        builder.write_u8(0xFF).pad_to(4);
        assert_eq!(builder.as_slice(), &[0xFF, 0, 0, 0]);

        builder.pad_to(2);
        assert_eq!(builder.len(), 4);
    }
}
