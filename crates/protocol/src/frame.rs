//! Command frame codec.
//!
//! Wire layout (little-endian, packed):
//!
//! | Offset | Field      | Type |
//! |--------|------------|------|
//! | 0      | `mac`      | u32  |
//! | 4      | `rand`     | u32  |
//! | 8      | `indexpts` | u32  |
//! | 12     | `cmd`      | u32  |
//! | 16     | payload    | opcode-specific, see [`Opcode::payload_size`] |
//!
//! The payload is decoded once, here, into [`Command`]. Nothing past this
//! boundary looks at raw payload bytes.

use serde::{Deserialize, Serialize};

use crate::codec::{ReportBuilder, ReportParser};
use crate::opcode::{KEYBOARD_KEYS, MAX_PAYLOAD_SIZE, Opcode, PICTURE_PIXELS};
use crate::report::MouseButton;
use crate::{FrameError, FrameResult};

pub const HEADER_SIZE: usize = 16;

/// Length of every frame under [`FrameLayout::FullUnion`].
pub const FULL_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// The 16-byte frame header exactly as it sits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub mac: u32,
    pub rand: u32,
    pub indexpts: u32,
    pub cmd: u32,
}

impl FrameHeader {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buffer = [0u8; HEADER_SIZE];
        let fields = [self.mac, self.rand, self.indexpts, self.cmd];
        for (chunk, field) in buffer.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        buffer
    }

    pub fn decode(bytes: &[u8]) -> FrameResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::TooShort {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut parser = ReportParser::new(bytes);
        Ok(Self {
            mac: parser.read_u32_le()?,
            rand: parser.read_u32_le()?,
            indexpts: parser.read_u32_le()?,
            cmd: parser.read_u32_le()?,
        })
    }

    pub fn opcode(&self) -> FrameResult<Opcode> {
        Opcode::try_from(self.cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseMove {
    pub x: i32,
    pub y: i32,
}

/// Linear move spread over `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoMove {
    pub x: i32,
    pub y: i32,
    pub duration_ms: u32,
}

/// Cubic Bezier move. All points are offsets from the pointer position at
/// the time the command is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BezierMove {
    pub target_x: i32,
    pub target_y: i32,
    pub ctrl_x1: i32,
    pub ctrl_y1: i32,
    pub ctrl_x2: i32,
    pub ctrl_y2: i32,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardPayload {
    pub ctrl: u8,
    pub reserved: u8,
    pub keys: [u8; KEYBOARD_KEYS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugConfig {
    pub port: u16,
    pub enable: u8,
}

/// Raw mask flags; any non-zero value masks the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskConfig {
    pub mask_left: i32,
    pub mask_right: i32,
    pub mask_middle: i32,
    pub mask_movement: i32,
}

impl MaskConfig {
    pub fn left(&self) -> bool {
        self.mask_left != 0
    }

    pub fn right(&self) -> bool {
        self.mask_right != 0
    }

    pub fn middle(&self) -> bool {
        self.mask_middle != 0
    }

    pub fn movement(&self) -> bool {
        self.mask_movement != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkConfig {
    pub ip: [u8; 4],
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub pixels: Box<[u16; PICTURE_PIXELS]>,
}

impl Default for Picture {
    fn default() -> Self {
        Self {
            pixels: Box::new([0u16; PICTURE_PIXELS]),
        }
    }
}

/// Decoded payload, one variant per opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    MouseMove(MouseMove),
    MouseButton { button: MouseButton, state: u8 },
    MouseWheel { value: i32 },
    AutoMove(AutoMove),
    Keyboard(KeyboardPayload),
    Reboot,
    BezierMove(BezierMove),
    Monitor(MonitorConfig),
    Debug(DebugConfig),
    MaskMouse(MaskConfig),
    UnmaskAll,
    SetConfig(NetworkConfig),
    ShowPicture(Picture),
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Connect => Opcode::Connect,
            Command::MouseMove(_) => Opcode::MouseMove,
            Command::MouseButton { button, .. } => match button {
                MouseButton::Left => Opcode::MouseLeft,
                MouseButton::Middle => Opcode::MouseMiddle,
                MouseButton::Right => Opcode::MouseRight,
            },
            Command::MouseWheel { .. } => Opcode::MouseWheel,
            Command::AutoMove(_) => Opcode::MouseAutoMove,
            Command::Keyboard(_) => Opcode::KeyboardAll,
            Command::Reboot => Opcode::Reboot,
            Command::BezierMove(_) => Opcode::BezierMove,
            Command::Monitor(_) => Opcode::Monitor,
            Command::Debug(_) => Opcode::Debug,
            Command::MaskMouse(_) => Opcode::MaskMouse,
            Command::UnmaskAll => Opcode::UnmaskAll,
            Command::SetConfig(_) => Opcode::SetConfig,
            Command::ShowPicture(_) => Opcode::ShowPicture,
        }
    }

    fn decode(opcode: Opcode, parser: &mut ReportParser<'_>) -> FrameResult<Self> {
        let command = match opcode {
            Opcode::Connect => Command::Connect,
            Opcode::Reboot => Command::Reboot,
            Opcode::UnmaskAll => Command::UnmaskAll,
            Opcode::MouseMove => Command::MouseMove(MouseMove {
                x: parser.read_i32_le()?,
                y: parser.read_i32_le()?,
            }),
            Opcode::MouseLeft => Command::MouseButton {
                button: MouseButton::Left,
                state: parser.read_u8()?,
            },
            Opcode::MouseMiddle => Command::MouseButton {
                button: MouseButton::Middle,
                state: parser.read_u8()?,
            },
            Opcode::MouseRight => Command::MouseButton {
                button: MouseButton::Right,
                state: parser.read_u8()?,
            },
            Opcode::MouseWheel => Command::MouseWheel {
                value: parser.read_i32_le()?,
            },
            Opcode::MouseAutoMove => Command::AutoMove(AutoMove {
                x: parser.read_i32_le()?,
                y: parser.read_i32_le()?,
                duration_ms: parser.read_u32_le()?,
            }),
            Opcode::KeyboardAll => Command::Keyboard(KeyboardPayload {
                ctrl: parser.read_u8()?,
                reserved: parser.read_u8()?,
                keys: parser.read_array()?,
            }),
            Opcode::BezierMove => Command::BezierMove(BezierMove {
                target_x: parser.read_i32_le()?,
                target_y: parser.read_i32_le()?,
                ctrl_x1: parser.read_i32_le()?,
                ctrl_y1: parser.read_i32_le()?,
                ctrl_x2: parser.read_i32_le()?,
                ctrl_y2: parser.read_i32_le()?,
                duration_ms: parser.read_u32_le()?,
            }),
            Opcode::Monitor => {
                let port = parser.read_u16_be()?;
                parser.skip(2);
                Command::Monitor(MonitorConfig { port })
            }
            Opcode::Debug => {
                let port = parser.read_u16_be()?;
                let enable = parser.read_u8()?;
                parser.skip(1);
                Command::Debug(DebugConfig { port, enable })
            }
            Opcode::MaskMouse => Command::MaskMouse(MaskConfig {
                mask_left: parser.read_i32_le()?,
                mask_right: parser.read_i32_le()?,
                mask_middle: parser.read_i32_le()?,
                mask_movement: parser.read_i32_le()?,
            }),
            Opcode::SetConfig => {
                let ip = parser.read_array()?;
                let port = parser.read_u16_be()?;
                parser.skip(2);
                Command::SetConfig(NetworkConfig { ip, port })
            }
            Opcode::ShowPicture => {
                let mut picture = Picture::default();
                for pixel in picture.pixels.iter_mut() {
                    *pixel = parser.read_u16_le()?;
                }
                Command::ShowPicture(picture)
            }
        };
        Ok(command)
    }

    fn encode(&self, builder: &mut ReportBuilder) {
        match self {
            Command::Connect | Command::Reboot | Command::UnmaskAll => {}
            Command::MouseMove(m) => {
                builder.write_i32_le(m.x).write_i32_le(m.y);
            }
            Command::MouseButton { state, .. } => {
                builder.write_u8(*state);
            }
            Command::MouseWheel { value } => {
                builder.write_i32_le(*value);
            }
            Command::AutoMove(m) => {
                builder
                    .write_i32_le(m.x)
                    .write_i32_le(m.y)
                    .write_u32_le(m.duration_ms);
            }
            Command::Keyboard(k) => {
                builder
                    .write_u8(k.ctrl)
                    .write_u8(k.reserved)
                    .write_bytes(&k.keys);
            }
            Command::BezierMove(b) => {
                builder
                    .write_i32_le(b.target_x)
                    .write_i32_le(b.target_y)
                    .write_i32_le(b.ctrl_x1)
                    .write_i32_le(b.ctrl_y1)
                    .write_i32_le(b.ctrl_x2)
                    .write_i32_le(b.ctrl_y2)
                    .write_u32_le(b.duration_ms);
            }
            Command::Monitor(m) => {
                builder.write_u16_be(m.port).write_u16_le(0);
            }
            Command::Debug(d) => {
                builder.write_u16_be(d.port).write_u8(d.enable).write_u8(0);
            }
            Command::MaskMouse(m) => {
                builder
                    .write_i32_le(m.mask_left)
                    .write_i32_le(m.mask_right)
                    .write_i32_le(m.mask_middle)
                    .write_i32_le(m.mask_movement);
            }
            Command::SetConfig(n) => {
                builder.write_bytes(&n.ip).write_u16_be(n.port).write_u16_le(0);
            }
            Command::ShowPicture(p) => {
                for pixel in p.pixels.iter() {
                    builder.write_u16_le(*pixel);
                }
            }
        }
    }
}

/// A fully decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub mac: u32,
    pub rand: u32,
    pub indexpts: u32,
    pub command: Command,
}

impl CommandFrame {
    pub fn new(mac: u32, rand: u32, indexpts: u32, command: Command) -> Self {
        Self {
            mac,
            rand,
            indexpts,
            command,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.command.opcode()
    }

    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            mac: self.mac,
            rand: self.rand,
            indexpts: self.indexpts,
            cmd: self.opcode().value(),
        }
    }
}

/// How frame length relates to the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameLayout {
    /// Exactly `16 + payload_size(opcode)` bytes.
    #[default]
    Compact,
    /// Always `16 + 1024` bytes; the payload is a prefix of the union.
    FullUnion,
}

impl FrameLayout {
    pub fn frame_len(self, opcode: Opcode) -> usize {
        match self {
            FrameLayout::Compact => HEADER_SIZE + opcode.payload_size(),
            FrameLayout::FullUnion => FULL_FRAME_SIZE,
        }
    }
}

/// Frame codec bound to one [`FrameLayout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    layout: FrameLayout,
}

impl FrameCodec {
    pub fn new(layout: FrameLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Decode one received datagram.
    ///
    /// # Errors
    ///
    /// - [`FrameError::TooShort`] if the header is incomplete.
    /// - [`FrameError::UnknownOpcode`] if `cmd` is not in the opcode table.
    /// - [`FrameError::PayloadSizeMismatch`] if the total length is not the
    ///   one the layout demands for that opcode.
    pub fn decode(&self, bytes: &[u8]) -> FrameResult<CommandFrame> {
        let header = FrameHeader::decode(bytes)?;
        let opcode = header.opcode()?;

        let expected = self.layout.frame_len(opcode);
        if bytes.len() != expected {
            return Err(FrameError::PayloadSizeMismatch {
                opcode: opcode.name(),
                expected,
                actual: bytes.len(),
            });
        }

        let mut parser = ReportParser::new(bytes);
        parser.skip(HEADER_SIZE);
        let command = Command::decode(opcode, &mut parser)?;

        Ok(CommandFrame {
            mac: header.mac,
            rand: header.rand,
            indexpts: header.indexpts,
            command,
        })
    }

    pub fn encode(&self, frame: &CommandFrame) -> Vec<u8> {
        let opcode = frame.opcode();
        let len = self.layout.frame_len(opcode);
        let mut builder = ReportBuilder::with_capacity(len);
        builder.write_bytes(&frame.header().encode());
        frame.command.encode(&mut builder);
        builder.pad_to(len);
        builder.into_inner()
    }
}

/// Decode with the default compact layout.
pub fn decode(bytes: &[u8]) -> FrameResult<CommandFrame> {
    FrameCodec::default().decode(bytes)
}

/// Encode with the default compact layout.
pub fn encode(frame: &CommandFrame) -> Vec<u8> {
    FrameCodec::default().encode(frame)
}
