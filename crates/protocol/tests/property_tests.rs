//! Property-based tests for the command frame codec.
//!
//! Uses proptest with 500 cases to check that every opcode survives an
//! encode/decode pass under both layouts, and that malformed frames are
//! rejected before anything is decoded.

use hidbridge_protocol::{
    AutoMove, BezierMove, Command, CommandFrame, DebugConfig, FULL_FRAME_SIZE, FrameCodec,
    FrameError, FrameLayout, HEADER_SIZE, KEYBOARD_KEYS, KeyboardPayload, MaskConfig,
    MonitorConfig, MouseButton, MouseMove, NetworkConfig, Opcode, Picture, decode, encode,
};
use proptest::prelude::*;

fn button_strategy() -> impl Strategy<Value = MouseButton> {
    prop_oneof![
        Just(MouseButton::Left),
        Just(MouseButton::Right),
        Just(MouseButton::Middle),
    ]
}

fn mouse_command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Connect),
        Just(Command::Reboot),
        Just(Command::UnmaskAll),
        (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Command::MouseMove(MouseMove { x, y })),
        (button_strategy(), any::<u8>())
            .prop_map(|(button, state)| Command::MouseButton { button, state }),
        any::<i32>().prop_map(|value| Command::MouseWheel { value }),
        (any::<i32>(), any::<i32>(), any::<u32>()).prop_map(|(x, y, duration_ms)| {
            Command::AutoMove(AutoMove { x, y, duration_ms })
        }),
    ]
}

fn config_command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (any::<u8>(), any::<u8>(), any::<[u8; KEYBOARD_KEYS]>()).prop_map(
            |(ctrl, reserved, keys)| Command::Keyboard(KeyboardPayload {
                ctrl,
                reserved,
                keys
            })
        ),
        (any::<[i32; 6]>(), any::<u32>()).prop_map(|(p, duration_ms)| {
            Command::BezierMove(BezierMove {
                target_x: p[0],
                target_y: p[1],
                ctrl_x1: p[2],
                ctrl_y1: p[3],
                ctrl_x2: p[4],
                ctrl_y2: p[5],
                duration_ms,
            })
        }),
        any::<u16>().prop_map(|port| Command::Monitor(MonitorConfig { port })),
        (any::<u16>(), any::<u8>())
            .prop_map(|(port, enable)| Command::Debug(DebugConfig { port, enable })),
        any::<[i32; 4]>().prop_map(|m| Command::MaskMouse(MaskConfig {
            mask_left: m[0],
            mask_right: m[1],
            mask_middle: m[2],
            mask_movement: m[3],
        })),
        (any::<[u8; 4]>(), any::<u16>())
            .prop_map(|(ip, port)| Command::SetConfig(NetworkConfig { ip, port })),
        any::<u16>().prop_map(|seed| {
            let mut picture = Picture::default();
            for (i, px) in picture.pixels.iter_mut().enumerate() {
                *px = seed.wrapping_add(i as u16);
            }
            Command::ShowPicture(picture)
        }),
    ]
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![mouse_command_strategy(), config_command_strategy()]
}

fn frame_strategy() -> impl Strategy<Value = CommandFrame> {
    (any::<u32>(), any::<u32>(), any::<u32>(), command_strategy())
        .prop_map(|(mac, rand, indexpts, command)| CommandFrame::new(mac, rand, indexpts, command))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Compact frames are exactly header + payload and decode back unchanged.
    #[test]
    fn prop_compact_round_trip(frame in frame_strategy()) {
        let bytes = encode(&frame);
        prop_assert_eq!(bytes.len(), HEADER_SIZE + frame.opcode().payload_size());
        prop_assert_eq!(decode(&bytes), Ok(frame));
    }

    /// Full-union frames are always 1040 bytes and decode back unchanged.
    #[test]
    fn prop_full_union_round_trip(frame in frame_strategy()) {
        let codec = FrameCodec::new(FrameLayout::FullUnion);
        let bytes = codec.encode(&frame);
        prop_assert_eq!(bytes.len(), FULL_FRAME_SIZE);
        prop_assert_eq!(codec.decode(&bytes), Ok(frame));
    }

    /// Anything shorter than the header is rejected as too short.
    #[test]
    fn prop_short_input_rejected(data in proptest::collection::vec(any::<u8>(), 0..HEADER_SIZE)) {
        let result = decode(&data);
        prop_assert_eq!(
            result,
            Err(FrameError::TooShort { expected: HEADER_SIZE, actual: data.len() })
        );
    }

    /// Any `cmd` outside the table is rejected regardless of payload.
    #[test]
    fn prop_unknown_opcode_rejected(
        cmd in any::<u32>().prop_filter("known opcode", |c| Opcode::try_from(*c).is_err()),
        payload in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut data = Vec::with_capacity(HEADER_SIZE + payload.len());
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&cmd.to_le_bytes());
        data.extend_from_slice(&payload);
        prop_assert_eq!(decode(&data), Err(FrameError::UnknownOpcode(cmd)));
    }

    /// A compact frame whose length differs from the opcode's size never decodes.
    #[test]
    fn prop_wrong_length_rejected(
        frame in frame_strategy(),
        extra in 1usize..8,
        truncate in any::<bool>(),
    ) {
        let mut bytes = encode(&frame);
        let expected = bytes.len();
        if truncate {
            let cut = extra.min(expected - HEADER_SIZE);
            prop_assume!(cut > 0);
            bytes.truncate(expected - cut);
        } else {
            bytes.extend(std::iter::repeat_n(0u8, extra));
        }
        let is_size_mismatch = matches!(
            decode(&bytes),
            Err(FrameError::PayloadSizeMismatch { expected: e, .. }) if e == expected
        );
        prop_assert!(is_size_mismatch);
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn prop_decode_arbitrary_never_panics(data in proptest::collection::vec(any::<u8>(), 0..1100)) {
        let _ = decode(&data);
        let _ = FrameCodec::new(FrameLayout::FullUnion).decode(&data);
    }
}
