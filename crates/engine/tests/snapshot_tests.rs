//! Snapshot tests for rejection messages and emitted report bytes.

use hidbridge_engine::{
    AcceptAll, AuthError, Authenticator, Dispatch, Dispatcher, MacFilter, ReportMultiplexer,
    RejectReason, SequenceTracker, SessionGate,
};
use hidbridge_protocol::{
    AutoMove, Command, CommandFrame, FrameCodec, MouseButton, MouseMove, encode,
};
use insta::assert_snapshot;

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn reason(outcome: &Dispatch) -> String {
    match outcome {
        Dispatch::Rejected { reason } => reason.to_string(),
        other => format!("accepted: {other:?}"),
    }
}

#[test]
fn snapshot_auth_rejections() {
    let mut filtered = Dispatcher::new(
        MacFilter::new(0x1A2B_3C4D),
        FrameCodec::default(),
        SequenceTracker::default(),
    );
    let frame = CommandFrame::new(0, 0, 1, Command::MouseMove(MouseMove { x: 1, y: 1 }));
    assert_snapshot!(
        reason(&filtered.dispatch(&frame)),
        @"Authentication failed: MAC mismatch: expected 0x1a2b3c4d, got 0x00000000"
    );

    let mut gated: Dispatcher = Dispatcher::new(
        Box::new(SessionGate::new(AcceptAll)) as Box<dyn Authenticator>,
        FrameCodec::default(),
        SequenceTracker::default(),
    );
    assert_snapshot!(
        reason(&gated.dispatch(&frame)),
        @"Authentication failed: No session established; send connect first"
    );

    assert_snapshot!(
        RejectReason::from(AuthError::Rejected("tag revoked".to_string())).to_string(),
        @"Authentication failed: Rejected by authenticator: tag revoked"
    );
}

#[test]
fn snapshot_frame_and_sequence_rejections() {
    let mut dispatcher = Dispatcher::new(
        AcceptAll,
        FrameCodec::default(),
        SequenceTracker::new(true),
    );

    let mut unknown = [0u8; 16];
    unknown[12..].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    assert_snapshot!(
        reason(&dispatcher.dispatch_bytes(&unknown)),
        @"Malformed frame: Unknown opcode: 0xdeadbeef"
    );

    let mv = |indexpts| CommandFrame::new(0, 0, indexpts, Command::MouseMove(MouseMove { x: 1, y: 1 }));
    dispatcher.dispatch(&mv(10));
    assert_snapshot!(
        reason(&dispatcher.dispatch(&mv(9))),
        @"Stale sequence number 9 (last accepted 10)"
    );
}

#[test]
fn snapshot_reports_from_commands() {
    let mut dispatcher = Dispatcher::<AcceptAll>::default();
    let mut mux = ReportMultiplexer::new();
    let commands = [
        Command::MouseMove(MouseMove { x: 10, y: -5 }),
        Command::MouseButton {
            button: MouseButton::Left,
            state: 1,
        },
    ];
    for (index, command) in (1u32..).zip(commands) {
        if let Dispatch::Motion(motion) =
            dispatcher.dispatch_bytes(&encode(&CommandFrame::new(0, 0, index, command)))
        {
            mux.apply(motion);
        }
    }
    assert_snapshot!(hex(&mux.tick(10).mouse.to_bytes()), @"01 0a 00 fb ff 00");
    assert_snapshot!(hex(&mux.tick(10).mouse.to_bytes()), @"01 00 00 00 00 00");

    if let Dispatch::Motion(motion) = dispatcher.dispatch_bytes(&encode(&CommandFrame::new(
        0,
        0,
        3,
        Command::AutoMove(AutoMove {
            x: 30,
            y: 0,
            duration_ms: 30,
        }),
    ))) {
        mux.apply(motion);
    }
    let ticks = (0..3)
        .map(|_| hex(&mux.tick(10).mouse.to_bytes()))
        .collect::<Vec<_>>()
        .join("\n");
    assert_snapshot!(ticks, @r"
    01 0a 00 00 00 00
    01 0a 00 00 00 00
    01 0a 00 00 00 00
    ");
}
