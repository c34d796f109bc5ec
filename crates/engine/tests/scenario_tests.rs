//! End-to-end scenarios: raw frames through the dispatcher into the
//! multiplexer, one report per tick.

use hidbridge_engine::{
    AcceptAll, Dispatch, Dispatcher, MotionCommand, MultiplexerState, ReportMultiplexer,
};
use hidbridge_protocol::{
    AutoMove, BezierMove, CapturedMouseReport, Command, CommandFrame, MaskConfig, MouseButton,
    MouseButtons, MouseMove, MouseReport, encode,
};

const TICK_MS: u32 = 100;

struct Bridge {
    dispatcher: Dispatcher<AcceptAll>,
    mux: ReportMultiplexer,
    next_index: u32,
}

impl Bridge {
    fn new() -> Self {
        Self {
            dispatcher: Dispatcher::default(),
            mux: ReportMultiplexer::new(),
            next_index: 1,
        }
    }

    fn send(&mut self, command: Command) -> Dispatch {
        let frame = CommandFrame::new(0x0102_0304, 0, self.next_index, command);
        self.next_index += 1;
        self.send_bytes(&encode(&frame))
    }

    fn send_bytes(&mut self, bytes: &[u8]) -> Dispatch {
        let outcome = self.dispatcher.dispatch_bytes(bytes);
        if let Dispatch::Motion(command) = &outcome {
            self.mux.apply(*command);
        }
        outcome
    }

    fn tick(&mut self) -> MouseReport {
        self.mux.tick(TICK_MS).mouse
    }
}

#[test]
fn test_mouse_move_single_report() {
    let mut bridge = Bridge::new();
    bridge.mux.apply(MotionCommand::ButtonState {
        button: MouseButton::Middle,
        pressed: true,
    });
    bridge.tick();

    bridge.send(Command::MouseMove(MouseMove { x: 10, y: -5 }));
    let report = bridge.tick();
    assert_eq!((report.x, report.y), (10, -5));
    assert!(report.buttons.is_pressed(MouseButton::Middle));

    let next = bridge.tick();
    assert_eq!((next.x, next.y), (0, 0));
}

#[test]
fn test_bezier_move_spread_over_ticks() {
    let mut bridge = Bridge::new();
    let outcome = bridge.send(Command::BezierMove(BezierMove {
        target_x: 100,
        target_y: 0,
        ctrl_x1: 30,
        ctrl_y1: 50,
        ctrl_x2: 70,
        ctrl_y2: -50,
        duration_ms: 500,
    }));
    assert!(outcome.is_accepted());
    assert_eq!(bridge.mux.state(), MultiplexerState::InjectedMotionActive);

    let reports: Vec<MouseReport> = (0..5).map(|_| bridge.tick()).collect();
    let sum_x: i32 = reports.iter().map(|r| i32::from(r.x)).sum();
    let sum_y: i32 = reports.iter().map(|r| i32::from(r.y)).sum();
    assert_eq!((sum_x, sum_y), (100, 0));
    assert!(reports.iter().all(|r| r.x > 0));
    assert_eq!(bridge.mux.state(), MultiplexerState::Idle);

    assert!(bridge.tick().is_idle());
}

#[test]
fn test_mask_then_unmask_left_button() {
    let mut bridge = Bridge::new();
    bridge.send(Command::MaskMouse(MaskConfig {
        mask_left: 1,
        ..MaskConfig::default()
    }));
    bridge.mux.merge_captured(&CapturedMouseReport {
        buttons: MouseButtons::from_bits(MouseButtons::LEFT),
        ..CapturedMouseReport::default()
    });

    assert!(!bridge.tick().buttons.is_pressed(MouseButton::Left));

    bridge.send(Command::UnmaskAll);
    assert!(bridge.tick().buttons.is_pressed(MouseButton::Left));
}

#[test]
fn test_new_timed_move_replaces_active_one() {
    let mut bridge = Bridge::new();
    bridge.send(Command::AutoMove(AutoMove {
        x: 1000,
        y: 0,
        duration_ms: 1000,
    }));
    let first = bridge.tick();
    assert_eq!(first.x, 100);

    bridge.send(Command::AutoMove(AutoMove {
        x: 0,
        y: 40,
        duration_ms: 200,
    }));
    let rest: Vec<MouseReport> = (0..2).map(|_| bridge.tick()).collect();
    assert!(rest.iter().all(|r| r.x == 0));
    assert_eq!(rest.iter().map(|r| i32::from(r.y)).sum::<i32>(), 40);
    assert_eq!(bridge.mux.state(), MultiplexerState::Idle);
    assert_eq!(bridge.mux.mouse_state().position, (100, 40));
}

#[test]
fn test_unknown_opcode_leaves_state_untouched() {
    let mut bridge = Bridge::new();
    bridge.send(Command::MouseButton {
        button: MouseButton::Right,
        state: 1,
    });

    let mut bytes = Vec::new();
    for field in [0x0102_0304u32, 0, 99, 0xDEAD_BEEF] {
        bytes.extend_from_slice(&field.to_le_bytes());
    }
    bytes.extend_from_slice(&[0u8; 8]);
    assert!(!bridge.send_bytes(&bytes).is_accepted());

    let report = bridge.tick();
    assert!(report.buttons.is_pressed(MouseButton::Right));
    assert_eq!((report.x, report.y, report.wheel), (0, 0, 0));
    assert_eq!(bridge.dispatcher.stats().rejected_frame, 1);
}

#[test]
fn test_reboot_is_a_config_mutation() {
    let mut bridge = Bridge::new();
    bridge.send(Command::MouseButton {
        button: MouseButton::Left,
        state: 1,
    });
    let outcome = bridge.send(Command::Reboot);
    assert!(matches!(outcome, Dispatch::Config(_)));

    // the bridge loop owns the reset; the multiplexer is untouched until then
    assert!(bridge.tick().buttons.is_pressed(MouseButton::Left));
    bridge.mux.reset();
    assert_eq!(bridge.tick(), MouseReport::default());
}

#[test]
fn test_replaced_bezier_drops_clamped_remainder() {
    let mut bridge = Bridge::new();
    bridge.send(Command::BezierMove(BezierMove {
        target_x: 100_000,
        target_y: 0,
        ctrl_x1: 30_000,
        ctrl_y1: 0,
        ctrl_x2: 70_000,
        ctrl_y2: 0,
        duration_ms: 200,
    }));
    // halfway along the curve is x = 50_000, more than one report can carry
    assert_eq!(bridge.tick().x, i16::MAX);

    bridge.send(Command::BezierMove(BezierMove {
        target_x: 0,
        target_y: 50,
        ctrl_x1: 0,
        ctrl_y1: 10,
        ctrl_x2: 0,
        ctrl_y2: 40,
        duration_ms: 200,
    }));
    let rest: Vec<(i16, i16)> = (0..3).map(|_| bridge.tick()).map(|r| (r.x, r.y)).collect();
    assert_eq!(rest, vec![(0, 25), (0, 25), (0, 0)]);
    assert_eq!(bridge.mux.state(), MultiplexerState::Idle);
    assert_eq!(
        bridge.mux.mouse_state().position,
        (i64::from(i16::MAX), 50)
    );
}

#[test]
fn test_finished_move_carry_does_not_leak_into_next_move() {
    let mut bridge = Bridge::new();
    bridge.send(Command::AutoMove(AutoMove {
        x: 100_000,
        y: 0,
        duration_ms: 100,
    }));
    assert_eq!(bridge.tick().x, i16::MAX);
    assert_eq!(bridge.mux.state(), MultiplexerState::Idle);

    bridge.send(Command::AutoMove(AutoMove {
        x: 0,
        y: 20,
        duration_ms: 200,
    }));
    let rest: Vec<(i16, i16)> = (0..2).map(|_| bridge.tick()).map(|r| (r.x, r.y)).collect();
    assert_eq!(rest, vec![(0, 10), (0, 10)]);
}
