//! Decoder protocol tests: whole sequences in, typed events out.

use pretty_assertions::assert_eq;
use ttyinput::{
    Decoder, DecoderOptions, InputEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseKind, QuirkProfile,
};

fn collect(opts: DecoderOptions, input: &[u8]) -> Vec<InputEvent> {
    let mut decoder = Decoder::new(opts);
    decoder.feed(input);
    decoder.idle();
    let mut events = Vec::new();
    while let Some(ev) = decoder.next() {
        events.push(ev);
    }
    events
}

fn collect_default(input: &[u8]) -> Vec<InputEvent> {
    collect(DecoderOptions::default(), input)
}

fn kitty_opts() -> DecoderOptions {
    DecoderOptions {
        kitty_keyboard: true,
        ..DecoderOptions::default()
    }
}

#[test]
fn plain_text() {
    let events = collect_default(b"hi");
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('h'), modifiers, .. })
            if modifiers.is_empty()
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('i'), .. })
    ));
}

#[test]
fn utf8_multibyte_text() {
    let events = collect_default("é🤣".as_bytes());
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('é'), .. })
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('🤣'), .. })
    ));
}

#[test]
fn utf8_split_across_chunks() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    let bytes = "🤣".as_bytes();
    decoder.feed(&bytes[..2]);
    assert!(!decoder.has_events());
    decoder.feed(&bytes[2..]);
    assert!(matches!(
        decoder.next(),
        Some(InputEvent::Key(KeyEvent { code: KeyCode::Char('🤣'), .. }))
    ));
}

#[test]
fn byte_by_byte_equals_single_chunk() {
    let input: &[u8] = b"a\x1b[A\x1b[<0;3;4M\x1b[200~x\x1b[201~\x1b[1;5D\xc3\xa9";
    let whole = collect_default(input);
    let mut decoder = Decoder::new(DecoderOptions::default());
    for &b in input {
        decoder.feed(&[b]);
    }
    decoder.idle();
    let mut bytewise = Vec::new();
    while let Some(ev) = decoder.next() {
        bytewise.push(ev);
    }
    assert_eq!(whole, bytewise);
}

#[test]
fn arrow_keys() {
    for (bytes, code) in [
        (b"\x1b[A".as_slice(), KeyCode::Up),
        (b"\x1b[B", KeyCode::Down),
        (b"\x1b[C", KeyCode::Right),
        (b"\x1b[D", KeyCode::Left),
        (b"\x1b[H", KeyCode::Home),
        (b"\x1b[F", KeyCode::End),
    ] {
        let events = collect_default(bytes);
        assert_eq!(events.len(), 1, "for {bytes:?}");
        assert!(matches!(
            &events[0],
            InputEvent::Key(KeyEvent { code: c, kind: None, .. }) if *c == code
        ));
    }
}

#[test]
fn ss3_keys() {
    let events = collect_default(b"\x1bOA\x1bOP\x1bOR");
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Up, .. })
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::F(1), .. })
    ));
    assert!(matches!(
        &events[2],
        InputEvent::Key(KeyEvent { code: KeyCode::F(3), .. })
    ));
}

#[test]
fn modified_arrow_carries_modifiers() {
    let events = collect_default(b"\x1b[1;5D");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Left, modifiers, .. })
            if *modifiers == KeyModifiers::CONTROL
    ));
}

#[test]
fn special_keys_with_tilde() {
    let events = collect_default(b"\x1b[3~\x1b[5~\x1b[2;2~\x1b[11~");
    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Delete, .. })
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::PageUp, .. })
    ));
    assert!(matches!(
        &events[2],
        InputEvent::Key(KeyEvent { code: KeyCode::Insert, modifiers, .. })
            if *modifiers == KeyModifiers::SHIFT
    ));
    assert!(matches!(
        &events[3],
        InputEvent::Key(KeyEvent { code: KeyCode::F(1), .. })
    ));
}

#[test]
fn back_tab_is_shift_tab() {
    let events = collect_default(b"\x1b[Z");
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Tab, modifiers, .. })
            if *modifiers == KeyModifiers::SHIFT
    ));
}

#[test]
fn control_bytes() {
    let events = collect_default(b"\x03\x09\x0d\x7f");
    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('c'), modifiers, .. })
            if *modifiers == KeyModifiers::CONTROL
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::Tab, .. })
    ));
    assert!(matches!(
        &events[2],
        InputEvent::Key(KeyEvent { code: KeyCode::Enter, .. })
    ));
    assert!(matches!(
        &events[3],
        InputEvent::Key(KeyEvent { code: KeyCode::Backspace, .. })
    ));
}

#[test]
fn lone_escape_resolves_on_idle() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.feed(b"\x1b");
    assert!(!decoder.has_events());
    assert!(decoder.idle());
    assert!(matches!(
        decoder.next(),
        Some(InputEvent::Key(KeyEvent { code: KeyCode::Escape, .. }))
    ));
}

#[test]
fn alt_prefixed_letter() {
    let events = collect_default(b"\x1bx");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('x'), modifiers, .. })
            if *modifiers == KeyModifiers::ALT
    ));
}

#[test]
fn incomplete_csi_yields_nothing_then_completes() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.feed(b"\x1b[");
    assert!(!decoder.has_events());
    decoder.feed(b"A");
    let ev = decoder.next();
    assert!(matches!(
        ev,
        Some(InputEvent::Key(KeyEvent { code: KeyCode::Up, .. }))
    ));
    assert!(!decoder.has_events());
}

#[test]
fn malformed_csi_resets_silently() {
    // 0x01 inside a CSI is illegal; the partial parse is dropped along
    // with the offending byte and the following text decodes normally.
    let events = collect_default(b"\x1b[12\x01ok");
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('o'), .. })
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('k'), .. })
    ));
}

#[test]
fn esc_aborts_partial_csi() {
    let events = collect_default(b"\x1b[1;2\x1b[B");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Down, .. })
    ));
}

#[test]
fn kitty_suppresses_plain_bytes() {
    let events = collect(kitty_opts(), &[0x61, 0x1B, 0x5B, 0x39, 0x37, 0x3B, 0x31, 0x3A, 0x31, 0x75]);
    assert_eq!(events.len(), 1);
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.code, KeyCode::Char('a'));
    assert_eq!(key.kind, Some(KeyEventKind::Press));
    assert!(!key.repeat);
    assert!(key.modifiers.is_empty());
}

#[test]
fn kitty_release_event() {
    let events = collect(kitty_opts(), &[0x61, 0x1B, 0x5B, 0x39, 0x37, 0x3B, 0x31, 0x3A, 0x33, 0x75]);
    assert_eq!(events.len(), 1);
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.code, KeyCode::Char('a'));
    assert_eq!(key.kind, Some(KeyEventKind::Release));
}

#[test]
fn kitty_modifier_defaults() {
    // Tails omitted entirely: CSI 97 u.
    let events = collect(kitty_opts(), b"\x1b[97u");
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.code, KeyCode::Char('a'));
    assert_eq!(key.kind, Some(KeyEventKind::Press));
    assert!(key.modifiers.is_empty());
}

#[test]
fn kitty_ctrl_shift_mask() {
    // modifiers = 1 + (shift|ctrl) = 6.
    let events = collect(kitty_opts(), b"\x1b[97;6u");
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.modifiers, KeyModifiers::SHIFT | KeyModifiers::CONTROL);
}

#[test]
fn sgr_mouse_click() {
    let events = collect_default(b"\x1b[<0;10;5M");
    assert_eq!(events.len(), 1);
    let InputEvent::Mouse(ev) = &events[0] else {
        panic!("expected mouse event");
    };
    assert_eq!(ev.kind, MouseKind::Down);
    assert_eq!(ev.button, Some(MouseButton::Left));
    assert_eq!((ev.x, ev.y), (10, 5));
    assert!(ev.modifiers.is_empty());
}

#[test]
fn sgr_mouse_press_drag_release() {
    let events = collect_default(b"\x1b[<0;2;2M\x1b[<32;3;2M\x1b[<0;3;2m\x1b[<35;4;2M");
    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        InputEvent::Mouse(ev) if ev.kind == MouseKind::Down
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Mouse(ev)
            if ev.kind == MouseKind::Drag && ev.button == Some(MouseButton::Left)
    ));
    assert!(matches!(
        &events[2],
        InputEvent::Mouse(ev) if ev.kind == MouseKind::Up
    ));
    // After release, motion is hover.
    assert!(matches!(
        &events[3],
        InputEvent::Mouse(ev) if ev.kind == MouseKind::Move && ev.button.is_none()
    ));
}

#[test]
fn sgr_wheel_scroll() {
    let events = collect_default(b"\x1b[<64;8;3M\x1b[<65;8;3M");
    assert!(matches!(
        &events[0],
        InputEvent::Mouse(ev)
            if ev.kind == MouseKind::Scroll && ev.button == Some(MouseButton::WheelUp)
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Mouse(ev)
            if ev.kind == MouseKind::Scroll && ev.button == Some(MouseButton::WheelDown)
    ));
}

#[test]
fn x10_mouse_report() {
    // CSI M followed by three bytes offset by 32: button 0, x 10, y 5.
    let events = collect_default(b"\x1b[M\x20\x2a\x25");
    assert_eq!(events.len(), 1);
    let InputEvent::Mouse(ev) = &events[0] else {
        panic!("expected mouse event");
    };
    assert_eq!(ev.kind, MouseKind::Down);
    assert_eq!((ev.x, ev.y), (10, 5));
}

#[test]
fn bracketed_paste_round_trip() {
    let events = collect_default(b"\x1b[200~hello world\x1b[201~");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], InputEvent::Paste("hello world".into()));
}

#[test]
fn paste_hides_escape_sequences() {
    let events = collect_default(b"\x1b[200~text\x1b[A\x1b[201~");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], InputEvent::Paste("text\x1b[A".into()));
}

#[test]
fn paste_split_across_chunks() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.feed(b"\x1b[200~chunk1");
    decoder.feed(b"chunk2\x1b[201");
    assert!(!decoder.has_events());
    decoder.feed(b"~");
    assert_eq!(decoder.next(), Some(InputEvent::Paste("chunk1chunk2".into())));
}

#[test]
fn focus_events() {
    let events = collect_default(b"\x1b[I\x1b[O");
    assert_eq!(
        events,
        vec![
            InputEvent::Focus { gained: true },
            InputEvent::Focus { gained: false }
        ]
    );
}

#[test]
fn osc52_clipboard() {
    let events = collect_default(b"\x1b]52;c;aGVsbG8=\x07");
    assert_eq!(events, vec![InputEvent::Clipboard("hello".into())]);
}

#[test]
fn osc52_st_terminated() {
    let events = collect_default(b"\x1b]52;c;aGVsbG8=\x1b\\");
    assert_eq!(events, vec![InputEvent::Clipboard("hello".into())]);
}

#[test]
fn other_osc_is_dropped() {
    let events = collect_default(b"\x1b]0;title\x07a");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('a'), .. })
    ));
}

#[test]
fn oversized_osc_is_abandoned() {
    let mut input = b"\x1b]52;c;".to_vec();
    input.extend(std::iter::repeat_n(b'A', 20_000));
    input.push(0x07);
    input.extend_from_slice(b"ok");
    let events = collect_default(&input);
    // The clipboard payload is gone, the trailing text decodes fine.
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('o'), .. })
    ));
}

#[test]
fn dcs_is_consumed_silently() {
    let events = collect_default(b"\x1bPsome device junk\x1b\\x");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('x'), .. })
    ));
}

#[test]
fn cursor_position_report() {
    let events = collect_default(b"\x1b[3;9R");
    assert_eq!(events, vec![InputEvent::CursorReport { row: 3, col: 9 }]);
}

#[test]
fn raw_bytes_travel_with_key_events() {
    let events = collect_default(b"\x1b[1;5D");
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.raw, b"\x1b[1;5D");
}

#[test]
fn raw_bytes_travel_with_mouse_events() {
    let events = collect_default(b"\x1b[<0;10;5M");
    let InputEvent::Mouse(ev) = &events[0] else {
        panic!("expected mouse event");
    };
    assert_eq!(ev.raw, b"\x1b[<0;10;5M");
}

#[test]
fn clear_drops_events_but_not_partial_state() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.feed(b"a\x1b[");
    assert!(decoder.has_events());
    decoder.clear();
    assert!(!decoder.has_events());
    // The half-read CSI is still pending.
    decoder.feed(b"A");
    assert!(matches!(
        decoder.next(),
        Some(InputEvent::Key(KeyEvent { code: KeyCode::Up, .. }))
    ));
}

#[test]
fn enqueue_resize_orders_with_decoded_events() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    decoder.feed(b"a");
    decoder.enqueue_resize(50, 120);
    assert!(matches!(
        decoder.next(),
        Some(InputEvent::Key(KeyEvent { code: KeyCode::Char('a'), .. }))
    ));
    assert_eq!(decoder.next(), Some(InputEvent::Resize { rows: 50, cols: 120 }));
}

#[test]
fn parameter_overflow_caps_silently() {
    // A 17th parameter and an oversized value must not panic or grow
    // without bound.
    let mut input = b"\x1b[".to_vec();
    for _ in 0..40 {
        input.extend_from_slice(b"99999999999;");
    }
    input.push(b'A');
    let events = collect_default(&input);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Up, .. })
    ));
}

#[test]
fn noise_does_not_wedge_the_decoder() {
    let mut decoder = Decoder::new(DecoderOptions::default());
    let noise: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    decoder.feed(&noise);
    while decoder.next().is_some() {}
    decoder.feed(b"\x1b[A");
    // Depending on where the noise left the machine a terminator may be
    // needed first; idle plus a clean sequence must always recover.
    decoder.idle();
    decoder.feed(b"\x07\x1b\\\x1b[201~\x1b[A");
    let mut recovered = false;
    while let Some(ev) = decoder.next() {
        if matches!(ev, InputEvent::Key(KeyEvent { code: KeyCode::Up, .. })) {
            recovered = true;
        }
    }
    assert!(recovered);
}

#[test]
fn raw_capture_is_bounded() {
    // An absurdly long parameter run still dispatches, and the raw bytes
    // attached to the event keep only the most recent 256.
    let mut input = b"\x1b[".to_vec();
    input.extend(std::iter::repeat_n(b'1', 1000));
    input.push(b'A');
    let events = collect_default(&input);
    assert_eq!(events.len(), 1);
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.code, KeyCode::Up);
    assert_eq!(key.raw.len(), 256);
    assert_eq!(key.raw.last(), Some(&b'A'));
}

#[test]
fn iterm_quirk_control_bytes() {
    let opts = DecoderOptions {
        quirks: true,
        profile: QuirkProfile::Iterm,
        ..DecoderOptions::default()
    };
    let events = collect(opts, &[0x15, 0x01, 0x05]);
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Backspace, modifiers, .. })
            if *modifiers == KeyModifiers::META
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::Left, modifiers, .. })
            if *modifiers == KeyModifiers::META
    ));
    assert!(matches!(
        &events[2],
        InputEvent::Key(KeyEvent { code: KeyCode::Right, modifiers, .. })
            if *modifiers == KeyModifiers::META
    ));
}

#[test]
fn modern_profile_gets_plain_controls() {
    let opts = DecoderOptions {
        quirks: true,
        profile: QuirkProfile::Modern,
        ..DecoderOptions::default()
    };
    let events = collect(opts, &[0x15]);
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::Char('u'), modifiers, .. })
            if *modifiers == KeyModifiers::CONTROL
    ));
}

#[test]
fn shadow_strips_stale_modifiers() {
    let opts = DecoderOptions {
        kitty_keyboard: true,
        quirks: true,
        profile: QuirkProfile::Legacy,
    };
    let mut decoder = Decoder::new(opts);
    // Ctrl down, Ctrl up, then a key still claiming ctrl.
    decoder.feed(b"\x1b[57442;5:1u");
    decoder.feed(b"\x1b[57442;5:3u");
    decoder.feed(b"\x1b[97;5:1u");
    let events: Vec<_> = std::iter::from_fn(|| decoder.next()).collect();
    assert_eq!(events.len(), 3);
    let InputEvent::Key(last) = &events[2] else {
        panic!("expected key event");
    };
    assert_eq!(last.code, KeyCode::Char('a'));
    assert!(last.modifiers.is_empty(), "stale ctrl not stripped");
}

#[test]
fn modifier_key_event_has_no_self_modifier() {
    let events = collect(kitty_opts(), b"\x1b[57441;2:1u");
    let InputEvent::Key(key) = &events[0] else {
        panic!("expected key event");
    };
    assert_eq!(key.code, KeyCode::Shift);
    assert!(key.modifiers.is_empty());
}

#[test]
fn kitty_lock_keys() {
    let events = collect(kitty_opts(), b"\x1b[57358u\x1b[57360u");
    assert!(matches!(
        &events[0],
        InputEvent::Key(KeyEvent { code: KeyCode::CapsLock, .. })
    ));
    assert!(matches!(
        &events[1],
        InputEvent::Key(KeyEvent { code: KeyCode::NumLock, .. })
    ));
}
