//! Receive and transmit paths of the serial link, driven through the
//! interrupt dispatcher the way the vectors call it on the target.
mod helpers;

use elm_can_adapter::core::TelegramBytes;
use elm_can_adapter::error::{LineError, TransmitError};
use elm_can_adapter::protocol::device::link::{Irq, Priority, TAKE_CHUNK_LEN};
use elm_can_adapter::protocol::transport::framer::ReceiverState;
use elm_can_adapter::protocol::transport::RX_TIMEOUT;
use helpers::{drain_wire, expire, inject, inject_fault, new_link, telegram};

#[test]
fn test_complete_telegram_is_handed_to_foreground() {
    let link = new_link();
    let request = telegram(&[0x82, 0xF1, 0xF1, 0xFD, 0xFD]);

    inject(&link, &request[..3]);
    assert_eq!(link.receiver_state(), ReceiverState::Receiving);
    assert!(link.with_timer(|timer| timer.running));
    assert_eq!(link.with_timer(|timer| timer.last_timeout), Some(RX_TIMEOUT));

    inject(&link, &request[3..]);
    assert_eq!(link.receiver_state(), ReceiverState::Done);
    // Completion stops the inter-byte timeout.
    assert!(!link.with_timer(|timer| timer.running));
    assert_eq!(link.with_timer(|timer| timer.restarts), request.len());

    let mut out = TelegramBytes::new();
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.as_slice(), request.as_slice());
    assert_eq!(link.receiver_state(), ReceiverState::Idle);
    assert!(!link.take_telegram(&mut out));
}

#[test]
/// Bytes arriving while a telegram waits for the foreground are dropped.
fn test_pending_telegram_blocks_new_input() {
    let link = new_link();
    let first = telegram(&[0x81, 0x00, 0x00, 0x01]);
    let second = telegram(&[0x81, 0x00, 0x00, 0x09]);

    inject(&link, &first);
    inject(&link, &second);

    let mut out = TelegramBytes::new();
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.as_slice(), first.as_slice());
    assert_eq!(link.receiver_state(), ReceiverState::Idle);
}

#[test]
fn test_timeout_discards_partial_telegram() {
    let link = new_link();
    let request = telegram(&[0x82, 0xF1, 0xF1, 0x80, 0x00]);

    inject(&link, &[0x82, 0xF1]);
    expire(&link);
    assert_eq!(link.receiver_state(), ReceiverState::Idle);
    assert!(!link.with_timer(|timer| timer.running));

    // The next byte starts a fresh telegram.
    inject(&link, &request);
    let mut out = TelegramBytes::new();
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.as_slice(), request.as_slice());
}

#[test]
/// A bad checksum parks the receiver in `Error` until the timeout clears it.
fn test_checksum_error_recovers_after_timeout() {
    let link = new_link();
    let mut corrupted = telegram(&[0x81, 0x00, 0x00, 0x01]);
    *corrupted.last_mut().unwrap() ^= 0x55;

    inject(&link, &corrupted);
    assert_eq!(link.receiver_state(), ReceiverState::Error);

    let mut out = TelegramBytes::new();
    assert!(!link.take_telegram(&mut out));

    // Still refused until the line goes quiet.
    inject(&link, &[0x81]);
    assert_eq!(link.receiver_state(), ReceiverState::Error);

    expire(&link);
    assert_eq!(link.receiver_state(), ReceiverState::Idle);

    let good = telegram(&[0x81, 0x00, 0x00, 0x01]);
    inject(&link, &good);
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.as_slice(), good.as_slice());
}

#[test]
/// Timeout in `Idle` or `Done` changes nothing.
fn test_timeout_keeps_idle_and_done() {
    let link = new_link();
    expire(&link);
    assert_eq!(link.receiver_state(), ReceiverState::Idle);

    inject(&link, &telegram(&[0x81, 0x00, 0x00, 0x00]));
    expire(&link);
    assert_eq!(link.receiver_state(), ReceiverState::Done);
}

#[test]
/// Framing and overrun faults restart the receiver and leave the framer alone.
fn test_line_fault_drops_byte_only() {
    let link = new_link();
    let request = telegram(&[0x81, 0x00, 0x00, 0x01]);

    inject(&link, &request[..2]);
    let restarts_before = link.with_timer(|timer| timer.restarts);

    inject_fault(&link, LineError::Framing);
    inject_fault(&link, LineError::Overrun);
    assert_eq!(link.with_serial(|serial| serial.receiver_restarts), 2);
    assert_eq!(link.with_timer(|timer| timer.restarts), restarts_before);
    assert_eq!(link.receiver_state(), ReceiverState::Receiving);

    inject(&link, &request[2..]);
    let mut out = TelegramBytes::new();
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.as_slice(), request.as_slice());
}

#[test]
/// Extended length form: format length 0, total = fourth byte + 5.
fn test_extended_length_telegram() {
    let link = new_link();
    let mut body = vec![0x80, 0x12, 0xF1, 0x06];
    body.extend_from_slice(&[0x22, 0xF1, 0x90, 0x00, 0x00, 0x00]);
    let request = telegram(&body);
    assert_eq!(request.len(), 6 + 5);

    inject(&link, &request[..request.len() - 1]);
    assert_eq!(link.receiver_state(), ReceiverState::Receiving);
    inject(&link, &request[request.len() - 1..]);
    assert_eq!(link.receiver_state(), ReceiverState::Done);
}

#[test]
/// Longest declarable telegram: 0xFF extended length, 260 bytes in all.
fn test_maximum_length_telegram() {
    let link = new_link();
    let mut body = vec![0x80, 0x12, 0xF1, 0xFF];
    body.extend((0..0xFF).map(|i| i as u8));
    let request = telegram(&body);
    assert_eq!(request.len(), 260);

    inject(&link, &request);
    let mut out = TelegramBytes::new();
    assert!(link.take_telegram(&mut out));
    assert_eq!(out.len(), 260);
    assert_eq!(out.as_slice(), request.as_slice());
}

#[test]
fn test_send_arms_interrupt_and_drains_in_order() {
    let link = new_link();
    assert!(!link.with_serial(|serial| serial.tx_interrupt));

    link.send(&[1, 2, 3]).unwrap();
    link.send(&[4, 5]).unwrap();
    assert_eq!(link.pending_output(), 5);
    assert!(link.with_serial(|serial| serial.tx_interrupt));

    assert_eq!(drain_wire(&link), vec![1, 2, 3, 4, 5]);
    assert_eq!(link.pending_output(), 0);
    // The empty-queue interrupt disarmed itself.
    assert!(!link.with_serial(|serial| serial.tx_interrupt));
}

#[test]
fn test_send_empty_does_not_arm() {
    let link = new_link();
    link.send(&[]).unwrap();
    assert!(!link.with_serial(|serial| serial.tx_interrupt));
}

#[test]
/// An overflowing send is rejected whole and leaves queued bytes intact.
fn test_send_overflow_is_all_or_nothing() {
    let link = new_link();
    let filler = [0xAA; 270];
    link.send(&filler).unwrap();

    let err = link.send(&[0u8; 11]).unwrap_err();
    assert_eq!(
        err,
        TransmitError::Overflow {
            queued: 270,
            requested: 11,
            capacity: 280,
        }
    );
    assert_eq!(link.pending_output(), 270);

    link.send(&[0x55; 10]).unwrap();
    let wire = drain_wire(&link);
    assert_eq!(wire.len(), 280);
    assert_eq!(&wire[270..], &[0x55; 10]);
}

#[test]
/// Within a level the table order decides; low-level sources never run at high.
fn test_dispatch_follows_priority_table() {
    let link = new_link();
    link.send(&[0x42]).unwrap();
    link.with_serial(|serial| serial.rx.push_back(Ok(0x81)));

    let all_pending = |_: Irq| true;
    assert_eq!(link.dispatch(Priority::High, all_pending), Some(Irq::Receive));
    assert_eq!(
        link.dispatch(Priority::High, |irq| irq != Irq::Receive),
        Some(Irq::TransmitReady)
    );
    assert_eq!(
        link.dispatch(Priority::High, |irq| irq == Irq::RxTimeout),
        Some(Irq::RxTimeout)
    );
    assert_eq!(link.dispatch(Priority::High, |irq| irq == Irq::Tick), None);
    assert_eq!(link.dispatch(Priority::Low, all_pending), Some(Irq::Tick));
    assert_eq!(link.dispatch(Priority::Low, |_| false), None);

    assert_eq!(link.with_serial(|serial| serial.wire.clone()), vec![0x42]);
    // The timeout discarded the single byte received above.
    assert_eq!(link.receiver_state(), ReceiverState::Idle);
}

#[test]
fn test_tick_counter_wraps() {
    let link = new_link();
    for _ in 0..300 {
        link.service(Irq::Tick);
    }
    assert_eq!(link.ticks(), (300 % 256) as u8);
}

#[test]
/// Lengths around the copy chunk size come out intact and free the receiver.
fn test_take_across_chunk_boundaries() {
    let link = new_link();
    for total in [TAKE_CHUNK_LEN - 1, TAKE_CHUNK_LEN, TAKE_CHUNK_LEN + 1, 2 * TAKE_CHUNK_LEN] {
        let mut body = vec![0x80 | (total - 4) as u8, 0x12, 0xF1];
        body.extend((3..total - 1).map(|i| i as u8 ^ 0x5A));
        let request = telegram(&body);
        assert_eq!(request.len(), total);

        inject(&link, &request);
        let mut out = TelegramBytes::new();
        assert!(link.take_telegram(&mut out));
        assert_eq!(out.as_slice(), request.as_slice());
        assert_eq!(link.receiver_state(), ReceiverState::Idle);
    }
}
