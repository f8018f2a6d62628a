//! Request/response correlation against a scripted reader

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{next_event, params_payload, reply_frame, request_body, MockDevice, WAIT};
use pretty_assertions::assert_eq;
use tokio::time::timeout;
use uhfprime::{Command, Error, ReaderEvent, ReaderParameters, RelayAction};

#[tokio::test]
async fn test_get_all_parameters_round_trip() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let task = tokio::spawn(async move { r.get_all_parameters().await });

    let request = link.next_request().await;
    assert_eq!(&request.raw[..], &[0xCF, 0xFF, 0x00, 0x72, 0x00, 0x17, 0xA5]);

    let payload = params_payload(0x01, 30);
    link.reply(Command::GetAllParameters, 0x00, &payload).await;

    let params = task.await.unwrap().unwrap();
    assert_eq!(params.address, 0x01);
    assert_eq!(params.power, 30);
    assert_eq!(params.to_payload(), payload);

    reader.disconnect().await;
}

#[tokio::test]
async fn test_set_all_parameters_sends_record() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let params = ReaderParameters::from_payload(&params_payload(0x02, 26)).unwrap();
    let r = Arc::clone(&reader);
    let task = tokio::spawn(async move { r.set_all_parameters(&params).await });

    let request = link.next_request().await;
    assert_eq!(request.command, 0x0071);
    assert_eq!(request_body(&request), &params.to_payload()[..]);

    link.reply(Command::SetAllParameters, 0x00, &[]).await;
    task.await.unwrap().unwrap();

    reader.disconnect().await;
}

#[tokio::test]
async fn test_same_command_resolves_in_issue_order() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let task = tokio::spawn(async move {
        // join! polls in order, so the waiters register first, second, third
        tokio::join!(
            r.get_all_parameters(),
            r.get_all_parameters(),
            r.get_all_parameters()
        )
    });

    for _ in 0..3 {
        assert_eq!(link.next_request().await.command, 0x0072);
    }
    assert_eq!(reader.pending_requests(), 3);

    for address in [1u8, 2, 3] {
        link.reply(Command::GetAllParameters, 0x00, &params_payload(address, 20))
            .await;
    }

    let (first, second, third) = task.await.unwrap();
    assert_eq!(first.unwrap().address, 1);
    assert_eq!(second.unwrap().address, 2);
    assert_eq!(third.unwrap().address, 3);
    assert_eq!(reader.pending_requests(), 0);

    reader.disconnect().await;
}

#[tokio::test]
async fn test_commands_resolve_independently() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let params_task = tokio::spawn(async move { r.get_all_parameters().await });
    assert_eq!(link.next_request().await.command, 0x0072);

    let r = Arc::clone(&reader);
    let relay_task = tokio::spawn(async move { r.pulse_relay(RelayAction::Open).await });
    let relay_request = link.next_request().await;
    assert_eq!(relay_request.command, 0x0077);
    assert_eq!(request_body(&relay_request), &[0x02, 0x01]);

    // Answer the later request first
    link.reply(Command::RelayControl, 0x00, &[]).await;
    timeout(WAIT, relay_task).await.unwrap().unwrap().unwrap();

    assert!(!params_task.is_finished());
    assert_eq!(reader.pending_requests(), 1);

    link.reply(Command::GetAllParameters, 0x00, &params_payload(0x07, 33))
        .await;
    let params = timeout(WAIT, params_task).await.unwrap().unwrap().unwrap();
    assert_eq!(params.address, 0x07);

    reader.disconnect().await;
}

#[tokio::test]
async fn test_corrupt_reply_is_dropped() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let mut events = reader.subscribe();
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let task = tokio::spawn(async move { r.stop_inventory().await });
    link.next_request().await;

    let mut corrupt = reply_frame(Command::InventoryStop, 0x00, &[]);
    corrupt[5] ^= 0x04;
    link.send_raw(&corrupt).await;

    let trace = next_event(&mut events, |event| match event {
        ReaderEvent::FrameTraced(trace) if !trace.valid => Some(trace),
        _ => None,
    })
    .await;
    assert_eq!(trace.command, 0x0002);
    assert_eq!(trace.note(), "RX CRC mismatch");

    // Still waiting after the bad frame
    assert!(!task.is_finished());
    assert_eq!(reader.pending_requests(), 1);

    // Garbage in front of the good reply is skipped
    let mut good = vec![0x55];
    good.extend_from_slice(&reply_frame(Command::InventoryStop, 0x00, &[]));
    link.send_raw(&good).await;

    timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    assert_eq!(reader.pending_requests(), 0);

    reader.disconnect().await;
}

#[tokio::test]
async fn test_error_status_fails_only_that_caller() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let relay_task = tokio::spawn(async move { r.pulse_relay(RelayAction::Close).await });
    let request = link.next_request().await;
    assert_eq!(request_body(&request), &[0x02, 0x00]);

    let r = Arc::clone(&reader);
    let stop_task = tokio::spawn(async move { r.stop_inventory().await });
    link.next_request().await;

    link.reply(Command::RelayControl, 0x11, &[]).await;
    link.reply(Command::InventoryStop, 0x00, &[]).await;

    let err = relay_task.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        Error::Status {
            command: Command::RelayControl,
            status: 0x11
        }
    ));
    stop_task.await.unwrap().unwrap();

    reader.disconnect().await;
}

#[tokio::test]
async fn test_short_parameter_reply_fails() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let r = Arc::clone(&reader);
    let ok_status = tokio::spawn(async move { r.get_all_parameters().await });
    link.next_request().await;
    link.reply(Command::GetAllParameters, 0x00, &[0u8; 24]).await;
    assert!(matches!(
        ok_status.await.unwrap(),
        Err(Error::Types(uhfprime_types::Error::Validation(_)))
    ));

    let r = Arc::clone(&reader);
    let bad_status = tokio::spawn(async move { r.get_all_parameters().await });
    link.next_request().await;
    link.reply(Command::GetAllParameters, 0x05, &[]).await;
    assert!(matches!(
        bad_status.await.unwrap(),
        Err(Error::Status { status: 0x05, .. })
    ));

    reader.disconnect().await;
}

#[tokio::test]
async fn test_dropped_request_removes_its_waiter() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let mut events = reader.subscribe();
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let gave_up = timeout(Duration::from_millis(100), reader.stop_inventory()).await;
    assert!(gave_up.is_err());
    assert_eq!(reader.pending_requests(), 0);
    link.next_request().await;

    // The late reply finds nobody waiting
    link.reply(Command::InventoryStop, 0x00, &[]).await;
    next_event(&mut events, |event| match event {
        ReaderEvent::FrameReceived(frame) if frame.command == 0x0002 => Some(()),
        _ => None,
    })
    .await;

    // The next caller gets its own reply
    let r = Arc::clone(&reader);
    let task = tokio::spawn(async move { r.stop_inventory().await });
    link.next_request().await;
    link.reply(Command::InventoryStop, 0x09, &[]).await;

    assert!(matches!(
        task.await.unwrap(),
        Err(Error::Status { status: 0x09, .. })
    ));

    reader.disconnect().await;
}

#[tokio::test]
async fn test_concurrent_senders_do_not_interleave() {
    let device = MockDevice::bind().await;
    let reader = Arc::new(device.reader());
    let (connected, mut link) = tokio::join!(reader.connect(), device.accept());
    connected.unwrap();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let r = Arc::clone(&reader);
        let action = if i % 2 == 0 { RelayAction::Open } else { RelayAction::Close };
        tasks.push(tokio::spawn(async move { r.pulse_relay(action).await }));
    }

    for _ in 0..16 {
        let request = link.next_request().await;
        assert_eq!(request.command, 0x0077);
    }
    assert_eq!(link.discarded(), 0);

    for _ in 0..16 {
        link.reply(Command::RelayControl, 0x00, &[]).await;
    }
    for task in tasks {
        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    }

    assert_eq!(reader.pending_requests(), 0);

    reader.disconnect().await;
}
