use std::path::PathBuf;
use std::time::Duration;

use similarity_engine::{path_queue, QueueError, QueueItem};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn items_arrive_in_order_with_end_of_stream_last() {
    let (tx, mut rx) = path_queue(4);
    let cancel = CancellationToken::new();

    tx.push(PathBuf::from("a.txt"), &cancel).await.unwrap();
    tx.push(PathBuf::from("b.md"), &cancel).await.unwrap();
    tx.finish(&cancel).await.unwrap();

    assert_eq!(
        rx.pop(&cancel).await.unwrap(),
        QueueItem::File(PathBuf::from("a.txt"))
    );
    assert_eq!(
        rx.pop(&cancel).await.unwrap(),
        QueueItem::File(PathBuf::from("b.md"))
    );
    assert_eq!(rx.pop(&cancel).await.unwrap(), QueueItem::EndOfStream);
    // The sender was consumed by `finish`; nothing can follow the marker.
    assert_eq!(rx.pop(&cancel).await, Err(QueueError::Closed));
}

#[tokio::test]
async fn push_waits_while_full() {
    let (tx, mut rx) = path_queue(1);
    let cancel = CancellationToken::new();
    tx.push(PathBuf::from("first.txt"), &cancel).await.unwrap();

    let blocked = tokio::time::timeout(
        Duration::from_millis(50),
        tx.push(PathBuf::from("second.txt"), &cancel),
    )
    .await;
    assert!(blocked.is_err(), "push on a full queue should not complete");

    rx.pop(&cancel).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(1),
        tx.push(PathBuf::from("second.txt"), &cancel),
    )
    .await
    .expect("push after pop")
    .unwrap();
}

#[tokio::test]
async fn cancellation_releases_blocked_push() {
    let (tx, _rx) = path_queue(1);
    let cancel = CancellationToken::new();
    tx.push(PathBuf::from("first.txt"), &cancel).await.unwrap();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        tx.push(PathBuf::from("second.txt"), &cancel),
    )
    .await
    .expect("cancelled push returns promptly");
    assert_eq!(result, Err(QueueError::Cancelled));
}

#[tokio::test]
async fn cancellation_releases_blocked_pop() {
    let (_tx, mut rx) = path_queue(1);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), rx.pop(&cancel))
        .await
        .expect("cancelled pop returns promptly");
    assert_eq!(result, Err(QueueError::Cancelled));
}

#[tokio::test]
async fn finish_after_cancel_does_not_wait_for_capacity() {
    let (tx, mut rx) = path_queue(1);
    let cancel = CancellationToken::new();
    tx.push(PathBuf::from("only.txt"), &cancel).await.unwrap();
    cancel.cancel();

    // Queue is full, so the marker is dropped instead of blocking.
    assert_eq!(tx.finish(&cancel).await, Err(QueueError::Cancelled));

    let live = CancellationToken::new();
    assert_eq!(
        rx.pop(&live).await.unwrap(),
        QueueItem::File(PathBuf::from("only.txt"))
    );
    assert_eq!(rx.pop(&live).await, Err(QueueError::Closed));
}
