//! Integration tests for the runtime facade.

use core_async::sync::{mpsc, CancellationToken};
use core_async::{task, time};

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[tokio::test]
async fn test_spawn_blocking_runs_off_the_async_worker() {
    let handle = task::spawn_blocking(|| {
        std::thread::sleep(std::time::Duration::from_millis(10));
        100
    });
    assert_eq!(handle.await.unwrap(), 100);
}

#[tokio::test]
async fn test_panic_message_is_recovered() {
    let handle = task::spawn_blocking(|| -> () { panic!("decoder exploded") });
    let error = handle.await.unwrap_err();
    assert!(task::is_panic(&error));
    assert_eq!(task::panic_message(error), "decoder exploded");
}

#[tokio::test]
async fn test_blocking_send_fails_after_receiver_dropped() {
    let (tx, rx) = mpsc::channel::<u32>(1);
    drop(rx);
    let result = task::spawn_blocking(move || tx.blocking_send(7)).await.unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cancellation_token_propagates_to_children() {
    let parent = CancellationToken::new();
    let child = parent.child_token();
    parent.cancel();
    assert!(child.is_cancelled());
}

#[tokio::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(200)).await;
    })
    .await;
    assert!(result.is_err());
}
