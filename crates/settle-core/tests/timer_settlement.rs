//! End-to-end: cells settled from tokio timers, observed through the driver.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use settle_core::{SettleCell, SettleRuntime, StateKind, TokioScheduler};
use tokio::sync::oneshot;

#[tokio::test]
async fn timer_fulfills_cell_and_observers_fire_in_order() {
    let rt = SettleRuntime::tokio().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let cell = rt.cell::<u32, String, _>(|fulfill, _reject| {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            fulfill.fulfill(7);
        });
        Ok(())
    });
    assert_eq!(cell.kind(), StateKind::Pending);

    let (done_tx, done_rx) = oneshot::channel();
    let (l1, l2) = (log.clone(), log.clone());
    cell.on_success(move |v| l1.lock().push(format!("h1({v})")))
        .on_success(move |v| l2.lock().push(format!("h2({v})")))
        .on_settle(move || {
            let _ = done_tx.send(());
        });

    done_rx.await.unwrap();
    assert_eq!(*log.lock(), vec!["h1(7)", "h2(7)"]);
    assert_eq!(cell.value(), Some(7));
    rt.shutdown().await;
}

#[tokio::test]
async fn racing_timers_only_first_settles() {
    let scheduler = TokioScheduler::spawn().unwrap();
    let cell: SettleCell<&'static str, &'static str> =
        SettleCell::new(Arc::new(scheduler.clone()), |fulfill, reject| {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                fulfill.fulfill("fast");
            });
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                reject.reject("slow");
            });
            Ok(())
        });

    let (tx, rx) = oneshot::channel();
    cell.on_settle(move || {
        let _ = tx.send(());
    });
    rx.await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(cell.value(), Some("fast"));
    assert_eq!(cell.error(), None);
    scheduler.shutdown_and_join().await;
}

#[tokio::test]
async fn registration_code_runs_before_handler() {
    let rt = SettleRuntime::tokio().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();

    let cell = rt.fulfilled::<i32, ()>(5);
    let l = log.clone();
    cell.on_success(move |v| {
        l.lock().push(format!("handler {v}"));
        let _ = tx.send(());
    });
    log.lock().push("after on_success".to_string());

    rx.await.unwrap();
    assert_eq!(*log.lock(), vec!["after on_success", "handler 5"]);
}
