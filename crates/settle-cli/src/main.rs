use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use settle_core::{
    LogFormat, SchedulerKind, SettleConfig, SettleError, SettleRuntime, init_logging,
};
use tokio::sync::oneshot;
use tokio::time::sleep;

/// Settle a few cells from timers and narrate what the observers see.
#[derive(Debug, Parser)]
#[command(name = "settle", version)]
struct Args {
    /// JSON config file (scheduler, log_format)
    #[arg(long, env = "SETTLE_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `log_format` from the config
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// How long the timer waits before settling
    #[arg(long, default_value_t = 200)]
    delay_ms: u64,

    /// Reject instead of fulfilling
    #[arg(long)]
    fail: bool,
}

#[derive(Debug, Clone)]
struct Reading {
    sensor: &'static str,
    celsius: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("settle: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), SettleError> {
    let mut config = match &args.config {
        Some(path) => SettleConfig::from_json_file(path)?,
        None => SettleConfig::default(),
    };
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    init_logging("settle-cli", config.log_format)?;

    let rt = SettleRuntime::from_config(&config)?;
    tracing::info!(scheduler = ?rt.kind(), "runtime ready");

    // (A) timer でセルを settle する
    let delay = Duration::from_millis(args.delay_ms);
    let fail = args.fail;
    let cell = rt.cell::<Reading, String, _>(move |fulfill, reject| {
        tokio::spawn(async move {
            sleep(delay).await;
            if fail {
                reject.reject("sensor offline".to_string());
            } else {
                fulfill.fulfill(Reading {
                    sensor: "greenhouse-1",
                    celsius: 21.5,
                });
            }
        });
        Ok(())
    });

    // (B) settle 前に observer を登録
    let (done_tx, done_rx) = oneshot::channel();
    cell.on_success(|r| tracing::info!(sensor = r.sensor, celsius = r.celsius, "reading arrived"))
        .on_failure(|e| tracing::warn!(error = %e, "reading failed"))
        .on_settle(move || {
            let _ = done_tx.send(());
        });
    tracing::info!(status = ?cell.status(), "observers registered");

    // (C) 初期化で失敗したセルは自動で rejected になる
    let broken = rt.cell::<Reading, String, _>(|_fulfill, _reject| {
        Err("calibration table missing".to_string())
    });
    broken.on_failure(|e| tracing::warn!(error = %e, "initializer failed"));

    // (D) settle を待つ
    match rt.kind() {
        SchedulerKind::Tokio => {
            let _ = done_rx.await;
        }
        SchedulerKind::Microtask => {
            // 誰も queue を回さないので、timer が settle するまで手で回す
            while !cell.is_settled() {
                rt.run_until_idle();
                sleep(Duration::from_millis(10)).await;
            }
            rt.run_until_idle();
        }
    }

    // (E) settle 後の登録も後のターンで呼ばれる
    cell.on_settle(|| tracing::info!("late observer ran"));
    tracing::info!(state = %cell.kind(), "registered late observer");

    rt.shutdown().await;
    Ok(())
}
