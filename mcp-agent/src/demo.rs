//! Demo driver: registers, then streams heartbeats, sensor data and a
//! periodic status command to the hub on a fixed interval.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::session::ClientSession;

/// Outcome of one demo run
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    /// Loop iterations completed
    pub iterations: u64,
    /// Sends that came back with an error (logged, not fatal)
    pub failed_sends: u64,
    pub elapsed: Duration,
}

/// Run the demo for `duration`, ticking every `tick`.
///
/// Only the initial registration is fatal; every later failure is logged and
/// the loop carries on.
pub async fn run_demo(
    session: &mut ClientSession,
    duration: Duration,
    tick: Duration,
) -> Result<DemoReport> {
    session
        .register()
        .await
        .context("Failed to register client")?;

    let mut failed_sends = 0u64;
    let mut record = |ok: bool| {
        if !ok {
            failed_sends += 1;
        }
    };

    record(
        session
            .send_data(
                json!({
                    "client_info": {
                        "name": "Demo Client",
                        "version": env!("CARGO_PKG_VERSION"),
                        "os": std::env::consts::OS,
                    }
                }),
                None,
            )
            .await
            .is_ok(),
    );

    let start = Instant::now();
    let mut timer = interval(tick);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut counter: u64 = 0;

    while start.elapsed() < duration {
        timer.tick().await;
        if start.elapsed() >= duration {
            break;
        }

        record(session.send_heartbeat().await.is_ok());

        if counter % 3 == 0 {
            record(
                session
                    .send_data(
                        json!({
                            "sensor_readings": {
                                "temperature": 22 + (counter % 10),
                                "humidity": 45 + (counter % 20),
                                "pressure": 1013 + (counter % 30),
                            },
                            "timestamp": Utc::now().to_rfc3339(),
                        }),
                        None,
                    )
                    .await
                    .is_ok(),
            );
        }

        if counter % 5 == 0 {
            record(
                session
                    .send_command(
                        "check_status",
                        Some(json!({"verbose": true, "include_metrics": true})),
                        None,
                    )
                    .await
                    .is_ok(),
            );
        }

        counter += 1;
    }

    let elapsed = start.elapsed();
    record(
        session
            .send_data(
                json!({
                    "message": "Demo completed",
                    "metrics": {
                        "messages_sent": counter,
                        "duration": elapsed.as_secs_f64(),
                    }
                }),
                None,
            )
            .await
            .is_ok(),
    );

    if failed_sends > 0 {
        warn!(failed_sends, "Some sends failed during the demo");
    }
    info!(
        iterations = counter,
        elapsed_secs = elapsed.as_secs_f64(),
        "Demo completed"
    );

    Ok(DemoReport {
        iterations: counter,
        failed_sends,
        elapsed,
    })
}
