// MIT License - Copyright (c) 2026 The dahua-cam Authors

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ReconnectPolicy;
use crate::constants::EVENT_STREAM_ACCEPT;
use crate::error::{CamError, Result};
use crate::event::{CamEvent, EventSender};
use crate::protocol::{Endpoint, EventLineDecoder};
use crate::transport::HttpTransport;

/// Background task holding the event attach connection open.
///
/// The task connects, decodes alarms into [`CamEvent`]s, and after every
/// close waits according to the [`ReconnectPolicy`] before connecting again
/// with the same event codes. Each attempt ends with exactly one
/// [`CamEvent::Disconnected`], so `Connected` is never repeated without an
/// intervening `Disconnected`.
pub struct EventListener {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

/// Holds the single-flight flag for as long as the task lives.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl EventListener {
    /// Start listening. Fails with [`CamError::AlreadyListening`] while
    /// another task holds `active`.
    pub fn spawn(
        transport: HttpTransport,
        codes: Vec<String>,
        policy: ReconnectPolicy,
        event_tx: EventSender,
        active: Arc<AtomicBool>,
    ) -> Result<Self> {
        if active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CamError::AlreadyListening);
        }
        let guard = ActiveGuard(active);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let _guard = guard;
            run(transport, codes, policy, event_tx, shutdown_rx).await;
        });

        Ok(Self {
            shutdown_tx,
            handle: Some(handle),
        })
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(h) = self.handle.take() {
            h.abort();
        }
    }
}

async fn run(
    transport: HttpTransport,
    codes: Vec<String>,
    policy: ReconnectPolicy,
    event_tx: EventSender,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let path = Endpoint::AttachEvents { codes }.to_path();
    let mut failures: u32 = 0;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        info!("Connecting to event stream at {}", transport.url(&path));
        let mut connected = false;
        let outcome = tokio::select! {
            outcome = attach(&transport, &path, &event_tx, &mut connected) => Some(outcome),
            _ = shutdown_rx.changed() => None,
        };

        let Some(outcome) = outcome else {
            if connected {
                let _ = event_tx.send(CamEvent::Disconnected);
            }
            break;
        };

        if let Err(e) = outcome {
            warn!("Event stream error: {}", e);
            let _ = event_tx.send(CamEvent::Error(Arc::new(e)));
        }
        let _ = event_tx.send(CamEvent::Disconnected);

        failures = if connected { 0 } else { failures.saturating_add(1) };
        if !policy.allows(failures) {
            warn!(
                "Giving up on event stream after {} failed attempts",
                failures
            );
            break;
        }

        let delay = policy.delay_for_attempt(failures.saturating_add(1));
        info!("Reconnecting to event stream in {:.1}s", delay.as_secs_f64());
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown_rx.changed() => break,
        }
    }

    debug!("Event listener stopped");
}

/// One connection attempt: connect, then decode until the camera hangs up.
///
/// `connected` is set as soon as response headers arrive.
async fn attach(
    transport: &HttpTransport,
    path: &str,
    event_tx: &EventSender,
    connected: &mut bool,
) -> Result<()> {
    let response = transport.open_stream(path, EVENT_STREAM_ACCEPT).await?;

    info!("Connected to event stream");
    *connected = true;
    let _ = event_tx.send(CamEvent::Connected);

    let mut decoder = EventLineDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(CamError::Stream)?;
        for alarm in decoder.push(&chunk) {
            debug!(
                "Alarm {} {} on index {}",
                alarm.code, alarm.action, alarm.index
            );
            let _ = event_tx.send(CamEvent::Alarm(alarm));
        }
    }
    if let Some(alarm) = decoder.finish() {
        let _ = event_tx.send(CamEvent::Alarm(alarm));
    }

    debug!("Event stream closed by camera");
    Ok(())
}
