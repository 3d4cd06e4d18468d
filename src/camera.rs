// MIT License - Copyright (c) 2026 The dahua-cam Authors

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::CamConfig;
use crate::constants::default_event_codes;
use crate::error::{CamError, Result};
use crate::event::{event_channel, EventReceiver, EventSender};
use crate::protocol::{parse_value_after_eq, Endpoint};
use crate::stream::EventListener;
use crate::transport::HttpTransport;

/// The main public API for one Dahua camera.
///
/// # Example
///
/// ```no_run
/// use dahua_cam::{CamConfig, CamEvent, DahuaCam};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = CamConfig::builder()
///         .hostname("192.168.1.108")
///         .username("admin")
///         .password("admin123")
///         .build();
///
///     let cam = DahuaCam::new(config)?;
///     println!("Camera: {}", cam.name().await?);
///
///     let mut events = cam.subscribe();
///     cam.listen_for_events(None)?;
///     while let Ok(event) = events.recv().await {
///         if let CamEvent::Alarm(alarm) = event {
///             println!("{} {} {}", alarm.code, alarm.action, alarm.index);
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct DahuaCam {
    config: CamConfig,
    transport: HttpTransport,
    event_tx: EventSender,
    listening: Arc<AtomicBool>,
    listener: Mutex<Option<EventListener>>,
}

impl DahuaCam {
    /// Create a client session. No connection is made until a request or
    /// [`listen_for_events`](Self::listen_for_events).
    pub fn new(config: CamConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        let (event_tx, _event_rx) = event_channel(config.event_channel_capacity);
        Ok(Self {
            config,
            transport,
            event_tx,
            listening: Arc::new(AtomicBool::new(false)),
            listener: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &CamConfig {
        &self.config
    }

    /// Subscribe to camera notifications.
    pub fn subscribe(&self) -> EventReceiver {
        self.event_tx.subscribe()
    }

    /// Query the device name (`magicBox.cgi?action=getMachineName`).
    pub async fn name(&self) -> Result<String> {
        let body = self.transport.get_text(&Endpoint::MachineName.to_path()).await?;
        parse_value_after_eq(&body)
            .map(str::to_string)
            .ok_or_else(|| CamError::Parse {
                details: format!("expected key=value, got {:?}", body),
            })
    }

    /// Fetch a still image from `snapshot.cgi?{channel}`.
    ///
    /// An empty body yields an empty buffer.
    pub async fn snapshot(&self, channel: impl fmt::Display) -> Result<Vec<u8>> {
        let path = Endpoint::Snapshot {
            channel: channel.to_string(),
        }
        .to_path();
        let image = self.transport.get_bytes(&path).await?;
        debug!("Snapshot {} returned {} bytes", path, image.len());
        Ok(image)
    }

    /// Start the persistent event stream in the background.
    ///
    /// `None` or an empty list subscribes to the default event codes. Alarms
    /// and connection changes arrive through [`subscribe`](Self::subscribe).
    /// Must be called from within a Tokio runtime.
    pub fn listen_for_events(&self, codes: Option<Vec<String>>) -> Result<()> {
        let codes = match codes {
            Some(codes) if !codes.is_empty() => codes,
            _ => default_event_codes(),
        };

        let mut slot = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        let listener = EventListener::spawn(
            self.transport.clone(),
            codes,
            self.config.reconnect,
            self.event_tx.clone(),
            self.listening.clone(),
        )?;
        *slot = Some(listener);
        info!("Listening for events from {}", self.config.base_uri());
        Ok(())
    }

    /// Stop the event stream, if running, and wait for it to wind down.
    pub async fn stop_listening(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(listener) = listener {
            info!("Stopping event listener");
            listener.stop().await;
        }
    }

    /// Whether an event stream task is active (connected or waiting to reconnect).
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}
