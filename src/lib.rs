// MIT License - Copyright (c) 2026 The dahua-cam Authors
//
//! # dahua-cam
//!
//! Client for the HTTP CGI API of Dahua network cameras.
//!
//! Issues authenticated one-shot queries (device name, still snapshots) and
//! keeps a persistent `eventManager.cgi` attach connection open, turning the
//! multipart stream into alarm notifications and reconnecting whenever the
//! camera hangs up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dahua_cam::{CamConfig, CamEvent, DahuaCam};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CamConfig::builder()
//!         .hostname("192.168.1.108")
//!         .username("admin")
//!         .password("admin123")
//!         .build();
//!
//!     let cam = DahuaCam::new(config)?;
//!
//!     let mut events = cam.subscribe();
//!     cam.listen_for_events(Some(vec!["VideoMotion".into()]))?;
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     std::fs::write("snapshot.jpg", cam.snapshot(0).await?)?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     cam.stop_listening().await;
//!     Ok(())
//! }
//! ```

pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod protocol;
pub mod stream;
pub mod transport;

// Re-exports for convenience
pub use camera::DahuaCam;
pub use config::{CamConfig, CamConfigBuilder, KeepAlivePolicy, ReconnectPolicy};
pub use constants::{default_event_codes, EventCode, DEFAULT_EVENT_CODES};
pub use error::{CamError, Result};
pub use event::{AlarmEvent, CamEvent, EventReceiver};
pub use protocol::{parse_event_chunk, EventLineDecoder};
