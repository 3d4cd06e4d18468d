// MIT License - Copyright (c) 2026 The dahua-cam Authors

use std::sync::Arc;

use crate::constants::EventCode;
use crate::error::CamError;

/// One alarm record pushed by the camera, e.g.
/// `Code=VideoMotion;action=Start;index=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEvent {
    /// Alarm type (`VideoMotion`, `VideoLoss`, ...)
    pub code: String,
    /// Transition, usually `Start`, `Stop` or `Pulse`
    pub action: String,
    /// Channel or sub-index the alarm belongs to
    pub index: String,
}

impl AlarmEvent {
    pub fn new(
        code: impl Into<String>,
        action: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            action: action.into(),
            index: index.into(),
        }
    }

    /// The code as a known [`EventCode`], if it is one.
    pub fn kind(&self) -> Option<EventCode> {
        EventCode::from_code(&self.code)
    }

    pub fn is_start(&self) -> bool {
        self.action.eq_ignore_ascii_case("start")
    }

    pub fn is_stop(&self) -> bool {
        self.action.eq_ignore_ascii_case("stop")
    }

    /// Numeric channel index, when the index field is one.
    pub fn channel(&self) -> Option<u32> {
        self.index.trim().parse().ok()
    }
}

/// Notifications emitted by a camera.
///
/// Users subscribe via `cam.subscribe()` to receive a
/// `tokio::sync::broadcast::Receiver<CamEvent>`. Delivery is best-effort:
/// nothing is buffered for absent subscribers, and a subscriber that falls
/// more than the channel capacity behind loses the oldest events.
#[derive(Debug, Clone)]
pub enum CamEvent {
    /// Event stream response headers received
    Connected,
    /// An alarm record parsed from the stream
    Alarm(AlarmEvent),
    /// Transport error on the event stream (non-fatal, a reconnect follows)
    Error(Arc<CamError>),
    /// Event stream attempt ended
    Disconnected,
}

/// Type alias for the broadcast sender.
pub type EventSender = tokio::sync::broadcast::Sender<CamEvent>;

/// Type alias for the broadcast receiver.
pub type EventReceiver = tokio::sync::broadcast::Receiver<CamEvent>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::broadcast::channel(capacity.max(1))
}
