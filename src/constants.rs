// MIT License - Copyright (c) 2026 The dahua-cam Authors

/// Default HTTP port of the camera's embedded web server.
pub const DEFAULT_PORT: u16 = 80;

/// Prefix under which every CGI endpoint lives.
pub const CGI_PREFIX: &str = "/cgi-bin/";

/// `Accept` header sent with the event attach request.
pub const EVENT_STREAM_ACCEPT: &str = "multipart/x-mixed-replace";

/// Line prefix marking an event record inside the multipart stream.
pub const EVENT_LINE_PREFIX: &str = "Code=";

/// Line terminator used by the event stream.
pub const CRLF: &str = "\r\n";

/// Longest partial line kept between chunks before it is dropped.
pub const MAX_PENDING_LINE: usize = 64 * 1024;

/// Event codes subscribed to when the caller does not name any.
pub const DEFAULT_EVENT_CODES: [EventCode; 15] = [
    EventCode::VideoMotion,
    EventCode::VideoLoss,
    EventCode::VideoBlind,
    EventCode::AlarmLocal,
    EventCode::CrossLineDetection,
    EventCode::CrossRegionDetection,
    EventCode::LeftDetection,
    EventCode::TakenAwayDetection,
    EventCode::VideoAbnormalDetection,
    EventCode::FaceDetection,
    EventCode::AudioMutation,
    EventCode::AudioAnomaly,
    EventCode::VideoUnFocus,
    EventCode::WanderDetection,
    EventCode::RioterDetection,
];

/// The default subscription as owned wire strings.
pub fn default_event_codes() -> Vec<String> {
    DEFAULT_EVENT_CODES
        .iter()
        .map(|c| c.as_str().to_string())
        .collect()
}

/// Alarm event codes the camera is known to push.
///
/// The stream carries codes as free text; anything not listed here still
/// reaches subscribers, it just has no [`EventCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    /// Motion detected in a configured region
    VideoMotion,
    /// Video signal lost on a channel
    VideoLoss,
    /// Lens covered or tampered
    VideoBlind,
    /// Local alarm input triggered
    AlarmLocal,
    /// Tripwire crossed
    CrossLineDetection,
    /// Intrusion into a region
    CrossRegionDetection,
    /// Abandoned object
    LeftDetection,
    /// Missing object
    TakenAwayDetection,
    /// Scene change / abnormal video
    VideoAbnormalDetection,
    FaceDetection,
    /// Sudden audio level change
    AudioMutation,
    AudioAnomaly,
    /// Image out of focus
    VideoUnFocus,
    /// Loitering
    WanderDetection,
    /// Crowd gathering
    RioterDetection,
}

impl EventCode {
    /// Parse a code as it appears on the wire (e.g., "VideoMotion").
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "VideoMotion" => Some(Self::VideoMotion),
            "VideoLoss" => Some(Self::VideoLoss),
            "VideoBlind" => Some(Self::VideoBlind),
            "AlarmLocal" => Some(Self::AlarmLocal),
            "CrossLineDetection" => Some(Self::CrossLineDetection),
            "CrossRegionDetection" => Some(Self::CrossRegionDetection),
            "LeftDetection" => Some(Self::LeftDetection),
            "TakenAwayDetection" => Some(Self::TakenAwayDetection),
            "VideoAbnormalDetection" => Some(Self::VideoAbnormalDetection),
            "FaceDetection" => Some(Self::FaceDetection),
            "AudioMutation" => Some(Self::AudioMutation),
            "AudioAnomaly" => Some(Self::AudioAnomaly),
            "VideoUnFocus" => Some(Self::VideoUnFocus),
            "WanderDetection" => Some(Self::WanderDetection),
            "RioterDetection" => Some(Self::RioterDetection),
            _ => None,
        }
    }

    /// The wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoMotion => "VideoMotion",
            Self::VideoLoss => "VideoLoss",
            Self::VideoBlind => "VideoBlind",
            Self::AlarmLocal => "AlarmLocal",
            Self::CrossLineDetection => "CrossLineDetection",
            Self::CrossRegionDetection => "CrossRegionDetection",
            Self::LeftDetection => "LeftDetection",
            Self::TakenAwayDetection => "TakenAwayDetection",
            Self::VideoAbnormalDetection => "VideoAbnormalDetection",
            Self::FaceDetection => "FaceDetection",
            Self::AudioMutation => "AudioMutation",
            Self::AudioAnomaly => "AudioAnomaly",
            Self::VideoUnFocus => "VideoUnFocus",
            Self::WanderDetection => "WanderDetection",
            Self::RioterDetection => "RioterDetection",
        }
    }
}

impl std::fmt::Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
