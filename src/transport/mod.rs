// MIT License - Copyright (c) 2026 The dahua-cam Authors

pub mod auth;
pub mod http;

pub use http::HttpTransport;
