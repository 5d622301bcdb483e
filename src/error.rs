// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Mount Kelvin library.
//!
//! Failures are split by where they happen: reading configuration, talking
//! to the service (HTTP commands and the realtime socket), and parsing site
//! snapshots pushed by the service.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a site snapshot.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to loading and validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable {0}")]
    MissingVariable(&'static str),

    /// The site key is empty or whitespace.
    #[error("site key must not be empty")]
    EmptySiteKey,

    /// The API base URL could not be parsed or has an unsupported scheme.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The Engine.IO protocol version is not supported.
    #[error("unsupported Engine.IO version: {0}")]
    UnsupportedEngineIo(String),
}

/// Errors related to protocol communication (HTTP/websocket).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Websocket connection or communication failed.
    #[cfg(feature = "socketio")]
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection to the service failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A frame from the realtime socket could not be understood.
    #[error("unexpected packet: {0}")]
    UnexpectedPacket(String),

    /// The service answered a command with a non-success status.
    #[error("command rejected with HTTP {status}")]
    CommandRejected {
        /// The HTTP status code.
        status: u16,
    },

    /// The transport is not connected.
    #[error("not connected")]
    NotConnected,
}

/// Errors related to parsing site snapshots.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload does not match the expected snapshot shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in snapshot: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingVariable("MOUNT_KELVIN_SITE_KEY");
        assert_eq!(
            err.to_string(),
            "missing environment variable MOUNT_KELVIN_SITE_KEY"
        );
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::EmptySiteKey.into();
        assert!(matches!(err, Error::Config(ConfigError::EmptySiteKey)));
    }

    #[test]
    fn command_rejected_display() {
        let err = ProtocolError::CommandRejected { status: 503 };
        assert_eq!(err.to_string(), "command rejected with HTTP 503");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("data".to_string());
        assert_eq!(err.to_string(), "missing field in snapshot: data");
    }
}
