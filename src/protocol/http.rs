// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP command client for the Mount Kelvin site API.

use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

use crate::config::{SiteConfig, SiteKey};
use crate::error::ProtocolError;
use crate::types::Brightness;

/// Body of an `applyDevice` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCommand {
    /// Identity of the device to control.
    pub id: String,
    /// Requested device state.
    pub state: DeviceCommandState,
}

/// Requested state inside a [`DeviceCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceCommandState {
    /// Whether the light should be on.
    pub on: bool,
    /// Brightness (0-255), only sent when turning on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
}

impl DeviceCommand {
    /// Creates a command turning a device on at the given brightness.
    #[must_use]
    pub fn turn_on(id: impl Into<String>, brightness: Brightness) -> Self {
        Self {
            id: id.into(),
            state: DeviceCommandState {
                on: true,
                bri: Some(brightness.value()),
            },
        }
    }

    /// Creates a command turning a device off.
    #[must_use]
    pub fn turn_off(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DeviceCommandState {
                on: false,
                bri: None,
            },
        }
    }
}

/// Body of an `applyScene` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneCommand {
    /// Identity of the scene to activate.
    pub id: String,
}

/// HTTP client sending commands to one Mount Kelvin site.
///
/// Commands are posted to `{base}/api/site/{siteKey}/applyDevice` and
/// `{base}/api/site/{siteKey}/applyScene`. The response body is not
/// consumed; only the status code is checked.
///
/// The client is cheap to clone. Every [`Light`](crate::Light) and
/// [`Scene`](crate::Scene) holds a clone so it can issue its own commands.
///
/// # Examples
///
/// ```no_run
/// use mount_kelvin::{CommandClient, SiteConfig};
/// use mount_kelvin::types::Brightness;
///
/// # async fn example() -> mount_kelvin::Result<()> {
/// let config = SiteConfig::new("my-site-key")?;
/// let client = CommandClient::new(&config)?;
///
/// client.turn_on("device-1", Brightness::new(200)).await?;
/// client.activate_scene("scene-1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandClient {
    client: Client,
    base_url: Arc<str>,
    site_key: SiteKey,
}

impl CommandClient {
    /// Creates a command client from the site configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &SiteConfig) -> Result<Self, ProtocolError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url().as_str().trim_end_matches('/')),
            site_key: config.site_key().clone(),
        })
    }

    /// Returns the API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turns a device on at the given brightness.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or is rejected.
    pub async fn turn_on(&self, id: &str, brightness: Brightness) -> Result<(), ProtocolError> {
        self.apply_device(&DeviceCommand::turn_on(id, brightness)).await
    }

    /// Turns a device off.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or is rejected.
    pub async fn turn_off(&self, id: &str) -> Result<(), ProtocolError> {
        self.apply_device(&DeviceCommand::turn_off(id)).await
    }

    /// Activates a scene.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or is rejected.
    pub async fn activate_scene(&self, id: &str) -> Result<(), ProtocolError> {
        let body = SceneCommand { id: id.to_string() };
        self.post(&self.build_url("applyScene"), &body).await
    }

    /// Sends a raw `applyDevice` command.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or is rejected.
    pub async fn apply_device(&self, command: &DeviceCommand) -> Result<(), ProtocolError> {
        self.post(&self.build_url("applyDevice"), command).await
    }

    /// Builds the URL for a site action.
    fn build_url(&self, action: &str) -> String {
        format!(
            "{}/api/site/{}/{action}",
            self.base_url,
            urlencoding::encode(self.site_key.expose())
        )
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), ProtocolError> {
        tracing::debug!(url = %url, "Sending HTTP command");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::CommandRejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = status.as_u16(), "Command accepted");
        Ok(())
    }
}
