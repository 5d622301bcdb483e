// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mount Kelvin - A Rust client for Mount Kelvin lighting sites.
//!
//! Mount Kelvin pushes a full description of a site (rooms, devices and
//! scenes) over Socket.IO whenever anything changes, and accepts commands
//! over HTTP. This library turns that stream into long-lived entities and
//! only reports the ones that actually changed.
//!
//! # Features
//!
//! - **Realtime updates**: Socket.IO subscription with Engine.IO v3 and v4
//! - **Reconciliation**: new, changed and missing entities per snapshot
//! - **Commands**: turn lights on/off with brightness, activate scenes
//! - **Events**: broadcast entity events for UIs
//!
//! # Quick Start
//!
//! ```no_run
//! use mount_kelvin::{Integration, SiteConfig};
//!
//! #[tokio::main]
//! async fn main() -> mount_kelvin::Result<()> {
//!     let config = SiteConfig::new("my-site-key")?;
//!     let mut integration = Integration::socketio(&config)?;
//!     let handle = integration.handle();
//!
//!     tokio::spawn(async move {
//!         let mut events = handle.subscribe();
//!         while let Ok(event) = events.recv().await {
//!             if let Some(light) = handle.light(event.unique_id()) {
//!                 println!("{event}: on={}", light.is_on());
//!             }
//!         }
//!     });
//!
//!     integration.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Lower level building blocks
//!
//! - [`Communicator`] runs the subscription and dispatches parsed snapshots
//!   to callbacks registered in its [`SiteCallbacks`](subscription::SiteCallbacks)
//! - [`reconcile::Reconciler`] matches snapshots against a host supplied
//!   through [`reconcile::EntityDirectory`]
//! - [`CommandClient`] sends `applyDevice` / `applyScene` requests
//!
//! # Feature flags
//!
//! - `socketio` (default): the websocket transport. Without it, bring your
//!   own [`protocol::Transport`].

mod communicator;
mod config;
pub mod error;
pub mod event;
mod integration;
pub mod model;
pub mod protocol;
pub mod reconcile;
pub mod snapshot;
pub mod subscription;
pub mod types;

pub use communicator::{Communicator, ConnectionState, SITE_EVENT, SUBSCRIBE_EVENT};
pub use config::{EngineIoVersion, ReconnectPolicy, SiteConfig, SiteKey};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use integration::{Integration, IntegrationHandle, LightPlatform, ScenePlatform};
pub use model::{Entity, EntityKind, Light, Room, Scene};
pub use protocol::CommandClient;
pub use types::{Brightness, LightType};
