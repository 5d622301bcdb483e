// SPDX-License-Identifier: MPL-2.0

//! Demo program: mirror a Mount Kelvin site and print entity events.
//!
//! # Usage
//!
//! ```bash
//! MOUNT_KELVIN_SITE_KEY=<key> cargo run --example bridge
//! MOUNT_KELVIN_SITE_KEY=<key> cargo run --example bridge -- on <device-id> [brightness]
//! MOUNT_KELVIN_SITE_KEY=<key> cargo run --example bridge -- off <device-id>
//! MOUNT_KELVIN_SITE_KEY=<key> cargo run --example bridge -- scene <scene-id>
//! ```
//!
//! Without arguments the program subscribes to the site and prints every
//! entity event. Lost connections are resumed until the server closes the
//! session. Logs are printed by the
//! `tracing-subscriber` formatter.

use std::env;

use mount_kelvin::event::EntityEvent;
use mount_kelvin::{Brightness, Entity, EntityKind, Integration, SiteConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = SiteConfig::from_env()?;
    let args: Vec<String> = env::args().skip(1).collect();

    if !args.is_empty() {
        return send_command(&config, &args).await;
    }

    let mut integration = Integration::socketio(&config)?;
    let handle = integration.handle();
    let mut events = handle.subscribe();

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            let name = match event.kind() {
                EntityKind::Light => handle.light(event.unique_id()).map(|light| {
                    let state = if light.is_on() { "on" } else { "off" };
                    let brightness = light
                        .brightness()
                        .map_or_else(|| "-".to_string(), |bri| bri.to_string());
                    format!("{} [{state}, {brightness}]", light.display_name())
                }),
                EntityKind::Scene => handle.scene(event.unique_id()).map(|s| s.display_name()),
            };
            match (&event, name) {
                (EntityEvent::Removed { .. }, _) | (_, None) => println!("{event}"),
                (_, Some(name)) => println!("{event}: {name}"),
            }
        }
    });

    println!("Subscribing to site {}...", config.site_key());
    integration.run().await?;
    println!("Disconnected.");
    Ok(())
}

async fn send_command(
    config: &SiteConfig,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let client = mount_kelvin::CommandClient::new(config)?;

    match args {
        [verb, id] if verb == "on" => client.turn_on(id, Brightness::MAX).await?,
        [verb, id, bri] if verb == "on" => client.turn_on(id, Brightness::new(bri.parse()?)).await?,
        [verb, id] if verb == "off" => client.turn_off(id).await?,
        [verb, id] if verb == "scene" => client.activate_scene(id).await?,
        _ => {
            eprintln!(
                "Usage: bridge [on <device-id> [brightness] | off <device-id> | scene <scene-id>]"
            );
            std::process::exit(1);
        }
    }

    println!("Command sent.");
    Ok(())
}
