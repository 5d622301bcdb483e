// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP command path using wiremock.

use mount_kelvin::{Brightness, CommandClient, Light, LightType, ProtocolError, Scene, SiteConfig};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> SiteConfig {
    SiteConfig::new("site-key")
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

fn client(server: &MockServer) -> CommandClient {
    CommandClient::new(&config(server)).unwrap()
}

// ============================================================================
// CommandClient Tests
// ============================================================================

mod command_client {
    use super::*;

    #[tokio::test]
    async fn turn_on_posts_apply_device() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/site/site-key/applyDevice"))
            .and(body_json(json!({ "id": "d1", "state": { "on": true, "bri": 120 } })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .turn_on("d1", Brightness::new(120))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn turn_off_posts_apply_device_without_brightness() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/site/site-key/applyDevice"))
            .and(body_json(json!({ "id": "d1", "state": { "on": false } })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).turn_off("d1").await.unwrap();
    }

    #[tokio::test]
    async fn activate_scene_posts_apply_scene() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/site/site-key/applyScene"))
            .and(body_json(json!({ "id": "s1" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).activate_scene("s1").await.unwrap();
    }

    #[tokio::test]
    async fn site_key_is_percent_encoded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/site/my%20site/applyScene"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = SiteConfig::new("my site")
            .unwrap()
            .with_base_url(&server.uri())
            .unwrap();
        CommandClient::new(&config)
            .unwrap()
            .activate_scene("s1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_command_returns_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = client(&server).turn_off("d1").await;
        assert!(matches!(
            result,
            Err(ProtocolError::CommandRejected { status: 403 })
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_http_error() {
        let server = MockServer::start().await;
        let config = config(&server);
        drop(server);

        let result = CommandClient::new(&config)
            .unwrap()
            .activate_scene("s1")
            .await;
        assert!(matches!(result, Err(ProtocolError::Http(_))));
    }
}

// ============================================================================
// Entity Command Tests
// ============================================================================

mod entity_commands {
    use super::*;

    async fn expect_brightness(server: &MockServer, bri: u8) {
        Mock::given(method("POST"))
            .and(path("/api/site/site-key/applyDevice"))
            .and(body_json(json!({ "id": "d1", "state": { "on": true, "bri": bri } })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(server)
            .await;
    }

    fn lamp(server: &MockServer, bri: Option<u8>) -> Light {
        Light::new("d1", LightType::Dimmable, "Lamp", client(server))
            .with_state(false, bri.map(Brightness::new))
    }

    #[tokio::test]
    async fn turn_on_uses_requested_brightness() {
        let server = MockServer::start().await;
        expect_brightness(&server, 200).await;

        lamp(&server, Some(50))
            .turn_on(Some(Brightness::new(200)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn turn_on_reuses_last_brightness() {
        let server = MockServer::start().await;
        expect_brightness(&server, 50).await;

        lamp(&server, Some(50)).turn_on(None).await.unwrap();
    }

    #[tokio::test]
    async fn turn_on_defaults_to_full_brightness() {
        let server = MockServer::start().await;
        expect_brightness(&server, 255).await;

        lamp(&server, None).turn_on(None).await.unwrap();
    }

    #[tokio::test]
    async fn turn_on_treats_zero_as_unknown() {
        let server = MockServer::start().await;
        expect_brightness(&server, 255).await;

        lamp(&server, Some(0)).turn_on(None).await.unwrap();
    }

    #[tokio::test]
    async fn scene_activation_failure_is_returned() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/site/site-key/applyScene"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let scene = Scene::new("s1", "Dinner", client(&server));
        let result = scene.activate().await;
        assert!(matches!(
            result,
            Err(ProtocolError::CommandRejected { status: 500 })
        ));
    }
}
