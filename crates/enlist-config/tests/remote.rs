//! Remote configuration tests against a mocked Consul agent.

use enlist_config::{AppConfig, ConfigError, ConsulProvider, RemoteProvider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config(endpoint: &str) -> AppConfig {
    AppConfig::from_value(json!({
        "application": "enlist",
        "projectid": "local-project",
        "smtp": { "host": "local.mail", "port": 25 },
        "remote": { "provider": "consul", "endpoint": endpoint, "path": "enlist/config" }
    }))
    .unwrap()
}

#[tokio::test]
async fn consul_document_is_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/enlist/config"))
        .and(query_param("raw", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "application": "enlist-remote",
            "smtp": { "host": "remote.mail" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ConsulProvider::new(&server.uri(), "enlist/config").unwrap();
    let document = provider.fetch().await.unwrap();

    assert_eq!(document["application"], "enlist-remote");
    assert_eq!(provider.name(), "consul");
}

#[tokio::test]
async fn remote_values_take_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/enlist/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projectid": "remote-project",
            "smtp": { "host": "remote.mail" }
        })))
        .mount(&server)
        .await;

    let config = local_config(&server.uri())
        .with_env(vec![
            ("ENLIST_SMTP_HOST".to_string(), "env.mail".to_string()),
            ("ENLIST_SMTP_PORT".to_string(), "2525".to_string()),
        ])
        .attach_remote()
        .await;

    assert!(config.has_remote());
    assert_eq!(config.get_string("projectid").as_deref(), Some("remote-project"));
    assert_eq!(config.get_string("smtp.host").as_deref(), Some("remote.mail"));
    // Not set remotely, so the environment wins over the file.
    assert_eq!(config.get_i64("smtp.port"), Some(2525));
    assert_eq!(config.get_string("application").as_deref(), Some("enlist"));
}

#[tokio::test]
async fn remote_failure_keeps_local_configuration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/enlist/config"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = local_config(&server.uri()).attach_remote().await;

    assert!(!config.has_remote());
    assert_eq!(config.get_string("projectid").as_deref(), Some("local-project"));
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = ConsulProvider::new(&server.uri(), "enlist/config").unwrap();
    let result = provider.fetch().await;

    assert!(matches!(result, Err(ConfigError::RemoteStatus { status: 500 })));
}

#[tokio::test]
async fn non_object_document_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2, 3]"))
        .mount(&server)
        .await;

    let mut config = local_config(&server.uri());
    let provider = ConsulProvider::new(&server.uri(), "enlist/config").unwrap();
    let result = config.load_remote(&provider).await;

    assert!(matches!(result, Err(ConfigError::NotAnObject(_))));
    assert!(!config.has_remote());
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("projectid = nope"))
        .mount(&server)
        .await;

    let provider = ConsulProvider::new(&server.uri(), "enlist/config").unwrap();
    assert!(matches!(
        provider.fetch().await,
        Err(ConfigError::Parse { .. })
    ));
}
