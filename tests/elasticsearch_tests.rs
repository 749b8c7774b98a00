//! Index client integration tests.
//!
//! The first sections run without a server. The live suite at the bottom is
//! `#[ignore]`-gated and expects an Elasticsearch instance at
//! `http://localhost:9200`; run it with:
//!
//! `cargo test -- --ignored`

use elastic_index_client::{
    ClientConfig, ClientError, FieldMatch, FilterBuilder, IndexClient, MappingStatus,
};
use serde_json::json;

// ============================================================================
// Configuration Tests (no server required)
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = ClientConfig::new("localhost", 9200, "test_index");
    assert_eq!(config.node, "http://localhost:9200");
    assert_eq!(config.index, "test_index");
    assert!(config.mapping_file.is_none());
    assert!(config.auth.is_none());
}

#[test]
fn test_config_deserialization() {
    let config: ClientConfig = serde_json::from_value(json!({
        "node": "http://es1:9200",
        "index": "jobs",
        "request_timeout_ms": 5000
    }))
    .unwrap();
    assert_eq!(config.node, "http://es1:9200");
    assert_eq!(config.index, "jobs");
    assert_eq!(config.request_timeout_ms, 5000);
    assert_eq!(config.number_of_shards, 1);
}

// ============================================================================
// Filter Builder Tests (no server required)
// ============================================================================

#[test]
fn test_filter_output_format() {
    let filter = FilterBuilder::new()
        .field("name", "test")
        .field("host", FieldMatch::AnyOf(vec!["a".into(), "b".into()]));

    let body = filter.build();
    let must = body["filter"]["bool"]["must"].as_array().unwrap();
    assert_eq!(must.len(), 2);
    assert_eq!(must[0]["terms"]["host"], json!(["a", "b"]));
    assert_eq!(must[1]["term"]["name"], "test");
}

#[test]
fn test_filter_from_untyped_json_rejects_bad_shapes() {
    let object = json!({ "name": "test", "port": 9200 });
    let err = FilterBuilder::from_json(object.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidFilterValue { .. }));
}

// ============================================================================
// Live Tests (require a running Elasticsearch at localhost:9200)
// ============================================================================

mod live {
    use super::*;

    const TEST_HOST: &str = "localhost";
    const TEST_PORT: u16 = 9200;

    fn test_config(index: &str) -> ClientConfig {
        ClientConfig::new(TEST_HOST, TEST_PORT, index)
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    async fn connect(index: &str) -> IndexClient {
        init_logging();
        IndexClient::connect(test_config(index))
            .await
            .expect("connect failed; is Elasticsearch running on localhost:9200?")
    }

    /// Drops the test index and releases the client.
    async fn cleanup(client: IndexClient) {
        let _ = client.delete_index().await;
        client.close();
    }

    #[tokio::test]
    #[ignore]
    async fn test_connect_and_info() {
        let client = connect("eic_test_info").await;

        let info = client.info().await.unwrap();
        assert!(!info.version.number.is_empty());

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_connect_is_idempotent() {
        let client = connect("eic_test_reconnect").await;
        // A second connect finds the index already present.
        let second = connect("eic_test_reconnect").await;
        second.close();
        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_fresh_index_has_no_document_types() {
        let client = connect("eic_test_types_empty").await;
        assert!(client.document_types().await.unwrap().is_empty());
        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_connect_with_mapping_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.json");
        std::fs::write(
            &path,
            r#"{ "widget": { "_meta": { "owner": "tests" }, "dynamic_templates": [] } }"#,
        )
        .unwrap();

        let config = test_config("eic_test_mapping").with_mapping_file(&path);
        let client = IndexClient::connect(config).await.unwrap();

        if client.is_version_supported().await {
            assert!(matches!(
                client.mapping_status(),
                MappingStatus::Applied { doc_type } if doc_type == "widget"
            ));
            let types = client.document_types().await.unwrap();
            assert!(types.iter().any(|t| t == "widget"));
        } else {
            assert!(matches!(client.mapping_status(), MappingStatus::Skipped(_)));
        }

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_connect_with_missing_mapping_file_still_succeeds() {
        let config =
            test_config("eic_test_mapping_missing").with_mapping_file("/nonexistent/mapping.json");
        let client = IndexClient::connect(config).await.unwrap();
        assert!(!client.mapping_status().is_applied());
        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_add_two_documents_distinct_ids() {
        let client = connect("eic_test_add").await;

        let id1 = client
            .add_document("widget", &json!({ "name": "test", "host": "test.foo.bar" }))
            .await
            .unwrap();
        let id2 = client
            .add_document("widget", &json!({ "name": "test2", "host": "test.foo.bar" }))
            .await
            .unwrap();

        assert!(!id1.is_empty());
        assert_ne!(id1, id2);

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_add_get_round_trip() {
        let client = connect("eic_test_round_trip").await;

        let id = client
            .add_document_with_id("widget", "widget.1", &json!({ "name": "test" }))
            .await
            .unwrap();
        assert_eq!(id, "widget.1");

        let fetched = client.get_document("widget", "widget.1").await.unwrap();
        assert!(fetched.found);
        assert_eq!(fetched.source["name"], "test");

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_overwrites() {
        let client = connect("eic_test_update").await;

        client
            .add_document_with_id("widget", "widget.2", &json!({ "host": "test.foo.bar" }))
            .await
            .unwrap();
        client
            .update_document("widget", "widget.2", &json!({ "host": "test.foo.bar.updated" }))
            .await
            .unwrap();

        let fetched = client.get_document("widget", "widget.2").await.unwrap();
        assert!(fetched.found);
        assert_eq!(fetched.source["host"], "test.foo.bar.updated");

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_missing_document_reports_not_found() {
        let client = connect("eic_test_get_missing").await;

        let fetched = client.get_document("widget", "no-such-id").await.unwrap();
        assert!(!fetched.found);

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_get_documents_by_field() {
        let client = connect("eic_test_by_field").await;

        client
            .add_document("widget", &json!({ "name": "test", "host": "test.foo.bar" }))
            .await
            .unwrap();

        // Make the write searchable before querying.
        client.refresh().await.unwrap();

        let hits = client
            .get_documents_by_field("widget", "name", "test")
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].source["name"], "test");

        let none = client
            .get_documents_by_field("widget", "name", "no-such-value")
            .await
            .unwrap();
        assert!(none.is_empty());

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_document() {
        let client = connect("eic_test_delete").await;

        client
            .add_document_with_id("widget", "widget.3", &json!({ "name": "test" }))
            .await
            .unwrap();

        assert!(client.delete_document("widget", "widget.3").await);
        assert!(!client.delete_document("widget", "widget.3").await);

        let fetched = client.get_document("widget", "widget.3").await.unwrap();
        assert!(!fetched.found);

        cleanup(client).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_index() {
        let client = connect("eic_test_delete_index").await;

        assert!(client.delete_index().await.unwrap());
        assert!(!client.delete_index().await.unwrap());

        client.close();
    }
}
