use anecdotes_confluence_sync::config::Secrets;
use anecdotes_confluence_sync::{
    AnecdotesClient, ConfluenceClient, DryRunPageStore, LocalStorage, SyncConfig, SyncEngine,
    SyncError, SyncOptions, SyncOutcome,
};
use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

const TEMPLATE: &str = concat!(
    r#"<h2 id="title">{{Access_Control_control_framework_category_1}}</h2>"#,
    r#"<table class="confluenceTable"><tbody>"#,
    r#"<tr><td data-cell="1">{{Access_Control_control_name_1}}</td>"#,
    r#"<td>{{Access_Control_control_tags_1}}</td>"#,
    r#"<td>{{Access_Control_control_requirements_1}}</td>"#,
    r#"<td colspan="2">{{Access_Control_control_scoped_systems_1}}</td></tr>"#,
    r#"<tr><td>{{Access_Control_control_name_2}}</td>"#,
    r#"<td>{{Access_Control_control_fields_value_2}}</td>"#,
    r#"<td colspan="2">{{Access_Control_control_scoped_systems_2}}</td></tr>"#,
    r#"</tbody></table>"#
);

fn config_for(server: &MockServer) -> SyncConfig {
    let values: HashMap<String, String> = [
        ("ANECDOTES_AUTH_URL", server.url("/anecdotes/auth")),
        ("API_ENDPOINT", server.url("/anecdotes/controls")),
        ("FIELDS_API_ENDPOINT", server.url("/anecdotes/fields")),
        ("CUSTOM_FIELDS_API_ENDPOINT", server.url("/anecdotes/custom-fields")),
        ("TAGS_API_ENDPOINT", server.url("/anecdotes/tags")),
        ("REQUIREMENTS_API_ENDPOINT", server.url("/anecdotes/requirements")),
        ("FRAMEWORK_CATEGORY_API_ENDPOINT", server.url("/anecdotes/categories")),
        ("CONFLUENCE_URL", server.url("/wiki/rest/api")),
        ("CONFLUENCE_USERNAME", "bot@example.com".to_string()),
        ("control_framework_id", "fw-soc2".to_string()),
        ("template_page_id", "100".to_string()),
        ("page_id", "200".to_string()),
        ("evidence_field", "evidence".to_string()),
        ("scoped_systems_field", "scoped_systems".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let secrets = Secrets {
        api_key: "anecdotes-key".to_string(),
        wiki_token: "wiki-token".to_string(),
    };
    SyncConfig::from_values(&values, secrets).unwrap()
}

/// Mocks every Anecdotes endpoint; returns the auth mock.
fn mock_anecdotes(server: &MockServer) -> Mock<'_> {
    let auth = server.mock(|when, then| {
        when.method(GET)
            .path("/anecdotes/auth")
            .header("x-anecdotes-api-key", "anecdotes-key");
        then.status(200).body("bearer-xyz");
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/anecdotes/controls")
            .header("Authorization", "Bearer bearer-xyz");
        then.status(200).json_body(json!([
            {
                "control_id": "c2",
                "control_name": "AC-2",
                "control_framework_id": "fw-soc2",
                "control_framework_category_id": "cat-ac",
                "control_requirement_ids": []
            },
            {
                "control_id": "c1",
                "control_name": "AC-1",
                "control_framework_id": "fw-soc2",
                "control_framework_category_id": "cat-ac",
                "control_requirement_ids": ["r1", "r-missing"]
            },
            {
                "control_id": "c9",
                "control_name": "AC-0",
                "control_framework_id": "fw-iso",
                "control_framework_category_id": "cat-ac"
            }
        ]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/categories");
        then.status(200).json_body(json!([
            {"category_id": "cat-ac", "category_name": "Access Control", "framework_id": "fw-soc2"}
        ]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/fields");
        then.status(200).json_body(json!({
            "c1": {"evidence": {"value": "Access review export"}},
            "c2": {"evidence": {"value": "Quarterly sign-off"}}
        }));
    });

    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/custom-fields");
        then.status(200).json_body(json!([
            {"id": "scoped_systems", "field_metadata": {"values": {"k1": "Payroll"}}}
        ]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/tags");
        then.status(200).json_body(json!([
            {"tag_name": "soc2", "tagged_entities": [
                {"entity_type": "control", "entity_id": "c1"},
                {"entity_type": "policy", "entity_id": "c2"}
            ]}
        ]));
    });

    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/requirements");
        then.status(200).json_body(json!([
            {"requirement_id": "r1", "requirement_name": "CC6.1"}
        ]));
    });

    auth
}

fn mock_template<'a>(server: &'a MockServer, markup: &str) -> Mock<'a> {
    let markup = markup.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path("/wiki/rest/api/content/100")
            .query_param("expand", "body.storage");
        then.status(200).json_body(json!({
            "id": "100",
            "title": "Controls template",
            "body": {"storage": {"value": markup, "representation": "storage"}}
        }));
    })
}

fn mock_current_page(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/wiki/rest/api/content/200")
            .query_param("expand", "body.storage,version");
        then.status(200).json_body(json!({
            "id": "200",
            "title": "SOC 2 Access Controls",
            "version": {"number": 7}
        }));
    })
}

const EXPECTED_DOCUMENT: &str = concat!(
    "<h2>Access Control</h2>",
    "<table><tbody>",
    "<tr><td>AC-1</td>",
    "<td>soc2</td>",
    "<td>CC6.1<br>Unknown</td>",
    r#"<td colspan="2">No Scoped Systems</td></tr>"#,
    "<tr><td>AC-2</td>",
    "<td>Quarterly sign-off</td>",
    r#"<td colspan="2">No Scoped Systems</td></tr>"#,
    "</tbody></table>"
);

#[tokio::test]
async fn test_end_to_end_sync_publishes_rendered_page() -> Result<()> {
    let server = MockServer::start();
    let auth_mock = mock_anecdotes(&server);
    let template_mock = mock_template(&server, TEMPLATE);
    let page_mock = mock_current_page(&server);

    let put_mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/wiki/rest/api/content/200")
            .header_exists("Authorization")
            .json_body(json!({
                "id": "200",
                "type": "page",
                "title": "SOC 2 Access Controls",
                "body": {"storage": {"value": EXPECTED_DOCUMENT, "representation": "storage"}},
                "version": {"number": 8}
            }));
        then.status(200).json_body(json!({
            "id": "200",
            "title": "SOC 2 Access Controls",
            "version": {"number": 8}
        }));
    });

    let config = config_for(&server);
    let engine = SyncEngine::new(
        AnecdotesClient::from_config(&config),
        ConfluenceClient::from_config(&config),
        SyncOptions::from_config(&config, true),
    );

    let outcome = engine.run().await?;

    auth_mock.assert();
    template_mock.assert();
    page_mock.assert();
    put_mock.assert();
    match outcome {
        SyncOutcome::Published(page) => {
            assert_eq!(page.version, 8);
            assert_eq!(page.title, "SOC 2 Access Controls");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_empty_template_never_calls_publish() -> Result<()> {
    let server = MockServer::start();
    mock_anecdotes(&server);
    let template_mock = mock_template(&server, "");
    let page_mock = mock_current_page(&server);
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/wiki/rest/api/content/200");
        then.status(200);
    });

    let config = config_for(&server);
    let engine = SyncEngine::new(
        AnecdotesClient::from_config(&config),
        ConfluenceClient::from_config(&config),
        SyncOptions::from_config(&config, false),
    );

    let outcome = engine.run().await?;

    assert_eq!(
        outcome,
        SyncOutcome::TemplateMissing {
            template_page_id: "100".to_string()
        }
    );
    template_mock.assert();
    page_mock.assert_hits(0);
    put_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_writes_file_instead_of_publishing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    mock_anecdotes(&server);
    mock_template(&server, TEMPLATE);
    mock_current_page(&server);
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/wiki/rest/api/content/200");
        then.status(200);
    });

    let config = config_for(&server);
    let pages = DryRunPageStore::new(
        ConfluenceClient::from_config(&config),
        LocalStorage::new(output_path.clone()),
    );
    let engine = SyncEngine::new(
        AnecdotesClient::from_config(&config),
        pages,
        SyncOptions::from_config(&config, false),
    );

    let outcome = engine.run().await?;

    put_mock.assert_hits(0);
    let written = temp_dir.path().join("page_200_v8.html");
    assert!(written.exists());
    assert_eq!(std::fs::read_to_string(&written)?, EXPECTED_DOCUMENT);
    match outcome {
        SyncOutcome::Published(page) => {
            assert_eq!(page.version, 8);
            assert!(page.local_path.is_some());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_auth_failure_stops_before_any_fetch() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/anecdotes/auth");
        then.status(403).body("forbidden");
    });
    let controls_mock = server.mock(|when, then| {
        when.method(GET).path("/anecdotes/controls");
        then.status(200).json_body(json!([]));
    });

    let config = config_for(&server);
    let engine = SyncEngine::new(
        AnecdotesClient::from_config(&config),
        ConfluenceClient::from_config(&config),
        SyncOptions::from_config(&config, false),
    );

    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, SyncError::Auth { status } if status.as_u16() == 403));
    controls_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_publish_conflict_is_surfaced() -> Result<()> {
    let server = MockServer::start();
    mock_anecdotes(&server);
    mock_template(&server, TEMPLATE);
    mock_current_page(&server);
    let put_mock = server.mock(|when, then| {
        when.method(PUT).path("/wiki/rest/api/content/200");
        then.status(409)
            .json_body(json!({"statusCode": 409, "message": "Version conflict"}));
    });

    let config = config_for(&server);
    let engine = SyncEngine::new(
        AnecdotesClient::from_config(&config),
        ConfluenceClient::from_config(&config),
        SyncOptions::from_config(&config, false),
    );

    let err = engine.run().await.unwrap_err();

    put_mock.assert();
    match err {
        SyncError::Http(e) => assert_eq!(e.status().map(|s| s.as_u16()), Some(409)),
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}
