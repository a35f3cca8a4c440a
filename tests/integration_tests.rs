//! Integration tests using a mock HTTP server
//!
//! Exercise the full flow: JSON config → token → paginated fetching →
//! flattening → CSV/manifest output → persisted column state.

use gmb_extractor::cli::{Cli, Runner};
use gmb_extractor::output::Manifest;
use serde_json::json;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RunDirs {
    _tmp: tempfile::TempDir,
    config: PathBuf,
    output: PathBuf,
    state: PathBuf,
}

fn write_config(server_uri: &str, endpoints: &str, range: (&str, &str)) -> RunDirs {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.json");
    let output = tmp.path().join("out/tables");
    let state = tmp.path().join("state.json");

    let contents = json!({
        "endpoints": serde_json::from_str::<serde_json::Value>(endpoints).unwrap(),
        "request_range": {"start_date": range.0, "end_date": range.1},
        "auth": {"access_token": "test-token"},
        "api": {
            "v1_url": format!("{server_uri}/v1"),
            "v4_url": format!("{server_uri}/v4"),
            "performance_url": format!("{server_uri}/perf"),
            "qanda_url": format!("{server_uri}/qanda")
        }
    });
    std::fs::write(&config, contents.to_string()).unwrap();

    RunDirs {
        _tmp: tmp,
        config,
        output,
        state,
    }
}

async fn run(dirs: &RunDirs) -> gmb_extractor::Result<()> {
    let cli = Cli {
        config: dirs.config.clone(),
        output_dir: dirs.output.clone(),
        state: dirs.state.clone(),
        verbose: false,
    };
    Runner::new(cli).run().await
}

fn csv_lines(dir: &Path, table: &str) -> Vec<String> {
    std::fs::read_to_string(dir.join(format!("{table}.csv")))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

async fn mount_account_tree(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{
                "name": "accounts/1",
                "accountName": "Acme",
                "type": "PERSONAL",
                "verificationState": "VERIFIED"
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/1/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locations": [{
                "name": "locations/11",
                "title": "Acme Prague",
                "storefrontAddress": {
                    "postalCode": "11000",
                    "addressLines": ["Main St 1", "Floor 2"]
                },
                "latlng": {"latitude": 50.08, "longitude": 14.43}
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_run_produces_tables_manifests_and_state() {
    let server = MockServer::start().await;
    mount_account_tree(&server).await;

    // Reviews span two pages; the second page carries no token
    Mock::given(method("GET"))
        .and(path("/v4/accounts/1/locations/11/reviews"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reviews": [{
                "name": "accounts/1/locations/11/reviews/r2",
                "starRating": "FIVE",
                "reviewer": {"displayName": "Bob"}
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/accounts/1/locations/11/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reviews": [{
                "name": "accounts/1/locations/11/reviews/r1",
                "starRating": "FOUR",
                "reviewer": {"displayName": "Alice"},
                "comment": "Nice, friendly staff"
            }],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let dirs = write_config(
        &server.uri(),
        r#"["reviews"]"#,
        ("2024-01-01", "2024-01-31"),
    );
    run(&dirs).await.unwrap();

    // Accounts table
    let accounts = csv_lines(&dirs.output, "accounts");
    assert_eq!(accounts[0], "name,accountName,type,verificationState");
    assert_eq!(accounts[1], "accounts/1,Acme,PERSONAL,VERIFIED");

    // Locations table flattens the nested address and stringifies the
    // scalar address lines
    let locations = csv_lines(&dirs.output, "locations");
    assert!(locations[0].contains("storefrontAddress_postalCode"));
    assert!(locations[0].contains("storefrontAddress_addressLines"));
    assert!(locations[0].contains("latlng_latitude"));
    assert!(locations[1].contains("11000"));
    assert!(locations[1].contains("Main St 1"));

    // Reviews concatenated across pages, in page order
    let reviews = csv_lines(&dirs.output, "reviews");
    assert_eq!(reviews.len(), 3);
    assert!(reviews[1].contains("reviews/r1"));
    assert!(reviews[2].contains("reviews/r2"));
    // Page 2's record lacks 'comment'; the column still exists
    assert!(reviews[0].contains("comment"));

    // Manifests declare incremental load and primary keys
    let manifest: Manifest = serde_json::from_str(
        &std::fs::read_to_string(dirs.output.join("reviews.csv.manifest")).unwrap(),
    )
    .unwrap();
    assert!(manifest.incremental);
    assert_eq!(manifest.primary_key, vec!["name"]);

    // State file records the column sets for the next run
    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dirs.state).unwrap()).unwrap();
    assert_eq!(state["accounts"][0], "name");
    assert!(state["reviews"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "comment"));
}

#[tokio::test]
async fn test_column_sets_survive_across_runs() {
    // Run 1: reviews carry a comment column
    let server1 = MockServer::start().await;
    mount_account_tree(&server1).await;
    Mock::given(method("GET"))
        .and(path("/v4/accounts/1/locations/11/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reviews": [{"name": "reviews/r1", "comment": "First!"}]
        })))
        .mount(&server1)
        .await;

    let mut dirs = write_config(
        &server1.uri(),
        r#"["reviews"]"#,
        ("2024-01-01", "2024-01-31"),
    );
    run(&dirs).await.unwrap();

    // Run 2 against a server whose reviews lack 'comment' but add
    // 'updateTime', reusing the same state file
    let server2 = MockServer::start().await;
    mount_account_tree(&server2).await;
    Mock::given(method("GET"))
        .and(path("/v4/accounts/1/locations/11/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reviews": [{"name": "reviews/r2", "updateTime": "2024-02-01T00:00:00Z"}]
        })))
        .mount(&server2)
        .await;

    let dirs2 = write_config(
        &server2.uri(),
        r#"["reviews"]"#,
        ("2024-01-01", "2024-01-31"),
    );
    // Same state and output as run 1
    dirs.config = dirs2.config.clone();
    run(&dirs).await.unwrap();

    let reviews = csv_lines(&dirs.output, "reviews");
    // Schema grew, never shrank: run 1's column order first, new column after
    assert_eq!(reviews[0], "name,comment,updateTime");
    assert_eq!(reviews[1], "reviews/r2,,2024-02-01T00:00:00Z");
}

#[tokio::test]
async fn test_reversed_date_range_aborts_before_any_fetch() {
    let server = MockServer::start().await;

    // The accounts endpoint must never be hit
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dirs = write_config(
        &server.uri(),
        r#"["reviews"]"#,
        ("2024-02-01", "2024-01-01"),
    );
    let err = run(&dirs).await.unwrap_err();

    assert!(err.is_config_error());
    assert!(!dirs.output.exists());
}

#[tokio::test]
async fn test_no_endpoints_selected_aborts_before_any_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dirs = write_config(&server.uri(), "[]", ("2024-01-01", "2024-01-31"));
    let err = run(&dirs).await.unwrap_err();

    assert!(err.is_config_error());
}

#[tokio::test]
async fn test_empty_endpoint_results_write_no_files() {
    let server = MockServer::start().await;
    mount_account_tree(&server).await;

    Mock::given(method("GET"))
        .and(path("/v4/accounts/1/locations/11/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mediaItems": []})))
        .mount(&server)
        .await;

    let dirs = write_config(&server.uri(), r#"["media"]"#, ("2024-01-01", "2024-01-31"));
    run(&dirs).await.unwrap();

    // Accounts and locations written, media skipped entirely
    assert!(dirs.output.join("accounts.csv").exists());
    assert!(dirs.output.join("locations.csv").exists());
    assert!(!dirs.output.join("media.csv").exists());
    assert!(!dirs.output.join("media.csv.manifest").exists());
}
