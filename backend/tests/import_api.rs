use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sales_analyzer_backend::{
    repositories::{import_log, sales_record, SalesFilters},
    router::build_router,
    services::{
        importer::{stage_upload, ImporterConfig},
        Importer,
    },
    state::AppState,
};
use sqlx::PgPool;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tower::ServiceExt;

#[path = "support/mod.rs"]
mod support;

use support::{csv_document, csv_line};

async fn integration_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(())).lock().await
}

fn app(pool: PgPool) -> Router {
    build_router(support::test_state(pool))
}

fn upload_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, support::multipart_content_type())
        .body(Body::from(support::multipart_body(field, filename, content)))
        .expect("build upload request")
}

fn valid_lines(count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| {
            csv_line(
                &format!("ORD-{i}"),
                &format!("Product {i}"),
                "North",
                "120.50",
                "2024-01-15 10:00:00",
            )
        })
        .collect()
}

async fn record_count(pool: &PgPool) -> i64 {
    sales_record::count_sales_records(pool, &SalesFilters::default())
        .await
        .expect("count records")
}

#[tokio::test]
async fn upload_imports_every_valid_row_and_logs_success() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let csv = csv_document(&valid_lines(5));

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "sales.csv");
    assert_eq!(body["records_imported"], 5);
    assert_eq!(body["records_rejected"], 0);
    assert!(body.get("errors").is_none());

    assert_eq!(record_count(&pool).await, 5);
    let logs = import_log::list_recent_import_logs(&pool, 20)
        .await
        .expect("list logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].records_imported, 5);
    assert_eq!(logs[0].file_size, csv.len() as i64);
    assert_eq!(logs[0].import_status.as_str(), "success");
}

#[tokio::test]
async fn upload_skips_rows_that_fail_conversion() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let mut lines = valid_lines(5);
    lines[2] = csv_line("ORD-3", "Product 3", "North", "abc", "2024-01-15 10:00:00");
    let csv = csv_document(&lines);

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["records_imported"], 4);
    assert_eq!(body["records_rejected"], 1);
    assert_eq!(record_count(&pool).await, 4);
}

#[tokio::test]
async fn upload_drops_duplicates_and_incomplete_rows() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let mut lines = valid_lines(2);
    lines.push(lines[0].clone());
    lines.push(csv_line("ORD-9", "Product 9", "NA", "10", "2024-01-15 10:00:00"));
    lines.push("ORD-10,Product 10,Tools".to_string());
    let csv = csv_document(&lines);

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    let body = support::body_json(response).await;
    assert_eq!(body["records_imported"], 2);
    assert_eq!(body["records_rejected"], 3);
    assert_eq!(record_count(&pool).await, 2);
}

#[tokio::test]
async fn upload_csv_alias_accepts_uploads() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let csv = csv_document(&valid_lines(2));

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload/csv", "file", "SALES.CSV", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(record_count(&pool).await, 2);
}

#[tokio::test]
async fn non_csv_upload_is_rejected_without_history() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let csv = csv_document(&valid_lines(1));

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "sales.xlsx", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert_eq!(body["code"], "UNSUPPORTED_FILE");
    assert_eq!(
        import_log::count_import_logs(&pool).await.expect("count logs"),
        0
    );
    assert_eq!(record_count(&pool).await, 0);
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_history() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let mut config = support::test_config();
    config.max_upload_bytes = 64;
    let app = build_router(AppState::new(pool.clone(), config));
    let csv = csv_document(&valid_lines(5));
    assert!(csv.len() > 64);

    let response = app
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert_eq!(
        import_log::count_import_logs(&pool).await.expect("count logs"),
        0
    );
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "document", "sales.csv", b"a,b\n"))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert_eq!(body["code"], "MISSING_FILE");
    assert_eq!(
        import_log::count_import_logs(&pool).await.expect("count logs"),
        0
    );
}

#[tokio::test]
async fn missing_required_column_records_failed_import() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let csv = "order_id,product_name,category\nORD-1,Widget,Tools\n";

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "partial.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["records_imported"], 0);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("sales_amount"), "message: {message}");
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));

    assert_eq!(record_count(&pool).await, 0);
    let logs = import_log::list_recent_import_logs(&pool, 20)
        .await
        .expect("list logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].import_status.as_str(), "failed");
    assert_eq!(logs[0].records_imported, 0);
    assert_eq!(logs[0].file_size, csv.len() as i64);
    assert!(logs[0].error_message.is_some());
}

#[tokio::test]
async fn malformed_csv_records_failed_import_and_no_rows() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let mut csv = csv_document(&valid_lines(2));
    csv.push_str("ORD-X,too,many,fields,in,this,row,1,2,3,4,5,6\n");

    let response = app(pool.clone())
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    let body = support::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(record_count(&pool).await, 0);
    assert_eq!(
        import_log::count_import_logs(&pool).await.expect("count logs"),
        1
    );
}

#[tokio::test]
async fn truncated_multipart_body_is_rejected_as_json() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;

    let response = app(pool.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/upload")
                .header(header::CONTENT_TYPE, support::multipart_content_type())
                .body(Body::from("no boundary in this body"))
                .expect("build upload request"),
        )
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(response).await;
    assert_eq!(body["code"], "INVALID_MULTIPART");
    assert_eq!(
        import_log::count_import_logs(&pool).await.expect("count logs"),
        0
    );
}

#[tokio::test]
async fn upload_with_staging_dir_imports_and_cleans_up() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = support::test_config();
    config.upload_dir = Some(dir.path().to_path_buf());
    let app = build_router(AppState::new(pool.clone(), config));
    let csv = csv_document(&valid_lines(3));

    let response = app
        .oneshot(upload_request("/api/v1/upload", "file", "sales.csv", csv.as_bytes()))
        .await
        .expect("call upload");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(record_count(&pool).await, 3);
    let logs = import_log::list_recent_import_logs(&pool, 20)
        .await
        .expect("list logs");
    assert_eq!(logs[0].file_size, csv.len() as i64);
    let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn staged_import_reads_rows_from_disk() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let importer = Importer::new(
        pool.clone(),
        ImporterConfig {
            upload_dir: Some(dir.path().to_path_buf()),
            ..ImporterConfig::default()
        },
    );

    let uploaded = csv_document(&valid_lines(1));
    let staged = stage_upload(dir.path(), &chrono_tz::UTC, "sales.csv", uploaded.as_bytes())
        .await
        .expect("stage upload");
    let on_disk = csv_document(&[
        csv_line("DISK-1", "Disk Product", "East", "10.00", "2024-02-01 09:00:00"),
        csv_line("DISK-2", "Disk Product", "East", "20.00", "2024-02-02 09:00:00"),
    ]);
    std::fs::write(staged.path(), on_disk).expect("replace staged file");

    let result = importer
        .import_staged(&staged, "sales.csv")
        .await
        .expect("import staged file");
    staged.remove().await;

    assert!(result.success);
    assert_eq!(result.records_imported, 2);
    let stored = sales_record::list_sales_records(&pool, &SalesFilters::default(), 0, 10)
        .await
        .expect("list records");
    let order_ids: Vec<&str> = stored.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(order_ids, vec!["DISK-1", "DISK-2"]);
}

#[tokio::test]
async fn history_lists_latest_twenty_newest_first() {
    let _guard = integration_guard().await;
    let pool = support::fresh_pool().await;
    let app = app(pool.clone());

    for i in 0..22 {
        let csv = csv_document(&valid_lines(1));
        let response = app
            .clone()
            .oneshot(upload_request(
                "/api/v1/upload",
                "file",
                &format!("batch_{i:02}.csv"),
                csv.as_bytes(),
            ))
            .await
            .expect("call upload");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/upload/history")
                .body(Body::empty())
                .expect("build history request"),
        )
        .await
        .expect("call history");

    assert_eq!(response.status(), StatusCode::OK);
    let body = support::body_json(response).await;
    let entries = body.as_array().expect("history array");
    assert_eq!(entries.len(), 20);
    assert_eq!(entries[0]["filename"], "batch_21.csv");
    assert_eq!(entries[19]["filename"], "batch_02.csv");
    assert_eq!(entries[0]["import_status"], "success");
}
