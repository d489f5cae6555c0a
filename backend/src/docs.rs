#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::{
        analytics::{TopQuery, TrendQuery},
        common::SalesFilterQuery,
        health::HealthResponse,
        sales::SalesListQuery,
    },
    models::{
        analytics::{
            CategorySales, DailySales, ProductSales, RegionSales, SalesStatistics, SalesSummary,
        },
        import_log::{ImportLog, ImportResult, ImportStatus},
        sales_record::SalesRecord,
    },
    types::{ImportLogId, SalesRecordId},
};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub const DOCS_PATH: &str = "/api/docs";
pub const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";

/// Swagger UI at `/api/docs`, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_doc,
        upload_doc,
        upload_csv_doc,
        upload_history_doc,
        list_sales_doc,
        get_sale_doc,
        sales_summary_doc,
        sales_statistics_doc,
        export_sales_doc,
        top_products_doc,
        top_regions_doc,
        top_categories_doc,
        sales_trend_doc
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            // imports
            UploadForm,
            ImportResult,
            ImportLog,
            ImportLogId,
            ImportStatus,
            // sales
            SalesRecord,
            SalesRecordId,
            SalesListQuery,
            SalesFilterQuery,
            SalesSummary,
            SalesStatistics,
            // analytics
            TopQuery,
            TrendQuery,
            ProductSales,
            RegionSales,
            CategorySales,
            DailySales
        )
    ),
    tags(
        (name = "Upload", description = "CSV upload and import history"),
        (name = "Sales", description = "Sales records, summary and export"),
        (name = "Analytics", description = "Rankings and daily trend"),
        (name = "Health", description = "Liveness check")
    )
)]
pub struct ApiDoc;

/// Multipart body for CSV uploads.
#[derive(ToSchema)]
struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, body = HealthResponse)),
    tag = "Health"
)]
fn health_doc() {}

#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import outcome, including failed imports", body = ImportResult),
        (status = 400, description = "Rejected upload; `code` is one of INVALID_FILENAME, UNSUPPORTED_FILE, FILE_TOO_LARGE, MISSING_FILE, INVALID_MULTIPART", body = ErrorResponse),
        (status = 500, description = "Upload could not be staged", body = ErrorResponse)
    ),
    tag = "Upload"
)]
fn upload_doc() {}

#[utoipa::path(
    post,
    path = "/api/v1/upload/csv",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = ImportResult),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Upload"
)]
fn upload_csv_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/upload/history",
    responses((status = 200, description = "20 most recent imports", body = [ImportLog])),
    tag = "Upload"
)]
fn upload_history_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(SalesListQuery),
    responses(
        (status = 200, body = [SalesRecord]),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Sales"
)]
fn list_sales_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/sales/{id}",
    params(("id" = i64, Path, description = "Sales record id")),
    responses(
        (status = 200, body = SalesRecord),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Sales"
)]
fn get_sale_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/sales/summary",
    responses((status = 200, body = SalesSummary)),
    tag = "Sales"
)]
fn sales_summary_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/sales/statistics",
    params(SalesFilterQuery),
    responses(
        (status = 200, body = SalesStatistics),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Sales"
)]
fn sales_statistics_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/sales/export",
    params(SalesFilterQuery),
    responses((status = 200, description = "CSV attachment", content_type = "text/csv", body = String)),
    tag = "Sales"
)]
fn export_sales_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/top-products",
    params(TopQuery),
    responses((status = 200, body = [ProductSales])),
    tag = "Analytics"
)]
fn top_products_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/top-regions",
    params(TopQuery),
    responses((status = 200, body = [RegionSales])),
    tag = "Analytics"
)]
fn top_regions_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/top-categories",
    params(TopQuery),
    responses((status = 200, body = [CategorySales])),
    tag = "Analytics"
)]
fn top_categories_doc() {}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/sales-trend",
    params(TrendQuery),
    responses(
        (status = 200, body = [DailySales]),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Analytics"
)]
fn sales_trend_doc() {}
