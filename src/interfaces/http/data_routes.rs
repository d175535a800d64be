use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpRequest, HttpResponse, Scope};
use serde::{Deserialize, Serialize};

use super::{caller_id, respond, respond_list, HttpState};
use crate::application::UploadRequest;
use crate::domain::error::AppError;
use crate::domain::tabular::{ColumnDescriptor, FieldMap};

/// Header carrying the uploaded file's original name
pub const FILE_NAME_HEADER: &str = "X-File-Name";

pub(super) fn scope() -> Scope {
    web::scope("/data")
        .service(upload_data)
        .service(list_sources)
        .service(preview_data)
        .service(analyze_data)
        .service(infer_schema)
}

#[derive(Debug, Default, Deserialize)]
struct UploadQuery {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    source_id: String,
    #[serde(default)]
    analysis_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InferQuery {
    /// Comma-separated names replacing the header row
    #[serde(default)]
    columns: Option<String>,
}

#[derive(Serialize)]
struct InferResponse {
    columns: Vec<ColumnDescriptor>,
    preview: Vec<FieldMap>,
}

/// Upload a file as the raw request body
#[post("/upload")]
async fn upload_data(
    data: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::ValidationError("Please upload a file".to_string()))?;

    data.info("Data", &format!("Uploading {} ({} bytes)", file_name, body.len()));

    let query = query.into_inner();
    let source = data
        .app_state
        .data_source_use_case
        .upload(UploadRequest {
            user_id,
            file_name,
            bytes: body.to_vec(),
            name: query.name,
            description: query.description,
        })
        .await
        .map_err(|e| data.fail("Data", "Upload failed", e))?;

    Ok(respond(StatusCode::CREATED, source))
}

#[get("/sources")]
async fn list_sources(
    data: web::Data<HttpState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let sources = data
        .app_state
        .data_source_use_case
        .list(&user_id)
        .await
        .map_err(|e| data.fail("Data", "Listing sources failed", e))?;

    Ok(respond_list(sources))
}

#[derive(Serialize)]
struct PreviewResponse {
    success: bool,
    data: Vec<FieldMap>,
    columns: Vec<ColumnDescriptor>,
}

#[get("/preview/{source_id}")]
async fn preview_data(
    data: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let preview = data
        .app_state
        .data_source_use_case
        .preview(&user_id, &path)
        .await
        .map_err(|e| data.fail("Data", "Preview failed", e))?;

    Ok(HttpResponse::Ok().json(PreviewResponse {
        success: true,
        data: preview.data,
        columns: preview.columns,
    }))
}

#[post("/analyze")]
async fn analyze_data(
    data: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let body = body.into_inner();
    let analysis = data
        .app_state
        .data_source_use_case
        .analyze(&user_id, &body.source_id, body.analysis_type)
        .await
        .map_err(|e| data.fail("Data", "Analysis failed", e))?;

    Ok(respond(StatusCode::OK, analysis))
}

/// Infer schema and preview for a csv body without storing anything
#[post("/infer")]
async fn infer_schema(
    data: web::Data<HttpState>,
    query: web::Query<InferQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let names: Vec<String> = query
        .columns
        .as_deref()
        .map(|raw| raw.split(',').map(|name| name.trim().to_string()).collect())
        .unwrap_or_default();

    let result = data
        .app_state
        .schema_inference_use_case
        .infer_bytes(body.to_vec(), &names)
        .await
        .map_err(|e| data.fail("Data", "Schema inference failed", e))?;

    Ok(respond(
        StatusCode::OK,
        InferResponse {
            columns: result.columns,
            preview: result.preview,
        },
    ))
}
