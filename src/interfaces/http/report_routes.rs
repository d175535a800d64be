use actix_web::http::StatusCode;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Scope};
use serde::Deserialize;
use serde_json::Value;

use super::{caller_id, respond, respond_list, HttpState};
use crate::domain::error::AppError;
use crate::domain::report::{ReportInput, ReportPatch};

pub(super) fn scope() -> Scope {
    // /narrative must be registered ahead of /{report_id}
    web::scope("/reports")
        .service(generate_narrative)
        .service(list_reports)
        .service(create_report)
        .service(get_report)
        .service(update_report)
        .service(delete_report)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NarrativeRequest {
    report_id: String,
    #[serde(default)]
    visualization_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest {
    #[serde(default)]
    visualization_data: Option<Value>,
}

#[get("")]
async fn list_reports(
    data: web::Data<HttpState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let reports = data
        .app_state
        .report_use_case
        .list(&user_id)
        .await
        .map_err(|e| data.fail("Reports", "Listing reports failed", e))?;

    Ok(respond_list(reports))
}

#[post("")]
async fn create_report(
    data: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Json<ReportInput>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let report = data
        .app_state
        .report_use_case
        .create(&user_id, body.into_inner())
        .await
        .map_err(|e| data.fail("Reports", "Creating report failed", e))?;

    data.info("Reports", &format!("Report '{}' created", report.title));
    Ok(respond(StatusCode::CREATED, report))
}

#[get("/{report_id}")]
async fn get_report(
    data: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let report = data
        .app_state
        .report_use_case
        .get(&user_id, &path)
        .await
        .map_err(|e| data.fail("Reports", "Fetching report failed", e))?;

    Ok(respond(StatusCode::OK, report))
}

#[put("/{report_id}")]
async fn update_report(
    data: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ReportPatch>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let report = data
        .app_state
        .report_use_case
        .update(&user_id, &path, body.into_inner())
        .await
        .map_err(|e| data.fail("Reports", "Updating report failed", e))?;

    Ok(respond(StatusCode::OK, report))
}

#[delete("/{report_id}")]
async fn delete_report(
    data: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    data.app_state
        .report_use_case
        .delete(&user_id, &path)
        .await
        .map_err(|e| data.fail("Reports", "Deleting report failed", e))?;

    Ok(respond(StatusCode::OK, serde_json::json!({})))
}

/// Generate a narrative and append it to the caller's report
#[post("/narrative")]
async fn generate_narrative(
    data: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Json<NarrativeRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = caller_id(&req)?;
    let body = body.into_inner();
    let narrative = data
        .app_state
        .report_use_case
        .generate_narrative(&user_id, &body.report_id, body.visualization_data.as_ref())
        .await
        .map_err(|e| data.fail("Reports", "Narrative generation failed", e))?;

    Ok(respond(StatusCode::OK, narrative))
}

/// Render a narrative for a chart payload without touching any report
#[post("/narratives")]
pub(super) async fn render_narrative(
    data: web::Data<HttpState>,
    body: web::Json<RenderRequest>,
) -> HttpResponse {
    let narrative = data
        .app_state
        .narrative_generator
        .from_visualization(body.visualization_data.as_ref());

    respond(StatusCode::OK, narrative)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app_config, http_state};
    use super::super::USER_HEADER;
    use super::*;
    use crate::application::use_cases::narrative::FALLBACK_CONTENT;
    use actix_web::test as actix_test;
    use actix_web::App;
    use serde_json::json;

    fn create_request(user: &str, body: Value) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/reports")
            .insert_header((USER_HEADER, user))
            .set_json(body)
    }

    #[actix_web::test]
    async fn test_report_lifecycle() {
        let state = http_state().await;
        let app = actix_test::init_service(App::new().app_data(state).configure(app_config)).await;

        let resp = actix_test::call_service(
            &app,
            create_request("u1", json!({"title": "Quarterly", "visualizations": [{"type": "bar"}]}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["visualizations"][0]["type"], "bar");

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/reports/{}", id))
            .insert_header((USER_HEADER, "u1"))
            .set_json(json!({"description": "Q3 numbers"}))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["description"], "Q3 numbers");
        assert_eq!(body["data"]["title"], "Quarterly");

        let req = actix_test::TestRequest::get()
            .uri("/api/reports")
            .insert_header((USER_HEADER, "u1"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/reports/{}", id))
            .insert_header((USER_HEADER, "u1"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/reports/{}", id))
            .insert_header((USER_HEADER, "u1"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_invalid_bodies_are_bad_requests() {
        let state = http_state().await;
        let app = actix_test::init_service(App::new().app_data(state).configure(app_config)).await;

        let resp = actix_test::call_service(&app, create_request("u1", json!({"title": ""})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = actix_test::call_service(
            &app,
            create_request("u1", json!({"title": "x", "visualizations": [{"type": "radar"}]})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_narrative_is_appended_to_report() {
        let state = http_state().await;
        let app = actix_test::init_service(App::new().app_data(state).configure(app_config)).await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            create_request("u1", json!({"title": "Trends"})).to_request(),
        )
        .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = actix_test::TestRequest::post()
            .uri("/api/reports/narrative")
            .insert_header((USER_HEADER, "u1"))
            .set_json(json!({
                "reportId": id,
                "visualizationData": {"datasets": [{"data": [10, 20, 5]}]}
            }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Data Analysis Insights");
        assert_eq!(body["data"]["insights"][0], "Average value across period: 11.67");

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/reports/{}", id))
            .insert_header((USER_HEADER, "u1"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["narratives"].as_array().unwrap().len(), 1);

        let req = actix_test::TestRequest::post()
            .uri("/api/reports/narrative")
            .insert_header((USER_HEADER, "u2"))
            .set_json(json!({"reportId": id}))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_render_narrative_without_report() {
        let state = http_state().await;
        let app = actix_test::init_service(App::new().app_data(state).configure(app_config)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/narratives")
            .set_json(json!({"visualizationData": {"datasets": [{"data": ["a"]}]}}))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["content"], FALLBACK_CONTENT);
    }
}
