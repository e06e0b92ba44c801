use actix_web::{get, post, web, HttpResponse, Responder};
use std::time::Instant;

use crate::error::ServiceError;
use crate::features;
use crate::inference::ModelContext;
use crate::models::{
    ErrorResponse, HealthResponse, PredictionRequest, PredictionResponse, StatusResponse,
};
use crate::results;

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(StatusResponse {
        status: "ok",
        message: "Visa Approval Prediction API is running.",
    })
}

#[get("/health")]
pub async fn health(ctx: web::Data<ModelContext>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        model_loaded: ctx.is_loaded(),
    })
}

/// Largest accepted `/predict` body, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        BodyLimit(1024 * 1024)
    }
}

#[post("/predict")]
pub async fn predict(
    ctx: web::Data<ModelContext>,
    limit: Option<web::Data<BodyLimit>>,
    payload: web::Payload,
) -> Result<HttpResponse, ServiceError> {
    let start_time = Instant::now();
    let classifier = ctx.classifier().ok_or(ServiceError::ModelUnavailable)?;

    let BodyLimit(limit) = limit.map(|l| *l.get_ref()).unwrap_or_default();
    let body = payload
        .to_bytes_limited(limit)
        .await
        .map_err(|_| {
            ServiceError::BadRequest(format!("Request body exceeds {} bytes", limit))
        })?
        .map_err(|e| ServiceError::BadRequest(format!("Failed to read request body: {}", e)))?;

    let request = PredictionRequest::from_slice(&body).map_err(|e| {
        log::warn!("Rejected prediction request: {}", e);
        e
    })?;
    let input = features::build_model_input(&request, ctx.columns())?;

    let raw = web::block(move || classifier.predict(&input))
        .await
        .map_err(|e| ServiceError::BadRequest(format!("Inference task failed: {}", e)))?
        .map_err(|e| {
            log::error!("Prediction error: {:#}", e);
            ServiceError::BadRequest(format!("{:#}", e))
        })?;

    let prediction = results::label_for(raw);
    log::info!(
        "Prediction: {} (raw={}) in {}ms",
        prediction,
        raw,
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(PredictionResponse { prediction, raw }))
}

#[get("/model/results")]
pub async fn model_results(ctx: web::Data<ModelContext>) -> Result<HttpResponse, ServiceError> {
    let record = results::load_results(&ctx.paths().results).map_err(|e| {
        log::error!("Model results unavailable: {}", e);
        ServiceError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(record))
}

#[get("/model/info")]
pub async fn model_info(ctx: web::Data<ModelContext>) -> impl Responder {
    HttpResponse::Ok().json(ctx.get_model_info())
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "Not found".to_string(),
    })
}

/// Register every endpoint. Shared by the binary and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(root)
        .service(health)
        .service(predict)
        .service(model_results)
        .service(model_info)
        .default_service(web::route().to(not_found));
}
