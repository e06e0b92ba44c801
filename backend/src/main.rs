use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{info, warn};

use visa_approval_api::config::ServiceConfig;
use visa_approval_api::inference::ModelContext;
use visa_approval_api::routes::{self, BodyLimit};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting Visa Approval Prediction API");

    let config = ServiceConfig::from_env();
    let context = ModelContext::load(config.artifact_paths());
    if !context.is_loaded() {
        warn!("Running without a model: /predict will answer 500 until restarted");
    }
    let context = web::Data::new(context);

    let bind_address = config.bind_address();
    let max_body_bytes = config.max_body_bytes;

    info!("Server listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!("Model directory: {}", config.model_dir.display());
    info!("Endpoints:");
    info!("   GET  /               - Status");
    info!("   GET  /health         - Health check");
    info!("   POST /predict        - Case status prediction");
    info!("   GET  /model/results  - Evaluation results");
    info!("   GET  /model/info     - Model artifacts and columns");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(context.clone())
            .app_data(web::Data::new(BodyLimit(max_body_bytes)))
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
