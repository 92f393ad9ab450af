use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod certificate;
pub mod config;
pub mod generators;
pub mod state;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::certificate::handlers::generate_certificates,
        crate::certificate::handlers::serve_certificate,
        crate::certificate::handlers::health,
    ),
    components(
        schemas(
            certificate::models::UploadCertificatesRequest,
            certificate::models::BatchReport,
            certificate::models::GeneratedCertificate,
            certificate::batch::BatchSummary,
            certificate::record::Record,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Certificate Service", description = "Batch certificate generation from CSV rosters.")
    )
)]
pub struct ApiDoc;

/// Register the API and file-serving routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/certificates")
                    .route(web::post().to(certificate::handlers::generate_certificates)),
            )
            .service(web::resource("/health").route(web::get().to(certificate::handlers::health))),
    )
    .service(
        web::resource("/generated/{filename}")
            .route(web::get().to(certificate::handlers::serve_certificate)),
    );
}

fn build_cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid server configuration")?;
    let bind = (config.bind_addr.clone(), config.port);

    let app_state = AppState::new(config).context("failed to initialise certificate renderer")?;
    app_state
        .prepare_dirs()
        .context("failed to create upload or output directory")?;
    log::info!(
        "Writing certificates to {} using {}",
        app_state.config.generated_dir.display(),
        app_state.config.render_config_path.display()
    );
    let app_state = web::Data::new(app_state);

    let prometheus = PrometheusMetricsBuilder::new("certificate_generator")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = build_cors(&app_state.config.cors_allowed_origins);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(bind)
    .context("failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server terminated unexpectedly")
}
