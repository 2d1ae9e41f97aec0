mod handlers;
pub mod image_hosts;
pub mod middleware;
pub mod pages;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::{CompletionService, ImageGenerationService};
use crate::config::Config;
use crate::db::SessionStore;
use crate::drawing::DrawingPipeline;
use crate::reappraisal::ReappraisalGenerator;
use crate::session::SessionMachine;

use self::image_hosts::ImageHosts;
use self::middleware::{session_middleware, SessionSigner};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionMachine>,
    pub pipeline: Arc<DrawingPipeline>,
    /// Client for the image proxy.
    pub http: reqwest::Client,
    pub image_hosts: ImageHosts,
    pub signer: SessionSigner,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn SessionStore>,
        completion: Arc<dyn CompletionService>,
        images: Arc<dyn ImageGenerationService>,
    ) -> reqwest::Result<Self> {
        let pipeline = DrawingPipeline::new(
            images,
            ReappraisalGenerator::new(completion.clone()),
            config.provider.image_size.clone(),
        );

        Ok(Self {
            sessions: Arc::new(SessionMachine::new(store, completion)),
            pipeline: Arc::new(pipeline),
            http: config.provider.http_client()?,
            image_hosts: ImageHosts::new(),
            signer: SessionSigner::new(&config.session_secret),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let signer = state.signer.clone();

    Router::new()
        .route("/", get(handlers::landing))
        .route("/reflection", get(handlers::reflection))
        .route("/proxy", get(handlers::proxy_image))
        .route("/health", get(handlers::health))
        .route("/api/question", post(handlers::submit_response))
        .route("/api/session", get(handlers::get_session))
        .route("/api/process-drawing", post(handlers::process_drawing))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn_with_state(signer, session_middleware)),
        )
        .with_state(state)
}
