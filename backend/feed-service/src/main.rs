mod openapi;

use actix_web::{dev::Service, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa_swagger_ui::SwaggerUi;

use feed_service::config::Config;
use feed_service::db::{InterestRepository, PostRepository, UserRepository};
use feed_service::handlers::{
    get_all_tags, get_main_feed, get_user_posts, FeedHandlerState, PostsHandlerState,
};
use feed_service::{CacheConfig, FeedService, PgFeedStore, RelationCache};
use tracing::info;

async fn openapi_json(
    doc: web::Data<utoipa::openapi::OpenApi>,
) -> actix_web::Result<actix_web::HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(actix_web::HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Structured logging with JSON format
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database (standardized pool)
    let mut db_cfg = db_pool::DbConfig::from_env("feed-service").unwrap_or_default();
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }
    db_cfg.max_connections = std::cmp::max(db_cfg.max_connections, config.database.max_connections);
    db_cfg.log_config();

    let db_pool = match db_pool::create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = feed_service::db::MIGRATOR.run(&db_pool).await {
        tracing::error!("Database migration failed: {:#}", e);
        eprintln!("ERROR: Failed to run database migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations applied");

    // Relation cache is optional: a missing Redis degrades to store reads
    let cache = match RelationCache::new(&config.redis.url, CacheConfig::default()).await {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!("Relation cache disabled - failed to connect to Redis: {}", e);
            None
        }
    };

    let store = Arc::new(PgFeedStore::new(db_pool.clone()));
    let feed_state = web::Data::new(FeedHandlerState {
        service: FeedService::new(store, cache),
        default_limit: config.feed.default_limit,
        max_limit: config.feed.max_limit,
    });
    let posts_state = web::Data::new(PostsHandlerState {
        posts: PostRepository::new(db_pool.clone()),
        interests: InterestRepository::new(db_pool.clone()),
        users: UserRepository::new(db_pool.clone()),
    });

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        let openapi_doc = openapi::doc();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api/v1/openapi.json", openapi_doc.clone()),
            )
            .route("/api/v1/openapi.json", web::get().to(openapi_json))
            .app_data(feed_state.clone())
            .app_data(posts_state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            // Health endpoints for K8s probes
            .route("/api/v1/health", web::get().to(|| async { "OK" }))
            .route("/api/v1/health/live", web::get().to(|| async { "OK" }))
            .route("/api/v1/health/ready", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(feed_service::metrics::serve_metrics))
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                let path = req
                    .match_pattern()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| req.path().to_string());
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    match fut.await {
                        Ok(res) => {
                            feed_service::metrics::observe_http_request(
                                &method,
                                &path,
                                res.status().as_u16(),
                                start.elapsed(),
                            );
                            Ok(res)
                        }
                        Err(err) => {
                            feed_service::metrics::observe_http_request(
                                &method,
                                &path,
                                500,
                                start.elapsed(),
                            );
                            Err(err)
                        }
                    }
                }
            })
            .service(
                web::scope("/api/v1/posts")
                    .service(get_main_feed)
                    .service(get_user_posts)
                    .service(get_all_tags),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
