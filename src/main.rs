mod cache;
mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod realtime;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use cache::redis_client::RedisClient;
use cache::CacheOperations;
use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::cors::cors_middleware;
use realtime::redis_bus::RedisBus;
use realtime::{Publisher, Subscriber};
use services::push_client::{HttpPushClient, PushClient};
use services::rollover_service::RolloverService;
use services::routing_provider::{GraphHopperClient, RoutingProvider};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚌 Shuttle Dispatch - transporte escolar");
    info!("==========================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    // Inicializar Redis: cache de rutas y bus realtime
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    let redis_config = cache::CacheConfig {
        redis_url: redis_url.clone(),
        default_ttl: 3600,
        max_connections: 10,
    };

    let redis_client = match RedisClient::new(redis_config).await {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Error conectando a Redis: {}", e);
            return Err(anyhow::anyhow!("Error de Redis: {}", e));
        }
    };
    let cache: Arc<dyn CacheOperations> = Arc::new(redis_client);

    let bus = Arc::new(RedisBus::new(&redis_url).await?);
    let publisher: Arc<dyn Publisher> = bus.clone();
    let subscriber: Arc<dyn Subscriber> = bus;

    // Clientes de proveedores externos
    let push: Arc<dyn PushClient> = Arc::new(HttpPushClient::new(config.push_timeout_secs));
    let routing: Arc<dyn RoutingProvider> = Arc::new(GraphHopperClient::new(
        config.routing_url.clone(),
        config.routing_api_key.clone(),
        config.routing_timeout_secs,
    ));

    let app_state = AppState::new(
        pool.clone(),
        config.clone(),
        cache,
        publisher,
        subscriber,
        push,
        routing,
    );

    // Tarea diaria: reset de estados con overrides de los tutores
    RolloverService::spawn_daily(pool);

    // CORS: permisivo en desarrollo, orígenes explícitos en producción
    let cors = if config.is_production() {
        middleware::cors::cors_middleware_with_origins(config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let app = Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/zone", routes::zone_routes::create_zone_router())
        .nest("/api/trip", routes::trip_routes::create_trip_router())
        .nest("/api/subscription", routes::subscription_routes::create_subscription_router())
        .nest("/api/notification", routes::notification_routes::create_notification_router())
        .nest("/api/driver", routes::driver_routes::create_driver_router())
        .nest("/api/navigation", routes::navigation_routes::create_navigation_router())
        .nest("/api/tracking", routes::tracking_routes::create_tracking_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🗺️ Zonas:");
    info!("   GET  /api/zone - Listar zonas");
    info!("   POST /api/zone - Crear zona");
    info!("   GET  /api/zone/resolve?lat=&lng= - Resolver zona por coordenadas");
    info!("   PUT  /api/zone/:id - Actualizar geometría");
    info!("   DELETE /api/zone/:id - Eliminar zona");
    info!("🧒 Viajes:");
    info!("   PUT  /api/trip/:student_id/status - Aplicar transición de estado");
    info!("   GET  /api/trip/history/driver/:id - Historial por conductor");
    info!("   GET  /api/trip/history/parent/:id - Historial por tutor");
    info!("🔔 Notificaciones:");
    info!("   POST /api/subscription - Alta de suscripción push");
    info!("   POST /api/notification/broadcast - Broadcast a conductores");
    info!("   POST /api/notification/emergency - Emergencia a tutores en tránsito");
    info!("   POST /api/notification/request-change - Petición de sustituto");
    info!("🚌 Conductores y tracking:");
    info!("   POST /api/driver/location - Ingesta de posición");
    info!("   POST /api/driver/handover - Traspaso de alumnos");
    info!("   GET  /api/driver/for-parent/:id - Conductores relevantes de un tutor");
    info!("   GET  /api/tracking/stream - Stream SSE de posiciones");
    info!("   GET  /api/navigation/route/:driver_id?trip_type= - Ruta vigente");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                anyhow::anyhow!(e)
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Shuttle Dispatch funcionando correctamente",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
