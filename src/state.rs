//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El broker realtime, el cache y los
//! clientes externos entran inyectados detrás de sus traits; los tests
//! construyen el mismo estado con fakes en memoria.

use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::CacheOperations;
use crate::config::environment::EnvironmentConfig;
use crate::realtime::{Publisher, Subscriber};
use crate::services::location_service::LocationStreamService;
use crate::services::push_client::PushClient;
use crate::services::routing_provider::RoutingProvider;
use crate::services::{NotificationFanout, RouteEngine, RouteService, TripStateMachine};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub fanout: Arc<NotificationFanout>,
    pub trips: Arc<TripStateMachine>,
    pub routes: Arc<RouteService>,
    pub locations: Arc<LocationStreamService>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        cache: Arc<dyn CacheOperations>,
        publisher: Arc<dyn Publisher>,
        subscriber: Arc<dyn Subscriber>,
        push: Arc<dyn PushClient>,
        routing: Arc<dyn RoutingProvider>,
    ) -> Self {
        let fanout = Arc::new(NotificationFanout::new(pool.clone(), push));
        let engine = Arc::new(RouteEngine::new(routing, cache));
        let routes = Arc::new(RouteService::new(pool.clone(), engine));
        let locations = Arc::new(LocationStreamService::new(
            publisher.clone(),
            subscriber.clone(),
            routes.clone(),
        ));
        let trips = Arc::new(TripStateMachine::new(
            pool.clone(),
            fanout.clone(),
            publisher.clone(),
        ));

        Self {
            pool,
            config,
            fanout,
            trips,
            routes,
            locations,
        }
    }
}
