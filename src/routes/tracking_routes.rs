use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::Stream;
use std::convert::Infallible;

use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_tracking_router() -> Router<AppState> {
    Router::new().route("/stream", get(tracking_stream))
}

/// Stream SSE del canal compartido de tracking: cada suscriptor recibe
/// las posiciones de todos los conductores y filtra del lado del cliente.
/// Cerrar la conexión es la única forma de cancelar.
async fn tracking_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = state.locations.subscribe_tracking().await?;

    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        let message = receiver.recv().await?;
        let event = Event::default()
            .event(message.event.clone())
            .json_data(&message.data)
            .ok()?;
        Some((Ok::<Event, Infallible>(event), receiver))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
