//! Broker realtime en memoria
//!
//! Un `tokio::sync::broadcast` por canal. Lo usan los tests y sirve de
//! despliegue de instancia única sin Redis.

use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, RwLock};

use super::{ChannelMessage, Publisher, Subscriber};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
pub struct InMemoryBus {
    channels: RwLock<HashMap<String, broadcast::Sender<ChannelMessage>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    async fn sender_for(&self, channel: &str) -> broadcast::Sender<ChannelMessage> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait::async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, channel: &str, event: &str, data: serde_json::Value) -> Result<()> {
        let message = ChannelMessage {
            channel: channel.to_string(),
            event: event.to_string(),
            data,
        };
        // Sin suscriptores no es un error: el publish es fire-and-forget
        let _ = self.sender_for(channel).await.send(message);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Subscriber for InMemoryBus {
    async fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<ChannelMessage>> {
        let mut broadcast_rx = self.sender_for(channel).await.subscribe();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    // Suscriptor lento: se pierden mensajes (at-most-once)
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::TRACKING_CHANNEL;
    use serde_json::json;

    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let bus = InMemoryBus::new();
        let mut rx1 = bus.subscribe(TRACKING_CHANNEL).await.unwrap();
        let mut rx2 = bus.subscribe(TRACKING_CHANNEL).await.unwrap();

        bus.publish(TRACKING_CHANNEL, "location-update", json!({"lat": 1.0}))
            .await
            .unwrap();

        let m1 = rx1.recv().await.unwrap();
        let m2 = rx2.recv().await.unwrap();
        assert_eq!(m1.event, "location-update");
        assert_eq!(m2.data["lat"], 1.0);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fire_and_forget() {
        let bus = InMemoryBus::new();
        bus.publish("empty-channel", "noop", json!({}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let bus = InMemoryBus::new();
        let mut tracking = bus.subscribe(TRACKING_CHANNEL).await.unwrap();

        bus.publish("other-channel", "status-update", json!({}))
            .await
            .unwrap();
        bus.publish(TRACKING_CHANNEL, "location-update", json!({}))
            .await
            .unwrap();

        let only = tracking.recv().await.unwrap();
        assert_eq!(only.event, "location-update");
    }
}
