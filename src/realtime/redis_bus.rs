//! Broker realtime sobre Redis pub/sub

use anyhow::Result;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{ChannelMessage, Publisher, Subscriber};

/// Bus de publicación/suscripción respaldado por Redis
#[derive(Clone)]
pub struct RedisBus {
    client: redis::Client,
    publisher: ConnectionManager,
}

impl RedisBus {
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("🔗 Conectando bus realtime a Redis: {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let publisher = ConnectionManager::new(client.clone()).await?;
        Ok(Self { client, publisher })
    }
}

#[async_trait::async_trait]
impl Publisher for RedisBus {
    async fn publish(&self, channel: &str, event: &str, data: serde_json::Value) -> Result<()> {
        let message = ChannelMessage {
            channel: channel.to_string(),
            event: event.to_string(),
            data,
        };
        let payload = serde_json::to_string(&message)?;

        let mut conn = self.publisher.clone();
        let _: () = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Subscriber for RedisBus {
    async fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<ChannelMessage>> {
        let conn = self.client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.subscribe(channel).await?;

        let (tx, rx) = mpsc::channel(256);
        let channel_name = channel.to_string();

        tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("⚠️ Payload ilegible en canal {}: {}", channel_name, e);
                        continue;
                    }
                };
                let message: ChannelMessage = match serde_json::from_str(&payload) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("⚠️ Mensaje inválido en canal {}: {}", channel_name, e);
                        continue;
                    }
                };
                // El receptor dejó de leer: terminar el forwarding
                if tx.send(message).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
