use crate::{Delivery, Error, Result};
use async_trait::async_trait;
use google_cloud_googleapis::pubsub::v1::PubsubMessage;
use google_cloud_pubsub::client::{Client, ClientConfig};

/// Publishes free text to a topic
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    async fn publish(&self, topic: &str, text: &str) -> Result<()>;
}

/// Google Cloud Pub/Sub, authenticated with Application Default Credentials.
///
/// `topic` may be a bare topic id or a full `projects/<p>/topics/<t>` name.
#[derive(Debug, Default)]
pub struct PubSubPublisher;

impl PubSubPublisher {
    pub fn new() -> Self {
        Self
    }

    async fn client() -> Result<Client> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Auth(format!("authenticating to Pub/Sub: {}", e)))?;
        Client::new(config)
            .await
            .map_err(|e| Error::PubSub(format!("creating client: {}", e)))
    }
}

#[async_trait]
impl TopicPublisher for PubSubPublisher {
    async fn publish(&self, topic: &str, text: &str) -> Result<()> {
        let client = Self::client().await?;
        let mut publisher = client.topic(topic).new_publisher(None);

        let message = PubsubMessage {
            data: text.as_bytes().to_vec(),
            ..Default::default()
        };

        let published = publisher.publish(message).await.get().await;
        publisher.shutdown().await;

        let message_id = published
            .map_err(|status| Error::PubSub(format!("publishing to {}: {}", topic, status)))?;
        tracing::debug!("Published message {} to {}", message_id, topic);

        Ok(())
    }
}

/// Publish `text` to `topic` once.
///
/// Never fails past this boundary: any error is logged and reported as [`Delivery::Failed`],
/// so a broken notifier cannot mask the failure being reported.
pub async fn notify(publisher: &dyn TopicPublisher, topic: &str, text: &str) -> Delivery {
    tracing::debug!("Publishing notification to {}", topic);

    match publisher.publish(topic, text).await {
        Ok(()) => {
            tracing::info!("Notification published to {}", topic);
            Delivery::Delivered
        }
        Err(e) => {
            tracing::error!("Failed to publish message to topic {}: {}", topic, e);
            Delivery::Failed(e.to_string())
        }
    }
}
