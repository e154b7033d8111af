use crate::{Delivery, Error, Result};
use async_trait::async_trait;
use gazetteer_core::UploadTarget;
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

/// Durable storage that accepts whole objects under a key
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Google Cloud Storage, authenticated with Application Default Credentials
#[derive(Debug, Default)]
pub struct GcsStore;

impl GcsStore {
    pub fn new() -> Self {
        Self
    }

    async fn client() -> Result<Client> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Auth(format!("authenticating to GCS: {}", e)))?;
        Ok(Client::new(config))
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let client = Self::client().await?;

        let mut media = Media::new(key.to_string());
        media.content_type = "text/csv".into();
        media.content_length = Some(body.len() as u64);

        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        client
            .upload_object(&request, body, &UploadType::Simple(media))
            .await
            .map_err(|e| Error::Storage(format!("uploading gs://{}/{}: {}", bucket, key, e)))?;

        Ok(())
    }
}

/// Read the target's local file and store it under its key.
///
/// Never fails past this boundary: any error is logged and reported as [`Delivery::Failed`].
pub async fn upload_file(store: &dyn ObjectStore, target: &UploadTarget) -> Delivery {
    tracing::info!(
        "Uploading {} to {}/{}",
        target.local_path.display(),
        target.bucket,
        target.key
    );

    let result = async {
        let body = tokio::fs::read(&target.local_path).await?;
        let size = body.len();
        store.put_object(&target.bucket, &target.key, body).await?;
        Ok::<usize, Error>(size)
    }
    .await;

    match result {
        Ok(size) => {
            tracing::info!("Uploaded {} bytes to {}/{}", size, target.bucket, target.key);
            Delivery::Delivered
        }
        Err(e) => {
            tracing::error!("Error in uploading file to storage: {}", e);
            Delivery::Failed(e.to_string())
        }
    }
}
