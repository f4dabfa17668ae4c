// src/api/resources.rs

use serde_json::Value;
use tokio::task::JoinSet;

use crate::api::client::ApiClient;
use crate::error::AppError;
use crate::models::resource::{BulkDeleteOutcome, Resource};

impl ApiClient {
    pub async fn list_resource(&self, resource: Resource) -> Result<Value, AppError> {
        self.get_json(resource.path(), &[]).await
    }

    pub async fn get_resource(&self, resource: Resource, id: i64) -> Result<Value, AppError> {
        self.get_json(&resource.item_path(id), &[]).await
    }

    pub async fn create_resource(&self, resource: Resource, body: &Value) -> Result<Value, AppError> {
        self.post_json(resource.path(), body).await
    }

    pub async fn update_resource(
        &self,
        resource: Resource,
        id: i64,
        body: &Value,
    ) -> Result<Value, AppError> {
        self.put_json(&resource.item_path(id), body).await
    }

    pub async fn delete_resource(&self, resource: Resource, id: i64) -> Result<(), AppError> {
        self.delete(&resource.item_path(id)).await
    }

    /// Deletes every id concurrently and waits for all of them to settle.
    ///
    /// Individual failures are only counted. A 401 on any request still wins,
    /// since the session is gone either way.
    pub async fn bulk_delete(
        &self,
        resource: Resource,
        ids: &[i64],
    ) -> Result<BulkDeleteOutcome, AppError> {
        let mut join_set: JoinSet<Result<(), AppError>> = JoinSet::new();
        for &id in ids {
            let client = self.clone();
            join_set.spawn(async move { client.delete_resource(resource, id).await });
        }

        let mut outcome = BulkDeleteOutcome {
            deleted: 0,
            failed: 0,
        };
        let mut session_expired = false;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(())) => outcome.deleted += 1,
                Ok(Err(AppError::SessionExpired)) => {
                    session_expired = true;
                    outcome.failed += 1;
                }
                Ok(Err(e)) => {
                    tracing::warn!("Failed to delete from {}: {}", resource.path(), e);
                    outcome.failed += 1;
                }
                Err(e) => {
                    tracing::error!("Delete task for {} panicked: {:?}", resource.path(), e);
                    outcome.failed += 1;
                }
            }
        }

        if session_expired {
            return Err(AppError::SessionExpired);
        }
        tracing::info!(
            "Bulk delete on {}: {} deleted, {} failed",
            resource.path(),
            outcome.deleted,
            outcome.failed
        );
        Ok(outcome)
    }
}
