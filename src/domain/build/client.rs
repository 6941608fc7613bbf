//! Builds sub-client.

use super::wire::BUILDS_TABLE;
use super::{Build, BuildQuote, NewBuild};
use crate::client::PcScraperClient;
use crate::error::{HttpError, SdkError};
use crate::http::Query;
use crate::shared::RowId;

/// Sub-client for saved builds.
pub struct Builds<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> Builds<'a> {
    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Build>, SdkError> {
        let query = Query::new().select("*").order("created_at", false);
        Ok(self.client.http.select(BUILDS_TABLE, &query).await?)
    }

    pub async fn create(&self, build: NewBuild) -> Result<Build, SdkError> {
        build.validate()?;
        let created: Vec<Build> = self.client.http.insert(BUILDS_TABLE, &[&build]).await?;
        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| SdkError::Other(format!("Insert returned no row for build '{}'", build.name)))?;
        tracing::info!(build_id = %row.id, name = %row.name, "build created");
        Ok(row)
    }

    pub async fn delete(&self, id: &RowId) -> Result<(), SdkError> {
        let deleted: Vec<Build> = self
            .client
            .http
            .delete(BUILDS_TABLE, &Query::new().eq("id", id))
            .await?;
        if deleted.is_empty() {
            return Err(SdkError::Http(HttpError::NotFound(format!(
                "Build not found: {}",
                id
            ))));
        }
        Ok(())
    }

    /// Price a build against the current visible listings.
    pub async fn quote(&self, build: &Build) -> Result<BuildQuote, SdkError> {
        let products = self.client.products().list(false).await?;
        Ok(build.quote(&products))
    }
}
