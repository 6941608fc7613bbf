//! Search configurations sub-client.

use super::wire::{
    ActivePatch, KeywordGroupRow, SearchConfigRow, KEYWORD_GROUPS_TABLE, SEARCH_CONFIGS_TABLE,
};
use super::{KeywordGroup, NewSearchConfig, SearchConfig};
use crate::client::PcScraperClient;
use crate::error::{HttpError, SdkError};
use crate::http::Query;
use crate::shared::RowId;

/// Sub-client for scraper search configurations.
pub struct SearchConfigs<'a> {
    pub(crate) client: &'a PcScraperClient,
}

impl<'a> SearchConfigs<'a> {
    /// Newest first, each with its keyword groups.
    pub async fn list(&self) -> Result<Vec<SearchConfig>, SdkError> {
        let query = Query::new().select("*").order("created_at", false);
        let rows: Vec<SearchConfigRow> = self
            .client
            .http
            .select(SEARCH_CONFIGS_TABLE, &query)
            .await?;

        let mut configs = Vec::with_capacity(rows.len());
        for row in rows {
            let groups = self.keyword_groups(&row.id).await?;
            configs.push(row.with_keywords(groups));
        }
        Ok(configs)
    }

    /// Active configurations that have keywords to match.
    pub async fn runnable(&self) -> Result<Vec<SearchConfig>, SdkError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(SearchConfig::is_runnable)
            .collect())
    }

    /// Inserts one configuration per website, each with the non-blank
    /// keyword groups.
    pub async fn create(&self, new: NewSearchConfig) -> Result<Vec<SearchConfig>, SdkError> {
        let inserts = new.expand()?;
        let groups: Vec<KeywordGroup> = new.valid_keyword_groups().into_iter().cloned().collect();

        let mut created = Vec::with_capacity(inserts.len());
        for insert in inserts {
            let rows: Vec<SearchConfigRow> = self
                .client
                .http
                .insert(SEARCH_CONFIGS_TABLE, &[&insert])
                .await?;
            let row = rows.into_iter().next().ok_or_else(|| {
                SdkError::Other(format!(
                    "Insert returned no row for search config on {}",
                    insert.website
                ))
            })?;

            let keyword_rows: Vec<KeywordGroupRow> = groups
                .iter()
                .map(|g| KeywordGroupRow {
                    search_config_id: row.id.clone(),
                    keywords: g.clone(),
                })
                .collect();
            let _: Vec<serde_json::Value> = self
                .client
                .http
                .insert(KEYWORD_GROUPS_TABLE, &keyword_rows)
                .await?;

            tracing::info!(
                config_id = %row.id,
                website = %row.website,
                groups = keyword_rows.len(),
                "search config created"
            );
            created.push(row.with_keywords(groups.clone()));
        }
        Ok(created)
    }

    pub async fn set_active(&self, id: &RowId, active: bool) -> Result<(), SdkError> {
        let updated: Vec<serde_json::Value> = self
            .client
            .http
            .update(
                SEARCH_CONFIGS_TABLE,
                &Query::new().eq("id", id),
                &ActivePatch { is_active: active },
            )
            .await?;
        if updated.is_empty() {
            return Err(SdkError::Http(HttpError::NotFound(format!(
                "Search config not found: {}",
                id
            ))));
        }
        Ok(())
    }

    /// Returns the number of configurations updated.
    pub async fn set_all_active(&self, active: bool) -> Result<usize, SdkError> {
        let rows: Vec<SearchConfigRow> = self
            .client
            .http
            .select(SEARCH_CONFIGS_TABLE, &Query::new().select("*"))
            .await?;
        let mut updated = 0;
        for row in rows.iter().filter(|r| r.is_active != active) {
            self.set_active(&row.id, active).await?;
            updated += 1;
        }
        tracing::info!(active, updated, "search configs toggled");
        Ok(updated)
    }

    /// Keyword groups cascade with the configuration.
    pub async fn delete(&self, id: &RowId) -> Result<(), SdkError> {
        let deleted: Vec<serde_json::Value> = self
            .client
            .http
            .delete(SEARCH_CONFIGS_TABLE, &Query::new().eq("id", id))
            .await?;
        if deleted.is_empty() {
            return Err(SdkError::Http(HttpError::NotFound(format!(
                "Search config not found: {}",
                id
            ))));
        }
        Ok(())
    }

    async fn keyword_groups(&self, config_id: &RowId) -> Result<Vec<KeywordGroup>, SdkError> {
        let query = Query::new()
            .select("search_config_id,keywords")
            .eq("search_config_id", config_id);
        let rows: Vec<KeywordGroupRow> = self
            .client
            .http
            .select(KEYWORD_GROUPS_TABLE, &query)
            .await?;
        Ok(rows.into_iter().map(|r| r.keywords).collect())
    }
}
