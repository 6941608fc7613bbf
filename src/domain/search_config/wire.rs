//! Wire types for `search_configs` and `keyword_groups`.

use super::{KeywordGroup, SearchConfig};
use crate::shared::{RowId, Website};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SEARCH_CONFIGS_TABLE: &str = "search_configs";
pub const KEYWORD_GROUPS_TABLE: &str = "keyword_groups";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfigRow {
    pub id: RowId,
    pub search_text: String,
    pub category: String,
    pub website: Website,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl SearchConfigRow {
    pub fn with_keywords(self, keyword_groups: Vec<KeywordGroup>) -> SearchConfig {
        SearchConfig {
            id: self.id,
            search_text: self.search_text,
            category: self.category,
            website: self.website,
            is_active: self.is_active,
            created_at: self.created_at,
            keyword_groups,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfigInsert {
    pub search_text: String,
    pub category: String,
    pub website: Website,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroupRow {
    pub search_config_id: RowId,
    pub keywords: KeywordGroup,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActivePatch {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_row_with_keywords() {
        let json = r#"{"id": 7, "search_text": "ssd", "category": "ssd", "website": "pichau", "created_at": "2025-02-01T12:00:00Z"}"#;
        let row: SearchConfigRow = serde_json::from_str(json).unwrap();
        assert!(row.is_active);
        let config = row.with_keywords(vec![KeywordGroup::from("nvme")]);
        assert_eq!(config.website, Website::Pichau);
        assert_eq!(config.id.as_str(), "7");
        assert_eq!(config.keyword_groups.len(), 1);
    }

    #[test]
    fn test_keyword_group_row_shape() {
        let row = KeywordGroupRow {
            search_config_id: RowId::from("7"),
            keywords: KeywordGroup::from("nvme, 1tb"),
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["search_config_id"], "7");
        assert_eq!(v["keywords"], "nvme, 1tb");
    }
}
