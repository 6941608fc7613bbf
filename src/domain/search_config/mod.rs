//! Search configurations: what the scrapers look for on each storefront.
//!
//! A configuration pairs a search text with keyword groups. A scraped title
//! matches when every keyword of at least one group appears in it.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::shared::{RowId, Website};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── KeywordGroup ────────────────────────────────────────────────────────────

/// Comma-separated keywords stored as one `keyword_groups` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordGroup(String);

impl KeywordGroup {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.keywords().next().is_none()
    }

    /// Trimmed, non-empty keywords.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').map(str::trim).filter(|k| !k.is_empty())
    }

    /// Case-insensitive: every keyword must occur in `title`.
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        !self.is_blank() && self.keywords().all(|k| title.contains(&k.to_lowercase()))
    }
}

impl fmt::Display for KeywordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeywordGroup {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ─── SearchConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    pub id: RowId,
    pub search_text: String,
    pub category: String,
    pub website: Website,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub keyword_groups: Vec<KeywordGroup>,
}

impl SearchConfig {
    /// True when any keyword group matches the title.
    pub fn matches_title(&self, title: &str) -> bool {
        self.keyword_groups.iter().any(|g| g.matches(title))
    }

    /// Whether a scraper should run this configuration.
    pub fn is_runnable(&self) -> bool {
        self.is_active && self.keyword_groups.iter().any(|g| !g.is_blank())
    }
}

/// True only when there is at least one configuration and all are active.
pub fn all_active(configs: &[SearchConfig]) -> bool {
    !configs.is_empty() && configs.iter().all(|c| c.is_active)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfigFilter {
    pub category: Option<String>,
    pub website: Option<Website>,
}

impl SearchConfigFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn website(mut self, website: impl Into<Website>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn matches(&self, config: &SearchConfig) -> bool {
        self.category.as_ref().map_or(true, |c| &config.category == c)
            && self.website.as_ref().map_or(true, |w| &config.website == w)
    }

    pub fn apply<'c>(&self, configs: &'c [SearchConfig]) -> Vec<&'c SearchConfig> {
        configs.iter().filter(|c| self.matches(c)).collect()
    }
}

// ─── NewSearchConfig ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchConfigError {
    MissingSearchText,
    MissingCategory,
    NoKeywordGroups,
    NoWebsites,
}

impl fmt::Display for SearchConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchConfigError::MissingSearchText => write!(f, "Search text is required"),
            SearchConfigError::MissingCategory => write!(f, "Category is required"),
            SearchConfigError::NoKeywordGroups => {
                write!(f, "At least one non-empty keyword group is required")
            }
            SearchConfigError::NoWebsites => write!(f, "Select at least one website"),
        }
    }
}

impl std::error::Error for SearchConfigError {}

/// A search to register on one or more storefronts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSearchConfig {
    pub search_text: String,
    pub category: String,
    pub keyword_groups: Vec<KeywordGroup>,
    pub websites: Vec<Website>,
    pub is_active: bool,
}

impl NewSearchConfig {
    pub fn new(search_text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            category: category.into(),
            keyword_groups: Vec::new(),
            websites: Vec::new(),
            is_active: true,
        }
    }

    pub fn keywords(mut self, group: impl Into<String>) -> Self {
        self.keyword_groups.push(KeywordGroup::new(group));
        self
    }

    pub fn website(mut self, website: impl Into<Website>) -> Self {
        let website = website.into();
        if !self.websites.contains(&website) {
            self.websites.push(website);
        }
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Keyword groups with at least one keyword.
    pub fn valid_keyword_groups(&self) -> Vec<&KeywordGroup> {
        self.keyword_groups.iter().filter(|g| !g.is_blank()).collect()
    }

    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if self.search_text.trim().is_empty() {
            return Err(SearchConfigError::MissingSearchText);
        }
        if self.category.trim().is_empty() {
            return Err(SearchConfigError::MissingCategory);
        }
        if self.valid_keyword_groups().is_empty() {
            return Err(SearchConfigError::NoKeywordGroups);
        }
        if self.websites.is_empty() {
            return Err(SearchConfigError::NoWebsites);
        }
        Ok(())
    }

    /// One insert body per selected website.
    pub fn expand(&self) -> Result<Vec<wire::SearchConfigInsert>, SearchConfigError> {
        self.validate()?;
        Ok(self
            .websites
            .iter()
            .map(|website| wire::SearchConfigInsert {
                search_text: self.search_text.trim().to_string(),
                category: self.category.trim().to_string(),
                website: website.clone(),
                is_active: self.is_active,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str, category: &str, website: Website, active: bool) -> SearchConfig {
        SearchConfig {
            id: RowId::from(id),
            search_text: "rtx 4060".to_string(),
            category: category.to_string(),
            website,
            is_active: active,
            created_at: None,
            keyword_groups: vec![KeywordGroup::from("rtx, 4060")],
        }
    }

    #[test]
    fn test_keyword_group_parsing() {
        let g = KeywordGroup::from(" rtx , 4060 ,, ");
        assert_eq!(g.keywords().collect::<Vec<_>>(), vec!["rtx", "4060"]);
        assert!(KeywordGroup::from(" , ").is_blank());
    }

    #[test]
    fn test_keyword_group_matches_all_words() {
        let g = KeywordGroup::from("RTX,4060");
        assert!(g.matches("Placa de Vídeo Gigabyte rtx 4060 Eagle OC"));
        assert!(!g.matches("Placa de Vídeo RTX 4070"));
        assert!(!KeywordGroup::from("").matches("anything"));
    }

    #[test]
    fn test_matches_title_any_group() {
        let mut c = config("1", "placa-de-video", Website::Kabum, true);
        c.keyword_groups.push(KeywordGroup::from("rx, 7600"));
        assert!(c.matches_title("Radeon RX 7600 8GB"));
        assert!(c.matches_title("GeForce RTX 4060"));
        assert!(!c.matches_title("GeForce RTX 3060"));
    }

    #[test]
    fn test_all_active() {
        assert!(!all_active(&[]));
        let a = config("1", "ssd", Website::Kabum, true);
        let b = config("2", "ssd", Website::Pichau, false);
        assert!(all_active(&[a.clone()]));
        assert!(!all_active(&[a, b]));
    }

    #[test]
    fn test_filter() {
        let configs = vec![
            config("1", "ssd", Website::Kabum, true),
            config("2", "ssd", Website::Terabyte, true),
            config("3", "fonte", Website::Kabum, true),
        ];
        let by_cat = SearchConfigFilter::new().category("ssd").apply(&configs);
        assert_eq!(by_cat.len(), 2);
        let both = SearchConfigFilter::new()
            .category("ssd")
            .website("kabum")
            .apply(&configs);
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id.as_str(), "1");
        assert_eq!(SearchConfigFilter::new().apply(&configs).len(), 3);
    }

    #[test]
    fn test_validate_order() {
        let base = NewSearchConfig::new("", "ssd");
        assert_eq!(base.validate(), Err(SearchConfigError::MissingSearchText));
        let no_cat = NewSearchConfig::new("nvme", " ");
        assert_eq!(no_cat.validate(), Err(SearchConfigError::MissingCategory));
        let blank_groups = NewSearchConfig::new("nvme", "ssd").keywords(" , ");
        assert_eq!(blank_groups.validate(), Err(SearchConfigError::NoKeywordGroups));
        let no_sites = NewSearchConfig::new("nvme", "ssd").keywords("nvme, 1tb");
        assert_eq!(no_sites.validate(), Err(SearchConfigError::NoWebsites));
    }

    #[test]
    fn test_expand_one_per_website() {
        let new = NewSearchConfig::new(" ssd nvme ", "ssd")
            .keywords("nvme, 1tb")
            .keywords("")
            .website(Website::Kabum)
            .website("terabyte")
            .website(Website::Kabum)
            .inactive();
        let rows = new.expand().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].website, Website::Kabum);
        assert_eq!(rows[1].website, Website::Terabyte);
        assert_eq!(rows[0].search_text, "ssd nvme");
        assert!(!rows[1].is_active);
        assert_eq!(new.valid_keyword_groups().len(), 1);
    }
}
