use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl ResourceSummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }
}

/// Control-plane access to every resource of one kind in the account.
pub trait ResourceCollection {
    fn list(&self) -> Result<Vec<ResourceSummary>, String>;
    fn delete(&self, name: &str) -> Result<(), String>;
}

pub trait TableCatalog {
    fn creation_time(&self, table_name: &str) -> Result<DateTime<Utc>, String>;
}

pub trait ObjectContainers {
    fn list_contents(&self, container: &str) -> Result<Vec<String>, String>;
    fn delete_contents(&self, container: &str, keys: &[String]) -> Result<(), String>;
}
