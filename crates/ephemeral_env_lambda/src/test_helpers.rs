//! In-memory fakes for the adapter seams, shared across handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use ephemeral_env_core::contract::AuditRecord;

use crate::adapters::audit_store::AuditStore;
use crate::adapters::inventory::{
    ObjectContainers, ResourceCollection, ResourceSummary, TableCatalog,
};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default)]
pub struct FakeCollection {
    resources: Vec<ResourceSummary>,
    list_error: Option<String>,
    failing_names: HashSet<String>,
    panicking_names: HashSet<String>,
    panic_on_list: bool,
    deleted: Mutex<Vec<String>>,
    attempted: Mutex<Vec<String>>,
}

impl FakeCollection {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            resources: names
                .iter()
                .map(|name| ResourceSummary::named(*name))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_resources(resources: Vec<ResourceSummary>) -> Self {
        Self {
            resources,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panicking_names.insert(name.to_string());
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_list = true;
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("poisoned mutex").clone()
    }

    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().expect("poisoned mutex").clone()
    }
}

impl ResourceCollection for FakeCollection {
    fn list(&self) -> Result<Vec<ResourceSummary>, String> {
        if self.panic_on_list {
            panic!("simulated provider client crash");
        }
        match &self.list_error {
            Some(message) => Err(message.clone()),
            None => Ok(self.resources.clone()),
        }
    }

    fn delete(&self, name: &str) -> Result<(), String> {
        self.attempted
            .lock()
            .expect("poisoned mutex")
            .push(name.to_string());
        if self.panicking_names.contains(name) {
            panic!("simulated provider crash deleting {name}");
        }
        if self.failing_names.contains(name) {
            return Err(format!("simulated delete failure for {name}"));
        }
        self.deleted
            .lock()
            .expect("poisoned mutex")
            .push(name.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeTableCatalog {
    creation_times: HashMap<String, DateTime<Utc>>,
    describe_error: Option<String>,
    described: Mutex<Vec<String>>,
}

impl FakeTableCatalog {
    pub fn with_table(table_name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            creation_times: HashMap::from([(table_name.to_string(), created_at)]),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            describe_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn described(&self) -> Vec<String> {
        self.described.lock().expect("poisoned mutex").clone()
    }
}

impl TableCatalog for FakeTableCatalog {
    fn creation_time(&self, table_name: &str) -> Result<DateTime<Utc>, String> {
        self.described
            .lock()
            .expect("poisoned mutex")
            .push(table_name.to_string());
        if let Some(message) = &self.describe_error {
            return Err(message.clone());
        }
        self.creation_times
            .get(table_name)
            .copied()
            .ok_or_else(|| format!("table not found: {table_name}"))
    }
}

#[derive(Default)]
pub struct FakeContainers {
    contents: HashMap<String, Vec<String>>,
    fail_list: bool,
    fail_delete: bool,
    purged: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeContainers {
    pub fn with_contents(container: &str, keys: &[&str]) -> Self {
        Self {
            contents: HashMap::from([(
                container.to_string(),
                keys.iter().map(|key| key.to_string()).collect(),
            )]),
            ..Self::default()
        }
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn purged(&self) -> Vec<(String, Vec<String>)> {
        self.purged.lock().expect("poisoned mutex").clone()
    }
}

impl ObjectContainers for FakeContainers {
    fn list_contents(&self, container: &str) -> Result<Vec<String>, String> {
        if self.fail_list {
            return Err(format!("simulated list failure for {container}"));
        }
        Ok(self.contents.get(container).cloned().unwrap_or_default())
    }

    fn delete_contents(&self, container: &str, keys: &[String]) -> Result<(), String> {
        if self.fail_delete {
            return Err(format!("simulated object delete failure for {container}"));
        }
        self.purged
            .lock()
            .expect("poisoned mutex")
            .push((container.to_string(), keys.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAuditStore {
    writes: Mutex<Vec<(String, AuditRecord)>>,
    fail_with: Option<String>,
}

impl RecordingAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<(String, AuditRecord)> {
        self.writes.lock().expect("poisoned mutex").clone()
    }
}

impl AuditStore for RecordingAuditStore {
    fn put_record(&self, table_name: &str, record: &AuditRecord) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        self.writes
            .lock()
            .expect("poisoned mutex")
            .push((table_name.to_string(), record.clone()));
        Ok(())
    }
}
