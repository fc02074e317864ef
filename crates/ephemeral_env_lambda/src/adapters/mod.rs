pub mod audit_store;
pub mod inventory;
