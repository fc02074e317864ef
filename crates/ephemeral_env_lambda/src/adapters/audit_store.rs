use ephemeral_env_core::contract::AuditRecord;

pub trait AuditStore {
    fn put_record(&self, table_name: &str, record: &AuditRecord) -> Result<(), String>;
}
