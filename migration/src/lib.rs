pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_schema;
mod m20260105_000002_create_tenant_and_meeting_tables;
mod m20260112_000001_add_playbook_crm_and_audit_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_schema::Migration),
            Box::new(m20260105_000002_create_tenant_and_meeting_tables::Migration),
            Box::new(m20260112_000001_add_playbook_crm_and_audit_tables::Migration),
        ]
    }
}
