use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE meetingmind.playbook_run_status AS ENUM ('pending', 'running', 'completed', 'failed')",
        )
        .await?;
        db.execute_unprepared("ALTER TYPE meetingmind.playbook_run_status OWNER TO meetingmind")
            .await?;

        // Add vendors via ALTER TYPE ADD VALUE when their adapters land
        db.execute_unprepared(
            "CREATE TYPE meetingmind.crm_type AS ENUM ('ghl', 'hubspot', 'salesforce')",
        )
        .await?;
        db.execute_unprepared("ALTER TYPE meetingmind.crm_type OWNER TO meetingmind")
            .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.playbook_runs (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                meeting_id UUID NOT NULL REFERENCES meetingmind.meetings(id) ON DELETE CASCADE,
                playbook_type VARCHAR(100) NOT NULL,
                status meetingmind.playbook_run_status NOT NULL DEFAULT 'pending',
                n8n_execution_id VARCHAR(255),
                payload JSONB,
                result JSONB,
                error_message TEXT,
                started_at TIMESTAMPTZ,
                completed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.crm_connections (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                crm_type meetingmind.crm_type NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                token_expires_at TIMESTAMPTZ,
                account_id VARCHAR(255),
                account_name VARCHAR(255),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                metadata JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.audit_logs (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                user_id UUID,
                action_type VARCHAR(100) NOT NULL,
                resource_type VARCHAR(100),
                resource_id UUID,
                details JSONB,
                ip_address VARCHAR(64),
                user_agent TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        for table in ["playbook_runs", "crm_connections", "audit_logs"] {
            db.execute_unprepared(&format!(
                "ALTER TABLE meetingmind.{table} OWNER TO meetingmind"
            ))
            .await?;
        }

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_playbook_runs_organization_created
             ON meetingmind.playbook_runs(organization_id, created_at DESC)",
        )
        .await?;

        // One active connection per organization and vendor
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_crm_connections_one_active
             ON meetingmind.crm_connections(organization_id, crm_type)
             WHERE is_active",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_audit_logs_organization_created
             ON meetingmind.audit_logs(organization_id, created_at DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in ["audit_logs", "crm_connections", "playbook_runs"] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS meetingmind.{table}"))
                .await?;
        }

        db.execute_unprepared("DROP TYPE IF EXISTS meetingmind.crm_type")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS meetingmind.playbook_run_status")
            .await?;

        Ok(())
    }
}
