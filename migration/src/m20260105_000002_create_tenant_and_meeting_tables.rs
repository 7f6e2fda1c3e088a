use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ENUMS: &[(&str, &str)] = &[
    (
        "subscription_status",
        "'active', 'inactive', 'past_due', 'canceled', 'trialing'",
    ),
    ("user_role", "'admin', 'member'"),
    (
        "meeting_status",
        "'pending', 'processing', 'transcribed', 'analyzed', 'failed'",
    ),
    ("priority", "'low', 'medium', 'high', 'urgent'"),
    (
        "action_item_status",
        "'pending', 'in_progress', 'completed', 'cancelled'",
    ),
];

const TABLES: &[&str] = &[
    "organizations",
    "user_profiles",
    "meetings",
    "transcripts",
    "action_items",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for (name, values) in ENUMS {
            db.execute_unprepared(&format!(
                "CREATE TYPE meetingmind.{name} AS ENUM ({values})"
            ))
            .await?;
            db.execute_unprepared(&format!(
                "ALTER TYPE meetingmind.{name} OWNER TO meetingmind"
            ))
            .await?;
        }

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.organizations (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(255) NOT NULL UNIQUE,
                stripe_customer_id VARCHAR(255),
                stripe_subscription_id VARCHAR(255),
                subscription_status meetingmind.subscription_status NOT NULL DEFAULT 'inactive',
                is_founding_member BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // id is the auth provider's user id, not generated here
        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.user_profiles (
                id UUID PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                full_name VARCHAR(255),
                organization_id UUID REFERENCES meetingmind.organizations(id) ON DELETE SET NULL,
                role meetingmind.user_role NOT NULL DEFAULT 'member',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.meetings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                title VARCHAR(500) NOT NULL,
                meeting_date TIMESTAMPTZ,
                audio_file_url TEXT,
                audio_file_size BIGINT,
                status meetingmind.meeting_status NOT NULL DEFAULT 'pending',
                metadata JSONB,
                created_by UUID REFERENCES meetingmind.user_profiles(id) ON DELETE SET NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.transcripts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                meeting_id UUID NOT NULL UNIQUE REFERENCES meetingmind.meetings(id) ON DELETE CASCADE,
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                raw_text TEXT NOT NULL,
                structured_data JSONB,
                voxtral_metadata JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        // No uniqueness on (meeting_id, title): re-analysis appends a new set of items
        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS meetingmind.action_items (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL REFERENCES meetingmind.organizations(id) ON DELETE CASCADE,
                meeting_id UUID NOT NULL REFERENCES meetingmind.meetings(id) ON DELETE CASCADE,
                transcript_id UUID REFERENCES meetingmind.transcripts(id) ON DELETE SET NULL,
                title VARCHAR(500) NOT NULL,
                description TEXT,
                assignee VARCHAR(255),
                due_date DATE,
                priority meetingmind.priority NOT NULL DEFAULT 'medium',
                status meetingmind.action_item_status NOT NULL DEFAULT 'pending',
                scope_creep_flag BOOLEAN NOT NULL DEFAULT FALSE,
                ghl_task_id VARCHAR(255),
                ghl_synced_at TIMESTAMPTZ,
                metadata JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .await?;

        for table in TABLES {
            db.execute_unprepared(&format!(
                "ALTER TABLE meetingmind.{table} OWNER TO meetingmind"
            ))
            .await?;
        }

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_user_profiles_organization
             ON meetingmind.user_profiles(organization_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_meetings_organization_created
             ON meetingmind.meetings(organization_id, created_at DESC)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_action_items_meeting
             ON meetingmind.action_items(organization_id, meeting_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_action_items_organization_status
             ON meetingmind.action_items(organization_id, status, created_at DESC)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for table in TABLES.iter().rev() {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS meetingmind.{table}"))
                .await?;
        }

        for (name, _) in ENUMS.iter().rev() {
            db.execute_unprepared(&format!("DROP TYPE IF EXISTS meetingmind.{name}"))
                .await?;
        }

        Ok(())
    }
}
