use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("CREATE SCHEMA IF NOT EXISTS meetingmind;")
            .await?;

        db.execute_unprepared("SET search_path TO meetingmind, public;")
            .await?;

        // gen_random_uuid() lives in pgcrypto before PostgreSQL 13
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto;")
            .await?;

        db.execute_unprepared(
            r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA meetingmind TO meetingmind;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind GRANT ALL ON TABLES TO meetingmind;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind GRANT ALL ON SEQUENCES TO meetingmind;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind GRANT ALL ON FUNCTIONS TO meetingmind;
                END $$;
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind REVOKE ALL ON FUNCTIONS FROM meetingmind;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind REVOKE ALL ON SEQUENCES FROM meetingmind;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meetingmind REVOKE ALL ON TABLES FROM meetingmind;
                    REVOKE ALL ON SCHEMA meetingmind FROM meetingmind;
                END $$;
            "#,
        )
        .await?;

        // CASCADE removes every table and type in the schema
        db.execute_unprepared("DROP SCHEMA IF EXISTS meetingmind CASCADE;")
            .await?;

        Ok(())
    }
}
