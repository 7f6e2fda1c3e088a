use chrono::Utc;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity::{
    action_item_status, action_items, audit_logs, crm_connections, crm_type, meeting_status,
    meetings, organizations, playbook_run_status, playbook_runs, priority, subscription_status,
    transcripts, user_profiles, user_role, Id,
};

pub mod action_item;
pub mod audit_log;
pub mod crm_connection;
pub mod error;
pub mod meeting;
pub mod organization;
pub mod playbook_run;
pub mod transcript;
pub mod user_profile;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// Seeds a development database with one paying organization, an admin, and a
/// transcribed meeting ready for analysis.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let organization = organization::create(
        db,
        "Acme Consulting",
        subscription_status::SubscriptionStatus::Active,
        false,
    )
    .await?;

    // Matches the `sub` of the development auth provider's seeded user.
    let admin_id = uuid_parse_str("2f6b1f0e-0c5a-4a43-9a61-6c1f3b7a9d10")?;
    let admin = user_profile::create(
        db,
        admin_id,
        "admin@acme.example",
        Some("Acme Admin".to_string()),
        Some(organization.id),
        user_role::UserRole::Admin,
    )
    .await?;

    let meeting = meeting::create(
        db,
        organization.id,
        Some(admin.id),
        "Kickoff with legal",
        Some("https://storage.example.com/meetings/kickoff.mp3".to_string()),
        Some(4_812_000),
    )
    .await?;
    let meeting =
        meeting::update_status(db, meeting, meeting_status::MeetingStatus::Processing).await?;

    transcript::create(
        db,
        organization.id,
        meeting.id,
        "Thanks everyone for joining.\n\
         We need to follow up with legal by Friday. Action: send contract draft.\n\
         Next steps: Sam books the design review.\n\
         Deadline for the pricing page is the end of the month."
            .to_string(),
        None,
        None,
    )
    .await?;
    let meeting =
        meeting::update_status(db, meeting, meeting_status::MeetingStatus::Transcribed).await?;

    info!(
        "Seeded organization {} with admin {} and meeting {} at {}",
        organization.id,
        admin.email,
        meeting.id,
        Utc::now()
    );

    Ok(())
}
