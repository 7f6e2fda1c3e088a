pub(crate) mod billing_controller;
pub(crate) mod crm_controller;
pub(crate) mod dashboard_controller;
pub(crate) mod health_check_controller;
pub(crate) mod meeting_controller;
pub(crate) mod playbook_controller;
