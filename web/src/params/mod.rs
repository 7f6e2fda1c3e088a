pub(crate) mod crm;
pub(crate) mod meeting;
pub(crate) mod playbook;
