pub(crate) mod authenticated_user;
pub(crate) mod json_body;
pub(crate) mod request_meta;
