pub mod agent;
pub mod extraction;
