pub mod action_item;
pub mod agent;
