// User administration module
// Self-service profile endpoints and maintainer/root account management

pub mod handlers;
pub mod models;
