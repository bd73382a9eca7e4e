// ICMP ping utility module

pub mod handlers;
pub mod models;
