// HTTP handlers

pub mod admin;
pub mod dispatch;
pub mod links;
