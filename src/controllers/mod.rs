//! Reglas de negocio por agregado

pub mod auth_controller;
pub mod listing_controller;
pub mod meeting_controller;
pub mod message_controller;
pub mod safe_zone_controller;
pub mod verification_controller;
