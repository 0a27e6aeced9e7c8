//! Acceso a datos por agregado

pub mod conversation_repository;
pub mod listing_repository;
pub mod meeting_repository;
pub mod safe_zone_repository;
pub mod user_repository;
pub mod verification_repository;
