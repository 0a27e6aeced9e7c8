//! DTOs compartidos de la API

pub mod common;

pub use common::ApiResponse;
