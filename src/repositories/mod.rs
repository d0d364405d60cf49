//! Repositorios
//!
//! Acceso a datos por agregado. Las operaciones que deben ser atómicas a
//! nivel de almacenamiento (append de bitácora, CAS de estado, upsert de
//! suscripción) viven aquí como sentencias únicas.

pub mod driver_repository;
pub mod school_repository;
pub mod student_repository;
pub mod subscription_repository;
pub mod trip_log_repository;
pub mod user_repository;
pub mod zone_repository;
