//! Controllers
//!
//! Orquestación fina por recurso entre las rutas HTTP y los servicios.

pub mod driver_controller;
pub mod navigation_controller;
pub mod notification_controller;
pub mod subscription_controller;
pub mod trip_controller;
pub mod zone_controller;
