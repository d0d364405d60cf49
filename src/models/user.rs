//! Modelo de User
//!
//! Cuenta de acceso que enlaza un rol con su perfil (conductor, tutor o
//! admin). La emisión de credenciales queda fuera de este servicio; aquí
//! solo se usa para resolver destinatarios de notificaciones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Rol de la cuenta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
    Parent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
            Role::Parent => "parent",
        }
    }
}

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    /// Referencia al perfil según el rol: drivers.id o parents (students.parent_id)
    pub profile_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
