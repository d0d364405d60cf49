//! Modelo de Student
//!
//! Este módulo contiene el struct Student, el enum cerrado TripStatus con
//! su tabla de transiciones, y los sub-documentos de servicio. Mapea
//! exactamente al schema PostgreSQL (tabla `students`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::point::GeoPoint;

/// Fase del alumno dentro del ciclo diario de recogida y regreso.
///
/// Enum cerrado: los strings desconocidos se rechazan en el borde de la API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    AtHome,
    PickedUp,
    AtSchool,
    DroppedOff,
    Absent,
}

impl TripStatus {
    /// Tabla de transiciones válidas. `absent` y `dropped_off` son
    /// terminales hasta el reset diario.
    pub fn allowed_transitions(self) -> &'static [TripStatus] {
        match self {
            TripStatus::AtHome => &[TripStatus::PickedUp, TripStatus::Absent],
            TripStatus::PickedUp => &[TripStatus::AtSchool],
            TripStatus::AtSchool => &[TripStatus::DroppedOff],
            TripStatus::DroppedOff => &[],
            TripStatus::Absent => &[],
        }
    }

    pub fn can_transition_to(self, next: TripStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Texto legible del cambio de estado para la notificación al tutor
    pub fn status_message(self) -> &'static str {
        match self {
            TripStatus::PickedUp => "picked up from home",
            TripStatus::AtSchool => "arrived at school",
            TripStatus::DroppedOff => "dropped off at home",
            TripStatus::Absent => "marked absent",
            TripStatus::AtHome => "back at home",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::AtHome => "at_home",
            TripStatus::PickedUp => "picked_up",
            TripStatus::AtSchool => "at_school",
            TripStatus::DroppedOff => "dropped_off",
            TripStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "at_home" => Ok(TripStatus::AtHome),
            "picked_up" => Ok(TripStatus::PickedUp),
            "at_school" => Ok(TripStatus::AtSchool),
            "dropped_off" => Ok(TripStatus::DroppedOff),
            "absent" => Ok(TripStatus::Absent),
            other => Err(format!("unknown trip status '{}'", other)),
        }
    }
}

/// Estado general del alumno (alta/baja del servicio)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneralStatus {
    Active,
    Inactive,
}

impl GeneralStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneralStatus::Active => "Active",
            GeneralStatus::Inactive => "Inactive",
        }
    }
}

/// Servicios contratados dentro del ciclo diario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePlan {
    pub pickup: bool,
    pub dropoff: bool,
}

impl Default for ServicePlan {
    fn default() -> Self {
        Self { pickup: true, dropoff: true }
    }
}

/// Override de un solo día programado por el tutor; lo consume el
/// rollover diario y luego se limpia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextDayService {
    pub date: NaiveDate,
    pub pickup: bool,
    pub dropoff: bool,
    #[serde(default)]
    pub is_absent: bool,
}

/// Student principal - mapea exactamente a la tabla students
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub parent_id: Uuid,
    pub school_id: Uuid,
    pub zone: String,
    pub general_status: String,
    pub trip_status: String,
    pub location: Json<GeoPoint>,
    pub service: Json<ServicePlan>,
    pub next_day_service: Option<Json<NextDayService>>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn trip_status(&self) -> Result<TripStatus, String> {
        TripStatus::from_str(&self.trip_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_daily_cycle() {
        assert!(TripStatus::AtHome.can_transition_to(TripStatus::PickedUp));
        assert!(TripStatus::AtHome.can_transition_to(TripStatus::Absent));
        assert!(TripStatus::PickedUp.can_transition_to(TripStatus::AtSchool));
        assert!(TripStatus::AtSchool.can_transition_to(TripStatus::DroppedOff));

        assert!(!TripStatus::AtHome.can_transition_to(TripStatus::AtSchool));
        assert!(!TripStatus::PickedUp.can_transition_to(TripStatus::Absent));
        assert!(!TripStatus::DroppedOff.can_transition_to(TripStatus::AtHome));
        assert!(!TripStatus::Absent.can_transition_to(TripStatus::PickedUp));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(TripStatus::from_str("picked_up").is_ok());
        assert!(TripStatus::from_str("teleported").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TripStatus::AtHome,
            TripStatus::PickedUp,
            TripStatus::AtSchool,
            TripStatus::DroppedOff,
            TripStatus::Absent,
        ] {
            assert_eq!(TripStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
