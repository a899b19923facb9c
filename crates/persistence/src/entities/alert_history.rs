//! Alert history and session ledger entities (stored JSON mapping).
//!
//! Alerts are stored as a bare JSON array with RFC 3339 timestamps. The
//! monitoring-session ledger lives under its own key.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use shared::geometry::Coordinate;
use thiserror::Error;
use uuid::Uuid;

use domain::models::{AlertType, GeofenceAlert, MonitoringSession, Severity};

/// A stored value could not be turned back into domain data.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp {value:?} in {field}")]
    Timestamp { field: &'static str, value: String },
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DecodeError::Timestamp {
            field,
            value: value.to_string(),
        })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stored form of a [`GeofenceAlert`], timestamp kept as an RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntity {
    pub id: String,
    pub boundary_id: String,
    pub boundary_name: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub distance: f64,
    pub message: String,
    pub timestamp: String,
    pub user_location: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consequences: Option<String>,
}

impl From<&GeofenceAlert> for AlertEntity {
    fn from(alert: &GeofenceAlert) -> Self {
        Self {
            id: alert.id.clone(),
            boundary_id: alert.boundary_id.clone(),
            boundary_name: alert.boundary_name.clone(),
            alert_type: alert.alert_type,
            severity: alert.severity,
            distance: alert.distance,
            message: alert.message.clone(),
            timestamp: format_timestamp(alert.timestamp),
            user_location: alert.user_location,
            consequences: alert.consequences.clone(),
        }
    }
}

impl TryFrom<AlertEntity> for GeofenceAlert {
    type Error = DecodeError;

    fn try_from(entity: AlertEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            timestamp: parse_timestamp("alert.timestamp", &entity.timestamp)?,
            id: entity.id,
            boundary_id: entity.boundary_id,
            boundary_name: entity.boundary_name,
            alert_type: entity.alert_type,
            severity: entity.severity,
            distance: entity.distance,
            message: entity.message,
            user_location: entity.user_location,
            consequences: entity.consequences,
        })
    }
}

/// Stored form of a [`MonitoringSession`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntity {
    pub id: Uuid,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub alert_count: u32,
}

impl From<&MonitoringSession> for SessionEntity {
    fn from(session: &MonitoringSession) -> Self {
        Self {
            id: session.id,
            started_at: format_timestamp(session.started_at),
            ended_at: session.ended_at.map(format_timestamp),
            is_active: session.is_active,
            alert_count: session.alert_count,
        }
    }
}

impl TryFrom<SessionEntity> for MonitoringSession {
    type Error = DecodeError;

    fn try_from(entity: SessionEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            started_at: parse_timestamp("session.startedAt", &entity.started_at)?,
            ended_at: entity
                .ended_at
                .as_deref()
                .map(|s| parse_timestamp("session.endedAt", s))
                .transpose()?,
            is_active: entity.is_active,
            alert_count: entity.alert_count,
        })
    }
}

/// Stored form of the session ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLedgerEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session: Option<SessionEntity>,
    #[serde(default)]
    pub sessions: Vec<SessionEntity>,
}

/// Domain view of the session ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLedger {
    pub current_session: Option<MonitoringSession>,
    pub sessions: Vec<MonitoringSession>,
}

pub fn encode_alerts(alerts: &[GeofenceAlert]) -> Result<String, serde_json::Error> {
    let entities: Vec<AlertEntity> = alerts.iter().map(AlertEntity::from).collect();
    serde_json::to_string(&entities)
}

pub fn decode_alerts(json: &str) -> Result<Vec<GeofenceAlert>, DecodeError> {
    let entities: Vec<AlertEntity> = serde_json::from_str(json)?;
    entities.into_iter().map(GeofenceAlert::try_from).collect()
}

pub fn encode_ledger(ledger: &SessionLedger) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SessionLedgerEntity {
        current_session: ledger.current_session.as_ref().map(SessionEntity::from),
        sessions: ledger.sessions.iter().map(SessionEntity::from).collect(),
    })
}

pub fn decode_ledger(json: &str) -> Result<SessionLedger, DecodeError> {
    let entity: SessionLedgerEntity = serde_json::from_str(json)?;
    Ok(SessionLedger {
        current_session: entity
            .current_session
            .map(MonitoringSession::try_from)
            .transpose()?,
        sessions: entity
            .sessions
            .into_iter()
            .map(MonitoringSession::try_from)
            .collect::<Result<_, _>>()?,
    })
}
