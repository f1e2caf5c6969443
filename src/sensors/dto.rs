use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewReading, SensorReading};
use crate::forms::FormErrors;

/// JSON body of `POST /api/zone/{id}/readings/`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingRequest {
    pub soil_moisture: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
}

fn percent(errors: &mut FormErrors, field: &'static str, v: Option<i32>) {
    if let Some(v) = v {
        if !(0..=100).contains(&v) {
            errors.add(field, "Must be between 0 and 100.");
        }
    }
}

impl ReadingRequest {
    pub fn validate(&self) -> Result<NewReading, FormErrors> {
        let mut errors = FormErrors::new();
        percent(&mut errors, "soil_moisture", self.soil_moisture);
        percent(&mut errors, "humidity", self.humidity);
        let temperature = self.temperature.map(|t| (t * 10.0).round() / 10.0);
        if let Some(t) = temperature {
            if !t.is_finite() || !(-99.9..=99.9).contains(&t) {
                errors.add("temperature", "Must be between -99.9 and 99.9.");
            }
        }
        errors.finish(NewReading {
            soil_moisture: self.soil_moisture,
            temperature,
            humidity: self.humidity,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub id: Uuid,
    pub zone_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub soil_moisture: Option<i32>,
    pub temperature: Option<f64>,
    pub humidity: Option<i32>,
}

impl From<SensorReading> for ReadingResponse {
    fn from(r: SensorReading) -> Self {
        Self {
            id: r.id,
            zone_id: r.zone_id,
            recorded_at: r.recorded_at,
            soil_moisture: r.soil_moisture,
            temperature: r.temperature,
            humidity: r.humidity,
        }
    }
}
