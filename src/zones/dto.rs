use serde::{Deserialize, Serialize};

use super::repo_types::{GardenZone, ZoneInput};
use crate::forms::{bounded_int, optional_text, required_text, FormErrors};

pub const DURATION_RANGE: (i32, i32) = (1, 120);
pub const FREQUENCY_RANGE: (i32, i32) = (1, 5);
const AREA_LIMIT: f64 = 10_000.0;

/// Raw zone form as posted; numbers stay text until validated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ZoneForm {
    pub name: String,
    pub description: String,
    pub plant_type: String,
    pub area_size: String,
    pub watering_duration: String,
    pub watering_frequency: String,
}

impl Default for ZoneForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            plant_type: String::new(),
            area_size: String::new(),
            watering_duration: "10".into(),
            watering_frequency: "1".into(),
        }
    }
}

impl From<&GardenZone> for ZoneForm {
    fn from(z: &GardenZone) -> Self {
        Self {
            name: z.name.clone(),
            description: z.description.clone(),
            plant_type: z.plant_type.clone(),
            area_size: z.area_size.map(|a| format!("{a:.2}")).unwrap_or_default(),
            watering_duration: z.watering_duration.to_string(),
            watering_frequency: z.watering_frequency.to_string(),
        }
    }
}

fn parse_area(errors: &mut FormErrors, raw: &str) -> Option<f64> {
    let raw = raw.trim().replace(',', ".");
    if raw.is_empty() {
        return None;
    }
    // Round before the bound check so 9999.995 cannot become 10000.00 in NUMERIC(6,2).
    match raw.parse::<f64>().map(|v| (v * 100.0).round() / 100.0) {
        Ok(v) if !v.is_finite() => {
            errors.add("area_size", "Enter a number.");
            None
        }
        Ok(v) if v < 0.0 => {
            errors.add("area_size", "Ensure this value is greater than or equal to 0.");
            None
        }
        Ok(v) if v >= AREA_LIMIT => {
            errors.add(
                "area_size",
                "Ensure that there are no more than 4 digits before the decimal point.",
            );
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.add("area_size", "Enter a number.");
            None
        }
    }
}

impl ZoneForm {
    pub fn validate(&self) -> Result<ZoneInput, FormErrors> {
        let mut errors = FormErrors::new();
        let name = required_text(&mut errors, "name", &self.name, 100);
        let description = self.description.trim().to_string();
        let plant_type = optional_text(&mut errors, "plant_type", &self.plant_type, 100);
        let area_size = parse_area(&mut errors, &self.area_size);
        let (dmin, dmax) = DURATION_RANGE;
        let duration = bounded_int(
            &mut errors,
            "watering_duration",
            &self.watering_duration,
            dmin,
            dmax,
        );
        let (fmin, fmax) = FREQUENCY_RANGE;
        let frequency = bounded_int(
            &mut errors,
            "watering_frequency",
            &self.watering_frequency,
            fmin,
            fmax,
        );

        match (duration, frequency) {
            (Some(watering_duration), Some(watering_frequency)) => errors.finish(ZoneInput {
                name,
                description,
                plant_type,
                area_size,
                watering_duration,
                watering_frequency,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, duration: &str, frequency: &str) -> ZoneForm {
        ZoneForm {
            name: name.into(),
            watering_duration: duration.into(),
            watering_frequency: frequency.into(),
            ..ZoneForm::default()
        }
    }

    #[test]
    fn accepts_a_minimal_zone() {
        let input = form("Tomatoes", "15", "2").validate().unwrap();
        assert_eq!(input.name, "Tomatoes");
        assert_eq!(input.watering_duration, 15);
        assert_eq!(input.watering_frequency, 2);
        assert_eq!(input.area_size, None);
    }

    #[test]
    fn area_that_rounds_up_to_the_limit_is_rejected() {
        let mut near = form("Lawn", "10", "1");
        near.area_size = "9999.996".into();
        assert!(near.validate().unwrap_err().has("area_size"));

        near.area_size = "9999.994".into();
        assert_eq!(near.validate().unwrap().area_size, Some(9999.99));
    }

    #[test]
    fn name_is_required() {
        assert!(form("   ", "10", "1").validate().unwrap_err().has("name"));
    }

    #[test]
    fn duration_and_frequency_are_bounded() {
        assert!(form("A", "0", "1").validate().unwrap_err().has("watering_duration"));
        assert!(form("A", "121", "1").validate().unwrap_err().has("watering_duration"));
        assert!(form("A", "120", "5").validate().is_ok());
        assert!(form("A", "10", "6").validate().unwrap_err().has("watering_frequency"));
        assert!(form("A", "10", "0").validate().unwrap_err().has("watering_frequency"));
    }

    #[test]
    fn area_is_numeric_and_rounded() {
        let mut f = form("A", "10", "1");
        f.area_size = "7,5".into();
        assert_eq!(f.validate().unwrap().area_size, Some(7.5));

        f.area_size = "1.23456".into();
        assert_eq!(f.validate().unwrap().area_size, Some(1.23));

        f.area_size = "lots".into();
        assert!(f.validate().unwrap_err().has("area_size"));

        f.area_size = "10000".into();
        assert!(f.validate().unwrap_err().has("area_size"));

        f.area_size = "-1".into();
        assert!(f.validate().unwrap_err().has("area_size"));
    }

    #[test]
    fn edit_form_is_prefilled_from_zone() {
        let zone = GardenZone {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            name: "Cucumbers".into(),
            description: String::new(),
            plant_type: "cucumber".into(),
            area_size: Some(4.5),
            watering_duration: 20,
            watering_frequency: 2,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let f = ZoneForm::from(&zone);
        assert_eq!(f.area_size, "4.50");
        assert_eq!(f.validate().unwrap().watering_duration, 20);
    }
}
