use serde::{Deserialize, Serialize};

use crate::forms::{bounded_int, FormErrors};

pub const MANUAL_DURATION_RANGE: (i32, i32) = (1, 60);

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ManualWateringForm {
    #[serde(default)]
    pub duration: String,
}

impl ManualWateringForm {
    /// Prefilled with the zone's configured duration, clamped into the manual range.
    pub fn initial(zone_duration: i32) -> Self {
        let (min, max) = MANUAL_DURATION_RANGE;
        Self {
            duration: zone_duration.clamp(min, max).to_string(),
        }
    }

    pub fn validate(&self) -> Result<i32, FormErrors> {
        let mut errors = FormErrors::new();
        let (min, max) = MANUAL_DURATION_RANGE;
        let duration = bounded_int(&mut errors, "duration", &self.duration, min, max);
        match duration {
            Some(d) if errors.is_empty() => Ok(d),
            _ => Err(errors),
        }
    }
}

/// `?zone=<uuid>` on the history page.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_uses_zone_duration() {
        assert_eq!(ManualWateringForm::initial(15).duration, "15");
        assert_eq!(ManualWateringForm::initial(90).duration, "60");
    }

    #[test]
    fn duration_bounds() {
        let ok = ManualWateringForm {
            duration: "60".into(),
        };
        assert_eq!(ok.validate().unwrap(), 60);

        for bad in ["0", "61", "", "ten"] {
            let form = ManualWateringForm {
                duration: bad.into(),
            };
            assert!(form.validate().unwrap_err().has("duration"), "{bad}");
        }
    }
}
