use serde::{Deserialize, Serialize};

use super::repo_types::{ProfileInput, UserProfile};
use crate::forms::{optional_text, FormErrors};

pub const PHONE_MAX: usize = 20;
pub const ADDRESS_MAX: usize = 255;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl From<&UserProfile> for ProfileForm {
    fn from(p: &UserProfile) -> Self {
        Self {
            phone: p.phone.clone(),
            address: p.address.clone(),
        }
    }
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileInput, FormErrors> {
        let mut errors = FormErrors::new();
        let phone = optional_text(&mut errors, "phone", &self.phone, PHONE_MAX);
        let address = optional_text(&mut errors, "address", &self.address, ADDRESS_MAX);
        errors.finish(ProfileInput { phone, address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_profile_is_valid() {
        let input = ProfileForm::default().validate().unwrap();
        assert_eq!(input.phone, "");
        assert_eq!(input.address, "");
    }

    #[test]
    fn long_phone_is_rejected() {
        let form = ProfileForm {
            phone: "1".repeat(PHONE_MAX + 1),
            address: " Main street 1 ".into(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("phone"));
        assert!(!errors.has("address"));
    }
}
