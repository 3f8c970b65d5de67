//! Rewards program member models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pet insurance plan tier. Determines the reward paid per challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetPlan {
    #[default]
    #[serde(rename = "Pet 1")]
    Pet1,
    #[serde(rename = "Pet 2")]
    Pet2,
    #[serde(rename = "Pet 3")]
    Pet3,
    #[serde(rename = "Pet Vital")]
    PetVital,
}

impl PetPlan {
    pub const ALL: [PetPlan; 4] = [Self::Pet1, Self::Pet2, Self::Pet3, Self::PetVital];

    pub fn as_str(&self) -> &'static str {
        match self {
            PetPlan::Pet1 => "Pet 1",
            PetPlan::Pet2 => "Pet 2",
            PetPlan::Pet3 => "Pet 3",
            PetPlan::PetVital => "Pet Vital",
        }
    }
}

impl fmt::Display for PetPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PetPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pet 1" => Ok(PetPlan::Pet1),
            "Pet 2" => Ok(PetPlan::Pet2),
            "Pet 3" => Ok(PetPlan::Pet3),
            "Pet Vital" => Ok(PetPlan::PetVital),
            _ => Err(format!(
                "Invalid pet plan: {}. Must be one of: Pet 1, Pet 2, Pet 3, Pet Vital",
                s
            )),
        }
    }
}

/// A rewards program member. Owned by the user-management component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub tax_id: String,
    #[serde(default)]
    pub pet_plan: PetPlan,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub pet_name: String,
    /// Trackers registered to this member.
    #[serde(default)]
    pub device_ids: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Minimal member, used by callers that only need evaluation inputs.
    pub fn new(id: impl Into<String>, tax_id: impl Into<String>, pet_plan: PetPlan) -> Self {
        Self {
            id: id.into(),
            tax_id: tax_id.into(),
            pet_plan,
            full_name: String::new(),
            pet_name: String::new(),
            device_ids: Vec::new(),
            active: true,
        }
    }

    pub fn with_devices<I, S>(mut self, device_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.device_ids = device_ids.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_plan_round_trip_strings() {
        for plan in PetPlan::ALL {
            assert_eq!(plan.as_str().parse::<PetPlan>().unwrap(), plan);
        }
        assert!("Pet 4".parse::<PetPlan>().is_err());
    }

    #[test]
    fn test_pet_plan_serde_names() {
        assert_eq!(serde_json::to_string(&PetPlan::PetVital).unwrap(), "\"Pet Vital\"");
        let plan: PetPlan = serde_json::from_str("\"Pet 2\"").unwrap();
        assert_eq!(plan, PetPlan::Pet2);
    }

    #[test]
    fn test_user_deserialization_defaults() {
        let json = r#"{"id": "u1", "taxId": "123456789"}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.pet_plan, PetPlan::Pet1);
        assert!(user.active);
        assert!(user.device_ids.is_empty());
    }

    #[test]
    fn test_user_with_devices() {
        let user = User::new("u1", "123", PetPlan::Pet3).with_devices(["d1", "d2"]);
        assert_eq!(user.device_ids, vec!["d1".to_string(), "d2".to_string()]);
    }
}
