use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Seats of an Asian Parliamentary round, in drafting order.
pub const AP_ROLES: [&str; 7] = ["Gov 1", "Gov 2", "Gov 3", "Opp 1", "Opp 2", "Opp 3", "Judge"];

/// Which side of the room a role sits on, derived from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bench {
    Government,
    Opposition,
    Adjudication,
}

impl Bench {
    pub fn of(role: &str) -> Bench {
        let role = role.to_lowercase();
        if role.starts_with("gov") {
            Bench::Government
        } else if role.starts_with("opp") {
            Bench::Opposition
        } else {
            Bench::Adjudication
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Bench::Government => "Government",
            Bench::Opposition => "Opposition",
            Bench::Adjudication => "Adjudication",
        }
    }
}

/// Fixed, ordered, duplicate-free list of role labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RoleList(Vec<String>);

impl RoleList {
    pub fn new(roles: Vec<String>) -> Result<Self, ConfigError> {
        if roles.is_empty() {
            return Err(ConfigError::InvalidQueue(String::from(
                "role list must not be empty",
            )));
        }

        let mut seen = HashSet::new();
        for role in &roles {
            if role.trim().is_empty() {
                return Err(ConfigError::InvalidQueue(String::from(
                    "role labels must not be blank",
                )));
            }
            if !seen.insert(role.as_str()) {
                return Err(ConfigError::InvalidQueue(format!(
                    "role '{role}' is listed twice"
                )));
            }
        }

        Ok(RoleList(roles))
    }

    pub fn asian_parliamentary() -> Self {
        RoleList(AP_ROLES.iter().map(|x| x.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl Default for RoleList {
    fn default() -> Self {
        Self::asian_parliamentary()
    }
}

impl TryFrom<Vec<String>> for RoleList {
    type Error = ConfigError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        RoleList::new(value)
    }
}

impl From<RoleList> for Vec<String> {
    fn from(value: RoleList) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_the_seven_ap_seats() {
        let roles = RoleList::default();

        assert_eq!(roles.len(), 7);
        assert_eq!(roles.iter().next().map(String::as_str), Some("Gov 1"));
        assert_eq!(roles.iter().last().map(String::as_str), Some("Judge"));
    }

    #[test]
    fn duplicates_are_rejected() {
        let roles = vec![String::from("Judge"), String::from("Judge")];

        assert!(RoleList::new(roles).is_err());
    }

    #[test]
    fn bench_follows_label_prefix() {
        assert_eq!(Bench::of("Gov 2"), Bench::Government);
        assert_eq!(Bench::of("opp 1"), Bench::Opposition);
        assert_eq!(Bench::of("Judge"), Bench::Adjudication);
    }
}
