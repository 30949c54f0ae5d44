use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::{error::ValidationError, money::Money};

pub type MemberId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Child,
    Teen,
    Spouse,
    /// Any other role label collapses here.
    #[serde(other)]
    Member,
}

impl Role {
    pub fn avatar(&self) -> &'static str {
        match self {
            Role::Child => "👶",
            Role::Teen => "🧑",
            Role::Spouse => "👥",
            Role::Member => "👤",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Child => "child",
            Role::Teen => "teen",
            Role::Spouse => "spouse",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(ValidationError::MissingRole),
            "child" => Ok(Role::Child),
            "teen" => Ok(Role::Teen),
            "spouse" => Ok(Role::Spouse),
            _ => Ok(Role::Member),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: MemberId,
    pub name: String,
    pub role: Role,
    pub spending_limit: Money,
    /// Sum of this member's expenses. Only the family ledger writes it.
    #[serde(default)]
    pub total_spent: Money,
}

impl FamilyMember {
    /// Share of the limit already spent, in percent, capped at 100.
    pub fn spending_percentage(&self) -> f64 {
        self.total_spent.percent_of(self.spending_limit)
    }

    pub fn remaining(&self) -> Money {
        self.spending_limit - self.total_spent
    }

    pub fn over_limit(&self) -> bool {
        self.total_spent > self.spending_limit
    }
}

/// Raw input from the member form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub role: String,
    pub spending_limit: String,
}

impl NewMember {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        spending_limit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            spending_limit: spending_limit.into(),
        }
    }

    pub fn validate(&self) -> Result<(String, Role, Money), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let role: Role = self.role.parse()?;

        let limit_str = self.spending_limit.trim();
        if limit_str.is_empty() {
            return Err(ValidationError::MissingSpendingLimit);
        }
        let limit: Money = limit_str
            .parse()
            .map_err(|_| ValidationError::InvalidSpendingLimit(limit_str.to_string()))?;
        if !limit.is_positive() {
            return Err(ValidationError::NonPositiveSpendingLimit);
        }

        Ok((name.to_string(), role, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(spent: i64, limit: i64) -> FamilyMember {
        FamilyMember {
            id: 1,
            name: "Ada".into(),
            role: Role::Teen,
            spending_limit: Money::from_units(limit),
            total_spent: Money::from_units(spent),
        }
    }

    #[test]
    fn percentage_is_capped_and_safe() {
        assert_eq!(member(550, 1000).spending_percentage(), 55.0);
        assert_eq!(member(2000, 1000).spending_percentage(), 100.0);
        assert_eq!(member(0, 1000).spending_percentage(), 0.0);
        assert_eq!(member(10, 0).spending_percentage(), 0.0);
    }

    #[test]
    fn over_limit_and_remaining() {
        let m = member(1200, 1000);
        assert!(m.over_limit());
        assert_eq!(m.remaining(), Money::from_units(-200));
    }

    #[test]
    fn unknown_roles_fall_back_to_member() {
        assert_eq!("Spouse".parse::<Role>(), Ok(Role::Spouse));
        assert_eq!("grandparent".parse::<Role>(), Ok(Role::Member));
        assert_eq!(" ".parse::<Role>(), Err(ValidationError::MissingRole));

        let parsed: Role = serde_json::from_str("\"parent\"").unwrap();
        assert_eq!(parsed, Role::Member);
        assert_eq!(Role::Child.avatar(), "👶");
    }

    #[test]
    fn validate_checks_each_field() {
        assert_eq!(
            NewMember::new("", "child", "100").validate(),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            NewMember::new("Tim", "", "100").validate(),
            Err(ValidationError::MissingRole)
        );
        assert_eq!(
            NewMember::new("Tim", "child", "").validate(),
            Err(ValidationError::MissingSpendingLimit)
        );
        assert_eq!(
            NewMember::new("Tim", "child", "lots").validate(),
            Err(ValidationError::InvalidSpendingLimit("lots".into()))
        );
        assert_eq!(
            NewMember::new("Tim", "child", "0").validate(),
            Err(ValidationError::NonPositiveSpendingLimit)
        );

        let (name, role, limit) = NewMember::new(" Tim ", "child", "250").validate().unwrap();
        assert_eq!(name, "Tim");
        assert_eq!(role, Role::Child);
        assert_eq!(limit, Money::from_units(250));
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let json = serde_json::to_value(member(300, 1000)).unwrap();
        assert_eq!(json["spendingLimit"], 1000.0);
        assert_eq!(json["totalSpent"], 300.0);
        assert_eq!(json["role"], "teen");
    }
}
