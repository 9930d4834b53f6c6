use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::UserId;
use crate::money::Balance;

/// What a registered account is allowed to do on the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Donor,
    Organization,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Donor => "donor",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "donor" => Ok(Self::Donor),
            "organization" => Ok(Self::Organization),
            other => Err(TypeError::UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// A registered user and their wallet.
///
/// `wallet_balance` only changes through a committed write batch, and every
/// such change bumps `version`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub role: Role,
    pub wallet_balance: Balance,
    pub version: u64,
}

impl User {
    /// "First Last", trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Registration data for a new user. The store assigns the id and starts
/// the wallet at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub role: Role,
}

impl NewUser {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            contact_number: self.contact_number,
            role: self.role,
            wallet_balance: Balance::ZERO,
            version: 0,
        }
    }
}
