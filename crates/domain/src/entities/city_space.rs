//! City spaces - the ordered trading post slots of a city

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{CityId, CitySpaceId};

/// Lowest privilege level a space can require.
pub const MIN_REQUIRED_PRIVILEGE: i32 = 1;

/// Highest privilege level a space can require.
pub const MAX_REQUIRED_PRIVILEGE: i32 = 4;

/// Which tradesman may occupy a space. Stored and serialized as its
/// numeric code (Trader = 1, Merchant = 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SpaceType {
    Trader,
    Merchant,
}

impl SpaceType {
    pub fn code(self) -> i32 {
        match self {
            Self::Trader => 1,
            Self::Merchant => 2,
        }
    }
}

impl TryFrom<i32> for SpaceType {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Trader),
            2 => Ok(Self::Merchant),
            other => Err(DomainError::parse(format!("Unknown space type: {}", other))),
        }
    }
}

impl From<SpaceType> for i32 {
    fn from(value: SpaceType) -> Self {
        value.code()
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trader => write!(f, "Trader"),
            Self::Merchant => write!(f, "Merchant"),
        }
    }
}

/// A stored trading post slot.
///
/// # Invariants
///
/// - `(city_id, order)` is unique
/// - `required_privilege` is within `MIN_REQUIRED_PRIVILEGE..=MAX_REQUIRED_PRIVILEGE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySpace {
    pub id: CitySpaceId,
    pub city_id: CityId,
    pub order: i32,
    pub space_type: SpaceType,
    pub required_privilege: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A space that has not been stored yet. Without an explicit `order` the
/// repository appends it after the city's last space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCitySpace {
    pub city_id: CityId,
    pub order: Option<i32>,
    pub space_type: SpaceType,
    pub required_privilege: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_type_codes_round_trip() {
        assert_eq!(SpaceType::try_from(1), Ok(SpaceType::Trader));
        assert_eq!(SpaceType::try_from(2), Ok(SpaceType::Merchant));
        assert_eq!(i32::from(SpaceType::Merchant), 2);
    }

    #[test]
    fn unknown_space_type_is_rejected() {
        assert!(matches!(SpaceType::try_from(0), Err(DomainError::Parse(_))));
        assert!(serde_json::from_str::<SpaceType>("3").is_err());
    }

    #[test]
    fn space_type_serializes_as_number() {
        let json = serde_json::to_string(&SpaceType::Trader).expect("serialize");
        assert_eq!(json, "1");
    }
}
