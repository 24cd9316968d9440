//! Load directions and the coordinate systems they may be used in.
//!
//! A direction code only means something relative to a coordinate system:
//!
//! | Directions | Allowed coordinate systems |
//! |------------|----------------------------|
//! | Local 1, Local 2, Local 3 | `Local` only |
//! | X, Y, Z, Projected X/Y/Z | anything except `Local` |
//! | Gravity, Projected Gravity | `Global` only |

use serde::{Deserialize, Serialize};

use super::HostCode;
use crate::errors::{BotError, BotResult};

host_codes! {
    /// Load direction (`Dir` argument of the load assignment calls).
    ///
    /// # Example
    /// ```
    /// use csibot_core::codes::{Direction, HostCode};
    ///
    /// assert_eq!(Direction::resolve("Gravity").unwrap().code(), 10);
    /// assert_eq!(Direction::resolve(2).unwrap(), Direction::Local2);
    /// ```
    #[derive(Default)]
    pub enum Direction : "direction" {
        Local1 = 1 => "Local 1",
        Local2 = 2 => "Local 2",
        Local3 = 3 => "Local 3",
        X = 4 => "X",
        Y = 5 => "Y",
        Z = 6 => "Z",
        ProjectedX = 7 => "Projected X",
        ProjectedY = 8 => "Projected Y",
        ProjectedZ = 9 => "Projected Z",
        #[default]
        Gravity = 10 => "Gravity",
        ProjectedGravity = 11 => "Projected Gravity",
    }
}

impl Direction {
    /// Local 1/2/3: member axes
    pub fn is_local(self) -> bool {
        matches!(self, Direction::Local1 | Direction::Local2 | Direction::Local3)
    }

    /// X/Y/Z and their projected variants: axes of a non-local system
    pub fn is_axis(self) -> bool {
        matches!(
            self,
            Direction::X
                | Direction::Y
                | Direction::Z
                | Direction::ProjectedX
                | Direction::ProjectedY
                | Direction::ProjectedZ
        )
    }

    /// Gravity and projected gravity: global -Z
    pub fn is_gravity(self) -> bool {
        matches!(self, Direction::Gravity | Direction::ProjectedGravity)
    }
}

/// Coordinate system name passed alongside a direction.
///
/// Serialized as the plain name. Names are case-sensitive: `"global"` is a
/// user-defined system, not [`CoordinateSystem::Global`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CoordinateSystem {
    #[default]
    Global,
    Local,
    /// Any user-defined coordinate system
    Named(String),
}

impl CoordinateSystem {
    pub fn name(&self) -> &str {
        match self {
            CoordinateSystem::Global => "Global",
            CoordinateSystem::Local => "Local",
            CoordinateSystem::Named(name) => name,
        }
    }
}

impl From<&str> for CoordinateSystem {
    fn from(name: &str) -> Self {
        match name {
            "Global" => CoordinateSystem::Global,
            "Local" => CoordinateSystem::Local,
            other => CoordinateSystem::Named(other.to_string()),
        }
    }
}

impl From<String> for CoordinateSystem {
    fn from(name: String) -> Self {
        CoordinateSystem::from(name.as_str())
    }
}

impl From<CoordinateSystem> for String {
    fn from(csys: CoordinateSystem) -> Self {
        csys.name().to_string()
    }
}

impl std::fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether `direction` may be used in `csys`.
pub fn validate_coordinate_system(direction: Direction, csys: &CoordinateSystem) -> bool {
    if direction.is_local() {
        *csys == CoordinateSystem::Local
    } else if direction.is_axis() {
        *csys != CoordinateSystem::Local
    } else {
        *csys == CoordinateSystem::Global
    }
}

/// [`validate_coordinate_system`] as a result, for gating host calls.
pub fn check_coordinate_system(direction: Direction, csys: &CoordinateSystem) -> BotResult<()> {
    if validate_coordinate_system(direction, csys) {
        Ok(())
    } else {
        Err(BotError::incompatible_csys(direction.label(), csys.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_direction_has_one_rule() {
        for &d in Direction::ALL {
            let rules = [d.is_local(), d.is_axis(), d.is_gravity()];
            assert_eq!(rules.iter().filter(|r| **r).count(), 1, "{d}");
        }
    }

    #[test]
    fn test_validator_exhaustive() {
        let systems = [
            CoordinateSystem::Global,
            CoordinateSystem::Local,
            CoordinateSystem::Named("GRID-A".to_string()),
            CoordinateSystem::Named("global".to_string()),
        ];

        for &d in Direction::ALL {
            for csys in &systems {
                let expected = match d.code() {
                    1..=3 => *csys == CoordinateSystem::Local,
                    4..=9 => *csys != CoordinateSystem::Local,
                    10 | 11 => *csys == CoordinateSystem::Global,
                    other => panic!("unexpected direction code {other}"),
                };
                assert_eq!(validate_coordinate_system(d, csys), expected, "{d} in {csys}");
                assert_eq!(check_coordinate_system(d, csys).is_ok(), expected, "{d} in {csys}");
            }
        }
    }

    #[test]
    fn test_specific_cases() {
        let global = CoordinateSystem::Global;
        let local = CoordinateSystem::Local;
        let named = CoordinateSystem::from("Story1");

        assert!(validate_coordinate_system(Direction::Local2, &local));
        assert!(!validate_coordinate_system(Direction::Local2, &global));
        assert!(validate_coordinate_system(Direction::ProjectedY, &named));
        assert!(!validate_coordinate_system(Direction::Z, &local));
        assert!(validate_coordinate_system(Direction::Gravity, &global));
        assert!(!validate_coordinate_system(Direction::ProjectedGravity, &named));
    }

    #[test]
    fn test_rejection_error() {
        let err = check_coordinate_system(Direction::Gravity, &CoordinateSystem::Local).unwrap_err();
        assert_eq!(err, BotError::incompatible_csys("Gravity", "Local"));
    }

    #[test]
    fn test_coordinate_system_names() {
        assert_eq!(CoordinateSystem::from("Global"), CoordinateSystem::Global);
        assert_eq!(CoordinateSystem::from("global"), CoordinateSystem::Named("global".to_string()));
        let json = serde_json::to_string(&CoordinateSystem::Local).unwrap();
        assert_eq!(json, "\"Local\"");
        let parsed: CoordinateSystem = serde_json::from_str("\"Grid 2\"").unwrap();
        assert_eq!(parsed.name(), "Grid 2");
    }
}
