//! Text-valued enums stored in `TEXT` columns.
//!
//! Each enum's string form matches the `CHECK` constraint of the column it is
//! stored in. Rows carry the raw `String`; handlers parse incoming values with
//! [`FromStr`](std::str::FromStr) so invalid input surfaces as a validation error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The string stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {:?}",
                        stringify!($name),
                        [$($val),+]
                    ))),
                }
            }
        }
    };
}

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        NotStarted = "not-started",
        Ongoing = "ongoing",
        Completed = "completed",
    }
}

define_text_enum! {
    /// Approval state of a leave / WFH / OOO request.
    RequestStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

define_text_enum! {
    /// The three request kinds tracked alongside attendance.
    TimeOffKind {
        Leave = "leave",
        WorkFromHome = "wfh",
        OutOfOffice = "ooo",
    }
}

define_text_enum! {
    /// Attendance granularity for a single day.
    AttendanceKind {
        Full = "full",
        Half = "half",
    }
}

define_text_enum! {
    /// Half-day session for half-day leave.
    LeaveSession {
        Forenoon = "forenoon",
        Afternoon = "afternoon",
    }
}

define_text_enum! {
    /// How a project document was delivered.
    DocumentMedium {
        Email = "email",
        Physical = "physical",
        Other = "other",
    }
}

define_text_enum! {
    /// Payment progress of a settlement.
    PaymentStatus {
        Pending = "pending",
        Partial = "partial",
        Completed = "completed",
    }
}

/// Parse an optional text value, mapping `None` through untouched.
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, CoreError>
where
    T: FromStr<Err = CoreError>,
{
    value.map(str::parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_status_round_trips_through_text() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn unknown_value_is_a_validation_error() {
        let err = "archived".parse::<ProjectStatus>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref msg) if msg.contains("archived")));
    }

    #[test]
    fn serde_uses_database_strings() {
        let json = serde_json::to_string(&TimeOffKind::WorkFromHome).unwrap();
        assert_eq!(json, "\"wfh\"");
        let kind: TimeOffKind = serde_json::from_str("\"ooo\"").unwrap();
        assert_eq!(kind, TimeOffKind::OutOfOffice);
    }

    #[test]
    fn parse_optional_passes_none_through() {
        let parsed: Option<LeaveSession> = parse_optional(None).unwrap();
        assert!(parsed.is_none());
        let parsed: Option<LeaveSession> = parse_optional(Some("afternoon")).unwrap();
        assert_eq!(parsed, Some(LeaveSession::Afternoon));
        assert!(parse_optional::<LeaveSession>(Some("evening")).is_err());
    }
}
