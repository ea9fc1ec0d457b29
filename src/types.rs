/// Shared enumerations used across the data model.
///
/// Every enum is stored as a lowercase `VARCHAR` in Postgres and travels as a
/// lowercase JSON string. `VALUES` lists the wire spellings for request
/// validation.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[serde(rename_all = "lowercase")]
        #[sqlx(type_name = "varchar", rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "'{}' is not one of: {}",
                        other,
                        Self::VALUES.join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Account role resolved for every authenticated request
    Role { Admin => "admin", Teacher => "teacher", Parent => "parent" }
}

string_enum! {
    StudentStatus { Active => "active", Inactive => "inactive", Transferred => "transferred" }
}

string_enum! {
    AttendanceStatus { Present => "present", Absent => "absent", Late => "late" }
}

string_enum! {
    AssignmentStatus { Active => "active", Completed => "completed", Cancelled => "cancelled" }
}

string_enum! {
    SubmissionStatus { Pending => "pending", Submitted => "submitted", Graded => "graded" }
}

string_enum! {
    FeeFrequency { Monthly => "monthly", Quarterly => "quarterly", Annual => "annual" }
}

string_enum! {
    PaymentMethod { Cash => "cash", Card => "card", Online => "online" }
}

string_enum! {
    PaymentStatus { Pending => "pending", Completed => "completed", Failed => "failed" }
}

string_enum! {
    NotificationType { Academic => "academic", Fee => "fee", Attendance => "attendance", General => "general" }
}

impl Default for Role {
    fn default() -> Self {
        Role::Parent
    }
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        AssignmentStatus::Active
    }
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        SubmissionStatus::Pending
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_spelling() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("late".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Late);
        assert!("Teacher".parse::<Role>().is_err());
    }

    #[test]
    fn rejection_lists_allowed_values() {
        let err = "weekly".parse::<FeeFrequency>().unwrap_err();
        assert!(err.contains("monthly, quarterly, annual"), "{}", err);
    }

    #[test]
    fn serializes_lowercase() {
        let v = serde_json::to_value(PaymentMethod::Online).unwrap();
        assert_eq!(v, serde_json::json!("online"));
        assert_eq!(StudentStatus::default(), StudentStatus::Active);
        assert_eq!(PaymentStatus::default().as_str(), "completed");
    }
}
