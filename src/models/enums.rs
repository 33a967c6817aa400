use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Patient => "patient",
    Caregiver => "caregiver",
    Pharmacist => "pharmacist",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(Frequency {
    Once => "once",
    Twice => "twice",
    Thrice => "thrice",
    Custom => "custom",
});

// `Pending` is a legal stored value but is not reportable through the
// log-append operation (see reminders::append_log).
str_enum!(ReminderAction {
    Took => "took",
    Missed => "missed",
    Snoozed => "snoozed",
    Pending => "pending",
});
