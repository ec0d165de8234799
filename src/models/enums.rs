use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(RecordType {
    Appointment => "appointment",
    LabOrder => "lab_order",
    Prescription => "prescription",
    Billing => "billing",
    ChatInteraction => "chat_interaction",
    DischargeSummary => "discharge_summary",
    PatientInfo => "patient_info",
});

str_enum!(AuditAction {
    Store => "STORE",
});

str_enum!(ActorRole {
    System => "SYSTEM",
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(AuditStatus {
    Success => "success",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn record_type_round_trip() {
        for (variant, s) in [
            (RecordType::Appointment, "appointment"),
            (RecordType::LabOrder, "lab_order"),
            (RecordType::Prescription, "prescription"),
            (RecordType::Billing, "billing"),
            (RecordType::ChatInteraction, "chat_interaction"),
            (RecordType::DischargeSummary, "discharge_summary"),
            (RecordType::PatientInfo, "patient_info"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(RecordType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn record_type_serde_matches_column_value() {
        let json = serde_json::to_string(&RecordType::LabOrder).unwrap();
        assert_eq!(json, "\"lab_order\"");
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let err = RecordType::from_str("x_ray").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn audit_action_uses_upper_case_label() {
        assert_eq!(AuditAction::Store.as_str(), "STORE");
        assert_eq!(AuditAction::from_str("STORE").unwrap(), AuditAction::Store);
    }
}
