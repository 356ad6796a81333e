use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(RdvStatus {
    Pending => "pending",
    Complete => "complete",
});

impl RdvStatus {
    /// Lenient decode: anything the backend sends that is not a known
    /// completion marker is treated as pending, matching the screens'
    /// `status || "pending"` tolerance.
    pub fn decode(raw: Option<&str>) -> Self {
        match raw {
            Some("complete") | Some("terminé") | Some("termine") => Self::Complete,
            _ => Self::Pending,
        }
    }
}

str_enum!(DeclarationCategory {
    Medical => "medical",
    Administrative => "administrative",
    Other => "other",
});

impl DeclarationCategory {
    /// Category a declaration type falls in, for the list filters.
    pub fn of_type(declaration_type: &str) -> Self {
        match declaration_type.to_lowercase().as_str() {
            "hospitalisation" | "consultation" | "urgence" => Self::Medical,
            "certificat" | "attestation" | "demande" => Self::Administrative,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rdv_status_round_trip() {
        for (variant, s) in [
            (RdvStatus::Pending, "pending"),
            (RdvStatus::Complete, "complete"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(RdvStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn rdv_status_decode_is_lenient() {
        assert_eq!(RdvStatus::decode(Some("complete")), RdvStatus::Complete);
        assert_eq!(RdvStatus::decode(Some("en attente")), RdvStatus::Pending);
        assert_eq!(RdvStatus::decode(None), RdvStatus::Pending);
    }

    #[test]
    fn declaration_categories() {
        assert_eq!(
            DeclarationCategory::of_type("Hospitalisation"),
            DeclarationCategory::Medical
        );
        assert_eq!(
            DeclarationCategory::of_type("certificat"),
            DeclarationCategory::Administrative
        );
        assert_eq!(
            DeclarationCategory::of_type("birth"),
            DeclarationCategory::Other
        );
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(RdvStatus::from_str("unknown").is_err());
        assert!(DeclarationCategory::from_str("").is_err());
    }
}
