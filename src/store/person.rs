//! Person record and validation module
//!
//! Defines the single domain entity plus the raw form-input type that
//! request handlers hand to the store. Validation happens here, at write
//! time; persisted records are trusted on read.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;
use crate::http::form::FormData;

/// A persisted person record. The id is assigned by the store at
/// creation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub mobile: String,
}

/// Gender enumeration, serialized with the exact spellings the forms use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    /// Parse a form value. Exact match only, no case folding: the select
    /// options send these exact strings.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw field values as they arrived in a form body. Absent fields stay
/// `None`; `validate` decides what that means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonInput {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub mobile: Option<String>,
}

impl PersonInput {
    /// Pick the person fields out of a parsed form body. Unknown form
    /// fields (like `_method`) are simply not part of the input.
    pub fn from_form(form: &FormData) -> Self {
        Self {
            name: form.get("name").map(ToString::to_string),
            age: form.get("age").map(ToString::to_string),
            gender: form.get("gender").map(ToString::to_string),
            mobile: form.get("mobile").map(ToString::to_string),
        }
    }

    /// Check every field constraint and produce the validated field set,
    /// or the first violation found. Field order matches the form.
    pub fn validate(&self) -> Result<ValidatedFields, ValidationError> {
        let name = match self.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Err(ValidationError::required("name")),
        };

        let age = match self.age.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match raw.parse::<i64>() {
                Ok(n) if n < 0 => {
                    return Err(ValidationError::new("age", "must be 0 or greater"))
                }
                Ok(n) => u32::try_from(n)
                    .map_err(|_| ValidationError::new("age", "is out of range"))?,
                Err(_) => return Err(ValidationError::new("age", "must be a whole number")),
            },
            _ => return Err(ValidationError::required("age")),
        };

        let gender = match self.gender.as_deref() {
            Some(raw) => Gender::parse(raw).ok_or_else(|| {
                ValidationError::new("gender", "must be one of Male, Female, Other")
            })?,
            None => return Err(ValidationError::required("gender")),
        };

        let mobile = match self.mobile.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => return Err(ValidationError::required("mobile")),
        };

        Ok(ValidatedFields {
            name,
            age,
            gender,
            mobile,
        })
    }
}

impl From<&Person> for PersonInput {
    /// Pre-fill a form with a record's current values (edit view).
    fn from(person: &Person) -> Self {
        Self {
            name: Some(person.name.clone()),
            age: Some(person.age.to_string()),
            gender: Some(person.gender.as_str().to_string()),
            mobile: Some(person.mobile.clone()),
        }
    }
}

/// The four person fields after validation, ready for the store to
/// attach an id to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub mobile: String,
}

impl ValidatedFields {
    /// Build the persisted record with a store-assigned id.
    pub fn into_person(self, id: String) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            gender: self.gender,
            mobile: self.mobile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> PersonInput {
        PersonInput {
            name: Some("Ana".to_string()),
            age: Some("30".to_string()),
            gender: Some("Female".to_string()),
            mobile: Some("555-0100".to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        let fields = valid_input().validate().expect("input should validate");
        assert_eq!(fields.name, "Ana");
        assert_eq!(fields.age, 30);
        assert_eq!(fields.gender, Gender::Female);
        assert_eq!(fields.mobile, "555-0100");
    }

    #[test]
    fn test_validate_rejects_missing_name() {
        let mut input = valid_input();
        input.name = None;
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "name");

        input.name = Some("   ".to_string());
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_validate_rejects_negative_age() {
        let mut input = valid_input();
        input.age = Some("-1".to_string());
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "age");
        assert!(err.reason.contains("0 or greater"));
    }

    #[test]
    fn test_validate_rejects_non_numeric_age() {
        let mut input = valid_input();
        input.age = Some("thirty".to_string());
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "age");
    }

    #[test]
    fn test_validate_rejects_unknown_gender() {
        let mut input = valid_input();
        input.gender = Some("female".to_string()); // wrong case is not a member
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "gender");
    }

    #[test]
    fn test_validate_rejects_missing_mobile() {
        let mut input = valid_input();
        input.mobile = None;
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "mobile");
    }

    #[test]
    fn test_gender_roundtrip_strings() {
        for gender in Gender::ALL {
            assert_eq!(Gender::parse(gender.as_str()), Some(gender));
        }
        assert_eq!(Gender::parse("Unknown"), None);
    }

    #[test]
    fn test_person_serializes_gender_spelling() {
        let person = valid_input()
            .validate()
            .unwrap()
            .into_person("test-id".to_string());
        let json = serde_json::to_string(&person).unwrap();
        assert!(json.contains(r#""gender":"Female""#));
    }
}
