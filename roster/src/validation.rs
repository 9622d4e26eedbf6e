//! Field validation for submitted forms.
//!
//! Validation runs before any persistence call. It never fails fast: every field is checked
//! and all failures are returned together so the form can show each message next to its field.

use crate::api::models::items::ItemForm;
use crate::api::models::people::{PersonForm, PersonInput, PersonUpdate};
use chrono::NaiveDate;
use serde::Serialize;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 30;

/// Accepted date-of-birth formats: ISO (what `<input type="date">` sends) and `dd/mm/yyyy`.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// One failed constraint on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All constraint failures of a submission, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub(crate) fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Messages grouped by field name, the shape the form templates index into
    pub fn by_field(&self) -> std::collections::BTreeMap<&'static str, Vec<String>> {
        let mut map = std::collections::BTreeMap::new();
        for error in &self.0 {
            map.entry(error.field).or_insert_with(Vec::new).push(error.message.clone());
        }
        map
    }
}

pub fn validate_name(name: &str, errors: &mut ValidationErrors) {
    let chars = name.chars().count();
    if chars == 0 {
        errors.add("name", "Name should not be empty");
    } else if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        errors.add(
            "name",
            format!("Name should be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        );
    }
}

pub fn validate_age(age: &str, errors: &mut ValidationErrors) -> Option<i32> {
    match age.trim().parse::<i32>() {
        Ok(age) if age >= 0 => Some(age),
        Ok(_) => {
            errors.add("age", "Age should be 0 or greater");
            None
        }
        Err(_) => {
            errors.add("age", "Age should be a whole number");
            None
        }
    }
}

pub fn validate_email(email: &str, errors: &mut ValidationErrors) {
    if email.is_empty() {
        errors.add("email", "Email should not be empty");
    } else if !is_valid_email(email) {
        errors.add("email", "Email should be valid");
    }
}

pub fn validate_date_of_birth(raw: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok());
    if parsed.is_none() {
        errors.add("date_of_birth", "Date of birth should look like 31/12/1990");
    }
    parsed
}

/// Syntax check for `local@domain`.
///
/// The local part allows the RFC 5322 atom characters separated by single dots. The domain
/// is one or more dot-separated labels of letters, digits and inner hyphens.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let local_ok = local.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c))
    });

    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    local_ok && domain_ok
}

impl PersonForm {
    /// Check every field and produce the typed input, or every failure found
    pub fn validate(&self) -> Result<PersonInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        let email = self.email.trim();
        validate_name(name, &mut errors);
        let age = validate_age(&self.age, &mut errors);
        validate_email(email, &mut errors);
        let date_of_birth = validate_date_of_birth(&self.date_of_birth, &mut errors);

        let items: Vec<String> = self
            .items
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        match age {
            Some(age) if errors.is_empty() => Ok(PersonInput {
                name: name.to_string(),
                age,
                email: email.to_string(),
                date_of_birth,
                items,
            }),
            _ => Err(errors),
        }
    }

    /// Check only the fields an edit can change. Date of birth and items are ignored.
    pub fn validate_update(&self) -> Result<PersonUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        let email = self.email.trim();
        validate_name(name, &mut errors);
        let age = validate_age(&self.age, &mut errors);
        validate_email(email, &mut errors);

        match age {
            Some(age) if errors.is_empty() => Ok(PersonUpdate {
                name: name.to_string(),
                age,
                email: email.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

impl ItemForm {
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let item_name = self.item_name.trim();
        if item_name.is_empty() {
            let mut errors = ValidationErrors::default();
            errors.add("item_name", "Item name should not be empty");
            return Err(errors);
        }
        Ok(item_name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, age: &str, email: &str) -> PersonForm {
        PersonForm {
            name: name.to_string(),
            age: age.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_boundaries() {
        let errors = form("", "20", "a@b.com").validate().unwrap_err();
        assert!(errors.has("name"));
        assert_eq!(errors.len(), 1);

        let errors = form("A", "20", "a@b.com").validate().unwrap_err();
        assert!(errors.has("name"));

        assert!(form("Al", "20", "a@b.com").validate().is_ok());
        assert!(form(&"x".repeat(30), "20", "a@b.com").validate().is_ok());
        assert!(form(&"x".repeat(31), "20", "a@b.com").validate().is_err());
    }

    #[test]
    fn test_name_length_counts_characters_not_bytes() {
        // Two Cyrillic letters are four bytes
        assert!(form("Ян", "20", "a@b.com").validate().is_ok());
    }

    #[test]
    fn test_age_boundaries() {
        let errors = form("Bob", "-1", "a@b.com").validate().unwrap_err();
        assert!(errors.has("age"));
        assert!(!errors.has("name"));

        let input = form("Bob", "0", "a@b.com").validate().unwrap();
        assert_eq!(input.age, 0);

        let errors = form("Bob", "twelve", "a@b.com").validate().unwrap_err();
        assert!(errors.has("age"));
    }

    #[test]
    fn test_email_syntax() {
        assert!(form("Bob", "1", "not-an-email").validate().unwrap_err().has("email"));
        assert!(form("Bob", "1", "").validate().unwrap_err().has("email"));
        assert!(form("Bob", "1", "a@b.com").validate().is_ok());

        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("two@@signs.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email(".dot@start.com"));
        assert!(!is_valid_email("dot..twice@x.com"));
        assert!(!is_valid_email("space in@x.com"));
        assert!(!is_valid_email("a@-bad.com"));
        assert!(!is_valid_email("a@empty..label"));
    }

    #[test]
    fn test_all_failures_reported_together() {
        let errors = form("", "-5", "nope").validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "age", "email"]);
        assert_eq!(errors.by_field()["name"], vec!["Name should not be empty".to_string()]);
    }

    #[test]
    fn test_date_of_birth_formats() {
        let mut f = form("Bob", "30", "a@b.com");
        f.date_of_birth = "24/12/1994".to_string();
        assert_eq!(f.validate().unwrap().date_of_birth, NaiveDate::from_ymd_opt(1994, 12, 24));

        f.date_of_birth = "1994-12-24".to_string();
        assert_eq!(f.validate().unwrap().date_of_birth, NaiveDate::from_ymd_opt(1994, 12, 24));

        f.date_of_birth = "".to_string();
        assert_eq!(f.validate().unwrap().date_of_birth, None);

        f.date_of_birth = "31/02/1994".to_string();
        assert!(f.validate().unwrap_err().has("date_of_birth"));
    }

    #[test]
    fn test_item_lines_are_trimmed_and_blank_lines_dropped() {
        let mut f = form("Bob", "30", "a@b.com");
        f.items = "  Book \n\n Lamp\r\n".to_string();
        assert_eq!(f.validate().unwrap().items, vec!["Book".to_string(), "Lamp".to_string()]);
    }

    #[test]
    fn test_update_ignores_date_of_birth_and_items() {
        let mut f = form(" Zedd ", "5", "z@x.com");
        f.date_of_birth = "garbage".to_string();
        f.items = "Book".to_string();
        assert!(f.validate().unwrap_err().has("date_of_birth"));

        let update = f.validate_update().unwrap();
        assert_eq!(
            update,
            PersonUpdate {
                name: "Zedd".to_string(),
                age: 5,
                email: "z@x.com".to_string(),
            }
        );

        let errors = form("Z", "-1", "nope").validate_update().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "age", "email"]);
    }

    #[test]
    fn test_item_form() {
        assert_eq!(ItemForm { item_name: " Kettle ".into() }.validate().unwrap(), "Kettle");
        assert!(ItemForm::default().validate().unwrap_err().has("item_name"));
    }
}
