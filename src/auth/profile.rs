use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::{AuthUser, ProfileError};

const AGE_RANGE: RangeInclusive<i32> = 0..=120;
const GRADUATION_YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;

/// A row of the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub school: Option<String>,
    pub education_program: Option<String>,
    pub graduation_year: Option<i32>,
}

/// The account details form as typed; numeric fields arrive as text and may
/// be left empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub school: String,
    pub education_program: String,
    pub graduation_year: String,
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_bounded(
    raw: &str,
    range: RangeInclusive<i32>,
    err: ProfileError,
) -> Result<Option<i32>, ProfileError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i32>() {
        Ok(value) if range.contains(&value) => Ok(Some(value)),
        _ => Err(err),
    }
}

impl ProfileForm {
    /// Local checks, in the order the form reports them. The username
    /// uniqueness check needs the backend and runs afterwards.
    pub fn validate(&self, user: Option<&AuthUser>) -> Result<Profile, ProfileError> {
        let user = user.ok_or(ProfileError::NotAuthenticated)?;

        if self.username.trim().is_empty() {
            return Err(ProfileError::UsernameRequired);
        }
        if !is_valid_username(&self.username) {
            return Err(ProfileError::UsernameInvalid);
        }
        let age = parse_bounded(&self.age, AGE_RANGE, ProfileError::InvalidAge)?;
        let graduation_year = parse_bounded(
            &self.graduation_year,
            GRADUATION_YEAR_RANGE,
            ProfileError::InvalidGraduationYear,
        )?;

        Ok(Profile {
            id: user.id.clone(),
            username: Some(self.username.clone()),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            age,
            school: Some(self.school.clone()),
            education_program: Some(self.education_program.clone()),
            graduation_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: "user-1".into(),
            email: Some("a@b.c".into()),
        }
    }

    fn form(username: &str) -> ProfileForm {
        ProfileForm {
            username: username.into(),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn requires_a_signed_in_user_first() {
        let err = form("").validate(None).unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated.");
    }

    #[test]
    fn username_rules() {
        let user = user();
        assert!(matches!(
            form("   ").validate(Some(&user)),
            Err(ProfileError::UsernameRequired)
        ));
        assert!(matches!(
            form("bad name").validate(Some(&user)),
            Err(ProfileError::UsernameInvalid)
        ));
        assert!(matches!(
            form(" padded").validate(Some(&user)),
            Err(ProfileError::UsernameInvalid)
        ));
        assert!(form("good_Name_42").validate(Some(&user)).is_ok());
    }

    #[test]
    fn numeric_fields_are_optional_but_bounded() {
        let user = user();
        let mut input = form("student");
        assert_eq!(input.validate(Some(&user)).unwrap().age, None);

        input.age = "121".into();
        assert_eq!(
            input.validate(Some(&user)).unwrap_err().to_string(),
            "Please enter a valid age."
        );
        input.age = "abc".into();
        assert!(matches!(input.validate(Some(&user)), Err(ProfileError::InvalidAge)));
        input.age = "0".into();

        input.graduation_year = "1899".into();
        assert_eq!(
            input.validate(Some(&user)).unwrap_err().to_string(),
            "Please enter a valid graduation year."
        );
        input.graduation_year = "2026".into();

        let profile = input.validate(Some(&user)).unwrap();
        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.age, Some(0));
        assert_eq!(profile.graduation_year, Some(2026));
    }

    #[test]
    fn age_is_checked_before_graduation_year() {
        let mut input = form("student");
        input.age = "-1".into();
        input.graduation_year = "3000".into();
        assert!(matches!(
            input.validate(Some(&user())),
            Err(ProfileError::InvalidAge)
        ));
    }
}
