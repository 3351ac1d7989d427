use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::{Film, User};

/// No film can predate the Lumiere brothers' first screening.
pub static EARLIEST_RELEASE_DATE: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1895, 12, 28).unwrap());

// Local part and domain without whitespace, exactly one '@' between them.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());

/// Check a film payload against the field rules. Every violated rule is
/// reported, joined into a single validation error.
pub fn validate_film(film: &Film) -> AppResult<()> {
    let mut errors = Vec::new();

    if film.name.trim().is_empty() {
        errors.push("Film name must not be blank".to_string());
    }

    if film.description.chars().count() > 200 {
        errors.push("Film description must not exceed 200 characters".to_string());
    }

    match film.release_date {
        None => errors.push("Film release date is required".to_string()),
        Some(date) if date < *EARLIEST_RELEASE_DATE => {
            errors.push("Film release date must not be before 1895-12-28".to_string())
        }
        _ => {}
    }

    match film.duration {
        None => errors.push("Film duration is required".to_string()),
        Some(minutes) if minutes <= 0 => {
            errors.push("Film duration must be a positive number of minutes".to_string())
        }
        _ => {}
    }

    if film.mpa.is_none() {
        errors.push("Film MPA rating is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("\n")))
    }
}

/// Check a user payload against the field rules. A blank display name is
/// not an error; the API layer substitutes the login before persisting.
pub fn validate_user(user: &User) -> AppResult<()> {
    let mut errors = Vec::new();

    if user.email.trim().is_empty() {
        errors.push("User email must not be blank".to_string());
    } else if !EMAIL_RE.is_match(&user.email) {
        errors.push("User email must be a valid address with a single @".to_string());
    }

    if user.login.trim().is_empty() {
        errors.push("User login must not be blank".to_string());
    } else if user.login.chars().any(char::is_whitespace) {
        errors.push("User login must not contain whitespace".to_string());
    }

    match user.birthday {
        None => errors.push("User birthday is required".to_string()),
        Some(date) if date > Utc::now().date_naive() => {
            errors.push("User birthday must not be in the future".to_string())
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("\n")))
    }
}
