//! Schema validation for employee payloads.
//!
//! Checks run in a fixed field order (name, email, position, department,
//! salary, hireDate) and stop at the first violation, so an invalid payload
//! always reports exactly one reason.

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{EmployeePayload, EmployeeUpdate, NewEmployee};

lazy_static! {
    /// Regex for validating email syntax
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Validate a short text field (name, position, department)
fn validate_text_field(field: &str, value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len < 2 {
        return Err(format!("{} must be at least 2 characters", field));
    }
    if len > 50 {
        return Err(format!("{} must be at most 50 characters", field));
    }
    Ok(())
}

/// Validate email syntax
pub fn validate_email(email: &str) -> Result<(), String> {
    if !EMAIL_REGEX.is_match(email) {
        return Err("email must be a valid email address".to_string());
    }
    Ok(())
}

fn validate_salary(salary: f64) -> Result<(), String> {
    if salary < 0.0 {
        return Err("salary must be a non-negative number".to_string());
    }
    Ok(())
}

/// Validate an ISO-8601 hire date, either a plain date or a full timestamp
fn validate_hire_date(value: &str) -> Result<(), String> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Ok(());
    }
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(());
    }
    Err("hireDate must be an ISO-8601 date".to_string())
}

/// Check a creation payload field by field, stopping at the first violation.
pub fn validate_new_employee(payload: EmployeePayload) -> Result<NewEmployee, String> {
    let name = payload.name.ok_or_else(|| "name is required".to_string())?;
    validate_text_field("name", &name)?;

    let email = payload.email.ok_or_else(|| "email is required".to_string())?;
    validate_email(&email)?;

    let position = payload
        .position
        .ok_or_else(|| "position is required".to_string())?;
    validate_text_field("position", &position)?;

    let department = payload
        .department
        .ok_or_else(|| "department is required".to_string())?;
    validate_text_field("department", &department)?;

    let salary = payload
        .salary
        .ok_or_else(|| "salary is required".to_string())?;
    validate_salary(salary)?;

    if let Some(ref hire_date) = payload.hire_date {
        validate_hire_date(hire_date)?;
    }

    Ok(NewEmployee {
        name,
        email,
        position,
        department,
        salary,
        hire_date: payload.hire_date,
        is_active: payload.is_active.unwrap_or(true),
    })
}

/// Check an update payload. Only present fields are validated; the caller
/// rejects payloads naming `email` before this runs.
pub fn validate_employee_update(payload: EmployeePayload) -> Result<EmployeeUpdate, String> {
    if let Some(ref name) = payload.name {
        validate_text_field("name", name)?;
    }
    if let Some(ref position) = payload.position {
        validate_text_field("position", position)?;
    }
    if let Some(ref department) = payload.department {
        validate_text_field("department", department)?;
    }
    if let Some(salary) = payload.salary {
        validate_salary(salary)?;
    }
    if let Some(ref hire_date) = payload.hire_date {
        validate_hire_date(hire_date)?;
    }

    Ok(EmployeeUpdate {
        name: payload.name,
        position: payload.position,
        department: payload.department,
        salary: payload.salary,
        hire_date: payload.hire_date,
        is_active: payload.is_active,
    })
}
