//! Employee CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{Employee, EmployeeEnvelope, EmployeeListResponse, EmployeePayload, UserResponse};
use crate::AppState;

use super::error::ApiError;
use super::query::{build_query, ListEmployeesParams};
use super::validation::{validate_employee_update, validate_new_employee};

/// List employees, paginated, filtered and sorted per query parameters.
///
/// GET /api/employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListEmployeesParams>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    let spec = build_query(&params);
    let page = state.employees.list(&spec).await?;

    Ok(Json(EmployeeListResponse {
        employees: page.employees,
        current_page: spec.page,
        total_pages: page.total_pages,
        total_employees: page.total,
    }))
}

/// Create a new employee
///
/// POST /api/employees
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    user: UserResponse,
    Json(payload): Json<EmployeePayload>,
) -> Result<(StatusCode, Json<EmployeeEnvelope>), ApiError> {
    let new = validate_new_employee(payload).map_err(ApiError::validation)?;
    let employee = state.employees.create(new).await?;

    tracing::info!(employee_id = %employee.id, user = %user.email, "Employee created");

    Ok((
        StatusCode::CREATED,
        Json(EmployeeEnvelope {
            message: "Employee created successfully".to_string(),
            employee,
        }),
    ))
}

/// Get a single employee by id
///
/// GET /api/employees/:id
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    _user: UserResponse,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let employee = state.employees.get(&id).await?;
    Ok(Json(employee))
}

/// Update an employee. Email is immutable: a payload naming it is rejected
/// outright, even when the value matches the stored one.
///
/// PUT /api/employees/:id
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    user: UserResponse,
    Path(id): Path<String>,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    if payload.email.is_some() {
        return Err(ApiError::immutable_field("Email cannot be updated"));
    }

    let update = validate_employee_update(payload).map_err(ApiError::invalid_record)?;
    let employee = state.employees.update(&id, update).await?;

    tracing::info!(employee_id = %employee.id, user = %user.email, "Employee updated");

    Ok(Json(EmployeeEnvelope {
        message: "Employee updated successfully".to_string(),
        employee,
    }))
}

/// Delete an employee, returning the removed record's snapshot
///
/// DELETE /api/employees/:id
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    user: UserResponse,
    Path(id): Path<String>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let employee = state.employees.delete(&id).await?;

    tracing::info!(employee_id = %id, user = %user.email, "Employee deleted");

    Ok(Json(EmployeeEnvelope {
        message: "Employee deleted successfully".to_string(),
        employee,
    }))
}
