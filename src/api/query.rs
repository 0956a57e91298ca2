//! List query normalization.
//!
//! Turns the raw `page`/`limit`/`department`/`position`/`sortBy`/`order`
//! parameters into a [`QuerySpec`] the store can run verbatim. Building a
//! spec never fails: anything unusable falls back to its default.

use serde::Deserialize;

use crate::db::{QuerySpec, SortOrder};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_SORT_COLUMN: &str = "created_at";

/// Wire name -> column name for every sortable field. `sortBy` values
/// outside this table fall back to the default sort key.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("email", "email"),
    ("position", "position"),
    ("department", "department"),
    ("salary", "salary"),
    ("hireDate", "hire_date"),
    ("isActive", "is_active"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

/// Raw query parameters accepted by the list endpoint.
///
/// The numeric parameters arrive as strings so that a non-numeric value
/// falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmployeesParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Normalize raw list parameters into a query spec.
pub fn build_query(params: &ListEmployeesParams) -> QuerySpec {
    let page = parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
    // No upper bound on limit: clients may request arbitrarily large pages.
    let limit = parse_positive(params.limit.as_deref()).unwrap_or(DEFAULT_LIMIT);

    let sort_column = params
        .sort_by
        .as_deref()
        .and_then(|name| SORT_COLUMNS.iter().find(|(wire, _)| *wire == name))
        .map(|(_, column)| *column)
        .unwrap_or(DEFAULT_SORT_COLUMN);

    let order = match params.order.as_deref() {
        Some("asc") => SortOrder::Ascending,
        _ => SortOrder::Descending,
    };

    QuerySpec {
        department: params.department.clone().filter(|d| !d.is_empty()),
        position: params.position.clone().filter(|p| !p.is_empty()),
        sort_column,
        order,
        page,
        limit,
        skip: (page - 1) * limit,
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok()).filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let spec = build_query(&ListEmployeesParams::default());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 10);
        assert_eq!(spec.skip, 0);
        assert_eq!(spec.sort_column, "created_at");
        assert_eq!(spec.order, SortOrder::Descending);
        assert!(spec.department.is_none());
        assert!(spec.position.is_none());
    }

    #[test]
    fn test_defaults_when_non_numeric_or_non_positive() {
        let spec = build_query(&ListEmployeesParams {
            page: Some("abc".to_string()),
            limit: Some("0".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, 10);

        let spec = build_query(&ListEmployeesParams {
            page: Some("-3".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.page, 1);
    }

    #[test]
    fn test_skip_offset() {
        let spec = build_query(&ListEmployeesParams {
            page: Some("3".to_string()),
            limit: Some("5".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.page, 3);
        assert_eq!(spec.limit, 5);
        assert_eq!(spec.skip, 10);
    }

    #[test]
    fn test_equality_filters() {
        let spec = build_query(&ListEmployeesParams {
            department: Some("R&D".to_string()),
            position: Some("Engineer".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.department.as_deref(), Some("R&D"));
        assert_eq!(spec.position.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_empty_filter_values_are_ignored() {
        let spec = build_query(&ListEmployeesParams {
            department: Some(String::new()),
            ..Default::default()
        });
        assert!(spec.department.is_none());
    }

    #[test]
    fn test_sort_by_known_field() {
        let spec = build_query(&ListEmployeesParams {
            sort_by: Some("salary".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.sort_column, "salary");
        assert_eq!(spec.order, SortOrder::Ascending);

        let spec = build_query(&ListEmployeesParams {
            sort_by: Some("hireDate".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.sort_column, "hire_date");
    }

    #[test]
    fn test_unknown_sort_field_falls_back() {
        let spec = build_query(&ListEmployeesParams {
            sort_by: Some("salary; DROP TABLE employees".to_string()),
            ..Default::default()
        });
        assert_eq!(spec.sort_column, "created_at");
    }

    #[test]
    fn test_order_anything_but_asc_is_descending() {
        for order in ["desc", "ASC", "ascending", ""] {
            let spec = build_query(&ListEmployeesParams {
                order: Some(order.to_string()),
                ..Default::default()
            });
            assert_eq!(spec.order, SortOrder::Descending, "order={:?}", order);
        }
    }
}
