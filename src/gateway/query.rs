//! Fetch query language understood by the record gateway.
//!
//! Serializes to the gateway's parameter shape: `fields`, `where` (ANDed predicates),
//! `whereGroups` (sub-groups combined by the group operator), `orderBy`, `pagingInfo`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::calendar::RelativeWindow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSelector>,
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_info: Option<Paging>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    Contains,
    RelativeMatch,
    ExactMatch,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

/// Granularity of an `ExactMatch` on a date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubOperator {
    Day,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(
        rename = "SubOperator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_operator: Option<SubOperator>,
    #[serde(rename = "Values", default)]
    pub values: Vec<Value>,
}

impl Predicate {
    fn new(field: &str, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field_name: field.to_string(),
            operator,
            sub_operator: None,
            values,
        }
    }

    pub fn equal_to(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, vec![value.into()])
    }

    pub fn contains(field: &str, text: &str) -> Self {
        Self::new(field, Operator::Contains, vec![Value::from(text)])
    }

    pub fn relative(field: &str, window: RelativeWindow) -> Self {
        Self::new(
            field,
            Operator::RelativeMatch,
            vec![Value::from(window.as_filter_value())],
        )
    }

    /// Match one calendar day, sent as `YYYY-MM-DD`.
    pub fn on_day(field: &str, day: NaiveDate) -> Self {
        Self {
            sub_operator: Some(SubOperator::Day),
            ..Self::new(
                field,
                Operator::ExactMatch,
                vec![Value::from(day.format("%Y-%m-%d").to_string())],
            )
        }
    }

    pub fn in_year(field: &str, year: i32) -> Self {
        Self {
            sub_operator: Some(SubOperator::Year),
            ..Self::new(field, Operator::ExactMatch, vec![Value::from(year.to_string())])
        }
    }

    pub fn at_least(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanOrEqualTo, vec![value.into()])
    }

    pub fn at_most(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanOrEqualTo, vec![value.into()])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// A disjunction (or conjunction) of condition groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereGroup {
    pub operator: GroupOperator,
    pub sub_groups: Vec<ConditionGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub operator: GroupOperator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortType {
    /// Parse "asc"/"desc" in any case; anything else keeps the default.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            SortType::Asc
        } else {
            SortType::Desc
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub sorttype: SortType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

impl FetchQuery {
    /// Query selecting the given storage fields.
    pub fn select(fields: &[&str]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|name| FieldSelector {
                    field: FieldName {
                        name: (*name).to_string(),
                    },
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Require `text` to appear in at least one of `fields`.
    pub fn search_any(mut self, fields: &[&str], text: &str) -> Self {
        self.where_groups.push(WhereGroup {
            operator: GroupOperator::Or,
            sub_groups: fields
                .iter()
                .map(|field| ConditionGroup {
                    conditions: vec![Condition {
                        field_name: (*field).to_string(),
                        operator: Operator::Contains,
                        values: vec![Value::from(text)],
                    }],
                    operator: GroupOperator::Or,
                })
                .collect(),
        });
        self
    }

    pub fn order(mut self, field: &str, sorttype: SortType) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.to_string(),
            sorttype,
        });
        self
    }

    /// One page of `limit` records; pages are 1-based.
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.paging_info = Some(Paging {
            limit,
            offset: page.max(1).saturating_sub(1).saturating_mul(limit),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_to_gateway_shape() {
        let query = FetchQuery::select(&["Name", "status_c"])
            .filter(Predicate::equal_to("status_c", "Connected"))
            .filter(Predicate::relative("created_at_c", RelativeWindow::LastDays(30)))
            .order("created_at_c", SortType::Desc)
            .page(2, 20);

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "fields": [
                    { "field": { "Name": "Name" } },
                    { "field": { "Name": "status_c" } }
                ],
                "where": [
                    { "FieldName": "status_c", "Operator": "EqualTo", "Values": ["Connected"] },
                    { "FieldName": "created_at_c", "Operator": "RelativeMatch", "Values": ["last 30 days"] }
                ],
                "orderBy": [ { "fieldName": "created_at_c", "sorttype": "DESC" } ],
                "pagingInfo": { "limit": 20, "offset": 20 }
            })
        );
    }

    #[test]
    fn test_search_any_builds_or_group() {
        let query = FetchQuery::default().search_any(&["website_url_c", "category_c"], "fin");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value["whereGroups"][0],
            json!({
                "operator": "OR",
                "subGroups": [
                    { "conditions": [ { "fieldName": "website_url_c", "operator": "Contains", "values": ["fin"] } ], "operator": "OR" },
                    { "conditions": [ { "fieldName": "category_c", "operator": "Contains", "values": ["fin"] } ], "operator": "OR" }
                ]
            })
        );
    }

    #[test]
    fn test_exact_match_carries_sub_operator() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let value = serde_json::to_value(Predicate::on_day("created_at_c", day)).unwrap();
        assert_eq!(value["SubOperator"], "Day");
        assert_eq!(value["Values"], json!(["2026-10-19"]));

        let year = serde_json::to_value(Predicate::in_year("created_at_c", 2025)).unwrap();
        assert_eq!(year["SubOperator"], "Year");
        assert_eq!(year["Values"], json!(["2025"]));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let query = FetchQuery::default().page(0, 20);
        assert_eq!(query.paging_info, Some(Paging { limit: 20, offset: 0 }));
    }

    #[test]
    fn test_sort_type_parse() {
        assert_eq!(SortType::parse("asc"), SortType::Asc);
        assert_eq!(SortType::parse("ASC"), SortType::Asc);
        assert_eq!(SortType::parse("sideways"), SortType::Desc);
    }
}
