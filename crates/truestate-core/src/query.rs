//! # Filter Query Builder
//!
//! Turns [`FilterCriteria`] into a parameterized COUNT query and a
//! parameterized page query.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Criteria → Predicates → SQL                          │
//! │                                                                         │
//! │  FilterCriteria                                                        │
//! │       │  predicates()                                                  │
//! │       ▼                                                                 │
//! │  [NameContains("neha"), OneOf(Region, [East, West]), AgeAtLeast(20)]   │
//! │       │  each renders itself through one shared Binder                 │
//! │       ▼                                                                 │
//! │  WHERE customer_name ILIKE $1                                          │
//! │    AND customer_region IN ($2, $3)                                     │
//! │    AND age >= $4                                                       │
//! │  params = ['%neha%', 'East', 'West', 20]                               │
//! │       │                                                                 │
//! │       ├──► count: SELECT COUNT(*) ... WHERE ...           params       │
//! │       └──► data:  SELECT ... WHERE ... ORDER BY ...                    │
//! │                   LIMIT $5 OFFSET $6                      params+2     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Injection Safety
//! Client values only ever travel as bound parameters. The SQL text is built
//! from `&'static str` column names chosen by enums ([`ListColumn`],
//! [`SortField`](crate::filter::SortField)) and `$n` placeholders.

use chrono::NaiveDate;

use crate::filter::{FilterCriteria, TagMode};

// =============================================================================
// Bound Values
// =============================================================================

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

/// SQL text plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl SqlQuery {
    /// A query without parameters.
    pub fn fixed(sql: &str) -> Self {
        SqlQuery {
            sql: sql.to_string(),
            params: Vec::new(),
        }
    }
}

/// The two statements behind one list request.
///
/// `data.params` always starts with exactly `count.params`; only LIMIT and
/// OFFSET are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub count: SqlQuery,
    pub data: SqlQuery,
}

/// Hands out placeholders and collects their values.
#[derive(Debug, Default)]
struct Binder {
    params: Vec<SqlValue>,
}

impl Binder {
    fn bind(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// Categorical columns that support multi-select filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListColumn {
    CustomerRegion,
    Gender,
    ProductCategory,
    PaymentMethod,
    OrderStatus,
}

impl ListColumn {
    pub const fn name(&self) -> &'static str {
        match self {
            ListColumn::CustomerRegion => "customer_region",
            ListColumn::Gender => "gender",
            ListColumn::ProductCategory => "product_category",
            ListColumn::PaymentMethod => "payment_method",
            ListColumn::OrderStatus => "order_status",
        }
    }
}

/// One condition of the WHERE clause. Predicates are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on `customer_name`.
    NameContains(String),
    /// `column IN (...)`.
    OneOf { column: ListColumn, values: Vec<String> },
    AgeAtLeast(i64),
    AgeAtMost(i64),
    DateFrom(NaiveDate),
    DateTo(NaiveDate),
    /// Substring match of each tag against the serialized tag array.
    ///
    /// The array text form quotes elements holding `"`, `\`, commas or
    /// spaces and backslash-escapes `"` and `\` inside them, so a tag
    /// containing `"` or `\` never matches its own stored value. A term may
    /// also match across element boundaries (`a,b` hits `{a,b}`).
    Tags { tags: Vec<String>, mode: TagMode },
}

impl Predicate {
    fn render(&self, binder: &mut Binder) -> String {
        match self {
            Predicate::NameContains(term) => {
                let p = binder.bind(SqlValue::Text(contains_pattern(term)));
                format!("customer_name ILIKE {p}")
            }
            Predicate::OneOf { column, values } => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| binder.bind(SqlValue::Text(v.clone())))
                    .collect();
                format!("{} IN ({})", column.name(), placeholders.join(", "))
            }
            Predicate::AgeAtLeast(age) => format!("age >= {}", binder.bind(SqlValue::Int(*age))),
            Predicate::AgeAtMost(age) => format!("age <= {}", binder.bind(SqlValue::Int(*age))),
            Predicate::DateFrom(date) => format!("date >= {}", binder.bind(SqlValue::Date(*date))),
            Predicate::DateTo(date) => format!("date <= {}", binder.bind(SqlValue::Date(*date))),
            Predicate::Tags { tags, mode } => {
                let joiner = match mode {
                    TagMode::Any => " OR ",
                    TagMode::All => " AND ",
                };
                let conditions: Vec<String> = tags
                    .iter()
                    .map(|tag| {
                        let p = binder.bind(SqlValue::Text(contains_pattern(tag)));
                        format!("tags::text ILIKE {p}")
                    })
                    .collect();
                format!("({})", conditions.join(joiner))
            }
        }
    }
}

/// Builds the predicate list in composition order.
///
/// Empty lists and absent bounds contribute nothing.
fn predicates(criteria: &FilterCriteria) -> Vec<Predicate> {
    let mut out = Vec::new();

    if let Some(term) = &criteria.search {
        out.push(Predicate::NameContains(term.clone()));
    }

    let lists = [
        (ListColumn::CustomerRegion, &criteria.regions),
        (ListColumn::Gender, &criteria.genders),
        (ListColumn::ProductCategory, &criteria.categories),
        (ListColumn::PaymentMethod, &criteria.payment_methods),
        (ListColumn::OrderStatus, &criteria.order_statuses),
    ];
    for (column, values) in lists {
        if !values.is_empty() {
            out.push(Predicate::OneOf {
                column,
                values: values.clone(),
            });
        }
    }

    if let Some(age) = criteria.age_min {
        out.push(Predicate::AgeAtLeast(age));
    }
    if let Some(age) = criteria.age_max {
        out.push(Predicate::AgeAtMost(age));
    }
    if let Some(date) = criteria.date_from {
        out.push(Predicate::DateFrom(date));
    }
    if let Some(date) = criteria.date_to {
        out.push(Predicate::DateTo(date));
    }

    if !criteria.tags.is_empty() {
        out.push(Predicate::Tags {
            tags: criteria.tags.clone(),
            mode: criteria.tag_mode,
        });
    }

    out
}

/// Wraps a term in `%...%`, escaping LIKE metacharacters so they match
/// literally.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Statements
// =============================================================================

/// Row projection shared by the page and lookup queries.
///
/// Casts pin each column to the wire type `Transaction` decodes, whatever
/// numeric or varchar flavour the ingestion process picked.
pub const TRANSACTION_COLUMNS: &str = "\
id::int8 AS id, \
transaction_id::text AS transaction_id, \
date::date AS date, \
customer_id::text AS customer_id, \
customer_name::text AS customer_name, \
phone_number::text AS phone_number, \
gender::text AS gender, \
age::int4 AS age, \
customer_region::text AS customer_region, \
customer_type::text AS customer_type, \
product_id::text AS product_id, \
product_name::text AS product_name, \
brand::text AS brand, \
product_category::text AS product_category, \
array_remove(tags::text[], NULL) AS tags, \
quantity::int4 AS quantity, \
price_per_unit::float8 AS price_per_unit, \
discount_percentage::float8 AS discount_percentage, \
total_amount::float8 AS total_amount, \
final_amount::float8 AS final_amount, \
payment_method::text AS payment_method, \
order_status::text AS order_status, \
delivery_type::text AS delivery_type, \
store_id::text AS store_id, \
store_location::text AS store_location, \
salesperson_id::text AS salesperson_id, \
employee_name::text AS employee_name";

/// Builds the COUNT and page queries for a list request.
///
/// ## Guarantee
/// Both statements share the same WHERE clause and the same leading
/// parameters, so `total` and the returned page always describe the same row
/// set.
pub fn build_filter_query(criteria: &FilterCriteria) -> FilterQuery {
    let mut binder = Binder::default();

    let conditions: Vec<String> = predicates(criteria)
        .iter()
        .map(|p| p.render(&mut binder))
        .collect();
    let where_clause = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };

    let count = SqlQuery {
        sql: format!("SELECT COUNT(*)::int8 AS total FROM transactions WHERE {where_clause}"),
        params: binder.params.clone(),
    };

    let column = criteria.sort.column();
    let direction = criteria.order.keyword();
    let limit = binder.bind(SqlValue::Int(i64::from(criteria.page_size)));
    let offset = binder.bind(SqlValue::Int(criteria.offset()));

    let data = SqlQuery {
        sql: format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE {where_clause} \
             ORDER BY {column} {direction}, id {direction} LIMIT {limit} OFFSET {offset}"
        ),
        params: binder.params,
    };

    FilterQuery { count, data }
}

/// Lookup by the external `transaction_id`.
pub fn transaction_by_id(transaction_id: &str) -> SqlQuery {
    SqlQuery {
        sql: format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = $1 LIMIT 1"
        ),
        params: vec![SqlValue::Text(transaction_id.to_string())],
    }
}

/// Distinct dropdown values plus age and date ranges.
///
/// `FILTER (WHERE ... IS NOT NULL)` keeps NULL out of the arrays; on an empty
/// table every aggregate except COUNT is NULL.
pub const FILTER_OPTIONS_SQL: &str = r#"
SELECT
    COUNT(*)::int8 AS total_records,
    ARRAY_AGG(DISTINCT customer_region::text ORDER BY customer_region::text)
        FILTER (WHERE customer_region IS NOT NULL) AS regions,
    ARRAY_AGG(DISTINCT gender::text ORDER BY gender::text)
        FILTER (WHERE gender IS NOT NULL) AS genders,
    ARRAY_AGG(DISTINCT product_category::text ORDER BY product_category::text)
        FILTER (WHERE product_category IS NOT NULL) AS categories,
    ARRAY_AGG(DISTINCT payment_method::text ORDER BY payment_method::text)
        FILTER (WHERE payment_method IS NOT NULL) AS payment_methods,
    ARRAY_AGG(DISTINCT order_status::text ORDER BY order_status::text)
        FILTER (WHERE order_status IS NOT NULL) AS order_statuses,
    (
        SELECT ARRAY_AGG(DISTINCT tag ORDER BY tag) FILTER (WHERE tag IS NOT NULL)
        FROM transactions t, UNNEST(t.tags::text[]) AS tag
    ) AS tags,
    MIN(age)::int4 AS min_age,
    MAX(age)::int4 AS max_age,
    MIN(date)::date AS min_date,
    MAX(date)::date AS max_date
FROM transactions
"#;

/// Whole-table aggregates.
pub const SALES_STATS_SQL: &str = r#"
SELECT
    COUNT(*)::int8 AS total_transactions,
    COUNT(DISTINCT customer_id)::int8 AS unique_customers,
    COUNT(DISTINCT product_id)::int8 AS unique_products,
    ROUND(AVG(final_amount)::numeric, 2)::float8 AS avg_amount,
    MIN(final_amount)::float8 AS min_amount,
    MAX(final_amount)::float8 AS max_amount,
    SUM(quantity)::int8 AS total_quantity_sold,
    SUM(final_amount)::float8 AS total_revenue
FROM transactions
"#;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortField, SortOrder};

    fn where_of(sql: &str) -> &str {
        let start = sql.find(" WHERE ").expect("WHERE clause");
        let rest = &sql[start..];
        match rest.find(" ORDER BY ") {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    fn full_criteria() -> FilterCriteria {
        FilterCriteria {
            search: Some("neha".to_string()),
            regions: vec!["East".to_string(), "West".to_string()],
            genders: vec!["Female".to_string()],
            categories: vec!["Electronics".to_string()],
            payment_methods: vec!["UPI".to_string(), "Cash".to_string()],
            order_statuses: vec!["Completed".to_string()],
            age_min: Some(20),
            age_max: Some(50),
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2023, 12, 31),
            tags: vec!["organic".to_string(), "gift".to_string()],
            tag_mode: TagMode::Any,
            sort: SortField::FinalAmount,
            order: SortOrder::Ascending,
            page: 2,
            page_size: 10,
        }
    }

    #[test]
    fn test_no_filters_matches_all() {
        let query = build_filter_query(&FilterCriteria::default());

        assert_eq!(
            query.count.sql,
            "SELECT COUNT(*)::int8 AS total FROM transactions WHERE TRUE"
        );
        assert!(query.count.params.is_empty());
        assert!(query.data.sql.contains("WHERE TRUE ORDER BY date DESC, id DESC LIMIT $1 OFFSET $2"));
        assert_eq!(query.data.params, vec![SqlValue::Int(10), SqlValue::Int(0)]);
    }

    #[test]
    fn test_count_and_data_share_predicates() {
        let query = build_filter_query(&full_criteria());

        assert_eq!(where_of(&query.count.sql), where_of(&query.data.sql));
        let n = query.count.params.len();
        assert_eq!(&query.data.params[..n], &query.count.params[..]);
        assert_eq!(query.data.params.len(), n + 2);
    }

    #[test]
    fn test_count_query_has_no_ordering_or_paging() {
        let query = build_filter_query(&full_criteria());
        assert!(!query.count.sql.contains("ORDER BY"));
        assert!(!query.count.sql.contains("LIMIT"));
        assert!(!query.count.sql.contains("OFFSET"));
    }

    #[test]
    fn test_composition_order_and_placeholders() {
        let query = build_filter_query(&full_criteria());

        assert_eq!(
            where_of(&query.count.sql),
            " WHERE customer_name ILIKE $1 \
             AND customer_region IN ($2, $3) \
             AND gender IN ($4) \
             AND product_category IN ($5) \
             AND payment_method IN ($6, $7) \
             AND order_status IN ($8) \
             AND age >= $9 AND age <= $10 \
             AND date >= $11 AND date <= $12 \
             AND (tags::text ILIKE $13 OR tags::text ILIKE $14)"
        );
        assert_eq!(query.count.params[0], SqlValue::Text("%neha%".to_string()));
        assert_eq!(query.count.params[8], SqlValue::Int(20));
        assert_eq!(
            query.count.params[10],
            SqlValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
        assert!(query
            .data
            .sql
            .ends_with("ORDER BY final_amount ASC, id ASC LIMIT $15 OFFSET $16"));
    }

    #[test]
    fn test_pagination_offset() {
        let criteria = FilterCriteria {
            regions: vec!["East".to_string()],
            page: 2,
            page_size: 10,
            ..Default::default()
        };
        let query = build_filter_query(&criteria);

        let tail = &query.data.params[query.data.params.len() - 2..];
        assert_eq!(tail, &[SqlValue::Int(10), SqlValue::Int(10)]);
    }

    #[test]
    fn test_user_values_never_reach_sql_text() {
        let nasty = "x' OR '1'='1";
        let criteria = FilterCriteria {
            search: Some(nasty.to_string()),
            regions: vec![nasty.to_string()],
            tags: vec![nasty.to_string()],
            ..Default::default()
        };
        let query = build_filter_query(&criteria);

        assert!(!query.count.sql.contains(nasty));
        assert!(!query.data.sql.contains(nasty));
        assert!(query
            .count
            .params
            .contains(&SqlValue::Text(nasty.to_string())));
    }

    #[test]
    fn test_age_bounds_are_independent() {
        let criteria = FilterCriteria {
            age_max: Some(50),
            ..Default::default()
        };
        let query = build_filter_query(&criteria);
        assert!(query.count.sql.ends_with("WHERE age <= $1"));
        assert_eq!(query.count.params, vec![SqlValue::Int(50)]);

        let criteria = FilterCriteria {
            age_min: Some(20),
            age_max: Some(50),
            ..Default::default()
        };
        let query = build_filter_query(&criteria);
        assert!(query.count.sql.ends_with("WHERE age >= $1 AND age <= $2"));
    }

    #[test]
    fn test_tag_modes() {
        let any = FilterCriteria::default().with_tags(vec!["a".into(), "b".into()]);
        assert!(build_filter_query(&any)
            .count
            .sql
            .ends_with("(tags::text ILIKE $1 OR tags::text ILIKE $2)"));

        let all = FilterCriteria {
            tag_mode: TagMode::All,
            ..Default::default()
        }
        .with_tags(vec!["a".into(), "b".into()]);
        assert!(build_filter_query(&all)
            .count
            .sql
            .ends_with("(tags::text ILIKE $1 AND tags::text ILIKE $2)"));
    }

    #[test]
    fn test_more_than_three_tags_equals_first_three() {
        let tags: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let many = FilterCriteria::default().with_tags(tags.clone());
        let three = FilterCriteria::default().with_tags(tags[..3].to_vec());

        assert_eq!(build_filter_query(&many), build_filter_query(&three));
    }

    #[test]
    fn test_invalid_sort_behaves_like_date_desc() {
        let lenient = FilterCriteria {
            sort: SortField::parse("password"),
            order: SortOrder::parse("random"),
            ..Default::default()
        };
        let explicit = FilterCriteria {
            sort: SortField::Date,
            order: SortOrder::Descending,
            ..Default::default()
        };
        assert_eq!(build_filter_query(&lenient), build_filter_query(&explicit));
    }

    #[test]
    fn test_like_metacharacters_escaped() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(contains_pattern("neha"), "%neha%");
    }

    #[test]
    fn test_tags_match_serialized_array_text() {
        let criteria = FilterCriteria::default().with_tags(vec!["a\\b".into(), "say \"hi\"".into()]);
        let query = build_filter_query(&criteria);

        assert!(query
            .count
            .sql
            .ends_with("(tags::text ILIKE $1 OR tags::text ILIKE $2)"));
        // Patterns carry the raw tag, not the array-literal escaping
        assert_eq!(
            query.count.params,
            vec![
                SqlValue::Text("%a\\\\b%".to_string()),
                SqlValue::Text("%say \"hi\"%".to_string()),
            ]
        );
    }

    #[test]
    fn test_transaction_by_id() {
        let query = transaction_by_id("TXN-42");
        assert!(query.sql.ends_with("WHERE transaction_id = $1 LIMIT 1"));
        assert_eq!(query.params, vec![SqlValue::Text("TXN-42".to_string())]);
    }
}
