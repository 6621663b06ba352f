//! Filter value object
//!
//! A [`FilterSet`] is an AND of optional predicates. Builders take `Option`s
//! so each list endpoint maps its query parameters one to one; absent and
//! blank inputs add nothing. The set renders itself as bound SQL conditions.

use chrono::{NaiveDate, NaiveTime};
use sqlx::{QueryBuilder, Sqlite};

/// Bound value of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Real(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl FilterValue {
    fn is_blank(&self) -> bool {
        matches!(self, FilterValue::Text(s) if s.trim().is_empty())
    }

    fn push_bind(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            FilterValue::Int(v) => qb.push_bind(*v),
            FilterValue::Real(v) => qb.push_bind(*v),
            FilterValue::Bool(v) => qb.push_bind(*v),
            FilterValue::Text(v) => qb.push_bind(v.clone()),
        };
    }
}

/// Single condition on trusted column names
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: &'static str, value: FilterValue },
    EqIgnoreCase { column: &'static str, value: String },
    AtLeast { column: &'static str, value: FilterValue },
    AtMost { column: &'static str, value: FilterValue },
    /// Case-insensitive substring match on any of `columns`
    Contains { columns: &'static [&'static str], term: String },
}

impl Predicate {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::Eq { column, value } => {
                qb.push(*column).push(" = ");
                value.push_bind(qb);
            }
            Predicate::EqIgnoreCase { column, value } => {
                qb.push("lower(").push(*column).push(") = lower(");
                qb.push_bind(value.clone());
                qb.push(")");
            }
            Predicate::AtLeast { column, value } => {
                qb.push(*column).push(" >= ");
                value.push_bind(qb);
            }
            Predicate::AtMost { column, value } => {
                qb.push(*column).push(" <= ");
                value.push_bind(qb);
            }
            Predicate::Contains { columns, term } => {
                let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                qb.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push("lower(").push(*column).push(") LIKE ");
                    qb.push_bind(pattern.clone());
                    qb.push(" ESCAPE '\\'");
                }
                qb.push(")");
            }
        }
    }
}

fn day_start_millis(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn day_end_millis(day: NaiveDate) -> i64 {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    day.and_time(end).and_utc().timestamp_millis()
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<V: Into<FilterValue>>(self, column: &'static str, value: Option<V>) -> Self {
        self.with_value(value, |value| Predicate::Eq { column, value })
    }

    pub fn eq_ignore_case(mut self, column: &'static str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value.map(Into::into).filter(|v| !v.trim().is_empty()) {
            self.predicates.push(Predicate::EqIgnoreCase { column, value });
        }
        self
    }

    pub fn at_least<V: Into<FilterValue>>(self, column: &'static str, value: Option<V>) -> Self {
        self.with_value(value, |value| Predicate::AtLeast { column, value })
    }

    pub fn at_most<V: Into<FilterValue>>(self, column: &'static str, value: Option<V>) -> Self {
        self.with_value(value, |value| Predicate::AtMost { column, value })
    }

    /// Epoch-millis column at or after midnight UTC of `day`.
    pub fn on_or_after_day(self, column: &'static str, day: Option<NaiveDate>) -> Self {
        self.at_least(column, day.map(day_start_millis))
    }

    /// Epoch-millis column at or before 23:59:59 UTC of `day`.
    pub fn on_or_before_day(self, column: &'static str, day: Option<NaiveDate>) -> Self {
        self.at_most(column, day.map(day_end_millis))
    }

    pub fn contains(
        mut self,
        columns: &'static [&'static str],
        term: Option<impl Into<String>>,
    ) -> Self {
        if let Some(term) = term.map(Into::into) {
            let term = term.trim().to_string();
            if !term.is_empty() && !columns.is_empty() {
                self.predicates.push(Predicate::Contains { columns, term });
            }
        }
        self
    }

    fn with_value<V, F>(mut self, value: Option<V>, make: F) -> Self
    where
        V: Into<FilterValue>,
        F: FnOnce(FilterValue) -> Predicate,
    {
        if let Some(value) = value.map(Into::into).filter(|v| !v.is_blank()) {
            self.predicates.push(make(value));
        }
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append ` AND <predicate>` for every predicate.
    ///
    /// The builder must already be positioned inside a `WHERE` clause.
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for predicate in &self.predicates {
            qb.push(" AND ");
            predicate.push_sql(qb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(filter: &FilterSet) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM t WHERE 1=1");
        filter.push_conditions(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_absent_inputs_add_nothing() {
        let filter = FilterSet::new()
            .eq("is_active", None::<bool>)
            .eq_ignore_case("city", None::<String>)
            .contains(&["name"], None::<String>)
            .at_least("price", None::<f64>);
        assert!(filter.is_empty());
        assert_eq!(render(&filter), "SELECT * FROM t WHERE 1=1");
    }

    #[test]
    fn test_blank_text_is_absent() {
        let filter = FilterSet::new()
            .eq("status", Some(""))
            .eq_ignore_case("city", Some("  "))
            .contains(&["name"], Some("\t"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_renders_bound_conditions_in_order() {
        let filter = FilterSet::new()
            .eq("is_active", Some(true))
            .eq_ignore_case("city", Some("Pune"))
            .at_least("final_price", Some(10.0))
            .at_most("final_price", Some(20.0));

        assert_eq!(
            render(&filter),
            "SELECT * FROM t WHERE 1=1 AND is_active = ? AND lower(city) = lower(?) \
             AND final_price >= ? AND final_price <= ?"
        );
        assert_eq!(filter.predicates().len(), 4);
    }

    #[test]
    fn test_contains_ors_across_columns() {
        let filter = FilterSet::new().contains(&["product_name", "generic_name"], Some(" Para "));
        assert_eq!(
            render(&filter),
            "SELECT * FROM t WHERE 1=1 AND (lower(product_name) LIKE ? ESCAPE '\\' \
             OR lower(generic_name) LIKE ? ESCAPE '\\')"
        );
        assert_eq!(
            filter.predicates()[0],
            Predicate::Contains {
                columns: &["product_name", "generic_name"],
                term: "Para".to_string()
            }
        );
    }

    #[test]
    fn test_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2);
        let filter = FilterSet::new()
            .on_or_after_day("placed_at", day)
            .on_or_before_day("placed_at", day)
            .on_or_before_day("placed_at", None);

        assert_eq!(
            filter.predicates(),
            &[
                Predicate::AtLeast { column: "placed_at", value: FilterValue::Int(1_704_153_600_000) },
                Predicate::AtMost { column: "placed_at", value: FilterValue::Int(1_704_239_999_000) },
            ]
        );
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
