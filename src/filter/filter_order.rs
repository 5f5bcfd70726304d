use super::error::FilterError;
use super::types::{Filter, FilterOrderInfo};

pub struct FilterOrder;

impl FilterOrder {
    pub const DEFAULT_COLUMN: &'static str = "id";

    /// Resolves `sort`/`order` against the columns a listing allows.
    /// No sort means `id`, so paging stays stable.
    pub fn resolve(filter: &Filter, sortable: &[&str]) -> Result<FilterOrderInfo, FilterError> {
        let column = match filter.sort.as_deref().map(str::trim) {
            None | Some("") => Self::DEFAULT_COLUMN,
            Some(requested) => sortable
                .iter()
                .copied()
                .find(|c| c.eq_ignore_ascii_case(requested))
                .ok_or_else(|| FilterError::InvalidColumn(requested.to_string()))?,
        };

        Ok(FilterOrderInfo {
            column: column.to_string(),
            sort: filter.direction(),
        })
    }

    /// `ORDER BY` clause; the column is qualified with `qualifier` when given.
    pub fn generate(info: &FilterOrderInfo, qualifier: Option<&str>) -> String {
        let column = match qualifier {
            Some(q) => format!("\"{}\".\"{}\"", q, info.column),
            None => format!("\"{}\"", info.column),
        };
        format!("ORDER BY {} {}", column, info.sort.to_sql())
    }
}
