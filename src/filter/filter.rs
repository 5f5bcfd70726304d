use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Filter, FilterOrderInfo, Pagination, SqlResult};

/// Columns a listing searches and sorts on.
#[derive(Debug, Clone, Copy)]
pub struct FilterColumns {
    /// Qualified columns (`table.column`) matched by `search`.
    pub search: &'static [&'static str],
    /// Column names accepted by `sort`.
    pub sortable: &'static [&'static str],
}

/// Builds a parameterised list query for one table.
pub struct FilterQuery {
    table_name: String,
    joins: Vec<&'static str>,
    where_data: FilterWhere,
    order_data: Option<FilterOrderInfo>,
    pagination: Option<Pagination>,
}

impl FilterQuery {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(table_name));
        }
        Ok(Self {
            table_name,
            joins: vec![],
            where_data: FilterWhere::new(),
            order_data: None,
            pagination: None,
        })
    }

    /// Applies search, sort and pagination from `filter`.
    pub fn assign(mut self, filter: &Filter, columns: &FilterColumns) -> Result<Self, FilterError> {
        if let Some(term) = filter.search_term() {
            let search_columns = columns
                .search
                .iter()
                .map(|c| quote_column(c))
                .collect::<Result<Vec<_>, _>>()?;
            self.where_data.search(&search_columns, term);
        }
        self.order_data = Some(FilterOrder::resolve(filter, columns.sortable)?);
        self.pagination = filter.pagination();
        Ok(self)
    }

    /// Adds a join clause written by the caller.
    pub fn join(mut self, clause: &'static str) -> Self {
        self.joins.push(clause);
        self
    }

    pub fn where_eq(mut self, column: &str, value: Value) -> Result<Self, FilterError> {
        let column = quote_column(column)?;
        self.where_data.eq(&column, value);
        Ok(self)
    }

    pub fn to_sql(&self, select: &str) -> SqlResult {
        let order_clause = self
            .order_data
            .as_ref()
            .map(|info| FilterOrder::generate(info, Some(&self.table_name)))
            .unwrap_or_default();
        let limit_clause = self
            .pagination
            .map(|p| format!("LIMIT {} OFFSET {}", p.limit, p.offset))
            .unwrap_or_default();

        let query = [
            format!("SELECT {}", select),
            self.from_clause(),
            self.where_clause(),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.where_data.params().to_vec() }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let query = [
            "SELECT COUNT(*) AS count".to_string(),
            self.from_clause(),
            self.where_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.where_data.params().to_vec() }
    }

    fn from_clause(&self) -> String {
        let mut from = format!("FROM \"{}\"", self.table_name);
        for join in &self.joins {
            from.push(' ');
            from.push_str(join);
        }
        from
    }

    fn where_clause(&self) -> String {
        self.where_data
            .to_sql()
            .map(|w| format!("WHERE {}", w))
            .unwrap_or_default()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quotes `column` or `table.column` after validating each part.
fn quote_column(column: &str) -> Result<String, FilterError> {
    let parts: Vec<&str> = column.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
        return Err(FilterError::InvalidColumn(column.to_string()));
    }
    Ok(parts
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PRODUCT_COLUMNS: FilterColumns = FilterColumns {
        search: &["product.name"],
        sortable: &["id", "name"],
    };

    #[test]
    fn rejects_bad_table_names() {
        assert!(FilterQuery::new("product").is_ok());
        assert!(matches!(FilterQuery::new("product; DROP"), Err(FilterError::InvalidTableName(_))));
        assert!(matches!(FilterQuery::new("1abc"), Err(FilterError::InvalidTableName(_))));
    }

    #[test]
    fn plain_listing_orders_by_id() {
        let query = FilterQuery::new("product")
            .unwrap()
            .assign(&Filter::default(), &PRODUCT_COLUMNS)
            .unwrap();
        let sql = query.to_sql("*");
        assert_eq!(sql.query, "SELECT * FROM \"product\" ORDER BY \"product\".\"id\" ASC");
        assert!(sql.params.is_empty());
        assert_eq!(query.to_count_sql().query, "SELECT COUNT(*) AS count FROM \"product\"");
    }

    #[test]
    fn search_sort_and_page() {
        let filter = Filter {
            search: Some("Rice".to_string()),
            page: Some(2),
            limit: Some(5),
            order: Some("desc".to_string()),
            sort: Some("name".to_string()),
        };
        let query = FilterQuery::new("product")
            .unwrap()
            .assign(&filter, &PRODUCT_COLUMNS)
            .unwrap();

        let sql = query.to_sql("\"product\".*");
        assert_eq!(
            sql.query,
            "SELECT \"product\".* FROM \"product\" \
             WHERE (unaccent(LOWER(\"product\".\"name\")) LIKE unaccent($1)) \
             ORDER BY \"product\".\"name\" DESC LIMIT 5 OFFSET 5"
        );
        assert_eq!(sql.params, vec![json!("%rice%")]);

        // counting ignores order and pagination
        let count = query.to_count_sql();
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM \"product\" \
             WHERE (unaccent(LOWER(\"product\".\"name\")) LIKE unaccent($1))"
        );
        assert_eq!(count.params, vec![json!("%rice%")]);
    }

    #[test]
    fn joins_and_equality() {
        let query = FilterQuery::new("users")
            .unwrap()
            .join("JOIN \"profiles\" ON \"profiles\".\"id\" = \"users\".\"profile_id\"")
            .where_eq("users.profile_id", json!(2))
            .unwrap();
        assert_eq!(
            query.to_count_sql().query,
            "SELECT COUNT(*) AS count FROM \"users\" \
             JOIN \"profiles\" ON \"profiles\".\"id\" = \"users\".\"profile_id\" \
             WHERE \"users\".\"profile_id\" = $1"
        );
    }

    #[test]
    fn rejects_unknown_sort_and_bad_columns() {
        let filter = Filter { sort: Some("secret".to_string()), ..Filter::default() };
        let err = FilterQuery::new("product").unwrap().assign(&filter, &PRODUCT_COLUMNS).err();
        assert_eq!(err, Some(FilterError::InvalidColumn("secret".to_string())));

        let err = FilterQuery::new("users").unwrap().where_eq("a.b.c", json!(1)).err();
        assert_eq!(err, Some(FilterError::InvalidColumn("a.b.c".to_string())));
    }
}
