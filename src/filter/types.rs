use serde::Deserialize;

/// List parameters shared by every collection endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub order: Option<String>,
    pub sort: Option<String>,
}

impl Filter {
    /// Trimmed search text, if any.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::parse(self.order.as_deref())
    }

    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::from_filter(self)
    }

    /// Caps a positive `limit` to `max_limit`; returns whether it was capped.
    pub fn cap_limit(&mut self, max_limit: Option<i64>) -> bool {
        match (self.limit, max_limit) {
            (Some(limit), Some(max)) if limit > max => {
                self.limit = Some(max);
                true
            }
            _ => false,
        }
    }
}

/// The user list also narrows by profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub filter: Filter,
    pub profile_id: Option<i64>,
}

impl UserFilter {
    /// Zero or negative means "any profile".
    pub fn profile_id(&self) -> Option<i64> {
        self.profile_id.filter(|id| *id > 0)
    }
}

impl From<Filter> for UserFilter {
    fn from(filter: Filter) -> Self {
        Self { filter, profile_id: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Paginates only with a positive `limit`; `page` defaults to 1.
    pub fn from_filter(filter: &Filter) -> Option<Self> {
        let limit = filter.limit.filter(|l| *l > 0)?;
        let page = filter.page.filter(|p| *p > 0).unwrap_or(1);
        Some(Self {
            limit,
            offset: (page - 1).saturating_mul(limit),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}
