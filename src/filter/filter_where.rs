use serde_json::Value;

/// Accumulates `WHERE` conditions with positional (`$n`) parameters.
#[derive(Debug, Default, Clone)]
pub struct FilterWhere {
    conditions: Vec<String>,
    param_values: Vec<Value>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = $n`; the column must already be a quoted identifier.
    pub fn eq(&mut self, column: &str, value: Value) {
        let param = self.param(value);
        self.conditions.push(format!("{} = {}", column, param));
    }

    /// Case and accent insensitive substring match over `columns`, OR-combined.
    /// The term is bound once and LIKE wildcards in it match literally.
    pub fn search(&mut self, columns: &[String], term: &str) {
        if columns.is_empty() {
            return;
        }
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let param = self.param(Value::String(pattern));
        let alternatives: Vec<String> = columns
            .iter()
            .map(|c| format!("unaccent(LOWER({})) LIKE unaccent({})", c, param))
            .collect();
        self.conditions.push(format!("({})", alternatives.join(" OR ")));
    }

    pub fn to_sql(&self) -> Option<String> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.param_values
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_builder_has_no_clause() {
        assert_eq!(FilterWhere::new().to_sql(), None);
    }

    #[test]
    fn numbers_parameters_in_order() {
        let mut w = FilterWhere::new();
        w.eq("\"users\".\"profile_id\"", json!(4));
        w.search(&["\"users\".\"name\"".to_string(), "\"users\".\"mail\"".to_string()], "Ana");
        assert_eq!(
            w.to_sql().unwrap(),
            "\"users\".\"profile_id\" = $1 AND (unaccent(LOWER(\"users\".\"name\")) LIKE unaccent($2) \
             OR unaccent(LOWER(\"users\".\"mail\")) LIKE unaccent($2))"
        );
        assert_eq!(w.params(), &[json!(4), json!("%ana%")]);
    }

    #[test]
    fn wildcards_in_search_are_escaped() {
        let mut w = FilterWhere::new();
        w.search(&["\"name\"".to_string()], "50%_off");
        assert_eq!(w.params(), &[json!("%50\\%\\_off%")]);
    }
}
