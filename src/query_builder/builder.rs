use super::WhereClause;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};

/// Parameter list kept in the same order as the placeholders written into the SQL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParameters {
    values: Vec<String>,
}

impl BoundParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value and return its placeholder
    pub fn push(&mut self, value: &str) -> String {
        self.values.push(value.to_string());
        format!("${}", self.values.len())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// SQL text plus the values for its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub parameters: BoundParameters,
}

impl BoundQuery {
    /// Prepare a typed query with every parameter bound in placeholder order
    pub fn query_as<'q, O>(&'q self) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        self.parameters
            .values()
            .iter()
            .fold(sqlx::query_as::<_, O>(&self.sql), |query, value| {
                query.bind(value.as_str())
            })
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Raw(String),
    Clause(WhereClause),
    InSubquery {
        field: String,
        subquery: Box<QueryBuilder>,
    },
}

/// Minimal SELECT builder whose filters share one parameter list
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_table: String,
    select_fields: Vec<String>,
    joins: Vec<String>,
    filters: Vec<Filter>,
    group_by: Vec<String>,
    order_by: Vec<String>,
}

impl QueryBuilder {
    /// Create a new query builder for the given table
    pub fn new(table: &str) -> Self {
        Self {
            base_table: table.to_string(),
            select_fields: vec!["*".to_string()],
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Set specific fields to select
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Add an INNER JOIN
    pub fn inner_join(mut self, table: &str, on_condition: &str) -> Self {
        self.joins
            .push(format!("INNER JOIN {table} ON {on_condition}"));
        self
    }

    /// Add a literal condition that carries no parameters
    pub fn where_raw(mut self, sql: &str) -> Self {
        self.filters.push(Filter::Raw(sql.to_string()));
        self
    }

    /// Add a parameterized condition tree
    pub fn where_clause(mut self, clause: WhereClause) -> Self {
        self.filters.push(Filter::Clause(clause));
        self
    }

    /// Add `field IN (subquery)`, numbering the subquery parameters in line with ours
    pub fn where_in_subquery(mut self, field: &str, subquery: QueryBuilder) -> Self {
        self.filters.push(Filter::InSubquery {
            field: field.to_string(),
            subquery: Box::new(subquery),
        });
        self
    }

    /// Add GROUP BY clause
    pub fn group_by(mut self, fields: &[&str]) -> Self {
        self.group_by.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    /// Add ORDER BY ASC
    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by.push(format!("{field} ASC"));
        self
    }

    /// Add ORDER BY DESC
    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by.push(format!("{field} DESC"));
        self
    }

    pub fn build(&self) -> BoundQuery {
        let mut parameters = BoundParameters::new();
        let sql = self.build_sql(&mut parameters);
        BoundQuery { sql, parameters }
    }

    fn build_sql(&self, params: &mut BoundParameters) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_fields.join(", "),
            self.base_table
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.filters.is_empty() {
            let where_parts: Vec<String> = self
                .filters
                .iter()
                .map(|filter| match filter {
                    Filter::Raw(raw) => raw.clone(),
                    Filter::Clause(clause) => clause.to_sql(params),
                    Filter::InSubquery { field, subquery } => {
                        format!("{field} IN ({})", subquery.build_sql(params))
                    }
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }

        sql
    }
}
