use super::builder::BoundParameters;
use crate::models::TaskRecord;

/// Task columns a predicate can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Package,
    Action,
    TargetVersion,
}

impl Column {
    /// Qualified column name inside the pending agent subquery
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Package => "p.name",
            Self::Action => "t2.action",
            Self::TargetVersion => "t2.to_version",
        }
    }

    fn value_of<'a>(&self, task: &'a TaskRecord) -> Option<&'a str> {
        match self {
            Self::Package => Some(&task.package),
            Self::Action => Some(task.action.as_str()),
            Self::TargetVersion => task.target_version.as_version(),
        }
    }
}

/// Leaf or nested node of a task predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq { column: Column, value: String },
    In { column: Column, values: Vec<String> },
    IsNull { column: Column },
    Group(WhereClause),
}

impl Condition {
    /// Lower to SQL, registering a bound parameter for every placeholder as it is written
    pub fn to_sql(&self, params: &mut BoundParameters) -> String {
        match self {
            Condition::Eq { column, value } => {
                format!("{} = {}", column.sql_name(), params.push(value))
            }
            Condition::In { column, values } => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let placeholders = values
                    .iter()
                    .map(|value| params.push(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} IN ({placeholders})", column.sql_name())
            }
            Condition::IsNull { column } => format!("{} IS NULL", column.sql_name()),
            Condition::Group(clause) => clause.to_sql(params),
        }
    }

    /// Evaluate against a task with SQL NULL semantics for a missing target version
    pub fn matches(&self, task: &TaskRecord) -> bool {
        match self {
            Condition::Eq { column, value } => column.value_of(task) == Some(value.as_str()),
            Condition::In { column, values } => column
                .value_of(task)
                .is_some_and(|actual| values.iter().any(|value| value == actual)),
            Condition::IsNull { column } => column.value_of(task).is_none(),
            Condition::Group(clause) => clause.matches(task),
        }
    }
}

/// Conditions joined by a single logical operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl WhereClause {
    /// Combine multiple conditions with AND
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::And,
        }
    }

    /// Combine multiple conditions with OR
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            operator: LogicalOperator::Or,
        }
    }

    pub fn eq(column: Column, value: impl Into<String>) -> Condition {
        Condition::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn in_values(column: Column, values: Vec<String>) -> Condition {
        Condition::In { column, values }
    }

    pub fn is_null(column: Column) -> Condition {
        Condition::IsNull { column }
    }

    pub fn into_condition(self) -> Condition {
        Condition::Group(self)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Convert to SQL with numbered placeholders
    pub fn to_sql(&self, params: &mut BoundParameters) -> String {
        if self.conditions.is_empty() {
            return match self.operator {
                LogicalOperator::And => "TRUE".to_string(),
                LogicalOperator::Or => "FALSE".to_string(),
            };
        }

        if self.conditions.len() == 1 {
            return self.conditions[0].to_sql(params);
        }

        let operator_str = match self.operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
        };

        let condition_sqls: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| condition.to_sql(params))
            .collect();

        format!("({})", condition_sqls.join(operator_str))
    }

    pub fn matches(&self, task: &TaskRecord) -> bool {
        match self.operator {
            LogicalOperator::And => self.conditions.iter().all(|c| c.matches(task)),
            LogicalOperator::Or => self.conditions.iter().any(|c| c.matches(task)),
        }
    }
}
