use sqlx::{Postgres, QueryBuilder};

use super::{Comparison, Operand, Predicate, NUMERIC_PATTERN};
use crate::filter::Operation;

impl Predicate {
    /// Appends the predicate to a query that selects from a table with
    /// `name TEXT` and `properties JSONB` columns, `properties` holding a
    /// JSON array of `{"key", "value"}` objects.
    ///
    /// Event name, keys and values are all pushed as bind parameters.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push("name = ");
        builder.push_bind(self.event_name.clone());

        for comparison in &self.comparisons {
            builder.push(" AND ");
            comparison.push_sql(builder);
        }
    }
}

impl Comparison {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(
            "EXISTS (SELECT 1 FROM jsonb_array_elements(properties) AS p WHERE p->>'key' = ",
        );
        builder.push_bind(self.key.to_string());
        builder.push(" AND ");

        match &self.operand {
            Operand::Text(value) => {
                match self.operation {
                    Operation::Like => builder.push("strpos(p->>'value', "),
                    Operation::Ne => builder.push("p->>'value' <> "),
                    _ => builder.push("p->>'value' = "),
                };
                builder.push_bind(value.clone());

                if self.operation == Operation::Like {
                    builder.push(") > 0");
                }
            }
            Operand::Numeric(value) => {
                builder.push(format!(
                    "CASE WHEN p->>'value' ~ '{NUMERIC_PATTERN}' THEN (p->>'value')::numeric {} ",
                    sql_operator(self.operation)
                ));
                builder.push_bind(*value);
                builder.push(" ELSE false END");
            }
        }

        builder.push(")");
    }
}

fn sql_operator(operation: Operation) -> &'static str {
    match operation {
        Operation::Gt => ">",
        Operation::Gte => ">=",
        Operation::Lt => "<",
        Operation::Lte => "<=",
        Operation::Ne => "<>",
        Operation::Eq | Operation::Like => "=",
    }
}
