use sqlparser::{
    ast::{
        self, BinaryOperator, Expr, SelectItem, SetExpr, Statement as SqlStatement, TableFactor,
        TableObject, UnaryOperator, Value as SqlValue,
    },
    dialect::SQLiteDialect,
    parser::Parser,
};

use crate::{
    executor::predicate::{ComparisonOp, Predicate},
    planner::statement::{Projection, Statement},
    storage::schema,
    types::{
        error::{DatabaseError, Result},
        value::Value,
    },
};

pub struct SqlParser;

impl SqlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one statement of the restricted dialect. CREATE TABLE goes
    /// through the schema catalog's own DDL parser (the dialect's TEXT(n) and
    /// NULLABLE forms are not standard SQL); INSERT and SELECT parse via
    /// sqlparser.
    pub fn parse(&self, sql: &str) -> Result<Statement> {
        let first_keyword = sql.split_whitespace().next().unwrap_or("");
        if first_keyword.eq_ignore_ascii_case("CREATE") {
            let table_schema = schema::parse_create_table(sql)?;
            return Ok(Statement::CreateTable {
                schema: table_schema,
            });
        }

        let dialect = SQLiteDialect {};
        let statements = Parser::parse_sql(&dialect, sql)?;
        if statements.len() != 1 {
            return Err(DatabaseError::SqlParseError {
                details: "expected exactly one statement".to_string(),
            });
        }

        match &statements[0] {
            SqlStatement::Insert(insert) => self.to_insert(insert),
            SqlStatement::Query(query) => self.to_select(query),
            other => Err(DatabaseError::UnsupportedStatement {
                details: format!("{}", other),
            }),
        }
    }

    fn to_insert(&self, insert: &ast::Insert) -> Result<Statement> {
        let table_name = match &insert.table {
            TableObject::TableName(name) => name.to_string(),
            other => {
                return Err(DatabaseError::UnsupportedStatement {
                    details: format!("INSERT target {}", other),
                });
            }
        };
        if !insert.columns.is_empty() {
            return Err(DatabaseError::UnsupportedStatement {
                details: "INSERT with explicit column list".to_string(),
            });
        }
        let source = insert
            .source
            .as_ref()
            .ok_or_else(|| DatabaseError::SqlParseError {
                details: "INSERT without VALUES".to_string(),
            })?;
        let values = match source.body.as_ref() {
            SetExpr::Values(values) => values,
            _ => {
                return Err(DatabaseError::UnsupportedStatement {
                    details: "INSERT source other than VALUES".to_string(),
                });
            }
        };
        if values.rows.is_empty() {
            return Err(DatabaseError::SqlParseError {
                details: "empty VALUES list".to_string(),
            });
        }
        let mut rows = Vec::with_capacity(values.rows.len());
        for row in &values.rows {
            let literals: Result<Vec<Value>> = row.iter().map(literal_value).collect();
            rows.push(literals?);
        }
        Ok(Statement::Insert { table_name, rows })
    }

    fn to_select(&self, query: &ast::Query) -> Result<Statement> {
        let select = match query.body.as_ref() {
            SetExpr::Select(select) => select,
            _ => {
                return Err(DatabaseError::UnsupportedStatement {
                    details: "non-SELECT query body".to_string(),
                });
            }
        };
        if select.from.len() != 1 || !select.from[0].joins.is_empty() {
            return Err(DatabaseError::UnsupportedStatement {
                details: "SELECT must target exactly one table".to_string(),
            });
        }
        let table_name = match &select.from[0].relation {
            TableFactor::Table { name, .. } => name.to_string(),
            other => {
                return Err(DatabaseError::UnsupportedStatement {
                    details: format!("FROM {}", other),
                });
            }
        };

        let projection = self.to_projection(&select.projection)?;
        let predicate = match &select.selection {
            Some(expr) => Some(to_predicate(expr)?),
            None => None,
        };

        Ok(Statement::Select {
            table_name,
            projection,
            predicate,
        })
    }

    fn to_projection(&self, items: &[SelectItem]) -> Result<Projection> {
        if items.len() == 1 {
            if let SelectItem::Wildcard(_) = items[0] {
                return Ok(Projection::All);
            }
        }
        let mut columns = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                    columns.push(ident.value.clone());
                }
                other => {
                    return Err(DatabaseError::UnsupportedStatement {
                        details: format!("projection {}", other),
                    });
                }
            }
        }
        Ok(Projection::Columns(columns))
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// WHERE clauses are restricted to `<column> <op> <literal>`.
fn to_predicate(expr: &Expr) -> Result<Predicate> {
    let Expr::BinaryOp { left, op, right } = expr else {
        return Err(DatabaseError::UnsupportedStatement {
            details: format!("WHERE clause {}", expr),
        });
    };
    let Expr::Identifier(ident) = left.as_ref() else {
        return Err(DatabaseError::UnsupportedStatement {
            details: "WHERE must compare a column against a literal".to_string(),
        });
    };
    let op = match op {
        BinaryOperator::Eq => ComparisonOp::Equal,
        BinaryOperator::NotEq => ComparisonOp::NotEqual,
        BinaryOperator::Lt => ComparisonOp::LessThan,
        BinaryOperator::LtEq => ComparisonOp::LessThanOrEqual,
        BinaryOperator::Gt => ComparisonOp::GreaterThan,
        BinaryOperator::GtEq => ComparisonOp::GreaterThanOrEqual,
        other => {
            return Err(DatabaseError::UnsupportedStatement {
                details: format!("comparison operator {}", other),
            });
        }
    };
    let value = literal_value(right)?;
    Ok(Predicate::new(ident.value.clone(), op, value))
}

fn literal_value(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Value(SqlValue::Number(repr, _)) => parse_number(repr),
        Expr::Value(SqlValue::SingleQuotedString(s)) => Ok(Value::Text(s.clone())),
        Expr::Value(SqlValue::Null) => Ok(Value::Null),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match literal_value(expr)? {
            Value::Integer(i) => Ok(Value::Integer(-i)),
            Value::Real(r) => Ok(Value::Real(-r)),
            _ => Err(DatabaseError::SqlParseError {
                details: "unary minus on non-numeric literal".to_string(),
            }),
        },
        other => Err(DatabaseError::SqlParseError {
            details: format!("malformed literal {}", other),
        }),
    }
}

fn parse_number(repr: &str) -> Result<Value> {
    if repr.contains(['.', 'e', 'E']) {
        let real: f64 = repr.parse().map_err(|_| DatabaseError::SqlParseError {
            details: format!("invalid numeric literal '{}'", repr),
        })?;
        return Ok(Value::Real(real));
    }
    repr.parse::<i64>()
        .map(Value::Integer)
        .or_else(|_| repr.parse::<f64>().map(Value::Real))
        .map_err(|_| DatabaseError::SqlParseError {
            details: format!("invalid numeric literal '{}'", repr),
        })
}
