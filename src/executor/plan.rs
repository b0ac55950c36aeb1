//! Evaluation plans for minirel
//!
//! A query is executed through a small relational-algebra tree: a table scan
//! at the leaf, an optional equality-conjunction filter, and a projection on
//! top. Plans run in two modes: `pipeline` yields row handles (DELETE needs
//! handles so indices and base rows can both be removed), `evaluate` yields
//! materialized projected rows (SELECT).

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::sql::ast::{BinaryOperator, Expr, Literal};
use crate::storage::{Handle, Row, Value};

/// An evaluation plan node
#[derive(Debug, Clone)]
pub enum EvalPlan {
    /// Scan every row of a relation
    TableScan { table: String },
    /// Keep only rows matching an equality conjunction
    Select {
        predicate: Row,
        child: Box<EvalPlan>,
    },
    /// Project rows onto the given columns; empty means all columns
    Project {
        columns: Vec<String>,
        child: Box<EvalPlan>,
    },
    /// Probe an index for an equality key, then apply the residual bindings.
    /// Produced by `optimize`, never built directly from a statement.
    IndexProbe {
        table: String,
        index: String,
        key: Row,
        residual: Row,
    },
}

impl EvalPlan {
    /// Rewrite the plan without changing its result: predicates stay pushed
    /// against their scan, and a `Select` directly over a `TableScan` becomes
    /// an index probe when a single-column index covers one of its bindings.
    pub fn optimize(self, catalog: &mut Catalog) -> Result<EvalPlan> {
        match self {
            EvalPlan::Project { columns, child } => Ok(EvalPlan::Project {
                columns,
                child: Box::new(child.optimize(catalog)?),
            }),
            EvalPlan::Select { predicate, child } => {
                let child = child.optimize(catalog)?;
                if let EvalPlan::TableScan { table } = &child {
                    for index_name in catalog.get_index_names(table)? {
                        let index = catalog.get_index(table, &index_name)?;
                        let key_columns = index.key_columns();
                        if key_columns.len() != 1 {
                            continue;
                        }
                        let column = key_columns[0].clone();
                        let mut residual = predicate.clone();
                        if let Some(value) = residual.remove(&column) {
                            let mut key = Row::new();
                            key.insert(column, value);
                            return Ok(EvalPlan::IndexProbe {
                                table: table.clone(),
                                index: index_name,
                                key,
                                residual,
                            });
                        }
                    }
                }
                Ok(EvalPlan::Select {
                    predicate,
                    child: Box::new(child),
                })
            }
            other => Ok(other),
        }
    }

    /// Run the plan for its handles, without materializing projected rows
    pub fn pipeline(&self, catalog: &mut Catalog) -> Result<(String, Vec<Handle>)> {
        match self {
            EvalPlan::TableScan { table } => {
                let relation = catalog.get_table(table)?;
                Ok((table.clone(), relation.select(None)?))
            }
            EvalPlan::Select { predicate, child } => {
                if let EvalPlan::TableScan { table } = child.as_ref() {
                    let relation = catalog.get_table(table)?;
                    return Ok((table.clone(), relation.select(Some(predicate))?));
                }
                let (table, handles) = child.pipeline(catalog)?;
                let relation = catalog.get_table(&table)?;
                let mut matched = Vec::new();
                for handle in handles {
                    let row = relation.project(handle, None)?;
                    if row_matches(&row, predicate) {
                        matched.push(handle);
                    }
                }
                Ok((table, matched))
            }
            EvalPlan::Project { child, .. } => child.pipeline(catalog),
            EvalPlan::IndexProbe {
                table,
                index,
                key,
                residual,
            } => {
                let handles = catalog.get_index(table, index)?.lookup(key)?;
                if residual.is_empty() {
                    return Ok((table.clone(), handles));
                }
                let relation = catalog.get_table(table)?;
                let mut matched = Vec::new();
                for handle in handles {
                    let row = relation.project(handle, None)?;
                    if row_matches(&row, residual) {
                        matched.push(handle);
                    }
                }
                Ok((table.clone(), matched))
            }
        }
    }

    /// Run the plan and materialize its projected rows
    pub fn evaluate(&self, catalog: &mut Catalog) -> Result<Vec<Row>> {
        let (columns, inner): (Option<&[String]>, &EvalPlan) = match self {
            EvalPlan::Project { columns, child } => {
                let columns = if columns.is_empty() {
                    None
                } else {
                    Some(columns.as_slice())
                };
                (columns, child.as_ref())
            }
            other => (None, other),
        };
        let (table, handles) = inner.pipeline(catalog)?;
        let relation = catalog.get_table(&table)?;
        let mut rows = Vec::with_capacity(handles.len());
        for handle in handles {
            rows.push(relation.project(handle, columns)?);
        }
        Ok(rows)
    }
}

fn row_matches(row: &Row, predicate: &Row) -> bool {
    predicate
        .iter()
        .all(|(column, value)| row.get(column).map_or(false, |stored| stored == value))
}

/// Flatten a WHERE tree into column-to-value bindings. Accepts nested AND
/// conjunctions of `column = literal`; anything else is unsupported.
pub fn where_conjunction(expr: &Expr) -> Result<Row> {
    match expr {
        Expr::Nested(inner) => where_conjunction(inner),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            let mut bindings = where_conjunction(left)?;
            bindings.extend(where_conjunction(right)?);
            Ok(bindings)
        }
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => {
            let column = match left.as_ref() {
                Expr::Column(name) => name.clone(),
                other => {
                    return Err(Error::UnsupportedPredicate(format!(
                        "left side of '=' must be a column, got {:?}",
                        other
                    )))
                }
            };
            let value = match right.as_ref() {
                Expr::Literal(Literal::Integer(n)) => {
                    Value::Integer(i32::try_from(*n).map_err(|_| Error::TypeMismatch {
                        column: column.clone(),
                        expected: "INT".to_string(),
                    })?)
                }
                Expr::Literal(Literal::String(s)) => Value::Text(s.clone()),
                other => {
                    return Err(Error::UnsupportedPredicate(format!(
                        "right side of '=' must be a literal, got {:?}",
                        other
                    )))
                }
            };
            let mut bindings = Row::new();
            bindings.insert(column, value);
            Ok(bindings)
        }
        Expr::BinaryOp { op, .. } => Err(Error::UnsupportedPredicate(format!(
            "operator {:?} is not supported",
            op
        ))),
        other => Err(Error::UnsupportedPredicate(format!(
            "expression {:?} is not a conjunction",
            other
        ))),
    }
}
