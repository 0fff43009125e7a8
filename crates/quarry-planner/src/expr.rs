//! Logical expressions: name-based, typed against an input plan's schema and
//! never evaluated directly.

use std::fmt;

use quarry_core::error::{Error, Result};
use quarry_core::schema::Field;
use quarry_core::types::PrimitiveType;

use crate::plan::LogicalPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Neq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl BinaryOp {
    /// Short operator name; also the output field name of the expression.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "eq",
            BinaryOp::Neq => "neq",
            BinaryOp::Gt => "gt",
            BinaryOp::GtEq => "gteq",
            BinaryOp::Lt => "lt",
            BinaryOp::LtEq => "lteq",
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Modulus => "mod",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulus => "%",
        }
    }

    /// Whether the expression yields `Bool` regardless of operand type.
    pub fn is_boolean(self) -> bool {
        !matches!(
            self,
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulus
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Sum,
    Min,
    Max,
    Avg,
    Count,
    CountDistinct,
}

impl AggregateKind {
    pub fn name(self) -> &'static str {
        match self {
            AggregateKind::Sum => "SUM",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
            AggregateKind::Avg => "AVG",
            AggregateKind::Count => "COUNT",
            AggregateKind::CountDistinct => "COUNT_DISTINCT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub kind: AggregateKind,
    pub expr: Box<LogicalExpr>,
}

impl AggregateExpr {
    pub fn new(kind: AggregateKind, expr: LogicalExpr) -> Self {
        Self {
            kind,
            expr: Box::new(expr),
        }
    }

    /// Named after the printed form. Counts are `UInt64`; every other kind
    /// keeps the input's type.
    pub fn to_field(&self, input: &LogicalPlan) -> Result<Field> {
        let data_type = match self.kind {
            AggregateKind::Count | AggregateKind::CountDistinct => PrimitiveType::UInt64,
            _ => self.expr.to_field(input)?.data_type,
        };
        Ok(Field::new(self.to_string(), data_type))
    }
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AggregateKind::CountDistinct => write!(f, "COUNT(DISTINCT {})", self.expr),
            kind => write!(f, "{}({})", kind.name(), self.expr),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalExpr {
    Column(String),
    ColumnIndex(usize),
    LiteralString(String),
    LiteralLong(i64),
    LiteralFloat(f32),
    LiteralDouble(f64),
    Cast {
        expr: Box<LogicalExpr>,
        data_type: PrimitiveType,
    },
    Binary {
        op: BinaryOp,
        left: Box<LogicalExpr>,
        right: Box<LogicalExpr>,
    },
    Not(Box<LogicalExpr>),
    Alias {
        expr: Box<LogicalExpr>,
        alias: String,
    },
    Aggregate(AggregateExpr),
}

impl LogicalExpr {
    /// The field this expression produces when evaluated over `input`.
    pub fn to_field(&self, input: &LogicalPlan) -> Result<Field> {
        match self {
            LogicalExpr::Column(name) => {
                let schema = input.schema()?;
                schema
                    .find_first_index_by_name(name)
                    .and_then(|idx| schema.field(idx).cloned())
                    .ok_or_else(|| Error::UnknownColumn(name.clone()))
            }
            LogicalExpr::ColumnIndex(idx) => {
                let schema = input.schema()?;
                schema.field(*idx).cloned().ok_or(Error::IndexOutOfBounds {
                    index: *idx,
                    len: schema.len(),
                })
            }
            LogicalExpr::LiteralString(s) => Ok(Field::new(s.clone(), PrimitiveType::Utf8)),
            LogicalExpr::LiteralLong(n) => Ok(Field::new(n.to_string(), PrimitiveType::Int64)),
            LogicalExpr::LiteralFloat(n) => Ok(Field::new(n.to_string(), PrimitiveType::Float32)),
            LogicalExpr::LiteralDouble(n) => Ok(Field::new(n.to_string(), PrimitiveType::Float64)),
            LogicalExpr::Cast { expr, data_type } => {
                Ok(Field::new(expr.to_field(input)?.name, *data_type))
            }
            LogicalExpr::Binary { op, left, .. } => {
                let data_type = if op.is_boolean() {
                    PrimitiveType::Bool
                } else {
                    left.to_field(input)?.data_type
                };
                Ok(Field::new(op.name(), data_type))
            }
            LogicalExpr::Not(_) => Ok(Field::new("not", PrimitiveType::Bool)),
            LogicalExpr::Alias { expr, alias } => {
                Ok(Field::new(alias.clone(), expr.to_field(input)?.data_type))
            }
            LogicalExpr::Aggregate(agg) => agg.to_field(input),
        }
    }

    fn binary(self, op: BinaryOp, right: LogicalExpr) -> LogicalExpr {
        LogicalExpr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    pub fn eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Eq, right)
    }

    pub fn neq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Neq, right)
    }

    pub fn gt(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Gt, right)
    }

    pub fn gt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::GtEq, right)
    }

    pub fn lt(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Lt, right)
    }

    pub fn lt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::LtEq, right)
    }

    pub fn and(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::And, right)
    }

    pub fn or(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Or, right)
    }

    pub fn add(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Add, right)
    }

    pub fn subtract(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Subtract, right)
    }

    pub fn multiply(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Multiply, right)
    }

    pub fn divide(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Divide, right)
    }

    pub fn modulus(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOp::Modulus, right)
    }

    pub fn alias(self, name: impl Into<String>) -> LogicalExpr {
        alias(self, name)
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpr::Column(name) => write!(f, "#{name}"),
            LogicalExpr::ColumnIndex(idx) => write!(f, "#{idx}"),
            LogicalExpr::LiteralString(s) => write!(f, "'{s}'"),
            LogicalExpr::LiteralLong(n) => write!(f, "{n}"),
            LogicalExpr::LiteralFloat(n) => write!(f, "{n}"),
            LogicalExpr::LiteralDouble(n) => write!(f, "{n}"),
            LogicalExpr::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            LogicalExpr::Binary { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            LogicalExpr::Not(expr) => write!(f, "NOT {expr}"),
            LogicalExpr::Alias { expr, alias } => write!(f, "{expr} as {alias}"),
            LogicalExpr::Aggregate(agg) => write!(f, "{agg}"),
        }
    }
}

impl From<AggregateExpr> for LogicalExpr {
    fn from(agg: AggregateExpr) -> Self {
        LogicalExpr::Aggregate(agg)
    }
}

pub fn col(name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::Column(name.into())
}

pub fn col_index(idx: usize) -> LogicalExpr {
    LogicalExpr::ColumnIndex(idx)
}

pub fn lit_str(s: impl Into<String>) -> LogicalExpr {
    LogicalExpr::LiteralString(s.into())
}

pub fn lit_long(n: i64) -> LogicalExpr {
    LogicalExpr::LiteralLong(n)
}

pub fn lit_float(n: f32) -> LogicalExpr {
    LogicalExpr::LiteralFloat(n)
}

pub fn lit_double(n: f64) -> LogicalExpr {
    LogicalExpr::LiteralDouble(n)
}

pub fn cast(expr: LogicalExpr, data_type: PrimitiveType) -> LogicalExpr {
    LogicalExpr::Cast {
        expr: Box::new(expr),
        data_type,
    }
}

pub fn not(expr: LogicalExpr) -> LogicalExpr {
    LogicalExpr::Not(Box::new(expr))
}

pub fn alias(expr: LogicalExpr, name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::Alias {
        expr: Box::new(expr),
        alias: name.into(),
    }
}

pub fn sum(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::Sum, expr)
}

pub fn min(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::Min, expr)
}

pub fn max(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::Max, expr)
}

pub fn avg(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::Avg, expr)
}

pub fn count(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::Count, expr)
}

pub fn count_distinct(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateKind::CountDistinct, expr)
}
