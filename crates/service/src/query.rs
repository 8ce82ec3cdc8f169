//! Small query helpers shared by the service modules.
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::ColumnTrait;

/// Case-insensitive substring match, portable across PostgreSQL and SQLite.
pub fn icontains<C: ColumnTrait>(col: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{}%", term.trim().to_lowercase()))
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
