// Display formatting for AST
//
// `Display` prints with the fewest parentheses precedence allows.
// `to_source_string` prints exactly the parentheses recorded on the nodes, so a parsed
// tree reproduces its input text.
use crate::ast::{Expr, ExprKind, Scalar, ScalarBinaryOp, ScalarKind, ScalarUnaryOp};
use std::fmt;
use std::fmt::Write;

const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_POWER: u8 = 4;
const PREC_ATOM: u8 = 5;

/// Format a number, integers without a fractional part
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn expr_precedence(e: &Expr) -> u8 {
    match &e.kind {
        ExprKind::Add(..) | ExprKind::Sub(..) => PREC_SUM,
        ExprKind::Mul(..) | ExprKind::DivByScalar(..) => PREC_PRODUCT,
        ExprKind::Neg(_) => PREC_UNARY,
        ExprKind::Pow(..) => PREC_POWER,
        ExprKind::Var(_) => PREC_ATOM,
        ExprKind::Scalar(s) => scalar_precedence(s),
    }
}

fn scalar_precedence(s: &Scalar) -> u8 {
    match &s.kind {
        ScalarKind::Binary(ScalarBinaryOp::Add | ScalarBinaryOp::Sub, ..) => PREC_SUM,
        ScalarKind::Binary(ScalarBinaryOp::Mul | ScalarBinaryOp::Div, ..) => PREC_PRODUCT,
        ScalarKind::Binary(ScalarBinaryOp::Pow, ..) => PREC_POWER,
        ScalarKind::Unary(ScalarUnaryOp::Neg, _) => PREC_UNARY,
        ScalarKind::Constant(c) if *c < 0.0 => PREC_UNARY,
        _ => PREC_ATOM,
    }
}

/// Wrap `inner` in parentheses when its precedence is below `min`
fn operand(inner: &impl fmt::Display, prec: u8, min: u8) -> String {
    if prec < min {
        format!("({})", inner)
    } else {
        format!("{}", inner)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Var(v) => write!(f, "{}", v),
            ExprKind::Scalar(s) => write!(f, "{}", s),
            ExprKind::Add(u, v) => write!(f, "{} + {}", u, v),
            ExprKind::Sub(u, v) => {
                // `a - (b + c)` keeps its grouping
                let right = operand(v.as_ref(), expr_precedence(v), PREC_SUM + 1);
                write!(f, "{} - {}", u, right)
            }
            ExprKind::Mul(u, v) => write!(
                f,
                "{} * {}",
                operand(u.as_ref(), expr_precedence(u), PREC_PRODUCT),
                operand(v.as_ref(), expr_precedence(v), PREC_PRODUCT)
            ),
            ExprKind::DivByScalar(u, d) => write!(
                f,
                "{} / {}",
                operand(u.as_ref(), expr_precedence(u), PREC_PRODUCT),
                operand(d.as_ref(), scalar_precedence(d), PREC_PRODUCT + 1)
            ),
            ExprKind::Neg(u) => write!(
                f,
                "-{}",
                operand(u.as_ref(), expr_precedence(u), PREC_POWER)
            ),
            ExprKind::Pow(u, n) => write!(
                f,
                "{}^{}",
                operand(u.as_ref(), expr_precedence(u), PREC_ATOM),
                n
            ),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScalarKind::Constant(c) => write!(f, "{}", format_number(*c)),
            ScalarKind::Param(name) => write!(f, "{}", name),
            ScalarKind::Unary(ScalarUnaryOp::Neg, a) => write!(
                f,
                "-{}",
                operand(a.as_ref(), scalar_precedence(a), PREC_POWER)
            ),
            ScalarKind::Unary(op, a) => write!(f, "{}({})", op.name(), a),
            ScalarKind::Binary(ScalarBinaryOp::Atan2, a, b) => write!(f, "atan2({}, {})", a, b),
            ScalarKind::Binary(op, a, b) => {
                let (symbol, left_min, right_min) = match op {
                    ScalarBinaryOp::Add => ("+", PREC_SUM, PREC_SUM),
                    ScalarBinaryOp::Sub => ("-", PREC_SUM, PREC_SUM + 1),
                    ScalarBinaryOp::Mul => ("*", PREC_PRODUCT, PREC_PRODUCT),
                    ScalarBinaryOp::Div => ("/", PREC_PRODUCT, PREC_PRODUCT + 1),
                    ScalarBinaryOp::Pow | ScalarBinaryOp::Atan2 => ("^", PREC_ATOM, PREC_ATOM),
                };
                let left = operand(a.as_ref(), scalar_precedence(a), left_min);
                let right = operand(b.as_ref(), scalar_precedence(b), right_min);
                if matches!(op, ScalarBinaryOp::Pow) {
                    write!(f, "{}^{}", left, right)
                } else {
                    write!(f, "{} {} {}", left, symbol, right)
                }
            }
        }
    }
}

impl Expr {
    /// Render the tree with only the parentheses recorded on its nodes
    pub fn to_source_string(&self) -> String {
        let mut out = String::new();
        write_source_expr(&mut out, self);
        out
    }
}

impl Scalar {
    /// Render the tree with only the parentheses recorded on its nodes
    pub fn to_source_string(&self) -> String {
        let mut out = String::new();
        write_source_scalar(&mut out, self);
        out
    }
}

fn open_parentheses(out: &mut String, depth: u8) {
    out.extend(std::iter::repeat_n('(', usize::from(depth)));
}

fn close_parentheses(out: &mut String, depth: u8) {
    out.extend(std::iter::repeat_n(')', usize::from(depth)));
}

fn write_source_expr(out: &mut String, e: &Expr) {
    open_parentheses(out, e.parentheses);
    match &e.kind {
        ExprKind::Var(v) => out.push_str(v.name()),
        ExprKind::Scalar(s) => write_source_scalar(out, s),
        ExprKind::Add(a, b) => write_source_infix(out, a, "+", b),
        ExprKind::Sub(a, b) => write_source_infix(out, a, "-", b),
        ExprKind::Mul(a, b) => write_source_infix(out, a, "*", b),
        ExprKind::Pow(a, n) => {
            write_source_expr(out, a);
            match &e.written_exponent {
                Some(exponent) => {
                    out.push('^');
                    write_source_scalar(out, exponent);
                }
                None => {
                    let _ = write!(out, "^{}", n);
                }
            }
        }
        ExprKind::Neg(a) => {
            out.push('-');
            write_source_expr(out, a);
        }
        ExprKind::DivByScalar(a, d) => {
            write_source_expr(out, a);
            out.push('/');
            write_source_scalar(out, d);
        }
    }
    close_parentheses(out, e.parentheses);
}

fn write_source_infix(out: &mut String, a: &Expr, op: &str, b: &Expr) {
    write_source_expr(out, a);
    out.push_str(op);
    write_source_expr(out, b);
}

fn write_source_scalar(out: &mut String, s: &Scalar) {
    open_parentheses(out, s.parentheses);
    match &s.kind {
        ScalarKind::Constant(c) => out.push_str(&format_number(*c)),
        ScalarKind::Param(name) => out.push_str(name),
        ScalarKind::Unary(ScalarUnaryOp::Neg, a) => {
            out.push('-');
            write_source_scalar(out, a);
        }
        ScalarKind::Unary(op, a) => {
            out.push_str(op.name());
            out.push('(');
            write_source_scalar(out, a);
            out.push(')');
        }
        ScalarKind::Binary(ScalarBinaryOp::Atan2, a, b) => {
            out.push_str("atan2(");
            write_source_scalar(out, a);
            out.push(',');
            write_source_scalar(out, b);
            out.push(')');
        }
        ScalarKind::Binary(op, a, b) => {
            write_source_scalar(out, a);
            out.push_str(match op {
                ScalarBinaryOp::Add => "+",
                ScalarBinaryOp::Sub => "-",
                ScalarBinaryOp::Mul => "*",
                ScalarBinaryOp::Div => "/",
                ScalarBinaryOp::Pow | ScalarBinaryOp::Atan2 => "^",
            });
            write_source_scalar(out, b);
        }
    }
    close_parentheses(out, s.parentheses);
}
