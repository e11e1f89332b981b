use crate::ast::{Expr, Scalar, ScalarBinaryOp, ScalarUnaryOp, Var};
use crate::evaluate::evaluate_scalar;
use crate::parser::lexer::{Operator, Spanned, Token};
use crate::{Parameters, SurfError};

/// Unary minus binds tighter than `*` and looser than `^`, so `-x^2` is `-(x^2)`
const UNARY_PRECEDENCE: u8 = 25;

/// A parsed subtree, typed by the layer it belongs to
#[derive(Debug, Clone)]
pub(crate) enum Parsed {
    Poly(Expr),
    Scalar(Scalar),
}

impl Parsed {
    fn into_expr(self) -> Expr {
        match self {
            Parsed::Poly(e) => e,
            Parsed::Scalar(s) => Expr::scalar(s),
        }
    }

    fn parenthesized(self) -> Self {
        match self {
            Parsed::Poly(e) => Parsed::Poly(e.parenthesized()),
            Parsed::Scalar(s) => Parsed::Scalar(s.parenthesized()),
        }
    }
}

/// Parse tokens into a tree using the Pratt algorithm
pub(crate) fn parse_expression(tokens: &[Spanned], input_len: usize) -> Result<Expr, SurfError> {
    if tokens.is_empty() {
        return Err(SurfError::parse("empty expression", 0));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len,
    };
    let parsed = parser.parse_expr(0)?;

    if let Some(extra) = parser.tokens.get(parser.pos) {
        return Err(SurfError::parse(
            format!("unexpected {:?}", extra.token),
            extra.position,
        ));
    }
    Ok(parsed.into_expr())
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    input_len: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.current().map_or(self.input_len, |t| t.position)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SurfError> {
        match self.current() {
            Some(t) if t.token == token => {
                self.advance();
                Ok(())
            }
            _ => Err(SurfError::parse(format!("expected '{what}'"), self.position())),
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Parsed, SurfError> {
        let mut left = self.parse_prefix()?;

        while let Some(spanned) = self.current() {
            let op = match spanned.token {
                Token::Operator(op) => op,
                _ => break,
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();

            // Right associative for power, left for others
            let next_precedence = if op == Operator::Pow {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_expr(next_precedence)?;
            left = combine(op, left, right, spanned.position)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Parsed, SurfError> {
        let spanned = self
            .current()
            .ok_or_else(|| SurfError::parse("unexpected end of input", self.input_len))?;
        let position = spanned.position;

        match &spanned.token {
            Token::Number(n) => {
                self.advance();
                Ok(Parsed::Scalar(Scalar::constant(*n)))
            }

            Token::Identifier(name) => {
                self.advance();
                if let Some(v) = Var::from_name(name) {
                    return Ok(Parsed::Poly(Expr::var(v)));
                }
                let is_call = matches!(self.current(), Some(t) if t.token == Token::LeftParen);
                if !is_call {
                    return Ok(Parsed::Scalar(Scalar::param(name.clone())));
                }
                if name == "atan2" {
                    self.advance();
                    let a = self.parse_scalar_argument(name)?;
                    self.expect(Token::Comma, ",")?;
                    let b = self.parse_scalar_argument(name)?;
                    self.expect(Token::RightParen, ")")?;
                    return Ok(Parsed::Scalar(Scalar::binary(ScalarBinaryOp::Atan2, a, b)));
                }
                let op = ScalarUnaryOp::from_name(name).ok_or_else(|| {
                    SurfError::parse(format!("unknown function '{name}'"), position)
                })?;
                self.advance();
                let arg = self.parse_scalar_argument(name)?;
                self.expect(Token::RightParen, ")")?;
                Ok(Parsed::Scalar(Scalar::unary(op, arg)))
            }

            Token::Operator(Operator::Sub) => {
                self.advance();
                Ok(match self.parse_expr(UNARY_PRECEDENCE)? {
                    Parsed::Poly(e) => Parsed::Poly(Expr::neg_expr(e)),
                    Parsed::Scalar(s) => Parsed::Scalar(Scalar::unary(ScalarUnaryOp::Neg, s)),
                })
            }

            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(Token::RightParen, ")")?;
                Ok(inner.parenthesized())
            }

            other => Err(SurfError::parse(format!("unexpected {:?}", other), position)),
        }
    }

    fn parse_scalar_argument(&mut self, function: &str) -> Result<Scalar, SurfError> {
        let position = self.position();
        match self.parse_expr(0)? {
            Parsed::Scalar(s) => Ok(s),
            Parsed::Poly(_) => Err(SurfError::malformed(format!(
                "argument of {function} at position {} depends on x, y or z",
                position + 1
            ))),
        }
    }
}

fn combine(op: Operator, left: Parsed, right: Parsed, position: usize) -> Result<Parsed, SurfError> {
    use Parsed::{Poly, Scalar as S};

    let scalar_op = match op {
        Operator::Add => ScalarBinaryOp::Add,
        Operator::Sub => ScalarBinaryOp::Sub,
        Operator::Mul => ScalarBinaryOp::Mul,
        Operator::Div => ScalarBinaryOp::Div,
        Operator::Pow => ScalarBinaryOp::Pow,
    };

    Ok(match (op, left, right) {
        (_, S(a), S(b)) => S(Scalar::binary(scalar_op, a, b)),
        (Operator::Div, Poly(a), S(b)) => Poly(Expr::div_by_scalar(a, b)),
        (Operator::Div, _, Poly(_)) => {
            return Err(SurfError::malformed(format!(
                "divisor at position {} depends on x, y or z",
                position + 1
            )));
        }
        (Operator::Pow, Poly(base), S(exponent)) => {
            let n = integer_exponent(&exponent)?;
            Poly(Expr::pow_checked(base, n)?.with_written_exponent(exponent))
        }
        (Operator::Pow, _, Poly(_)) => {
            return Err(SurfError::malformed(format!(
                "exponent at position {} depends on x, y or z",
                position + 1
            )));
        }
        (Operator::Add, a, b) => Poly(Expr::add_expr(a.into_expr(), b.into_expr())),
        (Operator::Sub, a, b) => Poly(Expr::sub_expr(a.into_expr(), b.into_expr())),
        (Operator::Mul, a, b) => Poly(Expr::mul_expr(a.into_expr(), b.into_expr())),
    })
}

/// A polynomial exponent must fold to an integer without parameter bindings
fn integer_exponent(exponent: &Scalar) -> Result<i64, SurfError> {
    let value = evaluate_scalar(exponent, &Parameters::default()).map_err(|_| {
        SurfError::malformed(format!("exponent '{exponent}' is not a constant"))
    })?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(SurfError::malformed(format!(
            "exponent {value} is not an integer"
        )));
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, ScalarKind};
    use crate::parser::lexer::lex;

    fn parse(input: &str) -> Result<Expr, SurfError> {
        parse_expression(&lex(input)?, input.len())
    }

    #[test]
    fn test_parse_layers() {
        let e = parse("a*b").unwrap();
        assert!(matches!(
            e.as_scalar().map(|s| &s.kind),
            Some(ScalarKind::Binary(ScalarBinaryOp::Mul, _, _))
        ));

        let e = parse("a*x").unwrap();
        assert!(matches!(e.kind, ExprKind::Mul(_, _)));
    }

    #[test]
    fn test_precedence() {
        // x + 2 * y should be x + (2 * y)
        let e = parse("x+2*y").unwrap();
        match &e.kind {
            ExprKind::Add(l, r) => {
                assert!(matches!(l.kind, ExprKind::Var(Var::X)));
                assert!(matches!(r.kind, ExprKind::Mul(_, _)));
            }
            other => panic!("Expected Add at top level, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let e = parse("-x^2").unwrap();
        match &e.kind {
            ExprKind::Neg(inner) => assert!(matches!(inner.kind, ExprKind::Pow(_, 2))),
            other => panic!("Expected Neg, got {:?}", other),
        }
    }

    #[test]
    fn test_power_exponent_folding() {
        let e = parse("x^(1+2)").unwrap();
        assert!(matches!(e.kind, ExprKind::Pow(_, 3)));
        assert!(matches!(parse("x^-1"), Err(SurfError::MalformedExpression(_))));
        assert!(matches!(parse("x^0.5"), Err(SurfError::MalformedExpression(_))));
        assert!(matches!(parse("x^a"), Err(SurfError::MalformedExpression(_))));
        assert!(matches!(parse("x^y"), Err(SurfError::MalformedExpression(_))));
    }

    #[test]
    fn test_polynomial_divisor_rejected() {
        assert!(parse("x/(a+1)").is_ok());
        assert!(matches!(parse("1/x"), Err(SurfError::MalformedExpression(_))));
    }

    #[test]
    fn test_function_of_variable_rejected() {
        assert!(matches!(parse("sin(x)"), Err(SurfError::MalformedExpression(_))));
        assert!(parse("sin(a)*x").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(SurfError::Parse { .. })));
        assert!(matches!(parse("()"), Err(SurfError::Parse { .. })));
        assert!(matches!(parse("(x+1"), Err(SurfError::Parse { .. })));
        assert!(matches!(parse("x+1)"), Err(SurfError::Parse { .. })));
        assert!(matches!(parse("foo(1)"), Err(SurfError::Parse { .. })));
    }
}
