//! Parser module - converts surface equations to trees
mod lexer;
mod pratt;

use crate::{Expr, SurfError};

/// Parse a surface equation into an expression tree
///
/// Sub-expressions without x, y, z land in the scalar layer; everything else in
/// the polynomial layer. Parentheses are recorded on the nodes they enclose so
/// [`Expr::to_source_string`] reproduces the input.
///
/// # Example
/// ```
/// use algesurf::parse;
///
/// let expr = parse("x^2+y^2+z^2-r^2").unwrap();
/// assert_eq!(expr.to_source_string(), "x^2+y^2+z^2-r^2");
/// ```
///
/// # Errors
/// - `SurfError::Parse` for invalid syntax
/// - `SurfError::MalformedExpression` for a non-integer or negative power of a
///   polynomial, a divisor or function argument depending on x, y or z
pub fn parse(input: &str) -> Result<Expr, SurfError> {
    if input.trim().is_empty() {
        return Err(SurfError::parse("empty expression", 0));
    }
    let tokens = lexer::lex(input)?;
    pratt::parse_expression(&tokens, input.len())
}
