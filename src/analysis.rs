//! Structural analyses and copying rewrites of expression trees

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{Expr, ExprKind, Scalar, ScalarKind};
use crate::visitor::{ExprVisitor, walk_expr};

/// Total degree of the tree in x, y, z
///
/// Counts syntactically, so cancellations such as `x^2 - x^2` are not detected.
pub fn degree(expr: &Expr) -> u32 {
    match &expr.kind {
        ExprKind::Var(_) => 1,
        ExprKind::Scalar(_) => 0,
        ExprKind::Add(a, b) | ExprKind::Sub(a, b) => degree(a).max(degree(b)),
        ExprKind::Mul(a, b) => degree(a) + degree(b),
        ExprKind::Pow(base, n) => degree(base).saturating_mul(*n),
        ExprKind::Neg(a) | ExprKind::DivByScalar(a, _) => degree(a),
    }
}

struct ParamCollector {
    names: BTreeSet<String>,
}

impl ExprVisitor for ParamCollector {
    fn visit_param(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }
}

/// Names of all parameters occurring in the tree, sorted
pub fn parameters(expr: &Expr) -> BTreeSet<String> {
    let mut collector = ParamCollector {
        names: BTreeSet::new(),
    };
    walk_expr(expr, &mut collector);
    collector.names
}

/// Copy of `expr` with parameters renamed through `renames`
///
/// Names missing from the map are kept. The input tree is left untouched.
pub fn rename_parameters(expr: &Expr, renames: &FxHashMap<String, String>) -> Expr {
    map_scalars(expr, &|s| rename_scalar(s, renames))
}

fn rename_scalar(s: &Scalar, renames: &FxHashMap<String, String>) -> Scalar {
    let kind = match &s.kind {
        ScalarKind::Constant(_) => return s.clone(),
        ScalarKind::Param(name) => match renames.get(name) {
            Some(new_name) => ScalarKind::Param(new_name.clone()),
            None => return s.clone(),
        },
        ScalarKind::Unary(op, a) => ScalarKind::Unary(*op, Arc::new(rename_scalar(a, renames))),
        ScalarKind::Binary(op, a, b) => ScalarKind::Binary(
            *op,
            Arc::new(rename_scalar(a, renames)),
            Arc::new(rename_scalar(b, renames)),
        ),
    };
    Scalar {
        kind,
        parentheses: s.parentheses,
    }
}

/// Rebuild the polynomial layer, rewriting every scalar subtree with `f`
fn map_scalars(expr: &Expr, f: &dyn Fn(&Scalar) -> Scalar) -> Expr {
    let rec = |e: &Arc<Expr>| Arc::new(map_scalars(e, f));
    let kind = match &expr.kind {
        ExprKind::Var(v) => ExprKind::Var(*v),
        ExprKind::Scalar(s) => ExprKind::Scalar(Arc::new(f(s))),
        ExprKind::Add(a, b) => ExprKind::Add(rec(a), rec(b)),
        ExprKind::Sub(a, b) => ExprKind::Sub(rec(a), rec(b)),
        ExprKind::Mul(a, b) => ExprKind::Mul(rec(a), rec(b)),
        ExprKind::Pow(a, n) => ExprKind::Pow(rec(a), *n),
        ExprKind::Neg(a) => ExprKind::Neg(rec(a)),
        ExprKind::DivByScalar(a, d) => ExprKind::DivByScalar(rec(a), Arc::new(f(d))),
    };
    let mut out = Expr::new(kind);
    out.parentheses = expr.parentheses;
    out.written_exponent = expr.written_exponent.clone();
    out
}

/// Replace x, y, z by the given trees
///
/// Substituted subtrees are shared, not copied.
pub fn substitute_variables(expr: &Expr, replacements: &[Expr; 3]) -> Expr {
    let shared: [Arc<Expr>; 3] = replacements.clone().map(Arc::new);
    substitute_shared(expr, &shared).as_ref().clone()
}

fn substitute_shared(expr: &Expr, shared: &[Arc<Expr>; 3]) -> Arc<Expr> {
    let rec = |e: &Arc<Expr>| substitute_shared(e, shared);
    let kind = match &expr.kind {
        ExprKind::Var(v) => return shared[v.index()].clone(),
        ExprKind::Scalar(s) => ExprKind::Scalar(s.clone()),
        ExprKind::Add(a, b) => ExprKind::Add(rec(a), rec(b)),
        ExprKind::Sub(a, b) => ExprKind::Sub(rec(a), rec(b)),
        ExprKind::Mul(a, b) => ExprKind::Mul(rec(a), rec(b)),
        ExprKind::Pow(a, n) => ExprKind::Pow(rec(a), *n),
        ExprKind::Neg(a) => ExprKind::Neg(rec(a)),
        ExprKind::DivByScalar(a, d) => ExprKind::DivByScalar(rec(a), d.clone()),
    };
    Arc::new(Expr::new(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{Parameters, evaluate};
    use crate::parse;

    #[test]
    fn test_degree() {
        assert_eq!(degree(&parse("a*b+3").unwrap()), 0);
        assert_eq!(degree(&parse("x").unwrap()), 1);
        assert_eq!(degree(&parse("x*y*z+x^2").unwrap()), 3);
        assert_eq!(degree(&parse("(x^2+y)^3").unwrap()), 6);
        assert_eq!(degree(&parse("-(x*y)/(2*a)").unwrap()), 2);
        assert_eq!(degree(&parse("(x+1)^0").unwrap()), 0);
    }

    #[test]
    fn test_parameters() {
        let e = parse("a*x^2+sin(b)*y-a/c*z").unwrap();
        let names: Vec<String> = parameters(&e).into_iter().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(parameters(&parse("x+y").unwrap()).is_empty());
    }

    #[test]
    fn test_rename_is_copying() {
        let e = parse("a*x+b*(y-a)").unwrap();
        let mut renames = FxHashMap::default();
        renames.insert("a".to_string(), "alpha".to_string());
        let renamed = rename_parameters(&e, &renames);

        assert_eq!(renamed.to_source_string(), "alpha*x+b*(y-alpha)");
        // Original keeps its names
        assert_eq!(e.to_source_string(), "a*x+b*(y-a)");
    }

    #[test]
    fn test_substitute_variables() {
        let e = parse("x^2+y*z").unwrap();
        let replaced = substitute_variables(&e, &[parse("y+1").unwrap(), Expr::z(), Expr::x()]);
        let params = Parameters::default();
        let (x, y, z) = (0.3, -2.0, 1.25);
        let expected = (y + 1.0) * (y + 1.0) + z * x;
        assert!((evaluate(&replaced, x, y, z, &params).unwrap() - expected).abs() < 1e-12);
    }
}
