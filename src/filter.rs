//! Row filter expression parser using chumsky.
//!
//! Parses filter expressions like:
//! - `QUAL > 30`
//! - `round(QUAL) > 100`
//! - `gene == "S" && organism contains "sapiens"`
//! - `INFO.DP >= 10 || META.treatment == "mock"`
//! - `ALT[0] == "T"`
//! - `!exists(gene)`

use chumsky::prelude::*;

/// Binary operators for comparisons and logic.
#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    // Comparison
    Eq,       // ==
    NotEq,    // !=
    Lt,       // <
    Gt,       // >
    LtEq,     // <=
    GtEq,     // >=
    Contains, // contains (string contains)

    // Logical
    And, // &&
    Or,  // ||
}

/// Unary operators.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Not, // !
}

/// Part of a variable access path.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessPart {
    /// A field or namespace name (e.g. "INFO", "DP", "organism").
    Field(String),
    /// A list index (e.g. `[0]`).
    Index(usize),
}

/// A filter expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Bool(bool),
    /// A variable reference with access path.
    /// e.g. `INFO.DP4[2]` becomes `Var([Field("INFO"), Field("DP4"), Index(2)])`
    Var(Vec<AccessPart>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    /// Check if a field exists (is not missing).
    Exists(Vec<AccessPart>),
    /// Round a number half to even.
    Round(Box<Expr>),
}

impl Expr {
    /// Create a simple variable expression.
    pub fn var(name: &str) -> Self {
        Expr::Var(vec![AccessPart::Field(name.to_string())])
    }
}

/// Create the filter expression parser.
pub fn parser() -> impl Parser<char, Expr, Error = Simple<char>> {
    recursive(|full_expr| {
        // Number literal, optionally negative
        let number = just('-')
            .or_not()
            .chain::<char, _, _>(text::int(10))
            .chain::<char, _, _>(just('.').chain(text::digits(10)).or_not().flatten())
            .collect::<String>()
            .try_map(|s, span| {
                s.parse()
                    .map(Expr::Number)
                    .map_err(|_| Simple::custom(span, format!("invalid number {}", s)))
            })
            .padded();

        // String literal (double-quoted)
        let string = just('"')
            .ignore_then(filter(|c| *c != '"').repeated())
            .then_ignore(just('"'))
            .collect::<String>()
            .map(Expr::String)
            .padded();

        let boolean = choice((
            text::keyword("true").to(Expr::Bool(true)),
            text::keyword("false").to(Expr::Bool(false)),
        ))
        .padded();

        // List index: [0], [1], ...
        let index = just('[')
            .ignore_then(text::int(10).try_map(|s: String, span| {
                s.parse()
                    .map(AccessPart::Index)
                    .map_err(|_| Simple::custom(span, format!("invalid index {}", s)))
            }))
            .then_ignore(just(']'));

        // Namespace step: .Name
        let member = just('.')
            .ignore_then(text::ident())
            .map(AccessPart::Field);

        // Access path: DP, ALT[0], INFO.DP4[2]
        let path = text::ident()
            .map(AccessPart::Field)
            .then(choice((index, member)).repeated())
            .map(|(first, rest)| {
                let mut parts = vec![first];
                parts.extend(rest);
                parts
            })
            .padded();

        let variable = path.clone().map(Expr::Var);

        // exists(path)
        let exists_fn = text::keyword("exists")
            .padded()
            .ignore_then(path.delimited_by(just('(').padded(), just(')').padded()))
            .map(Expr::Exists);

        // round(expr)
        let round_fn = text::keyword("round")
            .padded()
            .ignore_then(
                full_expr
                    .clone()
                    .delimited_by(just('(').padded(), just(')').padded()),
            )
            .map(|e| Expr::Round(Box::new(e)));

        let paren_expr = full_expr.delimited_by(just('(').padded(), just(')').padded());

        let atom = choice((
            exists_fn, round_fn, boolean, number, string, paren_expr, variable,
        ));

        // Unary operators (!)
        let unary = just('!')
            .padded()
            .repeated()
            .then(atom)
            .foldr(|_op, expr| Expr::Unary(UnaryOp::Not, Box::new(expr)));

        let cmp_op = choice((
            just("==").to(BinaryOp::Eq),
            just("!=").to(BinaryOp::NotEq),
            just("<=").to(BinaryOp::LtEq),
            just(">=").to(BinaryOp::GtEq),
            just("<").to(BinaryOp::Lt),
            just(">").to(BinaryOp::Gt),
            text::keyword("contains").to(BinaryOp::Contains),
        ))
        .padded();

        let comparison = unary
            .clone()
            .then(cmp_op.then(unary).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        // Logical AND (&&)
        let and_op = just("&&").padded().to(BinaryOp::And);
        let and_expr = comparison
            .clone()
            .then(and_op.then(comparison).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)));

        // Logical OR (||)
        let or_op = just("||").padded().to(BinaryOp::Or);
        and_expr
            .clone()
            .then(or_op.then(and_expr).repeated())
            .foldl(|left, (op, right)| Expr::Binary(Box::new(left), op, Box::new(right)))
    })
    .then_ignore(end())
}

/// Parse a filter expression string into an AST.
pub fn parse_filter(filter: &str) -> Result<Expr, Vec<Simple<char>>> {
    parser().parse(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_comparison() {
        let expr = parse_filter("QUAL > 30").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Box::new(Expr::var("QUAL")),
                BinaryOp::Gt,
                Box::new(Expr::Number(30.0))
            )
        );
    }

    #[test]
    fn test_parse_string_comparison() {
        let expr = parse_filter(r#"organism == "Homo sapiens""#).unwrap();
        assert!(matches!(expr, Expr::Binary(_, BinaryOp::Eq, _)));
    }

    #[test]
    fn test_parse_round() {
        let expr = parse_filter("round(QUAL) > 100").unwrap();
        if let Expr::Binary(left, BinaryOp::Gt, _) = expr {
            assert_eq!(*left, Expr::Round(Box::new(Expr::var("QUAL"))));
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_round_prefix_is_still_a_field() {
        let expr = parse_filter("rounds > 1").unwrap();
        if let Expr::Binary(left, _, _) = expr {
            assert_eq!(*left, Expr::var("rounds"));
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_parse_namespaced_index_access() {
        let expr = parse_filter("INFO.DP4[2] > 10").unwrap();
        if let Expr::Binary(left, BinaryOp::Gt, _) = expr {
            assert_eq!(
                *left,
                Expr::Var(vec![
                    AccessPart::Field("INFO".to_string()),
                    AccessPart::Field("DP4".to_string()),
                    AccessPart::Index(2),
                ])
            );
        } else {
            panic!("Expected Binary");
        }
    }

    #[test]
    fn test_parse_logical_precedence() {
        let expr = parse_filter(r#"gene == "S" || gene == "N" && QUAL > 30"#).unwrap();
        assert!(matches!(expr, Expr::Binary(_, BinaryOp::Or, _)));
    }

    #[test]
    fn test_parse_parenthesized() {
        let expr = parse_filter(r#"(gene == "S" || gene == "N") && QUAL > 30"#).unwrap();
        assert!(matches!(expr, Expr::Binary(_, BinaryOp::And, _)));
    }

    #[test]
    fn test_parse_not_exists() {
        let expr = parse_filter("!exists(gene)").unwrap();
        assert_eq!(
            expr,
            Expr::Unary(
                UnaryOp::Not,
                Box::new(Expr::Exists(vec![AccessPart::Field("gene".to_string())]))
            )
        );
    }

    #[test]
    fn test_parse_contains() {
        let expr = parse_filter(r#"cell_line contains "Vero""#).unwrap();
        assert!(matches!(expr, Expr::Binary(_, BinaryOp::Contains, _)));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_filter("true").unwrap(), Expr::Bool(true));
        assert_eq!(parse_filter("42.5").unwrap(), Expr::Number(42.5));
        assert_eq!(parse_filter("-3").unwrap(), Expr::Number(-3.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_filter("QUAL >").is_err());
        assert!(parse_filter("round(QUAL").is_err());
        assert!(parse_filter(r#"gene == "S"#).is_err());
    }
}
