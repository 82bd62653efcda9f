//! Filter expressions.
//!
//! Only the node kinds a text search rewrite reads or produces.

use std::fmt;

use fulltext_shared::{TextSearchKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            RelationalOp::Eq => "==",
            RelationalOp::Ne => "!=",
            RelationalOp::Lt => "<",
            RelationalOp::Le => "<=",
            RelationalOp::Gt => ">",
            RelationalOp::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("AND"),
            LogicalOp::Or => f.write_str("OR"),
        }
    }
}

/// `from.prop` and the pattern of a text search predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearchArgument {
    /// Tag or edge name.
    pub from: String,
    pub prop: String,
    /// The pattern.
    pub val: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearchExpression {
    pub kind: TextSearchKind,
    pub arg: TextSearchArgument,
}

impl TextSearchExpression {
    pub fn new(
        kind: TextSearchKind,
        from: impl Into<String>,
        prop: impl Into<String>,
        val: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            arg: TextSearchArgument {
                from: from.into(),
                prop: prop.into(),
                val: val.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `tag.prop` of the current vertex.
    TagProperty { tag: String, prop: String },
    /// `edge.prop` of the current edge.
    EdgeProperty { edge: String, prop: String },
    Constant(Value),
    Relational {
        op: RelationalOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    /// N-ary `AND`/`OR`.
    Logical {
        op: LogicalOp,
        operands: Vec<Expression>,
    },
    TextSearch(TextSearchExpression),
}

impl Expression {
    pub fn tag_prop(tag: impl Into<String>, prop: impl Into<String>) -> Self {
        Self::TagProperty {
            tag: tag.into(),
            prop: prop.into(),
        }
    }

    pub fn edge_prop(edge: impl Into<String>, prop: impl Into<String>) -> Self {
        Self::EdgeProperty {
            edge: edge.into(),
            prop: prop.into(),
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    pub fn eq(lhs: Expression, rhs: Expression) -> Self {
        Self::Relational {
            op: RelationalOp::Eq,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn or(operands: Vec<Expression>) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            operands,
        }
    }

    pub fn text_search(
        kind: TextSearchKind,
        from: impl Into<String>,
        prop: impl Into<String>,
        val: impl Into<String>,
    ) -> Self {
        Self::TextSearch(TextSearchExpression::new(kind, from, prop, val))
    }

    pub fn as_text_search(&self) -> Option<&TextSearchExpression> {
        match self {
            Expression::TextSearch(ts) => Some(ts),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::TagProperty { tag, prop } => write!(f, "{}.{}", tag, prop),
            Expression::EdgeProperty { edge, prop } => write!(f, "{}.{}", edge, prop),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Relational { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Expression::Logical { op, operands } => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op)?;
                    }
                    write!(f, "({})", operand)?;
                }
                Ok(())
            }
            Expression::TextSearch(ts) => write!(
                f,
                "{}({}.{}, {:?})",
                ts.kind, ts.arg.from, ts.arg.prop, ts.arg.val
            ),
        }
    }
}

/// True for prefix/fuzzy/regexp/wildcard predicates.
pub fn needs_text_search(expr: &Expression) -> bool {
    matches!(expr, Expression::TextSearch(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let eq = Expression::eq(
            Expression::tag_prop("person", "name"),
            Expression::constant("abc"),
        );
        assert_eq!(eq.to_string(), r#"person.name == "abc""#);

        let or = Expression::or(vec![
            eq.clone(),
            Expression::eq(Expression::edge_prop("follow", "note"), Expression::constant(3i64)),
        ]);
        assert_eq!(or.to_string(), r#"(person.name == "abc") OR (follow.note == 3)"#);

        let ts = Expression::text_search(TextSearchKind::Wildcard, "person", "name", "a*");
        assert_eq!(ts.to_string(), r#"wildcard(person.name, "a*")"#);
    }

    #[test]
    fn test_needs_text_search() {
        for kind in [
            TextSearchKind::Prefix,
            TextSearchKind::Fuzzy,
            TextSearchKind::Regexp,
            TextSearchKind::Wildcard,
        ] {
            assert!(needs_text_search(&Expression::text_search(kind, "t", "p", "x")));
        }
        assert!(!needs_text_search(&Expression::tag_prop("t", "p")));
        assert!(!needs_text_search(&Expression::Logical {
            op: LogicalOp::And,
            operands: Vec::new(),
        }));
    }
}
