//! Expression trees.

use std::rc::Rc;


use super::value::Value;

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators. `And`/`Or` short-circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// Operator as written in scripts.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }
}

/// One argument of a call. Unnamed arguments bind to `input`.
#[derive(Clone, Debug)]
pub struct CallArg {
    pub name: String,
    pub value: Expr,
}

/// Piece of an interpolated string.
#[derive(Clone, Debug)]
pub enum TemplatePart {
    Text(String),
    Code(Expr),
}

/// A parsed expression.
#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Value),
    /// String with `{...}` interpolations.
    Template(Vec<TemplatePart>),
    List(Vec<Expr>),
    Var(String),
    Assign(String, Box<Expr>),
    Sequence(Vec<Expr>),
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    /// `for each var in items do body`
    ForEach {
        var: String,
        items: Box<Expr>,
        body: Box<Expr>,
    },
    /// `for var from from to to do body`
    ForRange {
        var: String,
        from: Box<Expr>,
        to: Box<Expr>,
        body: Box<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<CallArg>,
    },
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    /// `{ body }`
    Closure(Rc<Expr>),
}

impl Expr {
    /// Visit this expression and every sub-expression, parents first.
    ///
    /// Closure bodies are visited too.
    pub fn walk(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Literal(_) | Expr::Var(_) => {}
            Expr::Template(parts) => {
                for part in parts {
                    if let TemplatePart::Code(e) = part {
                        e.walk(f);
                    }
                }
            }
            Expr::List(items) | Expr::Sequence(items) => {
                for e in items {
                    e.walk(f);
                }
            }
            Expr::Assign(_, e) | Expr::Unary(_, e) | Expr::Member(e, _) => e.walk(f),
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                cond.walk(f);
                then.walk(f);
                if let Some(e) = otherwise {
                    e.walk(f);
                }
            }
            Expr::ForEach { items, body, .. } => {
                items.walk(f);
                body.walk(f);
            }
            Expr::ForRange { from, to, body, .. } => {
                from.walk(f);
                to.walk(f);
                body.walk(f);
            }
            Expr::Binary(_, l, r) | Expr::Index(l, r) => {
                l.walk(f);
                r.walk(f);
            }
            Expr::Call { callee, args } => {
                callee.walk(f);
                for arg in args {
                    arg.value.walk(f);
                }
            }
            Expr::Closure(body) => body.walk(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_visits_closure_bodies() {
        let expr = Expr::Sequence(vec![
            Expr::Var("a".into()),
            Expr::Closure(Rc::new(Expr::Member(
                Box::new(Expr::Var("card".into())),
                "name".into(),
            ))),
        ]);
        let mut members = Vec::new();
        expr.walk(&mut |e| {
            if let Expr::Member(_, name) = e {
                members.push(name.clone());
            }
        });
        assert_eq!(members, vec!["name".to_string()]);
    }
}
