use crate::errors::{ExprError, Result};
use crate::eval::Value;
use crate::parser::{Cursor, Number};

/// A parsed expression tree. `Literal` only ever holds scalar values.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Literal(Value),
    Var(String),
    Field {
        target: Box<Expr>,
        name: String,
    },
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// Parse a whole script: an optional leading `return`, one expression, an
/// optional trailing `;`, then end of input.
pub(crate) fn parse_script(input: &str) -> Result<Expr> {
    let mut p = ExprParser::new(input);
    p.cursor.skip_ws();
    p.cursor.consume_keyword("return");
    let expr = p.parse_or()?;
    p.cursor.skip_ws();
    if p.cursor.consume_char(';') {
        p.cursor.skip_ws();
    }
    if !p.cursor.eof() {
        return Err(ExprError::Compile("trailing input".into()));
    }
    Ok(expr)
}

struct ExprParser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> ExprParser<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            cursor: Cursor::new(s),
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        loop {
            self.cursor.skip_ws();
            if self.cursor.consume_str("||") {
                let right = self.parse_and()?;
                left = binary(BinaryOp::Or, left, right);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_cmp()?;
        loop {
            self.cursor.skip_ws();
            if self.cursor.consume_str("&&") {
                let right = self.parse_cmp()?;
                left = binary(BinaryOp::And, left, right);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Expr> {
        let left = self.parse_add()?;
        self.cursor.skip_ws();
        let op = if self.cursor.consume_str("==") {
            BinaryOp::Eq
        } else if self.cursor.consume_str("!=") {
            BinaryOp::Ne
        } else if self.cursor.consume_str("<=") {
            BinaryOp::Le
        } else if self.cursor.consume_str(">=") {
            BinaryOp::Ge
        } else if self.cursor.consume_char('<') {
            BinaryOp::Lt
        } else if self.cursor.consume_char('>') {
            BinaryOp::Gt
        } else {
            return Ok(left);
        };
        let right = self.parse_add()?;
        Ok(binary(op, left, right))
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            self.cursor.skip_ws();
            let op = if self.cursor.consume_char('+') {
                BinaryOp::Add
            } else if self.cursor.consume_char('-') {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_mul()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            self.cursor.skip_ws();
            let op = if self.cursor.consume_char('*') {
                BinaryOp::Mul
            } else if self.cursor.consume_char('/') {
                BinaryOp::Div
            } else if self.cursor.consume_char('%') {
                BinaryOp::Rem
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.cursor.skip_ws();
        if self.cursor.consume_char('!') {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        if self.cursor.consume_char('-') {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            self.cursor.skip_ws();
            if !self.cursor.consume_char('.') {
                break;
            }
            self.cursor.skip_ws();
            let name = self.cursor.parse_identifier()?;
            self.cursor.skip_ws();
            if self.cursor.consume_char('(') {
                let args = self.parse_args()?;
                self.cursor.expect(')')?;
                expr = Expr::Method {
                    target: Box::new(expr),
                    name,
                    args,
                };
            } else {
                expr = Expr::Field {
                    target: Box::new(expr),
                    name,
                };
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.cursor.skip_ws();
        let Some(c) = self.cursor.peek_char() else {
            return Err(ExprError::Compile("expression expected".into()));
        };
        if c == '"' || c == '\'' {
            return Ok(Expr::Literal(Value::Str(self.cursor.parse_quoted_string()?)));
        }
        if c == '(' {
            self.cursor.consume_char('(');
            let inner = self.parse_or()?;
            self.cursor.skip_ws();
            self.cursor.expect(')')?;
            return Ok(inner);
        }
        if c.is_ascii_digit() {
            return Ok(Expr::Literal(match self.cursor.parse_number()? {
                Number::Int(n) => Value::Int(n),
                Number::Float(f) => Value::Float(f),
            }));
        }
        if self.cursor.consume_keyword("true") {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.cursor.consume_keyword("false") {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.cursor.consume_keyword("null") {
            return Ok(Expr::Literal(Value::Null));
        }
        let name = self.cursor.parse_identifier()?;
        self.cursor.skip_ws();
        if self.cursor.consume_char('(') {
            let args = self.parse_args()?;
            self.cursor.expect(')')?;
            return Ok(Expr::Call { name, args });
        }
        Ok(Expr::Var(name))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        let mut out = Vec::new();
        self.cursor.skip_ws();
        if self.cursor.peek_char() == Some(')') {
            return Ok(out);
        }
        loop {
            out.push(self.parse_or()?);
            self.cursor.skip_ws();
            if self.cursor.consume_char(',') {
                self.cursor.skip_ws();
                continue;
            }
            break;
        }
        Ok(out)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_bare_and_returned_literals() {
        assert!(matches!(
            parse_script("true").unwrap(),
            Expr::Literal(Value::Bool(true))
        ));
        assert!(matches!(
            parse_script("return false;").unwrap(),
            Expr::Literal(Value::Bool(false))
        ));
    }

    #[test]
    fn return_prefix_is_a_whole_word() {
        // `returned` is an ordinary variable, not `return ed`.
        assert!(matches!(parse_script("returned").unwrap(), Expr::Var(name) if name == "returned"));
    }

    #[test]
    fn rejects_trailing_input() {
        let err = parse_script("0:0").unwrap_err();
        assert_eq!(err, ExprError::Compile("trailing input".into()));
    }

    #[test]
    fn rejects_empty_source() {
        assert!(parse_script("").is_err());
        assert!(parse_script("return").is_err());
    }

    #[test]
    fn method_chains_nest_left_to_right() {
        let expr = parse_script("builder.line_start(1).build()").unwrap();
        let Expr::Method { target, name, args } = expr else {
            panic!("expected a method call");
        };
        assert_eq!(name, "build");
        assert!(args.is_empty());
        assert!(matches!(*target, Expr::Method { .. }));
    }

    #[test]
    fn comparison_binds_tighter_than_and() {
        let expr = parse_script("1 < 2 && 3 < 4").unwrap();
        let Expr::Binary { op, .. } = expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::And);
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_script("1 + 2 * 3").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }
}
