use num_bigint::BigInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            _ => return None,
        })
    }

    /// Name of the method the operator dispatches to.
    pub fn method_name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq | BinaryOp::Ne => "==",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    BigInteger(BigInt),
    Float(f64),
    Str(String),
    Boolean(bool),
    Null,
    Identifier(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a.b`
    Member { object: Box<Expr>, name: String },
    /// `a.b(x)`
    Invoke {
        object: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    /// `a[i]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `f(x)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    /// Identifiers referenced anywhere in the expression, in order of appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Identifier(name) => out.push(name),
            Expr::Array(items) => items.iter().for_each(|i| i.collect_identifiers(out)),
            Expr::Object(props) => props.iter().for_each(|(_, v)| v.collect_identifiers(out)),
            Expr::Negate(inner) => inner.collect_identifiers(out),
            Expr::Binary { left, right, .. } => {
                left.collect_identifiers(out);
                right.collect_identifiers(out);
            }
            Expr::Member { object, .. } => object.collect_identifiers(out),
            Expr::Invoke { object, args, .. } => {
                object.collect_identifiers(out);
                args.iter().for_each(|a| a.collect_identifiers(out));
            }
            Expr::Index { object, index } => {
                object.collect_identifiers(out);
                index.collect_identifiers(out);
            }
            Expr::Call { callee, args } => {
                callee.collect_identifiers(out);
                args.iter().for_each(|a| a.collect_identifiers(out));
            }
            Expr::Integer(_)
            | Expr::BigInteger(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Boolean(_)
            | Expr::Null => {}
        }
    }
}
