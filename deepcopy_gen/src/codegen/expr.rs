/* Structured C expressions; parentheses are derived from operator precedence */

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Mul,
  Add,
  Lt,
  And,
  Assign,
}

impl BinOp {
  fn symbol(self) -> &'static str {
    match self {
      BinOp::Mul => "*",
      BinOp::Add => "+",
      BinOp::Lt => "<",
      BinOp::And => "&&",
      BinOp::Assign => "=",
    }
  }

  /* C precedence levels, lower binds tighter */
  fn precedence(self) -> u8 {
    match self {
      BinOp::Mul => 3,
      BinOp::Add => 4,
      BinOp::Lt => 6,
      BinOp::And => 11,
      BinOp::Assign => 14,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CExpr {
  Ident(String),
  Literal(u64),
  Null,
  Member {
    base: Box<CExpr>,
    field: String,
  },
  AddrOf(Box<CExpr>),
  Deref(Box<CExpr>),
  PreIncrement(Box<CExpr>),
  Cast {
    ty: String,
    operand: Box<CExpr>,
  },
  Sizeof(String),
  Binary {
    op: BinOp,
    left: Box<CExpr>,
    right: Box<CExpr>,
  },
  Call {
    callee: Box<CExpr>,
    args: Vec<CExpr>,
  },
}

const PREC_PRIMARY: u8 = 0;
const PREC_POSTFIX: u8 = 1;
const PREC_UNARY: u8 = 2;
const PREC_ANY: u8 = 14;

impl CExpr {
  pub fn ident(name: &str) -> Self {
    CExpr::Ident(name.to_string())
  }

  pub fn arrow(self, field: &str) -> Self {
    CExpr::Member { base: Box::new(self), field: field.to_string() }
  }

  pub fn addr_of(self) -> Self {
    CExpr::AddrOf(Box::new(self))
  }

  pub fn deref(self) -> Self {
    CExpr::Deref(Box::new(self))
  }

  pub fn pre_increment(self) -> Self {
    CExpr::PreIncrement(Box::new(self))
  }

  pub fn cast(self, ty: &str) -> Self {
    CExpr::Cast { ty: ty.to_string(), operand: Box::new(self) }
  }

  pub fn binary(self, op: BinOp, right: CExpr) -> Self {
    CExpr::Binary { op, left: Box::new(self), right: Box::new(right) }
  }

  pub fn add(self, right: CExpr) -> Self {
    self.binary(BinOp::Add, right)
  }

  pub fn mul(self, right: CExpr) -> Self {
    self.binary(BinOp::Mul, right)
  }

  pub fn lt(self, right: CExpr) -> Self {
    self.binary(BinOp::Lt, right)
  }

  pub fn and(self, right: CExpr) -> Self {
    self.binary(BinOp::And, right)
  }

  pub fn assign(self, value: CExpr) -> Self {
    self.binary(BinOp::Assign, value)
  }

  pub fn call(self, args: Vec<CExpr>) -> Self {
    CExpr::Call { callee: Box::new(self), args }
  }

  /// `base->method(args)`
  pub fn method(base: CExpr, method: &str, args: Vec<CExpr>) -> Self {
    base.arrow(method).call(args)
  }

  fn precedence(&self) -> u8 {
    match self {
      CExpr::Ident(_) | CExpr::Literal(_) | CExpr::Null | CExpr::Sizeof(_) => PREC_PRIMARY,
      CExpr::Member { .. } | CExpr::Call { .. } => PREC_POSTFIX,
      CExpr::AddrOf(_) | CExpr::Deref(_) | CExpr::PreIncrement(_) | CExpr::Cast { .. } => PREC_UNARY,
      CExpr::Binary { op, .. } => op.precedence(),
    }
  }

  fn write_operand(&self, f: &mut fmt::Formatter<'_>, max_precedence: u8) -> fmt::Result {
    if self.precedence() > max_precedence {
      write!(f, "({})", self)
    } else {
      write!(f, "{}", self)
    }
  }

  pub fn to_c_string(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for CExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CExpr::Ident(name) => f.write_str(name),
      CExpr::Literal(value) => write!(f, "{}", value),
      CExpr::Null => f.write_str("nullptr"),
      CExpr::Member { base, field } => {
        base.write_operand(f, PREC_POSTFIX)?;
        write!(f, "->{}", field)
      }
      CExpr::AddrOf(operand) => {
        f.write_str("&")?;
        operand.write_operand(f, PREC_UNARY)
      }
      CExpr::Deref(operand) => {
        f.write_str("*")?;
        operand.write_operand(f, PREC_UNARY)
      }
      CExpr::PreIncrement(operand) => {
        f.write_str("++")?;
        operand.write_operand(f, PREC_UNARY)
      }
      CExpr::Cast { ty, operand } => {
        write!(f, "({})", ty)?;
        operand.write_operand(f, PREC_UNARY)
      }
      CExpr::Sizeof(ty) => write!(f, "sizeof({})", ty),
      CExpr::Binary { op, left, right } => {
        let prec = op.precedence();
        /* assignment is right-associative, everything else here is left-associative */
        let (left_max, right_max) = match op {
          BinOp::Assign => (PREC_UNARY, prec),
          _ => (prec, prec - 1),
        };
        left.write_operand(f, left_max)?;
        write!(f, " {} ", op.symbol())?;
        right.write_operand(f, right_max)
      }
      CExpr::Call { callee, args } => {
        callee.write_operand(f, PREC_POSTFIX)?;
        f.write_str("(")?;
        for (i, arg) in args.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          arg.write_operand(f, PREC_ANY)?;
        }
        f.write_str(")")
      }
    }
  }
}
