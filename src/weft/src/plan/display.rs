use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::plan::{Expr, Stmt};

struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.0 {
            Expr::Assign { .. } | Expr::Conditional { .. } | Expr::And(..) | Expr::Function { .. } => {
                write!(f, "({})", self.0)
            }
            expr => write!(f, "{expr}"),
        }
    }
}

struct Joined<'a, T>(&'a [T], &'static str);

impl<T: Display> Display for Joined<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(self.1)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Null => f.write_str("null"),
            Self::This => f.write_str("this"),
            Self::Super => f.write_str("super"),
            Self::Arguments => f.write_str("arguments"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Raw(source) => f.write_str(source),
            Self::Name(name) => f.write_str(name),
            Self::Member { object, property } => write!(f, "{}.{property}", Operand(object)),
            Self::New { class, args } => write!(f, "new {class}({})", Joined(args, ", ")),
            Self::Call { callee, args } => {
                write!(f, "{}({})", Operand(callee), Joined(args, ", "))
            }
            Self::Assign { target, value } => write!(f, "{target} = {value}"),
            Self::Sequence(exprs) => write!(f, "({})", Joined(exprs, ", ")),
            Self::Conditional {
                test,
                consequent,
                alternate,
            } => write!(
                f,
                "{} ? {} : {}",
                Operand(test),
                Operand(consequent),
                Operand(alternate)
            ),
            Self::And(left, right) => write!(f, "{} && {}", Operand(left), Operand(right)),
            Self::Function { params, body } => {
                write!(f, "function({}) {{ {} }}", Joined(params, ", "), Joined(body, " "))
            }
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Let { name, value } => write!(f, "var {name} = {value};"),
            Self::Expr(expr) => write!(f, "{expr};"),
            Self::Return(expr) => write!(f, "return {expr};"),
        }
    }
}
