//! Instantiation plans handed to the code-emission backend.
//!
//! A plan is an abstract expression/statement tree. The resolution core only
//! builds plans; it never inspects one it has already produced except to
//! refer back to a cached variable by name. The [`Display`] implementations
//! render a compact script-like form which is meant for logs and tests, not
//! for emission.

mod display;

use serde::{Deserialize, Serialize};

use crate::model::InjectionRequest;

/// An expression in an instantiation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// The null sentinel substituted wherever resolution failed.
    Null,
    /// The receiver of the enclosing method.
    This,
    /// The base class of the enclosing constructor.
    Super,
    /// The argument list of the enclosing function as one array-like value.
    Arguments,
    /// A string literal.
    Str(String),
    /// An expression handed over verbatim by the front-end.
    Raw(String),
    /// A (possibly qualified) name.
    Name(String),
    Member {
        object: Box<Expr>,
        property: String,
    },
    New {
        class: String,
        args: Vec<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Assign {
        target: String,
        value: Box<Expr>,
    },
    /// Expressions evaluated left to right, yielding the last one.
    Sequence(Vec<Expr>),
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Short-circuiting conjunction.
    And(Box<Expr>, Box<Expr>),
    Function {
        params: Vec<String>,
        body: Vec<Stmt>,
    },
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Self::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn new_instance(class: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::New {
            class: class.into(),
            args,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::Assign {
            target: target.into(),
            value: Box::new(value),
        }
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Self {
        Self::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    /// A parameterless function returning `value`.
    pub fn thunk(value: Expr) -> Self {
        Self::Function {
            params: Vec::new(),
            body: vec![Stmt::Return(value)],
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Visits `self` and every nested expression in evaluation order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Self::Null
            | Self::This
            | Self::Super
            | Self::Arguments
            | Self::Str(_)
            | Self::Raw(_)
            | Self::Name(_) => {}
            Self::Member { object, .. } => object.walk(visit),
            Self::New { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            Self::Call { callee, args } => {
                callee.walk(visit);
                args.iter().for_each(|arg| arg.walk(visit));
            }
            Self::Assign { value, .. } => value.walk(visit),
            Self::Sequence(exprs) => exprs.iter().for_each(|expr| expr.walk(visit)),
            Self::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.walk(visit);
                consequent.walk(visit);
                alternate.walk(visit);
            }
            Self::And(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Function { body, .. } => body.iter().for_each(|stmt| stmt.walk(visit)),
        }
    }

    /// Counts the nested expressions (including `self`) accepted by `pred`.
    pub fn count(&self, mut pred: impl FnMut(&Expr) -> bool) -> usize {
        let mut count = 0;
        self.walk(&mut |expr| {
            if pred(expr) {
                count += 1;
            }
        });
        count
    }
}

/// A statement inside a synthesized function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Let { name: String, value: Expr },
    Expr(Expr),
    Return(Expr),
}

impl Stmt {
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        match self {
            Self::Let { value, .. } => value.walk(visit),
            Self::Expr(expr) | Self::Return(expr) => expr.walk(visit),
        }
    }
}

/// A synthesized subclass whose overrides run the interceptor chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedClass {
    pub name: String,
    pub base: String,
    pub params: Vec<String>,
    pub constructor: Vec<Stmt>,
    pub methods: Vec<MethodOverride>,
}

impl EnhancedClass {
    pub fn method(&self, name: &str) -> Option<&MethodOverride> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodOverride {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// The generated variable holding a configured module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleVariable {
    pub variable: String,
    pub module: String,
    /// The method called on the new module instance to configure it.
    pub configure: String,
}

/// A top-level statement of an injector entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatement {
    /// Unconditional construction of an eager singleton into its variable.
    Materialize {
        class: String,
        variable: String,
        value: Expr,
    },
    /// The plan replacing one injection request.
    Inject {
        request: InjectionRequest,
        value: Expr,
    },
}

impl EntryStatement {
    pub fn value(&self) -> &Expr {
        match self {
            Self::Materialize { value, .. } | Self::Inject { value, .. } => value,
        }
    }
}

/// Everything the backend needs to rewrite one injector entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPlan {
    pub entry: String,
    /// Module variables, in the order the entry point lists its modules.
    pub modules: Vec<ModuleVariable>,
    /// Variables to be hoisted to the top of the entry point body.
    pub declarations: Vec<String>,
    /// Subclasses woven while resolving this entry point.
    pub enhanced: Vec<EnhancedClass>,
    /// Eager materializations first, then one injection per request.
    pub statements: Vec<EntryStatement>,
}

impl EntryPlan {
    /// Returns the plans of the injection requests, in request order.
    pub fn injections(&self) -> impl Iterator<Item = &Expr> {
        self.statements.iter().filter_map(|stmt| match stmt {
            EntryStatement::Inject { value, .. } => Some(value),
            EntryStatement::Materialize { .. } => None,
        })
    }

    pub fn enhanced_class(&self, base: &str) -> Option<&EnhancedClass> {
        self.enhanced.iter().find(|class| class.base == base)
    }
}
