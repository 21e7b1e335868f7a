use crate::config::Options;
use crate::context::ContextInterceptor;
use crate::model::MethodDescriptor;
use crate::plan::{Expr, Stmt};

/// Builds override bodies that run a method through its interceptors.
pub struct ChainBuilder<'a> {
    options: &'a Options,
    class: &'a str,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(options: &'a Options, class: &'a str) -> Self {
        Self { options, class }
    }

    /// Captures the receiver and the arguments, then returns the result of
    /// the chain.
    pub fn body(
        &self,
        method: &MethodDescriptor,
        interceptors: &[&ContextInterceptor<'_>],
    ) -> Vec<Stmt> {
        let slice = Expr::member(
            Expr::member(Expr::member(Expr::name("Array"), "prototype"), "slice"),
            "call",
        );
        vec![
            Stmt::Let {
                name: self.options.interceptor_args.clone(),
                value: Expr::call(slice, vec![Expr::Arguments]),
            },
            Stmt::Let {
                name: self.options.interceptor_this.clone(),
                value: Expr::This,
            },
            Stmt::Return(self.chain(method, interceptors)),
        ]
    }

    /// Folds the interceptors from the last to the first around the original
    /// method, so the first one runs outermost and each `proceed` reaches the
    /// next one.
    pub fn chain(
        &self,
        method: &MethodDescriptor,
        interceptors: &[&ContextInterceptor<'_>],
    ) -> Expr {
        let guarded = interceptors.len() > 1;
        interceptors
            .iter()
            .rev()
            .fold(self.original(method), |next, interceptor| {
                self.invoke(method, interceptor, Expr::thunk(next), guarded)
            })
    }

    /// `Class.prototype.method.apply(this, args)`
    fn original(&self, method: &MethodDescriptor) -> Expr {
        let function = Expr::member(
            Expr::member(Expr::name(self.class), "prototype"),
            method.name.as_str(),
        );
        Expr::call(
            Expr::member(function, "apply"),
            vec![
                Expr::name(self.options.interceptor_this.as_str()),
                Expr::name(self.options.interceptor_args.as_str()),
            ],
        )
    }

    fn invoke(
        &self,
        method: &MethodDescriptor,
        interceptor: &ContextInterceptor<'_>,
        proceed: Expr,
        guarded: bool,
    ) -> Expr {
        let captures = &interceptor.interceptor.captures;
        let class_name = if captures.class_name { self.class } else { "" };
        let method_name = if captures.method_name {
            method.name.as_str()
        } else {
            ""
        };
        let module = Expr::name(interceptor.module_variable.as_str());
        let call = Expr::call(
            Expr::member(module.clone(), interceptor.interceptor.name.as_str()),
            vec![
                Expr::name(self.options.interceptor_this.as_str()),
                Expr::name(self.options.interceptor_args.as_str()),
                Expr::str(class_name),
                Expr::str(method_name),
                proceed,
            ],
        );
        if guarded {
            Expr::and(module, call)
        } else {
            call
        }
    }
}
