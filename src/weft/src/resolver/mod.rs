//! Turns injection requests into instantiation plans.

mod trace;

use crate::context::ResolutionContext;
use crate::diagnostics::{self, DiagnosticKind, DiagnosticSink};
use crate::model::{BindingKind, BindingTarget, InjectionRequest, Location, RequestTarget};
use crate::plan::{EntryStatement, Expr};
use crate::scope::Scope;
use crate::weaver;

pub use trace::{InjectionTrace, TraceNode};

/// Resolves requests against one [`ResolutionContext`].
///
/// Resolution is depth-first and strictly sequential: later requests reuse
/// the singleton variables and woven classes earlier ones left behind.
pub struct Resolver<'c, 's> {
    context: &'c mut ResolutionContext<'s>,
    sink: &'c dyn DiagnosticSink,
    location: Location,
    /// Depth of provider functions handed out uninvoked around the current
    /// step.
    deferred: usize,
}

impl<'c, 's> Resolver<'c, 's> {
    pub fn new(context: &'c mut ResolutionContext<'s>, sink: &'c dyn DiagnosticSink) -> Self {
        let location = context.entry().location.clone();
        Self {
            context,
            sink,
            location,
            deferred: 0,
        }
    }

    pub fn context(&self) -> &ResolutionContext<'s> {
        self.context
    }

    /// Constructs every eager singleton up front, in binding order.
    pub fn materialize_eager(&mut self) {
        let eager: Vec<_> = self
            .context
            .bindings()
            .iter()
            .map(|binding| binding.binding)
            .filter(|binding| {
                binding.kind() == BindingKind::ToType && binding.effective_scope().is_eager()
            })
            .collect();

        for binding in eager {
            let Some(class) = binding
                .bound_class()
                .and_then(|class| self.context.class_position(class))
            else {
                tracing::debug!(key = %binding.key, "eager binding to an undeclared class");
                continue;
            };
            if !self.context.class_at(class).scope.is_eager() {
                continue;
            }
            self.location = binding.location.clone();
            self.resolve_class(class, &InjectionTrace::new());
        }
    }

    /// Resolves `request` and appends the result to the entry statements.
    pub fn inject(&mut self, request: &InjectionRequest) {
        let value = self.resolve(request);
        self.context.push_statement(EntryStatement::Inject {
            request: request.clone(),
            value,
        });
    }

    pub fn resolve(&mut self, request: &InjectionRequest) -> Expr {
        self.location = request.location.clone();
        let trace = InjectionTrace::new();
        match &request.target {
            RequestTarget::Class(name) => match self.context.class_position(name) {
                Some(class) => self.resolve_class(class, &trace),
                None => self.missing(DiagnosticKind::ClassNotFound {
                    class: name.clone(),
                }),
            },
            RequestTarget::Key(key) => match self.context.binding_position(key) {
                Some(binding) => self.resolve_binding(binding, &trace),
                None => self.missing(DiagnosticKind::BindingNotFound { key: key.clone() }),
            },
        }
    }

    fn resolve_binding(&mut self, index: usize, trace: &InjectionTrace<'_>) -> Expr {
        let binding = self.context.bindings()[index].binding;
        match &binding.target {
            BindingTarget::Type { class } => match self.context.class_position(class) {
                Some(class) => self.resolve_class(class, trace),
                None => self.missing(DiagnosticKind::ClassNotFound {
                    class: class.clone(),
                }),
            },
            BindingTarget::Instance { expr } => expr.clone(),
            BindingTarget::Provider { params } => self.call_provider(index, params, trace),
        }
    }

    /// Resolves a constructor, setter or provider parameter by its name.
    ///
    /// A name carrying the provider suffix, and not bound itself, asks for
    /// the provider of the stripped key as an uninvoked function.
    fn resolve_param(&mut self, name: &str, trace: &InjectionTrace<'_>) -> Expr {
        if let Some(binding) = self.context.binding_position(name) {
            return self.resolve_binding(binding, trace);
        }
        let Some(key) = self.context.options().strip_provider_suffix(name) else {
            return self.missing(DiagnosticKind::BindingNotFound {
                key: name.to_string(),
            });
        };
        let Some(index) = self.context.binding_position(key) else {
            return self.missing(DiagnosticKind::BindingNotFound {
                key: key.to_string(),
            });
        };
        let binding = self.context.bindings()[index].binding;
        match &binding.target {
            BindingTarget::Provider { params } => {
                self.deferred += 1;
                let call = self.call_provider(index, params, trace);
                self.deferred -= 1;
                Expr::thunk(call)
            }
            _ => self.missing(DiagnosticKind::BindingNotProvider {
                key: key.to_string(),
            }),
        }
    }

    /// `moduleVariable.key(params...)`
    fn call_provider(
        &mut self,
        index: usize,
        params: &'s [String],
        trace: &InjectionTrace<'_>,
    ) -> Expr {
        let binding = self.context.bindings()[index].binding;
        let node = TraceNode::Provider(&binding.key);
        if let Some(cycle) = self.check_cycle(trace, node) {
            return cycle;
        }
        let trace = trace.append(node);

        let module = self.context.bindings()[index].module_variable.clone();
        let args = params
            .iter()
            .map(|param| self.resolve_param(param, &trace))
            .collect();
        Expr::call(Expr::member(Expr::name(module), binding.key.as_str()), args)
    }

    fn resolve_class(&mut self, index: usize, trace: &InjectionTrace<'_>) -> Expr {
        let descriptor = &self.context.store().classes()[index];
        if let Some(cycle) = self.check_cycle(trace, TraceNode::Class(&descriptor.name)) {
            return cycle;
        }

        weaver::weave(self.context, index);

        let state = self.context.class_at(index);
        let (scope, cached, lazy) = (state.scope, state.singleton.clone(), state.lazy);
        tracing::trace!(class = %descriptor.name, scope = %scope, "resolving class");
        match cached {
            Some(variable) if lazy => {
                // Only a deferred function assigns it so far; construct on
                // first use again.
                let value = self.construct(index, Some(variable.clone()), trace);
                self.context.class_at_mut(index).lazy = self.deferred > 0;
                return Self::construct_once(variable, value);
            }
            Some(variable) => return Expr::name(variable),
            None => {}
        }

        match scope {
            Scope::Prototype => self.construct(index, None, trace),
            Scope::Singleton => {
                let variable = self.allocate_singleton(index);
                self.context.class_at_mut(index).lazy = self.deferred > 0;
                let value = self.construct(index, Some(variable.clone()), trace);
                Self::construct_once(variable, value)
            }
            Scope::EagerSingleton => {
                let variable = self.allocate_singleton(index);
                let value = self.construct(index, Some(variable.clone()), trace);
                self.context.push_statement(EntryStatement::Materialize {
                    class: descriptor.name.clone(),
                    variable: variable.clone(),
                    value,
                });
                Expr::name(variable)
            }
        }
    }

    /// `variable ? variable : value`
    fn construct_once(variable: String, value: Expr) -> Expr {
        Expr::conditional(
            Expr::name(variable.as_str()),
            Expr::name(variable),
            value,
        )
    }

    fn allocate_singleton(&mut self, index: usize) -> String {
        let variable = self.context.allocate_singleton();
        tracing::debug!(
            class = %self.context.class_at(index).name(),
            variable = %variable,
            "singleton variable allocated"
        );
        self.context.class_at_mut(index).singleton = Some(variable.clone());
        variable
    }

    /// Builds the `new` expression of the class, assigned to `target` when
    /// given, followed by its setter calls.
    fn construct(
        &mut self,
        index: usize,
        target: Option<String>,
        trace: &InjectionTrace<'_>,
    ) -> Expr {
        let descriptor = &self.context.store().classes()[index];
        let trace = trace.append(TraceNode::Class(&descriptor.name));

        let args = descriptor
            .params
            .iter()
            .map(|param| self.resolve_param(param, &trace))
            .collect();
        let instance = Expr::new_instance(
            self.context.class_at(index).constructed_name.as_str(),
            args,
        );
        if descriptor.setters.is_empty() {
            return match target {
                Some(variable) => Expr::assign(variable, instance),
                None => instance,
            };
        }

        let variable = match target {
            Some(variable) => variable,
            None => self.context.allocate_instance(),
        };
        let mut sequence = vec![Expr::assign(variable.as_str(), instance)];
        for setter in &descriptor.setters {
            let params = descriptor
                .method(setter)
                .map(|method| method.params.as_slice())
                .unwrap_or_default();
            let args = params
                .iter()
                .map(|param| self.resolve_param(param, &trace))
                .collect();
            sequence.push(Expr::call(
                Expr::member(Expr::name(variable.as_str()), setter.as_str()),
                args,
            ));
        }
        sequence.push(Expr::name(variable));
        Expr::Sequence(sequence)
    }

    fn check_cycle(&self, trace: &InjectionTrace<'_>, node: TraceNode<'_>) -> Option<Expr> {
        if self.context.options().detect_cycles && trace.contains(node) {
            Some(self.missing(DiagnosticKind::CyclicBinding {
                path: trace.cycle_path(node),
            }))
        } else {
            None
        }
    }

    /// Reports `kind` and yields the null sentinel in place of the value.
    fn missing(&self, kind: DiagnosticKind) -> Expr {
        diagnostics::emit(self.sink, kind, &self.location);
        Expr::Null
    }
}
