//! Decides which interceptors apply to which methods.

mod pattern;

use std::collections::{HashMap, HashSet};

use crate::config::NamespaceMatching;
use crate::context::ResolutionContext;
use crate::diagnostics::{self, DiagnosticKind, DiagnosticSink};
use crate::model::{
    ClassDescriptor, ClassMatcher, DeclarationStore, MethodDescriptor, MethodMatcher,
};

pub use pattern::{GlobPattern, NamespacePattern};

/// Evaluates matchers against declared classes and methods.
///
/// Compiled patterns are cached for the lifetime of the matcher.
pub struct Matcher<'s> {
    store: &'s DeclarationStore,
    mode: NamespaceMatching,
    globs: HashMap<String, Option<GlobPattern>>,
    exact_namespaces: HashMap<String, NamespacePattern>,
    prefix_namespaces: HashMap<String, NamespacePattern>,
}

impl<'s> Matcher<'s> {
    pub fn new(store: &'s DeclarationStore, mode: NamespaceMatching) -> Self {
        Self {
            store,
            mode,
            globs: HashMap::new(),
            exact_namespaces: HashMap::new(),
            prefix_namespaces: HashMap::new(),
        }
    }

    pub fn matches_class(&mut self, matcher: &ClassMatcher, class: &ClassDescriptor) -> bool {
        match matcher {
            ClassMatcher::InNamespace(namespace) => {
                let candidate = match (self.mode, class.name.contains('.')) {
                    (NamespaceMatching::Legacy, false) => class.name.as_str(),
                    _ => class.namespace(),
                };
                let mode = self.mode;
                self.exact_namespaces
                    .entry(namespace.clone())
                    .or_insert_with(|| NamespacePattern::exact(namespace, mode))
                    .is_exact_match(candidate)
            }
            ClassMatcher::SubNamespace(namespace) => {
                let mode = self.mode;
                self.prefix_namespaces
                    .entry(namespace.clone())
                    .or_insert_with(|| NamespacePattern::prefix(namespace, mode))
                    .is_prefix_match(&class.name)
            }
            ClassMatcher::SubclassOf(base) => self.is_subclass_of(class, base),
            ClassMatcher::InstanceOf(name) => class.name == *name,
            ClassMatcher::Any => true,
        }
    }

    pub fn matches_method(&mut self, matcher: &MethodMatcher, method: &MethodDescriptor) -> bool {
        match matcher {
            MethodMatcher::Like(glob) => self
                .globs
                .entry(glob.clone())
                .or_insert_with(|| GlobPattern::compile(glob).ok())
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(&method.name)),
            MethodMatcher::Any => true,
        }
    }

    /// Walks the declared base chain of `class`, looking for `base`.
    fn is_subclass_of(&self, class: &ClassDescriptor, base: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = class.base.as_deref();
        while let Some(name) = current {
            if name == base {
                return true;
            }
            if !visited.insert(name) {
                break;
            }
            current = self
                .store
                .class(name)
                .and_then(|class| class.base.as_deref());
        }
        false
    }

    /// Records, on every class of `context`, which interceptors match which
    /// of its methods.
    pub fn annotate(&mut self, context: &mut ResolutionContext<'_>, sink: &dyn DiagnosticSink) {
        let store = context.store();
        let interceptors: Vec<_> = context
            .interceptors()
            .iter()
            .map(|interceptor| interceptor.interceptor)
            .collect();
        let mut reported = HashSet::new();

        for (c, class) in store.classes().iter().enumerate() {
            for (k, interceptor) in interceptors.iter().enumerate() {
                if !self.matches_class(&interceptor.class_matcher, class) {
                    continue;
                }
                for (m, method) in class.methods.iter().enumerate() {
                    if !self.matches_method(&interceptor.method_matcher, method) {
                        continue;
                    }
                    if method.ambiguous {
                        if reported.insert((c, m)) {
                            diagnostics::emit(
                                sink,
                                DiagnosticKind::AmbiguousMethod {
                                    class: class.name.clone(),
                                    method: method.name.clone(),
                                },
                                &method.location,
                            );
                        }
                        continue;
                    }

                    let state = context.class_at_mut(c);
                    if !state.matched[m].contains(&k) {
                        tracing::trace!(
                            class = %class.name,
                            method = %method.name,
                            interceptor = %interceptor.name,
                            "interceptor matched"
                        );
                        state.matched[m].push(k);
                    }
                    state.intercepted = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Options;
    use crate::context::ContextBuilder;
    use crate::diagnostics::MockDiagnosticSink;
    use crate::model::{InjectorEntry, InterceptorDescriptor, ModuleDescriptor};

    use super::*;

    fn store() -> DeclarationStore {
        DeclarationStore::new(
            vec![
                ClassDescriptor::named("a.Base"),
                ClassDescriptor::named("a.b.Middle").extends("a.Base"),
                ClassDescriptor::named("a.b.c.Leaf").extends("a.b.Middle"),
                ClassDescriptor::named("a.bx.Other").extends("x.Undeclared"),
                ClassDescriptor::named("Loop").extends("Loop"),
            ],
            Vec::new(),
            Vec::new(),
        )
    }

    fn class(store: &DeclarationStore, name: &str) -> ClassDescriptor {
        ClassDescriptor::clone(store.class(name).unwrap())
    }

    #[test]
    fn matcher_matches_class_by_namespace_succeeds() {
        let store = store();
        let mut matcher = Matcher::new(&store, NamespaceMatching::Literal);
        let in_namespace = ClassMatcher::InNamespace("a.b".into());
        let sub_namespace = ClassMatcher::SubNamespace("a.b".into());

        assert!(matcher.matches_class(&in_namespace, &class(&store, "a.b.Middle")));
        assert!(!matcher.matches_class(&in_namespace, &class(&store, "a.b.c.Leaf")));
        assert!(!matcher.matches_class(&in_namespace, &class(&store, "a.bx.Other")));
        assert!(matcher.matches_class(&sub_namespace, &class(&store, "a.b.Middle")));
        assert!(matcher.matches_class(&sub_namespace, &class(&store, "a.b.c.Leaf")));
        assert!(!matcher.matches_class(&sub_namespace, &class(&store, "a.Base")));
    }

    #[test]
    fn matcher_matches_class_by_legacy_namespace_succeeds() {
        let store = DeclarationStore::new(
            vec![ClassDescriptor::named("axb.Foo"), ClassDescriptor::named("Foo")],
            Vec::new(),
            Vec::new(),
        );
        let mut matcher = Matcher::new(&store, NamespaceMatching::Legacy);

        assert!(matcher.matches_class(
            &ClassMatcher::InNamespace("a.b".into()),
            &class(&store, "axb.Foo")
        ));
        assert!(matcher.matches_class(
            &ClassMatcher::InNamespace("Foo".into()),
            &class(&store, "Foo")
        ));
    }

    #[test]
    fn matcher_matches_class_by_hierarchy_succeeds() {
        let store = store();
        let mut matcher = Matcher::new(&store, NamespaceMatching::Literal);
        let leaf = class(&store, "a.b.c.Leaf");

        assert!(matcher.matches_class(&ClassMatcher::SubclassOf("a.b.Middle".into()), &leaf));
        assert!(matcher.matches_class(&ClassMatcher::SubclassOf("a.Base".into()), &leaf));
        assert!(!matcher.matches_class(&ClassMatcher::SubclassOf("a.b.c.Leaf".into()), &leaf));
        assert!(!matcher.matches_class(&ClassMatcher::InstanceOf("a.Base".into()), &leaf));
        assert!(matcher.matches_class(&ClassMatcher::InstanceOf("a.b.c.Leaf".into()), &leaf));
        assert!(matcher.matches_class(
            &ClassMatcher::SubclassOf("x.Undeclared".into()),
            &class(&store, "a.bx.Other")
        ));
        assert!(!matcher.matches_class(
            &ClassMatcher::SubclassOf("a.Base".into()),
            &class(&store, "Loop")
        ));
    }

    #[test]
    fn matcher_matches_method_succeeds() {
        let store = DeclarationStore::default();
        let mut matcher = Matcher::new(&store, NamespaceMatching::Literal);
        let method = MethodDescriptor::new("getName", [""; 0]);

        assert!(matcher.matches_method(&MethodMatcher::Like("get*".into()), &method));
        assert!(matcher.matches_method(&MethodMatcher::Like("get".into()), &method));
        assert!(!matcher.matches_method(&MethodMatcher::Like("set*".into()), &method));
        assert!(matcher.matches_method(&MethodMatcher::Any, &method));
    }

    #[test]
    fn matcher_annotate_succeeds() {
        let mut ambiguous = MethodDescriptor::new("rush", [""; 0]);
        ambiguous.ambiguous = true;
        let store = DeclarationStore::new(
            vec![
                ClassDescriptor::named("a.Foo")
                    .with_method(MethodDescriptor::new("run", [""; 0]))
                    .with_method(MethodDescriptor::new("rest", [""; 0]))
                    .with_method(ambiguous),
                ClassDescriptor::named("b.Bar").with_method(MethodDescriptor::new("run", [""; 0])),
            ],
            vec![ModuleDescriptor::new("a.Module")
                .intercept(InterceptorDescriptor::new(
                    ClassMatcher::InNamespace("a".into()),
                    MethodMatcher::Any,
                    "function(invocation) {}",
                ))
                .intercept(InterceptorDescriptor::new(
                    ClassMatcher::Any,
                    MethodMatcher::Like("ru*".into()),
                    "function(invocation) {}",
                ))],
            vec![InjectorEntry::new("main", ["a.Module"])],
        );
        let options = Options::default();
        let mut context = ContextBuilder::new(&store, &options).build(&store.entries()[0]);
        let mut sink = MockDiagnosticSink::new();
        sink.expect_report()
            .withf(|diagnostic| diagnostic.code() == "WEFT_AMBIGUOUS_METHOD")
            .times(1)
            .return_const(());

        Matcher::new(&store, options.namespace_matching).annotate(&mut context, &sink);

        let foo = context.class("a.Foo").unwrap();
        assert!(foo.intercepted);
        assert_eq!(foo.matched_on("run"), &[0, 1]);
        assert_eq!(foo.matched_on("rest"), &[0]);
        assert!(foo.matched_on("rush").is_empty());

        let bar = context.class("b.Bar").unwrap();
        assert_eq!(bar.matched_on("run"), &[1]);
    }
}
