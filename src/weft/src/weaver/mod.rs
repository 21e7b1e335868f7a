//! Synthesizes interceptor-aware subclasses.

mod chain;

use crate::context::ResolutionContext;
use crate::plan::{EnhancedClass, Expr, MethodOverride, Stmt};
use crate::util;

pub use chain::ChainBuilder;

/// Weaves the class at `index` unless it was already woven in `context`.
///
/// The enhanced subclass forwards its constructor parameters to the original
/// class and overrides every method with matched interceptors. Afterwards
/// the class is constructed through the subclass.
pub fn weave(context: &mut ResolutionContext<'_>, index: usize) {
    let state = context.class_at(index);
    if state.woven || !state.intercepted {
        return;
    }

    let options = context.options();
    let descriptor = &context.store().classes()[index];
    let chain = ChainBuilder::new(options, &descriptor.name);
    let methods = descriptor
        .methods
        .iter()
        .zip(&state.matched)
        .filter(|(method, matched)| !matched.is_empty() && !method.ambiguous)
        .map(|(method, matched)| {
            let interceptors: Vec<_> = matched
                .iter()
                .map(|&k| &context.interceptors()[k])
                .collect();
            MethodOverride {
                name: method.name.clone(),
                params: method.params.clone(),
                body: chain.body(method, &interceptors),
            }
        })
        .collect();
    let enhanced = EnhancedClass {
        name: format!(
            "{}{}",
            options.enhanced_prefix,
            util::variable_name(&descriptor.name)
        ),
        base: descriptor.name.clone(),
        params: descriptor.params.clone(),
        constructor: vec![Stmt::Expr(Expr::call(
            Expr::Super,
            descriptor.params.iter().map(Expr::name).collect(),
        ))],
        methods,
    };

    tracing::debug!(
        entry = %context.entry().name,
        class = %descriptor.name,
        enhanced = %enhanced.name,
        methods = enhanced.methods.len(),
        "class woven"
    );

    let state = context.class_at_mut(index);
    state.woven = true;
    state.constructed_name = enhanced.name.clone();
    context.push_enhanced(enhanced);
}
