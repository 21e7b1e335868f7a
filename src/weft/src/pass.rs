use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, Snafu};

use crate::config::Options;
use crate::context::ContextBuilder;
use crate::diagnostics::DiagnosticSink;
use crate::matcher::Matcher;
use crate::model::{DeclarationStore, InjectorEntry};
use crate::plan::EntryPlan;
use crate::resolver::Resolver;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PassError {
    #[snafu(display("no injector entry point is named {entry}"))]
    #[non_exhaustive]
    EntryNotFound { entry: String },
}

/// Resolves every injector entry point of a [`DeclarationStore`].
///
/// Each entry point is drained in its own [`ResolutionContext`], so entry
/// points never observe each other's singletons or woven classes.
///
/// [`ResolutionContext`]: crate::context::ResolutionContext
#[derive(Debug, Clone)]
pub struct WeavePass {
    store: Arc<DeclarationStore>,
    options: Arc<Options>,
}

impl WeavePass {
    pub fn new(store: Arc<DeclarationStore>, options: Arc<Options>) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<DeclarationStore> {
        &self.store
    }

    pub fn options(&self) -> &Arc<Options> {
        &self.options
    }

    /// Runs every entry point in declaration order on the calling thread.
    pub fn run(&self, sink: &dyn DiagnosticSink) -> PassOutput {
        let plans = self
            .store
            .entries()
            .iter()
            .map(|entry| self.run_entry(entry, sink))
            .collect();
        PassOutput { plans }
    }

    /// Runs every entry point on its own scoped thread.
    ///
    /// The plans come back in declaration order; only the interleaving of
    /// the reported diagnostics differs from [`WeavePass::run`].
    pub fn run_parallel(&self, sink: &dyn DiagnosticSink) -> PassOutput {
        let plans = thread::scope(|scope| {
            let handles: Vec<_> = self
                .store
                .entries()
                .iter()
                .map(|entry| scope.spawn(move || self.run_entry(entry, sink)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        });
        PassOutput { plans }
    }

    /// Runs the entry point named `name` alone.
    pub fn run_named(&self, name: &str, sink: &dyn DiagnosticSink) -> Result<EntryPlan, PassError> {
        let entry = self
            .store
            .entry(name)
            .context(EntryNotFoundSnafu { entry: name })?;
        Ok(self.run_entry(entry, sink))
    }

    fn run_entry(&self, entry: &InjectorEntry, sink: &dyn DiagnosticSink) -> EntryPlan {
        let span = tracing::debug_span!("entry", entry = %entry.name);
        let _guard = span.enter();

        let mut context = ContextBuilder::new(&self.store, &self.options).build(entry);
        Matcher::new(&self.store, self.options.namespace_matching).annotate(&mut context, sink);

        let mut resolver = Resolver::new(&mut context, sink);
        resolver.materialize_eager();
        for request in &entry.requests {
            resolver.inject(request);
        }

        let plan = context.into_plan();
        tracing::debug!(
            statements = plan.statements.len(),
            enhanced = plan.enhanced.len(),
            declarations = plan.declarations.len(),
            "entry resolved"
        );
        plan
    }
}

/// The plans of one pass, one per injector entry point in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassOutput {
    pub plans: Vec<EntryPlan>,
}

impl PassOutput {
    pub fn plan(&self, entry: &str) -> Option<&EntryPlan> {
        self.plans.iter().find(|plan| plan.entry == entry)
    }
}
