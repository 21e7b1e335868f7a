use std::sync::Arc;

use weft::prelude::*;
use weft::model::RequestTarget;
use weft::plan::Stmt;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run(declarations: Declarations) -> (PassOutput, DiagnosticCollector) {
    init_tracing();
    let options = Options::default();
    let collector = DiagnosticCollector::new();
    let store = DeclarationStore::from_declarations(declarations, &options, &collector);
    let output = WeavePass::new(Arc::new(store), Arc::new(options)).run(&collector);
    (output, collector)
}

fn injections(output: &PassOutput, entry: &str) -> Vec<String> {
    output
        .plan(entry)
        .unwrap()
        .injections()
        .map(ToString::to_string)
        .collect()
}

const APP: &str = r#"{
    "classes": [
        { "name": "app.Repository", "params": ["url"] },
        { "name": "app.Service", "params": ["repository", "clock", "clockProvider"],
          "methods": [{ "name": "serve", "params": ["request"] }] },
        { "name": "app.Clock" },
        { "name": "app.Cache" }
    ],
    "modules": [{
        "name": "app.AppModule",
        "bindings": [
            { "key": "url", "target": { "kind": "instance", "expr": { "raw": "'db://local'" } } },
            { "key": "repository", "scope": "singleton",
              "target": { "kind": "type", "class": "app.Repository" } },
            { "key": "clock", "target": { "kind": "provider" } },
            { "key": "cache", "scope": "eager_singleton",
              "target": { "kind": "type", "class": "app.Cache" } }
        ],
        "interceptors": [{
            "class_matcher": { "kind": "in_namespace", "argument": "app" },
            "method_matcher": { "kind": "like", "argument": "ser*" },
            "body": "function(invocation) { return invocation.proceed(); }",
            "captures": { "method_name": true }
        }]
    }],
    "entries": [{
        "name": "main",
        "modules": ["app.AppModule"],
        "requests": [
            { "target": { "by": "class", "name": "app.Service" } },
            { "target": { "by": "key", "name": "repository" } },
            { "target": { "by": "key", "name": "missing" },
              "location": { "file": "main.js", "line": 7, "column": 3 } }
        ]
    }]
}"#;

#[test]
fn pass_resolves_json_declarations_succeeds() {
    let declarations: Declarations = serde_json::from_str(APP).unwrap();
    let (output, collector) = run(declarations);

    assert_eq!(
        injections(&output, "main"),
        vec![
            "new Enhanced$app_Service(\
             singletonInstance1 ? singletonInstance1 : \
             (singletonInstance1 = new app.Repository('db://local')), \
             app_AppModule.clock(), \
             function() { return app_AppModule.clock(); })",
            "singletonInstance1",
            "null",
        ]
    );

    let plan = output.plan("main").unwrap();
    assert_eq!(plan.modules[0].variable, "app_AppModule");
    assert_eq!(plan.modules[0].module, "app.AppModule");
    assert_eq!(plan.modules[0].configure, "configure");
    assert_eq!(
        plan.declarations,
        vec!["singletonInstance0", "singletonInstance1"]
    );
    assert!(plan.enhanced_class("app.Service").is_some());

    let diagnostics = collector.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), "WEFT_BINDING_NOT_FOUND");
    assert_eq!(diagnostics[0].args(), vec!["missing"]);
    assert_eq!(diagnostics[0].location.to_string(), "main.js:7:3");
}

#[test]
fn pass_output_serializes_succeeds() {
    let declarations: Declarations = serde_json::from_str(APP).unwrap();
    let (output, _) = run(declarations);

    let json = serde_json::to_string(&output).unwrap();
    let restored: PassOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, output);
}

#[test]
fn pass_resolves_instance_binding_verbatim() {
    let (output, collector) = run(Declarations {
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_instance("name", Expr::raw("{ answer: 42 }")))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_key("name"))],
        ..Default::default()
    });

    let plan = output.plan("main").unwrap();
    assert_eq!(
        plan.injections().collect::<Vec<_>>(),
        vec![&Expr::raw("{ answer: 42 }")]
    );
    assert!(collector.is_empty());
}

#[test]
fn pass_constructs_prototype_per_request() {
    let (output, _) = run(Declarations {
        classes: vec![ClassDescriptor::named("a.Foo")],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_type("foo", "a.Foo").in_scope(Scope::Prototype))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_key("foo"))
            .request(InjectionRequest::by_key("foo"))],
    });

    assert_eq!(
        injections(&output, "main"),
        vec!["new a.Foo()", "new a.Foo()"]
    );
    assert!(output.plan("main").unwrap().declarations.is_empty());
}

#[test]
fn pass_shares_singleton_within_entry() {
    let (output, _) = run(Declarations {
        classes: vec![
            ClassDescriptor::named("a.Foo"),
            ClassDescriptor::new("a.Bar", ["foo"]),
        ],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_type("foo", "a.Foo").in_scope(Scope::Singleton))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_class("a.Bar"))
            .request(InjectionRequest::by_class("a.Bar"))],
    });

    let plan = output.plan("main").unwrap();
    let constructions: usize = plan
        .injections()
        .map(|expr| expr.count(|e| matches!(e, Expr::New { class, .. } if class == "a.Foo")))
        .sum();
    assert_eq!(constructions, 1);
    assert_eq!(
        injections(&output, "main")[1],
        "new a.Bar(singletonInstance0)"
    );
}

#[test]
fn pass_materializes_eager_singletons_first() {
    let (output, _) = run(Declarations {
        classes: vec![
            ClassDescriptor::named("a.Foo"),
            ClassDescriptor::named("a.Eager"),
        ],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_type("foo", "a.Foo"))
            .bind(BindingDescriptor::to_type("eager", "a.Eager").in_scope(Scope::EagerSingleton))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_key("foo"))
            .request(InjectionRequest::by_key("eager"))],
    });

    let plan = output.plan("main").unwrap();
    assert_eq!(plan.statements.len(), 3);
    let EntryStatement::Materialize {
        class,
        variable,
        value,
    } = &plan.statements[0]
    else {
        panic!("the eager singleton should be materialized first");
    };
    assert_eq!(class, "a.Eager");
    assert_eq!(value.to_string(), format!("{variable} = new a.Eager()"));
    assert_eq!(
        injections(&output, "main"),
        vec!["new a.Foo()".to_string(), variable.clone()]
    );
}

#[test]
fn pass_chains_interceptors_in_declaration_order() {
    let (output, _) = run(Declarations {
        classes: vec![
            ClassDescriptor::named("a.Foo").with_method(MethodDescriptor::new("run", ["x"]))
        ],
        modules: vec![ModuleDescriptor::new("a.Module")
            .intercept(InterceptorDescriptor::new(
                ClassMatcher::InstanceOf("a.Foo".into()),
                MethodMatcher::Any,
                "function(invocation) { log(); return invocation.proceed(); }",
            ))
            .intercept(InterceptorDescriptor::new(
                ClassMatcher::SubNamespace("a".into()),
                MethodMatcher::Like("r*".into()),
                "function(invocation) { return invocation.proceed(); }",
            ))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_class("a.Foo"))],
    });

    let plan = output.plan("main").unwrap();
    assert_eq!(injections(&output, "main"), vec!["new Enhanced$a_Foo()"]);
    let enhanced = plan.enhanced_class("a.Foo").unwrap();
    let Some(Stmt::Return(chain)) = enhanced.method("run").unwrap().body.last() else {
        panic!("the override should return the chain");
    };

    let mut calls = Vec::new();
    chain.walk(&mut |expr| {
        if let Expr::Call { callee, .. } = expr {
            if let Expr::Member { property, .. } = callee.as_ref() {
                calls.push(property.as_str());
            }
        }
    });
    assert_eq!(calls, vec!["interceptor$0", "interceptor$1", "apply"]);
}

#[test]
fn pass_matches_namespaces_literally() {
    let interceptor = |matcher| {
        InterceptorDescriptor::new(matcher, MethodMatcher::Any, "function(invocation) {}")
    };
    let classes = ["a.b.Foo", "a.b.c.Foo", "a.bx.Foo"];
    let (output, _) = run(Declarations {
        classes: classes
            .iter()
            .map(|name| ClassDescriptor::named(*name).with_method(MethodDescriptor::new("run", [""; 0])))
            .collect(),
        modules: vec![
            ModuleDescriptor::new("a.Exact").intercept(interceptor(ClassMatcher::InNamespace(
                "a.b".into(),
            ))),
            ModuleDescriptor::new("a.Prefix").intercept(interceptor(ClassMatcher::SubNamespace(
                "a.b".into(),
            ))),
        ],
        entries: vec![
            InjectorEntry::new("exact", ["a.Exact"]),
            InjectorEntry::new("prefix", ["a.Prefix"]),
        ]
        .into_iter()
        .map(|entry| {
            classes
                .iter()
                .fold(entry, |entry, class| entry.request(InjectionRequest::by_class(*class)))
        })
        .collect(),
    });

    assert_eq!(
        injections(&output, "exact"),
        vec!["new Enhanced$a_b_Foo()", "new a.b.c.Foo()", "new a.bx.Foo()"]
    );
    assert_eq!(
        injections(&output, "prefix"),
        vec![
            "new Enhanced$a_b_Foo()",
            "new Enhanced$a_b_c_Foo()",
            "new Enhanced$a_bx_Foo()",
        ]
    );
}

#[test]
fn pass_constructs_plain_class() {
    let (output, collector) = run(Declarations {
        classes: vec![ClassDescriptor::named("Foo")],
        entries: vec![InjectorEntry::new("main", [""; 0])
            .request(InjectionRequest::by_class("Foo"))],
        ..Default::default()
    });

    let plan = output.plan("main").unwrap();
    assert_eq!(
        plan.injections().collect::<Vec<_>>(),
        vec![&Expr::new_instance("Foo", Vec::new())]
    );
    assert!(plan.enhanced.is_empty());
    assert!(!collector.has_errors());
    assert_eq!(collector.warning_count(), 1);
}

#[test]
fn pass_completes_when_binding_is_unknown() {
    let (output, collector) = run(Declarations {
        classes: vec![ClassDescriptor::named("a.Foo")],
        modules: vec![ModuleDescriptor::new("a.Module")],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_key("nowhere"))
            .request(InjectionRequest::by_class("a.Foo"))],
    });

    assert_eq!(injections(&output, "main"), vec!["null", "new a.Foo()"]);
    assert_eq!(collector.len(), 1);
    assert_eq!(collector.error_count(), 1);
    assert_eq!(
        collector.diagnostics()[0].kind.class(),
        weft::diagnostics::DiagnosticClass::Resolution
    );
}

#[test]
fn pass_sequences_setter_injection() {
    let (output, _) = run(Declarations {
        classes: vec![ClassDescriptor::named("a.Foo")
            .with_method(MethodDescriptor::new("setBar", ["bar"]))
            .with_method(MethodDescriptor::new("setBaz", ["baz"]))
            .with_setter("setBar")
            .with_setter("setBaz")],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_instance("bar", Expr::raw("1")))
            .bind(BindingDescriptor::to_instance("baz", Expr::raw("2")))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_class("a.Foo"))],
    });

    let plan = output.plan("main").unwrap();
    let Some(Expr::Sequence(sequence)) = plan.injections().next() else {
        panic!("setter injection should produce a sequence");
    };
    assert_eq!(sequence.len(), 4);
    let rendered: Vec<_> = sequence.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "instance$0 = new a.Foo()",
            "instance$0.setBar(1)",
            "instance$0.setBaz(2)",
            "instance$0",
        ]
    );
}

#[test]
fn pass_fails_when_binding_is_cyclic() {
    let (output, collector) = run(Declarations {
        classes: vec![
            ClassDescriptor::new("a.Foo", ["bar"]),
            ClassDescriptor::new("a.Bar", ["foo"]),
        ],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_type("foo", "a.Foo"))
            .bind(BindingDescriptor::to_type("bar", "a.Bar"))],
        entries: vec![InjectorEntry::new("main", ["a.Module"])
            .request(InjectionRequest::by_key("foo"))],
    });

    assert_eq!(
        injections(&output, "main"),
        vec!["new a.Foo(new a.Bar(null))"]
    );
    let diagnostics = collector.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), "WEFT_CYCLIC_BINDING");
    assert_eq!(diagnostics[0].args(), vec!["a.Foo -> a.Bar -> a.Foo"]);
}

#[test]
fn pass_isolates_entry_points() {
    let declarations = Declarations {
        classes: vec![ClassDescriptor::named("a.Foo")],
        modules: vec![
            ModuleDescriptor::new("a.Shared")
                .bind(BindingDescriptor::to_type("foo", "a.Foo").in_scope(Scope::Singleton)),
            ModuleDescriptor::new("a.Plain").bind(BindingDescriptor::to_type("foo", "a.Foo")),
        ],
        entries: vec![
            InjectorEntry::new("shared", ["a.Shared"]).request(InjectionRequest::by_key("foo")),
            InjectorEntry::new("plain", ["a.Plain"]).request(InjectionRequest::by_key("foo")),
        ],
    };
    let options = Arc::new(Options::default());
    let collector = DiagnosticCollector::new();
    let store = Arc::new(DeclarationStore::from_declarations(
        declarations,
        &options,
        &collector,
    ));
    let pass = WeavePass::new(store, options);

    let sequential = pass.run(&collector);
    let parallel = pass.run_parallel(&collector);

    assert_eq!(sequential, parallel);
    assert_eq!(
        injections(&sequential, "plain"),
        vec!["new a.Foo()"]
    );
    assert!(injections(&sequential, "shared")[0].starts_with("singletonInstance0 ?"));
    assert!(collector.is_empty());
}

#[test]
fn pass_reports_declaration_errors_and_continues() {
    let (output, collector) = run(Declarations {
        classes: vec![ClassDescriptor::named("a.Foo")],
        modules: vec![ModuleDescriptor::new("a.Module")
            .bind(BindingDescriptor::to_type("foo", "a.Foo"))
            .bind(BindingDescriptor::to_type("foo", "a.Foo").in_scope(Scope::Singleton))
            .bind(BindingDescriptor::to_instance("bar", Expr::raw("1")).in_scope(Scope::Singleton))],
        entries: vec![InjectorEntry::new("main", ["a.Module", "a.Missing"])
            .request(InjectionRequest::by_key("foo"))
            .request(InjectionRequest::by_class("a.Foo"))],
    });

    let mut codes: Vec<_> = collector.diagnostics().iter().map(|d| d.code()).collect();
    codes.sort_unstable();
    assert_eq!(
        codes,
        vec![
            "WEFT_AMBIGUOUS_BINDING",
            "WEFT_BINDING_NOT_FOUND",
            "WEFT_SCOPE_ON_NON_TYPE_BINDING",
            "WEFT_UNKNOWN_MODULE",
        ]
    );
    assert_eq!(injections(&output, "main"), vec!["null", "new a.Foo()"]);
    let plan = output.plan("main").unwrap();
    assert_eq!(plan.modules.len(), 1);
    assert!(matches!(
        plan.statements[0],
        EntryStatement::Inject {
            request: InjectionRequest {
                target: RequestTarget::Key(ref key),
                ..
            },
            ..
        } if key == "foo"
    ));
}
