use crate::analysis::{
    analyze_delegate, analyze_local_functions, analyze_method, analyze_type, AnalysisContext,
};
use crate::config::{GenConfig, TypeConvention};
use crate::errors::{DiagnosticBag, GenError, GenWarning};
use crate::pipeline::CancellationToken;
use crate::sema::Compilation;
use crate::syntax::ast::*;
use crate::syntax::{SyntaxFactory, SyntaxReceiver};

fn run_methods(
    f: SyntaxFactory,
    units: Vec<CompilationUnit>,
    config: GenConfig,
) -> (DiagnosticBag, Vec<crate::pipeline::ValidatedMethod>) {
    let compilation = Compilation::build(units, f.interner);
    let receiver = SyntaxReceiver::collect(&compilation.units, &compilation.interner);
    let cancel = CancellationToken::new();
    let mut bag = DiagnosticBag::new();
    let mut records = Vec::new();
    let ctx = AnalysisContext {
        compilation: &compilation,
        assembly_config: &config,
        cancel: &cancel,
    };
    for &node in &receiver.methods {
        if let Some(record) = analyze_method(node, &ctx, &mut bag) {
            records.push(record);
        }
    }
    analyze_local_functions(&receiver.local_functions, &ctx, &mut bag);
    (bag, records)
}

fn first_error(bag: &DiagnosticBag) -> &GenError {
    &bag.errors.first().expect("expected an error").error
}

/// `partial class Container { public void Test<[DefaultParam(int)] T>(T value) {} }`
fn simple_candidate(f: &mut SyntaxFactory) -> CompilationUnit {
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    method.params = vec![f.param("value", t)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    f.unit(vec![MemberDecl::Type(class)])
}

#[test]
fn single_default_yields_single_strip() {
    let mut f = SyntaxFactory::new();
    let unit = simple_candidate(&mut f);
    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());

    assert!(bag.errors.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].strips, vec![1]);
    assert!(records[0].new_arities.is_empty());
}

#[test]
fn plain_param_after_default_is_an_ordering_error() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int), f.type_param("U")];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::DefaultParamNotTrailing { .. }
    ));
    // The only strip would substitute the plain parameter; nothing to emit.
    assert!(records.is_empty());
}

#[test]
fn invalid_middle_default_keeps_trailing_arity_alive() {
    let mut f = SyntaxFactory::new();
    // First default fails to resolve, second is fine: the deepest
    // reduction dies, the one-parameter reduction survives.
    let missing = f.named("NoSuchType");
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![
        f.default_param("T", missing),
        f.default_param("U", int),
    ];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::InvalidDefaultType { .. }
    ));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].strips, vec![1]);
}

#[test]
fn non_partial_containing_type_fails() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int)];

    let mut class = f.class("Container");
    class.is_partial = false;
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::ContainingTypeNotPartial { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn nesting_inside_marked_type_fails() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int.clone())];

    let mut class = f.class("Container");
    class.type_params = vec![f.default_param("TOuter", int)];
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(bag.errors
        .iter()
        .any(|e| matches!(e.error, GenError::NestedInsideDefaultGenericType { .. })));
    assert!(records.is_empty());
}

#[test]
fn generated_marker_blocks_reprocessing() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int)];
    method.attributes = vec![f.attr("DefgenGenerated", Vec::new())];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(first_error(&bag), GenError::AlreadyGenerated { .. }));
    assert!(records.is_empty());
}

#[test]
fn partial_method_is_rejected() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.is_partial = true;
    method.type_params = vec![f.default_param("T", int)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::MarkerOnPartialOrExtern { modifier: "partial", .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn static_default_type_is_rejected() {
    let mut f = SyntaxFactory::new();
    let mut helper = f.class("Helpers");
    helper.is_static = true;
    let helper_ref = f.named("Helpers");

    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", helper_ref)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class), MemberDecl::Type(helper)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::InvalidDefaultType { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn internal_default_leaks_through_public_signature() {
    let mut f = SyntaxFactory::new();
    let mut hidden = f.class("Hidden");
    hidden.access = Accessibility::Internal;
    let hidden_ref = f.named("Hidden");

    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", hidden_ref)];
    let t = f.named("T");
    method.params = vec![f.param("value", t)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class), MemberDecl::Type(hidden)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::DefaultTypeLessAccessible { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn unexposed_internal_default_is_exempt() {
    let mut f = SyntaxFactory::new();
    let mut hidden = f.class("Hidden");
    hidden.access = Accessibility::Internal;
    let hidden_ref = f.named("Hidden");

    // T is never part of the signature: internal filler is fine.
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", hidden_ref)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class), MemberDecl::Type(hidden)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(bag.errors.is_empty());
    assert_eq!(records.len(), 1);
}

#[test]
fn value_type_default_fails_class_constraint() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int)];
    method.constraint_clauses = vec![f.where_clause("T", vec![Constraint::ReferenceType])];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::ConstraintNotSatisfied { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn interface_constraint_is_checked_against_default() {
    let mut f = SyntaxFactory::new();
    let marker_iface = f.interface("IMarker");
    let iface_ref = f.named("IMarker");
    let mut impl_class = f.class("Implementation");
    impl_class.bases = vec![iface_ref.clone()];
    let impl_ref = f.named("Implementation");

    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", impl_ref)];
    method.constraint_clauses = vec![f.where_clause("T", vec![Constraint::Type(iface_ref)])];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![
        MemberDecl::Type(class),
        MemberDecl::Type(marker_iface),
        MemberDecl::Type(impl_class),
    ]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(bag.errors.is_empty());
    assert_eq!(records.len(), 1);
}

#[test]
fn sealed_default_cannot_serve_param_referencing_constraint() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let u_ref = f.named("U");
    let comparable = f.generic("IComparable", vec![u_ref]);
    let comparable_iface = {
        let mut iface = f.interface("IComparable");
        iface.type_params = vec![f.type_param("TItem")];
        iface
    };

    let mut method = f.method("Test");
    method.type_params = vec![f.type_param("U"), f.default_param("T", int)];
    method.constraint_clauses = vec![f.where_clause("T", vec![Constraint::Type(comparable)])];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![
        MemberDecl::Type(class),
        MemberDecl::Type(comparable_iface),
    ]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::ConstraintReferencesOtherParam { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn same_type_collision_is_fatal() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut marked = f.method("Test");
    marked.type_params = vec![f.default_param("T", int.clone())];
    let t = f.named("T");
    marked.params = vec![f.param("value", t)];

    let mut existing = f.method("Test");
    existing.params = vec![f.param("value", int)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(marked), MemberDecl::Method(existing)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::GeneratedSignatureExists { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn inherited_collision_resolves_with_new_modifier() {
    let mut f = SyntaxFactory::new();
    let int = f.int();

    let mut base_method = f.method("Test");
    base_method.params = vec![f.param("value", int.clone())];
    let mut base = f.class("Base");
    base.members = vec![MemberDecl::Method(base_method)];
    let base_ref = f.named("Base");

    let mut marked = f.method("Test");
    marked.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    marked.params = vec![f.param("value", t)];

    let mut derived = f.class("Derived");
    derived.bases = vec![base_ref];
    derived.members = vec![MemberDecl::Method(marked)];

    let unit = f.unit(vec![MemberDecl::Type(base), MemberDecl::Type(derived)]);
    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());

    assert!(bag.errors.is_empty());
    assert_eq!(records.len(), 1);
    assert!(records[0].new_arities.contains(&1));
}

#[test]
fn inherited_collision_without_new_allowance_is_fatal() {
    let mut f = SyntaxFactory::new();
    let int = f.int();

    let mut base_method = f.method("Test");
    base_method.params = vec![f.param("value", int.clone())];
    let mut base = f.class("Base");
    base.members = vec![MemberDecl::Method(base_method)];
    let base_ref = f.named("Base");

    let mut marked = f.method("Test");
    marked.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    marked.params = vec![f.param("value", t)];

    let mut derived = f.class("Derived");
    derived.bases = vec![base_ref];
    derived.members = vec![MemberDecl::Method(marked)];

    let unit = f.unit(vec![MemberDecl::Type(base), MemberDecl::Type(derived)]);
    let config = GenConfig {
        apply_new: false,
        ..GenConfig::default()
    };
    let (bag, records) = run_methods(f, vec![unit], config);

    assert!(matches!(
        first_error(&bag),
        GenError::GeneratedSignatureExists { .. }
    ));
    assert!(records.is_empty());
}

fn override_pair(
    f: &mut SyntaxFactory,
    base_default: Option<TypeRef>,
    derived_default: Option<TypeRef>,
) -> Vec<CompilationUnit> {
    let mut base_method = f.method("Test");
    base_method.is_virtual = true;
    base_method.type_params = vec![match base_default {
        Some(ty) => f.default_param("T", ty),
        None => f.type_param("T"),
    }];
    let t = f.named("T");
    base_method.params = vec![f.param("value", t)];

    let mut base = f.class("Base");
    base.members = vec![MemberDecl::Method(base_method)];
    let base_ref = f.named("Base");

    let mut derived_method = f.method("Test");
    derived_method.is_override = true;
    derived_method.type_params = vec![match derived_default {
        Some(ty) => f.default_param("T", ty),
        None => f.type_param("T"),
    }];
    let t = f.named("T");
    derived_method.params = vec![f.param("value", t)];

    let mut derived = f.class("Derived");
    derived.bases = vec![base_ref];
    derived.members = vec![MemberDecl::Method(derived_method)];

    vec![f.unit(vec![MemberDecl::Type(base), MemberDecl::Type(derived)])]
}

#[test]
fn override_with_matching_default_is_fine() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let units = override_pair(&mut f, Some(int.clone()), Some(int));
    let (bag, records) = run_methods(f, units, GenConfig::default());

    assert!(bag.errors.is_empty());
    // Base and override both validate and generate.
    assert_eq!(records.len(), 2);
}

#[test]
fn override_inherits_default_silently_with_warning() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let units = override_pair(&mut f, Some(int), None);
    let (bag, records) = run_methods(f, units, GenConfig::default());

    assert!(bag.errors.is_empty());
    assert!(bag.warnings
        .iter()
        .any(|w| matches!(w.warning, GenWarning::MarkerMissingOnOverride { .. })));
    // The override still generates through the inherited default.
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].strips, vec![1]);
}

#[test]
fn override_with_diverging_default_is_fatal() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let string = f.string();
    let units = override_pair(&mut f, Some(string), Some(int));
    let (bag, records) = run_methods(f, units, GenConfig::default());

    assert!(bag.errors
        .iter()
        .any(|e| matches!(e.error, GenError::OverrideDefaultMismatch { .. })));
    // Base record still validates on its own.
    assert_eq!(records.len(), 1);
}

#[test]
fn override_divergence_allowed_by_configuration() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let string = f.string();
    let units = override_pair(&mut f, Some(string), Some(int));
    let config = GenConfig {
        allow_override_divergence: true,
        ..GenConfig::default()
    };
    let (bag, records) = run_methods(f, units, config);

    assert!(bag.errors.is_empty());
    assert_eq!(records.len(), 2);
}

#[test]
fn override_adding_default_is_gated() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let units = override_pair(&mut f, None, Some(int));
    let (bag, _records) = run_methods(f, units, GenConfig::default());

    assert!(bag.errors
        .iter()
        .any(|e| matches!(e.error, GenError::DefaultAddedInOverride { .. })));
}

#[test]
fn marker_on_local_function_is_reported() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut local = f.local_function("Helper");
    local.type_params = vec![f.default_param("T", int)];

    let mut method = f.method("Outer");
    method.body = Some(Block {
        stmts: vec![Stmt::LocalFunction(local)],
        span: crate::syntax::Span::dummy(),
    });

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let (bag, records) = run_methods(f, vec![unit], GenConfig::default());
    assert!(matches!(
        first_error(&bag),
        GenError::MarkerOnLocalFunction { .. }
    ));
    assert!(records.is_empty());
}

#[test]
fn inherit_convention_falls_back_on_sealed_type() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut class = f.class("Container");
    class.is_sealed = true;
    class.type_params = vec![f.default_param("T", int)];
    let node = class.id;
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let compilation = Compilation::build(vec![unit], f.interner);
    let cancel = CancellationToken::new();
    let config = GenConfig::default();
    let mut bag = DiagnosticBag::new();
    let ctx = AnalysisContext {
        compilation: &compilation,
        assembly_config: &config,
        cancel: &cancel,
    };
    let record = analyze_type(node, &ctx, &mut bag).expect("type should validate");

    assert_eq!(record.convention, TypeConvention::Copy);
    assert!(bag
        .warnings
        .iter()
        .any(|w| matches!(w.warning, GenWarning::InheritConventionImpossible { .. })));
}

#[test]
fn delegate_with_default_validates() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut delegate = f.delegate("Callback");
    delegate.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    delegate.params = vec![f.param("value", t)];
    let node = delegate.id;
    let unit = f.unit(vec![MemberDecl::Delegate(delegate)]);

    let compilation = Compilation::build(vec![unit], f.interner);
    let cancel = CancellationToken::new();
    let config = GenConfig::default();
    let mut bag = DiagnosticBag::new();
    let ctx = AnalysisContext {
        compilation: &compilation,
        assembly_config: &config,
        cancel: &cancel,
    };
    let record = analyze_delegate(node, &ctx, &mut bag).expect("delegate should validate");

    assert!(bag.errors.is_empty());
    assert_eq!(record.strips, vec![1]);
}

#[test]
fn cancelled_token_stops_analysis() {
    let mut f = SyntaxFactory::new();
    let unit = simple_candidate(&mut f);
    let compilation = Compilation::build(vec![unit], f.interner);
    let receiver = SyntaxReceiver::collect(&compilation.units, &compilation.interner);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let config = GenConfig::default();
    let mut bag = DiagnosticBag::new();
    let ctx = AnalysisContext {
        compilation: &compilation,
        assembly_config: &config,
        cancel: &cancel,
    };
    let record = analyze_method(receiver.methods[0], &ctx, &mut bag);
    assert!(record.is_none());
    assert!(bag.errors.is_empty());
}
