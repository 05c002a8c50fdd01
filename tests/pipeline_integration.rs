// tests/pipeline_integration.rs
//! End-to-end pipeline tests: receiver through generated source.

use defgen::analysis::AnalysisContext;
use defgen::config::GenConfig;
use defgen::errors::{DiagnosticBag, GenError, GenWarning};
use defgen::pipeline::{CancellationToken, DeclFilter, SpanCache};
use defgen::sema::Compilation;
use defgen::syntax::ast::*;
use defgen::syntax::{Span, SyntaxFactory, SyntaxReceiver};
use defgen::DefaultParamGenerator;

fn run(f: SyntaxFactory, units: Vec<CompilationUnit>) -> defgen::GeneratorOutput {
    run_with(f, units, GenConfig::default())
}

fn run_with(
    f: SyntaxFactory,
    units: Vec<CompilationUnit>,
    config: GenConfig,
) -> defgen::GeneratorOutput {
    let compilation = Compilation::build(units, f.interner);
    let generator = DefaultParamGenerator::new(config);
    generator.execute(&compilation, &CancellationToken::new())
}

/// `public void Test<T, [Default(int)] U, [Default(string)] V>(U u, V v)`
fn two_default_method(f: &mut SyntaxFactory) -> CompilationUnit {
    let int = f.int();
    let string = f.string();
    let mut method = f.method("Test");
    method.type_params = vec![
        f.type_param("T"),
        f.default_param("U", int),
        f.default_param("V", string),
    ];
    let u = f.named("U");
    let v = f.named("V");
    method.params = vec![f.param("u", u), f.param("v", v)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    f.unit(vec![MemberDecl::Type(class)])
}

#[test]
fn round_trip_generates_one_overload_per_default() {
    let mut f = SyntaxFactory::new();
    let unit = two_default_method(&mut f);
    let output = run(f, vec![unit]);

    assert!(output.diagnostics.errors.is_empty());
    assert_eq!(output.units.len(), 1);
    let source = &output.units[0].source;

    // Arity N-1 and N-2, each missing one more trailing parameter.
    assert!(source.contains("public void Test<T, U>(U u, string v)"));
    assert!(source.contains("public void Test<T>(int u, string v)"));
    // Call convention forwards with the full type-argument list.
    assert!(source.contains("Test<T, U, string>(u, v);"));
    assert!(source.contains("Test<T, int, string>(u, v);"));
    assert_eq!(output.units[0].hint_name, "Container.Test.g.cs");
}

#[test]
fn rerunning_the_pipeline_is_byte_identical() {
    let mut f1 = SyntaxFactory::new();
    let unit1 = two_default_method(&mut f1);
    let first = run(f1, vec![unit1]);

    let mut f2 = SyntaxFactory::new();
    let unit2 = two_default_method(&mut f2);
    let second = run(f2, vec![unit2]);

    assert_eq!(first.units, second.units);
}

#[test]
fn same_type_collision_suppresses_generation() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut marked = f.method("Test");
    marked.type_params = vec![f.type_param("T"), f.default_param("U", int.clone())];
    let u = f.named("U");
    marked.params = vec![f.param("u", u)];

    let mut existing = f.method("Test");
    existing.type_params = vec![f.type_param("T")];
    existing.params = vec![f.param("u", int)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(marked), MemberDecl::Method(existing)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.units.is_empty());
    assert!(output
        .diagnostics
        .errors
        .iter()
        .any(|e| matches!(e.error, GenError::GeneratedSignatureExists { .. })));
}

#[test]
fn inherited_collision_generates_with_new_modifier() {
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
    let output = run(f, vec![unit]);

    assert!(output.diagnostics.errors.is_empty());
    assert_eq!(output.units.len(), 1);
    assert!(output.units[0]
        .source
        .contains("public new void Test(int value)"));
}

#[test]
fn non_partial_nesting_fails_regardless_of_other_checks() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.type_params = vec![f.default_param("T", int)];

    let mut class = f.class("Container");
    class.is_partial = false;
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.units.is_empty());
    assert!(output
        .diagnostics
        .errors
        .iter()
        .any(|e| matches!(e.error, GenError::ContainingTypeNotPartial { .. })));
}

#[test]
fn copy_convention_duplicates_the_body() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let t_ref = f.named("T");
    let mut method = f.method("Make");
    method.type_params = vec![f.default_param("T", int)];
    method.return_type = t_ref.clone();
    method.body = Some(Block {
        stmts: vec![Stmt::Return(Some(Expr::Default(t_ref)))],
        span: Span::dummy(),
    });
    let copy_member = f.sym("MethodConvention.Copy");
    let convention = f.named_arg(
        "MethodConvention",
        AttrValue::EnumMember(copy_member),
    );
    method.attributes = vec![f.attr("DefaultParamConfiguration", vec![convention])];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.diagnostics.errors.is_empty());
    let source = &output.units[0].source;
    assert!(source.contains("public int Make()"));
    assert!(source.contains("return default(int);"));
    // The configuration attribute never reaches the output.
    assert!(!source.contains("DefaultParamConfiguration"));
}

#[test]
fn inherit_convention_produces_closed_generic_base() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut class = f.class("Collection");
    class.type_params = vec![f.type_param("T"), f.default_param("U", int)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.diagnostics.errors.is_empty());
    assert_eq!(output.units.len(), 1);
    let source = &output.units[0].source;
    assert!(source.contains("public class Collection<T> : Collection<T, int>"));
}

#[test]
fn delegate_overloads_are_generated() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut delegate = f.delegate("Callback");
    delegate.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    delegate.params = vec![f.param("value", t)];
    let unit = f.unit(vec![MemberDecl::Delegate(delegate)]);

    let output = run(f, vec![unit]);
    assert!(output.diagnostics.errors.is_empty());
    assert!(output.units[0]
        .source
        .contains("public delegate void Callback(int value);"));
}

#[test]
fn target_namespace_override_is_honored() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut class = f.class("Widget");
    class.type_params = vec![f.default_param("T", int)];
    let target = f.named_arg("TargetNamespace", AttrValue::Str("Custom.Space".to_string()));
    class.attributes = vec![f.attr("DefaultParamConfiguration", vec![target])];
    let unit = f.unit_in("App", vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.diagnostics.errors.is_empty());
    assert!(output.units[0].source.contains("namespace Custom.Space"));
}

#[test]
fn reserved_target_namespace_falls_back_with_warning() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut class = f.class("Widget");
    class.type_params = vec![f.default_param("T", int)];
    let target = f.named_arg(
        "TargetNamespace",
        AttrValue::Str("Defgen.Generated".to_string()),
    );
    class.attributes = vec![f.attr("DefaultParamConfiguration", vec![target])];
    let unit = f.unit_in("App", vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output
        .diagnostics
        .warnings
        .iter()
        .any(|w| matches!(w.warning, GenWarning::TargetNamespaceInvalid { .. })));
    assert!(output.units[0].source.contains("namespace App"));
}

#[test]
fn cancelled_pass_emits_nothing() {
    let mut f = SyntaxFactory::new();
    let unit = two_default_method(&mut f);
    let compilation = Compilation::build(vec![unit], f.interner);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let generator = DefaultParamGenerator::new(GenConfig::default());
    let output = generator.execute(&compilation, &cancel);

    assert!(output.units.is_empty());
    assert!(output.diagnostics.errors.is_empty());
}

#[test]
fn span_cache_reuses_validated_records() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.span = Span::new(10, 60, 2, 1);
    method.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    method.params = vec![f.param("value", t)];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let compilation = Compilation::build(vec![unit], f.interner);
    let receiver = SyntaxReceiver::collect(&compilation.units, &compilation.interner);
    let cancel = CancellationToken::new();
    let config = GenConfig::default();
    let ctx = AnalysisContext {
        compilation: &compilation,
        assembly_config: &config,
        cancel: &cancel,
    };
    let filter = DeclFilter::new(ctx, &receiver);

    let mut cache = SpanCache::new();
    let mut bag = DiagnosticBag::new();
    let first = filter.validate_all_cached(&mut cache, &mut bag);
    assert_eq!(first.len(), 1);
    assert_eq!(cache.len(), 1);

    let second = filter.validate_all_cached(&mut cache, &mut bag);
    assert_eq!(second.len(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn generated_members_carry_the_generated_marker() {
    let mut f = SyntaxFactory::new();
    let unit = two_default_method(&mut f);
    let output = run(f, vec![unit]);
    assert!(output.units[0].source.contains("[DefgenGenerated]"));
}

#[test]
fn configuration_without_defaults_warns() {
    let mut f = SyntaxFactory::new();
    let mut method = f.method("Plain");
    method.type_params = vec![f.type_param("T")];
    method.is_override = true; // candidate without markers
    let config_attr = f.attr("DefaultParamConfiguration", Vec::new());
    method.attributes = vec![config_attr];

    let mut class = f.class("Container");
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.units.is_empty());
    assert!(output
        .diagnostics
        .warnings
        .iter()
        .any(|w| matches!(w.warning, GenWarning::ConfigurationHasNoEffect { .. })));
}

#[test]
fn abstract_method_generates_signature_only() {
    let mut f = SyntaxFactory::new();
    let int = f.int();
    let mut method = f.method("Test");
    method.is_abstract = true;
    method.body = None;
    method.type_params = vec![f.default_param("T", int)];
    let t = f.named("T");
    method.params = vec![f.param("value", t)];

    let mut class = f.class("Container");
    class.is_abstract = true;
    class.members = vec![MemberDecl::Method(method)];
    let unit = f.unit(vec![MemberDecl::Type(class)]);

    let output = run(f, vec![unit]);
    assert!(output.diagnostics.errors.is_empty());
    assert!(output.units[0]
        .source
        .contains("public abstract void Test(int value);"));
}
