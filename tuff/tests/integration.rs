//! Integration tests for the Tuff interpreter
//!
//! Runs whole programs through `interpret` and checks display results and
//! error kinds end to end.

use std::collections::HashMap;
use tuff::interp::ErrorKind;
use tuff::{interpret, interpret_sources, Error};

fn run(source: &str) -> String {
    match interpret(source) {
        Ok(result) => result,
        Err(e) => panic!("program failed: {e}\nsource: {source}"),
    }
}

fn runtime_kind(source: &str) -> ErrorKind {
    match interpret(source) {
        Err(Error::Runtime(e)) => e.kind,
        Ok(v) => panic!("expected a runtime error, got {v:?}\nsource: {source}"),
        Err(e) => panic!("expected a runtime error, got {e}\nsource: {source}"),
    }
}

fn syntax_error(source: &str) -> bool {
    matches!(interpret(source), Err(Error::Compile(_)))
}

// ============================================
// Literals and display
// ============================================

#[test]
fn test_tagged_literals_display_without_suffix() {
    assert_eq!(run("255U8"), "255");
    assert_eq!(run("-1I8"), "-1");
    assert_eq!(run("0USize"), "0");
    assert_eq!(run("42"), "42");
}

#[test]
fn test_literal_out_of_range() {
    assert_eq!(runtime_kind("256U8"), ErrorKind::Range);
    assert_eq!(runtime_kind("128I8"), ErrorKind::Range);
    assert_eq!(runtime_kind("-129I8"), ErrorKind::Range);
}

#[test]
fn test_unsigned_negative_literal() {
    assert_eq!(runtime_kind("-100U8"), ErrorKind::UnsignedNegative);
}

#[test]
fn test_boolean_literals() {
    assert_eq!(run("true"), "true");
    assert_eq!(run("false"), "false");
}

#[test]
fn test_string_and_char_display_quoted() {
    assert_eq!(run("\"hello\""), "\"hello\"");
    assert_eq!(run("'a'"), "'a'");
}

#[test]
fn test_display_parse_round_trip_for_scalars() {
    for tag in ["U8", "U16", "U32", "U64", "USize", "I8", "I16", "I32", "I64", "ISize"] {
        let shown = run(&format!("100{tag}"));
        assert_eq!(run(&format!("{shown}{tag}")), shown);
    }
    assert_eq!(run(&run("true")), "true");
}

// ============================================
// Arithmetic and tags
// ============================================

#[test]
fn test_basic_arithmetic() {
    assert_eq!(run("1 + 2 * 3"), "7");
    assert_eq!(run("7 / 2"), "3");
    assert_eq!(run("-7 / 2"), "-3");
    assert_eq!(run("7 % 3"), "1");
    assert_eq!(run("(1 + 2) * 3"), "9");
}

#[test]
fn test_one_tag_is_adopted() {
    assert_eq!(run("100U8 + 50"), "150");
    assert_eq!(run("50 + 100U8"), "150");
}

#[test]
fn test_typed_result_is_range_checked() {
    assert_eq!(runtime_kind("200U8 + 100U8"), ErrorKind::Range);
    assert_eq!(runtime_kind("200U8 + 100"), ErrorKind::Range);
}

#[test]
fn test_mixed_tags_always_fail() {
    assert_eq!(runtime_kind("100U8 + 200U16"), ErrorKind::MixedType);
    assert_eq!(runtime_kind("1I8 + 1I16"), ErrorKind::MixedType);
    assert_eq!(runtime_kind("1U8 == 1U16"), ErrorKind::MixedType);
}

#[test]
fn test_division_by_zero() {
    assert_eq!(runtime_kind("1 / 0"), ErrorKind::DivisionByZero);
    assert_eq!(runtime_kind("5 % 0"), ErrorKind::DivisionByZero);
}

#[test]
fn test_kinds_never_mix() {
    assert_eq!(runtime_kind("true + 1"), ErrorKind::Type);
    assert_eq!(runtime_kind("1 && true"), ErrorKind::Type);
    assert_eq!(runtime_kind("true == 1"), ErrorKind::Type);
    assert_eq!(runtime_kind("\"a\" == \"a\""), ErrorKind::Type);
}

#[test]
fn test_comparisons_yield_booleans() {
    assert_eq!(run("5 < 10"), "true");
    assert_eq!(run("5 >= 10"), "false");
    assert_eq!(run("5 == 5"), "true");
    assert_eq!(run("5 != 5"), "false");
    assert_eq!(run("1U8 < 2U8"), "true");
}

#[test]
fn test_logical_operators() {
    assert_eq!(run("true && false"), "false");
    assert_eq!(run("true || false"), "true");
    assert_eq!(run("!true"), "false");
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    // no short-circuit: the right side runs even when the left decides
    assert_eq!(runtime_kind("true || 1 / 0 == 0"), ErrorKind::DivisionByZero);
    assert_eq!(runtime_kind("false && 1 / 0 == 0"), ErrorKind::DivisionByZero);
}

// ============================================
// Let, assignment, scoping
// ============================================

#[test]
fn test_let_and_use() {
    assert_eq!(run("let x = 5; x + 1"), "6");
}

#[test]
fn test_declarations_display_as_zero() {
    assert_eq!(run("let x : I32 = 100;"), "0");
    assert_eq!(run("fn f(a) => a;"), "0");
    assert_eq!(run("struct P { x : I32 }"), "0");
}

#[test]
fn test_immutable_by_default() {
    assert_eq!(
        runtime_kind("let x = 5; x = 6;"),
        ErrorKind::MutationOfImmutable
    );
}

#[test]
fn test_mutable_assignment() {
    assert_eq!(run("let mut a = 1; a = 50"), "50");
    assert_eq!(run("let mut x = 10; x -= 3; x"), "7");
    assert_eq!(run("let mut x = 10; x *= 2; x += 1; x"), "21");
}

#[test]
fn test_duplicate_declaration() {
    assert_eq!(
        runtime_kind("let x = 1; let x = 2;"),
        ErrorKind::DuplicateDeclaration
    );
}

#[test]
fn test_undefined_variable() {
    assert_eq!(runtime_kind("y"), ErrorKind::UndefinedVariable);
    assert_eq!(runtime_kind("x = 1;"), ErrorKind::UndefinedVariable);
}

#[test]
fn test_pending_typed_declaration() {
    assert_eq!(run("let x : U8; x = 5; x"), "5");
    // the single permitted assignment establishes the value for good
    assert_eq!(
        runtime_kind("let x : U8; x = 5; x = 6;"),
        ErrorKind::MutationOfImmutable
    );
}

#[test]
fn test_declared_type_is_enforced() {
    assert_eq!(runtime_kind("let x : U8 = 256;"), ErrorKind::Range);
    assert_eq!(runtime_kind("let mut x : U8 = 1; x = 300;"), ErrorKind::Range);
    assert_eq!(
        runtime_kind("let mut x : U8 = 1; x = 3U16;"),
        ErrorKind::MixedType
    );
    assert_eq!(runtime_kind("let x : Bool = 1;"), ErrorKind::Type);
}

#[test]
fn test_block_declarations_never_leak() {
    assert_eq!(runtime_kind("{let x = 100;} x"), ErrorKind::UndefinedVariable);
}

#[test]
fn test_block_mutations_of_outer_names_leak() {
    assert_eq!(run("let mut x = 1; { x = 2; } x"), "2");
}

#[test]
fn test_block_value_is_last_statement() {
    assert_eq!(run("{ let x = 10; x + 1 }"), "11");
    assert_eq!(run("{}"), "0");
}

#[test]
fn test_inner_shadowing() {
    assert_eq!(run("let x = 1; { let x = 2; } x"), "1");
}

// ============================================
// Control flow
// ============================================

#[test]
fn test_if_selects_branch() {
    assert_eq!(run("if (true) 1 else 2"), "1");
    assert_eq!(run("if (false) 1 else 2"), "2");
    assert_eq!(run("if (1 < 2) 10 else 20"), "10");
}

#[test]
fn test_if_requires_boolean_condition() {
    assert_eq!(runtime_kind("if (1) 1 else 2"), ErrorKind::Type);
}

#[test]
fn test_if_expression_requires_else() {
    assert!(syntax_error("let x = if (true) 1;"));
}

#[test]
fn test_statement_if_allows_missing_else() {
    assert_eq!(run("let mut x = 1; if (true) x = 5; x"), "5");
    assert_eq!(run("let mut x = 1; if (false) x = 5; x"), "1");
}

#[test]
fn test_if_evaluates_only_the_taken_branch() {
    assert_eq!(run("if (false) 1 / 0 else 7"), "7");
    assert_eq!(run("fn safe(n) => if (n == 0) 0 else 100 / n; safe(0)"), "0");
    assert_eq!(run("fn safe(n) => if (n == 0) 0 else 100 / n; safe(4)"), "25");
}

#[test]
fn test_recursion_through_guarded_if() {
    assert_eq!(
        run("fn fact(n) => if (n == 0) 1 else n * fact(n - 1); fact(5)"),
        "120"
    );
}

#[test]
fn test_while_counts() {
    assert_eq!(run("let mut x = 0; while (x < 4) x += 1; x"), "4");
    assert_eq!(run("let mut x = 0; while (x < 4) { x += 1; } x"), "4");
}

#[test]
fn test_while_condition_must_be_boolean() {
    assert_eq!(runtime_kind("while (1) { }"), ErrorKind::Type);
}

#[test]
fn test_break_stops_exactly_one_loop() {
    assert_eq!(run("let mut x = 0; while (x < 4) { x += 1; break; } x"), "1");
}

#[test]
fn test_nested_break() {
    let source = "
        let mut outer = 0;
        let mut total = 0;
        while (outer < 3) {
            outer += 1;
            let mut inner = 0;
            while (inner < 10) {
                inner += 1;
                total += 1;
                break;
            }
        }
        total";
    assert_eq!(run(source), "3");
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(runtime_kind("break;"), ErrorKind::BreakOutsideLoop);
}

#[test]
fn test_continue_skips_to_next_iteration() {
    let source = "let mut i = 0; let mut total = 0; \
                  while (i < 5) { i += 1; if (i == 3) continue; total += 1; } total";
    assert_eq!(run(source), "4");
}

#[test]
fn test_conditional_break() {
    assert_eq!(
        run("let mut i = 0; while (true) { i += 1; if (i == 3) break; } i"),
        "3"
    );
}

#[test]
fn test_continue_outside_loop() {
    assert_eq!(runtime_kind("continue;"), ErrorKind::ContinueOutsideLoop);
}

#[test]
fn test_continue_does_not_cross_call_boundary() {
    let source = "fn f() => { continue; 1 }; let mut i = 0; while (i < 1) { i += 1; f(); }";
    assert_eq!(runtime_kind(source), ErrorKind::ContinueOutsideLoop);
}

#[test]
fn test_break_does_not_cross_call_boundary() {
    let source = "fn f() => { break; 1 }; let mut i = 0; while (i < 1) { i += 1; f(); }";
    assert_eq!(runtime_kind(source), ErrorKind::BreakOutsideLoop);
}

#[test]
fn test_return_outside_function() {
    assert_eq!(runtime_kind("return 1;"), ErrorKind::ReturnOutsideFunction);
}

#[test]
fn test_match_first_arm_wins() {
    assert_eq!(run("match 100 { case 100 => 5; case 200 => 2; }"), "5");
    assert_eq!(run("match 200 { case 100 => 5; case 200 => 2; }"), "2");
}

#[test]
fn test_match_boolean_control() {
    assert_eq!(run("match true { case true => 1; case false => 2; }"), "1");
}

#[test]
fn test_match_no_matching_arm() {
    assert_eq!(
        runtime_kind("match 300 { case 100 => 5; case 200 => 2; }"),
        ErrorKind::NoMatchingArm
    );
}

#[test]
fn test_match_wildcard_never_fails() {
    assert_eq!(run("match 300 { case 100 => 5; case _ => 9; }"), "9");
    assert_eq!(run("match 300 { case _ => 9; }"), "9");
}

#[test]
fn test_match_evaluates_only_the_matching_arm() {
    assert_eq!(
        run("let x = 0; match x { case 0 => 1; case _ => 100 / x; }"),
        "1"
    );
    assert_eq!(run("match 2 { case 1 => 1 / 0; case _ => 9; }"), "9");
}

#[test]
fn test_match_pattern_kind_and_tag_checks() {
    assert_eq!(
        runtime_kind("match 1U8 { case 1U16 => 5; }"),
        ErrorKind::MixedType
    );
    assert_eq!(
        runtime_kind("match 1 { case true => 5; }"),
        ErrorKind::Type
    );
}

#[test]
fn test_match_on_variable_control() {
    assert_eq!(run("let x = 7; match x { case 7 => 1; case _ => 0; }"), "1");
}

// ============================================
// Functions and generics
// ============================================

#[test]
fn test_function_definition_and_call() {
    assert_eq!(run("fn add(a, b) => a + b; add(2, 3)"), "5");
    assert_eq!(run("fn add(a, b) => { a + b }; add(2, 3)"), "5");
}

#[test]
fn test_return_unwinds_to_call_site() {
    assert_eq!(run("fn f(a) => { return a * 2; 99 }; f(21)"), "42");
    assert_eq!(run("fn f(a) => return a + 1; f(1)"), "2");
}

#[test]
fn test_arity_mismatch() {
    assert_eq!(runtime_kind("fn f(a) => a; f(1, 2)"), ErrorKind::Arity);
    assert_eq!(runtime_kind("fn f(a, b) => a; f(1)"), ErrorKind::Arity);
}

#[test]
fn test_typed_parameters_are_validated() {
    assert_eq!(runtime_kind("fn f(a: U8) => a; f(300)"), ErrorKind::Range);
    assert_eq!(runtime_kind("fn f(a: Bool) => a; f(1)"), ErrorKind::Type);
}

#[test]
fn test_declared_return_type_is_enforced() {
    assert_eq!(runtime_kind("fn f(a): U8 => a; f(300)"), ErrorKind::Range);
    assert_eq!(run("fn f(a): U8 => a; f(200)"), "200");
}

#[test]
fn test_functions_capture_caller_locals_by_value() {
    assert_eq!(run("let x = 10; fn f() => x + 1; f()"), "11");
}

#[test]
fn test_function_mutations_are_discarded() {
    assert_eq!(run("let mut x = 1; fn f() => { x = 99; x }; f(); x"), "1");
    assert_eq!(run("let mut x = 1; fn f() => { x = 99; x }; f()"), "99");
}

#[test]
fn test_anonymous_function_values() {
    assert_eq!(run("let f = (a) => a * 2; f(4)"), "8");
    assert_eq!(run("let f = (a): U8 => a; f(7)"), "7");
}

#[test]
fn test_functions_are_first_class() {
    assert_eq!(run("fn apply(f, x) => f(x); apply((a) => a + 1, 4)"), "5");
    assert_eq!(run("fn inc(a) => a + 1; let g = inc; g(9)"), "10");
}

#[test]
fn test_generic_explicit_binding_validates() {
    assert_eq!(run("fn id<T>(x: T): T => x; id<I32>(5)"), "5");
    assert_eq!(runtime_kind("fn id<T>(x: T): T => x; id<U8>(300)"), ErrorKind::Range);
}

#[test]
fn test_generic_unbound_type_variables_skip_validation() {
    // no inference: omitted type arguments disable checking entirely
    assert_eq!(run("fn id<T>(x: T): T => x; id(300)"), "300");
    assert_eq!(run("fn id<T>(x: T): T => x; id(true)"), "true");
}

#[test]
fn test_generic_type_argument_count() {
    assert_eq!(
        runtime_kind("fn id<T>(x: T): T => x; id<I32, U8>(5)"),
        ErrorKind::Arity
    );
}

#[test]
fn test_calling_a_non_function() {
    assert_eq!(runtime_kind("let x = 1; x(2)"), ErrorKind::Type);
}

// ============================================
// Strings
// ============================================

#[test]
fn test_string_length() {
    assert_eq!(run("\"hello\".length"), "5");
    assert_eq!(run("\"\".length"), "0");
}

#[test]
fn test_string_index_yields_char() {
    assert_eq!(run("\"hello\"[1]"), "'e'");
    assert_eq!(run("let s = \"abc\"; s[0]"), "'a'");
}

#[test]
fn test_string_index_out_of_bounds() {
    assert_eq!(runtime_kind("\"abc\"[3]"), ErrorKind::IndexOutOfBounds);
}

// ============================================
// Arrays
// ============================================

#[test]
fn test_array_literal_and_index() {
    assert_eq!(run("[1, 2, 3][1]"), "2");
    assert_eq!(run("let a = [1, 2, 3]; a[0] + a[2]"), "4");
}

#[test]
fn test_array_read_bounds() {
    assert_eq!(runtime_kind("let a = [1, 2, 3]; a[3]"), ErrorKind::IndexOutOfBounds);
}

#[test]
fn test_sized_array_declaration_zero_initializes() {
    assert_eq!(run("let a : [U8; 3]; a[0]"), "0");
    assert_eq!(run("let mut a : [U8; 3]; a[0] = 7; a[0]"), "7");
}

#[test]
fn test_uninitialized_array_assigned_once() {
    // the single first assignment works whole or element-wise, then locks
    assert_eq!(run("let a : [U8; 3]; a = [1, 2, 3]; a[0]"), "1");
    assert_eq!(
        runtime_kind("let a : [U8; 3]; a[0] = 7; a[1] = 8;"),
        ErrorKind::MutationOfImmutable
    );
}

#[test]
fn test_array_writes_respect_mutability() {
    assert_eq!(
        runtime_kind("let a = [1, 2]; a[0] = 5;"),
        ErrorKind::MutationOfImmutable
    );
}

#[test]
fn test_array_element_type_is_enforced() {
    assert_eq!(
        runtime_kind("let mut a : [U8; 3]; a[0] = 300;"),
        ErrorKind::Range
    );
    assert_eq!(
        runtime_kind("let mut a : [U8; 3]; a[0] = true;"),
        ErrorKind::Type
    );
}

#[test]
fn test_array_length_rule() {
    // a declared length admits that exact length or an empty buffer
    assert_eq!(run("let a : [U8; 2] = [1, 2]; a[1]"), "2");
    assert_eq!(runtime_kind("let a : [U8; 2] = [1, 2, 3];"), ErrorKind::Type);
}

#[test]
fn test_create_array_and_incremental_fill() {
    let source = "extern fn createArray<T>(length: USize): [T]; \
                  let mut a: [I32] = createArray<I32>(1); a[0] = 100; a[0]";
    assert_eq!(run(source), "100");
}

#[test]
fn test_create_array_capacity_bound() {
    let source = "extern fn createArray<T>(length: USize): [T]; \
                  let mut a: [I32] = createArray<I32>(2); a[2] = 1;";
    assert_eq!(runtime_kind(source), ErrorKind::IndexOutOfBounds);
}

#[test]
fn test_create_array_gap_is_zero_filled() {
    let source = "extern fn createArray<T>(length: USize): [T]; \
                  let mut a: [I32] = createArray<I32>(3); a[2] = 9; a[0]";
    assert_eq!(run(source), "0");
}

// ============================================
// Type tests (`is`), aliases, structs
// ============================================

#[test]
fn test_is_on_integers() {
    assert_eq!(run("5U8 is U8"), "true");
    assert_eq!(run("5U8 is U16"), "false");
    assert_eq!(run("5U8 is Bool"), "false");
    assert_eq!(run("5 is U8"), "true");
    assert_eq!(run("500 is U8"), "false");
}

#[test]
fn test_is_on_other_kinds() {
    assert_eq!(run("true is Bool"), "true");
    assert_eq!(run("\"s\" is String"), "true");
    assert_eq!(run("[1U8, 2U8] is [U8]"), "true");
    assert_eq!(run("[1, 2] is [U8; 2]"), "true");
    assert_eq!(run("[1, 2, 3] is [U8; 2]"), "false");
}

#[test]
fn test_is_unknown_type() {
    assert_eq!(runtime_kind("1 is Whatever"), ErrorKind::Type);
}

#[test]
fn test_type_alias() {
    assert_eq!(run("type MyInt = I32; let x : MyInt = 5; x"), "5");
    assert_eq!(run("type MyInt = I32; 5I32 is MyInt"), "true");
    assert_eq!(runtime_kind("type Small = U8; let x : Small = 300;"), ErrorKind::Range);
}

#[test]
fn test_struct_definition_and_construction() {
    assert_eq!(
        run("struct Point { x : I32, y : I32 } let p = Point { 1, 2 }; p.x + p.y"),
        "3"
    );
}

#[test]
fn test_struct_arity() {
    assert_eq!(
        runtime_kind("struct Point { x : I32, y : I32 } Point { 1 }"),
        ErrorKind::Arity
    );
}

#[test]
fn test_struct_field_types_are_validated() {
    assert_eq!(
        runtime_kind("struct Point { x : I32, y : I32 } Point { 1, true }"),
        ErrorKind::Type
    );
}

#[test]
fn test_struct_field_assignment() {
    assert_eq!(
        run("struct P { x : I32 } let mut p = P { 1 }; p.x = 5; p.x"),
        "5"
    );
    assert_eq!(
        runtime_kind("struct P { x : I32 } let p = P { 1 }; p.x = 5;"),
        ErrorKind::MutationOfImmutable
    );
    assert_eq!(
        runtime_kind("struct P { x : I32 } let mut p = P { 1 }; p.x = true;"),
        ErrorKind::Type
    );
}

#[test]
fn test_struct_unknown_field() {
    assert_eq!(
        runtime_kind("struct P { x : I32 } let p = P { 1 }; p.z"),
        ErrorKind::UndefinedField
    );
}

#[test]
fn test_struct_length_is_field_count() {
    assert_eq!(
        run("struct Point { x : I32, y : I32 } let p = Point { 1, 2 }; p.length"),
        "2"
    );
}

#[test]
fn test_struct_conformance() {
    assert_eq!(
        run("struct Point { x : I32, y : I32 } let p = Point { 1, 2 }; p is Point"),
        "true"
    );
}

#[test]
fn test_unknown_struct_type() {
    assert_eq!(runtime_kind("Nope { 1 }"), ErrorKind::Type);
}

// ============================================
// Modules
// ============================================

#[test]
fn test_module_namespace_access() {
    assert_eq!(run("module Math { let pi = 3; } Math::pi"), "3");
    assert_eq!(
        run("module Math { fn double(x) => x * 2; } Math::double(21)"),
        "42"
    );
}

#[test]
fn test_module_locals_stay_namespaced() {
    assert_eq!(runtime_kind("module M { let a = 1; } a"), ErrorKind::UndefinedVariable);
}

#[test]
fn test_missing_module_and_member() {
    assert_eq!(runtime_kind("Nope::x"), ErrorKind::UndefinedVariable);
    assert_eq!(
        runtime_kind("module M { let a = 1; } M::b"),
        ErrorKind::UndefinedVariable
    );
}

// ============================================
// print and program output
// ============================================

#[test]
fn test_print_output_replaces_result() {
    assert_eq!(run("extern fn print(value); print(42); 7"), "42");
}

#[test]
fn test_print_appends_without_separator() {
    assert_eq!(run("extern fn print(value); print(1); print(2); 0"), "12");
    assert_eq!(
        run("extern fn print(value); print(true); print(\"x\"); 0"),
        "true\"x\""
    );
}

#[test]
fn test_print_inside_loops_and_calls() {
    let source = "extern fn print(value); \
                  fn shout(n) => print(n); \
                  let mut i = 0; while (i < 3) { shout(i); i += 1; } 0";
    assert_eq!(run(source), "012");
}

#[test]
fn test_unknown_extern() {
    assert_eq!(runtime_kind("extern fn mystery(); mystery()"), ErrorKind::Type);
}

// ============================================
// Syntax errors
// ============================================

#[test]
fn test_syntax_errors() {
    assert!(syntax_error("let x = 1 let y = 2;"));
    assert!(syntax_error("let = 5;"));
    assert!(syntax_error("match 1 { }"));
    assert!(syntax_error("1 +"));
    assert!(syntax_error("let x = @;"));
}

// ============================================
// Multi-source linking
// ============================================

fn sources(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_linked_namespaced_use() {
    let srcs = sources(&[
        ("main", "use Math::{double}; double(21)"),
        ("Math", "out fn double(x) => x * 2; out fn triple(x) => x * 3;"),
    ]);
    assert_eq!(interpret_sources("main", &srcs).unwrap(), "42");
}

#[test]
fn test_linked_parameterized_use() {
    let srcs = sources(&[
        ("main", "use Counter { 5 }::{limit}; limit"),
        ("Counter", "in let base; out let limit = base + 1;"),
    ]);
    assert_eq!(interpret_sources("main", &srcs).unwrap(), "6");
}

#[test]
fn test_linked_plain_concatenation() {
    let srcs = sources(&[("main", "helper()"), ("lib", "fn helper() => 7;")]);
    assert_eq!(interpret_sources("main", &srcs).unwrap(), "7");
}

#[test]
fn test_link_errors_are_distinct() {
    let srcs = sources(&[("main", "use Nope::{f}; f(1)")]);
    assert!(matches!(
        interpret_sources("main", &srcs),
        Err(Error::Link(tuff::linker::LinkError::MissingSource { .. }))
    ));

    let srcs = sources(&[
        ("main", "use Math::{halve}; halve(2)"),
        ("Math", "out fn double(x) => x * 2;"),
    ]);
    assert!(matches!(
        interpret_sources("main", &srcs),
        Err(Error::Link(tuff::linker::LinkError::MissingExport { .. }))
    ));
}
