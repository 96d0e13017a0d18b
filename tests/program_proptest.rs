//! Property-based tests over generated source programs.
//!
//! The strategies below compose random but grammatically valid programs as
//! source text, so every generated case must tokenize, parse and lower
//! without error. Allocation determinism is checked on the emitted IR:
//! temporaries appear in strictly increasing order from zero and no label
//! is ever defined twice.

use proptest::prelude::*;

use yalcc::compile;
use yalcc::parser::{parse, Instruction};
use yalcc::tokenizer::Tokenizer;

/// Generate valid variable names.
fn var_strategy() -> impl Strategy<Value = String> {
  "[a-z][a-z0-9]{0,3}"
}

/// Generate arithmetic expressions, parenthesising every composite level so
/// nesting depth stays under control.
fn expr_strategy() -> impl Strategy<Value = String> {
  let leaf = prop_oneof![
    var_strategy(),
    (0u32..10_000).prop_map(|n| n.to_string()),
    (1u32..10_000).prop_map(|n| format!("-{n}")),
  ];
  leaf.prop_recursive(3, 24, 2, |inner| {
    (
      inner.clone(),
      prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
      inner,
    )
      .prop_map(|(lhs, op, rhs)| format!("({lhs} {op} {rhs})"))
  })
}

/// Generate conditions: a comparison, optionally strengthened into an
/// implication chain.
fn cond_strategy() -> impl Strategy<Value = String> {
  let comparison = (
    expr_strategy(),
    prop_oneof![Just("=="), Just("<"), Just("<=")],
    expr_strategy(),
  )
    .prop_map(|(lhs, op, rhs)| format!("{lhs} {op} {rhs}"));
  prop::collection::vec(comparison, 1..3).prop_map(|parts| parts.join(" -> "))
}

/// Generate one statement, including nested control flow.
fn statement_strategy() -> impl Strategy<Value = String> {
  let simple = prop_oneof![
    (var_strategy(), expr_strategy()).prop_map(|(name, expr)| format!("{name} = {expr};")),
    var_strategy().prop_map(|name| format!("Print({name});")),
    var_strategy().prop_map(|name| format!("Input({name});")),
  ];
  simple.prop_recursive(2, 12, 3, |inner| {
    prop_oneof![
      (cond_strategy(), prop::collection::vec(inner.clone(), 0..3))
        .prop_map(|(cond, body)| format!("If {{ {cond} }} Then {} End;", body.join(" "))),
      (
        cond_strategy(),
        prop::collection::vec(inner.clone(), 0..2),
        prop::collection::vec(inner.clone(), 0..2)
      )
        .prop_map(|(cond, then_body, else_body)| {
          format!(
            "If {{ {cond} }} Then {} Else {} End;",
            then_body.join(" "),
            else_body.join(" ")
          )
        }),
      (cond_strategy(), prop::collection::vec(inner, 0..3))
        .prop_map(|(cond, body)| format!("While {{ {cond} }} Do {} End;", body.join(" "))),
    ]
  })
}

fn program_strategy() -> impl Strategy<Value = String> {
  prop::collection::vec(statement_strategy(), 0..6)
    .prop_map(|statements| format!("Prog PTEST Is {} End", statements.join(" ")))
}

/// Indices of the temporaries defined in the main function, in emission
/// order.
fn defined_temps(ir: &str) -> Vec<usize> {
  let start = ir.find("define i32 @main()").expect("main is missing");
  ir[start..]
    .lines()
    .filter_map(|line| {
      let trimmed = line.trim_start();
      let rest = trimmed.strip_prefix('%')?;
      let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
      if digits.is_empty() || !rest[digits.len()..].starts_with(" = ") {
        return None;
      }
      digits.parse().ok()
    })
    .collect()
}

proptest! {
  #[test]
  fn generated_programs_always_compile(source in program_strategy()) {
    prop_assert!(compile(&source).is_ok(), "failed to compile: {source}");
  }

  #[test]
  fn temporaries_increase_without_gaps(source in program_strategy()) {
    let ir = compile(&source).expect("compile failed");
    let temps = defined_temps(&ir);
    let expected: Vec<usize> = (0..temps.len()).collect();
    prop_assert_eq!(temps, expected);
  }

  #[test]
  fn labels_are_defined_exactly_once(source in program_strategy()) {
    let ir = compile(&source).expect("compile failed");
    let start = ir.find("define i32 @main()").expect("main is missing");
    let body = &ir[start..];
    let mut defined = std::collections::HashSet::new();
    for line in body.lines() {
      let trimmed = line.trim();
      if let Some(label) = trimmed.strip_suffix(':') {
        if label.starts_with("label") {
          prop_assert!(defined.insert(label.to_string()), "{} defined twice", label);
        }
      }
    }
    // every branch target refers to a defined label
    for line in body.lines() {
      for part in line.split("label %").skip(1) {
        let target: String = part
          .chars()
          .take_while(|c| c.is_ascii_alphanumeric())
          .collect();
        prop_assert!(defined.contains(&target), "branch to undefined {}", target);
      }
    }
  }

  #[test]
  fn statement_count_matches_the_source(statements in prop::collection::vec(
    (var_strategy(), expr_strategy()).prop_map(|(name, expr)| format!("{name} = {expr};")),
    0..8,
  )) {
    let source = format!("Prog PTEST Is {} End", statements.join(" "));
    let program = parse(Tokenizer::new(&source)).expect("parse failed");
    prop_assert_eq!(program.body.len(), statements.len());
    for instruction in &program.body {
      prop_assert!(matches!(instruction, Instruction::Assign { .. }), "expected Assign instruction");
    }
  }
}
