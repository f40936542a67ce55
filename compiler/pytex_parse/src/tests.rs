#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;
use pytex_ir::{
    BinaryOp, BoolOp, CmpOp, ComprehensionKind, ExprKind, ImportNames, StmtKind, Target, UnaryOp,
};

use super::*;

fn body(source: &str) -> Vec<StmtKind> {
    parse_module(source)
        .unwrap()
        .body
        .into_iter()
        .map(|stmt| stmt.kind)
        .collect()
}

fn expr(source: &str) -> ExprKind {
    parse_expression(source).unwrap().into_kind()
}

fn error(source: &str) -> ParseError {
    parse_module(source).unwrap_err()
}

// Statements

#[test]
fn empty_module() {
    assert!(body("").is_empty());
    assert!(body("\n   \n# nothing\n").is_empty());
}

#[test]
fn semicolons_join_simple_statements() {
    let stmts = body("a = 1; b = 2;\npass");
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[2], StmtKind::Pass));
}

#[test]
fn chained_and_unpacking_assignment() {
    let stmts = body("a = b = 1\nx, y = y, x");
    let StmtKind::Assign { targets, .. } = &stmts[0] else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len(), 2);
    let StmtKind::Assign { targets, value } = &stmts[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(&targets[0], Target::Tuple(items, _) if items.len() == 2));
    assert!(matches!(&value.kind, ExprKind::Tuple(items) if items.len() == 2));
}

#[test]
fn augmented_assignment_to_subscript() {
    let stmts = body("counts[key] += 1");
    assert!(matches!(
        &stmts[0],
        StmtKind::AugAssign {
            target: Target::Subscript { .. },
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn annotated_assignment_drops_annotation() {
    let stmts = body("x: int = 5\ny: str");
    assert!(matches!(&stmts[0], StmtKind::Assign { targets, .. } if targets.len() == 1));
    assert!(matches!(stmts[1], StmtKind::Pass));
}

#[test]
fn invalid_targets() {
    assert_eq!(error("1 = x").to_string(), "cannot assign to literal");
    assert_eq!(error("f() = x").to_string(), "cannot assign to function call");
    assert_eq!(
        error("a, b += 1").to_string(),
        "cannot assign to tuple in augmented assignment"
    );
}

#[test]
fn if_elif_else_nests() {
    let stmts = body("if a:\n    x\nelif b:\n    y\nelse:\n    z\n");
    let StmtKind::If { orelse, .. } = &stmts[0] else {
        panic!("expected if");
    };
    let StmtKind::If { orelse: inner, .. } = &orelse[0].kind else {
        panic!("expected nested if");
    };
    assert_eq!(inner.len(), 1);
}

#[test]
fn same_line_suites() {
    let stmts = body("if a: x = 1; y = 2\nelse: pass\nwhile 0: pass");
    let StmtKind::If { body, orelse, .. } = &stmts[0] else {
        panic!("expected if");
    };
    assert_eq!(body.len(), 2);
    assert_eq!(orelse.len(), 1);
    assert!(matches!(stmts[1], StmtKind::While { .. }));
}

#[test]
fn for_with_tuple_target_and_else() {
    let stmts = body("for i, x in enumerate(xs):\n    continue\nelse:\n    pass\n");
    let StmtKind::For { target, orelse, .. } = &stmts[0] else {
        panic!("expected for");
    };
    assert!(matches!(target, Target::Tuple(items, _) if items.len() == 2));
    assert_eq!(orelse.len(), 1);
}

#[test]
fn def_with_defaults_and_annotations() {
    let stmts = body("def f(a, b: int = 2) -> int:\n    total = a + b\n    return total\n");
    let StmtKind::FunctionDef(def) = &stmts[0] else {
        panic!("expected def");
    };
    assert_eq!(def.name, "f");
    assert_eq!(def.params.len(), 2);
    assert!(def.params[1].default.is_some());
    assert_eq!(def.locals(), ["a", "b", "total"]);
}

#[test]
fn parameter_errors() {
    assert!(matches!(
        error("def f(a=1, b):\n    pass"),
        ParseError::NonDefaultAfterDefault { .. }
    ));
    assert!(matches!(
        error("def f(a, a):\n    pass"),
        ParseError::DuplicateParam { .. }
    ));
}

#[test]
fn try_except_else_finally() {
    let source = "\
try:
    risky()
except (KeyError, IndexError) as err:
    handle(err)
except ValueError:
    pass
except:
    raise
else:
    ok()
finally:
    done()
";
    let stmts = body(source);
    let StmtKind::Try {
        handlers,
        orelse,
        finalbody,
        ..
    } = &stmts[0]
    else {
        panic!("expected try");
    };
    assert_eq!(handlers.len(), 3);
    assert_eq!(handlers[0].name.as_deref(), Some("err"));
    assert!(handlers[2].kind.is_none());
    assert_eq!(orelse.len(), 1);
    assert_eq!(finalbody.len(), 1);
}

#[test]
fn try_errors() {
    assert!(matches!(
        error("try:\n    pass\nx = 1"),
        ParseError::MissingHandler { .. }
    ));
    assert!(matches!(
        error("try:\n    pass\nexcept:\n    pass\nexcept ValueError:\n    pass"),
        ParseError::DefaultExceptNotLast { .. }
    ));
}

#[test]
fn imports() {
    let stmts = body("import sys, os.path as p\nfrom math import (pi, sqrt as root,)\nfrom math import *");
    let StmtKind::Import(names) = &stmts[0] else {
        panic!("expected import");
    };
    assert_eq!(names[0].path, "sys");
    assert_eq!(names[1].bound_name(), "p");
    let StmtKind::ImportFrom {
        module,
        names: ImportNames::List(names),
    } = &stmts[1]
    else {
        panic!("expected from-import");
    };
    assert_eq!(module, "math");
    assert_eq!(names[1].alias.as_deref(), Some("root"));
    assert!(matches!(
        stmts[2],
        StmtKind::ImportFrom {
            names: ImportNames::Star,
            ..
        }
    ));
}

#[test]
fn control_flow_outside_its_context() {
    assert_eq!(error("break").to_string(), "'break' outside loop");
    assert_eq!(error("continue").to_string(), "'continue' not properly in loop");
    assert_eq!(error("return 1").to_string(), "'return' outside function");
    assert_eq!(
        error("while x:\n    def f():\n        break\n").to_string(),
        "'break' outside loop"
    );
}

#[test]
fn indentation_errors() {
    let err = error("  x = 1");
    assert!(matches!(err, ParseError::UnexpectedIndent { .. }));
    assert!(err.is_indentation());
    let err = error("if x:\ny = 1");
    assert_eq!(
        err.to_string(),
        "expected an indented block after 'if' statement"
    );
    assert!(err.is_indentation());
    assert!(error("if x:\n    a\n  b").is_indentation());
}

#[test]
fn syntax_error_mentions_found_token() {
    let err = error("x = (1 +)");
    assert_eq!(err.to_string(), "expected an expression, found ')'");
    assert_eq!(err.span(), Span::new(8, 9));
}

// Expressions

#[test]
fn arithmetic_precedence() {
    let ExprKind::Binary { op, right, .. } = expr("1 + 2 * 3") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_binds_tighter_than_unary_minus() {
    let ExprKind::Unary { op, operand } = expr("-2 ** 2") else {
        panic!("expected unary");
    };
    assert_eq!(op, UnaryOp::Neg);
    assert!(matches!(operand.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn power_is_right_associative() {
    let ExprKind::Binary { right, .. } = expr("2 ** 3 ** 2") else {
        panic!("expected binary");
    };
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn chained_comparison_with_membership() {
    let ExprKind::Compare { rest, .. } = expr("a < b <= c not in d is not e") else {
        panic!("expected compare");
    };
    let ops: Vec<CmpOp> = rest.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, [CmpOp::Lt, CmpOp::LtEq, CmpOp::NotIn, CmpOp::IsNot]);
}

#[test]
fn boolean_operators() {
    let ExprKind::Logical { op, right, .. } = expr("a or not b and c") else {
        panic!("expected logical");
    };
    assert_eq!(op, BoolOp::Or);
    assert!(matches!(right.kind, ExprKind::Logical { op: BoolOp::And, .. }));
}

#[test]
fn conditional_and_lambda() {
    assert!(matches!(expr("a if c else b"), ExprKind::IfExp { .. }));
    let ExprKind::Lambda(def) = expr("lambda x, y=2: x + y") else {
        panic!("expected lambda");
    };
    assert_eq!(def.params.len(), 2);
}

#[test]
fn collections() {
    assert!(matches!(expr("()"), ExprKind::Tuple(items) if items.is_empty()));
    assert!(matches!(expr("(1,)"), ExprKind::Tuple(items) if items.len() == 1));
    assert!(matches!(expr("(1)"), ExprKind::Int(1)));
    assert!(matches!(expr("[1, 2,]"), ExprKind::List(items) if items.len() == 2));
    assert!(matches!(expr("{'a': 1, 'b': 2}"), ExprKind::Dict(entries) if entries.len() == 2));
    assert!(matches!(expr("1, 2"), ExprKind::Tuple(items) if items.len() == 2));
}

#[test]
fn comprehensions() {
    let ExprKind::Comprehension(comp) = expr("[x * y for x in xs if x for y in ys]") else {
        panic!("expected comprehension");
    };
    assert_eq!(comp.kind, ComprehensionKind::List);
    assert_eq!(comp.clauses.len(), 3);
    let ExprKind::Call { args, .. } = expr("sum(x for x in xs)") else {
        panic!("expected call");
    };
    assert!(matches!(
        &args[0].value.kind,
        ExprKind::Comprehension(comp) if comp.kind == ComprehensionKind::Generator
    ));
}

#[test]
fn bare_generator_must_be_sole_argument() {
    assert!(matches!(
        parse_expression("f(x for x in xs, 1)"),
        Err(ParseError::UnparenthesizedGenerator { .. })
    ));
}

#[test]
fn call_arguments() {
    let ExprKind::Call { args, .. } = expr("print(a, b, sep='', end='\\n')") else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 4);
    assert_eq!(args[2].name.as_deref(), Some("sep"));
    assert!(matches!(
        parse_expression("f(a=1, 2)"),
        Err(ParseError::PositionalAfterKeyword { .. })
    ));
    assert!(matches!(
        parse_expression("f(a=1, a=2)"),
        Err(ParseError::RepeatedKeyword { .. })
    ));
}

#[test]
fn slices() {
    let ExprKind::Subscript { index, .. } = expr("xs[1:-1:2]") else {
        panic!("expected subscript");
    };
    assert!(matches!(
        index.kind,
        ExprKind::Slice {
            lower: Some(_),
            upper: Some(_),
            step: Some(_)
        }
    ));
    let ExprKind::Subscript { index, .. } = expr("xs[::-1]") else {
        panic!("expected subscript");
    };
    assert!(matches!(
        index.kind,
        ExprKind::Slice {
            lower: None,
            upper: None,
            step: Some(_)
        }
    ));
}

#[test]
fn attribute_call_chain() {
    let ExprKind::Call { func, .. } = expr("sys.stdout.write('X')") else {
        panic!("expected call");
    };
    assert!(matches!(&func.kind, ExprKind::Attribute { name, .. } if name == "write"));
}

#[test]
fn deeply_nested_expression_does_not_overflow() {
    let depth = 900;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert!(matches!(expr(&source), ExprKind::Int(1)));
}

#[test]
fn nesting_beyond_the_limit_is_a_syntax_error() {
    let source = format!("print({}1)", "-".repeat(100_000));
    let err = parse_module(&source).unwrap_err();
    assert!(matches!(err, ParseError::TooDeeplyNested { .. }));
    assert!(!err.is_indentation());

    let parens = MAX_NESTING as usize + 1;
    let source = format!("{}1{}", "(".repeat(parens), ")".repeat(parens));
    assert!(matches!(
        parse_expression(&source),
        Err(ParseError::TooDeeplyNested { .. })
    ));
}

#[test]
fn long_left_deep_chains_parse_and_drop() {
    let sum = format!("x = 1{}", " + 1".repeat(100_000));
    let module = parse_module(&sum).unwrap();
    assert_eq!(module.body.len(), 1);
    drop(module);

    let attributes = format!("a{}", ".b".repeat(100_000));
    assert!(matches!(expr(&attributes), ExprKind::Attribute { .. }));
}
