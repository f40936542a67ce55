use pretty_assertions::assert_eq;

use super::*;

fn name(n: &str) -> Target {
    Target::Name(n.to_owned(), Span::DUMMY)
}

fn int(value: i64) -> Expr {
    Expr::new(ExprKind::Int(value), Span::DUMMY)
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::DUMMY)
}

fn param(n: &str) -> Param {
    Param {
        name: n.to_owned(),
        default: None,
        span: Span::DUMMY,
    }
}

#[test]
fn params_and_assignments_are_local() {
    let body = vec![
        stmt(StmtKind::Assign {
            targets: vec![Target::Tuple(vec![name("a"), name("b")], Span::DUMMY)],
            value: int(1),
        }),
        stmt(StmtKind::For {
            target: name("i"),
            iter: int(0),
            body: vec![stmt(StmtKind::AugAssign {
                target: name("total"),
                op: BinaryOp::Add,
                value: int(1),
            })],
            orelse: vec![],
        }),
    ];
    let def = FunctionDef::new("f".into(), vec![param("x")], body, Span::DUMMY);
    assert_eq!(def.locals(), ["a", "b", "i", "total", "x"]);
    assert!(def.is_local("total"));
    assert!(!def.is_local("print"));
}

#[test]
fn global_declarations_are_not_local() {
    let body = vec![
        stmt(StmtKind::Global(vec!["counter".into()])),
        stmt(StmtKind::AugAssign {
            target: name("counter"),
            op: BinaryOp::Add,
            value: int(1),
        }),
    ];
    let def = FunctionDef::new("bump".into(), vec![], body, Span::DUMMY);
    assert!(def.locals().is_empty());
    assert!(def.is_global("counter"));
}

#[test]
fn nested_def_binds_only_its_name() {
    let inner = FunctionDef::new(
        "inner".into(),
        vec![],
        vec![stmt(StmtKind::Assign {
            targets: vec![name("hidden")],
            value: int(2),
        })],
        Span::DUMMY,
    );
    let body = vec![stmt(StmtKind::FunctionDef(Rc::new(inner)))];
    let def = FunctionDef::new("outer".into(), vec![], body, Span::DUMMY);
    assert_eq!(def.locals(), ["inner"]);
}

#[test]
fn import_binds_first_component_or_alias() {
    let plain = ImportName {
        path: "os.path".into(),
        alias: None,
        span: Span::DUMMY,
    };
    let aliased = ImportName {
        path: "math".into(),
        alias: Some("m".into()),
        span: Span::DUMMY,
    };
    assert_eq!(plain.bound_name(), "os");
    assert_eq!(aliased.bound_name(), "m");
}

#[test]
fn except_names_are_local() {
    let body = vec![stmt(StmtKind::Try {
        body: vec![stmt(StmtKind::Pass)],
        handlers: vec![ExceptHandler {
            kind: None,
            name: Some("err".into()),
            body: vec![],
            span: Span::DUMMY,
        }],
        orelse: vec![],
        finalbody: vec![],
    })];
    let def = FunctionDef::new("f".into(), vec![], body, Span::DUMMY);
    assert_eq!(def.locals(), ["err"]);
}
