//! Whole-program scenarios: ASTs as a parser would deliver them, checked
//! against the exact rendered diagnostics.

use latte::driver::{Config, Target, analyze};
use latte::frontend::Pos;
use latte::frontend::ast::*;
use latte::sema::scope::SymbolTable;

fn p(line: u32, col: u32) -> Pos {
    Pos::new(line, col)
}

fn static_main(stmts: Vec<Stmt>, line: u32) -> ClassDef {
    ClassDef::new(
        "Main",
        None,
        false,
        vec![FieldDef::Method(MethodDef {
            is_static: true,
            is_abstract: false,
            return_type: TypeLit::void(p(line, 21)),
            id: Id::new("main", p(line, 26)),
            params: vec![],
            body: Some(Block::new(stmts, p(line, 33))),
            pos: p(line, 26),
            symbol: None,
        })],
        p(line, 1),
    )
}

fn local(name: &str, ty: Option<TypeLit>, init: Expr, pos: Pos, id_pos: Pos, eq: Pos) -> Stmt {
    Stmt::new(
        StmtKind::LocalVarDef(LocalVarDef {
            type_lit: ty,
            id: Id::new(name, id_pos),
            assign_pos: Some(eq),
            init: Some(init),
            symbol: None,
        }),
        pos,
    )
}

fn assign(lhs: Expr, rhs: Expr, pos: Pos) -> Stmt {
    Stmt::new(StmtKind::Assign(Assign { lhs, rhs }), pos)
}

fn ret(expr: Option<Expr>, pos: Pos) -> Stmt {
    Stmt::new(
        StmtKind::Return(ReturnStmt {
            expr,
            return_type: None,
        }),
        pos,
    )
}

fn rendered(program: &mut Program) -> String {
    analyze(program, &Config::default()).render()
}

// class Main { static void main() { int x = 1; x = 2 + true; } }
#[test]
fn arithmetic_on_a_bool_operand() {
    let mut program = Program::new(vec![static_main(
        vec![
            local(
                "x",
                Some(TypeLit::int(p(1, 35))),
                Expr::int_lit(1, p(1, 43)),
                p(1, 35),
                p(1, 39),
                p(1, 41),
            ),
            assign(
                Expr::var("x", p(1, 46)),
                Expr::binary(
                    BinaryOp::Add,
                    Expr::int_lit(2, p(1, 50)),
                    Expr::bool_lit(true, p(1, 54)),
                    p(1, 52),
                ),
                p(1, 48),
            ),
        ],
        1,
    )]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (1,52): incompatible operands: int + bool\n"
    );
}

// abstract class A { abstract void f(); }
// class B : A {}
// class Main { static void main() {} }
#[test]
fn unimplemented_abstract_method() {
    let mut program = Program::new(vec![
        ClassDef::new(
            "A",
            None,
            true,
            vec![FieldDef::Method(MethodDef {
                is_static: false,
                is_abstract: true,
                return_type: TypeLit::void(p(1, 29)),
                id: Id::new("f", p(1, 34)),
                params: vec![],
                body: None,
                pos: p(1, 34),
                symbol: None,
            })],
            p(1, 10),
        ),
        ClassDef::new("B", Some(Id::new("A", p(2, 11))), false, vec![], p(2, 1)),
        static_main(vec![], 3),
    ]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (2,1): 'B' is not abstract and does not override all abstract methods\n"
    );
}

// class Main { static void main() { var f = fun() => 1; f(1); } }
#[test]
fn nullary_function_called_with_an_argument() {
    let lambda = Expr::lambda(
        vec![],
        LambdaBody::Expr {
            expr: Box::new(Expr::int_lit(1, p(1, 52))),
            scope: None,
        },
        p(1, 43),
    );
    let mut program = Program::new(vec![static_main(
        vec![
            local("f", None, lambda, p(1, 35), p(1, 39), p(1, 41)),
            Stmt::new(
                StmtKind::ExprEval(Expr::call(
                    Expr::var("f", p(1, 55)),
                    vec![Expr::int_lit(1, p(1, 57))],
                    p(1, 55),
                )),
                p(1, 55),
            ),
        ],
        1,
    )]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (1,55): function 'f' expects 0 argument(s) but 1 given\n"
    );
}

// class Main { static void main() {
//     var f = fun() { if (true) return 1; else return true; }; } }
#[test]
fn lambda_branches_return_incompatible_types() {
    let body = Block::new(
        vec![Stmt::new(
            StmtKind::If(If {
                cond: Expr::bool_lit(true, p(1, 55)),
                then_branch: Box::new(ret(Some(Expr::int_lit(1, p(1, 68))), p(1, 61))),
                else_branch: Some(Box::new(ret(
                    Some(Expr::bool_lit(true, p(1, 83))),
                    p(1, 76),
                ))),
            }),
            p(1, 51),
        )],
        p(1, 49),
    );
    let lambda = Expr::lambda(vec![], LambdaBody::Block(body), p(1, 43));
    let mut program = Program::new(vec![static_main(
        vec![local("f", None, lambda, p(1, 35), p(1, 39), p(1, 41))],
        1,
    )]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (1,49): incompatible return types in blocked expression\n"
    );
}

// class C { int x; }
// class Main { static void main() { C c = new C(); c.x = 1; } }
#[test]
fn member_variables_are_protected_outside_their_hierarchy() {
    let mut program = Program::new(vec![
        ClassDef::new(
            "C",
            None,
            false,
            vec![FieldDef::Var(VarDef::new(
                TypeLit::int(p(1, 11)),
                Id::new("x", p(1, 15)),
                p(1, 11),
            ))],
            p(1, 1),
        ),
        static_main(
            vec![
                local(
                    "c",
                    Some(TypeLit::class("C", p(2, 35))),
                    Expr::new_class("C", p(2, 41)),
                    p(2, 35),
                    p(2, 37),
                    p(2, 39),
                ),
                assign(
                    Expr::sel(Expr::var("c", p(2, 50)), "x", p(2, 52)),
                    Expr::int_lit(1, p(2, 56)),
                    p(2, 54),
                ),
            ],
            2,
        ),
    ]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (2,52): field 'x' of 'class C' not accessible here\n"
    );
}

// class Main { static void main() { var x = x; } }
#[test]
fn var_initializer_referencing_its_own_name() {
    let mut program = Program::new(vec![static_main(
        vec![local(
            "x",
            None,
            Expr::var("x", p(1, 43)),
            p(1, 35),
            p(1, 39),
            p(1, 41),
        )],
        1,
    )]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (1,43): undeclared variable 'x'\n"
    );
}

#[test]
fn name_resolution_target_stops_before_typing() {
    // The typing error from `2 + true` is not reported at the
    // name-resolution target.
    let mut program = Program::new(vec![static_main(
        vec![Stmt::new(
            StmtKind::ExprEval(Expr::binary(
                BinaryOp::Add,
                Expr::int_lit(2, p(1, 35)),
                Expr::bool_lit(true, p(1, 39)),
                p(1, 37),
            )),
            p(1, 35),
        )],
        1,
    )]);
    let analysis = analyze(
        &mut program,
        &Config {
            target: Target::NameResolution,
        },
    );
    assert!(!analysis.has_errors());
}

fn well_typed_program() -> Program {
    // class A { int x; int get() { return x; } }
    // class Main { static void main() { var f = fun(A a) => a.get; } }
    let getter = FieldDef::Method(MethodDef {
        is_static: false,
        is_abstract: false,
        return_type: TypeLit::int(p(1, 18)),
        id: Id::new("get", p(1, 22)),
        params: vec![],
        body: Some(Block::new(
            vec![ret(Some(Expr::var("x", p(1, 37))), p(1, 30))],
            p(1, 28),
        )),
        pos: p(1, 22),
        symbol: None,
    });
    let lambda = Expr::lambda(
        vec![VarDef::new(
            TypeLit::class("A", p(2, 47)),
            Id::new("a", p(2, 49)),
            p(2, 47),
        )],
        LambdaBody::Expr {
            expr: Box::new(Expr::sel(Expr::var("a", p(2, 55)), "get", p(2, 57))),
            scope: None,
        },
        p(2, 43),
    );
    Program::new(vec![
        ClassDef::new(
            "A",
            None,
            false,
            vec![
                FieldDef::Var(VarDef::new(
                    TypeLit::int(p(1, 11)),
                    Id::new("x", p(1, 15)),
                    p(1, 11),
                )),
                getter,
            ],
            p(1, 1),
        ),
        static_main(
            vec![local("f", None, lambda, p(2, 35), p(2, 39), p(2, 41))],
            2,
        ),
    ])
}

#[test]
fn annotated_ast_round_trips_through_serde() {
    let mut program = well_typed_program();
    let analysis = analyze(&mut program, &Config::default());
    assert_eq!(analysis.render(), "");

    let json = serde_json::to_string(&program).expect("serialize");
    let reloaded: Program = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(reloaded, program);
    assert!(reloaded.global_scope.is_some());
}

#[test]
fn naming_is_idempotent_on_clean_programs() {
    let shape = |table: &SymbolTable| -> Vec<(String, Vec<String>)> {
        table
            .scopes()
            .map(|(_, scope)| {
                (
                    format!("{:?}", scope.kind),
                    scope.symbols().map(|(name, _)| name.to_string()).collect(),
                )
            })
            .collect()
    };

    let mut first = well_typed_program();
    let mut second = well_typed_program();
    let a = analyze(&mut first, &Config::default());
    let b = analyze(&mut second, &Config::default());
    assert!(!a.has_errors() && !b.has_errors());
    assert_eq!(shape(&a.table), shape(&b.table));
}

#[test]
fn diagnostics_are_ordered_by_position() {
    // Two faults on one line, a third on the next; rendering is sorted.
    let mut program = Program::new(vec![static_main(
        vec![
            Stmt::new(
                StmtKind::ExprEval(Expr::binary(
                    BinaryOp::Add,
                    Expr::var("missing", p(2, 5)),
                    Expr::bool_lit(true, p(2, 15)),
                    p(2, 13),
                )),
                p(2, 5),
            ),
            Stmt::new(StmtKind::Break, p(3, 5)),
        ],
        1,
    )]);
    assert_eq!(
        rendered(&mut program),
        "*** Error at (2,5): undeclared variable 'missing'\n\
         *** Error at (3,5): 'break' is only allowed inside a loop\n"
    );
}
