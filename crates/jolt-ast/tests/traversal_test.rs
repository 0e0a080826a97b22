//! Visitor and rewriter traversal over a whole unit

use jolt_ast::*;
use jolt_types::{DeclaredTypeDescriptor, MethodDescriptor, PrimitiveType, TypeDescriptor};

fn int() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveType::Int)
}

fn counter() -> DeclaredTypeDescriptor {
    DeclaredTypeDescriptor::class("t.Counter")
}

fn tick() -> MethodDescriptor {
    MethodDescriptor::new(counter(), "tick", vec![int()], int())
}

/// ```java
/// class Counter {
///   int count(int n) {
///     for (int i = 0; i < n; i++) { tick(i); }
///     if (n > 10) return tick(n);
///     return n;
///   }
/// }
/// ```
fn counter_unit() -> (CompilationUnit, Variable, Variable) {
    let n = Variable::parameter("n", int());
    let i = Variable::new("i", int());
    let this = || Expression::this(counter().to_type_descriptor());

    let for_loop = Statement::For(ForStatement {
        initializers: vec![Expression::declare(i.clone(), Some(Expression::int_literal(0)))],
        condition: Some(Expression::binary(
            BinaryOperator::Less,
            Expression::variable_reference(&i),
            Expression::variable_reference(&n),
        )),
        updates: vec![Expression::unary(
            UnaryOperator::Increment,
            false,
            Expression::variable_reference(&i),
        )],
        body: Box::new(Statement::Block(Block::new(
            vec![Expression::method_call(
                Some(this()),
                tick(),
                vec![Expression::variable_reference(&i)],
            )
            .make_statement(Span::new(40, 48, 3, 35))],
            Span::new(38, 50, 3, 33),
        ))),
        span: Span::new(10, 50, 3, 5),
    });

    let guard = Statement::If(IfStatement {
        condition: Expression::binary(
            BinaryOperator::Greater,
            Expression::variable_reference(&n),
            Expression::int_literal(10),
        ),
        then_statement: Box::new(Statement::Return(ReturnStatement {
            expression: Some(Expression::method_call(
                Some(this()),
                tick(),
                vec![Expression::variable_reference(&n)],
            )),
            span: Span::new(70, 85, 4, 17),
        })),
        else_statement: None,
        span: Span::new(55, 85, 4, 5),
    });

    let fallthrough = Statement::Return(ReturnStatement {
        expression: Some(Expression::variable_reference(&n)),
        span: Span::new(90, 99, 5, 5),
    });

    let method = Method::new(
        MethodDescriptor::new(counter(), "count", vec![int()], int()),
        vec![n.clone()],
        Some(Block::new(vec![for_loop, guard, fallthrough], Span::new(8, 101, 2, 20))),
    );
    let unit = CompilationUnit::new(
        "Counter.java",
        vec![TypeDeclaration::new(counter()).with_method(method)],
    );
    (unit, n, i)
}

#[derive(Default)]
struct ReferenceCounter {
    references: Vec<VariableId>,
    calls: usize,
}

impl Visitor for ReferenceCounter {
    fn visit_variable_reference(&mut self, expr: &VariableReference) {
        self.references.push(expr.variable.id());
    }

    fn visit_method_call(&mut self, expr: &MethodCall) {
        self.calls += 1;
        walk_method_call(self, expr);
    }
}

#[test]
fn test_visitor_reaches_every_slot() {
    let (unit, n, i) = counter_unit();
    let mut counter = ReferenceCounter::default();
    counter.visit_compilation_unit(&unit);

    assert_eq!(counter.calls, 2);
    let of_n = counter.references.iter().filter(|id| **id == n.id()).count();
    let of_i = counter.references.iter().filter(|id| **id == i.id()).count();
    // n: loop condition, if condition, call argument, final return
    assert_eq!(of_n, 4);
    // i: loop condition, update, call argument
    assert_eq!(of_i, 3);
}

/// Replaces `tick(x)` calls with their argument and records the spans of
/// the statements it passes through
#[derive(Default)]
struct InlineTick {
    spans: Vec<Span>,
}

impl Rewriter for InlineTick {
    fn enter_statement(&mut self, stmt: &Statement) {
        self.spans.push(*stmt.span());
    }

    fn rewrite_method_call(&mut self, mut expr: MethodCall) -> Expression {
        if expr.target.name() == "tick" && expr.arguments.len() == 1 {
            return expr.arguments.remove(0);
        }
        Expression::MethodCall(expr)
    }
}

#[test]
fn test_rewriter_replaces_calls_in_place() {
    let (unit, n, _) = counter_unit();
    let mut inline = InlineTick::default();
    let unit = unit.accept(&mut inline);

    let mut counter = ReferenceCounter::default();
    counter.visit_compilation_unit(&unit);
    assert_eq!(counter.calls, 0);

    let body = unit.types[0].methods[0].body.as_ref().unwrap();
    let Statement::If(guard) = &body.statements[1] else {
        panic!("expected if");
    };
    let Statement::Return(ret) = guard.then_statement.as_ref() else {
        panic!("expected return");
    };
    assert_eq!(ret.expression, Some(Expression::variable_reference(&n)));

    // Pre-order: for, block, call statement, if, return, return
    assert_eq!(
        inline.spans,
        vec![
            Span::new(10, 50, 3, 5),
            Span::new(38, 50, 3, 33),
            Span::new(40, 48, 3, 35),
            Span::new(55, 85, 4, 5),
            Span::new(70, 85, 4, 17),
            Span::new(90, 99, 5, 5),
        ]
    );
}

#[test]
fn test_rewriting_a_clone_leaves_original_untouched() {
    let (unit, _, _) = counter_unit();
    let copy = unit.clone();
    let rewritten = copy.accept(&mut InlineTick::default());

    assert_ne!(rewritten, unit);
    let mut counter = ReferenceCounter::default();
    counter.visit_compilation_unit(&unit);
    assert_eq!(counter.calls, 2);
}
