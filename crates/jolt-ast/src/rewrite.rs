//! Owning, post-order tree rewriting
//!
//! A [`Rewriter`] consumes the tree and rebuilds it bottom-up. Every node's
//! children are rewritten before the node's own `rewrite_*` hook runs, so a
//! hook always sees normalized children and whatever it returns is never
//! revisited. Expression slots can only be refilled with an [`Expression`]
//! and statement slots with a [`Statement`].
//!
//! `enter_*`/`exit_*` hooks give pre-order access to declarations and
//! statements, which is how rewriters keep track of where they are.

use crate::expression::*;
use crate::statement::*;
use crate::unit::*;

/// AST rewriter trait
///
/// All hooks default to the identity.
pub trait Rewriter: Sized {
    // Scope tracking
    fn enter_type(&mut self, _ty: &TypeDeclaration) {}
    fn exit_type(&mut self, _ty: &TypeDeclaration) {}
    fn enter_field(&mut self, _field: &Field) {}
    fn exit_field(&mut self, _field: &Field) {}
    fn enter_method(&mut self, _method: &Method) {}
    fn exit_method(&mut self, _method: &Method) {}
    fn enter_statement(&mut self, _stmt: &Statement) {}
    fn exit_statement(&mut self, _stmt: &Statement) {}

    // Declarations
    fn rewrite_compilation_unit(&mut self, unit: CompilationUnit) -> CompilationUnit {
        unit
    }

    fn rewrite_type(&mut self, ty: TypeDeclaration) -> TypeDeclaration {
        ty
    }

    fn rewrite_field(&mut self, field: Field) -> Field {
        field
    }

    fn rewrite_method(&mut self, method: Method) -> Method {
        method
    }

    // Statements
    fn rewrite_block(&mut self, block: Block) -> Block {
        block
    }

    fn rewrite_expression_statement(&mut self, stmt: ExpressionStatement) -> Statement {
        Statement::Expression(stmt)
    }

    fn rewrite_return_statement(&mut self, stmt: ReturnStatement) -> Statement {
        Statement::Return(stmt)
    }

    fn rewrite_if_statement(&mut self, stmt: IfStatement) -> Statement {
        Statement::If(stmt)
    }

    fn rewrite_while_statement(&mut self, stmt: WhileStatement) -> Statement {
        Statement::While(stmt)
    }

    fn rewrite_for_statement(&mut self, stmt: ForStatement) -> Statement {
        Statement::For(stmt)
    }

    fn rewrite_assert_statement(&mut self, stmt: AssertStatement) -> Statement {
        Statement::Assert(stmt)
    }

    fn rewrite_throw_statement(&mut self, stmt: ThrowStatement) -> Statement {
        Statement::Throw(stmt)
    }

    // Expressions
    fn rewrite_null_literal(&mut self, expr: NullLiteral) -> Expression {
        Expression::NullLiteral(expr)
    }

    fn rewrite_boolean_literal(&mut self, expr: BooleanLiteral) -> Expression {
        Expression::BooleanLiteral(expr)
    }

    fn rewrite_number_literal(&mut self, expr: NumberLiteral) -> Expression {
        Expression::NumberLiteral(expr)
    }

    fn rewrite_string_literal(&mut self, expr: StringLiteral) -> Expression {
        Expression::StringLiteral(expr)
    }

    fn rewrite_this(&mut self, expr: ThisReference) -> Expression {
        Expression::This(expr)
    }

    fn rewrite_variable_reference(&mut self, expr: VariableReference) -> Expression {
        Expression::VariableReference(expr)
    }

    fn rewrite_field_access(&mut self, expr: FieldAccess) -> Expression {
        Expression::FieldAccess(expr)
    }

    fn rewrite_method_call(&mut self, expr: MethodCall) -> Expression {
        Expression::MethodCall(expr)
    }

    fn rewrite_new_instance(&mut self, expr: NewInstance) -> Expression {
        Expression::NewInstance(expr)
    }

    fn rewrite_binary(&mut self, expr: BinaryExpression) -> Expression {
        Expression::Binary(expr)
    }

    fn rewrite_unary(&mut self, expr: UnaryExpression) -> Expression {
        Expression::Unary(expr)
    }

    fn rewrite_cast(&mut self, expr: CastExpression) -> Expression {
        Expression::Cast(expr)
    }

    fn rewrite_conditional(&mut self, expr: ConditionalExpression) -> Expression {
        Expression::Conditional(expr)
    }

    fn rewrite_not_null_assertion(&mut self, expr: NotNullAssertion) -> Expression {
        Expression::NotNullAssertion(expr)
    }

    fn rewrite_multi(&mut self, expr: MultiExpression) -> Expression {
        Expression::Multi(expr)
    }

    fn rewrite_variable_declaration(&mut self, expr: VariableDeclarationExpression) -> Expression {
        Expression::VariableDeclaration(expr)
    }
}

// ============================================================================
// Entry points
// ============================================================================

impl CompilationUnit {
    pub fn accept<R: Rewriter>(self, rewriter: &mut R) -> CompilationUnit {
        fold_compilation_unit(rewriter, self)
    }
}

impl TypeDeclaration {
    pub fn accept<R: Rewriter>(self, rewriter: &mut R) -> TypeDeclaration {
        fold_type(rewriter, self)
    }
}

impl Method {
    pub fn accept<R: Rewriter>(self, rewriter: &mut R) -> Method {
        fold_method(rewriter, self)
    }
}

impl Statement {
    pub fn accept<R: Rewriter>(self, rewriter: &mut R) -> Statement {
        fold_statement(rewriter, self)
    }
}

impl Expression {
    pub fn accept<R: Rewriter>(self, rewriter: &mut R) -> Expression {
        fold_expression(rewriter, self)
    }
}

// ============================================================================
// Fold Functions - Children First, Then The Node's Hook
// ============================================================================

pub fn fold_compilation_unit<R: Rewriter>(r: &mut R, unit: CompilationUnit) -> CompilationUnit {
    let CompilationUnit { name, types } = unit;
    let types = types.into_iter().map(|ty| fold_type(r, ty)).collect();
    r.rewrite_compilation_unit(CompilationUnit { name, types })
}

pub fn fold_type<R: Rewriter>(r: &mut R, ty: TypeDeclaration) -> TypeDeclaration {
    r.enter_type(&ty);
    let TypeDeclaration {
        descriptor,
        superclass,
        interfaces,
        fields,
        methods,
        span,
    } = ty;
    let fields = fields.into_iter().map(|f| fold_field(r, f)).collect();
    let methods = methods.into_iter().map(|m| fold_method(r, m)).collect();
    let ty = r.rewrite_type(TypeDeclaration {
        descriptor,
        superclass,
        interfaces,
        fields,
        methods,
        span,
    });
    r.exit_type(&ty);
    ty
}

pub fn fold_field<R: Rewriter>(r: &mut R, field: Field) -> Field {
    r.enter_field(&field);
    let Field {
        descriptor,
        initializer,
        span,
    } = field;
    let initializer = initializer.map(|init| fold_expression(r, init));
    let field = r.rewrite_field(Field {
        descriptor,
        initializer,
        span,
    });
    r.exit_field(&field);
    field
}

pub fn fold_method<R: Rewriter>(r: &mut R, method: Method) -> Method {
    r.enter_method(&method);
    let Method {
        descriptor,
        parameters,
        body,
        span,
    } = method;
    let body = body.map(|b| fold_block(r, b));
    let method = r.rewrite_method(Method {
        descriptor,
        parameters,
        body,
        span,
    });
    r.exit_method(&method);
    method
}

pub fn fold_block<R: Rewriter>(r: &mut R, block: Block) -> Block {
    let Block { statements, span } = block;
    let statements = statements
        .into_iter()
        .map(|s| fold_statement(r, s))
        .collect();
    r.rewrite_block(Block { statements, span })
}

fn fold_boxed_statement<R: Rewriter>(r: &mut R, stmt: Box<Statement>) -> Box<Statement> {
    Box::new(fold_statement(r, *stmt))
}

pub fn fold_statement<R: Rewriter>(r: &mut R, stmt: Statement) -> Statement {
    r.enter_statement(&stmt);
    let result = match stmt {
        Statement::Expression(ExpressionStatement { expression, span }) => {
            let expression = fold_expression(r, expression);
            r.rewrite_expression_statement(ExpressionStatement { expression, span })
        }
        Statement::Block(block) => Statement::Block(fold_block(r, block)),
        Statement::Return(ReturnStatement { expression, span }) => {
            let expression = expression.map(|e| fold_expression(r, e));
            r.rewrite_return_statement(ReturnStatement { expression, span })
        }
        Statement::If(IfStatement {
            condition,
            then_statement,
            else_statement,
            span,
        }) => {
            let condition = fold_expression(r, condition);
            let then_statement = fold_boxed_statement(r, then_statement);
            let else_statement = else_statement.map(|s| fold_boxed_statement(r, s));
            r.rewrite_if_statement(IfStatement {
                condition,
                then_statement,
                else_statement,
                span,
            })
        }
        Statement::While(WhileStatement {
            condition,
            body,
            span,
        }) => {
            let condition = fold_expression(r, condition);
            let body = fold_boxed_statement(r, body);
            r.rewrite_while_statement(WhileStatement {
                condition,
                body,
                span,
            })
        }
        Statement::For(ForStatement {
            initializers,
            condition,
            updates,
            body,
            span,
        }) => {
            let initializers = fold_expressions(r, initializers);
            let condition = condition.map(|c| fold_expression(r, c));
            let updates = fold_expressions(r, updates);
            let body = fold_boxed_statement(r, body);
            r.rewrite_for_statement(ForStatement {
                initializers,
                condition,
                updates,
                body,
                span,
            })
        }
        Statement::Assert(AssertStatement {
            expression,
            message,
            span,
        }) => {
            let expression = fold_expression(r, expression);
            let message = message.map(|m| fold_expression(r, m));
            r.rewrite_assert_statement(AssertStatement {
                expression,
                message,
                span,
            })
        }
        Statement::Throw(ThrowStatement { expression, span }) => {
            let expression = fold_expression(r, expression);
            r.rewrite_throw_statement(ThrowStatement { expression, span })
        }
    };
    r.exit_statement(&result);
    result
}

fn fold_boxed<R: Rewriter>(r: &mut R, expr: Box<Expression>) -> Box<Expression> {
    Box::new(fold_expression(r, *expr))
}

fn fold_expressions<R: Rewriter>(r: &mut R, exprs: Vec<Expression>) -> Vec<Expression> {
    exprs.into_iter().map(|e| fold_expression(r, e)).collect()
}

pub fn fold_expression<R: Rewriter>(r: &mut R, expr: Expression) -> Expression {
    match expr {
        Expression::NullLiteral(e) => r.rewrite_null_literal(e),
        Expression::BooleanLiteral(e) => r.rewrite_boolean_literal(e),
        Expression::NumberLiteral(e) => r.rewrite_number_literal(e),
        Expression::StringLiteral(e) => r.rewrite_string_literal(e),
        Expression::This(e) => r.rewrite_this(e),
        Expression::VariableReference(e) => r.rewrite_variable_reference(e),
        Expression::FieldAccess(FieldAccess { qualifier, target }) => {
            let qualifier = qualifier.map(|q| fold_boxed(r, q));
            r.rewrite_field_access(FieldAccess { qualifier, target })
        }
        Expression::MethodCall(MethodCall {
            qualifier,
            target,
            arguments,
        }) => {
            let qualifier = qualifier.map(|q| fold_boxed(r, q));
            let arguments = fold_expressions(r, arguments);
            r.rewrite_method_call(MethodCall {
                qualifier,
                target,
                arguments,
            })
        }
        Expression::NewInstance(NewInstance { target, arguments }) => {
            let arguments = fold_expressions(r, arguments);
            r.rewrite_new_instance(NewInstance { target, arguments })
        }
        Expression::Binary(BinaryExpression {
            operator,
            left,
            right,
            type_descriptor,
        }) => {
            let left = fold_boxed(r, left);
            let right = fold_boxed(r, right);
            r.rewrite_binary(BinaryExpression {
                operator,
                left,
                right,
                type_descriptor,
            })
        }
        Expression::Unary(UnaryExpression {
            operator,
            prefix,
            operand,
            type_descriptor,
        }) => {
            let operand = fold_boxed(r, operand);
            r.rewrite_unary(UnaryExpression {
                operator,
                prefix,
                operand,
                type_descriptor,
            })
        }
        Expression::Cast(CastExpression {
            cast_type,
            expression,
        }) => {
            let expression = fold_boxed(r, expression);
            r.rewrite_cast(CastExpression {
                cast_type,
                expression,
            })
        }
        Expression::Conditional(ConditionalExpression {
            condition,
            true_expression,
            false_expression,
            type_descriptor,
        }) => {
            let condition = fold_boxed(r, condition);
            let true_expression = fold_boxed(r, true_expression);
            let false_expression = fold_boxed(r, false_expression);
            r.rewrite_conditional(ConditionalExpression {
                condition,
                true_expression,
                false_expression,
                type_descriptor,
            })
        }
        Expression::NotNullAssertion(NotNullAssertion { expression }) => {
            let expression = fold_boxed(r, expression);
            r.rewrite_not_null_assertion(NotNullAssertion { expression })
        }
        Expression::Multi(MultiExpression { expressions }) => {
            let expressions = fold_expressions(r, expressions);
            r.rewrite_multi(MultiExpression { expressions })
        }
        Expression::VariableDeclaration(VariableDeclarationExpression { fragments }) => {
            let fragments = fragments
                .into_iter()
                .map(|VariableDeclarationFragment { variable, initializer }| {
                    VariableDeclarationFragment {
                        variable,
                        initializer: initializer.map(|init| fold_expression(r, init)),
                    }
                })
                .collect();
            r.rewrite_variable_declaration(VariableDeclarationExpression { fragments })
        }
    }
}
