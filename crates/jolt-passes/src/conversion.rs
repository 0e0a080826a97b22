//! Conversion-context propagation
//!
//! [`ConversionContextVisitor`] walks a unit and, at every place where a value
//! flows into a typed slot, hands the value to a [`ContextRewriter`] together
//! with the slot's *inferred* type (the specialized type at this site) and
//! its *declared* type (the type on the unspecialized declaration).
//!
//! | site                              | inferred                  | declared                       |
//! |-----------------------------------|---------------------------|--------------------------------|
//! | assignment right-hand side        | left-hand side type       | field declaration type         |
//! | variable initializer              | variable type             | variable type                  |
//! | field initializer                 | field type                | field declaration type         |
//! | call / `new` argument             | parameter type            | declaration's parameter type   |
//! | return value                      | method return type        | declaration's return type      |
//!
//! Instance member qualifiers, thrown values and references flowing into
//! primitive slots go to the non-null hook instead. Targets of `++`, `--`,
//! `+=` and `-=` of a wrapper type are unboxed too; they have to stay
//! assignable, so the hook receives a separate read evaluated first.
//!
//! Children are rewritten before their parent, so a hook sees an already
//! normalized operand and its output is never revisited.

use jolt_ast::*;
use jolt_types::{DeclaredTypeDescriptor, MethodDescriptor, PrimitiveType, TypeDescriptor};

/// Name of the temporaries holding hoisted assignment-target qualifiers
const QUALIFIER_TEMPORARY: &str = "tmp";

/// Where a conversion happens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionSite {
    /// Span of the innermost enclosing statement or declaration
    pub span: Span,
    pub enclosing_type: Option<DeclaredTypeDescriptor>,
    pub enclosing_method: Option<MethodDescriptor>,
}

/// Hooks invoked at conversion sites. Both default to the identity.
pub trait ContextRewriter {
    fn rewrite_type_conversion_context(
        &mut self,
        _inferred: &TypeDescriptor,
        _declared: &TypeDescriptor,
        expression: Expression,
        _site: &ConversionSite,
    ) -> Expression {
        expression
    }

    fn rewrite_non_null_type_conversion_context(
        &mut self,
        _inferred: &TypeDescriptor,
        _declared: &TypeDescriptor,
        expression: Expression,
        _site: &ConversionSite,
    ) -> Expression {
        expression
    }
}

/// Rewriter that routes every conversion site to a [`ContextRewriter`]
pub struct ConversionContextVisitor<C> {
    context_rewriter: C,
    site: ConversionSite,
    enclosing_spans: Vec<Span>,
}

impl<C: ContextRewriter> ConversionContextVisitor<C> {
    pub fn new(context_rewriter: C) -> Self {
        Self {
            context_rewriter,
            site: ConversionSite::default(),
            enclosing_spans: Vec::new(),
        }
    }

    pub fn into_inner(self) -> C {
        self.context_rewriter
    }

    /// Value flowing into a slot typed `inferred`/`declared`
    fn convert(
        &mut self,
        inferred: &TypeDescriptor,
        declared: &TypeDescriptor,
        expression: Expression,
    ) -> Expression {
        if inferred.is_primitive() && !expression.type_descriptor().is_primitive() {
            // Unboxing
            return self.convert_non_null(inferred, declared, expression);
        }
        self.context_rewriter
            .rewrite_type_conversion_context(inferred, declared, expression, &self.site)
    }

    fn convert_non_null(
        &mut self,
        inferred: &TypeDescriptor,
        declared: &TypeDescriptor,
        expression: Expression,
    ) -> Expression {
        self.context_rewriter
            .rewrite_non_null_type_conversion_context(inferred, declared, expression, &self.site)
    }

    /// Value used where a member is dereferenced or thrown
    fn require_non_null(&mut self, expression: Expression) -> Expression {
        let ty = expression.type_descriptor();
        self.convert_non_null(&ty, &ty, expression)
    }

    fn convert_boxed(
        &mut self,
        inferred: &TypeDescriptor,
        declared: &TypeDescriptor,
        expression: Box<Expression>,
    ) -> Box<Expression> {
        Box::new(self.convert(inferred, declared, *expression))
    }

    fn convert_condition(&mut self, condition: Expression) -> Expression {
        let boolean = TypeDescriptor::primitive(PrimitiveType::Boolean);
        self.convert(&boolean, &boolean, condition)
    }

    /// Operand of a numeric or logical operator; only references need work
    fn convert_operand(&mut self, operand: Box<Expression>) -> Box<Expression> {
        if operand.type_descriptor().is_primitive() {
            return operand;
        }
        Box::new(self.require_non_null(*operand))
    }

    /// Apply the non-null hook to a read of `target` ahead of `update`,
    /// which reads and writes it back: `n++` becomes `(n!, n++)`. A
    /// non-idempotent qualifier is bound to a temporary so it runs once.
    fn guard_unboxed_target(
        &mut self,
        target: Box<Expression>,
        update: impl FnOnce(Box<Expression>) -> Expression,
    ) -> Expression {
        if target.type_descriptor().unboxed_primitive().is_none() {
            return update(target);
        }

        let mut expressions = Vec::with_capacity(3);
        let target = match *target {
            Expression::FieldAccess(FieldAccess {
                qualifier: Some(qualifier),
                target: field,
            }) if !qualifier.is_idempotent() => {
                let temporary = Variable::new(QUALIFIER_TEMPORARY, qualifier.type_descriptor())
                    .with_final(true);
                let reference = Expression::variable_reference(&temporary);
                expressions.push(Expression::declare(temporary, Some(*qualifier)));
                Box::new(Expression::field_access(Some(reference), field))
            }
            other => Box::new(other),
        };

        let read = (*target).clone();
        let checked = self.require_non_null(read.clone());
        if checked != read {
            expressions.push(checked);
        }
        if expressions.is_empty() {
            return update(target);
        }
        expressions.push(update(target));
        Expression::multi(expressions)
    }

    fn convert_arguments(
        &mut self,
        target: &MethodDescriptor,
        arguments: Vec<Expression>,
    ) -> Vec<Expression> {
        let declaration = target.declaration_descriptor().clone();
        let inferred = target.parameter_types();
        let declared = declaration.parameter_types();
        arguments
            .into_iter()
            .enumerate()
            .map(|(i, argument)| match (inferred.get(i), declared.get(i)) {
                (Some(inferred), Some(declared)) => self.convert(inferred, declared, argument),
                _ => argument,
            })
            .collect()
    }

    fn convert_qualifier(&mut self, qualifier: Option<Box<Expression>>) -> Option<Box<Expression>> {
        qualifier.map(|q| Box::new(self.require_non_null(*q)))
    }
}

/// Declared type of an assignment target
fn assignment_declared_type(target: &Expression) -> TypeDescriptor {
    match target {
        Expression::FieldAccess(access) => access
            .target
            .declaration_descriptor()
            .type_descriptor()
            .clone(),
        other => other.type_descriptor(),
    }
}

impl<C: ContextRewriter> Rewriter for ConversionContextVisitor<C> {
    fn enter_type(&mut self, ty: &TypeDeclaration) {
        self.site.enclosing_type = Some(ty.descriptor.clone());
        self.site.span = ty.span;
    }

    fn exit_type(&mut self, _ty: &TypeDeclaration) {
        self.site.enclosing_type = None;
    }

    fn enter_field(&mut self, field: &Field) {
        self.site.span = field.span;
    }

    fn enter_method(&mut self, method: &Method) {
        self.site.enclosing_method = Some(method.descriptor.clone());
        self.site.span = method.span;
    }

    fn exit_method(&mut self, _method: &Method) {
        self.site.enclosing_method = None;
    }

    fn enter_statement(&mut self, stmt: &Statement) {
        self.enclosing_spans.push(self.site.span);
        self.site.span = *stmt.span();
    }

    fn exit_statement(&mut self, _stmt: &Statement) {
        if let Some(span) = self.enclosing_spans.pop() {
            self.site.span = span;
        }
    }

    fn rewrite_field(&mut self, field: Field) -> Field {
        let Field {
            descriptor,
            initializer,
            span,
        } = field;
        let initializer = initializer.map(|init| {
            let inferred = descriptor.type_descriptor().clone();
            let declared = descriptor.declaration_descriptor().type_descriptor().clone();
            self.convert(&inferred, &declared, init)
        });
        Field {
            descriptor,
            initializer,
            span,
        }
    }

    fn rewrite_return_statement(&mut self, stmt: ReturnStatement) -> Statement {
        let ReturnStatement { expression, span } = stmt;
        let expression = match (expression, self.site.enclosing_method.clone()) {
            (Some(value), Some(method)) => {
                let inferred = method.return_type();
                let declared = method.declaration_descriptor().return_type();
                Some(self.convert(inferred, declared, value))
            }
            (expression, _) => expression,
        };
        Statement::Return(ReturnStatement { expression, span })
    }

    fn rewrite_throw_statement(&mut self, stmt: ThrowStatement) -> Statement {
        let ThrowStatement { expression, span } = stmt;
        let expression = self.require_non_null(expression);
        Statement::Throw(ThrowStatement { expression, span })
    }

    fn rewrite_if_statement(&mut self, mut stmt: IfStatement) -> Statement {
        stmt.condition = self.convert_condition(stmt.condition);
        Statement::If(stmt)
    }

    fn rewrite_while_statement(&mut self, mut stmt: WhileStatement) -> Statement {
        stmt.condition = self.convert_condition(stmt.condition);
        Statement::While(stmt)
    }

    fn rewrite_for_statement(&mut self, mut stmt: ForStatement) -> Statement {
        stmt.condition = stmt.condition.map(|c| self.convert_condition(c));
        Statement::For(stmt)
    }

    fn rewrite_assert_statement(&mut self, mut stmt: AssertStatement) -> Statement {
        stmt.expression = self.convert_condition(stmt.expression);
        Statement::Assert(stmt)
    }

    fn rewrite_field_access(&mut self, expr: FieldAccess) -> Expression {
        let FieldAccess { qualifier, target } = expr;
        let qualifier = if target.is_static() {
            qualifier
        } else {
            self.convert_qualifier(qualifier)
        };
        Expression::FieldAccess(FieldAccess { qualifier, target })
    }

    fn rewrite_method_call(&mut self, expr: MethodCall) -> Expression {
        let MethodCall {
            qualifier,
            target,
            arguments,
        } = expr;
        let qualifier = if target.is_static() {
            qualifier
        } else {
            self.convert_qualifier(qualifier)
        };
        let arguments = self.convert_arguments(&target, arguments);
        Expression::MethodCall(MethodCall {
            qualifier,
            target,
            arguments,
        })
    }

    fn rewrite_new_instance(&mut self, expr: NewInstance) -> Expression {
        let NewInstance { target, arguments } = expr;
        let arguments = self.convert_arguments(&target, arguments);
        Expression::NewInstance(NewInstance { target, arguments })
    }

    fn rewrite_binary(&mut self, expr: BinaryExpression) -> Expression {
        let BinaryExpression {
            operator,
            left,
            right,
            type_descriptor,
        } = expr;
        let (left, right) = match operator {
            BinaryOperator::Assign => {
                let inferred = left.type_descriptor();
                let declared = assignment_declared_type(&left);
                let right = self.convert_boxed(&inferred, &declared, right);
                (left, right)
            }
            BinaryOperator::PlusAssign | BinaryOperator::MinusAssign => {
                let inferred = left.type_descriptor();
                let right = if inferred.unboxed_primitive().is_some() {
                    // Arithmetic on the unboxed values of both sides
                    self.convert_operand(right)
                } else {
                    let declared = assignment_declared_type(&left);
                    self.convert_boxed(&inferred, &declared, right)
                };
                return self.guard_unboxed_target(left, |left| {
                    Expression::Binary(BinaryExpression {
                        operator,
                        left,
                        right,
                        type_descriptor,
                    })
                });
            }
            // Reference comparison unless exactly one side is primitive
            BinaryOperator::Equals | BinaryOperator::NotEquals => {
                match (
                    left.type_descriptor().is_primitive(),
                    right.type_descriptor().is_primitive(),
                ) {
                    (true, false) => (left, self.convert_operand(right)),
                    (false, true) => (self.convert_operand(left), right),
                    _ => (left, right),
                }
            }
            // String concatenation when the result is a reference
            BinaryOperator::Plus if !type_descriptor.is_primitive() => (left, right),
            BinaryOperator::Plus
            | BinaryOperator::Minus
            | BinaryOperator::Times
            | BinaryOperator::Divide
            | BinaryOperator::Remainder
            | BinaryOperator::Less
            | BinaryOperator::LessEquals
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEquals
            | BinaryOperator::ConditionalAnd
            | BinaryOperator::ConditionalOr => {
                (self.convert_operand(left), self.convert_operand(right))
            }
        };
        Expression::Binary(BinaryExpression {
            operator,
            left,
            right,
            type_descriptor,
        })
    }

    fn rewrite_unary(&mut self, expr: UnaryExpression) -> Expression {
        let UnaryExpression {
            operator,
            prefix,
            operand,
            type_descriptor,
        } = expr;
        let rebuild = |operand: Box<Expression>| {
            Expression::Unary(UnaryExpression {
                operator,
                prefix,
                operand,
                type_descriptor,
            })
        };
        match operator {
            UnaryOperator::Plus | UnaryOperator::Minus | UnaryOperator::Not => {
                let operand = self.convert_operand(operand);
                rebuild(operand)
            }
            UnaryOperator::Increment | UnaryOperator::Decrement => {
                self.guard_unboxed_target(operand, rebuild)
            }
        }
    }

    fn rewrite_cast(&mut self, expr: CastExpression) -> Expression {
        let CastExpression {
            cast_type,
            expression,
        } = expr;
        let expression = if cast_type.is_primitive() {
            self.convert_boxed(&cast_type, &cast_type, expression)
        } else {
            expression
        };
        Expression::Cast(CastExpression {
            cast_type,
            expression,
        })
    }

    fn rewrite_conditional(&mut self, mut expr: ConditionalExpression) -> Expression {
        expr.condition = Box::new(self.convert_condition(*expr.condition));
        if expr.type_descriptor.is_primitive() {
            expr.true_expression = self.convert_operand(expr.true_expression);
            expr.false_expression = self.convert_operand(expr.false_expression);
        }
        Expression::Conditional(expr)
    }

    fn rewrite_multi(&mut self, expr: MultiExpression) -> Expression {
        let mut expressions = Vec::with_capacity(expr.expressions.len());
        for expression in expr.expressions {
            match expression {
                Expression::Multi(inner) => expressions.extend(inner.expressions),
                other => expressions.push(other),
            }
        }
        // An update guarded again carries the same check twice in a row
        expressions.dedup_by(|later, earlier| {
            matches!(earlier, Expression::NotNullAssertion(_))
                && earlier.is_idempotent()
                && later == earlier
        });
        Expression::multi(expressions)
    }

    fn rewrite_variable_declaration(&mut self, expr: VariableDeclarationExpression) -> Expression {
        let fragments = expr
            .fragments
            .into_iter()
            .map(|VariableDeclarationFragment { variable, initializer }| {
                let initializer = initializer.map(|init| {
                    let ty = variable.type_descriptor().clone();
                    self.convert(&ty, &ty, init)
                });
                VariableDeclarationFragment {
                    variable,
                    initializer,
                }
            })
            .collect();
        Expression::VariableDeclaration(VariableDeclarationExpression { fragments })
    }
}
