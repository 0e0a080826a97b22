//! AST visitor pattern for traversing the tree read-only
//!
//! Each `visit_*` method has a default implementation that calls the
//! corresponding `walk_*` function, so implementors only override the nodes
//! they care about.
//!
//! # Example
//!
//! ```rust
//! use jolt_ast::*;
//!
//! struct CountAssertions {
//!     count: usize,
//! }
//!
//! impl Visitor for CountAssertions {
//!     fn visit_not_null_assertion(&mut self, expr: &NotNullAssertion) {
//!         self.count += 1;
//!         walk_not_null_assertion(self, expr);
//!     }
//! }
//! ```

use crate::expression::*;
use crate::statement::*;
use crate::unit::*;

/// AST visitor trait
pub trait Visitor: Sized {
    // Declarations
    fn visit_compilation_unit(&mut self, unit: &CompilationUnit) {
        walk_compilation_unit(self, unit);
    }

    fn visit_type(&mut self, ty: &TypeDeclaration) {
        walk_type(self, ty);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_method(&mut self, method: &Method) {
        walk_method(self, method);
    }

    // Statements
    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    // Expressions
    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_variable_reference(&mut self, _expr: &VariableReference) {
        // Leaf node
    }

    fn visit_not_null_assertion(&mut self, expr: &NotNullAssertion) {
        walk_not_null_assertion(self, expr);
    }

    fn visit_variable_declaration(&mut self, expr: &VariableDeclarationExpression) {
        walk_variable_declaration(self, expr);
    }

    fn visit_method_call(&mut self, expr: &MethodCall) {
        walk_method_call(self, expr);
    }
}

// ============================================================================
// Walk Functions - Default Traversal Implementations
// ============================================================================

pub fn walk_compilation_unit<V: Visitor>(visitor: &mut V, unit: &CompilationUnit) {
    for ty in &unit.types {
        visitor.visit_type(ty);
    }
}

pub fn walk_type<V: Visitor>(visitor: &mut V, ty: &TypeDeclaration) {
    for field in &ty.fields {
        visitor.visit_field(field);
    }
    for method in &ty.methods {
        visitor.visit_method(method);
    }
}

pub fn walk_field<V: Visitor>(visitor: &mut V, field: &Field) {
    if let Some(init) = &field.initializer {
        visitor.visit_expression(init);
    }
}

pub fn walk_method<V: Visitor>(visitor: &mut V, method: &Method) {
    // Body is None for abstract methods
    if let Some(body) = &method.body {
        visitor.visit_block(body);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Expression(s) => visitor.visit_expression(&s.expression),
        Statement::Block(block) => visitor.visit_block(block),
        Statement::Return(s) => {
            if let Some(value) = &s.expression {
                visitor.visit_expression(value);
            }
        }
        Statement::If(s) => {
            visitor.visit_expression(&s.condition);
            visitor.visit_statement(&s.then_statement);
            if let Some(else_statement) = &s.else_statement {
                visitor.visit_statement(else_statement);
            }
        }
        Statement::While(s) => {
            visitor.visit_expression(&s.condition);
            visitor.visit_statement(&s.body);
        }
        Statement::For(s) => {
            for init in &s.initializers {
                visitor.visit_expression(init);
            }
            if let Some(condition) = &s.condition {
                visitor.visit_expression(condition);
            }
            for update in &s.updates {
                visitor.visit_expression(update);
            }
            visitor.visit_statement(&s.body);
        }
        Statement::Assert(s) => {
            visitor.visit_expression(&s.expression);
            if let Some(message) = &s.message {
                visitor.visit_expression(message);
            }
        }
        Statement::Throw(s) => visitor.visit_expression(&s.expression),
    }
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::NullLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NumberLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::This(_) => {}
        Expression::VariableReference(e) => visitor.visit_variable_reference(e),
        Expression::FieldAccess(e) => {
            if let Some(qualifier) = &e.qualifier {
                visitor.visit_expression(qualifier);
            }
        }
        Expression::MethodCall(e) => visitor.visit_method_call(e),
        Expression::NewInstance(e) => {
            for arg in &e.arguments {
                visitor.visit_expression(arg);
            }
        }
        Expression::Binary(e) => {
            visitor.visit_expression(&e.left);
            visitor.visit_expression(&e.right);
        }
        Expression::Unary(e) => visitor.visit_expression(&e.operand),
        Expression::Cast(e) => visitor.visit_expression(&e.expression),
        Expression::Conditional(e) => {
            visitor.visit_expression(&e.condition);
            visitor.visit_expression(&e.true_expression);
            visitor.visit_expression(&e.false_expression);
        }
        Expression::NotNullAssertion(e) => visitor.visit_not_null_assertion(e),
        Expression::Multi(e) => {
            for expr in &e.expressions {
                visitor.visit_expression(expr);
            }
        }
        Expression::VariableDeclaration(e) => visitor.visit_variable_declaration(e),
    }
}

pub fn walk_not_null_assertion<V: Visitor>(visitor: &mut V, expr: &NotNullAssertion) {
    visitor.visit_expression(&expr.expression);
}

pub fn walk_variable_declaration<V: Visitor>(visitor: &mut V, expr: &VariableDeclarationExpression) {
    for fragment in &expr.fragments {
        if let Some(init) = &fragment.initializer {
            visitor.visit_expression(init);
        }
    }
}

pub fn walk_method_call<V: Visitor>(visitor: &mut V, expr: &MethodCall) {
    if let Some(qualifier) = &expr.qualifier {
        visitor.visit_expression(qualifier);
    }
    for arg in &expr.arguments {
        visitor.visit_expression(arg);
    }
}
