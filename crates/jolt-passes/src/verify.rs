//! Tree-shape verification
//!
//! Checks structural invariants that later stages rely on. A violation means
//! an earlier pass produced a malformed tree, so it is reported as a fatal
//! [`PassError`] rather than as a user diagnostic.
//!
//! Checked:
//! - a not-null assertion never directly wraps another not-null assertion
//! - every variable reference resolves to a parameter of the enclosing
//!   method, or to a variable declared earlier in the same method or field
//!   initializer

use rustc_hash::FxHashSet;

use jolt_ast::*;

use crate::error::{PassError, PassResult};
use crate::pass::{NormalizationPass, PassContext};

#[derive(Debug, Default, Clone, Copy)]
pub struct VerifyTreeShape;

impl VerifyTreeShape {
    pub fn new() -> Self {
        Self
    }
}

impl NormalizationPass for VerifyTreeShape {
    fn name(&self) -> &'static str {
        "verify-tree-shape"
    }

    fn apply_to(&self, unit: CompilationUnit, _ctx: &mut PassContext) -> PassResult<CompilationUnit> {
        let mut verifier = ShapeVerifier::default();
        verifier.visit_compilation_unit(&unit);
        match verifier.error {
            Some((message, span)) => Err(PassError::InternalConsistency {
                pass: self.name(),
                message,
                span,
            }),
            None => Ok(unit),
        }
    }
}

#[derive(Default)]
struct ShapeVerifier {
    in_scope: FxHashSet<VariableId>,
    span: Span,
    /// First violation found
    error: Option<(String, Span)>,
}

impl ShapeVerifier {
    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some((message, self.span));
        }
    }
}

impl Visitor for ShapeVerifier {
    fn visit_type(&mut self, ty: &TypeDeclaration) {
        self.span = ty.span;
        walk_type(self, ty);
    }

    fn visit_field(&mut self, field: &Field) {
        self.in_scope.clear();
        self.span = field.span;
        walk_field(self, field);
    }

    fn visit_method(&mut self, method: &Method) {
        self.in_scope.clear();
        self.in_scope
            .extend(method.parameters.iter().map(Variable::id));
        self.span = method.span;
        walk_method(self, method);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        let outer = self.span;
        self.span = *stmt.span();
        walk_statement(self, stmt);
        self.span = outer;
    }

    fn visit_variable_reference(&mut self, expr: &VariableReference) {
        if !self.in_scope.contains(&expr.variable.id()) {
            self.fail(format!(
                "reference to variable '{}' ({}) outside of its scope",
                expr.variable.name(),
                expr.variable.id()
            ));
        }
    }

    fn visit_not_null_assertion(&mut self, expr: &NotNullAssertion) {
        if matches!(*expr.expression, Expression::NotNullAssertion(_)) {
            self.fail("not-null assertion directly wraps another not-null assertion".to_string());
        }
        walk_not_null_assertion(self, expr);
    }

    fn visit_variable_declaration(&mut self, expr: &VariableDeclarationExpression) {
        for fragment in &expr.fragments {
            // The initializer cannot see the variable it initializes
            if let Some(init) = &fragment.initializer {
                self.visit_expression(init);
            }
            self.in_scope.insert(fragment.variable.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_types::{DeclaredTypeDescriptor, MethodDescriptor, TypeContext, TypeDescriptor};
    use std::sync::Arc;

    fn unit_with(parameters: Vec<Variable>, statements: Vec<Statement>) -> CompilationUnit {
        let holder = DeclaredTypeDescriptor::class("t.Holder");
        let method = Method::new(
            MethodDescriptor::new(
                holder.clone(),
                "run",
                parameters.iter().map(|p| p.type_descriptor().clone()).collect(),
                TypeDescriptor::primitive(jolt_types::PrimitiveType::Void),
            ),
            parameters,
            Some(Block::new(statements, Span::default())),
        );
        CompilationUnit::new("Holder.java", vec![TypeDeclaration::new(holder).with_method(method)])
    }

    fn verify(unit: CompilationUnit) -> PassResult<CompilationUnit> {
        let mut ctx = PassContext::new("Holder.java", Arc::new(TypeContext::new()));
        VerifyTreeShape.apply_to(unit, &mut ctx)
    }

    #[test]
    fn test_well_formed_unit_passes() {
        let p = Variable::parameter("p", TypeDescriptor::class("java.lang.String"));
        let local = Variable::new("l", TypeDescriptor::class("java.lang.String"));
        let statements = vec![
            Expression::declare(
                local.clone(),
                Some(Expression::variable_reference(&p).postfix_not_null_assertion()),
            )
            .make_statement(Span::default()),
            Expression::variable_reference(&local).make_statement(Span::default()),
        ];
        let unit = unit_with(vec![p], statements);
        assert_eq!(verify(unit.clone()).unwrap(), unit);
    }

    #[test]
    fn test_double_assertion_is_rejected() {
        let p = Variable::parameter("p", TypeDescriptor::class("java.lang.String"));
        let doubled = Expression::variable_reference(&p)
            .postfix_not_null_assertion()
            .postfix_not_null_assertion()
            .make_statement(Span::new(5, 9, 2, 1));
        let err = verify(unit_with(vec![p], vec![doubled])).unwrap_err();
        let PassError::InternalConsistency { pass, span, .. } = err;
        assert_eq!(pass, "verify-tree-shape");
        assert_eq!(span, Span::new(5, 9, 2, 1));
    }

    #[test]
    fn test_unbound_reference_is_rejected() {
        let stray = Variable::new("stray", TypeDescriptor::class("java.lang.String"));
        let stmt = Expression::variable_reference(&stray).make_statement(Span::default());
        let err = verify(unit_with(Vec::new(), vec![stmt])).unwrap_err();
        assert!(err.to_string().contains("stray"));
    }

    #[test]
    fn test_self_referencing_initializer_is_rejected() {
        let x = Variable::new("x", TypeDescriptor::class("java.lang.String"));
        let stmt = Expression::declare(x.clone(), Some(Expression::variable_reference(&x)))
            .make_statement(Span::default());
        assert!(verify(unit_with(Vec::new(), vec![stmt])).is_err());
    }
}
