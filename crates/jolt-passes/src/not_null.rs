//! Null-safety insertion
//!
//! Inserts non-null assertions where the source language performs an
//! implicit null check, and where a nullable value is converted to a
//! non-null type. Assert messages that may be null get an elvis default.

use jolt_ast::*;
use jolt_types::TypeDescriptor;

use crate::conversion::{ContextRewriter, ConversionContextVisitor, ConversionSite};
use crate::diagnostic::{Problems, NULL_ASSERTION_ON_NULL};
use crate::error::PassResult;
use crate::pass::{NormalizationPass, PassContext};

/// Name of the temporaries introduced for non-idempotent elvis operands
const ELVIS_TEMPORARY: &str = "tmp";

#[derive(Debug, Default, Clone, Copy)]
pub struct InsertNotNullAssertions;

impl InsertNotNullAssertions {
    pub fn new() -> Self {
        Self
    }
}

impl NormalizationPass for InsertNotNullAssertions {
    fn name(&self) -> &'static str {
        "insert-not-null-assertions"
    }

    fn apply_to(&self, unit: CompilationUnit, ctx: &mut PassContext) -> PassResult<CompilationUnit> {
        let object = ctx.types().non_nullable(&ctx.types().well_known().java_lang_object);

        // Type conversions run first: once other assertions exist the
        // surrounding context is no longer visible, and doubled assertions
        // would go unnoticed.
        let mut conversions = ConversionContextVisitor::new(NotNullInserter {
            problems: ctx.problems_mut(),
            inserted: 0,
        });
        let unit = unit.accept(&mut conversions);
        let inserted = conversions.into_inner().inserted;

        let mut messages = AssertMessageElvis {
            object_type: object,
            rewritten: 0,
        };
        let unit = unit.accept(&mut messages);

        log::debug!(
            "{}: inserted {} not-null assertions, {} assert message defaults in '{}'",
            self.name(),
            inserted,
            messages.rewritten,
            unit.name
        );
        Ok(unit)
    }
}

struct NotNullInserter<'a> {
    problems: &'a mut Problems,
    inserted: usize,
}

impl NotNullInserter<'_> {
    fn insert(&mut self, expression: Expression, site: &ConversionSite) -> Expression {
        let before = is_inferred_as_non_null(&expression);
        let expression = insert_not_null_assertion_if_needed(expression, site, self.problems);
        if !before {
            self.inserted += 1;
        }
        expression
    }
}

impl ContextRewriter for NotNullInserter<'_> {
    fn rewrite_type_conversion_context(
        &mut self,
        inferred: &TypeDescriptor,
        declared: &TypeDescriptor,
        expression: Expression,
        site: &ConversionSite,
    ) -> Expression {
        if !inferred.is_java_lang_void() && (!inferred.can_be_null() || !declared.can_be_null()) {
            self.insert(expression, site)
        } else {
            expression
        }
    }

    fn rewrite_non_null_type_conversion_context(
        &mut self,
        _inferred: &TypeDescriptor,
        _declared: &TypeDescriptor,
        expression: Expression,
        site: &ConversionSite,
    ) -> Expression {
        // Sites that dereference require a non-null value regardless of the
        // inferred type, which does not carry the nullability of the type
        // variable it was inferred from.
        self.insert(expression, site)
    }
}

struct AssertMessageElvis {
    object_type: TypeDescriptor,
    rewritten: usize,
}

impl Rewriter for AssertMessageElvis {
    fn rewrite_assert_statement(&mut self, stmt: AssertStatement) -> Statement {
        let AssertStatement {
            expression,
            message,
            span,
        } = stmt;
        let message = message.map(|m| {
            if !is_inferred_as_non_null(&m) {
                self.rewritten += 1;
            }
            insert_elvis_if_needed(m, Expression::string_literal("null"), &self.object_type)
        });
        Statement::Assert(AssertStatement {
            expression,
            message,
            span,
        })
    }
}

/// Whether `expression` is statically known to be non-null.
///
/// Wildcards and captures annotated non-nullable are excluded: downstream
/// consumers still treat them as nullable.
pub fn is_inferred_as_non_null(expression: &Expression) -> bool {
    !expression.can_be_null()
        && !expression
            .type_descriptor()
            .is_wildcard_or_capture_annotated_non_nullable()
}

/// Wrap `expression` in a non-null assertion unless it is known non-null.
/// Asserting a `null` literal is reported as a warning but still inserted.
pub fn insert_not_null_assertion_if_needed(
    expression: Expression,
    site: &ConversionSite,
    problems: &mut Problems,
) -> Expression {
    if is_inferred_as_non_null(&expression) {
        return expression;
    }
    if expression.is_null_literal() {
        problems.warning(
            site.span,
            NULL_ASSERTION_ON_NULL,
            "Non-null assertion applied to null.",
        );
    }
    expression.postfix_not_null_assertion()
}

/// Rewrite `expression` to `expression ?: default`.
///
/// Non-idempotent operands are evaluated once into a final temporary:
/// `(var tmp = e, tmp == null ? default : tmp)`. Idempotent operands are
/// duplicated: `(e == null ? default : e)`.
pub fn insert_elvis_if_needed(
    expression: Expression,
    default: Expression,
    object_type: &TypeDescriptor,
) -> Expression {
    if is_inferred_as_non_null(&expression) {
        return expression;
    }
    if expression.is_null_literal() {
        return default;
    }

    let mut expressions = Vec::with_capacity(2);
    let operand = if expression.is_idempotent() {
        expression
    } else {
        let temporary =
            Variable::new(ELVIS_TEMPORARY, expression.type_descriptor()).with_final(true);
        let reference = Expression::variable_reference(&temporary);
        expressions.push(Expression::declare(temporary, Some(expression)));
        reference
    };

    expressions.push(Expression::conditional(
        object_type.clone(),
        operand.clone().infix_equals_null(),
        default,
        operand,
    ));
    Expression::multi(expressions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_types::{
        DeclaredTypeDescriptor, MethodDescriptor, Nullability, PrimitiveType, TypeVariable,
        TypeVariableKind,
    };

    fn object() -> TypeDescriptor {
        TypeDescriptor::class("java.lang.Object").to_non_nullable()
    }

    fn string() -> TypeDescriptor {
        TypeDescriptor::class("java.lang.String")
    }

    #[test]
    fn test_non_null_expression_is_left_alone() {
        let mut problems = Problems::new();
        let literal = Expression::string_literal("hi");
        let result =
            insert_not_null_assertion_if_needed(literal.clone(), &ConversionSite::default(), &mut problems);
        assert_eq!(result, literal);
        assert!(problems.is_empty());
    }

    #[test]
    fn test_nullable_expression_is_wrapped() {
        let mut problems = Problems::new();
        let v = Variable::new("s", string());
        let result = insert_not_null_assertion_if_needed(
            Expression::variable_reference(&v),
            &ConversionSite::default(),
            &mut problems,
        );
        assert_eq!(
            result,
            Expression::variable_reference(&v).postfix_not_null_assertion()
        );
        assert!(!result.can_be_null());
    }

    #[test]
    fn test_null_literal_warns_and_wraps() {
        let mut problems = Problems::new();
        let site = ConversionSite {
            span: Span::new(4, 8, 2, 10),
            ..ConversionSite::default()
        };
        let result = insert_not_null_assertion_if_needed(Expression::null_literal(), &site, &mut problems);

        assert!(matches!(result, Expression::NotNullAssertion(_)));
        assert_eq!(problems.warning_count(), 1);
        let warning = &problems.diagnostics()[0];
        assert_eq!(warning.message, "Non-null assertion applied to null.");
        assert_eq!(warning.span, Some(Span::new(4, 8, 2, 10)));
    }

    #[test]
    fn test_annotated_wildcard_is_still_wrapped() {
        let wildcard = TypeDescriptor::type_variable(
            TypeVariable::new("?", TypeDescriptor::class("java.lang.Object"))
                .with_kind(TypeVariableKind::Capture)
                .with_nullability(Nullability::NonNullable),
        );
        let v = Variable::new("w", wildcard);
        let reference = Expression::variable_reference(&v);
        assert!(!reference.can_be_null());
        assert!(!is_inferred_as_non_null(&reference));

        let mut problems = Problems::new();
        let result =
            insert_not_null_assertion_if_needed(reference, &ConversionSite::default(), &mut problems);
        assert!(matches!(result, Expression::NotNullAssertion(_)));
    }

    #[test]
    fn test_elvis_on_idempotent_duplicates_operand() {
        let v = Variable::new("m", string());
        let reference = Expression::variable_reference(&v);
        let default = Expression::string_literal("null");

        let result = insert_elvis_if_needed(reference.clone(), default.clone(), &object());

        let expected = Expression::multi(vec![Expression::conditional(
            object(),
            reference.clone().infix_equals_null(),
            default,
            reference,
        )]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_elvis_on_non_idempotent_uses_temporary() {
        let describe = MethodDescriptor::new(
            DeclaredTypeDescriptor::class("t.Holder"),
            "describe",
            Vec::new(),
            string(),
        );
        let call = Expression::method_call(None, describe, Vec::new());
        let result = insert_elvis_if_needed(call.clone(), Expression::string_literal("null"), &object());

        let Expression::Multi(multi) = result else {
            panic!("expected multi expression");
        };
        assert_eq!(multi.expressions.len(), 2);

        let Expression::VariableDeclaration(decl) = &multi.expressions[0] else {
            panic!("expected temporary declaration");
        };
        let temporary = &decl.fragments[0].variable;
        assert!(temporary.is_final());
        assert_eq!(temporary.name(), "tmp");
        assert_eq!(decl.fragments[0].initializer.as_ref(), Some(&call));

        let Expression::Conditional(conditional) = &multi.expressions[1] else {
            panic!("expected conditional");
        };
        assert_eq!(
            *conditional.condition,
            Expression::variable_reference(temporary).infix_equals_null()
        );
        assert_eq!(
            *conditional.false_expression,
            Expression::variable_reference(temporary)
        );
        assert_eq!(conditional.type_descriptor, object());
    }

    #[test]
    fn test_elvis_on_null_literal_and_non_null() {
        let default = Expression::string_literal("null");
        assert_eq!(
            insert_elvis_if_needed(Expression::null_literal(), default.clone(), &object()),
            default
        );
        let literal = Expression::int_literal(3);
        assert_eq!(
            insert_elvis_if_needed(literal.clone(), default, &object()),
            literal
        );
    }

    #[test]
    fn test_void_inferred_type_is_skipped() {
        let mut problems = Problems::new();
        let mut inserter = NotNullInserter {
            problems: &mut problems,
            inserted: 0,
        };
        let v = Variable::new("v", string());
        let void = TypeDescriptor::class("java.lang.Void").to_non_nullable();
        let result = inserter.rewrite_type_conversion_context(
            &void,
            &void,
            Expression::variable_reference(&v),
            &ConversionSite::default(),
        );
        assert_eq!(result, Expression::variable_reference(&v));
        assert_eq!(inserter.inserted, 0);
    }

    #[test]
    fn test_declared_non_null_triggers_insertion() {
        let mut problems = Problems::new();
        let mut inserter = NotNullInserter {
            problems: &mut problems,
            inserted: 0,
        };
        let v = Variable::new("v", string());
        let result = inserter.rewrite_type_conversion_context(
            &string(),
            &string().to_non_nullable(),
            Expression::variable_reference(&v),
            &ConversionSite::default(),
        );
        assert!(matches!(result, Expression::NotNullAssertion(_)));

        let both_nullable = inserter.rewrite_type_conversion_context(
            &string(),
            &string(),
            Expression::variable_reference(&v),
            &ConversionSite::default(),
        );
        assert_eq!(both_nullable, Expression::variable_reference(&v));
        assert_eq!(inserter.inserted, 1);

        let primitive = TypeDescriptor::primitive(PrimitiveType::Int);
        let literal = inserter.rewrite_type_conversion_context(
            &primitive,
            &primitive,
            Expression::int_literal(1),
            &ConversionSite::default(),
        );
        assert_eq!(literal, Expression::int_literal(1));
    }
}
