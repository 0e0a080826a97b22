//! Expression AST nodes

use jolt_types::{
    well_known, FieldDescriptor, MethodDescriptor, PrimitiveType, TypeDescriptor,
};

use crate::span::Span;
use crate::statement::{ExpressionStatement, Statement};
use crate::variable::Variable;

/// Expression (produces a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `null`
    NullLiteral(NullLiteral),

    /// `true`, `false`
    BooleanLiteral(BooleanLiteral),

    /// Numeric literal: 42, 3.14
    NumberLiteral(NumberLiteral),

    /// String literal: "hello"
    StringLiteral(StringLiteral),

    /// `this`
    This(ThisReference),

    /// Reference to a local variable or parameter
    VariableReference(VariableReference),

    /// Field access: `q.f`, or `f` for static fields
    FieldAccess(FieldAccess),

    /// Method call: `q.m(args)`
    MethodCall(MethodCall),

    /// Instance creation: `new C(args)`
    NewInstance(NewInstance),

    /// Binary expression, including assignments and `==`
    Binary(BinaryExpression),

    /// Prefix or postfix unary expression
    Unary(UnaryExpression),

    /// Cast: `(T) e`
    Cast(CastExpression),

    /// Conditional: `c ? a : b`
    Conditional(ConditionalExpression),

    /// Non-null assertion: `e!`
    NotNullAssertion(NotNullAssertion),

    /// Sequence of expressions whose value is the last one
    Multi(MultiExpression),

    /// Local variable declaration: `T a = x, b`
    VariableDeclaration(VariableDeclarationExpression),
}

impl Expression {
    /// Static type of the expression
    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Expression::NullLiteral(e) => e.type_descriptor.clone(),
            Expression::BooleanLiteral(e) => e.type_descriptor.clone(),
            Expression::NumberLiteral(e) => e.type_descriptor.clone(),
            Expression::StringLiteral(e) => e.type_descriptor.clone(),
            Expression::This(e) => e.type_descriptor.clone(),
            Expression::VariableReference(e) => e.variable.type_descriptor().clone(),
            Expression::FieldAccess(e) => e.target.type_descriptor().clone(),
            Expression::MethodCall(e) => e.target.return_type().clone(),
            Expression::NewInstance(e) => e
                .target
                .enclosing_type()
                .to_type_descriptor()
                .to_non_nullable(),
            Expression::Binary(e) => e.type_descriptor.clone(),
            Expression::Unary(e) => e.type_descriptor.clone(),
            Expression::Cast(e) => e.cast_type.clone(),
            Expression::Conditional(e) => e.type_descriptor.clone(),
            Expression::NotNullAssertion(e) => e.expression.type_descriptor().to_non_nullable(),
            Expression::Multi(e) => match e.expressions.last() {
                Some(last) => last.type_descriptor(),
                None => TypeDescriptor::primitive(PrimitiveType::Void),
            },
            Expression::VariableDeclaration(_) => TypeDescriptor::primitive(PrimitiveType::Void),
        }
    }

    /// Whether the expression may evaluate to null
    pub fn can_be_null(&self) -> bool {
        match self {
            Expression::NewInstance(_)
            | Expression::This(_)
            | Expression::StringLiteral(_)
            | Expression::NotNullAssertion(_) => false,
            _ => self.type_descriptor().can_be_null(),
        }
    }

    /// Whether evaluating the expression twice in the same program state
    /// yields the same value without additional side effects
    pub fn is_idempotent(&self) -> bool {
        match self {
            Expression::NullLiteral(_)
            | Expression::BooleanLiteral(_)
            | Expression::NumberLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::This(_)
            | Expression::VariableReference(_) => true,
            Expression::FieldAccess(e) => e
                .qualifier
                .as_deref()
                .map_or(true, Expression::is_idempotent),
            Expression::NotNullAssertion(e) => e.expression.is_idempotent(),
            Expression::Cast(e) => e.expression.is_idempotent(),
            Expression::Binary(e) => {
                !e.operator.is_assignment() && e.left.is_idempotent() && e.right.is_idempotent()
            }
            Expression::Unary(e) => !e.operator.has_side_effect() && e.operand.is_idempotent(),
            Expression::Conditional(e) => {
                e.condition.is_idempotent()
                    && e.true_expression.is_idempotent()
                    && e.false_expression.is_idempotent()
            }
            Expression::MethodCall(_)
            | Expression::NewInstance(_)
            | Expression::Multi(_)
            | Expression::VariableDeclaration(_) => false,
        }
    }

    /// Check if this expression is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::NullLiteral(_)
                | Expression::BooleanLiteral(_)
                | Expression::NumberLiteral(_)
                | Expression::StringLiteral(_)
        )
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self, Expression::NullLiteral(_))
    }

    /// Wrap in a non-null assertion
    pub fn postfix_not_null_assertion(self) -> Expression {
        Expression::NotNullAssertion(NotNullAssertion {
            expression: Box::new(self),
        })
    }

    /// Build `self == null`
    pub fn infix_equals_null(self) -> Expression {
        Expression::binary(BinaryOperator::Equals, self, Expression::null_literal())
    }

    /// Wrap in an expression statement
    pub fn make_statement(self, span: Span) -> Statement {
        Statement::Expression(ExpressionStatement {
            expression: self,
            span,
        })
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    pub fn null_literal() -> Expression {
        Expression::NullLiteral(NullLiteral {
            type_descriptor: TypeDescriptor::null_type(),
        })
    }

    pub fn boolean_literal(value: bool) -> Expression {
        Expression::BooleanLiteral(BooleanLiteral {
            value,
            type_descriptor: TypeDescriptor::primitive(PrimitiveType::Boolean),
        })
    }

    pub fn int_literal(value: i64) -> Expression {
        Expression::NumberLiteral(NumberLiteral {
            value: NumberValue::Integer(value),
            type_descriptor: TypeDescriptor::primitive(PrimitiveType::Int),
        })
    }

    pub fn double_literal(value: f64) -> Expression {
        Expression::NumberLiteral(NumberLiteral {
            value: NumberValue::Float(value),
            type_descriptor: TypeDescriptor::primitive(PrimitiveType::Double),
        })
    }

    pub fn string_literal(value: impl Into<String>) -> Expression {
        Expression::StringLiteral(StringLiteral {
            value: value.into(),
            type_descriptor: well_known().java_lang_string.to_non_nullable(),
        })
    }

    pub fn this(type_descriptor: TypeDescriptor) -> Expression {
        Expression::This(ThisReference {
            type_descriptor: type_descriptor.to_non_nullable(),
        })
    }

    pub fn variable_reference(variable: &Variable) -> Expression {
        Expression::VariableReference(VariableReference {
            variable: variable.clone(),
        })
    }

    pub fn field_access(qualifier: Option<Expression>, target: FieldDescriptor) -> Expression {
        Expression::FieldAccess(FieldAccess {
            qualifier: qualifier.map(Box::new),
            target,
        })
    }

    pub fn method_call(
        qualifier: Option<Expression>,
        target: MethodDescriptor,
        arguments: Vec<Expression>,
    ) -> Expression {
        Expression::MethodCall(MethodCall {
            qualifier: qualifier.map(Box::new),
            target,
            arguments,
        })
    }

    pub fn new_instance(target: MethodDescriptor, arguments: Vec<Expression>) -> Expression {
        Expression::NewInstance(NewInstance { target, arguments })
    }

    /// Build a binary expression; assignments take the left operand's type,
    /// comparisons and logical operators are `boolean`, and arithmetic takes
    /// the left operand's type.
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
        let type_descriptor = if operator.is_boolean_valued() {
            TypeDescriptor::primitive(PrimitiveType::Boolean)
        } else {
            left.type_descriptor()
        };
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            type_descriptor,
        })
    }

    pub fn assign(left: Expression, right: Expression) -> Expression {
        Expression::binary(BinaryOperator::Assign, left, right)
    }

    pub fn unary(operator: UnaryOperator, prefix: bool, operand: Expression) -> Expression {
        let type_descriptor = match operator {
            UnaryOperator::Not => TypeDescriptor::primitive(PrimitiveType::Boolean),
            _ => operand.type_descriptor(),
        };
        Expression::Unary(UnaryExpression {
            operator,
            prefix,
            operand: Box::new(operand),
            type_descriptor,
        })
    }

    pub fn cast(cast_type: TypeDescriptor, expression: Expression) -> Expression {
        Expression::Cast(CastExpression {
            cast_type,
            expression: Box::new(expression),
        })
    }

    pub fn conditional(
        type_descriptor: TypeDescriptor,
        condition: Expression,
        true_expression: Expression,
        false_expression: Expression,
    ) -> Expression {
        Expression::Conditional(ConditionalExpression {
            condition: Box::new(condition),
            true_expression: Box::new(true_expression),
            false_expression: Box::new(false_expression),
            type_descriptor,
        })
    }

    pub fn multi(expressions: Vec<Expression>) -> Expression {
        Expression::Multi(MultiExpression { expressions })
    }

    /// Declare a single variable with an optional initializer
    pub fn declare(variable: Variable, initializer: Option<Expression>) -> Expression {
        Expression::VariableDeclaration(VariableDeclarationExpression {
            fragments: vec![VariableDeclarationFragment {
                variable,
                initializer,
            }],
        })
    }
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteral {
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Integer(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: NumberValue,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub type_descriptor: TypeDescriptor,
}

// ============================================================================
// References
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ThisReference {
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableReference {
    pub variable: Variable,
}

/// Field access; `qualifier` is `None` for static fields
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    pub qualifier: Option<Box<Expression>>,
    pub target: FieldDescriptor,
}

// ============================================================================
// Invocations
// ============================================================================

/// Method call; `qualifier` is `None` for static methods
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub qualifier: Option<Box<Expression>>,
    pub target: MethodDescriptor,
    pub arguments: Vec<Expression>,
}

/// `new C(args)`, where `target` is the constructor
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstance {
    pub target: MethodDescriptor,
    pub arguments: Vec<Expression>,
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    ConditionalAnd,
    ConditionalOr,
    Assign,
    PlusAssign,
    MinusAssign,
}

impl BinaryOperator {
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Assign | BinaryOperator::PlusAssign | BinaryOperator::MinusAssign
        )
    }

    pub fn is_boolean_valued(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::Less
                | BinaryOperator::LessEquals
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEquals
                | BinaryOperator::ConditionalAnd
                | BinaryOperator::ConditionalOr
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::ConditionalAnd => "&&",
            BinaryOperator::ConditionalOr => "||",
            BinaryOperator::Assign => "=",
            BinaryOperator::PlusAssign => "+=",
            BinaryOperator::MinusAssign => "-=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Not,
    Increment,
    Decrement,
}

impl UnaryOperator {
    pub fn has_side_effect(&self) -> bool {
        matches!(self, UnaryOperator::Increment | UnaryOperator::Decrement)
    }
}

/// Unary expression; `prefix` distinguishes `++x` from `x++`
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub prefix: bool,
    pub operand: Box<Expression>,
    pub type_descriptor: TypeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub cast_type: TypeDescriptor,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub condition: Box<Expression>,
    pub true_expression: Box<Expression>,
    pub false_expression: Box<Expression>,
    pub type_descriptor: TypeDescriptor,
}

/// Non-null assertion; its type is the operand type narrowed to non-null
#[derive(Debug, Clone, PartialEq)]
pub struct NotNullAssertion {
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiExpression {
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationFragment {
    pub variable: Variable,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationExpression {
    pub fragments: Vec<VariableDeclarationFragment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jolt_types::DeclaredTypeDescriptor;

    fn string_var(name: &str) -> Variable {
        Variable::new(name, TypeDescriptor::class("java.lang.String"))
    }

    fn name_field() -> FieldDescriptor {
        FieldDescriptor::new(
            DeclaredTypeDescriptor::class("zoo.Animal"),
            "name",
            TypeDescriptor::class("java.lang.String"),
        )
    }

    fn speak() -> MethodDescriptor {
        MethodDescriptor::new(
            DeclaredTypeDescriptor::class("zoo.Animal"),
            "speak",
            Vec::new(),
            TypeDescriptor::class("java.lang.String"),
        )
    }

    #[test]
    fn test_literals_and_references_are_idempotent() {
        let v = string_var("s");
        assert!(Expression::null_literal().is_idempotent());
        assert!(Expression::int_literal(1).is_idempotent());
        assert!(Expression::string_literal("a").is_idempotent());
        assert!(Expression::this(TypeDescriptor::class("zoo.Animal")).is_idempotent());
        assert!(Expression::variable_reference(&v).is_idempotent());
    }

    #[test]
    fn test_field_access_idempotence_follows_qualifier() {
        let this = Expression::this(TypeDescriptor::class("zoo.Animal"));
        assert!(Expression::field_access(Some(this), name_field()).is_idempotent());
        assert!(Expression::field_access(None, name_field()).is_idempotent());

        let call = Expression::method_call(None, speak(), Vec::new());
        assert!(!Expression::field_access(Some(call), name_field()).is_idempotent());
    }

    #[test]
    fn test_side_effecting_expressions_are_not_idempotent() {
        let v = Variable::new("i", TypeDescriptor::primitive(PrimitiveType::Int));
        let increment = Expression::unary(
            UnaryOperator::Increment,
            false,
            Expression::variable_reference(&v),
        );
        assert!(!increment.is_idempotent());

        let assignment =
            Expression::assign(Expression::variable_reference(&v), Expression::int_literal(2));
        assert!(!assignment.is_idempotent());

        let sum = Expression::binary(
            BinaryOperator::Plus,
            Expression::variable_reference(&v),
            Expression::int_literal(2),
        );
        assert!(sum.is_idempotent());
        assert!(!Expression::multi(vec![sum]).is_idempotent());
    }

    #[test]
    fn test_wrappers_forward_idempotence() {
        let v = string_var("s");
        let asserted = Expression::variable_reference(&v).postfix_not_null_assertion();
        assert!(asserted.is_idempotent());

        let call = Expression::method_call(None, speak(), Vec::new());
        let cast = Expression::cast(TypeDescriptor::class("java.lang.Object"), call);
        assert!(!cast.is_idempotent());
    }

    #[test]
    fn test_can_be_null() {
        let v = string_var("s");
        assert!(Expression::variable_reference(&v).can_be_null());
        assert!(Expression::null_literal().can_be_null());
        assert!(!Expression::string_literal("x").can_be_null());
        assert!(!Expression::this(TypeDescriptor::class("zoo.Animal")).can_be_null());
        assert!(!Expression::int_literal(3).can_be_null());

        let ctor = MethodDescriptor::constructor(DeclaredTypeDescriptor::class("zoo.Dog"), Vec::new());
        assert!(!Expression::new_instance(ctor, Vec::new()).can_be_null());

        let asserted = Expression::variable_reference(&v).postfix_not_null_assertion();
        assert!(!asserted.can_be_null());
    }

    #[test]
    fn test_infix_equals_null() {
        let v = string_var("s");
        let check = Expression::variable_reference(&v).infix_equals_null();
        match &check {
            Expression::Binary(binary) => {
                assert_eq!(binary.operator, BinaryOperator::Equals);
                assert!(binary.right.is_null_literal());
            }
            other => panic!("expected binary, got {:?}", other),
        }
        assert_eq!(
            check.type_descriptor(),
            TypeDescriptor::primitive(PrimitiveType::Boolean)
        );
    }

    #[test]
    fn test_clone_is_deep_and_equal() {
        let v = string_var("s");
        let original = Expression::field_access(Some(Expression::variable_reference(&v)), name_field());
        let copy = original.clone();
        assert_eq!(original, copy);
    }
}
