//! Statement AST nodes

use crate::expression::Expression;
use crate::span::Span;

/// Statement (performs an action)
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression statement: `foo();`
    Expression(ExpressionStatement),

    /// Block: `{ ... }`
    Block(Block),

    /// Return: `return x;`
    Return(ReturnStatement),

    /// If: `if (c) a else b`
    If(IfStatement),

    /// While loop
    While(WhileStatement),

    /// For loop: `for (init; cond; update) body`
    For(ForStatement),

    /// Assert: `assert c : message;`
    Assert(AssertStatement),

    /// Throw: `throw e;`
    Throw(ThrowStatement),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Expression(s) => &s.span,
            Statement::Block(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::Assert(s) => &s.span,
            Statement::Throw(s) => &s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub expression: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_statement: Box<Statement>,
    pub else_statement: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

/// For loop; a missing condition loops forever
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub initializers: Vec<Expression>,
    pub condition: Option<Expression>,
    pub updates: Vec<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStatement {
    pub expression: Expression,
    pub message: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub expression: Expression,
    pub span: Span,
}
