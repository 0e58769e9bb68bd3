//! Reading picks up where the lexer leaves off: it handles nesting and produces the
//! [`AstNode`] the checker consumes. The whole source becomes one list holding every
//! top-level datum.
use crate::{
    ast::AstNode,
    lexer::{LexerError, Span, Token},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Rewrite `(+ a b c)` into `(+ a (+ b c))` for the arithmetic operators
    pub desugar_arithmetic: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            desugar_arithmetic: true,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    #[error("{error}")]
    Lexer { error: LexerError, span: Span },
    #[error("unexpected closing delimiter")]
    UnexpectedClose { span: Span },
    #[error("mismatched closing delimiter")]
    MismatchedClose { open: Span, span: Span },
    #[error("unclosed list")]
    Unclosed { open: Span },
}

impl ReadError {
    /// Where in the source the error points
    pub fn span(&self) -> Span {
        match self {
            Self::Lexer { span, .. }
            | Self::UnexpectedClose { span }
            | Self::MismatchedClose { span, .. } => span.clone(),
            Self::Unclosed { open } => open.clone(),
        }
    }
}

pub fn read_program(source: &str) -> Result<AstNode, ReadError> {
    read_program_with(source, ReaderOptions::default())
}

pub fn read_program_with(source: &str, options: ReaderOptions) -> Result<AstNode, ReadError> {
    // every open list: its opening token, where it started, and what it holds so far
    let mut stack: Vec<(Token, Span, Vec<AstNode>)> = vec![];
    let mut top_level = vec![];

    for (token, span) in Token::lexer(source).spanned() {
        let token = token.map_err(|error| ReadError::Lexer {
            error,
            span: span.clone(),
        })?;

        let node = match token {
            Token::LParen | Token::LBracket => {
                stack.push((token, span, vec![]));
                continue;
            }
            Token::RParen | Token::RBracket => {
                let Some((open, open_span, items)) = stack.pop() else {
                    return Err(ReadError::UnexpectedClose { span });
                };
                let matched = matches!(
                    (&open, &token),
                    (Token::LParen, Token::RParen) | (Token::LBracket, Token::RBracket)
                );
                if !matched {
                    return Err(ReadError::MismatchedClose {
                        open: open_span,
                        span,
                    });
                }
                AstNode::List(items.into_boxed_slice())
            }
            Token::Number(n) => AstNode::Number(n),
            Token::String(s) => AstNode::Text(s),
            Token::Symbol(s) => AstNode::Symbol(s),
        };

        match stack.last_mut() {
            Some((_, _, items)) => items.push(node),
            None => top_level.push(node),
        }
    }

    if let Some((_, open, _)) = stack.pop() {
        return Err(ReadError::Unclosed { open });
    }

    let program = AstNode::List(top_level.into_boxed_slice());
    Ok(if options.desugar_arithmetic {
        desugar(program)
    } else {
        program
    })
}

fn is_arithmetic(node: &AstNode) -> bool {
    matches!(node.as_symbol(), Some("+" | "-" | "*" | "/"))
}

/// Turns n-ary arithmetic into nested binary applications, nesting to the right:
/// `(- a b c)` becomes `(- a (- b c))`.
pub fn desugar(node: AstNode) -> AstNode {
    let AstNode::List(items) = node else {
        return node;
    };
    let items = items.into_vec().into_iter().map(desugar).collect::<Vec<_>>();

    if let [head, operands @ .., last] = items.as_slice() {
        if operands.len() > 1 && is_arithmetic(head) {
            return operands.iter().rev().fold(last.clone(), |rhs, lhs| {
                AstNode::list([head.clone(), lhs.clone(), rhs])
            });
        }
    }

    AstNode::List(items.into_boxed_slice())
}
