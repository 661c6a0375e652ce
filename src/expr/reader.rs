//! Reads expressions written as S-expressions:
//!
//! ```text
//! (FORALL (VAR x) (PREDCON in (VAR x) (FUNCON emptySet)))
//! ```
//!
//! The operator and atoms are bare tokens or double-quoted strings. `()` is a
//! list whose operator is empty. The spans of all nodes are recorded by their
//! child-index path from the root.

use crate::expr::{Expr, ExprArena, stream::Stream};
use rustc_hash::FxHashMap;
use std::ops::Range;
use thiserror::Error;

/// Lists nested deeper than this are rejected so checking cannot exhaust the
/// stack.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} at byte {offset}")]
pub struct ReadError {
    offset: usize,
    expected: &'static str,
}

impl ReadError {
    pub fn new(offset: usize, expected: &'static str) -> Self {
        Self { offset, expected }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }
}

/// Byte ranges of every node of a parsed expression.
#[derive(Debug, Clone, Default)]
pub struct ExprSpans {
    spans: FxHashMap<Vec<usize>, Range<usize>>,
}

impl ExprSpans {
    /// The span of the node at `path`, or of its closest recorded ancestor.
    pub fn get(&self, path: &[usize]) -> Option<Range<usize>> {
        (0..=path.len())
            .rev()
            .find_map(|len| self.spans.get(&path[..len]))
            .cloned()
    }
}

#[derive(Debug, Clone)]
pub struct ParsedExpr<'ctx> {
    pub root: Expr<'ctx>,
    pub spans: ExprSpans,
}

pub fn read_expr<'ctx>(
    text: &str,
    arena: &'ctx ExprArena<'ctx>,
) -> Result<ParsedExpr<'ctx>, ReadError> {
    let mut stream = Stream::new(text);
    let mut spans = ExprSpans::default();
    let mut path = Vec::new();

    stream.skip_ws();
    let root = read_node(&mut stream, arena, &mut path, &mut spans)?;
    stream.skip_ws();
    stream.expect_eof()?;

    Ok(ParsedExpr { root, spans })
}

fn read_node<'ctx>(
    stream: &mut Stream,
    arena: &'ctx ExprArena<'ctx>,
    path: &mut Vec<usize>,
    spans: &mut ExprSpans,
) -> Result<Expr<'ctx>, ReadError> {
    let start = stream.pos();

    let expr = if stream.peek() == Some('(') {
        if path.len() >= MAX_DEPTH {
            return Err(stream.error("shallower nesting"));
        }
        stream.pop();
        stream.skip_ws();

        let operator = match stream.peek() {
            Some(')') => String::new(),
            Some('(') => return Err(stream.error("an operator")),
            _ => read_token(stream)?,
        };

        let mut children = Vec::new();
        loop {
            stream.skip_ws();
            match stream.peek() {
                Some(')') => {
                    stream.pop();
                    break;
                }
                None => return Err(stream.error("`)`")),
                _ => {
                    path.push(children.len());
                    let child = read_node(stream, arena, path, spans);
                    path.pop();
                    children.push(child?);
                }
            }
        }

        arena.list(&operator, children)
    } else {
        let token = read_token(stream)?;
        arena.atom(&token)
    };

    spans.spans.insert(path.clone(), start..stream.pos());
    Ok(expr)
}

fn read_token(stream: &mut Stream) -> Result<String, ReadError> {
    if stream.peek() == Some('"') {
        stream.pop();
        let mut token = String::new();
        loop {
            match stream.pop() {
                Some('"') => return Ok(token),
                Some('\\') => match stream.pop() {
                    Some(char) => token.push(char),
                    None => return Err(stream.error("an escaped character")),
                },
                Some(char) => token.push(char),
                None => return Err(stream.error("`\"`")),
            }
        }
    }

    let token = stream.take_while(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';'));
    if token.is_empty() {
        Err(stream.error("an atom or `(`"))
    } else {
        Ok(token.to_string())
    }
}
