use core::cell::Cell;

use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::ast::{
    BinaryOp, Expr, ExprKind, Ident, Literal, Location, Program, Span, Stmt, StmtKind, UnaryOp,
};
use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::types::Type;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::or, Assoc::Left))            // `||`
        .op(Op::infix(Rule::and, Assoc::Left))           // `&&`
        .op(
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::ne, Assoc::Left)
        )                                                // `==`, `!=`
        .op(
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left)
        )                                                // `<`, `>`
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left) |
            Op::infix(Rule::concat, Assoc::Left)
        )                                                // `+`, `-`, `.`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::modulo, Assoc::Left)
        )                                                // `*`, `/`, `%`
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::not)) // `-`, `!`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct PilaParser;

/// Deepest nesting of brackets, prefix operators, assignments, ternary
/// branches and statement bodies [`parse`] accepts.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Parse a whole program. Nodes are allocated in `arena` and borrow `source`.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<Program<'a>, ParseError> {
    parse_with_max_depth(arena, source, MAX_NESTING_DEPTH)
}

/// Like [`parse`], failing with [`ParseErrorKind::MaxDepthExceeded`] once
/// nesting goes past `max_depth` levels.
pub fn parse_with_max_depth<'a>(
    arena: &'a Bump,
    source: &'a str,
    max_depth: usize,
) -> Result<Program<'a>, ParseError> {
    check_nesting(source, max_depth)?;
    let mut pairs =
        PilaParser::parse(Rule::program, source).map_err(|e| convert_pest_error(e, source))?;
    let builder = AstBuilder {
        arena,
        max_depth,
        depth: Cell::new(0),
    };
    let statements = match pairs.next() {
        Some(program) => builder.statements(program.into_inner())?,
        None => &[],
    };
    tracing::debug!(statements = statements.len(), "Parsed program");
    Ok(Program { statements })
}

/// Rejects bracket and prefix operator nesting deeper than `max_depth`
/// before the recursive descent parser reaches it.
///
/// A run of `-`/`!` counts one level per operator and ends at the operand it
/// applies to. Comments and string literals are skipped.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let bytes = source.as_bytes();
    // Depth to return to when each open bracket closes
    let mut open: Vec<usize> = Vec::new();
    let mut depth = 0;
    let mut prefixes = 0;
    let mut i = 0;

    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'/', Some(b'/')) => {
                i = source[i..].find('\n').map_or(bytes.len(), |n| i + n);
                continue;
            }
            (b'/', Some(b'*')) => {
                i = source[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |n| i + 2 + n + 2);
                continue;
            }
            (b'"', _) => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' && bytes[i] != b'\n' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
                depth -= prefixes;
                prefixes = 0;
                continue;
            }
            (b'(' | b'{', _) => {
                open.push(depth - prefixes);
                depth += 1;
                prefixes = 0;
            }
            (b')' | b'}', _) => {
                depth = open.pop().unwrap_or(0);
                prefixes = 0;
            }
            (b'!', Some(b'=')) => {
                depth -= prefixes;
                prefixes = 0;
                i += 2;
                continue;
            }
            (b'-' | b'!', _) => {
                depth += 1;
                prefixes += 1;
            }
            (b' ' | b'\t' | b'\r' | b'\n', _) => {}
            _ => {
                depth -= prefixes;
                prefixes = 0;
            }
        }

        if depth > max_depth {
            let (line, column) = pest::Position::new(source, i)
                .map_or((1, 1), |p| p.line_col());
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded { depth, max_depth },
                Location::new(Span::new(i, i + 1), line, column),
            ));
        }
        i += 1;
    }
    Ok(())
}

/// Keyword pairs carry no information once the enclosing rule is known.
fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_read
            | Rule::kw_write
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_do
            | Rule::assign_op
            | Rule::EOI
    )
}

fn malformed(pair: &Pair<'_, Rule>) -> ParseError {
    ParseError::new(
        ParseErrorKind::Syntax {
            expected: "well-formed input".to_string(),
            found: format!("{:?}", pair.as_rule()),
        },
        Location::from(pair.as_span()),
    )
}

/// Children of `pair` without keyword tokens.
struct Children<'a> {
    parent: Location,
    pairs: pest::iterators::Pairs<'a, Rule>,
}

impl<'a> Children<'a> {
    fn of(pair: Pair<'a, Rule>) -> Self {
        Self {
            parent: Location::from(pair.as_span()),
            pairs: pair.into_inner(),
        }
    }

    /// Next child, failing if the grammar did not produce one.
    fn expect(&mut self) -> Result<Pair<'a, Rule>, ParseError> {
        self.next().ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Syntax {
                    expected: "more input".to_string(),
                    found: "end of rule".to_string(),
                },
                self.parent.clone(),
            )
        })
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = Pair<'a, Rule>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs.by_ref().find(|p| !is_keyword(p.as_rule()))
    }
}

struct AstBuilder<'a> {
    arena: &'a Bump,
    max_depth: usize,
    depth: Cell<usize>,
}

impl<'a> AstBuilder<'a> {
    /// Runs `build` one nesting level down, failing past `max_depth`.
    fn nested<T>(
        &self,
        loc: Location,
        build: impl FnOnce() -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                },
                loc,
            ));
        }
        self.depth.set(depth);
        let result = build();
        self.depth.set(depth - 1);
        result
    }

    fn statements(
        &self,
        pairs: impl Iterator<Item = Pair<'a, Rule>>,
    ) -> Result<&'a [Stmt<'a>], ParseError> {
        let mut statements = Vec::new();
        for pair in pairs {
            if is_keyword(pair.as_rule()) {
                continue;
            }
            statements.push(self.statement(pair)?);
        }
        Ok(self.arena.alloc_slice_fill_iter(statements))
    }

    /// Body of an `if`, `while` or `do`.
    fn alloc_statement(&self, pair: Pair<'a, Rule>) -> Result<&'a Stmt<'a>, ParseError> {
        let stmt = self.nested(Location::from(pair.as_span()), || self.statement(pair))?;
        Ok(self.arena.alloc(stmt))
    }

    fn statement(&self, pair: Pair<'a, Rule>) -> Result<Stmt<'a>, ParseError> {
        let loc = Location::from(pair.as_span());
        let rule = pair.as_rule();
        let mut children = Children::of(pair.clone());

        let kind = match rule {
            Rule::empty_stmt => StmtKind::Empty,
            Rule::block => {
                let statements = self.nested(loc.clone(), || self.statements(children))?;
                StmtKind::Block(statements)
            }
            Rule::declaration => {
                let ty = self.type_name(children.expect()?)?;
                let names = self.idents(children)?;
                StmtKind::Declaration { ty, names }
            }
            Rule::read_stmt => StmtKind::Read(self.idents(children)?),
            Rule::write_stmt => {
                let exprs = children
                    .map(|p| self.expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                StmtKind::Write(self.arena.alloc_slice_copy(&exprs))
            }
            Rule::if_stmt => {
                let cond = self.expr(children.expect()?)?;
                let then_branch = self.alloc_statement(children.expect()?)?;
                let else_branch = children
                    .next()
                    .map(|p| self.alloc_statement(p))
                    .transpose()?;
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            Rule::while_stmt => {
                let cond = self.expr(children.expect()?)?;
                let body = self.alloc_statement(children.expect()?)?;
                StmtKind::While { cond, body }
            }
            Rule::do_while_stmt => {
                let body = self.alloc_statement(children.expect()?)?;
                let cond = self.expr(children.expect()?)?;
                StmtKind::DoWhile { body, cond }
            }
            Rule::expr_stmt => StmtKind::Expression(self.expr(children.expect()?)?),
            _ => return Err(malformed(&pair)),
        };

        Ok(Stmt { kind, loc })
    }

    fn type_name(&self, pair: Pair<'a, Rule>) -> Result<Type, ParseError> {
        let keyword = pair
            .clone()
            .into_inner()
            .next()
            .ok_or_else(|| malformed(&pair))?;
        match keyword.as_rule() {
            Rule::kw_int => Ok(Type::Int),
            Rule::kw_float => Ok(Type::Float),
            Rule::kw_bool => Ok(Type::Boolean),
            Rule::kw_string => Ok(Type::String),
            _ => Err(malformed(&keyword)),
        }
    }

    fn idents(
        &self,
        pairs: impl Iterator<Item = Pair<'a, Rule>>,
    ) -> Result<&'a [Ident<'a>], ParseError> {
        let idents = pairs
            .map(|p| match p.as_rule() {
                Rule::ident => Ok(self.ident(&p)),
                _ => Err(malformed(&p)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.arena.alloc_slice_fill_iter(idents))
    }

    fn ident(&self, pair: &Pair<'a, Rule>) -> Ident<'a> {
        Ident {
            name: pair.as_str(),
            loc: Location::from(pair.as_span()),
        }
    }

    fn expr(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let expr = self.expr_node(pair)?;
        Ok(self.arena.alloc(expr))
    }

    fn expr_node(&self, pair: Pair<'a, Rule>) -> Result<Expr<'a>, ParseError> {
        let loc = Location::from(pair.as_span());

        let kind = match pair.as_rule() {
            Rule::expr => {
                let mut children = Children::of(pair);
                return self.expr_node(children.expect()?);
            }
            Rule::assignment => {
                let mut children = Children::of(pair);
                let target = self.ident(&children.expect()?);
                let value = children.expect()?;
                let value = self.nested(Location::from(value.as_span()), || self.expr(value))?;
                ExprKind::Assign { target, value }
            }
            Rule::ternary => {
                let mut children = Children::of(pair);
                let cond = self.expr_node(children.expect()?)?;
                let Some(then_pair) = children.next() else {
                    return Ok(cond);
                };
                let else_pair = children.expect()?;
                let (then_branch, else_branch) = self.nested(loc.clone(), || {
                    Ok((self.expr(then_pair)?, self.expr(else_pair)?))
                })?;
                ExprKind::Ternary {
                    cond: self.arena.alloc(cond),
                    then_branch,
                    else_branch,
                }
            }
            Rule::binary => return self.binary(pair),
            Rule::integer => {
                let text = pair.as_str();
                let value = text.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidNumber {
                            text: text.to_string(),
                        },
                        loc.clone(),
                    )
                })?;
                ExprKind::Literal(Literal::Int(value))
            }
            Rule::float => {
                let text = pair.as_str();
                match text.parse::<f64>() {
                    // Literals too large for f64 parse to infinity
                    Ok(value) if value.is_finite() => ExprKind::Literal(Literal::Float(value)),
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidNumber {
                                text: text.to_string(),
                            },
                            loc,
                        ));
                    }
                }
            }
            Rule::boolean => {
                let keyword = pair
                    .clone()
                    .into_inner()
                    .next()
                    .ok_or_else(|| malformed(&pair))?;
                ExprKind::Literal(Literal::Bool(keyword.as_rule() == Rule::kw_true))
            }
            Rule::string => {
                let inner = pair
                    .clone()
                    .into_inner()
                    .next()
                    .ok_or_else(|| malformed(&pair))?;
                ExprKind::Literal(Literal::Str(self.unescape(inner.as_str())))
            }
            Rule::ident => ExprKind::Ident(pair.as_str()),
            Rule::grouped => {
                let mut children = Children::of(pair);
                let inner = children.expect()?;
                ExprKind::Grouping(self.nested(loc.clone(), || self.expr(inner))?)
            }
            _ => return Err(malformed(&pair)),
        };

        Ok(Expr { kind, loc })
    }

    fn binary(&self, pair: Pair<'a, Rule>) -> Result<Expr<'a>, ParseError> {
        PRATT_PARSER
            .map_primary(|primary| self.expr_node(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let unary = match op.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::not => UnaryOp::Not,
                    _ => return Err(malformed(&op)),
                };
                let loc = Location::from(op.as_span()).to(&rhs.loc);
                Ok(Expr {
                    kind: ExprKind::Unary {
                        op: unary,
                        expr: self.arena.alloc(rhs),
                    },
                    loc,
                })
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (lhs?, rhs?);
                let binary = match op.as_rule() {
                    Rule::or => BinaryOp::Or,
                    Rule::and => BinaryOp::And,
                    Rule::eq => BinaryOp::Eq,
                    Rule::ne => BinaryOp::NotEq,
                    Rule::lt => BinaryOp::Lt,
                    Rule::gt => BinaryOp::Gt,
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::concat => BinaryOp::Concat,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::modulo => BinaryOp::Mod,
                    _ => return Err(malformed(&op)),
                };
                // Reported at the start of the left operand
                let loc = lhs.loc.to(&rhs.loc);
                Ok(Expr {
                    kind: ExprKind::Binary {
                        op: binary,
                        left: self.arena.alloc(lhs),
                        right: self.arena.alloc(rhs),
                    },
                    loc,
                })
            })
            .parse(pair.into_inner())
    }

    /// Resolves escape sequences. Text without backslashes is borrowed as is.
    fn unescape(&self, raw: &'a str) -> &'a str {
        if !raw.contains('\\') {
            return raw;
        }
        let mut text = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                text.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                // `\"`, `\\` and unknown escapes keep the escaped character
                Some(other) => text.push(other),
                None => text.push('\\'),
            }
        }
        self.arena.alloc_str(&text)
    }
}
