//! A `nom`-based parser for binding accessor expressions.
//!
//! ```text
//! expr  := root chain? pipe?
//! root  := '#' | string-literal | 'nil'
//! chain := ('.' identifier | '[' (int | string-literal) ']' | '(' (expr (',' expr)*)? ')')*
//! pipe  := '|' identifier
//! ```
use super::ast::{Expression, Literal, Root, Step};
use crate::config::MAX_EXECUTION_DEPTH;
use crate::error::CompileError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{char, i64 as nom_i64, multispace0, satisfy},
    combinator::{map, not, opt, recognize, value},
    error::{ErrorKind, ParseError},
    multi::many0,
    sequence::{pair, preceded, terminated},
};

// --- Main Public Parser ---

/// Parses an expression, classifying the first problem found.
///
/// Call arguments may nest at most [`MAX_EXECUTION_DEPTH`] levels deep.
pub fn parse_expression(source: &str) -> Result<Expression, CompileError> {
    parse_with_nesting_limit(source, MAX_EXECUTION_DEPTH)
}

/// Parses an expression whose call arguments nest at most `limit` levels deep.
pub(crate) fn parse_with_nesting_limit<'s>(source: &'s str, limit: usize) -> Result<Expression, CompileError> {
    if source.trim().is_empty() {
        return Err(CompileError::Empty);
    }
    let nesting = Nesting { level: 0, limit };
    match terminated(|i: &'s str| expression(i, nesting), spaces).parse(source) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => {
            let problem = match rest.chars().next() {
                Some(c) => Problem::Unexpected(c),
                None => Problem::UnexpectedEnd,
            };
            Err(SyntaxError { input: rest, problem }.into_compile_error(source))
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e.into_compile_error(source)),
        Err(nom::Err::Incomplete(_)) => Err(CompileError::UnexpectedEnd {
            position: source.len(),
        }),
    }
}

// --- Errors ---

#[derive(Debug, Clone, PartialEq)]
enum Problem {
    Expected(&'static str),
    Unexpected(char),
    UnexpectedEnd,
    UnmatchedBracket(char),
    EmptyBracket,
    InvalidBracket,
    UnterminatedString,
    InvalidPipe(&'static str),
    TooDeep(usize),
}

/// The parser's error type: where parsing stopped and why.
#[derive(Debug)]
struct SyntaxError<'a> {
    input: &'a str,
    problem: Problem,
}

impl<'a> ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        SyntaxError {
            input,
            problem: Problem::Expected("a valid token"),
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl SyntaxError<'_> {
    fn into_compile_error(self, source: &str) -> CompileError {
        let position = source.len() - self.input.len();
        match self.problem {
            Problem::Expected(_) | Problem::Unexpected(_) if self.input.is_empty() => {
                CompileError::UnexpectedEnd { position }
            }
            Problem::Expected(what) => CompileError::Syntax {
                message: format!("expected {}", what),
                position,
            },
            Problem::Unexpected(c) => CompileError::Syntax {
                message: format!("unexpected character '{}'", c),
                position,
            },
            Problem::UnexpectedEnd => CompileError::UnexpectedEnd { position },
            Problem::UnmatchedBracket(bracket) => CompileError::UnmatchedBracket { bracket, position },
            Problem::EmptyBracket => CompileError::EmptyBracket { position },
            Problem::InvalidBracket => CompileError::InvalidBracket { position },
            Problem::UnterminatedString => CompileError::UnterminatedString { position },
            Problem::InvalidPipe(reason) => CompileError::InvalidPipe { reason, position },
            Problem::TooDeep(limit) => CompileError::NestingTooDeep { limit, position },
        }
    }
}

type PResult<'a, O> = IResult<&'a str, O, SyntaxError<'a>>;

/// Aborts parsing: no alternative is tried once a construct is committed to.
fn fail<O>(input: &str, problem: Problem) -> PResult<'_, O> {
    Err(nom::Err::Failure(SyntaxError { input, problem }))
}

// --- Combinators ---

fn symbol<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = SyntaxError<'a>> {
    char(c)
}

fn spaces(input: &str) -> PResult<'_, &str> {
    multispace0(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))
    .parse(input)
}

fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = SyntaxError<'a>> {
    terminated(tag(word), not(satisfy(is_identifier_char)))
}

/// How deeply call arguments are nested at the current point of the parse.
#[derive(Debug, Clone, Copy)]
struct Nesting {
    level: usize,
    limit: usize,
}

impl Nesting {
    fn deeper(self) -> Option<Self> {
        let level = self.level + 1;
        (level <= self.limit).then_some(Nesting { level, ..self })
    }
}

// --- Expression Parsers ---

fn expression<'a>(input: &'a str, nesting: Nesting) -> PResult<'a, Expression> {
    let (input, _) = spaces(input)?;
    let (input, root) = root(input)?;
    let (input, steps) = many0(|i: &'a str| step(i, nesting)).parse(input)?;
    let (input, transform) = opt(pipe).parse(input)?;
    Ok((input, Expression { root, steps, transform }))
}

fn root(input: &str) -> PResult<'_, Root> {
    if input.is_empty() {
        return fail(input, Problem::UnexpectedEnd);
    }
    match alt((
        value(Root::Context, symbol('#')),
        map(string_literal, Root::Literal),
        value(Root::Nil, keyword("nil")),
    ))
    .parse(input)
    {
        Err(nom::Err::Error(_)) => fail(input, Problem::Expected("'#', a string literal or nil")),
        other => other,
    }
}

fn step<'a>(input: &'a str, nesting: Nesting) -> PResult<'a, Step> {
    alt((field, index, |i: &'a str| call(i, nesting))).parse(input)
}

fn field(input: &str) -> PResult<'_, Step> {
    let (rest, _) = symbol('.').parse(input)?;
    match identifier(rest) {
        Ok((rest, name)) => Ok((rest, Step::Field(name.to_string()))),
        Err(_) => fail(rest, Problem::Expected("a field name")),
    }
}

fn index(input: &str) -> PResult<'_, Step> {
    let (rest, _) = symbol('[').parse(input)?;
    let (rest, _) = spaces(rest)?;
    if rest.is_empty() {
        return fail(input, Problem::UnmatchedBracket('['));
    }
    if rest.starts_with(']') {
        return fail(input, Problem::EmptyBracket);
    }
    let (rest, key) = match alt((map(string_literal, Literal::Str), map(int_literal, Literal::Int))).parse(rest) {
        Err(nom::Err::Error(_)) => return fail(rest, Problem::InvalidBracket),
        other => other?,
    };
    let (rest, _) = spaces(rest)?;
    match symbol(']').parse(rest) {
        Ok((rest, _)) => Ok((rest, Step::Index(key))),
        Err(_) if rest.is_empty() => fail(input, Problem::UnmatchedBracket('[')),
        Err(_) => fail(rest, Problem::InvalidBracket),
    }
}

fn call(input: &str, nesting: Nesting) -> PResult<'_, Step> {
    let (mut rest, _) = symbol('(').parse(input)?;
    let Some(inner) = nesting.deeper() else {
        return fail(input, Problem::TooDeep(nesting.limit));
    };
    let mut args = Vec::new();

    let (after, _) = spaces(rest)?;
    if let Some(after) = after.strip_prefix(')') {
        return Ok((after, Step::Call(args)));
    }

    loop {
        if rest.trim_start().is_empty() {
            return fail(input, Problem::UnmatchedBracket('('));
        }
        let (after, arg) = expression(rest, inner)?;
        args.push(arg);

        let (after, _) = spaces(after)?;
        if let Some(after) = after.strip_prefix(',') {
            rest = after;
        } else if let Some(after) = after.strip_prefix(')') {
            return Ok((after, Step::Call(args)));
        } else if after.is_empty() {
            return fail(input, Problem::UnmatchedBracket('('));
        } else {
            return fail(after, Problem::Expected("',' or ')'"));
        }
    }
}

/// A trailing `| name`. It must close its expression: only the end of input,
/// or the `,`/`)` of an enclosing call, may follow it.
fn pipe(input: &str) -> PResult<'_, String> {
    let (rest, _) = preceded(spaces, symbol('|')).parse(input)?;
    let bar = &input[input.len() - rest.len() - 1..];
    let (rest, _) = spaces(rest)?;
    let (rest, name) = match identifier(rest) {
        Ok(parsed) => parsed,
        Err(_) => return fail(bar, Problem::InvalidPipe("missing transform name")),
    };
    let (after, _) = spaces(rest)?;
    if !(after.is_empty() || after.starts_with(',') || after.starts_with(')')) {
        return fail(after, Problem::InvalidPipe("a transform must be the last stage of an expression"));
    }
    Ok((rest, name.to_string()))
}

// --- Literal Parsers ---

fn string_literal(input: &str) -> PResult<'_, String> {
    let (rest, _) = symbol('\'').parse(input)?;
    let (rest, text) = take_until("'")
        .parse(rest)
        .map_err(|_: nom::Err<SyntaxError>| nom::Err::Failure(SyntaxError {
            input,
            problem: Problem::UnterminatedString,
        }))?;
    let (rest, _) = symbol('\'').parse(rest)?;
    Ok((rest, text.to_string()))
}

fn int_literal(input: &str) -> PResult<'_, i64> {
    nom_i64(input)
}
