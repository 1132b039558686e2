//! Token-level nom parser for the graph list format.
//!
//! The format is a whitespace-separated token stream: `#` starts a comment
//! running to end of line, labels are bare tokens or double-quoted strings,
//! and a bare token that reads as a finite number becomes a numeric label.
//! The parser produces a flat directive stream with byte offsets; all
//! semantic checks (vertex numbering, endpoint resolution) happen in
//! [`crate::build`].

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::{char, digit1, multispace1},
    combinator::{eof, map, map_res, peek, value},
    error::VerboseError,
    multi::{many0, many1},
    sequence::{delimited, pair, terminated},
    IResult,
};

use crate::error::{Location, ParseError};

pub type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// A label as written, before interning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLabel {
    Text(String),
    Number(f64),
}

/// How an edge directive spelt its directedness. `Default` (`e`) takes the
/// run-time switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Directed,
    Undirected,
    Default,
}

/// One directive of the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `XP`: begin a positive example.
    BeginPositive,

    /// `XN`: begin a negative example.
    BeginNegative,

    /// `S`: begin a pattern in a predefined-substructures file.
    BeginSub,

    /// `v <n> <label>`
    Vertex { id: u64, label: RawLabel },

    /// `d|u|e <src> <tgt> <label>`
    Edge {
        kind: EdgeKind,
        source: u64,
        target: u64,
        label: RawLabel,
    },
}

/// A directive plus the byte offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub directive: Directive,
    pub offset: usize,
}

/// Parse a comment: `#` up to (and excluding) the newline.
fn comment(input: &str) -> ParseResult<'_, ()> {
    value((), pair(char('#'), take_till(|c| c == '\n')))(input)
}

/// Consume whitespace and comments, at least one.
fn sep(input: &str) -> ParseResult<'_, ()> {
    value((), many1(alt((value((), multispace1), comment))))(input)
}

/// Consume optional whitespace and comments.
fn ws(input: &str) -> ParseResult<'_, ()> {
    value((), many0(alt((value((), multispace1), comment))))(input)
}

/// A keyword must be followed by a separator or end of input so that `S`
/// never swallows the start of a longer token.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> ParseResult<'a, ()> {
    move |input| value((), terminated(tag(word), peek(alt((multispace1, eof)))))(input)
}

fn vertex_id(input: &str) -> ParseResult<'_, u64> {
    map_res(digit1, str::parse)(input)
}

fn quoted_label(input: &str) -> ParseResult<'_, RawLabel> {
    map(
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        |s: &str| RawLabel::Text(s.to_string()),
    )(input)
}

fn bare_label(input: &str) -> ParseResult<'_, RawLabel> {
    map(
        take_till1(|c: char| c.is_whitespace() || c == '#' || c == '"'),
        |token: &str| match token.parse::<f64>() {
            Ok(n) if n.is_finite() => RawLabel::Number(n),
            _ => RawLabel::Text(token.to_string()),
        },
    )(input)
}

pub fn label(input: &str) -> ParseResult<'_, RawLabel> {
    alt((quoted_label, bare_label))(input)
}

fn vertex_directive(input: &str) -> ParseResult<'_, Directive> {
    let (input, _) = keyword("v")(input)?;
    let (input, _) = sep(input)?;
    let (input, id) = vertex_id(input)?;
    let (input, _) = sep(input)?;
    let (input, label) = label(input)?;
    Ok((input, Directive::Vertex { id, label }))
}

fn edge_kind(input: &str) -> ParseResult<'_, EdgeKind> {
    alt((
        map(keyword("d"), |_| EdgeKind::Directed),
        map(keyword("u"), |_| EdgeKind::Undirected),
        map(keyword("e"), |_| EdgeKind::Default),
    ))(input)
}

fn edge_directive(input: &str) -> ParseResult<'_, Directive> {
    let (input, kind) = edge_kind(input)?;
    let (input, _) = sep(input)?;
    let (input, source) = vertex_id(input)?;
    let (input, _) = sep(input)?;
    let (input, target) = vertex_id(input)?;
    let (input, _) = sep(input)?;
    let (input, label) = label(input)?;
    Ok((
        input,
        Directive::Edge {
            kind,
            source,
            target,
            label,
        },
    ))
}

pub fn directive(input: &str) -> ParseResult<'_, Directive> {
    alt((
        map(keyword("XP"), |_| Directive::BeginPositive),
        map(keyword("XN"), |_| Directive::BeginNegative),
        map(keyword("S"), |_| Directive::BeginSub),
        vertex_directive,
        edge_directive,
    ))(input)
}

/// Parse a whole input into its directive stream.
pub fn directives(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut out = Vec::new();
    let mut rest = input;
    loop {
        rest = match ws(rest) {
            Ok((r, ())) => r,
            Err(_) => rest,
        };
        if rest.is_empty() {
            return Ok(out);
        }
        let offset = input.len() - rest.len();
        match directive(rest) {
            Ok((r, d)) => {
                out.push(Spanned {
                    directive: d,
                    offset,
                });
                rest = r;
            }
            Err(_) => {
                return Err(ParseError::Syntax {
                    location: Location::from_offset(input, offset),
                    snippet: rest.chars().take(20).collect(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<Directive> {
        directives(input)
            .unwrap()
            .into_iter()
            .map(|s| s.directive)
            .collect()
    }

    #[test]
    fn test_vertex_directive() {
        assert_eq!(
            parse_all("v 1 object"),
            vec![Directive::Vertex {
                id: 1,
                label: RawLabel::Text("object".to_string())
            }]
        );
    }

    #[test]
    fn test_numeric_label() {
        assert_eq!(
            parse_all("v 1 42\nv 2 -2.5"),
            vec![
                Directive::Vertex {
                    id: 1,
                    label: RawLabel::Number(42.0)
                },
                Directive::Vertex {
                    id: 2,
                    label: RawLabel::Number(-2.5)
                },
            ]
        );
    }

    #[test]
    fn test_quoted_label_keeps_spaces_and_digits() {
        assert_eq!(
            parse_all("v 1 \"on top of\"\nv 2 \"42\""),
            vec![
                Directive::Vertex {
                    id: 1,
                    label: RawLabel::Text("on top of".to_string())
                },
                Directive::Vertex {
                    id: 2,
                    label: RawLabel::Text("42".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_edge_kinds() {
        assert_eq!(
            parse_all("d 1 2 x\nu 2 3 y\ne 3 4 z"),
            vec![
                Directive::Edge {
                    kind: EdgeKind::Directed,
                    source: 1,
                    target: 2,
                    label: RawLabel::Text("x".to_string())
                },
                Directive::Edge {
                    kind: EdgeKind::Undirected,
                    source: 2,
                    target: 3,
                    label: RawLabel::Text("y".to_string())
                },
                Directive::Edge {
                    kind: EdgeKind::Default,
                    source: 3,
                    target: 4,
                    label: RawLabel::Text("z".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_example_markers_and_sub_token() {
        assert_eq!(
            parse_all("XP\nv 1 a\nXN\nv 1 a\nS\nv 1 a"),
            vec![
                Directive::BeginPositive,
                Directive::Vertex {
                    id: 1,
                    label: RawLabel::Text("a".to_string())
                },
                Directive::BeginNegative,
                Directive::Vertex {
                    id: 1,
                    label: RawLabel::Text("a".to_string())
                },
                Directive::BeginSub,
                Directive::Vertex {
                    id: 1,
                    label: RawLabel::Text("a".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "# header comment\nv 1 a # trailing\n# middle\nv 2 b";
        assert_eq!(parse_all(input).len(), 2);
    }

    #[test]
    fn test_unknown_token_reports_line_and_column() {
        let err = directives("v 1 a\nq 1 2 x").unwrap_err();
        match err {
            ParseError::Syntax { location, snippet } => {
                assert_eq!(location, Location::new(2, 1));
                assert!(snippet.starts_with('q'));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_vertex_id_is_rejected() {
        assert!(directives("v x a").is_err());
    }

    #[test]
    fn test_offsets_point_at_directives() {
        let spanned = directives("v 1 a\nv 2 b").unwrap();
        assert_eq!(spanned[0].offset, 0);
        assert_eq!(spanned[1].offset, 6);
    }
}
