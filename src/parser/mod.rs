//! Layout-grammar parsing and generation.
//!
//! The layout language is a minimal, permissive subset of the common
//! keyboard-layout interchange format: rows written as `["", {x:1.5}, "",
//! ...]`, where a metadata object overrides the horizontal offset and/or
//! width of the key that follows it. Key labels are ignored; only presence
//! and placement matter to the case geometry, so rotation, color, and label
//! metadata are deliberately unsupported.
//!
//! Parsing walks an explicit byte cursor over the immutable input instead of
//! re-slicing strings; every failure carries the byte offset it occurred at.

use crate::models::{FieldOverride, KeyCell, Layout, Row};
use thiserror::Error;

/// What went wrong at a given input position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A field was expected but the input ended.
    #[error("expected a field but found end of input")]
    EmptyField,
    /// A metadata object was never closed with `}`.
    #[error("unterminated metadata object")]
    UnterminatedOverride,
    /// A quoted key token was never closed with an unescaped `\"`.
    #[error("unterminated key token")]
    UnterminatedKey,
    /// An `x` or `w` metadata value was not a number.
    #[error("invalid numeric value in metadata object")]
    InvalidNumber,
    /// A field started with something other than `{` or `\"`.
    #[error("unexpected character")]
    UnexpectedCharacter,
}

/// A layout parse failure, tagged with the byte offset of the offending
/// input. No partial layout survives an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {pos}")]
pub struct ParseError {
    /// Byte offset into the input where parsing failed.
    pub pos: usize,
    /// Failure category.
    pub kind: ParseErrorKind,
}

/// A single row field before resolution.
enum Field {
    /// A metadata object; stashed until the next key.
    Override(FieldOverride),
    /// A quoted key token; emits one key cell.
    Key,
}

/// Byte cursor over the input text.
struct Cursor<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            pos: self.pos,
            kind,
        }
    }

    fn error_at(&self, pos: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { pos, kind }
    }
}

/// Parses layout text into a [`Layout`].
///
/// Empty input yields an empty layout. Text between rows is skipped without
/// validation, but the input must begin with the first row's `[`.
///
/// # Errors
///
/// Returns a [`ParseError`] identifying the byte position of the first
/// malformed field, unterminated token, or unexpected character.
pub fn parse_layout(text: &str) -> Result<Layout, ParseError> {
    let mut cur = Cursor::new(text);
    let mut rows = Vec::new();

    while let Some(byte) = cur.peek() {
        if byte != b'[' {
            return Err(cur.error(ParseErrorKind::UnexpectedCharacter));
        }
        cur.bump();
        rows.push(parse_row(&mut cur)?);

        // Inter-row noise is a consume-until-next-row token, not validated.
        while matches!(cur.peek(), Some(b) if b != b'[') {
            cur.bump();
        }
    }

    Ok(Layout { rows })
}

/// Parses one row body (after `[`) and resolves key placements.
///
/// Maintains a running horizontal cursor and a pending-override slot.
/// Consecutive metadata objects merge per field, last write wins. A key
/// takes the pending `x` (resetting the cursor) and `w` if set, then
/// advances the cursor by its width so wide keys push later keys.
fn parse_row(cur: &mut Cursor<'_>) -> Result<Row, ParseError> {
    let mut x = 0.0;
    let mut pending: Option<FieldOverride> = None;
    let mut cells = Row::new();

    loop {
        if matches!(cur.peek(), Some(b',')) {
            cur.bump();
        }
        match cur.peek() {
            // A row also ends at end of input; the `]` is not required.
            None => break,
            Some(b']') => {
                cur.bump();
                break;
            }
            Some(_) => {}
        }

        match parse_field(cur)? {
            Field::Override(over) => match pending.as_mut() {
                Some(p) => p.merge(over),
                None => pending = Some(over),
            },
            Field::Key => {
                let over = pending.take().unwrap_or_default();
                if let Some(override_x) = over.x {
                    x = override_x;
                }
                let cell = KeyCell {
                    x,
                    w: over.w.unwrap_or(1.0),
                };
                x += cell.w;
                cells.push(cell);
            }
        }
    }

    Ok(cells)
}

/// Parses one field: a `{...}` metadata object or a quoted key token.
fn parse_field(cur: &mut Cursor<'_>) -> Result<Field, ParseError> {
    match cur.peek() {
        None => Err(cur.error(ParseErrorKind::EmptyField)),
        Some(b'{') => parse_override(cur).map(Field::Override),
        Some(b'"') => parse_key(cur).map(|()| Field::Key),
        Some(_) => Err(cur.error(ParseErrorKind::UnexpectedCharacter)),
    }
}

/// Parses a metadata object, recognizing `x` and `w` keys.
///
/// Unrecognized keys are ignored entirely (their values are never parsed),
/// but a malformed numeric value for `x` or `w` fails the parse.
fn parse_override(cur: &mut Cursor<'_>) -> Result<FieldOverride, ParseError> {
    let open = cur.pos;
    cur.bump();
    let start = cur.pos;

    let mut end = None;
    while let Some(byte) = cur.peek() {
        if byte == b'}' {
            end = Some(cur.pos);
            cur.bump();
            break;
        }
        cur.bump();
    }
    let end = end.ok_or_else(|| cur.error_at(open, ParseErrorKind::UnterminatedOverride))?;

    let body = std::str::from_utf8(&cur.text[start..end])
        .map_err(|_| cur.error_at(start, ParseErrorKind::InvalidNumber))?;

    let mut over = FieldOverride::default();
    let mut offset = start;
    for pair in body.split(',') {
        let (key, value) = match pair.split_once(':') {
            Some((key, value)) => (key.trim(), Some(value)),
            None => (pair.trim(), None),
        };
        if key == "x" || key == "w" {
            let number = value
                .and_then(|v| v.trim().parse::<f64>().ok())
                .ok_or_else(|| cur.error_at(offset, ParseErrorKind::InvalidNumber))?;
            if key == "x" {
                over.x = Some(number);
            } else {
                over.w = Some(number);
            }
        }
        offset += pair.len() + 1;
    }

    Ok(over)
}

/// Consumes a quoted key token, honoring backslash escapes.
///
/// The token ends at the first unescaped `"`. Contents are discarded: key
/// labels carry no geometric information.
fn parse_key(cur: &mut Cursor<'_>) -> Result<(), ParseError> {
    let open = cur.pos;
    cur.bump();
    while let Some(byte) = cur.peek() {
        match byte {
            b'"' => {
                cur.bump();
                return Ok(());
            }
            b'\\' => {
                cur.bump();
                if cur.peek().is_some() {
                    cur.bump();
                }
            }
            _ => cur.bump(),
        }
    }
    Err(cur.error_at(open, ParseErrorKind::UnterminatedKey))
}

/// Serializes a layout back into the grammar.
///
/// Emits the minimal form: an override object only where a key's placement
/// differs from the running cursor or its width from one unit. Re-parsing
/// the output yields an equal layout.
pub fn format_layout(layout: &Layout) -> String {
    let mut out = String::new();
    for row in &layout.rows {
        out.push('[');
        let mut x = 0.0;
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let mut over = String::new();
            if (cell.x - x).abs() > f64::EPSILON {
                over.push_str(&format!("x:{}", cell.x));
            }
            if (cell.w - 1.0).abs() > f64::EPSILON {
                if !over.is_empty() {
                    over.push(',');
                }
                over.push_str(&format!("w:{}", cell.w));
            }
            if !over.is_empty() {
                out.push('{');
                out.push_str(&over);
                out.push_str("},");
            }
            out.push_str("\"\"");
            x = cell.x + cell.w;
        }
        out.push_str("]\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: f64, w: f64) -> KeyCell {
        KeyCell { x, w }
    }

    #[test]
    fn test_empty_input_is_empty_layout() {
        let layout = parse_layout("").unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_x_override_resets_cursor() {
        // [{x:1},"a","b"] -> {x:1,w:1} then {x:2,w:1}.
        let layout = parse_layout("[{x:1},\"a\",\"b\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(1.0, 1.0), cell(2.0, 1.0)]]);
    }

    #[test]
    fn test_width_override_applies_to_next_key_only() {
        // ["a",{w:2},"b"] -> {x:0,w:1} then {x:1,w:2}.
        let layout = parse_layout("[\"a\",{w:2},\"b\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(0.0, 1.0), cell(1.0, 2.0)]]);
    }

    #[test]
    fn test_wide_key_pushes_later_keys() {
        let layout = parse_layout("[{w:1.5},\"\",\"\",\"\"]").unwrap();
        assert_eq!(
            layout.rows,
            vec![vec![cell(0.0, 1.5), cell(1.5, 1.0), cell(2.5, 1.0)]]
        );
    }

    #[test]
    fn test_consecutive_overrides_merge_per_field() {
        let layout = parse_layout("[{x:3},{w:2},\"\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(3.0, 2.0)]]);

        // Last write wins for a re-set field.
        let layout = parse_layout("[{x:3,w:4},{x:1},\"\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(1.0, 4.0)]]);
    }

    #[test]
    fn test_override_cleared_after_key() {
        let layout = parse_layout("[{w:2},\"\",\"\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(0.0, 2.0), cell(2.0, 1.0)]]);
    }

    #[test]
    fn test_unrecognized_metadata_keys_ignored() {
        let layout = parse_layout("[{a:1,c:\"#777\"},\"\"]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(0.0, 1.0)]]);
    }

    #[test]
    fn test_multiple_rows_with_noise_between() {
        let layout = parse_layout("[\"\"]\n \n[\"\",\"\"]").unwrap();
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0].len(), 1);
        assert_eq!(layout.rows[1].len(), 2);
    }

    #[test]
    fn test_row_may_end_at_end_of_input() {
        let layout = parse_layout("[\"\",\"\"").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(0.0, 1.0), cell(1.0, 1.0)]]);
    }

    #[test]
    fn test_escaped_quote_inside_key() {
        let layout = parse_layout("[\"\\\"\",\"a\"]").unwrap();
        assert_eq!(layout.rows[0].len(), 2);
    }

    #[test]
    fn test_unterminated_key_fails() {
        // ["a] never closes the quote.
        let err = parse_layout("[\"a]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedKey);
        assert_eq!(err.pos, 1);
    }

    #[test]
    fn test_unterminated_override_fails() {
        let err = parse_layout("[{x:1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedOverride);
        assert_eq!(err.pos, 1);
    }

    #[test]
    fn test_invalid_number_fails() {
        let err = parse_layout("[{x:wide},\"\"]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber);

        let err = parse_layout("[{w},\"\"]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber);
    }

    #[test]
    fn test_unexpected_field_character_fails() {
        let err = parse_layout("[key]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedCharacter);
        assert_eq!(err.pos, 1);
    }

    #[test]
    fn test_leading_noise_before_first_row_fails() {
        let err = parse_layout("x[\"\"]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedCharacter);
        assert_eq!(err.pos, 0);
    }

    #[test]
    fn test_trailing_comma_is_tolerated() {
        let layout = parse_layout("[\"\",]").unwrap();
        assert_eq!(layout.rows, vec![vec![cell(0.0, 1.0)]]);
    }

    #[test]
    fn test_cursor_x_non_decreasing_without_overrides() {
        let layout = parse_layout("[\"\",{w:2.25},\"\",\"\",{w:1.5},\"\"]").unwrap();
        let xs: Vec<f64> = layout.rows[0].iter().map(|c| c.x).collect();
        for pair in xs.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_round_trip_through_grammar() {
        let layout = Layout {
            rows: vec![
                vec![cell(0.0, 1.0), cell(1.0, 1.5), cell(4.0, 1.0)],
                vec![cell(0.25, 2.0), cell(2.25, 1.0)],
            ],
        };
        let text = format_layout(&layout);
        let reparsed = parse_layout(&text).unwrap();
        assert_eq!(reparsed, layout);
    }

    #[test]
    fn test_format_layout_minimal_form() {
        let layout = Layout {
            rows: vec![vec![cell(0.0, 1.0), cell(1.0, 1.0)]],
        };
        // Keys on the default cursor need no override objects.
        assert_eq!(format_layout(&layout), "[\"\",\"\"]\n");
    }
}
