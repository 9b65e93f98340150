//! ASCII FBX front-end (spec §4.6).
//!
//! `node := NAME values? ('{' node* '}')?`, values comma-separated. Post-
//! 7000 files mark an array value explicitly with a `*N` bareword
//! followed by a block holding a single `a: v1, v2, …` child; pre-7000
//! files have no such marker and rely entirely on [`super::classify`] to
//! know a node's values form an array.

use super::classify::{self, ArrayInfo, ArrayType, ParseState};
use crate::error::{Error, Result};
use crate::options::LoadOpts;
use crate::strings::StringPool;
use ufbx_data::error::ErrorKind;
use ufbx_data::{DomArray, DomNode, NodeContent, ScalarValue};

fn fail(function: &'static str, description: impl Into<String>) -> Error {
    Error::new(ErrorKind::BadNodeStructure, function, line!(), description)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Comma,
    OpenBrace,
    CloseBrace,
    Eof,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    peeked: Option<Token>,
    max_token_length: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, max_token_length: usize) -> Self {
        Lexer { chars: src.chars().peekable(), peeked: None, max_token_length }
    }

    fn check_token_length(&self, len: usize) -> Result<()> {
        if len > self.max_token_length {
            return Err(fail("check_token_length", format!("token of {len} characters exceeds configured max_ascii_token_length ({})", self.max_token_length)));
        }
        Ok(())
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some(';') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
    }

    fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lex()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    fn next(&mut self) -> Result<Token> {
        if let Some(t) = self.peeked.take() {
            return Ok(t);
        }
        self.lex()
    }

    fn lex(&mut self) -> Result<Token> {
        self.skip_trivia();
        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            ',' => {
                self.chars.next();
                Ok(Token::Comma)
            }
            '{' => {
                self.chars.next();
                Ok(Token::OpenBrace)
            }
            '}' => {
                self.chars.next();
                Ok(Token::CloseBrace)
            }
            ':' => {
                self.chars.next();
                self.lex() // NAME's colon is structural punctuation, not a token the parser needs to see
            }
            '"' => self.lex_string(),
            '-' | '0'..='9' => self.lex_number(),
            _ => self.lex_bareword(),
        }
    }

    fn lex_string(&mut self) -> Result<Token> {
        self.chars.next(); // opening quote
        let mut s = String::new();
        loop {
            match self.chars.next() {
                None => return Err(fail("lex_string", "unterminated string literal")),
                Some('"') => break,
                Some('\\') => match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('r') => s.push('\r'),
                    Some('t') => s.push('\t'),
                    Some('\\') => s.push('\\'),
                    Some('"') => s.push('"'),
                    Some(other) => s.push(other),
                    None => return Err(fail("lex_string", "unterminated escape sequence")),
                },
                Some(c) => s.push(c),
            }
            self.check_token_length(s.len())?;
        }
        Ok(Token::Str(s))
    }

    fn lex_number(&mut self) -> Result<Token> {
        let mut s = String::new();
        if self.chars.peek() == Some(&'-') {
            s.push('-');
            self.chars.next();
        }
        let mut is_float = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else if c == '.' && !is_float {
                is_float = true;
                s.push(c);
                self.chars.next();
            } else if (c == 'e' || c == 'E') && !s.is_empty() {
                is_float = true;
                s.push(c);
                self.chars.next();
                if matches!(self.chars.peek(), Some('+') | Some('-')) {
                    s.push(self.chars.next().unwrap());
                }
            } else {
                break;
            }
            self.check_token_length(s.len())?;
        }
        if !is_float {
            if let Ok(v) = s.parse::<i64>() {
                return Ok(Token::Int(v));
            }
        }
        let v = crate::strtod::parse_f64(&s).ok_or_else(|| fail("lex_number", format!("malformed number literal {s:?}")))?;
        Ok(Token::Float(v))
    }

    fn lex_bareword(&mut self) -> Result<Token> {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || ",{}:;\"".contains(c) {
                break;
            }
            s.push(c);
            self.chars.next();
            self.check_token_length(s.len())?;
        }
        if s.is_empty() {
            return Err(fail("lex_bareword", "unexpected character in input"));
        }
        Ok(Token::Ident(s))
    }
}

fn is_array_marker(s: &str) -> bool {
    s.starts_with('*') && s.len() > 1 && s[1..].bytes().all(|b| b.is_ascii_digit())
}

fn token_to_scalar(tok: Token, strings: &mut StringPool) -> Result<ScalarValue> {
    Ok(match tok {
        Token::Int(v) => ScalarValue::I64(v),
        Token::Float(v) => ScalarValue::F64(v),
        Token::Str(s) => {
            let interned =
                strings.intern(&s).ok_or_else(|| fail("token_to_scalar", "string exceeds configured max_string_length"))?;
            ScalarValue::String(interned)
        }
        Token::Ident(s) => {
            let interned =
                strings.intern(&s).ok_or_else(|| fail("token_to_scalar", "bareword exceeds configured max_string_length"))?;
            ScalarValue::String(interned)
        }
        other => return Err(fail("token_to_scalar", format!("{other:?} is not a value"))),
    })
}

fn infer_array_type(scalars: &[ScalarValue]) -> ArrayType {
    if scalars.iter().all(|s| matches!(s, ScalarValue::I64(_) | ScalarValue::I16(_) | ScalarValue::I32(_))) {
        ArrayType::I32
    } else {
        ArrayType::F64
    }
}

fn scalars_to_array(scalars: &[ScalarValue], info: Option<ArrayInfo>, opts: &LoadOpts) -> Result<DomArray> {
    let ty = info.map(|i| i.type_code).unwrap_or_else(|| infer_array_type(scalars));
    let pad = info.map(|i| i.pad_begin).unwrap_or(0);
    super::check_array_size(scalars.len() + pad, opts)?;
    let built = match ty {
        ArrayType::Bool => DomArray::Bool(scalars.iter().map(|s| s.as_i64().unwrap_or(0) != 0).collect()),
        ArrayType::I32 => DomArray::I32(scalars.iter().map(|s| s.as_i64().unwrap_or(0) as i32).collect()),
        ArrayType::I64 => DomArray::I64(scalars.iter().map(|s| s.as_i64().unwrap_or(0)).collect()),
        ArrayType::F32 => DomArray::F32(scalars.iter().map(|s| s.as_f64().unwrap_or(0.0) as f32).collect()),
        ArrayType::F64 => DomArray::F64(scalars.iter().map(|s| s.as_f64().unwrap_or(0.0)).collect()),
        ArrayType::Byte => DomArray::Byte(scalars.iter().map(|s| s.as_i64().unwrap_or(0) as u8).collect()),
    };
    Ok(super::pad_array(built, pad))
}

/// Parses a comma-separated value list. `in_array` mirrors the original
/// ASCII reader's per-token dispatch once a node name is already known to
/// classify as array-bearing (context-inferred pre-7000 arrays have no
/// `*N` marker, spec §4.6): a bareword becomes its first byte's codepoint
/// cast to a number rather than an interned string (pre-7000 `Key` rows
/// smuggle mode characters this way — `classify.rs`, `readers/anim.rs`),
/// and a quoted string is dropped entirely rather than counted as a value
/// (`original_source/ufbx.c`'s `ufbxi_ascii_parse_node`: "ignore strings
/// in arrays").
fn parse_value_list(lexer: &mut Lexer, strings: &mut StringPool, in_array: bool) -> Result<Vec<ScalarValue>> {
    let mut values = Vec::new();
    loop {
        match lexer.peek()? {
            Token::OpenBrace | Token::CloseBrace | Token::Eof => break,
            _ => {}
        }
        let tok = lexer.next()?;
        if in_array {
            match tok {
                Token::Str(_) => {}
                // The `*N` marker of a post-7000 marked array is itself a
                // bareword token, but it names the array rather than
                // populating it — keep it as an ordinary string so
                // `is_array_marker` below still recognizes it.
                Token::Ident(s) if is_array_marker(&s) => values.push(token_to_scalar(Token::Ident(s), strings)?),
                Token::Ident(s) => values.push(ScalarValue::I64(s.bytes().next().unwrap_or(0) as i64)),
                other => values.push(token_to_scalar(other, strings)?),
            }
        } else {
            values.push(token_to_scalar(tok, strings)?);
        }
        if matches!(lexer.peek()?, Token::Comma) {
            lexer.next()?;
        } else {
            break;
        }
    }
    Ok(values)
}

fn parse_node(lexer: &mut Lexer, strings: &mut StringPool, state: ParseState, depth: usize, opts: &LoadOpts) -> Result<DomNode> {
    super::check_node_depth(depth, opts)?;

    let name = match lexer.next()? {
        Token::Ident(s) => s,
        other => return Err(fail("parse_node", format!("expected a node name, found {other:?}"))),
    };

    let array_info = classify::classify(state, &name);
    let raw_values = parse_value_list(lexer, strings, array_info.is_some())?;
    super::check_node_values(raw_values.len(), opts)?;

    let mut children = Vec::new();
    if matches!(lexer.peek()?, Token::OpenBrace) {
        lexer.next()?;
        let child_state = classify::child_state(state, &name);
        loop {
            if matches!(lexer.peek()?, Token::CloseBrace) {
                lexer.next()?;
                break;
            }
            children.push(parse_node(lexer, strings, child_state, depth + 1, opts)?);
            super::check_node_children(children.len(), opts)?;
        }
    }

    let interned_name = strings
        .intern(&name)
        .ok_or_else(|| fail("parse_node", "node name exceeds configured max_string_length"))?;
    let mut node = DomNode::new(interned_name);

    let is_marked_array =
        raw_values.len() == 1 && matches!(&raw_values[0], ScalarValue::String(s) if is_array_marker(s.as_str()));

    if is_marked_array && children.len() == 1 && children[0].name.as_str() == "a" {
        let array_info = classify::classify(state, &name);
        let inner_scalars = match &children[0].content {
            NodeContent::Scalars(values) => values.clone(),
            NodeContent::Array(_) => Vec::new(), // already typed by a nested classify hit; unexpected but harmless
        };
        node.content = NodeContent::Array(scalars_to_array(&inner_scalars, array_info, opts)?);
    } else if let Some(info) = classify::classify(state, &name) {
        node.content = NodeContent::Array(scalars_to_array(&raw_values, Some(info), opts)?);
        node.children = children;
    } else {
        node.content = NodeContent::Scalars(raw_values);
        node.children = children;
    }

    Ok(node)
}

/// Scans the first-line comment `; FBX <a>.<b>.<c>` for a version
/// fallback (spec §4.6); ASCII files carry no binary-style version
/// field, so this is the only source of it besides the 7400 default.
fn detect_version(text: &str) -> u32 {
    let first_line = text.lines().next().unwrap_or("");
    if let Some(idx) = first_line.find("FBX") {
        let rest = first_line[idx + 3..].trim_start();
        let digits_and_dots: String = rest.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
        let parts: Vec<&str> = digits_and_dots.split('.').collect();
        if parts.len() >= 2 {
            let major: u32 = parts[0].parse().unwrap_or(0);
            let minor: u32 = parts[1].parse().unwrap_or(0);
            let patch: u32 = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);
            if major > 0 {
                return major * 1000 + minor * 100 + patch;
            }
        }
    }
    7400
}

/// Parses a complete ASCII FBX text buffer, returning the detected
/// version and the top-level node list.
pub fn parse(text: &str, strings: &mut StringPool, opts: &LoadOpts) -> Result<(u32, Vec<DomNode>)> {
    let version = detect_version(text);
    let mut lexer = Lexer::new(text, opts.max_ascii_token_length);
    let mut top = Vec::new();
    loop {
        if matches!(lexer.peek()?, Token::Eof) {
            break;
        }
        top.push(parse_node(&mut lexer, strings, ParseState::TopLevel, 0, opts)?);
        super::check_node_children(top.len(), opts)?;
    }
    Ok((version, top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_version_from_comment() {
        assert_eq!(7500, detect_version("; FBX 7.5.0 project file\n; ----\n"));
        assert_eq!(7400, detect_version("no comment here"));
    }

    #[test]
    fn parses_flat_property_node() {
        let src = r#"Creator: "Blender (stable FBX IO)""#;
        let mut strings = StringPool::new(1024, 10_000);
        let (_, top) = parse(src, &mut strings, &LoadOpts::default()).unwrap();
        assert_eq!(1, top.len());
        assert_eq!("Creator", top[0].name.as_str());
        let scalars = top[0].content.as_scalars().unwrap();
        assert_eq!(Some("Blender (stable FBX IO)"), scalars[0].as_str());
    }

    #[test]
    fn parses_nested_block_with_children() {
        let src = r#"
            Model: 123456, "Model::Cube", "Mesh" {
                Version: 232
                Properties70:  {
                }
            }
        "#;
        let mut strings = StringPool::new(1024, 10_000);
        let (_, top) = parse(src, &mut strings, &LoadOpts::default()).unwrap();
        assert_eq!(1, top.len());
        assert_eq!("Model", top[0].name.as_str());
        assert_eq!(3, top[0].content.as_scalars().unwrap().len());
        assert_eq!(2, top[0].children.len());
    }

    #[test]
    fn parses_post_7000_array_form() {
        let src = "Vertices: *12 {\n  a: 0,0,0,1,0,0,1,1,0,0,1,0\n }";
        let mut strings = StringPool::new(1024, 10_000);
        let (_, top) = parse(src, &mut strings, &LoadOpts::default()).unwrap();
        let array = top[0].content.as_array().unwrap();
        assert_eq!(12, array.len());
    }

    #[test]
    fn rejects_token_exceeding_max_ascii_token_length() {
        let src = r#"Creator: "a much too long string value""#;
        let mut strings = StringPool::new(1024, 10_000);
        let opts = LoadOpts { max_ascii_token_length: 8, ..LoadOpts::default() };
        assert!(parse(src, &mut strings, &opts).is_err());
    }
}
