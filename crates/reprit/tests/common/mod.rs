//! Test-only call parser and argument binder.
//!
//! Parses a rendered `Head(arg, ..., kw=value)` string back into values and
//! binds the arguments against a signature the way a call would, so tests can
//! check that a representation rebuilds the fields it was rendered from.

#![allow(dead_code)]

use indexmap::IndexMap;
use reprit::{ParameterKind, Signature, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub head: String,
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

pub fn parse_call(text: &str) -> Result<Call, String> {
    let mut parser = Parser::new(text);
    let head = parser.dotted_name()?;
    parser.expect('(')?;

    let mut positional = Vec::new();
    let mut keywords: Vec<(String, Value)> = Vec::new();
    parser.skip_spaces();
    if !parser.eat(')') {
        loop {
            parser.skip_spaces();
            if let Some(name) = parser.keyword_name() {
                let value = parser.value()?;
                if keywords.iter().any(|(existing, _)| *existing == name) {
                    return Err(format!("keyword `{name}` repeated"));
                }
                keywords.push((name, value));
            } else {
                if !keywords.is_empty() {
                    return Err("positional argument follows keyword argument".into());
                }
                positional.push(parser.value()?);
            }
            parser.skip_spaces();
            if parser.eat(')') {
                break;
            }
            parser.expect(',')?;
        }
    }
    if !parser.at_end() {
        return Err(format!("trailing input after call: {:?}", parser.rest()));
    }

    Ok(Call {
        head,
        positional,
        keywords,
    })
}

/// Binds a parsed call against `signature`, returning every parameter's value.
///
/// Variadic positionals bind as a tuple and variadic keywords as a dict, both
/// empty when nothing is passed.
pub fn bind(signature: &Signature, call: &Call) -> Result<IndexMap<String, Value>, String> {
    let mut bound: IndexMap<String, Value> = IndexMap::new();
    let mut positional = call.positional.iter();
    let mut extra_positional = Vec::new();
    let mut extra_keywords = Vec::new();

    for parameter in signature.iter() {
        if parameter.kind().is_positional() {
            if let Some(value) = positional.next() {
                bound.insert(parameter.name().to_string(), value.clone());
            }
        }
    }
    extra_positional.extend(positional.cloned());
    if !extra_positional.is_empty() && signature.variadic_positional().is_none() {
        return Err(format!("{} unexpected positional arguments", extra_positional.len()));
    }

    for (name, value) in &call.keywords {
        let target = signature
            .get(name)
            .filter(|parameter| {
                matches!(
                    parameter.kind(),
                    ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly
                )
            });
        match target {
            Some(_) if bound.contains_key(name) => {
                return Err(format!("multiple values for `{name}`"));
            }
            Some(_) => {
                bound.insert(name.clone(), value.clone());
            }
            None if signature.variadic_keyword().is_some() => {
                extra_keywords.push((Value::Str(name.clone()), value.clone()));
            }
            None => return Err(format!("unexpected keyword `{name}`")),
        }
    }

    let mut result = IndexMap::new();
    for parameter in signature.iter() {
        let name = parameter.name();
        let value = match parameter.kind() {
            ParameterKind::VarPositional => Value::Tuple(std::mem::take(&mut extra_positional)),
            ParameterKind::VarKeyword => Value::Dict(std::mem::take(&mut extra_keywords)),
            _ => match bound.swap_remove(name) {
                Some(value) => value,
                None => parameter
                    .default()
                    .cloned()
                    .ok_or_else(|| format!("missing argument `{name}`"))?,
            },
        };
        result.insert(name.to_string(), value);
    }
    Ok(result)
}

struct Parser<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn at_end(&self) -> bool {
        self.position == self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(format!("expected `{expected}` at {:?}", self.rest()))
        }
    }

    fn skip_spaces(&mut self) {
        while self.eat(' ') {}
    }

    fn identifier(&mut self) -> Option<String> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, ch)) if ch == '_' || ch.is_alphabetic() => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, ch)| !(*ch == '_' || ch.is_alphanumeric()))
            .map_or(rest.len(), |(index, _)| index);
        self.position += end;
        Some(rest[..end].to_string())
    }

    fn dotted_name(&mut self) -> Result<String, String> {
        let mut name = self
            .identifier()
            .ok_or_else(|| format!("expected a name at {:?}", self.rest()))?;
        while self.eat('.') {
            let segment = self
                .identifier()
                .ok_or_else(|| format!("expected a name at {:?}", self.rest()))?;
            name.push('.');
            name.push_str(&segment);
        }
        Ok(name)
    }

    /// `name=` prefix of a keyword argument; leaves the input untouched otherwise.
    fn keyword_name(&mut self) -> Option<String> {
        let start = self.position;
        if let Some(name) = self.identifier() {
            if self.eat('=') {
                return Some(name);
            }
        }
        self.position = start;
        None
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_spaces();
        match self.peek() {
            Some('\'' | '"') => self.string().map(Value::Str),
            Some('b') if matches!(self.rest().chars().nth(1), Some('\'' | '"')) => {
                self.bump();
                self.string().map(|text| {
                    Value::Bytes(text.chars().map(|ch| u32::from(ch) as u8).collect())
                })
            }
            Some('(') => {
                self.bump();
                let (items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.into_iter().next().unwrap_or(Value::None))
                } else {
                    Ok(Value::Tuple(items))
                }
            }
            Some('[') => {
                self.bump();
                self.sequence(']').map(|(items, _)| Value::List(items))
            }
            Some('{') => {
                self.bump();
                self.dict()
            }
            Some('<') => self.placeholder(),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            _ => {
                let word = self
                    .identifier()
                    .ok_or_else(|| format!("unexpected input {:?}", self.rest()))?;
                match word.as_str() {
                    "None" => Ok(Value::None),
                    "True" => Ok(Value::Bool(true)),
                    "False" => Ok(Value::Bool(false)),
                    "Ellipsis" => Ok(Value::Ellipsis),
                    "inf" => Ok(Value::Float(f64::INFINITY)),
                    "nan" => Ok(Value::Float(f64::NAN)),
                    other => Err(format!("unknown name `{other}`")),
                }
            }
        }
    }

    fn sequence(&mut self, close: char) -> Result<(Vec<Value>, bool), String> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_spaces();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_spaces();
            trailing_comma = self.eat(',');
            if !trailing_comma {
                self.skip_spaces();
                self.expect(close)?;
                return Ok((items, false));
            }
        }
    }

    fn dict(&mut self) -> Result<Value, String> {
        let mut entries = Vec::new();
        loop {
            self.skip_spaces();
            if self.eat('}') {
                return Ok(Value::Dict(entries));
            }
            let key = self.value()?;
            self.skip_spaces();
            self.expect(':')?;
            let value = self.value()?;
            entries.push((key, value));
            self.skip_spaces();
            if !self.eat(',') {
                self.expect('}')?;
                return Ok(Value::Dict(entries));
            }
        }
    }

    /// `<...>` opaque renderings, kept verbatim as strings.
    fn placeholder(&mut self) -> Result<Value, String> {
        let start = self.position;
        let mut depth = 0usize;
        while let Some(ch) = self.bump() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Value::Str(self.text[start..self.position].to_string()));
                    }
                }
                _ => {}
            }
        }
        Err("unterminated placeholder".into())
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.position;
        if self.eat('-') && self.rest().starts_with("inf") {
            self.position += 3;
            return Ok(Value::Float(f64::NEG_INFINITY));
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }
        let literal = &self.text[start..self.position];
        if is_float {
            literal
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|error| format!("bad float {literal:?}: {error}"))
        } else {
            literal
                .parse::<i128>()
                .map(Value::Int)
                .map_err(|error| format!("bad int {literal:?}: {error}"))
        }
    }

    fn string(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or("expected a quote")?;
        let mut out = String::new();
        loop {
            let ch = self.bump().ok_or("unterminated string")?;
            if ch == quote {
                return Ok(out);
            }
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            let escaped = self.bump().ok_or("unterminated escape")?;
            match escaped {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'x' => out.push(self.hex_escape(2)?),
                'u' => out.push(self.hex_escape(4)?),
                'U' => out.push(self.hex_escape(8)?),
                other => out.push(other),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, String> {
        let rest = self.rest();
        let hex = rest.get(..digits).ok_or("short hex escape")?;
        let code = u32::from_str_radix(hex, 16).map_err(|error| error.to_string())?;
        self.position += digits;
        char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))
    }
}
