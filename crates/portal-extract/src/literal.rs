//! Permissive literal grammar for loosely formatted script values.
//!
//! Accepts the literal subset that inline scripts emit when they are not
//! strict JSON: single-quoted strings with escapes, unquoted or numeric
//! object keys, trailing commas, `undefined`, hex and dotted numbers, and
//! comments. Anything else is rejected so the caller can keep the raw text.
//! There is no evaluation of expressions.

use serde_json::{Map, Number, Value};

/// Maximum nesting of arrays and objects.
const MAX_DEPTH: usize = 128;

/// Parse `text` as a single literal value. Returns `None` if any part of
/// the text falls outside the grammar.
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser {
        src: text,
        pos: 0,
        depth: 0,
    };
    parser.skip_trivia();
    let value = parser.value()?;
    parser.skip_trivia();
    (parser.pos == text.len()).then_some(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').map_or(trimmed.len(), |p| p + 1);
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(p) => self.pos += p + 4,
                    None => self.pos = self.src.len(),
                }
            } else {
                return;
            }
        }
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            '{' => self.nested(Self::object),
            '[' => self.nested(Self::array),
            '"' | '\'' => self.string().map(Value::String),
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            c if is_ident_start(c) => match self.identifier() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "null" | "undefined" => Some(Value::Null),
                _ => None,
            },
            _ => None,
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Option<Value>) -> Option<Value> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Option<Value> {
        self.eat('{');
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.eat('}') {
                return Some(Value::Object(map));
            }

            let key = match self.peek()? {
                '"' | '\'' => self.string()?,
                c if is_ident_start(c) => self.identifier().to_string(),
                c if c.is_ascii_digit() => match self.number()? {
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                },
                _ => return None,
            };

            self.skip_trivia();
            if !self.eat(':') {
                return None;
            }
            self.skip_trivia();
            let value = self.value()?;
            map.insert(key, value);

            self.skip_trivia();
            if self.eat(',') {
                continue;
            }
            self.skip_trivia();
            return self.eat('}').then_some(Value::Object(map));
        }
    }

    fn array(&mut self) -> Option<Value> {
        self.eat('[');
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat(']') {
                return Some(Value::Array(items));
            }
            items.push(self.value()?);

            self.skip_trivia();
            if self.eat(',') {
                continue;
            }
            return self.eat(']').then_some(Value::Array(items));
        }
    }

    fn identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let len: usize = rest
            .chars()
            .take_while(|c| is_ident_continue(*c))
            .map(char::len_utf8)
            .sum();
        self.pos += len;
        &rest[..len]
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\n' => return None,
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Option<()> {
        match self.bump()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code)?);
            }
            'u' => {
                let c = self.unicode_escape()?;
                out.push(c);
            }
            // Line continuation.
            '\n' => {}
            '\r' => {
                self.eat('\n');
            }
            other => out.push(other),
        }
        Some(())
    }

    fn unicode_escape(&mut self) -> Option<char> {
        if self.eat('{') {
            let rest = self.rest();
            let end = rest.find('}')?;
            let code = parse_hex(&rest[..end])?;
            self.pos += end + 1;
            return char::from_u32(code);
        }

        let high = self.hex_digits(4)?;
        if (0xD800..0xDC00).contains(&high) {
            // Surrogate pair: expect a trailing \uXXXX low half.
            if !self.rest().starts_with("\\u") {
                return None;
            }
            self.pos += 2;
            let low = self.hex_digits(4)?;
            if !(0xDC00..0xE000).contains(&low) {
                return None;
            }
            return char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
        }
        char::from_u32(high)
    }

    fn hex_digits(&mut self, count: usize) -> Option<u32> {
        let code = parse_hex(self.rest().get(..count)?)?;
        self.pos += count;
        Some(code)
    }

    fn number(&mut self) -> Option<Value> {
        let rest = self.rest();
        // Signs are taken anywhere so exponents like `1e-3` stay in one token;
        // malformed tokens are rejected by `number_from_token`.
        let len: usize = rest
            .chars()
            .take_while(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-'))
            .map(char::len_utf8)
            .sum();
        let token = &rest[..len];
        let value = number_from_token(token)?;
        self.pos += len;
        Some(value)
    }
}

/// Convert a JS numeric literal token to a JSON number.
fn number_from_token(token: &str) -> Option<Value> {
    let cleaned: String = token.chars().filter(|c| *c != '_').collect();
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        let magnitude = i64::from_str_radix(hex, 16).ok()?;
        return Some(Value::from(if negative { -magnitude } else { magnitude }));
    }

    if unsigned.is_empty() || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    // Only digits, one dot and an exponent are allowed from here on.
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }

    let is_integer = unsigned.chars().all(|c| c.is_ascii_digit());
    if is_integer {
        if let Ok(n) = unsigned.parse::<i64>() {
            return Some(Value::from(if negative { -n } else { n }));
        }
        if !negative {
            if let Ok(n) = unsigned.parse::<u64>() {
                return Some(Value::from(n));
            }
        }
    }

    let float: f64 = unsigned.parse().ok()?;
    let float = if negative { -float } else { float };
    Number::from_f64(float).map(Value::Number)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$')
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$')
}

/// Hex digits only: `from_str_radix` alone would also take a leading `+`.
fn parse_hex(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
