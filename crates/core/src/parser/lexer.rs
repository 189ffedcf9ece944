//! Tokenizer for decoded content streams.

use smol_str::SmolStr;

use crate::error::{Result, ScanError};

/// Content-stream token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Boolean value
    Bool(bool),
    /// Name (e.g., /F1), escapes decoded
    Name(SmolStr),
    /// String (literal or hex)
    String(Vec<u8>),
    /// Operator or structural keyword (`[`, `]`, `<<`, `>>`, `{`, `}`)
    Keyword(SmolStr),
}

impl Token {
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Keyword(k) if k == kw)
    }
}

/// Lexer over one decoded content stream.
pub struct ContentLexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ContentLexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        let data = self.data;
        let len = data.len();
        while self.pos < len {
            let b = data[self.pos];
            if b == b'%' {
                self.pos += 1;
                match find_line_end(&data[self.pos..]) {
                    Some(offset) => self.pos += offset + 1,
                    None => self.pos = len,
                }
                continue;
            }
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn parse_literal(&mut self) -> Result<Token> {
        let data = self.data;
        let len = data.len();
        let mut pos = self.pos + 1; // skip '/'
        let mut name = Vec::with_capacity(16);

        while pos < len {
            let b = data[pos];
            if is_keyword_end(b) {
                break;
            }
            if b == b'#'
                && pos + 2 < len
                && let (Some(h1), Some(h2)) = (hex_value(data[pos + 1]), hex_value(data[pos + 2]))
            {
                name.push((h1 << 4) | h2);
                pos += 3;
                continue;
            }
            name.push(b);
            pos += 1;
        }

        self.pos = pos;
        Ok(Token::Name(name_from_bytes(&name)))
    }

    fn parse_number(&mut self) -> Result<Token> {
        let data = self.data;
        let len = data.len();
        let start = self.pos;
        let mut pos = self.pos;
        let mut negative = false;

        if pos < len {
            match data[pos] {
                b'-' => {
                    negative = true;
                    pos += 1;
                }
                b'+' => {
                    pos += 1;
                }
                _ => {}
            }
        }

        let mut int_part: i64 = 0;
        let mut has_int = false;
        while pos < len && data[pos].is_ascii_digit() {
            has_int = true;
            int_part = int_part
                .saturating_mul(10)
                .saturating_add(i64::from(data[pos] - b'0'));
            pos += 1;
        }

        let mut has_dot = false;
        let mut frac = 0.0;
        let mut divisor = 1.0;
        if pos < len && data[pos] == b'.' {
            has_dot = true;
            pos += 1;
            while pos < len && data[pos].is_ascii_digit() {
                frac = frac * 10.0 + f64::from(data[pos] - b'0');
                divisor *= 10.0;
                pos += 1;
            }
        }

        if !has_int && divisor == 1.0 {
            self.pos = start + 1;
            return Err(ScanError::TokenError {
                pos: start,
                msg: "invalid number".into(),
            });
        }

        self.pos = pos;
        if has_dot {
            let value = int_part as f64 + frac / divisor;
            Ok(Token::Real(if negative { -value } else { value }))
        } else {
            Ok(Token::Int(if negative { -int_part } else { int_part }))
        }
    }

    fn parse_string(&mut self) -> Result<Token> {
        let data = self.data;
        let len = data.len();
        let mut pos = self.pos + 1; // skip '('
        let mut depth = 1;
        let mut result = Vec::with_capacity(32);

        while pos < len && depth > 0 {
            let c = data[pos];
            pos += 1;
            match c {
                b'(' => {
                    depth += 1;
                    result.push(b'(');
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b')');
                    }
                }
                b'\\' => {
                    if pos >= len {
                        self.pos = pos;
                        return Err(ScanError::UnexpectedEof);
                    }
                    let esc = data[pos];
                    pos += 1;
                    match esc {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0c),
                        b'\r' => {
                            if pos < len && data[pos] == b'\n' {
                                pos += 1;
                            }
                        }
                        b'\n' => {}
                        c @ b'0'..=b'7' => {
                            let mut octal = u32::from(c - b'0');
                            for _ in 0..2 {
                                match data.get(pos) {
                                    Some(&d @ b'0'..=b'7') => {
                                        octal = octal * 8 + u32::from(d - b'0');
                                        pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            result.push((octal & 0xFF) as u8);
                        }
                        c => result.push(c),
                    }
                }
                c => result.push(c),
            }
        }

        self.pos = pos;
        if depth > 0 {
            return Err(ScanError::UnexpectedEof);
        }
        Ok(Token::String(result))
    }

    fn parse_hex_string(&mut self) -> Result<Token> {
        let data = self.data;
        let len = data.len();
        let mut pos = self.pos + 1; // skip '<'
        let mut result = Vec::with_capacity(32);
        let mut pending: Option<u8> = None;
        let mut closed = false;

        while pos < len {
            let c = data[pos];
            if c == b'>' {
                pos += 1;
                closed = true;
                break;
            }
            if let Some(nibble) = hex_value(c) {
                match pending.take() {
                    Some(high) => result.push((high << 4) | nibble),
                    None => pending = Some(nibble),
                }
                pos += 1;
                continue;
            }
            if is_whitespace(c) {
                pos += 1;
                continue;
            }
            break;
        }

        self.pos = pos;
        if !closed && pos >= len {
            return Err(ScanError::UnexpectedEof);
        }
        // odd digit count: the last nibble is followed by an implied 0
        if let Some(high) = pending {
            result.push(high << 4);
        }
        Ok(Token::String(result))
    }

    fn parse_keyword(&mut self) -> Result<Token> {
        let data = self.data;
        let start = self.pos;
        let mut pos = start;
        while pos < data.len() && !is_keyword_end(data[pos]) {
            pos += 1;
        }
        if pos == start {
            // lone delimiter such as ')' or '>'
            pos += 1;
        }
        self.pos = pos;

        let bytes = &data[start..pos];
        Ok(match bytes {
            b"true" => Token::Bool(true),
            b"false" => Token::Bool(false),
            _ => Token::Keyword(name_from_bytes(bytes)),
        })
    }

    /// Get next token with its starting position.
    pub fn next_token(&mut self) -> Option<Result<(usize, Token)>> {
        self.skip_whitespace();
        let data = self.data;
        if self.pos >= data.len() {
            return None;
        }

        let token_pos = self.pos;
        let next = data.get(self.pos + 1).copied();

        let result = match data[self.pos] {
            b'/' => self.parse_literal(),
            b'(' => self.parse_string(),
            b'<' if next == Some(b'<') => {
                self.pos += 2;
                Ok(Token::Keyword(SmolStr::new_static("<<")))
            }
            b'<' => self.parse_hex_string(),
            b'>' if next == Some(b'>') => {
                self.pos += 2;
                Ok(Token::Keyword(SmolStr::new_static(">>")))
            }
            c @ (b'[' | b']' | b'{' | b'}') => {
                self.pos += 1;
                Ok(Token::Keyword(name_from_bytes(&[c])))
            }
            b'+' | b'-' if matches!(next, Some(c) if c.is_ascii_digit() || c == b'.') => {
                self.parse_number()
            }
            b'.' if matches!(next, Some(c) if c.is_ascii_digit()) => self.parse_number(),
            c if c.is_ascii_digit() => self.parse_number(),
            _ => self.parse_keyword(),
        };

        Some(result.map(|token| (token_pos, token)))
    }

    /// Reads raw inline-image bytes up to `target` (`EI` or `~>`) followed by
    /// whitespace or end of data, consuming the marker.
    pub fn read_inline_data(&mut self, target: &[u8]) -> Vec<u8> {
        let data = self.data;
        // single whitespace byte after ID
        if matches!(data.get(self.pos), Some(&b) if is_whitespace(b)) {
            self.pos += 1;
        }

        let start = self.pos;
        let mut pos = start;
        while pos < data.len() {
            if data[pos..].starts_with(target) {
                let after = data.get(pos + target.len()).copied();
                let before_ok = target != b"EI" || pos == start || is_whitespace(data[pos - 1]);
                if before_ok && after.is_none_or(is_keyword_end) {
                    let mut end = pos;
                    while end > start && matches!(data[end - 1], b'\r' | b'\n') {
                        end -= 1;
                    }
                    self.pos = pos + target.len();
                    if target != b"EI" {
                        self.skip_past_ei();
                    }
                    return data[start..end].to_vec();
                }
            }
            pos += 1;
        }

        self.pos = data.len();
        data[start..].to_vec()
    }

    /// After an ASCII85 `~>` marker, consumes the trailing `EI`.
    fn skip_past_ei(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if self.data[self.pos..].starts_with(b"EI") {
            self.pos += 2;
        } else {
            self.pos = saved;
        }
    }
}

impl Iterator for ContentLexer<'_> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Check if byte is PDF whitespace.
pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

/// Check if byte is a PDF delimiter.
pub(crate) const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

const fn is_keyword_end(b: u8) -> bool {
    is_whitespace(b) || is_delimiter(b)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn find_line_end(data: &[u8]) -> Option<usize> {
    data.iter().position(|&b| b == b'\r' || b == b'\n')
}

fn name_from_bytes(bytes: &[u8]) -> SmolStr {
    bytes.iter().map(|&b| char::from(b)).collect()
}
