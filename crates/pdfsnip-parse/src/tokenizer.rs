//! Content stream tokenizer.
//!
//! Splits raw PDF content stream bytes into [`Operator`]s, each carrying the
//! [`Operand`]s that preceded it. Only the operand kinds the text and path
//! interpreter consumes are kept distinct; dictionaries (BDC properties) are
//! parsed and dropped, inline image data (BI/ID/EI) is skipped whole.

use crate::error::BackendError;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer or real number.
    Number(f64),
    /// Name object, stored without the leading `/`.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, as decoded bytes.
    Str(Vec<u8>),
    /// Array of operands (e.g., a `TJ` argument).
    Array(Vec<Operand>),
    /// Booleans, `null`, and dictionaries: present but not interpreted.
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// An operator with its preceding operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name (e.g., `"BT"`, `"Tj"`, `"re"`).
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// All operands as numbers, or `None` if any operand is not a number.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        self.operands.iter().map(Operand::as_number).collect()
    }
}

/// Tokenize a content stream.
///
/// Comments are stripped. Stray bytes that cannot start a token are skipped.
///
/// # Errors
///
/// Returns [`BackendError::Interpreter`] for unterminated strings, arrays
/// or dictionaries, and for malformed numbers.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut ops = Vec::new();
    let mut stack: Vec<Operand> = Vec::new();
    let mut pos = 0;

    loop {
        skip_whitespace_and_comments(input, &mut pos);
        let Some(&b) = input.get(pos) else {
            break;
        };

        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                let keyword = parse_keyword(input, &mut pos);
                match keyword.as_str() {
                    "true" | "false" | "null" => stack.push(Operand::Other),
                    "BI" => {
                        skip_inline_image(input, &mut pos)?;
                        stack.clear();
                    }
                    _ => ops.push(Operator {
                        name: keyword,
                        operands: std::mem::take(&mut stack),
                    }),
                }
            }
            b']' | b'>' | b')' | b'{' | b'}' => {
                // Unbalanced delimiter at top level: skip it.
                pos += 1;
            }
            _ => match parse_operand(input, &mut pos)? {
                Some(operand) => stack.push(operand),
                None => pos += 1,
            },
        }
    }

    Ok(ops)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while let Some(&b) = input.get(*pos) {
        if is_whitespace(b) {
            *pos += 1;
        } else if b == b'%' {
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Parse one operand at `pos`. Returns `Ok(None)` if the byte cannot start
/// an operand.
fn parse_operand(input: &[u8], pos: &mut usize) -> Result<Option<Operand>, BackendError> {
    let operand = match input[*pos] {
        b'(' => Operand::Str(parse_literal_string(input, pos)?),
        b'<' if input.get(*pos + 1) == Some(&b'<') => {
            skip_dictionary(input, pos)?;
            Operand::Other
        }
        b'<' => Operand::Str(parse_hex_string(input, pos)?),
        b'[' => {
            *pos += 1;
            Operand::Array(parse_array(input, pos)?)
        }
        b'/' => Operand::Name(parse_name(input, pos)),
        b'0'..=b'9' | b'+' | b'-' | b'.' => Operand::Number(parse_number(input, pos)?),
        _ => return Ok(None),
    };
    Ok(Some(operand))
}

fn parse_literal_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BackendError> {
    *pos += 1; // '('
    let mut out = Vec::new();
    let mut depth = 1u32;

    while let Some(&b) = input.get(*pos) {
        *pos += 1;
        match b {
            b'(' => {
                depth += 1;
                out.push(b);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(out);
                }
                out.push(b);
            }
            b'\\' => {
                let Some(&esc) = input.get(*pos) else {
                    break;
                };
                *pos += 1;
                match esc {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0C),
                    b'\r' => {
                        // Line continuation, optionally CRLF.
                        if input.get(*pos) == Some(&b'\n') {
                            *pos += 1;
                        }
                    }
                    b'\n' => {}
                    b'0'..=b'7' => {
                        let mut val = u32::from(esc - b'0');
                        for _ in 0..2 {
                            match input.get(*pos) {
                                Some(&d @ b'0'..=b'7') => {
                                    val = val * 8 + u32::from(d - b'0');
                                    *pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((val & 0xFF) as u8);
                    }
                    other => out.push(other),
                }
            }
            _ => out.push(b),
        }
    }

    Err(BackendError::Interpreter(
        "unterminated literal string".to_string(),
    ))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn parse_hex_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BackendError> {
    *pos += 1; // '<'
    let mut nibbles = Vec::new();

    while let Some(&b) = input.get(*pos) {
        *pos += 1;
        if b == b'>' {
            if nibbles.len() % 2 != 0 {
                nibbles.push(0);
            }
            return Ok(nibbles.chunks(2).map(|c| (c[0] << 4) | c[1]).collect());
        }
        if is_whitespace(b) {
            continue;
        }
        let nibble = hex_digit(b).ok_or_else(|| {
            BackendError::Interpreter(format!("invalid hex digit: {:?}", b as char))
        })?;
        nibbles.push(nibble);
    }

    Err(BackendError::Interpreter("unterminated hex string".to_string()))
}

/// Parse array elements until `]`. Assumes `[` was consumed.
fn parse_array(input: &[u8], pos: &mut usize) -> Result<Vec<Operand>, BackendError> {
    let mut items = Vec::new();
    loop {
        skip_whitespace_and_comments(input, pos);
        let Some(&b) = input.get(*pos) else {
            return Err(BackendError::Interpreter("unterminated array".to_string()));
        };
        match b {
            b']' => {
                *pos += 1;
                return Ok(items);
            }
            b'a'..=b'z' | b'A'..=b'Z' => {
                let keyword = parse_keyword(input, pos);
                items.push(match keyword.as_str() {
                    "true" | "false" | "null" => Operand::Other,
                    _ => Operand::Name(keyword),
                });
            }
            _ => match parse_operand(input, pos)? {
                Some(operand) => items.push(operand),
                None => {
                    return Err(BackendError::Interpreter(format!(
                        "unexpected byte in array: 0x{b:02X}"
                    )));
                }
            },
        }
    }
}

/// Skip a `<< ... >>` dictionary, including nested ones and strings.
fn skip_dictionary(input: &[u8], pos: &mut usize) -> Result<(), BackendError> {
    *pos += 2; // '<<'
    loop {
        skip_whitespace_and_comments(input, pos);
        let Some(&b) = input.get(*pos) else {
            return Err(BackendError::Interpreter(
                "unterminated dictionary".to_string(),
            ));
        };
        if b == b'>' && input.get(*pos + 1) == Some(&b'>') {
            *pos += 2;
            return Ok(());
        }
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {
                parse_keyword(input, pos);
            }
            _ => {
                if parse_operand(input, pos)?.is_none() {
                    *pos += 1;
                }
            }
        }
    }
}

fn parse_name(input: &[u8], pos: &mut usize) -> String {
    *pos += 1; // '/'
    let start = *pos;
    while *pos < input.len() && !is_whitespace(input[*pos]) && !is_delimiter(input[*pos]) {
        *pos += 1;
    }

    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                name.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }
    String::from_utf8_lossy(&name).into_owned()
}

fn parse_number(input: &[u8], pos: &mut usize) -> Result<f64, BackendError> {
    let start = *pos;
    if matches!(input[*pos], b'+' | b'-') {
        *pos += 1;
    }
    let mut seen_dot = false;
    while let Some(&b) = input.get(*pos) {
        if b.is_ascii_digit() {
            *pos += 1;
        } else if b == b'.' && !seen_dot {
            seen_dot = true;
            *pos += 1;
        } else {
            break;
        }
    }

    let token = std::str::from_utf8(&input[start..*pos])
        .map_err(|_| BackendError::Interpreter("invalid number token".to_string()))?;
    match token {
        // A bare sign or dot reads as zero, like most viewers.
        "+" | "-" | "." | "+." | "-." => Ok(0.0),
        _ => token
            .parse()
            .map_err(|_| BackendError::Interpreter(format!("invalid number: {token}"))),
    }
}

fn parse_keyword(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    while let Some(&b) = input.get(*pos) {
        if b.is_ascii_alphanumeric() || b == b'*' || b == b'\'' || b == b'"' {
            *pos += 1;
        } else {
            break;
        }
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

/// Skip from after `BI` past the matching `EI`.
fn skip_inline_image(input: &[u8], pos: &mut usize) -> Result<(), BackendError> {
    // Dictionary entries up to the ID keyword.
    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::Interpreter(
                "unterminated inline image (missing ID)".to_string(),
            ));
        }
        if input[*pos..].starts_with(b"ID")
            && input.get(*pos + 2).is_none_or(|&b| is_whitespace(b))
        {
            *pos += 3;
            break;
        }
        match input[*pos] {
            b'a'..=b'z' | b'A'..=b'Z' => {
                parse_keyword(input, pos);
            }
            _ => {
                if parse_operand(input, pos)?.is_none() {
                    *pos += 1;
                }
            }
        }
    }

    // Binary data up to whitespace-delimited EI.
    while *pos + 1 < input.len() {
        let preceded = *pos == 0 || is_whitespace(input[*pos - 1]);
        let followed = input
            .get(*pos + 2)
            .is_none_or(|&b| is_whitespace(b) || is_delimiter(b));
        if preceded && followed && &input[*pos..*pos + 2] == b"EI" {
            *pos += 2;
            return Ok(());
        }
        *pos += 1;
    }

    Err(BackendError::Interpreter(
        "unterminated inline image (missing EI)".to_string(),
    ))
}
