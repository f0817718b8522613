use alloc::format;
use alloc::string::String;
use core::str;

/// A parsed FITS header value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// FITS logical value (`T` or `F`).
    Logical(bool),
    /// FITS integer value.
    Integer(i64),
    /// FITS floating-point value.
    Float(f64),
    /// FITS character string, trailing padding removed.
    String(String),
}

impl Value {
    /// Numeric view of the value; integers are promoted to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of the value; floats are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Cut a non-string value field at its ` /` comment separator.
///
/// IDL and friends write `/comment` with no trailing space, so only the
/// leading space is required.
fn strip_comment(field: &[u8]) -> &[u8] {
    field
        .windows(2)
        .position(|w| w == b" /")
        .map_or(field, |i| &field[..i])
}

/// Parse a quoted string value. Doubled quotes stand for a literal `'`.
fn parse_string(field: &[u8]) -> Value {
    let mut out = String::new();
    let mut i = 1;
    while i < field.len() {
        match field[i] {
            b'\'' if field.get(i + 1) == Some(&b'\'') => {
                out.push('\'');
                i += 2;
            }
            b'\'' => break,
            b => {
                out.push(b as char);
                i += 1;
            }
        }
    }
    Value::String(String::from(out.trim_end()))
}

fn parse_float_str(s: &str) -> Option<f64> {
    s.replace(['D', 'd'], "E").parse::<f64>().ok()
}

/// Parse the 70-byte value field of a card (bytes 10..80).
///
/// Returns `None` for an empty field or text that is none of the supported
/// value kinds. Complex values are not needed for coordinate lookup and are
/// treated as unparseable.
pub fn parse_value(value_bytes: &[u8]) -> Option<Value> {
    let start = value_bytes.iter().position(|&b| b != b' ')?;
    if value_bytes[start] == b'\'' {
        return Some(parse_string(&value_bytes[start..]));
    }

    let text = str::from_utf8(strip_comment(value_bytes)).ok()?.trim();
    match text {
        "" => None,
        "T" => Some(Value::Logical(true)),
        "F" => Some(Value::Logical(false)),
        _ if !text.contains(['.', 'E', 'e', 'D', 'd']) => {
            text.parse::<i64>().ok().map(Value::Integer)
        }
        _ => parse_float_str(text).map(Value::Float),
    }
}

/// Serialize a [`Value`] into a 70-byte value field.
///
/// Numbers and logicals are right-justified in the first 20 bytes (card
/// columns 11-30); strings start with a quote at byte 0.
pub fn format_value(value: &Value) -> [u8; 70] {
    let mut buf = [b' '; 70];
    match value {
        Value::Logical(b) => buf[19] = if *b { b'T' } else { b'F' },
        Value::Integer(n) => right_justify(format!("{n}").as_bytes(), &mut buf[..20]),
        Value::Float(f) => right_justify(format_float(*f).as_bytes(), &mut buf[..20]),
        Value::String(s) => write_string(s, &mut buf),
    }
    buf
}

fn right_justify(src: &[u8], dest: &mut [u8]) {
    let len = src.len().min(dest.len());
    let start = dest.len() - len;
    dest[start..].copy_from_slice(&src[..len]);
}

/// Shortest exponent form that round-trips, shortened further only when it
/// would overflow the 20-column fixed-format slot.
fn format_float(f: f64) -> String {
    let exact = format!("{f:E}");
    let exact = if exact.contains('.') {
        exact
    } else {
        exact.replacen('E', ".0E", 1)
    };
    if exact.len() <= 20 {
        return exact;
    }
    let mut precision = 15usize;
    loop {
        let s = format!("{f:.precision$E}");
        if s.len() <= 20 || precision == 0 {
            return s;
        }
        precision -= 1;
    }
}

fn write_string(s: &str, buf: &mut [u8; 70]) {
    buf[0] = b'\'';
    let mut pos = 1;
    for ch in s.bytes() {
        let needed = if ch == b'\'' { 2 } else { 1 };
        if pos + needed >= 70 {
            break;
        }
        buf[pos] = ch;
        if ch == b'\'' {
            buf[pos + 1] = b'\'';
        }
        pos += needed;
    }
    // Strings are padded to at least eight characters.
    buf[pos.max(9)] = b'\'';
}
