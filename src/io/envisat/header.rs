//! ASCII `KEY=VALUE` headers (MPH, SPH and DSD blocks).

use super::ProductError;

/// One header entry. Quoted values keep their inner padding; units written as
/// `<unit>` after the value are split off.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderField {
    pub key: String,
    pub value: String,
    pub unit: Option<String>,
    pub quoted: bool,
}

/// Ordered list of header entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: Vec<HeaderField>,
}

impl Header {
    /// Parse a header block. Lines without `=` (spares, padding) are skipped.
    pub fn parse(block: &[u8]) -> Self {
        let text = String::from_utf8_lossy(block);
        let fields = text
            .split('\n')
            .filter_map(parse_line)
            .collect();
        Header { fields }
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&HeaderField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Trimmed value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.field(key).map(|f| f.value.trim())
    }

    pub fn require(&self, key: &'static str) -> Result<&str, ProductError> {
        self.get(key).ok_or(ProductError::MissingField(key))
    }

    /// Signed integer value such as `+00000000000000012345`
    pub fn get_int(&self, key: &'static str) -> Result<i64, ProductError> {
        let raw = self.require(key)?;
        parse_signed(raw).ok_or_else(|| ProductError::Parse(format!("{key}: not an integer: {raw:?}")))
    }

    /// Non-negative integer value usable as a size or offset
    pub fn get_size(&self, key: &'static str) -> Result<u64, ProductError> {
        let value = self.get_int(key)?;
        u64::try_from(value).map_err(|_| ProductError::Parse(format!("{key}: negative value {value}")))
    }
}

pub(crate) fn parse_signed(raw: &str) -> Option<i64> {
    raw.trim().trim_start_matches('+').parse::<i64>().ok()
}

fn parse_line(line: &str) -> Option<HeaderField> {
    let (key, rest) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    if let Some(stripped) = rest.strip_prefix('"') {
        let value = match stripped.find('"') {
            Some(end) => &stripped[..end],
            None => stripped,
        };
        return Some(HeaderField {
            key: key.to_string(),
            value: value.to_string(),
            unit: None,
            quoted: true,
        });
    }

    let rest = rest.trim_end_matches(['\r', ' ']);
    let (value, unit) = match rest.find('<') {
        Some(start) => {
            let unit = rest[start + 1..].trim_end_matches('>');
            (&rest[..start], Some(unit.to_string()))
        }
        None => (rest, None),
    };

    Some(HeaderField {
        key: key.to_string(),
        value: value.to_string(),
        unit,
        quoted: false,
    })
}
