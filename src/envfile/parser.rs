//! Line parser for `KEY=VALUE` files

use crate::domain::EnvMap;
use crate::error::{LineErrorKind, ParseError};

const BOM: char = '\u{feff}';

/// Parse env-file content into a mapping.
///
/// Blank lines and lines starting with `#` are skipped. Each remaining line is
/// split on its first `=`; key and value are trimmed and one layer of matching
/// quotes is removed from the value. A duplicate key keeps its last value.
pub fn parse_env_str(content: &str) -> Result<EnvMap, ParseError> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut vars = EnvMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseError { line: idx + 1, kind: LineErrorKind::MissingSeparator });
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError { line: idx + 1, kind: LineErrorKind::EmptyKey });
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    Ok(vars)
}

/// Strip one pair of matching `"` or `'` around `value`.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
