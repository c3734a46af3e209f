use crate::error::{Result, TranslateError};

/// Returns the first balanced `{...}` object found in `text`.
///
/// Models often wrap their JSON in prose or markdown fences, so this only
/// tracks brace depth outside string literals and stops at the first point
/// where the depth returns to zero. Nothing is validated beyond balance.
pub fn extract_json_object(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed);
    }

    let start = trimmed
        .find('{')
        .ok_or_else(|| TranslateError::Extraction {
            raw: text.to_string(),
        })?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in trimmed[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&trimmed[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(TranslateError::UnterminatedObject {
        raw: text.to_string(),
    })
}
