use crate::error::ValidationError;

/// Parse a step duration written as plain seconds (`45`) or `MM:SS`
/// (`1:30`, `:20`, `2:`). Missing parts count as zero.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDuration`] for anything else, including
/// seconds above 59 in the `MM:SS` form and a total of zero.
pub fn parse_duration(input: &str) -> Result<u32, ValidationError> {
    let input = input.trim();
    let invalid = || ValidationError::InvalidDuration(input.to_string());

    let total = match input.split_once(':') {
        None => parse_part(input, u32::MAX).ok_or_else(invalid)?,
        Some((minutes, seconds)) => {
            if minutes.is_empty() && seconds.is_empty() {
                return Err(invalid());
            }
            let minutes = if minutes.is_empty() {
                0
            } else {
                parse_part(minutes, 99).ok_or_else(invalid)?
            };
            let seconds = if seconds.is_empty() {
                0
            } else {
                parse_part(seconds, 59).ok_or_else(invalid)?
            };
            minutes * 60 + seconds
        }
    };

    if total == 0 {
        return Err(invalid());
    }
    Ok(total)
}

fn parse_part(part: &str, max: u32) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse::<u32>().ok().filter(|v| *v <= max)
}
