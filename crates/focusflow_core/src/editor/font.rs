//! Font size bounds and font family choices for the editor toolbar.

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 100;
/// Increment used by the size stepping buttons.
pub const FONT_SIZE_STEP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFamily {
    pub name: &'static str,
    pub value: &'static str,
}

pub const FONT_FAMILIES: [FontFamily; 5] = [
    FontFamily {
        name: "Default",
        value: "var(--font-body)",
    },
    FontFamily {
        name: "Serif",
        value: "serif",
    },
    FontFamily {
        name: "Sans-Serif",
        value: "sans-serif",
    },
    FontFamily {
        name: "Monospace",
        value: "monospace",
    },
    FontFamily {
        name: "Cursive",
        value: "cursive",
    },
];

pub fn clamp_font_size(requested: i64) -> u32 {
    let clamped = requested.clamp(i64::from(MIN_FONT_SIZE), i64::from(MAX_FONT_SIZE));
    u32::try_from(clamped).unwrap_or(MIN_FONT_SIZE)
}

/// Leading integer of a size field, `parseInt`-style (`"14px"` is 14).
pub fn parse_font_size_input(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate instead of failing.
    let value = digits[..end].bytes().fold(0_i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(sign * i64::from(digit - b'0'))
    });
    Some(value)
}

/// Toolbar label for a stored family value.
pub fn font_family_name(value: &str) -> Option<&'static str> {
    FONT_FAMILIES
        .iter()
        .find(|family| family.value == value)
        .map(|family| family.name)
}
