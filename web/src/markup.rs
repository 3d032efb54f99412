use piano_core::{KeyColor, KeySpec};

pub const ACTIVE_CLASS: &str = "active";
pub const NOTE_ATTRIBUTE: &str = "data-note";

/// Class list of a key element.
pub fn key_class(color: KeyColor) -> &'static str {
    match color {
        KeyColor::White => "key white",
        KeyColor::Black => "key black",
    }
}

pub fn px(value: f32) -> String {
    format!("{}px", value)
}

/// Inline style properties for one key, in the order they are set.
pub fn key_style(key: &KeySpec) -> [(&'static str, String); 3] {
    [
        ("left", px(key.left)),
        ("width", px(key.width)),
        ("height", px(key.height)),
    ]
}

/// Text printed on a key: its bound character, shown upper case.
pub fn key_label(key: &KeySpec) -> Option<String> {
    key.binding.map(|c| c.to_uppercase().collect())
}

/// Maps a `Math.random()` draw onto the full seed range.
pub fn seed_from_unit(unit: f64) -> u64 {
    (unit.clamp(0.0, 1.0) * u64::MAX as f64) as u64
}

/// `setTimeout` delay for a duration in seconds.
pub fn timeout_millis(secs: f64) -> i32 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * 1000.0).ceil().min(i32::MAX as f64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use piano_core::{KeyboardLayout, PianoConfig};

    fn layout() -> KeyboardLayout {
        KeyboardLayout::build(&PianoConfig::default())
    }

    #[test]
    fn classes_by_color() {
        assert_eq!(key_class(KeyColor::White), "key white");
        assert_eq!(key_class(KeyColor::Black), "key black");
    }

    #[test]
    fn black_key_style() {
        let layout = layout();
        let key = layout.key("C#3".parse().unwrap()).unwrap();
        let style = key_style(key);
        assert_eq!(style[0], ("left", "28px".to_string()));
        assert_eq!(style[1], ("width", "24px".to_string()));
        assert_eq!(style[2], ("height", "100px".to_string()));
    }

    #[test]
    fn fractional_offsets_survive() {
        assert_eq!(px(12.5), "12.5px");
        assert_eq!(px(0.0), "0px");
    }

    #[test]
    fn labels_are_upper_case() {
        let layout = layout();
        let c3 = layout.key("C3".parse().unwrap()).unwrap();
        assert_eq!(key_label(c3).as_deref(), Some("A"));
        let semicolon = layout.key("E4".parse().unwrap()).unwrap();
        assert_eq!(key_label(semicolon).as_deref(), Some(";"));
        let c7 = layout.key("C7".parse().unwrap()).unwrap();
        assert_eq!(key_label(c7), None);
    }

    #[test]
    fn seeds_span_the_range() {
        assert_eq!(seed_from_unit(0.0), 0);
        assert!(seed_from_unit(0.5) > u64::MAX / 4);
        assert_eq!(seed_from_unit(-1.0), 0);
    }

    #[test]
    fn timeouts_round_up() {
        assert_eq!(timeout_millis(0.3), 300);
        assert_eq!(timeout_millis(0.0005), 1);
        assert_eq!(timeout_millis(-1.0), 0);
        assert_eq!(timeout_millis(f64::NAN), 0);
    }
}
