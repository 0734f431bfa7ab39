//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Number of whitespace-separated words; empty tokens are discarded,
/// so any amount of surrounding or internal whitespace counts the same.
pub fn word_count(text: &str) -> usize {
  text.split_whitespace().count()
}

/// Human label for a timer duration, e.g. "45s", "2m", "1m 30s".
pub fn format_timer_label(seconds: u32) -> String {
  if seconds < 60 {
    return format!("{}s", seconds);
  }
  let mins = seconds / 60;
  let secs = seconds % 60;
  if secs > 0 { format!("{}m {}s", mins, secs) } else { format!("{}m", mins) }
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
      cut -= 1;
    }
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} and {a} with {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x with y");
  }

  #[test]
  fn word_count_ignores_extra_whitespace() {
    assert_eq!(word_count(""), 0);
    assert_eq!(word_count("   "), 0);
    assert_eq!(word_count("one"), 1);
    assert_eq!(word_count("  two\n words \t here "), 3);
  }

  #[test]
  fn timer_labels() {
    assert_eq!(format_timer_label(45), "45s");
    assert_eq!(format_timer_label(60), "1m");
    assert_eq!(format_timer_label(90), "1m 30s");
    assert_eq!(format_timer_label(300), "5m");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let out = trunc_for_log(&"x".repeat(50), 10);
    assert!(out.starts_with("xxxxxxxxxx…"));
    assert!(out.ends_with("(50 bytes total)"));
    // never split a multibyte char
    let out = trunc_for_log("héllo wörld", 2);
    assert!(out.starts_with("h…"));
  }
}
