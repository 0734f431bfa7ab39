//! Custom persona sanitization.
//!
//! The persona string ends up inside the scoring instruction sent to the
//! oracle, so it is reduced to a harmless character set before use.

use crate::catalog::MAX_PERSONA_LENGTH;

fn is_allowed(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | ',' | '.' | '\'')
}

/// Clean a free-text persona: truncate to `MAX_PERSONA_LENGTH` characters
/// first, keep only letters/digits/spaces/hyphens/commas/periods/apostrophes,
/// collapse whitespace runs, trim. Always returns a string, possibly empty.
pub fn sanitize_persona(persona: &str) -> String {
  let truncated: String = persona.chars().take(MAX_PERSONA_LENGTH).collect();
  let filtered: String = truncated.trim().chars().filter(|c| is_allowed(*c)).collect();
  filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_and_whitespace_yield_empty() {
    assert_eq!(sanitize_persona(""), "");
    assert_eq!(sanitize_persona("   \t\n "), "");
  }

  #[test]
  fn strips_disallowed_characters() {
    assert_eq!(
      sanitize_persona("a hacker <script>alert(\"xss\")</script>"),
      "a hacker scriptalertxssscript"
    );
    assert_eq!(sanitize_persona("grandma, age 80 - retired."), "grandma, age 80 - retired.");
  }

  #[test]
  fn collapses_whitespace_runs() {
    assert_eq!(sanitize_persona("a   curious \n teenager"), "a curious teenager");
  }

  #[test]
  fn truncates_before_filtering() {
    let long = "x".repeat(80);
    assert_eq!(sanitize_persona(&long).len(), MAX_PERSONA_LENGTH);
  }

  #[test]
  fn idempotent() {
    for input in ["  a grandmother learning   tech!! ", "plain persona", "<<<>>>", ""] {
      let once = sanitize_persona(input);
      assert_eq!(sanitize_persona(&once), once);
    }
  }

  #[test]
  fn never_longer_than_input_or_cap() {
    for input in ["short", "  padded  input  with   gaps  ", &"y".repeat(200)] {
      let out = sanitize_persona(input);
      assert!(out.chars().count() <= input.chars().count());
      assert!(out.chars().count() <= MAX_PERSONA_LENGTH);
    }
  }
}
