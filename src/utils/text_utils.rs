use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
  // Only ASCII word characters survive, accented letters
  // are dropped rather than transliterated.
  static ref UNSAFE_CHARS: Regex = Regex::new(
    r"[^A-Za-z0-9_\s-]"
  ).unwrap();
  static ref SEPARATORS: Regex = Regex::new(
    r"[\s_-]+"
  ).unwrap();
}

/**
 * Turns an article title into the identifier used in URLs.
 * Has to stay a pure function, slugs of existing rows are
 * expected to be reproducible from their title.
 */
pub fn slugify(title: &str) -> String {
  let lowered = title.to_lowercase();
  let stripped = UNSAFE_CHARS.replace_all(lowered.trim(), "");
  let hyphenated = SEPARATORS.replace_all(&stripped, "-");
  hyphenated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_removes_punctuation() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
  }

  #[test]
  fn slugify_collapses_separators_and_trims_hyphens() {
    assert_eq!(slugify("  --Multi   Space--  "), "multi-space");
    assert_eq!(slugify("snake_case and-kebab"), "snake-case-and-kebab");
  }

  #[test]
  fn slugify_drops_non_ascii_letters() {
    assert_eq!(slugify("Café crème"), "caf-crme");
  }

  #[test]
  fn slugify_can_produce_empty_string() {
    assert_eq!(slugify("!!! ???"), "");
    assert_eq!(slugify(""), "");
  }

  #[test]
  fn slugify_is_idempotent() {
    let titles = [
      "Hello, World!",
      "  --Multi   Space--  ",
      "Rust 2024: what's new?",
      "a_b__c--d  e",
      "-_-",
      "Déjà vu, encore"
    ];
    for title in titles.iter() {
      let once = slugify(title);
      assert_eq!(slugify(&once), once, "title: {}", title);
    }
  }
}
