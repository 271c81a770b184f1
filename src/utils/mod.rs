pub mod text_utils;
pub mod time_utils;

// The admin client sends empty strings for form
// fields that were left alone. Some of these have
// to become NULL in database.
pub fn non_empty(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}
