use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

// Date and time without an offset, read as UTC. The
// fraction is optional with %.f.
const NAIVE_FORMATS: [&str; 2] = [
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S%.f"
];

// RFC 3339 with a fixed width (milliseconds, "Z" suffix)
// so that these strings sort the same way as the instants
// they represent. created_at ordering relies on it.
pub fn current_timestamp() -> String {
  format_timestamp(Utc::now())
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Brings a timestamp from elsewhere (an import file) to
// the format of current_timestamp(). Offsets are converted
// to UTC. Returns None for anything that isn't a date.
pub fn normalize_timestamp(value: &str) -> Option<String> {
  let value = value.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(format_timestamp(dt.with_timezone(&Utc)));
  }
  NAIVE_FORMATS.iter()
    .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
    .map(|naive| format_timestamp(naive.and_utc()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_timestamp_is_parseable_utc() {
    let ts = current_timestamp();
    assert!(ts.ends_with('Z'));
    assert_eq!(ts.len(), "2026-10-17T10:00:00.000Z".len());
    assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
  }

  #[test]
  fn later_timestamps_sort_after_earlier_ones() {
    let first = current_timestamp();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = current_timestamp();
    assert!(second > first);
  }

  #[test]
  fn normalized_timestamps_keep_canonical_values() {
    assert_eq!(
      Some("2026-01-01T00:00:00.000Z".to_string()),
      normalize_timestamp("2026-01-01T00:00:00.000Z")
    );
  }

  #[test]
  fn sqlite_style_timestamps_are_read_as_utc() {
    assert_eq!(
      Some("2024-03-05T10:20:30.000Z".to_string()),
      normalize_timestamp("2024-03-05 10:20:30")
    );
    assert_eq!(
      Some("2024-03-05T10:20:30.250Z".to_string()),
      normalize_timestamp("2024-03-05 10:20:30.25")
    );
  }

  #[test]
  fn offsets_are_converted_to_utc() {
    assert_eq!(
      Some("2024-03-05T08:20:30.000Z".to_string()),
      normalize_timestamp("2024-03-05T10:20:30+02:00")
    );
    assert_eq!(
      Some("2024-03-05T10:20:30.000Z".to_string()),
      normalize_timestamp("2024-03-05T10:20:30Z")
    );
  }

  #[test]
  fn mixed_formats_sort_in_time_order() {
    let earlier = normalize_timestamp("2024-03-05 23:00:00").unwrap();
    let later = normalize_timestamp("2024-03-06T00:30:00+01:00").unwrap();
    // 2024-03-05T23:30:00Z, half an hour after the first.
    assert!(later > earlier);
  }

  #[test]
  fn garbage_is_not_a_timestamp() {
    assert_eq!(None, normalize_timestamp("yesterday"));
    assert_eq!(None, normalize_timestamp("2024-13-01 00:00:00"));
  }
}
