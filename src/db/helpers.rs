/**
 * Generate "?, ?, ?" for a VALUES clause
 */
pub fn generate_placeholders(count: usize) -> String {
  vec!["?"; count].join(", ")
}

pub fn generate_field_equal_qmark(name: &str) -> String {
  format!("{} = ?", name)
}

/**
 * Generate the "a = ?, b = ?" part of an UPDATE
 */
pub fn generate_set_clause(fields: &[&str]) -> String {
  fields.iter()
    .map(|f| generate_field_equal_qmark(f))
    .collect::<Vec<String>>()
    .join(", ")
}
