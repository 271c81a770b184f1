use actix_web::{
  http::header,
  HttpRequest
};
use subtle::ConstantTimeEq;

// Extracting Actix header values is kinda convoluted,
// a value that isn't valid visible ASCII is just
// treated as missing. The scheme is case-insensitive.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req.headers().get(header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|v| v.trim().split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
}

// Length mismatches are rejected without looking at
// the content, equal lengths compare every byte.
pub fn tokens_match(given: &str, expected: &str) -> bool {
  given.as_bytes().ct_eq(expected.as_bytes()).into()
}
