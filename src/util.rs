//! Small utility helpers used across modules.

/// Normalize free text for matching: trim surrounding whitespace and
/// lower-case. `to_lowercase` only affects cased scripts, so CJK text is
/// compared by raw substring containment downstream.
pub fn normalize_text(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Unix timestamp in milliseconds. Clock errors collapse to 0 rather than
/// aborting; the value is informational only.
pub fn now_ms() -> u64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads; cuts on char
/// boundaries so CJK text survives.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    return s.to_string();
  }
  let cut: String = s.chars().take(max_chars).collect();
  format!("{}… ({} chars total)", cut, s.chars().count())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trunc_keeps_char_boundaries() {
    let s = "四十三是一个中文数字";
    let t = trunc_for_log(s, 4);
    assert!(t.starts_with("四十三是"));
    assert!(t.contains("10 chars total"));
  }

  #[test]
  fn normalize_trims_and_lowercases() {
    assert_eq!(normalize_text("  Apple派  "), "apple派");
  }
}
