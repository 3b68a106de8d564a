use std::fmt;

/// A JavaScript String value.
///
/// Per ECMAScript, strings are sequences of UTF-16 code units and may contain
/// unpaired surrogate code units.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString {
  units: Box<[u16]>,
}

impl JsString {
  pub fn from_code_units(units: &[u16]) -> Self {
    Self::from_u16_vec(units.to_vec())
  }

  pub fn from_u16_vec(units: Vec<u16>) -> Self {
    Self {
      units: units.into_boxed_slice(),
    }
  }

  pub fn from_str(s: &str) -> Self {
    Self::from_u16_vec(s.encode_utf16().collect())
  }

  pub fn len_code_units(&self) -> usize {
    self.units.len()
  }

  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  pub fn as_code_units(&self) -> &[u16] {
    self.units.as_ref()
  }

  pub fn to_utf8_lossy(&self) -> String {
    String::from_utf16_lossy(self.as_code_units())
  }

  /// Parses the string as a canonical array index (`"0"`, `"1"`, ... up to `2^32 - 2`).
  pub fn to_array_index(&self) -> Option<u32> {
    let units = self.as_code_units();
    if units.is_empty() || units.len() > 10 {
      return None;
    }
    if units.len() > 1 && units[0] == u16::from(b'0') {
      return None;
    }
    let mut n: u64 = 0;
    for &unit in units {
      if !(u16::from(b'0')..=u16::from(b'9')).contains(&unit) {
        return None;
      }
      n = n * 10 + u64::from(unit - u16::from(b'0'));
    }
    // 2^32 - 1 is the maximum length, not a valid index.
    if n >= u64::from(u32::MAX) {
      return None;
    }
    Some(n as u32)
  }
}

impl fmt::Debug for JsString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.to_utf8_lossy())
  }
}

#[cfg(test)]
mod tests {
  use super::JsString;

  #[test]
  fn array_index_parsing_rejects_non_canonical_forms() {
    assert_eq!(JsString::from_str("0").to_array_index(), Some(0));
    assert_eq!(JsString::from_str("42").to_array_index(), Some(42));
    assert_eq!(JsString::from_str("4294967294").to_array_index(), Some(4294967294));
    assert_eq!(JsString::from_str("4294967295").to_array_index(), None);
    assert_eq!(JsString::from_str("01").to_array_index(), None);
    assert_eq!(JsString::from_str("").to_array_index(), None);
    assert_eq!(JsString::from_str("1a").to_array_index(), None);
  }
}
