use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

lazy_static! {
  static ref LENGTH: Regex = Regex::new(r"^(-?\d+(?:\.\d+)?)(px|%)?$").unwrap_or_else(|e| panic!("{e}"));
}

/// A single margin length. Terminal hosts treat one `px` as one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
  Px(f64),
  Percent(f64),
}

impl Default for Length {
  fn default() -> Self {
    Length::Px(0.0)
  }
}

impl Length {
  /// Resolves the length against `basis` cells, rounding to the nearest cell.
  pub fn resolve(self, basis: usize) -> i64 {
    match self {
      Length::Px(px) => px.round() as i64,
      Length::Percent(pct) => (basis as f64 * pct / 100.0).round() as i64,
    }
  }
}

impl FromStr for Length {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let captures = LENGTH.captures(s).ok_or_else(|| format!("{s:?} is not a length"))?;
    let value: f64 = captures[1].parse().map_err(|e| format!("{s:?}: {e}"))?;
    match captures.get(2).map(|unit| unit.as_str()) {
      Some("px") => Ok(Length::Px(value)),
      Some("%") => Ok(Length::Percent(value)),
      None if value == 0.0 => Ok(Length::Px(0.0)),
      _ => Err(format!("{s:?} needs a px or % unit")),
    }
  }
}

/// Grows (or shrinks, when negative) the viewport before intersections are
/// computed. Parsed from CSS margin shorthand: `"10px"`, `"10px 0px"`,
/// `"10px 0px 5%"` or `"1px 2px 3px 4px"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
  pub top: Length,
  pub right: Length,
  pub bottom: Length,
  pub left: Length,
}

impl FromStr for RootMargin {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = |reason: String| Error::InvalidRootMargin { input: s.to_string(), reason };
    let lengths = s.split_whitespace().map(Length::from_str).collect::<Result<Vec<_>, _>>().map_err(invalid)?;

    match lengths[..] {
      [all] => Ok(RootMargin { top: all, right: all, bottom: all, left: all }),
      [vertical, horizontal] => Ok(RootMargin { top: vertical, right: horizontal, bottom: vertical, left: horizontal }),
      [top, horizontal, bottom] => Ok(RootMargin { top, right: horizontal, bottom, left: horizontal }),
      [top, right, bottom, left] => Ok(RootMargin { top, right, bottom, left }),
      _ => Err(invalid(format!("expected 1 to 4 lengths, found {}", lengths.len()))),
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_single_value_applies_to_all_sides() {
    let margin: RootMargin = "10px".parse().unwrap();

    assert_eq!(margin, RootMargin {
      top: Length::Px(10.0),
      right: Length::Px(10.0),
      bottom: Length::Px(10.0),
      left: Length::Px(10.0)
    });
  }

  #[test]
  fn test_shorthand_expansion() {
    let two: RootMargin = "5px 20%".parse().unwrap();
    assert_eq!(two.top, Length::Px(5.0));
    assert_eq!(two.bottom, Length::Px(5.0));
    assert_eq!(two.left, Length::Percent(20.0));

    let three: RootMargin = "1px 2px 3px".parse().unwrap();
    assert_eq!(three.top, Length::Px(1.0));
    assert_eq!(three.right, Length::Px(2.0));
    assert_eq!(three.bottom, Length::Px(3.0));
    assert_eq!(three.left, Length::Px(2.0));

    let four: RootMargin = "1px 2px 3px -4px".parse().unwrap();
    assert_eq!(four.left, Length::Px(-4.0));
  }

  #[test]
  fn test_bare_zero_is_allowed() {
    let margin: RootMargin = "0".parse().unwrap();

    assert_eq!(margin, RootMargin::default());
  }

  #[test]
  fn test_unitless_non_zero_is_rejected() {
    let result = "12".parse::<RootMargin>();

    assert!(matches!(result, Err(Error::InvalidRootMargin { .. })));
  }

  #[test]
  fn test_empty_and_too_many_values_are_rejected() {
    assert!("".parse::<RootMargin>().is_err());
    assert!("1px 1px 1px 1px 1px".parse::<RootMargin>().is_err());
    assert!("1em".parse::<RootMargin>().is_err());
  }

  #[test]
  fn test_resolve_percent_against_basis() {
    assert_eq!(Length::Percent(50.0).resolve(20), 10);
    assert_eq!(Length::Px(3.4).resolve(20), 3);
    assert_eq!(Length::Px(-2.0).resolve(20), -2);
  }
}
