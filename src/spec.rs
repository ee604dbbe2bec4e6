//! Boundary parsing of stamp placement parameters
//!
//! The interactive shell (CLI, GUI, ...) hands us page number, coordinates
//! and font size as raw strings. They are parsed and validated here, once,
//! before any document I/O happens; the rest of the crate only ever sees a
//! typed [`TargetSpec`].

use crate::error::{Error, Result};

/// Where and how large to stamp text: 1-based page number, position in
/// points from the bottom-left page corner, and font size in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    /// Target page, 1-based
    pub page_number: usize,
    /// Horizontal position in points (origin bottom-left)
    pub x: i32,
    /// Vertical position in points (origin bottom-left)
    pub y: i32,
    /// Font size in points
    pub font_size: i32,
}

impl TargetSpec {
    /// Parse raw form-field strings into a spec.
    ///
    /// Each field must be a base-10 integer; surrounding whitespace is
    /// tolerated. Page bounds are checked later against the loaded
    /// document via [`TargetSpec::check_page_bounds`].
    pub fn parse(page_number: &str, x: &str, y: &str, font_size: &str) -> Result<Self> {
        Ok(Self {
            page_number: parse_int(page_number, "page number")?,
            x: parse_int(x, "x coordinate")?,
            y: parse_int(y, "y coordinate")?,
            font_size: parse_int(font_size, "font size")?,
        })
    }

    /// Verify `page_number` lies in `[1, page_count]`.
    pub fn check_page_bounds(&self, page_count: usize) -> Result<()> {
        if self.page_number < 1 || self.page_number > page_count {
            return Err(Error::PageOutOfRange {
                page: self.page_number,
                page_count,
            });
        }
        Ok(())
    }
}

fn parse_int<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let spec = TargetSpec::parse("2", "100", "700", "12").unwrap();
        assert_eq!(spec.page_number, 2);
        assert_eq!(spec.x, 100);
        assert_eq!(spec.y, 700);
        assert_eq!(spec.font_size, 12);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let spec = TargetSpec::parse(" 1 ", "0", " -20", "12\n").unwrap();
        assert_eq!(spec.page_number, 1);
        assert_eq!(spec.x, 0);
        assert_eq!(spec.y, -20);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let result = TargetSpec::parse("two", "100", "700", "12");
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidNumber { field: "page number", .. }
        ));

        let result = TargetSpec::parse("2", "100", "7.5", "12");
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidNumber { field: "y coordinate", .. }
        ));
    }

    #[test]
    fn test_parse_rejects_negative_page() {
        assert!(TargetSpec::parse("-1", "0", "0", "12").is_err());
    }

    #[test]
    fn test_page_bounds() {
        let spec = |page| TargetSpec { page_number: page, x: 0, y: 0, font_size: 12 };

        assert!(spec(1).check_page_bounds(3).is_ok());
        assert!(spec(3).check_page_bounds(3).is_ok());

        assert!(matches!(
            spec(0).check_page_bounds(3).unwrap_err(),
            Error::PageOutOfRange { page: 0, page_count: 3 }
        ));
        assert!(matches!(
            spec(4).check_page_bounds(3).unwrap_err(),
            Error::PageOutOfRange { page: 4, page_count: 3 }
        ));
    }
}
