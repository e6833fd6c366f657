//! County FIPS identifier helpers.

/// Width of a county FIPS code (two-digit state + three-digit county).
pub const COUNTY_FIPS_WIDTH: usize = 5;

/// Left-pads an all-digit identifier with zeros to a five-digit county
/// FIPS code.
///
/// Identifiers that contain non-digits, or are already five or more
/// characters long, are returned unchanged.
#[must_use]
pub fn pad_county_fips(id: &str) -> String {
    let trimmed = id.trim();
    if !trimmed.is_empty()
        && trimmed.len() < COUNTY_FIPS_WIDTH
        && trimmed.bytes().all(|b| b.is_ascii_digit())
    {
        format!("{trimmed:0>COUNTY_FIPS_WIDTH$}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_numeric_ids() {
        assert_eq!(pad_county_fips("1001"), "01001");
        assert_eq!(pad_county_fips("12086"), "12086");
        assert_eq!(pad_county_fips(" 6037 "), "06037");
    }

    #[test]
    fn leaves_non_numeric_ids_alone() {
        assert_eq!(pad_county_fips("RegionA"), "RegionA");
        assert_eq!(pad_county_fips(""), "");
    }
}
