//! US state and territory FIPS code utilities.
//!
//! Maps between two-digit state FIPS codes, two-letter postal
//! abbreviations and full names for the 50 states, DC and the five
//! inhabited territories that appear in county boundary files.

/// `(fips, abbreviation, name)` for every state-equivalent.
const STATES: &[(&str, &str, &str)] = &[
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
    ("60", "AS", "American Samoa"),
    ("66", "GU", "Guam"),
    ("69", "MP", "Northern Mariana Islands"),
    ("72", "PR", "Puerto Rico"),
    ("78", "VI", "U.S. Virgin Islands"),
];

/// Two-digit FIPS codes for every known state-equivalent.
#[must_use]
pub fn state_fips_codes() -> impl Iterator<Item = &'static str> {
    STATES.iter().map(|(fips, _, _)| *fips)
}

/// Maps a two-digit FIPS code to its postal abbreviation.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_abbr(fips: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(code, _, _)| *code == fips)
        .map(|(_, abbr, _)| *abbr)
}

/// Maps a two-digit FIPS code to the full state name.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn state_name(fips: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(code, _, _)| *code == fips)
        .map(|(_, _, name)| *name)
}

/// Maps a postal abbreviation (any case) to its two-digit FIPS code.
#[must_use]
pub fn abbr_to_fips(abbr: &str) -> Option<&'static str> {
    let abbr = abbr.trim();
    STATES
        .iter()
        .find(|(_, code, _)| code.eq_ignore_ascii_case(abbr))
        .map(|(fips, _, _)| *fips)
}

/// Resolves a state given either as a postal abbreviation or a full name
/// (any case) to the canonical full name.
///
/// `"GA"`, `"ga"` and `"georgia"` all resolve to `"Georgia"`.
#[must_use]
pub fn state_full_name(abbr_or_name: &str) -> Option<&'static str> {
    let value = abbr_or_name.trim();
    STATES
        .iter()
        .find(|(_, abbr, name)| abbr.eq_ignore_ascii_case(value) || name.eq_ignore_ascii_case(value))
        .map(|(_, _, name)| *name)
}

/// Zero-pads a numeric county FIPS code to five digits.
///
/// Integer-looking values such as `"1001"` or `"1001.0"` (as produced by
/// spreadsheet exports) become `"01001"`. Anything else is returned
/// trimmed but otherwise unchanged.
#[must_use]
pub fn pad_fips(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if !digits.is_empty() && digits.len() <= 5 && digits.chars().all(|c| c.is_ascii_digit()) {
        format!("{digits:0>5}")
    } else {
        trimmed.to_string()
    }
}

/// Whether `fips` is a usable county code: exactly five ASCII digits and
/// not the `"00000"` placeholder.
#[must_use]
pub fn is_valid_county_fips(fips: &str) -> bool {
    fips.len() == 5 && fips.chars().all(|c| c.is_ascii_digit()) && fips != "00000"
}
