//! Administrative code arithmetic.
//!
//! Codes are decimal-digit strings compared as opaque text: the first 2
//! characters name the province, the first 4 the city, the first 6 the county.
//! Leading zeros are significant, so nothing here parses codes as numbers.

use crate::error::CodeError;
use crate::models::RegionLevel;

/// Leading characters of `code` identifying its ancestor at `level`.
///
/// Lengths are counted in characters, not bytes.
pub fn prefix(code: &str, level: RegionLevel) -> Result<&str, CodeError> {
    let len = level.prefix_len();
    let malformed = || CodeError::Malformed {
        code: code.to_string(),
        expected: len,
    };

    let mut boundaries = code.char_indices().map(|(i, _)| i).chain(std::iter::once(code.len()));
    let end = boundaries.nth(len).ok_or_else(malformed)?;
    Ok(&code[..end])
}

pub fn province_prefix(code: &str) -> Result<&str, CodeError> {
    prefix(code, RegionLevel::Province)
}

pub fn city_prefix(code: &str) -> Result<&str, CodeError> {
    prefix(code, RegionLevel::City)
}

pub fn county_prefix(code: &str) -> Result<&str, CodeError> {
    prefix(code, RegionLevel::County)
}

/// Non-empty and ASCII digits only.
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

/// Code of the placeholder city synthesized under a direct-administration unit.
pub fn municipal_district_code(province_code: &str) -> String {
    format!("{}01", province_code)
}
