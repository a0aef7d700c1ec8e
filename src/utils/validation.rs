use validator::Validate;

use crate::error::Result;

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate()?;
    Ok(())
}

/// Trims and drops empty strings, for "blank means not provided" fields.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
