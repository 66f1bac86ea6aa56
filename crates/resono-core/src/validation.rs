//! Input validation for the analytics/recommendation read surface.

use crate::error::AppError;

/// Analytics window expressed as a whole number of months, parsed from the
/// `"<n>m"` query format. Defaults to 6 months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    months: u32,
}

impl Period {
    pub const DEFAULT_MONTHS: u32 = 6;

    pub fn months(&self) -> u32 {
        self.months
    }

    /// Parse an optional `"<n>m"` parameter; `None` yields the default.
    /// Anything else (missing suffix, non-numeric, zero) is a client error.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw else {
            return Ok(Self {
                months: Self::DEFAULT_MONTHS,
            });
        };
        let digits = raw
            .strip_suffix('m')
            .ok_or_else(|| AppError::InvalidInput(format!("invalid period: {raw:?}")))?;
        let months: u32 = digits
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("invalid period: {raw:?}")))?;
        if months == 0 {
            return Err(AppError::InvalidInput(format!("invalid period: {raw:?}")));
        }
        Ok(Self { months })
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            months: Self::DEFAULT_MONTHS,
        }
    }
}

/// Global statistics accepts only 1-3 day windows.
pub fn validate_stat_days(days: i64) -> Result<i64, AppError> {
    if (1..=3).contains(&days) {
        Ok(days)
    } else {
        Err(AppError::InvalidInput(format!(
            "days must be 1, 2 or 3, got {days}"
        )))
    }
}
