//! Expiry date fallback policy.
//!
//! 1. A printed expiry date always wins.
//! 2. Only a manufacturing date visible: expiry = manufactured + 3 years.
//! 3. No date at all: expiry = today + 6 months.

use chrono::{Months, NaiveDate};

/// Shelf life assumed when only a manufacturing date is printed.
pub const SHELF_LIFE_MONTHS: u32 = 36;

/// Safety horizon used when no date is printed at all.
pub const UNDATED_HORIZON_MONTHS: u32 = 6;

/// How an expiry date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySource {
    Printed,
    FromManufactureDate,
    Estimated,
}

/// A resolved expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedExpiry {
    pub date: NaiveDate,
    pub source: ExpirySource,
}

impl ResolvedExpiry {
    /// True when the date was not read directly off the package.
    pub fn is_estimated(&self) -> bool {
        self.source != ExpirySource::Printed
    }
}

/// Resolve the expiry date from whatever dates were visible on the package.
pub fn resolve_expiry(
    printed: Option<NaiveDate>,
    manufactured: Option<NaiveDate>,
    today: NaiveDate,
) -> ResolvedExpiry {
    if let Some(date) = printed {
        return ResolvedExpiry {
            date,
            source: ExpirySource::Printed,
        };
    }

    if let Some(date) = manufactured.and_then(|m| m.checked_add_months(Months::new(SHELF_LIFE_MONTHS))) {
        return ResolvedExpiry {
            date,
            source: ExpirySource::FromManufactureDate,
        };
    }

    ResolvedExpiry {
        date: today
            .checked_add_months(Months::new(UNDATED_HORIZON_MONTHS))
            .unwrap_or(NaiveDate::MAX),
        source: ExpirySource::Estimated,
    }
}

/// A medicine is unexpired while its expiry date is today or later.
pub fn is_unexpired(expiry: NaiveDate, today: NaiveDate) -> bool {
    expiry >= today
}
