use crate::errors::{InvalidPeriod, InvalidPeriodReason};
use crate::model::CanonicalPeriod;

pub const DEFAULT_CENTURY_BASE: i32 = 2000;

/// Digit layouts a period code can take, selected by code length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLayout {
    /// `MMYY`, used by column-header codes of older releases.
    MonthShortYear,
    /// `MYYYY`, single-digit months written without a leading zero.
    ShortMonthFullYear,
    /// `MMYYYY`.
    MonthFullYear,
}

impl PeriodLayout {
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            4 => Some(PeriodLayout::MonthShortYear),
            5 => Some(PeriodLayout::ShortMonthFullYear),
            6 => Some(PeriodLayout::MonthFullYear),
            _ => None,
        }
    }

    fn month_digits(&self) -> usize {
        match self {
            PeriodLayout::ShortMonthFullYear => 1,
            PeriodLayout::MonthShortYear | PeriodLayout::MonthFullYear => 2,
        }
    }
}

/// Decodes compact month codes into [`CanonicalPeriod`]s.
///
/// Two-digit years are placed in the century starting at `century_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDecoder {
    century_base: i32,
}

impl Default for PeriodDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_CENTURY_BASE)
    }
}

impl PeriodDecoder {
    pub fn new(century_base: i32) -> Self {
        Self { century_base }
    }

    pub fn century_base(&self) -> i32 {
        self.century_base
    }

    pub fn decode(&self, code: &str) -> Result<CanonicalPeriod, InvalidPeriod> {
        let code = code.trim();
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidPeriod::new(code, InvalidPeriodReason::NonDigit));
        }
        // all-ASCII from here on, so byte length == digit count
        let layout = PeriodLayout::from_len(code.len())
            .ok_or_else(|| InvalidPeriod::new(code, InvalidPeriodReason::Length))?;

        let (month_part, year_part) = code.split_at(layout.month_digits());
        let month = parse_digits(month_part);
        if !(1..=12).contains(&month) {
            return Err(InvalidPeriod::new(code, InvalidPeriodReason::Month));
        }

        let digits = parse_digits(year_part) as i32;
        let year = match layout {
            PeriodLayout::MonthShortYear => self.century_base.checked_add(digits),
            PeriodLayout::ShortMonthFullYear | PeriodLayout::MonthFullYear => Some(digits),
        };
        year.and_then(|year| CanonicalPeriod::new(year, month))
            .ok_or_else(|| InvalidPeriod::new(code, InvalidPeriodReason::Year))
    }

    /// Decodes the trailing word of a `"<metric label> <period token>"` header.
    pub fn decode_header(&self, header: &str) -> Result<CanonicalPeriod, InvalidPeriod> {
        let token = period_token(header)
            .ok_or_else(|| InvalidPeriod::new(header, InvalidPeriodReason::Length))?;
        self.decode(token)
    }
}

/// Last whitespace-separated word of a column header.
pub fn period_token(header: &str) -> Option<&str> {
    header.split_whitespace().last()
}

fn parse_digits(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}
