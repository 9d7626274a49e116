//! # Job Numbers
//!
//! Human-readable job numbers: `JOB-{YYYYMMDD}-{seq:03}`.
//!
//! The sequence restarts at 1 every day. The repository picks `seq` inside
//! the insert transaction; this module only formats and parses.

use chrono::NaiveDate;

use crate::error::CoreError;

const PREFIX: &str = "JOB-";

/// Formats a job number.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use jobcost_core::job_number::format_job_number;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
/// assert_eq!(format_job_number(date, 3), "JOB-20250114-003");
/// assert_eq!(format_job_number(date, 1204), "JOB-20250114-1204");
/// ```
pub fn format_job_number(date: NaiveDate, seq: u32) -> String {
    format!("{}{}-{:03}", PREFIX, date.format("%Y%m%d"), seq)
}

/// Splits a job number into its date and sequence.
pub fn parse_job_number(job_number: &str) -> Result<(NaiveDate, u32), CoreError> {
    let invalid = || CoreError::InvalidJobNumber(job_number.to_string());

    let rest = job_number.strip_prefix(PREFIX).ok_or_else(invalid)?;
    let (date_part, seq_part) = rest.split_once('-').ok_or_else(invalid)?;

    if date_part.len() != 8
        || seq_part.len() < 3
        || !date_part.bytes().all(|b| b.is_ascii_digit())
        || !seq_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").map_err(|_| invalid())?;
    let seq = seq_part.parse::<u32>().map_err(|_| invalid())?;
    if seq == 0 {
        return Err(invalid());
    }

    Ok((date, seq))
}

/// True when `job_number` has the `JOB-YYYYMMDD-NNN` shape with a real date.
pub fn is_valid_job_number(job_number: &str) -> bool {
    parse_job_number(job_number).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_job_number(date(2025, 3, 9), 1), "JOB-20250309-001");
        assert_eq!(format_job_number(date(2025, 3, 9), 42), "JOB-20250309-042");
    }

    #[test]
    fn test_parse_round_trip() {
        let (d, seq) = parse_job_number("JOB-20241231-017").unwrap();
        assert_eq!(d, date(2024, 12, 31));
        assert_eq!(seq, 17);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "JOB-2024123-001",
            "JOB-20241231-01",
            "JOB-20241331-001",
            "INV-20241231-001",
            "JOB-20241231-000",
            "JOB-20241231-0a1",
        ] {
            assert!(!is_valid_job_number(bad), "{bad} should be rejected");
        }
    }
}
