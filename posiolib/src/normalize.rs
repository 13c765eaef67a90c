//! Pure value normalizers: locale-ambiguous amounts, implied-decimal
//! rendering, VAT-rate codes, hour buckets. Recoverable failures log a
//! warning and return a default; they never error.

use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use tracing::warn;

/// Parses an amount that may use either comma or period as the decimal
/// separator, with the other symbol acting as a thousands separator.
///
/// If a comma is present it is the decimal separator and periods are
/// stripped. Otherwise the group after the last period counts as decimals
/// only when it has exactly two digits and the group before the first
/// period at most three; any other periods are thousands separators.
/// Unparseable input yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Decimal::ZERO;
    }
    let (negative, body) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.as_str()),
    };

    let candidate = if body.contains(',') {
        body.replace('.', "").replace(',', ".")
    } else if body.contains('.') {
        let groups: Vec<&str> = body.split('.').collect();
        let first = groups[0];
        let last = groups[groups.len() - 1];
        if last.len() == 2 && first.len() <= 3 {
            format!("{}.{}", groups[..groups.len() - 1].concat(), last)
        } else {
            groups.concat()
        }
    } else {
        body.to_string()
    };

    match candidate.parse::<Decimal>() {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(e) => {
            warn!(raw, error = %e, "unparseable amount, defaulting to zero");
            Decimal::ZERO
        }
    }
}

/// Renders an amount as an integer string in hundredths; the target format
/// encodes currency without a decimal point ("150,00" becomes "15000").
pub fn scaled_amount(value: Decimal) -> String {
    scaled(value, 2)
}

/// Same scaling with three implied decimals, used for quantities.
pub fn scaled_quantity(value: Decimal) -> String {
    scaled(value, 3)
}

fn scaled(value: Decimal, places: u32) -> String {
    let truncated = value.trunc_with_scale(places);
    let mut mantissa = truncated.mantissa();
    for _ in truncated.scale()..places {
        mantissa *= 10;
    }
    mantissa.to_string()
}

/// Turns an exported VAT rate into the fixed-width rate code: the trailing
/// percent sign is replaced by two zero digits, "12%" becomes "1200".
pub fn percent_code(raw: &str) -> String {
    let t = raw.trim().trim_end_matches('%').trim_end();
    format!("{t}00")
}

/// Interval label for the hour of an "HH:MM:SS" value: "23:45:00" buckets
/// to "23.00 - 0.00", "00:10:00" to "0.00 - 1.00".
pub fn bucket_hour(raw: &str) -> String {
    let hour = match NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S") {
        Ok(t) => t.hour(),
        Err(e) => {
            warn!(raw, error = %e, "unparseable time, bucketing as hour zero");
            0
        }
    };
    format!("{}.00 - {}.00", hour, (hour + 1) % 24)
}

/// "HH:MM:SS" reduced to "HHMM".
pub fn compact_time(raw: &str) -> String {
    match NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S") {
        Ok(t) => t.format("%H%M").to_string(),
        Err(e) => {
            warn!(raw, error = %e, "unparseable time, emitting empty");
            String::new()
        }
    }
}

/// Day-first exported dates; ISO input is accepted as-is.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(t, fmt).ok())
}

/// Reformats an exported date into "YYYY-MM-DD"; unrecognised input passes
/// through unchanged.
pub fn iso_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => {
            warn!(raw, "unrecognised date format, passing through");
            raw.trim().to_string()
        }
    }
}

pub fn zero_pad2(n: u32) -> String {
    format!("{n:02}")
}

pub fn zero_pad3(n: u32) -> String {
    format!("{n:03}")
}
