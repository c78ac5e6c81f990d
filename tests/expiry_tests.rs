use chrono::NaiveDate;
use optwatch::error::OptWatchError;
use optwatch::services::expiry;

fn mid_june() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}

#[test]
fn current_month_resolves_to_current_year() {
    assert_eq!(expiry::normalize("jun", mid_june()).unwrap(), "JUN-24");
}

#[test]
fn later_month_resolves_to_current_year() {
    assert_eq!(expiry::normalize("DEC", mid_june()).unwrap(), "DEC-24");
}

#[test]
fn earlier_month_rolls_over_to_next_year() {
    assert_eq!(expiry::normalize("may", mid_june()).unwrap(), "MAY-25");
    assert_eq!(expiry::normalize("jan", mid_june()).unwrap(), "JAN-25");
}

#[test]
fn full_month_names_are_truncated() {
    assert_eq!(expiry::normalize("June", mid_june()).unwrap(), "JUN-24");
    assert_eq!(expiry::normalize("december", mid_june()).unwrap(), "DEC-24");
}

#[test]
fn december_today_keeps_december_and_rolls_january() {
    let december = NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date");

    assert_eq!(expiry::normalize("dec", december).unwrap(), "DEC-24");
    assert_eq!(expiry::normalize("jan", december).unwrap(), "JAN-25");
}

#[test]
fn rollover_rule_holds_for_every_month() {
    let months = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];
    let today = mid_june();

    for (i, month) in months.iter().enumerate() {
        let expected_year = if (i as u32 + 1) >= 6 { 24 } else { 25 };
        let expected = format!("{month}-{expected_year}");
        assert_eq!(expiry::normalize(month, today).unwrap(), expected);
    }
}

#[test]
fn unknown_tokens_are_rejected() {
    for raw in ["foo", "", "ju", "13"] {
        let err = expiry::normalize(raw, mid_june()).unwrap_err();
        assert!(matches!(err, OptWatchError::InvalidExpiry(_)), "raw = {raw:?}");
    }
}
