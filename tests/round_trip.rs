use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use crudpath::datatype::{DataType, Value};
use proptest::prelude::*;

// Every valid value survives being rendered to a path token and read back.
proptest! {
    #[test]
    fn integers(i in -1_000_000i64..=1_000_000) {
        let data_type = DataType::integer(1_000_000);
        let value = Value::Integer(i);
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn integers_out_of_bounds(i in 151i64..i64::MAX) {
        let data_type = DataType::integer(150);
        prop_assert!(!data_type.is_valid_string(&i.to_string()));
        prop_assert!(!data_type.is_valid_string(&(-i).to_string()));
    }

    #[test]
    fn booleans(b in any::<bool>()) {
        let data_type = DataType::boolean();
        let value = Value::Boolean(b);
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn floats(x in -1.0e12f64..1.0e12) {
        let data_type = DataType::float(f64::NEG_INFINITY, f64::INFINITY);
        let value = Value::Float(x);
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn decimals(token in "-?[1-9][0-9]{0,24}(\\.[0-9]{1,12})?") {
        let data_type = DataType::decimal();
        let value = Value::Decimal(BigDecimal::from_str(&token).unwrap());
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn strings(s in "\\PC{0,64}") {
        let data_type = DataType::string(64);
        let value = Value::String(s);
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn datetimes(secs in 0i64..4_000_000_000, nanos in 0u32..1_000_000_000) {
        let data_type = DataType::datetime();
        let value = Value::Date(Utc.timestamp_opt(secs, nanos).unwrap());
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn dates(year in 1900i32..2100, ordinal in 1u32..=365) {
        let data_type = DataType::dateonly();
        let day = NaiveDate::from_yo_opt(year, ordinal).unwrap();
        let value = Value::Date(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap()));
        prop_assert!(data_type.is_valid(&value));
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }

    #[test]
    fn times_of_day(secs in 0u32..86_400, nanos in 0u32..1_000_000_000) {
        let data_type = DataType::timeonly();
        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let value = Value::Date(Utc.from_utc_datetime(&epoch.and_time(time)));
        prop_assert!(data_type.is_valid(&value));
        prop_assert_eq!(data_type.from_string(&data_type.to_token(&value)), Some(value));
    }
}

#[test]
fn years_past_four_digits_are_rejected() {
    for data_type in [DataType::datetime(), DataType::dateonly()] {
        assert_eq!(data_type.from_string("+10000-01-01"), None, "{}", data_type);
        let far = Value::Date(Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap());
        assert!(!data_type.is_valid(&far), "{}", data_type);
    }
    let data_type = DataType::datetime();
    let last = Value::Date(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());
    assert_eq!(data_type.from_string(&data_type.to_token(&last)), Some(last));
}
