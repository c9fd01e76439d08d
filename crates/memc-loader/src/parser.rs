//! Tab-separated record parser
//!
//! Line layout: `dev_type \t dev_id \t lat \t lon \t app,app,...`
//!
//! Two tiers of failure: a bad device field or coordinate rejects the whole
//! line, while an unparsable app id only drops that entry.

use memc_common::AppsInstalled;
use thiserror::Error;
use tracing::debug;

const FIELD_SEPARATOR: char = '\t';
const APP_SEPARATOR: char = ',';
const FIELD_COUNT: usize = 5;

/// Why a line did not produce a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 5 tab-separated fields, found {found}")]
    TooFewFields { found: usize },

    #[error("empty device type")]
    EmptyDeviceType,

    #[error("empty device id")]
    EmptyDeviceId,

    #[error("invalid latitude: {0:?}")]
    InvalidLatitude(String),

    #[error("invalid longitude: {0:?}")]
    InvalidLongitude(String),
}

/// Parse one trimmed input line. Fields past the fifth are ignored.
pub fn parse_line(line: &str) -> Result<AppsInstalled, ParseError> {
    let mut fields = [""; FIELD_COUNT];
    let mut found = 0;
    for field in line.split(FIELD_SEPARATOR).take(FIELD_COUNT) {
        fields[found] = field;
        found += 1;
    }
    if found < FIELD_COUNT {
        return Err(ParseError::TooFewFields { found });
    }

    let [device_type, device_id, lat, lon, raw_apps] = fields;
    if device_type.is_empty() {
        return Err(ParseError::EmptyDeviceType);
    }
    if device_id.is_empty() {
        return Err(ParseError::EmptyDeviceId);
    }

    let lat = lat
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidLatitude(lat.to_string()))?;
    let lon = lon
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidLongitude(lon.to_string()))?;

    Ok(AppsInstalled {
        device_type: device_type.to_string(),
        device_id: device_id.to_string(),
        lat,
        lon,
        apps: parse_apps(raw_apps),
    })
}

/// Parse a comma-separated app list, skipping blank and non-numeric entries.
pub fn parse_apps(raw: &str) -> Vec<u32> {
    raw.split(APP_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<u32>() {
            Ok(app) => Some(app),
            Err(_) => {
                debug!(entry, "Skipping non-numeric app id");
                None
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_line() {
        let record = parse_line("idfa\t1rfw452y52g2gq4g\t55.55\t42.42\t1423,43,567,3,7,23").unwrap();
        assert_eq!(record.device_type, "idfa");
        assert_eq!(record.device_id, "1rfw452y52g2gq4g");
        assert_eq!(record.lat, 55.55);
        assert_eq!(record.lon, 42.42);
        assert_eq!(record.apps, vec![1423, 43, 567, 3, 7, 23]);
    }

    #[test]
    fn test_too_few_fields() {
        assert_eq!(
            parse_line("idfa\tabc\t1.0\t2.0"),
            Err(ParseError::TooFewFields { found: 4 })
        );
        assert_eq!(parse_line("garbage"), Err(ParseError::TooFewFields { found: 1 }));
    }

    #[test]
    fn test_empty_device_fields() {
        assert_eq!(parse_line("\tabc\t1.0\t2.0\t1"), Err(ParseError::EmptyDeviceType));
        assert_eq!(parse_line("gaid\t\t1.0\t2.0\t1"), Err(ParseError::EmptyDeviceId));
    }

    #[test]
    fn test_invalid_coordinates_are_distinguished() {
        assert_eq!(
            parse_line("gaid\tabc\tnorth\t2.0\t1"),
            Err(ParseError::InvalidLatitude("north".to_string()))
        );
        assert_eq!(
            parse_line("gaid\tabc\t1.0\t\t1"),
            Err(ParseError::InvalidLongitude(String::new()))
        );
    }

    #[test]
    fn test_bad_app_entries_are_skipped() {
        let record = parse_line("adid\tabc\t-1.5\t2\t 7, x1, ,8,-3,7 ,99999999999").unwrap();
        assert_eq!(record.apps, vec![7, 8, 7]);
    }

    #[test]
    fn test_empty_app_list_is_valid() {
        let record = parse_line("dvid\tabc\t0\t0\t").unwrap();
        assert!(record.apps.is_empty());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let record = parse_line("dvid\tabc\t1\t2\t3,4\textra\tmore").unwrap();
        assert_eq!(record.apps, vec![3, 4]);
    }

    proptest! {
        #[test]
        fn prop_fewer_than_five_fields_rejected(fields in proptest::collection::vec("[^\t]{0,12}", 1..5)) {
            let line = fields.join("\t");
            let rejected = matches!(parse_line(&line), Err(ParseError::TooFewFields { .. }));
            prop_assert!(rejected);
        }

        #[test]
        fn prop_non_numeric_apps_dropped_record_kept(
            apps in proptest::collection::vec(0u32..100_000, 0..10),
            junk in "[a-z]{1,6}",
        ) {
            let mut entries: Vec<String> = apps.iter().map(u32::to_string).collect();
            entries.insert(entries.len() / 2, junk);
            let line = format!("idfa\tdev\t1.0\t2.0\t{}", entries.join(","));
            let record = parse_line(&line).unwrap();
            prop_assert_eq!(record.apps, apps);
        }
    }
}
