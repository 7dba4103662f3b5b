//! Argument types accepted by the endpoint methods.
//!
//! # Design
//! Arguments that the API expects in a particular textual form are validated
//! locally, before any request exists: show dates become `YYYY-MM-DD`,
//! ratings must be integers in 1..=5, and identifier lists are joined with
//! commas. Each type converts from the loose shapes callers tend to have
//! (strings, integers, slices, JSON values).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::request::Params;

/// A show date given either as a calendar date or as text to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowDate {
    Date(NaiveDate),
    Text(String),
}

impl ShowDate {
    /// The calendar date, parsing text input if necessary.
    pub fn resolve(&self) -> Result<NaiveDate, ApiError> {
        match self {
            ShowDate::Date(date) => Ok(*date),
            ShowDate::Text(text) => parse_date(text),
        }
    }
}

impl From<NaiveDate> for ShowDate {
    fn from(date: NaiveDate) -> Self {
        ShowDate::Date(date)
    }
}

impl From<&str> for ShowDate {
    fn from(text: &str) -> Self {
        ShowDate::Text(text.to_string())
    }
}

impl From<String> for ShowDate {
    fn from(text: String) -> Self {
        ShowDate::Text(text)
    }
}

/// Parses `YYYY-MM-DD`, or the date part of an ISO 8601 / RFC 3339 timestamp.
pub fn parse_date(input: &str) -> Result<NaiveDate, ApiError> {
    let text = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts.date());
    }
    Err(ApiError::InvalidDate(input.to_string()))
}

/// A show rating, an integer from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, ApiError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(ApiError::InvalidRating(value.to_string()))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ApiError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl TryFrom<i32> for Rating {
    type Error = ApiError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Rating::new(i64::from(value))
    }
}

impl TryFrom<u32> for Rating {
    type Error = ApiError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Rating::new(i64::from(value))
    }
}

impl TryFrom<&str> for Rating {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidRating(format!("{value:?}")))
            .and_then(Rating::new)
    }
}

impl TryFrom<String> for Rating {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rating::try_from(value.as_str())
    }
}

/// Accepts integral numbers and numeric strings; `null` and everything else
/// is rejected.
impl TryFrom<&Value> for Rating {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Rating::new(i),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() <= 5.0 => Rating::new(f as i64),
                    _ => Err(ApiError::InvalidRating(n.to_string())),
                },
            },
            Value::String(s) => Rating::try_from(s.as_str()),
            other => Err(ApiError::InvalidRating(other.to_string())),
        }
    }
}

/// Identifiers sent as one comma-joined parameter.
///
/// Deserializes from a number, a comma-delimited string, or an array, and
/// serializes as the joined string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdListRepr", into = "String")]
pub struct IdList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum IdListRepr {
    One(u64),
    Text(String),
    Many(Vec<Value>),
}

impl From<IdListRepr> for IdList {
    fn from(repr: IdListRepr) -> Self {
        match repr {
            IdListRepr::One(id) => IdList::from(id),
            IdListRepr::Text(text) => IdList::from(text),
            IdListRepr::Many(items) => {
                IdList::from_display(items.into_iter().map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                }))
            }
        }
    }
}

impl From<IdList> for String {
    fn from(list: IdList) -> Self {
        list.joined()
    }
}

impl IdList {
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    fn from_display<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> Self {
        IdList(
            items
                .into_iter()
                .map(|item| item.to_string().trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Splits a comma-delimited string; a string without commas is one id.
impl From<&str> for IdList {
    fn from(value: &str) -> Self {
        IdList::from_display(value.split(','))
    }
}

impl From<String> for IdList {
    fn from(value: String) -> Self {
        IdList::from(value.as_str())
    }
}

impl<T: fmt::Display> From<Vec<T>> for IdList {
    fn from(items: Vec<T>) -> Self {
        IdList::from_display(items)
    }
}

impl<T: fmt::Display> From<&[T]> for IdList {
    fn from(items: &[T]) -> Self {
        IdList::from_display(items)
    }
}

impl<T: fmt::Display, const N: usize> From<[T; N]> for IdList {
    fn from(items: [T; N]) -> Self {
        IdList::from_display(items)
    }
}

macro_rules! id_list_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for IdList {
            fn from(id: $ty) -> Self {
                IdList(vec![id.to_string()])
            }
        })*
    };
}

id_list_from_int!(i32, i64, u32, u64);

/// Filters for `shows_query`. With no filters set the API returns shows from
/// the current year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowQuery {
    pub year: Option<i32>,
    pub venueid: Option<u64>,
    /// Two-letter US state code.
    pub state: Option<String>,
    pub country: Option<String>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Artist id from `artists_get`; the API defaults to 1 (Phish).
    pub artist: Option<u32>,
    pub showids: Option<IdList>,
}

impl ShowQuery {
    pub(crate) fn apply(&self, params: &mut Params) {
        params.insert_opt("year", self.year);
        params.insert_opt("venueid", self.venueid);
        params.insert_opt("state", self.state.as_deref());
        params.insert_opt("country", self.country.as_deref());
        params.insert_opt("month", self.month);
        params.insert_opt("day", self.day);
        params.insert_opt("artist", self.artist);
        params.insert_opt("showids", self.showids.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_and_native_dates_agree() {
        let native = NaiveDate::from_ymd_opt(1997, 11, 22).unwrap();
        assert_eq!(ShowDate::from("1997-11-22").resolve().unwrap(), native);
        assert_eq!(ShowDate::from(native).resolve().unwrap(), native);
    }

    #[test]
    fn timestamps_use_their_date_part() {
        let expected = NaiveDate::from_ymd_opt(2009, 3, 6).unwrap();
        assert_eq!(parse_date("2009-03-06T20:00:00-05:00").unwrap(), expected);
        assert_eq!(parse_date("2009-03-06T20:00:00").unwrap(), expected);
        assert_eq!(parse_date(" 2009-03-06 ").unwrap(), expected);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in ["", "tomorrow", "1997-13-01", "1997-02-30", "22/11/1997"] {
            let err = parse_date(bad).unwrap_err();
            assert!(matches!(err, ApiError::InvalidDate(ref s) if s == bad), "{bad}");
        }
    }

    #[test]
    fn ratings_one_through_five_are_valid() {
        for i in 1..=5 {
            assert_eq!(Rating::new(i).unwrap().value() as i64, i);
            assert_eq!(Rating::try_from(i.to_string()).unwrap().value() as i64, i);
        }
        assert_eq!(Rating::try_from(" 4 ").unwrap().value(), 4);
        assert_eq!(Rating::try_from(&json!(3)).unwrap().value(), 3);
        assert_eq!(Rating::try_from(&json!("2")).unwrap().value(), 2);
        assert_eq!(Rating::try_from(&json!(5.0)).unwrap().value(), 5);
    }

    #[test]
    fn out_of_range_or_non_numeric_ratings_fail() {
        assert!(matches!(Rating::new(0), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::new(6), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(-1i32), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from("abc"), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from("3.5"), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(&Value::Null), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(&json!(2.5)), Err(ApiError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(&json!(true)), Err(ApiError::InvalidRating(_))));
    }

    #[test]
    fn id_lists_normalize_to_comma_joined() {
        assert_eq!(IdList::from(1252683584u64).joined(), "1252683584");
        assert_eq!(IdList::from("1,2, 3").joined(), "1,2,3");
        assert_eq!(IdList::from(vec![1, 2, 3]).joined(), "1,2,3");
        assert_eq!(IdList::from(["trey", "mike"]).joined(), "trey,mike");
        assert_eq!(IdList::from(&["a", "b"][..]).len(), 2);
        assert!(IdList::from("").is_empty());
    }

    #[test]
    fn id_lists_deserialize_from_any_shape() {
        let one: IdList = serde_json::from_value(json!(42)).unwrap();
        let text: IdList = serde_json::from_value(json!("1, 2")).unwrap();
        let many: IdList = serde_json::from_value(json!([1, "2", 3])).unwrap();
        assert_eq!(one.joined(), "42");
        assert_eq!(text.joined(), "1,2");
        assert_eq!(many.joined(), "1,2,3");
        assert_eq!(serde_json::to_value(&many).unwrap(), json!("1,2,3"));
    }

    #[test]
    fn show_query_from_json_fills_missing_fields() {
        let query: ShowQuery =
            serde_json::from_value(json!({"year": 1997, "showids": [7, 8]})).unwrap();
        assert_eq!(query.year, Some(1997));
        assert_eq!(query.showids.unwrap().joined(), "7,8");
        assert!(query.state.is_none());
    }

    #[test]
    fn show_query_sends_only_given_filters() {
        let query = ShowQuery {
            year: Some(1995),
            state: Some("NY".to_string()),
            country: Some(String::new()),
            showids: Some(vec![1, 2].into()),
            ..Default::default()
        };
        let mut params = Params::new();
        query.apply(&mut params);
        assert_eq!(params.get("year"), Some("1995"));
        assert_eq!(params.get("state"), Some("NY"));
        assert_eq!(params.get("showids"), Some("1,2"));
        assert!(!params.contains("country"));
        assert!(!params.contains("venueid"));
        assert_eq!(params.len(), 3);
    }
}
