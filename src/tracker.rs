//! Tracker records and the field vocabulary used to query them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::value::Value;

/// Addresses one tracker of a download, or the download's whole tracker
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerIndex {
    info_hash: String,
    index: Option<usize>,
}

impl TrackerIndex {
    /// Address every tracker of the download identified by `info_hash`.
    pub fn whole(info_hash: impl Into<String>) -> Self {
        Self {
            info_hash: info_hash.into(),
            index: None,
        }
    }

    /// Address the single tracker at `index` within the download's tracker
    /// list.
    pub fn member(info_hash: impl Into<String>, index: usize) -> Self {
        Self {
            info_hash: info_hash.into(),
            index: Some(index),
        }
    }

    pub fn info_hash(&self) -> &str {
        &self.info_hash
    }

    /// Position within the tracker list, or `None` when the whole list is
    /// addressed.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Display for TrackerIndex {
    /// `hash` when the whole list is addressed, `hash:index` otherwise; this
    /// is the exact target string `t.multicall` expects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}:{}", self.info_hash, i),
            None => f.write_str(&self.info_hash),
        }
    }
}

/// A tracker attribute that can be requested over XML-RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerField(&'static str);

impl TrackerField {
    pub const CAN_SCRAPE: Self = Self("can_scrape");
    pub const IS_USABLE: Self = Self("is_usable");
    pub const IS_ENABLED: Self = Self("is_enabled");
    pub const FAILED_COUNTER: Self = Self("failed_counter");
    pub const ACTIVITY_TIME_LAST: Self = Self("activity_time_last");
    pub const ACTIVITY_TIME_NEXT: Self = Self("activity_time_next");
    pub const FAILED_TIME_LAST: Self = Self("failed_time_last");
    pub const FAILED_TIME_NEXT: Self = Self("failed_time_next");
    pub const ID: Self = Self("id");
    pub const IS_BUSY: Self = Self("is_busy");
    pub const IS_OPEN: Self = Self("is_open");
    pub const IS_EXTRA_TRACKER: Self = Self("is_extra_tracker");
    pub const LATEST_EVENT: Self = Self("latest_event");
    pub const MIN_INTERVAL: Self = Self("min_interval");
    pub const NORMAL_INTERVAL: Self = Self("normal_interval");
    pub const SUCCESS_COUNTER: Self = Self("success_counter");
    pub const SUCCESS_TIME_LAST: Self = Self("success_time_last");
    pub const SUCCESS_TIME_NEXT: Self = Self("success_time_next");
    pub const TYPE: Self = Self("type");
    pub const URL: Self = Self("url");

    /// Every field this crate knows how to decode.
    pub const ALL: [TrackerField; 20] = [
        Self::CAN_SCRAPE,
        Self::IS_USABLE,
        Self::IS_ENABLED,
        Self::FAILED_COUNTER,
        Self::ACTIVITY_TIME_LAST,
        Self::ACTIVITY_TIME_NEXT,
        Self::FAILED_TIME_LAST,
        Self::FAILED_TIME_NEXT,
        Self::ID,
        Self::IS_BUSY,
        Self::IS_OPEN,
        Self::IS_EXTRA_TRACKER,
        Self::LATEST_EVENT,
        Self::MIN_INTERVAL,
        Self::NORMAL_INTERVAL,
        Self::SUCCESS_COUNTER,
        Self::SUCCESS_TIME_LAST,
        Self::SUCCESS_TIME_NEXT,
        Self::TYPE,
        Self::URL,
    ];

    /// A field name this crate does not predefine. Note that tracker queries
    /// only accept fields from [`TrackerField::ALL`].
    pub fn from_name(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Wire rendering used to request this field in a multicall, e.g.
    /// `t.url=`.
    pub fn as_xmlrpc_argument(&self) -> String {
        format!("t.{}=", self.0)
    }

    /// Whether this field belongs to the known vocabulary.
    pub fn is_known(&self) -> bool {
        Self::ALL.contains(self)
    }
}

impl fmt::Display for TrackerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The most recent event exchanged with a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    None,
    Completed,
    Started,
    Stopped,
    /// Not an event the BitTorrent spec defines; rTorrent reports this while
    /// a scrape request is being processed.
    Scrape,
    /// An event code this crate does not know about. Kept verbatim, rendered
    /// as "Unknown".
    Other(i64),
}

impl From<i64> for TrackerEvent {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Completed,
            2 => Self::Started,
            3 => Self::Stopped,
            4 => Self::Scrape,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Completed => "Completed",
            Self::Started => "Started",
            Self::Stopped => "Stopped",
            Self::Scrape => "Scrape",
            Self::Other(_) => "Unknown",
        })
    }
}

/// The protocol a tracker is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerType {
    Http,
    Udp,
    Dht,
    /// A type code this crate does not know about. Kept verbatim, rendered
    /// as "Unknown".
    Other(i64),
}

impl From<i64> for TrackerType {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Http,
            2 => Self::Udp,
            3 => Self::Dht,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for TrackerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "HTTP",
            Self::Udp => "UDP",
            Self::Dht => "DHT",
            Self::Other(_) => "Unknown",
        })
    }
}

/// A snapshot of tracker attributes fetched in one multicall.
///
/// Only the fields that were actually requested are populated; accessors for
/// anything else return [`Error::NoField`]. The record is read-only once
/// assembled.
#[derive(Debug, Clone)]
pub struct Tracker {
    index: TrackerIndex,
    data: Arc<HashMap<TrackerField, Value>>,
}

impl Tracker {
    pub(crate) fn new(index: TrackerIndex, data: HashMap<TrackerField, Value>) -> Self {
        Self {
            index,
            data: Arc::new(data),
        }
    }

    pub(crate) fn empty(index: TrackerIndex) -> Self {
        Self::new(index, HashMap::new())
    }

    /// The index this record answers for.
    pub fn index(&self) -> &TrackerIndex {
        &self.index
    }

    /// Re-key this record. The underlying field data is shared with the
    /// original, not copied.
    pub fn clone_with_index(&self, index: TrackerIndex) -> Tracker {
        Tracker {
            index,
            data: Arc::clone(&self.data),
        }
    }

    fn field(&self, field: TrackerField) -> Result<&Value> {
        self.data.get(&field).ok_or(Error::NoField)
    }

    /// Whether the announce URL is scrapeable. rTorrent considers a HTTP
    /// tracker scrapeable if the announce URL contains `/announce` somewhere
    /// after the rightmost `/` (inclusively).
    pub fn can_scrape(&self) -> Result<bool> {
        self.field(TrackerField::CAN_SCRAPE)?.to_bool()
    }

    /// Whether the tracker is usable, i.e. enabled and not marked as failed.
    pub fn is_usable(&self) -> Result<bool> {
        self.field(TrackerField::IS_USABLE)?.to_bool()
    }

    /// Whether the tracker is enabled, i.e. not marked as disabled.
    pub fn is_enabled(&self) -> Result<bool> {
        self.field(TrackerField::IS_ENABLED)?.to_bool()
    }

    /// Whether a request to this tracker is in the middle of processing
    /// (identical to [`Tracker::is_open`]).
    pub fn is_busy(&self) -> Result<bool> {
        self.field(TrackerField::IS_BUSY)?.to_bool()
    }

    /// Whether a request to this tracker is in the middle of processing
    /// (identical to [`Tracker::is_busy`]).
    pub fn is_open(&self) -> Result<bool> {
        self.field(TrackerField::IS_OPEN)?.to_bool()
    }

    /// Whether the tracker was added via `d.tracker.insert` rather than
    /// existing in the original metafile.
    pub fn is_extra_tracker(&self) -> Result<bool> {
        self.field(TrackerField::IS_EXTRA_TRACKER)?.to_bool()
    }

    /// Number of failed requests to the tracker. Resets to 0 when a request
    /// succeeds.
    pub fn failed_counter(&self) -> Result<i64> {
        self.field(TrackerField::FAILED_COUNTER)?.to_int()
    }

    /// Minimum announce interval as returned from the tracker request.
    pub fn min_interval(&self) -> Result<i64> {
        self.field(TrackerField::MIN_INTERVAL)?.to_int()
    }

    /// Normal announce interval as returned from the tracker request.
    pub fn normal_interval(&self) -> Result<i64> {
        self.field(TrackerField::NORMAL_INTERVAL)?.to_int()
    }

    /// Number of successful requests to the tracker.
    pub fn success_counter(&self) -> Result<i64> {
        self.field(TrackerField::SUCCESS_COUNTER)?.to_int()
    }

    /// Last time there was an attempt to announce to this tracker, whether
    /// or not the announce succeeded.
    pub fn activity_time_last(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::ACTIVITY_TIME_LAST)?.to_timestamp()
    }

    /// When rTorrent will next attempt to announce to this tracker.
    pub fn activity_time_next(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::ACTIVITY_TIME_NEXT)?.to_timestamp()
    }

    /// Last time there was a failed attempt to announce to this tracker.
    pub fn failed_time_last(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::FAILED_TIME_LAST)?.to_timestamp()
    }

    /// When the next request is planned after a failed one. rTorrent backs
    /// off failed requests exponentially.
    pub fn failed_time_next(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::FAILED_TIME_NEXT)?.to_timestamp()
    }

    /// Last time there was a successful announce to this tracker.
    pub fn success_time_last(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::SUCCESS_TIME_LAST)?.to_timestamp()
    }

    /// When the next request is planned after a successful one.
    pub fn success_time_next(&self) -> Result<DateTime<Utc>> {
        self.field(TrackerField::SUCCESS_TIME_NEXT)?.to_timestamp()
    }

    /// The tracker id key from a previous HTTP tracker response, if any. It
    /// is added as a parameter to subsequent requests to the same tracker.
    pub fn id(&self) -> Result<String> {
        self.field(TrackerField::ID)?.to_text()
    }

    /// The announce URL.
    pub fn url(&self) -> Result<String> {
        self.field(TrackerField::URL)?.to_text()
    }

    /// The latest event that occurred with the tracker. Codes outside the
    /// known set decode successfully and render as "Unknown".
    pub fn latest_event(&self) -> Result<TrackerEvent> {
        Ok(TrackerEvent::from(
            self.field(TrackerField::LATEST_EVENT)?.to_int()?,
        ))
    }

    /// The tracker's protocol type. Codes outside the known set decode
    /// successfully and render as "Unknown".
    pub fn tracker_type(&self) -> Result<TrackerType> {
        Ok(TrackerType::from(self.field(TrackerField::TYPE)?.to_int()?))
    }

    /// Render one field as text for display or debugging. Any decode failure
    /// renders as `<na>`; a field outside the known vocabulary renders as
    /// `<ne>`. Meant for diagnostics, not programmatic consumption.
    pub fn field_value_as_string(&self, field: TrackerField) -> String {
        let rendered = match field.as_str() {
            "can_scrape" => self.can_scrape().map(|v| v.to_string()),
            "is_usable" => self.is_usable().map(|v| v.to_string()),
            "is_enabled" => self.is_enabled().map(|v| v.to_string()),
            "is_busy" => self.is_busy().map(|v| v.to_string()),
            "is_open" => self.is_open().map(|v| v.to_string()),
            "is_extra_tracker" => self.is_extra_tracker().map(|v| v.to_string()),
            "failed_counter" => self.failed_counter().map(|v| v.to_string()),
            "min_interval" => self.min_interval().map(|v| v.to_string()),
            "normal_interval" => self.normal_interval().map(|v| v.to_string()),
            "success_counter" => self.success_counter().map(|v| v.to_string()),
            "activity_time_last" => self.activity_time_last().map(|t| t.to_string()),
            "activity_time_next" => self.activity_time_next().map(|t| t.to_string()),
            "failed_time_last" => self.failed_time_last().map(|t| t.to_string()),
            "failed_time_next" => self.failed_time_next().map(|t| t.to_string()),
            "success_time_last" => self.success_time_last().map(|t| t.to_string()),
            "success_time_next" => self.success_time_next().map(|t| t.to_string()),
            "id" => self.id(),
            "url" => self.url(),
            "latest_event" => self.latest_event().map(|e| e.to_string()),
            "type" => self.tracker_type().map(|t| t.to_string()),
            _ => return "<ne>".to_string(),
        };
        rendered.unwrap_or_else(|_| "<na>".to_string())
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .data
            .keys()
            .map(|field| format!("{}: {}", field, self.field_value_as_string(*field)))
            .collect();
        write!(
            f,
            "Tracker: index: <{}>, data: <{}>",
            self.index,
            fields.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(entries: Vec<(TrackerField, Value)>) -> Tracker {
        Tracker::new(
            TrackerIndex::whole("12345"),
            entries.into_iter().collect(),
        )
    }

    #[test]
    fn index_serializes_with_and_without_ordinal() {
        assert_eq!(TrackerIndex::member("12345", 1).to_string(), "12345:1");
        assert_eq!(TrackerIndex::whole("12345").to_string(), "12345");
    }

    #[test]
    fn whole_index_has_no_ordinal() {
        let index = TrackerIndex::whole("12345");
        assert_eq!(index.info_hash(), "12345");
        assert_eq!(index.index(), None);
    }

    #[test]
    fn field_renders_its_xmlrpc_argument() {
        assert_eq!(
            TrackerField::from_name("test_field").as_xmlrpc_argument(),
            "t.test_field="
        );
        assert_eq!(TrackerField::URL.as_xmlrpc_argument(), "t.url=");
    }

    #[test]
    fn vocabulary_membership() {
        assert!(TrackerField::LATEST_EVENT.is_known());
        assert!(!TrackerField::from_name("bogus").is_known());
    }

    #[test]
    fn event_display_names() {
        let cases = [
            (TrackerEvent::None, "None"),
            (TrackerEvent::Completed, "Completed"),
            (TrackerEvent::Started, "Started"),
            (TrackerEvent::Stopped, "Stopped"),
            (TrackerEvent::Scrape, "Scrape"),
            (TrackerEvent::Other(999), "Unknown"),
        ];
        for (event, expected) in cases {
            assert_eq!(event.to_string(), expected);
        }
    }

    #[test]
    fn type_display_names() {
        let cases = [
            (TrackerType::Http, "HTTP"),
            (TrackerType::Udp, "UDP"),
            (TrackerType::Dht, "DHT"),
            (TrackerType::Other(999), "Unknown"),
        ];
        for (tracker_type, expected) in cases {
            assert_eq!(tracker_type.to_string(), expected);
        }
    }

    #[test]
    fn event_codes_round_trip_losslessly() {
        assert_eq!(TrackerEvent::from(2), TrackerEvent::Started);
        assert_eq!(TrackerEvent::from(999), TrackerEvent::Other(999));
        assert_eq!(TrackerType::from(1), TrackerType::Http);
        assert_eq!(TrackerType::from(999), TrackerType::Other(999));
    }

    #[test]
    fn clone_with_index_shares_the_data_map() {
        let original = tracker_with(vec![(TrackerField::ID, Value::Text("test_id".into()))]);
        let rekeyed = original.clone_with_index(TrackerIndex::member("67890", 2));

        assert_eq!(rekeyed.index(), &TrackerIndex::member("67890", 2));
        assert_ne!(rekeyed.index(), original.index());
        assert!(Arc::ptr_eq(&original.data, &rekeyed.data));
        assert_eq!(rekeyed.id().unwrap(), "test_id");
    }

    #[test]
    fn accessors_decode_their_declared_types() {
        let tracker = tracker_with(vec![
            (TrackerField::ID, Value::Text("test_id".into())),
            (TrackerField::CAN_SCRAPE, Value::Int(1)),
            (TrackerField::FAILED_COUNTER, Value::Text("5".into())),
            (TrackerField::ACTIVITY_TIME_LAST, Value::Long(1)),
            (TrackerField::LATEST_EVENT, Value::Int(2)),
            (TrackerField::TYPE, Value::Text("1".into())),
        ]);

        assert_eq!(tracker.id().unwrap(), "test_id");
        assert!(tracker.can_scrape().unwrap());
        assert_eq!(tracker.failed_counter().unwrap(), 5);
        assert_eq!(
            tracker.activity_time_last().unwrap(),
            DateTime::from_timestamp(1, 0).unwrap()
        );
        assert_eq!(tracker.latest_event().unwrap(), TrackerEvent::Started);
        assert_eq!(tracker.tracker_type().unwrap(), TrackerType::Http);
    }

    #[test]
    fn unrequested_field_is_absent_not_bad_data() {
        let tracker = tracker_with(vec![(TrackerField::ID, Value::Text("test_id".into()))]);
        assert!(matches!(tracker.url(), Err(Error::NoField)));
    }

    #[test]
    fn coercion_failure_does_not_affect_sibling_fields() {
        let tracker = tracker_with(vec![
            (TrackerField::ID, Value::Text("test_id".into())),
            (TrackerField::CAN_SCRAPE, Value::Text("invalid".into())),
        ]);
        assert!(matches!(tracker.can_scrape(), Err(Error::BadData)));
        assert_eq!(tracker.id().unwrap(), "test_id");
    }

    #[test]
    fn field_value_rendering_uses_sentinels() {
        let tracker = tracker_with(vec![
            (TrackerField::ID, Value::Text("test_id".into())),
            (TrackerField::LATEST_EVENT, Value::Int(999)),
        ]);

        assert_eq!(tracker.field_value_as_string(TrackerField::ID), "test_id");
        assert_eq!(
            tracker.field_value_as_string(TrackerField::LATEST_EVENT),
            "Unknown"
        );
        // Requested but never fetched.
        assert_eq!(tracker.field_value_as_string(TrackerField::URL), "<na>");
        // Outside the vocabulary entirely.
        assert_eq!(
            tracker.field_value_as_string(TrackerField::from_name("bogus")),
            "<ne>"
        );
    }

    #[test]
    fn display_includes_index_and_populated_fields() {
        let tracker = tracker_with(vec![(TrackerField::ID, Value::Text("test_id".into()))]);
        let rendered = tracker.to_string();
        assert!(rendered.starts_with("Tracker: index: <12345>"));
        assert!(rendered.contains("id: test_id"));
    }
}
