use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound for `pageSize`
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest row offset Postgres accepts (`OFFSET` is a signed bigint)
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Timestamp wire format.
///
/// Written as `YYYY-MM-DDTHH:MM:SS[.fff]`. Read from RFC 3339 (converted to
/// UTC, offset dropped), `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS`
/// or a bare `YYYY-MM-DD` meaning midnight. A positive RFC 3339 offset whose
/// `+` was decoded to a space is accepted as well.
pub mod datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{Deserialize, Deserializer, Serializer, de};

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    const INPUT_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        let raw = raw.trim();

        parse_exact(raw)
            .or_else(|| {
                let restored = restore_offset_sign(raw)?;
                DateTime::parse_from_rfc3339(&restored)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
            .ok_or_else(|| format!("invalid date-time '{}'", raw))
    }

    fn parse_exact(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }

        INPUT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
    }

    /// A `+hh:mm` offset sent unescaped in a query string decodes as ` hh:mm`.
    fn restore_offset_sign(raw: &str) -> Option<String> {
        let (datetime, offset) = raw.rsplit_once(' ')?;
        let bytes = offset.as_bytes();
        let is_offset = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());

        (is_offset && datetime.contains('T')).then(|| format!("{}+{}", datetime, offset))
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    /// Optional variant; an absent, `null` or blank value is `None`.
    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => {
                    super::parse(&raw).map(Some).map_err(de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}

/// A partner linked to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EventPartner {
    pub id: i32,
    pub event_id: i32,
    /// Partner record owned by the hosting application
    pub partner_id: i32,
}

/// A scheduled event with its partner links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    /// Server-assigned identifier
    pub id: i32,
    pub name: String,
    #[serde(with = "datetime")]
    #[schema(value_type = String, example = "2024-01-01T09:00:00")]
    pub begin_date: NaiveDateTime,
    #[serde(with = "datetime")]
    #[schema(value_type = String, example = "2024-01-02T18:00:00")]
    pub end_date: NaiveDateTime,
    pub description: String,
    /// Always populated, ordered by partner link id
    pub event_partners: Vec<EventPartner>,
}

/// Partner link as sent by clients; only `PartnerId` is used
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EventPartnerPayload {
    #[serde(default, alias = "id")]
    pub id: Option<i32>,
    #[serde(default, alias = "eventId")]
    pub event_id: Option<i32>,
    #[serde(alias = "partnerId")]
    pub partner_id: i32,
}

/// Request body for create and update.
///
/// Mirrors [`Event`]. `Id` is always ignored, and `EventPartners` is only
/// read on create.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EventPayload {
    #[serde(default, alias = "id")]
    pub id: Option<i32>,
    #[serde(default, alias = "name")]
    pub name: Option<String>,
    #[serde(deserialize_with = "datetime::deserialize", alias = "beginDate")]
    #[schema(value_type = String, example = "2024-01-01")]
    pub begin_date: NaiveDateTime,
    #[serde(deserialize_with = "datetime::deserialize", alias = "endDate")]
    #[schema(value_type = String, example = "2024-01-02")]
    pub end_date: NaiveDateTime,
    #[serde(default, alias = "description")]
    pub description: Option<String>,
    #[serde(default, alias = "eventPartners")]
    pub event_partners: Option<Vec<EventPartnerPayload>>,
}

impl EventPayload {
    /// Fields for a fresh row; the client id is dropped here
    pub fn into_new_event(self) -> NewEvent {
        NewEvent {
            name: self.name.unwrap_or_default(),
            begin_date: self.begin_date,
            end_date: self.end_date,
            description: self.description.unwrap_or_default(),
            partner_ids: self
                .event_partners
                .unwrap_or_default()
                .into_iter()
                .map(|p| p.partner_id)
                .collect(),
        }
    }

    /// The four mutable columns
    pub fn into_changes(self) -> EventChanges {
        EventChanges {
            name: self.name.unwrap_or_default(),
            begin_date: self.begin_date,
            end_date: self.end_date,
            description: self.description.unwrap_or_default(),
        }
    }
}

/// Insert input for the repository
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub begin_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub description: String,
    /// Partners to link in the same transaction
    pub partner_ids: Vec<i32>,
}

/// Update input for the repository
#[derive(Debug, Clone, PartialEq)]
pub struct EventChanges {
    pub name: String,
    pub begin_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub description: String,
}

/// Range filter on `BeginDate`, both bounds inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub begin_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl EventFilter {
    pub fn matches(&self, begin_date: NaiveDateTime) -> bool {
        self.begin_date.is_none_or(|from| begin_date >= from)
            && self.end_date.is_none_or(|to| begin_date <= to)
    }

    /// Bounds that cannot match anything (`beginDate > endDate`)
    pub fn is_empty_range(&self) -> bool {
        matches!((self.begin_date, self.end_date), (Some(from), Some(to)) if from > to)
    }
}

/// Zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFrame {
    pub page: u64,
    pub page_size: u64,
}

impl PageFrame {
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip, capped at [`MAX_OFFSET`] so far-away pages are simply empty
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.page_size).min(MAX_OFFSET)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageFrame {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Query string of `GET /events`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Zero-based page index (default 0)
    #[serde(default, alias = "Page")]
    pub page: Option<u64>,
    /// Items per page (default 20, max 100)
    #[serde(default, alias = "PageSize")]
    pub page_size: Option<u64>,
    /// Only events beginning at or after this moment
    #[serde(default, alias = "BeginDate", deserialize_with = "datetime::option::deserialize")]
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub begin_date: Option<NaiveDateTime>,
    /// Only events beginning at or before this moment
    #[serde(default, alias = "EndDate", deserialize_with = "datetime::option::deserialize")]
    #[param(value_type = Option<String>, example = "2024-12-31T23:59:59")]
    pub end_date: Option<NaiveDateTime>,
}

impl EventQuery {
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            begin_date: self.begin_date,
            end_date: self.end_date,
        }
    }

    pub fn frame(&self) -> PageFrame {
        PageFrame::new(
            self.page.unwrap_or(0),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// One page of results plus the size of the whole filtered set
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub total_count: u64,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_count: 0,
        }
    }
}
