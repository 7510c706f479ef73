//! Program records and link-identity parsing
//!
//! A detail-page URL carries the program's identity in its path basename:
//! an 18-character prefix where characters 2..6 are the station code and
//! characters 6..18 are the start time as `YYYYMMDDHHMM` in the guide
//! site's local zone. For example
//! `http://tv.example.jp/schedule/101048201511291800.action` is channel
//! 1048 starting 2015-11-29 18:00.

use crate::PageError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use url::Url;

/// Length of the identity prefix at the start of a detail-page basename
pub const IDENTITY_LEN: usize = 18;

/// Strptime format of the embedded start time
const START_TIME_FORMAT: &str = "%Y%m%d%H%M";

/// One upcoming broadcast program, the unit of pipeline output.
///
/// The end time is always derived from `start_time + duration` and never
/// stored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Station code parsed from the detail link
    pub channel_id: u32,

    /// Program title from the detail page, trimmed
    pub title: String,

    /// Start time parsed from the detail link, in the site's local zone
    pub start_time: DateTime<FixedOffset>,

    /// Broadcast length in minutes, from the schedule text
    pub duration_minutes: i64,

    /// Canonical absolute URL of the detail page
    pub link: String,
}

impl Program {
    /// Broadcast length as a chrono duration
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    /// Derived end time, `start_time + duration`
    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.start_time + self.duration()
    }
}

/// The channel and start time recoverable from a detail link alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIdentity {
    pub channel_id: u32,
    pub start_time: DateTime<FixedOffset>,
}

impl ProgramIdentity {
    /// Parses the identity prefix out of a detail-page URL.
    ///
    /// # Arguments
    ///
    /// * `link` - Absolute detail-page URL
    /// * `zone` - The guide site's fixed local zone
    pub fn from_link(link: &Url, zone: FixedOffset) -> Result<Self, PageError> {
        let basename = identity_key(link)?;

        let prefix = basename
            .get(..IDENTITY_LEN)
            .ok_or_else(|| PageError::BadIdentity(basename.to_string()))?;

        let channel_id = prefix
            .get(2..6)
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| PageError::BadChannel(prefix.to_string()))?;

        let start_time = prefix
            .get(6..IDENTITY_LEN)
            .and_then(|s| NaiveDateTime::parse_from_str(s, START_TIME_FORMAT).ok())
            .and_then(|naive| naive.and_local_timezone(zone).single())
            .ok_or_else(|| PageError::BadStartTime(prefix.to_string()))?;

        Ok(Self {
            channel_id,
            start_time,
        })
    }
}

/// Returns the dedup identity of a detail link: its path basename.
///
/// The full basename (extension included) is the canonical key; the same
/// program rediscovered through overlapping chart windows always resolves
/// to the same basename.
pub fn identity_key(link: &Url) -> Result<&str, PageError> {
    link.path_segments()
        .and_then(|segments| segments.last())
        .filter(|basename| !basename.is_empty())
        .ok_or_else(|| PageError::BadIdentity(link.path().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn detail_url(basename: &str) -> Url {
        Url::parse(&format!("http://tv.example.jp/schedule/{}", basename)).unwrap()
    }

    #[test]
    fn test_identity_key_is_basename() {
        let url = detail_url("101048201511291800.action");
        assert_eq!(identity_key(&url).unwrap(), "101048201511291800.action");
    }

    #[test]
    fn test_identity_key_empty_path() {
        let url = Url::parse("http://tv.example.jp/").unwrap();
        assert!(identity_key(&url).is_err());
    }

    #[test]
    fn test_parse_identity() {
        let url = detail_url("AA1234201511291800.action");
        let identity = ProgramIdentity::from_link(&url, jst()).unwrap();

        assert_eq!(identity.channel_id, 1234);
        assert_eq!(
            identity.start_time,
            jst().with_ymd_and_hms(2015, 11, 29, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_identity_round_trip() {
        // Encode a synthetic link with known channel and time, decode,
        // expect equality.
        let channel_id = 1048u32;
        let start = jst().with_ymd_and_hms(2015, 11, 29, 18, 0, 0).unwrap();
        let basename = format!("10{:04}{}.action", channel_id, start.format("%Y%m%d%H%M"));

        let identity = ProgramIdentity::from_link(&detail_url(&basename), jst()).unwrap();
        assert_eq!(identity.channel_id, channel_id);
        assert_eq!(identity.start_time, start);
    }

    #[test]
    fn test_short_basename_rejected() {
        let url = detail_url("1010482015.action");
        assert!(matches!(
            ProgramIdentity::from_link(&url, jst()),
            Err(PageError::BadIdentity(_))
        ));
    }

    #[test]
    fn test_non_numeric_channel_rejected() {
        let url = detail_url("10XX48201511291800.action");
        assert!(matches!(
            ProgramIdentity::from_link(&url, jst()),
            Err(PageError::BadChannel(_))
        ));
    }

    #[test]
    fn test_invalid_date_rejected() {
        // Month 13 is not a date
        let url = detail_url("101048201513291800.action");
        assert!(matches!(
            ProgramIdentity::from_link(&url, jst()),
            Err(PageError::BadStartTime(_))
        ));
    }

    #[test]
    fn test_end_time_is_start_plus_duration() {
        let program = Program {
            channel_id: 1048,
            title: "ニュース".to_string(),
            start_time: jst().with_ymd_and_hms(2015, 11, 29, 18, 0, 0).unwrap(),
            duration_minutes: 60,
            link: "http://tv.example.jp/schedule/101048201511291800.action".to_string(),
        };

        assert_eq!(program.end_time() - program.start_time, program.duration());
        assert_eq!(
            program.end_time(),
            jst().with_ymd_and_hms(2015, 11, 29, 19, 0, 0).unwrap()
        );
    }
}
