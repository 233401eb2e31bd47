// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Objects decoded from the HAFAS files.

use chrono::{Duration, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;

/// A calendar day
pub type Date = NaiveDate;

/// Time of a stop in a trip, without seconds.
///
/// Hours may go beyond 23 for trips running after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time {
    hours: u32,
    minutes: u32,
}

impl Time {
    /// Creates a `Time` from hours and minutes
    pub fn new(hours: u32, minutes: u32) -> Self {
        Time { hours, minutes }
    }
    /// Hours part
    pub fn hours(&self) -> u32 {
        self.hours
    }
    /// Minutes part
    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}:00", self.hours, self.minutes)
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
}

/// Validity window of the timetable, both bounds included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetablePeriod {
    /// First day of the timetable
    pub start_date: Date,
    /// Last day of the timetable
    pub end_date: Date,
}

impl TimetablePeriod {
    /// Number of days in the period, 0 if `end_date` is before `start_date`.
    pub fn day_range(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days() + 1;
        usize::try_from(days).unwrap_or(0)
    }

    /// Date of the `offset`-th day of the period
    pub fn date_at(&self, offset: usize) -> Date {
        self.start_date + Duration::days(offset as i64)
    }
}

/// Days of the timetable period on which a service runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCalendar {
    /// Bitfield number
    pub id: u32,
    /// `days[i]` is true if the service runs on the `i`-th day of the period
    pub days: Vec<bool>,
}

impl ServiceCalendar {
    /// Dates of the period on which the service runs
    pub fn active_dates<'a>(
        &'a self,
        period: &'a TimetablePeriod,
    ) -> impl Iterator<Item = Date> + 'a {
        self.days
            .iter()
            .enumerate()
            .filter(|(_, active)| **active)
            .map(move |(offset, _)| period.date_at(offset))
    }
}

/// A stop as known from `bfkoord` and `bahnhof`.
///
/// Both files are keyed by the same numeric id and may each describe only
/// part of the stop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopRecord {
    /// Name of the stop
    pub name: Option<String>,
    /// Code of the transport authority
    pub authority: Option<String>,
    /// Position of the stop
    pub coord: Option<Coord>,
    pub(crate) emitted: bool,
}

impl StopRecord {
    /// True once the stop has been written to the feed
    pub fn is_emitted(&self) -> bool {
        self.emitted
    }
}

/// Properties of a trip gathered from the `*` lines preceding its stops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripMeta {
    /// Service number, used as trip id (`*Z`)
    pub service_number: Option<u32>,
    /// Administration code (`*Z`)
    pub administration: Option<String>,
    /// Number of intervals (`*Z`)
    pub number_intervals: Option<String>,
    /// Time offset between intervals (`*Z`)
    pub time_offset: Option<String>,
    /// Transport mode code (`*G`)
    pub mean_of_transport: Option<String>,
    /// First stop the bitfield applies to (`*A VE`)
    pub start_index: Option<String>,
    /// Last stop the bitfield applies to (`*A VE`)
    pub end_index: Option<String>,
    /// Bitfield number, the service id of the trip (`*A VE`)
    pub bitfield_number: Option<u32>,
    /// Line number, used as route id (`*L`)
    pub line_number: Option<String>,
    /// Direction code (`*R`)
    pub direction: Option<String>,
}

impl TripMeta {
    /// Overwrites the fields set in `other`, keeps the others.
    pub fn merge(&mut self, other: TripMeta) {
        fn update<T>(field: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *field = value;
            }
        }
        update(&mut self.service_number, other.service_number);
        update(&mut self.administration, other.administration);
        update(&mut self.number_intervals, other.number_intervals);
        update(&mut self.time_offset, other.time_offset);
        update(&mut self.mean_of_transport, other.mean_of_transport);
        update(&mut self.start_index, other.start_index);
        update(&mut self.end_index, other.end_index);
        update(&mut self.bitfield_number, other.bitfield_number);
        update(&mut self.line_number, other.line_number);
        update(&mut self.direction, other.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn time_is_written_with_zero_seconds() {
        assert_eq!("06:35:00", Time::new(6, 35).to_string());
        assert_eq!("25:01:00", Time::new(25, 1).to_string());
    }

    #[test]
    fn day_range_includes_both_bounds() {
        let period = TimetablePeriod {
            start_date: Date::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: Date::from_ymd_opt(2020, 1, 31).unwrap(),
        };
        assert_eq!(31, period.day_range());
        assert_eq!(Date::from_ymd_opt(2020, 1, 31).unwrap(), period.date_at(30));
    }

    #[test]
    fn inverted_period_is_empty() {
        let period = TimetablePeriod {
            start_date: Date::from_ymd_opt(2020, 2, 1).unwrap(),
            end_date: Date::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(0, period.day_range());
    }

    #[test]
    fn active_dates_follow_days() {
        let period = TimetablePeriod {
            start_date: Date::from_ymd_opt(2020, 2, 28).unwrap(),
            end_date: Date::from_ymd_opt(2020, 3, 1).unwrap(),
        };
        let calendar = ServiceCalendar {
            id: 3,
            days: vec![false, true, true],
        };
        let dates: Vec<Date> = calendar.active_dates(&period).collect();
        assert_eq!(
            vec![
                Date::from_ymd_opt(2020, 2, 29).unwrap(),
                Date::from_ymd_opt(2020, 3, 1).unwrap(),
            ],
            dates
        );
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut meta = TripMeta {
            service_number: Some(12),
            line_number: Some("7".to_string()),
            ..Default::default()
        };
        meta.merge(TripMeta {
            line_number: Some("8".to_string()),
            direction: Some("H".to_string()),
            ..Default::default()
        });
        assert_eq!(Some(12), meta.service_number);
        assert_eq!(Some("8".to_string()), meta.line_number);
        assert_eq!(Some("H".to_string()), meta.direction);
    }
}
