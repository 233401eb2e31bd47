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

use crate::{
    file_handler::FileHandler,
    gtfs::{Calendar, CalendarDate, ExceptionType, FeedSink},
    objects::{ServiceCalendar, TimetablePeriod},
    read_utils::{self, FixedWidthLine},
    Error, Result,
};
use anyhow::Context;
use std::collections::BTreeMap;
use tracing::{info, warn};

// Two bits precede the first day of the period
const GUARD_BITS: usize = 2;

/// Default service, running every day of the period
pub(super) const DEFAULT_SERVICE_ID: &str = "0";

/// Decodes the hexadecimal bitfield of a service in one flag per day.
///
/// Each hexadecimal digit holds 4 days, most significant bit first. The
/// first 2 bits are skipped, then exactly `day_range` bits are kept.
pub fn decode_bitfield(service_id: &str, hex: &str, day_range: usize) -> Result<Vec<bool>, Error> {
    let decode_error = |reason: String| Error::CalendarDecode {
        service_id: service_id.to_string(),
        reason,
    };
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for digit in hex.chars() {
        let value = digit
            .to_digit(16)
            .ok_or_else(|| decode_error(format!("invalid hexadecimal digit {:?}", digit)))?;
        bits.extend((0..4).rev().map(|shift| (value >> shift) & 1 == 1));
    }
    let needed = GUARD_BITS + day_range;
    if bits.len() < needed {
        return Err(decode_error(format!(
            "{} bits available, {} needed for {} days",
            bits.len(),
            needed,
            day_range
        )));
    }
    Ok(bits[GUARD_BITS..needed].to_vec())
}

fn parse_service(line: &FixedWidthLine, day_range: usize) -> Result<ServiceCalendar, Error> {
    let id = line.parse_columns("service id", 0, 6)?;
    let days = decode_bitfield(line.columns(0, 6), line.columns_from(6).trim(), day_range)?;
    Ok(ServiceCalendar { id, days })
}

/// Reads the service calendars, keyed by service id
pub(super) fn read<H>(
    file_handler: &mut H,
    file_name: &str,
    period: &TimetablePeriod,
) -> Result<BTreeMap<u32, ServiceCalendar>>
where
    for<'a> &'a mut H: FileHandler,
{
    let (lines, path) = read_utils::read_lines(file_handler, file_name)?;
    let day_range = period.day_range();
    let mut services = BTreeMap::new();
    for line in &lines {
        let service =
            parse_service(line, day_range).with_context(|| format!("Error reading {:?}", path))?;
        if services.contains_key(&service.id) {
            warn!("service {} defined twice, the last one is kept", service.id);
        }
        services.insert(service.id, service);
    }
    info!("{} services read", services.len());
    Ok(services)
}

/// Writes a full week calendar for the default service then for each
/// service, over the whole period.
pub(super) fn write_calendars<S: FeedSink>(
    period: &TimetablePeriod,
    services: &BTreeMap<u32, ServiceCalendar>,
    sink: &mut S,
) -> Result<()> {
    let ids = std::iter::once(DEFAULT_SERVICE_ID.to_string())
        .chain(services.keys().map(u32::to_string));
    for id in ids {
        sink.write_calendar(Calendar::full_week(
            id,
            period.start_date,
            period.end_date,
        ))?;
    }
    Ok(())
}

/// Writes one added date per active day of each service.
///
/// The default service has no exception.
pub(super) fn write_calendar_dates<S: FeedSink>(
    period: &TimetablePeriod,
    services: &BTreeMap<u32, ServiceCalendar>,
    sink: &mut S,
) -> Result<()> {
    for service in services.values() {
        for date in service.active_dates(period) {
            sink.write_calendar_date(CalendarDate {
                service_id: service.id.to_string(),
                date,
                exception_type: ExceptionType::Add,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gtfs::Feed, objects::Date};
    use pretty_assertions::assert_eq;

    fn january() -> TimetablePeriod {
        TimetablePeriod {
            start_date: Date::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: Date::from_ymd_opt(2020, 1, 31).unwrap(),
        }
    }

    #[test]
    fn guard_bits_are_skipped() {
        // 0b0110_1000: guard bits 01, then 1, 0, 1, 0
        let days = decode_bitfield("000003", "68", 4).unwrap();
        assert_eq!(vec![true, false, true, false], days);
    }

    #[test]
    fn bits_after_the_period_are_ignored() {
        let days = decode_bitfield("000003", "FF", 3).unwrap();
        assert_eq!(vec![true; 3], days);
    }

    #[test]
    fn too_short_bitfield() {
        let error = decode_bitfield("000003", "FF", 7).unwrap_err();
        assert_eq!(
            "cannot decode bitfield of service 000003: 8 bits available, 9 needed for 7 days",
            error.to_string()
        );
    }

    #[test]
    fn invalid_hexadecimal_digit() {
        let error = decode_bitfield("000003", "FZ", 2).unwrap_err();
        assert!(matches!(error, Error::CalendarDecode { .. }));
    }

    #[test]
    fn full_january() {
        // 2 guard bits and 31 days set, 3 bits left in the last digit
        let line = FixedWidthLine::new(1, "000001FFFFFFFFE");
        let service = parse_service(&line, 31).unwrap();
        assert_eq!(1, service.id);
        assert_eq!(vec![true; 31], service.days);

        let period = january();
        let services: BTreeMap<u32, ServiceCalendar> = vec![(1, service)].into_iter().collect();
        let mut feed = Feed::default();
        write_calendars(&period, &services, &mut feed).unwrap();
        write_calendar_dates(&period, &services, &mut feed).unwrap();

        let ids: Vec<&str> = feed.calendars.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(vec!["0", "1"], ids);
        let calendar = &feed.calendars[1];
        assert!(calendar.monday && calendar.sunday);
        assert_eq!(period.start_date, calendar.start_date);
        assert_eq!(period.end_date, calendar.end_date);

        assert_eq!(31, feed.calendar_dates.len());
        assert!(feed.calendar_dates.iter().all(|d| d.service_id == "1"
            && d.exception_type == ExceptionType::Add));
        assert_eq!(period.start_date, feed.calendar_dates[0].date);
        assert_eq!(period.end_date, feed.calendar_dates[30].date);
    }

    #[test]
    fn services_are_written_in_id_order() {
        let period = january();
        let services: BTreeMap<u32, ServiceCalendar> = vec![12, 3]
            .into_iter()
            .map(|id| {
                (
                    id,
                    ServiceCalendar {
                        id,
                        days: vec![false; 31],
                    },
                )
            })
            .collect();
        let mut feed = Feed::default();
        write_calendars(&period, &services, &mut feed).unwrap();
        write_calendar_dates(&period, &services, &mut feed).unwrap();
        let ids: Vec<&str> = feed.calendars.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(vec!["0", "3", "12"], ids);
        assert!(feed.calendar_dates.is_empty());
    }
}
