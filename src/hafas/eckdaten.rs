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
    objects::{Date, TimetablePeriod},
    read_utils::{self, FixedWidthLine},
    Error, Result,
};
use anyhow::Context;
use tracing::warn;

/// Parses a `DD.MM.YYYY` date
pub fn parse_date(value: &str) -> Result<Date, Error> {
    Date::parse_from_str(value.trim(), "%d.%m.%Y").map_err(|source| Error::DateParse {
        value: value.to_string(),
        source,
    })
}

fn parse_period(lines: &[FixedWidthLine]) -> Result<TimetablePeriod, Error> {
    let mut lines = lines.iter();
    let mut next_date = |field| match lines.next() {
        Some(line) => parse_date(line.text()),
        None => Err(Error::MissingField { line: 0, field }),
    };
    let start_date = next_date("start date")?;
    let end_date = next_date("end date")?;
    Ok(TimetablePeriod {
        start_date,
        end_date,
    })
}

/// Reads the timetable period, first line is the start date and second
/// line the end date.
pub(super) fn read<H>(file_handler: &mut H, file_name: &str) -> Result<TimetablePeriod>
where
    for<'a> &'a mut H: FileHandler,
{
    let (lines, path) = read_utils::read_lines(file_handler, file_name)?;
    let period = parse_period(&lines).with_context(|| format!("Error reading {:?}", path))?;
    if period.end_date < period.start_date {
        warn!(
            "timetable ends on {} before starting on {}, no service day will be generated",
            period.end_date, period.start_date
        );
    }
    Ok(period)
}
