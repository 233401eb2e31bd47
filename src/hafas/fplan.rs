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

//! Reading of the schedule file.
//!
//! The file is a sequence of trips. Each trip starts with `*` lines
//! describing it, followed by one line per stop:
//! ```text
//! *Z 01234 000001       001 000
//! *G BUS 0000669 0000001
//! *A VE 0000669 0000001 000001
//! *L 100
//! *R H
//! 0000669 Refrath                   0635
//! 0000001 Köln Heumarkt        0702
//! ```
//! Lines starting with `%` are comments.

use super::Converter;
use crate::{
    file_handler::FileHandler,
    gtfs::{FeedSink, StopTime},
    objects::{Time, TripMeta},
    read_utils::{self, FixedWidthLine},
    Error, Result,
};
use anyhow::Context;
use tracing::{debug, info, warn};

const COMMENT: char = '%';
const META: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Meta,
    Data,
}

/// A line of a trip giving a stop and its times
#[derive(Debug, Clone, PartialEq)]
struct StopLine {
    stop_id: u32,
    // decoded, never written
    #[allow(dead_code)]
    stop_name: String,
    arrival: Option<Time>,
    departure: Option<Time>,
}

type MetaExtractor = fn(&FixedWidthLine) -> Result<TripMeta, Error>;

fn meta_extractor(tag: Option<char>) -> MetaExtractor {
    match tag {
        Some('Z') => parse_service_number,
        Some('G') => parse_mean_of_transport,
        Some('A') => parse_attribute,
        Some('L') => parse_line_number,
        Some('R') => parse_direction,
        // notes of `I` lines are not converted
        Some('I') => no_meta,
        _ => no_meta,
    }
}

fn no_meta(_: &FixedWidthLine) -> Result<TripMeta, Error> {
    Ok(TripMeta::default())
}

fn raw_columns(line: &FixedWidthLine, start: usize, end: usize) -> Option<String> {
    Some(line.columns(start, end).to_string())
}

fn parse_service_number(line: &FixedWidthLine) -> Result<TripMeta, Error> {
    Ok(TripMeta {
        service_number: Some(line.parse_columns("service number", 3, 8)?),
        administration: raw_columns(line, 9, 15),
        number_intervals: raw_columns(line, 22, 25),
        time_offset: raw_columns(line, 26, 29),
        ..Default::default()
    })
}

fn parse_mean_of_transport(line: &FixedWidthLine) -> Result<TripMeta, Error> {
    Ok(TripMeta {
        mean_of_transport: Some(line.columns(3, 6).trim().to_string()),
        ..Default::default()
    })
}

fn parse_attribute(line: &FixedWidthLine) -> Result<TripMeta, Error> {
    // only the traffic days attribute is used
    if line.columns(3, 5) != "VE" {
        return Ok(TripMeta::default());
    }
    Ok(TripMeta {
        start_index: raw_columns(line, 6, 13),
        end_index: raw_columns(line, 14, 21),
        bitfield_number: Some(line.parse_columns("bitfield number", 22, 28)?),
        ..Default::default()
    })
}

fn parse_line_number(line: &FixedWidthLine) -> Result<TripMeta, Error> {
    let line_number = line.columns(3, 11).trim();
    if line_number.is_empty() {
        // still overrides a previous line number of the block
        warn!("line {}: blank line number, route id from the counter", line.number());
    }
    Ok(TripMeta {
        line_number: Some(line_number.to_string()),
        ..Default::default()
    })
}

fn parse_direction(line: &FixedWidthLine) -> Result<TripMeta, Error> {
    let direction = line.columns(3, 4).trim();
    Ok(TripMeta {
        direction: Some(direction.to_string()).filter(|d| !d.is_empty()),
        ..Default::default()
    })
}

fn parse_time(
    line: &FixedWidthLine,
    field: &'static str,
    start: usize,
    end: usize,
) -> Result<Option<Time>, Error> {
    let value = line.columns(start, end).trim();
    if value.is_empty() {
        return Ok(None);
    }
    let time = FixedWidthLine::new(line.number(), value);
    let hours = time.parse_columns(field, 0, 2)?;
    let minutes = time.parse_columns(field, 2, 4)?;
    Ok(Some(Time::new(hours, minutes)))
}

fn parse_stop_line(line: &FixedWidthLine) -> Result<StopLine, Error> {
    Ok(StopLine {
        stop_id: line.parse_columns("stop id", 0, 7)?,
        stop_name: line.columns(8, 29).trim().to_string(),
        arrival: parse_time(line, "arrival time", 29, 33)?,
        departure: parse_time(line, "departure time", 34, 38)?,
    })
}

/// Scanner of the schedule file, writing the trips as they are read.
struct TimetableParser {
    state: State,
    meta: TripMeta,
    trip_id: String,
    stop_sequence: u32,
}

impl Default for TimetableParser {
    fn default() -> Self {
        TimetableParser {
            state: State::Meta,
            meta: TripMeta::default(),
            trip_id: String::new(),
            stop_sequence: 0,
        }
    }
}

impl TimetableParser {
    fn parse_line<S: FeedSink>(
        &mut self,
        line: &FixedWidthLine,
        converter: &mut Converter<S>,
    ) -> Result<()> {
        match line.text().chars().next() {
            Some(COMMENT) => Ok(()),
            Some(META) => self.on_meta(line),
            _ => self.on_data(line, converter),
        }
    }

    fn on_meta(&mut self, line: &FixedWidthLine) -> Result<()> {
        if self.state == State::Data {
            self.meta = TripMeta::default();
            self.state = State::Meta;
        }
        let extract = meta_extractor(line.columns(1, 2).chars().next());
        self.meta.merge(extract(line)?);
        Ok(())
    }

    fn on_data<S: FeedSink>(
        &mut self,
        line: &FixedWidthLine,
        converter: &mut Converter<S>,
    ) -> Result<()> {
        if self.state != State::Data {
            self.start_trip(line.number(), converter)?;
        }
        let stop_line = parse_stop_line(line)?;
        let (arrival_time, departure_time) = match (stop_line.arrival, stop_line.departure) {
            (None, None) => {
                warn!(
                    "line {}: stop {} of trip {} has no time, skipped",
                    line.number(),
                    stop_line.stop_id,
                    self.trip_id
                );
                return Ok(());
            }
            (arrival, departure) => (arrival.or(departure), departure.or(arrival)),
        };
        self.stop_sequence += 1;
        let stop_id = converter
            .stops
            .resolve_and_emit(stop_line.stop_id, &mut converter.sink)?;
        converter.sink.write_stop_time(StopTime {
            trip_id: self.trip_id.clone(),
            arrival_time,
            departure_time,
            stop_id,
            stop_sequence: self.stop_sequence,
            ..Default::default()
        })
    }

    fn start_trip<S: FeedSink>(&mut self, line: usize, converter: &mut Converter<S>) -> Result<()> {
        let route_id = converter.routes.resolve_and_emit(
            &self.meta,
            &converter.route_types,
            &mut converter.sink,
        )?;
        self.trip_id = converter.trips.resolve_and_emit(
            &self.meta,
            &route_id,
            line,
            &mut converter.sink,
        )?;
        if let Some(service) = self.meta.bitfield_number {
            if !converter.services.contains_key(&service) {
                warn!(
                    "line {}: trip {} uses the unknown service {}",
                    line, self.trip_id, service
                );
            }
        }
        debug!("trip {} on route {}", self.trip_id, route_id);
        self.stop_sequence = 0;
        self.state = State::Data;
        Ok(())
    }
}

fn convert_lines<S: FeedSink>(
    lines: &[FixedWidthLine],
    converter: &mut Converter<S>,
) -> Result<()> {
    let mut parser = TimetableParser::default();
    for line in lines {
        parser.parse_line(line, converter)?;
    }
    Ok(())
}

/// Reads the trips and writes routes, trips, stops and stop times
pub(super) fn read<H, S>(
    file_handler: &mut H,
    file_name: &str,
    converter: &mut Converter<S>,
) -> Result<()>
where
    for<'a> &'a mut H: FileHandler,
    S: FeedSink,
{
    let (lines, path) = read_utils::read_lines(file_handler, file_name)?;
    convert_lines(&lines, converter).with_context(|| format!("Error reading {:?}", path))?;
    info!("{} schedule lines read", lines.len());
    Ok(())
}
