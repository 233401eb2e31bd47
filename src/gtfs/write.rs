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

use super::*;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

struct TableWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl TableWriter {
    fn create(directory: &Path, file: &str, header: &[&str]) -> Result<Self> {
        info!(file_name = %file, "Writing");
        let path = directory.join(file);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("Error reading {path:?}"))?;
        writer
            .write_record(header)
            .with_context(|| format!("Error writing {path:?}"))?;
        Ok(TableWriter { path, writer })
    }

    fn serialize<T: Serialize>(&mut self, row: T) -> Result<()> {
        self.writer
            .serialize(row)
            .with_context(|| format!("Error writing {:?}", self.path))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Error writing {:?}", self.path))
    }
}

/// Writes the GTFS tables as csv files of a directory.
///
/// Every file is created with its header when the writer is built, so
/// tables without rows are still present.
pub struct CsvFeedWriter {
    agency: TableWriter,
    routes: TableWriter,
    trips: TableWriter,
    stop_times: TableWriter,
    stops: TableWriter,
    calendar: TableWriter,
    calendar_dates: TableWriter,
}

impl CsvFeedWriter {
    /// Creates the GTFS files in the existing directory `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Ok(CsvFeedWriter {
            agency: TableWriter::create(path, "agency.txt", &AGENCY_HEADER)?,
            routes: TableWriter::create(path, "routes.txt", &ROUTES_HEADER)?,
            trips: TableWriter::create(path, "trips.txt", &TRIPS_HEADER)?,
            stop_times: TableWriter::create(path, "stop_times.txt", &STOP_TIMES_HEADER)?,
            stops: TableWriter::create(path, "stops.txt", &STOPS_HEADER)?,
            calendar: TableWriter::create(path, "calendar.txt", &CALENDAR_HEADER)?,
            calendar_dates: TableWriter::create(
                path,
                "calendar_dates.txt",
                &CALENDAR_DATES_HEADER,
            )?,
        })
    }

    /// Flushes every file
    pub fn flush(&mut self) -> Result<()> {
        self.agency.flush()?;
        self.routes.flush()?;
        self.trips.flush()?;
        self.stop_times.flush()?;
        self.stops.flush()?;
        self.calendar.flush()?;
        self.calendar_dates.flush()
    }
}

impl FeedSink for CsvFeedWriter {
    fn write_agency(&mut self, agency: Agency) -> Result<()> {
        self.agency.serialize(agency)
    }
    fn write_route(&mut self, route: Route) -> Result<()> {
        self.routes.serialize(route)
    }
    fn write_trip(&mut self, trip: Trip) -> Result<()> {
        self.trips.serialize(trip)
    }
    fn write_stop_time(&mut self, stop_time: StopTime) -> Result<()> {
        self.stop_times.serialize(stop_time)
    }
    fn write_stop(&mut self, stop: Stop) -> Result<()> {
        self.stops.serialize(stop)
    }
    fn write_calendar(&mut self, calendar: Calendar) -> Result<()> {
        self.calendar.serialize(calendar)
    }
    fn write_calendar_date(&mut self, calendar_date: CalendarDate) -> Result<()> {
        self.calendar_dates.serialize(calendar_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn serialized_header<T: Serialize>(row: T) -> String {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(row).unwrap();
        let content = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        content.lines().next().unwrap().to_string()
    }

    #[test]
    fn headers_match_rows() {
        let date = Date::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(AGENCY_HEADER.join(","), serialized_header(Agency::default()));
        assert_eq!(ROUTES_HEADER.join(","), serialized_header(Route::default()));
        assert_eq!(TRIPS_HEADER.join(","), serialized_header(Trip::default()));
        assert_eq!(
            STOP_TIMES_HEADER.join(","),
            serialized_header(StopTime::default())
        );
        assert_eq!(STOPS_HEADER.join(","), serialized_header(Stop::default()));
        assert_eq!(
            CALENDAR_HEADER.join(","),
            serialized_header(Calendar::full_week("0".to_string(), date, date))
        );
        assert_eq!(
            CALENDAR_DATES_HEADER.join(","),
            serialized_header(CalendarDate {
                service_id: "0".to_string(),
                date,
                exception_type: ExceptionType::Add,
            })
        );
    }

    #[test]
    fn empty_tables_have_a_header() {
        test_in_tmp_dir(|path| {
            let mut writer = CsvFeedWriter::new(path).unwrap();
            writer.flush().unwrap();
            let routes = fs::read_to_string(path.join("routes.txt")).unwrap();
            assert_eq!(format!("{}\n", ROUTES_HEADER.join(",")), routes);
            assert!(path.join("calendar_dates.txt").is_file());
        });
    }

    #[test]
    fn write_rows() {
        test_in_tmp_dir(|path| {
            let mut writer = CsvFeedWriter::new(path).unwrap();
            writer
                .write_stop_time(StopTime {
                    trip_id: "17".to_string(),
                    arrival_time: Some(Time::new(6, 35)),
                    departure_time: Some(Time::new(6, 36)),
                    stop_id: "669".to_string(),
                    stop_sequence: 1,
                    ..Default::default()
                })
                .unwrap();
            writer
                .write_calendar(Calendar::full_week(
                    "1".to_string(),
                    Date::from_ymd_opt(2020, 1, 1).unwrap(),
                    Date::from_ymd_opt(2020, 1, 31).unwrap(),
                ))
                .unwrap();
            writer.flush().unwrap();
            let stop_times = fs::read_to_string(path.join("stop_times.txt")).unwrap();
            assert_eq!(
                "trip_id,arrival_time,departure_time,stop_id,stop_sequence,stop_headsign,pickup_type,drop_off_type,shape_dist_traveled\n\
                 17,06:35:00,06:36:00,669,1,,0,0,0\n",
                stop_times
            );
            let calendar = fs::read_to_string(path.join("calendar.txt")).unwrap();
            assert!(calendar.ends_with("1,1,1,1,1,1,1,1,20200101,20200131\n"));
        });
    }
}
