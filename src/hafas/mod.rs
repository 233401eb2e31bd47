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

//! HAFAS raw data management.
//!
//! The files are read in a fixed order, each one depending on the previous
//! ones:
//! - `eckdaten`: the timetable period
//! - `bitfeld`: the days of each service
//! - `bfkoord`: the coordinates of the stops
//! - `bahnhof`: the names of the stops
//! - `fplan`: the trips and their stop times

mod bitfeld;
mod eckdaten;
mod fplan;
mod routes;
mod stops;

pub use bitfeld::decode_bitfield;
pub use eckdaten::parse_date;
pub use routes::{RouteResolver, RouteTypes, TripResolver};
pub use stops::StopRegistry;

use crate::{
    configuration::Configuration,
    file_handler::{FileHandler, PathFileHandler, ZipHandler},
    gtfs::{Agency, FeedSink},
    objects::ServiceCalendar,
    projection::{Projection, Projector},
    Result,
};
use std::{collections::BTreeMap, fs::File, path::Path};
use tracing::info;

/// Identifier of the single agency of the feed
pub const AGENCY_ID: &str = "1";

/// State of one conversion.
///
/// Every registry lives as long as the conversion, nothing is shared
/// between two conversions.
pub struct Converter<S: FeedSink> {
    configuration: Configuration,
    projector: Box<dyn Projector>,
    route_types: RouteTypes,
    services: BTreeMap<u32, ServiceCalendar>,
    stops: StopRegistry,
    routes: RouteResolver,
    trips: TripResolver,
    sink: S,
}

impl<S: FeedSink> Converter<S> {
    /// Creates a conversion writing its rows in `sink`
    pub fn new(configuration: Configuration, projector: Box<dyn Projector>, sink: S) -> Self {
        let route_types = RouteTypes::new(&configuration.route_types);
        Converter {
            configuration,
            projector,
            route_types,
            services: BTreeMap::new(),
            stops: StopRegistry::default(),
            routes: RouteResolver::default(),
            trips: TripResolver::default(),
            sink,
        }
    }

    /// Converts the HAFAS files of `file_handler` and returns the sink.
    ///
    /// Stops at the first error; rows already written stay in the sink.
    pub fn convert<H>(mut self, file_handler: &mut H) -> Result<S>
    where
        for<'a> &'a mut H: FileHandler,
    {
        let period = eckdaten::read(file_handler, self.configuration.file_name("eckdaten"))?;
        self.write_agency()?;

        self.services = bitfeld::read(
            file_handler,
            self.configuration.file_name("bitfeld"),
            &period,
        )?;
        bitfeld::write_calendars(&period, &self.services, &mut self.sink)?;
        bitfeld::write_calendar_dates(&period, &self.services, &mut self.sink)?;

        stops::read_bfkoord(
            file_handler,
            self.configuration.file_name("bfkoord"),
            self.projector.as_ref(),
            &mut self.stops,
        )?;
        stops::read_bahnhof(
            file_handler,
            self.configuration.file_name("bahnhof"),
            &mut self.stops,
        )?;

        let fplan = self.configuration.file_name("fplan").to_string();
        fplan::read(file_handler, &fplan, &mut self)?;
        info!(
            "{} services, {} stops, {} routes and {} trips converted",
            self.services.len() + 1,
            self.stops.emitted_count(),
            self.routes.len(),
            self.trips.len()
        );
        Ok(self.sink)
    }

    fn write_agency(&mut self) -> Result<()> {
        let agency = &self.configuration.agency;
        self.sink.write_agency(Agency {
            id: AGENCY_ID.to_string(),
            name: agency.name.clone(),
            url: agency.url.clone(),
            timezone: agency.timezone.clone(),
            lang: agency.lang.clone(),
            phone: agency.phone.clone(),
        })
    }
}

fn convert<H, S>(file_handler: &mut H, configuration: Configuration, sink: S) -> Result<S>
where
    for<'a> &'a mut H: FileHandler,
    S: FeedSink,
{
    // unknown projections must fail before any file is read
    let projection = Projection::from_name(configuration.projection.as_deref())?;
    Converter::new(configuration, Box::new(projection), sink).convert(file_handler)
}

/// Converts the HAFAS files of the `path` directory, writing the rows in
/// `sink`.
///
/// The `configuration` gives the agency, the projection of the coordinates
/// and the actual names of the files.
pub fn read_from_path<P: AsRef<Path>, S: FeedSink>(
    p: P,
    configuration: Configuration,
    sink: S,
) -> Result<S> {
    let mut file_handler = PathFileHandler::new(p.as_ref().to_path_buf());
    convert(&mut file_handler, configuration, sink)
}

/// Converts the HAFAS files of a zip archive, writing the rows in `sink`.
///
/// Files are found by name, wherever they are in the archive.
pub fn read_from_zip<P: AsRef<Path>, S: FeedSink>(
    p: P,
    configuration: Configuration,
    sink: S,
) -> Result<S> {
    let reader = File::open(p.as_ref())?;
    let mut file_handler = ZipHandler::new(reader, p)?;
    convert(&mut file_handler, configuration, sink)
}
