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

use approx::assert_relative_eq;
use hafas_model::{
    configuration::Configuration,
    gtfs::{Feed, Stop},
    hafas, projection, Error,
};

const GK_COLOGNE: &str = "tests/fixtures/gk_cologne/input";

fn read_with(projection: &str) -> hafas_model::Result<Feed> {
    let configuration = Configuration {
        projection: Some(projection.to_string()),
        ..Default::default()
    };
    hafas::read_from_path(GK_COLOGNE, configuration, Feed::default())
}

fn stop<'a>(feed: &'a Feed, id: &str) -> &'a Stop {
    feed.stops.iter().find(|stop| stop.id == id).unwrap()
}

#[test]
fn gk_cologne_coordinates() {
    let feed = read_with(projection::GK_COLOGNE).unwrap();
    let heumarkt = stop(&feed, "1");
    assert_relative_eq!(6.959, heumarkt.lon.unwrap(), epsilon = 1e-2);
    assert_relative_eq!(50.936, heumarkt.lat.unwrap(), epsilon = 1e-2);
    let gladbach = stop(&feed, "2");
    assert_relative_eq!(7.13, gladbach.lon.unwrap(), epsilon = 1e-1);
    assert_relative_eq!(51.0, gladbach.lat.unwrap(), epsilon = 1e-1);
}

#[test]
fn proj_definition() {
    let definition = "+proj=tmerc +lat_0=0 +lon_0=6 +k=1 +x_0=2500000 +y_0=0 +ellps=bessel \
                      +towgs84=582,105,414,1.04,0.35,-3.08,8.3 +units=m +no_defs";
    let feed = read_with(definition).unwrap();
    let heumarkt = stop(&feed, "1");
    assert_relative_eq!(6.959, heumarkt.lon.unwrap(), epsilon = 1e-2);
    assert_relative_eq!(50.936, heumarkt.lat.unwrap(), epsilon = 1e-2);
}

#[test]
fn unknown_projection() {
    let error = read_with("+proj=nowhere").unwrap_err();
    assert!(matches!(
        error.downcast_ref::<Error>(),
        Some(Error::UnknownProjection(_))
    ));
}
