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

//! Conversion of the planar coordinates of `bfkoord` to WGS84.

use crate::{objects::Coord, Error, Result};
#[cfg(feature = "proj")]
use anyhow::anyhow;
#[cfg(feature = "proj")]
use proj::Proj;
use std::fmt;
use tracing::info;

/// UTM zone 32 on the WGS84 ellipsoid
pub const UTM: &str = "utm";
/// Historical Gauss-Krüger grid of Cologne
pub const GK_COLOGNE: &str = "gk_cologne";

#[cfg(feature = "proj")]
const UTM_DEFINITION: &str = "+proj=utm +zone=32 +ellps=WGS84 +units=m +no_defs";
#[cfg(feature = "proj")]
const GK_COLOGNE_DEFINITION: &str = "+proj=tmerc +lat_0=0 +lon_0=6 +k=1 +x_0=2500000 +y_0=0 \
     +ellps=bessel +towgs84=582,105,414,1.04,0.35,-3.08,8.3 +units=m +no_defs";
// 'EPSG:4326' swaps the axis, the definition below is equivalent (see https://epsg.io/4326)
#[cfg(feature = "proj")]
const WGS84_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Converts planar coordinates to WGS84 coordinates.
pub trait Projector {
    /// WGS84 coordinates of the point `(x, y)`
    fn to_wgs84(&self, x: f64, y: f64) -> Result<Coord>;
}

/// The built-in projectors.
pub enum Projection {
    /// `x` is the longitude and `y` the latitude
    Identity,
    /// Inverse projection computed by proj
    #[cfg(feature = "proj")]
    Proj {
        /// Name given by the user
        name: String,
        /// Converter to WGS84
        converter: Proj,
    },
}

impl Projection {
    /// Builds the projector named `name`.
    ///
    /// - no name: [`Projection::Identity`]
    /// - `utm`: UTM zone 32, WGS84 ellipsoid
    /// - `gk_cologne`: transverse Mercator on the 6° meridian, Bessel
    ///   ellipsoid, with the 7 parameters datum shift of the Cologne grid
    /// - anything else is given to proj as a coordinate reference system
    ///   definition
    ///
    /// Fails with [`Error::UnknownProjection`] when proj cannot make sense
    /// of the name, or when the crate is built without the `proj` feature.
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        let name = match name {
            None => {
                info!("No projection, coordinates are read as longitude and latitude");
                return Ok(Projection::Identity);
            }
            Some(name) => name,
        };
        info!("Using projection {:?}", name);
        Self::build_proj(name)
    }

    #[cfg(feature = "proj")]
    fn build_proj(name: &str) -> Result<Self> {
        let definition = match name {
            UTM => UTM_DEFINITION,
            GK_COLOGNE => GK_COLOGNE_DEFINITION,
            other => other,
        };
        let converter = Proj::new_known_crs(definition, WGS84_DEFINITION, None).map_err(|e| {
            anyhow::Error::new(Error::UnknownProjection(name.to_string()))
                .context(format!(
                    "Proj cannot build a converter from '{}': {}",
                    definition, e
                ))
        })?;
        Ok(Projection::Proj {
            name: name.to_string(),
            converter,
        })
    }

    #[cfg(not(feature = "proj"))]
    fn build_proj(name: &str) -> Result<Self> {
        Err(Error::UnknownProjection(name.to_string()).into())
    }
}

impl Projector for Projection {
    fn to_wgs84(&self, x: f64, y: f64) -> Result<Coord> {
        match self {
            Projection::Identity => Ok(Coord { lon: x, lat: y }),
            #[cfg(feature = "proj")]
            Projection::Proj { name, converter } => {
                let (lon, lat) = converter.convert((x, y)).map_err(|e| {
                    anyhow!("cannot project ({}, {}) with {:?}: {}", x, y, name, e)
                })?;
                Ok(Coord { lon, lat })
            }
        }
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Projection::Identity => write!(f, "Identity"),
            #[cfg(feature = "proj")]
            Projection::Proj { name, .. } => write!(f, "Proj({:?})", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_swaps_nothing_but_the_names() {
        let projection = Projection::from_name(None).unwrap();
        let coord = projection.to_wgs84(6.95, 50.94).unwrap();
        assert_relative_eq!(6.95, coord.lon);
        assert_relative_eq!(50.94, coord.lat);
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn named_projection_needs_proj() {
        let error = Projection::from_name(Some(UTM)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::UnknownProjection(name)) if name == "utm"
        ));
    }

    #[cfg(feature = "proj")]
    mod with_proj {
        use super::*;

        #[test]
        fn utm_zone_32() {
            let projection = Projection::from_name(Some(UTM)).unwrap();
            let coord = projection.to_wgs84(500_000.0, 0.0).unwrap();
            assert_relative_eq!(9.0, coord.lon, epsilon = 1e-6);
            assert_relative_eq!(0.0, coord.lat, epsilon = 1e-6);
        }

        #[test]
        fn gk_cologne_heumarkt() {
            let projection = Projection::from_name(Some(GK_COLOGNE)).unwrap();
            let coord = projection.to_wgs84(2_567_526.0, 5_644_934.0).unwrap();
            assert_relative_eq!(6.959, coord.lon, epsilon = 1e-2);
            assert_relative_eq!(50.936, coord.lat, epsilon = 1e-2);
        }

        #[test]
        fn crs_definition_is_used_verbatim() {
            let projection = Projection::from_name(Some("EPSG:32632")).unwrap();
            let coord = projection.to_wgs84(500_000.0, 0.0).unwrap();
            assert_relative_eq!(9.0, coord.lon, epsilon = 1e-6);
        }

        #[test]
        fn unknown_projection() {
            let error = Projection::from_name(Some("+proj=nowhere")).unwrap_err();
            assert!(matches!(
                error.downcast_ref::<Error>(),
                Some(Error::UnknownProjection(_))
            ));
        }
    }
}
