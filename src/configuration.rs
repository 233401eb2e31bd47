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
//! Configuration of a conversion.

use crate::Result;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path;
use tracing::info;

/// Description of the single agency of the feed
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgencyConfiguration {
    /// Name of the agency
    pub name: String,
    /// Url of the agency
    pub url: String,
    /// Timezone of the agency
    pub timezone: String,
    /// Language of the agency
    pub lang: String,
    /// Phone of the agency
    pub phone: String,
}

impl Default for AgencyConfiguration {
    fn default() -> Self {
        AgencyConfiguration {
            name: "Agency Name".to_string(),
            url: String::new(),
            timezone: String::new(),
            lang: String::new(),
            phone: String::new(),
        }
    }
}

/// Parameters of a conversion
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Configuration {
    /// The agency written in `agency.txt`
    pub agency: AgencyConfiguration,
    /// Projection of the coordinates in `bfkoord`, see
    /// [`Projection::from_name`](crate::projection::Projection::from_name)
    pub projection: Option<String>,
    /// Actual names of the HAFAS files, by standard name
    pub file_names: BTreeMap<String, String>,
    /// GTFS route types by HAFAS transport mode code, in addition to the
    /// built-in ones
    pub route_types: BTreeMap<String, u16>,
}

impl Configuration {
    /// Name of the file holding the standard HAFAS file `name`
    pub fn file_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.file_names.get(name).map_or(name, String::as_str)
    }
}

/// Read a JSON configuration file.
///
/// Below is an example of this file, every key is optional
/// ```text
/// {
///     "agency": {
///         "name": "Verkehrsverbund Rhein-Sieg",
///         "url": "https://www.vrs.de",
///         "timezone": "Europe/Berlin",
///         "lang": "de"
///     },
///     "projection": "gk_cologne",
///     "file_names": {
///         "fplan": "FPLAN"
///     },
///     "route_types": {
///         "ICE": 2
///     }
/// }
/// ```
pub fn read_config<P: AsRef<path::Path>>(config_path: Option<P>) -> Result<Configuration> {
    match config_path {
        Some(config_path) => {
            let config_path = config_path.as_ref();
            info!("Reading configuration from {:?}", config_path);
            let json_config_file = File::open(config_path)
                .with_context(|| format!("Error reading {:?}", config_path))?;
            let config = serde_json::from_reader(json_config_file)
                .with_context(|| format!("Error reading {:?}", config_path))?;
            Ok(config)
        }
        None => Ok(Configuration::default()),
    }
}

/// Parses a file name mapping given as `standard:actual,standard:actual`
pub fn parse_file_mapping(mapping: &str) -> Result<BTreeMap<String, String>> {
    mapping
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| match pair.split_once(':') {
            Some((name, actual)) if !name.trim().is_empty() && !actual.trim().is_empty() => {
                Ok((name.trim().to_string(), actual.trim().to_string()))
            }
            _ => Err(anyhow!(
                "invalid file mapping {:?}, expected 'name:file_name'",
                pair
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_configuration() {
        let configuration = read_config(None::<&str>).unwrap();
        assert_eq!("Agency Name", configuration.agency.name);
        assert_eq!(None, configuration.projection);
        assert_eq!("fplan", configuration.file_name("fplan"));
    }

    #[test]
    fn read_partial_configuration() {
        test_in_tmp_dir(|path| {
            create_file_with_content(
                path,
                "config.json",
                r#"{"agency": {"timezone": "Europe/Berlin"}, "file_names": {"fplan": "FPLAN.TXT"}}"#,
            );
            let configuration = read_config(Some(path.join("config.json"))).unwrap();
            assert_eq!("Agency Name", configuration.agency.name);
            assert_eq!("Europe/Berlin", configuration.agency.timezone);
            assert_eq!("FPLAN.TXT", configuration.file_name("fplan"));
            assert_eq!("bitfeld", configuration.file_name("bitfeld"));
        });
    }

    #[test]
    fn parse_mapping() {
        let mapping = parse_file_mapping("fplan:FPLAN,bahnhof:BAHNHOF.TXT").unwrap();
        assert_eq!(2, mapping.len());
        assert_eq!("FPLAN", mapping["fplan"]);
        assert_eq!("BAHNHOF.TXT", mapping["bahnhof"]);
    }

    #[test]
    fn parse_invalid_mapping() {
        assert!(parse_file_mapping("fplan=FPLAN").is_err());
        assert!(parse_file_mapping("fplan:").is_err());
    }
}
