//! Reference Data Loader
//!
//! Static per-county inputs: the population table, the centroid point
//! table and the boundary polygon collection. All three are read once at
//! startup; any problem is reported as `DataError::Unavailable`.

use super::error::{DataError, DataResult};
use super::require_column;
use super::types::{CountyPoint, Fips};
use crate::config::DataConfig;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Population by county name ("Harris County") for one census year
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    by_name: HashMap<String, Option<f64>>,
}

impl PopulationTable {
    /// Population for a normalized county name.
    ///
    /// Returns `None` both for unknown counties and for rows with an empty
    /// population cell.
    pub fn get(&self, county: &str) -> Option<f64> {
        self.by_name.get(county).copied().flatten()
    }

    pub fn contains(&self, county: &str) -> bool {
        self.by_name.contains_key(county)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<(String, Option<f64>)> for PopulationTable {
    fn from_iter<I: IntoIterator<Item = (String, Option<f64>)>>(iter: I) -> Self {
        Self {
            by_name: iter.into_iter().collect(),
        }
    }
}

/// County boundary polygons, passed through untouched to the map views
#[derive(Debug, Clone)]
pub struct CountyBoundaries {
    collection: Arc<Value>,
    feature_id_key: String,
    ids: BTreeSet<Fips>,
}

impl CountyBoundaries {
    /// Validate a parsed GeoJSON document and index its feature ids
    pub fn from_value(
        collection: Value,
        feature_id_key: &str,
        source_name: &str,
    ) -> DataResult<Self> {
        if collection.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(DataError::unavailable(
                source_name,
                "expected a GeoJSON FeatureCollection",
            ));
        }

        let features = collection
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| DataError::unavailable(source_name, "missing features array"))?;

        let mut ids = BTreeSet::new();
        let mut unkeyed = 0usize;

        for feature in features {
            let id = feature
                .get("properties")
                .and_then(|p| p.get(feature_id_key))
                .and_then(|v| match v {
                    Value::String(s) => s.parse::<Fips>().ok(),
                    Value::Number(n) => {
                        n.as_u64().and_then(|n| n.to_string().parse::<Fips>().ok())
                    }
                    _ => None,
                });

            match id {
                Some(id) => {
                    ids.insert(id);
                }
                None => unkeyed += 1,
            }
        }

        if unkeyed > 0 {
            tracing::warn!(
                source = %source_name,
                features = unkeyed,
                key = %feature_id_key,
                "Boundary features without a usable id property"
            );
        }

        Ok(Self {
            collection: Arc::new(collection),
            feature_id_key: feature_id_key.to_string(),
            ids,
        })
    }

    /// The raw FeatureCollection
    pub fn collection(&self) -> &Arc<Value> {
        &self.collection
    }

    /// Property name holding the county id, e.g. `GEOID`
    pub fn feature_id_key(&self) -> &str {
        &self.feature_id_key
    }

    pub fn contains(&self, fips: Fips) -> bool {
        self.ids.contains(&fips)
    }

    pub fn feature_count(&self) -> usize {
        self.ids.len()
    }
}

/// All static reference inputs
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub population: PopulationTable,
    pub points: HashMap<Fips, CountyPoint>,
    pub boundaries: CountyBoundaries,
}

impl ReferenceData {
    /// Load the three reference files named in the data config
    pub fn load(config: &DataConfig) -> DataResult<Self> {
        let population = load_population(
            &config.population_path,
            &config.population_name_column,
            &config.population_column,
        )?;
        let points = load_points(&config.points_path)?;
        let boundaries = load_boundaries(&config.boundaries_path, &config.feature_id_key)?;

        tracing::info!(
            population_rows = population.len(),
            points = points.len(),
            boundary_features = boundaries.feature_count(),
            "Reference data loaded"
        );

        Ok(Self {
            population,
            points,
            boundaries,
        })
    }
}

/// Load the population table from a CSV file
pub fn load_population(
    path: &Path,
    name_column: &str,
    value_column: &str,
) -> DataResult<PopulationTable> {
    let file = open(path)?;
    read_population(file, &path.display().to_string(), name_column, value_column)
}

/// Parse a population table from any reader
pub fn read_population<R: Read>(
    reader: R,
    source_name: &str,
    name_column: &str,
    value_column: &str,
) -> DataResult<PopulationTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| DataError::unavailable(source_name, e))?
        .clone();

    let name_idx = require_column(&headers, name_column, source_name)?;
    let value_idx = require_column(&headers, value_column, source_name)?;

    let mut table = HashMap::new();
    for (line_num, result) in reader.records().enumerate() {
        let line = line_num + 2;
        let record = result.map_err(|e| DataError::unavailable(source_name, e))?;

        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let raw = record.get(value_idx).unwrap_or("").trim().replace(',', "");
        let population = if raw.is_empty() {
            None
        } else {
            let value = raw.parse::<f64>().map_err(|_| {
                DataError::unavailable(
                    source_name,
                    format!("line {}: invalid population {:?}", line, raw),
                )
            })?;
            Some(value)
        };

        if table.insert(name.to_string(), population).is_some() {
            return Err(DataError::unavailable(
                source_name,
                format!("line {}: duplicate county {:?}", line, name),
            ));
        }
    }

    Ok(PopulationTable { by_name: table })
}

/// Load the county centroid table from a CSV file
pub fn load_points(path: &Path) -> DataResult<HashMap<Fips, CountyPoint>> {
    let file = open(path)?;
    read_points(file, &path.display().to_string())
}

/// Parse a `GEOID,lat,lon` table from any reader
pub fn read_points<R: Read>(
    reader: R,
    source_name: &str,
) -> DataResult<HashMap<Fips, CountyPoint>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| DataError::unavailable(source_name, e))?
        .clone();

    let id_idx = require_column(&headers, "GEOID", source_name)?;
    let lat_idx = require_column(&headers, "lat", source_name)?;
    let lon_idx = require_column(&headers, "lon", source_name)?;

    let mut points = HashMap::new();
    for (line_num, result) in reader.records().enumerate() {
        let line = line_num + 2;
        let record = result.map_err(|e| DataError::unavailable(source_name, e))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let fips: Fips = field(id_idx)
            .parse()
            .map_err(|e| DataError::unavailable(source_name, format!("line {}: {}", line, e)))?;
        let latitude = parse_coordinate(field(lat_idx), "lat", line, source_name)?;
        let longitude = parse_coordinate(field(lon_idx), "lon", line, source_name)?;

        let point = CountyPoint {
            fips,
            latitude,
            longitude,
        };

        if points.insert(fips, point).is_some() {
            return Err(DataError::unavailable(
                source_name,
                format!("line {}: duplicate GEOID {}", line, fips),
            ));
        }
    }

    Ok(points)
}

fn parse_coordinate(raw: &str, column: &str, line: usize, source_name: &str) -> DataResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            DataError::unavailable(source_name, format!("line {}: invalid {} {:?}", line, column, raw))
        })
}

/// Load the county boundary GeoJSON
pub fn load_boundaries(path: &Path, feature_id_key: &str) -> DataResult<CountyBoundaries> {
    let source_name = path.display().to_string();
    let file = open(path)?;
    let value: Value = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| DataError::unavailable(&source_name, e))?;

    CountyBoundaries::from_value(value, feature_id_key, &source_name)
}

fn open(path: &Path) -> DataResult<std::fs::File> {
    std::fs::File::open(path).map_err(|e| DataError::unavailable(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_population_with_separators() {
        let csv_data = "CTYNAME,2018,2019
Texas,\"28,701,845\",\"28,995,881\"
Harris County,\"4,698,619\",\"4,713,325\"
Loving County,152,
";
        let table = read_population(csv_data.as_bytes(), "pop", "CTYNAME", "2019").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("Harris County"), Some(4_713_325.0));
        assert!(table.contains("Loving County"));
        assert_eq!(table.get("Loving County"), None);
        assert_eq!(table.get("Nowhere County"), None);
    }

    #[test]
    fn test_read_population_missing_year_column() {
        let csv_data = "CTYNAME,2018\nHarris County,1\n";
        let err = read_population(csv_data.as_bytes(), "pop", "CTYNAME", "2019").unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
        assert!(err.to_string().contains("2019"));
    }

    #[test]
    fn test_read_population_rejects_duplicate_names() {
        let csv_data = "CTYNAME,2019\nHarris County,100\nHarris County,200\n";
        let err = read_population(csv_data.as_bytes(), "pop", "CTYNAME", "2019").unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
        assert!(err.to_string().contains("duplicate county"));
    }

    #[test]
    fn test_read_points() {
        let csv_data = "GEOID,NAME,lat,lon
48201,Harris,29.857,-95.393
48001,Anderson,31.813,-95.653
";
        let points = read_points(csv_data.as_bytes(), "points").unwrap();
        assert_eq!(points.len(), 2);

        let harris = points[&Fips::new(48201)];
        assert_eq!(harris.latitude, 29.857);
        assert_eq!(harris.longitude, -95.393);
    }

    #[test]
    fn test_read_points_rejects_duplicates() {
        let csv_data = "GEOID,lat,lon\n48201,29.8,-95.3\n48201,29.9,-95.4\n";
        let err = read_points(csv_data.as_bytes(), "points").unwrap_err();
        assert!(err.to_string().contains("duplicate GEOID 48201"));
    }

    #[test]
    fn test_read_points_missing_column() {
        let csv_data = "GEOID,lat\n48201,29.8\n";
        assert!(read_points(csv_data.as_bytes(), "points").is_err());
    }

    #[test]
    fn test_boundaries_index_ids() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"GEOID": "48201"}, "geometry": null},
                {"type": "Feature", "properties": {"GEOID": 48001}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        });

        let boundaries = CountyBoundaries::from_value(collection, "GEOID", "geo").unwrap();
        assert_eq!(boundaries.feature_count(), 2);
        assert!(boundaries.contains(Fips::new(48201)));
        assert!(boundaries.contains(Fips::new(48001)));
        assert_eq!(boundaries.feature_id_key(), "GEOID");
    }

    #[test]
    fn test_boundaries_numeric_ids_share_string_bounds() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"GEOID": 48201}, "geometry": null},
                {"type": "Feature", "properties": {"GEOID": 123456}, "geometry": null},
                {"type": "Feature", "properties": {"GEOID": "123456"}, "geometry": null}
            ]
        });

        let boundaries = CountyBoundaries::from_value(collection, "GEOID", "geo").unwrap();
        assert_eq!(boundaries.feature_count(), 1);
        assert!(boundaries.contains(Fips::new(48201)));
        assert!(!boundaries.contains(Fips::new(123456)));
    }

    #[test]
    fn test_boundaries_reject_non_collection() {
        let err = CountyBoundaries::from_value(json!({"type": "Feature"}), "GEOID", "geo")
            .unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = load_points(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
    }

    #[test]
    fn test_load_boundaries_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counties.geojson");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{"GEOID":"48201"}},"geometry":null}}]}}"#
        )
        .unwrap();

        let boundaries = load_boundaries(&path, "GEOID").unwrap();
        assert!(boundaries.contains(Fips::new(48201)));
    }
}
