use crate::error::{Result, SagwError};
use crate::well::{preferred_id, SAMPLE_ID_COLUMNS};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use sagw_utils::dates::parse_date_dmy;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

/// Column holding the drillhole number in every bulk download.
pub const DHNO_COLUMN: &str = "DHNO";

/// Column holding the sampling method in salinity downloads.
pub const EXTRACT_METHOD_COLUMN: &str = "extract_method";

/// Extract method assigned to salinity samples without one.
pub const UNKNOWN_EXTRACT_METHOD: &str = "UKN";

/// A bulk download endpoint of Groundwater Data.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BulkService {
    WaterLevel,
    Salinity,
}

impl BulkService {
    /// Name of the endpoint.
    pub fn service_name(&self) -> &'static str {
        match self {
            BulkService::WaterLevel => "GetWaterLevelDownload",
            BulkService::Salinity => "GetSalinityDownload",
        }
    }

    /// Column holding the observation date ("DD/MM/YYYY").
    pub fn date_column(&self) -> &'static str {
        match self {
            BulkService::WaterLevel => "obs_date",
            BulkService::Salinity => "Collected_date",
        }
    }
}

/// A charted time-series parameter.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Parameter {
    /// Reduced standing water level, metres AHD
    Rswl,
    /// Standing water level, metres below ground
    Swl,
    /// Total dissolved solids, mg/L
    Tds,
    /// Electrical conductivity, uS/cm
    Ec,
}

impl Parameter {
    pub fn column(&self) -> &'static str {
        match self {
            Parameter::Rswl => "rswl",
            Parameter::Swl => "swl",
            Parameter::Tds => "TDS",
            Parameter::Ec => "EC",
        }
    }

    pub fn service(&self) -> BulkService {
        match self {
            Parameter::Rswl | Parameter::Swl => BulkService::WaterLevel,
            Parameter::Tds | Parameter::Ec => BulkService::Salinity,
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            Parameter::Rswl => "RSWL (m AHD)",
            Parameter::Swl => "SWL (m)",
            Parameter::Tds => "TDS (mg/L)",
            Parameter::Ec => "EC (uS/cm)",
        }
    }

    /// Depths below surface are drawn with the y axis pointing down.
    pub fn inverted(&self) -> bool {
        matches!(self, Parameter::Swl)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Parameter {
    type Err = SagwError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rswl" => Ok(Parameter::Rswl),
            "swl" => Ok(Parameter::Swl),
            "tds" => Ok(Parameter::Tds),
            "ec" => Ok(Parameter::Ec),
            other => Err(SagwError::UnknownParameter(other.to_string())),
        }
    }
}

/// A bulk download response: the CSV header and its rows.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct BulkTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl BulkTable {
    /// Parse a CSV response body. Short rows are padded with empty cells.
    pub fn from_csv(body: &str) -> Result<BulkTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());
        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<String>>();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row = record
                .iter()
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<String>>();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        Ok(BulkTable { headers, rows })
    }

    /// Index of a column by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| SagwError::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One dated reading of a parameter at a well.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ParamSample {
    pub dh_no: i64,
    pub well_id: String,
    pub date: NaiveDate,
    pub value: f64,
    /// Sampling method, salinity downloads only
    pub extract_method: Option<String>,
}

/// Readings of one parameter for a set of wells.
#[derive(Debug, PartialEq, Clone)]
pub struct ParamSeries {
    pub parameter: Parameter,
    pub samples: Vec<ParamSample>,
}

impl ParamSeries {
    /// Reshape a bulk download into samples of `parameter`.
    ///
    /// Rows without a usable date, value or drillhole number are dropped.
    pub fn from_table(table: &BulkTable, parameter: Parameter) -> Result<ParamSeries> {
        let service = parameter.service();
        let dh_col = table.require(DHNO_COLUMN)?;
        let date_col = table.require(service.date_column())?;
        let value_col = table.require(parameter.column())?;
        let id_cols = SAMPLE_ID_COLUMNS
            .iter()
            .filter_map(|c| table.column(c))
            .collect::<Vec<usize>>();
        let method_col = match service {
            BulkService::Salinity => table.column(EXTRACT_METHOD_COLUMN),
            BulkService::WaterLevel => None,
        };

        let mut samples = Vec::with_capacity(table.len());
        for row in &table.rows {
            let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
            let date = match parse_date_dmy(cell(date_col)) {
                Ok(d) => d,
                Err(_) => continue,
            };
            let value = match cell(value_col).parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => continue,
            };
            let dh_no = match cell(dh_col).parse::<f64>() {
                Ok(v) if v.is_finite() => v as i64,
                _ => continue,
            };
            let well_id = preferred_id(id_cols.iter().map(|i| cell(*i)));
            let extract_method = match service {
                BulkService::Salinity => {
                    let method = method_col.map(cell).unwrap_or("");
                    Some(if method.is_empty() {
                        UNKNOWN_EXTRACT_METHOD.to_string()
                    } else {
                        method.to_string()
                    })
                }
                BulkService::WaterLevel => None,
            };
            samples.push(ParamSample {
                dh_no,
                well_id,
                date,
                value,
                extract_method,
            });
        }
        Ok(ParamSeries { parameter, samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sorted, unique, non-empty well identifiers.
    pub fn well_ids(&self) -> Vec<String> {
        self.samples
            .iter()
            .filter(|s| !s.well_id.is_empty())
            .map(|s| s.well_id.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Sorted, unique drillhole numbers present in the data.
    pub fn dh_nos(&self) -> Vec<i64> {
        self.samples
            .iter()
            .map(|s| s.dh_no)
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .collect()
    }

    /// Samples of one well ordered by date.
    pub fn samples_for(&self, well_id: &str) -> Vec<&ParamSample> {
        let mut samples = self
            .samples
            .iter()
            .filter(|s| s.well_id == well_id)
            .collect::<Vec<&ParamSample>>();
        samples.sort_by_key(|s| s.date);
        samples
    }

    /// Sorted, unique extract methods.
    pub fn extract_methods(&self) -> Vec<String> {
        self.samples
            .iter()
            .filter_map(|s| s.extract_method.clone())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}
