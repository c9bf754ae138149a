//! YAML configuration files
//!
//! `read_yaml`, `write_yaml` and `append_yaml` work on plain YAML mappings.
//! Repeated keys are refused on read (at any depth) and on append, so an
//! edited config can never silently clobber an earlier entry.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Number, Value};

use crate::error::{CalcError, Result};
use crate::export::ExportFormat;
use crate::pv::{RollForwardConfig, RollForwardStart, DEFAULT_REDUCED_PCT, DEFAULT_ROLL_FORWARD_MONTHS};
use crate::rates::{load_rates, RateBasis, RateTable, DEFAULT_RATES_PATH};

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DUPLICATE_KEY_MESSAGE: &str = "Duplicate key detected: ";

/// What `yaml_helper` does with the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YamlMode {
    Read,
    Append,
    Write,
}

impl FromStr for YamlMode {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" => Ok(YamlMode::Read),
            "a" => Ok(YamlMode::Append),
            "w" => Ok(YamlMode::Write),
            _ => Err(CalcError::InvalidMode(s.to_string())),
        }
    }
}

/// YAML value that refuses repeated mapping keys while deserializing
struct UniqueValue(Value);

impl<'de> Deserialize<'de> for UniqueValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueValueVisitor).map(UniqueValue)
    }
}

struct UniqueValueVisitor;

impl<'de> Visitor<'de> for UniqueValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        UniqueValue::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(UniqueValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut mapping = Mapping::new();
        while let Some(UniqueValue(key)) = map.next_key()? {
            if mapping.contains_key(&key) {
                return Err(de::Error::custom(format!(
                    "{}{}",
                    DUPLICATE_KEY_MESSAGE,
                    key_label(&key)
                )));
            }
            let UniqueValue(value) = map.next_value()?;
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}

fn parse_unique_mapping(text: &str) -> Result<Mapping> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let UniqueValue(value) = serde_yaml::from_str(text).map_err(|e| {
        let message = e.to_string();
        match message.find(DUPLICATE_KEY_MESSAGE) {
            Some(pos) => {
                let rest = &message[pos + DUPLICATE_KEY_MESSAGE.len()..];
                CalcError::DuplicateKey(rest.split(" at line").next().unwrap_or(rest).to_string())
            }
            None => CalcError::Yaml(e),
        }
    })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(CalcError::InvalidInput("YAML document is not a mapping".to_string())),
    }
}

/// Read a YAML mapping, refusing repeated keys
pub fn read_yaml<P: AsRef<Path>>(path: P) -> Result<Mapping> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_unique_mapping(&text)
}

/// Replace the file with `data`
pub fn write_yaml<P: AsRef<Path>>(path: P, data: &Mapping) -> Result<()> {
    let text = serde_yaml::to_string(data)?;
    fs::write(path.as_ref(), text)?;
    log::trace!("wrote {} keys to {}", data.len(), path.as_ref().display());
    Ok(())
}

/// Append `data` to an existing file; any key already present is an error
pub fn append_yaml<P: AsRef<Path>>(path: P, data: &Mapping) -> Result<()> {
    let path = path.as_ref();
    let existing = read_yaml(path)?;
    if let Some(key) = data.keys().find(|k| existing.contains_key(*k)) {
        return Err(CalcError::DuplicateKey(key_label(key)));
    }

    let text = serde_yaml::to_string(data)?;
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(b"\n")?;
    file.write_all(text.as_bytes())?;
    log::trace!("appended {} keys to {}", data.len(), path.display());
    Ok(())
}

/// Mode-string front end over the three operations
///
/// Returns the mapping read for `r` and `None` after writing or appending.
pub fn yaml_helper<P: AsRef<Path>>(path: P, mode: &str, data: Option<&Mapping>) -> Result<Option<Mapping>> {
    let mode: YamlMode = mode.parse()?;
    if mode == YamlMode::Read {
        return read_yaml(path).map(Some);
    }

    let data = data.ok_or_else(|| CalcError::InvalidInput("data is required to write or append".to_string()))?;
    match mode {
        YamlMode::Append => append_yaml(path, data)?,
        _ => write_yaml(path, data)?,
    }
    Ok(None)
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// CSV rate table, read on every run
    pub rates_path: PathBuf,
    pub rate_basis: RateBasis,
    /// Use the compiled-in CANSIM table instead of `rates_path`
    pub builtin_rates: bool,

    /// Frozen roll-forward start; `None` starts from the current month
    pub roll_forward_start: Option<NaiveDate>,
    pub roll_forward_months: u32,
    pub reduced_pct: f64,

    pub export_enabled: bool,
    pub export_dir: PathBuf,
    pub export_format: ExportFormat,

    pub log_name: String,
    pub log_serialize: bool,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
            rate_basis: RateBasis::AnnualPercent,
            builtin_rates: false,
            roll_forward_start: None,
            roll_forward_months: DEFAULT_ROLL_FORWARD_MONTHS,
            reduced_pct: DEFAULT_REDUCED_PCT,
            export_enabled: true,
            export_dir: PathBuf::from("."),
            export_format: ExportFormat::Xlsx,
            log_name: "interest_calcs".to_string(),
            log_serialize: false,
        }
    }
}

impl CalcConfig {
    /// Load settings from a YAML file, refusing repeated keys
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mapping = read_yaml(path)?;
        Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
    }

    /// Load from `path` if it exists, otherwise defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Rate table from `rates_path`, or the CANSIM table when `builtin_rates` is set
    ///
    /// A missing or malformed rate file is an error.
    pub fn rate_table(&self) -> Result<RateTable> {
        if self.builtin_rates {
            log::warn!("Using built-in CANSIM rates (may be outdated)");
            return Ok(RateTable::cansim_b14045());
        }
        load_rates(&self.rates_path, self.rate_basis)
    }

    pub fn roll_forward(&self) -> RollForwardConfig {
        RollForwardConfig {
            start: match self.roll_forward_start {
                Some(date) => RollForwardStart::Fixed(date),
                None => RollForwardStart::CurrentMonth,
            },
            months: self.roll_forward_months,
            reduced_pct: self.reduced_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mapping(pairs: &[(&str, i64)]) -> Mapping {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(Value::String(k.to_string()), Value::Number((*v).into()));
        }
        m
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(" R ".parse::<YamlMode>().unwrap(), YamlMode::Read);
        assert_eq!("a".parse::<YamlMode>().unwrap(), YamlMode::Append);
        assert_eq!("w".parse::<YamlMode>().unwrap(), YamlMode::Write);
        assert!(matches!("x".parse::<YamlMode>(), Err(CalcError::InvalidMode(_))));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        write_yaml(&path, &mapping(&[("alpha", 1), ("beta", 2)])).unwrap();
        let read = read_yaml(&path).unwrap();
        assert_eq!(read, mapping(&[("alpha", 1), ("beta", 2)]));
    }

    #[test]
    fn test_duplicate_key_on_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dup.yaml");
        fs::write(&path, "alpha: 1\nbeta: 2\nalpha: 3\n").unwrap();

        match read_yaml(&path) {
            Err(CalcError::DuplicateKey(key)) => assert_eq!(key, "alpha"),
            other => panic!("expected duplicate key error, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_duplicate_key_on_read() {
        let result = parse_unique_mapping("outer:\n  inner: 1\n  inner: 2\n");
        assert!(matches!(result, Err(CalcError::DuplicateKey(_))));
    }

    #[test]
    fn test_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        write_yaml(&path, &mapping(&[("alpha", 1)])).unwrap();

        append_yaml(&path, &mapping(&[("beta", 2)])).unwrap();
        assert_eq!(read_yaml(&path).unwrap(), mapping(&[("alpha", 1), ("beta", 2)]));

        let result = append_yaml(&path, &mapping(&[("gamma", 3), ("alpha", 9)]));
        assert!(matches!(result, Err(CalcError::DuplicateKey(ref k)) if k == "alpha"));
        // Rejected append leaves the file untouched
        assert_eq!(read_yaml(&path).unwrap(), mapping(&[("alpha", 1), ("beta", 2)]));
    }

    #[test]
    fn test_yaml_helper_dispatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        assert_eq!(yaml_helper(&path, "w", Some(&mapping(&[("alpha", 1)]))).unwrap(), None);
        assert_eq!(yaml_helper(&path, "a", Some(&mapping(&[("beta", 2)]))).unwrap(), None);
        let read = yaml_helper(&path, "r", None).unwrap().unwrap();
        assert_eq!(read.len(), 2);

        assert!(matches!(yaml_helper(&path, "w", None), Err(CalcError::InvalidInput(_))));
        assert!(matches!(yaml_helper(&path, "rw", None), Err(CalcError::InvalidMode(_))));
    }

    #[test]
    fn test_calc_config_defaults_and_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "rate_basis: monthly_decimal\nroll_forward_start: 2024-06-01\nreduced_pct: 0.6\nexport_format: csv\n",
        )
        .unwrap();

        let config = CalcConfig::load(&path).unwrap();
        assert_eq!(config.rate_basis, RateBasis::MonthlyDecimal);
        assert_eq!(config.export_format, ExportFormat::Csv);
        assert_eq!(config.roll_forward_months, DEFAULT_ROLL_FORWARD_MONTHS);

        let rf = config.roll_forward();
        assert_eq!(rf.start, RollForwardStart::Fixed(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert_eq!(rf.reduced_pct, 0.6);
    }

    #[test]
    fn test_calc_config_missing_file_defaults() {
        let dir = tempdir().unwrap();
        let config = CalcConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, CalcConfig::default());
        assert_eq!(config.roll_forward().start, RollForwardStart::CurrentMonth);
        assert_eq!(config.rates_path, PathBuf::from(DEFAULT_RATES_PATH));
        assert!(!config.builtin_rates);
    }

    #[test]
    fn test_rate_table_from_rates_path() {
        let dir = tempdir().unwrap();
        let rates = dir.path().join("rates.csv");
        fs::write(&rates, "Year,Annual Rate\n2021,0.75\n2022,2.55\n").unwrap();

        let config = CalcConfig {
            rates_path: rates,
            ..Default::default()
        };
        let table = config.rate_table().unwrap();
        assert_eq!(table.span(), Some((2021, 2022)));
        assert_eq!(table.raw_rate(2022).unwrap(), 2.55);
    }

    #[test]
    fn test_rate_table_missing_file_fails() {
        let dir = tempdir().unwrap();
        let config = CalcConfig {
            rates_path: dir.path().join("absent.csv"),
            ..Default::default()
        };
        assert!(matches!(config.rate_table(), Err(CalcError::InvalidPath(_))));

        // The bad path is not consulted once the built-in table is chosen
        let config = CalcConfig {
            builtin_rates: true,
            ..config
        };
        assert_eq!(config.rate_table().unwrap(), RateTable::cansim_b14045());
    }

    #[test]
    fn test_rate_table_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let rates = dir.path().join("rates.csv");
        fs::write(&rates, "Year,Annual Rate\n2021,abc\n").unwrap();
        let config = CalcConfig {
            rates_path: rates,
            ..Default::default()
        };
        assert!(config.rate_table().is_err());
    }

    #[test]
    fn test_default_rate_table_reads_shipped_csv() {
        let config = CalcConfig {
            rates_path: Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_RATES_PATH),
            ..Default::default()
        };
        assert_eq!(config.rate_table().unwrap(), RateTable::cansim_b14045());
    }

    #[test]
    fn test_calc_config_duplicate_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "reduced_pct: 0.71\nreduced_pct: 0.6\n").unwrap();
        assert!(matches!(CalcConfig::load(&path), Err(CalcError::DuplicateKey(_))));
    }
}
