use serde::{Deserialize, Serialize};

pub const DEFAULT_TRIGGER_PATH: &str = "data/table_trigger.csv";
pub const DEFAULT_VALIDATION_PATH: &str = "data/table_validation.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub trigger_path: String,
    pub validation_path: String,
    /// Single-byte field delimiter of both input tables.
    pub delimiter: char,
    /// total_count is divided by this before the failure rate is taken.
    /// 1.0 leaves the rate as failed / total.
    pub failure_rate_divisor: f64,
    /// Decimal places kept on failure_rate_percentage.
    pub rate_precision: u32,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            trigger_path: DEFAULT_TRIGGER_PATH.into(),
            validation_path: DEFAULT_VALIDATION_PATH.into(),
            delimiter: ',',
            failure_rate_divisor: 1.0,
            rate_precision: 2,
        }
    }
}

impl InsightsConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use InsightsConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: InsightsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.failure_rate_divisor.is_finite() && self.failure_rate_divisor > 0.0) {
            anyhow::bail!(
                "failure_rate_divisor must be a positive number, got {}",
                self.failure_rate_divisor
            );
        }
        self.delimiter_byte()?;
        if self.rate_precision > 10 {
            anyhow::bail!("rate_precision must be at most 10, got {}", self.rate_precision);
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }

    pub fn default_test() -> Self {
        Self {
            trigger_path: "test_trigger.csv".into(),
            validation_path: "test_validation.csv".into(),
            ..Self::default()
        }
    }
}
