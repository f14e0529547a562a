use serde::{Deserialize, Serialize};

use crate::types::{DerivedOperation, OutputFormat, Polarization};

/// Options accepted when opening a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Measurement channel to read; `None` selects MDS1
    pub polarization: Option<Polarization>,
    /// Variables to leave out; `measurements` skips pixel decoding
    pub drop_variables: Vec<String>,
}

impl OpenOptions {
    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = Some(polarization);
        self
    }

    pub fn dropping(mut self, variable: &str) -> Self {
        self.drop_variables.push(variable.to_string());
        self
    }

    pub fn drops(&self, variable: &str) -> bool {
        self.drop_variables.iter().any(|v| v == variable)
    }
}

/// Export parameters suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    pub format: OutputFormat,
    pub polarization: Option<Polarization>,
    /// Derived band written for raster output
    pub operation: DerivedOperation,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::JSON,
            polarization: None,
            operation: DerivedOperation::Amplitude,
        }
    }
}

impl ExportParams {
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions {
            polarization: self.polarization,
            drop_variables: Vec::new(),
        }
    }
}
