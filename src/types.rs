//! Shared types and enums used across the crate.
//! Includes `Polarization`, `ProductFamily`, `AcquisitionMode`, `OutputFormat`
//! and the `DerivedOperation` set exposed as derived subdatasets.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize)]
pub enum Polarization {
    Hh,
    Vv,
    Hv,
    Vh,
}

impl Polarization {
    /// Parse the SPH `MDSn_TX_RX_POLAR` notation (`"V/V"`) as well as `"vv"`.
    pub fn from_tx_rx(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/')
            .collect::<String>()
            .to_ascii_uppercase();
        match compact.as_str() {
            "HH" => Some(Polarization::Hh),
            "VV" => Some(Polarization::Vv),
            "HV" => Some(Polarization::Hv),
            "VH" => Some(Polarization::Vh),
            _ => None,
        }
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarization::Hh => write!(f, "HH"),
            Polarization::Vv => write!(f, "VV"),
            Polarization::Hv => write!(f, "HV"),
            Polarization::Vh => write!(f, "VH"),
        }
    }
}

/// Satellite family a product comes from, derived from the product name prefix.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ProductFamily {
    /// `ASA_*` products
    Envisat,
    /// `SAR_*` products (ERS-1/2 in ENVISAT format)
    Ers,
}

impl std::fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductFamily::Envisat => write!(f, "Envisat"),
            ProductFamily::Ers => write!(f, "ERS"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AcquisitionMode {
    /// Image mode
    Im,
    /// Alternating polarisation
    Ap,
    /// Wide swath
    Ws,
    /// Global monitoring
    Gm,
    /// Wave mode
    Wv,
}

impl AcquisitionMode {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "IM" => Some(AcquisitionMode::Im),
            "AP" => Some(AcquisitionMode::Ap),
            "WS" => Some(AcquisitionMode::Ws),
            "GM" => Some(AcquisitionMode::Gm),
            "WV" => Some(AcquisitionMode::Wv),
            _ => None,
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AcquisitionMode::Im => "IM",
            AcquisitionMode::Ap => "AP",
            AcquisitionMode::Ws => "WS",
            AcquisitionMode::Gm => "GM",
            AcquisitionMode::Wv => "WV",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
pub enum DerivedOperation {
    Amplitude,
    Phase,
    Real,
    Imag,
    Conj,
    Intensity,
    LogAmplitude,
}

impl DerivedOperation {
    pub const ALL: [DerivedOperation; 7] = [
        DerivedOperation::Amplitude,
        DerivedOperation::Phase,
        DerivedOperation::Real,
        DerivedOperation::Imag,
        DerivedOperation::Conj,
        DerivedOperation::Intensity,
        DerivedOperation::LogAmplitude,
    ];

    /// Lowercase name used in subdataset listings
    pub fn name(&self) -> &'static str {
        match self {
            DerivedOperation::Amplitude => "amplitude",
            DerivedOperation::Phase => "phase",
            DerivedOperation::Real => "real",
            DerivedOperation::Imag => "imag",
            DerivedOperation::Conj => "conj",
            DerivedOperation::Intensity => "intensity",
            DerivedOperation::LogAmplitude => "logamplitude",
        }
    }

    /// Operation named in a subdataset listing, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for DerivedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Dataset description (dims, coordinates, attributes)
    JSON,
    /// Float32 raster of a derived band plus JSON sidecar
    TIFF,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::JSON => "json",
            OutputFormat::TIFF => "tiff",
        }
    }
}
