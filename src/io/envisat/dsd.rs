//! Data set descriptors stored at the end of the SPH.

use serde::Serialize;

use super::ProductError;
use super::header::Header;

/// Size of one descriptor block in bytes
pub const DSD_SIZE: usize = 280;

/// Data set type letter from `DS_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSetType {
    /// Measurement data set
    Measurement,
    /// Annotation data set
    Annotation,
    /// Global annotation data set
    GlobalAnnotation,
    /// Reference to an external file
    Reference,
    Other(char),
}

impl DataSetType {
    fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('M') => DataSetType::Measurement,
            Some('A') => DataSetType::Annotation,
            Some('G') => DataSetType::GlobalAnnotation,
            Some('R') => DataSetType::Reference,
            Some(other) => DataSetType::Other(other),
            None => DataSetType::Other(' '),
        }
    }

    pub fn code(&self) -> char {
        match self {
            DataSetType::Measurement => 'M',
            DataSetType::Annotation => 'A',
            DataSetType::GlobalAnnotation => 'G',
            DataSetType::Reference => 'R',
            DataSetType::Other(c) => *c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dsd {
    pub name: String,
    pub ds_type: DataSetType,
    pub filename: String,
    pub offset: u64,
    pub size: u64,
    pub num_dsr: usize,
    pub dsr_size: usize,
}

impl Dsd {
    /// Parse one descriptor block. Returns `Ok(None)` for spare (blank) descriptors.
    pub fn parse(block: &[u8]) -> Result<Option<Self>, ProductError> {
        let header = Header::parse(block);
        let name = match header.get("DS_NAME") {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Ok(None),
        };

        let ds_type = DataSetType::from_code(header.get("DS_TYPE").unwrap_or(""));
        let filename = header.get("FILENAME").unwrap_or("").to_string();
        let offset = header.get_size("DS_OFFSET")?;
        let size = header.get_size("DS_SIZE")?;
        let num_dsr = to_usize(header.get_size("NUM_DSR")?, "NUM_DSR")?;
        let dsr_size = to_usize(header.get_size("DSR_SIZE")?, "DSR_SIZE")?;

        Ok(Some(Dsd {
            name,
            ds_type,
            filename,
            offset,
            size,
            num_dsr,
            dsr_size,
        }))
    }

    /// Parse `count` consecutive descriptors of `dsd_size` bytes each
    pub fn parse_all(buf: &[u8], count: usize, dsd_size: usize) -> Result<Vec<Self>, ProductError> {
        let mut dsds = Vec::with_capacity(count);
        for (index, block) in buf.chunks(dsd_size).take(count).enumerate() {
            match Dsd::parse(block) {
                Ok(Some(dsd)) => dsds.push(dsd),
                Ok(None) => tracing::debug!("Skipping spare DSD #{}", index),
                Err(e) => return Err(e),
            }
        }
        Ok(dsds)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 || self.num_dsr == 0
    }
}

fn to_usize(value: u64, key: &'static str) -> Result<usize, ProductError> {
    usize::try_from(value).map_err(|_| ProductError::Parse(format!("{key}: value {value} too large")))
}
