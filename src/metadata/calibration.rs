use serde::Serialize;
use tracing::debug;

use super::records::MAIN_PROCESSING_PARAMS_ADS;
use crate::io::envisat::layout::{MPP_CALIBRATION_VECTOR_LEN, MPP_CALIBRATION_VECTORS_OFFSET, MPP_EXTENDED_SIZE};
use crate::io::envisat::record::read_f32_vector;
use crate::io::envisat::{EnvisatProduct, ProductError};
use crate::model::{AttrValue, Attrs};

/// Elevation calibration vectors appended to extended main processing records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationVectors {
    pub sigma: Vec<f32>,
    pub gamma: Vec<f32>,
}

impl CalibrationVectors {
    /// Extract both vectors; `None` unless the record has the extended size
    pub fn from_record(buf: &[u8]) -> Result<Option<Self>, ProductError> {
        if buf.len() != MPP_EXTENDED_SIZE {
            return Ok(None);
        }
        let gamma_offset = MPP_CALIBRATION_VECTORS_OFFSET + 4 * MPP_CALIBRATION_VECTOR_LEN;
        Ok(Some(CalibrationVectors {
            sigma: read_f32_vector(buf, MPP_CALIBRATION_VECTORS_OFFSET, MPP_CALIBRATION_VECTOR_LEN)?,
            gamma: read_f32_vector(buf, gamma_offset, MPP_CALIBRATION_VECTOR_LEN)?,
        }))
    }

    pub fn to_attrs(&self) -> Attrs {
        let widen = |v: &[f32]| AttrValue::FloatList(v.iter().map(|x| f64::from(*x)).collect());
        Attrs::from([
            ("sigma".to_string(), widen(&self.sigma)),
            ("gamma".to_string(), widen(&self.gamma)),
        ])
    }
}

pub fn read_calibration_vectors(product: &EnvisatProduct) -> Result<Option<CalibrationVectors>, ProductError> {
    let Some(buf) = product.direct().read_record_bytes(MAIN_PROCESSING_PARAMS_ADS, 0)? else {
        return Ok(None);
    };
    let vectors = CalibrationVectors::from_record(&buf)?;
    if vectors.is_some() {
        debug!("Found elevation calibration vectors in {}", MAIN_PROCESSING_PARAMS_ADS);
    }
    Ok(vectors)
}
