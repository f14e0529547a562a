use std::collections::BTreeMap;
use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};

use gdal::raster::RasterBand;
use gdal::{Dataset, Metadata};
use ndarray::Array2;
use num_complex::Complex;
use tracing::{debug, info};

use super::ProductError;
use super::direct::DirectAccess;
use super::dsd::Dsd;
use crate::model::ArrayData;

/// Every measurement record starts with an MJD time, a quality byte and a line number
pub const MDSR_HEADER_SIZE: usize = 17;

/// Metadata domain holding decoded annotation records
const RECORDS_DOMAIN: &str = "RECORDS";
/// Metadata domain listing the derived subdatasets GDAL can compute
const DERIVED_DOMAIN: &str = "DERIVED_SUBDATASETS";

/// Pixel encoding of a measurement data set, from the SPH `DATA_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    /// Complex samples as big-endian i16 I/Q pairs (GDAL `CInt16`)
    Sword,
    /// Detected samples as big-endian u16 (GDAL `UInt16`)
    Uword,
}

impl SampleType {
    pub fn from_data_type(value: &str) -> Result<Self, ProductError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SWORD" => Ok(SampleType::Sword),
            "UWORD" => Ok(SampleType::Uword),
            other => Err(ProductError::UnsupportedDataType(other.to_string())),
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleType::Sword => 4,
            SampleType::Uword => 2,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, SampleType::Sword)
    }

    /// Size of one measurement record holding `samples` pixels, `None` on overflow
    pub fn record_size(&self, samples: usize) -> Option<usize> {
        samples
            .checked_mul(self.bytes_per_sample())
            .and_then(|n| n.checked_add(MDSR_HEADER_SIZE))
    }
}

/// Check that a measurement descriptor holds `line_length` samples per record
/// and return its number of lines
pub fn measurement_lines(dsd: &Dsd, sample_type: SampleType, line_length: usize) -> Result<usize, ProductError> {
    let expected = sample_type.record_size(line_length).ok_or_else(|| {
        ProductError::Parse(format!("{}: line length {line_length} is out of range", dsd.name))
    })?;
    if dsd.dsr_size != expected {
        return Err(ProductError::Parse(format!(
            "{}: DSR_SIZE {} does not match {} samples of {} bytes plus {} byte header",
            dsd.name,
            dsd.dsr_size,
            line_length,
            sample_type.bytes_per_sample(),
            MDSR_HEADER_SIZE
        )));
    }
    Ok(dsd.num_dsr)
}

/// An ENVISAT product opened through GDAL's ENVISAT driver, together with
/// direct access to the data sets GDAL does not decode
pub struct EnvisatProduct {
    path: PathBuf,
    dataset: Dataset,
    metadata: BTreeMap<String, String>,
    records: BTreeMap<String, String>,
    derived: BTreeMap<String, String>,
    direct: DirectAccess,
}

impl EnvisatProduct {
    /// Open a product. The descriptors are checked first so that files which
    /// are not ENVISAT products are reported before GDAL sees them.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProductError> {
        let path = path.as_ref().to_path_buf();
        let direct = DirectAccess::open(&path)?;

        let dataset = Dataset::open(&path)?;
        let driver = dataset.driver().short_name();
        if driver != "ENVISAT" {
            return Err(ProductError::NotEnvisat(format!(
                "{} (opened by the {} driver)",
                path.display(),
                driver
            )));
        }

        let metadata = domain_map(&dataset, "");
        let records = domain_map(&dataset, RECORDS_DOMAIN);
        let derived = domain_map(&dataset, DERIVED_DOMAIN);
        debug!(
            "Collected {} header, {} record and {} derived entries",
            metadata.len(),
            records.len(),
            derived.len()
        );

        let product = EnvisatProduct {
            path,
            dataset,
            metadata,
            records,
            derived,
            direct,
        };
        info!(
            "Opened ENVISAT product {} ({} data sets, {} bands)",
            product.product_name(),
            product.direct.data_sets().len(),
            product.dataset.raster_count()
        );
        Ok(product)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `MPH_PRODUCT` entry, e.g. `ASA_IMS_1PNESA20040109_...N1`
    pub fn product_name(&self) -> &str {
        self.mph_value("PRODUCT").unwrap_or("")
    }

    /// Default domain: `MPH_*`, `SPH_*` and `DS_*_NAME` entries
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// `RECORDS` domain: `<DATA_SET>_<FIELD>` entries of decoded annotation records
    pub fn records(&self) -> &BTreeMap<String, String> {
        &self.records
    }

    /// `DERIVED_SUBDATASETS` domain
    pub fn derived_subdatasets(&self) -> &BTreeMap<String, String> {
        &self.derived
    }

    pub fn mph_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(&format!("MPH_{key}")).map(|v| v.trim())
    }

    pub fn sph_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(&format!("SPH_{key}")).map(|v| v.trim())
    }

    pub fn direct(&self) -> &DirectAccess {
        &self.direct
    }

    pub fn data_set(&self, name: &str) -> Option<&Dsd> {
        self.direct.data_set(name)
    }

    /// Read measurement data set `MDS<channel>` into a `(lines, line_length)` array
    pub fn read_measurement(
        &self,
        channel: usize,
        sample_type: SampleType,
        line_length: usize,
    ) -> Result<ArrayData, ProductError> {
        let name = format!("MDS{channel}");
        let dsd = self
            .direct
            .data_set(&name)
            .ok_or_else(|| ProductError::UnknownDataSet(name.clone()))?;
        let lines = measurement_lines(dsd, sample_type, line_length)?;
        self.direct.records_span(dsd)?;

        let band = self.measurement_band(&name)?;
        let (width, height) = band.size();
        if (width, height) != (line_length, lines) {
            return Err(ProductError::Parse(format!(
                "{name}: band is {width}x{height}, descriptor gives {line_length}x{lines}"
            )));
        }
        info!("Reading {} lines x {} samples from {}", lines, line_length, name);

        let shape_error = |_| ProductError::RasterIo(format!("{name}: buffer does not match {lines}x{line_length}"));
        let data = match sample_type {
            SampleType::Sword => {
                let values = read_complex(&band, width, height, &name)?;
                ArrayData::Complex(Array2::from_shape_vec((height, width), values).map_err(shape_error)?)
            }
            SampleType::Uword => {
                let buf = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
                ArrayData::Real(Array2::from_shape_vec((height, width), buf.data().to_vec()).map_err(shape_error)?)
            }
        };
        Ok(data)
    }

    /// Band whose description names the measurement data set
    fn measurement_band(&self, name: &str) -> Result<RasterBand<'_>, ProductError> {
        let count = self.dataset.raster_count() as usize;
        for index in 1..=count {
            let band = self.dataset.rasterband(index)?;
            if band.description()?.trim() == name {
                return Ok(band);
            }
        }
        Err(ProductError::UnknownDataSet(format!("{name} (no matching raster band)")))
    }
}

/// Complex pixels as `CFloat32`; the `gdal` crate only reads scalar types
fn read_complex(band: &RasterBand, width: usize, height: usize, name: &str) -> Result<Vec<Complex<f32>>, ProductError> {
    let too_large = |_| ProductError::Parse(format!("{name}: {width}x{height} exceeds the raster I/O window"));
    let x = c_int::try_from(width).map_err(too_large)?;
    let y = c_int::try_from(height).map_err(too_large)?;
    let mut values = vec![Complex::new(0.0f32, 0.0); width * height];

    let rv = unsafe {
        gdal_sys::GDALRasterIO(
            band.c_rasterband(),
            gdal_sys::GDALRWFlag::GF_Read,
            0,
            0,
            x,
            y,
            values.as_mut_ptr() as *mut c_void,
            x,
            y,
            gdal_sys::GDALDataType::GDT_CFloat32,
            0,
            0,
        )
    };
    if rv != gdal_sys::CPLErr::CE_None {
        return Err(ProductError::RasterIo(name.to_string()));
    }
    Ok(values)
}

fn domain_map(dataset: &Dataset, domain: &str) -> BTreeMap<String, String> {
    dataset.metadata_domain(domain).map(split_entries).unwrap_or_default()
}

/// Split `KEY=VALUE` metadata entries
fn split_entries(entries: Vec<String>) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for entry in entries {
        if let Some((key, val)) = entry.split_once('=') {
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::envisat::DataSetType;

    fn mds(num_dsr: usize, dsr_size: usize) -> Dsd {
        Dsd {
            name: "MDS1".to_string(),
            ds_type: DataSetType::Measurement,
            filename: String::new(),
            offset: 20_000,
            size: (num_dsr * dsr_size) as u64,
            num_dsr,
            dsr_size,
        }
    }

    #[test]
    fn parses_sample_types() {
        assert_eq!(SampleType::from_data_type("SWORD").unwrap(), SampleType::Sword);
        assert_eq!(SampleType::from_data_type(" uword ").unwrap().bytes_per_sample(), 2);
        assert!(matches!(
            SampleType::from_data_type("UBYTE"),
            Err(ProductError::UnsupportedDataType(_))
        ));
    }

    #[test]
    fn measurement_records_must_match_line_length() {
        let dsd = mds(2, MDSR_HEADER_SIZE + 3 * 4);
        assert_eq!(measurement_lines(&dsd, SampleType::Sword, 3).unwrap(), 2);
        assert!(matches!(
            measurement_lines(&dsd, SampleType::Sword, 4),
            Err(ProductError::Parse(_))
        ));
        assert!(measurement_lines(&dsd, SampleType::Uword, 3).is_err());
    }

    #[test]
    fn oversized_line_lengths_do_not_overflow() {
        let dsd = Dsd {
            size: 4_000_000_017,
            num_dsr: 9_999_999_999,
            dsr_size: 4_000_000_017,
            ..mds(1, 1)
        };
        assert_eq!(SampleType::Sword.record_size(usize::MAX / 2), None);
        assert!(matches!(
            measurement_lines(&dsd, SampleType::Sword, usize::MAX / 2),
            Err(ProductError::Parse(_))
        ));
        assert!(measurement_lines(&dsd, SampleType::Sword, 1_000_000_000).is_ok());
    }

    #[test]
    fn rejects_non_envisat_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_product.N1");
        std::fs::write(&path, vec![b'x'; super::super::MPH_SIZE + 10]).unwrap();
        assert!(matches!(EnvisatProduct::open(&path), Err(ProductError::NotEnvisat(_))));

        std::fs::write(&path, b"PRODUCT=\"short\"\n").unwrap();
        assert!(matches!(EnvisatProduct::open(&path), Err(ProductError::Truncated { .. })));
    }

    #[test]
    fn splits_metadata_entries() {
        let map = split_entries(vec![
            "MPH_PRODUCT=ASA_IMS_1PNESA20040109_194924_000000182023_00157_09730_0000.N1".to_string(),
            "SPH_FIRST_NEAR_LAT=-33.123456".to_string(),
            "MDS1_SQ_ADS_INPUT_MEAN=0.5 -0.25".to_string(),
            "MALFORMED".to_string(),
            "EMPTY=".to_string(),
        ]);
        assert_eq!(map.len(), 4);
        assert_eq!(map["SPH_FIRST_NEAR_LAT"], "-33.123456");
        assert_eq!(map["MDS1_SQ_ADS_INPUT_MEAN"], "0.5 -0.25");
        assert_eq!(map["EMPTY"], "");
    }
}
