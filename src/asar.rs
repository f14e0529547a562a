//! Assembly of ASAR/ERS products into labeled datasets.
//!
//! Pixels are laid out on `(line, pixel)` and carry four coordinates:
//! `line` and `azimuth_time` along the azimuth axis, `pixel` and
//! `slant_range_time` along the range axis. The dimensions are then swapped to
//! `(azimuth_time, slant_range_time)`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::core::params::OpenOptions;
use crate::core::timing::{compute_azimuth_time, compute_slant_range_time};
use crate::error::{Error, Result};
use crate::io::envisat::{Dsd, EnvisatProduct, ProductError, SampleType};
use crate::metadata::antenna::read_antenna_elevation_pattern;
use crate::metadata::calibration::read_calibration_vectors;
use crate::metadata::chirp::read_chirp_parameters;
use crate::metadata::derived::derived_subdatasets;
use crate::metadata::general::process_general_metadata;
use crate::metadata::geolocation::read_geolocation;
use crate::metadata::ProductMetadata;
use crate::metadata::records::process_records_metadata;
use crate::model::{ArrayData, AttrValue, Attrs, CoordValues, Coordinate, DataArray, Dataset};
use crate::types::{AcquisitionMode, Polarization, ProductFamily};

/// Name of the pixel data variable
pub const MEASUREMENTS: &str = "measurements";

/// Measurement channels named in the SPH: `(n, polarization)` for every `MDSn`
pub fn channel_polarizations(metadata: &BTreeMap<String, String>) -> Vec<(usize, Polarization)> {
    (1..)
        .map_while(|n| metadata.get(&format!("SPH_MDS{n}_TX_RX_POLAR")).map(|p| (n, p)))
        .filter_map(|(n, p)| Polarization::from_tx_rx(p).map(|pol| (n, pol)))
        .collect()
}

/// Channel index holding `requested`, or MDS1 when nothing is requested
pub fn resolve_channel(product: &EnvisatProduct, requested: Option<Polarization>) -> Result<usize> {
    let Some(requested) = requested else {
        return Ok(1);
    };
    let channels = channel_polarizations(product.metadata());
    channels
        .iter()
        .find(|(n, pol)| *pol == requested && product.data_set(&format!("MDS{n}")).is_some_and(|d| !d.is_empty()))
        .map(|(n, _)| *n)
        .ok_or_else(|| {
            let available = channels
                .iter()
                .map(|(_, pol)| pol.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            ProductError::Polarization {
                requested: requested.to_string(),
                available,
            }
            .into()
        })
}

/// Decode every metadata source of the product for measurement channel `channel`
pub fn get_metadata(product: &EnvisatProduct, channel: usize) -> Result<ProductMetadata> {
    debug!("Collecting metadata for {} (MDS{})", product.product_name(), channel);
    Ok(ProductMetadata {
        channel,
        general: process_general_metadata(product.metadata()),
        records: process_records_metadata(product, channel),
        derived_subdatasets: derived_subdatasets(product.derived_subdatasets()),
        chirp_parameters: read_chirp_parameters(product),
        antenna_elevation_pattern: read_antenna_elevation_pattern(product, channel),
        geolocation: read_geolocation(product)?,
        calibration_vectors: read_calibration_vectors(product)?,
    })
}

/// Image size, timing and sampling derived from the metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
    pub number_of_samples: usize,
    pub number_of_lines: usize,
    pub first_line_time: DateTime<Utc>,
    pub last_line_time: DateTime<Utc>,
    /// Seconds between lines, `1 / PRF`
    pub azimuth_time_interval: f64,
    /// Hz
    pub range_sampling_rate: f64,
    /// Two-way slant range time of the first sample, seconds
    pub image_slant_range_time: f64,
    /// GHz
    pub radar_frequency: f64,
    pub range_pixel_spacing: f64,
    pub azimuth_pixel_spacing: f64,
    pub incidence_angle_mid_swath: f64,
    pub is_complex: bool,
}

/// Leading value of a per-beam array; a single beam arrives as a scalar
fn first_value(value: &AttrValue) -> Option<f64> {
    match value {
        AttrValue::FloatList(v) => v.first().copied(),
        AttrValue::IntList(v) => v.first().map(|x| *x as f64),
        other => other.as_f64(),
    }
}

fn required_count(value: Option<i64>, field: &'static str) -> Result<usize> {
    let value = value.ok_or(ProductError::MissingField(field))?;
    usize::try_from(value).map_err(|_| Error::InvalidArgument {
        arg: field,
        value: value.to_string(),
    })
}

impl ImageGeometry {
    pub fn from_metadata(metadata: &ProductMetadata) -> Result<Self> {
        let mpp = metadata
            .main_processing_params()
            .ok_or(ProductError::MissingField("MAIN PROCESSING PARAMS ADS"))?;
        let time = |key: &'static str| -> Result<DateTime<Utc>> {
            metadata
                .get(key)
                .and_then(AttrValue::as_time)
                .ok_or_else(|| ProductError::MissingField(key).into())
        };
        let mpp_f64 = |key: &'static str| -> Result<f64> {
            mpp.get(key)
                .and_then(AttrValue::as_f64)
                .ok_or_else(|| ProductError::MissingField(key).into())
        };

        let prf = mpp
            .get("image_parameters")
            .and_then(AttrValue::as_map)
            .and_then(|p| p.get("prf_value"))
            .and_then(first_value)
            .ok_or(ProductError::MissingField("prf_value"))?;
        if prf == 0.0 {
            return Err(Error::InvalidArgument {
                arg: "prf_value",
                value: prf.to_string(),
            });
        }

        Ok(ImageGeometry {
            number_of_samples: required_count(metadata.get("line_length").and_then(AttrValue::as_i64), "line_length")?,
            number_of_lines: required_count(mpp.get("num_output_lines").and_then(AttrValue::as_i64), "num_output_lines")?,
            first_line_time: time("first_line_time")?,
            last_line_time: time("last_line_time")?,
            azimuth_time_interval: 1.0 / prf,
            range_sampling_rate: mpp_f64("range_samp_rate")?,
            image_slant_range_time: metadata.geolocation.slant_time_first * 1e-9,
            radar_frequency: mpp_f64("radar_freq")? / 1e9,
            range_pixel_spacing: mpp_f64("range_spacing")?,
            azimuth_pixel_spacing: mpp_f64("azimuth_spacing")?,
            incidence_angle_mid_swath: metadata.geolocation.incidence_angle_center,
            is_complex: metadata
                .get_str("data_type")
                .is_some_and(|t| t.eq_ignore_ascii_case("SWORD")),
        })
    }
}

/// Check the measurement descriptor of `channel` against the image geometry
fn check_measurement_descriptor(dsd: &Dsd, sample_type: SampleType, geometry: &ImageGeometry) -> Result<()> {
    let samples = geometry.number_of_samples;
    let record_size = sample_type
        .record_size(samples)
        .ok_or_else(|| Error::dimension(format!("{}: {samples} samples per line is out of range", dsd.name)))?;
    if dsd.dsr_size != record_size {
        return Err(Error::dimension(format!(
            "{}: records of {} bytes cannot hold {samples} samples ({record_size} bytes)",
            dsd.name, dsd.dsr_size
        )));
    }
    if dsd.num_dsr != geometry.number_of_lines {
        return Err(Error::dimension(format!(
            "{}: {} records but {} output lines",
            dsd.name, dsd.num_dsr, geometry.number_of_lines
        )));
    }
    Ok(())
}

fn product_family(product_name: &str) -> Option<ProductFamily> {
    match product_name.get(..4) {
        Some("ASA_") => Some(ProductFamily::Envisat),
        Some("SAR_") => Some(ProductFamily::Ers),
        _ => None,
    }
}

/// Mission number: ERS-1/ERS-2 from the `.E1`/`.E2` product name suffix
fn mission_number(product_name: &str, family: Option<ProductFamily>) -> i64 {
    match family {
        Some(ProductFamily::Ers) if product_name.to_ascii_uppercase().ends_with(".E2") => 2,
        _ => 1,
    }
}

fn dataset_attrs(metadata: &ProductMetadata, geometry: &ImageGeometry) -> Attrs {
    let product_name = metadata.get_str("product").unwrap_or("");
    let family = product_family(product_name);
    let mode = product_name
        .get(4..6)
        .and_then(AcquisitionMode::from_code)
        .map(|m| m.to_string());
    if mode.is_none() {
        warn!("Could not determine acquisition mode from {:?}", product_name);
    }
    let polarisations: Vec<AttrValue> = metadata
        .channel_polarizations()
        .iter()
        .map(|(_, p)| AttrValue::Text(p.clone()))
        .collect();
    let polarisation = metadata
        .get_str(&format!("mds{}_tx_rx_polar", metadata.channel))
        .and_then(Polarization::from_tx_rx)
        .map(|p| p.to_string());
    let copy = |key: &str| metadata.get(key).cloned().unwrap_or(AttrValue::Null);

    let mut attrs = Attrs::new();
    let mut set = |key: &str, value: AttrValue| {
        attrs.insert(key.to_string(), value);
    };
    set("family_name", family.map(|f| f.to_string()).into());
    set("number", mission_number(product_name, family).into());
    set("mode", mode.into());
    set("swaths", copy("swath"));
    set("orbit_number", copy("abs_orbit"));
    set("relative_orbit_number", copy("rel_orbit"));
    set("pass", copy("pass"));
    set("transmitter_receiver_polarisations", AttrValue::List(polarisations));
    set("polarisation", polarisation.into());
    let product_type = if geometry.is_complex { "SLC" } else { "GRD" };
    set("product_type", product_type.into());
    set("start_time", geometry.first_line_time.into());
    set("stop_time", geometry.last_line_time.into());
    set("radar_frequency", geometry.radar_frequency.into());
    set("ascending_node_time", "".into());
    set("azimuth_pixel_spacing", geometry.azimuth_pixel_spacing.into());
    set("range_pixel_spacing", geometry.range_pixel_spacing.into());
    set("product_first_line_utc_time", geometry.first_line_time.into());
    set("product_last_line_utc_time", geometry.last_line_time.into());
    set("azimuth_time_interval", geometry.azimuth_time_interval.into());
    set("image_slant_range_time", geometry.image_slant_range_time.into());
    set("range_sampling_rate", geometry.range_sampling_rate.into());
    set("incidence_angle_mid_swath", geometry.incidence_angle_mid_swath.into());
    set("antenna_elevation_pattern", metadata.antenna_elevation_pattern.clone());
    set("metadata", metadata.to_attrs().into());
    attrs
}

/// Coordinates on the `(line, pixel)` grid, keyed by name
fn image_coordinates(geometry: &ImageGeometry) -> Result<BTreeMap<String, Coordinate>> {
    let samples = geometry.number_of_samples;
    let lines = geometry.number_of_lines;

    let azimuth_time = compute_azimuth_time(geometry.first_line_time, geometry.last_line_time, lines)?;
    let units = format!(
        "microseconds since {}",
        geometry.first_line_time.to_rfc3339_opts(SecondsFormat::Micros, true)
    );
    let slant_range_time =
        compute_slant_range_time(geometry.image_slant_range_time, geometry.range_sampling_rate, samples)?;

    Ok(BTreeMap::from([
        (
            "pixel".to_string(),
            Coordinate::new("pixel", CoordValues::Int(Array1::from_iter(0..samples as i64))),
        ),
        (
            "line".to_string(),
            Coordinate::new("line", CoordValues::Int(Array1::from_iter(0..lines as i64))),
        ),
        (
            "azimuth_time".to_string(),
            Coordinate::new("line", CoordValues::Time(azimuth_time)).with_encoding("units", units),
        ),
        (
            "slant_range_time".to_string(),
            Coordinate::new("pixel", CoordValues::Float(slant_range_time)),
        ),
    ]))
}

const DIM_SWAPS: [(&str, &str); 2] = [("line", "azimuth_time"), ("pixel", "slant_range_time")];

/// Build the dataset. Without `data` the result carries coordinates and
/// attributes only.
pub fn create_dataset(
    metadata: &ProductMetadata,
    geometry: &ImageGeometry,
    data: Option<ArrayData>,
) -> Result<Dataset> {
    let attrs = dataset_attrs(metadata, geometry);
    let coords = image_coordinates(geometry)?;

    let Some(data) = data else {
        let swapped = coords
            .into_iter()
            .map(|(name, mut coord)| {
                if let Some((_, new)) = DIM_SWAPS.iter().find(|(old, _)| *old == coord.dim) {
                    coord.dim = new.to_string();
                }
                (name, coord)
            })
            .collect();
        return Ok(Dataset::with_coords(swapped, attrs));
    };

    let expected = (geometry.number_of_lines, geometry.number_of_samples);
    if data.dim() != expected {
        return Err(Error::dimension(format!(
            "measurement shape {:?} does not match image geometry {:?}",
            data.dim(),
            expected
        )));
    }

    let mut array = DataArray::new(MEASUREMENTS, ["line", "pixel"], data);
    for (name, coord) in coords {
        array.assign_coords(name, coord)?;
    }
    array.swap_dims(&DIM_SWAPS)?;
    array.attrs = attrs.clone();

    Ok(Dataset::new(vec![array], attrs))
}

/// Open a product file as a dataset
pub fn open_asar_dataset<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Dataset> {
    let path = path.as_ref();
    info!("Opening ASAR dataset {:?}", path);
    let product = EnvisatProduct::open(path)?;

    let product_name = product.product_name();
    if product_name.get(4..7) == Some("WSS") {
        return Err(Error::Unsupported(format!(
            "{product_name}: wide swath SLC (burst) products are not supported"
        )));
    }

    let channel = resolve_channel(&product, options.polarization)?;
    let metadata = get_metadata(&product, channel)?;
    let geometry = ImageGeometry::from_metadata(&metadata)?;

    let data_type = product
        .sph_value("DATA_TYPE")
        .ok_or(ProductError::MissingField("DATA_TYPE"))?;
    let sample_type = SampleType::from_data_type(data_type)?;
    let mds = format!("MDS{channel}");
    let dsd = product
        .data_set(&mds)
        .ok_or_else(|| ProductError::UnknownDataSet(mds.clone()))?;
    check_measurement_descriptor(dsd, sample_type, &geometry)?;
    product.direct().records_span(dsd)?;

    let data = if options.drops(MEASUREMENTS) {
        debug!("Skipping pixel data of {}", product_name);
        None
    } else {
        Some(product.read_measurement(channel, sample_type, geometry.number_of_samples)?)
    };

    create_dataset(&metadata, &geometry, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_follow_product_prefix() {
        assert_eq!(product_family("ASA_IMS_1PNESA2004"), Some(ProductFamily::Envisat));
        assert_eq!(product_family("SAR_IMS_1PXESA1995"), Some(ProductFamily::Ers));
        assert_eq!(product_family("S1A"), None);
        assert_eq!(mission_number("SAR_IMS_1PXESA19950101.E2", Some(ProductFamily::Ers)), 2);
        assert_eq!(mission_number("SAR_IMS_1PXESA19950101.E1", Some(ProductFamily::Ers)), 1);
        assert_eq!(mission_number("ASA_IMS_1PNESA.N1", Some(ProductFamily::Envisat)), 1);
    }

    fn sph(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_channels_from_sph() {
        let dual = sph(&[("SPH_MDS1_TX_RX_POLAR", "H/H"), ("SPH_MDS2_TX_RX_POLAR", "H/V")]);
        assert_eq!(
            channel_polarizations(&dual),
            vec![(1, Polarization::Hh), (2, Polarization::Hv)]
        );

        let single = sph(&[("SPH_MDS1_TX_RX_POLAR", "V/V"), ("SPH_MDS2_TX_RX_POLAR", "")]);
        assert_eq!(channel_polarizations(&single), vec![(1, Polarization::Vv)]);
    }

    fn geometry(samples: usize, lines: usize) -> ImageGeometry {
        let t0 = DateTime::from_timestamp(1_073_677_764, 0).unwrap();
        ImageGeometry {
            number_of_samples: samples,
            number_of_lines: lines,
            first_line_time: t0,
            last_line_time: t0,
            azimuth_time_interval: 1.0 / 1652.4,
            range_sampling_rate: 19.2e6,
            image_slant_range_time: 5.5e-3,
            radar_frequency: 5.331,
            range_pixel_spacing: 7.8,
            azimuth_pixel_spacing: 4.0,
            incidence_angle_mid_swath: 23.0,
            is_complex: true,
        }
    }

    fn mds(num_dsr: usize, dsr_size: usize) -> Dsd {
        Dsd {
            name: "MDS1".to_string(),
            ds_type: crate::io::envisat::DataSetType::Measurement,
            filename: String::new(),
            offset: 7_000,
            size: (num_dsr * dsr_size) as u64,
            num_dsr,
            dsr_size,
        }
    }

    #[test]
    fn measurement_descriptor_must_match_geometry() {
        assert!(check_measurement_descriptor(&mds(3, 17 + 4 * 4), SampleType::Sword, &geometry(4, 3)).is_ok());

        let lines = check_measurement_descriptor(&mds(2, 17 + 4 * 4), SampleType::Sword, &geometry(4, 3));
        assert!(matches!(lines, Err(Error::Dimension(_))));

        let samples = check_measurement_descriptor(&mds(3, 17 + 4 * 4), SampleType::Uword, &geometry(4, 3));
        assert!(matches!(samples, Err(Error::Dimension(_))));

        let huge = check_measurement_descriptor(&mds(3, 33), SampleType::Sword, &geometry(usize::MAX / 2, 3));
        assert!(matches!(huge, Err(Error::Dimension(_))));
    }

    #[test]
    fn prf_takes_the_first_beam() {
        assert_eq!(first_value(&AttrValue::FloatList(vec![1652.4, 0.0])), Some(1652.4));
        assert_eq!(first_value(&AttrValue::Float(2000.0)), Some(2000.0));
        assert_eq!(first_value(&AttrValue::Text("x".into())), None);
    }
}
