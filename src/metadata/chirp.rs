use crate::io::envisat::EnvisatProduct;
use crate::model::{AttrValue, Attrs};

use super::records::{first_record, record_count};

pub const CHIRP_PARAMS_ADS: &str = "CHIRP PARAMS ADS";

/// Chirp parameter fields gathered under `chirp`, keyed without their prefix
const CHIRP_FIELDS: [&str; 5] = ["width", "sidelobe", "islr", "peak_loc", "power"];

pub fn chirp_parameters(record: &Attrs) -> Attrs {
    let mut params = Attrs::new();
    let mut copy = |to: &str, from: &str| {
        if let Some(value) = record.get(from) {
            params.insert(to.to_string(), value.clone());
        }
    };
    copy("zero_doppler_time", "zero_doppler_time");
    copy("attach_flag", "attach_flag");
    copy("beam_id", "beam_id");
    copy("polarisation", "polar");
    copy("elev_corr_factor", "elev_corr_factor");

    let chirp: Attrs = CHIRP_FIELDS
        .iter()
        .filter_map(|name| {
            record
                .get(&format!("chirp_{name}"))
                .and_then(AttrValue::as_f64)
                .map(|v| (name.to_string(), AttrValue::Float(v)))
        })
        .collect();
    params.insert("chirp".to_string(), chirp.into());

    let pulses = record
        .get("cal_pulse_info")
        .cloned()
        .unwrap_or(AttrValue::List(Vec::new()));
    params.insert("cal_pulse_info".to_string(), pulses);
    params
}

/// Chirp parameters of the first `CHIRP PARAMS ADS` record, if GDAL decoded one
pub fn read_chirp_parameters(product: &EnvisatProduct) -> Option<Attrs> {
    first_record(product.records(), CHIRP_PARAMS_ADS, record_count(product, CHIRP_PARAMS_ADS))
        .map(|record| chirp_parameters(&record))
}
