//! Synthetic ENVISAT products for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use asar_xarray::io::envisat::dsd::DSD_SIZE;
use asar_xarray::io::envisat::layout::{GEOLOCATION_GRID_ADSR, RecordLayout};
use asar_xarray::io::envisat::time::encode_mjd2000;
use asar_xarray::io::envisat::{MDSR_HEADER_SIZE, MPH_SIZE};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Main processing parameters record size without calibration vectors
const MPP_SIZE: usize = 2009;

pub const PRODUCT_NAME: &str = "ASA_IMS_1PNESA20040109_194924_000000182023_00157_09730_0000.N1";

pub struct SyntheticProduct {
    pub name: String,
    pub lines: usize,
    pub samples: usize,
    /// `MDSn_TX_RX_POLAR` of every measurement channel
    pub channels: Vec<&'static str>,
    pub data_type: &'static str,
    pub first_line_time: DateTime<Utc>,
    pub prf: f32,
    pub range_samp_rate: f32,
    pub radar_freq: f32,
    pub range_spacing: f32,
    pub azimuth_spacing: f32,
    /// Near-range slant time of the geolocation grid, nanoseconds
    pub slant_time_first_ns: f32,
    pub incidence_angle_center: f32,
    /// `num_output_lines` written to the main processing parameters, when it
    /// should differ from `lines`
    pub num_output_lines: Option<u32>,
}

impl Default for SyntheticProduct {
    fn default() -> Self {
        SyntheticProduct {
            name: PRODUCT_NAME.to_string(),
            lines: 4,
            samples: 5,
            channels: vec!["V/V"],
            data_type: "SWORD",
            first_line_time: Utc.with_ymd_and_hms(2004, 1, 9, 19, 49, 24).unwrap(),
            prf: 1000.0,
            range_samp_rate: 19_207_680.0,
            radar_freq: 5.331e9,
            range_spacing: 7.8,
            azimuth_spacing: 4.05,
            slant_time_first_ns: 5_500_000.0,
            incidence_angle_center: 23.0,
            num_output_lines: None,
        }
    }
}

/// Pixel value written for `(channel, line, sample)`: `(re, im)`
pub fn sample_value(channel: usize, line: usize, sample: usize) -> (i16, i16) {
    let re = (channel * 100 + line * 10 + sample) as i16;
    (re, -(sample as i16))
}

fn header_block(lines: &[String], size: usize) -> Vec<u8> {
    let mut text = lines.join("\n");
    text.push('\n');
    let mut bytes = text.into_bytes();
    assert!(bytes.len() < size, "header text does not fit in {size} bytes");
    bytes.resize(size - 1, b' ');
    bytes.push(b'\n');
    bytes
}

fn format_dsd(name: &str, ds_type: char, offset: usize, size: usize, num_dsr: usize, dsr_size: usize) -> Vec<u8> {
    let text = format!(
        "DS_NAME=\"{:<28}\"\nDS_TYPE={}\nFILENAME=\"{:<62}\"\nDS_OFFSET={:+021}<bytes>\nDS_SIZE={:+021}<bytes>\nNUM_DSR={:+011}\nDSR_SIZE={:+011}<bytes>\n{:32}\n",
        name, ds_type, "", offset as i64, size as i64, num_dsr as i64, dsr_size as i64, ""
    );
    let bytes = text.into_bytes();
    assert_eq!(bytes.len(), DSD_SIZE);
    bytes
}

fn header_time(time: DateTime<Utc>) -> String {
    time.format("%d-%b-%Y %H:%M:%S%.6f").to_string().to_uppercase()
}

fn put_f32(buf: &mut [u8], at: usize, value: f32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

fn offset_of(layout: &RecordLayout, path: &str) -> usize {
    layout.locate(path).unwrap().offset
}

struct DataSet {
    name: String,
    ds_type: char,
    num_dsr: usize,
    dsr_size: usize,
    bytes: Vec<u8>,
}

impl SyntheticProduct {
    pub fn last_line_time(&self) -> DateTime<Utc> {
        let span = (self.lines.saturating_sub(1)) as f64 / f64::from(self.prf);
        self.first_line_time + TimeDelta::microseconds((span * 1e6).round() as i64)
    }

    fn main_processing_params(&self) -> Vec<u8> {
        let mut buf = vec![0u8; MPP_SIZE];
        buf[..12].copy_from_slice(&encode_mjd2000(self.first_line_time));
        buf[13..25].copy_from_slice(&encode_mjd2000(self.last_line_time()));
        put_f32(&mut buf, 44, self.range_spacing);
        put_f32(&mut buf, 48, self.azimuth_spacing);
        put_f32(&mut buf, 52, 1.0 / self.prf);
        put_u32(&mut buf, 56, self.num_output_lines.unwrap_or(self.lines as u32));
        put_u32(&mut buf, 60, self.samples as u32);
        // image_parameters.prf_value[0]
        put_f32(&mut buf, 649, self.prf);
        put_f32(&mut buf, 929, self.range_samp_rate);
        put_f32(&mut buf, 933, self.radar_freq);
        // nominal_chirp[1].nom_chirp_amp[0]
        put_f32(&mut buf, 990, 1.5);
        buf
    }

    fn geolocation_record(&self, line_num: u32) -> Vec<u8> {
        let layout = &GEOLOCATION_GRID_ADSR;
        let mut buf = vec![0u8; layout.size];
        put_u32(&mut buf, offset_of(layout, "line_num"), line_num);
        put_f32(
            &mut buf,
            offset_of(layout, "first_line_tie_points.slant_range_times"),
            self.slant_time_first_ns,
        );
        let angles = offset_of(layout, "first_line_tie_points.angles");
        put_f32(&mut buf, angles + 5 * 4, self.incidence_angle_center);
        let lats = offset_of(layout, "first_line_tie_points.lats");
        buf[lats..lats + 4].copy_from_slice(&45_123_456i32.to_be_bytes());
        buf
    }

    fn measurements(&self, channel: usize) -> (usize, Vec<u8>) {
        let complex = self.data_type == "SWORD";
        let bytes_per_sample = if complex { 4 } else { 2 };
        let dsr_size = MDSR_HEADER_SIZE + self.samples * bytes_per_sample;
        let mut out = Vec::with_capacity(dsr_size * self.lines);
        for line in 0..self.lines {
            out.extend([0u8; MDSR_HEADER_SIZE]);
            for sample in 0..self.samples {
                let (re, im) = sample_value(channel, line, sample);
                if complex {
                    out.extend(re.to_be_bytes());
                    out.extend(im.to_be_bytes());
                } else {
                    out.extend((re as u16).to_be_bytes());
                }
            }
        }
        (dsr_size, out)
    }

    fn data_sets(&self) -> Vec<DataSet> {
        let single = |name: &str, bytes: Vec<u8>| DataSet {
            name: name.to_string(),
            ds_type: 'A',
            num_dsr: 1,
            dsr_size: bytes.len(),
            bytes,
        };

        let mut sets = vec![
            single("MAIN PROCESSING PARAMS ADS", self.main_processing_params()),
            single("DOP CENTROID COEFFS ADS", vec![0u8; 55]),
            single("SR GR ADS", vec![0u8; 55]),
            single("CHIRP PARAMS ADS", vec![0u8; 1483]),
        ];

        let mut geolocation = self.geolocation_record(1);
        geolocation.extend(self.geolocation_record(self.lines as u32));
        sets.push(DataSet {
            name: "GEOLOCATION GRID ADS".to_string(),
            ds_type: 'A',
            num_dsr: 2,
            dsr_size: GEOLOCATION_GRID_ADSR.size,
            bytes: geolocation,
        });

        for channel in 1..=self.channels.len() {
            sets.push(single(&format!("MDS{channel} SQ ADS"), vec![0u8; 170]));
            let mut antenna = vec![0u8; 162];
            antenna[13..16].copy_from_slice(b"IS2");
            sets.push(single(&format!("MDS{channel} ANTENNA ELEV PATT ADS"), antenna));
        }
        for channel in 1..=self.channels.len() {
            let (dsr_size, bytes) = self.measurements(channel);
            sets.push(DataSet {
                name: format!("MDS{channel}"),
                ds_type: 'M',
                num_dsr: self.lines,
                dsr_size,
                bytes,
            });
        }
        sets
    }

    fn sph_text(&self) -> Vec<u8> {
        let mut lines = vec![
            "SPH_DESCRIPTOR=\"Image Mode SLC Image       \"".to_string(),
            format!("FIRST_LINE_TIME=\"{}\"", header_time(self.first_line_time)),
            format!("LAST_LINE_TIME=\"{}\"", header_time(self.last_line_time())),
            "FIRST_NEAR_LAT=+0045123456<10-6degN>".to_string(),
            "FIRST_NEAR_LONG=-0012500000<10-6degE>".to_string(),
            "SWATH=\"IS2\"".to_string(),
            "PASS=\"DESCENDING  \"".to_string(),
            "SAMPLE_TYPE=\"COMPLEX \"".to_string(),
        ];
        for n in 1..=2 {
            let polar = self.channels.get(n - 1).copied().unwrap_or("   ");
            lines.push(format!("MDS{n}_TX_RX_POLAR=\"{polar}\""));
        }
        lines.push(format!("LINE_LENGTH={:+011}<samples>", self.samples));
        lines.push(format!("DATA_TYPE=\"{}\"", self.data_type));
        header_block(&lines, 600)
    }

    /// Write the product into `dir` and return its path
    pub fn write(&self, dir: &Path) -> PathBuf {
        let sph_text = self.sph_text();
        let sets = self.data_sets();
        let num_dsd = sets.len() + 1;
        let sph_size = sph_text.len() + num_dsd * DSD_SIZE;

        let mph = header_block(
            &[
                format!("PRODUCT=\"{}\"", self.name),
                "PROC_STAGE=N".to_string(),
                "ACQUISITION_STATION=\"PDHS-E              \"".to_string(),
                format!("SENSING_START=\"{}\"", header_time(self.first_line_time)),
                "REL_ORBIT=+00157".to_string(),
                "ABS_ORBIT=+09730".to_string(),
                format!("SPH_SIZE={:+011}<bytes>", sph_size),
                format!("NUM_DSD={:+011}", num_dsd),
                format!("DSD_SIZE={:+011}<bytes>", DSD_SIZE),
            ],
            MPH_SIZE,
        );

        let mut out = mph;
        out.extend(sph_text);
        let mut offset = MPH_SIZE + sph_size;
        for set in &sets {
            out.extend(format_dsd(&set.name, set.ds_type, offset, set.bytes.len(), set.num_dsr, set.dsr_size));
            offset += set.bytes.len();
        }
        out.extend(std::iter::repeat_n(b' ', DSD_SIZE - 1));
        out.push(b'\n');
        for set in sets {
            out.extend(set.bytes);
        }

        let path = dir.join(&self.name);
        std::fs::write(&path, out).unwrap();
        path
    }
}
