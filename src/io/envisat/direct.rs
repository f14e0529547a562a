//! Direct byte access to data sets located through the product descriptors.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::dsd::{DSD_SIZE, Dsd};
use super::header::Header;
use super::layout::RecordLayout;
use super::record::{self, Fields};
use super::{MPH_SIZE, ProductError};

/// Descriptors of a product with on-demand reads of raw data set bytes
#[derive(Debug, Clone)]
pub struct DirectAccess {
    path: PathBuf,
    file_size: u64,
    data_sets: Vec<Dsd>,
}

impl DirectAccess {
    /// Read the MPH and the descriptor block at the end of the SPH
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProductError> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_size = file.metadata()?.len();

        let mut mph_buf = vec![0u8; MPH_SIZE];
        read_exact_or_truncated(&mut file, &mut mph_buf, "main product header", file_size)?;
        if !mph_buf.starts_with(b"PRODUCT=") {
            return Err(ProductError::NotEnvisat(path.display().to_string()));
        }
        let mph = Header::parse(&mph_buf);
        mph.require("PRODUCT")?;

        let sph_size = to_usize(mph.get_size("SPH_SIZE")?)?;
        let num_dsd = to_usize(mph.get_size("NUM_DSD")?)?;
        let dsd_size = to_usize(mph.get_size("DSD_SIZE")?)?;
        if dsd_size != DSD_SIZE {
            debug!("Unusual DSD_SIZE {} (expected {})", dsd_size, DSD_SIZE);
        }
        let dsd_bytes = num_dsd
            .checked_mul(dsd_size)
            .filter(|total| *total <= sph_size)
            .ok_or_else(|| {
                ProductError::Parse(format!(
                    "NUM_DSD * DSD_SIZE ({num_dsd} * {dsd_size}) exceeds SPH_SIZE {sph_size}"
                ))
            })?;

        let mut sph_buf = vec![0u8; sph_size];
        read_exact_or_truncated(&mut file, &mut sph_buf, "specific product header", file_size)?;
        let data_sets = Dsd::parse_all(&sph_buf[sph_size - dsd_bytes..], num_dsd, dsd_size)?;
        debug!("Found {} data set descriptors in {:?}", data_sets.len(), path);

        Ok(DirectAccess {
            path,
            file_size,
            data_sets,
        })
    }

    pub fn data_sets(&self) -> &[Dsd] {
        &self.data_sets
    }

    pub fn data_set(&self, name: &str) -> Option<&Dsd> {
        self.data_sets.iter().find(|d| d.name == name)
    }

    /// Bytes covered by the `num_dsr` records of a data set. They must fit in
    /// both `DS_SIZE` and the file.
    pub fn records_span(&self, dsd: &Dsd) -> Result<(u64, u64), ProductError> {
        let records = (dsd.num_dsr as u64)
            .checked_mul(dsd.dsr_size as u64)
            .filter(|total| *total <= dsd.size)
            .ok_or_else(|| {
                ProductError::Parse(format!(
                    "{}: NUM_DSR * DSR_SIZE ({} * {}) exceeds DS_SIZE {}",
                    dsd.name, dsd.num_dsr, dsd.dsr_size, dsd.size
                ))
            })?;
        self.check_span(&dsd.name, dsd.offset, records)?;
        Ok((dsd.offset, records))
    }

    /// Raw bytes of one record, `None` for a missing set or an index past the end
    pub fn read_record_bytes(&self, name: &str, index: usize) -> Result<Option<Vec<u8>>, ProductError> {
        let Some(dsd) = self.data_set(name) else {
            return Ok(None);
        };
        if index >= dsd.num_dsr || dsd.dsr_size == 0 {
            return Ok(None);
        }
        let offset = (index as u64)
            .checked_mul(dsd.dsr_size as u64)
            .and_then(|start| start.checked_add(dsd.offset))
            .ok_or_else(|| {
                ProductError::Parse(format!("{name}: record {index} of {} bytes is out of range", dsd.dsr_size))
            })?;
        let bytes = self.read_span(&format!("{name} record {index}"), offset, dsd.dsr_size as u64)?;
        Ok(Some(bytes))
    }

    /// Decode every record of data set `name`; a missing set yields no records
    pub fn read_records(&self, name: &str, layout: &RecordLayout) -> Result<Vec<Fields>, ProductError> {
        let Some(dsd) = self.data_set(name) else {
            debug!("Data set {} not present", name);
            return Ok(Vec::new());
        };
        if dsd.is_empty() {
            return Ok(Vec::new());
        }
        let (offset, size) = self.records_span(dsd)?;
        let raw = self.read_span(name, offset, size)?;
        let records = raw
            .chunks(dsd.dsr_size.max(1))
            .map(|chunk| record::decode(layout, chunk))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Decoded {} records from {}", records.len(), name);
        Ok(records)
    }

    fn check_span(&self, what: &str, offset: u64, size: u64) -> Result<(), ProductError> {
        let end = offset.checked_add(size).unwrap_or(u64::MAX);
        if end > self.file_size {
            return Err(ProductError::Truncated {
                what: what.to_string(),
                needed: end,
                available: self.file_size,
            });
        }
        Ok(())
    }

    fn read_span(&self, what: &str, offset: u64, size: u64) -> Result<Vec<u8>, ProductError> {
        self.check_span(what, offset, size)?;
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; to_usize(size)?];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

fn read_exact_or_truncated(
    file: &mut File,
    buf: &mut [u8],
    what: &str,
    file_size: u64,
) -> Result<(), ProductError> {
    let position = file.stream_position()?;
    let needed = position + buf.len() as u64;
    if needed > file_size {
        return Err(ProductError::Truncated {
            what: what.to_string(),
            needed,
            available: file_size,
        });
    }
    file.read_exact(buf)?;
    Ok(())
}

fn to_usize(value: u64) -> Result<usize, ProductError> {
    usize::try_from(value).map_err(|_| ProductError::Parse(format!("size {value} does not fit in memory")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::envisat::dsd::tests::format_dsd;
    use crate::io::envisat::layout::GEOLOCATION_GRID_ADSR;

    const SPH_TEXT_SIZE: usize = 100;

    fn header_block(lines: &[String], size: usize) -> Vec<u8> {
        let mut text = lines.join("\n");
        text.push('\n');
        let mut bytes = text.into_bytes();
        assert!(bytes.len() < size);
        bytes.resize(size - 1, b' ');
        bytes.push(b'\n');
        bytes
    }

    fn data_start(num_dsd: usize) -> u64 {
        (MPH_SIZE + SPH_TEXT_SIZE + num_dsd * DSD_SIZE) as u64
    }

    /// Product holding `dsds` followed by `payload`; `num_dsd` is written to the MPH as given
    fn write_product(dir: &Path, dsds: &[Vec<u8>], num_dsd: usize, payload: &[u8]) -> PathBuf {
        let sph_size = SPH_TEXT_SIZE + dsds.len() * DSD_SIZE;
        let mut out = header_block(
            &[
                "PRODUCT=\"ASA_IMS_1PNTEST20040109_194924_000000182023_00157_09730_0000.N1\"".to_string(),
                format!("SPH_SIZE={:+011}<bytes>", sph_size),
                format!("NUM_DSD={:+011}", num_dsd),
                format!("DSD_SIZE={:+011}<bytes>", DSD_SIZE),
            ],
            MPH_SIZE,
        );
        out.extend(header_block(
            &["SPH_DESCRIPTOR=\"Image Mode SLC Image\"".to_string()],
            SPH_TEXT_SIZE,
        ));
        for dsd in dsds {
            out.extend(dsd);
        }
        out.extend(payload);

        let path = dir.join("product.N1");
        std::fs::write(&path, out).unwrap();
        path
    }

    fn geolocation_record(slant_first: f32) -> Vec<u8> {
        let mut rec = vec![0u8; GEOLOCATION_GRID_ADSR.size];
        rec[69..73].copy_from_slice(&slant_first.to_be_bytes());
        rec
    }

    /// Two geolocation records and a four byte trailing set
    fn regular_product(dir: &Path) -> PathBuf {
        let start = data_start(3);
        let mut payload = geolocation_record(5.5e6);
        payload.extend(geolocation_record(5.6e6));
        let grid_size = payload.len() as u64;
        payload.extend([1, 2, 3, 4]);

        let mut spare = vec![b' '; DSD_SIZE - 1];
        spare.push(b'\n');
        let dsds = [
            format_dsd("GEOLOCATION GRID ADS", 'A', start, grid_size, 2, GEOLOCATION_GRID_ADSR.size),
            format_dsd("MDS1", 'M', start + grid_size, 4, 1, 4),
            spare,
        ];
        write_product(dir, &dsds, 3, &payload)
    }

    #[test]
    fn opens_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let direct = DirectAccess::open(regular_product(dir.path())).unwrap();

        let names: Vec<_> = direct.data_sets().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["GEOLOCATION GRID ADS", "MDS1"]);
        assert_eq!(direct.read_record_bytes("MDS1", 0).unwrap(), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn reads_records_and_missing_sets() {
        let dir = tempfile::tempdir().unwrap();
        let direct = DirectAccess::open(regular_product(dir.path())).unwrap();

        let records = direct.read_records("GEOLOCATION GRID ADS", &GEOLOCATION_GRID_ADSR).unwrap();
        assert_eq!(records.len(), 2);
        let second = records[1].get("first_line_tie_points").and_then(|v| v.as_struct()).unwrap();
        assert_eq!(second.floats("slant_range_times").unwrap()[0], 5.6e6);

        let bytes = direct.read_record_bytes("GEOLOCATION GRID ADS", 1).unwrap().unwrap();
        assert_eq!(bytes.len(), GEOLOCATION_GRID_ADSR.size);
        assert!(direct.read_record_bytes("GEOLOCATION GRID ADS", 2).unwrap().is_none());
        assert!(direct.read_records("SR GR ADS", &GEOLOCATION_GRID_ADSR).unwrap().is_empty());
        assert!(direct.read_record_bytes("MDS2", 0).unwrap().is_none());
    }

    #[test]
    fn rejects_non_envisat_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_product.N1");
        std::fs::write(&path, vec![b'x'; MPH_SIZE + 10]).unwrap();
        assert!(matches!(DirectAccess::open(&path), Err(ProductError::NotEnvisat(_))));

        std::fs::write(&path, b"PRODUCT=\"short\"\n").unwrap();
        assert!(matches!(DirectAccess::open(&path), Err(ProductError::Truncated { .. })));
    }

    #[test]
    fn descriptors_must_fit_in_the_sph() {
        let dir = tempfile::tempdir().unwrap();
        let dsds = [format_dsd("MDS1", 'M', data_start(1), 4, 1, 4)];
        let path = write_product(dir.path(), &dsds, 6, &[0; 4]);

        let err = DirectAccess::open(&path).unwrap_err();
        assert!(matches!(err, ProductError::Parse(msg) if msg.contains("exceeds SPH_SIZE")));
    }

    #[test]
    fn data_sets_past_the_end_of_file_are_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let start = data_start(1);
        let record = geolocation_record(5.5e6);
        let dsds = [format_dsd(
            "GEOLOCATION GRID ADS",
            'A',
            start,
            3 * record.len() as u64,
            3,
            GEOLOCATION_GRID_ADSR.size,
        )];
        let path = write_product(dir.path(), &dsds, 1, &record);
        let direct = DirectAccess::open(&path).unwrap();

        let err = direct.read_records("GEOLOCATION GRID ADS", &GEOLOCATION_GRID_ADSR).unwrap_err();
        let ProductError::Truncated { needed, available, .. } = err else {
            panic!("expected a truncation error, got {err}");
        };
        assert_eq!(needed, start + 3 * record.len() as u64);
        assert_eq!(available, start + record.len() as u64);
        assert!(matches!(
            direct.read_record_bytes("GEOLOCATION GRID ADS", 2),
            Err(ProductError::Truncated { .. })
        ));
        assert!(direct.read_record_bytes("GEOLOCATION GRID ADS", 0).unwrap().is_some());
    }

    #[test]
    fn oversized_record_counts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dsds = [format_dsd(
            "GEOLOCATION GRID ADS",
            'A',
            data_start(1),
            4_000_000_017,
            9_999_999_999,
            4_000_000_017,
        )];
        let path = write_product(dir.path(), &dsds, 1, &[0; 16]);
        let direct = DirectAccess::open(&path).unwrap();
        let dsd = direct.data_set("GEOLOCATION GRID ADS").unwrap();

        assert!(matches!(direct.records_span(dsd), Err(ProductError::Parse(_))));
        assert!(matches!(
            direct.read_records("GEOLOCATION GRID ADS", &GEOLOCATION_GRID_ADSR),
            Err(ProductError::Parse(_))
        ));
        assert!(matches!(
            direct.read_record_bytes("GEOLOCATION GRID ADS", 9_999_999_000),
            Err(ProductError::Parse(_) | ProductError::Truncated { .. })
        ));
    }
}
