use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use crate::error::{Error, Result};

/// Write a single band Float32 TIFF of `rows` x `cols` samples in row-major order.
pub fn write_tiff_f32(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[f32],
    description: Option<&str>,
) -> Result<()> {
    if data.len() != cols * rows {
        return Err(Error::dimension(format!(
            "raster of {cols}x{rows} needs {} samples, got {}",
            cols * rows,
            data.len()
        )));
    }
    let width = u32::try_from(cols).map_err(|_| Error::InvalidArgument {
        arg: "cols",
        value: cols.to_string(),
    })?;
    let height = u32::try_from(rows).map_err(|_| Error::InvalidArgument {
        arg: "rows",
        value: rows.to_string(),
    })?;

    let mut encoder = TiffEncoder::new(BufWriter::new(File::create(output)?))?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(width, height)?;
    if let Some(text) = description {
        image.encoder().write_tag(Tag::ImageDescription, text)?;
    }
    image.write_data(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::decoder::{Decoder, DecodingResult};

    #[test]
    fn round_trips_float_samples_and_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.tiff");
        let data = [0.0f32, 1.5, -2.0, 4.25, 8.0, 16.0];

        write_tiff_f32(&path, 3, 2, &data, Some("amplitude")).unwrap();

        let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 2));
        assert_eq!(
            decoder.get_tag_ascii_string(Tag::ImageDescription).unwrap(),
            "amplitude"
        );
        match decoder.read_image().unwrap() {
            DecodingResult::F32(values) => assert_eq!(values, data),
            _ => panic!("expected f32 samples"),
        }
    }

    #[test]
    fn rejects_mismatched_length() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_tiff_f32(&dir.path().join("bad.tiff"), 4, 4, &[0.0; 3], None).unwrap_err();
        assert!(matches!(err, Error::Dimension(_)));
    }
}
