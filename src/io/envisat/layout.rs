//! Static descriptions of the annotation records read directly from the file.
//!
//! Every layout lists fields by byte offset inside one record. Groups collect
//! related fields (`first_line_tie_points`) and their field offsets are
//! relative to the group start. Spare bytes are not described.

use super::time::MJD_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Mjd,
    Flag,
    Int32,
    UInt32,
    Float32,
}

impl FieldKind {
    pub const fn size(&self) -> usize {
        match self {
            FieldKind::Mjd => MJD_SIZE,
            FieldKind::Flag => 1,
            FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Float32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub kind: FieldKind,
    pub count: usize,
}

impl Field {
    pub const fn end(&self) -> usize {
        self.offset + self.kind.size() * self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub name: &'static str,
    pub offset: usize,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Field(Field),
    Group(Group),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub size: usize,
    pub items: &'static [Item],
}

/// Location of a single field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLocation {
    pub offset: usize,
    pub kind: FieldKind,
    pub count: usize,
}

impl RecordLayout {
    /// Resolve `field` or `group.field` to an absolute offset
    pub fn locate(&self, path: &str) -> Option<FieldLocation> {
        let parts: Vec<&str> = path.split('.').collect();
        for item in self.items {
            match (item, parts.as_slice()) {
                (Item::Field(f), [name]) if f.name == *name => {
                    return Some(FieldLocation { offset: f.offset, kind: f.kind, count: f.count });
                }
                (Item::Group(g), [group, name]) if g.name == *group => {
                    return g.fields.iter().find(|f| f.name == *name).map(|f| FieldLocation {
                        offset: g.offset + f.offset,
                        kind: f.kind,
                        count: f.count,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// Highest byte touched by any described field
    pub fn described_end(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::Field(f) => f.end(),
                Item::Group(g) => g.fields.iter().map(|f| g.offset + f.end()).max().unwrap_or(g.offset),
            })
            .max()
            .unwrap_or(0)
    }
}

const fn f(name: &'static str, offset: usize, kind: FieldKind, count: usize) -> Field {
    Field { name, offset, kind, count }
}

const fn one(name: &'static str, offset: usize, kind: FieldKind) -> Item {
    Item::Field(f(name, offset, kind, 1))
}

const fn group(name: &'static str, offset: usize, fields: &'static [Field]) -> Item {
    Item::Group(Group { name, offset, fields })
}

use FieldKind::*;

/// Offset of the elevation calibration vectors in the extended main processing record
pub const MPP_CALIBRATION_VECTORS_OFFSET: usize = 2029;
/// Number of samples in each elevation calibration vector
pub const MPP_CALIBRATION_VECTOR_LEN: usize = 1005;
/// Record size of the main processing parameters when calibration vectors are attached
pub const MPP_EXTENDED_SIZE: usize = MPP_CALIBRATION_VECTORS_OFFSET + 2 * 4 * MPP_CALIBRATION_VECTOR_LEN;

/// Number of tie points across the swath in one geolocation grid line
pub const GEOLOCATION_TIE_POINTS: usize = 11;

const TIE_POINTS: &[Field] = &[
    f("samp_numbers", 0, UInt32, GEOLOCATION_TIE_POINTS),
    f("slant_range_times", 44, Float32, GEOLOCATION_TIE_POINTS),
    f("angles", 88, Float32, GEOLOCATION_TIE_POINTS),
    f("lats", 132, Int32, GEOLOCATION_TIE_POINTS),
    f("longs", 176, Int32, GEOLOCATION_TIE_POINTS),
];

/// `GEOLOCATION GRID ADS`
pub const GEOLOCATION_GRID_ADSR: RecordLayout = RecordLayout {
    name: "GEOLOCATION GRID ADS",
    size: 521,
    items: &[
        one("first_zero_doppler_time", 0, Mjd),
        one("attach_flag", 12, Flag),
        one("line_num", 13, UInt32),
        one("num_lines", 17, UInt32),
        one("sub_sat_track", 21, Float32),
        group("first_line_tie_points", 25, TIE_POINTS),
        one("last_zero_doppler_time", 267, Mjd),
        group("last_line_tie_points", 279, TIE_POINTS),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_fit_inside_records() {
        assert!(GEOLOCATION_GRID_ADSR.described_end() <= GEOLOCATION_GRID_ADSR.size);
    }

    #[test]
    fn fields_do_not_overlap() {
        let mut spans = Vec::new();
        for item in GEOLOCATION_GRID_ADSR.items {
            match item {
                Item::Field(f) => spans.push((f.offset, f.end(), f.name)),
                Item::Group(g) => {
                    for f in g.fields {
                        spans.push((g.offset + f.offset, g.offset + f.end(), f.name));
                    }
                }
            }
        }
        spans.sort();
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "{} overlaps {}", pair[0].2, pair[1].2);
        }
    }

    #[test]
    fn locates_nested_fields() {
        let slant = GEOLOCATION_GRID_ADSR.locate("first_line_tie_points.slant_range_times").unwrap();
        assert_eq!(slant.offset, 69);
        assert_eq!(slant.count, GEOLOCATION_TIE_POINTS);
        assert_eq!(GEOLOCATION_GRID_ADSR.locate("first_line_tie_points.angles").unwrap().offset, 113);
        assert_eq!(GEOLOCATION_GRID_ADSR.locate("first_line_tie_points.lats").unwrap().offset, 157);
        assert_eq!(GEOLOCATION_GRID_ADSR.locate("last_zero_doppler_time").unwrap().kind, Mjd);
        assert!(GEOLOCATION_GRID_ADSR.locate("first_line_tie_points").is_none());
        assert!(GEOLOCATION_GRID_ADSR.locate("first_line_tie_points.heights").is_none());
    }

    #[test]
    fn extended_record_size_matches_calibration_vectors() {
        assert_eq!(MPP_EXTENDED_SIZE, 10069);
    }
}
