//! Per-series metadata rows and their derived fields.

use chrono::NaiveDate;
use dicom_dictionary_std::tags;
use serde::Serialize;

use crate::attributes::AttributeStore;

/// Stand-in for any absent or unusable value.
pub const NA: &str = "NA";

/// One row of the series table: metadata sampled from a single
/// representative file of a series directory.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "PatientBirthDate")]
    pub patient_birth_date: String,
    #[serde(rename = "StudyInstanceUID")]
    pub study_instance_uid: String,
    #[serde(rename = "SeriesInstanceUID")]
    pub series_instance_uid: String,
    #[serde(rename = "StudyDate")]
    pub study_date: String,
    #[serde(rename = "StationName")]
    pub station_name: String,
    #[serde(rename = "DeviceSerialNumber")]
    pub device_serial_number: String,
    #[serde(rename = "MagneticFieldStrength")]
    pub magnetic_field_strength: String,
    #[serde(rename = "StudyDescription")]
    pub study_description: String,
    #[serde(rename = "SeriesDescription")]
    pub series_description: String,
    #[serde(rename = "SeriesNumber")]
    pub series_number: String,
    #[serde(rename = "Modality")]
    pub modality: String,
    #[serde(rename = "AcquisitionDuration")]
    pub acquisition_duration: String,
    #[serde(rename = "PulseSequenceName")]
    pub pulse_sequence_name: String,
    #[serde(rename = "InstanceNumber")]
    pub instance_number: String,
    #[serde(rename = "PixelSpacing")]
    pub pixel_spacing: String,
    #[serde(rename = "SliceThickness")]
    pub slice_thickness: String,
    #[serde(rename = "SpacingBetweenSlices")]
    pub spacing_between_slices: String,
    #[serde(rename = "ImageOrientationPatient")]
    pub image_orientation_patient: String,
    #[serde(rename = "Rows")]
    pub rows: String,
    #[serde(rename = "Columns")]
    pub columns: String,
    #[serde(rename = "FOV_Row_mm")]
    pub fov_row_mm: String,
    #[serde(rename = "FOV_Col_mm")]
    pub fov_col_mm: String,
}

impl SeriesRecord {
    /// Column names, in the order fields are written.
    pub const HEADER: [&'static str; 23] = [
        "PatientID",
        "PatientBirthDate",
        "StudyInstanceUID",
        "SeriesInstanceUID",
        "StudyDate",
        "StationName",
        "DeviceSerialNumber",
        "MagneticFieldStrength",
        "StudyDescription",
        "SeriesDescription",
        "SeriesNumber",
        "Modality",
        "AcquisitionDuration",
        "PulseSequenceName",
        "InstanceNumber",
        "PixelSpacing",
        "SliceThickness",
        "SpacingBetweenSlices",
        "ImageOrientationPatient",
        "Rows",
        "Columns",
        "FOV_Row_mm",
        "FOV_Col_mm",
    ];

    /// Build a record from a parsed data set. Absent attributes become [`NA`].
    pub fn from_attributes<A: AttributeStore + ?Sized>(attrs: &A) -> Self {
        let text = |tag| attrs.text(tag).unwrap_or_else(|| NA.to_string());
        let decimals = |tag| {
            attrs
                .numbers(tag)
                .map(|values| join_decimals(&values))
                .unwrap_or_else(|| NA.to_string())
        };

        let birth_date = attrs.text(tags::PATIENT_BIRTH_DATE);
        let spacing = attrs.numbers(tags::PIXEL_SPACING);
        let rows = attrs.numbers(tags::ROWS).and_then(|v| v.first().copied());
        let columns = attrs.numbers(tags::COLUMNS).and_then(|v| v.first().copied());
        let (fov_row_mm, fov_col_mm) = field_of_view(spacing.as_deref(), rows, columns);

        SeriesRecord {
            patient_id: text(tags::PATIENT_ID),
            patient_birth_date: format_birthdate(birth_date.as_deref().unwrap_or("")),
            study_instance_uid: text(tags::STUDY_INSTANCE_UID),
            series_instance_uid: text(tags::SERIES_INSTANCE_UID),
            study_date: text(tags::STUDY_DATE),
            station_name: text(tags::STATION_NAME),
            device_serial_number: text(tags::DEVICE_SERIAL_NUMBER),
            magnetic_field_strength: text(tags::MAGNETIC_FIELD_STRENGTH),
            study_description: text(tags::STUDY_DESCRIPTION),
            series_description: text(tags::SERIES_DESCRIPTION),
            series_number: text(tags::SERIES_NUMBER),
            modality: text(tags::MODALITY),
            acquisition_duration: text(tags::ACQUISITION_DURATION),
            pulse_sequence_name: text(tags::PULSE_SEQUENCE_NAME),
            instance_number: text(tags::INSTANCE_NUMBER),
            pixel_spacing: decimals(tags::PIXEL_SPACING),
            slice_thickness: text(tags::SLICE_THICKNESS),
            spacing_between_slices: text(tags::SPACING_BETWEEN_SLICES),
            image_orientation_patient: decimals(tags::IMAGE_ORIENTATION_PATIENT),
            rows: text(tags::ROWS),
            columns: text(tags::COLUMNS),
            fov_row_mm,
            fov_col_mm,
        }
    }
}

/// Reformat a compact `YYYYMMDD` date as `YYYY-MM-DD`.
///
/// Anything other than eight digits forming a valid calendar date yields [`NA`].
pub fn format_birthdate(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return NA.to_string();
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| NA.to_string())
}

/// Field of view in millimetres along rows and columns.
///
/// Both values are computed together: if the spacing pair, the row count or
/// the column count is missing, both come back as [`NA`].
pub fn field_of_view(
    pixel_spacing: Option<&[f64]>,
    rows: Option<f64>,
    columns: Option<f64>,
) -> (String, String) {
    match (pixel_spacing, rows, columns) {
        (Some([row_spacing, col_spacing, ..]), Some(rows), Some(columns)) => (
            format_millimetres(round2(row_spacing * rows)),
            format_millimetres(round2(col_spacing * columns)),
        ),
        _ => (NA.to_string(), NA.to_string()),
    }
}

/// Round to two decimals, ties to even on the exact binary value.
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Whole millimetre values keep one decimal place (`240.0`).
fn format_millimetres(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn format_decimal(value: f64) -> String {
    format!("{}", value)
}

fn join_decimals(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| format_decimal(v))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::Tag;
    use std::collections::HashMap;

    /// Attribute store backed by plain strings, `\`-separated like DICOM.
    #[derive(Default)]
    struct FakeStore(HashMap<Tag, &'static str>);

    impl FakeStore {
        fn with(mut self, tag: Tag, value: &'static str) -> Self {
            self.0.insert(tag, value);
            self
        }
    }

    impl AttributeStore for FakeStore {
        fn text(&self, tag: Tag) -> Option<String> {
            self.0.get(&tag).map(|v| v.to_string())
        }

        fn numbers(&self, tag: Tag) -> Option<Vec<f64>> {
            let raw = self.0.get(&tag)?;
            raw.split('\\').map(|v| v.trim().parse().ok()).collect()
        }
    }

    #[test]
    fn birthdate_is_reformatted() {
        assert_eq!(format_birthdate("19850203"), "1985-02-03");
        assert_eq!(format_birthdate(" 20000229 "), "2000-02-29");
    }

    #[test]
    fn bad_birthdates_are_na() {
        assert_eq!(format_birthdate("invalid"), NA);
        assert_eq!(format_birthdate(""), NA);
        assert_eq!(format_birthdate("1985023"), NA);
        assert_eq!(format_birthdate("198502031"), NA);
        assert_eq!(format_birthdate("19851302"), NA);
        assert_eq!(format_birthdate("+1985020"), NA);
    }

    #[test]
    fn field_of_view_multiplies_and_rounds() {
        let (row, col) = field_of_view(Some(&[0.9375, 0.5]), Some(256.0), Some(192.0));
        assert_eq!(row, "240.0");
        assert_eq!(col, "96.0");

        let (row, col) = field_of_view(Some(&[0.46875, 0.333333]), Some(383.0), Some(100.0));
        assert_eq!(row, "179.53");
        assert_eq!(col, "33.33");
    }

    #[test]
    fn field_of_view_rounds_exact_ties_to_even() {
        // 0.703125 * 200 is exactly 140.625
        let (row, col) = field_of_view(Some(&[0.703125, 0.703125]), Some(200.0), Some(200.0));
        assert_eq!(row, "140.62");
        assert_eq!(col, "140.62");

        // 0.546875 * 100 is exactly 54.6875, not a two-decimal tie
        let (row, _) = field_of_view(Some(&[0.546875, 1.0]), Some(100.0), Some(1.0));
        assert_eq!(row, "54.69");
    }

    #[test]
    fn field_of_view_is_na_as_a_pair() {
        let na = (NA.to_string(), NA.to_string());
        assert_eq!(field_of_view(None, Some(256.0), Some(256.0)), na);
        assert_eq!(field_of_view(Some(&[0.5]), Some(256.0), Some(256.0)), na);
        assert_eq!(field_of_view(Some(&[0.5, 0.5]), None, Some(256.0)), na);
        assert_eq!(field_of_view(Some(&[0.5, 0.5]), Some(256.0), None), na);
    }

    #[test]
    fn record_from_full_store() {
        let store = FakeStore::default()
            .with(tags::PATIENT_ID, "P1")
            .with(tags::PATIENT_BIRTH_DATE, "19850203")
            .with(tags::STUDY_DATE, "20240101")
            .with(tags::SERIES_DESCRIPTION, "t1_mprage")
            .with(tags::PULSE_SEQUENCE_NAME, "*tfl3d1")
            .with(tags::PIXEL_SPACING, "0.5\\0.75")
            .with(tags::IMAGE_ORIENTATION_PATIENT, "1\\0\\0\\0\\1\\0")
            .with(tags::ROWS, "256")
            .with(tags::COLUMNS, "200");

        let record = SeriesRecord::from_attributes(&store);
        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.patient_birth_date, "1985-02-03");
        assert_eq!(record.study_date, "20240101");
        assert_eq!(record.series_description, "t1_mprage");
        assert_eq!(record.pulse_sequence_name, "*tfl3d1");
        assert_eq!(record.pixel_spacing, "0.5;0.75");
        assert_eq!(record.image_orientation_patient, "1;0;0;0;1;0");
        assert_eq!(record.rows, "256");
        assert_eq!(record.columns, "200");
        assert_eq!(record.fov_row_mm, "128.0");
        assert_eq!(record.fov_col_mm, "150.0");
        assert_eq!(record.station_name, NA);
    }

    #[test]
    fn record_from_empty_store_is_all_na() {
        let record = SeriesRecord::from_attributes(&FakeStore::default());
        assert_eq!(record.patient_id, NA);
        assert_eq!(record.patient_birth_date, NA);
        assert_eq!(record.pixel_spacing, NA);
        assert_eq!(record.image_orientation_patient, NA);
        assert_eq!(record.fov_row_mm, NA);
        assert_eq!(record.fov_col_mm, NA);
    }

    #[test]
    fn non_numeric_geometry_gives_na_fov() {
        let store = FakeStore::default()
            .with(tags::PIXEL_SPACING, "0.5\\0.5")
            .with(tags::ROWS, "many")
            .with(tags::COLUMNS, "256");

        let record = SeriesRecord::from_attributes(&store);
        assert_eq!(record.pixel_spacing, "0.5;0.5");
        assert_eq!(record.rows, "many");
        assert_eq!(record.fov_row_mm, NA);
        assert_eq!(record.fov_col_mm, NA);
    }

    #[test]
    fn header_matches_serialized_field_names() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer
            .serialize(SeriesRecord::from_attributes(&FakeStore::default()))
            .unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, SeriesRecord::HEADER.join(","));
    }
}
