//! Study-level grouping of series rows into modality buckets.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::modality::Modality;
use crate::record::NA;
use crate::table::{self, Row};

/// Separator between entries of a joined bucket column.
pub const JOIN_SEPARATOR: &str = "; ";

/// Identifies a study: one patient on one date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudyKey {
    pub patient_id: String,
    pub study_date: String,
}

impl StudyKey {
    /// Key of a series or study row. `StudyDate` falls back to [`NA`]
    /// when the column is absent; `PatientID` is mandatory.
    pub fn from_row(row: &Row, path: &Path) -> Result<Self> {
        Ok(StudyKey {
            patient_id: table::required(row, "PatientID", path)?.to_string(),
            study_date: row
                .get("StudyDate")
                .cloned()
                .unwrap_or_else(|| NA.to_string()),
        })
    }
}

/// The series seen for one study, in the order they were read.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyGroup {
    pub key: StudyKey,
    pub series: Vec<SeriesEntry>,
}

/// The two series columns this stage cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub description: String,
    pub pulse_sequence: String,
}

impl SeriesEntry {
    pub fn from_row(row: &Row) -> Self {
        let column = |name: &str| row.get(name).cloned().unwrap_or_else(|| NA.to_string());
        SeriesEntry {
            description: column("SeriesDescription"),
            pulse_sequence: column("PulseSequenceName"),
        }
    }
}

impl StudyGroup {
    /// Descriptions and pulse sequences of the series classified into
    /// `modality`, position-aligned.
    pub fn bucket(&self, modality: Modality) -> (Vec<&str>, Vec<&str>) {
        self.series
            .iter()
            .filter(|entry| Modality::classify(&entry.description) == Some(modality))
            .map(|entry| (entry.description.as_str(), entry.pulse_sequence.as_str()))
            .unzip()
    }

    pub fn summarize(&self) -> StudyRow {
        let joined = |modality| {
            let (descriptions, pulse_sequences) = self.bucket(modality);
            (
                descriptions.join(JOIN_SEPARATOR),
                pulse_sequences.join(JOIN_SEPARATOR),
            )
        };
        let (t1w_descriptions, t1w_pulse_sequences) = joined(Modality::T1w);
        let (t2w_descriptions, t2w_pulse_sequences) = joined(Modality::T2w);
        let (fmri_descriptions, fmri_pulse_sequences) = joined(Modality::Fmri);
        let (dmri_descriptions, dmri_pulse_sequences) = joined(Modality::Dmri);
        let (swi_descriptions, swi_pulse_sequences) = joined(Modality::Swi);

        StudyRow {
            patient_id: self.key.patient_id.clone(),
            study_date: self.key.study_date.clone(),
            t1w_descriptions,
            t1w_pulse_sequences,
            t2w_descriptions,
            t2w_pulse_sequences,
            fmri_descriptions,
            fmri_pulse_sequences,
            dmri_descriptions,
            dmri_pulse_sequences,
            swi_descriptions,
            swi_pulse_sequences,
        }
    }
}

/// One row of the study table.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StudyRow {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "StudyDate")]
    pub study_date: String,
    #[serde(rename = "T1w_Descriptions")]
    pub t1w_descriptions: String,
    #[serde(rename = "T1w_PulseSequences")]
    pub t1w_pulse_sequences: String,
    #[serde(rename = "T2w_Descriptions")]
    pub t2w_descriptions: String,
    #[serde(rename = "T2w_PulseSequences")]
    pub t2w_pulse_sequences: String,
    #[serde(rename = "fMRI_Descriptions")]
    pub fmri_descriptions: String,
    #[serde(rename = "fMRI_PulseSequences")]
    pub fmri_pulse_sequences: String,
    #[serde(rename = "dMRI_Descriptions")]
    pub dmri_descriptions: String,
    #[serde(rename = "dMRI_PulseSequences")]
    pub dmri_pulse_sequences: String,
    #[serde(rename = "SWI_Descriptions")]
    pub swi_descriptions: String,
    #[serde(rename = "SWI_PulseSequences")]
    pub swi_pulse_sequences: String,
}

impl StudyRow {
    pub fn header() -> Vec<&'static str> {
        let mut header = vec!["PatientID", "StudyDate"];
        for modality in Modality::ALL {
            header.push(modality.descriptions_column());
            header.push(modality.pulse_sequences_column());
        }
        header
    }
}

/// Group series rows by study, keeping first-seen order of studies
/// and of series within a study.
pub fn group_rows(rows: &[Row], path: &Path) -> Result<Vec<StudyGroup>> {
    let mut index: HashMap<StudyKey, usize> = HashMap::new();
    let mut groups: Vec<StudyGroup> = Vec::new();

    for row in rows {
        let key = StudyKey::from_row(row, path)?;
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(StudyGroup {
                key,
                series: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].series.push(SeriesEntry::from_row(row));
    }

    Ok(groups)
}

/// Read the series table at `input_csv` and write one row per study to
/// `output_csv`. Returns the number of study rows written.
pub fn aggregate(input_csv: &Path, output_csv: &Path) -> Result<usize> {
    let rows = table::read_rows(input_csv)?;
    let groups = group_rows(&rows, input_csv)?;
    let study_rows: Vec<StudyRow> = groups.iter().map(StudyGroup::summarize).collect();

    info!(
        "Grouped {} series into {} studies, writing {}",
        rows.len(),
        study_rows.len(),
        output_csv.display()
    );
    table::write_rows(output_csv, &StudyRow::header(), &study_rows)?;
    Ok(study_rows.len())
}
