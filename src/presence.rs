//! Per-study presence flags for each modality bucket.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::aggregate::StudyKey;
use crate::error::Result;
use crate::modality::Modality;
use crate::table::{self, Row};

/// Which buckets a study has at least one series for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRow {
    pub key: StudyKey,
    present: [bool; 5],
}

impl PresenceRow {
    pub const HEADER: [&'static str; 7] = ["PatientID", "StudyDate", "T1w", "T2w", "fMRI", "dMRI", "SWI"];

    pub fn new(key: StudyKey) -> Self {
        PresenceRow {
            key,
            present: [false; 5],
        }
    }

    pub fn has(&self, modality: Modality) -> bool {
        self.present[Self::slot(modality)]
    }

    pub fn set(&mut self, modality: Modality) {
        self.present[Self::slot(modality)] = true;
    }

    /// Raise the flag of every bucket whose descriptions column in `row`
    /// is non-blank. Flags already raised stay raised.
    pub fn merge_study_row(&mut self, row: &Row) {
        for modality in Modality::ALL {
            let found = row
                .get(modality.descriptions_column())
                .is_some_and(|descriptions| !descriptions.trim().is_empty());
            if found {
                self.set(modality);
            }
        }
    }

    fn slot(modality: Modality) -> usize {
        Modality::ALL
            .iter()
            .position(|m| *m == modality)
            .unwrap_or_default()
    }
}

#[derive(Serialize)]
struct PresenceRecord<'a> {
    patient_id: &'a str,
    study_date: &'a str,
    t1w: u8,
    t2w: u8,
    fmri: u8,
    dmri: u8,
    swi: u8,
}

impl<'a> From<&'a PresenceRow> for PresenceRecord<'a> {
    fn from(row: &'a PresenceRow) -> Self {
        let flag = |modality| u8::from(row.has(modality));
        PresenceRecord {
            patient_id: &row.key.patient_id,
            study_date: &row.key.study_date,
            t1w: flag(Modality::T1w),
            t2w: flag(Modality::T2w),
            fmri: flag(Modality::Fmri),
            dmri: flag(Modality::Dmri),
            swi: flag(Modality::Swi),
        }
    }
}

/// Reduce study rows to one presence row per study, in first-seen order.
/// Rows sharing a key are merged.
pub fn presence_rows(rows: &[Row], path: &Path) -> Result<Vec<PresenceRow>> {
    let mut index: HashMap<StudyKey, usize> = HashMap::new();
    let mut presence: Vec<PresenceRow> = Vec::new();

    for row in rows {
        let key = StudyKey::from_row(row, path)?;
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            presence.push(PresenceRow::new(key));
            presence.len() - 1
        });
        presence[slot].merge_study_row(row);
    }

    Ok(presence)
}

/// Read the study table at `input_csv` and write presence flags to
/// `output_csv`. Returns the number of rows written.
pub fn reduce_presence(input_csv: &Path, output_csv: &Path) -> Result<usize> {
    let rows = table::read_rows(input_csv)?;
    let presence = presence_rows(&rows, input_csv)?;

    info!(
        "Writing {} presence rows to CSV: {}",
        presence.len(),
        output_csv.display()
    );
    table::write_rows(
        output_csv,
        &PresenceRow::HEADER,
        presence.iter().map(PresenceRecord::from),
    )?;
    Ok(presence.len())
}
