//! Modality buckets and their classification from series descriptions.

use std::fmt;

/// MRI sequence families recognised from free-text series descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    T1w,
    T2w,
    Fmri,
    Dmri,
    Swi,
}

impl Modality {
    /// All buckets, in classification priority order.
    pub const ALL: [Modality; 5] = [
        Modality::T1w,
        Modality::T2w,
        Modality::Fmri,
        Modality::Dmri,
        Modality::Swi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Modality::T1w => "T1w",
            Modality::T2w => "T2w",
            Modality::Fmri => "fMRI",
            Modality::Dmri => "dMRI",
            Modality::Swi => "SWI",
        }
    }

    /// Column holding the joined series descriptions of this bucket.
    pub fn descriptions_column(self) -> &'static str {
        match self {
            Modality::T1w => "T1w_Descriptions",
            Modality::T2w => "T2w_Descriptions",
            Modality::Fmri => "fMRI_Descriptions",
            Modality::Dmri => "dMRI_Descriptions",
            Modality::Swi => "SWI_Descriptions",
        }
    }

    /// Column holding the joined pulse sequence names of this bucket.
    pub fn pulse_sequences_column(self) -> &'static str {
        match self {
            Modality::T1w => "T1w_PulseSequences",
            Modality::T2w => "T2w_PulseSequences",
            Modality::Fmri => "fMRI_PulseSequences",
            Modality::Dmri => "dMRI_PulseSequences",
            Modality::Swi => "SWI_PulseSequences",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Modality::T1w => &["t1"],
            Modality::T2w => &["t2"],
            Modality::Fmri => &["func", "fmap"],
            Modality::Dmri => &["dwi", "dmri"],
            Modality::Swi => &["swi"],
        }
    }

    /// Bucket of a series description, matched case-insensitively.
    ///
    /// The first bucket in [`Modality::ALL`] with a matching keyword wins,
    /// so `"t1_dwi_scan"` is T1w. Descriptions matching nothing yield `None`.
    pub fn classify(description: &str) -> Option<Modality> {
        let lowered = description.to_lowercase();
        Modality::ALL
            .into_iter()
            .find(|m| m.keywords().iter().any(|k| lowered.contains(*k)))
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
