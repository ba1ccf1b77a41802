//! Attribute lookup over parsed DICOM objects.
//!
//! The rest of the crate only sees the [`AttributeStore`] trait, so record
//! extraction can be exercised without any binary DICOM on disk.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use dicom::encoding::transfer_syntax::TransferSyntaxIndex;
use dicom::transfer_syntax::TransferSyntaxRegistry;
use dicom_core::{Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::file::ReadPreamble;
use dicom_object::{InMemDicomObject, OpenFileOptions};
use tracing::trace;

use crate::error::{Error, Result};

/// Implicit VR Little Endian, the default DICOM transfer syntax.
const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// Key-value view of a DICOM data set.
///
/// Both lookups return `None` when the attribute is absent, empty,
/// or cannot be converted.
pub trait AttributeStore {
    /// The attribute rendered as text, with DICOM padding removed.
    /// Multiple values stay separated by `\`.
    fn text(&self, tag: Tag) -> Option<String>;

    /// Every value of the attribute as a decimal number, in stored order.
    fn numbers(&self, tag: Tag) -> Option<Vec<f64>>;
}

impl AttributeStore for InMemDicomObject {
    fn text(&self, tag: Tag) -> Option<String> {
        let element = self.element_opt(tag).ok().flatten()?;
        let value = element.to_str().ok()?;
        let value = value.trim_matches(|c: char| c == ' ' || c == '\0');
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn numbers(&self, tag: Tag) -> Option<Vec<f64>> {
        let element = self.element_opt(tag).ok().flatten()?;
        let values = element.to_multi_float64().ok()?;
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }
}

/// Parse `path` as DICOM, tolerating a missing preamble or file meta group.
///
/// Attempts, in order: a regular Part 10 file, a Part 10 file without the
/// 128-byte preamble, and a bare data set in Little Endian.
/// Reading stops before Pixel Data. When every attempt fails, the error of
/// the first one is reported.
///
/// A bare data set is read as Explicit VR Little Endian when bytes 4..6
/// of the file spell a known VR, as Implicit VR Little Endian otherwise.
pub fn open_forced(path: &Path) -> Result<InMemDicomObject> {
    let first_error = match OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
    {
        Ok(obj) => return Ok(obj.into_inner()),
        Err(e) => e.to_string(),
    };

    match OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .read_preamble(ReadPreamble::Never)
        .open_file(path)
    {
        Ok(obj) => {
            trace!("{} has no preamble", path.display());
            return Ok(obj.into_inner());
        }
        Err(e) => trace!("{} without preamble: {}", path.display(), e),
    }

    match read_bare_dataset(path) {
        Some(obj) => {
            trace!("{} read as a bare data set", path.display());
            Ok(obj)
        }
        None => Err(Error::Parse {
            path: path.to_path_buf(),
            message: first_error,
        }),
    }
}

fn read_bare_dataset(path: &Path) -> Option<InMemDicomObject> {
    let uid = bare_transfer_syntax(path)?;
    let ts = TransferSyntaxRegistry.get(uid)?;
    let file = File::open(path).ok()?;
    let obj = InMemDicomObject::read_dataset_with_ts(BufReader::new(file), ts).ok()?;
    // a data set without elements is not a DICOM object
    if obj.iter().next().is_none() {
        return None;
    }
    Some(obj)
}

/// Guess the encoding of a data set without file meta information
/// from the VR slot of its first element header.
fn bare_transfer_syntax(path: &Path) -> Option<&'static str> {
    let mut head = [0u8; 6];
    File::open(path).ok()?.read_exact(&mut head).ok()?;
    if VR::from_binary([head[4], head[5]]).is_some() {
        Some(EXPLICIT_VR_LITTLE_ENDIAN)
    } else {
        Some(IMPLICIT_VR_LITTLE_ENDIAN)
    }
}
