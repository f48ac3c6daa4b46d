//! Services for the Proof Converter
//!
//! Contains the field arithmetic, the format conversion itself, and artifact file handling.

pub mod artifacts;
pub mod converter;
pub mod field;

pub use artifacts::{ArtifactError, NativeInputs, RenderedArtifacts};
pub use converter::{ConversionOutput, ConvertError, ConverterConfig, FormatConverter};
pub use field::FieldElement;
