//! snarkjs → o1js-blobstream Groth16 format conversion
//!
//! Converts a native proof, its public inputs and its verification key into the
//! flattened artifacts parsed by the o1js-blobstream Groth16 verifier:
//! - Proof: `pi_a/pi_b/pi_c` → `negA/B/C`, negating the y coordinate of `pi_a`
//! - Public inputs: `public[i]` → `pi{i+1}`
//! - VK: nested arrays flattened, `IC[i]` → `ic{i}`, `vk_alphabeta_12` → `alpha_beta`
//!
//! Structural consistency between the key and the public inputs is checked
//! before any coordinate is touched.

use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::services::field::{FieldElement, FieldError};
use crate::types::{
    ErrorCode, FlattenedProof, FlattenedVerificationKey, Fp12Element, G1Point, G2Point,
    NativeProof, NativeVerificationKey,
};

/// Non-zero components of the fixed `w27` element (`g2` pair)
///
/// This value is NOT derived from the verification key. It is the default shipped
/// with the o1js-blobstream example key, and every conversion emits it unchanged.
pub const W27_G20: &str =
    "8204864362109909869166472767738877274689483185363591877943943203703805152849";
pub const W27_G21: &str =
    "17912368812864921115467448876996876278487602260484145953989158612875588124088";

static W27: Lazy<Fp12Element> = Lazy::new(|| {
    let component = |raw: &str| {
        FieldElement::parse(raw, true).expect("w27 constant is a reduced decimal field element")
    };
    Fp12Element {
        g00: FieldElement::zero(),
        g01: FieldElement::zero(),
        g10: FieldElement::zero(),
        g11: FieldElement::zero(),
        g20: component(W27_G20),
        g21: component(W27_G21),
        h00: FieldElement::zero(),
        h01: FieldElement::zero(),
        h10: FieldElement::zero(),
        h11: FieldElement::zero(),
        h20: FieldElement::zero(),
        h21: FieldElement::zero(),
    }
});

/// The fixed `w27` element emitted into every flattened verification key
pub fn fixed_w27() -> Fp12Element {
    W27.clone()
}

/// Disagreement between the verification key and the public inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// `nPublic` differs from the number of public inputs
    NPublic { n_public: usize, public_inputs: usize },
    /// `len(IC)` differs from the number of public inputs plus one
    IcPoints { ic_points: usize, public_inputs: usize },
}

impl Mismatch {
    pub fn expected(&self) -> usize {
        match self {
            Mismatch::NPublic { public_inputs, .. } => *public_inputs,
            Mismatch::IcPoints { public_inputs, .. } => public_inputs + 1,
        }
    }

    pub fn actual(&self) -> usize {
        match self {
            Mismatch::NPublic { n_public, .. } => *n_public,
            Mismatch::IcPoints { ic_points, .. } => *ic_points,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::NPublic {
                n_public,
                public_inputs,
            } => write!(
                f,
                "VK nPublic ({n_public}) doesn't match public inputs ({public_inputs})"
            ),
            Mismatch::IcPoints {
                ic_points,
                public_inputs,
            } => write!(
                f,
                "VK IC points ({ic_points}) should be {} for {public_inputs} public inputs",
                public_inputs + 1
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(Mismatch),
    #[error("Malformed field element at {location}: {source}")]
    MalformedFieldElement {
        location: String,
        #[source]
        source: FieldError,
    },
    #[error("Malformed point at {location}: expected {expected} components, got {actual}")]
    MalformedPoint {
        location: String,
        expected: usize,
        actual: usize,
    },
}

impl ConvertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::StructuralMismatch(_) => ErrorCode::StructuralMismatch,
            ConvertError::MalformedFieldElement { .. } => ErrorCode::MalformedFieldElement,
            ConvertError::MalformedPoint { .. } => ErrorCode::MalformedPoint,
        }
    }
}

/// Converter configuration
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Reject coordinates that are not below the BN254 modulus
    pub enforce_field_range: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            enforce_field_range: true,
        }
    }
}

/// Both flattened artifacts of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub proof: FlattenedProof,
    pub verification_key: FlattenedVerificationKey,
}

/// Stateless Groth16 format converter
#[derive(Debug, Clone, Default)]
pub struct FormatConverter {
    config: ConverterConfig,
}

impl FormatConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Check that `nPublic` and the IC point count agree with the public inputs
    pub fn validate(
        &self,
        vk: &NativeVerificationKey,
        public_inputs: &[String],
    ) -> Result<(), ConvertError> {
        if vk.n_public != public_inputs.len() {
            return Err(ConvertError::StructuralMismatch(Mismatch::NPublic {
                n_public: vk.n_public,
                public_inputs: public_inputs.len(),
            }));
        }

        if vk.ic.len() != public_inputs.len() + 1 {
            return Err(ConvertError::StructuralMismatch(Mismatch::IcPoints {
                ic_points: vk.ic.len(),
                public_inputs: public_inputs.len(),
            }));
        }

        Ok(())
    }

    /// Convert the proof and its public inputs
    ///
    /// Assumes [`validate`](Self::validate) has passed for the same inputs.
    pub fn convert_proof(
        &self,
        proof: &NativeProof,
        public_inputs: &[String],
    ) -> Result<FlattenedProof, ConvertError> {
        let a = self.g1(&proof.pi_a, "pi_a")?;
        let neg_a = G1Point {
            y: a.y.negate(),
            x: a.x,
        };

        let public_inputs = public_inputs
            .iter()
            .enumerate()
            .map(|(i, raw)| self.field(raw, || format!("public_inputs[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FlattenedProof {
            neg_a,
            b: self.g2(&proof.pi_b, "pi_b")?,
            c: self.g1(&proof.pi_c, "pi_c")?,
            public_inputs,
        })
    }

    /// Convert the verification key
    pub fn convert_verification_key(
        &self,
        vk: &NativeVerificationKey,
    ) -> Result<FlattenedVerificationKey, ConvertError> {
        let ic = vk
            .ic
            .iter()
            .enumerate()
            .map(|(i, point)| self.g1(point, &format!("IC[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FlattenedVerificationKey {
            alpha: self.g1(&vk.vk_alpha_1, "vk_alpha_1")?,
            beta: self.g2(&vk.vk_beta_2, "vk_beta_2")?,
            gamma: self.g2(&vk.vk_gamma_2, "vk_gamma_2")?,
            delta: self.g2(&vk.vk_delta_2, "vk_delta_2")?,
            ic,
            alpha_beta: self.fp12(&vk.vk_alphabeta_12, "vk_alphabeta_12")?,
            w27: fixed_w27(),
        })
    }

    /// Validate, then convert the proof and the verification key
    #[instrument(skip_all, fields(public_inputs = public_inputs.len(), ic_points = vk.ic.len()))]
    pub fn convert(
        &self,
        proof: &NativeProof,
        vk: &NativeVerificationKey,
        public_inputs: &[String],
    ) -> Result<ConversionOutput, ConvertError> {
        self.validate(vk, public_inputs)?;
        debug!("Structural validation passed");

        let proof = self.convert_proof(proof, public_inputs)?;
        debug!(
            neg_a_x = %proof.neg_a.x.preview(20),
            neg_a_y = %proof.neg_a.y.preview(20),
            "Negated pi_a"
        );

        let verification_key = self.convert_verification_key(vk)?;
        debug!("w27 set to fixed default value");

        info!(
            public_inputs = proof.public_inputs.len(),
            ic_points = verification_key.ic.len(),
            "Converted proof and verification key"
        );

        Ok(ConversionOutput {
            proof,
            verification_key,
        })
    }

    fn field(
        &self,
        raw: &str,
        location: impl FnOnce() -> String,
    ) -> Result<FieldElement, ConvertError> {
        FieldElement::parse(raw, self.config.enforce_field_range).map_err(|source| {
            ConvertError::MalformedFieldElement {
                location: location(),
                source,
            }
        })
    }

    /// `[x, y, ...]` → `{x, y}`; trailing projective coordinates are ignored
    fn g1(&self, coords: &[String], name: &str) -> Result<G1Point, ConvertError> {
        require_components(name, coords.len(), 2)?;
        Ok(G1Point {
            x: self.field(&coords[0], || format!("{name}[0]"))?,
            y: self.field(&coords[1], || format!("{name}[1]"))?,
        })
    }

    /// `[[x_c0, x_c1], [y_c0, y_c1], ...]` → `{x_c0, x_c1, y_c0, y_c1}`
    fn g2(&self, rows: &[Vec<String>], name: &str) -> Result<G2Point, ConvertError> {
        require_components(name, rows.len(), 2)?;
        require_components(&format!("{name}[0]"), rows[0].len(), 2)?;
        require_components(&format!("{name}[1]"), rows[1].len(), 2)?;
        Ok(G2Point {
            x_c0: self.field(&rows[0][0], || format!("{name}[0][0]"))?,
            x_c1: self.field(&rows[0][1], || format!("{name}[0][1]"))?,
            y_c0: self.field(&rows[1][0], || format!("{name}[1][0]"))?,
            y_c1: self.field(&rows[1][1], || format!("{name}[1][1]"))?,
        })
    }

    /// `[[g0, g1, g2], [h0, h1, h2]]` → `{g{i}{j}, h{i}{j}}` with `g_i[j] → g{i}{j}`
    fn fp12(&self, halves: &[Vec<Vec<String>>], name: &str) -> Result<Fp12Element, ConvertError> {
        require_exact(name, halves.len(), 2)?;
        for (half, pairs) in halves.iter().enumerate() {
            require_exact(&format!("{name}[{half}]"), pairs.len(), 3)?;
            for (i, pair) in pairs.iter().enumerate() {
                require_exact(&format!("{name}[{half}][{i}]"), pair.len(), 2)?;
            }
        }

        let at = |half: usize, i: usize, j: usize| {
            self.field(&halves[half][i][j], || format!("{name}[{half}][{i}][{j}]"))
        };

        Ok(Fp12Element {
            g00: at(0, 0, 0)?,
            g01: at(0, 0, 1)?,
            g10: at(0, 1, 0)?,
            g11: at(0, 1, 1)?,
            g20: at(0, 2, 0)?,
            g21: at(0, 2, 1)?,
            h00: at(1, 0, 0)?,
            h01: at(1, 0, 1)?,
            h10: at(1, 1, 0)?,
            h11: at(1, 1, 1)?,
            h20: at(1, 2, 0)?,
            h21: at(1, 2, 1)?,
        })
    }
}

fn require_components(location: &str, actual: usize, expected: usize) -> Result<(), ConvertError> {
    if actual < expected {
        return Err(ConvertError::MalformedPoint {
            location: location.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn require_exact(location: &str, actual: usize, expected: usize) -> Result<(), ConvertError> {
    if actual != expected {
        return Err(ConvertError::MalformedPoint {
            location: location.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
