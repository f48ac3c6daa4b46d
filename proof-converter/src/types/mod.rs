//! Type definitions for the Proof Converter
//!
//! This module contains the native (snarkjs) input types, the flattened
//! (o1js-blobstream) output types, API request/response types, and error codes.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::services::field::FieldElement;

// ==================== Native Types ====================

/// Groth16 proof as emitted by snarkjs / icicle-snark (`proof.json`)
///
/// `pi_a` and `pi_c` carry a trailing projective `"1"`, `pi_b` a trailing
/// `["1", "0"]` row. Both are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
}

/// Groth16 verification key as emitted by snarkjs (`verification_key.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeVerificationKey {
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: Vec<String>,
    pub vk_beta_2: Vec<Vec<String>>,
    pub vk_gamma_2: Vec<Vec<String>>,
    pub vk_delta_2: Vec<Vec<String>>,
    pub vk_alphabeta_12: Vec<Vec<Vec<String>>>,
    #[serde(rename = "IC")]
    pub ic: Vec<Vec<String>>,
}

// ==================== Flattened Types ====================

/// G1 point in flattened form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct G1Point {
    pub x: FieldElement,
    pub y: FieldElement,
}

/// G2 point in flattened form, each coordinate split into its Fp2 components
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct G2Point {
    pub x_c0: FieldElement,
    pub x_c1: FieldElement,
    pub y_c0: FieldElement,
    pub y_c1: FieldElement,
}

/// Fp12 element as two Fp6 halves `g` and `h`, each three Fp2 pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fp12Element {
    pub g00: FieldElement,
    pub g01: FieldElement,
    pub g10: FieldElement,
    pub g11: FieldElement,
    pub g20: FieldElement,
    pub g21: FieldElement,
    pub h00: FieldElement,
    pub h01: FieldElement,
    pub h10: FieldElement,
    pub h11: FieldElement,
    pub h20: FieldElement,
    pub h21: FieldElement,
}

/// Flattened proof: `{negA, B, C, pi1, ..., piN}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedProof {
    pub neg_a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
    /// Public inputs in order; serialized 1-based as `pi1..piN`
    pub public_inputs: Vec<FieldElement>,
}

impl FlattenedProof {
    /// `(pi{i+1}, value)` for every public input
    pub fn public_input_fields(&self) -> impl Iterator<Item = (String, &FieldElement)> + '_ {
        self.public_inputs
            .iter()
            .enumerate()
            .map(|(i, value)| (format!("pi{}", i + 1), value))
    }
}

impl Serialize for FlattenedProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3 + self.public_inputs.len()))?;
        map.serialize_entry("negA", &self.neg_a)?;
        map.serialize_entry("B", &self.b)?;
        map.serialize_entry("C", &self.c)?;
        for (name, value) in self.public_input_fields() {
            map.serialize_entry(&name, value)?;
        }
        map.end()
    }
}

/// Flattened verification key: `{alpha, beta, gamma, delta, ic0..icM, alpha_beta, w27}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedVerificationKey {
    pub alpha: G1Point,
    pub beta: G2Point,
    pub gamma: G2Point,
    pub delta: G2Point,
    /// Input commitment points; serialized 0-based as `ic0..icM`
    pub ic: Vec<G1Point>,
    pub alpha_beta: Fp12Element,
    pub w27: Fp12Element,
}

impl FlattenedVerificationKey {
    /// `(ic{i}, point)` for every IC point
    pub fn ic_fields(&self) -> impl Iterator<Item = (String, &G1Point)> + '_ {
        self.ic
            .iter()
            .enumerate()
            .map(|(i, point)| (format!("ic{i}"), point))
    }
}

impl Serialize for FlattenedVerificationKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(6 + self.ic.len()))?;
        map.serialize_entry("alpha", &self.alpha)?;
        map.serialize_entry("beta", &self.beta)?;
        map.serialize_entry("gamma", &self.gamma)?;
        map.serialize_entry("delta", &self.delta)?;
        for (name, point) in self.ic_fields() {
            map.serialize_entry(&name, point)?;
        }
        map.serialize_entry("alpha_beta", &self.alpha_beta)?;
        map.serialize_entry("w27", &self.w27)?;
        map.end()
    }
}

/// Error codes returned by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// nPublic, public input count and IC count disagree
    StructuralMismatch,
    /// A coordinate is not a valid decimal field element
    MalformedFieldElement,
    /// A point has the wrong number of coordinates
    MalformedPoint,
    /// Request could not be interpreted
    InvalidInput,
    /// Internal server error
    InternalError,
}

// ==================== Request Types ====================

/// Native proof, public inputs and verification key in one body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub proof: NativeProof,
    pub public_inputs: Vec<String>,
    pub verification_key: NativeVerificationKey,
}

// ==================== Response Types ====================

/// Response from conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub proof: FlattenedProof,
    pub verification_key: FlattenedVerificationKey,
    /// SHA-256 of the pretty-printed proof artifact (hex)
    pub proof_digest: String,
    /// SHA-256 of the pretty-printed verification key artifact (hex)
    pub verification_key_digest: String,
}

/// Response from validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub public_inputs: usize,
    pub ic_points: usize,
    pub code: Option<ErrorCode>,
    pub error: Option<String>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional additional details
    pub details: Option<serde_json::Value>,
}

/// Server health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server status with more details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    /// Whether coordinates must be below the BN254 modulus
    pub enforce_field_range: bool,
    pub total_conversions: u64,
    pub successful_conversions: u64,
    pub failed_conversions: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub uptime_secs: u64,
}
