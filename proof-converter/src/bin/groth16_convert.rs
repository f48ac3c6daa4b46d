//! groth16-convert: snarkjs → o1js-blobstream Groth16 converter
//!
//! ```bash
//! groth16-convert convert --proof proof.json --public public.json \
//!     --vk verification_key.json --out-dir converted_circuit
//! groth16-convert validate --proof proof.json --public public.json --vk verification_key.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use proof_converter::logging::init_logging;
use proof_converter::services::artifacts::artifact_paths;
use proof_converter::services::{ConverterConfig, FormatConverter, NativeInputs, RenderedArtifacts};

/// Convert snarkjs Groth16 proofs and verification keys for o1js-blobstream
#[derive(Parser)]
#[command(name = "groth16-convert")]
#[command(about = "Convert snarkjs Groth16 proof and verification key to o1js-blobstream format")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// snarkjs proof (proof.json)
    #[arg(long)]
    proof: PathBuf,

    /// Public inputs (public.json)
    #[arg(long)]
    public: PathBuf,

    /// snarkjs verification key (verification_key.json)
    #[arg(long)]
    vk: PathBuf,

    /// Accept coordinates that are not below the BN254 modulus
    #[arg(long)]
    allow_unreduced: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert and write proof.json and vk.json
    Convert {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory for proof.json and vk.json
        #[arg(long, default_value = "converted_circuit")]
        out_dir: PathBuf,

        /// Explicit proof output path (overrides --out-dir)
        #[arg(long)]
        proof_out: Option<PathBuf>,

        /// Explicit verification key output path (overrides --out-dir)
        #[arg(long)]
        vk_out: Option<PathBuf>,
    },
    /// Check the inputs without writing anything
    Validate {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Convert {
            inputs,
            out_dir,
            proof_out,
            vk_out,
        } => {
            let (native, converter) = load(&inputs)?;
            let output = converter
                .convert(&native.proof, &native.verification_key, &native.public_inputs)
                .context("Conversion failed")?;
            let rendered = RenderedArtifacts::render(&output)?;

            let (default_proof, default_vk) = artifact_paths(&out_dir);
            let proof_path = proof_out.unwrap_or(default_proof);
            let vk_path = vk_out.unwrap_or(default_vk);
            rendered.write(&proof_path, &vk_path)?;

            println!("Converted to o1js-blobstream format");
            println!("  proof:  {}", proof_path.display());
            println!("  vk:     {}", vk_path.display());
            println!(
                "  negA:   pi_a y coordinate negated, pi1-pi{} from {} public inputs",
                output.proof.public_inputs.len(),
                output.proof.public_inputs.len()
            );
            println!(
                "  IC:     ic0-ic{} from {} points",
                output.verification_key.ic.len().saturating_sub(1),
                output.verification_key.ic.len()
            );
            println!("  w27:    fixed default value");
            println!("  proof sha256: {}", rendered.proof_digest());
            println!("  vk sha256:    {}", rendered.verification_key_digest());
        }
        Commands::Validate { inputs } => {
            let (native, converter) = load(&inputs)?;
            converter
                .convert(&native.proof, &native.verification_key, &native.public_inputs)
                .context("Validation failed")?;

            println!(
                "Valid: {} public inputs, {} IC points",
                native.public_inputs.len(),
                native.verification_key.ic.len()
            );
        }
    }

    Ok(())
}

fn load(inputs: &InputArgs) -> anyhow::Result<(NativeInputs, FormatConverter)> {
    let native = NativeInputs::load(&inputs.proof, &inputs.public, &inputs.vk)?;
    let converter = FormatConverter::new(ConverterConfig {
        enforce_field_range: !inputs.allow_unreduced,
    });
    Ok((native, converter))
}
