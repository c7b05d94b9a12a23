// Connect to a function generator and report its IVI inherent attributes
//
// Usage: cargo run --example identify -- TCPIP0::192.168.1.20::5025::SOCKET --model agilent33220 --reset

use clap::{Parser, ValueEnum};
use ivi_rs::models::{Agilent33220, Keysight33500, SrsDs345};
use ivi_rs::{CapabilityGroup, Fgen, FgenModel, Instrument};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    Agilent33220,
    SrsDs345,
    Keysight33500,
}

#[derive(Debug, Parser)]
#[command(about = "Identify an IVI function generator")]
struct Args {
    /// VISA resource string, e.g. ASRL/dev/ttyUSB0::INSTR
    resource: String,

    #[arg(long, value_enum, default_value = "agilent33220")]
    model: Model,

    /// Reset the instrument after connecting
    #[arg(long)]
    reset: bool,

    /// Capability group the instrument must support, e.g. IviFgenBurst
    #[arg(long)]
    require: Vec<CapabilityGroup>,
}

fn report<M: FgenModel>(
    inst: Arc<dyn Instrument>,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let fgen = match Fgen::<M, _>::new(inst, args.reset) {
        Ok(fgen) => fgen,
        Err((fgen, e)) => {
            println!("Warning: reset failed ({e}); instrument state is unknown");
            fgen
        }
    };

    println!("Driver: {}", fgen.description());
    let spec = fgen.class_spec();
    println!(
        "Class specification: IVI-{}.{} revision {}",
        spec.major_version(),
        spec.minor_version(),
        spec.revision()
    );
    println!("Group capabilities: {}", spec.group_capabilities());
    println!("Supported models: {}", spec.supported_models().join(", "));
    println!("Outputs: {}", fgen.output_count());

    let id = fgen.identify()?;
    println!("\nInstrument: {id}");
    if !spec.is_supported_model(&id.model) {
        println!("Warning: model {} is not listed as supported by this driver", id.model);
    }

    for group in &args.require {
        let status = if fgen.supports(*group) { "yes" } else { "NO" };
        println!("Supports {group}: {status}");
    }

    let self_test = fgen.self_test()?;
    println!("Self test: {}", self_test.message);

    for error in fgen.inherent().drain_errors()? {
        println!("Instrument error {error}");
    }

    fgen.instrument().close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let inst = ivi_rs::resource::open(&args.resource)?;

    match args.model {
        Model::Agilent33220 => report::<Agilent33220>(inst, &args),
        Model::SrsDs345 => report::<SrsDs345>(inst, &args),
        Model::Keysight33500 => report::<Keysight33500>(inst, &args),
    }
}
