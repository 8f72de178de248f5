use clap::Parser;
use std::fs;
use std::path::PathBuf;

use rkyv::ser::{serializers::AllocSerializer, Serializer};
use sema_protocol::Atlas;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compiles a JSON ontology + morpheme lexicon definition to an rkyv atlas binary"
)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("📖 Reading JSON from {:?}...", cli.input);
    let input_data = fs::read_to_string(&cli.input)?;

    let atlas: Atlas = serde_json::from_str(&input_data)?;

    println!(
        "⚙️  Compiling atlas version {} with {} ontology classes and {} morphemes...",
        atlas.version,
        atlas.ontology.classes.len(),
        atlas.lexicon.morphemes.len()
    );

    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(&atlas)
        .map_err(|e| anyhow::anyhow!("rkyv serialization failed: {e}"))?;
    let bytes = serializer.into_serializer().into_inner();

    fs::write(&cli.output, bytes)?;

    println!("✅ Success! Binary written to {:?}", cli.output);
    Ok(())
}
