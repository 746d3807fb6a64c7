//! Fan an input across two assets by data type with a router node.
//!
//! Run with: `cargo run --example routing`

use modelflow::designer::{AssetSpec, CatalogResolver, DataType, Pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogResolver::new()
        .with(
            AssetSpec::new("mt-en-fr", "translation")
                .with_input("text", Some(DataType::Text), true)
                .with_output("data", Some(DataType::Text)),
        )
        .with(
            AssetSpec::new("asr-en", "speech-recognition")
                .with_input("source_audio", Some(DataType::Audio), true)
                .with_output("data", Some(DataType::Text)),
        );

    let mut pipeline = Pipeline::new();
    let input = pipeline.input()?;
    let translator = pipeline.asset(&catalog, "mt-en-fr")?;
    let transcriber = pipeline.asset(&catalog, "asr-en")?;

    // Text goes to the translator, audio to the transcriber.
    pipeline.route(input, &[(translator, "text"), (transcriber, "source_audio")])?;
    pipeline.use_output(translator, "data")?;
    pipeline.use_output(transcriber, "data")?;

    pipeline.ensure_runnable()?;
    println!("{}", serde_json::to_string_pretty(&pipeline.serialize())?);
    Ok(())
}
