//! Build, validate and serialize a minimal translation pipeline.
//!
//! Run with: `cargo run --example translate_pipeline`

use modelflow::designer::{AssetSpec, CatalogResolver, DataType, Pipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogResolver::new().with(
        AssetSpec::new("6239efa4822d7a13b8e20454", "translation")
            .with_supplier("acme")
            .with_input("text", Some(DataType::Text), true)
            .with_input("sourcelanguage", Some(DataType::Label), false)
            .with_input("targetlanguage", Some(DataType::Label), false)
            .with_output("data", Some(DataType::Text)),
    );

    let mut pipeline = Pipeline::new();
    let input = pipeline.input()?;
    let translator = pipeline.asset(&catalog, "6239efa4822d7a13b8e20454")?;
    pipeline.link_params(input, "input", translator, "text")?;
    pipeline.set_param(translator, "sourcelanguage", "en")?;
    pipeline.set_param(translator, "targetlanguage", "fr")?;
    pipeline.use_output(translator, "data")?;

    pipeline.validate()?;
    pipeline.ensure_runnable()?;

    println!("{}", serde_json::to_string_pretty(&pipeline.serialize())?);
    Ok(())
}
