//! Encode a binary payload, then decode it back through a data chunk

use emx_datachunk::{Decoder, DecodingOptions, Encoder, Environment, OptionValue, RawOptions, Value};

fn main() -> anyhow::Result<()> {
    println!("=== Data Chunk Example ===\n");

    // Simulated PNG header
    let payload = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    let encoded = Encoder::new().encode(&payload, "base64", &DecodingOptions::new())?;
    println!("Chunk body:");
    println!("---");
    println!("{}", encoded);
    println!("---");

    let mut options = RawOptions::new();
    options.insert("format".into(), OptionValue::from("binary"));
    options.insert("output.var".into(), OptionValue::from("png_header"));

    let body: Vec<String> = encoded.lines().map(str::to_string).collect();
    let mut env = Environment::new();
    Decoder::new().run_chunk("png", &options, &body, &mut env)?;

    match env.get("png_header") {
        Some(Value::Bytes(bytes)) => {
            println!("\nDecoded {} bytes", bytes.len());
            assert_eq!(bytes, &payload);
        }
        other => anyhow::bail!("unexpected binding: {:?}", other),
    }

    println!("\nRound-trip verification passed!");
    Ok(())
}
