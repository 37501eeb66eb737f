//! emx-datachunk CLI
//!
//! Encode files into chunk text, and decode a single data chunk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emx_datachunk::options::{
    KEY_CHECKSUM, KEY_DECODING_OPS, KEY_ENCODING, KEY_EXTERNAL_FILE, KEY_FORMAT, KEY_LINE_SEP, KEY_OUTPUT_FILE,
    KEY_OUTPUT_VAR,
};
use emx_datachunk::{
    checksum::sha256_hex, Decoder, DecodingOptions, Encoder, EngineConfig, Environment, OptionValue, RawOptions,
    Value,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emx-datachunk")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Encode and decode document data chunks")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a file into text for a data chunk
    Encode {
        /// File to encode
        input: PathBuf,

        /// Encoding to use (base64, pgp)
        #[arg(short, long, default_value = "base64")]
        encoding: String,

        /// Write the encoded text here (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Key id(s) to encrypt to (pgp)
        #[arg(long)]
        receiver: Vec<String>,

        /// Key id to sign with (pgp)
        #[arg(long)]
        signer: Option<String>,

        /// Keyring directory (pgp)
        #[arg(long)]
        homedir: Option<PathBuf>,

        /// Print the SHA-256 of the input to stderr
        #[arg(long)]
        checksum: bool,
    },

    /// Decode one data chunk
    Decode {
        /// Chunk body file (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Chunk identifier used in messages
        #[arg(long, default_value = "chunk")]
        name: String,

        /// text or binary
        #[arg(short, long)]
        format: Option<String>,

        /// asis, base64 or pgp
        #[arg(short, long)]
        encoding: Option<String>,

        /// Write the decoded value here (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Read the chunk body from this file instead
        #[arg(long)]
        external: Option<PathBuf>,

        /// Separator for asis lines (escapes like \n and \t allowed)
        #[arg(long)]
        line_sep: Option<String>,

        /// Expected SHA-256 of the decoded value
        #[arg(long)]
        checksum: Option<String>,

        /// Codec option as key=value (repeatable)
        #[arg(long = "op", value_parser = parse_key_value)]
        ops: Vec<(String, String)>,

        /// Extra chunk option as key=value (repeatable)
        #[arg(long = "option", value_parser = parse_key_value)]
        options: Vec<(String, String)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Encode {
            input,
            encoding,
            output,
            receiver,
            signer,
            homedir,
            checksum,
        } => {
            let mut ops = DecodingOptions::new();
            if !receiver.is_empty() {
                ops.insert(
                    "receiver".to_string(),
                    OptionValue::List(receiver.into_iter().map(OptionValue::Str).collect()),
                );
            }
            if let Some(signer) = signer {
                ops.insert("signer".to_string(), OptionValue::Str(signer));
            }
            if let Some(homedir) = homedir {
                ops.insert("homedir".to_string(), OptionValue::Str(homedir.display().to_string()));
            }
            encode_file(input, &encoding, &ops, output, checksum)?;
        }
        Commands::Decode {
            input,
            name,
            format,
            encoding,
            output,
            external,
            line_sep,
            checksum,
            ops,
            options,
        } => {
            let mut raw = RawOptions::new();
            for (key, value) in options {
                raw.insert(key, OptionValue::parse_literal(&value));
            }
            if let Some(format) = format {
                raw.insert(KEY_FORMAT.to_string(), OptionValue::Str(format));
            }
            if let Some(encoding) = encoding {
                raw.insert(KEY_ENCODING.to_string(), OptionValue::Str(encoding));
            }
            if let Some(line_sep) = line_sep {
                raw.insert(KEY_LINE_SEP.to_string(), OptionValue::Str(unescape(&line_sep)));
            }
            if let Some(checksum) = checksum {
                raw.insert(KEY_CHECKSUM.to_string(), OptionValue::Str(checksum));
            }
            if !ops.is_empty() {
                let map = ops
                    .into_iter()
                    .map(|(k, v)| (k, OptionValue::parse_literal(&v)))
                    .collect();
                raw.insert(KEY_DECODING_OPS.to_string(), OptionValue::Map(map));
            }
            if let Some(external) = &external {
                raw.insert(KEY_EXTERNAL_FILE.to_string(), OptionValue::Str(external.display().to_string()));
            }
            match &output {
                Some(path) => raw.insert(KEY_OUTPUT_FILE.to_string(), OptionValue::Str(path.display().to_string())),
                None => raw.insert(KEY_OUTPUT_VAR.to_string(), OptionValue::Str(name.clone())),
            };

            let body = if input.is_none() && external.is_some() {
                Vec::new()
            } else {
                read_body(input)?
            };
            decode_chunk(&name, &raw, &body, output.is_none())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn encode_file(
    input: PathBuf,
    encoding: &str,
    ops: &DecodingOptions,
    output: Option<PathBuf>,
    checksum: bool,
) -> Result<()> {
    let encoder = Encoder::new();
    encoder.check(encoding, ops)?;
    let data = fs::read(&input).with_context(|| format!("Failed to read: {}", input.display()))?;
    let encoded = encoder
        .encode_to(&data, encoding, ops, output.as_deref())
        .with_context(|| format!("Failed to encode: {}", input.display()))?;

    if checksum {
        eprintln!("checksum: {}", sha256_hex(&data));
    }

    if output.is_none() {
        println!("{}", encoded);
    }
    Ok(())
}

fn read_body(input: Option<PathBuf>) -> Result<Vec<String>> {
    let text = if let Some(input_path) = input {
        fs::read_to_string(&input_path).with_context(|| format!("Failed to read: {}", input_path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };
    Ok(text.lines().map(str::to_string).collect())
}

fn decode_chunk(name: &str, raw: &RawOptions, body: &[String], to_stdout: bool) -> Result<()> {
    let config = EngineConfig::with_base_dir(std::env::current_dir()?);
    let decoder = Decoder::with_config(config);
    let mut env = Environment::new();

    let rendered = decoder
        .run_chunk(name, raw, body, &mut env)
        .with_context(|| format!("Failed to decode chunk '{}'", name))?;
    if !rendered.is_empty() {
        eprintln!("{}", rendered);
    }

    if to_stdout {
        let mut stdout = io::stdout().lock();
        match env.get(name) {
            Some(Value::Text(text)) => writeln!(stdout, "{}", text)?,
            Some(Value::Bytes(bytes)) => stdout.write_all(bytes)?,
            None => {}
        }
        stdout.flush()?;
    }
    Ok(())
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", input))?;
    Ok((key.trim().to_string(), value.to_string()))
}

/// Expand `\n`, `\t`, `\r` and `\\` in a command-line separator
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
