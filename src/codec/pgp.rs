//! OpenPGP codec
//!
//! Decrypting writes the armored chunk body to a temporary file and hands
//! its path to a [`PgpBackend`]. The file is a [`tempfile::NamedTempFile`],
//! so it is removed on every exit path, including backend errors and panics.
//! Encrypting requires a `receiver` option and is checked before the
//! backend is ever invoked.
//!
//! Recognized `decoding.ops` keys:
//! - `receiver`: key id(s) to encrypt to (string or list of strings)
//! - `signer`: key id to sign with while encrypting
//! - `passphrase`: passphrase for the secret key when decrypting
//! - `homedir`: keyring directory

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::{Codec, DecodeRequest, PGP};
use crate::error::CodecFailure;
use crate::namespace::Value;
use crate::options::DecodingOptions;

/// Environment variable overriding the `gpg` executable
pub const GPG_PROGRAM_ENV: &str = "EMX_DATACHUNK_GPG";

const OPT_RECEIVER: &str = "receiver";
const OPT_SIGNER: &str = "signer";
const OPT_PASSPHRASE: &str = "passphrase";
const OPT_HOMEDIR: &str = "homedir";

/// The encryption primitive the codec delegates to
pub trait PgpBackend: Send + Sync {
    /// Decrypt the armored message stored at `ciphertext`
    fn decrypt(&self, ciphertext: &Path, as_text: bool, options: &DecodingOptions) -> Result<Value, CodecFailure>;

    /// Encrypt `data` to every key in `receivers`, returning armored text
    fn encrypt(&self, data: &[u8], receivers: &[&str], options: &DecodingOptions) -> Result<String, CodecFailure>;
}

/// [`PgpBackend`] that runs the GnuPG command line tool
#[derive(Debug, Clone)]
pub struct GpgCli {
    program: PathBuf,
}

impl GpgCli {
    /// Use `$EMX_DATACHUNK_GPG` if set, `gpg` otherwise
    pub fn new() -> Self {
        let program = std::env::var_os(GPG_PROGRAM_ENV).unwrap_or_else(|| OsString::from("gpg"));
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments shared by every invocation
    fn base_args(&self, options: &DecodingOptions) -> Result<Vec<OsString>, CodecFailure> {
        let mut args: Vec<OsString> = ["--batch", "--yes", "--quiet"].map(OsString::from).into();
        if let Some(homedir) = scalar_option(options, OPT_HOMEDIR)? {
            args.push("--homedir".into());
            args.push(homedir.into());
        }
        Ok(args)
    }

    /// Arguments and stdin for decrypting the message at `ciphertext`
    fn decrypt_invocation(
        &self,
        ciphertext: &Path,
        options: &DecodingOptions,
    ) -> Result<(Vec<OsString>, Option<Vec<u8>>), CodecFailure> {
        let mut args = self.base_args(options)?;
        let passphrase = scalar_option(options, OPT_PASSPHRASE)?;
        if passphrase.is_some() {
            args.extend(["--pinentry-mode", "loopback", "--passphrase-fd", "0"].map(OsString::from));
        }
        args.push("--decrypt".into());
        args.push(ciphertext.as_os_str().to_os_string());
        Ok((args, passphrase.map(|p| format!("{}\n", p).into_bytes())))
    }

    /// Arguments for encrypting stdin to `receivers`
    fn encrypt_args(&self, receivers: &[&str], options: &DecodingOptions) -> Result<Vec<OsString>, CodecFailure> {
        let mut args = self.base_args(options)?;
        args.extend(["--armor", "--encrypt"].map(OsString::from));
        for receiver in receivers {
            args.push("--recipient".into());
            args.push(OsString::from(*receiver));
        }
        if let Some(signer) = scalar_option(options, OPT_SIGNER)? {
            args.extend(["--sign", "--local-user"].map(OsString::from));
            args.push(signer.into());
        }
        Ok(args)
    }

    /// Run the program with `args`, feeding `input` on stdin, and return stdout
    fn run(&self, args: Vec<OsString>, input: Option<Vec<u8>>) -> Result<Vec<u8>, CodecFailure> {
        let program = self.program.display().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| CodecFailure::Spawn {
            program: program.clone(),
            source,
        })?;

        // Feed stdin from a separate thread so a large payload cannot
        // deadlock against a full stdout pipe.
        let writer = match (input, child.stdin.take()) {
            (Some(data), Some(mut stdin)) => Some(std::thread::spawn(move || stdin.write_all(&data))),
            _ => None,
        };

        let output = child.wait_with_output().map_err(|source| CodecFailure::Spawn {
            program: program.clone(),
            source,
        })?;
        if let Some(writer) = writer {
            if let Ok(Err(err)) = writer.join() {
                debug!(error = %err, "gpg closed stdin early");
            }
        }

        if !output.status.success() {
            return Err(CodecFailure::Backend {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for GpgCli {
    fn default() -> Self {
        Self::new()
    }
}

impl PgpBackend for GpgCli {
    fn decrypt(&self, ciphertext: &Path, as_text: bool, options: &DecodingOptions) -> Result<Value, CodecFailure> {
        let (args, input) = self.decrypt_invocation(ciphertext, options)?;
        let plaintext = self.run(args, input)?;
        Value::from_bytes(plaintext, as_text)
    }

    fn encrypt(&self, data: &[u8], receivers: &[&str], options: &DecodingOptions) -> Result<String, CodecFailure> {
        let args = self.encrypt_args(receivers, options)?;
        let armored = self.run(args, Some(data.to_vec()))?;
        let armored = String::from_utf8(armored)?;
        Ok(armored.trim_end().to_string())
    }
}

/// Fetch a scalar option as a string
///
/// Integers and booleans are rendered, so `passphrase = 1234` still reaches
/// the backend. Lists and mappings are rejected.
fn scalar_option(options: &DecodingOptions, key: &str) -> Result<Option<String>, CodecFailure> {
    match options.get(key) {
        None => Ok(None),
        Some(value) => value.to_scalar_string().map(Some).ok_or_else(|| CodecFailure::InvalidOption {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

/// Non-blank receivers from the `receiver` option
fn receivers(options: &DecodingOptions) -> Result<Vec<String>, CodecFailure> {
    let receivers = match options.get(OPT_RECEIVER) {
        None => Vec::new(),
        Some(value) => value.to_scalar_list().ok_or_else(|| CodecFailure::InvalidOption {
            key: OPT_RECEIVER.to_string(),
            expected: "a string or a list of strings",
        })?,
    };
    let receivers: Vec<String> = receivers
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();
    if receivers.is_empty() {
        return Err(CodecFailure::MissingRecipient);
    }
    Ok(receivers)
}

/// Asymmetric-encryption codec
pub struct PgpCodec {
    backend: Box<dyn PgpBackend>,
}

impl PgpCodec {
    /// Codec backed by [`GpgCli`]
    pub fn new() -> Self {
        Self::with_backend(GpgCli::new())
    }

    pub fn with_backend(backend: impl PgpBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    fn write_ciphertext(body: &[String]) -> Result<tempfile::NamedTempFile, CodecFailure> {
        let mut temp = tempfile::Builder::new()
            .prefix("emx-datachunk-")
            .suffix(".asc")
            .tempfile()
            .map_err(CodecFailure::TempFile)?;
        for line in body {
            writeln!(temp, "{}", line).map_err(CodecFailure::TempFile)?;
        }
        temp.flush().map_err(CodecFailure::TempFile)?;
        Ok(temp)
    }
}

impl Default for PgpCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for PgpCodec {
    fn name(&self) -> &str {
        PGP
    }

    fn decode(&self, request: &DecodeRequest<'_>) -> Result<Value, CodecFailure> {
        let temp = Self::write_ciphertext(request.body)?;
        let path = temp.path().to_path_buf();

        let result = self.backend.decrypt(&path, request.as_text, request.options);

        // A failed delete is only logged; the decrypt result is what gets reported.
        if let Err(err) = temp.close() {
            warn!(path = %path.display(), error = %err, "failed to remove temporary ciphertext file");
        }

        result.and_then(|value| value.into_format(request.as_text))
    }

    fn check_encode_options(&self, options: &DecodingOptions) -> Result<(), CodecFailure> {
        receivers(options).map(|_| ())
    }

    fn encode(&self, data: &[u8], options: &DecodingOptions) -> Result<String, CodecFailure> {
        let receivers = receivers(options)?;
        let receivers: Vec<&str> = receivers.iter().map(String::as_str).collect();
        self.backend.encrypt(data, &receivers, options)
    }
}
