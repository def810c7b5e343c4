//! Wraps the external TOON encoder/decoder as a subprocess, the way
//! [`Subprocess`]-style adapters elsewhere in the corpus wrap a
//! command-line tool behind an async trait: spawn, feed stdin, collect
//! stdout, map a non-zero exit to a typed error.

use crate::error::CodecError;
use corpus_core::TargetNode;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Encodes/decodes between a [`TargetNode`] tree and its compact TOON
/// text form via an external command, caching encodes by the payload's
/// canonical-JSON SHA-256 hash.
pub struct ToonCodec {
    command: Vec<String>,
    timeout: Duration,
    encode_cache: Mutex<HashMap<String, String>>,
}

impl ToonCodec {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        ToonCodec {
            command,
            timeout,
            encode_cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn encode(&self, payload: &TargetNode) -> Result<String, CodecError> {
        let canonical = serde_json::to_vec(payload).map_err(CodecError::Serialize)?;
        let hash = hex::encode(Sha256::digest(&canonical));

        if let Some(cached) = self.encode_cache.lock().await.get(&hash) {
            return Ok(cached.clone());
        }

        let text = self.run_subprocess("encode", &canonical).await?;
        self.encode_cache.lock().await.insert(hash, text.clone());
        Ok(text)
    }

    pub async fn decode(&self, text: &str) -> Result<TargetNode, CodecError> {
        let out = self.run_subprocess("decode", text.as_bytes()).await?;
        serde_json::from_str(&out).map_err(CodecError::Deserialize)
    }

    /// Encodes `payload`, immediately decodes the result, and fails with
    /// [`CodecError::RoundTripMismatch`] unless the decoded tree is
    /// structurally identical to the source. The generator calls this
    /// instead of `encode` directly so a codec bug never silently
    /// produces a target that doesn't match what was validated.
    pub async fn encode_with_round_trip_check(
        &self,
        payload: &TargetNode,
    ) -> Result<String, CodecError> {
        let text = self.encode(payload).await?;
        let decoded = self.decode(&text).await?;
        if &decoded != payload {
            return Err(CodecError::RoundTripMismatch);
        }
        Ok(text)
    }

    async fn run_subprocess(&self, subcommand: &str, stdin_payload: &[u8]) -> Result<String, CodecError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(CodecError::Spawn {
                command: self.command.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty codec command"),
            });
        };

        let mut child = Command::new(program)
            .args(args)
            .arg(subcommand)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CodecError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().expect("piped stdin");
        let payload = stdin_payload.to_vec();
        let write_and_close = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        };

        let run = async {
            write_and_close.await.map_err(|source| CodecError::Spawn {
                command: self.command.clone(),
                source,
            })?;
            child.wait_with_output().await.map_err(|source| CodecError::Spawn {
                command: self.command.clone(),
                source,
            })
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| CodecError::Timeout {
                command: self.command.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        if !output.status.success() {
            return Err(CodecError::NonZeroExit {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout)
            .map(|s| s.trim_end().to_string())
            .map_err(|_| CodecError::NonUtf8 {
                command: self.command.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::TargetValue;
    use std::collections::BTreeMap;

    fn sample_payload() -> TargetNode {
        let mut obj = BTreeMap::new();
        obj.insert(
            "nom".to_string(),
            TargetNode::Leaf(TargetValue::String("Dupont".to_string())),
        );
        TargetNode::Object(obj)
    }

    #[tokio::test]
    async fn encode_uses_cache_on_identical_payload() {
        // `cat`-as-codec echoes stdin back, which is enough to exercise
        // the cache without depending on a real TOON binary being on PATH.
        let codec = ToonCodec::new(
            vec!["sh".to_string(), "-c".to_string(), "cat".to_string()],
            Duration::from_secs(2),
        );
        let payload = sample_payload();
        let first = codec.encode(&payload).await.unwrap();
        let second = codec.encode(&payload).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(codec.encode_cache.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn nonexistent_command_surfaces_as_spawn_error() {
        let codec = ToonCodec::new(
            vec!["this-binary-does-not-exist-xyz".to_string()],
            Duration::from_secs(1),
        );
        let err = codec.encode(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, CodecError::Spawn { .. }));
    }

    #[tokio::test]
    async fn failing_codec_script_surfaces_as_non_zero_exit() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("failing-codec.sh");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "#!/bin/sh\necho 'bad input' >&2\nexit 1").unwrap();
        drop(file);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let codec = ToonCodec::new(
            vec![script.to_string_lossy().into_owned()],
            Duration::from_secs(2),
        );
        let err = codec.encode(&sample_payload()).await.unwrap_err();
        assert!(matches!(err, CodecError::NonZeroExit { .. }));
    }
}
