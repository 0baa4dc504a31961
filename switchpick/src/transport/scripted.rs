//! In-memory scripted console for engine tests.
//!
//! Replays queued output chunks one per read and reacts to written lines
//! with canned replies, so navigation and procedures can be driven
//! without hardware. Like a real console, a bare newline written while
//! the line is idle repaints the last prompt shown.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::Transport;
use crate::error::Result;

#[derive(Debug, Default)]
struct Script {
    /// Output chunks, one returned per read.
    pending: VecDeque<Vec<u8>>,

    /// Replies keyed by the written line. Each reply is one or more
    /// chunks; the last reply for a trigger repeats forever.
    replies: Vec<(String, VecDeque<Vec<String>>)>,

    /// Last line of the most recent output, repainted by idle probes.
    prompt: Option<String>,

    /// Every write, newline-trimmed.
    written: Vec<String>,
}

impl Script {
    fn push(&mut self, text: &str) {
        let line = text.rsplit('\n').next().unwrap_or_default();
        if !line.trim().is_empty() {
            self.prompt = Some(line.trim_start_matches('\r').to_string());
        }
        self.pending.push_back(text.as_bytes().to_vec());
    }
}

/// Scripted transport; clones share the same script.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk for a future read.
    pub(crate) fn output(self, text: &str) -> Self {
        self.lock().push(text);
        self
    }

    /// Reply with `text` whenever `trigger` is written.
    ///
    /// Registering the same trigger again appends to its reply sequence.
    pub(crate) fn on(self, trigger: &str, text: &str) -> Self {
        self.on_chunks(trigger, &[text])
    }

    /// Reply with several chunks, read on successive polls.
    pub(crate) fn on_chunks(self, trigger: &str, chunks: &[&str]) -> Self {
        let reply: Vec<String> = chunks.iter().map(|c| c.to_string()).collect();
        {
            let mut script = self.lock();
            match script.replies.iter_mut().find(|(t, _)| t == trigger) {
                Some((_, replies)) => replies.push_back(reply),
                None => script
                    .replies
                    .push((trigger.to_string(), VecDeque::from([reply]))),
            }
        }
        self
    }

    /// All writes so far, newline-trimmed.
    pub(crate) fn written(&self) -> Vec<String> {
        self.lock().written.clone()
    }

    /// How many times `line` was written.
    pub(crate) fn count(&self, line: &str) -> usize {
        self.lock().written.iter().filter(|w| *w == line).count()
    }

    /// Written lines other than bare probes.
    pub(crate) fn commands(&self) -> Vec<String> {
        self.lock()
            .written
            .iter()
            .filter(|w| !w.is_empty())
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }
}

impl Transport for ScriptedTransport {
    async fn read_available(&mut self) -> Result<Vec<u8>> {
        Ok(self.lock().pending.pop_front().unwrap_or_default())
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let line = String::from_utf8_lossy(data)
            .trim_end_matches(['\r', '\n'])
            .to_string();

        let mut script = self.lock();
        let reply = script
            .replies
            .iter_mut()
            .find(|(trigger, _)| *trigger == line)
            .and_then(|(_, replies)| {
                if replies.len() > 1 {
                    replies.pop_front()
                } else {
                    replies.front().cloned()
                }
            });

        match reply {
            Some(chunks) => {
                for chunk in &chunks {
                    script.push(chunk);
                }
            }
            None if line.is_empty() && script.pending.is_empty() => {
                if let Some(prompt) = script.prompt.clone() {
                    script.pending.push_back(format!("\r\n{}", prompt).into_bytes());
                }
            }
            None => {}
        }
        script.written.push(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_output_then_goes_quiet() {
        let mut transport = ScriptedTransport::new().output("login: ");
        assert_eq!(transport.read_available().await.unwrap(), b"login: ");
        assert!(transport.read_available().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_sequence_last_is_sticky() {
        let mut transport = ScriptedTransport::new()
            .on("exit", "first")
            .on("exit", "second");

        for expected in ["first", "second", "second"] {
            transport.write_all(b"exit\n").await.unwrap();
            assert_eq!(transport.read_available().await.unwrap(), expected.as_bytes());
        }
        assert_eq!(transport.count("exit"), 3);
    }

    #[tokio::test]
    async fn test_idle_probe_repaints_last_prompt() {
        let mut transport = ScriptedTransport::new().on("cli", "cli\r\n\r\n{master:0}\r\nroot> ");

        transport.write_all(b"\n").await.unwrap();
        assert!(transport.read_available().await.unwrap().is_empty());

        transport.write_all(b"cli\n").await.unwrap();
        // Busy line: no repaint queued behind pending output.
        transport.write_all(b"\n").await.unwrap();
        assert_eq!(
            transport.read_available().await.unwrap(),
            b"cli\r\n\r\n{master:0}\r\nroot> "
        );
        assert!(transport.read_available().await.unwrap().is_empty());

        transport.write_all(b"\n").await.unwrap();
        assert_eq!(transport.read_available().await.unwrap(), b"\r\nroot> ");
    }

    #[tokio::test]
    async fn test_multi_chunk_reply() {
        let mut transport =
            ScriptedTransport::new().on_chunks("configure", &["root# ", "closed\r\nroot% "]);

        transport.write_all(b"configure\n").await.unwrap();
        assert_eq!(transport.read_available().await.unwrap(), b"root# ");
        assert_eq!(transport.read_available().await.unwrap(), b"closed\r\nroot% ");
    }
}
