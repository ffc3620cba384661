//! Accumulation of a streamed chat completion into one text.

use super::dto::ChatCompletionChunk;
use cascade_core::Completion;
use cascade_error::ProviderErrorKind;
use tracing::trace;

/// Collects server-sent `data:` events until the `[DONE]` terminator.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence or a line.
///
/// # Example
///
/// ```
/// use cascade_models::SseAccumulator;
///
/// let mut acc = SseAccumulator::default();
/// acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n").unwrap();
/// acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: {\"choices\":[],\"usage\":{\"total_tokens\":9}}\n\ndata: [DONE]\n\n").unwrap();
///
/// assert!(acc.is_done());
/// let completion = acc.finish();
/// assert_eq!(completion.content, "Hello");
/// assert_eq!(completion.total_tokens, 9);
/// ```
#[derive(Debug, Default)]
pub struct SseAccumulator {
    pending: Vec<u8>,
    content: String,
    total_tokens: Option<u64>,
    done: bool,
}

impl SseAccumulator {
    /// Feed the next bytes of the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderErrorKind::ResponseParsing`] for a `data:` event that is not a
    /// valid chunk or a line that is not UTF-8.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ProviderErrorKind> {
        if self.done {
            return Ok(());
        }
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = std::str::from_utf8(&line)
                .map_err(|e| ProviderErrorKind::ResponseParsing(format!("Invalid UTF-8: {}", e)))?;
            self.handle_line(line.trim_end_matches(['\r', '\n']))?;
            if self.done {
                self.pending.clear();
                break;
            }
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<(), ProviderErrorKind> {
        // Comments, event names and ids carry nothing a completion needs
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.done = true;
            return Ok(());
        }
        if data.is_empty() {
            return Ok(());
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(data).map_err(|e| {
            ProviderErrorKind::ResponseParsing(format!("Failed to parse chunk: {}", e))
        })?;
        trace!(choices = chunk.choices.len(), "Received stream chunk");

        if let Some(text) = chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
        {
            self.content.push_str(&text);
        }
        if let Some(usage) = chunk.usage {
            self.total_tokens = Some(usage.total_tokens);
        }
        Ok(())
    }

    /// Whether the `[DONE]` terminator has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The accumulated completion; tokens are 0 when no chunk reported usage.
    ///
    /// A trailing event without a final newline is processed first.
    pub fn finish(mut self) -> Completion {
        if !self.done && !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            if let Ok(line) = std::str::from_utf8(&rest) {
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                // A truncated final event is dropped; the text before it stands
                let _ = self.handle_line(&line);
            }
        }
        Completion {
            content: self.content,
            total_tokens: self.total_tokens.unwrap_or(0),
        }
    }
}
