use super::ChatResult;
use futures::StreamExt;

/// Splits a byte stream into lines. Bytes are buffered until a newline so a
/// multi-byte character split across network chunks is decoded intact.
#[derive(Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream ends without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Server-sent-event decoder yielding the `data` payload of each event.
/// Consecutive `data:` lines are joined with newlines; a blank line ends the
/// event. Other fields and comments are ignored.
#[derive(Default)]
pub struct SseDecoder {
    lines: LineBuffer,
    data: Option<String>,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut events = Vec::new();
        for line in self.lines.push(bytes) {
            self.accept_line(&line, &mut events);
        }
        events
    }

    pub fn finish(&mut self) -> Option<String> {
        let mut events = Vec::new();
        if let Some(line) = self.lines.finish() {
            self.accept_line(&line, &mut events);
        }
        if let Some(data) = self.data.take() {
            events.push(data);
        }
        events.pop()
    }

    fn accept_line(&mut self, line: &str, events: &mut Vec<String>) {
        if line.is_empty() {
            if let Some(data) = self.data.take() {
                events.push(data);
            }
            return;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            let fragment = rest.strip_prefix(' ').unwrap_or(rest);
            match &mut self.data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(fragment);
                }
                None => self.data = Some(fragment.to_string()),
            }
        }
    }
}

/// Feed every SSE event of `response` to `on_event` until the body ends or the
/// callback returns `true`.
pub async fn for_each_event<F>(response: reqwest::Response, mut on_event: F) -> ChatResult<()>
where
    F: FnMut(&str) -> bool + Send,
{
    let mut decoder = SseDecoder::default();
    let mut stream = response.bytes_stream();
    while let Some(item) = stream.next().await {
        let bytes = item?;
        for data in decoder.push(&bytes) {
            if on_event(&data) {
                return Ok(());
            }
        }
    }
    if let Some(data) = decoder.finish() {
        on_event(&data);
    }
    Ok(())
}

/// Feed every line of `response` to `on_line` until the body ends or the
/// callback returns `true`.
pub async fn for_each_line<F>(response: reqwest::Response, mut on_line: F) -> ChatResult<()>
where
    F: FnMut(&str) -> bool + Send,
{
    let mut lines = LineBuffer::default();
    let mut stream = response.bytes_stream();
    while let Some(item) = stream.next().await {
        let bytes = item?;
        for line in lines.push(&bytes) {
            if on_line(&line) {
                return Ok(());
            }
        }
    }
    if let Some(line) = lines.finish() {
        on_line(&line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_survive_split_chunks() {
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(b"hel").is_empty());
        assert_eq!(buffer.push(b"lo\r\nwor"), vec!["hello"]);
        assert_eq!(buffer.push(b"ld\n"), vec!["world"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn multibyte_char_split_across_chunks() {
        let text = "olá\n".as_bytes();
        let mut buffer = LineBuffer::default();
        assert!(buffer.push(&text[..3]).is_empty());
        assert_eq!(buffer.push(&text[3..]), vec!["olá"]);
    }

    #[test]
    fn events_end_on_blank_line() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"data: one\n\n: comment\nevent: x\ndata: two\ndata: three\n\n");
        assert_eq!(events, vec!["one", "two\nthree"]);
    }

    #[test]
    fn trailing_event_flushed_on_finish() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\":1}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("{\"a\":1}"));
    }
}
