use std::sync::Arc;

use futures_util::stream::BoxStream;

use crate::error::ProviderError;
use crate::provider::{Provider, StreamEvent};

/// Position and length of the first blank line, `\n\n` or `\r\n\r\n`.
fn find_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Pulls complete `data:` payloads out of an SSE buffer.
///
/// Events are delimited by a blank line. Consumed bytes are removed and a
/// trailing partial event stays in the buffer. Working on bytes keeps
/// multi-byte characters split across network chunks intact.
pub(crate) fn drain_data_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut data_lines = Vec::new();

    while let Some((pos, delimiter_len)) = find_event_boundary(buffer) {
        let block: Vec<u8> = buffer.drain(..pos + delimiter_len).collect();
        let block = String::from_utf8_lossy(&block[..pos]);

        for line in block.lines() {
            let line = line.trim();
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim();
                if !data.is_empty() {
                    data_lines.push(data.to_string());
                }
            }
        }
    }

    data_lines
}

/// Decodes an upstream SSE response into [`StreamEvent`]s.
///
/// The stream always ends with exactly one `Done` when the body closes
/// cleanly, even if the provider never sent its sentinel. Nothing after
/// the first `Done` is emitted. A transport error ends the stream without
/// `Done`.
pub(crate) fn event_stream(
    response: reqwest::Response,
    provider: Arc<dyn Provider>,
) -> BoxStream<'static, Result<StreamEvent, ProviderError>> {
    let stream = async_stream::stream! {
        let mut response = response;
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let data_lines = match response.chunk().await {
                Ok(Some(bytes)) => {
                    buffer.extend_from_slice(&bytes);
                    drain_data_lines(&mut buffer)
                }
                Ok(None) => {
                    buffer.extend_from_slice(b"\n\n");
                    let data_lines = drain_data_lines(&mut buffer);
                    for data in data_lines {
                        match provider.parse_stream_data(&data) {
                            Ok(Some(StreamEvent::Done)) => break,
                            Ok(Some(event)) => yield Ok(event),
                            Ok(None) => {}
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                    yield Ok(StreamEvent::Done);
                    return;
                }
                Err(e) => {
                    yield Err(ProviderError::Request(e));
                    return;
                }
            };

            for data in data_lines {
                match provider.parse_stream_data(&data) {
                    Ok(Some(StreamEvent::Done)) => {
                        yield Ok(StreamEvent::Done);
                        return;
                    }
                    Ok(Some(event)) => yield Ok(event),
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }
    };

    Box::pin(stream)
}
