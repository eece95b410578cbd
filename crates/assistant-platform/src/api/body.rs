//! Streamed response bodies.
//!
//! Reads a `fetch` body chunk by chunk through the browser's
//! `ReadableStreamDefaultReader` so fragments reach the UI while the
//! reply is still being generated.

use futures::stream;
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStream, ReadableStreamDefaultReader};

use assistant_core::ports::ByteStream;
use assistant_types::{AssistantError, Result};

/// Chunks of `body` as they arrive. Ends when the reader reports `done`;
/// a read failure is yielded once and ends the stream.
pub fn byte_stream(body: ReadableStream) -> Result<ByteStream> {
    let reader: ReadableStreamDefaultReader = body
        .get_reader()
        .dyn_into()
        .map_err(|e| AssistantError::JsInterop(format!("{:?}", e)))?;

    Ok(Box::pin(stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        match read_chunk(&reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })))
}

async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| AssistantError::Network(format!("{:?}", e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| AssistantError::JsInterop(format!("{:?}", e)))?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| AssistantError::JsInterop(format!("{:?}", e)))?;
    if value.is_undefined() {
        return Ok(Some(Vec::new()));
    }
    Ok(Some(Uint8Array::new(&value).to_vec()))
}
