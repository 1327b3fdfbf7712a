//! `tracing` output to the browser console

use std::io;
use std::sync::Once;

use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Buffers one formatted event and logs it when dropped
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
    }
}

#[derive(Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { buffer: Vec::new() }
    }
}

static INIT: Once = Once::new();

/// Install the panic hook and a console subscriber
///
/// Only the first call has any effect. A subscriber installed earlier by the
/// embedding crate is left in place.
pub fn init_logging(max_level: tracing::Level) {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();

        let installed = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter)
            .with_max_level(max_level)
            .with_ansi(false)
            .without_time()
            .try_init();
        if installed.is_err() {
            tracing::debug!("Global subscriber already set, keeping it");
        }
    });
}
