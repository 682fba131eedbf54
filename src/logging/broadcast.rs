//! Fan-out of formatted log lines to live web subscribers

use super::state::LOG_BROADCAST_TX;
use std::io::{self, Write};
use tokio::sync::broadcast;
use tracing_subscriber::fmt::writer::MakeWriter;

/// Lines kept for slow subscribers before they start lagging
const LOG_CHANNEL_CAPACITY: usize = 1024;

/// Hands the fmt layer one [`LineSplitter`] per event
#[derive(Clone)]
pub(super) struct LogLineSink {
    tx: broadcast::Sender<String>,
}

impl LogLineSink {
    pub(super) fn new() -> Self {
        Self { tx: log_line_sender() }
    }
}

impl<'a> MakeWriter<'a> for LogLineSink {
    type Writer = LineSplitter;
    fn make_writer(&'a self) -> Self::Writer {
        LineSplitter::new(self.tx.clone())
    }
}

/// Publishes every newline-terminated line as soon as it is complete.
///
/// A trailing fragment without a newline goes out when the writer drops.
pub(super) struct LineSplitter {
    tx: broadcast::Sender<String>,
    pending: Vec<u8>,
}

impl LineSplitter {
    fn new(tx: broadcast::Sender<String>) -> Self {
        Self {
            tx,
            pending: Vec::new(),
        }
    }

    fn publish(&self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end_matches('\r');
        if line.trim().is_empty() {
            return;
        }
        // Nobody listening is not an error
        let _ = self.tx.send(line.to_string());
    }
}

impl Write for LineSplitter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.publish(&line[..line.len() - 1]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineSplitter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.publish(&rest);
        }
    }
}

fn log_line_sender() -> broadcast::Sender<String> {
    LOG_BROADCAST_TX
        .get_or_init(|| broadcast::channel::<String>(LOG_CHANNEL_CAPACITY).0)
        .clone()
}

/// Live feed of formatted log lines, starting from the next line written
pub fn subscribe_log_lines() -> broadcast::Receiver<String> {
    log_line_sender().subscribe()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn splits_multi_line_writes() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut w = LineSplitter::new(tx);
        w.write_all(b"first\r\nsecond\n\nthi").unwrap();
        assert_eq!(drain(&mut rx), vec!["first", "second"]);
        w.write_all(b"rd").unwrap();
        drop(w);
        assert_eq!(drain(&mut rx), vec!["third"]);
    }

    #[test]
    fn empty_writer_publishes_nothing() {
        let (tx, mut rx) = broadcast::channel(4);
        drop(LineSplitter::new(tx));
        assert!(drain(&mut rx).is_empty());
    }
}
