use crate::model::Item;
use std::io::{self, Write};

/// Destination for flushed items.
///
/// Writes are synchronous: a slow sink holds up the buffering stage, which in
/// turn holds up the fetcher through the item channel.
pub trait ItemSink: Send + 'static {
    fn write_item(&mut self, item: &Item) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one item name per line.
pub struct LineSink<W> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> ItemSink for LineSink<W> {
    fn write_item(&mut self, item: &Item) -> io::Result<()> {
        writeln!(self.writer, "{}", item.name)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
