use std::io::{self, Write};

use super::TriplesEmitter;
use oxigraph::model::TripleRef;

/// N-Triples format emitter. Streams triples as `<s> <p> <o> .` lines.
pub struct NTriplesEmitter<W: Write> {
    writer: W,
    count: u64,
}

impl<W: Write> NTriplesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write> TriplesEmitter for NTriplesEmitter<W> {
    fn emit(&mut self, triple: TripleRef<'_>) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} {} {} .",
            triple.subject, triple.predicate, triple.object
        )?;
        self.count += 1;
        Ok(())
    }

    fn add_prefix(&mut self, prefix: &str, iri: &str) -> io::Result<()> {
        // N-Triples doesn't use prefixes, but emit as comment for readability
        writeln!(self.writer, "# @prefix {prefix}: <{iri}> .")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn triple_count(&self) -> u64 {
        self.count
    }
}
