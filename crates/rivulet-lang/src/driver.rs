//! Pull driver: open the root, drain it, close it on every exit path.
//!
//! Cancellation is just closing the root early; close cascades depth-first
//! through the decorator chain.

use rivulet_core::context::StreamContext;
use rivulet_core::error::Result;
use rivulet_core::tuple::Tuple;

use rivulet_operators::traits::TupleStream;

/// Open `stream`, read it to end-of-stream, and close it. The stream is
/// closed on success, on a failed open, and on a mid-stream failure alike.
pub fn drive(stream: &mut dyn TupleStream, ctx: &StreamContext) -> Result<Vec<Tuple>> {
    if let Err(e) = stream.open(ctx) {
        // close is safe after a failed open
        let _ = stream.close();
        return Err(e);
    }
    tracing::trace!(root = stream.name(), "opened pipeline");

    let mut records = Vec::new();
    loop {
        match stream.read() {
            Ok(Some(t)) => records.push(t),
            Ok(None) => break,
            Err(e) => {
                let _ = stream.close();
                return Err(e);
            }
        }
    }

    stream.close()?;
    tracing::trace!(root = stream.name(), records = records.len(), "drained pipeline");
    Ok(records)
}
