//! Independent replay check of a claimed solution.
//!
//! Only the [`Engine`] contract is used, so the check is the same whatever
//! engine produced the moves and however it found them.

use tracing::debug;

use crate::engine::Engine;
use crate::error::SolveError;
use crate::puzzle::Solution;
use crate::report::DiagnosticSink;

pub const LABEL_STEP: &str = "step";
pub const LABEL_REPLAYED: &str = "replayed";

/// Reset `engine` to its original cube, replay `solution` and require the
/// result to be solved. With `trace` set, every step is emitted.
pub fn verify(
    engine: &mut dyn Engine,
    solution: &Solution,
    mut trace: Option<&mut dyn DiagnosticSink>,
) -> Result<(), SolveError> {
    engine.re_init();
    let total = solution.len();

    for (i, mv) in solution.moves().iter().enumerate() {
        if let Some(sink) = trace.as_deref_mut() {
            let text = format!("Phase     : {}\nMove {}/{}: {}", engine.phase(), i + 1, total, mv);
            sink.emit(LABEL_STEP, &text);
        }

        engine.rotate(mv)?;

        if let Some(sink) = trace.as_deref_mut() {
            sink.emit(LABEL_STEP, &engine.render_state());
        }
    }

    if let Some(sink) = trace.as_deref_mut() {
        sink.emit(LABEL_REPLAYED, &engine.render_state());
    }

    if !engine.solved() {
        return Err(SolveError::Correctness {
            encoding: engine.canonical_encoding(true),
        });
    }
    debug!(moves = total, "replay verified");
    Ok(())
}
