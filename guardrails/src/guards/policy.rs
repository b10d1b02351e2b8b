use replygate_core::types::{Disposition, GuardResult, Verdict};

/// Reduce an ordered result set to the final disposition.
///
/// Blocks iff at least one result carries a `block` verdict; the first such
/// result in task order is reported as the blocking one. Any number of
/// `flag` or `pass` results never blocks.
pub fn decide(results: Vec<GuardResult>) -> Disposition {
    let blocking_result = results
        .iter()
        .find(|r| r.verdict == Verdict::Block)
        .cloned();
    Disposition {
        blocked: blocking_result.is_some(),
        blocking_result,
        results,
    }
}
