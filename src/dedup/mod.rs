use crate::source::record::LogRecord;

/// Length of the aligned run that marks two messages as the same error.
pub const DEFAULT_DUPLICATE_THRESHOLD: usize = 10;

/// Decide whether two messages are near-duplicates.
///
/// Both strings are lowercased and compared character by character at the
/// same index, up to the shorter length. Reaching `threshold` equal characters
/// in a row returns early; otherwise the longest run must exceed `threshold`.
/// A missing message on either side never matches.
pub fn is_duplicate(a: Option<&str>, b: Option<&str>, threshold: usize) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };

    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let mut best = 0;
    let mut run = 0;
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            run += 1;
            if run >= threshold {
                return true;
            }
        } else {
            best = best.max(run);
            run = 0;
        }
    }

    best.max(run) > threshold
}

/// Drop records whose message is a near-duplicate of an earlier record.
///
/// Only the similarity scan drops records, so exact repeats with short
/// messages all survive. Every earlier record acts as a comparator for later
/// ones, even if it was itself dropped. Survivors keep their input order.
pub fn remove_near_duplicates(records: Vec<LogRecord>, threshold: usize) -> Vec<LogRecord> {
    if records.len() < 2 {
        return records;
    }

    let mut keep = vec![true; records.len()];

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            if keep[j] && is_duplicate(records[i].message(), records[j].message(), threshold) {
                keep[j] = false;
            }
        }
    }

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        tracing::debug!(
            application = %records[0].application(),
            removed,
            "Removed near-duplicate records"
        );
    }

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
