//! Folio allocation.
//!
//! Folios are `"{BRANCH} - {n}"` and ticket numbers `"TKT-{BRANCH}-{n}"`. The
//! number sequence starts at [`FIRST_FOLIO_NUMBER`] and grows by one per ticket,
//! shared across branches.
//!
//! The next number is the larger of two sources: one more than the highest
//! number parsed from existing folios, and the persisted counter row. Both are
//! read inside the ticket-creating transaction and the counter row is locked
//! (on backends with row locks), so concurrent creations cannot hand out the
//! same number. The unique index on `folio` backs this up.

use sea_orm::ConnectionTrait;

use crate::error::RepositoryError;
use crate::models::Branch;
use crate::repositories::{FolioCounterRepository, TicketRepository};

/// Number assigned to the very first ticket
pub const FIRST_FOLIO_NUMBER: i64 = 1000;

/// Parse the numeric suffix of a folio such as `"SRV - 1001"`.
///
/// Takes the segment after the last `-`, trimmed. Unparseable or
/// non-positive values yield `None`.
pub fn parse_folio_number(folio: &str) -> Option<i64> {
    folio
        .rsplit('-')
        .next()
        .and_then(|segment| segment.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
}

/// One more than the highest parseable folio, or [`FIRST_FOLIO_NUMBER`]
pub fn next_from_folios<'a, I>(folios: I) -> i64
where
    I: IntoIterator<Item = &'a str>,
{
    folios
        .into_iter()
        .filter_map(parse_folio_number)
        .max()
        .map(|max| max + 1)
        .unwrap_or(FIRST_FOLIO_NUMBER)
}

pub fn format_folio(branch: Branch, number: i64) -> String {
    format!("{} - {}", branch.as_str(), number)
}

pub fn format_ticket_number(branch: Branch, number: i64) -> String {
    format!("TKT-{}-{}", branch.as_str(), number)
}

/// Allocate the next folio number. Must be called on a transaction.
pub async fn allocate<C: ConnectionTrait>(txn: &C) -> Result<i64, RepositoryError> {
    let counters = FolioCounterRepository::new(txn);
    let current = counters.lock_current().await?;

    let folios = TicketRepository::new(txn).all_folios().await?;
    let scanned = next_from_folios(folios.iter().map(String::as_str));

    let allocated = match &current {
        Some(counter) => scanned.max(counter.next_value),
        None => scanned,
    };

    counters.store_next(current, allocated + 1).await?;
    Ok(allocated)
}
