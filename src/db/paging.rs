use crate::{ErrorMessage, Result, StoreLensError};

/// Rows per page for board and notice listings.
pub const PAGE_SIZE: i64 = 10;

/// Row offset for a 1-based page number.
pub fn page_offset(page: i64) -> Result<i64> {
    if page < 1 {
        return Err(StoreLensError::BadRequest(
            ErrorMessage::ErrInvalidQueryParameter,
        ));
    }
    (page - 1)
        .checked_mul(PAGE_SIZE)
        .ok_or(StoreLensError::BadRequest(
            ErrorMessage::ErrInvalidQueryParameter,
        ))
}

/// Number of pages needed for `total` rows.
pub fn page_count(total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}
