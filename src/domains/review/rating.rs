// Product rating aggregation over rated root reviews

use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::DatabaseInterface;
use crate::models::RatingSummary;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Recompute and store the cached average and count of a product.
///
/// Only root reviews with a rating take part. With nothing rated the average
/// is cleared and the count reset to zero.
pub async fn recompute_product_rating(
    db: &dyn DatabaseInterface,
    product_id: &str,
) -> AppResult<RatingSummary> {
    // TODO: run the read and the write in one transaction; concurrent reviews
    // on the same product can currently overwrite each other's aggregate.
    let summary = db.rating_summary(product_id).await?;
    let summary = if summary.count > 0 {
        summary
    } else {
        RatingSummary::empty()
    };

    db.update_product_rating(product_id, summary).await?;
    debug!(
        "Product {} rating now {:?} over {} reviews",
        product_id, summary.average, summary.count
    );

    Ok(summary)
}
