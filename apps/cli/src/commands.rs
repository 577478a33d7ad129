//! # Commands
//!
//! Each command starts a repository flow, then drains the notification queue
//! on the main task until the flow's task has finished.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stockpile_core::Product;
use stockpile_sync::{
    callback, LoadFailure, LoadListener, NotificationQueue, SaveFailure, StockRepository,
};
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

// =============================================================================
// list
// =============================================================================

/// Prints each snapshot as it arrives.
#[derive(Default)]
struct SnapshotPrinter {
    delivered: AtomicUsize,
}

impl LoadListener<Vec<Product>> for SnapshotPrinter {
    fn on_loaded(&self, products: Vec<Product>) {
        let label = match self.delivered.fetch_add(1, Ordering::SeqCst) {
            0 => "local",
            _ => "refreshed",
        };

        println!("── {label} ({} products) ──", products.len());
        for product in &products {
            println!("{}", format_row(product));
        }
    }

    fn on_failure(&self, failure: LoadFailure) {
        eprintln!("! {failure}");
    }
}

pub async fn list(repository: &StockRepository, queue: NotificationQueue) -> CliResult {
    let handle = repository.fetch_all(SnapshotPrinter::default());
    drive(handle, queue).await?;
    Ok(())
}

// =============================================================================
// save
// =============================================================================

pub async fn save(
    repository: &StockRepository,
    product: Product,
    queue: NotificationQueue,
) -> CliResult {
    let outcome: Arc<Mutex<Option<Result<Product, String>>>> = Arc::default();

    let on_success = Arc::clone(&outcome);
    let on_failure = Arc::clone(&outcome);
    let handle = repository.save(
        product,
        callback(
            move |saved: Product| {
                if let Ok(mut slot) = on_success.lock() {
                    *slot = Some(Ok(saved));
                }
            },
            move |failure: SaveFailure| {
                if let Ok(mut slot) = on_failure.lock() {
                    *slot = Some(Err(failure.to_string()));
                }
            },
        ),
    );
    drive(handle, queue).await?;

    let outcome = outcome
        .lock()
        .map_err(|_| "save outcome unavailable")?
        .take();

    match outcome {
        Some(Ok(saved)) => {
            println!("saved {}", format_row(&saved).trim_start());
            Ok(())
        }
        Some(Err(reason)) => Err(reason.into()),
        None => {
            println!("remote accepted the product without returning it; nothing stored locally");
            Ok(())
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Runs notifications on this task until `handle` completes, then runs
/// whatever the flow queued last.
async fn drive(mut handle: JoinHandle<()>, mut queue: NotificationQueue) -> Result<(), JoinError> {
    loop {
        tokio::select! {
            finished = &mut handle => {
                finished?;
                break;
            }
            ran = queue.run_next() => {
                if !ran {
                    handle.await?;
                    break;
                }
            }
        }
    }

    let late = queue.run_pending();
    debug!(late, "Flow finished");
    Ok(())
}

fn format_row(product: &Product) -> String {
    let id = product
        .id
        .map_or_else(|| "-".to_string(), |id| format!("#{id}"));

    format!(
        "  {:>5}  {:<24} {:>10}  qty {}",
        id,
        product.name,
        format_price(product.price_cents),
        product.quantity
    )
}

fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(150), "$1.50");
        assert_eq!(format_price(5), "$0.05");
        assert_eq!(format_price(0), "$0.00");
        assert_eq!(format_price(-1999), "-$19.99");
    }

    #[test]
    fn test_format_row() {
        let row = format_row(&Product::new("Pen", 150, 10).with_id(1));
        assert!(row.contains("#1"));
        assert!(row.contains("Pen"));
        assert!(row.contains("$1.50"));
        assert!(row.ends_with("qty 10"));

        assert!(format_row(&Product::new("Ink", 300, 3)).contains('-'));
    }
}
