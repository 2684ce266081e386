//! The watch pipeline: fetch active order, pick the nearest deliveries, scan
//! their menus, dispatch alerts.
//!
//! The run is strictly sequential. Failures on steps every later step depends
//! on (active ids, order data, selection) abort the run; a failure scoped to
//! one delivery is logged and that delivery is skipped; a dispatch failure is
//! logged and does not unwind the scan.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::notifications::{Embed, WebhookNotifier};
use crate::portal::MealPortal;
use crate::scanner::{AllergenAlert, AllergenScanner};
use crate::schedule;

/// Counters for the end-of-run summary line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Deliveries whose menu was fetched and scanned.
    pub deliveries_checked: usize,
    /// Meals flagged across all checked deliveries.
    pub meals_flagged: usize,
    /// Alerts accepted by the webhook.
    pub alerts_sent: usize,
}

pub struct WatchEngine {
    portal: Arc<dyn MealPortal>,
    notifier: WebhookNotifier,
    scanner: AllergenScanner,
    delivery_limit: usize,
    dry_run: bool,
}

impl WatchEngine {
    pub fn new(
        portal: Arc<dyn MealPortal>,
        notifier: WebhookNotifier,
        scanner: AllergenScanner,
        delivery_limit: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            portal,
            notifier,
            scanner,
            delivery_limit,
            dry_run,
        }
    }

    /// One full watch pass over the account's first active order.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let ids = self
            .portal
            .active_order_ids()
            .await
            .context("can't get active order ids")?;
        let Some(order_id) = ids.first().copied() else {
            bail!("no active order on this account");
        };
        info!(order_id, active_orders = ids.len(), "found active order");

        let order = self
            .portal
            .order_data(order_id)
            .await
            .with_context(|| format!("can't get order data for order {order_id}"))?;

        let nearest = schedule::nearest_deliveries(&order.deliveries, self.delivery_limit)
            .context("nothing upcoming to check")?;
        info!(count = nearest.len(), "checking nearest deliveries");

        for delivery in &nearest {
            let menu = match self.portal.delivery_menu(delivery.delivery_id).await {
                Ok(menu) => menu,
                Err(error) => {
                    error!(
                        delivery_id = delivery.delivery_id,
                        date = %delivery.date,
                        %error,
                        "can't get delivery menu, skipping delivery"
                    );
                    continue;
                }
            };
            summary.deliveries_checked += 1;

            let flagged = self.scanner.scan(&menu.meals);
            if flagged.is_empty() {
                info!(
                    delivery_id = delivery.delivery_id,
                    date = %delivery.date,
                    meals = menu.meals.len(),
                    "no allergen matches"
                );
                continue;
            }

            for meal in &flagged {
                debug!(
                    delivery_id = delivery.delivery_id,
                    meal = %meal.menu_meal_name,
                    matched = ?meal.matched_ingredients,
                    "allergen match"
                );
            }
            warn!(
                delivery_id = delivery.delivery_id,
                date = %delivery.date,
                meals = flagged.len(),
                "allergen matches found"
            );
            summary.meals_flagged += flagged.len();

            let alert = AllergenAlert {
                date: delivery.date.clone(),
                meals: flagged,
            };

            if self.dry_run {
                info!(
                    date = %alert.date,
                    meals = alert.meals.len(),
                    "dry run, not dispatching alert"
                );
                continue;
            }

            match self.notifier.send(None, Embed::allergen_alert(&alert)).await {
                Ok(()) => summary.alerts_sent += 1,
                Err(error) => {
                    error!(
                        delivery_id = delivery.delivery_id,
                        date = %alert.date,
                        %error,
                        "failed to dispatch alert"
                    );
                }
            }
        }

        Ok(summary)
    }
}
