//! WizardController — owns the session, drives step transitions, and runs
//! the fetch-and-transition protocol around the two boundary calls.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::api::types::{OrderRequest, RecommendationRequest};
use crate::api::{OrderApi, RecommendationApi};
use crate::catalog::{Catalog, CategoryGroup};
use crate::error::{Error, WizardError};
use crate::session::{Session, TransferChoice, TransferDetails};

use super::step::Step;
use super::validate::validate;

/// Outcome of a forward action on the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The transition happened; the session is now on this step.
    Moved(Step),
    /// The validation gate failed: the step is unchanged and the field
    /// errors are stored on the session.
    Rejected,
}

/// Orchestrates the upsell flow: validation-gated step transitions,
/// selection bookkeeping, and the recommendation/order boundary calls.
///
/// The session and catalog are exclusively owned here. The two boundary
/// calls are the only suspension points; `Session::is_busy` spans each call
/// and every user action that would move or mutate the wizard is rejected
/// while busy, so at most one boundary call is ever outstanding.
pub struct WizardController {
    recommendations: Arc<dyn RecommendationApi>,
    orders: Arc<dyn OrderApi>,
    session: RwLock<Session>,
    catalog: RwLock<Option<Catalog>>,
}

impl WizardController {
    pub fn new(recommendations: Arc<dyn RecommendationApi>, orders: Arc<dyn OrderApi>) -> Self {
        Self {
            recommendations,
            orders,
            session: RwLock::new(Session::new()),
            catalog: RwLock::new(None),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn current_step(&self) -> Step {
        self.session.read().await.current_step
    }

    pub async fn is_busy(&self) -> bool {
        self.session.read().await.is_busy
    }

    /// Snapshot of the fetched catalog, if any.
    pub async fn catalog(&self) -> Option<Catalog> {
        self.catalog.read().await.clone()
    }

    /// Catalog partitioned by category, first-seen order. Empty before the
    /// catalog is fetched.
    pub async fn grouped_catalog(&self) -> Vec<CategoryGroup> {
        self.catalog
            .read()
            .await
            .as_ref()
            .map(Catalog::grouped)
            .unwrap_or_default()
    }

    /// Total price of the current selection.
    pub async fn total(&self) -> Decimal {
        let session = self.session.read().await;
        let catalog = self.catalog.read().await;
        catalog
            .as_ref()
            .map(|c| c.total_for(&session.selected))
            .unwrap_or(Decimal::ZERO)
    }

    // ── Input ───────────────────────────────────────────────────────

    pub async fn set_email(&self, email: &str) {
        self.session.write().await.email = email.to_string();
    }

    pub async fn set_flight_number(&self, flight_number: &str) {
        self.session.write().await.flight_number = flight_number.to_string();
    }

    pub async fn choose_transfer(&self, choice: TransferChoice) {
        self.session.write().await.transfer = choice;
    }

    pub async fn set_transfer_details(&self, details: TransferDetails) {
        self.session.write().await.transfer_details = details;
    }

    // ── Forward progress ────────────────────────────────────────────

    /// Advance from the current input step.
    ///
    /// Runs the validation gate first; a failed gate is a no-op transition
    /// (step unchanged, errors stored, no boundary call). From the
    /// transfer-choice step the wizard branches: a wanted transfer moves to
    /// the details step, otherwise the catalog is fetched directly. The
    /// details step fetches the catalog after its gate passes.
    pub async fn advance(&self) -> Result<Advance, Error> {
        let (step, choice) = {
            let session = self.session.read().await;
            if session.is_busy {
                return Err(WizardError::Busy.into());
            }
            (session.current_step, session.transfer)
        };

        match step {
            Step::Email => self.gate_and_move(Step::Email, Step::Flight).await,
            Step::Flight => self.gate_and_move(Step::Flight, Step::TransferChoice).await,
            Step::TransferChoice if choice == TransferChoice::Yes => {
                self.gate_and_move(Step::TransferChoice, Step::TransferDetails)
                    .await
            }
            // Covers both `No` (fetch straight away, skipping the details
            // step) and `Unset` (the gate inside rejects before any call).
            Step::TransferChoice => self.fetch_catalog(Step::TransferChoice).await,
            Step::TransferDetails => self.fetch_catalog(Step::TransferDetails).await,
            _ => Err(WizardError::NotAvailable {
                action: "advance",
                step,
            }
            .into()),
        }
    }

    /// Gate `from`, then transition to `to`. No boundary call involved.
    async fn gate_and_move(&self, from: Step, to: Step) -> Result<Advance, Error> {
        let mut session = self.session.write().await;
        session.validation_errors.clear();
        if let Err(errors) = validate(from, &session) {
            tracing::debug!(step = %from, fields = errors.len(), "validation failed");
            session.validation_errors = errors;
            return Ok(Advance::Rejected);
        }
        transition(&mut session, to)?;
        Ok(Advance::Moved(to))
    }

    /// Gate `from`, then fetch the recommendation and move to the catalog.
    ///
    /// The busy flag spans the whole call. On failure the session stays on
    /// `from` with the flag cleared and no catalog is stored.
    async fn fetch_catalog(&self, from: Step) -> Result<Advance, Error> {
        let request = {
            let mut session = self.session.write().await;
            session.validation_errors.clear();
            if let Err(errors) = validate(from, &session) {
                tracing::debug!(step = %from, fields = errors.len(), "validation failed");
                session.validation_errors = errors;
                return Ok(Advance::Rejected);
            }
            if session.is_busy {
                return Err(WizardError::Busy.into());
            }
            session.is_busy = true;
            RecommendationRequest::from_session(&session)
        };

        let result = self.recommendations.recommend(&request).await;

        let mut session = self.session.write().await;
        session.is_busy = false;
        match result {
            Ok(catalog) => {
                transition(&mut session, Step::CatalogBrowse)?;
                tracing::info!(
                    session = %session.id,
                    recommendation = %catalog.recommendation_id,
                    items = catalog.items.len(),
                    "catalog loaded"
                );
                *self.catalog.write().await = Some(catalog);
                Ok(Advance::Moved(Step::CatalogBrowse))
            }
            Err(e) => {
                tracing::warn!(session = %session.id, step = %from, error = %e, "recommendation fetch failed");
                Err(e.into())
            }
        }
    }

    // ── Catalog navigation ──────────────────────────────────────────

    /// Drill into a category from the catalog overview.
    pub async fn open_category(&self, category: &str) -> Result<(), Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if session.current_step != Step::CatalogBrowse {
            return Err(WizardError::NotAvailable {
                action: "open_category",
                step: session.current_step,
            }
            .into());
        }
        let catalog = self.catalog.read().await;
        let known = catalog
            .as_ref()
            .is_some_and(|c| c.items.iter().any(|a| a.category == category));
        if !known {
            return Err(WizardError::UnknownCategory {
                category: category.to_string(),
            }
            .into());
        }
        transition(&mut session, Step::CategoryDetail)?;
        session.active_category = Some(category.to_string());
        Ok(())
    }

    /// Back out of the category drill-down.
    pub async fn close_category(&self) -> Result<(), Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if session.current_step != Step::CategoryDetail {
            return Err(WizardError::NotAvailable {
                action: "close_category",
                step: session.current_step,
            }
            .into());
        }
        transition(&mut session, Step::CatalogBrowse)?;
        session.active_category = None;
        Ok(())
    }

    /// Move to the review step. Requires at least one selected ancillary.
    pub async fn request_review(&self) -> Result<(), Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if !matches!(
            session.current_step,
            Step::CatalogBrowse | Step::CategoryDetail
        ) {
            return Err(WizardError::NotAvailable {
                action: "request_review",
                step: session.current_step,
            }
            .into());
        }
        if session.selected.is_empty() {
            return Err(WizardError::EmptySelection.into());
        }
        transition(&mut session, Step::Review)?;
        session.active_category = None;
        Ok(())
    }

    /// Return from review to the catalog overview. Rejected while an order
    /// is in flight: the call's resolution assumes the review step.
    pub async fn back_to_catalog(&self) -> Result<(), Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if session.current_step != Step::Review {
            return Err(WizardError::NotAvailable {
                action: "back_to_catalog",
                step: session.current_step,
            }
            .into());
        }
        transition(&mut session, Step::CatalogBrowse)?;
        Ok(())
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Toggle an ancillary in the selection. Only available while browsing
    /// or reviewing; the id must exist in the fetched catalog. Returns
    /// whether the id is selected afterwards.
    pub async fn toggle_ancillary(&self, id: &str) -> Result<bool, Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if !session.current_step.allows_selection() {
            return Err(WizardError::NotAvailable {
                action: "toggle_ancillary",
                step: session.current_step,
            }
            .into());
        }
        let catalog = self.catalog.read().await;
        match catalog.as_ref() {
            None => Err(WizardError::CatalogMissing.into()),
            Some(c) if !c.contains(id) => Err(WizardError::UnknownAncillary {
                id: id.to_string(),
            }
            .into()),
            Some(_) => Ok(session.toggle(id)),
        }
    }

    // ── Order ───────────────────────────────────────────────────────

    /// Submit the selection as an order and move to the confirmed step.
    ///
    /// An empty selection is rejected locally, before any call goes out.
    /// On failure the session remains on review with the busy flag cleared.
    pub async fn place_order(&self) -> Result<(), Error> {
        let request = {
            let mut session = self.session.write().await;
            if session.current_step != Step::Review {
                return Err(WizardError::NotAvailable {
                    action: "place_order",
                    step: session.current_step,
                }
                .into());
            }
            if session.is_busy {
                return Err(WizardError::Busy.into());
            }
            if session.selected.is_empty() {
                return Err(WizardError::EmptySelection.into());
            }
            let catalog = self.catalog.read().await;
            let Some(catalog) = catalog.as_ref() else {
                return Err(WizardError::CatalogMissing.into());
            };
            session.is_busy = true;
            OrderRequest {
                recommendation: catalog.recommendation_id.clone(),
                ancillaries: session.selected.iter().cloned().collect(),
                email: session.email.trim().to_string(),
            }
        };

        let result = self.orders.place_order(&request).await;

        let mut session = self.session.write().await;
        session.is_busy = false;
        match result {
            Ok(()) => {
                transition(&mut session, Step::Confirmed)?;
                session.confirmed_at = Some(Utc::now());
                tracing::info!(
                    session = %session.id,
                    recommendation = %request.recommendation,
                    items = request.ancillaries.len(),
                    "order confirmed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session = %session.id, error = %e, "order submission failed");
                Err(e.into())
            }
        }
    }

    /// Start a fresh visit after a confirmed order. Resets the session to
    /// its initial values and discards the catalog.
    pub async fn start_over(&self) -> Result<(), Error> {
        let mut session = self.session.write().await;
        if session.is_busy {
            return Err(WizardError::Busy.into());
        }
        if session.current_step != Step::Confirmed {
            return Err(WizardError::NotAvailable {
                action: "start_over",
                step: session.current_step,
            }
            .into());
        }
        tracing::info!(session = %session.id, "session reset");
        session.reset();
        *self.catalog.write().await = None;
        Ok(())
    }
}

/// Apply a transition after checking it against the step machine.
fn transition(session: &mut Session, to: Step) -> Result<(), WizardError> {
    let from = session.current_step;
    if !from.can_transition_to(to) {
        return Err(WizardError::InvalidTransition { from, to });
    }
    session.current_step = to;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use tokio::sync::Notify;

    use crate::catalog::Ancillary;
    use crate::error::ApiError;

    fn sample_catalog() -> Catalog {
        Catalog {
            recommendation_id: "rec-42".to_string(),
            items: vec![
                Ancillary {
                    id: "anc-1".to_string(),
                    name: "Airport transfer".to_string(),
                    description: "Door to door".to_string(),
                    price: dec!(20.70),
                    image_url: None,
                    category: "transportation".to_string(),
                },
                Ancillary {
                    id: "anc-2".to_string(),
                    name: "Travel insurance".to_string(),
                    description: String::new(),
                    price: dec!(6.60),
                    image_url: None,
                    category: "insurance".to_string(),
                },
            ],
        }
    }

    /// Stub recommendation client: counts calls, optionally fails, and can
    /// hold each call until released (for busy-flag tests).
    struct StubRecommender {
        calls: AtomicUsize,
        fail: bool,
        gate: Option<Arc<Notify>>,
    }

    impl StubRecommender {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                gate: None,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
                gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                gate: Some(gate),
            }
        }
    }

    #[async_trait]
    impl RecommendationApi for StubRecommender {
        async fn recommend(
            &self,
            _request: &RecommendationRequest,
        ) -> Result<Catalog, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                Err(ApiError::Status {
                    endpoint: "recommendations".to_string(),
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(sample_catalog())
            }
        }
    }

    /// Stub order client: counts calls and can report a rejected order.
    struct StubOrders {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubOrders {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn rejecting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl OrderApi for StubOrders {
        async fn place_order(&self, _request: &OrderRequest) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ApiError::OrderRejected {
                    reason: "sold out".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn controller(
        recommender: StubRecommender,
        orders: StubOrders,
    ) -> (WizardController, Arc<StubRecommender>, Arc<StubOrders>) {
        let recommender = Arc::new(recommender);
        let orders = Arc::new(orders);
        let rec_api: Arc<dyn RecommendationApi> = recommender.clone();
        let order_api: Arc<dyn OrderApi> = orders.clone();
        let controller = WizardController::new(rec_api, order_api);
        (controller, recommender, orders)
    }

    /// Drive a fresh controller to the catalog step with transfer = no.
    async fn browse(wizard: &WizardController) {
        wizard.set_email("a@b.com").await;
        wizard.advance().await.unwrap();
        wizard.set_flight_number("BA075").await;
        wizard.advance().await.unwrap();
        wizard.choose_transfer(TransferChoice::No).await;
        wizard.advance().await.unwrap();
        assert_eq!(wizard.current_step().await, Step::CatalogBrowse);
    }

    #[tokio::test]
    async fn invalid_email_is_a_noop_with_errors() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        wizard.set_email("not-an-email").await;

        let outcome = wizard.advance().await.unwrap();

        assert_eq!(outcome, Advance::Rejected);
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::Email);
        assert!(session.validation_errors.contains_key("email"));
    }

    #[tokio::test]
    async fn errors_clear_on_the_next_attempt() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        wizard.set_email("nope").await;
        wizard.advance().await.unwrap();
        assert!(!wizard.session().await.validation_errors.is_empty());

        wizard.set_email("a@b.com").await;
        let outcome = wizard.advance().await.unwrap();

        assert_eq!(outcome, Advance::Moved(Step::Flight));
        assert!(wizard.session().await.validation_errors.is_empty());
    }

    #[tokio::test]
    async fn unanswered_transfer_choice_blocks_without_fetching() {
        let (wizard, recommender, _) = controller(StubRecommender::ok(), StubOrders::ok());
        wizard.set_email("a@b.com").await;
        wizard.advance().await.unwrap();
        wizard.set_flight_number("BA075").await;
        wizard.advance().await.unwrap();

        let outcome = wizard.advance().await.unwrap();

        assert_eq!(outcome, Advance::Rejected);
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::TransferChoice);
        assert!(session.validation_errors.contains_key("wantsTransfer"));
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declining_transfer_skips_details_and_fetches() {
        let (wizard, recommender, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 1);
        assert!(wizard.catalog().await.is_some());
        assert!(!wizard.is_busy().await);
    }

    #[tokio::test]
    async fn wanting_transfer_goes_through_details() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        wizard.set_email("a@b.com").await;
        wizard.advance().await.unwrap();
        wizard.set_flight_number("BA075").await;
        wizard.advance().await.unwrap();
        wizard.choose_transfer(TransferChoice::Yes).await;

        let outcome = wizard.advance().await.unwrap();
        assert_eq!(outcome, Advance::Moved(Step::TransferDetails));

        // Incomplete details are rejected in one pass with per-field keys.
        let outcome = wizard.advance().await.unwrap();
        assert_eq!(outcome, Advance::Rejected);
        assert_eq!(wizard.session().await.validation_errors.len(), 6);

        wizard
            .set_transfer_details(TransferDetails {
                pickup_address: "12 Airport Way".to_string(),
                dropoff_address: "34 Harbour Street".to_string(),
                passenger_count: "2".to_string(),
                pickup_date: "2026-09-01".to_string(),
                pickup_time: "14:30".to_string(),
                car_type: "sedan".to_string(),
            })
            .await;
        let outcome = wizard.advance().await.unwrap();
        assert_eq!(outcome, Advance::Moved(Step::CatalogBrowse));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_step_and_clears_busy() {
        let (wizard, _, _) = controller(StubRecommender::failing(), StubOrders::ok());
        wizard.set_email("a@b.com").await;
        wizard.advance().await.unwrap();
        wizard.set_flight_number("BA075").await;
        wizard.advance().await.unwrap();
        wizard.choose_transfer(TransferChoice::No).await;

        let result = wizard.advance().await;

        assert!(matches!(result, Err(Error::Api(_))));
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::TransferChoice);
        assert!(!session.is_busy);
        assert!(wizard.catalog().await.is_none());
    }

    #[tokio::test]
    async fn advance_is_rejected_while_a_fetch_is_outstanding() {
        let gate = Arc::new(Notify::new());
        let (wizard, recommender, _) =
            controller(StubRecommender::gated(Arc::clone(&gate)), StubOrders::ok());
        let wizard = Arc::new(wizard);

        wizard.set_email("a@b.com").await;
        wizard.advance().await.unwrap();
        wizard.set_flight_number("BA075").await;
        wizard.advance().await.unwrap();
        wizard.choose_transfer(TransferChoice::No).await;

        let background = {
            let wizard = Arc::clone(&wizard);
            tokio::spawn(async move { wizard.advance().await })
        };

        // Wait until the call is actually in flight.
        while !wizard.is_busy().await {
            tokio::task::yield_now().await;
        }

        let second = wizard.advance().await;
        assert!(matches!(
            second,
            Err(Error::Wizard(WizardError::Busy))
        ));
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let first = background.await.unwrap().unwrap();
        assert_eq!(first, Advance::Moved(Step::CatalogBrowse));
    }

    #[tokio::test]
    async fn toggling_twice_restores_selection_and_total() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;

        assert!(wizard.toggle_ancillary("anc-1").await.unwrap());
        assert_eq!(wizard.total().await, dec!(20.70));
        assert!(!wizard.toggle_ancillary("anc-1").await.unwrap());
        assert_eq!(wizard.total().await, Decimal::ZERO);
        assert!(wizard.session().await.selected.is_empty());
    }

    #[tokio::test]
    async fn total_sums_selected_prices() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        wizard.toggle_ancillary("anc-1").await.unwrap();
        wizard.toggle_ancillary("anc-2").await.unwrap();
        assert_eq!(wizard.total().await, dec!(27.30));
    }

    #[tokio::test]
    async fn toggle_rejects_ids_outside_the_catalog() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;

        let result = wizard.toggle_ancillary("bogus").await;
        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::UnknownAncillary { .. }))
        ));
        assert!(wizard.session().await.selected.is_empty());
    }

    #[tokio::test]
    async fn toggle_is_unavailable_before_browsing() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        let result = wizard.toggle_ancillary("anc-1").await;
        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::NotAvailable { .. }))
        ));
    }

    #[tokio::test]
    async fn category_drill_down_and_back() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;

        wizard.open_category("insurance").await.unwrap();
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::CategoryDetail);
        assert_eq!(session.active_category.as_deref(), Some("insurance"));

        // Selection works inside the drill-down.
        wizard.toggle_ancillary("anc-2").await.unwrap();

        wizard.close_category().await.unwrap();
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::CatalogBrowse);
        assert!(session.active_category.is_none());
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        let result = wizard.open_category("spa").await;
        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::UnknownCategory { .. }))
        ));
        assert_eq!(wizard.current_step().await, Step::CatalogBrowse);
    }

    #[tokio::test]
    async fn review_requires_a_selection() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;

        let result = wizard.request_review().await;
        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::EmptySelection))
        ));
        assert_eq!(wizard.current_step().await, Step::CatalogBrowse);
    }

    #[tokio::test]
    async fn empty_selection_never_reaches_the_order_client() {
        let (wizard, _, orders) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        wizard.toggle_ancillary("anc-1").await.unwrap();
        wizard.request_review().await.unwrap();

        // Review supports removal; empty the cart there.
        wizard.toggle_ancillary("anc-1").await.unwrap();
        let result = wizard.place_order().await;

        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::EmptySelection))
        ));
        assert_eq!(wizard.current_step().await, Step::Review);
        assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_order_stays_on_review() {
        let (wizard, _, orders) = controller(StubRecommender::ok(), StubOrders::rejecting());
        browse(&wizard).await;
        wizard.toggle_ancillary("anc-1").await.unwrap();
        wizard.request_review().await.unwrap();

        let result = wizard.place_order().await;

        assert!(matches!(
            result,
            Err(Error::Api(ApiError::OrderRejected { .. }))
        ));
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::Review);
        assert!(!session.is_busy);
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_order_confirms_and_start_over_resets() {
        let (wizard, _, orders) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        wizard.toggle_ancillary("anc-1").await.unwrap();
        wizard.request_review().await.unwrap();
        assert_eq!(wizard.total().await, dec!(20.70));

        wizard.place_order().await.unwrap();
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::Confirmed);
        assert!(session.confirmed_at.is_some());
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);

        wizard.start_over().await.unwrap();
        let session = wizard.session().await;
        assert_eq!(session.current_step, Step::Email);
        assert!(session.email.is_empty());
        assert!(session.selected.is_empty());
        assert!(wizard.catalog().await.is_none());
    }

    #[tokio::test]
    async fn back_from_review_returns_to_catalog() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        wizard.toggle_ancillary("anc-1").await.unwrap();
        wizard.request_review().await.unwrap();

        wizard.back_to_catalog().await.unwrap();
        assert_eq!(wizard.current_step().await, Step::CatalogBrowse);
        // The selection survives the round-trip.
        assert!(wizard.session().await.selected.contains("anc-1"));
    }

    #[tokio::test]
    async fn advance_is_unavailable_while_browsing() {
        let (wizard, _, _) = controller(StubRecommender::ok(), StubOrders::ok());
        browse(&wizard).await;
        let result = wizard.advance().await;
        assert!(matches!(
            result,
            Err(Error::Wizard(WizardError::NotAvailable { .. }))
        ));
    }
}
