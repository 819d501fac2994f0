use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    core::{
        services::{
            BulkScope, ScopeService, SeriesService, SeriesSnapshot, ServiceResult, StatusService,
            SummaryService,
        },
        time::{Clock, SystemClock},
    },
    domain::{DueState, Obligation, ObligationPatch, SeriesRequest, SeriesSpec},
    storage::OccurrenceStore,
};

/// Facade that binds the engine services to one occurrence store, one
/// configuration, and one clock. This is the surface calling UI/API layers use.
pub struct ObligationManager {
    storage: Box<dyn OccurrenceStore>,
    config: EngineConfig,
    clock: Box<dyn Clock>,
}

impl ObligationManager {
    pub fn new(storage: Box<dyn OccurrenceStore>) -> Self {
        Self {
            storage,
            config: EngineConfig::default(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage(&self) -> &dyn OccurrenceStore {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Pure generation; nothing is written.
    pub fn generate_series(&self, spec: &SeriesSpec) -> ServiceResult<Vec<Obligation>> {
        SeriesService::generate(spec, &self.config)
    }

    pub fn create_series(&self, spec: &SeriesSpec) -> ServiceResult<Vec<Obligation>> {
        SeriesService::create(self.storage(), spec, &self.config)
    }

    /// Validates a loosely-typed request and creates the series it describes.
    pub fn create_from_request(&self, request: SeriesRequest) -> ServiceResult<Vec<Obligation>> {
        let spec = SeriesSpec::try_from(request)?;
        self.create_series(&spec)
    }

    pub fn resolve_scope(&self, target: &Obligation, scope: BulkScope) -> ServiceResult<Vec<Uuid>> {
        ScopeService::resolve(self.storage(), target, scope)
    }

    pub fn apply_bulk_edit(
        &self,
        target: &Obligation,
        patch: &ObligationPatch,
        scope: BulkScope,
    ) -> ServiceResult<Vec<Uuid>> {
        ScopeService::apply_bulk_edit(self.storage(), target, patch, scope)
    }

    pub fn apply_bulk_delete(
        &self,
        target: &Obligation,
        scope: BulkScope,
    ) -> ServiceResult<Vec<Uuid>> {
        ScopeService::apply_bulk_delete(self.storage(), target, scope)
    }

    pub fn confirm_payment(
        &self,
        id: Uuid,
        payment_date: NaiveDate,
        amount: Decimal,
    ) -> ServiceResult<Obligation> {
        StatusService::confirm_payment(self.storage(), id, payment_date, amount)
    }

    pub fn cancel(&self, id: Uuid) -> ServiceResult<Obligation> {
        StatusService::cancel(self.storage(), id)
    }

    /// Display-only urgency of `obligation` as of the manager's clock.
    pub fn due_state(&self, obligation: &Obligation) -> Option<DueState> {
        obligation.due_state(self.today(), self.config.due_soon_days)
    }

    pub fn series_snapshot(&self, member_id: Uuid) -> ServiceResult<SeriesSnapshot> {
        SummaryService::series_snapshot(
            self.storage(),
            member_id,
            self.today(),
            self.config.due_soon_days,
        )
    }

    pub fn series_warnings(&self, head_id: Uuid) -> ServiceResult<Vec<String>> {
        SummaryService::series_warnings(self.storage(), head_id, &self.config)
    }
}
