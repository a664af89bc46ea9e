//! Pipeline orchestrator.
//!
//! Drives one run through `idle -> connecting -> loading_reference ->
//! loading_dimensions -> loading_facts -> succeeded`, or into `failed` from
//! any in-progress state. Reference tables load before dimensions and
//! dimensions before facts, so every foreign key points at rows that were
//! loaded earlier in the same run.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use ecomdw_warehouse::{Connect, WarehouseConfig};

use crate::connection::ConnectionManager;
use crate::descriptor::{map_rows, Entity};
use crate::error::{PipelineError, RunError};
use crate::extract::Extractor;
use crate::loader::LoaderSet;
use crate::result::{RunSummary, TableLoad};
use crate::transform::{self, Transform};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Idle,
    Connecting,
    LoadingReference,
    LoadingDimensions,
    LoadingFacts,
    Succeeded,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::LoadingReference => "loading_reference",
            Self::LoadingDimensions => "loading_dimensions",
            Self::LoadingFacts => "loading_facts",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load stages in execution order.
pub const STAGES: [(RunState, &[Entity]); 3] = [
    (
        RunState::LoadingReference,
        &[Entity::PaymentMethods, Entity::ShippingMethods],
    ),
    (
        RunState::LoadingDimensions,
        &[Entity::Customers, Entity::Products, Entity::Locations],
    ),
    (RunState::LoadingFacts, &[Entity::Sales]),
];

/// One pipeline: a connection manager, an extractor, per-entity transforms
/// and the loaders, run against a single warehouse configuration.
pub struct Pipeline<'a, C: Connect, X: Extractor> {
    config: &'a WarehouseConfig,
    connection: ConnectionManager<C>,
    extractor: X,
    transforms: [Option<&'a dyn Transform>; 6],
    loaders: LoaderSet,
    state: RunState,
}

impl<'a, C: Connect, X: Extractor> Pipeline<'a, C, X> {
    /// A pipeline using the standard transform for each entity.
    pub fn new(config: &'a WarehouseConfig, connector: C, extractor: X, loaders: LoaderSet) -> Self {
        Self {
            config,
            connection: ConnectionManager::new(connector),
            extractor,
            transforms: Entity::ALL.map(transform::for_entity),
            loaders,
            state: RunState::Idle,
        }
    }

    /// Replace the transform applied to `entity`.
    #[must_use]
    pub fn with_transform(mut self, entity: Entity, transform: &'a dyn Transform) -> Self {
        self.transforms[entity.index()] = Some(transform);
        self
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute every stage once.
    ///
    /// The connection is always released before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] with the stage that failed and the cause. Tables
    /// committed by earlier stages stay loaded.
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        let started_at = Utc::now();
        let start = Instant::now();
        self.state = RunState::Idle;
        tracing::info!(warehouse = %self.config.target(), "Starting e-commerce ETL pipeline");

        let outcome = self.run_stages();
        self.connection.disconnect();

        match outcome {
            Ok(tables) => {
                let summary = RunSummary {
                    started_at,
                    finished_at: Utc::now(),
                    duration_secs: start.elapsed().as_secs_f64(),
                    tables,
                };
                self.transition(RunState::Succeeded);
                tracing::info!(
                    duration_secs = summary.duration_secs,
                    total_rows = summary.total_rows(),
                    "ETL pipeline completed successfully"
                );
                Ok(summary)
            }
            Err(source) => {
                let stage = self.state;
                tracing::error!(
                    stage = %stage,
                    kind = source.kind(),
                    error = %source,
                    duration_secs = start.elapsed().as_secs_f64(),
                    "Pipeline failed"
                );
                self.transition(RunState::Failed);
                Err(RunError { stage, source })
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline state transition");
        self.state = next;
    }

    fn run_stages(&mut self) -> Result<Vec<TableLoad>, PipelineError> {
        self.transition(RunState::Connecting);
        self.connection
            .connect(self.config)
            .map_err(PipelineError::Connection)?;

        let mut tables = Vec::with_capacity(Entity::ALL.len());
        for (stage, entities) in STAGES {
            self.transition(stage);
            tracing::info!(stage = %stage, "Starting stage");
            for &entity in entities {
                tables.push(self.load_entity(entity)?);
            }
            tracing::info!(stage = %stage, "Stage complete");
        }

        for load in &tables {
            tracing::info!(
                table = load.table,
                rows = load.rows,
                duration_secs = load.duration_secs,
                "Table loaded"
            );
        }
        Ok(tables)
    }

    fn load_entity(&mut self, entity: Entity) -> Result<TableLoad, PipelineError> {
        let start = Instant::now();
        let loader = self.loaders.get(entity);
        let descriptor = loader.descriptor();
        tracing::info!(entity = %entity, table = descriptor.table, "Loading entity");

        let mut table = self.extractor.extract(entity.source_name())?;
        if let Some(rules) = self.transforms[entity.index()] {
            table = rules.transform(table)?;
        }
        let rows = map_rows(descriptor, &table)?;

        // Nothing is cleared unless the replacement rows are loadable.
        loader.validate(&rows)?;

        let conn = self.connection.handle().map_err(PipelineError::Connection)?;
        if descriptor.truncate_before_load {
            loader.truncate(conn)?;
        }
        let written = loader.load(conn, &rows)?;

        Ok(TableLoad {
            entity: entity.as_str(),
            table: descriptor.table,
            rows: written,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}
