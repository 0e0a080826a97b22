//! Pass pipeline
//!
//! Runs an ordered list of passes over every compilation unit. Units are
//! independent: each one is owned by exactly one worker, and all passes run
//! on it in order before the worker moves on. The first pass error aborts
//! the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::deque::{Injector, Steal};
use jolt_ast::CompilationUnit;
use jolt_types::TypeContext;

use crate::config::PipelineConfig;
use crate::diagnostic::Problems;
use crate::error::PipelineError;
use crate::pass::{NormalizationPass, PassContext};

/// Rewritten units with their diagnostics, both in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub units: Vec<CompilationUnit>,
    pub problems: Vec<Problems>,
}

impl PipelineOutput {
    pub fn warning_count(&self) -> usize {
        self.problems.iter().map(Problems::warning_count).sum()
    }

    pub fn error_count(&self) -> usize {
        self.problems.iter().map(Problems::error_count).sum()
    }
}

type UnitResult = Result<(CompilationUnit, Problems), PipelineError>;

/// Ordered sequence of normalization passes
pub struct Pipeline {
    passes: Vec<Box<dyn NormalizationPass>>,
    /// Worker count; `None` runs on the calling thread
    workers: Option<usize>,
    types: Arc<TypeContext>,
}

impl Pipeline {
    /// Create a sequential pipeline running `passes` in order
    pub fn new(passes: Vec<Box<dyn NormalizationPass>>) -> Self {
        Self {
            passes,
            workers: None,
            types: Arc::new(TypeContext::new()),
        }
    }

    /// Build the pipeline described by `config`
    pub fn from_config(config: &PipelineConfig) -> Self {
        let pipeline = Self::new(config.passes.iter().map(|kind| kind.create()).collect());
        if config.parallel {
            pipeline.with_workers(config.effective_worker_threads())
        } else {
            pipeline
        }
    }

    /// Process units on `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Share a type interner with the rest of the compilation
    pub fn with_type_context(mut self, types: Arc<TypeContext>) -> Self {
        self.types = types;
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass over every unit
    pub fn run(&self, units: Vec<CompilationUnit>) -> Result<PipelineOutput, PipelineError> {
        log::debug!(
            "running {} passes over {} units ({})",
            self.passes.len(),
            units.len(),
            match self.workers {
                Some(n) => format!("{} workers", n),
                None => "sequential".to_string(),
            }
        );

        let results = match self.workers {
            Some(workers) if units.len() > 1 => self.run_parallel(units, workers)?,
            _ => units
                .into_iter()
                .map(|unit| self.run_unit(unit))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let (units, problems) = results.into_iter().unzip();
        Ok(PipelineOutput { units, problems })
    }

    fn run_unit(&self, unit: CompilationUnit) -> UnitResult {
        let unit_name = unit.name.clone();
        let mut ctx = PassContext::new(unit_name.clone(), Arc::clone(&self.types));
        let mut unit = unit;

        for pass in &self.passes {
            log::trace!("pass '{}' on '{}'", pass.name(), unit_name);
            unit = pass
                .apply_to(unit, &mut ctx)
                .map_err(|source| PipelineError::PassFailed {
                    pass: pass.name(),
                    unit: unit_name.clone(),
                    source,
                })?;
        }

        let problems = ctx.into_problems();
        log::trace!(
            "finished '{}': {} warnings, {} errors",
            unit_name,
            problems.warning_count(),
            problems.error_count()
        );
        Ok((unit, problems))
    }

    fn run_parallel(
        &self,
        units: Vec<CompilationUnit>,
        workers: usize,
    ) -> Result<Vec<(CompilationUnit, Problems)>, PipelineError> {
        let count = units.len();
        let injector = Injector::new();
        for job in units.into_iter().enumerate() {
            injector.push(job);
        }
        let failed = AtomicBool::new(false);

        let injector = &injector;
        let failed = &failed;
        let joined = crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..workers.min(count))
                .map(|_| {
                    scope.spawn(move |_| {
                        let mut done: Vec<(usize, UnitResult)> = Vec::new();
                        while !failed.load(Ordering::Acquire) {
                            match injector.steal() {
                                Steal::Success((index, unit)) => {
                                    let result = self.run_unit(unit);
                                    if result.is_err() {
                                        failed.store(true, Ordering::Release);
                                    }
                                    done.push((index, result));
                                }
                                Steal::Empty => break,
                                Steal::Retry => continue,
                            }
                        }
                        done
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        })
        .map_err(|_| PipelineError::WorkerPanicked)?;

        let mut slots: Vec<Option<(CompilationUnit, Problems)>> = (0..count).map(|_| None).collect();
        let mut first_error: Option<(usize, PipelineError)> = None;
        for worker in joined {
            let done = worker.map_err(|_| PipelineError::WorkerPanicked)?;
            for (index, result) in done {
                match result {
                    Ok(output) => slots[index] = Some(output),
                    Err(err) => {
                        if first_error.as_ref().map_or(true, |(i, _)| index < *i) {
                            first_error = Some((index, err));
                        }
                    }
                }
            }
        }
        if let Some((_, err)) = first_error {
            return Err(err);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or(PipelineError::WorkerPanicked))
            .collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Run `passes` in order over `units` on the calling thread
pub fn run(
    units: Vec<CompilationUnit>,
    passes: Vec<Box<dyn NormalizationPass>>,
) -> Result<PipelineOutput, PipelineError> {
    Pipeline::new(passes).run(units)
}
