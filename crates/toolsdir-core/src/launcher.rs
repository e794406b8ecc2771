use std::io::Write;

use tracing::Instrument as _;

use crate::aggregator::{
    ACTIVATION_FAILED, ExecutionOutcome, FAILURE_EXIT_CODE, Reporter, StatusBlock, finalize,
};
use crate::executor::{ScopeExecutor, execute_if_present};
use crate::generator::GeneratorInvoker;
use crate::guard::check_invocation_mode;
use crate::namer::{TempScriptHandle, TempScriptNamer};
use crate::request::{ActivationRequest, InvocationMetadata};
use crate::scope::EnvironmentScope;

/// Result of one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub exit_code: i32,
    /// `None` when the guard stopped the activation.
    pub outcome: Option<ExecutionOutcome>,
    pub temp_script: Option<TempScriptHandle>,
}

/// Runs guard, naming, generation, execution and aggregation in order.
pub struct Launcher<G, E, W> {
    generator: G,
    executor: E,
    namer: TempScriptNamer,
    reporter: Reporter<W>,
}

impl<G, E, W> Launcher<G, E, W>
where
    G: GeneratorInvoker,
    E: ScopeExecutor,
    W: Write,
{
    pub fn new(generator: G, executor: E, namer: TempScriptNamer, reporter: Reporter<W>) -> Self {
        Self {
            generator,
            executor,
            namer,
            reporter,
        }
    }

    /// Activate into `scope`.
    ///
    /// Failures never surface as errors: they are reported to the user and
    /// reflected in the exit code. Changes made to `scope` by a script that
    /// later failed are kept.
    pub async fn activate(
        &mut self,
        request: &ActivationRequest,
        metadata: &InvocationMetadata,
        scope: &mut EnvironmentScope,
    ) -> ActivationReport {
        let span = tracing::info_span!("activate", dialect = %request.dialect());
        self.run(request, metadata, scope).instrument(span).await
    }

    async fn run(
        &mut self,
        request: &ActivationRequest,
        metadata: &InvocationMetadata,
        scope: &mut EnvironmentScope,
    ) -> ActivationReport {
        let dialect = request.dialect();
        if let Err(e) = check_invocation_mode(dialect, metadata) {
            tracing::debug!(?metadata, "guard rejected invocation");
            self.reporter
                .emit(&StatusBlock::error(ACTIVATION_FAILED).with_detail(e.to_string()));
            return ActivationReport {
                exit_code: FAILURE_EXIT_CODE,
                outcome: None,
                temp_script: None,
            };
        }
        debug_assert_eq!(self.executor.dialect(), dialect);

        let handle = self.namer.allocate(request.working_directory(), dialect);

        let generation_exit_code = match self
            .generator
            .invoke(handle.path(), dialect, request.forwarded_args())
            .await
        {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("{e}");
                FAILURE_EXIT_CODE
            }
        };

        let outcome = if generation_exit_code == 0 {
            let execution_exit_code = match execute_if_present(&self.executor, &handle, scope).await
            {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!("{e}");
                    FAILURE_EXIT_CODE
                }
            };
            ExecutionOutcome {
                generation_exit_code,
                execution_exit_code,
            }
        } else {
            ExecutionOutcome::generation_failed(generation_exit_code)
        };

        let exit_code = finalize(&outcome, &handle, &mut self.reporter);
        ActivationReport {
            exit_code,
            outcome: Some(outcome),
            temp_script: Some(handle),
        }
    }

    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }
}
