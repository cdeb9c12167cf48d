use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use datafusion::prelude::{SessionConfig, SessionContext};
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::Result;

/// Engine session for one experiment
///
/// Dropping (or [`BenchSession::close`]) releases the context along with any
/// cached tables it holds.
pub struct BenchSession {
    ctx: SessionContext,
}

impl BenchSession {
    /// Create a session with a bounded memory pool and the configured parallelism
    pub fn start(config: &BenchConfig) -> Result<Self> {
        let mut session_config = SessionConfig::new().with_information_schema(false);
        if let Some(target_partitions) = config.target_partitions {
            session_config = session_config.with_target_partitions(target_partitions);
        }

        let runtime = RuntimeEnvBuilder::new()
            .with_memory_limit(config.memory_limit_mb * 1024 * 1024, 1.0)
            .build_arc()?;

        let ctx = SessionContext::new_with_config_rt(session_config, runtime);
        info!(
            memory_limit_mb = config.memory_limit_mb,
            target_partitions = ctx.state().config().target_partitions(),
            "engine session started"
        );

        Ok(Self { ctx })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn close(self) {
        debug!(session_id = %self.ctx.session_id(), "closing engine session");
    }
}
