// # vrest-module - reconcile one resource
//
// This binary is a THIN integration layer ONLY:
// - DO NOT add reconciliation, binding or classification logic here
// - All of that lives in vrest-core; resource tables live in vrest-resources
//
// The binary is responsible for:
// 1. Reading the resource kind and the argument file from the command line
// 2. Initializing logging (stderr) and the runtime
// 3. Opening the authenticated session
// 4. Running one reconciliation and printing its result as JSON on stdout
//
// ## Usage
//
// ```bash
// export VMWARE_HOST=vcenter.example.com
// export VMWARE_USER=administrator@vsphere.local
// export VMWARE_PASSWORD=...
//
// echo '{"protocol": "http", "enabled": true, "server": "http://proxy", "port": 3128}' > args.json
// vrest-module appliance_networking_proxy args.json
// ```
//
// ## Environment
//
// - `VREST_LOG_LEVEL`: trace, debug, info (default), warn, error
// - `VMWARE_*`: connection fallbacks, see `vrest_core::config`
//
// ## Output
//
// The outcome record on success; `{"failed": true, "msg": ...}` when the
// invocation aborted.

use anyhow::Result;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use vrest_core::{InvocationConfig, OutcomeRecord, Reconciler, ResourceDescriptor, SessionFactory};
use vrest_session::RestSessionFactory;

/// Exit codes for different termination scenarios
///
/// - 0: Reconciliation finished and the server reported no error
/// - 1: Configuration or precondition error, nothing was sent
/// - 2: Runtime error (transport, authentication, server failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ModuleExitCode> for ExitCode {
    fn from(code: ModuleExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl ModuleExitCode {
    fn for_error(err: &vrest_core::Error) -> Self {
        if err.is_setup_error() {
            ModuleExitCode::ConfigError
        } else {
            ModuleExitCode::RuntimeError
        }
    }

    fn for_outcome(outcome: &OutcomeRecord) -> Self {
        if outcome.failed {
            ModuleExitCode::RuntimeError
        } else {
            ModuleExitCode::Success
        }
    }
}

/// Command line and environment
#[derive(Debug)]
struct Args {
    kind: String,
    args_file: PathBuf,
    log_level: String,
}

impl Args {
    fn from_env() -> Result<Self> {
        Self::parse(
            env::args().skip(1),
            env::var("VREST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        )
    }

    fn parse(mut argv: impl Iterator<Item = String>, log_level: String) -> Result<Self> {
        let (Some(kind), Some(args_file), None) = (argv.next(), argv.next(), argv.next()) else {
            anyhow::bail!("usage: vrest-module <resource_kind> <args.json>");
        };

        let args = Self {
            kind,
            args_file: PathBuf::from(args_file),
            log_level,
        };
        args.validate()?;
        Ok(args)
    }

    fn validate(&self) -> Result<()> {
        if self.kind.is_empty() {
            anyhow::bail!("Resource kind cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "VREST_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Print the failure document and pick the exit code
fn fail(msg: impl std::fmt::Display, code: ModuleExitCode) -> ExitCode {
    println!("{}", json!({"failed": true, "msg": msg.to_string()}));
    code.into()
}

fn main() -> ExitCode {
    let args = match Args::from_env() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return fail(e, ModuleExitCode::ConfigError);
        }
    };

    // Logs go to stderr; stdout carries the result document only
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return fail(e, ModuleExitCode::ConfigError);
    }

    let registry = vrest_resources::builtin_registry();
    let descriptor = match registry.get(&args.kind) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!("{}. Known kinds: {}", e, registry.list_resources().join(", "));
            return fail(e, ModuleExitCode::ConfigError);
        }
    };

    // Any failure to read or validate the arguments happens before a request
    let invocation = match InvocationConfig::from_file(&args.args_file, descriptor) {
        Ok(invocation) => invocation,
        Err(e) => {
            error!("Invalid arguments in {}: {}", args.args_file.display(), e);
            return fail(e, ModuleExitCode::ConfigError);
        }
    };

    info!(
        resource = descriptor.kind,
        host = %invocation.connection.hostname,
        state = %invocation.params.state(),
        "Starting vrest-module"
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return fail(e, ModuleExitCode::RuntimeError);
        }
    };

    match rt.block_on(run(invocation, descriptor)) {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(rendered) => {
                println!("{}", rendered);
                ModuleExitCode::for_outcome(&outcome).into()
            }
            Err(e) => fail(e, ModuleExitCode::RuntimeError),
        },
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            fail(&e, ModuleExitCode::for_error(&e))
        }
    }
}

/// Open the session and run one reconciliation
async fn run(
    invocation: InvocationConfig,
    descriptor: &'static ResourceDescriptor,
) -> vrest_core::Result<OutcomeRecord> {
    let session = RestSessionFactory.open(&invocation.connection).await?;
    Reconciler::new(session, descriptor)
        .reconcile(&invocation.params)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrest_core::Error;

    fn argv(items: &[&str]) -> impl Iterator<Item = String> {
        items.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse(argv(&["vcenter_vm", "/tmp/args.json"]), "debug".to_string()).unwrap();
        assert_eq!(args.kind, "vcenter_vm");
        assert_eq!(args.args_file, PathBuf::from("/tmp/args.json"));
        assert_eq!(args.level(), Level::DEBUG);
    }

    #[test]
    fn test_args_require_exactly_two_positionals() {
        assert!(Args::parse(argv(&["vcenter_vm"]), "info".to_string()).is_err());
        assert!(Args::parse(argv(&["a", "b", "c"]), "info".to_string()).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let err = Args::parse(argv(&["vcenter_vm", "args.json"]), "loud".to_string()).unwrap_err();
        assert!(err.to_string().contains("VREST_LOG_LEVEL"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            ModuleExitCode::for_error(&Error::precondition("vm is required")),
            ModuleExitCode::ConfigError
        );
        assert_eq!(
            ModuleExitCode::for_error(&Error::transport("connection refused")),
            ModuleExitCode::RuntimeError
        );
        assert_eq!(
            ModuleExitCode::for_error(&Error::remote_failure(500, "boom")),
            ModuleExitCode::RuntimeError
        );
        assert_eq!(
            ModuleExitCode::for_outcome(&OutcomeRecord::unchanged("delete")),
            ModuleExitCode::Success
        );
    }
}
