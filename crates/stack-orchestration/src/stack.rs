//! Stack lifecycle management
//!
//! The stack's deployed state lives in the external orchestrator, never in
//! this process: every check queries `docker ps` afresh and matches the
//! listing against the expected per-service resource names.

use crate::config;
use crate::progress::Progress;
use crate::{Error, Result};
use command_validator::{Command, Expectation, RetryPolicy, Validator};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_PROGRAM: &str = "docker";

fn default_deployed_check() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_secs(3))
}

/// Confirming absence after teardown is slower and less deterministic than
/// confirming presence after deploy, so it gets a larger budget.
fn default_not_deployed_check() -> RetryPolicy {
    RetryPolicy::new(5, Duration::from_secs(5))
}

fn default_action_policy() -> RetryPolicy {
    RetryPolicy::new(1, Duration::from_secs(2))
}

/// A named group of services deployed together as one Docker stack
///
/// Immutable once built. The component set is a snapshot taken from the
/// definition documents at construction time; later edits to the files on
/// disk are not observed.
#[derive(Debug)]
pub struct Stack {
    name: String,
    definition_sources: Vec<PathBuf>,
    components: BTreeSet<String>,
    component_aliases: HashMap<String, String>,
    progress: Progress,
    program: String,
    deployed_check: RetryPolicy,
    not_deployed_check: RetryPolicy,
    validator: Validator,
}

impl Stack {
    /// Start building a stack from definition documents, in deploy order
    pub fn builder<I, P>(definition_sources: I) -> StackBuilder
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        StackBuilder {
            definition_sources: definition_sources.into_iter().map(Into::into).collect(),
            name: None,
            component_aliases: HashMap::new(),
            progress: Progress::default(),
            program: DEFAULT_PROGRAM.to_string(),
            deployed_check: default_deployed_check(),
            not_deployed_check: default_not_deployed_check(),
        }
    }

    /// The stack name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition documents, in the order passed to `stack deploy`
    pub fn definition_sources(&self) -> &[PathBuf] {
        &self.definition_sources
    }

    /// Names of the services declared across all definition documents
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Assert the stack's deployed state, with the default retry budget
    ///
    /// With `should_be_deployed` true, every per-service resource name must
    /// appear in the orchestrator's listing; with false, none may. Fails with
    /// [`Error::NotDeployed`] or [`Error::IsDeployed`] once the budget is
    /// exhausted.
    pub async fn check_deployed(&self, should_be_deployed: bool) -> Result<()> {
        let policy = if should_be_deployed {
            self.deployed_check
        } else {
            self.not_deployed_check
        };
        self.check_deployed_with(should_be_deployed, &policy).await
    }

    /// Assert the stack's deployed state with a caller-supplied budget
    pub async fn check_deployed_with(
        &self,
        should_be_deployed: bool,
        policy: &RetryPolicy,
    ) -> Result<()> {
        let phrase = if should_be_deployed {
            "Checking deployed"
        } else {
            "Checking not deployed"
        };
        let _task = self.progress.task(phrase);

        let result = self
            .validator
            .run_with_validation(
                &self.status_command(),
                &self.deployed_expectations(should_be_deployed),
                policy,
            )
            .await?;

        if result.satisfied {
            Ok(())
        } else if should_be_deployed {
            Err(Error::NotDeployed {
                stack: self.name.clone(),
                output: result.output,
            })
        } else {
            Err(Error::IsDeployed {
                stack: self.name.clone(),
                output: result.output,
            })
        }
    }

    /// Deploy the stack and confirm every service comes up
    ///
    /// Guarded: fails with [`Error::IsDeployed`] before issuing anything if
    /// the stack is already up. The deploy command's own output must report
    /// creation of every service; afterwards the deployed check confirms the
    /// services actually appear in the listing.
    pub async fn deploy(&self) -> Result<()> {
        self.deploy_with(&default_action_policy()).await
    }

    /// Deploy with a caller-supplied budget for the deploy command itself
    pub async fn deploy_with(&self, policy: &RetryPolicy) -> Result<()> {
        self.check_deployed(false).await?;
        {
            let _task = self.progress.task("Deploying");
            let result = self
                .validator
                .run_with_validation(
                    &self.deploy_command(),
                    &self.creating_expectations(),
                    policy,
                )
                .await?;
            if !result.satisfied {
                return Err(Error::DeployFailed {
                    stack: self.name.clone(),
                    output: result.output,
                });
            }
        }
        self.check_deployed(true).await
    }

    /// Tear the stack down and confirm every service is gone
    ///
    /// Guarded: fails with [`Error::NotDeployed`] before issuing anything if
    /// the stack is not up.
    pub async fn teardown(&self) -> Result<()> {
        self.teardown_with(&default_action_policy()).await
    }

    /// Tear down with a caller-supplied budget for the removal command itself
    pub async fn teardown_with(&self, policy: &RetryPolicy) -> Result<()> {
        self.check_deployed(true).await?;
        {
            let _task = self.progress.task("Tearing down");
            let result = self
                .validator
                .run_with_validation(
                    &self.teardown_command(),
                    &self.removing_expectations(),
                    policy,
                )
                .await?;
            if !result.satisfied {
                return Err(Error::TeardownFailed {
                    stack: self.name.clone(),
                    output: result.output,
                });
            }
        }
        self.check_deployed(false).await
    }

    /// Stream raw logs for one component to this process's stdio
    ///
    /// The component name is resolved through the alias table, falling back
    /// to the literal name. With `follow` the subprocess keeps streaming
    /// until terminated. Direct pass-through: no capture, no retry.
    pub async fn logs(&self, component: &str, follow: bool) -> Result<()> {
        self.validator
            .run_streaming(&self.logs_command(component, follow))
            .await?;
        Ok(())
    }

    fn service_name(&self, component: &str) -> String {
        format!("{}_{}", self.name, component)
    }

    fn resolve_component<'a>(&'a self, component: &'a str) -> &'a str {
        self.component_aliases
            .get(component)
            .map(String::as_str)
            .unwrap_or(component)
    }

    fn status_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("ps")
            .arg("--filter")
            .arg(format!("name={}", self.name))
            .arg("--format")
            .arg("{{ .Names }}");
        cmd
    }

    fn deploy_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("stack").arg("deploy").arg(&self.name);
        for source in &self.definition_sources {
            cmd.arg("-c").arg(source);
        }
        cmd
    }

    fn teardown_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("stack").arg("rm").arg(&self.name);
        cmd
    }

    fn logs_command(&self, component: &str, follow: bool) -> Command {
        let resolved = self.resolve_component(component);
        let mut cmd = Command::new(&self.program);
        cmd.arg("service")
            .arg("logs")
            .arg("--raw")
            .arg(self.service_name(resolved));
        if follow {
            cmd.arg("-f");
        }
        cmd
    }

    fn deployed_expectations(&self, should_be_deployed: bool) -> Vec<Expectation> {
        self.components
            .iter()
            .map(|component| {
                let expectation = Expectation::contains(self.service_name(component));
                if should_be_deployed {
                    expectation
                } else {
                    expectation.negated()
                }
            })
            .collect()
    }

    fn creating_expectations(&self) -> Vec<Expectation> {
        self.components
            .iter()
            .map(|component| {
                Expectation::contains(format!(
                    "Creating service {}",
                    self.service_name(component)
                ))
            })
            .collect()
    }

    fn removing_expectations(&self) -> Vec<Expectation> {
        self.components
            .iter()
            .map(|component| {
                Expectation::contains(format!(
                    "Removing service {}",
                    self.service_name(component)
                ))
            })
            .collect()
    }
}

/// Builder for [`Stack`]
pub struct StackBuilder {
    definition_sources: Vec<PathBuf>,
    name: Option<String>,
    component_aliases: HashMap<String, String>,
    progress: Progress,
    program: String,
    deployed_check: RetryPolicy,
    not_deployed_check: RetryPolicy,
}

impl StackBuilder {
    /// Set the stack name; a random token is generated when unset
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Map a friendly component name to the declared service name
    pub fn alias(mut self, friendly: impl Into<String>, component: impl Into<String>) -> Self {
        self.component_aliases
            .insert(friendly.into(), component.into());
        self
    }

    /// Set the progress display mode
    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Override the orchestrator program (defaults to `docker`)
    ///
    /// The orchestrator is observed only through its textual output, so any
    /// program speaking the same subcommand surface works; the test suites
    /// point this at stub scripts.
    pub fn orchestrator_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the default budget for deployed checks
    pub fn deployed_check_policy(mut self, policy: RetryPolicy) -> Self {
        self.deployed_check = policy;
        self
    }

    /// Override the default budget for not-deployed checks
    pub fn not_deployed_check_policy(mut self, policy: RetryPolicy) -> Self {
        self.not_deployed_check = policy;
        self
    }

    /// Read every definition document and build the stack
    ///
    /// Fails if any document cannot be read or parsed, or if the union of
    /// declared services is empty.
    pub fn build(self) -> Result<Stack> {
        let name = self
            .name
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let mut components = BTreeSet::new();
        for source in &self.definition_sources {
            let definition = config::parse_file(source)?;
            components.extend(definition.services.keys().cloned());
        }
        if components.is_empty() {
            return Err(Error::NoComponents { stack: name });
        }

        debug!(
            stack = %name,
            components = components.len(),
            sources = self.definition_sources.len(),
            "stack constructed"
        );

        let validator = Validator::new(name.clone());
        Ok(Stack {
            name,
            definition_sources: self.definition_sources,
            components,
            component_aliases: self.component_aliases,
            progress: self.progress,
            program: self.program,
            deployed_check: self.deployed_check,
            not_deployed_check: self.not_deployed_check,
            validator,
        })
    }
}
